pub mod auth;
pub mod blocks;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod i18n;
pub mod list_editor;
pub mod pages;
pub mod posts;
pub mod routing;
pub mod security;
pub mod server;
pub mod settings;
pub mod storage;
pub mod supabase;
