//! Internationalization (i18n) for the three site languages.
//!
//! # Architecture
//!
//! - `language`: `Language` (content codes `ka`/`ru`/`en`) and `Locale`
//!   (URL segments `ge`/`ru`/`en`)
//! - `registry`: Single source of truth for per-language metadata
//! - `strings`: Embedded UI string catalog with English fallback
//! - `validator`: Catalog completeness checks
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{t, Language, Locale};
//!
//! let language = Locale::Ge.language(); // Language::Georgian
//! let label = t(language, "nav.offers");
//! ```

mod language;
mod registry;
mod strings;
mod validator;

pub use language::{Language, Locale};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{t, UiStrings};
pub use validator::{CatalogValidator, ValidationReport};
