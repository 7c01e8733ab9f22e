//! Page view models.
//!
//! Every page is assembled from three sources, in order: the admin-edited
//! content tree, the UI string catalog, and built-in default blocks. The
//! result is plain serializable data; turning it into markup is the front
//! end's job.

use crate::auth::AuthUser;
use crate::blocks::{FeatureItem, IconCard, ServiceItem, StatItem};
use crate::content::{ContentTree, LocalizedField};
use crate::i18n::{t, Language, LanguageRegistry, Locale};
use crate::posts::{OfferTab, Post, PostCategory, PostField};
use crate::routing::{localize_path, strip_locale, switch_locale};
use crate::settings::{whatsapp_link, SettingsField, SiteSettings};
use chrono::{DateTime, Utc};
use serde::Serialize;

const DEFAULT_HERO_IMAGE: &str =
    "https://images.unsplash.com/photo-1488646953014-85cb44e25828?w=1920&q=80";
const DEFAULT_ABOUT_IMAGE: &str =
    "https://images.unsplash.com/photo-1521737711867-e3b97375f902?w=800&q=80";
const DEFAULT_PHONE: &str = "+995 32 200 00 00";
const DEFAULT_EMAIL: &str = "info@interline.ge";

/// Number of posts in the home page "latest offers" strip.
pub const HOME_LATEST_LIMIT: usize = 3;

/// Per-request rendering inputs: the URL locale, the content language it
/// maps to, and the signed-in user, if any.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub locale: Locale,
    pub language: Language,
    pub session: Option<AuthUser>,
}

impl RenderContext {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            language: locale.language(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Option<AuthUser>) -> Self {
        self.session = session;
        self
    }

    fn t(&self, key: &str) -> String {
        t(self.language, key)
    }

    fn link(&self, path: &str) -> String {
        localize_path(self.locale, path)
    }

    /// Content tree text, else the catalog string for `key`.
    fn text(&self, content: &ContentTree, path: &str, key: &str) -> String {
        content.text_or(path, self.language, &self.t(key))
    }
}

fn content_of(settings: Option<&SiteSettings>) -> ContentTree {
    settings
        .map(|s| s.site_content.clone())
        .unwrap_or_default()
}

/// A field carrying the catalog string for `key` in every language.
fn catalog_field(key: &str) -> LocalizedField {
    let [ka, ru, en] = [Language::Georgian, Language::Russian, Language::English].map(|l| t(l, key));
    LocalizedField {
        ka: Some(ka),
        ru: Some(ru),
        en: Some(en),
    }
}

fn catalog_card(id: &str, icon: &str, key: &str) -> IconCard {
    IconCard {
        id: id.to_string(),
        icon: icon.to_string(),
        title: catalog_field(&format!("{}.title", key)),
        description: catalog_field(&format!("{}.description", key)),
    }
}

// ==================== Default Blocks ====================

pub fn default_service_cards() -> Vec<IconCard> {
    vec![
        catalog_card("tours", "map", "services.tours"),
        catalog_card("tickets", "plane", "services.tickets"),
        catalog_card("cruises", "ship", "services.cruises"),
    ]
}

pub fn default_why_us_items() -> Vec<IconCard> {
    vec![
        catalog_card("experience", "award", "whyUs.experience"),
        catalog_card("worldwide", "globe", "whyUs.worldwide"),
        catalog_card("cruises", "ship", "whyUs.cruises"),
        catalog_card("support", "headphones", "whyUs.support"),
    ]
}

pub fn default_values() -> Vec<IconCard> {
    vec![
        IconCard {
            id: "1".to_string(),
            icon: "award".to_string(),
            title: LocalizedField::new("ნდობა", "Доверие", "Trust"),
            description: LocalizedField::new(
                "გრძელვადიანი ურთიერთობების დამყარება სანდოობით და პატიოსნებით.",
                "Построение долгосрочных отношений через надежность и честность.",
                "Building lasting relationships through reliability and honesty.",
            ),
        },
        IconCard {
            id: "2".to_string(),
            icon: "star".to_string(),
            title: LocalizedField::new("ხარისხი", "Качество", "Quality"),
            description: LocalizedField::new(
                "განსაკუთრებული მომსახურების მიწოდება ყველა ინტერაქციაში.",
                "Предоставление исключительного сервиса в каждом взаимодействии.",
                "Delivering exceptional service in every interaction.",
            ),
        },
        IconCard {
            id: "3".to_string(),
            icon: "heart".to_string(),
            title: LocalizedField::new("ზრუნვა", "Забота", "Care"),
            description: LocalizedField::new(
                "ჩვენი კლიენტების საჭიროებები და კმაყოფილება პირველ ადგილზეა.",
                "Ставим потребности и удовлетворенность клиентов на первое место.",
                "Putting our clients' needs and satisfaction first.",
            ),
        },
    ]
}

pub fn default_stats() -> Vec<StatItem> {
    [
        ("1", "20+", ("წლის გამოცდილება", "Лет опыта", "Years Experience")),
        ("2", "5000+", ("საკრუიზო მარშრუტი", "Круизных маршрутов", "Cruise Routes")),
        ("3", "100+", ("მიმართულება", "Направлений", "Destinations")),
        ("4", "10K+", ("კმაყოფილი კლიენტი", "Довольных клиентов", "Happy Clients")),
    ]
    .into_iter()
    .map(|(id, value, (ka, ru, en))| StatItem {
        id: id.to_string(),
        value: value.to_string(),
        label: LocalizedField::new(ka, ru, en),
    })
    .collect()
}

fn feature(id: &str, ka: &str, ru: &str, en: &str) -> FeatureItem {
    FeatureItem {
        id: id.to_string(),
        text: LocalizedField::new(ka, ru, en),
    }
}

pub fn default_services() -> Vec<ServiceItem> {
    vec![
        ServiceItem {
            id: "1".to_string(),
            icon: "map".to_string(),
            images: vec!["https://images.unsplash.com/photo-1469854523086-cc02fe5d8800?w=800&q=80".to_string()],
            title: LocalizedField::new("ტურები და ექსკურსიები", "Туры и экскурсии", "Tours & Excursions"),
            description: LocalizedField::new(
                "გამოიკვლიეთ მიმართულებები მთელ მსოფლიოში.",
                "Исследуйте направления по всему миру с нашими турами.",
                "Explore destinations worldwide with our expertly curated tours.",
            ),
            features: vec![
                feature("f1", "გიდიანი ჯგუფური ტურები", "Групповые туры с гидом", "Guided group tours"),
                feature("f2", "პირადი ტურები", "Индивидуальные туры", "Private custom tours"),
                feature("f3", "სათავგადასავლო მოგზაურობა", "Приключенческие путешествия", "Adventure travel"),
            ],
        },
        ServiceItem {
            id: "2".to_string(),
            icon: "plane".to_string(),
            images: vec!["https://images.unsplash.com/photo-1436491865332-7a61a109cc05?w=800&q=80".to_string()],
            title: LocalizedField::new("ავიაბილეთები", "Авиабилеты", "Air Tickets"),
            description: LocalizedField::new(
                "საუკეთესო შეთავაზებები ფრენებზე.",
                "Лучшие предложения на авиабилеты.",
                "Best deals on flights to any destination worldwide.",
            ),
            features: vec![
                feature("f4", "კონკურენტული ფასები", "Конкурентные цены", "Competitive prices"),
                feature("f5", "ყველა მთავარი ავიაკომპანია", "Все крупные авиакомпании", "All major airlines"),
                feature("f6", "მოქნილი დაჯავშნა", "Гибкое бронирование", "Flexible booking"),
            ],
        },
        ServiceItem {
            id: "3".to_string(),
            icon: "ship".to_string(),
            images: vec!["https://images.unsplash.com/photo-1548574505-5e239809ee19?w=800&q=80".to_string()],
            title: LocalizedField::new("კრუიზები", "Круизы", "Cruises"),
            description: LocalizedField::new(
                "ფუფუნების კრუიზები საუკეთესო გემებზე.",
                "Роскошные круизы на лучших лайнерах мира.",
                "Luxury cruise experiences on the world's best ships.",
            ),
            features: vec![
                feature("f7", "ყველა საკრუიზო ხაზი", "Все круизные линии", "All cruise lines"),
                feature("f8", "მდინარის კრუიზები", "Речные круизы", "River cruises"),
                feature("f9", "საექსპედიციო კრუიზები", "Экспедиционные круизы", "Expedition cruises"),
            ],
        },
    ]
}

/// Built-in items shown for a block path while the content tree holds none,
/// as raw JSON so editors can start from what visitors currently see.
pub fn default_block(path: &str) -> Vec<serde_json::Value> {
    fn to_values<T: Serialize>(items: Vec<T>) -> Vec<serde_json::Value> {
        items
            .into_iter()
            .filter_map(|item| serde_json::to_value(item).ok())
            .collect()
    }

    match path {
        "home.serviceCards" => to_values(default_service_cards()),
        "home.whyUsItems" => to_values(default_why_us_items()),
        "services.items" => to_values(default_services()),
        "about.values" => to_values(default_values()),
        "about.stats" => to_values(default_stats()),
        _ => Vec::new(),
    }
}

// ==================== Shared View Pieces ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageOption {
    pub locale: Locale,
    pub code: &'static str,
    pub native_name: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLink {
    pub network: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub tagline: String,
    pub quick_links_title: String,
    pub contact_title: String,
    pub follow_us_title: String,
    pub rights_text: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub address: String,
    pub social: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub locale: Locale,
    pub language: Language,
    pub company_name: String,
    pub logo_url: Option<String>,
    pub nav: Vec<Link>,
    pub languages: Vec<LanguageOption>,
    pub footer: Footer,
    pub signed_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl CardView {
    fn from_card(card: &IconCard, language: Language) -> Self {
        Self {
            id: card.id.clone(),
            icon: card.icon.clone(),
            title: card.title.resolve(language).to_string(),
            description: card.description.resolve(language).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatView {
    pub id: String,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub href: String,
    pub category: PostCategory,
    pub title: String,
    pub excerpt: String,
    pub cover_image_url: Option<String>,
    pub pinned: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl PostCard {
    fn new(ctx: &RenderContext, post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            href: ctx.link(&format!("/offers/{}", post.slug)),
            category: post.category,
            title: post.localized(PostField::Title, ctx.language).to_string(),
            excerpt: post.localized(PostField::Excerpt, ctx.language).to_string(),
            cover_image_url: post.cover_image_url.clone(),
            pinned: post.pinned,
            featured: post.featured,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDetails {
    pub title: String,
    pub phone_label: String,
    pub phone: Option<String>,
    pub whatsapp_label: String,
    pub whatsapp: Option<String>,
    pub whatsapp_link: Option<String>,
    pub email_label: String,
    pub email: Option<String>,
    pub address_label: String,
    pub address: String,
    pub working_hours_label: String,
    pub working_hours: String,
}

fn contact_details(
    ctx: &RenderContext,
    settings: Option<&SiteSettings>,
    content: &ContentTree,
    title_path: &str,
) -> ContactDetails {
    let phone = settings.and_then(SiteSettings::primary_phone).map(str::to_string);
    let whatsapp = settings.and_then(SiteSettings::whatsapp_number).map(str::to_string);
    let email = settings
        .and_then(|s| s.all_emails().into_iter().next())
        .map(str::to_string);
    let localized = |field| {
        settings
            .map(|s| s.localized(field, ctx.language).to_string())
            .unwrap_or_default()
    };

    ContactDetails {
        title: ctx.text(content, title_path, "contact.title"),
        phone_label: ctx.text(content, "contacts.phoneLabel", "contact.phone"),
        phone,
        whatsapp_label: ctx.text(content, "contacts.whatsappLabel", "contact.whatsapp"),
        whatsapp_link: whatsapp.as_deref().map(whatsapp_link),
        whatsapp,
        email_label: ctx.text(content, "contacts.emailLabel", "contact.email"),
        email,
        address_label: ctx.text(content, "contacts.addressLabel", "contact.address"),
        address: localized(SettingsField::Address),
        working_hours_label: ctx.text(content, "contacts.workingHoursLabel", "contact.workingHours"),
        working_hours: localized(SettingsField::WorkingHours),
    }
}

/// Header, language switcher and footer shared by every page.
///
/// `path` and `query` describe the current request so the language
/// switcher can link to the same page in each language.
pub fn build_layout(
    ctx: &RenderContext,
    settings: Option<&SiteSettings>,
    path: &str,
    query: Option<&str>,
) -> Layout {
    let content = content_of(settings);
    let current = strip_locale(path);

    let nav = [
        ("/", "nav.home"),
        ("/offers", "nav.offers"),
        ("/services", "nav.services"),
        ("/about", "nav.about"),
        ("/contacts", "nav.contacts"),
    ]
    .into_iter()
    .map(|(target, key)| Link {
        label: ctx.t(key),
        href: ctx.link(target),
        active: if target == "/" {
            current.is_empty() || current == "/"
        } else {
            current == target || current.starts_with(&format!("{}/", target))
        },
    })
    .collect();

    let languages = LanguageRegistry::get()
        .list_all()
        .iter()
        .map(|config| LanguageOption {
            locale: config.url_locale,
            code: config.code,
            native_name: config.native_name,
            href: switch_locale(path, config.url_locale, query),
            active: config.url_locale == ctx.locale,
        })
        .collect();

    let company_name = settings
        .map(|s| s.localized(SettingsField::CompanyName, ctx.language).to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ctx.t("footer.company"));

    let footer = Footer {
        tagline: ctx.text(&content, "footer.tagline", "hero.subtitle"),
        quick_links_title: ctx.text(&content, "footer.quickLinksTitle", "nav.home"),
        contact_title: ctx.text(&content, "footer.contactTitle", "contact.title"),
        follow_us_title: ctx.text(&content, "footer.followUsTitle", "contact.followUs"),
        rights_text: ctx.text(&content, "footer.rightsText", "footer.rights"),
        phones: settings
            .map(|s| s.all_phones().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        emails: settings
            .map(|s| s.all_emails().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        address: settings
            .map(|s| s.localized(SettingsField::Address, ctx.language).to_string())
            .unwrap_or_default(),
        social: social_links(settings),
    };

    Layout {
        locale: ctx.locale,
        language: ctx.language,
        company_name,
        logo_url: settings.and_then(|s| s.logo_url.clone()),
        nav,
        languages,
        footer,
        signed_in: ctx.session.is_some(),
    }
}

fn social_links(settings: Option<&SiteSettings>) -> Vec<SocialLink> {
    settings
        .map(|s| {
            s.social_links()
                .into_iter()
                .map(|(network, url)| SocialLink {
                    network,
                    url: url.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

// ==================== Home ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
    pub background_image_url: String,
    pub offers_cta: Link,
    pub contacts_cta: Link,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSection {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestOffers {
    pub title: String,
    pub view_all: Link,
    pub empty_text: String,
    pub posts: Vec<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomePage {
    pub hero: Hero,
    pub services: CardSection,
    pub why_us: CardSection,
    pub latest_offers: LatestOffers,
    pub contact: ContactDetails,
}

pub fn home_page(ctx: &RenderContext, settings: Option<&SiteSettings>, latest: &[Post]) -> HomePage {
    let content = content_of(settings);
    let lang = ctx.language;

    let service_cards = content.items_or("home.serviceCards", default_service_cards());
    let why_us_items = content.items_or("home.whyUsItems", default_why_us_items());

    HomePage {
        hero: Hero {
            title: ctx.text(&content, "home.heroTitle", "hero.title"),
            subtitle: ctx.text(&content, "home.heroSubtitle", "hero.subtitle"),
            background_image_url: content.text_or("home.heroBgImageUrl", lang, DEFAULT_HERO_IMAGE),
            offers_cta: Link {
                label: ctx.t("hero.viewOffers"),
                href: ctx.link("/offers"),
                active: false,
            },
            contacts_cta: Link {
                label: ctx.t("hero.contacts"),
                href: ctx.link("/contacts"),
                active: false,
            },
        },
        services: CardSection {
            title: ctx.text(&content, "home.servicesTitle", "services.title"),
            subtitle: ctx.text(&content, "home.servicesSubtitle", "services.subtitle"),
            items: service_cards.iter().map(|c| CardView::from_card(c, lang)).collect(),
        },
        why_us: CardSection {
            title: ctx.text(&content, "home.whyUsTitle", "whyUs.title"),
            subtitle: String::new(),
            items: why_us_items.iter().map(|c| CardView::from_card(c, lang)).collect(),
        },
        latest_offers: LatestOffers {
            title: ctx.text(&content, "home.latestOffersTitle", "latestOffers.title"),
            view_all: Link {
                label: ctx.t("latestOffers.viewAll"),
                href: ctx.link("/offers"),
                active: false,
            },
            empty_text: ctx.t("latestOffers.comingSoon"),
            posts: latest.iter().map(|p| PostCard::new(ctx, p)).collect(),
        },
        contact: contact_details(ctx, settings, &content, "home.contactTitle"),
    }
}

// ==================== Offers ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffersPage {
    pub title: String,
    pub subtitle: String,
    pub tabs: Vec<Link>,
    pub active_tab: OfferTab,
    pub search_placeholder: String,
    pub search: String,
    pub read_more_label: String,
    pub empty_text: String,
    pub posts: Vec<PostCard>,
}

/// Offers listing. `posts` are already filtered by tab and search.
pub fn offers_page(
    ctx: &RenderContext,
    tab: OfferTab,
    search: Option<&str>,
    posts: &[Post],
) -> OffersPage {
    let tabs = OfferTab::ALL
        .into_iter()
        .map(|candidate| Link {
            label: ctx.t(&candidate.label_key()),
            href: format!("{}?tab={}", ctx.link("/offers"), candidate.as_str()),
            active: candidate == tab,
        })
        .collect();

    OffersPage {
        title: ctx.t("offers.title"),
        subtitle: ctx.t("hero.subtitle"),
        tabs,
        active_tab: tab,
        search_placeholder: ctx.t("offers.search"),
        search: search.unwrap_or_default().to_string(),
        read_more_label: ctx.t("offers.readMore"),
        empty_text: ctx.t("offers.noResults"),
        posts: posts.iter().map(|p| PostCard::new(ctx, p)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferContact {
    pub title: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub whatsapp_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDetailPage {
    pub slug: String,
    pub category: PostCategory,
    pub category_label: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub gallery: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub back: Link,
    pub contact: OfferContact,
}

pub fn offer_detail_page(
    ctx: &RenderContext,
    settings: Option<&SiteSettings>,
    post: &Post,
) -> OfferDetailPage {
    let tab = match post.category {
        PostCategory::Offer => OfferTab::Offers,
        PostCategory::Promotion => OfferTab::Promotions,
        PostCategory::News => OfferTab::News,
    };
    let phone = settings.and_then(SiteSettings::primary_phone).map(str::to_string);
    let whatsapp = settings.and_then(SiteSettings::whatsapp_number).map(str::to_string);

    OfferDetailPage {
        slug: post.slug.clone(),
        category: post.category,
        category_label: ctx.t(&tab.label_key()),
        title: post.localized(PostField::Title, ctx.language).to_string(),
        excerpt: post.localized(PostField::Excerpt, ctx.language).to_string(),
        content: post.localized(PostField::Content, ctx.language).to_string(),
        cover_image_url: post.cover_image_url.clone(),
        gallery: post.gallery.clone(),
        created_at: post.created_at,
        back: Link {
            label: ctx.t("offers.title"),
            href: ctx.link("/offers"),
            active: false,
        },
        contact: OfferContact {
            title: ctx.t("contact.title"),
            whatsapp_link: whatsapp.as_deref().map(whatsapp_link),
            phone,
            whatsapp,
        },
    }
}

// ==================== About ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutPage {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub mission_title: String,
    pub mission_text: String,
    pub image_url: String,
    pub values_title: String,
    pub values: Vec<CardView>,
    pub stats: Vec<StatView>,
}

pub fn about_page(ctx: &RenderContext, settings: Option<&SiteSettings>) -> AboutPage {
    let content = content_of(settings);
    let lang = ctx.language;

    let values = content.items_or("about.values", default_values());
    let stats = content.items_or("about.stats", default_stats());

    AboutPage {
        title: ctx.text(&content, "about.pageTitle", "about.title"),
        subtitle: ctx.text(&content, "about.pageSubtitle", "about.subtitle"),
        description: ctx.text(&content, "about.description", "about.description"),
        mission_title: ctx.text(&content, "about.missionTitle", "about.mission"),
        mission_text: ctx.text(&content, "about.missionText", "about.missionText"),
        image_url: content.text_or("about.imageUrl", lang, DEFAULT_ABOUT_IMAGE),
        values_title: ctx.text(&content, "about.valuesTitle", "about.values"),
        values: values.iter().map(|v| CardView::from_card(v, lang)).collect(),
        stats: stats
            .iter()
            .map(|s| StatView {
                id: s.id.clone(),
                value: s.value.clone(),
                label: s.label.resolve(lang).to_string(),
            })
            .collect(),
    }
}

// ==================== Services ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceView {
    pub id: String,
    pub icon: String,
    pub images: Vec<String>,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToAction {
    pub title: String,
    pub subtitle: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicesPage {
    pub title: String,
    pub subtitle: String,
    pub services: Vec<ServiceView>,
    pub cta: CallToAction,
}

pub fn services_page(ctx: &RenderContext, settings: Option<&SiteSettings>) -> ServicesPage {
    let content = content_of(settings);
    let lang = ctx.language;

    let services = content
        .items_or("services.items", default_services())
        .into_iter()
        .map(|s| ServiceView {
            title: s.title.resolve(lang).to_string(),
            description: s.description.resolve(lang).to_string(),
            features: s
                .features
                .iter()
                .map(|f| f.text.resolve(lang).to_string())
                .filter(|text| !text.is_empty())
                .collect(),
            id: s.id,
            icon: s.icon,
            images: s.images,
        })
        .collect();

    ServicesPage {
        title: ctx.text(&content, "services.pageTitle", "servicesPage.title"),
        subtitle: ctx.text(&content, "services.pageSubtitle", "servicesPage.subtitle"),
        services,
        cta: CallToAction {
            title: ctx.text(&content, "services.ctaTitle", "contact.title"),
            subtitle: ctx.text(&content, "services.ctaSubtitle", "hero.subtitle"),
            phone: settings
                .and_then(SiteSettings::primary_phone)
                .unwrap_or(DEFAULT_PHONE)
                .to_string(),
            email: settings
                .and_then(|s| s.all_emails().into_iter().next())
                .unwrap_or(DEFAULT_EMAIL)
                .to_string(),
        },
    }
}

// ==================== Contacts ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactsPage {
    pub title: String,
    pub subtitle: String,
    pub details: ContactDetails,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub social_title: String,
    pub social: Vec<SocialLink>,
    pub map_embed_url: Option<String>,
}

pub fn contacts_page(ctx: &RenderContext, settings: Option<&SiteSettings>) -> ContactsPage {
    let content = content_of(settings);

    ContactsPage {
        title: ctx.text(&content, "contacts.pageTitle", "contact.title"),
        subtitle: ctx.text(&content, "contacts.pageSubtitle", "hero.subtitle"),
        details: contact_details(ctx, settings, &content, "contacts.pageTitle"),
        phones: settings
            .map(|s| s.all_phones().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        emails: settings
            .map(|s| s.all_emails().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        social_title: ctx.text(&content, "contacts.socialTitle", "contact.followUs"),
        social: social_links(settings),
        map_embed_url: settings.and_then(|s| s.map_embed_url.clone()),
    }
}

/// A rendered page: shared layout plus the page-specific body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub layout: Layout,
    pub page: T,
}
