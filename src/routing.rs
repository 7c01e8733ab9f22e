//! Locale-prefixed URL scheme.
//!
//! Every public page lives under `/{locale}/...`. [`classify_path`] is the pure
//! routing decision; [`locale_redirect`] applies it as axum middleware.

use crate::i18n::Locale;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// System paths that are never locale-prefixed.
pub const EXCLUDED_PREFIXES: [&str; 7] = [
    "/admin",
    "/api",
    "/static",
    "/health",
    "/favicon.ico",
    "/robots.txt",
    "/sitemap.xml",
];

const ASSET_EXTENSIONS: [&str; 10] = [
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "css", "js", "map",
];

/// Outcome of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    PassThrough,
    Redirect(String),
}

/// Decide whether `path` is served as-is or redirected to a locale-prefixed form.
pub fn classify_path(path: &str) -> RouteDecision {
    if is_excluded(path) || is_static_asset(path) {
        return RouteDecision::PassThrough;
    }

    let default_locale = Locale::default_locale();

    if path == "/" {
        return RouteDecision::Redirect(format!("/{}", default_locale));
    }

    let Some(rest) = path.strip_prefix('/') else {
        return RouteDecision::PassThrough;
    };

    let first_segment = rest.split('/').next().unwrap_or_default();
    if first_segment.is_empty() {
        return RouteDecision::PassThrough;
    }

    if Locale::from_segment(first_segment).is_some() {
        RouteDecision::PassThrough
    } else {
        RouteDecision::Redirect(format!("/{}{}", default_locale, path))
    }
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn is_static_asset(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

/// Prefix an application path with a locale: `/offers` → `/ge/offers`.
pub fn localize_path(locale: Locale, path: &str) -> String {
    let clean = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if clean == "/" {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, clean)
    }
}

/// Strip a leading locale segment (exact match only), keeping the rest.
pub fn strip_locale(path: &str) -> &str {
    let Some(rest) = path.strip_prefix('/') else {
        return path;
    };
    let (segment, tail_start) = match rest.find('/') {
        Some(i) => (&rest[..i], i + 1),
        None => (rest, rest.len() + 1),
    };

    if Locale::from_segment(segment).is_some() {
        &path[tail_start.min(path.len())..]
    } else {
        path
    }
}

/// Same page in another language, keeping the query string.
pub fn switch_locale(path: &str, locale: Locale, query: Option<&str>) -> String {
    let mut url = format!("/{}{}", locale, strip_locale(path));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Middleware redirecting unprefixed or invalid-prefixed paths with HTTP 307.
pub async fn locale_redirect(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    match classify_path(&path) {
        RouteDecision::PassThrough => next.run(request).await,
        RouteDecision::Redirect(target) => {
            let location = match query {
                Some(query) if !query.is_empty() => format!("{}?{}", target, query),
                _ => target,
            };
            debug!("Redirecting {} to {}", path, location);
            (
                StatusCode::TEMPORARY_REDIRECT,
                [(header::LOCATION, location)],
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn redirect(to: &str) -> RouteDecision {
        RouteDecision::Redirect(to.to_string())
    }

    // ==================== classify_path Tests ====================

    #[test]
    fn test_root_redirects_to_default_locale() {
        assert_eq!(classify_path("/"), redirect("/ge"));
    }

    #[test]
    fn test_unprefixed_path_gets_default_locale() {
        assert_eq!(
            classify_path("/offers/cruise-deal"),
            redirect("/ge/offers/cruise-deal")
        );
        assert_eq!(classify_path("/about"), redirect("/ge/about"));
    }

    #[test]
    fn test_locale_prefixed_path_passes() {
        assert_eq!(classify_path("/en/offers/cruise-deal"), RouteDecision::PassThrough);
        assert_eq!(classify_path("/ge"), RouteDecision::PassThrough);
        assert_eq!(classify_path("/ru/"), RouteDecision::PassThrough);
    }

    #[test]
    fn test_invalid_locale_is_kept_as_path() {
        assert_eq!(classify_path("/fr/offers"), redirect("/ge/fr/offers"));
        assert_eq!(classify_path("/ka/about"), redirect("/ge/ka/about"));
        assert_eq!(classify_path("/EN/about"), redirect("/ge/EN/about"));
    }

    #[test]
    fn test_slug_resembling_locale_is_not_a_locale() {
        assert_eq!(classify_path("/eng"), redirect("/ge/eng"));
        assert_eq!(classify_path("/en-deals"), redirect("/ge/en-deals"));
    }

    #[test]
    fn test_excluded_prefixes_pass() {
        for path in [
            "/admin",
            "/admin/posts",
            "/api/admin/login",
            "/static/app.css",
            "/health",
            "/favicon.ico",
            "/robots.txt",
            "/sitemap.xml",
        ] {
            assert_eq!(classify_path(path), RouteDecision::PassThrough, "{}", path);
        }
    }

    #[test]
    fn test_prefix_must_end_at_segment_boundary() {
        assert_eq!(classify_path("/administrators"), redirect("/ge/administrators"));
        assert_eq!(classify_path("/apis"), redirect("/ge/apis"));
    }

    #[test]
    fn test_static_assets_pass() {
        assert_eq!(classify_path("/images/hero.JPG"), RouteDecision::PassThrough);
        assert_eq!(classify_path("/app.js.map"), RouteDecision::PassThrough);
        assert_eq!(classify_path("/offers/v1.5"), redirect("/ge/offers/v1.5"));
        assert_eq!(classify_path("/.png"), redirect("/ge/.png"));
    }

    #[test]
    fn test_malformed_paths_pass() {
        assert_eq!(classify_path(""), RouteDecision::PassThrough);
        assert_eq!(classify_path("offers"), RouteDecision::PassThrough);
        assert_eq!(classify_path("//offers"), RouteDecision::PassThrough);
    }

    #[test]
    fn test_trailing_slash_kept() {
        assert_eq!(classify_path("/offers/"), redirect("/ge/offers/"));
    }

    // ==================== Path Helper Tests ====================

    #[test]
    fn test_localize_path() {
        assert_eq!(localize_path(Locale::Ge, "/offers"), "/ge/offers");
        assert_eq!(localize_path(Locale::En, "offers/x"), "/en/offers/x");
        assert_eq!(localize_path(Locale::Ru, "/"), "/ru");
        assert_eq!(localize_path(Locale::Ru, ""), "/ru");
    }

    #[test]
    fn test_strip_locale() {
        assert_eq!(strip_locale("/ge/offers/x"), "/offers/x");
        assert_eq!(strip_locale("/en"), "");
        assert_eq!(strip_locale("/en/"), "/");
        assert_eq!(strip_locale("/english/x"), "/english/x");
        assert_eq!(strip_locale("/offers"), "/offers");
    }

    #[test]
    fn test_switch_locale_preserves_query() {
        assert_eq!(
            switch_locale("/ge/offers", Locale::Ru, Some("tab=news&q=sea")),
            "/ru/offers?tab=news&q=sea"
        );
        assert_eq!(switch_locale("/en", Locale::Ge, None), "/ge");
        assert_eq!(switch_locale("/en/about", Locale::En, Some("")), "/en/about");
    }

    // ==================== Properties ====================

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9-]{1,12}"
    }

    proptest! {
        #[test]
        fn prop_unprefixed_paths_redirect_to_ge(
            segments in prop::collection::vec(segment(), 1..5)
        ) {
            let path = format!("/{}", segments.join("/"));
            prop_assume!(Locale::from_segment(&segments[0]).is_none());
            prop_assume!(!is_excluded(&path));

            prop_assert_eq!(classify_path(&path), RouteDecision::Redirect(format!("/ge{}", path)));
        }

        #[test]
        fn prop_locale_prefixed_paths_pass(
            locale in prop::sample::select(Locale::ALL.to_vec()),
            suffix in prop::collection::vec(segment(), 0..4)
        ) {
            let path = if suffix.is_empty() {
                format!("/{}", locale)
            } else {
                format!("/{}/{}", locale, suffix.join("/"))
            };

            prop_assert_eq!(classify_path(&path), RouteDecision::PassThrough);
        }

        #[test]
        fn prop_redirect_target_is_never_redirected(
            segments in prop::collection::vec(segment(), 1..5)
        ) {
            let path = format!("/{}", segments.join("/"));
            if let RouteDecision::Redirect(target) = classify_path(&path) {
                prop_assert_eq!(classify_path(&target), RouteDecision::PassThrough);
            }
        }
    }
}
