// src/crawl/resolver.rs
// =============================================================================
// Turns the raw href/src values found in HTML into absolute URLs.
//
// Three shapes of reference show up on real pages:
// - absolute:        "https://gytx.dev/a.png"  -> returned as-is
// - root-relative:   "/a.png"                  -> joined with the site origin
// - page-relative:   "page2/", "?page=2"       -> resolved against the page URL
//
// Resolution never fails. Garbage goes through best-effort and the
// classifier is the one that throws it away.
//
// The module also owns the "canonical" form of a URL, which is the key used
// by the visited set and the asset inventory.
// =============================================================================

use url::Url;

/// Resolves link references against the crawl root and the current page.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    root: Url,
}

impl UrlResolver {
    pub fn new(root: Url) -> Self {
        Self { root }
    }

    // Resolves `reference` to an absolute URL string
    //
    // Parameters:
    //   reference: the attribute value exactly as found in the HTML
    //   base: URL of the page being processed (None = use the root URL)
    //
    // Examples (root = https://gytx.dev):
    //   "https://x.dev/a"        -> "https://x.dev/a"
    //   "//cdn.gytx.dev/a.png"   -> "https://cdn.gytx.dev/a.png"
    //   "/foo.png"               -> "https://gytx.dev/foo.png"
    //   "page2/" (base .../docs/) -> "https://gytx.dev/docs/page2/"
    pub fn resolve(&self, reference: &str, base: Option<&str>) -> String {
        let reference = reference.trim();

        if has_http_scheme(reference) {
            return reference.to_string();
        }

        if let Some(rest) = reference.strip_prefix("//") {
            return format!("{}://{}", self.root.scheme(), rest);
        }

        if reference.starts_with('/') {
            return format!("{}{}", self.origin(), reference);
        }

        let base = base.unwrap_or(self.root.as_str());
        match Url::parse(base).and_then(|base_url| base_url.join(reference)) {
            Ok(joined) => joined.to_string(),
            Err(_) => concatenate(base, reference),
        }
    }

    // "https://gytx.dev" (or "http://127.0.0.1:8080" with a port)
    fn origin(&self) -> String {
        self.root.origin().ascii_serialization()
    }
}

/// True when the reference starts with an `http://` or `https://` scheme.
pub fn has_http_scheme(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Canonical key for a URL: parsed form, lowercase host, fragment dropped.
///
/// Unparseable input comes back trimmed so it can still be compared.
pub fn canonicalize(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.trim().to_string(),
    }
}

/// Deduplication key: the canonical URL with a leading "www." dropped from the
/// host, matching how the domain gate treats the two forms as one site.
///
/// Only used for comparisons; requests still go to the URL as linked.
pub fn visit_key(url: &str) -> String {
    let canonical = canonicalize(url);
    match Url::parse(&canonical) {
        Ok(mut parsed) => {
            let bare = parsed
                .host_str()
                .and_then(|host| host.strip_prefix("www."))
                .map(str::to_string);
            if let Some(bare) = bare {
                if parsed.set_host(Some(&bare)).is_err() {
                    return canonical;
                }
            }
            parsed.to_string()
        }
        Err(_) => canonical,
    }
}

/// Normalizes a user-supplied crawl domain ("https://www.GYTX.dev/" -> "gytx.dev").
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Whether `url`'s host belongs to the (already normalized) crawl domain.
///
/// "www." is ignored on both sides.
pub fn host_matches(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host.strip_prefix("www.").unwrap_or(&host) == domain
        }
        None => false,
    }
}

/// Last path segment, lowercased ("" for directory-style paths).
pub fn last_segment(url: &Url) -> String {
    url.path()
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn concatenate(base: &str, reference: &str) -> String {
    if base.ends_with('/') || reference.is_empty() {
        format!("{}{}", base, reference)
    } else {
        format!("{}/{}", base, reference)
    }
}
