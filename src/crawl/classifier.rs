// src/crawl/classifier.rs
// =============================================================================
// Decides what a resolved link is:
//
//   Asset           - a wireframe image/document to put in the inventory
//   FollowablePage  - a same-domain page or directory to crawl into
//   Pagination      - the next/previous/numbered page of a listing
//   Ignore          - everything else (other domains, mailto:, archives...)
//
// The decision is an ordered list of rules. Each rule either returns a class
// or passes; the first rule that answers wins, so every link gets exactly one
// class. The string tables the rules read (extensions, keywords, directory
// names) live in `ClassifierRules` and can be swapped per crawl.
// =============================================================================

use serde::Serialize;
use tracing::trace;
use url::Url;

use super::inventory::AssetKind;
use super::page::LinkSource;
use super::resolver::{canonicalize, host_matches, last_segment};

/// Extensions that make a URL an asset, with the kind they imply.
pub const DEFAULT_ASSET_EXTENSIONS: &[(&str, AssetKind)] = &[
    (".png", AssetKind::Image),
    (".jpeg", AssetKind::Image),
    (".jpg", AssetKind::Image),
    (".gif", AssetKind::Image),
    (".svg", AssetKind::Image),
    (".pdf", AssetKind::Document),
];

/// File-name keywords that make a URL an asset on their own.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "wireframe",
    "mockup",
    "design",
    "ui",
    "ux",
    "screen",
    "pog",
];

/// Path fragments of directories known to hold wireframes.
pub const DEFAULT_DIRECTORY_SEGMENTS: &[&str] = &["/wareframes/", "/pog_up_wareframes/"];

/// Extensions of pages that can be crawled.
pub const DEFAULT_PAGE_EXTENSIONS: &[&str] = &[".html", ".htm", ".php", ".asp", ".aspx", ".jsp"];

/// Extensions of files that are never crawled into.
pub const DEFAULT_DIRECT_FILE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".bmp", ".ico", ".pdf", ".zip", ".rar",
    ".7z", ".tar", ".gz", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".mp4", ".mp3",
];

/// Query keys that mark a pagination URL (`?page=2`, `?p=2`, `?offset=20`).
pub const DEFAULT_PAGINATION_QUERY_KEYS: &[&str] = &["page", "p", "offset"];

/// Path segments followed by a number that mark pagination (`/page/2`, `/p/2`).
pub const DEFAULT_PAGINATION_PATH_SEGMENTS: &[&str] = &["page", "p"];

/// The class a link ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    Asset(AssetKind),
    FollowablePage,
    Pagination,
    Ignore(IgnoreReason),
}

/// Why a link was ignored. Only used for logging and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Not http(s), or not a URL at all
    NotHttp,
    OffDomain,
    /// An <img>/<embed>/<object> source that isn't an asset
    EmbeddedResource,
    SelfReference,
    DirectFile,
    NotNavigable,
}

/// Rule tables for one crawl.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    /// Normalized crawl domain ("gytx.dev")
    pub domain: String,
    pub asset_extensions: Vec<(String, AssetKind)>,
    pub keywords: Vec<String>,
    pub directory_segments: Vec<String>,
    pub page_extensions: Vec<String>,
    pub direct_file_extensions: Vec<String>,
    pub pagination_query_keys: Vec<String>,
    pub pagination_path_segments: Vec<String>,
}

impl ClassifierRules {
    /// Default tables for `domain` (already normalized).
    pub fn for_domain(domain: impl Into<String>) -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            domain: domain.into(),
            asset_extensions: DEFAULT_ASSET_EXTENSIONS
                .iter()
                .map(|(ext, kind)| (ext.to_string(), *kind))
                .collect(),
            keywords: owned(DEFAULT_KEYWORDS),
            directory_segments: owned(DEFAULT_DIRECTORY_SEGMENTS),
            page_extensions: owned(DEFAULT_PAGE_EXTENSIONS),
            direct_file_extensions: owned(DEFAULT_DIRECT_FILE_EXTENSIONS),
            pagination_query_keys: owned(DEFAULT_PAGINATION_QUERY_KEYS),
            pagination_path_segments: owned(DEFAULT_PAGINATION_PATH_SEGMENTS),
        }
    }

    /// Replaces the keyword table (lowercased).
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }
}

// Everything a rule may look at, computed once per link
struct Subject<'a> {
    url: &'a Url,
    source: LinkSource,
    pagination_hint: bool,
    /// Lowercased path
    path: String,
    /// Lowercased last path segment
    file_name: String,
    is_self_reference: bool,
}

type Rule = fn(&ClassifierRules, &Subject) -> Option<LinkClass>;

// Evaluated top to bottom; the first Some wins
const RULES: &[(&str, Rule)] = &[
    ("domain gate", domain_gate),
    ("asset", asset_rule),
    ("embedded resource", embedded_rule),
    ("pagination", pagination_rule),
    ("self reference", self_reference_rule),
    ("direct file", direct_file_rule),
    ("followable page", followable_rule),
];

/// Classifies resolved links using an ordered rule list.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    rules: ClassifierRules,
}

impl LinkClassifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    // Classifies one link
    //
    // Parameters:
    //   url: the resolved absolute URL
    //   source: anchor or embedded resource
    //   pagination_hint: structural hint from the page markup
    //   page_url: canonical URL of the page the link was found on
    pub fn classify(
        &self,
        url: &str,
        source: LinkSource,
        pagination_hint: bool,
        page_url: &str,
    ) -> LinkClass {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return LinkClass::Ignore(IgnoreReason::NotHttp),
        };

        let subject = Subject {
            url: &parsed,
            source,
            pagination_hint,
            path: parsed.path().to_lowercase(),
            file_name: last_segment(&parsed),
            is_self_reference: canonicalize(url) == canonicalize(page_url),
        };

        for (name, rule) in RULES {
            if let Some(class) = rule(&self.rules, &subject) {
                trace!(url, rule = name, ?class, "classified link");
                return class;
            }
        }
        LinkClass::Ignore(IgnoreReason::NotNavigable)
    }
}

fn domain_gate(rules: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    if !matches!(s.url.scheme(), "http" | "https") {
        return Some(LinkClass::Ignore(IgnoreReason::NotHttp));
    }
    if !host_matches(s.url, &rules.domain) {
        return Some(LinkClass::Ignore(IgnoreReason::OffDomain));
    }
    None
}

// Extension anywhere in the path OR keyword in the file name
fn asset_rule(rules: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    if let Some((_, kind)) = rules
        .asset_extensions
        .iter()
        .find(|(ext, _)| s.path.contains(ext.as_str()))
    {
        return Some(LinkClass::Asset(*kind));
    }

    // Directory-style URLs ("/pog_up_wareframes/") have no file name and are
    // left for the followable rule.
    if !s.file_name.is_empty()
        && rules
            .keywords
            .iter()
            .any(|keyword| s.file_name.contains(keyword.as_str()))
    {
        return Some(LinkClass::Asset(AssetKind::Unknown));
    }
    None
}

fn embedded_rule(_: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    (s.source == LinkSource::Embedded).then_some(LinkClass::Ignore(IgnoreReason::EmbeddedResource))
}

fn pagination_rule(rules: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    if s.pagination_hint && !s.is_self_reference && has_page_indicator(rules, s.url) {
        return Some(LinkClass::Pagination);
    }
    None
}

fn self_reference_rule(_: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    s.is_self_reference
        .then_some(LinkClass::Ignore(IgnoreReason::SelfReference))
}

fn direct_file_rule(rules: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    let is_direct_file = rules
        .direct_file_extensions
        .iter()
        .any(|ext| s.file_name.ends_with(ext.as_str()));
    is_direct_file.then_some(LinkClass::Ignore(IgnoreReason::DirectFile))
}

fn followable_rule(rules: &ClassifierRules, s: &Subject) -> Option<LinkClass> {
    let followable = s.path.ends_with('/')
        || rules
            .directory_segments
            .iter()
            .any(|segment| s.path.contains(segment.as_str()))
        || !s.path.contains('.')
        || rules
            .page_extensions
            .iter()
            .any(|ext| s.file_name.ends_with(ext.as_str()));
    followable.then_some(LinkClass::FollowablePage)
}

// `?page=2`, `?p=2`, `?offset=20`, `/page/2`, `/p/2`
fn has_page_indicator(rules: &ClassifierRules, url: &Url) -> bool {
    let in_query = url.query_pairs().any(|(key, value)| {
        !value.is_empty()
            && rules
                .pagination_query_keys
                .iter()
                .any(|k| key.eq_ignore_ascii_case(k))
    });
    if in_query {
        return true;
    }

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    segments.windows(2).any(|pair| {
        rules
            .pagination_path_segments
            .iter()
            .any(|marker| pair[0].eq_ignore_ascii_case(marker))
            && !pair[1].is_empty()
            && pair[1].chars().all(|c| c.is_ascii_digit())
    })
}
