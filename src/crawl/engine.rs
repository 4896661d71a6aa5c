// src/crawl/engine.rs
// =============================================================================
// The crawl engine: walks every same-domain page reachable from the root and
// collects the wireframe assets linked from them.
//
// How it works (one loop iteration per URL):
// 1. Pop a URL from the frontier
// 2. Already in the visited set? Skip it. Otherwise mark it visited
// 3. Wait for the pacer (fixed gap between requests)
// 4. Fetch it with a timeout. Failures are logged and counted, never fatal.
//    A redirect makes the final URL the page's identity: it is marked visited
//    too, and relative links resolve against it
// 5. Extract links, classify them, record assets in the inventory
// 6. Push unvisited followable/pagination links onto the frontier
// 7. Repeat until the frontier is empty
//
// The visited check happens when a URL is popped, right before fetching, so a
// URL that got queued twice (linked from two pages) is still fetched once.
// Since the visited set only grows and a site has finitely many URLs, the
// loop always ends, cycles or not.
// =============================================================================

use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::classifier::{LinkClass, LinkClassifier};
use super::fetch::{FetchedPage, Fetcher};
use super::frontier::{CrawlFrontier, Discovery, FrontierEntry};
use super::inventory::{AssetInventory, AssetKind, AssetRecord};
use super::pacer::Pacer;
use super::page::{extract_links, RawLink};
use super::resolver::{canonicalize, host_matches, last_segment, visit_key, UrlResolver};
use super::stats::{CrawlStats, FailedPage};
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::{ConfigError, FetchError};

/// Everything a finished crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub root_url: String,
    pub domain: String,
    /// Discovery order, one record per asset URL
    pub assets: Vec<AssetRecord>,
    pub stats: CrawlStats,
    pub failures: Vec<FailedPage>,
}

/// Crawl state for one run. Build one per crawl; `run` consumes it.
pub struct CrawlEngine<F: Fetcher> {
    config: CrawlConfig,
    fetcher: F,
    root: Url,
    domain: String,
    resolver: UrlResolver,
    classifier: LinkClassifier,
    pacer: Pacer,
    visited: VisitedSet,
    inventory: AssetInventory,
    stats: CrawlStats,
    failures: Vec<FailedPage>,
}

impl<F: Fetcher> CrawlEngine<F> {
    // Validates the config and sets up empty crawl state
    //
    // Errors: ConfigError if the root URL is unusable or outside the domain
    pub fn new(config: CrawlConfig, fetcher: F) -> Result<Self, ConfigError> {
        let (root, domain) = config.validate()?;
        let classifier = LinkClassifier::new(config.classifier_rules(&domain));

        Ok(Self {
            resolver: UrlResolver::new(root.clone()),
            pacer: Pacer::new(config.delay),
            root,
            domain,
            classifier,
            fetcher,
            config,
            visited: VisitedSet::new(),
            inventory: AssetInventory::new(),
            stats: CrawlStats::default(),
            failures: Vec::new(),
        })
    }

    pub async fn run(mut self) -> CrawlReport {
        let started = Instant::now();
        let mut frontier = CrawlFrontier::new(self.config.order);
        frontier.push(FrontierEntry {
            url: canonicalize(self.root.as_str()),
            discovery: Discovery::Root,
        });

        info!(
            root = %self.root,
            domain = %self.domain,
            delay_ms = self.pacer.spacing().as_millis() as u64,
            "starting crawl"
        );

        while let Some(entry) = frontier.pop() {
            if let Some(max) = self.config.max_pages {
                if self.stats.pages_attempted() >= max {
                    info!(max_pages = max, pending = frontier.len() + 1, "page limit reached");
                    break;
                }
            }

            // Pending -> Done when already seen
            if !self.visited.mark(&entry.url) {
                debug!(url = %entry.url, "already visited");
                continue;
            }

            self.pacer.wait().await;

            match self.fetch(&entry.url).await {
                Ok(page) => {
                    self.stats.pages_visited += 1;
                    if entry.discovery == Discovery::Pagination {
                        self.stats.pagination_pages += 1;
                    }

                    let page_url = canonicalize(&page.final_url);
                    if page_url != entry.url {
                        debug!(url = %entry.url, to = %page_url, "redirected");
                        if !self.visited.mark(&page_url) {
                            debug!(url = %page_url, "redirect target already visited");
                            continue;
                        }
                    }

                    info!(
                        url = %page_url,
                        visited = self.stats.pages_visited,
                        queued = frontier.len(),
                        "visited page"
                    );

                    let next = self.process_page(&page_url, &page.body);
                    frontier.extend(next);
                }
                Err(error) => {
                    warn!(url = %entry.url, %error, "failed to fetch page");
                    self.stats.pages_failed += 1;
                    self.failures.push(FailedPage {
                        url: entry.url,
                        reason: error.to_string(),
                    });
                }
            }
        }

        self.stats.assets_found = self.inventory.len();
        self.stats.elapsed = started.elapsed();
        if self.inventory.is_empty() {
            warn!(root = %self.root, "no assets found");
        }
        info!(
            pages = self.stats.pages_visited,
            failed = self.stats.pages_failed,
            assets = self.stats.assets_found,
            "crawl finished"
        );

        CrawlReport {
            root_url: self.root.to_string(),
            domain: self.domain,
            assets: self.inventory.into_records(),
            stats: self.stats,
            failures: self.failures,
        }
    }

    // One fetch with the crawl timeout; non-2xx and landing off the domain
    // count as failures
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let page = tokio::time::timeout(self.config.timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })??;

        if !page.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: page.status,
            });
        }

        let on_domain = Url::parse(&page.final_url)
            .map(|final_url| host_matches(&final_url, &self.domain))
            .unwrap_or(false);
        if !on_domain {
            return Err(FetchError::OffDomainRedirect {
                url: url.to_string(),
                to: page.final_url,
            });
        }
        Ok(page)
    }

    // Classifies every link on a page
    //
    // Returns: the page's followable and pagination links, deduplicated and
    // not yet visited, in document order
    fn process_page(&mut self, page_url: &str, body: &str) -> Vec<FrontierEntry> {
        let mut next = Vec::new();
        let mut queued = HashSet::new();

        for raw in extract_links(body) {
            let resolved = self.resolver.resolve(&raw.reference, Some(page_url));
            let url = canonicalize(&resolved);

            let discovery = match self
                .classifier
                .classify(&url, raw.source, raw.pagination_hint, page_url)
            {
                LinkClass::Asset(kind) => {
                    self.record_asset(url, kind, &raw, page_url);
                    continue;
                }
                LinkClass::Ignore(reason) => {
                    self.stats.record_ignored(reason);
                    continue;
                }
                LinkClass::FollowablePage => Discovery::Page,
                LinkClass::Pagination => Discovery::Pagination,
            };

            if self.visited.contains(&url) || !queued.insert(visit_key(&url)) {
                continue;
            }
            next.push(FrontierEntry { url, discovery });
        }

        debug!(url = page_url, links = next.len(), "links to follow");
        next
    }

    fn record_asset(&mut self, url: String, kind: AssetKind, raw: &RawLink, page_url: &str) {
        let name = asset_name(&url, &raw.context);
        let description = (!raw.context.is_empty()).then(|| raw.context.clone());
        let record = AssetRecord {
            name,
            url,
            kind,
            description,
            found_on: page_url.to_string(),
        };

        let url = record.url.clone();
        if self.inventory.record(record) {
            info!(%url, %kind, found_on = page_url, "found asset");
        }
    }
}

// File name from the URL, falling back to the link text
fn asset_name(url: &str, context: &str) -> String {
    let from_url = Url::parse(url)
        .ok()
        .map(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(str::to_string)
                .unwrap_or_else(|| last_segment(&parsed))
        })
        .filter(|name| !name.is_empty());

    match from_url {
        Some(name) => name,
        None if !context.is_empty() => context.to_string(),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::frontier::TraversalOrder;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // An in-memory website that records every URL requested from it
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        redirects: HashMap<String, String>,
        slow: HashSet<String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }

        fn slow_page(mut self, url: &str) -> Self {
            self.slow.insert(url.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn request_count(&self, url: &str) -> usize {
            self.requests().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl Fetcher for FakeSite {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if self.slow.contains(url) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            let final_url = self.redirects.get(url).map_or(url, String::as_str);
            Ok(match self.pages.get(final_url) {
                Some(body) => FetchedPage {
                    status: 200,
                    final_url: final_url.to_string(),
                    body: body.clone(),
                },
                None => FetchedPage {
                    status: 404,
                    final_url: final_url.to_string(),
                    body: String::new(),
                },
            })
        }
    }

    fn config() -> CrawlConfig {
        let mut config = CrawlConfig::new("https://gytx.dev/");
        config.delay = Duration::ZERO;
        config.timeout = Duration::from_millis(200);
        config
    }

    async fn crawl(site: FakeSite, config: CrawlConfig) -> (CrawlReport, Arc<FakeSite>) {
        let site = Arc::new(site);
        let engine = CrawlEngine::new(config, Arc::clone(&site)).unwrap();
        (engine.run().await, site)
    }

    #[tokio::test]
    async fn test_asset_link_becomes_image_record() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/foo.png">wireframe</a>"#);

        let (report, _) = crawl(site, config()).await;

        assert_eq!(report.assets.len(), 1);
        let asset = &report.assets[0];
        assert_eq!(asset.url, "https://gytx.dev/foo.png");
        assert_eq!(asset.kind, AssetKind::Image);
        assert_eq!(asset.name, "foo.png");
        assert_eq!(asset.description.as_deref(), Some("wireframe"));
        assert_eq!(asset.found_on, "https://gytx.dev/");
    }

    #[tokio::test]
    async fn test_page_linked_twice_is_fetched_once() {
        let site = FakeSite::default()
            .page(
                "https://gytx.dev/",
                r#"<a href="page2/">Two</a><a href="other/">Other</a>"#,
            )
            .page("https://gytx.dev/other/", r#"<a href="/page2/">Two again</a>"#)
            .page("https://gytx.dev/page2/", r#"<img src="shot.gif" alt="Screen">"#);

        let (report, site) = crawl(site, config()).await;

        assert_eq!(site.request_count("https://gytx.dev/page2/"), 1);
        assert_eq!(report.stats.pages_visited, 3);
        assert_eq!(report.assets[0].url, "https://gytx.dev/page2/shot.gif");
    }

    #[tokio::test]
    async fn test_pagination_is_followed_once() {
        // "?page=2" is queued from the root and again from /list/ before either
        // copy is popped
        let site = FakeSite::default()
            .page(
                "https://gytx.dev/",
                r#"<a href="/list/">Liste</a><a href="?page=2">Suivant</a>"#,
            )
            .page("https://gytx.dev/list/", r#"<a href="/?page=2">Suivant</a>"#)
            .page(
                "https://gytx.dev/?page=2",
                r#"<a href="/?page=2">2</a><a href="/">Accueil</a><a href="/a.pdf">Specs</a>"#,
            );

        for order in [TraversalOrder::DepthFirst, TraversalOrder::BreadthFirst] {
            let mut cfg = config();
            cfg.order = order;
            let (report, site) = crawl(
                FakeSite {
                    pages: site.pages.clone(),
                    ..FakeSite::default()
                },
                cfg,
            )
            .await;

            assert_eq!(site.request_count("https://gytx.dev/?page=2"), 1, "{order:?}");
            assert_eq!(report.stats.pagination_pages, 1, "{order:?}");
            assert_eq!(report.stats.pages_visited, 3, "{order:?}");
            assert_eq!(report.assets.len(), 1, "{order:?}");
            assert_eq!(report.assets[0].kind, AssetKind::Document);
        }
    }

    #[tokio::test]
    async fn test_redirect_target_is_the_base_for_relative_links() {
        let site = FakeSite::default()
            .page(
                "https://gytx.dev/",
                r#"<a href="/docs">Docs</a><a href="/docs/">Docs again</a>"#,
            )
            .redirect("https://gytx.dev/docs", "https://gytx.dev/docs/")
            .page("https://gytx.dev/docs/", r#"<img src="home.png" alt="Home">"#);

        let (report, site) = crawl(site, config()).await;

        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].url, "https://gytx.dev/docs/home.png");
        assert_eq!(report.assets[0].found_on, "https://gytx.dev/docs/");
        // The redirect target counts as visited; its direct link is not fetched again
        assert_eq!(site.request_count("https://gytx.dev/docs/"), 0);
        assert_eq!(report.stats.pages_visited, 2);
    }

    #[tokio::test]
    async fn test_redirect_off_domain_is_a_failure() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/go/">Go</a>"#)
            .redirect("https://gytx.dev/go/", "https://otherhost.com/landing/")
            .page("https://otherhost.com/landing/", r#"<a href="/leak.png">x</a>"#);

        let (report, _) = crawl(site, config()).await;

        assert!(report.assets.is_empty());
        assert_eq!(report.stats.pages_failed, 1);
        assert_eq!(report.failures[0].url, "https://gytx.dev/go/");
        assert!(report.failures[0].reason.contains("otherhost.com"));
    }

    #[tokio::test]
    async fn test_www_and_bare_host_are_crawled_once() {
        let site = FakeSite::default()
            .page(
                "https://gytx.dev/",
                r#"<a href="https://www.gytx.dev/docs/">Docs</a>
                   <a href="/docs/">Docs</a>
                   <a href="https://www.gytx.dev/a.png">Shot</a>
                   <a href="/a.png">Shot</a>"#,
            )
            .page("https://www.gytx.dev/docs/", r#"<a href="/">Home</a>"#)
            .page("https://gytx.dev/docs/", r#"<a href="/">Home</a>"#);

        let (report, site) = crawl(site, config()).await;

        let docs = site.request_count("https://www.gytx.dev/docs/")
            + site.request_count("https://gytx.dev/docs/");
        assert_eq!(docs, 1);
        assert_eq!(report.stats.pages_visited, 2);
        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].url, "https://www.gytx.dev/a.png");
    }

    #[tokio::test]
    async fn test_cycles_and_self_links_terminate() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/a/">A</a><a href="/">Home</a>"#)
            .page("https://gytx.dev/a/", r#"<a href="/b/">B</a><a href="/a/">Self</a>"#)
            .page("https://gytx.dev/b/", r#"<a href="/a/">A</a><a href="/">Home</a>"#);

        let (report, site) = crawl(site, config()).await;

        let mut requests = site.requests();
        requests.sort();
        assert_eq!(
            requests,
            vec!["https://gytx.dev/", "https://gytx.dev/a/", "https://gytx.dev/b/"]
        );
        assert_eq!(report.stats.pages_visited, 3);
    }

    #[tokio::test]
    async fn test_timeout_is_recorded_and_crawl_continues() {
        let site = FakeSite::default()
            .page(
                "https://gytx.dev/",
                r#"<a href="/slow/">Slow</a><a href="/fast/">Fast</a><a href="/x.png">x</a>"#,
            )
            .slow_page("https://gytx.dev/slow/")
            .page("https://gytx.dev/fast/", r#"<a href="/y.svg">y</a>"#);

        let (report, site) = crawl(site, config()).await;

        assert_eq!(report.stats.pages_failed, 1);
        assert_eq!(report.failures[0].url, "https://gytx.dev/slow/");
        assert!(report.failures[0].reason.contains("timed out"));
        assert_eq!(site.request_count("https://gytx.dev/fast/"), 1);

        let urls: Vec<_> = report.assets.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://gytx.dev/x.png", "https://gytx.dev/y.svg"]);
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure_not_an_abort() {
        let site = FakeSite::default().page(
            "https://gytx.dev/",
            r#"<a href="/missing/">Gone</a><a href="/b.jpg">b</a>"#,
        );

        let (report, _) = crawl(site, config()).await;

        assert_eq!(report.stats.pages_failed, 1);
        assert!(report.failures[0].reason.contains("404"));
        assert_eq!(report.assets.len(), 1);
    }

    #[tokio::test]
    async fn test_other_domains_are_never_fetched() {
        let site = FakeSite::default().page(
            "https://gytx.dev/",
            r#"
                <a href="https://otherhost.com/image.png">external</a>
                <a href="https://otherhost.com/docs/">external docs</a>
                <img src="https://cdn.otherhost.com/logo.png">
            "#,
        );

        let (report, site) = crawl(site, config()).await;

        assert_eq!(site.requests(), vec!["https://gytx.dev/"]);
        assert!(report.assets.is_empty());
        assert_eq!(report.stats.total_ignored(), 3);
    }

    #[tokio::test]
    async fn test_same_asset_on_two_pages_is_recorded_once() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/s.png">s</a><a href="/p/">p</a>"#)
            .page("https://gytx.dev/p/", r#"<a href="/s.png#zoom">s</a>"#);

        let (report, _) = crawl(site, config()).await;

        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.stats.assets_found, 1);
    }

    #[tokio::test]
    async fn test_depth_first_explores_subtree_before_sibling() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/a/">A</a><a href="/b/">B</a>"#)
            .page("https://gytx.dev/a/", r#"<a href="/a/deep/">Deep</a>"#)
            .page("https://gytx.dev/a/deep/", "")
            .page("https://gytx.dev/b/", "");

        let (_, site) = crawl(site, config()).await;

        assert_eq!(
            site.requests(),
            vec![
                "https://gytx.dev/",
                "https://gytx.dev/a/",
                "https://gytx.dev/a/deep/",
                "https://gytx.dev/b/",
            ]
        );
    }

    #[tokio::test]
    async fn test_breadth_first_visits_siblings_first() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/a/">A</a><a href="/b/">B</a>"#)
            .page("https://gytx.dev/a/", r#"<a href="/a/deep/">Deep</a>"#)
            .page("https://gytx.dev/a/deep/", "")
            .page("https://gytx.dev/b/", "");

        let mut config = config();
        config.order = TraversalOrder::BreadthFirst;
        let (_, site) = crawl(site, config).await;

        assert_eq!(
            site.requests(),
            vec![
                "https://gytx.dev/",
                "https://gytx.dev/a/",
                "https://gytx.dev/b/",
                "https://gytx.dev/a/deep/",
            ]
        );
    }

    #[tokio::test]
    async fn test_max_pages_stops_early() {
        let site = FakeSite::default()
            .page("https://gytx.dev/", r#"<a href="/a/">A</a><a href="/b/">B</a>"#)
            .page("https://gytx.dev/a/", "")
            .page("https://gytx.dev/b/", "");

        let mut config = config();
        config.max_pages = Some(2);
        let (report, site) = crawl(site, config).await;

        assert_eq!(site.requests().len(), 2);
        assert_eq!(report.stats.pages_attempted(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_root_still_reports() {
        let (report, _) = crawl(FakeSite::default(), config()).await;

        assert_eq!(report.stats.pages_visited, 0);
        assert_eq!(report.stats.pages_failed, 1);
        assert!(report.assets.is_empty());
    }

    #[test]
    fn test_asset_name_prefers_file_name() {
        assert_eq!(asset_name("https://gytx.dev/a/home.png", "Home"), "home.png");
        assert_eq!(asset_name("https://gytx.dev/", "Landing mockup"), "Landing mockup");
    }
}
