// src/walker.rs
// =============================================================================
// The crawl engine.
//
// A strictly sequential depth-first walk: canonicalize, gate, mark visited,
// fetch, report/mirror, then recurse over the extracted links in document
// order. The visited set is insert-only and checked before every fetch, so
// the walk terminates on cyclic sites, and a page that fails to fetch is not
// retried when it is referenced again later in the run.
//
// A child is only allowed to recurse when its canonical URL is a path
// continuation of the page that referenced it; external links are still
// fetched and reported but stay leaves.
//
// The async fn calls itself, so the recursion goes through a boxed future.
// Execution stays single-threaded with one request in flight at a time.
// =============================================================================

use std::collections::HashSet;

use anyhow::Result;
use futures::future::LocalBoxFuture;
use log::{debug, warn};

use crate::cli::{CrawlConfig, MirrorMode};
use crate::extract::extract_links;
use crate::fetch::{Fetch, FetchedPage};
use crate::mirror;
use crate::policy;
use crate::report::{PageReport, Reporter};
use crate::urls::clean_url;

pub struct Walker<F: Fetch, R: Reporter> {
    config: CrawlConfig,
    fetcher: F,
    reporter: R,
    visited: HashSet<String>,
}

impl<F: Fetch, R: Reporter> Walker<F, R> {
    pub fn new(config: CrawlConfig, fetcher: F, reporter: R) -> Self {
        Walker {
            config,
            fetcher,
            reporter,
            visited: HashSet::new(),
        }
    }

    /// Walk the configured root URL to completion.
    pub async fn run(&mut self) -> Result<()> {
        let root = self.config.root_url.clone();
        self.walk(root, 0, true, None).await;
        self.reporter.finish()
    }

    /// Process one URL and, depth-first, everything it links to.
    ///
    /// `recurse` is decided by the parent: false when this URL left the
    /// parent's scope. `depth` starts at 0 for the root and counts hops.
    fn walk<'a>(
        &'a mut self,
        url: String,
        depth: usize,
        recurse: bool,
        parent: Option<String>,
    ) -> LocalBoxFuture<'a, ()> {
        Box::pin(async move {
            let url = clean_url(&url);

            if !policy::should_fetch(&self.config, &url, depth, &self.visited) {
                debug!("ignoring url {}", url);
                return;
            }

            // Mark before fetching: a page that errors must not be retried
            // when something else links to it later in the run.
            self.visited.insert(url.clone());

            debug!("fetching url {}", url);
            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(err) => {
                    if !self.config.no_warnings {
                        warn!("{}: {}", err, url);
                    }
                    return;
                }
            };

            if policy::should_display(&self.config, &url) {
                let report = self.build_report(&url, depth, parent.as_deref(), &page);
                self.reporter.page(&report);
                self.persist(&report, &page);
            } else {
                debug!("not displaying url {}", url);
            }

            if page.is_html() && recurse {
                debug!("recursing on url {}", url);
                let html = page.text();
                for child in extract_links(&url, &html) {
                    let child_recurse = child.starts_with(&url);
                    self.walk(child, depth + 1, child_recurse, Some(url.clone()))
                        .await;
                }
            }
        })
    }

    fn build_report(
        &self,
        url: &str,
        depth: usize,
        parent: Option<&str>,
        page: &FetchedPage,
    ) -> PageReport {
        let (replicate_path, copy_path) = match &self.config.mirror {
            MirrorMode::None => (None, None),
            MirrorMode::Replicate(dir) => (
                Some(mirror::replicate_path(url, &self.config.root_url, dir)),
                None,
            ),
            MirrorMode::Copy(dir) => (None, Some(mirror::copy_path(url, dir))),
        };

        PageReport {
            url: url.to_string(),
            size: page.size,
            content_type: page.content_type.clone(),
            depth,
            parent: parent.map(str::to_string),
            is_html: page.is_html(),
            replicate_path,
            copy_path,
            headers: page.headers.clone(),
        }
    }

    /// Write the page body to its mirror target, if one was computed. A
    /// write failure skips the file but never stops the walk.
    fn persist(&self, report: &PageReport, page: &FetchedPage) {
        for path in [&report.replicate_path, &report.copy_path]
            .into_iter()
            .flatten()
        {
            if let Err(err) = mirror::write_once(path, &page.body) {
                if !self.config.no_warnings {
                    warn!("cannot write {}: {}", path.display(), err);
                }
            }
        }
    }
}
