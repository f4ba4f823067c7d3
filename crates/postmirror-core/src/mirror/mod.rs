//! Fetch, parse, download pipeline over many source pages.
//!
//! Pages run on a bounded page pool; each page then runs its resources on its
//! own bounded resource pool. Each pool reports to a single consumer: the page
//! worker owns its `PageResult`, the calling thread owns the `RunSummary`.

mod events;
mod pool;

pub use events::{MirrorEvent, PageStage, ResourceStage};
pub use pool::PoolError;

use crate::config::MirrorConfig;
use crate::error::{FetchError, PageError};
use crate::fetch::{FetchOptions, PageFetcher};
use crate::parser::{PostParser, SelectorError};
use crate::paths::{page_dir, resolve_resource_url, resource_filename};
use crate::types::{PageDescriptor, PageFailure, PageResult, ResourceOutcome, ResourceReport, RunSummary};
use anyhow::{Context, Result};
use events::EventSink;
use pool::run_bounded;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// One planned download: slot index, resolved URL, destination file.
type Slot = (usize, String, PathBuf);

/// Pipeline handle. Cheap to clone; clones share the compiled selectors.
#[derive(Debug, Clone)]
pub struct Mirror {
    fetcher: PageFetcher,
    parser: Arc<PostParser>,
    page_workers: usize,
    resource_workers: usize,
}

impl Mirror {
    pub fn new(
        fetcher: PageFetcher,
        parser: PostParser,
        page_workers: usize,
        resource_workers: usize,
    ) -> Self {
        Self {
            fetcher,
            parser: Arc::new(parser),
            page_workers: page_workers.max(1),
            resource_workers: resource_workers.max(1),
        }
    }

    /// Build from config. Fails only on an invalid selector, before any network work.
    pub fn from_config(cfg: &MirrorConfig) -> Result<Self, SelectorError> {
        Ok(Self::new(
            PageFetcher::new(FetchOptions::from_config(cfg)),
            PostParser::new(&cfg.selectors)?,
            cfg.page_workers,
            cfg.resource_workers,
        ))
    }

    pub fn page_workers(&self) -> usize {
        self.page_workers
    }

    pub fn resource_workers(&self) -> usize {
        self.resource_workers
    }

    /// Fetch and parse one page. Resource URLs come back resolved against `source_url`.
    pub fn describe(&self, source_url: &str) -> Result<PageDescriptor, PageError> {
        let doc = self.fetcher.fetch_document(source_url)?;
        let mut descriptor = self.parser.parse(&doc)?;
        for url in &mut descriptor.resource_urls {
            *url = resolve_resource_url(source_url, url);
        }
        Ok(descriptor)
    }

    /// Mirror every page in `sources` under `directory`.
    ///
    /// Per-page and per-resource failures land in the summary. `Err` means the
    /// run itself failed: the root directory could not be created, or a page
    /// worker died.
    ///
    /// A source URL repeated in `sources` is processed once, under the index of
    /// its first occurrence. Distinct pages that resolve to the same
    /// classification and title still share a directory and may race on the
    /// same `[NN]` file.
    pub fn run(
        &self,
        sources: &[String],
        directory: &Path,
        events: Option<Sender<MirrorEvent>>,
    ) -> Result<RunSummary> {
        fs::create_dir_all(directory)
            .with_context(|| format!("create destination {}", directory.display()))?;
        tracing::info!(
            pages = sources.len(),
            page_workers = self.page_workers,
            resource_workers = self.resource_workers,
            "mirroring into {}",
            directory.display()
        );

        let sink = EventSink::new(events);
        let mut seen = HashSet::new();
        let items: Vec<(usize, String)> = sources
            .iter()
            .enumerate()
            .filter(|&(index, url)| {
                let first = seen.insert(url.as_str());
                if !first {
                    tracing::debug!(index, url = %url, "duplicate source URL, already queued");
                }
                first
            })
            .map(|(index, url)| (index, url.clone()))
            .collect();
        let worker = self.clone();
        let root = directory.to_path_buf();
        let mut outcomes: Vec<(usize, Result<PageResult, PageFailure>)> =
            Vec::with_capacity(items.len());

        run_bounded(
            items,
            self.page_workers,
            move |(index, source_url): (usize, String)| {
                let outcome = worker.mirror_page(index, &source_url, &root, &sink);
                (index, outcome)
            },
            |outcome| outcomes.push(outcome),
        )
        .context("page worker pool")?;

        outcomes.sort_by_key(|(index, _)| *index);
        let mut summary = RunSummary::default();
        for (_, outcome) in outcomes {
            match outcome {
                Ok(page) => summary.pages.push(page),
                Err(failure) => summary.failures.push(failure),
            }
        }
        let t = summary.totals();
        tracing::info!(
            pages_ok = t.pages_ok,
            pages_failed = t.pages_failed,
            succeeded = t.succeeded,
            failed = t.failed,
            skipped = t.skipped,
            bytes = t.bytes,
            "run finished"
        );
        Ok(summary)
    }

    fn mirror_page(
        &self,
        index: usize,
        source_url: &str,
        root: &Path,
        sink: &EventSink,
    ) -> Result<PageResult, PageFailure> {
        let fail = |error: PageError| {
            tracing::warn!(source_url, "page failed: {}", error);
            sink.page(index, source_url, failure_stage(&error));
            PageFailure {
                index,
                source_url: source_url.to_string(),
                error,
            }
        };

        sink.page(index, source_url, PageStage::Fetching);
        let descriptor = self.describe(source_url).map_err(fail)?;
        sink.page(
            index,
            source_url,
            PageStage::Parsed {
                classification: descriptor.classification.clone(),
                title: descriptor.title.clone(),
                published_at: descriptor.published_at.clone(),
                resources: descriptor.resource_urls.len(),
            },
        );

        let dir = page_dir(root, &descriptor);
        fs::create_dir_all(&dir).map_err(|e| {
            fail(PageError::CreateDir {
                path: dir.clone(),
                detail: e.to_string(),
            })
        })?;
        sink.page(index, source_url, PageStage::Downloading { dir: dir.clone() });

        let plan: Vec<Slot> = descriptor
            .resource_urls
            .iter()
            .enumerate()
            .map(|(i, url)| (i, url.clone(), dir.join(resource_filename(i, url))))
            .collect();

        let fetcher = self.fetcher.clone();
        let resource_sink = sink.clone();
        let page_url = source_url.to_string();
        let resources = download_all(plan, self.resource_workers, move |(i, url, path)| {
            let outcome = download_resource(&fetcher, &url, &path, |stage| {
                resource_sink.resource(&page_url, i, &url, stage)
            });
            ResourceReport {
                index: i,
                url,
                path,
                outcome,
            }
        })
        .map_err(fail)?;

        let page = PageResult {
            source_url: source_url.to_string(),
            descriptor,
            directory: dir,
            resources,
        };
        let (succeeded, failed, skipped) = (
            page.succeeded().len(),
            page.failed().len(),
            page.skipped().len(),
        );
        tracing::info!(
            source_url,
            succeeded,
            failed,
            skipped,
            "page done: {}",
            page.directory.display()
        );
        sink.page(
            index,
            source_url,
            PageStage::Completed {
                succeeded,
                failed,
                skipped,
            },
        );
        Ok(page)
    }
}

/// Run `task` over every planned slot on a bounded pool. Reports come back
/// sorted by index; a panicked worker fails the whole page.
fn download_all<F>(plan: Vec<Slot>, workers: usize, task: F) -> Result<Vec<ResourceReport>, PageError>
where
    F: Fn(Slot) -> ResourceReport + Send + Sync + 'static,
{
    let mut resources = Vec::with_capacity(plan.len());
    run_bounded(plan, workers, task, |report| resources.push(report))
        .map_err(|e| PageError::WorkerPanicked { lost: e.lost() })?;
    resources.sort_by_key(|r| r.index);
    Ok(resources)
}

/// `FetchFailed` before a descriptor exists, `Failed` once the page was parsed.
fn failure_stage(error: &PageError) -> PageStage {
    let (kind, message) = (error.kind(), error.to_string());
    match error {
        PageError::Fetch(_) | PageError::Parse(_) => PageStage::FetchFailed { kind, message },
        PageError::CreateDir { .. } | PageError::WorkerPanicked { .. } => {
            PageStage::Failed { kind, message }
        }
    }
}

/// Download one resource unless something already exists at `path`.
///
/// Presence is the only check: an existing file is never re-fetched, even if
/// it is a partial leftover from an interrupted run.
fn download_resource(
    fetcher: &PageFetcher,
    url: &str,
    path: &Path,
    report: impl Fn(ResourceStage),
) -> ResourceOutcome {
    match fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Ok(_) => {
            tracing::debug!(url, path = %path.display(), "already downloaded");
            report(ResourceStage::Skipped);
            return ResourceOutcome::Skipped;
        }
        Err(e) => {
            // Unknown state (e.g. permission denied on the parent): leave it alone.
            tracing::warn!(url, path = %path.display(), "cannot stat destination: {}", e);
            report(ResourceStage::Skipped);
            return ResourceOutcome::Skipped;
        }
    }

    report(ResourceStage::Downloading);
    match fetcher.fetch_to_file(url, path) {
        Ok(bytes) => {
            report(ResourceStage::Succeeded { bytes });
            ResourceOutcome::Succeeded { bytes }
        }
        Err(error) => {
            tracing::warn!(url, "download failed: {}", error);
            report(failed_stage(&error));
            ResourceOutcome::Failed { error }
        }
    }
}

fn failed_stage(error: &FetchError) -> ResourceStage {
    ResourceStage::Failed {
        kind: error.kind,
        message: error.to_string(),
    }
}
