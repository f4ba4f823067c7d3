//! Page descriptors and the per-page / per-run result records.

use crate::error::{FetchError, PageError};
use serde::Serialize;
use std::path::PathBuf;

/// Metadata and ordered resource list parsed from one source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub classification: String,
    pub title: String,
    pub published_at: String,
    /// In document order, duplicates kept. Order only drives filenames.
    pub resource_urls: Vec<String>,
}

/// Terminal state of one resource slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceOutcome {
    /// A file was already present at the destination; nothing was fetched.
    Skipped,
    Succeeded { bytes: u64 },
    Failed { error: FetchError },
}

/// Outcome of one slot of `PageDescriptor::resource_urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    /// Zero-based position in `resource_urls`.
    pub index: usize,
    pub url: String,
    pub path: PathBuf,
    pub outcome: ResourceOutcome,
}

/// Result for one source page that fetched and parsed successfully.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub source_url: String,
    pub descriptor: PageDescriptor,
    pub directory: PathBuf,
    /// One report per resource slot, sorted by index.
    pub resources: Vec<ResourceReport>,
}

impl PageResult {
    fn urls_where(&self, pred: impl Fn(&ResourceOutcome) -> bool) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|r| pred(&r.outcome))
            .map(|r| r.url.as_str())
            .collect()
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.urls_where(|o| matches!(o, ResourceOutcome::Succeeded { .. }))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.urls_where(|o| matches!(o, ResourceOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.urls_where(|o| matches!(o, ResourceOutcome::Skipped))
    }

    pub fn bytes_written(&self) -> u64 {
        self.resources
            .iter()
            .map(|r| match r.outcome {
                ResourceOutcome::Succeeded { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// True when every slot of `resource_urls` has exactly one report.
    pub fn is_fully_accounted(&self) -> bool {
        self.resources.len() == self.descriptor.resource_urls.len()
            && self.resources.iter().enumerate().all(|(i, r)| r.index == i)
    }
}

/// A source page that produced no `PageResult`.
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    /// Position of the source URL in the run's input.
    pub index: usize,
    pub source_url: String,
    pub error: PageError,
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Everything one run produced, ordered by source input position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub pages: Vec<PageResult>,
    pub failures: Vec<PageFailure>,
}

impl RunSummary {
    pub fn totals(&self) -> Totals {
        let mut t = Totals {
            pages_ok: self.pages.len(),
            pages_failed: self.failures.len(),
            ..Totals::default()
        };
        for page in &self.pages {
            for r in &page.resources {
                match r.outcome {
                    ResourceOutcome::Skipped => t.skipped += 1,
                    ResourceOutcome::Succeeded { bytes } => {
                        t.succeeded += 1;
                        t.bytes += bytes;
                    }
                    ResourceOutcome::Failed { .. } => t.failed += 1,
                }
            }
        }
        t
    }

    /// No page and no resource failed.
    pub fn is_clean(&self) -> bool {
        let t = self.totals();
        t.pages_failed == 0 && t.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn report(index: usize, url: &str, outcome: ResourceOutcome) -> ResourceReport {
        ResourceReport {
            index,
            url: url.to_string(),
            path: PathBuf::from(format!("/tmp/{}", index)),
            outcome,
        }
    }

    fn sample_page() -> PageResult {
        let urls = vec![
            "http://x/a.jpg".to_string(),
            "http://x/a.jpg".to_string(),
            "http://x/b.jpg".to_string(),
        ];
        PageResult {
            source_url: "http://x/post".to_string(),
            descriptor: PageDescriptor {
                classification: "Travel".to_string(),
                title: "My Trip".to_string(),
                published_at: "2022-01-01".to_string(),
                resource_urls: urls,
            },
            directory: PathBuf::from("/tmp/Travel/My Trip"),
            resources: vec![
                report(0, "http://x/a.jpg", ResourceOutcome::Succeeded { bytes: 10 }),
                report(1, "http://x/a.jpg", ResourceOutcome::Skipped),
                report(
                    2,
                    "http://x/b.jpg",
                    ResourceOutcome::Failed {
                        error: FetchError::new(ErrorKind::BadStatus(404), "http://x/b.jpg", ""),
                    },
                ),
            ],
        }
    }

    #[test]
    fn views_partition_slots_including_duplicates() {
        let page = sample_page();
        assert_eq!(page.succeeded(), vec!["http://x/a.jpg"]);
        assert_eq!(page.skipped(), vec!["http://x/a.jpg"]);
        assert_eq!(page.failed(), vec!["http://x/b.jpg"]);
        assert_eq!(
            page.succeeded().len() + page.skipped().len() + page.failed().len(),
            page.descriptor.resource_urls.len()
        );
        assert!(page.is_fully_accounted());
        assert_eq!(page.bytes_written(), 10);
    }

    #[test]
    fn missing_slot_is_not_fully_accounted() {
        let mut page = sample_page();
        page.resources.remove(1);
        assert!(!page.is_fully_accounted());
    }

    #[test]
    fn totals_sum_pages_and_failures() {
        let summary = RunSummary {
            pages: vec![sample_page(), sample_page()],
            failures: vec![PageFailure {
                index: 2,
                source_url: "http://x/broken".to_string(),
                error: PageError::Fetch(FetchError::new(
                    ErrorKind::Unreachable,
                    "http://x/broken",
                    "could not connect",
                )),
            }],
        };
        let t = summary.totals();
        assert_eq!(t.pages_ok, 2);
        assert_eq!(t.pages_failed, 1);
        assert_eq!(t.succeeded, 2);
        assert_eq!(t.skipped, 2);
        assert_eq!(t.failed, 2);
        assert_eq!(t.bytes, 20);
        assert!(!summary.is_clean());
        assert!(RunSummary::default().is_clean());
    }

    #[test]
    fn outcome_serializes_with_state_tag() {
        let json = serde_json::to_value(ResourceOutcome::Succeeded { bytes: 3 }).unwrap();
        assert_eq!(json["state"], "succeeded");
        assert_eq!(json["bytes"], 3);
    }
}
