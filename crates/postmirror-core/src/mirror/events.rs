//! Progress events emitted while a run is in flight.

use crate::error::ErrorKind;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// Page lifecycle: `Fetching -> {FetchFailed | Parsed -> [Downloading] -> (Completed | Failed)}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PageStage {
    Fetching,
    /// Fetch or parse failed; no descriptor exists.
    FetchFailed { kind: ErrorKind, message: String },
    Parsed {
        classification: String,
        title: String,
        published_at: String,
        resources: usize,
    },
    Downloading { dir: PathBuf },
    Completed {
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
    /// The page parsed but its directory could not be created, or a resource
    /// worker died.
    Failed { kind: ErrorKind, message: String },
}

/// Resource lifecycle: `{Skipped | Downloading -> (Succeeded | Failed)}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ResourceStage {
    Downloading,
    Skipped,
    Succeeded { bytes: u64 },
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MirrorEvent {
    Page {
        /// Position of `source_url` in the run's input.
        index: usize,
        source_url: String,
        #[serde(flatten)]
        stage: PageStage,
    },
    Resource {
        source_url: String,
        /// Zero-based slot in the page's resource list.
        index: usize,
        url: String,
        #[serde(flatten)]
        stage: ResourceStage,
    },
}

/// Optional event channel. Sending never fails the run: a dropped receiver
/// just stops progress output.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<Sender<MirrorEvent>>);

impl EventSink {
    pub(crate) fn new(tx: Option<Sender<MirrorEvent>>) -> Self {
        Self(tx)
    }

    pub(crate) fn page(&self, index: usize, source_url: &str, stage: PageStage) {
        self.emit(MirrorEvent::Page {
            index,
            source_url: source_url.to_string(),
            stage,
        });
    }

    pub(crate) fn resource(&self, source_url: &str, index: usize, url: &str, stage: ResourceStage) {
        self.emit(MirrorEvent::Resource {
            source_url: source_url.to_string(),
            index,
            url: url.to_string(),
            stage,
        });
    }

    fn emit(&self, event: MirrorEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}
