//! Human-readable progress lines and the end-of-run summary.

use anyhow::Result;
use postmirror_core::units::format_bytes_iec;
use postmirror_core::{
    MirrorEvent, PageFailure, PageResult, PageStage, ResourceStage, RunSummary, Totals,
};
use serde::Serialize;

/// One progress line per event worth showing; `None` for the rest.
pub fn format_event(event: &MirrorEvent) -> Option<String> {
    match event {
        MirrorEvent::Page {
            index,
            source_url,
            stage,
        } => {
            let tag = format!("[page {}]", index + 1);
            let line = match stage {
                PageStage::Fetching => format!("{} fetching {}", tag, source_url),
                PageStage::FetchFailed { message, .. } => {
                    format!("{} failed {}: {}", tag, source_url, message)
                }
                PageStage::Failed { message, .. } => {
                    format!("{} aborted {}: {}", tag, source_url, message)
                }
                PageStage::Parsed {
                    classification,
                    title,
                    published_at,
                    resources,
                } => format!(
                    "{} {} / {} ({}), {} image(s)",
                    tag, classification, title, published_at, resources
                ),
                PageStage::Downloading { dir } => format!("{} saving to {}", tag, dir.display()),
                PageStage::Completed {
                    succeeded,
                    failed,
                    skipped,
                } => format!(
                    "{} done: {} downloaded, {} skipped, {} failed",
                    tag, succeeded, skipped, failed
                ),
            };
            Some(line)
        }
        MirrorEvent::Resource {
            source_url,
            index,
            url,
            stage,
        } => {
            let slot = format!("  {} [{:02}]", source_url, index + 1);
            match stage {
                ResourceStage::Downloading => None,
                ResourceStage::Skipped => Some(format!("{} already downloaded {}", slot, url)),
                ResourceStage::Succeeded { bytes } => Some(format!(
                    "{} saved {} ({})",
                    slot,
                    url,
                    format_bytes_iec(*bytes)
                )),
                ResourceStage::Failed { message, .. } => {
                    Some(format!("{} failed {}", slot, message))
                }
            }
        }
    }
}

/// Per-page table, page failures, then totals.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    if !summary.pages.is_empty() {
        out.push_str(&format!(
            "{:<6} {:<7} {:<6} {:<10} {}\n",
            "OK", "SKIPPED", "FAILED", "SIZE", "DIRECTORY"
        ));
        for page in &summary.pages {
            out.push_str(&format!(
                "{:<6} {:<7} {:<6} {:<10} {}\n",
                page.succeeded().len(),
                page.skipped().len(),
                page.failed().len(),
                format_bytes_iec(page.bytes_written()),
                page.directory.display()
            ));
        }
    }
    for failure in &summary.failures {
        out.push_str(&format!(
            "page failed: {}: {}\n",
            failure.source_url, failure.error
        ));
    }
    let t = summary.totals();
    out.push_str(&format!(
        "{} page(s) ok, {} failed; {} image(s) downloaded ({}), {} skipped, {} failed\n",
        t.pages_ok,
        t.pages_failed,
        t.succeeded,
        format_bytes_iec(t.bytes),
        t.skipped,
        t.failed
    ));
    out
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    pages: &'a [PageResult],
    failures: &'a [PageFailure],
    totals: Totals,
}

/// The summary plus its totals, pretty-printed.
pub fn summary_json(summary: &RunSummary) -> Result<String> {
    let doc = JsonSummary {
        pages: &summary.pages,
        failures: &summary.failures,
        totals: summary.totals(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
