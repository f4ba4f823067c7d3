//! `postmirror image` – mirror post pages.

use anyhow::{Context, Result};
use postmirror_core::config::MirrorConfig;
use postmirror_core::{Mirror, MirrorEvent};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use crate::cli::output;

/// Some page or image failed; everything else completed.
pub const EXIT_PARTIAL: i32 = 2;

pub fn run_image(cfg: &MirrorConfig, urls: &[String], directory: &Path, json: bool) -> Result<i32> {
    let mirror = Mirror::from_config(cfg).context("invalid [selectors] in config")?;

    let summary = if json {
        // stdout carries only the JSON document.
        mirror.run(urls, directory, None)?
    } else {
        let (tx, rx) = mpsc::channel::<MirrorEvent>();
        let printer = thread::spawn(move || {
            for event in rx {
                if let Some(line) = output::format_event(&event) {
                    println!("{}", line);
                }
            }
        });
        let result = mirror.run(urls, directory, Some(tx));
        if printer.join().is_err() {
            tracing::warn!("progress printer panicked");
        }
        result?
    };

    if json {
        println!("{}", output::summary_json(&summary)?);
    } else {
        print!("{}", output::format_summary(&summary));
    }

    Ok(if summary.is_clean() { 0 } else { EXIT_PARTIAL })
}
