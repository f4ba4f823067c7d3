//! `postmirror inspect` – show a page's metadata and planned filenames without downloading.

use anyhow::{Context, Result};
use postmirror_core::config::MirrorConfig;
use postmirror_core::paths::{page_dir, resource_filename};
use postmirror_core::{Mirror, PageDescriptor};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct Inspection<'a> {
    source_url: &'a str,
    descriptor: &'a PageDescriptor,
    directory: PathBuf,
    files: &'a [String],
}

pub fn run_inspect(cfg: &MirrorConfig, url: &str, json: bool) -> Result<()> {
    let mirror = Mirror::from_config(cfg).context("invalid [selectors] in config")?;
    let descriptor = mirror
        .describe(url)
        .with_context(|| format!("inspect {}", url))?;
    let dir = page_dir(Path::new("."), &descriptor);
    let files: Vec<String> = descriptor
        .resource_urls
        .iter()
        .enumerate()
        .map(|(i, u)| resource_filename(i, u))
        .collect();

    if json {
        let doc = Inspection {
            source_url: url,
            descriptor: &descriptor,
            directory: dir,
            files: &files,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("classification: {}", descriptor.classification);
    println!("title:          {}", descriptor.title);
    println!("published at:   {}", descriptor.published_at);
    println!("directory:      {}", dir.display());
    println!("images:         {}", descriptor.resource_urls.len());
    for (file, u) in files.iter().zip(&descriptor.resource_urls) {
        println!("  {:<32} {}", file, u);
    }
    Ok(())
}
