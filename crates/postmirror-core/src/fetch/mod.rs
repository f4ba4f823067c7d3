//! Blocking HTTP GET via libcurl.
//!
//! Every call builds its own `Easy` handle, so a `PageFetcher` can be cloned
//! into worker threads and used concurrently with distinct arguments. Call
//! sites run on OS worker threads; nothing here suspends cooperatively.

mod charset;
mod status;
mod transport;

use crate::config::MirrorConfig;
use crate::error::{ErrorKind, FetchError};
use crate::units::format_bytes_iec;
use scraper::Html;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

pub use status::is_success;
use transport::unreachable;

/// Per-request transport settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&MirrorConfig::default())
    }
}

impl FetchOptions {
    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
            headers: cfg.headers.clone(),
        }
    }
}

/// Issues GET requests and exposes the body as bytes, a document, or a file.
#[derive(Debug, Clone, Default)]
pub struct PageFetcher {
    options: FetchOptions,
}

impl PageFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    /// GET `url` and return the whole body. Non-2xx is `BadStatus`.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_typed(url).map(|(body, _)| body)
    }

    /// GET `url` and parse the body as an HTML document, decoded with the
    /// charset the response declares.
    pub fn fetch_document(&self, url: &str) -> Result<Html, FetchError> {
        let (body, content_type) = self.fetch_typed(url)?;
        parse_html(url, &body, content_type.as_deref())
    }

    /// Body plus the final response's `Content-Type`, if any.
    fn fetch_typed(&self, url: &str) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let mut easy = self.easy_for(url)?;
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(|e| unreachable(url, &e))?;
            transfer.perform().map_err(|e| unreachable(url, &e))?;
        }
        let code = easy.response_code().map_err(|e| unreachable(url, &e))?;
        if !is_success(code) {
            return Err(FetchError::new(
                ErrorKind::BadStatus(code),
                url,
                format!("GET returned HTTP {}", code),
            ));
        }
        let content_type = easy
            .content_type()
            .map_err(|e| unreachable(url, &e))?
            .map(str::to_string);
        tracing::debug!(url, bytes = body.len(), content_type = ?content_type, "fetched");
        Ok((body, content_type))
    }

    /// GET `url` and stream the body into `dest`, truncating any prior content.
    /// Returns the number of bytes written.
    ///
    /// The file is only created once a 2xx status has been seen, so an error
    /// response never leaves a file behind. A transfer that fails mid-stream
    /// can leave a partial file at `dest`.
    pub fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut easy = self.easy_for(url)?;
        let last_status = Cell::new(0u32);
        let mut sink: Option<File> = None;
        let mut written = 0u64;
        let mut io_error: Option<std::io::Error> = None;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|line| {
                    if let Some(code) = status::parse_status_line(line) {
                        last_status.set(code);
                    }
                    true
                })
                .map_err(|e| unreachable(url, &e))?;
            transfer
                .write_function(|data| {
                    // Body of an error response is read and dropped.
                    if !is_success(last_status.get()) {
                        return Ok(data.len());
                    }
                    if sink.is_none() {
                        match File::create(dest) {
                            Ok(f) => sink = Some(f),
                            Err(e) => {
                                io_error = Some(e);
                                return Ok(0);
                            }
                        }
                    }
                    let Some(file) = sink.as_mut() else {
                        return Ok(0);
                    };
                    match file.write_all(data) {
                        Ok(()) => {
                            written += data.len() as u64;
                            Ok(data.len())
                        }
                        Err(e) => {
                            io_error = Some(e);
                            Ok(0) // abort transfer
                        }
                    }
                })
                .map_err(|e| unreachable(url, &e))?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if e.is_write_error() {
                if let Some(io_err) = io_error.take() {
                    return Err(io_failed(url, dest, &io_err));
                }
            }
            return Err(unreachable(url, &e));
        }

        let code = easy.response_code().map_err(|e| unreachable(url, &e))?;
        if !is_success(code) {
            return Err(FetchError::new(
                ErrorKind::BadStatus(code),
                url,
                format!("GET returned HTTP {}", code),
            ));
        }

        match sink {
            Some(mut file) => file.flush().map_err(|e| io_failed(url, dest, &e))?,
            // 2xx with an empty body: still leave a file so the resource counts as present.
            None => {
                File::create(dest).map_err(|e| io_failed(url, dest, &e))?;
            }
        }

        tracing::debug!(
            url,
            dest = %dest.display(),
            "saved {}",
            format_bytes_iec(written)
        );
        Ok(written)
    }

    fn easy_for(&self, url: &str) -> Result<curl::easy::Easy, FetchError> {
        let mut easy = curl::easy::Easy::new();
        configure(&mut easy, url, &self.options).map_err(|e| unreachable(url, &e))?;
        Ok(easy)
    }
}

fn configure(
    easy: &mut curl::easy::Easy,
    url: &str,
    opts: &FetchOptions,
) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    if let Some(agent) = &opts.user_agent {
        easy.useragent(agent)?;
    }
    if !opts.headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in &opts.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }
    Ok(())
}

/// Decode `body` in the charset declared by `content_type` or a `<meta>`
/// tag (UTF-8 when neither names one) and hand it to the HTML reader.
pub fn parse_html(url: &str, body: &[u8], content_type: Option<&str>) -> Result<Html, FetchError> {
    let text = charset::decode(body, content_type)
        .map_err(|reason| FetchError::new(ErrorKind::ParseFailed, url, reason))?;
    Ok(Html::parse_document(&text))
}

fn io_failed(url: &str, dest: &Path, e: &std::io::Error) -> FetchError {
    FetchError::new(ErrorKind::IoFailed, url, format!("{}: {}", dest.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_html_rejects_invalid_utf8() {
        let err = parse_html("http://x/", &[b'<', 0xff, 0xfe], None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailed);
        assert_eq!(err.url, "http://x/");
        assert!(err.detail.contains("UTF-8"));
    }

    #[test]
    fn parse_html_honours_declared_charset() {
        let (bytes, _, _) = encoding_rs::GBK.encode("<div class=\"main\"><h1>旅行</h1></div>");
        let doc = parse_html("http://x/", &bytes, Some("text/html; charset=gbk")).unwrap();
        let sel = scraper::Selector::parse(".main h1").unwrap();
        let heading: String = doc.select(&sel).flat_map(|h| h.text()).collect();
        assert_eq!(heading, "旅行");
    }

    #[test]
    fn parse_html_accepts_fragments() {
        let doc = parse_html("http://x/", b"<div class=\"main\"><h1>t</h1>", None).unwrap();
        let sel = scraper::Selector::parse(".main h1").unwrap();
        assert_eq!(doc.select(&sel).count(), 1);
    }

    #[test]
    fn options_follow_config() {
        let mut cfg = MirrorConfig::default();
        cfg.connect_timeout_secs = 3;
        cfg.user_agent = Some("ua".to_string());
        let opts = FetchOptions::from_config(&cfg);
        assert_eq!(opts.connect_timeout, Duration::from_secs(3));
        assert_eq!(opts.user_agent.as_deref(), Some("ua"));
        assert_eq!(opts.max_redirections, 10);
    }

    #[test]
    fn invalid_url_is_unreachable() {
        let fetcher = PageFetcher::default();
        let err = fetcher.fetch("http://[::1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unreachable);
    }
}
