// src/registry/mod.rs

//! crates.io client and download cache
//!
//! Streaming downloads with progress reporting, and a cache object with
//! an injectable storage root so nothing here touches global state.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default crates.io API root
pub const DEFAULT_API_URL: &str = "https://crates.io/api/v1/";

/// Timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    num: String,
}

/// HTTP client for the crates.io API
pub struct RegistryClient {
    client: Client,
    api_url: String,
    max_retries: u32,
}

impl RegistryClient {
    /// Create a client against the default crates.io API
    pub fn new() -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Create a client against a custom API root (mirrors, tests)
    pub fn with_api_url(api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("rust2rpm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api_url = if api_url.ends_with('/') {
            api_url.to_string()
        } else {
            format!("{api_url}/")
        };
        Ok(Self {
            client,
            api_url,
            max_retries: MAX_RETRIES,
        })
    }

    /// Look up the most recently published version of a crate
    pub fn latest_version(&self, name: &str) -> Result<String> {
        let url = format!("{}crates/{}/versions", self.api_url, name);
        info!("Fetching version list from {}", url);

        let response = self.get_with_retry(&url)?;
        let versions: VersionsResponse = response.json()?;
        versions
            .versions
            .first()
            .map(|v| v.num.clone())
            .ok_or_else(|| Error::Registry(format!("no published versions for crate '{name}'")))
    }

    /// Download a .crate archive to `dest`, streaming with a progress bar
    pub fn download_crate(&self, name: &str, version: &str, dest: &Path) -> Result<()> {
        let url = format!("{}crates/{}/{}/download", self.api_url, name, version);
        info!("Downloading {} v{} from {}", name, version, url);

        let mut response = self.get_with_retry(&url)?;
        let total = response.content_length().unwrap_or(0);

        let progress = if total > 0 {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.set_message(format!("{name}-{version}.crate"));
            Some(pb)
        } else {
            None
        };

        let mut file = File::create(dest)?;
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        let mut downloaded: u64 = 0;
        loop {
            let bytes_read = response.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;
            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }
        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }
        debug!("Downloaded {} bytes to {}", downloaded, dest.display());
        Ok(())
    }

    fn get_with_retry(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => match response.error_for_status() {
                    Ok(response) => return Ok(response),
                    Err(e) => {
                        // Client errors (404 etc.) are not transient
                        if e.status().is_some_and(|s| s.is_client_error())
                            || attempt >= self.max_retries
                        {
                            return Err(e.into());
                        }
                        warn!("Request to {} failed (attempt {}): {}", url, attempt, e);
                    }
                },
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(e.into());
                    }
                    warn!("Request to {} failed (attempt {}): {}", url, attempt, e);
                }
            }
            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)));
        }
    }
}

/// On-disk cache of downloaded .crate archives
///
/// Keyed by `<name>-<version>.crate` under an injectable storage root.
/// There is no eviction; .crate files for a published version never
/// change.
pub struct CrateCache {
    root: PathBuf,
}

impl CrateCache {
    /// Cache rooted at an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache under the user cache directory (`~/.cache/rust2rpm`)
    pub fn default_location() -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::Environment("cannot determine user cache directory".into()))?;
        Ok(Self::new(base.join("rust2rpm")))
    }

    /// Path a given crate archive would be cached at
    pub fn crate_path(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(format!("{name}-{version}.crate"))
    }

    /// Return the cached archive, downloading it on a miss
    pub fn fetch(&self, client: &RegistryClient, name: &str, version: &str) -> Result<PathBuf> {
        let path = self.crate_path(name, version);
        if path.is_file() {
            debug!("Cache hit: {}", path.display());
            return Ok(path);
        }

        fs::create_dir_all(&self.root)?;
        // Download to a temp name first so an interrupted transfer never
        // leaves a truncated archive behind
        let partial = path.with_extension("crate.part");
        if let Err(e) = client.download_crate(name, version, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, &path)?;
        Ok(path)
    }
}
