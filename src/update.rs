//! Self-update of a tool installed from a Go module proxy.
//!
//! The proxy protocol is the `GOPROXY` one: `GET {proxy}/{module}/@v/list` returns
//! one version per line.

use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::error::{Error, Result};
use crate::executor::Executor;

pub const DEFAULT_PROXY: &str = "https://proxy.golang.org";

/// Outcome of [`AutoUpdater::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate { version: String },
    /// The tool was missing and has been installed.
    Installed { version: String },
    Updated { from: String, to: String },
}

fn parse_version(raw: &str) -> Option<semver::Version> {
    semver::Version::parse(raw.strip_prefix('v').unwrap_or(raw)).ok()
}

/// Picks the highest semantic version from a newline-separated listing.
/// Lines that are not valid versions are ignored.
pub fn latest_version(package: &str, listing: &str) -> Result<String> {
    listing
        .lines()
        .map(str::trim)
        .filter_map(|raw| parse_version(raw).map(|version| (version, raw)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.to_string())
        .ok_or_else(|| Error::NoVersionFound {
            package: package.to_string(),
        })
}

/// Escapes a module path for proxy URLs: every upper-case letter becomes `!` followed
/// by its lower-case form.
pub fn escape_module_path(package: &str) -> String {
    let mut escaped = String::with_capacity(package.len());
    for c in package.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Version listing URL of `package` on `proxy`.
pub fn listing_url(proxy: &str, package: &str) -> Result<Url> {
    let raw = format!(
        "{}/{}/@v/list",
        proxy.trim_end_matches('/'),
        escape_module_path(package)
    );
    Url::parse(&raw).map_err(|e| Error::ConfigError(format!("invalid proxy URL '{raw}': {e}")))
}

fn fetch(client: &Client, url: &Url) -> Result<String> {
    let http_error = |message: String| Error::Http {
        url: url.to_string(),
        message,
    };

    let response = client.get(url.clone()).send().map_err(|e| http_error(e.to_string()))?;
    if response.status() != StatusCode::OK {
        return Err(http_error(format!("unexpected status {}", response.status())));
    }
    let body = response.text().map_err(|e| http_error(e.to_string()))?;
    if body.trim().is_empty() {
        return Err(Error::EmptyResponse {
            url: url.to_string(),
        });
    }
    Ok(body)
}

/// Queries each proxy in order and returns the first non-empty version listing.
///
/// # Errors
/// The error of the last proxy tried, or `Error::NoVersionFound` when `proxies` is empty.
pub fn fetch_version_listing(
    client: &Client,
    proxies: &[String],
    package: &str,
) -> Result<String> {
    let mut last_error = None;
    for proxy in proxies {
        let url = listing_url(proxy, package)?;
        match fetch(client, &url) {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!("Version lookup failed on {proxy}: {e}");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| Error::NoVersionFound {
        package: package.to_string(),
    }))
}

/// Keeps an installed tool at the latest version published for its module.
pub struct AutoUpdater {
    package: String,
    proxies: Vec<String>,
    executor: Executor,
    client: Client,
}

impl AutoUpdater {
    pub fn new(package: impl Into<String>, executor: Executor) -> Self {
        Self {
            package: package.into(),
            proxies: vec![DEFAULT_PROXY.to_string()],
            executor,
            client: Client::new(),
        }
    }

    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Binary name: the last segment of the module path.
    pub fn tool_name(&self) -> &str {
        self.package.rsplit('/').next().unwrap_or(&self.package)
    }

    pub fn latest(&self) -> Result<String> {
        let listing = fetch_version_listing(&self.client, &self.proxies, &self.package)?;
        latest_version(&self.package, &listing)
    }

    /// Installs the tool when missing, reinstalls it when the version it reports
    /// differs from the latest published one.
    pub fn run(&self) -> Result<UpdateStatus> {
        let tool = self.tool_name();
        if self.executor.exec(tool).is_err() {
            info!("{} not found, installing it", self.package);
            let latest = self.latest()?;
            self.install(&latest)?;
            return Ok(UpdateStatus::Installed { version: latest });
        }

        let current = self.executor.exec(&format!("{tool} version"))?.replace('\n', "");
        let current = current.trim().to_string();
        let latest = self.latest()?;
        if latest == current {
            info!("{} is up to date ({})", self.package, current);
            return Ok(UpdateStatus::UpToDate { version: current });
        }

        let shown = if parse_version(&current).is_some() { current.as_str() } else { "Unknown" };
        info!("Updating {} from {} to {}", self.package, shown, latest);
        self.install(&latest)?;
        Ok(UpdateStatus::Updated {
            from: current,
            to: latest,
        })
    }

    fn install(&self, version: &str) -> Result<()> {
        let command = format!("go install {}@{}", self.package, version);
        info!("Executing {command}");
        self.executor.exec(&command).map(|_| ())
    }
}
