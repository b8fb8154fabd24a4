//! Session state files.
//!
//! The on-disk format matches Playwright's `storage_state`: a `cookies` array
//! plus an `origins` array, which stays empty here. Files written by other
//! tooling in that format load unchanged.
use anyhow::{Context, Result};
use fantoccini::cookies::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Unix seconds; `-1` for session cookies.
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

fn default_path() -> String {
    "/".into()
}

fn session_expiry() -> f64 {
    -1.0
}

fn default_same_site() -> String {
    "Lax".into()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub cookies: Vec<SessionCookie>,
    #[serde(default)]
    pub origins: Vec<Value>,
}

/// One cookie as exported by browser extensions such as EditThisCookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

/// Map extension `sameSite` spellings onto the values browsers accept.
pub fn normalize_same_site(raw: Option<&str>) -> &'static str {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("no_restriction") | Some("none") => "None",
        Some("strict") => "Strict",
        _ => "Lax",
    }
}

impl From<RawCookie> for SessionCookie {
    fn from(raw: RawCookie) -> Self {
        Self {
            same_site: normalize_same_site(raw.same_site.as_deref()).to_string(),
            name: raw.name,
            value: raw.value,
            domain: raw.domain,
            path: raw.path.unwrap_or_else(default_path),
            expires: raw.expiration_date.unwrap_or(-1.0),
            http_only: raw.http_only,
            secure: raw.secure,
        }
    }
}

impl SessionState {
    pub fn from_raw_cookies(raw: Vec<RawCookie>) -> Self {
        Self {
            cookies: raw.into_iter().map(SessionCookie::from).collect(),
            origins: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading session state {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing session state {}", path.display()))
    }

    /// Pretty-printed; non-ASCII stays as-is.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("writing session state {}", path.display()))?;
        Ok(())
    }
}

/// Read a raw cookie export from `input` and write session state to `output`.
/// Returns the number of cookies converted.
pub fn convert_cookie_file(input: &Path, output: &Path) -> Result<usize> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading cookie export {}", input.display()))?;
    let raw: Vec<RawCookie> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of cookies", input.display()))?;
    let state = SessionState::from_raw_cookies(raw);
    state.write(output)?;
    info!(
        event = "session.cookies.converted",
        input = %input.display(),
        output = %output.display(),
        count = state.cookies.len(),
        "converted cookie export"
    );
    Ok(state.cookies.len())
}

impl SessionCookie {
    /// WebDriver form. Expiry is left unset, so the cookie lives for the session.
    pub fn to_webdriver(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), self.value.clone());
        if !self.domain.is_empty() {
            cookie.set_domain(self.domain.clone());
        }
        cookie.set_path(self.path.clone());
        cookie.set_secure(self.secure);
        cookie.set_http_only(self.http_only);
        cookie
    }

    pub fn from_webdriver(cookie: &Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().unwrap_or_default().to_string(),
            path: cookie.path().unwrap_or("/").to_string(),
            expires: cookie
                .expires_datetime()
                .map(|t| t.unix_timestamp() as f64)
                .unwrap_or(-1.0),
            http_only: cookie.http_only().unwrap_or(false),
            secure: cookie.secure().unwrap_or(false),
            same_site: cookie
                .same_site()
                .map(|s| s.to_string())
                .unwrap_or_else(default_same_site),
        }
    }
}
