//! Netscape `cookies.txt` jars, as exported by browser extensions.
//!
//! Lines are tab-separated: domain, include-subdomains flag, path, secure
//! flag, expiry, name, value. Only domain, expiry, name and value are kept.
//! `#HttpOnly_` prefixed domains are honoured; other `#` lines are comments.
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
struct JarCookie {
    domain: String,
    expires: i64,
    name: String,
    value: String,
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<JarCookie>,
}

impl CookieJar {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse jar text. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let cookies = text
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches('\r');
                let line = match line.strip_prefix("#HttpOnly_") {
                    Some(rest) => rest,
                    None if line.starts_with('#') || line.trim().is_empty() => return None,
                    None => line,
                };
                let fields: Vec<&str> = line.split('\t').collect();
                if fields.len() < 7 {
                    return None;
                }
                Some(JarCookie {
                    domain: fields[0].to_ascii_lowercase(),
                    expires: fields[4].parse().unwrap_or(0),
                    name: fields[5].to_string(),
                    value: fields[6].to_string(),
                })
            })
            .collect();
        Self { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `name=value; ...` for every live cookie matching `host`, or `None` when
    /// nothing matches.
    pub fn header_for(&self, host: &str) -> Option<String> {
        let host = host.to_ascii_lowercase();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| domain_matches(&c.domain, &host))
            .filter(|c| c.expires <= 0 || c.expires > now)
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let bare = cookie_domain.trim_start_matches('.');
    host == bare || host.ends_with(&format!(".{bare}"))
}
