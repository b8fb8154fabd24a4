use serde_json::{json, Map, Value};
use std::fmt;
use std::path::PathBuf;
use webdriver::capabilities::Capabilities;

/// Which browser binary chromedriver should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserChannel {
    /// An explicitly configured Chrome installation.
    Preferred(PathBuf),
    /// Whatever browser the driver discovers on its own.
    Bundled,
}

impl fmt::Display for BrowserChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserChannel::Preferred(path) => write!(f, "preferred ({})", path.display()),
            BrowserChannel::Bundled => f.write_str("bundled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub viewport: (u32, u32),
    /// Persistent profile directory; `None` starts from a clean profile.
    pub profile_dir: Option<PathBuf>,
    pub chrome_binary: Option<PathBuf>,
    pub lang: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            viewport: (1280, 800),
            profile_dir: None,
            chrome_binary: None,
            lang: "ja-JP".into(),
        }
    }
}

impl LaunchOptions {
    /// Channels to try, in order.
    pub fn channels(&self) -> Vec<BrowserChannel> {
        match &self.chrome_binary {
            Some(bin) => vec![BrowserChannel::Preferred(bin.clone()), BrowserChannel::Bundled],
            None => vec![BrowserChannel::Bundled],
        }
    }

    pub fn chrome_arguments(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--no-sandbox".to_string(),
            format!("--window-size={},{}", self.viewport.0, self.viewport.1),
            format!("--lang={}", self.lang),
        ];
        if let Some(dir) = &self.profile_dir {
            args.push(format!("--user-data-dir={}", dir.display()));
        }
        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        args
    }

    pub fn capabilities(&self, channel: &BrowserChannel) -> Capabilities {
        let mut chrome_opts = Map::new();
        chrome_opts.insert("args".to_string(), json!(self.chrome_arguments()));
        chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));
        if let BrowserChannel::Preferred(bin) = channel {
            chrome_opts.insert("binary".to_string(), json!(bin.display().to_string()));
        }

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome_opts));
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_profile_arguments() {
        let opts = LaunchOptions {
            headless: true,
            profile_dir: Some(PathBuf::from("/tmp/profile")),
            ..Default::default()
        };
        let args = opts.chrome_arguments();
        assert!(args.contains(&"--window-size=1280,800".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
    }

    #[test]
    fn headed_session_has_no_headless_flag() {
        let args = LaunchOptions::default().chrome_arguments();
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(!args.iter().any(|a| a.starts_with("--user-data-dir")));
    }

    #[test]
    fn preferred_channel_sets_binary_and_falls_back_to_bundled() {
        let opts = LaunchOptions {
            chrome_binary: Some(PathBuf::from("/opt/google/chrome/chrome")),
            ..Default::default()
        };
        let channels = opts.channels();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1], BrowserChannel::Bundled);

        let caps = opts.capabilities(&channels[0]);
        assert_eq!(
            caps["goog:chromeOptions"]["binary"],
            json!("/opt/google/chrome/chrome")
        );
        let bundled = opts.capabilities(&BrowserChannel::Bundled);
        assert!(bundled["goog:chromeOptions"].get("binary").is_none());
    }

    #[test]
    fn without_binary_only_bundled_is_tried() {
        assert_eq!(LaunchOptions::default().channels(), vec![BrowserChannel::Bundled]);
    }
}
