use crate::browser::launch::{BrowserChannel, LaunchOptions};
use crate::browser::page::GleanPage;
use crate::session::{SessionCookie, SessionState};
use anyhow::{anyhow, Context, Result};
use fantoccini::{Client, ClientBuilder};
use glean_common::Pacer;
use tracing::{debug, info, warn};
use url::Url;

/// A live WebDriver session.
pub struct GleanDriver {
    client: Client,
    pacer: Pacer,
}

impl GleanDriver {
    /// Start a session on a specific channel.
    pub async fn launch(opts: &LaunchOptions, channel: BrowserChannel, pacer: Pacer) -> Result<Self> {
        let caps = opts.capabilities(&channel);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await
            .with_context(|| format!("starting {channel} browser via {}", opts.webdriver_url))?;
        info!(
            event = "browser.launch.ok",
            channel = %channel,
            headless = opts.headless,
            "browser session started"
        );
        Ok(Self { client, pacer })
    }

    /// Try the preferred channel first and fall back to the bundled browser once.
    pub async fn launch_with_fallback(opts: &LaunchOptions, pacer: Pacer) -> Result<Self> {
        let mut last_err = None;
        for channel in opts.channels() {
            match Self::launch(opts, channel.clone(), pacer).await {
                Ok(driver) => return Ok(driver),
                Err(e) => {
                    warn!(
                        event = "browser.launch.failed",
                        channel = %channel,
                        error = %e,
                        "browser launch failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no browser channel available")))
    }

    pub fn page(&self) -> GleanPage {
        GleanPage::new(self.client.clone(), self.pacer)
    }

    /// Navigate to `url` and return the page.
    pub async fn goto(&self, url: &str) -> Result<GleanPage> {
        let page = self.page();
        page.goto(url).await?;
        Ok(page)
    }

    /// Install stored cookies. WebDriver only accepts cookies for the current
    /// document's domain, so the site origin is opened first. Cookies the
    /// browser rejects are skipped. Returns how many were installed.
    pub async fn restore_session(&self, state: &SessionState, site_url: &str) -> Result<usize> {
        let origin = Url::parse(site_url).with_context(|| format!("invalid site url {site_url}"))?;
        self.client.goto(origin.as_str()).await?;

        let mut installed = 0;
        for cookie in &state.cookies {
            match self.client.add_cookie(cookie.to_webdriver()).await {
                Ok(()) => installed += 1,
                Err(e) => debug!(
                    target: "browser.session",
                    name = %cookie.name,
                    domain = %cookie.domain,
                    error = %e,
                    "cookie rejected"
                ),
            }
        }
        info!(
            event = "browser.session.restored",
            installed,
            total = state.cookies.len(),
            "session cookies installed"
        );
        Ok(installed)
    }

    /// Snapshot every cookie visible to the current page.
    pub async fn export_session(&self) -> Result<SessionState> {
        let cookies = self.client.get_all_cookies().await?;
        Ok(SessionState {
            cookies: cookies.iter().map(SessionCookie::from_webdriver).collect(),
            origins: Vec::new(),
        })
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
