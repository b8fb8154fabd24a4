use anyhow::{Context, Result};
use fantoccini::{elements::Element, Client, Locator};
use glean_common::Pacer;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

const TAB_KEY: &str = "\u{E004}";

/// Page wrapper with the small set of DOM helpers the publisher relies on.
#[derive(Clone)]
pub struct GleanPage {
    pub(crate) client: Client,
    pacer: Pacer,
}

impl GleanPage {
    pub fn new(client: Client, pacer: Pacer) -> Self {
        Self { client, pacer }
    }

    /// Navigate to `url` after a short randomized pause.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.pacer.pause().await;
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh().await?;
        Ok(())
    }

    /// Poll `document.readyState` until it is `complete` or `timeout` passes.
    /// Returns whether the page became ready.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self
                .client
                .execute("return document.readyState", vec![])
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(Duration::from_millis(250)).await;
        }
    }

    /// Wait up to `timeout` for a CSS selector. `None` when it never appears.
    pub async fn wait_for_css(&self, selector: &str, timeout: Duration) -> Option<Element> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .ok()
    }

    /// Wait up to `timeout` for an XPath expression.
    pub async fn wait_for_xpath(&self, xpath: &str, timeout: Duration) -> Option<Element> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::XPath(xpath))
            .await
            .ok()
    }

    /// First element matching `selector`, without waiting.
    pub async fn find_css(&self, selector: &str) -> Result<Option<Element>> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(el) => Ok(Some(el)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether any element whose whole text equals `text` is currently displayed.
    pub async fn text_visible(&self, text: &str) -> Result<bool> {
        let xpath = text_xpath(text);
        let elements = self.client.find_all(Locator::XPath(&xpath)).await?;
        for el in elements {
            if el.is_displayed().await.unwrap_or(false) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn any_text_visible(&self, texts: &[&str]) -> Result<bool> {
        for text in texts {
            if self.text_visible(text).await? {
                debug!(target: "browser.page", text = %text, "text visible");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Click `element` and type `text` into it.
    pub async fn fill(&self, element: &Element, text: &str) -> Result<()> {
        element.click().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    /// Press Tab on the focused element, then type into whatever takes focus.
    pub async fn tab_and_type(&self, text: &str) -> Result<()> {
        let focused = self.client.active_element().await?;
        focused.send_keys(TAB_KEY).await?;
        self.pacer.pause().await;
        let next = self.client.active_element().await?;
        next.send_keys(text).await?;
        Ok(())
    }

    /// Save a PNG of the viewport to `path`.
    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        let png = self.client.screenshot().await?;
        std::fs::write(path, png)
            .with_context(|| format!("writing screenshot {}", path.display()))?;
        Ok(())
    }
}

/// XPath matching elements whose whitespace-normalized text is exactly
/// `text`. Handles quotes by splitting on `'` and joining with `concat()`.
fn text_xpath(text: &str) -> String {
    let literal = if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    };
    format!("//*[normalize-space(.)={literal}]")
}

#[cfg(test)]
mod tests {
    use super::text_xpath;

    #[test]
    fn xpath_for_plain_text() {
        assert_eq!(
            text_xpath("ログイン"),
            "//*[normalize-space(.)='ログイン']"
        );
    }

    #[test]
    fn xpath_requires_whole_text_match() {
        // A link such as ログイン履歴 must not count as the login prompt.
        let xpath = text_xpath("ログイン");
        assert!(!xpath.contains("contains("));
        assert!(xpath.ends_with("='ログイン']"));
    }

    #[test]
    fn xpath_escapes_quotes() {
        assert_eq!(
            text_xpath("it's"),
            "//*[normalize-space(.)=\"it's\"]"
        );
        assert_eq!(
            text_xpath(r#"a'b"c"#),
            r#"//*[normalize-space(.)=concat('a', "'", 'b"c')]"#
        );
    }
}
