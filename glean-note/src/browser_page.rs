use crate::composer::{ComposerPage, Locate};
use async_trait::async_trait;
use glean_drivers::GleanPage;
use std::path::Path;
use std::time::Duration;

#[async_trait]
impl ComposerPage for GleanPage {
    async fn open(&self, url: &str) -> anyhow::Result<()> {
        self.goto(url).await
    }

    async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<bool> {
        GleanPage::wait_ready(self, timeout).await
    }

    async fn any_text_visible(&self, texts: &[&str]) -> anyhow::Result<bool> {
        GleanPage::any_text_visible(self, texts).await
    }

    async fn wait_for(&self, target: Locate<'_>, timeout: Duration) -> anyhow::Result<bool> {
        let found = match target {
            Locate::Css(sel) => self.wait_for_css(sel, timeout).await,
            Locate::XPath(xp) => self.wait_for_xpath(xp, timeout).await,
        };
        Ok(found.is_some())
    }

    async fn reload(&self) -> anyhow::Result<()> {
        self.refresh().await
    }

    async fn fill(&self, selector: &str, text: &str) -> anyhow::Result<bool> {
        match self.find_css(selector).await? {
            Some(el) => {
                GleanPage::fill(self, &el, text).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn tab_and_type(&self, text: &str) -> anyhow::Result<()> {
        GleanPage::tab_and_type(self, text).await
    }

    async fn screenshot(&self, path: &Path) -> anyhow::Result<()> {
        GleanPage::screenshot(self, path).await
    }
}
