//! The draft-saving flow, written against a minimal page abstraction.
//!
//! Steps: open the site root and check the login state, open the composer
//! (reloading once if the title field does not show up), fill title and
//! body, then give the editor time to autosave.
use crate::content::DraftContent;
use crate::error::NoteError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Texts only shown to logged-out visitors.
pub const LOGGED_OUT_MARKERS: [&str; 2] = ["ログイン", "会員登録"];
pub const POST_BUTTON_XPATH: &str = "//button[contains(normalize-space(.), '投稿')]";
pub const TITLE_SELECTOR: &str = "textarea[placeholder='記事タイトル']";
pub const BODY_EDITOR_SELECTOR: &str = "div[contenteditable='true']";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locate<'a> {
    Css(&'a str),
    XPath(&'a str),
}

/// What the flow needs from a browser tab.
#[async_trait]
pub trait ComposerPage: Send + Sync {
    async fn open(&self, url: &str) -> anyhow::Result<()>;
    /// Whether the document finished loading within `timeout`.
    async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<bool>;
    async fn any_text_visible(&self, texts: &[&str]) -> anyhow::Result<bool>;
    /// Whether `target` appeared within `timeout`.
    async fn wait_for(&self, target: Locate<'_>, timeout: Duration) -> anyhow::Result<bool>;
    async fn reload(&self) -> anyhow::Result<()>;
    /// Click the first element matching `selector` and type `text`.
    /// `false` when nothing matches.
    async fn fill(&self, selector: &str, text: &str) -> anyhow::Result<bool>;
    /// Tab away from the focused element and type into the next one.
    async fn tab_and_type(&self, text: &str) -> anyhow::Result<()>;
    async fn screenshot(&self, path: &Path) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub site_url: String,
    pub headless: bool,
    pub ready_timeout: Duration,
    pub editor_timeout: Duration,
    pub login_timeout: Duration,
    pub autosave_wait: Duration,
    /// Headed runs keep the window open this long after saving.
    pub linger: Duration,
    pub screenshot_path: PathBuf,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            site_url: "https://note.com/".into(),
            headless: false,
            ready_timeout: Duration::from_secs(15),
            editor_timeout: Duration::from_secs(15),
            login_timeout: Duration::from_secs(180),
            autosave_wait: Duration::from_secs(5),
            linger: Duration::from_secs(10),
            screenshot_path: PathBuf::from("login_failed.png"),
        }
    }
}

impl PublishSettings {
    pub fn composer_url(&self) -> String {
        format!("{}/notes/new", self.site_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    ContentEditable,
    TabFromTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOutcome {
    pub body_strategy: BodyStrategy,
    pub reloaded: bool,
    pub images_skipped: usize,
    /// The operator had to log in by hand during this run.
    pub manual_login: bool,
}

/// Confirm the session is logged in. Headed runs give the operator
/// `login_timeout` to log in by hand; headless runs fail immediately after
/// saving a screenshot. Returns whether a manual login happened.
pub async fn ensure_logged_in<P>(page: &P, settings: &PublishSettings) -> Result<bool, NoteError>
where
    P: ComposerPage + ?Sized,
{
    page.open(&settings.site_url).await?;
    if !page.wait_ready(settings.ready_timeout).await? {
        warn!(event = "publish.page.slow", url = %settings.site_url, "site root still loading");
    }
    if !page.any_text_visible(&LOGGED_OUT_MARKERS).await? {
        info!(event = "publish.login.ok", "session is logged in");
        return Ok(false);
    }

    if settings.headless {
        page.screenshot(&settings.screenshot_path).await?;
        warn!(
            event = "publish.login.missing",
            screenshot = %settings.screenshot_path.display(),
            "logged out in headless mode"
        );
        return Err(NoteError::LoggedOut {
            screenshot: settings.screenshot_path.clone(),
        });
    }

    let secs = settings.login_timeout.as_secs();
    info!(
        event = "publish.login.prompt",
        timeout_secs = secs,
        "please log in to note in the browser window"
    );
    if page
        .wait_for(Locate::XPath(POST_BUTTON_XPATH), settings.login_timeout)
        .await?
    {
        info!(event = "publish.login.ok", manual = true, "login detected");
        Ok(true)
    } else {
        Err(NoteError::LoginTimeout(secs))
    }
}

/// Open the composer and type the draft. Assumes a logged-in session.
pub async fn compose<P>(
    page: &P,
    draft: &DraftContent,
    settings: &PublishSettings,
) -> Result<(BodyStrategy, bool), NoteError>
where
    P: ComposerPage + ?Sized,
{
    let url = settings.composer_url();
    page.open(&url).await?;

    let title = Locate::Css(TITLE_SELECTOR);
    let mut reloaded = false;
    if !page.wait_for(title, settings.editor_timeout).await? {
        warn!(event = "publish.editor.retry", url = %url, "editor not ready; reloading once");
        page.reload().await?;
        reloaded = true;
        if !page.wait_for(title, settings.editor_timeout).await? {
            return Err(NoteError::EditorUnavailable);
        }
    }

    if !page.fill(TITLE_SELECTOR, &draft.title).await? {
        return Err(NoteError::EditorUnavailable);
    }

    let strategy = if page.fill(BODY_EDITOR_SELECTOR, &draft.body).await? {
        BodyStrategy::ContentEditable
    } else {
        info!(event = "publish.body.fallback", "no rich editor found; tabbing from title");
        page.tab_and_type(&draft.body).await?;
        BodyStrategy::TabFromTitle
    };
    Ok((strategy, reloaded))
}

/// Full flow: login check, composer, autosave wait, optional linger.
pub async fn publish_draft<P>(
    page: &P,
    draft: &DraftContent,
    settings: &PublishSettings,
) -> Result<DraftOutcome, NoteError>
where
    P: ComposerPage + ?Sized,
{
    let manual_login = ensure_logged_in(page, settings).await?;
    let (body_strategy, reloaded) = compose(page, draft, settings).await?;

    if !draft.images.is_empty() {
        warn!(
            event = "publish.images.skipped",
            count = draft.images.len(),
            "image upload is not supported; images were not attached"
        );
    }

    sleep(settings.autosave_wait).await;
    info!(event = "publish.draft.saved", title = %draft.title, "draft saved");
    if !settings.headless && !settings.linger.is_zero() {
        sleep(settings.linger).await;
    }

    Ok(DraftOutcome {
        body_strategy,
        reloaded,
        images_skipped: draft.images.len(),
        manual_login,
    })
}
