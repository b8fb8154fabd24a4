//! Browser session ownership for `glean publish`.
use crate::composer::{publish_draft, DraftOutcome, PublishSettings};
use crate::content::DraftContent;
use crate::error::NoteError;
use glean_common::Pacer;
use glean_config::{validate_json, CredentialRequest, CredentialSource, ResolvedCredential};
use glean_drivers::{GleanDriver, LaunchOptions, SessionState};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding session state JSON.
pub const NOTE_AUTH_ENV: &str = "NOTE_AUTH_JSON";

/// How the browser gets its logged-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Clean profile, cookies installed from a session state file.
    StateFile(PathBuf),
    /// Persistent profile directory carrying its own cookies.
    Profile(PathBuf),
}

impl SessionMode {
    pub fn from_credential(credential: &ResolvedCredential, profile_dir: &Path) -> Self {
        match (credential.source(), credential.path()) {
            (CredentialSource::Flag | CredentialSource::Environment, Some(path)) => {
                SessionMode::StateFile(path.to_path_buf())
            }
            (CredentialSource::LocalFallback, Some(path)) => SessionMode::Profile(path.to_path_buf()),
            _ => SessionMode::Profile(profile_dir.to_path_buf()),
        }
    }
}

/// Credential lookup for the publisher: `--auth_file`, then [`NOTE_AUTH_ENV`],
/// then the persistent profile.
pub fn session_request<'a>(auth_file: Option<&'a Path>, profile_dir: &Path) -> CredentialRequest<'a> {
    CredentialRequest {
        label: "note session state",
        flag: auth_file,
        env_var: NOTE_AUTH_ENV,
        validate: Some(validate_json),
        suffix: ".json",
        fallback: Some(profile_dir.to_path_buf()),
    }
}

pub struct Publisher {
    pub settings: PublishSettings,
    pub launch: LaunchOptions,
    pub pacer: Pacer,
}

impl Publisher {
    pub fn new(settings: PublishSettings, launch: LaunchOptions) -> Self {
        Self {
            settings,
            launch,
            pacer: Pacer::from_millis(300, 1_200),
        }
    }

    /// Launch a browser, save `draft`, and close the browser on every path.
    pub async fn run(&self, draft: &DraftContent, mode: &SessionMode) -> Result<DraftOutcome, NoteError> {
        let mut launch = self.launch.clone();
        launch.headless = self.settings.headless;
        let state = match mode {
            SessionMode::StateFile(path) => {
                launch.profile_dir = None;
                Some(SessionState::read(path)?)
            }
            SessionMode::Profile(dir) => {
                launch.profile_dir = Some(dir.clone());
                None
            }
        };
        info!(event = "publish.start", mode = ?mode, headless = launch.headless, "publishing draft");

        let driver = GleanDriver::launch_with_fallback(&launch, self.pacer).await?;
        let result = self.drive(&driver, draft, state.as_ref()).await;

        if let Err(e) = driver.close().await {
            warn!(event = "browser.close.failed", error = %e, "closing browser failed");
        }
        result
    }

    async fn drive(
        &self,
        driver: &GleanDriver,
        draft: &DraftContent,
        state: Option<&SessionState>,
    ) -> Result<DraftOutcome, NoteError> {
        if let Some(state) = state {
            driver.restore_session(state, &self.settings.site_url).await?;
        }
        let page = driver.page();
        publish_draft(&page, draft, &self.settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_config::resolve_credential;

    #[test]
    fn flag_credential_selects_state_file_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let auth = tmp.path().join("note_auth.json");
        std::fs::write(&auth, r#"{"cookies":[],"origins":[]}"#).unwrap();
        let profile = tmp.path().join("chrome_profile");

        let cred = resolve_credential(&session_request(Some(&auth), &profile)).unwrap();
        assert_eq!(
            SessionMode::from_credential(&cred, &profile),
            SessionMode::StateFile(auth.clone())
        );
    }

    #[test]
    fn absent_credential_uses_the_profile() {
        let profile = PathBuf::from("chrome_profile");
        assert_eq!(
            SessionMode::from_credential(&ResolvedCredential::absent(), &profile),
            SessionMode::Profile(profile.clone())
        );
    }
}
