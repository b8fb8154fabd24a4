use glean_config::CredentialError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("invalid draft content: {0}")]
    Content(String),
    #[error("not logged in to note (screenshot: {})", .screenshot.display())]
    LoggedOut { screenshot: PathBuf },
    #[error("login was not completed within {0} seconds")]
    LoginTimeout(u64),
    #[error("editor did not load after one reload")]
    EditorUnavailable,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}
