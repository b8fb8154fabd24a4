//! Credential-file resolution with an explicit source priority.
//!
//! Both tools accept a credential bundle (a cookie jar for the harvester, a
//! browser session state for the publisher) from one of three places, tried
//! in order:
//!
//! 1. a path given on the command line, when the file exists
//! 2. the literal content of an environment variable, staged to a temp file
//! 3. a local fallback path (e.g. a persistent browser profile)
//!
//! Resolution happens once at startup. The returned [`ResolvedCredential`]
//! owns any staged file and deletes it when dropped, so every exit path that
//! unwinds the stack cleans up.
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to stage {label} from ${env_var}: {source}")]
    Stage {
        label: String,
        env_var: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Flag,
    Environment,
    LocalFallback,
    Absent,
}

/// Inputs to [`resolve_credential`].
#[derive(Debug, Clone)]
pub struct CredentialRequest<'a> {
    /// Human-readable name used in log lines ("cookie jar", "session state").
    pub label: &'a str,
    pub flag: Option<&'a Path>,
    pub env_var: &'a str,
    /// Checks environment content before it is staged.
    pub validate: Option<fn(&str) -> Result<(), String>>,
    /// File suffix of the staged temp file (".json", ".txt").
    pub suffix: &'a str,
    pub fallback: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ResolvedCredential {
    source: CredentialSource,
    path: Option<PathBuf>,
    staged: Option<NamedTempFile>,
}

impl ResolvedCredential {
    pub fn absent() -> Self {
        Self {
            source: CredentialSource::Absent,
            path: None,
            staged: None,
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }
}

/// Accepts any syntactically valid JSON document.
pub fn validate_json(raw: &str) -> Result<(), String> {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Walk the source priority and return the first usable credential.
///
/// A missing flag file or invalid environment content is a warning, not an
/// error: resolution moves on to the next source.
pub fn resolve_credential(req: &CredentialRequest<'_>) -> Result<ResolvedCredential, CredentialError> {
    if let Some(flag) = req.flag {
        if flag.exists() {
            tracing::info!(label = req.label, path = %flag.display(), "credential.source.flag");
            return Ok(ResolvedCredential {
                source: CredentialSource::Flag,
                path: Some(flag.to_path_buf()),
                staged: None,
            });
        }
        tracing::warn!(
            label = req.label,
            path = %flag.display(),
            "credential file not found; trying next source"
        );
    }

    if let Some(raw) = std::env::var(req.env_var).ok().filter(|v| !v.trim().is_empty()) {
        let valid = match req.validate {
            Some(check) => match check(&raw) {
                Ok(()) => true,
                Err(reason) => {
                    tracing::warn!(
                        label = req.label,
                        env_var = req.env_var,
                        %reason,
                        "environment credential is malformed; trying next source"
                    );
                    false
                }
            },
            None => true,
        };
        if valid {
            let staged = stage(&raw, req)?;
            let path = staged.path().to_path_buf();
            tracing::info!(
                label = req.label,
                env_var = req.env_var,
                path = %path.display(),
                "credential.source.environment"
            );
            return Ok(ResolvedCredential {
                source: CredentialSource::Environment,
                path: Some(path),
                staged: Some(staged),
            });
        }
    }

    if let Some(fallback) = &req.fallback {
        tracing::info!(label = req.label, path = %fallback.display(), "credential.source.fallback");
        return Ok(ResolvedCredential {
            source: CredentialSource::LocalFallback,
            path: Some(fallback.clone()),
            staged: None,
        });
    }

    tracing::debug!(label = req.label, "credential.source.absent");
    Ok(ResolvedCredential::absent())
}

fn stage(raw: &str, req: &CredentialRequest<'_>) -> Result<NamedTempFile, CredentialError> {
    let wrap = |source: std::io::Error| CredentialError::Stage {
        label: req.label.to_string(),
        env_var: req.env_var.to_string(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix("glean-cred-")
        .suffix(req.suffix)
        .tempfile()
        .map_err(wrap)?;
    file.write_all(raw.as_bytes()).map_err(wrap)?;
    file.flush().map_err(wrap)?;
    Ok(file)
}
