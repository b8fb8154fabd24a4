//! Loader for `glean.yaml` with environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one, so an empty file is valid)
//! 2. an optional YAML/TOML/JSON file (`--config`, default `glean.yaml`)
//! 3. `GLEAN__<SECTION>__<KEY>` environment variables
//!
//! String values may reference `${VAR}` placeholders; they are expanded after
//! merging. CLI flags are applied on top by the binary.
//!
//! Credential files (cookie jars, browser session state) are resolved
//! separately by [`credentials`], because they may need a temporary file.
use config::{Config, ConfigError, Environment, File, FileFormat};
use glean_common::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub mod credentials;

pub use credentials::{
    CredentialError, CredentialRequest, CredentialSource, ResolvedCredential, resolve_credential,
    validate_json,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GleanConfig {
    pub version: Option<String>,
    pub harvester: HarvesterSettings,
    pub publisher: PublisherSettings,
    pub logging: LoggingSettings,
    pub http: HttpSettings,
}

/// Settings for `glean harvest`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub max_videos: usize,
    pub languages: Vec<String>,
    pub output: PathBuf,
    /// Lower bound of the pause between two transcript fetches.
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl Default for HarvesterSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3/".into(),
            max_videos: 10,
            languages: vec!["ja".into(), "en".into()],
            output: PathBuf::from("transcripts.csv"),
            delay_min_ms: 2_000,
            delay_max_ms: 5_000,
        }
    }
}

impl HarvesterSettings {
    /// The configured API key, ignoring blanks and unexpanded `${VAR}` placeholders.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.contains("${"))
    }
}

/// Settings for `glean publish` and `glean login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherSettings {
    pub site_url: String,
    pub webdriver_url: String,
    /// Preferred browser binary. `None` means the driver's bundled browser.
    pub chrome_binary: Option<PathBuf>,
    /// Persistent profile used when no session state is available.
    pub profile_dir: PathBuf,
    pub viewport: (u32, u32),
    pub editor_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub autosave_wait_secs: u64,
    /// How long a headed window stays open after the draft is saved.
    pub linger_secs: u64,
    pub screenshot_path: PathBuf,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            site_url: "https://note.com/".into(),
            webdriver_url: "http://localhost:9515".into(),
            chrome_binary: None,
            profile_dir: PathBuf::from("chrome_profile"),
            viewport: (1280, 800),
            editor_timeout_secs: 15,
            login_timeout_secs: 180,
            autosave_wait_secs: 5,
            linger_secs: 10,
            screenshot_path: PathBuf::from("login_failed.png"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".into(),
            stderr: true,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Retries for 429/5xx responses. Zero keeps every fault visible to the caller.
    pub max_retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 0,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (file + env overrides).
pub struct GleanConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GleanConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GleanConfigLoader {
    /// Start with no file sources; `GLEAN__` env overrides are applied by [`Self::load`].
    ///
    /// ```
    /// use glean_config::GleanConfigLoader;
    ///
    /// let cfg = GleanConfigLoader::new()
    ///     .with_yaml_str("harvester:\n  max_videos: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.harvester.max_videos, 3);
    /// assert_eq!(cfg.harvester.languages, vec!["ja", "en"]);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent; a missing file leaves the defaults in place.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, embedded defaults).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    ///
    /// ```
    /// use glean_config::GleanConfigLoader;
    ///
    /// temp_env::with_var("DOC_YT_KEY", Some("from-env"), || {
    ///     let cfg = GleanConfigLoader::new()
    ///         .with_yaml_str("harvester:\n  api_key: \"${DOC_YT_KEY}\"")
    ///         .load()
    ///         .expect("valid configuration");
    ///     assert_eq!(cfg.harvester.api_key(), Some("from-env"));
    /// });
    /// ```
    pub fn load(self) -> Result<GleanConfig, ConfigError> {
        // Environment goes last so it overrides every file source.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GLEAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("harvester.languages"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GleanConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Kyoto")), ("LANG2", Some("ja"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${LANG2}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(v, json!(["hello-Kyoto", { "loc": "Kyoto-ja" }, 42, true, null]));
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_GLEAN}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_GLEAN}"));
    }

    #[test]
    fn placeholder_api_keys_are_treated_as_missing() {
        let settings = HarvesterSettings {
            api_key: Some("${YOUTUBE_API_KEY}".into()),
            ..Default::default()
        };
        assert_eq!(settings.api_key(), None);

        let blank = HarvesterSettings {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.api_key(), None);
    }

    #[test]
    fn logging_settings_map_to_log_config() {
        let settings = LoggingSettings {
            format: LogFormat::Json,
            stderr: false,
            ..Default::default()
        };
        let lc = settings.to_log_config("glean");
        assert_eq!(lc.format, LogFormat::Json);
        assert!(!lc.emit_stderr);
        assert_eq!(lc.default_filter, "info");
    }
}
