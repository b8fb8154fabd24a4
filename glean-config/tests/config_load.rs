use glean_config::{
    CredentialRequest, CredentialSource, GleanConfigLoader, resolve_credential, validate_json,
};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write_file(tmp: &TempDir, name: &str, body: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, body).expect("write file");
    p
}

#[test]
#[serial]
fn loads_file_and_keeps_defaults_for_missing_keys() {
    let tmp = TempDir::new().unwrap();
    let p = write_file(
        &tmp,
        "glean.yaml",
        r#"
harvester:
  max_videos: 25
  languages: [en]
  delay_min_ms: 0
  delay_max_ms: 0
publisher:
  site_url: "https://note.example/"
logging:
  format: json
"#,
    );

    let cfg = GleanConfigLoader::new().with_file(p).load().expect("load config");

    assert_eq!(cfg.harvester.max_videos, 25);
    assert_eq!(cfg.harvester.languages, vec!["en"]);
    assert_eq!(cfg.harvester.delay_max_ms, 0);
    assert_eq!(cfg.harvester.output, PathBuf::from("transcripts.csv"));
    assert_eq!(cfg.publisher.site_url, "https://note.example/");
    assert_eq!(cfg.publisher.editor_timeout_secs, 15);
    assert_eq!(cfg.http.max_retries, 0);
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let cfg = GleanConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");
    assert_eq!(cfg.harvester.max_videos, 10);
    assert_eq!(cfg.publisher.webdriver_url, "http://localhost:9515");
    assert_eq!(cfg.publisher.viewport, (1280, 800));
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let res = GleanConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(res.is_err());
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    temp_env::with_vars(
        [
            ("GLEAN__HARVESTER__MAX_VIDEOS", Some("7")),
            ("GLEAN__HARVESTER__LANGUAGES", Some("en,de")),
        ],
        || {
            let cfg = GleanConfigLoader::new()
                .with_yaml_str("harvester:\n  max_videos: 3")
                .load()
                .expect("load");
            assert_eq!(cfg.harvester.max_videos, 7);
            assert_eq!(cfg.harvester.languages, vec!["en", "de"]);
        },
    );
}

#[test]
#[serial]
fn existing_flag_file_wins_over_environment() {
    let tmp = TempDir::new().unwrap();
    let flag = write_file(&tmp, "auth.json", "{}");
    temp_env::with_var("GLEAN_TEST_AUTH", Some("{\"cookies\":[]}"), || {
        let resolved = resolve_credential(&CredentialRequest {
            label: "session state",
            flag: Some(&flag),
            env_var: "GLEAN_TEST_AUTH",
            validate: Some(validate_json),
            suffix: ".json",
            fallback: Some(tmp.path().join("profile")),
        })
        .unwrap();
        assert_eq!(resolved.source(), CredentialSource::Flag);
        assert_eq!(resolved.path(), Some(flag.as_path()));
        assert!(!resolved.is_staged());
    });
}

#[test]
#[serial]
fn environment_content_is_staged_and_removed_on_drop() {
    let tmp = TempDir::new().unwrap();
    let missing_flag = tmp.path().join("missing.json");
    temp_env::with_var("GLEAN_TEST_AUTH", Some("{\"cookies\":[],\"origins\":[]}"), || {
        let resolved = resolve_credential(&CredentialRequest {
            label: "session state",
            flag: Some(&missing_flag),
            env_var: "GLEAN_TEST_AUTH",
            validate: Some(validate_json),
            suffix: ".json",
            fallback: None,
        })
        .unwrap();
        assert_eq!(resolved.source(), CredentialSource::Environment);
        let staged = resolved.path().unwrap().to_path_buf();
        assert_eq!(
            fs::read_to_string(&staged).unwrap(),
            "{\"cookies\":[],\"origins\":[]}"
        );
        drop(resolved);
        assert!(!staged.exists(), "staged credential must be removed");
    });
}

#[test]
#[serial]
fn malformed_environment_json_falls_back_to_local_profile() {
    let tmp = TempDir::new().unwrap();
    let profile = tmp.path().join("chrome_profile");
    temp_env::with_var("GLEAN_TEST_AUTH", Some("{not json"), || {
        let resolved = resolve_credential(&CredentialRequest {
            label: "session state",
            flag: None,
            env_var: "GLEAN_TEST_AUTH",
            validate: Some(validate_json),
            suffix: ".json",
            fallback: Some(profile.clone()),
        })
        .unwrap();
        assert_eq!(resolved.source(), CredentialSource::LocalFallback);
        assert_eq!(resolved.path(), Some(profile.as_path()));
    });
}

#[test]
#[serial]
fn nothing_available_is_absent() {
    temp_env::with_var_unset("GLEAN_TEST_COOKIES", || {
        let resolved = resolve_credential(&CredentialRequest {
            label: "cookie jar",
            flag: None,
            env_var: "GLEAN_TEST_COOKIES",
            validate: None,
            suffix: ".txt",
            fallback: None,
        })
        .unwrap();
        assert_eq!(resolved.source(), CredentialSource::Absent);
        assert!(resolved.path().is_none());
    });
}
