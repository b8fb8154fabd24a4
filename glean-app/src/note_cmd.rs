use crate::cli::{ConvertArgs, LoginArgs, PublishArgs};
use anyhow::Result;
use glean_config::{GleanConfig, PublisherSettings, resolve_credential};
use glean_drivers::LaunchOptions;
use glean_drivers::session::convert_cookie_file;
use glean_note::login::{capture_session, wait_for_enter};
use glean_note::{Publisher, PublishSettings, SessionMode, load_content, session_request};
use std::time::Duration;
use tracing::info;

pub fn launch_options(p: &PublisherSettings, headless: bool) -> LaunchOptions {
    LaunchOptions {
        webdriver_url: p.webdriver_url.clone(),
        headless,
        viewport: p.viewport,
        profile_dir: None,
        chrome_binary: p.chrome_binary.clone(),
        ..Default::default()
    }
}

pub fn publish_settings(p: &PublisherSettings, headless: bool) -> PublishSettings {
    PublishSettings {
        site_url: p.site_url.clone(),
        headless,
        ready_timeout: Duration::from_secs(p.editor_timeout_secs),
        editor_timeout: Duration::from_secs(p.editor_timeout_secs),
        login_timeout: Duration::from_secs(p.login_timeout_secs),
        autosave_wait: Duration::from_secs(p.autosave_wait_secs),
        linger: Duration::from_secs(p.linger_secs),
        screenshot_path: p.screenshot_path.clone(),
    }
}

pub async fn publish(args: PublishArgs, cfg: &GleanConfig) -> Result<()> {
    let p = &cfg.publisher;
    // Content problems surface before any browser starts.
    let draft = load_content(&args.content)?;

    // Held until the end of this function so a staged file outlives the browser.
    let credential = resolve_credential(&session_request(args.auth_file.as_deref(), &p.profile_dir))?;
    let mode = SessionMode::from_credential(&credential, &p.profile_dir);

    let publisher = Publisher::new(
        publish_settings(p, args.headless),
        launch_options(p, args.headless),
    );
    let outcome = publisher.run(&draft, &mode).await?;

    info!(
        event = "publish.done",
        reloaded = outcome.reloaded,
        body = ?outcome.body_strategy,
        "draft publishing finished"
    );
    println!("Saved draft \"{}\" on note.", draft.title);
    Ok(())
}

pub async fn login(args: LoginArgs, cfg: &GleanConfig) -> Result<()> {
    let p = &cfg.publisher;
    println!("A browser window will open. Log in to note, then press Enter here.");
    let count = capture_session(
        &launch_options(p, false),
        &p.site_url,
        &args.output,
        wait_for_enter(),
    )
    .await?;
    println!("Saved {count} cookies to {}", args.output.display());
    Ok(())
}

pub fn convert_cookies(args: ConvertArgs) -> Result<()> {
    let count = convert_cookie_file(&args.input, &args.output)?;
    println!(
        "Converted {count} cookies from {} to {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_settings_map_to_runtime_settings() {
        let p = PublisherSettings::default();
        let s = publish_settings(&p, true);
        assert!(s.headless);
        assert_eq!(s.composer_url(), "https://note.com/notes/new");
        assert_eq!(s.login_timeout, Duration::from_secs(180));

        let l = launch_options(&p, true);
        assert_eq!(l.viewport, (1280, 800));
        assert!(l.chrome_binary.is_none());
    }

    #[test]
    fn convert_cookies_writes_session_state() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("raw.json");
        let output = tmp.path().join("state.json");
        std::fs::write(&input, r#"[{"name":"a","value":"b","domain":"note.com"}]"#).unwrap();

        convert_cookies(ConvertArgs {
            input,
            output: output.clone(),
        })
        .unwrap();
        assert!(std::fs::read_to_string(output).unwrap().contains("\"origins\": []"));
    }

    #[tokio::test]
    async fn invalid_content_fails_before_launch() {
        let err = publish(
            PublishArgs {
                content: "{not json".into(),
                auth_file: None,
                headless: true,
            },
            &GleanConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("invalid draft content"));
    }
}
