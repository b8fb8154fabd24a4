use anyhow::{Context, Result};
use glean_common::Pacer;
use glean_drivers::{GleanDriver, LaunchOptions};
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Resolves once the operator presses Enter on stdin.
pub async fn wait_for_enter() -> Result<()> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("reading stdin")?;
    Ok(())
}

/// Open `<site>/login` in a headed browser, wait for `confirmed`, and write the
/// browser's cookies to `output` as session state. Returns the cookie count.
pub async fn capture_session<F>(
    launch: &LaunchOptions,
    site_url: &str,
    output: &Path,
    confirmed: F,
) -> Result<usize>
where
    F: Future<Output = Result<()>>,
{
    let mut launch = launch.clone();
    launch.headless = false;
    launch.profile_dir = None;

    let driver = GleanDriver::launch_with_fallback(&launch, Pacer::disabled()).await?;
    let result = async {
        let url = format!("{}/login", site_url.trim_end_matches('/'));
        driver.goto(&url).await?;
        info!(
            event = "login.capture.waiting",
            url = %url,
            "log in in the browser window, then press Enter here"
        );
        confirmed.await?;

        let state = driver.export_session().await?;
        state.write(output)?;
        Ok::<usize, anyhow::Error>(state.cookies.len())
    }
    .await;

    if let Err(e) = driver.close().await {
        warn!(event = "browser.close.failed", error = %e, "closing browser failed");
    }
    if let Ok(count) = &result {
        info!(
            event = "login.capture.saved",
            output = %output.display(),
            cookies = count,
            "session state saved"
        );
    }
    result
}
