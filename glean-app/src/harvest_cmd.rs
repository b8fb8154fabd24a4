use crate::cli::HarvestArgs;
use anyhow::{Context, Result};
use glean_common::Pacer;
use glean_config::{CredentialRequest, GleanConfig, resolve_credential};
use glean_http::HttpClient;
use glean_youtube::captions::YOUTUBE_WEB_BASE;
use glean_youtube::client::api_http;
use glean_youtube::cookies::CookieJar;
use glean_youtube::export::write_csv_file;
use glean_youtube::{
    HarvestOptions, Harvester, InnertubeCaptions, MetadataResolver, TranscriptFetcher, YouTubeApi,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Harvest settings after CLI flags are laid over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestPlan {
    pub url: String,
    pub api_key: Option<String>,
    pub max_videos: usize,
    pub languages: Vec<String>,
    pub output: PathBuf,
    pub show_progress: bool,
}

impl HarvestPlan {
    pub fn new(args: &HarvestArgs, cfg: &GleanConfig) -> Self {
        let h = &cfg.harvester;
        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| h.api_key())
            .map(str::to_string);
        let languages = args
            .lang
            .clone()
            .map(|langs| {
                langs
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|langs| !langs.is_empty())
            .unwrap_or_else(|| h.languages.clone());
        Self {
            url: args.url.clone(),
            api_key,
            max_videos: args.max_videos.unwrap_or(h.max_videos),
            languages,
            output: args.output.clone().unwrap_or_else(|| h.output.clone()),
            show_progress: !args.no_progress,
        }
    }
}

pub async fn run(args: HarvestArgs, cfg: &GleanConfig) -> Result<()> {
    let plan = HarvestPlan::new(&args, cfg);

    // Any setup failure still leaves a header-only file behind.
    let harvester = match build_harvester(&plan, args.cookies.as_deref(), cfg) {
        Ok(harvester) => harvester,
        Err(e) => {
            if let Err(write_err) = write_csv_file(&plan.output, &[]) {
                warn!(
                    event = "harvest.export.failed",
                    output = %plan.output.display(),
                    error = %write_err,
                    "could not write the empty transcript file"
                );
            }
            error!(
                event = "harvest.setup.failed",
                output = %plan.output.display(),
                error = %format!("{e:#}"),
                "harvest could not start; wrote an empty transcript file"
            );
            return Err(e);
        }
    };

    let opts = HarvestOptions {
        max_videos: plan.max_videos,
        output: plan.output.clone(),
        pacer: Pacer::from_millis(cfg.harvester.delay_min_ms, cfg.harvester.delay_max_ms),
        show_progress: plan.show_progress,
    };

    let report = harvester
        .run(&plan.url, &opts)
        .await
        .with_context(|| format!("writing {}", plan.output.display()))?;

    println!(
        "{} of {} videos had transcripts; saved to {}",
        report.fetched,
        report.resolved,
        report.output.display()
    );
    Ok(())
}

fn build_harvester(
    plan: &HarvestPlan,
    cookies: Option<&Path>,
    cfg: &GleanConfig,
) -> Result<Harvester<InnertubeCaptions>> {
    let api_key = plan
        .api_key
        .clone()
        .context("YouTube API key missing: pass --api-key or set YOUTUBE_API_KEY")?;

    let timeout = Duration::from_secs(cfg.http.timeout_secs);
    let api_http = api_http(&cfg.harvester.api_base)?
        .with_timeout(timeout)
        .with_retries(cfg.http.max_retries);
    let api = YouTubeApi::with_http(api_http, api_key);

    let caption_http = HttpClient::new(YOUTUBE_WEB_BASE)?
        .with_timeout(timeout)
        .with_retries(cfg.http.max_retries);
    let mut captions = InnertubeCaptions::with_http(caption_http);

    let jar = resolve_credential(&CredentialRequest {
        label: "youtube cookie jar",
        flag: cookies,
        env_var: "YT_COOKIES",
        validate: None,
        suffix: ".txt",
        fallback: None,
    })?;
    if let Some(path) = jar.path() {
        match CookieJar::load(path) {
            Ok(cookies) => {
                info!(event = "harvest.cookies.loaded", count = cookies.len(), "using cookie jar");
                captions = captions.with_cookies(&cookies);
            }
            Err(e) => warn!(
                event = "harvest.cookies.unreadable",
                path = %path.display(),
                error = %e,
                "ignoring cookie jar"
            ),
        }
    }

    Ok(Harvester::new(
        MetadataResolver::new(api),
        TranscriptFetcher::new(captions, plan.languages.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> HarvestArgs {
        HarvestArgs {
            url: "lofi".into(),
            max_videos: None,
            lang: None,
            api_key: None,
            cookies: None,
            output: None,
            no_progress: false,
        }
    }

    #[test]
    fn config_values_fill_unset_flags() {
        let mut cfg = GleanConfig::default();
        cfg.harvester.api_key = Some("from-config".into());
        cfg.harvester.max_videos = 4;

        let plan = HarvestPlan::new(&args(), &cfg);
        assert_eq!(plan.api_key.as_deref(), Some("from-config"));
        assert_eq!(plan.max_videos, 4);
        assert_eq!(plan.languages, vec!["ja", "en"]);
        assert_eq!(plan.output, PathBuf::from("transcripts.csv"));
        assert!(plan.show_progress);
    }

    #[test]
    fn flags_override_config() {
        let cfg = GleanConfig::default();
        let a = HarvestArgs {
            api_key: Some("flag".into()),
            lang: Some(vec!["en".into(), " ".into()]),
            max_videos: Some(0),
            no_progress: true,
            ..args()
        };
        let plan = HarvestPlan::new(&a, &cfg);
        assert_eq!(plan.api_key.as_deref(), Some("flag"));
        assert_eq!(plan.languages, vec!["en"]);
        assert_eq!(plan.max_videos, 0);
        assert!(!plan.show_progress);
    }

    #[tokio::test]
    async fn missing_key_writes_header_only_file_and_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("t.csv");
        let a = HarvestArgs {
            output: Some(out.clone()),
            ..args()
        };
        let err = run(a, &GleanConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("API key"));
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.ends_with(b"language,is_generated\n"));
    }

    #[tokio::test]
    async fn unusable_api_base_still_leaves_header_only_file() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("t.csv");
        let mut cfg = GleanConfig::default();
        cfg.harvester.api_base = "not a url".into();
        let a = HarvestArgs {
            api_key: Some("key".into()),
            output: Some(out.clone()),
            ..args()
        };

        let err = run(a, &cfg).await.unwrap_err();
        assert!(err.to_string().contains("URL"), "{err:#}");
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.ends_with(b"language,is_generated\n"));
    }
}
