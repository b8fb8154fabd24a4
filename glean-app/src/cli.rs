use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "glean", version, about = "YouTube transcript harvester and note draft publisher")]
pub struct Cli {
    /// Configuration file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = "glean.yaml")]
    pub config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect video metadata and transcripts into a CSV file.
    Harvest(HarvestArgs),
    /// Save an article as a draft on note.
    Publish(PublishArgs),
    /// Log in by hand and save the browser session for later runs.
    Login(LoginArgs),
    /// Convert a browser-extension cookie export into a session state file.
    ConvertCookies(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct HarvestArgs {
    /// Video, playlist, channel, or handle URL, or free search text.
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub max_videos: Option<usize>,

    /// Preferred caption languages, most preferred first.
    #[arg(long, value_delimiter = ',')]
    pub lang: Option<Vec<String>>,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Netscape cookie jar. `YT_COOKIES` may carry the jar contents instead.
    #[arg(long)]
    pub cookies: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Path to a JSON file, or the JSON itself.
    #[arg(long)]
    pub content: String,

    /// Session state file. `NOTE_AUTH_JSON` may carry the contents instead.
    #[arg(long = "auth_file", alias = "auth-file")]
    pub auth_file: Option<PathBuf>,

    #[arg(long)]
    pub headless: bool,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, default_value = "note_auth.json")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(long, default_value = "cookies_raw.json")]
    pub input: PathBuf,

    #[arg(long, default_value = "note_auth.json")]
    pub output: PathBuf,
}
