//! YouTube metadata and transcript harvesting.
//!
//! The pipeline is linear: [`target::classify`] turns user input into a
//! [`TargetSpec`], [`resolve::MetadataResolver`] expands it into hydrated
//! [`VideoReference`]s through the Data API v3, [`transcript::TranscriptFetcher`]
//! pulls one caption track per video, and [`export`] writes the CSV.
//! [`harvest::Harvester`] wires the steps together.
//!
//! Caption retrieval sits behind the [`captions::TranscriptSource`] trait;
//! [`captions::InnertubeCaptions`] is the production implementation.
pub mod captions;
pub mod client;
pub mod cookies;
pub mod error;
pub mod export;
pub mod harvest;
pub mod resolve;
pub mod target;
pub mod transcript;
pub mod types;

pub use captions::{CaptionTrack, InnertubeCaptions, TranscriptSource};
pub use client::YouTubeApi;
pub use error::{ExportError, TranscriptError, YoutubeError};
pub use harvest::{HarvestOptions, HarvestReport, Harvester};
pub use resolve::MetadataResolver;
pub use target::{TargetKind, TargetSpec, classify};
pub use transcript::TranscriptFetcher;
pub use types::{TranscriptRecord, VideoReference};
