//! End-to-end harvest: classify, resolve, fetch transcripts, write CSV.
use crate::captions::TranscriptSource;
use crate::error::ExportError;
use crate::export::write_csv_file;
use crate::resolve::MetadataResolver;
use crate::target::{TargetSpec, classify};
use crate::transcript::TranscriptFetcher;
use crate::types::{TranscriptRecord, VideoReference};
use glean_common::Pacer;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub max_videos: usize,
    pub output: PathBuf,
    pub pacer: Pacer,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub target: TargetSpec,
    pub resolved: usize,
    pub fetched: usize,
    pub output: PathBuf,
}

pub struct Harvester<S> {
    resolver: MetadataResolver,
    fetcher: TranscriptFetcher<S>,
}

impl<S: TranscriptSource> Harvester<S> {
    pub fn new(resolver: MetadataResolver, fetcher: TranscriptFetcher<S>) -> Self {
        Self { resolver, fetcher }
    }

    /// Run the whole pipeline for one input. Only a failure to write the
    /// output file is an error; everything upstream degrades to fewer rows.
    pub async fn run(&self, input: &str, opts: &HarvestOptions) -> Result<HarvestReport, ExportError> {
        let target = classify(input);
        info!(
            event = "harvest.target.classified",
            kind = %target.kind,
            identifier = %target.identifier,
            "classified input"
        );

        let videos = self.resolver.resolve(&target, opts.max_videos).await;
        let records = self
            .collect(&videos, &opts.pacer, opts.show_progress)
            .await;
        write_csv_file(&opts.output, &records)?;

        let report = HarvestReport {
            target,
            resolved: videos.len(),
            fetched: records.len(),
            output: opts.output.clone(),
        };
        info!(
            event = "harvest.done",
            resolved = report.resolved,
            fetched = report.fetched,
            output = %report.output.display(),
            "harvest finished"
        );
        Ok(report)
    }

    /// Fetch transcripts in order, pausing between consecutive fetches.
    /// Videos without a transcript are left out.
    pub async fn collect(
        &self,
        videos: &[VideoReference],
        pacer: &Pacer,
        show_progress: bool,
    ) -> Vec<TranscriptRecord> {
        let bar = progress_bar(videos.len() as u64, show_progress);
        let mut records = Vec::with_capacity(videos.len());

        for (i, video) in videos.iter().enumerate() {
            if i > 0 {
                pacer.pause().await;
            }
            bar.set_message(video.id.clone());
            if let Some(record) = self.fetcher.fetch(video).await {
                records.push(record);
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        records
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}
