use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use youtube_batch_lib::downloader::models::QUALITY_LEVELS;
use youtube_batch_lib::downloader::tools::log_tools_status;
use youtube_batch_lib::downloader::utils::read_url_list;
use youtube_batch_lib::downloader::{
    DownloadOptions, Downloader, ExtractorConfig, FfmpegMuxer, MetadataProbe, ResultLog,
    UrlExpander, YtDlpExtractor,
};
use youtube_batch_lib::init_logging;

/// Download the best video and audio for every URL in a list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one URL per line (videos, playlists or channels)
    #[arg(long)]
    input: PathBuf,

    /// Directory for the merged files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Result log, one "<url>,<SUCCESS|FAILED>,<path>" line per video
    #[arg(long, default_value = "done.txt")]
    output_result: PathBuf,

    /// Verbose logging and the candidate table for each video
    #[arg(long)]
    debug: bool,

    /// Highest video height to consider
    #[arg(long, value_parser = parse_quality)]
    max_quality: Option<u32>,
}

fn parse_quality(value: &str) -> Result<u32, String> {
    let quality: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if QUALITY_LEVELS.contains(&quality) {
        Ok(quality)
    } else {
        let allowed: Vec<String> = QUALITY_LEVELS.iter().map(u32::to_string).collect();
        Err(format!("must be one of {}", allowed.join(", ")))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if !args.input.exists() {
        bail!("Input file {} does not exist", args.input.display());
    }
    if args.debug {
        log_tools_status();
    }

    let urls = read_url_list(&args.input)
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let config = ExtractorConfig::from_env();
    let expander = UrlExpander::new(Box::new(YtDlpExtractor::new()), config.clone());
    let video_urls = expander.collect_all_video_urls(&urls).await;
    println!("Total number of videos found: {}", video_urls.len());

    let options = DownloadOptions {
        output_dir: args.output_dir.clone(),
        max_quality: args.max_quality,
        debug: args.debug,
    };
    let probe = MetadataProbe::new(Box::new(YtDlpExtractor::new()), config);
    let downloader = Downloader::new(probe, Box::new(FfmpegMuxer::new()), options);

    let mut log = ResultLog::create(&args.output_result)
        .with_context(|| format!("Failed to create {}", args.output_result.display()))?;
    let summary = downloader
        .download_all(&video_urls, &mut log)
        .await
        .with_context(|| format!("Failed to write {}", args.output_result.display()))?;

    println!(
        "Done: {} succeeded, {} failed{}",
        summary.succeeded,
        summary.failed,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    println!("Results written to {}", args.output_result.display());
    Ok(())
}
