use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use youtube_batch_lib::downloader::utils::{read_url_list, write_url_list};
use youtube_batch_lib::downloader::{ExtractorConfig, UrlExpander, YtDlpExtractor};
use youtube_batch_lib::init_logging;

/// Expand videos, playlists and channels into a flat list of video URLs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one URL per line
    #[arg(long)]
    input: PathBuf,

    /// Where the expanded video URLs are written
    #[arg(long, default_value = "video.txt")]
    output_result: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(false);

    let urls = read_url_list(&args.input)
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;

    let expander = UrlExpander::new(Box::new(YtDlpExtractor::new()), ExtractorConfig::from_env());
    let video_urls = expander.collect_all_video_urls(&urls).await;

    write_url_list(&args.output_result, &video_urls)
        .with_context(|| format!("Failed to write {}", args.output_result.display()))?;

    println!("Total number of videos found: {}", video_urls.len());
    println!("Video URLs written to {}", args.output_result.display());
    Ok(())
}
