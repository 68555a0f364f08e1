//! Crowd clipper binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use cclip_cli::{init_tracing, run_pipeline, AnalysisConfig, Cli, ClipperError};
use cclip_media::{check_ffmpeg, check_ffprobe, FfmpegBackend};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let run = cli.run_config();
    let extraction = cli.extraction_options();
    let analysis = AnalysisConfig::from_env();
    debug!("Run config: {:?}", run);
    debug!("Extraction options: {:?}", extraction);

    if let Err(e) = run.validate() {
        let e = ClipperError::from(e);
        error!("{}", e);
        return ExitCode::from(e.exit_code());
    }

    if let Err(e) = check_ffmpeg().and_then(|_| check_ffprobe()) {
        error!("{}", e);
        return ExitCode::from(ClipperError::MediaRead(e).exit_code());
    }

    let backend = FfmpegBackend::new(
        analysis.audio_options(cli.crowd_filter, extraction.ffmpeg_timeout),
        extraction.cut_mode.clone(),
    );

    match run_pipeline(&backend, &cli.video, &run, &analysis.detection, &extraction).await {
        Ok(summary) => {
            println!("{}", summary.render(cli.verbose));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
