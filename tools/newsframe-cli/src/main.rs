//! Newsframe CLI: news thumbnails and pan-and-scan shorts from a photo and a headline.
//!
//! Usage:
//!   newsframe image <IMAGE> --headline ..   Render still images
//!   newsframe video <IMAGE> --headline ..   Render a 9:16 video
//!   newsframe probe <MEDIA>                 Show media duration and size
//!   newsframe check                         Check encoder and font setup

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use newsframe_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "newsframe",
    about = "News thumbnails and pan-and-scan shorts from a photo and a headline",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/newsframe/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render still images (horizontal and/or 4:5)
    Image {
        /// Source photo
        image: PathBuf,

        /// Headline text
        #[arg(long)]
        headline: String,

        /// Phrase of the headline to emphasize (exact, case-sensitive)
        #[arg(long, default_value = "")]
        highlight: String,

        /// Brand logo image
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Region of interest as normalized x,y,w,h
        #[arg(long)]
        roi: Option<String>,

        /// Output formats
        #[arg(long, value_delimiter = ',', default_value = "horizontal,instagram")]
        format: Vec<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a 9:16 pan-and-scan video
    Video {
        /// Source photo
        image: PathBuf,

        /// Headline text
        #[arg(long)]
        headline: String,

        /// Phrase of the headline to emphasize (exact, case-sensitive)
        #[arg(long, default_value = "")]
        highlight: String,

        /// Brand logo image
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Camera motion: left-to-right, right-to-left, top-to-bottom,
        /// bottom-to-top, zoom-in, zoom-out, diagonal-tl-br, diagonal-tr-bl
        #[arg(long, default_value = "left-to-right")]
        direction: String,

        /// Duration in seconds (ignored when --audio is given)
        #[arg(long, default_value = "5.0")]
        duration: f64,

        /// Frames per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Crop the photo to fill the frame instead of letterboxing it
        #[arg(long)]
        no_keep_aspect: bool,

        /// Narration or music track; its length sets the video length
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show duration and dimensions of a media file
    Probe {
        /// Audio or video file
        media: PathBuf,
    },

    /// Check encoder and font setup
    Check {
        /// Write the effective config to the config path if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    newsframe_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Image {
            image,
            headline,
            highlight,
            logo,
            roi,
            format,
            output,
        } => {
            commands::still::run(
                config,
                commands::still::StillArgs {
                    image,
                    headline,
                    highlight,
                    logo,
                    roi,
                    formats: format,
                    output,
                },
            )
            .await
        }
        Commands::Video {
            image,
            headline,
            highlight,
            logo,
            direction,
            duration,
            fps,
            no_keep_aspect,
            audio,
            output,
        } => {
            commands::video::run(
                config,
                commands::video::VideoArgs {
                    image,
                    headline,
                    highlight,
                    logo,
                    direction,
                    duration,
                    fps,
                    keep_aspect: !no_keep_aspect,
                    audio,
                    output,
                },
            )
            .await
        }
        Commands::Probe { media } => commands::probe::run(&config, media),
        Commands::Check { init } => commands::check::run(&config, cli.config.as_deref(), init),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_image_formats_split_on_commas() {
        let cli = Cli::parse_from([
            "newsframe",
            "image",
            "photo.jpg",
            "--headline",
            "Rain returns",
            "--format",
            "horizontal,instagram-4:5",
        ]);
        match cli.command {
            Commands::Image { format, highlight, .. } => {
                assert_eq!(format, vec!["horizontal", "instagram-4:5"]);
                assert!(highlight.is_empty());
            }
            _ => panic!("expected image command"),
        }
    }

    #[test]
    fn test_video_defaults() {
        let cli = Cli::parse_from(["newsframe", "video", "photo.jpg", "--headline", "Rain"]);
        match cli.command {
            Commands::Video {
                direction,
                duration,
                fps,
                no_keep_aspect,
                audio,
                ..
            } => {
                assert_eq!(direction, "left-to-right");
                assert!((duration - 5.0).abs() < 1e-9);
                assert_eq!(fps, 30);
                assert!(!no_keep_aspect);
                assert!(audio.is_none());
            }
            _ => panic!("expected video command"),
        }
    }
}
