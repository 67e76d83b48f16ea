use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mood_fusion::{
    audio::{AudioLoader, PrototypeLibrary, SpectralEmbedder},
    config::Config,
    labels::LabelSet,
    pipeline::{AudioMode, MoodPipeline},
    vision::PrecomputedScores,
};

#[derive(Parser)]
#[command(
    name = "mood-fusion",
    version,
    about = "Classify the mood of a scene from image scores and its soundtrack",
    long_about = "Mood-Fusion blends zero-shot image scores with a zero-shot audio classifier built on synthesized mood prototypes, without any labelled training data."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the mood of an image (or frames) with a WAV soundtrack
    Classify {
        /// Soundtrack WAV file
        #[arg(short, long)]
        audio: PathBuf,

        /// Comma-separated image scores in label order; repeat once per video frame
        #[arg(short, long = "image-scores", required = true)]
        image_scores: Vec<String>,

        #[command(flatten)]
        settings: Settings,

        /// Image weight (overrides the configuration)
        #[arg(long, allow_hyphen_values = true)]
        alpha: Option<f32>,

        /// Softmax temperature (overrides the configuration)
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Audio evidence: zero_shot, loudness_prior or blended
        #[arg(short, long)]
        mode: Option<AudioMode>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Write every mood prototype as a WAV file
    Prototypes {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Output file path
        #[arg(short, long, default_value = "mood-fusion.toml")]
        out: PathBuf,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON label file replacing the configured labels
    #[arg(short, long)]
    labels: Option<PathBuf>,
}

impl Settings {
    fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => {
                info!("Loading configuration from {:?}", config_path);
                Config::from_file(config_path)?
            }
            None => {
                info!("Using default configuration");
                Config::default()
            }
        };

        if let Some(labels_path) = &self.labels {
            info!("Loading labels from {:?}", labels_path);
            config.labels = LabelSet::from_json_file(labels_path)?;
        }

        Ok(config)
    }
}

fn parse_scores(raw: &str) -> Result<Vec<f32>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .with_context(|| format!("invalid image score '{}'", part.trim()))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable. RUST_LOG overrides --verbose.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Mood-Fusion v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Classify {
            audio,
            image_scores,
            settings,
            alpha,
            temperature,
            mode,
            pretty,
        } => {
            let mut config = settings.load()?;
            if let Some(temperature) = temperature {
                config.engine.temperature = temperature;
            }
            if let Some(mode) = mode {
                config.engine.audio_mode = mode;
            }
            let frames = image_scores
                .iter()
                .map(|raw| parse_scores(raw))
                .collect::<Result<Vec<_>>>()?;
            classify(&config, &audio, &frames, alpha, pretty)
        }
        Command::Prototypes { out, settings } => export_prototypes(&settings.load()?, &out),
        Command::InitConfig { out } => {
            Config::default().save_to_file(&out)?;
            info!("Default configuration written to {:?}", out);
            Ok(())
        }
    }
}

fn classify(config: &Config, audio: &Path, frames: &[Vec<f32>], alpha: Option<f32>, pretty: bool) -> Result<()> {
    let pipeline = MoodPipeline::<Vec<f32>>::new(config, Arc::new(PrecomputedScores), Arc::new(SpectralEmbedder::new()))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let waveform = AudioLoader::load(audio).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    info!("Loaded {:?} ({:.2}s)", audio, waveform.duration());

    let alpha = alpha.unwrap_or_else(|| pipeline.default_alpha());
    let prediction = match frames {
        [single] => pipeline.predict_image_audio(single, &waveform, alpha)?,
        _ => pipeline.predict_frames_audio(frames, &waveform, alpha)?,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&prediction)?
    } else {
        serde_json::to_string(&prediction)?
    };
    println!("{}", json);
    Ok(())
}

fn export_prototypes(config: &Config, out: &Path) -> Result<()> {
    config.validate()?;
    std::fs::create_dir_all(out).with_context(|| format!("creating {:?}", out))?;

    let library = PrototypeLibrary::with_config(config.prototypes.clone());
    for (name, waveform) in library.synthesize_all(&config.labels)? {
        let path = out.join(format!("{}.wav", name));
        AudioLoader::save_wav(&waveform, &path)?;
        info!("Wrote {:?} (rms {:.4})", path, waveform.rms());
    }

    Ok(())
}
