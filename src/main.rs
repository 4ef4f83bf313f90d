use anyhow::{Context, Result};
use callwarden::asr::Language;
use callwarden::cli::{Cli, Commands};
use callwarden::config::Config;
use callwarden::pipeline::{DetectionPipeline, PipelineOptions};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_detection(&cli, config)?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "callwarden",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(default) => Config::load_or_default(&default)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

fn run_detection(cli: &Cli, config: Config) -> Result<()> {
    let language: Language = cli
        .language
        .as_deref()
        .unwrap_or(&config.asr.language)
        .parse()?;

    let options = PipelineOptions {
        use_mock_recognizer: cli.mock || config.asr.backend == "mock",
        language,
        model_dir: PathBuf::from(&config.asr.model_dir),
        chunk_duration_ms: cli.chunk,
        device: cli.device.clone().or(config.audio.device.clone()),
        persona: config.honeypot.persona.clone(),
        quiet: cli.quiet,
        verbosity: cli.verbose,
        ..PipelineOptions::default()
    };

    let mut pipeline = DetectionPipeline::new(options)?;

    if cli.live {
        run_live(&mut pipeline)?;
    } else {
        let target = match &cli.file {
            Some(path) => path.clone(),
            None => {
                // No recording given: run the demo on a generated tone.
                let path = PathBuf::from("dummy_call.wav");
                if !path.exists() {
                    callwarden::audio::generate_dummy_wav(&path, 10.0)?;
                    if !cli.quiet {
                        eprintln!(
                            "{}",
                            "callwarden: no file provided, generated dummy_call.wav".dimmed()
                        );
                    }
                }
                path
            }
        };
        pipeline.process_file_simulation(&target)?;
    }

    if !cli.quiet {
        print_summary(&pipeline);
    }

    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn run_live(pipeline: &mut DetectionPipeline) -> Result<()> {
    eprintln!("callwarden: live capture started (Ctrl+C to stop)");
    pipeline.process_microphone_simulation()?;
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn run_live(_pipeline: &mut DetectionPipeline) -> Result<()> {
    anyhow::bail!("live capture requires building with the `cpal-audio` feature")
}

fn print_summary(pipeline: &DetectionPipeline) {
    eprintln!();
    eprintln!("{}", "call summary".bold());
    eprintln!("  chunks processed: {}", pipeline.chunks_processed());
    eprintln!("  final phase:      {}", pipeline.current_phase());
    if let Some(peak) = pipeline
        .risk_history()
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
    {
        eprintln!("  peak risk:        {:.2} [{}]", peak.score, peak.level);
    }
    match pipeline.escalation_chunk() {
        Some(chunk) => eprintln!(
            "  escalation:       {} (chunk {})",
            "HONEYPOT ACTIVE".red().bold(),
            chunk
        ),
        None => eprintln!("  escalation:       {}", "none".green()),
    }
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = callwarden::audio::list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found");
    } else {
        println!("Available audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("device listing requires building with the `cpal-audio` feature")
}
