use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use typewriter_fx_core::{
    audio::synthesize,
    config::LoggerConfig,
    launch,
    record::write_wav,
    AppConfig, AssetCatalog, Command, Controls, DirectoryLoader, HeroRuntime, HostEvent, Page,
    Recorder, RecordingSettings, ToneAnalyser, ToneRecorder, Viewport,
};

fn main() -> typewriter_fx_core::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };

    init_tracing(&config.logger);
    let span = tracing::info_span!("fx", prefix = %config.logger.prefix);
    let _entered = span.enter();

    match cli.command {
        Commands::Run(args) => run_session(&config, &args),
        Commands::Tones { output_dir } => run_tones(&config, output_dir.as_deref()),
        Commands::Config => {
            println!("{}", AppConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

/// One scripted host input.
#[derive(Debug)]
enum Step {
    Host(HostEvent),
    Control(Command),
    Snapshot,
}

fn build_script(args: &RunArgs) -> Vec<(u64, Step)> {
    let mut script = vec![(args.visible_at_ms, Step::Host(HostEvent::Visibility { ratio: 1.0 }))];
    if let Some(at) = args.gesture_at_ms {
        script.push((at, Step::Host(HostEvent::Click)));
    }
    if let Some(at) = args.pause_at_ms {
        script.push((at, Step::Control(Command::Pause)));
    }
    if let Some(at) = args.resume_at_ms {
        script.push((at, Step::Control(Command::Resume)));
    }
    if let Some(at) = args.restart_at_ms {
        script.push((at, Step::Control(Command::Restart)));
    }
    if let Some(every) = args.snapshot_every_ms.filter(|every| *every > 0) {
        let mut at = every;
        while at <= args.duration_ms {
            script.push((at, Step::Snapshot));
            at += every;
        }
    }
    script.sort_by_key(|(at, _)| *at);
    script
}

fn run_session(config: &AppConfig, args: &RunArgs) -> typewriter_fx_core::Result<()> {
    tracing::info!(duration_ms = args.duration_ms, "replaying hero session");

    let mut page = Page::hero(Viewport::new(args.width, args.height), &config.selectors);
    if args.no_graphics {
        page = page.without_graphics();
    }
    let recorder = ToneRecorder::new(config.audio.sample_rate);
    let mut runtime: HeroRuntime = match &args.libs {
        Some(dir) => launch(
            config,
            &page,
            &DirectoryLoader::new(dir),
            Box::new(recorder.clone()),
        )?,
        None => launch(
            config,
            &page,
            &AssetCatalog::bundled(&config.dependencies),
            Box::new(recorder.clone()),
        )?,
    };

    for (at, step) in build_script(args) {
        if at > args.duration_ms {
            break;
        }
        runtime.advance_to(at);
        match step {
            Step::Host(event) => runtime.dispatch(event),
            Step::Control(command) => {
                let applied = runtime.execute(command);
                tracing::debug!(?command, applied, at_ms = at, "control command");
            }
            Step::Snapshot => println!("{}", serde_json::to_string(&runtime.snapshot())?),
        }
    }
    runtime.advance_to(args.duration_ms);

    if let Some(path) = &args.audio_out {
        let mixdown = recorder.mixdown()?;
        let mut writer = Recorder::new(RecordingSettings::new(path, mixdown.sample_rate));
        writer.write_mixdown(&mixdown)?;
        tracing::info!(
            ?path,
            tones = mixdown.tones.len(),
            samples = writer.samples_written(),
            "session audio written"
        );
    }

    println!("{}", serde_json::to_string_pretty(&runtime.stats())?);
    Ok(())
}

fn run_tones(config: &AppConfig, output_dir: Option<&Path>) -> typewriter_fx_core::Result<()> {
    let sample_rate = config.audio.sample_rate;
    let mut analyser = ToneAnalyser::new(sample_rate);
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let presets = [
        ("typing", config.audio.typing),
        ("deleting", config.audio.deleting),
        ("completion", config.audio.completion),
    ];
    for (name, preset) in presets {
        let samples = synthesize(&preset, sample_rate);
        let analysis = analyser.analyse(&samples)?;
        tracing::debug!(tone = name, ?analysis, "tone analysed");
        println!(
            "{name:<10} {:>7.1} Hz (preset {:>7.1} Hz, ±{:.1})  rms {:.4}  peak {:.4}  {:.3} s",
            analysis.dominant_hz,
            preset.frequency_hz,
            analysis.resolution_hz,
            analysis.rms,
            analysis.peak,
            analysis.duration_s,
        );

        if let Some(dir) = output_dir {
            let path = dir.join(format!("{name}.wav"));
            write_wav(&path, &samples, sample_rate)?;
            tracing::info!(?path, "tone written");
        }
    }
    Ok(())
}

fn init_tracing(logger: &LoggerConfig) {
    let filter = if logger.enable {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("off")
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Typewriter hero animation, replayed headlessly", long_about = None)]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scripted session and print the final stats.
    Run(RunArgs),
    /// Synthesize and analyse the three tone presets.
    Tones {
        /// Write each tone as `<name>.wav` into this directory.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the default configuration.
    Config,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory holding the animation libraries; bundled copies when omitted.
    #[arg(long)]
    libs: Option<PathBuf>,
    #[arg(long, default_value_t = 15_000)]
    duration_ms: u64,
    /// When the hero section scrolls into view.
    #[arg(long, default_value_t = 0)]
    visible_at_ms: u64,
    /// First click; unlocks audio.
    #[arg(long)]
    gesture_at_ms: Option<u64>,
    #[arg(long)]
    pause_at_ms: Option<u64>,
    #[arg(long)]
    resume_at_ms: Option<u64>,
    #[arg(long)]
    restart_at_ms: Option<u64>,
    /// Print a JSON snapshot at this interval.
    #[arg(long)]
    snapshot_every_ms: Option<u64>,
    /// Mix every played tone into this WAV file.
    #[arg(long)]
    audio_out: Option<PathBuf>,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Simulate a page without a 3D context.
    #[arg(long)]
    no_graphics: bool,
}
