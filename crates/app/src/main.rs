mod session;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use datavis_core::{
    compute_positions, AppConfig, DataVisError, PlaybackClock, SceneGraph, SineSynth,
    StructureKind, VisContext,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, Instant, MissedTickBehavior},
};
use tracing_subscriber::EnvFilter;

use session::{describe, Command, HELP};

/// Period of the render loop that drives auto-play.
const FRAME: Duration = Duration::from_millis(16);

type Visualiser = VisContext<SceneGraph, SineSynth>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> datavis_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.settings.resolve()?;

    match cli.command {
        Commands::Run => run_interactive(&config).await,
        Commands::Demo { seconds, fast } => run_demo(&config, seconds, fast).await,
        Commands::Layout { count } => print_layout(&config, count),
    }
}

async fn run_interactive(config: &AppConfig) -> datavis_core::Result<()> {
    tracing::info!(kind = %config.structure.kind, "starting interactive session");

    let mut vis = Visualiser::create(config, SceneGraph::new(), SineSynth::new())?;
    println!("{HELP}");
    show(&vis);

    let started = Instant::now();
    let mut frames = time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                if !vis.poll(started.elapsed()).is_empty() {
                    show(&vis);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle(&mut vis, command, started.elapsed()),
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    vis.shutdown();
    Ok(())
}

fn handle(vis: &mut Visualiser, command: Command, now: Duration) {
    let outcome = match command {
        Command::Insert(value) => {
            vis.insert(value);
            Ok(())
        }
        Command::Remove => vis.remove().map(|value| println!("removed {value}")),
        Command::Play => {
            if !vis.start_auto_play(now) {
                println!("nothing to play: insert a value first");
            }
            Ok(())
        }
        Command::Stop => {
            vis.stop_auto_play();
            Ok(())
        }
        Command::Kind(kind) => {
            vis.set_kind(kind);
            Ok(())
        }
        Command::Size(size) => {
            let mut params = *vis.controller().layout();
            params.element_size = size;
            vis.set_layout(params)
        }
        Command::Spacing(spacing) => {
            let mut params = *vis.controller().layout();
            params.spacing = spacing;
            vis.set_layout(params)
        }
        Command::Speed(speed) => vis.set_speed(speed),
        Command::Show => Ok(()),
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => return,
    };

    match outcome {
        Ok(()) => show(vis),
        Err(DataVisError::EmptyStructure) => println!("structure is empty"),
        Err(err) => println!("{err}"),
    }
}

async fn run_demo(config: &AppConfig, seconds: u64, fast: bool) -> datavis_core::Result<()> {
    tracing::info!(seconds, fast, "running auto-play demo");

    let mut vis = Visualiser::create(config, SceneGraph::new(), SineSynth::new())?;
    let notes = vis.audio().history();
    show(&vis);

    let mut clock = PlaybackClock::new();
    let end = Duration::from_secs(seconds);
    let mut frames = time::interval(FRAME);

    if vis.start_auto_play(clock.elapsed()) {
        while clock.elapsed() < end && vis.playback().running {
            if !fast {
                frames.tick().await;
            }
            let events = vis.poll(clock.advance(FRAME));
            if !events.is_empty() {
                show(&vis);
            }
        }
    } else {
        println!("nothing to play");
    }

    let stats = vis.scene().stats();
    tracing::info!(
        created = stats.created,
        destroyed = stats.destroyed,
        notes = ?notes.notes()?,
        "demo finished"
    );
    vis.shutdown();
    Ok(())
}

fn print_layout(config: &AppConfig, count: usize) -> datavis_core::Result<()> {
    let positions = compute_positions(config.structure.kind, count, &config.structure.layout());
    let json: Vec<[f32; 3]> = positions.into_iter().map(Into::into).collect();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn show(vis: &Visualiser) {
    let state = vis.playback();
    let status = if state.running {
        format!(" [playing, {} ms]", state.interval_ms)
    } else {
        String::new()
    };
    println!("{}{status}", describe(vis.controller().kind(), vis.scene()));
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive 3D data structure visualiser", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand. Flags override the config file.
#[derive(clap::Args, Debug)]
struct Settings {
    /// TOML file with structure, audio and auto-play settings.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Structure to visualise: queue, stack, array or ring.
    #[arg(short, long, global = true)]
    kind: Option<StructureKind>,
    /// Edge length of each element cube.
    #[arg(long, global = true)]
    size: Option<f32>,
    /// Distance between neighbouring elements.
    #[arg(long, global = true)]
    spacing: Option<f32>,
    /// Auto-play speed multiplier.
    #[arg(long, global = true)]
    speed: Option<f32>,
}

impl Settings {
    fn resolve(&self) -> datavis_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        let structure = &mut config.structure;
        if let Some(kind) = self.kind {
            structure.kind = kind;
        }
        if let Some(size) = self.size {
            structure.element_size = size;
        }
        if let Some(spacing) = self.spacing {
            structure.spacing = spacing;
        }
        if let Some(speed) = self.speed {
            structure.speed = speed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Edit the structure interactively from stdin.
    Run,
    /// Let auto-play churn the structure for a while.
    Demo {
        /// How long to run, in session seconds.
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
        /// Advance the clock without waiting for real time.
        #[arg(long)]
        fast: bool,
    },
    /// Print element positions for the configured structure as JSON.
    Layout {
        /// Number of elements to lay out.
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}
