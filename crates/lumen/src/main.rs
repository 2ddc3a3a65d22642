use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use lumen_core::{
    CommandDispatcher, ConfigManager, ConsoleOutputs, NullPlayback, PlaybackGateway,
    RodioPlayback, ShowCommand, ShowController, TrackLibrary,
};

/// Scripted laser light show synchronized to an audio track.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Lumen light show sequencer")]
struct Args {
    /// Path to the configuration file (default: config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the tracks directory from the config file
    #[arg(long)]
    tracks_dir: Option<PathBuf>,

    /// Run the light sequence without audio output
    #[arg(long)]
    mute: bool,
}

/// Loop pacing. Scheduling resolution is cooperative-poll anyway, so a short
/// sleep just bounds CPU burn.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config_manager = ConfigManager::new(args.config);
    let mut settings = config_manager.load().context("loading configuration")?;
    if let Some(tracks_dir) = args.tracks_dir {
        settings.tracks_dir = tracks_dir;
    }
    if args.mute {
        settings.audio_enabled = false;
    }

    // Storage must be verified before any show can run; a failure here is
    // fatal at boot.
    let library = TrackLibrary::new(&settings.tracks_dir);
    library
        .verify()
        .with_context(|| format!("verifying track storage in {}", settings.tracks_dir.display()))?;
    let tracks = library.list_tracks().context("listing tracks")?;
    log::info!(
        "found {} track(s) in {}",
        tracks.len(),
        settings.tracks_dir.display()
    );

    let playback: Box<dyn PlaybackGateway> = if settings.audio_enabled {
        Box::new(RodioPlayback::new(library).context("opening audio output")?)
    } else {
        log::info!("audio muted, running lights only");
        Box::new(NullPlayback::default())
    };

    let mut show = ShowController::new(ConsoleOutputs::new(), playback, &settings);
    let dispatcher = CommandDispatcher::default();

    log::info!("lumen {} ready, press 'v' to start, 'q' to quit", env!("CARGO_PKG_VERSION"));

    terminal::enable_raw_mode().context("enabling raw terminal mode")?;
    let result = run_loop(&mut show, &dispatcher);
    terminal::disable_raw_mode().context("restoring terminal mode")?;

    result
}

/// The cooperative poll loop. Every iteration, in order: service the playback
/// gateway's buffering, dispatch at most one input byte, advance the
/// scheduler, then let the boot auto-start run once.
fn run_loop(
    show: &mut ShowController<ConsoleOutputs, Box<dyn PlaybackGateway>>,
    dispatcher: &CommandDispatcher,
) -> Result<(), anyhow::Error> {
    loop {
        show.playback_mut().service_buffer();

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            log::info!("shutting down");
                            show.stop();
                            return Ok(());
                        }
                        KeyCode::Char(c) if c.is_ascii() => {
                            match dispatcher.dispatch(c as u8) {
                                Some(ShowCommand::StartShow) => show.start(Instant::now()),
                                Some(ShowCommand::StopShow) => show.stop(),
                                None => {}
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        let now = Instant::now();
        show.poll(now);
        show.auto_start(now);

        thread::sleep(POLL_INTERVAL);
    }
}
