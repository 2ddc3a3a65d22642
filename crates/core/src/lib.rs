pub use audio::playback::{NullPlayback, PlaybackGateway, PlaybackStatus, RodioPlayback};
pub use audio::track_library::{TrackLibrary, TrackLibraryError};
pub use commands::{CommandDispatcher, ShowCommand};
pub use config::{ConfigError, ConfigFile, ConfigManager, ShowSettings};
pub use output::driver::{ConsoleOutputs, DigitalOutput, Level};
pub use scheduler::event_scheduler::{EventHandle, EventScheduler};
pub use show::show_controller::{ShowController, ShowState};
pub use show::stage::{Stage, StageAction, OPENING_TRACK, REFERENCE_SHOW};

mod audio;
mod commands;
mod config;
mod output;
mod scheduler;
mod show;
