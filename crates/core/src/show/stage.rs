use std::time::Duration;

/// Effect produced by one scheduled stage of the show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StageAction {
    /// Blocking laser flicker while the diodes come up to temperature.
    LaserWarmup,
    LedOn,
    LedOff,
    LasersOn,
    /// Pause the audio and blank the outputs for the dramatic beat.
    PausePlayback,
    ResumePlayback,
    /// End of the light sequence: blank outputs, clear the playing flag.
    StopShow,
    StartTrack(u16),
}

/// One stage of a show: an action at a fixed offset from show start.
#[derive(Clone, Copy, Debug)]
pub struct Stage {
    pub offset: Duration,
    pub action: StageAction,
}

const fn stage(offset_ms: u64, action: StageAction) -> Stage {
    Stage {
        offset: Duration::from_millis(offset_ms),
        action,
    }
}

/// The scripted reference show, in offset order. The 44-45s beat pauses the
/// music and blanks the room, then brings everything back one second later.
pub const REFERENCE_SHOW: &[Stage] = &[
    stage(7_000, StageAction::LaserWarmup),
    stage(27_500, StageAction::LedOn),
    stage(40_000, StageAction::LasersOn),
    stage(44_000, StageAction::PausePlayback),
    stage(45_000, StageAction::ResumePlayback),
    stage(45_000, StageAction::LedOn),
    stage(45_000, StageAction::LasersOn),
    stage(58_000, StageAction::LedOff),
    stage(110_000, StageAction::StopShow),
    stage(140_000, StageAction::StartTrack(2)),
];

/// Track started at show start (offset zero).
pub const OPENING_TRACK: u16 = 1;
