use std::time::{Duration, Instant};

use anyhow::Result;

use crate::audio::playback::PlaybackGateway;
use crate::config::ShowSettings;
use crate::output::driver::{DigitalOutput, Level};
use crate::scheduler::event_scheduler::EventScheduler;
use crate::show::stage::{Stage, StageAction, OPENING_TRACK, REFERENCE_SHOW};

/// Warmup flicker hold times in milliseconds.
const WARMUP_ON_MS: u64 = 25;
const WARMUP_OFF_MS: u64 = 50;

/// Process-wide show state, owned by the controller and mutated only through
/// its methods.
#[derive(Clone, Copy, Debug)]
pub struct ShowState {
    pub is_playing: bool,
    pub auto_start_pending: bool,
}

impl Default for ShowState {
    fn default() -> Self {
        Self {
            is_playing: false,
            auto_start_pending: true,
        }
    }
}

/// Runs the scripted show: starts playback, registers every stage with the
/// scheduler, and executes stage actions as they come due.
pub struct ShowController<O: DigitalOutput, P: PlaybackGateway> {
    outputs: O,
    playback: P,
    scheduler: EventScheduler<StageAction>,
    state: ShowState,
    stages: Vec<Stage>,
    laser_pin: u8,
    led_pin: u8,
    warmup_pulses: u32,
}

impl<O: DigitalOutput, P: PlaybackGateway> ShowController<O, P> {
    pub fn new(outputs: O, playback: P, settings: &ShowSettings) -> Self {
        Self::with_stages(outputs, playback, settings, REFERENCE_SHOW.to_vec())
    }

    pub fn with_stages(
        outputs: O,
        playback: P,
        settings: &ShowSettings,
        stages: Vec<Stage>,
    ) -> Self {
        ShowController {
            outputs,
            playback,
            scheduler: EventScheduler::new(),
            state: ShowState::default(),
            stages,
            laser_pin: settings.laser_pin,
            led_pin: settings.led_pin,
            warmup_pulses: settings.warmup_pulses,
        }
    }

    /// Starts the show: begins the opening track and schedules every stage at
    /// its offset from `now`. A non-success playback status is logged and the
    /// stage sequence runs regardless; the lights are the primary deliverable.
    ///
    /// Guarded against re-entry: a start while a show is already playing is
    /// ignored, so a stray command cannot double-schedule the sequence.
    pub fn start(&mut self, now: Instant) {
        if self.state.is_playing {
            log::warn!("show already playing, ignoring start");
            return;
        }

        let status = self.playback.start_track(OPENING_TRACK, Duration::ZERO);
        if !status.is_success() {
            log::warn!(
                "failed to start track {}: {}, continuing show without audio",
                OPENING_TRACK,
                status
            );
        }

        for stage in &self.stages {
            self.scheduler.schedule(now, stage.offset, stage.action);
        }

        self.state.is_playing = true;
        self.state.auto_start_pending = false;
        log::info!("show started, {} stages scheduled", self.stages.len());
    }

    /// Fires every stage that has come due. A failing stage is logged and
    /// does not stop the remaining due stages.
    pub fn poll(&mut self, now: Instant) {
        for action in self.scheduler.take_due(now) {
            if let Err(err) = self.execute(action) {
                log::warn!("stage {:?} failed: {:#}", action, err);
            }
        }
    }

    /// Boot auto-start: runs the show exactly once per process, the first
    /// time this is called while no show is playing.
    pub fn auto_start(&mut self, now: Instant) {
        if self.state.auto_start_pending && !self.state.is_playing {
            log::info!("auto-starting show");
            self.start(now);
        }
    }

    /// Aborts the show: discards pending stages, silences playback and blanks
    /// the outputs.
    pub fn stop(&mut self) {
        self.scheduler.clear();
        self.playback.stop();
        self.blank_outputs();
        self.state.is_playing = false;
        log::info!("show stopped");
    }

    fn execute(&mut self, action: StageAction) -> Result<()> {
        log::debug!("stage {:?}", action);
        match action {
            StageAction::LaserWarmup => {
                self.outputs
                    .pulse(self.laser_pin, WARMUP_ON_MS, WARMUP_OFF_MS, self.warmup_pulses);
            }
            StageAction::LedOn => self.outputs.set_output(self.led_pin, Level::High),
            StageAction::LedOff => self.outputs.set_output(self.led_pin, Level::Low),
            StageAction::LasersOn => self.outputs.set_output(self.laser_pin, Level::High),
            StageAction::PausePlayback => {
                self.playback.pause();
                self.blank_outputs();
            }
            StageAction::ResumePlayback => self.playback.resume(),
            StageAction::StopShow => {
                self.blank_outputs();
                self.state.is_playing = false;
            }
            StageAction::StartTrack(track) => {
                let status = self.playback.start_track(track, Duration::ZERO);
                if !status.is_success() {
                    log::warn!("failed to start track {}: {}", track, status);
                }
            }
        }
        Ok(())
    }

    fn blank_outputs(&mut self) {
        self.outputs.set_output(self.led_pin, Level::Low);
        self.outputs.set_output(self.laser_pin, Level::Low);
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn state(&self) -> ShowState {
        self.state
    }

    pub fn pending_stages(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::playback::PlaybackStatus;

    #[derive(Default)]
    struct FakeOutputs {
        writes: Vec<(u8, Level)>,
        holds: Vec<Duration>,
    }

    impl DigitalOutput for FakeOutputs {
        fn set_output(&mut self, pin: u8, level: Level) {
            self.writes.push((pin, level));
        }

        fn hold(&mut self, duration: Duration) {
            self.holds.push(duration);
        }
    }

    struct FakePlayback {
        started: Vec<(u16, Duration)>,
        status: PlaybackStatus,
        paused: bool,
    }

    impl FakePlayback {
        fn new(status: PlaybackStatus) -> Self {
            FakePlayback {
                started: Vec::new(),
                status,
                paused: false,
            }
        }
    }

    impl PlaybackGateway for FakePlayback {
        fn start_track(&mut self, track: u16, start_offset: Duration) -> PlaybackStatus {
            self.started.push((track, start_offset));
            self.status
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn stop(&mut self) {
            self.started.clear();
        }
    }

    fn controller(
        status: PlaybackStatus,
    ) -> ShowController<FakeOutputs, FakePlayback> {
        ShowController::new(
            FakeOutputs::default(),
            FakePlayback::new(status),
            &ShowSettings::default(),
        )
    }

    #[test]
    fn test_start_begins_opening_track_and_schedules_all_stages() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);

        assert_eq!(show.playback().started, vec![(1, Duration::ZERO)]);
        assert_eq!(show.pending_stages(), REFERENCE_SHOW.len());
        assert!(show.is_playing());
        assert!(!show.state().auto_start_pending);
    }

    #[test]
    fn test_start_while_playing_does_not_double_schedule() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);
        show.start(t0 + Duration::from_millis(1_000));

        assert_eq!(show.pending_stages(), REFERENCE_SHOW.len());
        assert_eq!(show.playback().started.len(), 1);
    }

    #[test]
    fn test_playback_failure_does_not_abort_stage_sequence() {
        let mut show = controller(PlaybackStatus::DeviceError);
        let t0 = Instant::now();

        show.start(t0);
        assert_eq!(show.pending_stages(), REFERENCE_SHOW.len());
        assert!(show.is_playing());

        show.poll(t0 + Duration::from_millis(27_500));
        let led_on = show
            .outputs()
            .writes
            .iter()
            .any(|&(pin, level)| pin == 9 && level == Level::High);
        assert!(led_on);
    }

    #[test]
    fn test_auto_start_fires_exactly_once() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.auto_start(t0);
        assert!(show.is_playing());
        assert_eq!(show.playback().started.len(), 1);

        // The guard also covers the post-show case: once a run has happened,
        // only an explicit command starts another one.
        show.poll(t0 + Duration::from_millis(140_000));
        assert!(!show.is_playing());
        show.auto_start(t0 + Duration::from_millis(141_000));
        assert_eq!(show.playback().started.len(), 2); // track 1 + track 2 only
    }

    #[test]
    fn test_warmup_stage_runs_flicker_on_laser_pin() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);
        show.poll(t0 + Duration::from_millis(7_000));

        let laser_writes: Vec<_> = show
            .outputs()
            .writes
            .iter()
            .filter(|&&(pin, _)| pin == 5)
            .collect();
        // 3 pulses = 3 on/off pairs
        assert_eq!(laser_writes.len(), 6);
        assert_eq!(
            show.outputs().holds,
            vec![
                Duration::from_millis(25),
                Duration::from_millis(50),
                Duration::from_millis(25),
                Duration::from_millis(50),
                Duration::from_millis(25),
                Duration::from_millis(150),
            ]
        );
    }

    #[test]
    fn test_pause_stage_pauses_audio_and_blanks_outputs() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);
        show.poll(t0 + Duration::from_millis(44_000));

        assert!(show.playback().paused);
        let last_writes: Vec<_> = show.outputs().writes.iter().rev().take(2).collect();
        assert!(last_writes.iter().all(|&&(_, level)| level == Level::Low));
    }

    #[test]
    fn test_stop_stage_clears_playing_flag_but_keeps_later_stages() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);
        show.poll(t0 + Duration::from_millis(110_000));

        assert!(!show.is_playing());
        // The second track stage at 140s must survive the stop stage.
        assert_eq!(show.pending_stages(), 1);
    }

    #[test]
    fn test_explicit_stop_discards_pending_stages() {
        let mut show = controller(PlaybackStatus::Success);
        let t0 = Instant::now();

        show.start(t0);
        show.stop();

        assert!(!show.is_playing());
        assert_eq!(show.pending_stages(), 0);
        show.poll(t0 + Duration::from_millis(140_000));
        assert!(show.playback().started.is_empty());
    }
}
