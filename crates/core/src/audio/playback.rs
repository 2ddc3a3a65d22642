use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use crate::audio::track_library::TrackLibrary;

/// Outcome of a `start_track` request. Any non-success code is loggable but
/// non-fatal: the show controller continues its stage sequence regardless of
/// the audio outcome.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlaybackStatus {
    Success,
    NotFound,
    DecodeError,
    DeviceError,
}

impl PlaybackStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PlaybackStatus::Success)
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Success => write!(f, "success"),
            PlaybackStatus::NotFound => write!(f, "track not found"),
            PlaybackStatus::DecodeError => write!(f, "decode error"),
            PlaybackStatus::DeviceError => write!(f, "audio device error"),
        }
    }
}

/// Interface the show controller drives for audio. `service_buffer` must be
/// called every loop iteration; backends that feed themselves (rodio runs its
/// own output thread) leave it as the default no-op.
pub trait PlaybackGateway {
    fn start_track(&mut self, track: u16, start_offset: Duration) -> PlaybackStatus;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    fn service_buffer(&mut self) {}
}

impl<P: PlaybackGateway + ?Sized> PlaybackGateway for Box<P> {
    fn start_track(&mut self, track: u16, start_offset: Duration) -> PlaybackStatus {
        (**self).start_track(track, start_offset)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn service_buffer(&mut self) {
        (**self).service_buffer()
    }
}

/// Rodio-backed playback gateway.
pub struct RodioPlayback {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    library: TrackLibrary,
    current_track: Option<u16>,
    volume: f32,
}

impl RodioPlayback {
    pub fn new(library: TrackLibrary) -> Result<Self, anyhow::Error> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| anyhow::anyhow!("failed to open audio output stream: {}", e))?;

        Ok(RodioPlayback {
            _stream: stream,
            stream_handle,
            sink: None,
            library,
            current_track: None,
            volume: 1.0,
        })
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    pub fn is_playing(&self) -> bool {
        if let Some(sink) = &self.sink {
            !sink.is_paused() && !sink.empty()
        } else {
            false
        }
    }

    pub fn current_track(&self) -> Option<u16> {
        self.current_track
    }
}

impl PlaybackGateway for RodioPlayback {
    fn start_track(&mut self, track: u16, start_offset: Duration) -> PlaybackStatus {
        let path = self.library.track_path(track);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(_) => return PlaybackStatus::NotFound,
        };
        let reader = BufReader::new(file);

        let source = match Decoder::new(reader) {
            Ok(source) => source,
            Err(_) => return PlaybackStatus::DecodeError,
        };

        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(_) => return PlaybackStatus::DeviceError,
        };

        // Replacing the sink drops any previous track.
        sink.append(source.skip_duration(start_offset));
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        self.current_track = Some(track);

        log::info!("playing {} from {:?}", path.display(), start_offset);
        PlaybackStatus::Success
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current_track = None;
    }
}

/// Silent gateway for `--mute` runs: accepts every request and plays nothing.
#[derive(Default)]
pub struct NullPlayback {
    current_track: Option<u16>,
    paused: bool,
}

impl PlaybackGateway for NullPlayback {
    fn start_track(&mut self, track: u16, _start_offset: Duration) -> PlaybackStatus {
        self.current_track = Some(track);
        self.paused = false;
        PlaybackStatus::Success
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn stop(&mut self) {
        self.current_track = None;
    }
}
