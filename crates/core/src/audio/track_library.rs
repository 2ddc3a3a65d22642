use std::fs;
use std::path::{Path, PathBuf};

/// Storage collaborator: resolves numeric track ids to files in the tracks
/// directory. The show references tracks by 1-based id; files follow the
/// fixed `trackNNN.mp3` naming convention (3-digit, zero-padded).
#[derive(Clone, Debug)]
pub struct TrackLibrary {
    tracks_dir: PathBuf,
}

#[derive(Debug)]
pub enum TrackLibraryError {
    MissingDirectory(PathBuf),
    NotADirectory(PathBuf),
    ReadError(PathBuf, String),
}

impl std::fmt::Display for TrackLibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackLibraryError::MissingDirectory(path) => {
                write!(f, "tracks directory does not exist: {}", path.display())
            }
            TrackLibraryError::NotADirectory(path) => {
                write!(f, "tracks path is not a directory: {}", path.display())
            }
            TrackLibraryError::ReadError(path, err) => write!(
                f,
                "failed to read tracks directory {}: {}",
                path.display(),
                err
            ),
        }
    }
}

impl std::error::Error for TrackLibraryError {}

impl TrackLibrary {
    pub fn new<P: AsRef<Path>>(tracks_dir: P) -> Self {
        TrackLibrary {
            tracks_dir: tracks_dir.as_ref().to_path_buf(),
        }
    }

    /// File name for a track id, e.g. `track001.mp3` for track 1.
    pub fn track_file_name(track: u16) -> String {
        format!("track{:03}.mp3", track)
    }

    pub fn track_path(&self, track: u16) -> PathBuf {
        self.tracks_dir.join(Self::track_file_name(track))
    }

    pub fn has_track(&self, track: u16) -> bool {
        self.track_path(track).is_file()
    }

    /// Boot-time storage check. A show cannot run without verified access to
    /// the tracks directory, so callers treat a failure here as fatal.
    pub fn verify(&self) -> Result<(), TrackLibraryError> {
        if !self.tracks_dir.exists() {
            return Err(TrackLibraryError::MissingDirectory(self.tracks_dir.clone()));
        }
        if !self.tracks_dir.is_dir() {
            return Err(TrackLibraryError::NotADirectory(self.tracks_dir.clone()));
        }
        fs::read_dir(&self.tracks_dir)
            .map_err(|e| TrackLibraryError::ReadError(self.tracks_dir.clone(), e.to_string()))?;
        Ok(())
    }

    /// Lists the track files present in the directory, sorted by file name.
    pub fn list_tracks(&self) -> Result<Vec<PathBuf>, TrackLibraryError> {
        let entries = fs::read_dir(&self.tracks_dir)
            .map_err(|e| TrackLibraryError::ReadError(self.tracks_dir.clone(), e.to_string()))?;

        let mut tracks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                TrackLibraryError::ReadError(self.tracks_dir.clone(), e.to_string())
            })?;
            let path = entry.path();

            if path.is_file() && path.extension().map_or(false, |ext| ext == "mp3") {
                tracks.push(path);
            }
        }
        tracks.sort();

        Ok(tracks)
    }
}
