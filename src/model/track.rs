use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::LonLat;
use crate::foundation::error::{VesselError, VesselResult};

/// One timestamped position report.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Reported position.
    pub coordinates: LonLat,
    /// Report time in epoch milliseconds.
    pub timestamp: i64,
}

/// A named vessel track: waypoints in chronological order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Display name or vessel identifier.
    #[serde(default)]
    pub name: String,
    /// Ordered waypoints.
    pub waypoints: Vec<Waypoint>,
}

impl Track {
    /// Create a track from `(lon, lat, timestamp)` triples.
    pub fn from_points(name: impl Into<String>, points: &[(f64, f64, i64)]) -> Self {
        Self {
            name: name.into(),
            waypoints: points
                .iter()
                .map(|&(lon, lat, timestamp)| Waypoint {
                    coordinates: LonLat::new(lon, lat),
                    timestamp,
                })
                .collect(),
        }
    }

    /// Positions in waypoint order.
    pub fn path(&self) -> Vec<LonLat> {
        self.waypoints.iter().map(|w| w.coordinates).collect()
    }

    /// Timestamps in waypoint order.
    pub fn timestamps(&self) -> Vec<i64> {
        self.waypoints.iter().map(|w| w.timestamp).collect()
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Return `true` when the track has no waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of segments (consecutive waypoint pairs); zero for fewer than two waypoints.
    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Return `true` when timestamps never decrease along the track.
    pub fn is_chronological(&self) -> bool {
        self.waypoints
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

/// An ordered collection of tracks, the data unit handed to a layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrackSet {
    /// Tracks in draw order.
    pub tracks: Vec<Track>,
}

impl<'de> Deserialize<'de> for TrackSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(Vec<Track>),
            Wrapped { tracks: Vec<Track> },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(tracks) | Repr::Wrapped { tracks } => Self { tracks },
        })
    }
}

impl TrackSet {
    /// Wrap already-built tracks.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Parse tracks from a JSON reader.
    ///
    /// Accepts either a bare array of tracks or an object with a `tracks` array.
    pub fn from_reader<R: std::io::Read>(r: R) -> VesselResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VesselError::validation(format!("parse track JSON: {e}")))
    }

    /// Parse tracks from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VesselResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VesselError::validation(format!("open track JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Return `true` when the set holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of segments over all tracks.
    pub fn segment_count(&self) -> usize {
        self.tracks.iter().map(Track::segment_count).sum()
    }

    /// Smallest timestamp over all waypoints.
    pub fn min_timestamp(&self) -> Option<i64> {
        self.tracks
            .iter()
            .flat_map(|t| t.waypoints.iter().map(|w| w.timestamp))
            .min()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/track.rs"]
mod tests;
