//! Ordered, append-only workout collection mirrored to a storage slot.
//!
//! The slot holds a JSON array with one record per workout. Timestamps are
//! stored as RFC 3339 strings and parsed back into `DateTime<Utc>` on load;
//! derived metrics are stored as computed and are not recomputed.

use crate::dlog;
use crate::error::PersistenceError;
use crate::storage::Storage;
use crate::types::{Coords, Metrics, Workout, WorkoutKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Name of the slot holding the serialized workouts.
pub const STORAGE_KEY: &str = "workouts";

pub struct WorkoutStore<S> {
    storage: S,
    workouts: Vec<Workout>,
}

impl<S: Storage> WorkoutStore<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            workouts: Vec::new(),
        }
    }

    /// Adds to the in-memory sequence only; call [`Self::save`] to persist.
    pub fn append(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn save(&mut self) -> Result<(), PersistenceError> {
        let records: Vec<WorkoutRecord> = self.workouts.iter().map(WorkoutRecord::from).collect();
        let json = serde_json::to_string(&records)?;
        self.storage.set(STORAGE_KEY, &json)?;
        dlog!("store_saved count={} bytes={}", records.len(), json.len());
        Ok(())
    }

    /// Replaces the in-memory sequence with the persisted one.
    ///
    /// An absent or unparseable slot leaves the sequence empty. Records that
    /// cannot be restored are skipped. Returns the number of workouts loaded.
    pub fn load(&mut self) -> Result<usize, PersistenceError> {
        let Some(raw) = self.storage.get(STORAGE_KEY)? else {
            dlog!("store_load_empty key={STORAGE_KEY}");
            self.workouts.clear();
            return Ok(0);
        };

        let entries: Vec<JsonValue> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(err = %e, "persisted workouts are malformed; starting empty");
                self.workouts.clear();
                return Ok(0);
            }
        };

        let total = entries.len();
        let mut restored = Vec::with_capacity(total);
        for (idx, entry) in entries.into_iter().enumerate() {
            let record: WorkoutRecord = match serde_json::from_value(entry) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(idx, err = %e, "skipping unreadable workout record");
                    continue;
                }
            };
            match record.into_workout() {
                Some(w) => restored.push(w),
                None => tracing::warn!(idx, "skipping invalid workout record"),
            }
        }

        tracing::info!(loaded = restored.len(), skipped = total - restored.len(), "workouts loaded");
        self.workouts = restored;
        Ok(self.workouts.len())
    }

    /// Clears the in-memory sequence and the persistent slot.
    pub fn reset(&mut self) -> Result<(), PersistenceError> {
        self.workouts.clear();
        self.storage.remove(STORAGE_KEY)
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

/// Persisted shape of a single workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkoutRecord {
    id: String,
    date: String,
    coords: [f64; 2],
    duration: f64,
    distance: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let (cadence, pace, elevation, speed) = match w.metrics() {
            Metrics::Running { cadence, pace } => (Some(cadence), Some(pace), None, None),
            Metrics::Cycling { elevation, speed } => (None, None, Some(elevation), Some(speed)),
        };
        let c = w.coords();

        Self {
            id: w.id().to_string(),
            date: w.date().to_rfc3339_opts(SecondsFormat::Millis, true),
            coords: [c.lat, c.lng],
            duration: w.duration(),
            distance: w.distance(),
            kind: w.kind().as_str().to_string(),
            cadence,
            pace,
            elevation,
            speed,
        }
    }
}

impl WorkoutRecord {
    fn into_workout(self) -> Option<Workout> {
        let date = DateTime::parse_from_rfc3339(&self.date)
            .ok()?
            .with_timezone(&Utc);
        let kind = WorkoutKind::parse(&self.kind)?;

        // A record missing its derived metric gets it recomputed from inputs.
        let metrics = match kind {
            WorkoutKind::Running => {
                let cadence = self.cadence?;
                Metrics::Running {
                    cadence,
                    pace: self.pace.unwrap_or(self.duration / self.distance),
                }
            }
            WorkoutKind::Cycling => {
                let elevation = self.elevation?;
                Metrics::Cycling {
                    elevation,
                    speed: self
                        .speed
                        .unwrap_or(self.distance / (self.duration / 60.0)),
                }
            }
        };

        let [lat, lng] = self.coords;
        let workout = Workout::from_parts(
            self.id,
            date,
            Coords::new(lat, lng),
            self.duration,
            self.distance,
            metrics,
        );
        workout.is_well_formed().then_some(workout)
    }
}
