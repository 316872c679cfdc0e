use chrono::{DateTime, SubsecRound, Utc};
use std::fmt;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Discriminator as persisted and shown to the user.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    /// Value used by the form's type selector.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }

    /// Accepts either the selector value or the discriminator, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("running") {
            Some(Self::Running)
        } else if s.eq_ignore_ascii_case("cycling") {
            Some(Self::Cycling)
        } else {
            None
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific inputs plus the metric derived from them at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metrics {
    /// `pace` is minutes per km.
    Running { cadence: f64, pace: f64 },
    /// `speed` is km/h. Elevation gain may be zero or negative.
    Cycling { elevation: f64, speed: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    coords: Coords,
    duration: f64,
    distance: f64,
    metrics: Metrics,
}

/// Builds a workout of the requested kind, deriving pace or speed.
///
/// `extra` is the cadence for running and the elevation gain for cycling.
/// No validation happens here; callers must only pass inputs that already
/// satisfy the workout invariants. `date` is truncated to whole milliseconds,
/// the precision it is persisted with.
pub fn create_workout(
    kind: WorkoutKind,
    coords: Coords,
    duration: f64,
    distance: f64,
    extra: f64,
    date: DateTime<Utc>,
) -> Workout {
    let date = date.trunc_subsecs(3);
    Workout::with_id(id_from_timestamp(date), kind, coords, duration, distance, extra, date)
}

/// Last 10 decimal digits of the millisecond timestamp.
pub fn id_from_timestamp(date: DateTime<Utc>) -> String {
    let ms = date.timestamp_millis().to_string();
    let start = ms.len().saturating_sub(10);
    ms[start..].to_string()
}

impl Workout {
    pub(crate) fn with_id(
        id: String,
        kind: WorkoutKind,
        coords: Coords,
        duration: f64,
        distance: f64,
        extra: f64,
        date: DateTime<Utc>,
    ) -> Self {
        let metrics = match kind {
            WorkoutKind::Running => Metrics::Running {
                cadence: extra,
                pace: duration / distance,
            },
            WorkoutKind::Cycling => Metrics::Cycling {
                elevation: extra,
                speed: distance / (duration / 60.0),
            },
        };

        Self {
            id,
            date,
            coords,
            duration,
            distance,
            metrics,
        }
    }

    /// Reassembles a workout whose derived metric was computed earlier.
    pub(crate) const fn from_parts(
        id: String,
        date: DateTime<Utc>,
        coords: Coords,
        duration: f64,
        distance: f64,
        metrics: Metrics,
    ) -> Self {
        Self {
            id,
            date,
            coords,
            duration,
            distance,
            metrics,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    /// Minutes.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Kilometers.
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.metrics {
            Metrics::Running { .. } => WorkoutKind::Running,
            Metrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// True when the shared and variant inputs hold the positivity invariants.
    pub fn is_well_formed(&self) -> bool {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let base = positive(self.distance)
            && positive(self.duration)
            && self.coords.lat.is_finite()
            && self.coords.lng.is_finite();

        base && match self.metrics {
            Metrics::Running { cadence, pace } => positive(cadence) && pace.is_finite(),
            Metrics::Cycling { elevation, speed } => elevation.is_finite() && speed.is_finite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 30, 0).unwrap()
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let w = create_workout(
            WorkoutKind::Running,
            Coords::new(51.5, -0.12),
            30.0,
            5.0,
            150.0,
            at(),
        );
        assert_eq!(w.kind(), WorkoutKind::Running);
        assert_eq!(w.kind().as_str(), "Running");
        assert_eq!(
            w.metrics(),
            Metrics::Running {
                cadence: 150.0,
                pace: 6.0
            }
        );
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let w = create_workout(
            WorkoutKind::Cycling,
            Coords::new(48.85, 2.35),
            45.0,
            27.0,
            -12.0,
            at(),
        );
        let Metrics::Cycling { elevation, speed } = w.metrics() else {
            panic!("expected cycling metrics");
        };
        assert_eq!(elevation, -12.0);
        assert_eq!(speed, 27.0 / (45.0 / 60.0));
        assert!(w.is_well_formed());
    }

    #[test]
    fn id_is_last_ten_digits_of_millis() {
        let date = at();
        let id = id_from_timestamp(date);
        assert_eq!(id.len(), 10);
        assert!(date.timestamp_millis().to_string().ends_with(&id));
    }

    #[test]
    fn creation_date_keeps_millisecond_precision() {
        let date = at().with_nanosecond(123_456_789).unwrap();
        let w = create_workout(
            WorkoutKind::Running,
            Coords::new(51.5, -0.12),
            30.0,
            5.0,
            150.0,
            date,
        );
        assert_eq!(w.date().nanosecond(), 123_000_000);
        assert_eq!(w.id(), id_from_timestamp(date));
    }

    #[test]
    fn kind_parse_accepts_both_spellings() {
        assert_eq!(WorkoutKind::parse("running"), Some(WorkoutKind::Running));
        assert_eq!(WorkoutKind::parse("Cycling"), Some(WorkoutKind::Cycling));
        assert_eq!(WorkoutKind::parse("swimming"), None);
        assert_eq!(WorkoutKind::Running.toggled(), WorkoutKind::Cycling);
    }

    #[test]
    fn non_positive_inputs_are_not_well_formed() {
        let w = Workout::from_parts(
            "1".into(),
            at(),
            Coords::new(0.0, 0.0),
            30.0,
            0.0,
            Metrics::Running {
                cadence: 150.0,
                pace: f64::INFINITY,
            },
        );
        assert!(!w.is_well_formed());
    }
}
