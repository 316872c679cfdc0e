//! Presentation of a workout as a map popup and as a list entry.

use crate::types::{Metrics, Workout, WorkoutKind};
use chrono::{Local, TimeZone};
use std::fmt;

/// Marker popup content plus the options the map widget applies to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub class_name: String,
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Popup {
    pub fn for_workout(workout: &Workout) -> Self {
        let kind = workout.kind();
        Self {
            content: format!("{} {}", kind.emoji(), title(workout)),
            class_name: format!("{}-popup", kind.slug()),
            max_width: 250,
            min_width: 150,
            auto_close: false,
            close_on_click: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl DetailRow {
    const fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// A workout's summary in the sidebar list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub details: Vec<DetailRow>,
}

impl ListEntry {
    pub fn for_workout(workout: &Workout) -> Self {
        let kind = workout.kind();
        let mut details = vec![
            DetailRow::new(kind.emoji(), workout.distance().to_string(), "km"),
            DetailRow::new("⏱", workout.duration().to_string(), "min"),
        ];

        match workout.metrics() {
            Metrics::Running { cadence, pace } => {
                details.push(DetailRow::new("⚡️", format!("{pace:.1}"), "min/km"));
                details.push(DetailRow::new("🦶🏼", cadence.to_string(), "spm"));
            }
            Metrics::Cycling { elevation, speed } => {
                details.push(DetailRow::new("⚡️", speed.to_string(), "km/h"));
                details.push(DetailRow::new("⛰", elevation.to_string(), "m"));
            }
        }

        Self {
            id: workout.id().to_string(),
            kind,
            title: title(workout),
            details,
        }
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for d in &self.details {
            write!(f, "  {} {} {}", d.icon, d.value, d.unit)?;
        }
        Ok(())
    }
}

/// `<Type> on <Month> <day>`, e.g. "Running on March 5", on the local calendar.
pub fn title(workout: &Workout) -> String {
    title_in(workout, &Local)
}

/// Like [`title`], with the day taken in `tz`.
pub fn title_in<Tz>(workout: &Workout, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let local = workout.date().with_timezone(tz);
    format!("{} on {}", workout.kind(), local.format("%B %-d"))
}
