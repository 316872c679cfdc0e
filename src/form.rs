//! Form values and submission validation.
//!
//! The form surface hands over raw text for every field. Validation turns it
//! into a [`WorkoutDraft`] whose numbers satisfy the workout invariants, or
//! names the first offending field.

use crate::error::ValidationError;
use crate::types::WorkoutKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "type" => Some(Self::Type),
            "distance" => Some(Self::Distance),
            "duration" => Some(Self::Duration),
            "cadence" => Some(Self::Cadence),
            "elevation" => Some(Self::Elevation),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current contents of the form, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            kind: WorkoutKind::default().slug().to_string(),
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }
}

impl FormInput {
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Type => self.kind = value,
            FormField::Distance => self.distance = value,
            FormField::Duration => self.duration = value,
            FormField::Cadence => self.cadence = value,
            FormField::Elevation => self.elevation = value,
        }
    }

    /// Empties the numeric fields; the type selector keeps its value.
    pub fn clear(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }
}

/// Validated inputs, ready for [`crate::types::create_workout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutDraft {
    pub kind: WorkoutKind,
    pub distance: f64,
    pub duration: f64,
    /// Cadence for running, elevation gain for cycling.
    pub extra: f64,
}

pub fn validate(input: &FormInput) -> Result<WorkoutDraft, ValidationError> {
    let kind = WorkoutKind::parse(input.kind.trim())
        .ok_or_else(|| ValidationError::UnknownType(input.kind.clone()))?;

    let distance = positive(FormField::Distance, &input.distance)?;
    let duration = positive(FormField::Duration, &input.duration)?;
    let extra = match kind {
        WorkoutKind::Running => positive(FormField::Cadence, &input.cadence)?,
        WorkoutKind::Cycling => finite(FormField::Elevation, &input.elevation)?,
    };

    Ok(WorkoutDraft {
        kind,
        distance,
        duration,
        extra,
    })
}

fn finite(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotANumber(field))
}

fn positive(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    let v = finite(field, raw)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ValidationError::NotPositive(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(kind: &str, distance: &str, duration: &str, cadence: &str, elevation: &str) -> FormInput {
        FormInput {
            kind: kind.into(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            elevation: elevation.into(),
        }
    }

    #[test]
    fn accepts_valid_running() {
        let draft = validate(&input("running", "5", "30", "150", "")).unwrap();
        assert_eq!(draft.kind, WorkoutKind::Running);
        assert_eq!(draft.extra, 150.0);
    }

    #[test]
    fn rejects_zero_distance() {
        let err = validate(&input("running", "0", "30", "150", "")).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(FormField::Distance));
    }

    #[test]
    fn rejects_negative_duration() {
        let err = validate(&input("cycling", "10", "-5", "", "20")).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(FormField::Duration));
    }

    #[test]
    fn rejects_non_numeric_cadence() {
        let err = validate(&input("running", "5", "30", "fast", "")).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber(FormField::Cadence));
    }

    #[test]
    fn rejects_infinite_values() {
        let err = validate(&input("running", "inf", "30", "150", "")).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber(FormField::Distance));
        let err = validate(&input("cycling", "5", "30", "", "NaN")).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber(FormField::Elevation));
    }

    #[test]
    fn cycling_elevation_may_be_negative_or_zero() {
        assert_eq!(validate(&input("cycling", "20", "60", "", "-40")).unwrap().extra, -40.0);
        assert_eq!(validate(&input("cycling", "20", "60", "", "0")).unwrap().extra, 0.0);
    }

    #[test]
    fn cycling_ignores_cadence_field() {
        assert!(validate(&input("cycling", "20", "60", "garbage", "5")).is_ok());
    }

    #[test]
    fn empty_elevation_is_not_a_number() {
        let err = validate(&input("cycling", "20", "60", "", " ")).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber(FormField::Elevation));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = validate(&input("rowing", "1", "1", "1", "1")).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownType(_)));
    }

    #[test]
    fn clear_keeps_type() {
        let mut form = input("cycling", "1", "2", "3", "4");
        form.clear();
        assert_eq!(form.kind, "cycling");
        assert!(form.distance.is_empty() && form.elevation.is_empty());
    }
}
