//! Collaborators the session controller drives: the map widget, the
//! location source and the form/list page surface.

use crate::form::FormInput;
use crate::render::{ListEntry, Popup};
use crate::types::{Coords, WorkoutKind};

pub const DEFAULT_ZOOM: u8 = 13;

/// How the map should move to a new center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub zoom: u8,
    pub animate: bool,
    /// Seconds.
    pub duration: f64,
}

impl PanOptions {
    pub const fn instant(zoom: u8) -> Self {
        Self {
            zoom,
            animate: false,
            duration: 0.0,
        }
    }

    pub const fn animated(zoom: u8) -> Self {
        Self {
            zoom,
            animate: true,
            duration: 1.0,
        }
    }
}

/// A map widget. Clicks reach the controller as
/// [`crate::session::SessionEvent::MapClicked`].
pub trait MapSurface {
    /// Creates the basemap. Called again after [`MapSurface::reset`].
    fn create_map(&mut self, center: Coords, zoom: u8);
    fn place_marker(&mut self, at: Coords, popup: &Popup);
    fn pan_to(&mut self, at: Coords, options: PanOptions);
    /// Destroys the map along with every marker on it.
    fn reset(&mut self);
}

/// Source of the user's position.
///
/// A request resolves later, delivered as
/// [`crate::session::SessionEvent::LocationResolved`] or
/// [`crate::session::SessionEvent::LocationFailed`] carrying the same
/// `request` number. Issuing a new request supersedes any that is still
/// outstanding; answers to superseded requests are dropped by the controller.
pub trait LocationProvider {
    fn request_location(&mut self, request: u64);
}

/// The workout form and the list of rendered workouts.
pub trait FormView {
    /// Current values of every form field.
    fn values(&self) -> FormInput;
    fn show_form(&mut self);
    /// Empties the numeric inputs and hides the form.
    fn clear_and_hide_form(&mut self);
    fn focus_distance(&mut self);
    /// Shows the row for `kind`'s extra field and hides the other one.
    fn show_fields_for(&mut self, kind: WorkoutKind);
    /// Inserts `entry` at the top of the list, directly under the form, so
    /// the list reads newest first.
    fn render_entry(&mut self, entry: &ListEntry);
    fn clear_list(&mut self);
    fn alert(&mut self, message: &str);
}
