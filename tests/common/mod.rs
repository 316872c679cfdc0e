#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Timelike, Utc};
use std::collections::VecDeque;
use waymark::error::LocationError;
use waymark::form::{FormField, FormInput};
use waymark::render::{ListEntry, Popup};
use waymark::session::{Controller, EventQueue, SessionConfig, SessionEvent};
use waymark::storage::Storage;
use waymark::store::WorkoutStore;
use waymark::surface::{FormView, LocationProvider, MapSurface, PanOptions};
use waymark::types::{Coords, WorkoutKind};

pub const HOME: Coords = Coords::new(51.5074, -0.1278);

#[derive(Debug, Default)]
pub struct RecordingMap {
    pub created: Vec<(Coords, u8)>,
    pub markers: Vec<(Coords, Popup)>,
    pub pans: Vec<(Coords, PanOptions)>,
    pub resets: usize,
}

impl MapSurface for RecordingMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        self.created.push((center, zoom));
    }

    fn place_marker(&mut self, at: Coords, popup: &Popup) {
        self.markers.push((at, popup.clone()));
    }

    fn pan_to(&mut self, at: Coords, options: PanOptions) {
        self.pans.push((at, options));
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.markers.clear();
    }
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub input: FormInput,
    pub visible: bool,
    pub focused: usize,
    pub shown_kind: Option<WorkoutKind>,
    /// In the order `render_entry` was called.
    pub entries: Vec<ListEntry>,
    pub alerts: Vec<String>,
}

impl FormView for RecordingView {
    fn values(&self) -> FormInput {
        self.input.clone()
    }

    fn show_form(&mut self) {
        self.visible = true;
    }

    fn clear_and_hide_form(&mut self) {
        self.input.clear();
        self.visible = false;
    }

    fn focus_distance(&mut self) {
        self.focused += 1;
    }

    fn show_fields_for(&mut self, kind: WorkoutKind) {
        self.shown_kind = Some(kind);
    }

    fn render_entry(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }

    fn clear_list(&mut self) {
        self.entries.clear();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Answers requests from a script; once it runs dry requests stay pending.
pub struct ScriptedLocator {
    queue: EventQueue,
    script: VecDeque<Result<Coords, LocationError>>,
    pub requests: usize,
    /// Number of the most recent request.
    pub last_request: u64,
}

impl LocationProvider for ScriptedLocator {
    fn request_location(&mut self, request: u64) {
        self.requests += 1;
        self.last_request = request;
        match self.script.pop_front() {
            Some(Ok(at)) => self.queue.push(SessionEvent::LocationResolved { request, at }),
            Some(Err(error)) => self.queue.push(SessionEvent::LocationFailed { request, error }),
            None => {}
        }
    }
}

pub type TestController<S> = Controller<RecordingMap, RecordingView, ScriptedLocator, S>;

pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
}

/// [`fixed_clock`] with a sub-millisecond fraction, like a real clock.
pub fn fine_clock() -> DateTime<Utc> {
    fixed_clock().with_nanosecond(987_654_321).unwrap()
}

pub fn controller<S: Storage>(
    storage: S,
    script: Vec<Result<Coords, LocationError>>,
) -> (TestController<S>, EventQueue) {
    let queue = EventQueue::new();
    let locator = ScriptedLocator {
        queue: queue.clone(),
        script: script.into(),
        requests: 0,
        last_request: 0,
    };
    let ctl = Controller::new(
        SessionConfig::default(),
        WorkoutStore::new(storage),
        RecordingMap::default(),
        RecordingView::default(),
        locator,
    )
    .with_clock(fixed_clock);
    (ctl, queue)
}

/// A controller whose location resolves to [`HOME`] on the first request,
/// already started and drained.
pub fn started<S: Storage>(storage: S) -> (TestController<S>, EventQueue) {
    let (mut ctl, queue) = controller(storage, vec![Ok(HOME)]);
    ctl.start();
    ctl.drain(&queue);
    (ctl, queue)
}

pub fn fill<S: Storage>(ctl: &mut TestController<S>, fields: &[(FormField, &str)]) {
    for (field, value) in fields {
        ctl.view_mut().input.set(*field, *value);
    }
}

/// Clicks `at`, fills the form and submits it.
pub fn log_workout<S: Storage>(
    ctl: &mut TestController<S>,
    at: Coords,
    kind: WorkoutKind,
    distance: &str,
    duration: &str,
    extra: &str,
) {
    ctl.handle(SessionEvent::MapClicked(at));
    let extra_field = match kind {
        WorkoutKind::Running => FormField::Cadence,
        WorkoutKind::Cycling => FormField::Elevation,
    };
    fill(
        ctl,
        &[
            (FormField::Type, kind.slug()),
            (FormField::Distance, distance),
            (FormField::Duration, duration),
            (extra_field, extra),
        ],
    );
    ctl.handle(SessionEvent::TypeChanged);
    ctl.handle(SessionEvent::FormSubmitted);
}
