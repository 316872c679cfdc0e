//! Session controller
//!
//! Drives one interactive session: acquire the user's location, create the
//! map, restore stored workouts, then turn map clicks and form submissions
//! into persisted workouts. Everything runs on a single thread; external
//! happenings arrive as [`SessionEvent`]s and are handled strictly in order.
//!
//! Map creation and the storage load are independent. Restored workouts are
//! rendered exactly once, as soon as both have happened, whichever comes last.

use crate::dlog;
use crate::error::LocationError;
use crate::form::validate;
use crate::render::{ListEntry, Popup};
use crate::storage::Storage;
use crate::store::WorkoutStore;
use crate::surface::{DEFAULT_ZOOM, FormView, LocationProvider, MapSurface, PanOptions};
use crate::types::{Coords, Workout, WorkoutKind, create_workout, id_from_timestamp};
use chrono::{DateTime, TimeDelta, Utc};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const LOCATION_ALERT: &str = "Couldn't find your location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Initializing,
    /// A location request is outstanding.
    AwaitingLocation,
    /// The map exists but stored workouts are not rendered yet.
    MapReady,
    /// Map ready, history rendered, form hidden.
    Idle,
    /// A click location is pending and the form is shown.
    FormOpen,
    /// Every location attempt failed; the map will not be created.
    LocationUnavailable,
}

impl SessionState {
    pub const fn accepts_clicks(self) -> bool {
        matches!(self, Self::MapReady | Self::Idle | Self::FormOpen)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Answer to location request number `request`.
    LocationResolved { request: u64, at: Coords },
    LocationFailed { request: u64, error: LocationError },
    MapClicked(Coords),
    /// The form's type selector changed value.
    TypeChanged,
    FormSubmitted,
    /// A rendered list entry was clicked; carries the workout id.
    EntryClicked(String),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub zoom: u8,
    /// Total location requests before giving up, first one included.
    pub max_location_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            max_location_attempts: 3,
        }
    }
}

/// Mutable per-session state, owned by the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub state: SessionState,
    /// Where the next submitted workout will be placed.
    pub pending: Option<Coords>,
    pub map_ready: bool,
    pub store_loaded: bool,
    pub restored_rendered: bool,
    pub location_attempts: u32,
    /// Number of the newest location request; only its answer is accepted.
    pub location_request: u64,
    pub selected_kind: WorkoutKind,
}

/// Shared FIFO of events waiting to be handled.
///
/// Collaborators that answer later (a location provider, an input reader)
/// push into a clone of the queue; the loop drains it through
/// [`Controller::drain`].
#[derive(Debug, Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<SessionEvent>>>);

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SessionEvent) {
        self.0.borrow_mut().push_back(event);
    }

    pub fn pop(&self) -> Option<SessionEvent> {
        self.0.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

pub struct Controller<M, V, L, S> {
    config: SessionConfig,
    session: Session,
    store: WorkoutStore<S>,
    map: M,
    view: V,
    locator: L,
    clock: fn() -> DateTime<Utc>,
}

impl<M, V, L, S> Controller<M, V, L, S>
where
    M: MapSurface,
    V: FormView,
    L: LocationProvider,
    S: Storage,
{
    pub fn new(config: SessionConfig, store: WorkoutStore<S>, map: M, view: V, locator: L) -> Self {
        Self {
            config,
            session: Session::default(),
            store,
            map,
            view,
            locator,
            clock: Utc::now,
        }
    }

    /// Replaces the source of creation timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Requests the location, then restores stored workouts.
    pub fn start(&mut self) {
        self.begin_location();
        self.load_history();
    }

    /// Issues the first location request of a start sequence.
    pub fn begin_location(&mut self) {
        self.session.location_attempts = 0;
        self.session.state = SessionState::AwaitingLocation;
        self.request_location();
    }

    /// Loads the store once per session. Rendering waits for the map.
    pub fn load_history(&mut self) {
        if self.session.store_loaded {
            dlog!("load_history skipped: already loaded");
            return;
        }

        match self.store.load() {
            Ok(n) => {
                dlog!("history_loaded count={n}");
            }
            Err(e) => {
                tracing::warn!(err = %e, "could not read stored workouts; starting empty");
            }
        }
        self.session.store_loaded = true;
        self.render_restored_if_ready();
    }

    /// Handles every event currently in `queue`, including ones pushed while
    /// draining.
    pub fn drain(&mut self, queue: &EventQueue) -> SessionState {
        while let Some(event) = queue.pop() {
            self.handle(event);
        }
        self.session.state
    }

    pub fn handle(&mut self, event: SessionEvent) -> SessionState {
        dlog!("event state={:?} event={:?}", self.session.state, event);

        match event {
            SessionEvent::LocationResolved { request, at } => self.on_location(request, at),
            SessionEvent::LocationFailed { request, error } => {
                self.on_location_failed(request, &error);
            }
            SessionEvent::MapClicked(at) => self.on_map_click(at),
            SessionEvent::TypeChanged => self.on_type_changed(),
            SessionEvent::FormSubmitted => self.on_submit(),
            SessionEvent::EntryClicked(id) => self.on_entry_click(&id),
            SessionEvent::Reset => self.reset(),
        }

        self.session.state
    }

    /// Clears every stored workout and restarts the session from scratch.
    ///
    /// Works in any state, including after location gave up.
    pub fn reset(&mut self) {
        tracing::info!(workouts = self.store.len(), "resetting session");
        if let Err(e) = self.store.reset() {
            tracing::warn!(err = %e, "could not clear stored workouts");
            self.view.alert(&format!("Could not clear saved workouts: {e}"));
        }

        self.map.reset();
        self.view.clear_list();
        self.view.clear_and_hide_form();

        let selected_kind = self.session.selected_kind;
        let location_request = self.session.location_request;
        self.session = Session {
            selected_kind,
            location_request,
            ..Session::default()
        };
        self.start();
    }

    fn request_location(&mut self) {
        self.session.location_attempts += 1;
        self.session.location_request += 1;
        tracing::info!(
            attempt = self.session.location_attempts,
            request = self.session.location_request,
            "requesting location"
        );
        self.locator.request_location(self.session.location_request);
    }

    /// True when `request` is the outstanding one.
    fn is_current_request(&self, request: u64) -> bool {
        self.session.state == SessionState::AwaitingLocation
            && request == self.session.location_request
    }

    fn on_location(&mut self, request: u64, at: Coords) {
        if !self.is_current_request(request) {
            dlog!("ignoring stale location {at} request={request}");
            return;
        }

        tracing::info!(center = %at, zoom = self.config.zoom, "creating map");
        self.map.create_map(at, self.config.zoom);
        self.session.map_ready = true;
        self.session.state = SessionState::MapReady;
        self.render_restored_if_ready();
    }

    fn on_location_failed(&mut self, request: u64, e: &LocationError) {
        if !self.is_current_request(request) {
            dlog!("ignoring stale location failure request={request}: {e}");
            return;
        }

        tracing::warn!(err = %e, attempt = self.session.location_attempts, "location request failed");
        self.view.alert(LOCATION_ALERT);

        if self.session.location_attempts < self.config.max_location_attempts {
            self.request_location();
        } else {
            tracing::error!(
                attempts = self.session.location_attempts,
                "giving up on location; map will not be shown"
            );
            self.session.state = SessionState::LocationUnavailable;
        }
    }

    fn on_map_click(&mut self, at: Coords) {
        if !self.session.state.accepts_clicks() {
            dlog!("ignoring map click in state {:?}", self.session.state);
            return;
        }

        self.session.pending = Some(at);
        self.map.pan_to(at, PanOptions::instant(self.config.zoom));
        self.view.show_fields_for(self.session.selected_kind);
        self.view.show_form();
        self.view.focus_distance();
        self.session.state = SessionState::FormOpen;
    }

    fn on_type_changed(&mut self) {
        let raw = self.view.values().kind;
        let Some(kind) = WorkoutKind::parse(raw.trim()) else {
            dlog!("ignoring unknown type selector value {raw:?}");
            return;
        };
        self.session.selected_kind = kind;
        self.view.show_fields_for(kind);
    }

    fn on_submit(&mut self) {
        if self.session.state != SessionState::FormOpen {
            dlog!("ignoring submission in state {:?}", self.session.state);
            return;
        }
        let Some(at) = self.session.pending else {
            dlog!("ignoring submission without a clicked location");
            return;
        };

        let draft = match validate(&self.view.values()) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(err = %e, "rejected workout inputs");
                self.view.alert(&format!("Invalid inputs: {e}"));
                return;
            }
        };

        // Saving before history is loaded would overwrite it.
        self.load_history();

        let workout = create_workout(
            draft.kind,
            at,
            draft.duration,
            draft.distance,
            draft.extra,
            self.unique_stamp(),
        );
        tracing::info!(
            id = workout.id(),
            kind = %workout.kind(),
            distance = workout.distance(),
            duration = workout.duration(),
            "workout logged"
        );

        self.store.append(workout.clone());
        self.render(&workout);
        if let Err(e) = self.store.save() {
            tracing::warn!(err = %e, "could not persist workouts");
            self.view
                .alert(&format!("Workout kept for this session but not saved: {e}"));
        }

        self.view.clear_and_hide_form();
        self.session.pending = None;
        self.session.state = SessionState::Idle;
    }

    fn on_entry_click(&mut self, id: &str) {
        if !self.session.map_ready {
            dlog!("ignoring entry click before the map exists");
            return;
        }
        let Some(workout) = self.store.find(id) else {
            dlog!("ignoring click on unknown workout id={id}");
            return;
        };
        self.map
            .pan_to(workout.coords(), PanOptions::animated(self.config.zoom));
    }

    fn render_restored_if_ready(&mut self) {
        let s = &self.session;
        if !s.map_ready || !s.store_loaded || s.restored_rendered {
            return;
        }

        let restored = self.store.all().to_vec();
        for w in &restored {
            self.render(w);
        }
        tracing::info!(count = restored.len(), "rendered stored workouts");

        self.session.restored_rendered = true;
        if self.session.state == SessionState::MapReady {
            self.session.state = SessionState::Idle;
        }
    }

    fn render(&mut self, workout: &Workout) {
        self.map
            .place_marker(workout.coords(), &Popup::for_workout(workout));
        self.view.render_entry(&ListEntry::for_workout(workout));
    }

    /// Current time, moved forward a millisecond at a time until its id is unused.
    fn unique_stamp(&self) -> DateTime<Utc> {
        let mut stamp = (self.clock)();
        while self.store.contains_id(&id_from_timestamp(stamp)) {
            stamp += TimeDelta::milliseconds(1);
        }
        stamp
    }

    pub const fn state(&self) -> SessionState {
        self.session.state
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub const fn locator(&self) -> &L {
        &self.locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_initializing() {
        let s = Session::default();
        assert_eq!(s.state, SessionState::Initializing);
        assert!(!s.map_ready && !s.store_loaded && !s.restored_rendered);
        assert_eq!(s.pending, None);
    }

    #[test]
    fn only_map_states_accept_clicks() {
        assert!(SessionState::MapReady.accepts_clicks());
        assert!(SessionState::Idle.accepts_clicks());
        assert!(SessionState::FormOpen.accepts_clicks());
        assert!(!SessionState::AwaitingLocation.accepts_clicks());
        assert!(!SessionState::LocationUnavailable.accepts_clicks());
    }

    #[test]
    fn queue_is_fifo() {
        let q = EventQueue::new();
        let producer = q.clone();
        producer.push(SessionEvent::TypeChanged);
        producer.push(SessionEvent::FormSubmitted);
        assert_eq!(q.len(), 2);
        assert!(matches!(q.pop(), Some(SessionEvent::TypeChanged)));
        assert!(matches!(q.pop(), Some(SessionEvent::FormSubmitted)));
        assert!(q.is_empty());
    }
}
