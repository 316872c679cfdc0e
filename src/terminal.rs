//! Terminal stand-ins for the page: a map that prints what it would draw, a
//! form edited through typed commands, and a location source answering from
//! configured coordinates.

use crate::error::LocationError;
use crate::form::{FormField, FormInput};
use crate::render::{ListEntry, Popup};
use crate::session::{EventQueue, SessionEvent};
use crate::surface::{FormView, LocationProvider, MapSurface, PanOptions};
use crate::types::{Coords, WorkoutKind};
use anyhow::{Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;

static COORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*(?:,\s*|\s+)(-?\d+(?:\.\d+)?)\s*$")
        .expect("valid coords regex")
});

static ASSIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)=(\S*)").expect("valid assignment regex"));

pub const HELP: &str = "\
commands:
  click LAT,LNG          open the form for a workout at this point
  type running|cycling   switch the workout type
  distance|duration|cadence|elevation VALUE
  submit [field=value ...]
  goto ID                move the map to a listed workout
  list                   print logged workouts
  reset                  delete every workout and start over
  help | quit";

/// Parses `LAT,LNG` (or `LAT LNG`) into coordinates within valid ranges.
pub fn parse_coords(s: &str) -> Result<Coords, String> {
    let caps = COORDS_RE
        .captures(s)
        .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
    let lat: f64 = caps[1].parse().map_err(|e| format!("latitude: {e}"))?;
    let lng: f64 = caps[2].parse().map_err(|e| format!("longitude: {e}"))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude out of range: {lat}"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude out of range: {lng}"));
    }
    Ok(Coords::new(lat, lng))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(FormField, String),
    Submit(Vec<(FormField, String)>),
    Event(SessionEvent),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let cmd = match word.to_ascii_lowercase().as_str() {
        "click" => Command::Event(SessionEvent::MapClicked(
            parse_coords(rest).map_err(|e| anyhow!(e))?,
        )),
        "goto" if !rest.is_empty() => Command::Event(SessionEvent::EntryClicked(rest.to_string())),
        "submit" => Command::Submit(parse_assignments(rest)?),
        "list" => Command::List,
        "reset" => Command::Event(SessionEvent::Reset),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => match FormField::parse(other) {
            Some(FormField::Type) if WorkoutKind::parse(rest).is_none() => {
                bail!("type must be running or cycling")
            }
            Some(field) => Command::Set(field, rest.to_string()),
            None => bail!("unknown command {line:?} (try `help`)"),
        },
    };
    Ok(cmd)
}

fn parse_assignments(s: &str) -> Result<Vec<(FormField, String)>> {
    let mut out = Vec::new();
    let mut matched = 0;
    for caps in ASSIGN_RE.captures_iter(s) {
        let field = FormField::parse(&caps[1]).ok_or_else(|| anyhow!("unknown field {:?}", &caps[1]))?;
        out.push((field, caps[2].to_string()));
        matched += caps[0].len();
    }
    if matched < s.split_whitespace().map(str::len).sum::<usize>() {
        bail!("expected field=value pairs, got {s:?}");
    }
    Ok(out)
}

/// Prints markers and camera moves instead of drawing them.
#[derive(Debug, Default)]
pub struct TerminalMap {
    center: Option<Coords>,
    markers: usize,
}

impl TerminalMap {
    pub const fn center(&self) -> Option<Coords> {
        self.center
    }
}

impl MapSurface for TerminalMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        self.center = Some(center);
        println!("map centered on {center} (zoom {zoom})");
    }

    fn place_marker(&mut self, at: Coords, popup: &Popup) {
        self.markers += 1;
        println!("marker #{} at {at}: {}", self.markers, popup.content);
    }

    fn pan_to(&mut self, at: Coords, options: PanOptions) {
        self.center = Some(at);
        if options.animate {
            println!("map moves to {at} over {}s", options.duration);
        }
    }

    fn reset(&mut self) {
        self.center = None;
        self.markers = 0;
    }
}

/// Form values set by commands. List entries are printed as they render and
/// kept newest first.
#[derive(Debug, Default)]
pub struct TerminalForm {
    input: FormInput,
    visible: bool,
    entries: Vec<ListEntry>,
}

impl TerminalForm {
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.input.set(field, value);
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Rendered entries, newest first.
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }
}

impl FormView for TerminalForm {
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
        println!("enter distance (km), duration (min), then submit");
    }

    fn show_fields_for(&mut self, kind: WorkoutKind) {
        let extra = match kind {
            WorkoutKind::Running => "cadence (spm)",
            WorkoutKind::Cycling => "elevation (m)",
        };
        println!("{kind} form: also needs {extra}");
    }

    fn render_entry(&mut self, entry: &ListEntry) {
        println!("{entry}");
        self.entries.insert(0, entry.clone());
    }

    fn clear_list(&mut self) {
        self.entries.clear();
        println!("workout list cleared");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Answers every request with the configured coordinates, or a failure when
/// none were given.
pub struct ConfiguredLocator {
    queue: EventQueue,
    at: Option<Coords>,
}

impl ConfiguredLocator {
    pub const fn new(queue: EventQueue, at: Option<Coords>) -> Self {
        Self { queue, at }
    }
}

impl LocationProvider for ConfiguredLocator {
    fn request_location(&mut self, request: u64) {
        let event = self.at.map_or_else(
            || SessionEvent::LocationFailed {
                request,
                error: LocationError::new("no position configured (pass --at LAT,LNG)"),
            },
            |at| SessionEvent::LocationResolved { request, at },
        );
        self.queue.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_accept_comma_or_space() {
        assert_eq!(parse_coords("51.5,-0.12").unwrap(), Coords::new(51.5, -0.12));
        assert_eq!(parse_coords(" -33.9 151.2 ").unwrap(), Coords::new(-33.9, 151.2));
        assert!(parse_coords("91,0").is_err());
        assert!(parse_coords("north").is_err());
    }

    #[test]
    fn click_becomes_map_event() {
        let cmd = parse_command("click 51.5, -0.12").unwrap();
        assert!(matches!(cmd, Command::Event(SessionEvent::MapClicked(c)) if c == Coords::new(51.5, -0.12)));
    }

    #[test]
    fn field_commands_set_values() {
        assert_eq!(
            parse_command("distance 5").unwrap(),
            Command::Set(FormField::Distance, "5".into())
        );
        assert!(parse_command("type rowing").is_err());
        assert_eq!(
            parse_command("type cycling").unwrap(),
            Command::Set(FormField::Type, "cycling".into())
        );
    }

    #[test]
    fn submit_takes_assignments() {
        let cmd = parse_command("submit distance=5 duration=30 cadence=150").unwrap();
        assert_eq!(
            cmd,
            Command::Submit(vec![
                (FormField::Distance, "5".into()),
                (FormField::Duration, "30".into()),
                (FormField::Cadence, "150".into()),
            ])
        );
        assert_eq!(parse_command("submit").unwrap(), Command::Submit(Vec::new()));
        assert!(parse_command("submit pace=3").is_err());
        assert!(parse_command("submit 5 30").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_command("fly away").is_err());
        assert_eq!(parse_command("QUIT").unwrap(), Command::Quit);
    }

    #[test]
    fn locator_without_position_queues_failure() {
        let queue = EventQueue::new();
        let mut locator = ConfiguredLocator::new(queue.clone(), None);
        locator.request_location(7);
        assert!(matches!(
            queue.pop(),
            Some(SessionEvent::LocationFailed { request: 7, .. })
        ));
    }

    #[test]
    fn list_reads_newest_first() {
        use crate::render::DetailRow;

        let entry = |id: &str| ListEntry {
            id: id.to_string(),
            kind: WorkoutKind::Running,
            title: format!("Running {id}"),
            details: Vec::<DetailRow>::new(),
        };
        let mut form = TerminalForm::default();
        form.render_entry(&entry("1"));
        form.render_entry(&entry("2"));

        let ids: Vec<&str> = form.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);

        form.clear_list();
        assert!(form.entries().is_empty());
    }
}
