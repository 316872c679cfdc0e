#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use waymark::render::ListEntry;
use waymark::session::{Controller, EventQueue, SessionConfig, SessionEvent};
use waymark::storage::SqliteStorage;
use waymark::store::WorkoutStore;
use waymark::terminal::{self, Command, ConfiguredLocator, TerminalForm, TerminalMap};
use waymark::{cli, form::FormField, utils};

#[macro_use]
extern crate waymark;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let db = cli.db.clone().unwrap_or_else(utils::default_db_path);
    let storage = open_storage(&db)?;
    let mut store = WorkoutStore::new(storage);

    match cli.cmd {
        None | Some(cli::Cmd::Run) => {
            dlog!(
                "mode=run db={} at={:?} zoom={}",
                db.display(),
                cli.at,
                cli.zoom
            );
            let config = SessionConfig {
                zoom: cli.zoom,
                max_location_attempts: cli.max_location_attempts,
            };
            run_session(config, cli.at, store)
        }
        Some(cli::Cmd::List) => {
            dlog!("mode=list db={}", db.display());
            store.load().context("Reading stored workouts")?;
            if store.is_empty() {
                println!("No workouts logged yet.");
            }
            for w in store.all() {
                println!("{}", ListEntry::for_workout(w));
            }
            Ok(())
        }
        Some(cli::Cmd::Reset) => {
            store.reset().context("Clearing stored workouts")?;
            tracing::info!(db = %db.display(), "workouts deleted");
            Ok(())
        }
    }
}

fn open_storage(path: &Path) -> Result<SqliteStorage> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating dir: {}", parent.display()))?;
    }
    SqliteStorage::open(path).with_context(|| format!("Opening workout DB: {}", path.display()))
}

fn run_session(
    config: SessionConfig,
    at: Option<waymark::types::Coords>,
    store: WorkoutStore<SqliteStorage>,
) -> Result<()> {
    let queue = EventQueue::new();
    let locator = ConfiguredLocator::new(queue.clone(), at);
    let mut ctl = Controller::new(
        config,
        store,
        TerminalMap::default(),
        TerminalForm::default(),
        locator,
    );

    ctl.start();
    ctl.drain(&queue);
    println!("{}", terminal::HELP);

    for line in io::stdin().lock().lines() {
        let line = line.context("Reading command")?;
        if line.trim().is_empty() {
            continue;
        }

        match terminal::parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", terminal::HELP),
            Ok(Command::List) => {
                for entry in ctl.view().entries() {
                    println!("{entry}");
                }
            }
            Ok(Command::Set(field, value)) => {
                ctl.view_mut().set(field, value);
                if field == FormField::Type {
                    queue.push(SessionEvent::TypeChanged);
                }
            }
            Ok(Command::Submit(fields)) => {
                let type_changed = fields.iter().any(|(f, _)| *f == FormField::Type);
                for (field, value) in fields {
                    ctl.view_mut().set(field, value);
                }
                if type_changed {
                    queue.push(SessionEvent::TypeChanged);
                }
                queue.push(SessionEvent::FormSubmitted);
            }
            Ok(Command::Event(event)) => queue.push(event),
            Err(e) => eprintln!("{e}"),
        }

        let state = ctl.drain(&queue);
        dlog!(
            "state={state:?} form_visible={} center={:?}",
            ctl.view().is_visible(),
            ctl.map().center()
        );
    }

    Ok(())
}
