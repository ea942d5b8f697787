mod catalog;
mod loader;
mod screen;

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use crossterm::style::Stylize;
use foldlist::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::sync::mpsc;

use catalog::Catalog;
use loader::{LoadEvent, Loader};
use screen::Screen;

pub type DemoList = ExpandableList<Catalog, Loader, Screen>;

/// One scripted user interaction.
#[derive(Debug, Clone, Copy)]
enum Step {
    Select(RowIndex),
    Toggle(usize),
    Expand(usize),
    Collapse(usize),
    Cancel(usize),
    Reset,
}

const SCRIPT: &[Step] = &[
    Step::Select(RowIndex { section: 0, row: 0 }),
    Step::Select(RowIndex { section: 0, row: 2 }),
    Step::Toggle(1),
    Step::Expand(2),
    Step::Cancel(2),
    Step::Expand(2),
    Step::Expand(3),
    Step::Expand(4),
    Step::Collapse(0),
    Step::Reset,
];

fn apply(list: &DemoList, catalog: &Catalog, step: Step) -> Result<(), ExpansionError> {
    match step {
        Step::Select(index) => list.select_row(index).map(|_| ()),
        Step::Toggle(section) => list.toggle_section(section),
        Step::Expand(section) => list.expand_section(section, true),
        Step::Collapse(section) => list.collapse_section(section, true),
        Step::Cancel(section) => list.cancel_download_in_section(section),
        Step::Reset => {
            catalog.forget_downloads();
            list.reload_data_and_reset_expansion_states(true)
        }
    }
}

fn deliver(list: &DemoList, catalog: &Catalog, loader: &Loader, event: LoadEvent) {
    match event {
        LoadEvent::Loaded { token, rows } => {
            loader.settle(token);
            catalog.store_rows(token.section(), rows);
            if list.complete_download(token) == CallbackOutcome::Ignored {
                log::debug!("Late result for {} dropped", token);
            }
        }
        LoadEvent::Failed { token, error } => {
            loader.settle(token);
            list.fail_download(token, error);
        }
    }
}

/// Pump download results and animation ticks until the list is idle.
async fn settle(
    list: &DemoList,
    catalog: &Catalog,
    loader: &Loader,
    events: &mut mpsc::UnboundedReceiver<LoadEvent>,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(16));
    while loader.has_pending() || list.next_animation_deadline().is_some() {
        tokio::select! {
            Some(event) = events.recv() => deliver(list, catalog, loader, event),
            _ = ticker.tick() => {
                list.tick();
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let log_path = std::env::temp_dir().join("foldlist-demo.log");
    let log_file = File::create(&log_path).expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let catalog = Arc::new(Catalog::sample());
    let (tx, mut events) = mpsc::unbounded_channel();
    let loader = Arc::new(Loader::new(
        Arc::clone(&catalog),
        tx,
        Duration::from_millis(300),
    ));
    let screen = Arc::new(Screen::new("octocat", "5 groups"));

    let config = ExpandableConfig::new()
        .max_animated_rows(6)
        .animation_duration(Duration::from_millis(200))
        .hide_header_and_footer_when_empty();
    let list = DemoList::with_config(config);
    list.set_data_source(&catalog);
    list.set_delegate(&loader);
    list.set_surface(&screen);

    if let Err(e) = list.reload_data_and_reset_expansion_states(true) {
        eprintln!("Error: {}", e);
        return;
    }
    screen.render(&list);

    for step in SCRIPT {
        println!("\n{}", format!("{:?}", step).bold().cyan());
        if let Err(e) = apply(&list, &catalog, *step) {
            println!("  {} {}", "rejected:".red(), e);
        }
        settle(&list, &catalog, &loader, &mut events).await;
        if list.is_dirty() {
            screen.render(&list);
            list.clear_dirty();
        }
    }

    println!("\nlog written to {}", log_path.display());
}
