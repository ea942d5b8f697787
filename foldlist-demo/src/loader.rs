//! Delegate that fetches remote groups on tokio timers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::style::Stylize;
use foldlist::{DownloadError, DownloadToken, ExpandableDelegate, RowIndex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::Catalog;

/// Result of a simulated fetch, delivered back to the event loop.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded {
        token: DownloadToken,
        rows: Vec<String>,
    },
    Failed {
        token: DownloadToken,
        error: DownloadError,
    },
}

pub struct Loader {
    catalog: Arc<Catalog>,
    events: mpsc::UnboundedSender<LoadEvent>,
    tasks: Mutex<HashMap<DownloadToken, JoinHandle<()>>>,
    latency: Duration,
}

impl Loader {
    pub fn new(
        catalog: Arc<Catalog>,
        events: mpsc::UnboundedSender<LoadEvent>,
        latency: Duration,
    ) -> Self {
        Self {
            catalog,
            events,
            tasks: Mutex::new(HashMap::new()),
            latency,
        }
    }

    /// Forget a finished fetch.
    pub fn settle(&self, token: DownloadToken) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.remove(&token);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.tasks.lock().map(|t| !t.is_empty()).unwrap_or(false)
    }
}

impl ExpandableDelegate for Loader {
    fn download_data(&self, section: usize, token: DownloadToken) {
        let Some(plan) = self.catalog.remote_plan(section) else {
            log::warn!("No remote plan for section {}", section);
            return;
        };
        println!("  {} fetching {}", "↯".yellow(), plan.title);

        let events = self.events.clone();
        let latency = self.latency;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            let event = if plan.fail {
                LoadEvent::Failed {
                    token,
                    error: DownloadError::new(format!("{}: connection reset", plan.title)),
                }
            } else {
                LoadEvent::Loaded {
                    token,
                    rows: (1..=plan.count)
                        .map(|i| format!("{} #{}", plan.title, i))
                        .collect(),
                }
            };
            // Receiver gone means the demo is shutting down.
            let _ = events.send(event);
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.insert(token, handle);
        }
    }

    fn cancel_download(&self, token: DownloadToken) {
        let handle = self.tasks.lock().ok().and_then(|mut t| t.remove(&token));
        if let Some(handle) = handle {
            log::debug!("Aborting fetch for {}", token);
            handle.abort();
            println!("  {} cancelled section {}", "✗".yellow(), token.section());
        }
    }

    fn will_expand(&self, section: usize) {
        log::info!("will expand {}", section);
    }

    fn did_expand(&self, section: usize) {
        println!("  {} section {} expanded", "✓".green(), section);
    }

    fn will_collapse(&self, section: usize) {
        log::info!("will collapse {}", section);
    }

    fn did_collapse(&self, section: usize) {
        println!("  {} section {} collapsed", "✓".green(), section);
    }

    fn download_failed(&self, section: usize, error: &DownloadError) {
        println!("  {} section {} failed: {}", "!".red(), section, error);
    }

    fn will_display_row_while_animating(&self, index: RowIndex) {
        log::trace!("row {} appearing", index);
    }

    fn did_select_row(&self, index: RowIndex) {
        println!("  {} selected row {}", "→".cyan(), index);
    }
}
