//! Sample datasource: a profile page with a few groups of rows.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use crossterm::style::Stylize;
use foldlist::{ExpandableDataSource, ExpandingCell, ExpansionStyle};

/// Where a group's rows come from.
pub enum Source {
    /// Rows known up front, shown behind a trigger row.
    Local(Vec<String>),
    /// Rows fetched on first expansion.
    Remote { count: usize, fail: bool },
    /// A regular section without a trigger row.
    Plain(Vec<String>),
}

pub struct Group {
    pub title: &'static str,
    pub source: Source,
    pub preferred: Option<ExpansionStyle>,
}

/// What the loader should produce for a remote group.
#[derive(Debug, Clone, Copy)]
pub struct RemotePlan {
    pub title: &'static str,
    pub count: usize,
    pub fail: bool,
}

pub struct Catalog {
    groups: Vec<Group>,
    downloaded: RwLock<HashMap<usize, Vec<String>>>,
}

impl Catalog {
    pub fn sample() -> Self {
        Self {
            groups: vec![
                Group {
                    title: "Repositories",
                    source: Source::Remote { count: 3, fail: false },
                    preferred: None,
                },
                Group {
                    title: "Followers",
                    source: Source::Local(owned(&["ada", "grace"])),
                    preferred: Some(ExpansionStyle::Expanded),
                },
                Group {
                    title: "Starred",
                    source: Source::Remote { count: 12, fail: false },
                    preferred: None,
                },
                Group {
                    title: "Mirrors",
                    source: Source::Remote { count: 2, fail: true },
                    preferred: None,
                },
                Group {
                    title: "About",
                    source: Source::Plain(owned(&["Joined 2011", "Berlin"])),
                    preferred: None,
                },
            ],
            downloaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn remote_plan(&self, section: usize) -> Option<RemotePlan> {
        let group = self.groups.get(section)?;
        match group.source {
            Source::Remote { count, fail } => Some(RemotePlan {
                title: group.title,
                count,
                fail,
            }),
            _ => None,
        }
    }

    /// Keep rows delivered by the loader.
    pub fn store_rows(&self, section: usize, rows: Vec<String>) {
        if let Ok(mut guard) = self.downloaded.write() {
            guard.insert(section, rows);
        }
    }

    /// Drop every downloaded group so the next expansion fetches again.
    pub fn forget_downloads(&self) {
        if let Ok(mut guard) = self.downloaded.write() {
            guard.clear();
        }
    }

    fn downloaded_rows(&self, section: usize) -> Option<Vec<String>> {
        self.downloaded
            .read()
            .ok()
            .and_then(|guard| guard.get(&section).cloned())
    }

    fn rows(&self, section: usize) -> Vec<String> {
        match self.groups.get(section).map(|g| &g.source) {
            Some(Source::Local(rows)) | Some(Source::Plain(rows)) => rows.clone(),
            Some(Source::Remote { .. }) => self.downloaded_rows(section).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ExpandableDataSource for Catalog {
    type Row = String;
    type Trigger = Header;

    fn section_count(&self) -> usize {
        self.groups.len()
    }

    fn row_count(&self, section: usize) -> usize {
        self.rows(section).len()
    }

    fn row(&self, section: usize, row: usize) -> String {
        self.rows(section).get(row).cloned().unwrap_or_default()
    }

    fn can_expand_section(&self, section: usize) -> bool {
        self.groups
            .get(section)
            .is_some_and(|g| !matches!(g.source, Source::Plain(_)))
    }

    fn needs_download(&self, section: usize) -> bool {
        self.remote_plan(section).is_some() && self.downloaded_rows(section).is_none()
    }

    fn trigger_cell(&self, section: usize) -> Header {
        let title = self.groups.get(section).map(|g| g.title).unwrap_or("?");
        Header::new(title)
    }

    fn preferred_expansion(&self, section: usize) -> Option<ExpansionStyle> {
        self.groups.get(section).and_then(|g| g.preferred)
    }
}

/// Trigger row with a disclosure indicator and a spinner.
#[derive(Debug, Clone)]
pub struct Header {
    title: &'static str,
    loading: bool,
    style: ExpansionStyle,
}

impl Header {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            loading: false,
            style: ExpansionStyle::Collapsed,
        }
    }
}

impl ExpandingCell for Header {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_expansion_style(&mut self, style: ExpansionStyle, _animated: bool) {
        self.style = style;
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indicator = match (self.loading, self.style) {
            (true, _) => '⟳',
            (false, ExpansionStyle::Expanded) => '▼',
            (false, ExpansionStyle::Collapsed) => '▶',
        };
        write!(f, "{} {}", indicator, self.title.bold())
    }
}
