//! Recording fakes shared by the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use foldlist::prelude::*;

// =============================================================================
// Datasource
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCell {
    pub section: usize,
    pub loading: bool,
    pub style: ExpansionStyle,
    pub animated: bool,
}

impl ExpandingCell for TriggerCell {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_expansion_style(&mut self, style: ExpansionStyle, animated: bool) {
        self.style = style;
        self.animated = animated;
    }
}

#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub rows: usize,
    pub expandable: bool,
    pub needs_download: bool,
    pub preferred: Option<ExpansionStyle>,
}

impl SectionSpec {
    /// A regular section without a trigger row.
    pub fn plain(rows: usize) -> Self {
        Self {
            rows,
            expandable: false,
            needs_download: false,
            preferred: None,
        }
    }

    pub fn expandable(rows: usize) -> Self {
        Self {
            expandable: true,
            ..Self::plain(rows)
        }
    }

    /// Expandable section whose rows must be downloaded first.
    pub fn remote(rows: usize) -> Self {
        Self {
            needs_download: true,
            ..Self::expandable(rows)
        }
    }

    pub fn preferring(mut self, style: ExpansionStyle) -> Self {
        self.preferred = Some(style);
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeData {
    sections: Mutex<Vec<SectionSpec>>,
    expandable_queries: Mutex<usize>,
}

impl FakeData {
    pub fn new(sections: Vec<SectionSpec>) -> Arc<Self> {
        Arc::new(Self {
            sections: Mutex::new(sections),
            expandable_queries: Mutex::new(0),
        })
    }

    fn spec(&self, section: usize) -> SectionSpec {
        self.sections.lock().unwrap()[section].clone()
    }

    pub fn set_rows(&self, section: usize, rows: usize) {
        self.sections.lock().unwrap()[section].rows = rows;
    }

    pub fn set_needs_download(&self, section: usize, needs: bool) {
        self.sections.lock().unwrap()[section].needs_download = needs;
    }

    pub fn set_expandable(&self, section: usize, expandable: bool) {
        self.sections.lock().unwrap()[section].expandable = expandable;
    }

    /// How many times `can_expand_section` was asked.
    pub fn expandable_queries(&self) -> usize {
        *self.expandable_queries.lock().unwrap()
    }
}

impl ExpandableDataSource for FakeData {
    type Row = String;
    type Trigger = TriggerCell;

    fn section_count(&self) -> usize {
        self.sections.lock().unwrap().len()
    }

    fn row_count(&self, section: usize) -> usize {
        self.spec(section).rows
    }

    fn row(&self, section: usize, row: usize) -> String {
        format!("{}-{}", section, row)
    }

    fn can_expand_section(&self, section: usize) -> bool {
        *self.expandable_queries.lock().unwrap() += 1;
        self.spec(section).expandable
    }

    fn needs_download(&self, section: usize) -> bool {
        self.spec(section).needs_download
    }

    fn trigger_cell(&self, section: usize) -> TriggerCell {
        TriggerCell {
            section,
            loading: false,
            style: ExpansionStyle::Collapsed,
            animated: false,
        }
    }

    fn preferred_expansion(&self, section: usize) -> Option<ExpansionStyle> {
        self.spec(section).preferred
    }
}

// =============================================================================
// Delegate
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Download(usize),
    Cancel(usize),
    WillExpand(usize),
    DidExpand(usize),
    WillCollapse(usize),
    DidCollapse(usize),
    Failed(usize, String),
    WillDisplay(RowIndex),
    Selected(RowIndex),
}

#[derive(Debug, Default)]
pub struct RecordingDelegate {
    calls: Mutex<Vec<Call>>,
    tokens: Mutex<Vec<DownloadToken>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Most recent token handed to `download_data`.
    pub fn last_token(&self) -> Option<DownloadToken> {
        self.tokens.lock().unwrap().last().copied()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ExpandableDelegate for RecordingDelegate {
    fn download_data(&self, section: usize, token: DownloadToken) {
        self.tokens.lock().unwrap().push(token);
        self.record(Call::Download(section));
    }

    fn cancel_download(&self, token: DownloadToken) {
        self.record(Call::Cancel(token.section()));
    }

    fn will_expand(&self, section: usize) {
        self.record(Call::WillExpand(section));
    }

    fn did_expand(&self, section: usize) {
        self.record(Call::DidExpand(section));
    }

    fn will_collapse(&self, section: usize) {
        self.record(Call::WillCollapse(section));
    }

    fn did_collapse(&self, section: usize) {
        self.record(Call::DidCollapse(section));
    }

    fn download_failed(&self, section: usize, error: &DownloadError) {
        self.record(Call::Failed(section, error.message.clone()));
    }

    fn will_display_row_while_animating(&self, index: RowIndex) {
        self.record(Call::WillDisplay(index));
    }

    fn did_select_row(&self, index: RowIndex) {
        self.record(Call::Selected(index));
    }
}

// =============================================================================
// Surface
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Insert(Vec<RowIndex>, RowAnimation),
    Delete(Vec<RowIndex>, RowAnimation),
    ReloadRows(Vec<RowIndex>),
    ReloadSection(usize, RowAnimation),
    ReloadData,
    Trigger {
        section: usize,
        style: ExpansionStyle,
        loading: bool,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    header: Mutex<Option<String>>,
    footer: Mutex<Option<String>>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_views(header: &str, footer: &str) -> Arc<Self> {
        Arc::new(Self {
            header: Mutex::new(Some(header.to_string())),
            footer: Mutex::new(Some(footer.to_string())),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inserts(&self) -> Vec<SurfaceCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, SurfaceCall::Insert(..)))
            .collect()
    }

    pub fn header(&self) -> Option<String> {
        self.header.lock().unwrap().clone()
    }

    pub fn footer(&self) -> Option<String> {
        self.footer.lock().unwrap().clone()
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ListSurface for RecordingSurface {
    type View = String;

    fn insert_rows(&self, rows: &[RowIndex], animation: RowAnimation) {
        self.record(SurfaceCall::Insert(rows.to_vec(), animation));
    }

    fn delete_rows(&self, rows: &[RowIndex], animation: RowAnimation) {
        self.record(SurfaceCall::Delete(rows.to_vec(), animation));
    }

    fn reload_rows(&self, rows: &[RowIndex], _animation: RowAnimation) {
        self.record(SurfaceCall::ReloadRows(rows.to_vec()));
    }

    fn reload_section(&self, section: usize, animation: RowAnimation) {
        self.record(SurfaceCall::ReloadSection(section, animation));
    }

    fn reload_data(&self) {
        self.record(SurfaceCall::ReloadData);
    }

    fn update_trigger(&self, section: usize, style: ExpansionStyle, loading: bool, _animated: bool) {
        self.record(SurfaceCall::Trigger {
            section,
            style,
            loading,
        });
    }

    fn header_view(&self) -> Option<String> {
        self.header()
    }

    fn set_header_view(&self, view: Option<String>) {
        *self.header.lock().unwrap() = view;
    }

    fn footer_view(&self) -> Option<String> {
        self.footer()
    }

    fn set_footer_view(&self, view: Option<String>) {
        *self.footer.lock().unwrap() = view;
    }
}

// =============================================================================
// Harness
// =============================================================================

pub type TestList = ExpandableList<FakeData, RecordingDelegate, RecordingSurface>;

pub struct Harness {
    pub list: TestList,
    pub data: Arc<FakeData>,
    pub delegate: Arc<RecordingDelegate>,
    pub surface: Arc<RecordingSurface>,
}

pub fn harness(sections: Vec<SectionSpec>) -> Harness {
    harness_with(sections, ExpandableConfig::default(), RecordingSurface::new())
}

pub fn harness_with(
    sections: Vec<SectionSpec>,
    config: ExpandableConfig,
    surface: Arc<RecordingSurface>,
) -> Harness {
    let data = FakeData::new(sections);
    let delegate = RecordingDelegate::new();
    let list = TestList::with_config(config);
    list.set_data_source(&data);
    list.set_delegate(&delegate);
    list.set_surface(&surface);
    Harness {
        list,
        data,
        delegate,
        surface,
    }
}
