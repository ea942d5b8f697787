//! Expandable-section list control.
//!
//! Sections of a list can be collapsed to a single trigger row or expanded
//! to show all of their rows, optionally loading those rows first. The crate
//! is headless: rendering, scrolling and cell reuse belong to a
//! [`ListSurface`] implementation, while the crate owns the expansion state
//! machine, download bookkeeping and the logical/physical row remapping.

pub mod animation;
pub mod config;
pub mod controller;
pub mod datasource;
pub mod download;
pub mod effect;
pub mod error;
pub mod list;
pub mod proxy;
pub mod section;
pub mod store;
pub mod surface;

pub use config::ExpandableConfig;
pub use datasource::{ExpandableDataSource, ExpandableDelegate, ExpandingCell};
pub use download::DownloadToken;
pub use error::{CallbackOutcome, DownloadError, ExpansionError, InvalidStateReason};
pub use list::ExpandableList;
pub use proxy::{ProxyRow, RowSelection};
pub use section::{ExpansionStyle, SectionPhase};
pub use surface::{ListSurface, RowAnimation, RowIndex};

pub mod prelude {
    pub use crate::config::ExpandableConfig;
    pub use crate::datasource::{ExpandableDataSource, ExpandableDelegate, ExpandingCell};
    pub use crate::download::DownloadToken;
    pub use crate::error::{CallbackOutcome, DownloadError, ExpansionError, InvalidStateReason};
    pub use crate::list::ExpandableList;
    pub use crate::proxy::{ProxyRow, RowSelection};
    pub use crate::section::{ExpansionStyle, SectionPhase};
    pub use crate::surface::{ListSurface, RowAnimation, RowIndex};
}
