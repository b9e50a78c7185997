#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/surplus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod frame;
pub mod io;
pub mod merge;
pub mod panel;
pub mod paths;

pub use cell::Cell;
pub use error::{DataError, Result};
pub use merge::{merge_book_tables, merge_sources};
pub use panel::{VariablePanel, VariableRow, YearPanel, YearSeries};
pub use paths::ProjectPaths;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
