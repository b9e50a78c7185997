#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/surplus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod consolidate;
pub mod derived;
pub mod error;
pub mod export;
pub mod render;
pub mod verify;

pub use consolidate::{consolidate, run_consolidation};
pub use derived::{DERIVED_COLUMNS, DerivedColumn, is_derived};
pub use error::{OutputError, Result};
pub use export::{Coverage, FinalExport, build_final_table, export_final};
pub use render::{Render, RenderFormat};
pub use verify::{IntegrityReport, Mismatch, Status, verify_integrity, verify_panels};
