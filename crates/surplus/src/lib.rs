#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/surplus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;
pub mod stages;

// Re-export main types from sub-crates
pub use surplus_data as data;
pub use surplus_identities as identities;
pub use surplus_output as output;

pub use pipeline::{
    CommandStep, InProcessStep, Pipeline, PipelineError, PipelineReport, Step, StepFailure,
    StepOutcome,
};
pub use stages::{
    CHECK_STAGES, REPLICATION_STAGES, authenticate_pipeline, run_pipeline, run_stages,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
