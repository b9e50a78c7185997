//! The stage chains behind the `run` and `authenticate` subcommands.

use crate::pipeline::{CommandStep, InProcessStep, Pipeline};
use std::path::Path;
use surplus_data::ProjectPaths;
use surplus_output::{OutputError, export_final, run_consolidation, verify_integrity};

/// Stages that rebuild the raw and calculated panels.
pub const REPLICATION_STAGES: [&str; 2] = ["merge", "calculate"];

/// Stages that check and publish the rebuilt panels.
pub const CHECK_STAGES: [&str; 4] = ["validate", "consolidate", "export", "verify"];

/// Stages `run` executes, in order. `validate_only` skips replication.
pub fn run_stages(validate_only: bool) -> Vec<&'static str> {
    if validate_only {
        CHECK_STAGES.to_vec()
    } else {
        REPLICATION_STAGES.iter().chain(&CHECK_STAGES).copied().collect()
    }
}

/// One subprocess of `program` per stage, with the stage name as its only
/// argument.
pub fn run_pipeline(program: &Path, validate_only: bool) -> Pipeline {
    run_stages(validate_only)
        .into_iter()
        .fold(Pipeline::new("run"), |pipeline, stage| {
            pipeline.step(CommandStep::new(stage, program).arg(stage))
        })
}

/// Consolidate, export and verify in this process. The verify step reports
/// the authenticity status line as its output.
pub fn authenticate_pipeline(paths: &ProjectPaths) -> Pipeline {
    Pipeline::new("authenticate")
        .step(InProcessStep::new("consolidate", {
            let paths = paths.clone();
            move || run_consolidation(&paths).map(|_| ())
        }))
        .step(InProcessStep::new("export", {
            let paths = paths.clone();
            move || export_final(&paths).map(|_| ())
        }))
        .step(InProcessStep::reporting("verify", {
            let paths = paths.clone();
            move || {
                let report = verify_integrity(&paths)?;
                Ok::<_, OutputError>(format!("Authenticity: {}", report.status_line()))
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use surplus_data::io::write_text;
    use tempfile::{TempDir, tempdir};

    fn scratch_project() -> (TempDir, ProjectPaths) {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::from_root(dir.path());
        write_text(&paths.raw_merged, "variable,1980,1981\nK,100,110\nSP,20,22\n").unwrap();
        write_text(&paths.calculated, "year,V_from_SP\n1980,42\n1981,44\n").unwrap();
        (dir, paths)
    }

    #[rstest]
    #[case(true, vec!["validate", "consolidate", "export", "verify"])]
    #[case(false, vec!["merge", "calculate", "validate", "consolidate", "export", "verify"])]
    fn test_run_stages(#[case] validate_only: bool, #[case] expected: Vec<&str>) {
        assert_eq!(run_stages(validate_only), expected);

        let pipeline = run_pipeline(Path::new("/usr/bin/surplus"), validate_only);
        assert_eq!(pipeline.name(), "run");
        assert_eq!(pipeline.step_names().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_authenticate_reports_status() {
        let (_dir, paths) = scratch_project();
        let report = authenticate_pipeline(&paths).run();

        assert!(report.succeeded());
        assert_eq!(report.completed, vec!["consolidate", "export", "verify"]);
        let (step, output) = report.outputs.last().unwrap();
        assert_eq!(step, "verify");
        assert_eq!(output, "Authenticity: PASS");
    }

    #[test]
    fn test_failed_export_stops_before_verify() {
        let (_dir, paths) = scratch_project();
        // A directory where the final table goes makes the export write fail.
        fs::create_dir_all(&paths.final_table).unwrap();

        let report = authenticate_pipeline(&paths).run();

        assert_eq!(report.completed, vec!["consolidate"]);
        assert_eq!(report.failed.as_ref().unwrap().step, "export");
        assert!(paths.consolidated.exists());
        assert!(!paths.authenticity_json.exists());
        assert!(report.into_result().is_err());
    }
}
