//! Surplus CLI binary.
//!
//! Each pipeline stage is a subcommand. `run` chains them as subprocesses of
//! this binary and `authenticate` chains the authenticity stages in-process.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use surplus::pipeline::{Pipeline, PipelineReport};
use surplus::stages::{authenticate_pipeline, run_pipeline};
use surplus_data::{ProjectPaths, merge_sources};
use surplus_identities::{calculate_identities, run_validation};
use surplus_output::{export_final, run_consolidation, verify_integrity};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "surplus")]
#[command(about = "Table 5.4: reconstruction, validation and authenticity checks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the two book tables into the raw panel
    Merge,

    /// Compute the derived identity series
    Calculate,

    /// Compare book columns against their calculated counterparts
    Validate,

    /// Join the raw and calculated panels side by side
    Consolidate,

    /// Write the final table and its summary
    Export,

    /// Check the final table against the raw panel
    Verify,

    /// Consolidate, export and verify in one process
    Authenticate,

    /// Run the whole pipeline, one subprocess per stage
    Run {
        /// Skip merge and calculate
        #[arg(long)]
        validate_only: bool,

        /// Output directory (informational; outputs use fixed paths)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let paths = ProjectPaths::default();

    match cli.command {
        Commands::Merge => {
            let panel = merge_sources(&paths)?;
            println!(
                "Merged {} variables over {} years -> {}",
                panel.len(),
                panel.years().len(),
                paths.raw_merged.display()
            );
        }
        Commands::Calculate => {
            let calculated = calculate_identities(&paths)?;
            println!(
                "Calculated {} series -> {}",
                calculated.columns().len(),
                paths.calculated.display()
            );
        }
        Commands::Validate => {
            let record = run_validation(&paths)?;
            println!(
                "Ran {} identity checks -> {}",
                record.checks.len(),
                paths.validation_summary.display()
            );
        }
        Commands::Consolidate => {
            let joined = run_consolidation(&paths)?;
            println!(
                "Consolidated {} columns over {} years -> {}",
                joined.columns().len(),
                joined.years().len(),
                paths.consolidated.display()
            );
        }
        Commands::Export => {
            let export = export_final(&paths)?;
            for coverage in &export.coverage {
                println!("  {coverage}");
            }
            println!(
                "Exported final table -> {}",
                paths.final_table.display()
            );
        }
        Commands::Verify => {
            let report = verify_integrity(&paths)?;
            println!(
                "Checked {} columns over {} years: {} mismatches",
                report.checked_columns.len(),
                report.compared_years,
                report.mismatch_count
            );
            println!("{}", report.status_line());
        }
        Commands::Authenticate => execute(&authenticate_pipeline(&paths))?,
        Commands::Run {
            validate_only,
            output_dir,
        } => run_stages(validate_only, output_dir)?,
    }

    Ok(())
}

fn progress_bar(len: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

fn finish(report: PipelineReport) -> Result<(), Box<dyn std::error::Error>> {
    for (step, output) in &report.outputs {
        let output = output.trim();
        if !output.is_empty() {
            println!("\n[{step}]\n{output}");
        }
    }
    if let Some(failure) = &report.failed {
        println!("\nStep '{}' failed:", failure.step);
        if !failure.output.trim().is_empty() {
            println!("{}", failure.output.trim_end());
        }
    }
    let completed = report.into_result()?;
    println!("\nCompleted: {}", completed.join(" -> "));
    Ok(())
}

fn execute(pipeline: &Pipeline) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running {} stages", pipeline.len());
    let pb = progress_bar(pipeline.len())?;
    finish(pipeline.run_with_progress(Some(&pb)))
}

fn run_stages(
    validate_only: bool,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &output_dir {
        info!(output_dir = %dir.display(), "output directory is informational; fixed paths are used");
    }
    let exe = std::env::current_exe()?;
    execute(&run_pipeline(&exe, validate_only))
}
