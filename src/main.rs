//! `deptt` CLI entry point (§6): loads a department-data JSON file, runs the
//! lab and lecture phases, writes the combined workbook, and maps
//! [`SchedulerError`] to a non-zero exit code.

use clap::{Parser, Subcommand};
use deptt_core::config::{build_catalog, load_department_data};
use deptt_core::report::write_combined_workbook;
use deptt_core::solve::{solve, SolverParams};
use deptt_core::time::TimeModel;
use deptt_core::view::{build_class_grids, build_teacher_grids};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deptt", about = "Weekly department timetable generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the lab and lecture phases and writes the combined workbook.
    Run {
        #[arg(long)]
        config: PathBuf,

        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,

        #[arg(long, default_value_t = 16)]
        workers: u32,

        #[arg(long, default_value_t = 42)]
        seed: i64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            out,
            timeout_secs,
            workers,
            seed,
        } => run(&config, &out, timeout_secs, workers, seed),
    }
}

fn run(config_path: &std::path::Path, out_dir: &std::path::Path, timeout_secs: u64, workers: u32, seed: i64) -> anyhow::Result<()> {
    let time_model = TimeModel::default_grid();

    tracing::info!(path = %config_path.display(), "loading department data");
    let data = load_department_data(config_path)?;
    let catalog = build_catalog(&time_model, &data)?;

    let params = SolverParams {
        timeout_secs: timeout_secs as f64,
        workers,
        seed,
    };

    let solved = match solve(&time_model, &catalog, &params) {
        Ok(solved) => solved,
        Err(err) => {
            eprintln!("{err}");
            return Err(err.into());
        }
    };

    std::fs::create_dir_all(out_dir)?;
    let class_grids = build_class_grids(&time_model, &solved.labs, &solved.lectures);
    let teacher_grids = build_teacher_grids(&time_model, &solved.labs, &solved.lectures);
    let path = write_combined_workbook(out_dir, &time_model, &class_grids, &teacher_grids)?;

    println!(
        "Scheduled {} lab assignments and {} lecture assignments.",
        solved.labs.len(),
        solved.lectures.len()
    );
    println!("Wrote {}", path.display());

    Ok(())
}
