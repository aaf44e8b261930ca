//! Command-line entry point for one resource import run.
//!
//! # Responsibility
//! - Resolve configuration from the environment and start logging.
//! - Open the catalog, import the resources file, print a summary.
//!
//! Exit status is non-zero when the run aborts or any descriptor fails.

use log::{debug, error};
use resource_import_core::db::open_db;
use resource_import_core::{core_version, import_file, init_logging, ImportConfig};
use std::io::BufRead;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let config = match ImportConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!(
        "resource-import {} input={} db={}",
        core_version(),
        config.input_path.display(),
        config.db_path.display()
    );

    let status = run(&config);

    if config.pause_on_exit {
        println!("press Enter to exit");
        wait_for_enter(std::io::stdin().lock());
    }

    status
}

/// Blocks until one line is read. Returns `false` when reading failed.
fn wait_for_enter(mut input: impl BufRead) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => true,
        Err(err) => {
            debug!("event=cli_pause module=cli status=error error={err}");
            false
        }
    }
}

fn run(config: &ImportConfig) -> ExitCode {
    let started_at = Instant::now();

    let mut conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_run module=cli status=error stage=db_open error={err}");
            eprintln!("failed to open catalog `{}`: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let report = match import_file(&mut conn, &config.input_path) {
        Ok(report) => report,
        Err(err) => {
            error!("event=cli_run module=cli status=error stage=import error={err}");
            eprintln!("import aborted: {err}");
            return ExitCode::FAILURE;
        }
    };

    for (url, failure) in report.failures() {
        eprintln!("failed: {url}: {failure}");
    }

    let summary = report.summary();
    println!("{summary}");
    println!("elapsed: {:.1}s", started_at.elapsed().as_secs_f64());

    if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
