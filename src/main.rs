mod calendar;
mod cli;
mod compose;
mod config;
mod error;
mod mailer;
mod report;
mod runner;
mod schedule;
mod sheets;
mod source;
mod templates;
mod types;
mod ui;

use chrono::Local;
use config::Config;
use error::AllocationError;
use log::info;
use mailer::{DryRunMailer, Mailer, SmtpMailer};
use report::ReportFormatter;
use runner::Runner;
use source::{DataSource, FileDataSource};
use std::path::Path;
use types::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    let result = match args.preview {
        Some(ref path) => preview(&args, path),
        None => send(&args),
    };

    if let Err(e) = result {
        ui::print_error(&e.to_string());
        if e.is_fatal_config() {
            ui::status("set the values in the environment or in the file passed with --config");
        }
        std::process::exit(1);
    }
}

/// Format one grid file and print it; nothing is sent
fn preview(args: &cli::CliArgs, path: &Path) -> Result<(), AllocationError> {
    let labels = config::load_project_labels(args.config.as_deref())?;
    let grid = source::read_grid_file(path).map_err(|e| AllocationError::invalid("--preview", e))?;

    let formatter = ReportFormatter::new(labels);
    let rendered = formatter.format(&grid);
    let report = formatter.group(&grid);

    if args.json {
        report::write_json(std::io::stdout().lock(), args.date, &report, &rendered)?;
        println!();
    } else {
        if report.is_empty() {
            ui::status("no project headers found");
        } else {
            ui::status(&format!("{} projects: {}", report.len(), report.project_names().join(", ")));
        }
        println!("=== Plain text ===");
        println!("{}", rendered.plain);
        println!();
        println!("=== HTML ===");
        println!("{}", rendered.html);
    }

    Ok(())
}

/// Resolve configuration, wire the collaborators and run once or as a daemon
fn send(args: &cli::CliArgs) -> Result<(), AllocationError> {
    let config = Config::load(args.config.as_deref())?;

    let source: Box<dyn DataSource> = match args.grid_dir {
        Some(ref dir) => {
            info!("Reading grids from {}", dir.display());
            Box::new(FileDataSource::new(dir))
        }
        None => Box::new(sheets::SheetsClient::new(&config.sheet)?),
    };

    let mailer: Box<dyn Mailer> =
        if args.dry_run { Box::new(DryRunMailer) } else { Box::new(SmtpMailer::new(&config.smtp)?) };

    let runner = Runner::new(source.as_ref(), mailer.as_ref(), config.formatter(), config.composer())
        .with_skip_empty_reports(config.skip_empty_reports);

    if args.daemon {
        schedule::run_daemon(config.schedule_at, &config.lock_file, args.run_now, |today| {
            runner.run(today, VariantSelection::Both.variants(), None)
        });
    }

    let _lock = schedule::RunLock::acquire(&config.lock_file)?;

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let summary = runner.run(today, args.variant.variants(), args.in_reply_to.as_deref())?;
    ui::print_summary(&summary);

    Ok(())
}
