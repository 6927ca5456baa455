//! Tessera CLI entry point.

use std::{io, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use tessera_cli::{
    Args,
    error_adapter::{Reportable, error_reportable, issue_reportables},
};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Tessera");
    debug!(args:?; "Parsed arguments");

    let reporter = GraphicalReportHandler::new();
    let result = tessera_cli::run(&args, &mut io::stdout().lock());
    match result {
        Ok(issues) => {
            let reportables = issue_reportables(&issues);
            for reportable in &reportables {
                println!("{}", render(&reporter, reportable));
            }
            if reportables.iter().any(Reportable::is_error) {
                process::exit(1);
            }
        }
        Err(err) => {
            error!("{}", render(&reporter, &error_reportable(&err)));
            process::exit(1);
        }
    }

    info!("Completed successfully");
}

fn render(reporter: &GraphicalReportHandler, reportable: &Reportable<'_>) -> String {
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");
    writer
}
