use clap::Parser;
use env_logger::{Builder, Env};
use log::debug;

mod args;
mod report;

fn main() {
    let args = args::Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    if let Err(e) = report::run_report(&args) {
        report::print_error(&e);
        eprintln!(
            "The workbook is expected to have the tabs {}, {} and optionally {}.",
            departures::CURRENT_TABLE,
            departures::PRIOR_TABLE,
            departures::LEDGER_TABLE
        );
        std::process::exit(1);
    }
}
