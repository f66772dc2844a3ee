use std::io::{self, BufReader};

use structopt::StructOpt;
use tracing::Level;

use linekit::cliopt::CliOpt;
use linekit::runner;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = CliOpt::from_args();

    tracing_subscriber::fmt()
        .with_max_level(if opt.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_writer(io::stderr)
        .init();

    runner::run(&opt, BufReader::new(io::stdin()), io::stdout())?;

    Ok(())
}
