use structopt::StructOpt;

use crate::error::Result;
use crate::rotate::PathTemplate;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "linekit",
    about = "Copies stdin line by line, optionally prefixed, to stdout or a rotated file"
)]
pub struct CliOpt {
    /// Injected at the start of every line.
    #[structopt(long = "prefix", short = "p")]
    pub prefix: Option<String>,

    /// Output path; strftime specifiers (e.g. %Y-%m-%d) rotate the file.
    #[structopt(long = "output", short = "o", parse(try_from_str = parse_template))]
    pub output: Option<PathTemplate>,

    /// Render the output path in UTC instead of local time.
    #[structopt(long = "utc")]
    pub utc: bool,

    #[structopt(long = "verbose", short = "v")]
    pub verbose: bool,
}

fn parse_template(s: &str) -> Result<PathTemplate> {
    PathTemplate::parse(s)
}
