use std::io::{BufRead, Write};

use tracing::debug;

use crate::cliopt::CliOpt;
use crate::error::Result;
use crate::reader::LineReader;
use crate::rotate::rotating_file;
use crate::writer::{Close, LineWriter, NopCloser, PrefixWriter, WriteClose};

// stdin
//   -> LineReader       one line per read
//     -> PrefixWriter   prefix after every newline
//       -> LineWriter   whole lines only
//         -> sink       stdout, or a ReplaceableWriter over rotated files
pub fn run<'a, R, W>(opt: &CliOpt, input: R, stdout: W) -> Result<()>
where
    R: BufRead,
    W: Write + 'a,
{
    let sink: Box<dyn WriteClose + 'a> = match &opt.output {
        Some(template) => {
            debug!(?template, utc = opt.utc, "writing to rotated file");
            Box::new(rotating_file(template.clone().utc(opt.utc)))
        }
        None => Box::new(NopCloser::new(stdout)),
    };

    let mut writer = PrefixWriter::new(
        opt.prefix.as_deref().unwrap_or_default(),
        LineWriter::new(sink),
    );
    for line in LineReader::new(input) {
        writer.write_all(&line?)?;
    }
    writer.close()?;

    Ok(())
}
