use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::writer::ReplaceableWriter;

/// Output path with `strftime` specifiers, e.g. `logs/app-%Y-%m-%d.log`.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    utc: bool,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err("empty output path template".into());
        }
        if StrftimeItems::new(template).any(|item| matches!(item, Item::Error)) {
            return Err(format!("malformed output path template '{}'", template).into());
        }
        Ok(Self {
            template: template.into(),
            utc: false,
        })
    }

    /// Renders in UTC instead of the local time zone.
    pub fn utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn render(&self, now: DateTime<Utc>) -> PathBuf {
        let rendered = if self.utc {
            now.format(&self.template).to_string()
        } else {
            now.with_timezone(&Local).format(&self.template).to_string()
        };
        PathBuf::from(rendered)
    }
}

type Opened = Option<(File, Option<PathBuf>)>;

/// A file that follows `template`: whenever the rendered path changes, the
/// current file is closed and the new path is opened for appending.
pub fn rotating_file(
    template: PathTemplate,
) -> ReplaceableWriter<File, Option<PathBuf>, impl FnMut(&Option<PathBuf>) -> io::Result<Opened>> {
    rotating_file_with_clock(template, Utc::now)
}

pub fn rotating_file_with_clock<K>(
    template: PathTemplate,
    mut clock: K,
) -> ReplaceableWriter<File, Option<PathBuf>, impl FnMut(&Option<PathBuf>) -> io::Result<Opened>>
where
    K: FnMut() -> DateTime<Utc>,
{
    ReplaceableWriter::new(move |current: &Option<PathBuf>| -> io::Result<Opened> {
        let path = template.render(clock());
        if current.as_ref() == Some(&path) {
            return Ok(None);
        }
        let file = open_append(&path)?;
        info!(path = %path.display(), "opened output file");
        Ok(Some((file, Some(path))))
    })
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
