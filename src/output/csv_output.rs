//! CSV dataset writer
//!
//! One row per author: `name,id,collaborators`, where `collaborators` is a
//! single comma-joined field (quoted by the writer when needed).

use crate::config::{OutputConfig, WriteMode};
use crate::output::traits::{OutputResult, RecordSink};
use crate::record::AuthorRecord;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Output path that selects stdout instead of a file
pub const STDOUT_PATH: &str = "-";

/// Column names of the dataset
pub const HEADER: [&str; 3] = ["name", "id", "collaborators"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    id: &'a str,
    collaborators: String,
}

impl<'a> From<&'a AuthorRecord> for CsvRow<'a> {
    fn from(record: &'a AuthorRecord) -> Self {
        Self {
            name: &record.name,
            id: &record.id,
            collaborators: record.collaborators(),
        }
    }
}

/// CSV record sink
pub struct CsvOutput {
    writer: csv::Writer<Box<dyn Write + Send>>,
    rows: usize,
}

impl CsvOutput {
    /// Opens the configured destination
    ///
    /// With `WriteMode::Truncate` previous content is discarded. With
    /// `WriteMode::Append` rows are added after existing ones and the header
    /// is only written when the file is empty.
    pub fn open(config: &OutputConfig) -> OutputResult<Self> {
        if config.csv_path == STDOUT_PATH {
            return Self::from_writer(Box::new(io::stdout()), config.delimiter, true);
        }

        let path = Path::new(&config.csv_path);
        let file = match config.write_mode {
            WriteMode::Truncate => File::create(path)?,
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        let needs_header = file.metadata()?.len() == 0;

        tracing::debug!(
            "Opened {} ({:?}, header: {})",
            path.display(),
            config.write_mode,
            needs_header
        );

        Self::from_writer(Box::new(BufWriter::new(file)), config.delimiter, needs_header)
    }

    /// Wraps an arbitrary writer
    pub fn from_writer(
        writer: Box<dyn Write + Send>,
        delimiter: char,
        write_header: bool,
    ) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(u8::try_from(delimiter).unwrap_or(b','))
            .from_writer(writer);

        if write_header {
            writer.write_record(HEADER)?;
        }

        Ok(Self { writer, rows: 0 })
    }

    /// Number of data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl RecordSink for CsvOutput {
    fn write_record(&mut self, record: &AuthorRecord) -> OutputResult<()> {
        self.writer.serialize(CsvRow::from(record))?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
