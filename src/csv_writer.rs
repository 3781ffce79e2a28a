/*!
 * CSV output of coded segments.
 *
 * Rows are written with minimal quoting and `\n` line endings. Uncoded
 * dimensions are written as empty fields.
 */

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

use crate::app_config::OutputDelimiter;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::segment_coder::{CodedValue, Segment};

/// Flat output record, one per segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRow {
    pub participant_id: String,
    /// 0 mother, 1 toddler
    pub speaker: u8,
    /// Segment start in ms
    pub timestamp: u64,
    pub responsivity: Option<u8>,
    pub emotion_words: u32,
    pub type_of_speech: Option<u8>,
    pub directed_speech: Option<u8>,
    pub time_period: Option<u8>,
    pub trash: u8,
}

impl CodeRow {
    /// Column headers, in field order
    pub const HEADERS: [&'static str; 9] = [
        "Participant ID",
        "Speaker",
        "Timestamp",
        "Responsivity",
        "Emotion Words",
        "Type of Speech",
        "Directed Speech",
        "Time Period",
        "Trash",
    ];
}

impl From<&Segment> for CodeRow {
    fn from(segment: &Segment) -> Self {
        CodeRow {
            participant_id: segment.participant_id.clone(),
            speaker: segment.speaker.code(),
            timestamp: segment.start_ms,
            responsivity: segment.responsivity.map(CodedValue::code),
            emotion_words: segment.emotion_words,
            type_of_speech: segment.type_of_speech.map(CodedValue::code),
            directed_speech: segment.directed_speech.map(CodedValue::code),
            time_period: segment.time_period.map(CodedValue::code),
            trash: segment.trash.code(),
        }
    }
}

/// CSV sink that writes the header on creation
pub struct CsvOutput<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl CsvOutput<File> {
    /// Create (or truncate) the output file
    pub fn create<P: AsRef<Path>>(path: P, delimiter: OutputDelimiter) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent)?;
        }
        let file = File::create(path).map_err(|e| {
            AppError::File(format!("Failed to create {}: {}", path.display(), e))
        })?;
        Self::from_writer(file, delimiter)
    }
}

impl<W: Write> CsvOutput<W> {
    pub fn from_writer(inner: W, delimiter: OutputDelimiter) -> Result<Self, AppError> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter.as_byte())
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CodeRow::HEADERS)?;

        Ok(CsvOutput {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &CodeRow) -> Result<(), AppError> {
        self.writer.serialize(row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_rows<'r, I>(&mut self, rows: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = &'r CodeRow>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, AppError> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| AppError::Output(e.to_string()))
    }
}

/// Write all rows to `path`, replacing any existing file
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    rows: &[CodeRow],
    delimiter: OutputDelimiter,
) -> Result<usize, AppError> {
    let mut output = CsvOutput::create(path, delimiter)?;
    output.write_rows(rows)?;
    let written = output.rows_written();
    output.finish()?;
    Ok(written)
}
