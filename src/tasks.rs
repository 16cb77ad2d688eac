use crate::errors::*;
use csv::{ReaderBuilder, StringRecord};
use snafu::ResultExt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Joins the fields of one CSV row back into a single comma-separated message.
pub fn row_to_message(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

/// Streams the rows of a CSV file as task messages, in file order.
///
/// There is no header row; every record becomes a message. Rows may have different numbers
/// of fields. Quoted fields are unquoted by the CSV parser before the fields are re-joined.
/// A blank line is a row too, and becomes an empty message.
pub struct TaskReader<R: Read> {
    path: PathBuf,
    reader: csv::Reader<BlankLines<R>>,
    record: StringRecord,
    row: usize,
}

impl TaskReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<TaskReader<File>> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(csv::Error::from)
            .context(OpenCsvSnafu { path })?;
        Ok(TaskReader::from_reader(path, file))
    }
}

impl<R: Read> TaskReader<R> {
    /// Reads tasks from an arbitrary source. `path` is only used in error messages.
    pub fn from_reader<P: Into<PathBuf>>(path: P, rdr: R) -> TaskReader<R> {
        let mut builder = ReaderBuilder::new();
        builder.has_headers(false).flexible(true);
        TaskReader {
            path: path.into(),
            reader: builder.from_reader(BlankLines::new(rdr)),
            record: StringRecord::new(),
            row: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Read> Iterator for TaskReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.row += 1;
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(row_to_message(&self.record))),
            Ok(false) => None,
            Err(source) => Some(Err(Error::ReadCsvRow {
                path: self.path.clone(),
                row: self.row,
                source,
            })),
        }
    }
}

/// The CSV parser silently skips empty lines. This adapter writes an empty quoted field
/// (`""`) onto every blank line outside a quoted field so the parser reports it as a
/// one-field row whose only field is empty.
struct BlankLines<R> {
    inner: R,
    pending: Vec<u8>,
    offset: usize,
    quote: Quote,
    field_start: bool,
    line_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quote {
    Outside,
    Inside,
    // Saw a quote inside a quoted field: either the field's closing quote or the first half
    // of an escaped `""`.
    MaybeClosed,
}

impl<R: Read> BlankLines<R> {
    fn new(inner: R) -> BlankLines<R> {
        BlankLines {
            inner,
            pending: Vec::new(),
            offset: 0,
            quote: Quote::Outside,
            field_start: true,
            line_start: true,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.quote == Quote::MaybeClosed {
            self.quote = if byte == b'"' {
                Quote::Inside
            } else {
                Quote::Outside
            };
        } else if self.quote == Quote::Inside {
            if byte == b'"' {
                self.quote = Quote::MaybeClosed;
            }
            self.pending.push(byte);
            return;
        }

        if self.quote == Quote::Outside {
            match byte {
                b'\n' => {
                    if self.line_start {
                        self.pending.extend_from_slice(b"\"\"");
                    }
                    self.line_start = true;
                    self.field_start = true;
                }
                // half of a \r\n terminator
                b'\r' => (),
                b',' => {
                    self.line_start = false;
                    self.field_start = true;
                }
                b'"' if self.field_start => {
                    self.quote = Quote::Inside;
                    self.line_start = false;
                    self.field_start = false;
                }
                _ => {
                    self.line_start = false;
                    self.field_start = false;
                }
            }
        }
        self.pending.push(byte);
    }
}

impl<R: Read> Read for BlankLines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.offset == self.pending.len() {
            self.pending.clear();
            self.offset = 0;

            let mut chunk = [0; 8 * 1024];
            let n = self.inner.read(&mut chunk)?;
            for &byte in &chunk[..n] {
                self.push(byte);
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}
