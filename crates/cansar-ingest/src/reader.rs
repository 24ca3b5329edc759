//! Chunked reading of the CAN-SAR source table.
//!
//! The source file is streamed in fixed-size row batches so peak memory is
//! bounded independent of file size. An optional run-level cap stops the
//! reader after the capped number of source rows; remaining batches are
//! never read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cansar_core::defaults::CANSAR_DELIMITER;
use cansar_core::{Error, Result};

use crate::source::{RowSchema, SourceRow};

/// Streaming batch reader over a delimited source table.
#[derive(Debug)]
pub struct ChunkedReader<R: BufRead> {
    reader: R,
    schema: RowSchema,
    batch_size: usize,
    max_rows: Option<u64>,
    rows_read: u64,
    done: bool,
}

impl ChunkedReader<BufReader<File>> {
    /// Open a source file and resolve its header.
    pub fn open(path: &Path, batch_size: usize, max_rows: Option<u64>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), batch_size, max_rows)
    }
}

impl<R: BufRead> ChunkedReader<R> {
    /// Create a reader over any buffered source; consumes the header line.
    pub fn new(mut reader: R, batch_size: usize, max_rows: Option<u64>) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidInput("batch size must be nonzero".to_string()));
        }

        let mut header = String::new();
        let read = reader.read_line(&mut header)?;
        if read == 0 {
            return Err(Error::Source("source file has no header line".to_string()));
        }

        let schema = RowSchema::from_header(header.trim_end_matches(['\r', '\n']), CANSAR_DELIMITER)?;

        Ok(Self {
            reader,
            schema,
            batch_size,
            max_rows,
            rows_read: 0,
            done: false,
        })
    }

    /// The header-resolved column layout.
    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Number of data rows read so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Read the next batch of rows, or `None` once the file or the row cap
    /// is exhausted. The final batch may be short.
    pub fn next_batch(&mut self) -> Result<Option<Vec<SourceRow>>> {
        if self.done {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.batch_size);
        let mut line = String::new();

        while rows.len() < self.batch_size {
            if let Some(max) = self.max_rows {
                if self.rows_read >= max {
                    self.done = true;
                    break;
                }
            }

            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.done = true;
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                continue;
            }

            self.rows_read += 1;
            rows.push(self.schema.parse_row(trimmed, self.rows_read));
        }

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "speciesID\tcommon_name\tspecies\ttaxonomic_group\tendemic_NA\tendemic_canada\tyear_published\tcosewic_status\tsara_status\tdoc_type\tranges\tEOO\tIAO";

    fn source_with_rows(n: usize) -> String {
        let mut out = String::from(HEADER);
        for i in 0..n {
            out.push('\n');
            out.push_str(&format!(
                "{}\tname{}\tsci{}\tBirds\t0\t0\t2010\tEndangered\t\treport\tON\t1.0\t2.0",
                i + 1,
                i + 1,
                i + 1
            ));
        }
        out.push('\n');
        out
    }

    #[test]
    fn test_batches_are_fixed_size_with_short_tail() {
        let mut reader = ChunkedReader::new(Cursor::new(source_with_rows(7)), 3, None).unwrap();

        assert_eq!(reader.next_batch().unwrap().unwrap().len(), 3);
        assert_eq!(reader.next_batch().unwrap().unwrap().len(), 3);
        assert_eq!(reader.next_batch().unwrap().unwrap().len(), 1);
        assert!(reader.next_batch().unwrap().is_none());
        assert_eq!(reader.rows_read(), 7);
    }

    #[test]
    fn test_row_cap_bounds_rows_read() {
        let mut reader = ChunkedReader::new(Cursor::new(source_with_rows(10)), 4, Some(5)).unwrap();

        let mut total = 0;
        while let Some(batch) = reader.next_batch().unwrap() {
            total += batch.len();
        }
        assert_eq!(total, 5);
        assert_eq!(reader.rows_read(), 5);
    }

    #[test]
    fn test_cap_larger_than_file_reads_everything() {
        let mut reader =
            ChunkedReader::new(Cursor::new(source_with_rows(3)), 100, Some(50)).unwrap();

        assert_eq!(reader.next_batch().unwrap().unwrap().len(), 3);
        assert!(reader.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_blank_lines_do_not_count_as_rows() {
        let source = format!("{}\n1\ta\tb\tBirds\t0\t0\t2010\t\t\t\t\t\t\n\n2\tc\td\tFish\t0\t0\t2011\t\t\t\t\t\t\n", HEADER);
        let mut reader = ChunkedReader::new(Cursor::new(source), 10, None).unwrap();

        let batch = reader.next_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].position, 1);
        assert_eq!(batch[1].position, 2);
    }

    #[test]
    fn test_empty_file_is_a_source_error() {
        let err = ChunkedReader::new(Cursor::new(""), 10, None).unwrap_err();
        assert!(err.to_string().contains("no header line"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = ChunkedReader::new(Cursor::new(source_with_rows(1)), 0, None).unwrap_err();
        assert!(err.to_string().contains("batch size"));
    }
}
