//! Employee CSV parser
//!
//! # File Format
//! ```text
//! id,login,name,salary
//! 1,john,John Doe,5000.00
//! #2,draft,Not Yet,0
//! ```
//!
//! The first row is a header and is discarded without inspection. Every other
//! row must carry exactly four fields. Parsing stops at the first bad row and
//! no partial result is returned.

use csv::{ByteRecord, ReaderBuilder};
use roster_common::types::parse_salary;
use roster_common::Employee;
use std::io::Read;
use tracing::{debug, warn};

use crate::encoding::repair_mojibake;

/// Number of fields in every data row: id, login, name, salary
pub const EXPECTED_FIELDS: usize = 4;

/// Why a payload could not be turned into records
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid CSV format. Each line should have 4 columns.")]
    MalformedRow { line: u64, fields: usize },

    #[error("Invalid salary format. Salary must be a decimal value >= 0.0.")]
    InvalidSalary { line: u64, value: String },

    #[error("Failed to read CSV data: {0}")]
    Read(#[from] csv::Error),
}

impl ParseError {
    /// Source line of the offending row, when known
    pub fn line(&self) -> Option<u64> {
        match self {
            ParseError::MalformedRow { line, .. } | ParseError::InvalidSalary { line, .. } => {
                Some(*line)
            },
            ParseError::Read(e) => e.position().map(|p| p.line()),
        }
    }
}

/// Parser for employee upload files
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: u8,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    /// Comma-delimited parser
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Parse every data row of `reader` in file order.
    ///
    /// Comment rows are returned too; the batch validator decides what to
    /// do with them. The header is the first physical line, even when blank.
    /// A blank line anywhere after it is a one-field row and fails the parse;
    /// only a single trailing line terminator is accepted.
    pub fn parse<R: Read>(&self, mut reader: R) -> Result<Vec<Employee>, ParseError> {
        let mut input = Vec::new();
        reader.read_to_end(&mut input).map_err(csv::Error::from)?;

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(input.as_slice());

        let mut employees = Vec::new();
        let mut record = ByteRecord::new();
        let mut header_pending = true;

        loop {
            let more = csv_reader.read_byte_record(&mut record)?;

            // The csv reader drops empty lines without reporting them, so
            // look at the bytes it consumed ahead of this record.
            let (offset, line) = record
                .position()
                .map_or((0, 1), |p| (p.byte() as usize, p.line()));
            let mut blanks = BlankRun::scan(&input, offset, line);
            if header_pending && blanks.count > 0 {
                header_pending = false;
                blanks.count -= 1;
                blanks.first_line += 1;
            }
            if blanks.count > 0 {
                let err = ParseError::MalformedRow {
                    line: blanks.first_line,
                    fields: 1,
                };
                warn!(line = blanks.first_line, error = %err, "Rejecting upload at blank row");
                return Err(err);
            }

            if !more {
                break;
            }
            if header_pending {
                header_pending = false;
                continue;
            }

            let line = blanks.content_line();
            match parse_row(&record, line) {
                Ok(employee) => employees.push(employee),
                Err(e) => {
                    warn!(line, error = %e, "Rejecting upload at malformed row");
                    return Err(e);
                },
            }
        }

        debug!(rows = employees.len(), "Parsed employee rows");
        Ok(employees)
    }
}

/// Empty lines sitting between the previous record and the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlankRun {
    first_line: u64,
    count: u64,
}

impl BlankRun {
    fn scan(input: &[u8], offset: usize, line: u64) -> Self {
        let mut pos = offset;
        let mut line = line;

        // A CR terminator ends the previous record before its LF is read.
        if pos > 0 && input.get(pos - 1) == Some(&b'\r') && input.get(pos) == Some(&b'\n') {
            pos += 1;
            line += 1;
        }

        let mut count = 0;
        while let Some(&byte) = input.get(pos) {
            match byte {
                b'\n' => pos += 1,
                b'\r' => {
                    pos += 1;
                    if input.get(pos) == Some(&b'\n') {
                        pos += 1;
                    }
                },
                _ => break,
            }
            count += 1;
        }

        Self {
            first_line: line,
            count,
        }
    }

    /// Line on which the record itself starts
    fn content_line(&self) -> u64 {
        self.first_line + self.count
    }
}

fn parse_row(record: &ByteRecord, line: u64) -> Result<Employee, ParseError> {
    if record.len() != EXPECTED_FIELDS {
        return Err(ParseError::MalformedRow {
            line,
            fields: record.len(),
        });
    }

    let field = |index: usize| String::from_utf8_lossy(&record[index]).into_owned();

    let raw_salary = field(3);
    let salary = match parse_salary(&raw_salary) {
        Ok(salary) => salary,
        Err(_) => {
            return Err(ParseError::InvalidSalary {
                line,
                value: raw_salary,
            })
        },
    };

    Ok(Employee::new(field(0), field(1), repair_mojibake(&field(2)), salary))
}
