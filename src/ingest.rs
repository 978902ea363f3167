//! Reads the input CSV into `RawTransaction` rows.
//!
//! Header names are matched case-insensitively. Fields are decoded as UTF-8 and fall back to
//! Latin-1 one field at a time, so a single mis-encoded cell does not spoil the row.

use crate::model::{Issue, RawTransaction};
use crate::Result;
use anyhow::Context;
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::{debug, warn};

const BOM: char = '\u{feff}';
const DATE_HEADERS: &[&str] = &["date"];
const AMOUNT_HEADERS: &[&str] = &["amount"];
const MERCHANT_HEADERS: &[&str] = &["merchant", "description", "payee"];
const NOTES_HEADERS: &[&str] = &["notes", "note", "memo"];

/// The input lacks one of the `date`, `amount` or `merchant` columns. Nothing can be normalized
/// without them, so this aborts the run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MissingRequiredColumn {
    pub column: String,
    /// The header names that were found, as written in the file.
    pub found: Vec<String>,
}

impl Display for MissingRequiredColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Missing required column '{}' (found: {})",
            self.column,
            self.found.join(", ")
        )
    }
}

impl StdError for MissingRequiredColumn {}

/// A record that could not be turned into a `RawTransaction`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SkippedRow {
    /// 1-based line in the input file.
    pub line: u64,
    /// Always `Issue::MalformedRow`.
    pub issue: Issue,
    pub reason: String,
}

/// Everything read from one input file.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Ingested {
    pub headers: Vec<String>,
    pub rows: Vec<RawTransaction>,
    pub skipped: Vec<SkippedRow>,
}

/// Column positions of the fields we read.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    amount: usize,
    merchant: usize,
    notes: Option<usize>,
    /// Number of header columns. Every record is padded or cut to this many fields.
    width: usize,
}

impl Columns {
    fn find(headers: &[String]) -> Result<Self> {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lowered.iter().position(|h| h == name))
        };
        let required = |column: &str, names: &[&str]| {
            position(names).ok_or_else(|| MissingRequiredColumn {
                column: column.to_string(),
                found: headers.to_vec(),
            })
        };
        Ok(Self {
            date: required("date", DATE_HEADERS)?,
            amount: required("amount", AMOUNT_HEADERS)?,
            merchant: required("merchant", MERCHANT_HEADERS)?,
            notes: position(NOTES_HEADERS),
            width: headers.len(),
        })
    }

    fn row(&self, record: &ByteRecord) -> std::result::Result<RawTransaction, String> {
        let mut fields: Vec<String> = record.iter().map(decode).collect();
        let field = |name: &str, ix: usize| {
            fields
                .get(ix)
                .cloned()
                .ok_or_else(|| format!("missing field '{name}'"))
        };
        let date = field("date", self.date)?;
        let amount = field("amount", self.amount)?;
        let merchant = field("merchant", self.merchant)?;
        let notes = self
            .notes
            .and_then(|ix| fields.get(ix))
            .filter(|n| !n.trim().is_empty())
            .cloned();
        fields.resize(self.width, String::new());
        Ok(RawTransaction::new(date, amount, merchant, notes).with_fields(fields))
    }
}

/// Reads the CSV at `path`. With `sample` set, at most that many data records are read.
pub async fn read_transactions(path: &Path, sample: Option<usize>) -> Result<Ingested> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Unable to read {}", path.display()))?;
    parse_transactions(&bytes, sample).with_context(|| format!("Unable to load {}", path.display()))
}

/// Parses CSV bytes. See `read_transactions`.
pub fn parse_transactions(bytes: &[u8], sample: Option<usize>) -> Result<Ingested> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .context("Unable to read the CSV header")?
        .iter()
        .enumerate()
        .map(|(ix, field)| {
            let header = decode(field);
            if ix == 0 {
                header.trim_start_matches(BOM).trim().to_string()
            } else {
                header
            }
        })
        .collect();
    let columns = Columns::find(&headers)?;
    debug!("Reading columns {columns:?} from headers {headers:?}");

    let mut ingested = Ingested {
        headers,
        ..Ingested::default()
    };
    let mut record = ByteRecord::new();
    let mut consumed = 0usize;
    loop {
        if sample.is_some_and(|limit| consumed >= limit) {
            break;
        }
        let line = reader.position().line();
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                consumed += 1;
                let line = record.position().map_or(line, |p| p.line());
                match columns.row(&record) {
                    Ok(row) => ingested.rows.push(row),
                    Err(reason) => skip(&mut ingested, line, reason),
                }
            }
            Err(e) => {
                consumed += 1;
                let line = e.position().map_or(line, |p| p.line());
                skip(&mut ingested, line, e.to_string());
            }
        }
    }
    debug!(
        "Read {} rows and skipped {}",
        ingested.rows.len(),
        ingested.skipped.len()
    );
    Ok(ingested)
}

fn skip(ingested: &mut Ingested, line: u64, reason: String) {
    warn!("Skipping line {line}: {reason}");
    ingested.skipped.push(SkippedRow {
        line,
        issue: Issue::MalformedRow,
        reason,
    });
}

/// UTF-8 when valid, otherwise Latin-1 (every byte is one code point).
fn decode(field: &[u8]) -> String {
    match std::str::from_utf8(field) {
        Ok(s) => s.to_string(),
        Err(_) => field.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    const HEADER: &str = "date,amount,merchant,notes\n";

    #[test]
    fn test_reads_rows() {
        let csv = format!("{HEADER}2023-01-01,$100.00,UBER *TRIP,ride\nJan 1st 23,100,Uber Technologies,\n");
        let ingested = parse_transactions(csv.as_bytes(), None).unwrap();
        assert_eq!(ingested.headers, ["date", "amount", "merchant", "notes"]);
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(
            ingested.rows[0],
            RawTransaction::new("2023-01-01", "$100.00", "UBER *TRIP", Some("ride".to_string()))
        );
        assert_eq!(ingested.rows[1].notes, None);
        assert!(ingested.skipped.is_empty());
    }

    #[test]
    fn test_keeps_every_field_of_the_record() {
        let csv = "id,Payee,amount,date,account\n7,Starbucks,$5,2023-01-01,checking\n8,Uber,$9,2023-01-02\n";
        let ingested = parse_transactions(csv.as_bytes(), None).unwrap();
        assert_eq!(ingested.headers, ["id", "Payee", "amount", "date", "account"]);
        let first = &ingested.rows[0];
        assert_eq!(first.merchant, "Starbucks");
        assert_eq!(first.fields, ["7", "Starbucks", "$5", "2023-01-01", "checking"]);
        // a short record is padded to the header width
        assert_eq!(ingested.rows[1].fields, ["8", "Uber", "$9", "2023-01-02", ""]);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let csv = format!("{HEADER}01/02/2023,\"$1,234.56\",\"Shell Oil Co.\",\n");
        let ingested = parse_transactions(csv.as_bytes(), None).unwrap();
        assert_eq!(ingested.rows[0].amount, "$1,234.56");
        assert_eq!(ingested.rows[0].merchant, "Shell Oil Co.");
    }

    #[test]
    fn test_headers_are_case_insensitive_with_aliases_and_bom() {
        let csv = "\u{feff}Date , AMOUNT,Description\n2023-01-01,5,Starbucks\n";
        let ingested = parse_transactions(csv.as_bytes(), None).unwrap();
        assert_eq!(ingested.rows.len(), 1);
        assert_eq!(ingested.rows[0].merchant, "Starbucks");
        assert_eq!(ingested.headers[0], "Date");
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "date,merchant\n2023-01-01,Starbucks\n";
        let err = parse_transactions(csv.as_bytes(), None).unwrap_err();
        let missing = err.downcast_ref::<MissingRequiredColumn>().unwrap();
        assert_eq!(missing.column, "amount");
        assert_eq!(missing.found, ["date", "merchant"]);
        assert_eq!(
            missing.to_string(),
            "Missing required column 'amount' (found: date, merchant)"
        );
    }

    #[test]
    fn test_header_only_is_empty() {
        let ingested = parse_transactions(HEADER.as_bytes(), None).unwrap();
        assert!(ingested.rows.is_empty());
        assert!(ingested.skipped.is_empty());
    }

    #[test]
    fn test_short_record_is_skipped() {
        let csv = format!("{HEADER}2023-01-01,5\n2023-01-02,6,Starbucks\n");
        let ingested = parse_transactions(csv.as_bytes(), None).unwrap();
        assert_eq!(ingested.rows.len(), 1);
        assert_eq!(
            ingested.skipped,
            [SkippedRow {
                line: 2,
                issue: Issue::MalformedRow,
                reason: "missing field 'merchant'".to_string()
            }]
        );
    }

    #[test]
    fn test_latin1_fallback() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"2023-01-01,4.50,CAF\xc9 LUNA,\n");
        let ingested = parse_transactions(&bytes, None).unwrap();
        assert_eq!(ingested.rows[0].merchant, "CAFÉ LUNA");
        assert_eq!(ingested.rows[0].amount, "4.50");
    }

    #[test]
    fn test_sample_limits_rows() {
        let csv = format!("{HEADER}2023-01-01,1,A\n2023-01-02,2,B\n2023-01-03,3,C\n");
        let ingested = parse_transactions(csv.as_bytes(), Some(2)).unwrap();
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(ingested.rows[1].merchant, "B");
    }

    #[tokio::test]
    async fn test_read_file() {
        let env = TestEnv::new();
        let path = env.write_input("input.csv", "date,amount,payee\n2023-01-01,1,Target\n");
        let ingested = read_transactions(&path, None).await.unwrap();
        assert_eq!(ingested.rows[0].merchant, "Target");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let env = TestEnv::new();
        let err = read_transactions(&env.path("nope.csv"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unable to read"));
    }
}
