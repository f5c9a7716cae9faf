//! CSV ingest and normalization.
//!
//! This module is responsible for turning a customer CSV into:
//!
//! - a raw, header-aligned table that is carried through to the export untouched
//! - one `FeatureRecord` per row, ready to be sent to the prediction service
//!
//! Normalization is deliberately lenient: a missing or malformed numeric cell
//! never fails the row, it falls back to the per-field default instead. Only a
//! file the CSV reader cannot decode fails the run.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::FeatureRecord;
use crate::error::AppError;

/// One data row of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the input file.
    pub line: usize,
    /// Cells aligned to `RawTable::headers` (short rows are padded with "").
    pub cells: Vec<String>,
}

/// Parsed input file: header + rows, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Positions of the feature columns within the input header.
///
/// Absent columns are `None` and normalize to the field default.
#[derive(Debug, Clone, Default)]
pub struct FeatureColumns {
    credit_score: Option<usize>,
    age: Option<usize>,
    tenure: Option<usize>,
    balance: Option<usize>,
    num_of_products: Option<usize>,
    has_cr_card: Option<usize>,
    is_active_member: Option<usize>,
    estimated_salary: Option<usize>,
    geography_germany: Option<usize>,
    geography_spain: Option<usize>,
}

impl FeatureColumns {
    pub fn from_headers(headers: &[String]) -> Self {
        let map = build_header_map(headers);
        let col = |name: &str| map.get(&normalize_header_name(name)).copied();
        Self {
            credit_score: col("CreditScore"),
            age: col("Age"),
            tenure: col("Tenure"),
            balance: col("Balance"),
            num_of_products: col("NumOfProducts"),
            has_cr_card: col("HasCrCard"),
            is_active_member: col("IsActiveMember"),
            estimated_salary: col("EstimatedSalary"),
            geography_germany: col("Geography_Germany"),
            geography_spain: col("Geography_Spain"),
        }
    }

    /// Header position of a feature column, by wire name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        match name {
            "CreditScore" => self.credit_score,
            "Age" => self.age,
            "Tenure" => self.tenure,
            "Balance" => self.balance,
            "NumOfProducts" => self.num_of_products,
            "HasCrCard" => self.has_cr_card,
            "IsActiveMember" => self.is_active_member,
            "EstimatedSalary" => self.estimated_salary,
            "Geography_Germany" => self.geography_germany,
            "Geography_Spain" => self.geography_spain,
            _ => None,
        }
    }

    /// Feature columns the header does not provide.
    pub fn missing(&self) -> Vec<&'static str> {
        FeatureRecord::COLUMNS
            .into_iter()
            .filter(|name| self.index_of(name).is_none())
            .collect()
    }
}

/// Open and parse a CSV file.
pub fn load_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::parse(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_table(file)
}

/// Parse CSV from any reader.
///
/// The first record is the header. Empty lines are skipped. Any decoding error
/// aborts the whole parse; no partial table is returned.
pub fn read_table<R: Read>(mut reader: R) -> Result<RawTable, AppError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| AppError::parse(format!("Failed to read CSV: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::parse(format!("CSV parsing error: {e}")))?
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            // Only the first header can carry a BOM.
            if idx == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut lines = LineCounter::new(&bytes);
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::parse(format!("CSV parsing error: {e}")))?;
        // records() starts after the header; fall back to that if the reader
        // has no position for this record.
        let line = record
            .position()
            .map(|p| lines.line_at(p.byte() as usize))
            .unwrap_or(idx + 2);
        rows.push(RawRow {
            line,
            cells: align_cells(&record, headers.len()),
        });
    }

    Ok(RawTable { headers, rows })
}

/// Maps record byte offsets to physical 1-based line numbers.
///
/// The csv reader's own line counter only advances per record, so skipped
/// blank lines are not counted. Offsets must be queried in increasing order.
struct LineCounter<'a> {
    bytes: &'a [u8],
    scanned: usize,
    newlines: usize,
}

impl<'a> LineCounter<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            scanned: 0,
            newlines: 0,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        // A record's offset points just past the previous terminator, which
        // can be the start of the blank lines the reader skipped.
        let mut start = offset.min(self.bytes.len());
        while start < self.bytes.len() && matches!(self.bytes[start], b'\n' | b'\r') {
            start += 1;
        }
        if start > self.scanned {
            self.newlines += self.bytes[self.scanned..start]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.scanned = start;
        }
        self.newlines + 1
    }
}

fn align_cells(record: &StringRecord, width: usize) -> Vec<String> {
    let mut cells: Vec<String> = record.iter().take(width).map(str::to_string).collect();
    cells.resize(width, String::new());
    cells
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

/// Header names match exactly; only a BOM is stripped.
fn normalize_header_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').to_string()
}

/// Build the feature record for one row. Never fails.
pub fn normalize_row(cells: &[String], columns: &FeatureColumns) -> FeatureRecord {
    let defaults = FeatureRecord::default();
    let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).map(String::as_str);

    let int = |idx, default| lenient_int(cell(idx), default);
    let float = |idx, default| lenient_float(cell(idx), default);
    let flag = |idx| lenient_int(cell(idx), 0) != 0;

    let geography_germany = flag(columns.geography_germany);
    // Both flags set is contradictory; Germany takes precedence.
    let geography_spain = flag(columns.geography_spain) && !geography_germany;

    FeatureRecord {
        credit_score: float(columns.credit_score, defaults.credit_score),
        age: int(columns.age, defaults.age),
        tenure: int(columns.tenure, defaults.tenure),
        balance: float(columns.balance, defaults.balance),
        num_of_products: int(columns.num_of_products, defaults.num_of_products),
        has_cr_card: flag(columns.has_cr_card),
        is_active_member: flag(columns.is_active_member),
        estimated_salary: float(columns.estimated_salary, defaults.estimated_salary),
        geography_germany,
        geography_spain,
    }
}

/// Integer value of a cell, or `default` when the cell is absent, has no
/// leading integer, or is zero.
pub fn lenient_int(cell: Option<&str>, default: i64) -> i64 {
    cell.and_then(leading_int)
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

/// Decimal value of a cell, or `default` when the cell is absent, has no
/// leading number, is non-finite, or is zero.
pub fn lenient_float(cell: Option<&str>, default: f64) -> f64 {
    cell.and_then(leading_float)
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(default)
}

/// Parse the integer prefix of `s` after leading whitespace.
///
/// `"42"`, `" 42abc"` and `"42.9"` all give 42; `"abc"` gives `None`.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Parse the decimal prefix of `s` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an exponent
/// only when it is followed by at least one digit: `"1.5e3x"` gives 1500.0,
/// `"2e"` gives 2.0.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
            mantissa_digits += 1;
        }
        if mantissa_digits > 0 {
            end = frac;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            end = exp;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RawTable {
        read_table(csv.as_bytes()).unwrap()
    }

    fn header() -> &'static str {
        "CreditScore,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Geography_Germany,Geography_Spain"
    }

    fn record_for(csv: &str) -> FeatureRecord {
        let t = table(csv);
        let columns = FeatureColumns::from_headers(&t.headers);
        normalize_row(&t.rows[0].cells, &columns)
    }

    #[test]
    fn reads_header_and_rows_in_order_skipping_empty_lines() {
        let t = table("id,Age\nA,30\n\nB,40\n\nC,50\n");
        assert_eq!(t.headers, vec!["id", "Age"]);
        let ids: Vec<&str> = t.rows.iter().map(|r| r.cells[0].as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(t.rows[0].line, 2);
        assert_eq!(t.rows[1].line, 4);
        assert_eq!(t.rows[2].line, 6);
    }

    #[test]
    fn line_numbers_count_skipped_blank_lines() {
        let t = table("id,Age\r\n\r\n\r\nA,30\r\nB,40\r\n\r\nC,50");
        let lines: Vec<usize> = t.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![4, 5, 7]);

        // A quoted newline spans two physical lines.
        let t = table("id,note\nA,\"two\nlines\"\n\nB,x\n");
        let lines: Vec<usize> = t.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 5]);
    }

    #[test]
    fn header_names_must_match_exactly() {
        let r = record_for("age, Tenure ,NUMOFPRODUCTS\n52,7,3\n");
        assert_eq!(r.age, 0);
        assert_eq!(r.tenure, 0);
        assert_eq!(r.num_of_products, 1);

        let r = record_for("Age,Tenure,NumOfProducts\n52,7,3\n");
        assert_eq!((r.age, r.tenure, r.num_of_products), (52, 7, 3));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let t = table("a,b,c\n1\n1,2,3,4\n");
        assert_eq!(t.rows[0].cells, vec!["1", "", ""]);
        assert_eq!(t.rows[1].cells, vec!["1", "2", "3"]);
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let t = table("\u{feff}CreditScore,Age\n700,30\n");
        assert_eq!(t.headers[0], "CreditScore");
        let columns = FeatureColumns::from_headers(&t.headers);
        let r = normalize_row(&t.rows[0].cells, &columns);
        assert_eq!(r.credit_score, 700.0);
        assert_eq!(r.age, 30);
    }

    #[test]
    fn invalid_utf8_fails_the_whole_parse() {
        let mut bytes = b"Age,Tenure\n30,2\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b',', b'1', b'\n']);
        let err = read_table(bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert!(err.to_string().starts_with("CSV parsing error"));
    }

    #[test]
    fn well_formed_row_normalizes_exactly() {
        let r = record_for(&format!(
            "{}\n619,42,2,0.0,1,1,1,101348.88,0,1\n",
            header()
        ));
        assert_eq!(r.credit_score, 619.0);
        assert_eq!(r.age, 42);
        assert_eq!(r.tenure, 2);
        assert_eq!(r.balance, 0.0);
        assert_eq!(r.num_of_products, 1);
        assert!(r.has_cr_card);
        assert!(r.is_active_member);
        assert!((r.estimated_salary - 101348.88).abs() < 1e-9);
        assert!(!r.geography_germany);
        assert!(r.geography_spain);
    }

    #[test]
    fn unparsable_and_missing_cells_fall_back_to_defaults() {
        let r = record_for(&format!("{}\nabc,,x,n/a,zz,?,no,--,,\n", header()));
        assert_eq!(r, FeatureRecord::default());
        assert_eq!(r.num_of_products, 1);

        // Columns absent from the header entirely.
        let r = record_for("id\ncustomer-1\n");
        assert_eq!(r, FeatureRecord::default());
    }

    #[test]
    fn zero_products_falls_back_to_one() {
        let r = record_for("NumOfProducts\n0\n");
        assert_eq!(r.num_of_products, 1);
        let r = record_for("NumOfProducts\n3\n");
        assert_eq!(r.num_of_products, 3);
    }

    #[test]
    fn numeric_prefixes_are_accepted() {
        let r = record_for("Age,Tenure,Balance,EstimatedSalary\n 42years,3.9,1.5e3x,-12.5\n");
        assert_eq!(r.age, 42);
        assert_eq!(r.tenure, 3);
        assert_eq!(r.balance, 1500.0);
        assert_eq!(r.estimated_salary, -12.5);
    }

    #[test]
    fn at_most_one_geography_flag_is_set() {
        for (de, es) in [("0", "0"), ("0", "1"), ("1", "0"), ("1", "1"), ("7", "x")] {
            let r = record_for(&format!("Geography_Germany,Geography_Spain\n{de},{es}\n"));
            assert!(!(r.geography_germany && r.geography_spain), "{de},{es}");
        }
        let both = record_for("Geography_Germany,Geography_Spain\n1,1\n");
        assert!(both.geography_germany);
        assert!(!both.geography_spain);
    }

    #[test]
    fn leading_number_scanners() {
        assert_eq!(leading_int("12"), Some(12));
        assert_eq!(leading_int("  -7z"), Some(-7));
        assert_eq!(leading_int("+"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("1e3"), Some(1));

        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("5."), Some(5.0));
        assert_eq!(leading_float("."), None);
        assert_eq!(leading_float("2e"), Some(2.0));
        assert_eq!(leading_float("2e-1kg"), Some(0.2));
        assert_eq!(leading_float("Infinity"), None);
    }

    #[test]
    fn missing_feature_columns_are_reported() {
        let columns = FeatureColumns::from_headers(&["age".to_string(), "Tenure".to_string()]);
        let missing = columns.missing();
        assert!(missing.contains(&"Age"));
        assert!(!missing.contains(&"Tenure"));
        assert_eq!(missing.len(), 9);
    }
}
