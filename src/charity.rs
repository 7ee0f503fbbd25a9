// 🏛️ Charity Roster - CSV rows → CharityRecord
// Reads the roster either by fixed column positions or by header labels

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state_or_province: String,
    pub zip: String,
}

/// One charity from the roster. EIN is the join key into the grants store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharityRecord {
    pub internal_name: String,
    pub external_name: String,
    pub address: Address,
    pub phone: String,
    pub ein: String,
    pub created_date: String,
    pub close_date: String,
}

/// How roster columns are located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnLayout {
    /// Fixed column indexes, no header row
    #[default]
    Positional,
    /// First row is a header; columns are found by label
    Named,
}

#[derive(Debug, Error)]
pub enum CharityError {
    #[error("Failed to read line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line} has {found} fields, expected at least {expected}")]
    TooFewFields {
        line: u64,
        found: usize,
        expected: usize,
    },
}

// ============================================================================
// EIN FILTER
// ============================================================================

static EIN_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]").expect("EIN shape pattern"));

/// Coarse guard against blank and header-like rows. Not a checksum.
pub fn is_plausible_ein(ein: &str) -> bool {
    !ein.is_empty() && EIN_SHAPE.is_match(ein)
}

// ============================================================================
// POSITIONAL LAYOUT
// ============================================================================

mod column {
    pub const INTERNAL_NAME: usize = 0;
    pub const EXTERNAL_NAME: usize = 1;
    pub const ADDR_LINE1: usize = 2;
    pub const ADDR_LINE2: usize = 3;
    pub const CITY: usize = 4;
    pub const STATE_OR_PROVINCE: usize = 5;
    pub const ZIP: usize = 6;
    pub const PHONE: usize = 7;
    pub const CREATED_DATE: usize = 15;
    pub const CLOSE_DATE: usize = 16;
    pub const EIN: usize = 17;
}

/// Minimum fields a positional row must carry
pub const MIN_FIELDS: usize = column::EIN + 1;

fn from_positions(record: &StringRecord) -> CharityRecord {
    let field = |i: usize| record.get(i).unwrap_or_default().to_string();

    CharityRecord {
        internal_name: field(column::INTERNAL_NAME),
        external_name: field(column::EXTERNAL_NAME),
        address: Address {
            line1: field(column::ADDR_LINE1),
            line2: field(column::ADDR_LINE2),
            city: field(column::CITY),
            state_or_province: field(column::STATE_OR_PROVINCE),
            zip: field(column::ZIP),
        },
        phone: field(column::PHONE),
        ein: field(column::EIN),
        created_date: field(column::CREATED_DATE),
        close_date: field(column::CLOSE_DATE),
    }
}

// ============================================================================
// NAMED LAYOUT
// ============================================================================

/// Header-labelled roster row. Labels match the report header.
#[derive(Debug, Deserialize)]
struct NamedRow {
    #[serde(rename = "Benevon Name")]
    internal_name: String,

    #[serde(rename = "External Name")]
    external_name: String,

    #[serde(rename = "Addr 1", default)]
    line1: String,

    #[serde(rename = "Addr 2", default)]
    line2: String,

    #[serde(rename = "City", default)]
    city: String,

    #[serde(rename = "State/Province", default)]
    state_or_province: String,

    #[serde(rename = "Zip", default)]
    zip: String,

    #[serde(rename = "Phone", default)]
    phone: String,

    #[serde(rename = "Created Date", default)]
    created_date: String,

    #[serde(rename = "Close Date", default)]
    close_date: String,

    #[serde(rename = "EIN")]
    ein: String,
}

impl From<NamedRow> for CharityRecord {
    fn from(row: NamedRow) -> Self {
        CharityRecord {
            internal_name: row.internal_name,
            external_name: row.external_name,
            address: Address {
                line1: row.line1,
                line2: row.line2,
                city: row.city,
                state_or_province: row.state_or_province,
                zip: row.zip,
            },
            phone: row.phone,
            ein: row.ein,
            created_date: row.created_date,
            close_date: row.close_date,
        }
    }
}

// ============================================================================
// READERS
// ============================================================================

/// Parse a roster from any reader, keeping only rows with a plausible EIN.
///
/// In positional mode a header row is NOT skipped: it is dropped only because
/// its EIN cell ("EIN") contains no digit. Any read fault or short row aborts
/// the whole parse.
pub fn read_charities<R: Read>(
    rdr: R,
    layout: ColumnLayout,
) -> Result<Vec<CharityRecord>, CharityError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(layout == ColumnLayout::Named)
        .flexible(layout == ColumnLayout::Positional)
        .from_reader(rdr);

    let headers = match layout {
        ColumnLayout::Named => Some(
            reader
                .headers()
                .map_err(|source| CharityError::Csv { line: 1, source })?
                .clone(),
        ),
        ColumnLayout::Positional => None,
    };

    let mut charities = Vec::new();
    let mut record = StringRecord::new();

    loop {
        let line = reader.position().line();
        let more = reader
            .read_record(&mut record)
            .map_err(|source| CharityError::Csv { line, source })?;
        if !more {
            break;
        }

        let charity = match &headers {
            None => {
                if record.len() < MIN_FIELDS {
                    return Err(CharityError::TooFewFields {
                        line,
                        found: record.len(),
                        expected: MIN_FIELDS,
                    });
                }
                from_positions(&record)
            }
            Some(headers) => {
                let row: NamedRow = record
                    .deserialize(Some(headers))
                    .map_err(|source| CharityError::Csv { line, source })?;
                CharityRecord::from(row)
            }
        };

        if !is_plausible_ein(&charity.ein) {
            continue;
        }

        charities.push(charity);
    }

    Ok(charities)
}

/// Open and parse the roster file
pub fn load_charities(csv_path: &Path, layout: ColumnLayout) -> Result<Vec<CharityRecord>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file at path: {}", csv_path.display()))?;

    let charities = read_charities(file, layout)
        .with_context(|| format!("Failed to parse charity CSV: {}", csv_path.display()))?;

    Ok(charities)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A positional roster line with 18 fields
    pub(crate) fn roster_line(name: &str, ein: &str) -> String {
        format!(
            "{name},{name} Public,1 Main St,Suite 2,Springfield,IL,62701,555-0100,\
             x,x,x,x,x,x,x,2011-01-01,2016-12-31,{ein}"
        )
    }

    #[test]
    fn test_positional_fields_copied_verbatim() {
        let csv = roster_line("Acme Fund", "12-3456789");

        let charities = read_charities(csv.as_bytes(), ColumnLayout::Positional).unwrap();

        assert_eq!(charities.len(), 1);
        let c = &charities[0];
        assert_eq!(c.internal_name, "Acme Fund");
        assert_eq!(c.external_name, "Acme Fund Public");
        assert_eq!(c.address.line1, "1 Main St");
        assert_eq!(c.address.line2, "Suite 2");
        assert_eq!(c.address.city, "Springfield");
        assert_eq!(c.address.state_or_province, "IL");
        assert_eq!(c.address.zip, "62701");
        assert_eq!(c.phone, "555-0100");
        assert_eq!(c.created_date, "2011-01-01");
        assert_eq!(c.close_date, "2016-12-31");
        assert_eq!(c.ein, "12-3456789");
    }

    #[test]
    fn test_invalid_eins_are_filtered() {
        let csv = [
            roster_line("A", "11-1111111"),
            roster_line("B", ""),
            roster_line("C", "N/A"),
            roster_line("D", "22-2222222"),
            roster_line("E", "pending 3"),
        ]
        .join("\n");

        let charities = read_charities(csv.as_bytes(), ColumnLayout::Positional).unwrap();

        let names: Vec<_> = charities.iter().map(|c| c.internal_name.as_str()).collect();
        assert_eq!(names, vec!["A", "D", "E"]);
    }

    #[test]
    fn test_positional_header_row_filtered_by_ein_shape() {
        let header = "Benevon Name,External Name,Addr 1,Addr 2,City,State/Province,Zip,Phone,\
                      h8,h9,h10,h11,h12,h13,h14,Created Date,Close Date,EIN";
        let csv = format!("{header}\n{}", roster_line("A", "11-1111111"));

        let charities = read_charities(csv.as_bytes(), ColumnLayout::Positional).unwrap();

        assert_eq!(charities.len(), 1);
        assert_eq!(charities[0].internal_name, "A");
    }

    #[test]
    fn test_short_row_is_fatal() {
        let csv = format!("{}\nonly,three,fields\n", roster_line("A", "11-1111111"));

        let err = read_charities(csv.as_bytes(), ColumnLayout::Positional).unwrap_err();

        match err {
            CharityError::TooFewFields { line, found, expected } => {
                assert_eq!(line, 2);
                assert_eq!(found, 3);
                assert_eq!(expected, 18);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_named_layout_maps_by_label() {
        let csv = "EIN,Zip,External Name,Benevon Name,Ignored\n\
                   12-3456789,02139,Public A,Internal A,zzz\n\
                   ,02139,Public B,Internal B,zzz\n";

        let charities = read_charities(csv.as_bytes(), ColumnLayout::Named).unwrap();

        assert_eq!(charities.len(), 1);
        let c = &charities[0];
        assert_eq!(c.ein, "12-3456789");
        assert_eq!(c.internal_name, "Internal A");
        assert_eq!(c.external_name, "Public A");
        assert_eq!(c.address.zip, "02139");
        assert_eq!(c.address.city, "");
        assert_eq!(c.phone, "");
    }

    #[test]
    fn test_named_layout_requires_ein_column() {
        let csv = "Benevon Name,External Name\nA,B\n";

        let err = read_charities(csv.as_bytes(), ColumnLayout::Named).unwrap_err();

        assert!(matches!(err, CharityError::Csv { .. }));
    }

    #[test]
    fn test_is_plausible_ein() {
        assert!(is_plausible_ein("12-3456789"));
        assert!(is_plausible_ein("x1"));
        assert!(!is_plausible_ein(""));
        assert!(!is_plausible_ein("EIN"));
        assert!(!is_plausible_ein("--"));
    }

    #[test]
    fn test_load_charities_missing_file() {
        let err = load_charities(Path::new("/nonexistent/roster.csv"), ColumnLayout::Positional)
            .unwrap_err();

        assert!(format!("{err:#}").contains("Failed to open CSV file"));
    }
}
