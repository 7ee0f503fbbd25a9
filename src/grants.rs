// 💰 Grants Store - per-EIN grant values folded by tax year
// Read-only access to the `grants` relation of the SQLite store

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// YEAR RANGE
// ============================================================================

/// Tax years reported, ascending. Every other year is rejected by the fold.
pub const GRANT_YEARS: [&str; 14] = [
    "2004", "2005", "2006", "2007", "2008", "2009", "2010", "2011", "2012", "2013", "2014", "2015",
    "2016", "2017",
];

/// Number of year columns in a report row
pub const YEAR_COUNT: usize = GRANT_YEARS.len();

fn year_slot(year: &str) -> Option<usize> {
    GRANT_YEARS.iter().position(|y| *y == year)
}

// ============================================================================
// GRANTS BY YEAR
// ============================================================================

/// Grant values for one EIN, one slot per entry of [`GRANT_YEARS`].
/// An empty slot means no grant was recorded for that year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantsByYear {
    values: [String; YEAR_COUNT],
}

impl GrantsByYear {
    /// All slots blank
    pub fn empty() -> Self {
        Self::default()
    }

    /// Value for `year`, `None` when the year is outside the range
    pub fn get(&self, year: &str) -> Option<&str> {
        year_slot(year).map(|i| self.values[i].as_str())
    }

    /// Store `value` under `year`, replacing whatever was there.
    /// Returns false (and stores nothing) for a year outside the range.
    pub fn set(&mut self, year: &str, value: impl Into<String>) -> bool {
        match year_slot(year) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    /// Slot values in [`GRANT_YEARS`] order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }
}

// ============================================================================
// LOOKUP ERRORS
// ============================================================================

/// Failure to build the grants for a single charity.
/// The run continues; the charity is reported with blank years.
#[derive(Debug, Error)]
pub enum GrantsLookupError {
    #[error("reading grants for EIN {ein} failed: {source}")]
    Query {
        ein: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unable to match tax_period ({tax_period}) to year ({year}) for ein ({ein})")]
    UnrecognizedYear {
        ein: String,
        tax_period: String,
        year: String,
    },
}

impl GrantsLookupError {
    pub fn ein(&self) -> &str {
        match self {
            GrantsLookupError::Query { ein, .. } => ein,
            GrantsLookupError::UnrecognizedYear { ein, .. } => ein,
        }
    }
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Anything that can answer "what grants does this EIN have?"
pub trait GrantsSource {
    fn select_grants(&self, ein: &str) -> Result<GrantsByYear, GrantsLookupError>;
}

/// Fold `(tax_period, value)` rows into a [`GrantsByYear`].
///
/// The year is the first four characters of the tax period. Rows are applied
/// in the order given, so a later row for the same year wins.
pub fn fold_rows<I>(ein: &str, rows: I) -> Result<GrantsByYear, GrantsLookupError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut grants = GrantsByYear::empty();

    for (tax_period, value) in rows {
        let year: String = tax_period.chars().take(4).collect();
        if !grants.set(&year, value) {
            return Err(GrantsLookupError::UnrecognizedYear {
                ein: ein.to_string(),
                tax_period,
                year,
            });
        }
    }

    Ok(grants)
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// Open the grants database without write access
pub fn open_grants_db(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open sqlite database at path: {}", path.display()))
}

const SELECT_BY_ROWID: &str =
    "SELECT tax_period, value FROM grants WHERE ein = ?1 ORDER BY rowid";
const SELECT_UNORDERED: &str = "SELECT tax_period, value FROM grants WHERE ein = ?1";

/// `grants` relation accessor over a borrowed connection
pub struct SqliteGrantsStore<'conn> {
    conn: &'conn Connection,
    has_rowid: bool,
}

impl<'conn> SqliteGrantsStore<'conn> {
    /// Views and `WITHOUT ROWID` tables have no rowid; lookups on those fall
    /// back to whatever order SQLite returns.
    pub fn new(conn: &'conn Connection) -> Self {
        let has_rowid = conn.prepare("SELECT rowid FROM grants LIMIT 0").is_ok();
        SqliteGrantsStore { conn, has_rowid }
    }

    /// Whether duplicate (EIN, year) rows resolve in insertion order
    pub fn orders_by_rowid(&self) -> bool {
        self.has_rowid
    }

    /// Total number of rows in `grants`, used as a sanity check before a run
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM grants", [], |row| row.get(0))
            .context("Failed to read entry count from database")?;

        Ok(count)
    }

    fn query_rows(&self, ein: &str) -> rusqlite::Result<Vec<(String, String)>> {
        // rowid order makes last-write-wins reproducible across runs
        let sql = if self.has_rowid {
            SELECT_BY_ROWID
        } else {
            SELECT_UNORDERED
        };
        let mut stmt = self.conn.prepare_cached(sql)?;

        let rows = stmt
            .query_map(params![ein], |row| {
                Ok((text(row.get_ref(0)?), text(row.get_ref(1)?)))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

impl GrantsSource for SqliteGrantsStore<'_> {
    fn select_grants(&self, ein: &str) -> Result<GrantsByYear, GrantsLookupError> {
        let rows = self.query_rows(ein).map_err(|source| GrantsLookupError::Query {
            ein: ein.to_string(),
            source,
        })?;

        fold_rows(ein, rows)
    }
}

/// Render any SQLite storage class as text. NULL becomes "".
fn text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
