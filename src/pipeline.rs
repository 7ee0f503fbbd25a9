// 🔗 Join Pipeline - charities × grants store → report
// Single sequential pass; lookup failures are logged and reported as blank years

use crate::charity::{load_charities, CharityRecord};
use crate::config::RunConfig;
use crate::grants::{open_grants_db, GrantsByYear, GrantsSource, SqliteGrantsStore};
use crate::report::render_report;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{info, warn};

/// One output row: a charity and its grants (blank when the lookup failed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRecord {
    pub charity: CharityRecord,
    pub grants: GrantsByYear,
}

#[derive(Debug, Default)]
pub struct JoinOutcome {
    pub records: Vec<JoinedRecord>,
    pub failed_lookups: usize,
}

/// Pair every charity with its grants, in input order.
///
/// Never drops a charity and never retries a lookup.
pub fn join_grants<S: GrantsSource + ?Sized>(
    source: &S,
    charities: Vec<CharityRecord>,
) -> JoinOutcome {
    let mut outcome = JoinOutcome {
        records: Vec::with_capacity(charities.len()),
        failed_lookups: 0,
    };

    for charity in charities {
        let grants = match source.select_grants(&charity.ein) {
            Ok(grants) => grants,
            Err(err) => {
                warn!(ein = %err.ein(), "{err}");
                outcome.failed_lookups += 1;
                GrantsByYear::empty()
            }
        };

        outcome.records.push(JoinedRecord { charity, grants });
    }

    outcome
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub grants_in_store: i64,
    pub charities: usize,
    pub failed_lookups: usize,
}

/// Full run: open the store, load the roster, join, and write the report.
///
/// The report is rendered in memory before anything reaches `out`, so a
/// failure earlier in the run leaves `out` untouched.
pub fn run<W: Write>(config: &RunConfig, mut out: W) -> Result<RunSummary> {
    let conn = open_grants_db(&config.grants_db)?;
    let store = SqliteGrantsStore::new(&conn);

    let grants_in_store = store.count()?;
    info!("Grants Count: {}", grants_in_store);
    if !store.orders_by_rowid() {
        warn!("grants has no rowid; duplicate (EIN, year) rows resolve in SQLite's row order");
    }

    let charities = load_charities(&config.charity_csv, config.layout)?;
    info!("Number of charities with Valid EINs: {}", charities.len());

    let JoinOutcome {
        records,
        failed_lookups,
    } = join_grants(&store, charities);
    if failed_lookups > 0 {
        warn!("{} charities reported without grants after lookup errors", failed_lookups);
    }

    let report = render_report(&records)?;
    out.write_all(&report).context("Failed to write report")?;
    out.flush().context("Failed to flush report")?;

    Ok(RunSummary {
        grants_in_store,
        charities: records.len(),
        failed_lookups,
    })
}
