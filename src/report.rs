// 📄 Report Writer - joined records → CSV
// Fixed 25-column layout: charity fields, then one column per grant year

use crate::grants::GRANT_YEARS;
use crate::pipeline::JoinedRecord;
use anyhow::{Context, Result};
use std::io::Write;

/// Charity columns, in output order. Year columns follow.
pub const CHARITY_COLUMNS: [&str; 11] = [
    "EIN",
    "Benevon Name",
    "External Name",
    "Addr 1",
    "Addr 2",
    "City",
    "State/Province",
    "Zip",
    "Phone",
    "Created Date",
    "Close Date",
];

/// Total columns per report row
pub const REPORT_WIDTH: usize = CHARITY_COLUMNS.len() + GRANT_YEARS.len();

/// The report header row
pub fn header() -> Vec<&'static str> {
    CHARITY_COLUMNS.iter().chain(GRANT_YEARS.iter()).copied().collect()
}

impl JoinedRecord {
    /// Report row in header order
    pub fn to_row(&self) -> Vec<&str> {
        let c = &self.charity;
        let mut row = Vec::with_capacity(REPORT_WIDTH);
        row.extend([
            c.ein.as_str(),
            c.internal_name.as_str(),
            c.external_name.as_str(),
            c.address.line1.as_str(),
            c.address.line2.as_str(),
            c.address.city.as_str(),
            c.address.state_or_province.as_str(),
            c.address.zip.as_str(),
            c.phone.as_str(),
            c.created_date.as_str(),
            c.close_date.as_str(),
        ]);
        row.extend(self.grants.values());
        row
    }
}

/// Write the header and one row per record, then flush.
/// A deferred error surfacing at flush time fails the whole write.
pub fn write_report<W: Write>(out: W, records: &[JoinedRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(header()).context("Failed to write report header")?;

    for record in records {
        wtr.write_record(record.to_row())
            .with_context(|| format!("Failed to write report row for EIN {}", record.charity.ein))?;
    }

    wtr.flush().context("Failed to flush report")?;

    Ok(())
}

/// Render the full report into memory
pub fn render_report(records: &[JoinedRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_report(&mut buf, records)?;
    Ok(buf)
}
