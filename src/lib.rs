// Charity Grants - Core Library
// Joins a charity roster CSV against a SQLite grants store and reports grants per year

pub mod charity;
pub mod config;
pub mod exit_codes;
pub mod grants;
pub mod logging;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use charity::{
    load_charities, read_charities, is_plausible_ein,
    Address, CharityError, CharityRecord, ColumnLayout,
};
pub use config::RunConfig;
pub use grants::{
    fold_rows, open_grants_db,
    GrantsByYear, GrantsLookupError, GrantsSource, SqliteGrantsStore,
    GRANT_YEARS,
};
pub use pipeline::{join_grants, run, JoinOutcome, JoinedRecord, RunSummary};
pub use report::{header, render_report, write_report};
