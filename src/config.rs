// ⚙️ Run configuration - resolved from CLI flags / environment

use crate::charity::ColumnLayout;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Everything a run needs. Both inputs are read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub charity_csv: PathBuf,
    pub grants_db: PathBuf,
    pub layout: ColumnLayout,
}

impl RunConfig {
    pub fn new(charity_csv: PathBuf, grants_db: PathBuf, named_columns: bool) -> Result<Self> {
        if charity_csv.as_os_str().is_empty() {
            bail!("charity CSV path is empty");
        }
        if grants_db.as_os_str().is_empty() {
            bail!("grants database path is empty");
        }

        let layout = if named_columns {
            ColumnLayout::Named
        } else {
            ColumnLayout::Positional
        };

        Ok(RunConfig {
            charity_csv,
            grants_db,
            layout,
        })
    }
}
