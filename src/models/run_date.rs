use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// The date stamped into every output file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDate(NaiveDate);

impl RunDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today in the local timezone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parse a `YYYYMMDD` stamp
    pub fn parse(stamp: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(stamp, "%Y%m%d")
            .with_context(|| format!("Invalid date {:?}, expected YYYYMMDD", stamp))?;
        Ok(Self(date))
    }

    /// `YYYYMMDD`
    pub fn stamp(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// Default merged-table location, `dataset_<YYYYMMDD>.tsv`
    pub fn dataset_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("dataset_{}.tsv", self.stamp()))
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stamp())
    }
}
