//! JSON-file persistence for license records and usage metrics.
//!
//! Two pretty-printed JSON arrays live in the data directory:
//! `licenses.json` and `usage_metrics.json`. Missing files read as empty
//! collections. The analytics engine only reads from the store.

mod sample;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{LicenseRecord, UsagePoint};

pub const LICENSES_FILE: &str = "licenses.json";
pub const USAGE_FILE: &str = "usage_metrics.json";

/// Utilization buckets used by [`LicenseStore::utilization_distribution`].
pub const UTILIZATION_RANGES: [&str; 5] = ["0-20%", "21-40%", "41-60%", "61-80%", "81-100%"];

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("license not found: {0}")]
    NotFound(String),

    #[error("invalid store operation: {0}")]
    Invalid(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Total cost incurred across all licenses on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
}

/// Number of licenses whose recent average utilization falls in `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationBucket {
    pub range: String,
    pub count: usize,
}

/// File-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    data_dir: PathBuf,
}

impl LicenseStore {
    /// Opens the store, creating the data directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn licenses_path(&self) -> PathBuf {
        self.data_dir.join(LICENSES_FILE)
    }

    fn usage_path(&self) -> PathBuf {
        self.data_dir.join(USAGE_FILE)
    }

    /// Whether a licenses file has been written.
    pub fn is_initialized(&self) -> bool {
        self.licenses_path().exists()
    }

    pub fn licenses(&self) -> StoreResult<Vec<LicenseRecord>> {
        read_array(&self.licenses_path())
    }

    pub fn license(&self, license_id: &str) -> StoreResult<Option<LicenseRecord>> {
        Ok(self.licenses()?.into_iter().find(|license| license.id == license_id))
    }

    /// Like [`LicenseStore::license`], failing with [`StoreError::NotFound`].
    pub fn require_license(&self, license_id: &str) -> StoreResult<LicenseRecord> {
        self.license(license_id)?.ok_or_else(|| StoreError::NotFound(license_id.to_string()))
    }

    pub fn usage(&self) -> StoreResult<Vec<UsagePoint>> {
        read_array(&self.usage_path())
    }

    pub fn usage_for(&self, license_id: &str) -> StoreResult<Vec<UsagePoint>> {
        Ok(self.usage()?.into_iter().filter(|point| point.license_id == license_id).collect())
    }

    /// Appends a license; ids must be unique.
    pub fn add_license(&self, license: LicenseRecord) -> StoreResult<()> {
        let mut licenses = self.licenses()?;
        if licenses.iter().any(|existing| existing.id == license.id) {
            return Err(StoreError::Invalid(format!("duplicate license id: {}", license.id)));
        }
        info!(license_id = %license.id, "Adding license");
        licenses.push(license);
        self.save_licenses(&licenses)
    }

    /// Replaces the license with `license_id`; returns false if absent.
    pub fn update_license(&self, license_id: &str, license: LicenseRecord) -> StoreResult<bool> {
        let mut licenses = self.licenses()?;
        let Some(slot) = licenses.iter_mut().find(|existing| existing.id == license_id) else {
            return Ok(false);
        };
        *slot = license;
        self.save_licenses(&licenses)?;
        Ok(true)
    }

    /// Removes a license together with its usage; returns false if absent.
    pub fn delete_license(&self, license_id: &str) -> StoreResult<bool> {
        let mut licenses = self.licenses()?;
        let before = licenses.len();
        licenses.retain(|license| license.id != license_id);
        if licenses.len() == before {
            return Ok(false);
        }
        self.save_licenses(&licenses)?;

        let mut usage = self.usage()?;
        usage.retain(|point| point.license_id != license_id);
        self.replace_usage(&usage)?;

        info!(license_id, "Deleted license and its usage");
        Ok(true)
    }

    pub fn save_licenses(&self, licenses: &[LicenseRecord]) -> StoreResult<()> {
        write_array(&self.licenses_path(), licenses)
    }

    /// Overwrites all usage metrics.
    pub fn replace_usage(&self, usage: &[UsagePoint]) -> StoreResult<()> {
        write_array(&self.usage_path(), usage)
    }

    /// Summed daily cost over the last `days` days up to `today`, ascending by date.
    pub fn cost_trend(&self, days: u32, today: NaiveDate) -> StoreResult<Vec<DailyCost>> {
        Ok(daily_costs(&self.usage()?, days, today))
    }

    /// Histogram of per-license average utilization over the last 30 days.
    pub fn utilization_distribution(
        &self,
        today: NaiveDate,
    ) -> StoreResult<Vec<UtilizationBucket>> {
        Ok(utilization_distribution(&self.usage()?, today))
    }

    /// Replaces the store contents with six demonstration contracts and 90
    /// days of generated usage ending the day before `today`.
    ///
    /// Output is deterministic for a given `seed` and `today`.
    pub fn seed_sample_data(&self, today: NaiveDate, seed: u64) -> StoreResult<usize> {
        let licenses = sample::licenses(today);
        let usage = sample::usage(&licenses, today, seed);
        self.save_licenses(&licenses)?;
        self.replace_usage(&usage)?;
        info!(licenses = licenses.len(), usage_points = usage.len(), "Seeded sample data");
        Ok(licenses.len())
    }
}

/// Sums `usage` cost per day over the last `days` days up to `today`.
pub fn daily_costs(usage: &[UsagePoint], days: u32, today: NaiveDate) -> Vec<DailyCost> {
    let cutoff = today - Duration::days(i64::from(days));
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in usage.iter().filter(|point| point.date >= cutoff) {
        *daily.entry(point.date).or_default() += point.cost_incurred;
    }
    daily.into_iter().map(|(date, cost)| DailyCost { date, cost }).collect()
}

/// Buckets each license's average utilization over the 30 days up to `today`.
///
/// Empty when `usage` is empty.
pub fn utilization_distribution(usage: &[UsagePoint], today: NaiveDate) -> Vec<UtilizationBucket> {
    if usage.is_empty() {
        return Vec::new();
    }

    let cutoff = today - Duration::days(30);
    let mut per_license: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for point in usage.iter().filter(|point| point.date >= cutoff) {
        let entry = per_license.entry(point.license_id.as_str()).or_default();
        entry.0 += point.utilization_percentage;
        entry.1 += 1;
    }

    let mut counts = [0usize; 5];
    for (sum, n) in per_license.values() {
        counts[utilization_bucket(sum / *n as f64)] += 1;
    }

    UTILIZATION_RANGES
        .iter()
        .zip(counts)
        .map(|(range, count)| UtilizationBucket { range: (*range).to_string(), count })
        .collect()
}

fn utilization_bucket(average: f64) -> usize {
    match average {
        a if a <= 20.0 => 0,
        a if a <= 40.0 => 1,
        a if a <= 60.0 => 2,
        a if a <= 80.0 => 3,
        _ => 4,
    }
}

fn read_array<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "Store file missing, reading as empty");
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
}

/// Writes via a temporary file and rename so readers never see a partial file.
fn write_array<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;

    let temp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
    fs::write(&temp_path, json).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StoreError::Io { path: temp_path.clone(), source }
    })?;
    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StoreError::Io { path: path.to_path_buf(), source }
    })?;

    debug!(path = %path.display(), records = items.len(), "Wrote store file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_bucket_edges() {
        assert_eq!(utilization_bucket(0.0), 0);
        assert_eq!(utilization_bucket(20.0), 0);
        assert_eq!(utilization_bucket(20.5), 1);
        assert_eq!(utilization_bucket(80.0), 3);
        assert_eq!(utilization_bucket(140.0), 4);
    }
}
