//! Profile store backed by JSON files on the local filesystem.
//!
//! Layout:
//! ```text
//! <root>/profiles/<user>/profile.json
//! <root>/profiles/<user>/reports/<id>.json
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{validate_user_id, ProfileStore};
use crate::error::StoreError;
use crate::models::profile::UserProfile;
use crate::models::report::StoredReport;

const ID_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf, StoreError> {
        validate_user_id(user)?;
        Ok(self.root.join("profiles").join(user))
    }

    fn reports_dir(&self, user: &str) -> Result<PathBuf, StoreError> {
        Ok(self.user_dir(user)?.join("reports"))
    }

    /// Pick an unused id derived from the scan timestamp.
    fn allocate_id(dir: &Path, report: &StoredReport) -> String {
        let base = report.scanned_at.format(ID_FORMAT).to_string().replace('.', "");
        let mut id = base.clone();
        let mut n = 1;
        while dir.join(format!("{}.json", id)).exists() {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }
}

impl ProfileStore for JsonFileStore {
    fn save_profile(&self, user: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let dir = self.user_dir(user)?;
        fs::create_dir_all(&dir)?;
        let path = dir.join("profile.json");
        fs::write(&path, serde_json::to_string_pretty(profile)?)?;
        debug!("Saved profile to {}", path.display());
        Ok(())
    }

    fn load_profile(&self, user: &str) -> Result<Option<UserProfile>, StoreError> {
        let path = self.user_dir(user)?.join("profile.json");
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_report(&self, user: &str, report: &StoredReport) -> Result<String, StoreError> {
        let dir = self.reports_dir(user)?;
        fs::create_dir_all(&dir)?;

        let id = Self::allocate_id(&dir, report);
        let mut record = report.clone();
        record.id = id.clone();

        let path = dir.join(format!("{}.json", id));
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        debug!("Saved report {} to {}", id, path.display());
        Ok(id)
    }

    fn list_reports(&self, user: &str) -> Result<Vec<StoredReport>, StoreError> {
        let dir = self.reports_dir(user)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reports = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredReport>(&content) {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping unreadable report {}: {}", path.display(), e),
            }
        }

        reports.sort_by(|a, b| {
            b.scanned_at
                .cmp(&a.scanned_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(reports)
    }

    fn load_report(&self, user: &str, id: &str) -> Result<StoredReport, StoreError> {
        validate_user_id(id).map_err(|_| StoreError::ReportNotFound(id.to_string()))?;
        let path = self.reports_dir(user)?.join(format!("{}.json", id));
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ReportNotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}
