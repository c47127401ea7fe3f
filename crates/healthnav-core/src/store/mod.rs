//! Persistence of user profiles and processed reports.

mod json_file;

pub use json_file::JsonFileStore;

use crate::error::StoreError;
use crate::models::profile::UserProfile;
use crate::models::report::StoredReport;

/// Keyed storage of one profile and many reports per user.
pub trait ProfileStore {
    /// Create or replace the user's profile.
    fn save_profile(&self, user: &str, profile: &UserProfile) -> Result<(), StoreError>;

    /// The user's profile, if one was saved.
    fn load_profile(&self, user: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Store a report and return its id.
    fn save_report(&self, user: &str, report: &StoredReport) -> Result<String, StoreError>;

    /// All reports of the user, newest first.
    fn list_reports(&self, user: &str) -> Result<Vec<StoredReport>, StoreError>;

    /// One report by id.
    fn load_report(&self, user: &str, id: &str) -> Result<StoredReport, StoreError>;
}

/// Reject user ids that are empty or contain anything but `[A-Za-z0-9_-]`.
pub fn validate_user_id(user: &str) -> Result<(), StoreError> {
    let valid = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidUser(user.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ids() {
        assert!(validate_user_id("local").is_ok());
        assert!(validate_user_id("user_42-b").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id("a b").is_err());
    }
}
