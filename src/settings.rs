use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::admin_key::DEFAULT_ADMIN_KEY_ENV;
use crate::error::PollerError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
/// Upper bound on `lookback_days`; keeps the query window inside chrono's range.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Environment variable holding the admin API key.
    pub api_key_env: String,

    /// API root; `/organization/costs` is appended. Overridden in tests to point at a mock server.
    pub base_url: String,

    /// How far back the costs query reaches, in days.
    pub lookback_days: u32,

    /// Directory the badge files are written into (the repository root in CI).
    pub output_dir: PathBuf,

    pub cost_badge_file: String,
    pub cost_badge_color: String,
    pub entry_badge_file: String,
    pub entry_badge_color: String,

    /// When set, the full cost summary is also written to this file in `output_dir`.
    pub snapshot_file: Option<String>,

    /// Explicit request timeout. None leaves reqwest's default in place.
    pub request_timeout_secs: Option<u64>,

    pub publish: PublishSettings,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_ADMIN_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            output_dir: PathBuf::from("."),
            cost_badge_file: "TotalCost.json".to_string(),
            cost_badge_color: "blue".to_string(),
            entry_badge_file: "TotalEntry.json".to_string(),
            entry_badge_color: "yellow".to_string(),
            snapshot_file: None,
            request_timeout_secs: None,
            publish: PublishSettings::default(),
        }
    }
}

/// Identity and behaviour of the commit/push step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    pub commit_message: String,
    pub author_name: String,
    pub author_email: String,
    pub push: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            commit_message: "Update OpenAI quota badges".to_string(),
            author_name: "github-actions[bot]".to_string(),
            author_email: "github-actions[bot]@users.noreply.github.com".to_string(),
            push: true,
        }
    }
}

impl PollerSettings {
    /// Paths of every file a fetch run produces, in write order.
    pub fn output_files(&self) -> Vec<PathBuf> {
        let mut files = vec![
            self.output_dir.join(&self.cost_badge_file),
            self.output_dir.join(&self.entry_badge_file),
        ];
        if let Some(snapshot) = &self.snapshot_file {
            files.push(self.output_dir.join(snapshot));
        }
        files
    }

    pub fn validate(&self) -> Result<(), PollerError> {
        if self.api_key_env.trim().is_empty() {
            return Err(PollerError::Config("api_key_env must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PollerError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(PollerError::Config(format!(
                "lookback_days must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        let names = [
            Some(&self.cost_badge_file),
            Some(&self.entry_badge_file),
            self.snapshot_file.as_ref(),
        ];
        for name in names.into_iter().flatten() {
            if name.trim().is_empty() {
                return Err(PollerError::Config("output file names must not be empty".into()));
            }
        }
        if self.cost_badge_file == self.entry_badge_file
            || self.snapshot_file.as_ref() == Some(&self.cost_badge_file)
            || self.snapshot_file.as_ref() == Some(&self.entry_badge_file)
        {
            return Err(PollerError::Config("output file names must be distinct".into()));
        }
        Ok(())
    }
}

/// Load settings from a JSON file. A missing file yields defaults; an unreadable or
/// malformed one is a configuration error.
pub fn load_settings(path: &Path) -> Result<PollerSettings, PollerError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str::<PollerSettings>(&contents)
            .map_err(|e| PollerError::Config(format!("failed to parse {:?}: {}", path, e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("Settings: {:?} not found, using defaults", path);
            Ok(PollerSettings::default())
        }
        Err(e) => Err(PollerError::Config(format!("failed to read {:?}: {}", path, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_badge_layout() {
        let settings = PollerSettings::default();
        assert_eq!(settings.api_key_env, "OPENAI_ADMIN_API_KEY");
        assert_eq!(settings.lookback_days, 30);
        assert_eq!(
            settings.output_files(),
            vec![PathBuf::from("./TotalCost.json"), PathBuf::from("./TotalEntry.json")]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"lookback_days": 7, "publish": {{"push": false}}}}"#).unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.lookback_days, 7);
        assert!(!settings.publish.push);
        assert_eq!(settings.publish.author_name, "github-actions[bot]");
        assert_eq!(settings.cost_badge_color, "blue");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, PollerSettings::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_settings(file.path()).unwrap_err();
        assert!(matches!(err, PollerError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = PollerSettings::default();
        settings.lookback_days = 0;
        assert!(settings.validate().is_err());

        let mut settings = PollerSettings::default();
        settings.base_url = "ftp://example.com".into();
        assert!(settings.validate().is_err());

        let mut settings = PollerSettings::default();
        settings.entry_badge_file = settings.cost_badge_file.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_lookback() {
        let mut settings = PollerSettings::default();
        settings.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(settings.validate().is_ok());

        settings.lookback_days = u32::MAX;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, PollerError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_snapshot_file_is_included_in_outputs() {
        let mut settings = PollerSettings::default();
        settings.output_dir = PathBuf::from("/repo");
        settings.snapshot_file = Some("CostSnapshot.json".into());
        assert_eq!(settings.output_files().len(), 3);
        assert_eq!(settings.output_files()[2], PathBuf::from("/repo/CostSnapshot.json"));
    }
}
