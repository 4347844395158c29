//! The fetch run: credential, costs query, badge files.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

use crate::admin_key::AdminKey;
use crate::badge::{cost_badge, entry_badge};
use crate::error::PollerError;
use crate::output::{render_json, write_outputs, RenderedFile};
use crate::settings::PollerSettings;
use crate::usage::{CostSummary, CostWindow, CostsClient};

/// Outcome of a successful fetch run.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub summary: CostSummary,
    pub written: Vec<PathBuf>,
}

/// Run the poller against the current time.
pub async fn run(settings: &PollerSettings) -> Result<PollReport, PollerError> {
    run_at(settings, Utc::now()).await
}

/// Run the poller with the query window ending at `now`.
///
/// The credential is resolved before any network traffic, and no file is touched
/// unless every page of the costs query was fetched and parsed.
pub async fn run_at(
    settings: &PollerSettings,
    now: DateTime<Utc>,
) -> Result<PollReport, PollerError> {
    settings.validate()?;
    let admin_key = AdminKey::from_env(&settings.api_key_env)?;
    log::info!("Using admin key {}", admin_key.masked());

    let client = CostsClient::new(
        &settings.base_url,
        admin_key,
        settings.request_timeout_secs.map(Duration::from_secs),
    )?;

    let window = CostWindow::ending_at(now, settings.lookback_days);
    let summary = client.fetch_all(&window).await?;

    let files = render_files(settings, &summary)?;
    write_outputs(&files)?;

    log::info!(
        "Summary for last {} days: total ${:.6} USD, {} entries",
        summary.lookback_days,
        summary.total_cost,
        summary.entry_count
    );

    Ok(PollReport {
        written: files.into_iter().map(|f| f.path).collect(),
        summary,
    })
}

/// Render every output file for `summary` without touching the filesystem.
pub fn render_files(
    settings: &PollerSettings,
    summary: &CostSummary,
) -> Result<Vec<RenderedFile>, PollerError> {
    let mut files = vec![
        RenderedFile {
            path: settings.output_dir.join(&settings.cost_badge_file),
            contents: render_json(&cost_badge(summary, &settings.cost_badge_color))?,
        },
        RenderedFile {
            path: settings.output_dir.join(&settings.entry_badge_file),
            contents: render_json(&entry_badge(summary, &settings.entry_badge_color))?,
        },
    ];

    if let Some(snapshot) = &settings.snapshot_file {
        files.push(RenderedFile {
            path: settings.output_dir.join(snapshot),
            contents: render_json(summary)?,
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_files_follows_settings_order() {
        let mut settings = PollerSettings::default();
        settings.output_dir = PathBuf::from("/repo");
        settings.snapshot_file = Some("CostSnapshot.json".into());

        let files = render_files(&settings, &CostSummary::new(30)).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, settings.output_files());
    }

    #[test]
    fn test_render_files_is_deterministic() {
        let settings = PollerSettings::default();
        let summary = CostSummary {
            lookback_days: 30,
            total_cost: 4.2,
            entry_count: 0,
            entries: Vec::new(),
        };
        let a = render_files(&settings, &summary).unwrap();
        let b = render_files(&settings, &summary).unwrap();
        assert_eq!(a[0].contents, b[0].contents);
        assert_eq!(a[1].contents, b[1].contents);
    }

    #[tokio::test]
    async fn test_oversized_lookback_is_config_error() {
        let mut settings = PollerSettings::default();
        settings.api_key_env = "OPENAI_QUOTA_TEST_POLLER_LOOKBACK_8c41".into();
        std::env::set_var(&settings.api_key_env, "sk-admin-lookback-test");
        settings.base_url = "http://127.0.0.1:9".into();
        settings.lookback_days = u32::MAX;
        let dir = tempfile::tempdir().unwrap();
        settings.output_dir = dir.path().to_path_buf();

        let err = run(&settings).await.unwrap_err();
        assert!(matches!(err, PollerError::Config(_)), "got: {:?}", err);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let mut settings = PollerSettings::default();
        settings.api_key_env = "OPENAI_QUOTA_TEST_POLLER_UNSET_3b9d".into();
        // Unroutable base URL: reaching the network would produce a Network error instead.
        settings.base_url = "http://127.0.0.1:9".into();
        let dir = tempfile::tempdir().unwrap();
        settings.output_dir = dir.path().to_path_buf();

        let err = run(&settings).await.unwrap_err();
        assert!(matches!(err, PollerError::MissingApiKey(_)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
