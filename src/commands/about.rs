//! `about`: game version, cache age, uptime and bot version

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use super::{Embed, Invocation, Reply, Services};
use crate::data::{data_rows, str_field, Record, UexError};

/// Disk freshness of the game version list
pub const VERSIONS_TTL: Duration = Duration::from_secs(86_400);

const SLOT: &str = "game_versions";

pub struct AboutCommand {
    services: Arc<Services>,
}

impl AboutCommand {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Game versions from disk, else from upstream when it reports `ok`.
    async fn versions(&self) -> Result<Vec<Record>, UexError> {
        let s = &self.services;
        if let Some(rows) = s
            .disk
            .load::<Vec<Record>>(SLOT, VERSIONS_TTL)
            .filter(|rows| !rows.is_empty())
        {
            return Ok(rows);
        }
        let payload = s.upstream.get(SLOT, &[]).await?;
        if payload.get("status").and_then(|v| v.as_str()) != Some("ok") {
            return Ok(Vec::new());
        }
        let rows = data_rows(payload);
        if let Err(err) = s.disk.save(SLOT, &rows) {
            tracing::warn!(error = %err, "failed to write game versions to disk");
        }
        Ok(rows)
    }

    pub async fn run(&self, inv: &Invocation) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);

        let versions = match self.versions().await {
            Ok(versions) => versions,
            Err(err) => return s.fetch_failure(&lang, "ui.err_about_fetch", &err),
        };
        let version = versions
            .first()
            .and_then(|v| str_field(v, "version"))
            .unwrap_or("?");
        let updated: DateTime<Local> = s
            .disk
            .last_written(SLOT)
            .unwrap_or_else(SystemTime::now)
            .into();

        let description = [
            format!("{}: {}", s.t("labels.game_version", &lang), version),
            format!(
                "{}: {}",
                s.t("labels.updated", &lang),
                updated.format("%Y-%m-%d %H:%M:%S")
            ),
            format!(
                "{}: {}",
                s.t("labels.uptime", &lang),
                format_uptime(s.started_at.elapsed())
            ),
            format!(
                "{}: {}",
                s.t("labels.bot_version", &lang),
                env!("CARGO_PKG_VERSION")
            ),
        ]
        .join("\n");

        Reply::new(
            Embed::new(s.t("ui.cmd_about_desc", &lang), description),
            s.default_ephemeral,
        )
    }
}

/// `H:MM:SS`, prefixed with whole days when there are any
fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (days, rest) = (secs / 86_400, secs % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
