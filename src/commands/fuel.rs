//! `fuel`: fuel prices, optionally filtered by fuel type and terminal

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::{Embed, Invocation, Reply, Services, Suggestion};
use crate::data::{data_rows, num_field, str_field, Record, RowsRequest, UexError};
use crate::format::format_fuel_list;
use crate::resolve::suggest_names;

/// Disk freshness of the unfiltered fuel table
pub const FUEL_TTL: Duration = Duration::from_secs(600);

/// Rows shown in one reply
const SHOWN: usize = 50;

const DETAIL: &str = "ui.err_fuel_fetch";

pub struct FuelCommand {
    services: Arc<Services>,
}

impl FuelCommand {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    async fn load_all(&self) -> Result<Vec<Record>, UexError> {
        let s = &self.services;
        RowsRequest::new("fuel_prices_all", "fuel_prices_all", FUEL_TTL)
            .load(s.upstream.as_ref(), &s.disk)
            .await
    }

    async fn load_filtered(
        &self,
        commodity: Option<&str>,
        terminal: Option<&str>,
    ) -> Result<Vec<Record>, UexError> {
        let mut params = Vec::new();
        if let Some(commodity) = commodity {
            params.push(("commodity_name", commodity.to_string()));
        }
        if let Some(terminal) = terminal {
            params.push(("terminal_name", terminal.to_string()));
        }
        if params.is_empty() {
            return self.load_all().await;
        }
        let payload = self.services.upstream.get("fuel_prices", &params).await?;
        Ok(data_rows(payload))
    }

    /// Cheapest fuel first; names are passed to the upstream as typed.
    pub async fn run(
        &self,
        inv: &Invocation,
        commodity: Option<&str>,
        terminal: Option<&str>,
    ) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);
        let commodity = commodity.map(str::trim).filter(|c| !c.is_empty());
        let terminal = terminal.map(str::trim).filter(|t| !t.is_empty());

        let mut rows = match self.load_filtered(commodity, terminal).await {
            Ok(rows) if rows.is_empty() => return s.no_matches(&lang),
            Ok(rows) => rows,
            Err(err) => return s.fetch_failure(&lang, DETAIL, &err),
        };
        sort_by_buy_asc(&mut rows);
        rows.truncate(SHOWN);

        Reply::new(
            Embed::new(s.t("ui.cmd_fuel_desc", &lang), format_fuel_list(&rows)),
            s.default_ephemeral,
        )
    }

    async fn names(&self, field: &str, query: &str) -> Vec<Suggestion> {
        let rows = match self.load_all().await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "fuel autocomplete source unavailable");
                return Vec::new();
            }
        };
        let names: Vec<String> = rows
            .iter()
            .filter_map(|r| str_field(r, field).map(str::to_string))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        suggest_names(query, &names)
            .into_iter()
            .map(|name| Suggestion {
                label: name.to_string(),
                value: name.to_string(),
            })
            .collect()
    }

    /// Distinct fuel names, sorted
    pub async fn suggest_commodity(&self, query: &str) -> Vec<Suggestion> {
        self.names("commodity_name", query).await
    }

    /// Distinct terminal names, sorted
    pub async fn suggest_terminal(&self, query: &str) -> Vec<Suggestion> {
        self.names("terminal_name", query).await
    }
}

/// Ascending buy price; rows without one go last in their original order.
fn sort_by_buy_asc(rows: &mut [Record]) {
    rows.sort_by(|a, b| match (num_field(a, "price_buy"), num_field(b, "price_buy")) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
