//! `price-history`: the latest price samples of a commodity with trend arrows

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::{Embed, Invocation, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{num_field, record_id, str_field, CachedList, ListSpec, Record, RowsRequest};

/// Disk freshness of a history query
pub const HISTORY_TTL: Duration = Duration::from_secs(21_600);

/// Samples shown, newest last
const SHOWN: usize = 10;

const DETAIL: &str = "ui.err_history_fetch";

pub struct PriceHistoryCommand {
    services: Arc<Services>,
    commodities: CachedList,
    terminals: CachedList,
}

impl PriceHistoryCommand {
    pub fn new(services: Arc<Services>) -> Self {
        let commodities = CachedList::seeded(ListSpec::COMMODITIES, &services.disk);
        let terminals = CachedList::seeded(ListSpec::TERMINALS, &services.disk);
        Self {
            services,
            commodities,
            terminals,
        }
    }

    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.commodities, &self.terminals]
    }

    pub async fn run(&self, inv: &Invocation, commodity: &str, terminal: Option<&str>) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);

        let commodity = match s.require(&self.commodities, commodity, &lang, DETAIL).await {
            Ok(commodity) => commodity,
            Err(reply) => return reply,
        };
        let terminal_id = match s.optional_id(&self.terminals, terminal, &lang, DETAIL).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let id = record_id(&commodity).unwrap_or_default();

        let mut request = RowsRequest::new(
            format!("history_{}_{}", id, terminal_id.unwrap_or(0)),
            "commodities_prices_history",
            HISTORY_TTL,
        )
        .param("id_commodity", id)
        .param("limit", 200);
        if let Some(terminal_id) = terminal_id {
            request = request.param("id_terminal", terminal_id);
        }

        let entries = match request.load(s.upstream.as_ref(), &s.disk).await {
            Ok(entries) if entries.is_empty() => return s.empty_failure(&lang, DETAIL),
            Ok(entries) => entries,
            Err(err) => return s.fetch_failure(&lang, DETAIL, &err),
        };

        let title = format!(
            "{}: {}",
            s.t("labels.commodity", &lang),
            str_field(&commodity, "name").unwrap_or("")
        );
        Reply::new(
            Embed::new(title, format_history(&entries)),
            s.default_ephemeral,
        )
    }

    pub async fn suggest_commodity(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.commodities, query, &lang, SuggestionLabel::Translated)
            .await
    }

    pub async fn suggest_terminal(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.terminals, query, &lang, SuggestionLabel::Raw)
            .await
    }
}

fn trend(current: Option<f64>, previous: Option<f64>) -> &'static str {
    match (current, previous) {
        (Some(c), Some(p)) if c > p => "↑",
        (Some(c), Some(p)) if c < p => "↓",
        (Some(_), Some(_)) => "=",
        _ => "",
    }
}

fn raw(entry: &Record, key: &str) -> String {
    match entry.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "-".to_string(),
    }
}

/// The last samples, one per line, each compared with the one before it.
fn format_history(entries: &[Record]) -> String {
    let start = entries.len().saturating_sub(SHOWN);
    let mut previous: Option<(Option<f64>, Option<f64>)> = None;
    let mut lines = Vec::with_capacity(SHOWN);

    for entry in &entries[start..] {
        let stamp = str_field(entry, "timestamp")
            .or_else(|| str_field(entry, "created_at"))
            .map(str::to_string)
            .or_else(|| entry.get("date_added").map(|v| v.to_string()))
            .unwrap_or_else(|| "?".to_string());
        let buy = num_field(entry, "price_buy");
        let sell = num_field(entry, "price_sell");
        let (buy_arrow, sell_arrow) = match previous {
            Some((prev_buy, prev_sell)) => (trend(buy, prev_buy), trend(sell, prev_sell)),
            None => ("", ""),
        };
        lines.push(format!(
            "{}: B {} {} | S {} {}",
            stamp,
            raw(entry, "price_buy"),
            buy_arrow,
            raw(entry, "price_sell"),
            sell_arrow
        ));
        previous = Some((buy, sell));
    }
    lines.join("\n")
}
