//! `price`: current buy/sell prices of a commodity across terminals

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::{Invocation, PagedView, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{num_field, record_id, str_field, CachedList, ListSpec, Record, RowsRequest};
use crate::format::format_price_list;

/// Disk freshness of one commodity's prices
pub const PRICES_TTL: Duration = Duration::from_secs(600);

const DETAIL: &str = "ui.err_price_fetch";

pub struct PriceCommand {
    services: Arc<Services>,
    commodities: CachedList,
    terminals: CachedList,
}

impl PriceCommand {
    pub fn new(services: Arc<Services>) -> Self {
        let commodities = CachedList::seeded(ListSpec::COMMODITIES, &services.disk);
        let terminals = CachedList::seeded(ListSpec::TERMINALS, &services.disk);
        Self {
            services,
            commodities,
            terminals,
        }
    }

    /// Reference lists this handler keeps in memory
    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.commodities, &self.terminals]
    }

    /// Prices for a commodity, optionally at one terminal, best sell first.
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

        let request = RowsRequest::new(format!("prices_{}", id), "commodities_prices", PRICES_TTL)
            .param("id_commodity", id)
            .param("limit", 5000);
        let mut entries = match request.load(s.upstream.as_ref(), &s.disk).await {
            Ok(entries) => entries,
            Err(err) => return s.fetch_failure(&lang, DETAIL, &err),
        };
        if let Some(terminal_id) = terminal_id {
            entries.retain(|e| at_terminal(e, terminal_id));
        }
        if entries.is_empty() {
            return s.empty_failure(&lang, DETAIL);
        }
        sort_by_sell_desc(&mut entries);

        let title = format!(
            "{}: {}",
            s.t("labels.commodity", &lang),
            str_field(&commodity, "name").unwrap_or("")
        );
        let i18n = Arc::clone(&s.i18n);
        let page_lang = lang.clone();
        let view = PagedView::new(
            entries,
            inv.user_id,
            Arc::clone(&s.i18n),
            &lang,
            title,
            move |page| format_price_list(page, &i18n, &page_lang),
        );
        Reply::paged(view, true)
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

pub(crate) fn at_terminal(entry: &Record, terminal_id: i64) -> bool {
    num_field(entry, "id_terminal").is_some_and(|id| id == terminal_id as f64)
}

/// Highest sell price first; rows without one count as zero.
fn sort_by_sell_desc(entries: &mut [Record]) {
    entries.sort_by(|a, b| {
        let a = num_field(a, "price_sell").unwrap_or(0.0);
        let b = num_field(b, "price_sell").unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use serde_json::json;

    fn upstream() -> FakeUpstream {
        FakeUpstream::default()
            .with(
                "commodities",
                json!([{"id": 1, "name": "Gold"}, {"id": 2, "name": "Golden Ore"}]),
            )
            .with(
                "terminals",
                json!([{"id": 10, "name": "TDD Area18"}, {"id": 11, "name": "Lorville CBD"}]),
            )
            .with(
                "commodities_prices",
                json!([
                    {"id_terminal": 10, "terminal_name": "TDD", "price_buy": 5, "price_sell": 7},
                    {"id_terminal": 11, "terminal_name": "CBD", "price_sell": 9},
                    {"id_terminal": 12, "terminal_name": "Port", "price_buy": 4}
                ]),
            )
    }

    #[tokio::test]
    async fn test_prices_sorted_by_sell_desc() {
        let h = harness(upstream());
        let cmd = PriceCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "gold", None).await;

        assert_eq!(reply.embed.title, "Commodity: Gold");
        let lines: Vec<&str> = reply.embed.description.lines().collect();
        assert!(lines[0].starts_with("• CBD"));
        assert!(lines[1].starts_with("• TDD"));
        assert!(lines[2].starts_with("• Port"));
        assert_eq!(reply.embed.footer.as_deref(), Some("Page 1"));
        assert_eq!(
            h.upstream.requests_for("commodities_prices")[0][0],
            ("id_commodity".to_string(), "1".to_string())
        );
    }

    #[tokio::test]
    async fn test_terminal_filter() {
        let h = harness(upstream());
        let cmd = PriceCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "gold", Some("lorville")).await;
        assert_eq!(reply.embed.description.lines().count(), 1);
        assert!(reply.embed.description.starts_with("• CBD"));
    }

    #[tokio::test]
    async fn test_unknown_commodity() {
        let h = harness(upstream());
        let cmd = PriceCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "quantanium", None).await;
        assert_eq!(reply.embed.description, "No matches found.");
        assert!(reply.view.is_none());
    }

    #[tokio::test]
    async fn test_terminal_without_prices_is_empty() {
        let h = harness(upstream().with("terminals", json!([{"id": 99, "name": "Empty Dock"}])));
        let cmd = PriceCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "gold", Some("99")).await;
        assert_eq!(reply.embed.description, "Could not load prices: empty");
    }

    #[tokio::test]
    async fn test_terminal_suggestions_use_raw_names() {
        let h = harness(upstream());
        let cmd = PriceCommand::new(h.services.clone());
        let suggestions = cmd.suggest_terminal(&USER, "area").await;
        assert_eq!(
            suggestions,
            vec![Suggestion {
                label: "TDD Area18".to_string(),
                value: "10".to_string()
            }]
        );
    }
}
