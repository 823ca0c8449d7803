//! `route`: trade routes for a commodity between terminals

use std::sync::Arc;
use std::time::Duration;

use super::{Embed, Invocation, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{record_id, str_field, CachedList, ListSpec, RowsRequest};
use crate::format::format_route_summary;

/// Disk freshness of a route query
pub const ROUTES_TTL: Duration = Duration::from_secs(600);

/// Routes shown when no destination narrows the search
const OPEN_ROUTES_SHOWN: usize = 3;

const DETAIL: &str = "ui.err_route_fetch";

/// Filters of a route query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFilter<'a> {
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub scu: Option<u32>,
}

pub struct RouteCommand {
    services: Arc<Services>,
    commodities: CachedList,
    terminals: CachedList,
}

impl RouteCommand {
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

    pub async fn run(&self, inv: &Invocation, commodity: &str, filter: RouteFilter<'_>) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);

        let commodity = match s.require(&self.commodities, commodity, &lang, DETAIL).await {
            Ok(commodity) => commodity,
            Err(reply) => return reply,
        };
        let from = match s.optional_id(&self.terminals, filter.from, &lang, DETAIL).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let to = match s.optional_id(&self.terminals, filter.to, &lang, DETAIL).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let scu = filter.scu.filter(|scu| *scu > 0);
        let id = record_id(&commodity).unwrap_or_default();

        let mut request = RowsRequest::new(
            format!(
                "routes_{}_{}_{}_{}",
                id,
                from.unwrap_or(0),
                to.unwrap_or(0),
                scu.unwrap_or(0)
            ),
            "commodities_routes",
            ROUTES_TTL,
        )
        .param("id_commodity", id);
        if let Some(from) = from {
            request = request.param("from_terminal", from);
        }
        if let Some(to) = to {
            request = request.param("to_terminal", to);
        }
        if let Some(scu) = scu {
            request = request.param("scu", scu);
        }

        let mut routes = match request.load(s.upstream.as_ref(), &s.disk).await {
            Ok(routes) if routes.is_empty() => return s.empty_failure(&lang, DETAIL),
            Ok(routes) => routes,
            Err(err) => return s.fetch_failure(&lang, DETAIL, &err),
        };
        if to.is_none() {
            routes.truncate(OPEN_ROUTES_SHOWN);
        }

        let description = routes
            .iter()
            .map(|route| format_route_summary(route, &s.i18n, &lang))
            .collect::<Vec<_>>()
            .join("\n");
        let title = format!(
            "{}: {}",
            s.t("labels.commodity", &lang),
            str_field(&commodity, "name").unwrap_or("")
        );
        Reply::new(Embed::new(title, description), s.default_ephemeral)
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

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use serde_json::{json, Value};

    fn upstream() -> FakeUpstream {
        let routes: Vec<Value> = (0..5)
            .map(|i| {
                json!({
                    "origin_terminal_name": format!("O{}", i),
                    "destination_terminal_name": format!("D{}", i),
                    "profit": 100 * i
                })
            })
            .collect();
        FakeUpstream::default()
            .with("commodities", json!([{"id": 4, "name": "Laranite"}]))
            .with(
                "terminals",
                json!([{"id": 20, "name": "ARC-L1"}, {"id": 21, "name": "CRU-L5"}]),
            )
            .with("commodities_routes", Value::Array(routes))
    }

    #[tokio::test]
    async fn test_open_routes_truncated() {
        let h = harness(upstream());
        let cmd = RouteCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "lara", RouteFilter::default()).await;
        assert_eq!(reply.embed.title, "Commodity: Laranite");
        assert_eq!(reply.embed.description.lines().count(), 3);
        assert!(h.services.disk.slot_path("routes_4_0_0_0").exists());
    }

    #[tokio::test]
    async fn test_destination_shows_all_and_keys_cache() {
        let h = harness(upstream());
        let cmd = RouteCommand::new(h.services.clone());
        let filter = RouteFilter {
            from: Some("arc"),
            to: Some("21"),
            scu: Some(96),
        };
        let reply = cmd.run(&USER, "4", filter).await;
        assert_eq!(reply.embed.description.lines().count(), 5);
        assert_eq!(
            h.upstream.requests_for("commodities_routes")[0],
            vec![
                ("id_commodity".to_string(), "4".to_string()),
                ("from_terminal".to_string(), "20".to_string()),
                ("to_terminal".to_string(), "21".to_string()),
                ("scu".to_string(), "96".to_string()),
            ]
        );
        assert!(h.services.disk.slot_path("routes_4_20_21_96").exists());
    }

    #[tokio::test]
    async fn test_unknown_terminal_is_no_match() {
        let h = harness(upstream());
        let cmd = RouteCommand::new(h.services.clone());
        let filter = RouteFilter {
            from: Some("hurston"),
            ..RouteFilter::default()
        };
        let reply = cmd.run(&USER, "lara", filter).await;
        assert_eq!(reply.embed.description, "No matches found.");
        assert!(h.upstream.requests_for("commodities_routes").is_empty());
    }
}
