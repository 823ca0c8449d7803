//! `alerts`: upstream price and availability alerts

use std::sync::Arc;
use std::time::Duration;

use super::{Embed, Invocation, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{CachedList, ListSpec, RowsRequest};
use crate::format::format_alerts_list;

/// Disk freshness of an alerts query
pub const ALERTS_TTL: Duration = Duration::from_secs(1_800);

const DETAIL: &str = "ui.err_alerts_fetch";

pub struct AlertsCommand {
    services: Arc<Services>,
    commodities: CachedList,
}

impl AlertsCommand {
    pub fn new(services: Arc<Services>) -> Self {
        let commodities = CachedList::seeded(ListSpec::COMMODITIES, &services.disk);
        Self {
            services,
            commodities,
        }
    }

    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.commodities]
    }

    pub async fn run(&self, inv: &Invocation, commodity: Option<&str>) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);

        let commodity_id = match s.optional_id(&self.commodities, commodity, &lang, DETAIL).await {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let mut request = RowsRequest::new(
            format!("alerts_{}", commodity_id.unwrap_or(0)),
            "commodities_alerts",
            ALERTS_TTL,
        );
        if let Some(id) = commodity_id {
            request = request.param("id_commodity", id);
        }

        let entries = match request.load(s.upstream.as_ref(), &s.disk).await {
            Ok(entries) if entries.is_empty() => return s.no_matches(&lang),
            Ok(entries) => entries,
            Err(err) => return s.fetch_failure(&lang, DETAIL, &err),
        };
        Reply::new(
            Embed::new(s.t("ui.cmd_alerts_desc", &lang), format_alerts_list(&entries)),
            s.default_ephemeral,
        )
    }

    pub async fn suggest_commodity(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.commodities, query, &lang, SuggestionLabel::Translated)
            .await
    }
}
