//! `category`: details of one item category

use std::sync::Arc;

use tracing::info;

use super::{Embed, Invocation, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{record_id, str_field, CachedList, ListSpec};
use crate::format::format_category;

pub struct CategoryCommand {
    services: Arc<Services>,
    categories: CachedList,
}

impl CategoryCommand {
    pub fn new(services: Arc<Services>) -> Self {
        // category details always go through the short memory window
        let categories = CachedList::new(ListSpec::CATEGORIES);
        Self {
            services,
            categories,
        }
    }

    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.categories]
    }

    /// Show a category picked by id or name.
    pub async fn run(&self, inv: &Invocation, query: &str) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);
        info!(query, "category");

        let category = match s.resolve_in(&self.categories, query).await {
            Ok(Some(category)) => category,
            Ok(None) => {
                let mut reply = s.not_found(&lang, "ui.err_category_not_found");
                reply.ephemeral = true;
                return reply;
            }
            Err(err) => {
                let mut reply = s.fetch_failure(&lang, "ui.err_category_fetch", &err);
                reply.ephemeral = true;
                return reply;
            }
        };

        let name = s.i18n.tc(str_field(&category, "name").unwrap_or(""), &lang);
        let id = record_id(&category).unwrap_or_default();
        let title = s
            .i18n
            .t_with("ui.category_title", &lang, &[("name", &name), ("id", &id)]);
        let description = format_category(&category, &s.i18n, &lang);
        Reply::new(Embed::new(title, description), true)
    }

    pub async fn suggest(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.categories, query, &lang, SuggestionLabel::Translated)
            .await
    }
}
