//! `items-by-category`: every item in one category, paged locally

use std::sync::Arc;
use std::time::Duration;

use super::{Invocation, PagedView, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{record_id, str_field, CachedList, ListSpec, RowsRequest};
use crate::format::format_items_list;

/// Disk freshness of one category's items
pub const ITEMS_TTL: Duration = Duration::from_secs(600);

pub struct ItemsByCategoryCommand {
    services: Arc<Services>,
    categories: CachedList,
}

impl ItemsByCategoryCommand {
    pub fn new(services: Arc<Services>) -> Self {
        let categories = CachedList::seeded(ListSpec::CATEGORIES, &services.disk);
        Self {
            services,
            categories,
        }
    }

    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.categories]
    }

    /// Resolve the category and page through its items.
    pub async fn run(&self, inv: &Invocation, query: &str) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);

        let category = match s.resolve_in(&self.categories, query).await {
            Ok(Some(category)) => category,
            Ok(None) => return s.not_found(&lang, "ui.err_category_not_found"),
            Err(err) => return s.fetch_failure(&lang, "ui.err_category_fetch", &err),
        };
        let id = record_id(&category).unwrap_or_default();

        let request = RowsRequest::new(format!("items_{}", id), "items", ITEMS_TTL)
            .param("id_category", id)
            .param("limit", 5000);
        let items = match request.load(s.upstream.as_ref(), &s.disk).await {
            Ok(items) if items.is_empty() => {
                return s.empty_failure(&lang, "ui.err_items_fetch");
            }
            Ok(items) => items,
            Err(err) => return s.fetch_failure(&lang, "ui.err_items_fetch", &err),
        };

        let name = s.i18n.tc(str_field(&category, "name").unwrap_or(""), &lang);
        let title = s
            .i18n
            .t_with("ui.items_title", &lang, &[("name", &name), ("id", &id)]);
        let view = PagedView::new(
            items,
            inv.user_id,
            Arc::clone(&s.i18n),
            &lang,
            title,
            format_items_list,
        );
        Reply::paged(view, true)
    }

    pub async fn suggest(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.categories, query, &lang, SuggestionLabel::Translated)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::pager::Direction;
    use crate::commands::ViewUpdate;
    use serde_json::{json, Value};

    fn items(total: usize) -> Value {
        Value::Array(
            (0..total)
                .map(|i| json!({"id": 100 + i, "name": format!("Item {}", i)}))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_items_are_paged() {
        let h = harness(
            FakeUpstream::default()
                .with("categories", json!([{"id": 5, "name": "Helmets"}]))
                .with("items", items(30)),
        );
        let cmd = ItemsByCategoryCommand::new(h.services.clone());
        let mut reply = cmd.run(&USER, "helm").await;

        assert_eq!(reply.embed.title, "Items: Helmets (ID: 5)");
        assert_eq!(reply.embed.footer.as_deref(), Some("Page 1"));
        assert_eq!(reply.embed.description.lines().count(), 25);

        let view = reply.view.as_mut().unwrap();
        match view.press(USER.user_id, Direction::Next) {
            ViewUpdate::Edit(embed) => assert!(embed.description.starts_with("• **Item 5**")),
            other => panic!("unexpected {:?}", other),
        }

        let params = h.upstream.requests_for("items");
        assert_eq!(
            params[0],
            vec![
                ("id_category".to_string(), "5".to_string()),
                ("limit".to_string(), "5000".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_category_reports_no_data() {
        let h = harness(
            FakeUpstream::default()
                .with("categories", json!([{"id": 5, "name": "Helmets"}]))
                .with("items", json!([])),
        );
        let cmd = ItemsByCategoryCommand::new(h.services.clone());
        let reply = cmd.run(&USER, "5").await;
        assert!(reply.view.is_none());
        assert_eq!(reply.embed.description, "Could not load items: empty");
    }

    #[tokio::test]
    async fn test_items_served_from_disk_on_repeat() {
        let h = harness(
            FakeUpstream::default()
                .with("categories", json!([{"id": 5, "name": "Helmets"}]))
                .with("items", items(3)),
        );
        let cmd = ItemsByCategoryCommand::new(h.services.clone());
        cmd.run(&USER, "5").await;
        cmd.run(&USER, "5").await;
        assert_eq!(h.upstream.requests_for("items").len(), 1);
        assert_eq!(h.upstream.requests_for("categories").len(), 1);
    }
}
