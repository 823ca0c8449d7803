//! Command handlers
//!
//! Each handler owns its reference-list caches and turns one invocation into
//! a `Reply`. Handlers never return errors: upstream failures, empty results
//! and unresolved queries all become a localized title/detail pair.

pub mod about;
pub mod alerts;
pub mod category;
pub mod fuel;
pub mod history;
pub mod items;
pub mod lang;
pub mod price;
pub mod route;
pub mod trade;

pub use about::AboutCommand;
pub use alerts::AlertsCommand;
pub use category::CategoryCommand;
pub use fuel::FuelCommand;
pub use history::PriceHistoryCommand;
pub use items::ItemsByCategoryCommand;
pub use lang::LangCommand;
pub use price::PriceCommand;
pub use route::RouteCommand;
pub use trade::TradeCommand;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::cache::CacheManager;
use crate::data::{record_id, CachedList, Record, Upstream, UexError};
use crate::i18n::Translator;
use crate::pager::{Direction, Navigation, PageInfo, Pager, UserId, DEFAULT_PAGE_SIZE};
use crate::prefs::LangPrefs;
use crate::resolve::{self, Entity};

/// Everything a handler needs from the outside world
pub struct Services {
    pub upstream: Arc<dyn Upstream>,
    pub disk: CacheManager,
    pub i18n: Arc<Translator>,
    pub prefs: Arc<LangPrefs>,
    /// Whether replies are private unless a command decides otherwise
    pub default_ephemeral: bool,
    pub started_at: Instant,
}

impl Services {
    /// Language for this invocation's guild
    pub fn lang(&self, inv: &Invocation) -> String {
        self.prefs.get(inv.guild_id)
    }

    pub fn t(&self, key: &str, lang: &str) -> String {
        self.i18n.t(key, lang)
    }

    /// "No data" reply carrying `detail_key` with `{msg}` filled in
    pub fn failure(&self, lang: &str, detail_key: &str, msg: &dyn Display) -> Reply {
        Reply::new(
            Embed::new(
                self.t("ui.err_no_data", lang),
                self.i18n.t_with(detail_key, lang, &[("msg", msg)]),
            ),
            self.default_ephemeral,
        )
    }

    /// "No data" reply for an upstream error
    pub fn fetch_failure(&self, lang: &str, detail_key: &str, err: &UexError) -> Reply {
        warn!(error = %err, detail_key, "upstream fetch failed");
        self.failure(lang, detail_key, err)
    }

    /// "No data" reply for an empty upstream result
    pub fn empty_failure(&self, lang: &str, detail_key: &str) -> Reply {
        self.failure(lang, detail_key, &self.t("ui.err_empty", lang))
    }

    /// "No data / no matches" reply
    pub fn no_matches(&self, lang: &str) -> Reply {
        self.not_found(lang, "ui.err_no_matches")
    }

    pub fn not_found(&self, lang: &str, detail_key: &str) -> Reply {
        Reply::new(
            Embed::new(self.t("ui.err_no_data", lang), self.t(detail_key, lang)),
            self.default_ephemeral,
        )
    }

    /// Resolve `query` against a cached list
    pub async fn resolve_in(
        &self,
        list: &CachedList,
        query: &str,
    ) -> Result<Option<Record>, UexError> {
        let rows = list.get(self.upstream.as_ref(), &self.disk).await?;
        Ok(resolve::resolve(query, &rows).cloned())
    }

    /// Resolve a required argument, or the reply explaining why not.
    pub async fn require(
        &self,
        list: &CachedList,
        query: &str,
        lang: &str,
        detail_key: &str,
    ) -> Result<Record, Reply> {
        match self.resolve_in(list, query).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(self.no_matches(lang)),
            Err(err) => Err(self.fetch_failure(lang, detail_key, &err)),
        }
    }

    /// Resolve an optional argument to an entity id.
    pub async fn optional_id(
        &self,
        list: &CachedList,
        query: Option<&str>,
        lang: &str,
        detail_key: &str,
    ) -> Result<Option<i64>, Reply> {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(None);
        };
        let record = self.require(list, query, lang, detail_key).await?;
        Ok(record_id(&record))
    }

    /// Autocomplete choices from a cached list; any failure yields none.
    ///
    /// Labels go through the locale's name map; values are entity ids.
    pub async fn suggest_in(
        &self,
        list: &CachedList,
        query: &str,
        lang: &str,
        label: SuggestionLabel,
    ) -> Vec<Suggestion> {
        let rows = match list.get(self.upstream.as_ref(), &self.disk).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(list = list.spec().name, error = %err, "autocomplete source unavailable");
                return Vec::new();
            }
        };
        resolve::suggest(query, &rows)
            .into_iter()
            .map(|row| {
                let id = record_id(row).map_or_else(String::new, |id| id.to_string());
                let name = match label {
                    SuggestionLabel::Translated => self.i18n.tc(row.entity_name(), lang),
                    SuggestionLabel::Raw => row.entity_name().to_string(),
                };
                let label = match label {
                    SuggestionLabel::Translated if list.spec().name == "categories" => {
                        format!("{} (ID: {})", name, id)
                    }
                    _ => name,
                };
                Suggestion { label, value: id }
            })
            .collect()
    }
}

/// How autocomplete labels are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionLabel {
    /// Through the locale's name map
    Translated,
    /// The upstream name as is
    Raw,
}

/// Who ran a command and where
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invocation {
    pub user_id: UserId,
    pub guild_id: Option<u64>,
}

/// One autocomplete choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
}

/// Title, body and optional footer of a reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// What a command sends back
#[derive(Debug)]
pub struct Reply {
    pub embed: Embed,
    /// Visible only to the invoker
    pub ephemeral: bool,
    /// Present when the result spans several pages
    pub view: Option<PagedView>,
}

impl Reply {
    pub fn new(embed: Embed, ephemeral: bool) -> Self {
        Self {
            embed,
            ephemeral,
            view: None,
        }
    }

    /// Plain text reply without a title
    pub fn text(content: impl Into<String>, ephemeral: bool) -> Self {
        Self::new(Embed::new(String::new(), content), ephemeral)
    }

    /// Reply showing the first page of `view`
    pub fn paged(view: PagedView, ephemeral: bool) -> Self {
        Self {
            embed: view.embed(),
            ephemeral,
            view: Some(view),
        }
    }
}

/// Result of pressing a navigation button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Replace the message with this page
    Edit(Embed),
    /// Private notice to the presser; the view is unchanged
    Notice(String),
    /// The view timed out and no longer responds
    Closed,
}

/// Paged listing with localized navigation notices
pub struct PagedView {
    pager: Pager<Record, Embed>,
    i18n: Arc<Translator>,
    lang: String,
}

impl std::fmt::Debug for PagedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedView")
            .field("pager", &self.pager)
            .field("lang", &self.lang)
            .finish()
    }
}

impl PagedView {
    /// A view titled `title` whose pages are rendered by `body`
    /// with a localized "Page N" footer.
    pub fn new<F>(
        entries: Vec<Record>,
        author: UserId,
        i18n: Arc<Translator>,
        lang: &str,
        title: String,
        body: F,
    ) -> Self
    where
        F: Fn(&[Record]) -> String + Send + Sync + 'static,
    {
        let footer_i18n = Arc::clone(&i18n);
        let footer_lang = lang.to_string();
        let pager = Pager::new(entries, DEFAULT_PAGE_SIZE, author, move |page, info: PageInfo| {
            Embed::new(title.clone(), body(page)).with_footer(footer_i18n.t_with(
                "ui.page_n",
                &footer_lang,
                &[("n", &info.number)],
            ))
        });
        Self {
            pager,
            i18n,
            lang: lang.to_string(),
        }
    }

    pub fn pager(&self) -> &Pager<Record, Embed> {
        &self.pager
    }

    pub fn embed(&self) -> Embed {
        self.pager.render()
    }

    pub fn has_previous(&self) -> bool {
        self.pager.has_previous()
    }

    pub fn has_next(&self) -> bool {
        self.pager.has_next()
    }

    pub fn is_expired(&mut self) -> bool {
        self.pager.is_expired()
    }

    /// Localized button label
    pub fn label(&self, key: &str) -> String {
        self.i18n.t(key, &self.lang)
    }

    /// Apply a button press from `user`.
    pub fn press(&mut self, user: UserId, direction: Direction) -> ViewUpdate {
        match self.pager.navigate(user, direction) {
            Navigation::Moved | Navigation::Unchanged => ViewUpdate::Edit(self.embed()),
            Navigation::NotAuthor => {
                ViewUpdate::Notice(self.i18n.t("ui.nav_not_author", &self.lang))
            }
            Navigation::Expired => ViewUpdate::Closed,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for handler tests

    use super::*;
    use crate::data::Params;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Upstream answering from a resource → payload table
    #[derive(Default)]
    pub struct FakeUpstream {
        pub payloads: HashMap<String, Value>,
        pub calls: AtomicUsize,
        pub requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeUpstream {
        pub fn with(mut self, resource: &str, rows: Value) -> Self {
            self.payloads
                .insert(resource.to_string(), json!({"status": "ok", "data": rows}));
            self
        }

        pub fn with_payload(mut self, resource: &str, payload: Value) -> Self {
            self.payloads.insert(resource.to_string(), payload);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests_for(&self, resource: &str) -> Vec<Vec<(String, String)>> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(r, _)| r == resource)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Upstream for FakeUpstream {
        async fn get(&self, resource: &str, params: &Params) -> Result<Value, UexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((
                resource.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
            self.payloads
                .get(resource)
                .cloned()
                .ok_or_else(|| UexError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                    resource: resource.to_string(),
                })
        }
    }

    pub struct Harness {
        pub services: Arc<Services>,
        pub upstream: Arc<FakeUpstream>,
        pub dir: TempDir,
    }

    /// Services over `upstream` with English as the default language
    pub fn harness(upstream: FakeUpstream) -> Harness {
        let dir = TempDir::new().unwrap();
        let upstream = Arc::new(upstream);
        let services = Arc::new(Services {
            upstream: upstream.clone(),
            disk: CacheManager::new(dir.path().join("cache")).unwrap(),
            i18n: Arc::new(Translator::builtin("en")),
            prefs: Arc::new(LangPrefs::load(dir.path().join("lang_prefs.json"), "en").unwrap()),
            default_ephemeral: true,
            started_at: Instant::now(),
        });
        Harness {
            services,
            upstream,
            dir,
        }
    }

    pub const USER: Invocation = Invocation {
        user_id: 42,
        guild_id: Some(7),
    };
}
