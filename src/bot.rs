//! Wiring of services and command handlers
//!
//! `Bot` is what a chat gateway would hold: it builds every handler once from
//! a `Config` and routes each parsed command to the right one.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::cli::{Command, CompleteField, Config, LangCli};
use crate::commands::lang::LangAction;
use crate::commands::route::RouteFilter;
use crate::commands::trade::TradeOptions;
use crate::commands::{
    AboutCommand, AlertsCommand, CategoryCommand, FuelCommand, Invocation,
    ItemsByCategoryCommand, LangCommand, PriceCommand, PriceHistoryCommand, Reply, RouteCommand,
    Services, Suggestion, TradeCommand,
};
use crate::data::{CachedList, ListSpec, UexClient, UexError, Upstream};
use crate::i18n::Translator;
use crate::prefs::LangPrefs;

/// Errors that prevent the bot from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build UEX client: {0}")]
    Client(#[from] UexError),
}

/// What running a command produced
#[derive(Debug)]
pub enum Outcome {
    Reply(Reply),
    Suggestions(Vec<Suggestion>),
    /// Rows fetched per reference list
    Warmed(Vec<(&'static str, Result<usize, UexError>)>),
}

/// Every command handler over one set of services
pub struct Bot {
    services: Arc<Services>,
    category: CategoryCommand,
    items: ItemsByCategoryCommand,
    price: PriceCommand,
    history: PriceHistoryCommand,
    route: RouteCommand,
    trade: TradeCommand,
    fuel: FuelCommand,
    alerts: AlertsCommand,
    lang: LangCommand,
    about: AboutCommand,
}

impl Bot {
    /// Build the HTTP client, disk cache, translator and preferences from `config`.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let client = UexClient::new(config.token.as_deref())?.with_base_url(&config.base_url);
        let disk = CacheManager::new(config.cache_dir())?;
        let i18n = match &config.locales_dir {
            Some(dir) => Translator::from_dir(dir, &config.default_locale),
            None => Translator::builtin(&config.default_locale),
        };
        let prefs = LangPrefs::load(config.prefs_path(), &config.default_locale)?;
        info!(
            data_dir = %config.data_dir.display(),
            base_url = client.base_url(),
            "services ready"
        );

        Ok(Self::new(Services {
            upstream: Arc::new(client),
            disk,
            i18n: Arc::new(i18n),
            prefs: Arc::new(prefs),
            default_ephemeral: config.default_ephemeral,
            started_at: Instant::now(),
        }))
    }

    /// Handlers over already-built services
    pub fn new(services: Services) -> Self {
        let services = Arc::new(services);
        Self {
            category: CategoryCommand::new(Arc::clone(&services)),
            items: ItemsByCategoryCommand::new(Arc::clone(&services)),
            price: PriceCommand::new(Arc::clone(&services)),
            history: PriceHistoryCommand::new(Arc::clone(&services)),
            route: RouteCommand::new(Arc::clone(&services)),
            trade: TradeCommand::new(Arc::clone(&services)),
            fuel: FuelCommand::new(Arc::clone(&services)),
            alerts: AlertsCommand::new(Arc::clone(&services)),
            lang: LangCommand::new(Arc::clone(&services)),
            about: AboutCommand::new(Arc::clone(&services)),
            services,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Run one command on behalf of `inv`.
    pub async fn execute(&self, inv: &Invocation, command: &Command) -> Outcome {
        debug!(?command, user = inv.user_id, guild = ?inv.guild_id, "executing command");
        let reply = match command {
            Command::Category { query } => self.category.run(inv, query).await,
            Command::ItemsByCategory { category } => self.items.run(inv, category).await,
            Command::Price {
                commodity,
                terminal,
            } => self.price.run(inv, commodity, terminal.as_deref()).await,
            Command::PriceHistory {
                commodity,
                terminal,
            } => self.history.run(inv, commodity, terminal.as_deref()).await,
            Command::Route {
                commodity,
                from,
                to,
                scu,
            } => {
                let filter = RouteFilter {
                    from: from.as_deref(),
                    to: to.as_deref(),
                    scu: *scu,
                };
                self.route.run(inv, commodity, filter).await
            }
            Command::Trade {
                commodity,
                ship,
                scu,
                top,
            } => {
                let opts = TradeOptions {
                    ship: ship.as_deref(),
                    scu: *scu,
                    top: *top,
                };
                self.trade.run(inv, commodity, opts).await
            }
            Command::Fuel {
                commodity,
                terminal,
            } => {
                self.fuel
                    .run(inv, commodity.as_deref(), terminal.as_deref())
                    .await
            }
            Command::Alerts { commodity } => self.alerts.run(inv, commodity.as_deref()).await,
            Command::Lang { action } => {
                let action = match action {
                    LangCli::Set { code } => LangAction::Set(code.clone()),
                    LangCli::Show => LangAction::Show,
                    LangCli::Reload => LangAction::Reload,
                };
                self.lang.run(inv, &action)
            }
            Command::About => self.about.run(inv).await,
            Command::Complete { field, query } => {
                return Outcome::Suggestions(self.complete(inv, *field, query).await);
            }
            Command::Warm => return Outcome::Warmed(self.warm().await),
        };
        Outcome::Reply(reply)
    }

    /// Autocomplete choices for one field; never fails.
    pub async fn complete(
        &self,
        inv: &Invocation,
        field: CompleteField,
        query: &str,
    ) -> Vec<Suggestion> {
        match field {
            CompleteField::Category => self.category.suggest(inv, query).await,
            CompleteField::Commodity => self.price.suggest_commodity(inv, query).await,
            CompleteField::Terminal => self.price.suggest_terminal(inv, query).await,
            CompleteField::Ship => self.trade.suggest_ship(query).await,
            CompleteField::FuelCommodity => self.fuel.suggest_commodity(query).await,
            CompleteField::FuelTerminal => self.fuel.suggest_terminal(query).await,
        }
    }

    fn reference_lists(&self) -> Vec<&CachedList> {
        [
            self.category.lists(),
            self.items.lists(),
            self.price.lists(),
            self.history.lists(),
            self.route.lists(),
            self.trade.lists(),
            self.alerts.lists(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fetch every reference list concurrently, mirror it to disk, and hand
    /// the rows to every handler holding that list.
    pub async fn warm(&self) -> Vec<(&'static str, Result<usize, UexError>)> {
        let specs = [
            ListSpec::COMMODITIES,
            ListSpec::TERMINALS,
            ListSpec::VEHICLES,
            ListSpec::CATEGORIES,
        ];
        let upstream: &dyn Upstream = self.services.upstream.as_ref();
        let disk = &self.services.disk;
        let fetches = specs.into_iter().map(|spec| async move {
            let result = CachedList::new(spec).get(upstream, disk).await;
            (spec, result)
        });

        let lists = self.reference_lists();
        join_all(fetches)
            .await
            .into_iter()
            .map(|(spec, result)| match result {
                Ok(rows) => {
                    let mut primed = 0;
                    for list in lists.iter().filter(|list| list.spec() == spec) {
                        list.prime(Arc::clone(&rows));
                        primed += 1;
                    }
                    debug!(list = spec.name, rows = rows.len(), primed, "warmed");
                    (spec.name, Ok(rows.len()))
                }
                Err(err) => {
                    warn!(list = spec.name, error = %err, "warm-up fetch failed");
                    (spec.name, Err(err))
                }
            })
            .collect()
    }
}
