//! `trade`: where to buy and sell a commodity, and the best route for a hold
//!
//! The best route is picked two ways. With a known cargo size it maximizes
//! `(price_destination - price_origin) * scu`. Without one it ranks by the
//! upstream `profit` field when present and the per-unit price delta
//! otherwise; those two figures are not in the same unit.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use super::{Embed, Invocation, Reply, Services, Suggestion, SuggestionLabel};
use crate::data::{num_field, record_id, str_field, CachedList, ListSpec, Record, RowsRequest};
use crate::format::{fmt_auec, fmt_price, price_location, route_destination, route_origin};
use crate::resolve::{normalize, suggest_names};

/// Disk freshness of prices and routes
pub const TRADE_TTL: Duration = Duration::from_secs(600);

pub const DEFAULT_TOP: usize = 10;
const TOP_RANGE: (usize, usize) = (3, 30);

/// Vehicle fields that may carry cargo capacity, in order of preference
const SCU_KEYS: [&str; 5] = [
    "cargo",
    "cargo_scu",
    "scu",
    "cargo_capacity",
    "cargo_capacity_scu",
];

/// Optional arguments of a trade query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeOptions<'a> {
    pub ship: Option<&'a str>,
    pub scu: Option<u32>,
    pub top: Option<usize>,
}

pub struct TradeCommand {
    services: Arc<Services>,
    commodities: CachedList,
    vehicles: CachedList,
}

impl TradeCommand {
    pub fn new(services: Arc<Services>) -> Self {
        let commodities = CachedList::seeded(ListSpec::COMMODITIES, &services.disk);
        let vehicles = CachedList::seeded(ListSpec::VEHICLES, &services.disk);
        Self {
            services,
            commodities,
            vehicles,
        }
    }

    /// Reference lists this handler keeps in memory
    pub(crate) fn lists(&self) -> Vec<&CachedList> {
        vec![&self.commodities, &self.vehicles]
    }

    pub async fn run(&self, inv: &Invocation, commodity: &str, opts: TradeOptions<'_>) -> Reply {
        let s = &self.services;
        let lang = s.lang(inv);
        let top = opts.top.unwrap_or(DEFAULT_TOP).clamp(TOP_RANGE.0, TOP_RANGE.1);

        let commodity = match s
            .require(&self.commodities, commodity, &lang, "ui.err_price_fetch")
            .await
        {
            Ok(commodity) => commodity,
            Err(reply) => return reply,
        };
        let id = record_id(&commodity).unwrap_or_default();

        let prices = RowsRequest::new(format!("prices_{}", id), "commodities_prices", TRADE_TTL)
            .param("id_commodity", id)
            .param("limit", 5000);
        let prices = match prices.load(s.upstream.as_ref(), &s.disk).await {
            Ok(prices) => prices,
            Err(err) => return s.fetch_failure(&lang, "ui.err_price_fetch", &err),
        };

        let (scu, ship) = self.cargo(opts).await;

        let routes = RowsRequest::new(format!("routes_{}", id), "commodities_routes", TRADE_TTL)
            .param("id_commodity", id);
        let routes = match routes.load(s.upstream.as_ref(), &s.disk).await {
            Ok(routes) => routes,
            Err(err) => {
                warn!(commodity = id, error = %err, "routes unavailable for trade summary");
                Vec::new()
            }
        };

        let t = |key: &str| s.t(key, &lang);
        let mut lines = Vec::new();

        lines.push(format!("**{}**", t("labels.buy_locations")));
        let buys = buy_locations(&prices, top);
        if buys.is_empty() {
            lines.push(t("ui.no_buy_locations"));
        }
        for row in buys {
            lines.push(format!(
                "• **{}** — {}: **{}**",
                price_location(row),
                t("labels.buy"),
                fmt_price(num_field(row, "price_buy").unwrap_or(0.0))
            ));
        }

        lines.push(String::new());
        lines.push(format!("**{}**", t("labels.sell_locations")));
        let sells = sell_locations(&prices, top);
        if sells.is_empty() {
            lines.push(t("ui.no_sell_locations"));
        }
        for row in sells {
            lines.push(format!(
                "• **{}** — {}: **{}**",
                price_location(row),
                t("labels.sell"),
                fmt_price(num_field(row, "price_sell").unwrap_or(0.0))
            ));
        }

        lines.push(String::new());
        match best_route(&routes, scu) {
            Some(route) => {
                let buy = num_field(route, "price_origin").unwrap_or(0.0);
                let sell = num_field(route, "price_destination").unwrap_or(0.0);
                lines.push(format!("**{}**", t("labels.best_route")));
                lines.push(format!(
                    "{} **{}**: **{}**",
                    t("labels.buy_at"),
                    route_origin(route),
                    fmt_price(buy)
                ));
                lines.push(format!(
                    "{} **{}**: **{}**",
                    t("labels.sell_at"),
                    route_destination(route),
                    fmt_price(sell)
                ));
                match scu {
                    Some(scu) => {
                        let units = f64::from(scu);
                        match &ship {
                            Some(ship) => {
                                lines.push(format!("{}: **{}** ({} SCU)", t("labels.ship"), ship, scu))
                            }
                            None => lines.push(format!("SCU: **{}**", scu)),
                        }
                        lines.push(format!(
                            "{}: **{}**",
                            t("labels.total_cost"),
                            fmt_auec(buy * units)
                        ));
                        lines.push(format!(
                            "{}: **{}**",
                            t("labels.total_profit"),
                            fmt_auec((sell - buy) * units)
                        ));
                    }
                    None => lines.push(t("ui.route_no_scu")),
                }
            }
            None => lines.push(t("ui.no_profitable_route")),
        }

        let title = s.i18n.tc(str_field(&commodity, "name").unwrap_or(""), &lang);
        Reply::new(Embed::new(title, lines.join("\n")), true)
    }

    /// Cargo size from an explicit SCU, else from the named ship.
    async fn cargo(&self, opts: TradeOptions<'_>) -> (Option<u32>, Option<String>) {
        if let Some(scu) = opts.scu.filter(|scu| *scu > 0) {
            return (Some(scu), None);
        }
        let Some(ship) = opts.ship.filter(|s| !s.trim().is_empty()) else {
            return (None, None);
        };
        let s = &self.services;
        let vehicles = match self.vehicles.get(s.upstream.as_ref(), &s.disk).await {
            Ok(vehicles) => vehicles,
            Err(err) => {
                warn!(error = %err, "vehicles unavailable, ignoring ship");
                return (None, None);
            }
        };
        let wanted = normalize(ship);
        match vehicles
            .iter()
            .find(|v| normalize(str_field(v, "name").unwrap_or("")) == wanted)
        {
            Some(vehicle) => (
                vehicle_scu(vehicle),
                Some(str_field(vehicle, "name").unwrap_or(ship).to_string()),
            ),
            None => (None, None),
        }
    }

    pub async fn suggest_commodity(&self, inv: &Invocation, query: &str) -> Vec<Suggestion> {
        let lang = self.services.lang(inv);
        self.services
            .suggest_in(&self.commodities, query, &lang, SuggestionLabel::Translated)
            .await
    }

    /// Ship names containing the query; values are the names themselves.
    pub async fn suggest_ship(&self, query: &str) -> Vec<Suggestion> {
        let s = &self.services;
        let vehicles = match self.vehicles.get(s.upstream.as_ref(), &s.disk).await {
            Ok(vehicles) => vehicles,
            Err(err) => {
                warn!(error = %err, "ship autocomplete source unavailable");
                return Vec::new();
            }
        };
        let names: Vec<String> = vehicles
            .iter()
            .filter_map(|v| str_field(v, "name").map(str::to_string))
            .collect();
        suggest_names(query, &names)
            .into_iter()
            .map(|name| Suggestion {
                label: name.to_string(),
                value: name.to_string(),
            })
            .collect()
    }
}

/// First positive cargo capacity among the known fields
fn vehicle_scu(vehicle: &Record) -> Option<u32> {
    SCU_KEYS.iter().find_map(|key| {
        vehicle
            .get(*key)
            .and_then(Value::as_f64)
            .filter(|v| *v > 0.0)
            .map(|v| v as u32)
    })
}

/// Cheapest places to buy
fn buy_locations(prices: &[Record], top: usize) -> Vec<&Record> {
    let mut rows: Vec<&Record> = prices
        .iter()
        .filter(|r| num_field(r, "price_buy").unwrap_or(0.0) > 0.0)
        .collect();
    rows.sort_by(|a, b| cmp_field(a, b, "price_buy"));
    rows.truncate(top);
    rows
}

/// Best-paying places to sell
fn sell_locations(prices: &[Record], top: usize) -> Vec<&Record> {
    let mut rows: Vec<&Record> = prices
        .iter()
        .filter(|r| num_field(r, "price_sell").unwrap_or(0.0) > 0.0)
        .collect();
    rows.sort_by(|a, b| cmp_field(b, a, "price_sell"));
    rows.truncate(top);
    rows
}

fn cmp_field(a: &Record, b: &Record, key: &str) -> Ordering {
    let a = num_field(a, key).unwrap_or(0.0);
    let b = num_field(b, key).unwrap_or(0.0);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn price_delta(route: &Record) -> f64 {
    num_field(route, "price_destination").unwrap_or(0.0) - num_field(route, "price_origin").unwrap_or(0.0)
}

/// Route with the highest score; the first one wins ties.
fn best_route(routes: &[Record], scu: Option<u32>) -> Option<&Record> {
    let score = |route: &Record| match scu {
        Some(scu) => price_delta(route) * f64::from(scu),
        None => num_field(route, "profit").unwrap_or_else(|| price_delta(route)),
    };
    routes
        .iter()
        .fold(None, |best: Option<(&Record, f64)>, route| {
            let value = score(route);
            match best {
                Some((_, top)) if top >= value => best,
                _ => Some((route, value)),
            }
        })
        .map(|(route, _)| route)
}
