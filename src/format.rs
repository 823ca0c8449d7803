//! Text formatting for command replies
//!
//! Renders upstream rows into the short bullet lists shown in replies.
//! Missing fields render as `-`; an empty list renders as `—`.

use crate::data::{flag_field, num_field, record_id, str_field, Record};
use crate::i18n::Translator;

/// Placeholder for an empty list
pub const EMPTY_LIST: &str = "—";

/// Longest location name shown before truncation
const NAME_LIMIT: usize = 40;

/// Shorten long names to `limit` characters with a trailing ellipsis.
pub fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Round to whole units (halves to even) and group thousands with `sep`.
pub fn group_thousands(value: f64, sep: char) -> String {
    let rounded = value.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Space-grouped amount, `-` when absent
pub fn fmt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| group_thousands(v, ' '))
}

/// Comma-grouped price
pub fn fmt_price(value: f64) -> String {
    group_thousands(value, ',')
}

/// Comma-grouped amount in in-game currency
pub fn fmt_auec(value: f64) -> String {
    format!("{} aUEC", fmt_price(value))
}

fn first_str<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| str_field(record, key))
}

fn join_lines(lines: Vec<String>) -> String {
    if lines.is_empty() {
        EMPTY_LIST.to_string()
    } else {
        lines.join("\n")
    }
}

/// `Terminal: Place` for a price row
pub fn price_location(row: &Record) -> String {
    let terminal = first_str(row, &["terminal_name", "terminal_code"]).unwrap_or("?");
    match first_str(
        row,
        &[
            "city_name",
            "space_station_name",
            "outpost_name",
            "moon_name",
            "planet_name",
        ],
    ) {
        Some(place) => format!("{}: {}", terminal, place),
        None => terminal.to_string(),
    }
}

fn route_end(row: &Record, side: &str) -> String {
    let key = |suffix: &str| format!("{}_{}", side, suffix);
    let terminal_keys = [key("terminal_name"), key("terminal_code")];
    let place_keys = [
        key("city_name"),
        key("space_station_name"),
        key("outpost_name"),
        key("orbit_name"),
        key("planet_name"),
    ];
    let terminal = terminal_keys
        .iter()
        .find_map(|k| str_field(row, k))
        .unwrap_or("?");
    match place_keys.iter().find_map(|k| str_field(row, k)) {
        Some(place) => format!("{}: {}", terminal, place),
        None => terminal.to_string(),
    }
}

/// Origin of a route row
pub fn route_origin(row: &Record) -> String {
    route_end(row, "origin")
}

/// Destination of a route row
pub fn route_destination(row: &Record) -> String {
    route_end(row, "destination")
}

/// One price row: terminal, place, buy and sell
pub fn format_price_entry(entry: &Record, tr: &Translator, lang: &str) -> String {
    let terminal = shorten(
        first_str(entry, &["terminal_name", "terminal"]).unwrap_or("-"),
        NAME_LIMIT,
    );
    let place = shorten(
        first_str(
            entry,
            &["city_name", "space_station_name", "outpost_name", "planet_name", "location"],
        )
        .unwrap_or("-"),
        NAME_LIMIT,
    );
    format!(
        "• {} ({}) — {}: {} | {}: {}",
        terminal,
        place,
        tr.t("labels.buy", lang),
        fmt_money(num_field(entry, "price_buy")),
        tr.t("labels.sell", lang),
        fmt_money(num_field(entry, "price_sell")),
    )
}

/// Price rows, at most 25
pub fn format_price_list(entries: &[Record], tr: &Translator, lang: &str) -> String {
    join_lines(
        entries
            .iter()
            .take(25)
            .map(|e| format_price_entry(e, tr, lang))
            .collect(),
    )
}

/// One route row with per-unit and total profit
pub fn format_route_summary(route: &Record, tr: &Translator, lang: &str) -> String {
    let per_unit = num_field(route, "profit_per_unit")
        .or_else(|| num_field(route, "profit_unit"))
        .or_else(|| {
            Some(num_field(route, "price_destination")? - num_field(route, "price_origin")?)
        });
    let total = num_field(route, "profit_total").or_else(|| num_field(route, "profit"));
    format!(
        "• {} → {} — {}: {} | {}: {}",
        shorten(&route_origin(route), NAME_LIMIT),
        shorten(&route_destination(route), NAME_LIMIT),
        tr.t("labels.profit_per_unit", lang),
        fmt_money(per_unit),
        tr.t("labels.profit_total", lang),
        fmt_money(total),
    )
}

/// Fuel rows: terminal, fuel type, buy price
pub fn format_fuel_list(entries: &[Record]) -> String {
    join_lines(
        entries
            .iter()
            .map(|e| {
                let terminal = shorten(
                    first_str(e, &["terminal_name", "location", "terminal"]).unwrap_or("-"),
                    NAME_LIMIT,
                );
                let fuel = first_str(e, &["commodity_name"]).unwrap_or("-");
                let price = num_field(e, "price_buy").or_else(|| num_field(e, "price"));
                format!("• {} — {}: {}", terminal, fuel, fmt_money(price))
            })
            .collect(),
    )
}

/// Alert rows, at most 25
pub fn format_alerts_list(entries: &[Record]) -> String {
    join_lines(
        entries
            .iter()
            .take(25)
            .map(|e| {
                let commodity = first_str(e, &["commodity_name", "commodity"]).unwrap_or("-");
                let terminal = shorten(str_field(e, "terminal_name").unwrap_or("-"), NAME_LIMIT);
                let kind = str_field(e, "type").unwrap_or("");
                format!(
                    "• {} @ {} — {}: {}",
                    commodity,
                    terminal,
                    kind,
                    fmt_money(num_field(e, "price"))
                )
            })
            .collect(),
    )
}

/// Category details with translated type and section
pub fn format_category(category: &Record, tr: &Translator, lang: &str) -> String {
    let yes_no = |flag: bool| {
        if flag {
            tr.t("labels.yes", lang)
        } else {
            tr.t("labels.no", lang)
        }
    };
    let id = record_id(category).map_or_else(|| "-".to_string(), |id| id.to_string());
    let name = tr.tc(str_field(category, "name").unwrap_or("-"), lang);
    let kind = tr.t_or_raw("type_map", str_field(category, "type").unwrap_or("-"), lang);
    let section = tr.t_or_raw("section_map", str_field(category, "section").unwrap_or("-"), lang);

    format!(
        "{}: **{}**\n{}: **{}**\n{}: **{}** | {}: **{}**\n{}: **{}** | {}: **{}**",
        tr.t("labels.id", lang),
        id,
        tr.t("labels.name", lang),
        name,
        tr.t("labels.type", lang),
        kind,
        tr.t("labels.section", lang),
        section,
        tr.t("labels.in_game", lang),
        yes_no(flag_field(category, "is_game_related")),
        tr.t("labels.mining_related", lang),
        yes_no(flag_field(category, "is_mining")),
    )
}

/// Item rows: name, optional code, id
pub fn format_items_list(items: &[Record]) -> String {
    join_lines(
        items
            .iter()
            .map(|it| {
                let name = str_field(it, "name").unwrap_or("Unnamed");
                let id = record_id(it).map_or_else(|| "-".to_string(), |id| id.to_string());
                match str_field(it, "code") {
                    Some(code) => format!("• **{}** (`{}`) — ID: `{}`", name, code, id),
                    None => format!("• **{}** — ID: `{}`", name, id),
                }
            })
            .collect(),
    )
}
