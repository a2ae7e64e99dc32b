//! Text rendering of the route list and the four charts.

use crate::catalog::Catalog;
use crate::dashboard::{ChartKind, Charts, Key, Selection};
use colored::Colorize;
use std::collections::BTreeSet;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

const BAR_WIDTH: f64 = 30.0;

type Rgb = (u8, u8, u8);

const DELAY_COLOR: Rgb = (0x54, 0x60, 0x17);
const DISTANCE_COLOR: Rgb = (0x84, 0x98, 0x23);
const AIRLINE_COLOR: Rgb = (0xBB, 0x30, 0x2F);
const CANCELLED_COLOR: Rgb = (0x5c, 0x18, 0x17);
const ORIGIN_COLOR: Rgb = (0xAA, 0x25, 0x19);
const DESTINATION_COLOR: Rgb = (0xe7, 0x5f, 0x2b);
const DAY_COLORS: [Rgb; 7] = [
    (0x9b, 0x80, 0x63),
    (0x86, 0x6f, 0x56),
    (0x72, 0x5e, 0x49),
    (0x5d, 0x4d, 0x3b),
    (0x48, 0x3c, 0x2e),
    (0x33, 0x2a, 0x21),
    (0x1f, 0x19, 0x14),
];

/// A bar scaled against the largest value of its chart. Negative values
/// (early departures) are drawn with a lighter glyph.
fn bar(value: f64, max: f64, (r, g, b): Rgb) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = (value.abs() / max * BAR_WIDTH).round() as usize;
    let glyph = if value < 0.0 { "░" } else { "█" };
    glyph.repeat(len).truecolor(r, g, b).to_string()
}

pub fn round_minutes(value: f64) -> i64 {
    value.round() as i64
}

fn minutes(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |v| round_minutes(v).to_string())
}

fn mark(filter: Option<&BTreeSet<Key>>, key: &Key) -> &'static str {
    match filter {
        Some(keys) if keys.contains(key) => "●",
        _ => "",
    }
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "No data.".to_string();
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Alignment::left());
    table.to_string()
}

#[derive(Tabled)]
struct DelayRow {
    #[tabled(rename = "")]
    mark: &'static str,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Destination")]
    name: String,
    #[tabled(rename = "Flights")]
    flights: u64,
    #[tabled(rename = "Avg delay (min)")]
    average: String,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct DistanceRow {
    #[tabled(rename = "")]
    mark: &'static str,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Destination")]
    name: String,
    #[tabled(rename = "Distance (mi)")]
    average: String,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct AirlineRow {
    #[tabled(rename = "")]
    mark: &'static str,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Airline")]
    name: String,
    #[tabled(rename = "Flights")]
    flights: u64,
    #[tabled(rename = "Avg delay (min)")]
    average: String,
    #[tabled(rename = "Cancellations")]
    cancelled: u64,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "")]
    mark: &'static str,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Flights")]
    flights: u64,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Destination")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Flights")]
    flights: usize,
}

fn coordinate(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |v| format!("{:.4}", v))
}

fn delay_rows(catalog: &Catalog, charts: &Charts) -> Vec<DelayRow> {
    let filter = charts.filters(ChartKind::Delay);
    let sorted = charts.delay.sorted_desc(|s| s.average_delay);
    let max = sorted
        .iter()
        .filter_map(|(_, s)| s.average_delay)
        .fold(0.0, |m: f64, v| m.max(v.abs()));
    sorted
        .into_iter()
        .map(|(key, s)| {
            let code = key.to_string();
            DelayRow {
                mark: mark(filter, key),
                name: catalog.airport_label(&code).to_string(),
                flights: s.count,
                average: minutes(s.average_delay),
                bar: s.average_delay.map_or(String::new(), |v| bar(v, max, DELAY_COLOR)),
                code,
            }
        })
        .collect()
}

fn distance_rows(catalog: &Catalog, charts: &Charts) -> Vec<DistanceRow> {
    let filter = charts.filters(ChartKind::Distance);
    let sorted = charts.distance.sorted_desc(|s| s.average_distance);
    let max = sorted
        .iter()
        .filter_map(|(_, s)| s.average_distance)
        .fold(0.0, f64::max);
    sorted
        .into_iter()
        .map(|(key, s)| {
            let code = key.to_string();
            DistanceRow {
                mark: mark(filter, key),
                name: catalog.airport_label(&code).to_string(),
                average: s
                    .average_distance
                    .map_or("-".to_string(), |v| format!("{:.1}", v)),
                bar: s
                    .average_distance
                    .map_or(String::new(), |v| bar(v, max, DISTANCE_COLOR)),
                code,
            }
        })
        .collect()
}

/// Average delay stacked with the cancellation count, as one bar.
fn airline_rows(catalog: &Catalog, charts: &Charts) -> Vec<AirlineRow> {
    let filter = charts.filters(ChartKind::Airline);
    let sorted = charts.airline.sorted_desc(|s| s.average_delay);
    let max = sorted
        .iter()
        .map(|(_, s)| s.average_delay.unwrap_or(0.0).abs() + s.cancelled as f64)
        .fold(0.0, f64::max);
    sorted
        .into_iter()
        .map(|(key, s)| {
            let code = key.to_string();
            let delay_bar = s.average_delay.map_or(String::new(), |v| bar(v, max, AIRLINE_COLOR));
            let cancelled_bar = bar(s.cancelled as f64, max, CANCELLED_COLOR);
            AirlineRow {
                mark: mark(filter, key),
                name: catalog.airline_label(&code).to_string(),
                flights: s.count,
                average: minutes(s.average_delay),
                cancelled: s.cancelled,
                bar: format!("{}{}", delay_bar, cancelled_bar),
                code,
            }
        })
        .collect()
}

fn day_rows(charts: &Charts) -> Vec<DayRow> {
    let filter = charts.filters(ChartKind::Day);
    let max = charts.days.all().map(|(_, n)| *n).max().unwrap_or(0) as f64;
    charts
        .days
        .all()
        .map(|(key, n)| {
            let color = match key {
                Key::Day(day) => DAY_COLORS[day.number() as usize - 1],
                Key::Code(_) => DAY_COLORS[0],
            };
            DayRow {
                mark: mark(filter, key),
                day: key.to_string(),
                flights: *n,
                bar: bar(*n as f64, max, color),
            }
        })
        .collect()
}

pub fn render_chart(catalog: &Catalog, charts: &Charts, kind: ChartKind) -> String {
    let mut header = format!("{}", kind.title().bold());
    if let Some(keys) = charts.filters(kind) {
        let keys: Vec<String> = keys.iter().map(Key::to_string).collect();
        header.push_str(&format!(" [filtered: {}]", keys.join(", ")).yellow().to_string());
    }
    let body = match kind {
        ChartKind::Delay => table(delay_rows(catalog, charts)),
        ChartKind::Distance => table(distance_rows(catalog, charts)),
        ChartKind::Airline => table(airline_rows(catalog, charts)),
        ChartKind::Day => table(day_rows(charts)),
    };
    format!("{}\n{}", header, body)
}

pub fn render_routes(selection: &Selection) -> String {
    let (r, g, b) = ORIGIN_COLOR;
    let origin = &selection.origin;
    let header = format!(
        "{} {} ({}, {})",
        "●".truecolor(r, g, b),
        origin.to_string().bold(),
        coordinate(origin.latitude),
        coordinate(origin.longitude)
    );
    let rows = selection
        .routes
        .iter()
        .map(|route| RouteRow {
            code: route.destination.iata_code.to_string(),
            name: route.destination.name.clone(),
            city: route.destination.city.clone(),
            latitude: coordinate(route.latitude),
            longitude: coordinate(route.longitude),
            flights: route.flights,
        })
        .collect::<Vec<_>>();
    let (r, g, b) = DESTINATION_COLOR;
    format!(
        "{}\n{} {} destinations on the map\n{}",
        header,
        "●".truecolor(r, g, b),
        selection.routes.len(),
        table(rows)
    )
}

pub fn render_dashboard(catalog: &Catalog, selection: &Selection) -> String {
    let charts = &selection.charts;
    let mut out = vec![render_routes(selection)];
    out.extend(
        ChartKind::ALL
            .iter()
            .map(|kind| render_chart(catalog, charts, *kind)),
    );
    out.push(format!(
        "{} of {} flights selected",
        charts.selected(),
        charts.total()
    ));
    out.join("\n\n")
}
