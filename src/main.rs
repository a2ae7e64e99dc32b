use crate::airport::Airport;
use crate::catalog::{Catalog, DataPaths};
use crate::chart::{render_chart, render_dashboard, render_routes};
use crate::dashboard::{ChartKind, Dashboard, Key};
use crate::error::SelectError;
use crate::search::AirportSearch;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod airline;
mod airport;
mod catalog;
mod chart;
mod crossfilter;
mod dashboard;
mod error;
mod flight;
mod reduce;
mod search;
mod weekday;

/// Table rows shown inline; anything longer goes through the pager.
const PAGE_ROWS: usize = 20;

#[derive(Parser)]
#[command(name = "delayviz", about = "Interactive flight delay dashboard")]
struct Args {
    /// Path to the flights JSON file
    #[arg(short, long, value_name = "FILE", default_value = "data/ontime_data_test.json")]
    flights: PathBuf,

    /// Path to the airports CSV file
    #[arg(long, value_name = "FILE", default_value = "data/airports.csv")]
    airports: PathBuf,

    /// Path to the airlines CSV file
    #[arg(long, value_name = "FILE", default_value = "data/airlines.csv")]
    airlines: PathBuf,

    /// Print the dashboard for this origin airport and exit
    #[arg(short, long, value_name = "CODE")]
    origin: Option<String>,

    /// Maximum number of airport search results
    #[arg(long, default_value_t = search::DEFAULT_LIMIT)]
    search_limit: usize,
}

const COMMANDS: [&str; 10] = [
    "search", "origin", "routes", "charts", "chart", "filter", "reset", "help", "exit", "quit",
];

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
    pub airports: Vec<Airport>,
    pub search: AirportSearch,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        let Some((cmd, rest)) = line.split_once(' ') else {
            let candidates = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                })
                .collect();
            return Ok((0, candidates));
        };

        let start = cmd.len() + 1;
        let candidates = match cmd {
            "origin" | "search" => self
                .search
                .query(rest)
                .into_iter()
                .map(|i| &self.airports[i])
                .map(|a| Pair {
                    display: a.to_string(),
                    replacement: a.iata_code.to_string(),
                })
                .collect(),
            "chart" | "filter" | "reset" if !rest.contains(' ') => ChartKind::ALL
                .iter()
                .map(|k| k.name())
                .chain((cmd == "reset").then_some("all"))
                .filter(|name| name.starts_with(rest))
                .map(|name| Pair {
                    display: name.to_string(),
                    replacement: format!("{} ", name),
                })
                .collect(),
            _ => vec![],
        };
        Ok((start, candidates))
    }
}

/// Pipes long output through `less -R` (or `more`), printing directly when
/// neither pager can be started.
fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let mut pager = match pager {
        Ok(pager) => pager,
        Err(e) => {
            debug!(error = %e, "no pager available");
            println!("{}", content);
            return;
        }
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the prompt
    let _ = pager.wait();
}

/// Counts table body rows, the lines starting with a vertical border that
/// are not the header row of their table.
fn table_rows(content: &str) -> usize {
    let mut rows = 0;
    let mut in_header = false;
    for line in content.lines() {
        if line.starts_with('╭') {
            in_header = true;
        } else if line.starts_with('│') {
            if in_header {
                in_header = false;
            } else {
                rows += 1;
            }
        }
    }
    rows
}

fn show(content: String) {
    if table_rows(&content) > PAGE_ROWS {
        paginate(content);
    } else {
        println!("{}", content);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn report_select_error(err: &SelectError) {
    match err {
        SelectError::NoFlights(code) => println!(
            "{}",
            format!("No flights found departing from {}. Please pick another airport.", code).red()
        ),
        SelectError::UnknownAirport(_) => {
            println!("{}", format!("{}. Try `search <text>` first.", err).red())
        }
    }
}

fn print_help() {
    println!("\nAvailable Commands:");
    println!("  search <text>             - Find airports by name, IATA code or city");
    println!("  origin <code|text>        - Select the departure airport and show the dashboard");
    println!("  routes                    - List destinations of the selected airport");
    println!("  charts                    - Show all four charts");
    println!("  chart <kind>              - Show one chart: delay, distance, airline, day");
    println!("  filter <kind> <key>...    - Filter a chart to the given codes or days");
    println!("  reset [kind|all]          - Clear a chart's filter, or all of them");
    println!("  help / ?                  - Show this help menu");
    println!("  exit / quit               - Exit the dashboard\n");
}

fn run_command(dashboard: &mut Dashboard, parts: &[&str]) {
    match parts[0] {
        "search" => {
            let query = parts[1..].join(" ");
            let hits = dashboard.search(&query);
            if hits.is_empty() {
                println!("No matching airports found.");
            }
            for airport in hits {
                println!("  {:<4} {} ({})", airport.iata_code, airport.name, airport.city);
            }
        }
        "origin" => {
            if parts.len() < 2 {
                println!("Usage: origin <code|text>");
                return;
            }
            let query = parts[1..].join(" ");
            match dashboard.select_origin(&query) {
                Ok(_) => {
                    if let Some(selection) = dashboard.selection() {
                        show(render_dashboard(dashboard.catalog(), selection));
                    }
                }
                Err(err) => report_select_error(&err),
            }
        }
        "routes" | "charts" | "chart" | "filter" | "reset" => {
            let Some(selection) = dashboard.selection() else {
                println!("Select an origin first: origin <code>");
                return;
            };
            match parts[0] {
                "routes" => show(render_routes(selection)),
                "charts" => show(render_dashboard(dashboard.catalog(), selection)),
                "chart" => match parts.get(1).map(|k| k.parse::<ChartKind>()) {
                    Some(Ok(kind)) => {
                        show(render_chart(dashboard.catalog(), &selection.charts, kind))
                    }
                    Some(Err(e)) => println!("{}", e),
                    None => println!("Usage: chart <delay|distance|airline|day>"),
                },
                "filter" => filter(dashboard, parts),
                _ => reset(dashboard, parts),
            }
        }
        "help" | "?" => print_help(),
        _ => println!("Unknown command: {}", parts[0]),
    }
}

fn filter(dashboard: &mut Dashboard, parts: &[&str]) {
    let (Some(kind), true) = (parts.get(1), parts.len() > 2) else {
        println!("Usage: filter <delay|distance|airline|day> <key>...");
        return;
    };
    let kind = match kind.parse::<ChartKind>() {
        Ok(kind) => kind,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    let keys = match parts[2..]
        .iter()
        .map(|raw| kind.parse_key(raw))
        .collect::<Result<Vec<Key>, String>>()
    {
        Ok(keys) => keys,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    if let Some(selection) = dashboard.selection_mut() {
        selection.charts.filter(kind, keys);
    }
    if let Some(selection) = dashboard.selection() {
        show(render_dashboard(dashboard.catalog(), selection));
    }
}

fn reset(dashboard: &mut Dashboard, parts: &[&str]) {
    let target = parts.get(1).copied().unwrap_or("all");
    let Some(selection) = dashboard.selection_mut() else {
        return;
    };
    if target == "all" {
        selection.charts.reset_all();
    } else {
        match target.parse::<ChartKind>() {
            Ok(kind) => selection.charts.reset(kind),
            Err(e) => {
                println!("{}", e);
                return;
            }
        }
    }
    if let Some(selection) = dashboard.selection() {
        show(render_dashboard(dashboard.catalog(), selection));
    }
}

fn prompt(dashboard: &Dashboard) -> String {
    match (dashboard.origin_code(), dashboard.is_invalid()) {
        (Some(code), false) => format!("{} >> ", code),
        (Some(code), true) => format!("{} ! >> ", code),
        (None, true) => "! >> ".to_string(),
        (None, false) => ">> ".to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let catalog = Catalog::load(&DataPaths {
        flights: args.flights.clone(),
        airports: args.airports.clone(),
        airlines: args.airlines.clone(),
    })?;
    println!(
        "Dashboard ready. Loaded {} flights from {}",
        catalog.flights.len(),
        args.flights.display()
    );

    let helper = CompleteHelper {
        commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        search: AirportSearch::new(&catalog.airports, args.search_limit),
        airports: catalog.airports.clone(),
    };
    let mut dashboard = Dashboard::new(catalog, args.search_limit);

    if let Some(origin) = args.origin {
        dashboard.select_origin(&origin)?;
        if let Some(selection) = dashboard.selection() {
            println!("{}", render_dashboard(dashboard.catalog(), selection));
        }
        return Ok(());
    }

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(&prompt(&dashboard));
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if matches!(parts[0], "exit" | "quit") {
                    break;
                }
                run_command(&mut dashboard, &parts);
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                warn!(error = ?err, "readline failed");
                break;
            }
        }
    }
    Ok(())
}
