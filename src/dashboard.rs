//! Dashboard state: the selected origin, its routes and four linked charts.

use crate::airport::{Airport, AirportCode};
use crate::catalog::Catalog;
use crate::crossfilter::{Crossfilter, DimensionId, FilterDelta, Group};
use crate::error::SelectError;
use crate::flight::Flight;
use crate::reduce::{CountReducer, DelayReducer, DistanceReducer};
use crate::search::AirportSearch;
use crate::weekday::Weekday;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Group key shared by all dimensions of the flight index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Code(Arc<str>),
    Day(Weekday),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Code(code) => write!(f, "{}", code),
            Key::Day(day) => write!(f, "{}", day),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Delay,
    Distance,
    Airline,
    Day,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Delay,
        ChartKind::Distance,
        ChartKind::Airline,
        ChartKind::Day,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Delay => "delay",
            ChartKind::Distance => "distance",
            ChartKind::Airline => "airline",
            ChartKind::Day => "day",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Delay => "Average departure delay by destination",
            ChartKind::Distance => "Average distance by destination",
            ChartKind::Airline => "Airline performance",
            ChartKind::Day => "Flights by day of week",
        }
    }

    /// Parses a user supplied key for this chart: a weekday for the day
    /// chart, an airport or carrier code otherwise.
    pub fn parse_key(self, raw: &str) -> Result<Key, String> {
        match self {
            ChartKind::Day => raw.parse().map(Key::Day),
            _ => {
                let code = raw.trim().to_uppercase();
                if code.is_empty() {
                    Err("empty code".to_string())
                } else {
                    Ok(Key::Code(Arc::from(code)))
                }
            }
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delay" | "dep-delay" => Ok(ChartKind::Delay),
            "distance" => Ok(ChartKind::Distance),
            "airline" | "airlines" => Ok(ChartKind::Airline),
            "day" | "days" => Ok(ChartKind::Day),
            _ => Err(format!("unknown chart: {}", s)),
        }
    }
}

/// The four linked charts over one origin's flights.
///
/// The delay and distance charts share the destination dimension, so a
/// filter set through either one applies to both and is ignored by both.
pub struct Charts {
    crossfilter: Crossfilter<Flight, Key>,
    dest: DimensionId,
    carrier: DimensionId,
    day: DimensionId,
    pub delay: Group<Flight, Key, DelayReducer>,
    pub distance: Group<Flight, Key, DistanceReducer>,
    pub airline: Group<Flight, Key, DelayReducer>,
    pub days: Group<Flight, Key, CountReducer>,
}

impl Charts {
    pub fn new(flights: Vec<Flight>) -> Charts {
        let mut crossfilter = Crossfilter::new(flights);
        let dest = crossfilter.add_dimension("dest", |f: &Flight| Key::Code(f.destination.clone()));
        let carrier = crossfilter.add_dimension("carrier", |f: &Flight| Key::Code(f.carrier.clone()));
        let day = crossfilter.add_dimension("day", |f: &Flight| Key::Day(f.day_of_week));

        let delay = Group::new(&crossfilter, dest, DelayReducer);
        let distance = Group::new(&crossfilter, dest, DistanceReducer);
        let airline = Group::new(&crossfilter, carrier, DelayReducer);
        let days = Group::new(&crossfilter, day, CountReducer);

        Charts {
            crossfilter,
            dest,
            carrier,
            day,
            delay,
            distance,
            airline,
            days,
        }
    }

    fn dimension_of(&self, kind: ChartKind) -> DimensionId {
        match kind {
            ChartKind::Delay | ChartKind::Distance => self.dest,
            ChartKind::Airline => self.carrier,
            ChartKind::Day => self.day,
        }
    }

    fn broadcast(&mut self, delta: FilterDelta) {
        debug!(
            dimension = self.crossfilter.dimension_name(delta.dimension),
            changed = delta.changes.len(),
            "applying filter delta"
        );
        self.delay.apply(&self.crossfilter, &delta);
        self.distance.apply(&self.crossfilter, &delta);
        self.airline.apply(&self.crossfilter, &delta);
        self.days.apply(&self.crossfilter, &delta);
    }

    pub fn filter(&mut self, kind: ChartKind, keys: Vec<Key>) {
        let dim = self.dimension_of(kind);
        let delta = self.crossfilter.filter(dim, keys);
        self.broadcast(delta);
    }

    pub fn reset(&mut self, kind: ChartKind) {
        let dim = self.dimension_of(kind);
        let delta = self.crossfilter.filter_all(dim);
        self.broadcast(delta);
    }

    pub fn reset_all(&mut self) {
        for kind in ChartKind::ALL {
            self.reset(kind);
        }
    }

    pub fn filters(&self, kind: ChartKind) -> Option<&BTreeSet<Key>> {
        self.crossfilter.filters(self.dimension_of(kind))
    }

    pub fn total(&self) -> usize {
        self.crossfilter.len()
    }

    pub fn selected(&self) -> usize {
        self.crossfilter.selected().count()
    }
}

/// One destination drawn on the route map.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub destination: Airport,
    pub flights: usize,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Distinct destinations of `flights`, joined with airport data.
///
/// Destinations missing from the catalog or lacking both coordinates are
/// dropped; a single missing coordinate is taken from the origin.
pub fn routes(catalog: &Catalog, origin: &Airport, flights: &[Flight]) -> Vec<Route> {
    let mut per_destination: BTreeMap<&str, usize> = BTreeMap::new();
    for f in flights {
        *per_destination.entry(f.destination.as_ref()).or_default() += 1;
    }
    per_destination
        .into_iter()
        .filter_map(|(code, n)| catalog.airport(code).map(|a| (a, n)))
        .filter(|(a, _)| a.has_coordinates())
        .map(|(a, n)| Route {
            destination: a.clone(),
            flights: n,
            latitude: a.latitude.or(origin.latitude),
            longitude: a.longitude.or(origin.longitude),
        })
        .collect()
}

pub struct Selection {
    pub origin: Airport,
    pub routes: Vec<Route>,
    pub charts: Charts,
}

pub struct Dashboard {
    catalog: Catalog,
    search: AirportSearch,
    selection: Option<Selection>,
    invalid: bool,
}

impl Dashboard {
    pub fn new(catalog: Catalog, search_limit: usize) -> Dashboard {
        let search = AirportSearch::new(&catalog.airports, search_limit);
        Dashboard {
            catalog,
            search,
            selection: None,
            invalid: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selection_mut(&mut self) -> Option<&mut Selection> {
        self.selection.as_mut()
    }

    /// Set after an origin with no departures was picked, cleared by the
    /// next successful selection.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn search(&self, query: &str) -> Vec<&Airport> {
        self.search
            .query(query)
            .into_iter()
            .map(|i| &self.catalog.airports[i])
            .collect()
    }

    /// Resolves an IATA code, or a search query with exactly one hit.
    fn resolve(&self, input: &str) -> Result<Airport, SelectError> {
        let code = input.trim().to_uppercase();
        if let Some(airport) = self.catalog.airport(&code) {
            return Ok(airport.clone());
        }
        match self.search(input).as_slice() {
            [only] => Ok((*only).clone()),
            _ => Err(SelectError::UnknownAirport(input.trim().to_string())),
        }
    }

    /// Picks a new origin and rebuilds routes and charts from scratch.
    ///
    /// On [`SelectError::NoFlights`] the previous selection is kept but the
    /// dashboard is marked invalid.
    pub fn select_origin(&mut self, input: &str) -> Result<&Selection, SelectError> {
        let origin = self.resolve(input)?;
        let flights = self.catalog.flights_from(&origin.iata_code);
        if flights.is_empty() {
            self.invalid = true;
            return Err(SelectError::NoFlights(origin.iata_code.clone()));
        }
        self.invalid = false;

        let routes = routes(&self.catalog, &origin, &flights);
        debug!(
            origin = %origin.iata_code,
            flights = flights.len(),
            routes = routes.len(),
            "origin selected"
        );
        let charts = Charts::new(flights);
        Ok(self.selection.insert(Selection {
            origin,
            routes,
            charts,
        }))
    }

    pub fn origin_code(&self) -> Option<&AirportCode> {
        self.selection.as_ref().map(|s| &s.origin.iata_code)
    }
}
