use crate::airline::Airline;
use crate::airport::Airport;
use crate::error::LoadError;
use crate::flight::Flight;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

/// The three reference datasets, loaded once and read-only afterwards.
pub struct Catalog {
    pub flights: Vec<Flight>,
    pub airports: Vec<Airport>,
    pub airlines: Vec<Airline>,
    airport_index: HashMap<String, usize>,
    airline_index: HashMap<String, usize>,
}

pub struct DataPaths {
    pub flights: PathBuf,
    pub airports: PathBuf,
    pub airlines: PathBuf,
}

impl Catalog {
    pub fn new(flights: Vec<Flight>, airports: Vec<Airport>, airlines: Vec<Airline>) -> Catalog {
        let airports: Vec<Airport> = airports
            .into_iter()
            .filter(|a| !a.iata_code.trim().is_empty())
            .collect();
        // first row wins on duplicate codes
        let mut airport_index = HashMap::new();
        for (i, a) in airports.iter().enumerate() {
            airport_index.entry(a.iata_code.to_string()).or_insert(i);
        }
        let mut airline_index = HashMap::new();
        for (i, a) in airlines.iter().enumerate() {
            airline_index.entry(a.code.to_string()).or_insert(i);
        }
        Catalog {
            flights,
            airports,
            airlines,
            airport_index,
            airline_index,
        }
    }

    /// Loads the three files concurrently; none depends on another.
    pub fn load(paths: &DataPaths) -> Result<Catalog, LoadError> {
        let (flights, airports, airlines) = thread::scope(|s| {
            let flights = s.spawn(|| load_flights(&paths.flights));
            let airports = s.spawn(|| load_csv::<Airport>(&paths.airports));
            let airlines = s.spawn(|| load_csv::<Airline>(&paths.airlines));
            (
                flights.join().map_err(|_| LoadError::Panicked("flights")),
                airports.join().map_err(|_| LoadError::Panicked("airports")),
                airlines.join().map_err(|_| LoadError::Panicked("airlines")),
            )
        });
        let catalog = Catalog::new(flights??, airports??, airlines??);
        info!(
            flights = catalog.flights.len(),
            airports = catalog.airports.len(),
            airlines = catalog.airlines.len(),
            "datasets loaded"
        );
        Ok(catalog)
    }

    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.airport_index.get(code).map(|i| &self.airports[*i])
    }

    pub fn airline(&self, code: &str) -> Option<&Airline> {
        self.airline_index.get(code).map(|i| &self.airlines[*i])
    }

    /// Airport name, or the raw code when the airport is unknown.
    pub fn airport_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.airport(code).map_or(code, |a| a.name.as_str())
    }

    /// Carrier description, or the raw code when the carrier is unknown.
    pub fn airline_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.airline(code).map_or(code, |a| a.description.as_str())
    }

    pub fn flights_from(&self, origin: &str) -> Vec<Flight> {
        self.flights
            .iter()
            .filter(|f| &*f.origin == origin)
            .cloned()
            .collect()
    }
}

fn load_flights(path: &Path) -> Result<Vec<Flight>, LoadError> {
    debug!(path = %path.display(), "reading flights");
    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    debug!(path = %path.display(), "reading csv");
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => {
                return Err(LoadError::Csv {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                skipped += 1;
                debug!(path = %path.display(), error = %e, "skipping csv row");
            }
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped malformed csv rows");
    }
    Ok(rows)
}
