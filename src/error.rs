use crate::airport::AirportCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed flights file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed csv file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("loader thread for {0} panicked")]
    Panicked(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectError {
    #[error("unknown airport: {0}")]
    UnknownAirport(String),
    #[error("no flights depart from {0}")]
    NoFlights(AirportCode),
}
