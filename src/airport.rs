use serde::Deserialize;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

pub type AirportCode = Arc<str>;

/// Airport reference row, read from an OurAirports style `airports.csv`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Airport {
    #[serde(rename = "iata_code")]
    pub iata_code: AirportCode,
    pub name: String,
    #[serde(rename = "municipality", default)]
    pub city: String,
    #[serde(rename = "latitude_deg", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(rename = "longitude_deg", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
}

impl Airport {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some()
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.iata_code, self.name)
    }
}
