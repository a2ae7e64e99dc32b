use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

pub type CarrierCode = Arc<str>;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Airline {
    #[serde(alias = "Code")]
    pub code: CarrierCode,
    #[serde(alias = "Description")]
    pub description: String,
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}
