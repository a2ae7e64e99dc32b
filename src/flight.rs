use crate::airline::CarrierCode;
use crate::airport::AirportCode;
use crate::weekday::Weekday;
use serde::Deserialize;

/// One row of the on-time performance dataset.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Flight {
    pub origin: AirportCode,
    #[serde(rename = "dest")]
    pub destination: AirportCode,
    #[serde(rename = "unique_carrier")]
    pub carrier: CarrierCode,
    pub day_of_week: Weekday,
    /// Departure delay in minutes, negative for early departures.
    #[serde(default, deserialize_with = "coerce::number")]
    pub dep_delay: f64,
    /// Distance in miles.
    #[serde(default, deserialize_with = "coerce::number")]
    pub distance: f64,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub cancelled: bool,
}

/// Lenient numeric fields. The dataset mixes numbers, numeric strings and
/// nulls (cancelled flights have no delay), all of which are accepted here.
pub(crate) mod coerce {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Num(f64),
        Bool(bool),
        Text(String),
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let n = match Option::<Loose>::deserialize(deserializer)? {
            None => 0.0,
            Some(Loose::Num(n)) => n,
            Some(Loose::Bool(b)) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Loose::Text(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>()
                        .map_err(|_| D::Error::custom(format!("not a number: {:?}", s)))?
                }
            }
        };
        // NaN and infinities would poison every running sum they enter
        if !n.is_finite() {
            return Err(D::Error::custom(format!("not a finite number: {}", n)));
        }
        Ok(n)
    }

    /// `1` (in any of the accepted numeric spellings) or `true` means set.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        number(deserializer).map(|n| n == 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_field_types() {
        let json = r#"{
            "origin": "JFK", "dest": "LAX", "unique_carrier": "AA",
            "day_of_week": "3", "dep_delay": "-4", "distance": 2475, "cancelled": "0"
        }"#;
        let flight: Flight = serde_json::from_str(json).unwrap();

        assert_eq!("JFK", &*flight.origin);
        assert_eq!("LAX", &*flight.destination);
        assert_eq!("AA", &*flight.carrier);
        assert_eq!(Weekday::Wed, flight.day_of_week);
        assert_eq!(-4.0, flight.dep_delay);
        assert_eq!(2475.0, flight.distance);
        assert!(!flight.cancelled);
    }

    #[test]
    fn test_cancelled_flight_with_null_delay() {
        let json = r#"{
            "origin": "JFK", "dest": "BOS", "unique_carrier": "B6",
            "day_of_week": 7, "dep_delay": null, "distance": "", "cancelled": 1
        }"#;
        let flight: Flight = serde_json::from_str(json).unwrap();

        assert_eq!(0.0, flight.dep_delay);
        assert_eq!(0.0, flight.distance);
        assert!(flight.cancelled);
    }

    #[test]
    fn test_missing_optional_fields_default_to_zero() {
        let json = r#"{"origin": "JFK", "dest": "BOS", "unique_carrier": "B6", "day_of_week": 1}"#;
        let flight: Flight = serde_json::from_str(json).unwrap();

        assert_eq!(0.0, flight.dep_delay);
        assert!(!flight.cancelled);
    }

    #[test]
    fn test_rejects_garbage_delay() {
        let json = r#"{
            "origin": "JFK", "dest": "BOS", "unique_carrier": "B6",
            "day_of_week": 1, "dep_delay": "late"
        }"#;
        assert!(serde_json::from_str::<Flight>(json).is_err());
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        for text in ["NaN", "inf", "-infinity"] {
            let json = format!(
                r#"{{"origin": "JFK", "dest": "BOS", "unique_carrier": "B6", "day_of_week": 1, "dep_delay": "{}"}}"#,
                text
            );
            assert!(serde_json::from_str::<Flight>(&json).is_err(), "accepted {}", text);
        }
        let json = r#"{"origin": "JFK", "dest": "BOS", "unique_carrier": "B6", "day_of_week": 1, "distance": "NaN"}"#;
        assert!(serde_json::from_str::<Flight>(json).is_err());
    }
}
