use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Day of week as carried by the on-time dataset: 1 = Monday .. 7 = Sunday.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, PartialOrd, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn from_number(n: u8) -> Option<Weekday> {
        n.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Accepts either the label (`mon`, `Tue`) or the dataset number (`1`..`7`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return Weekday::from_number(n).ok_or_else(|| format!("day number out of range: {}", n));
        }
        Self::ALL
            .iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown day: {}", s))
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = crate::flight::coerce::number(deserializer)?;
        if n.fract() != 0.0 || !(1.0..=7.0).contains(&n) {
            return Err(serde::de::Error::custom(format!(
                "day_of_week must be 1..7, got {}",
                n
            )));
        }
        Ok(Self::ALL[n as usize - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Some(day), Weekday::from_number(day.number()));
        }
        assert_eq!(None, Weekday::from_number(0));
        assert_eq!(None, Weekday::from_number(8));
    }

    #[test]
    fn test_parse_label_and_number() {
        assert_eq!(Ok(Weekday::Wed), "wed".parse());
        assert_eq!(Ok(Weekday::Sun), "7".parse());
        assert!("funday".parse::<Weekday>().is_err());
        assert!("0".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_deserialize_from_string_or_number() {
        let days: Vec<Weekday> = serde_json::from_str(r#"[1, "5", 7.0]"#).unwrap();
        assert_eq!(vec![Weekday::Mon, Weekday::Fri, Weekday::Sun], days);
        assert!(serde_json::from_str::<Weekday>("9").is_err());
        assert!(serde_json::from_str::<Weekday>("2.5").is_err());
    }
}
