use crate::airport::Airport;

pub const DEFAULT_LIMIT: usize = 10;

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

/// Prefix search over airport name, IATA code and city.
///
/// Each airport is indexed by the whitespace tokens of those three fields. A
/// query matches when every one of its tokens starts some indexed token.
pub struct AirportSearch {
    tokens: Vec<Vec<String>>,
    limit: usize,
}

impl AirportSearch {
    pub fn new(airports: &[Airport], limit: usize) -> AirportSearch {
        let tokens = airports
            .iter()
            .map(|a| {
                let mut t: Vec<String> = tokenize(&a.name)
                    .chain(tokenize(&a.iata_code))
                    .chain(tokenize(&a.city))
                    .collect();
                t.sort();
                t.dedup();
                t
            })
            .collect();
        AirportSearch { tokens, limit }
    }

    /// Indices into the airport slice the search was built from, in slice
    /// order, at most `limit` of them.
    pub fn query(&self, query: &str) -> Vec<usize> {
        let terms: Vec<String> = tokenize(query).collect();
        if terms.is_empty() {
            return vec![];
        }
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, datum)| {
                terms
                    .iter()
                    .all(|term| datum.iter().any(|tok| tok.starts_with(term.as_str())))
            })
            .map(|(i, _)| i)
            .take(self.limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn airport(code: &str, name: &str, city: &str) -> Airport {
        Airport {
            iata_code: Arc::from(code),
            name: name.to_string(),
            city: city.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn airports() -> Vec<Airport> {
        vec![
            airport("JFK", "John F Kennedy International Airport", "New York"),
            airport("LGA", "La Guardia Airport", "New York"),
            airport("EWR", "Newark Liberty International Airport", "Newark"),
            airport("SFO", "San Francisco International Airport", "San Francisco"),
        ]
    }

    #[test]
    fn test_matches_code_name_and_city_prefixes() {
        let search = AirportSearch::new(&airports(), DEFAULT_LIMIT);

        assert_eq!(vec![0], search.query("jfk"));
        assert_eq!(vec![1], search.query("guard"));
        assert_eq!(vec![0, 1, 2], search.query("new"));
        assert_eq!(vec![0, 1], search.query("new york"));
        assert_eq!(vec![3], search.query("SAN fran"));
    }

    #[test]
    fn test_every_term_must_match() {
        let search = AirportSearch::new(&airports(), DEFAULT_LIMIT);
        assert!(search.query("new francisco").is_empty());
        assert!(search.query("ennedy").is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let search = AirportSearch::new(&airports(), DEFAULT_LIMIT);
        assert!(search.query("").is_empty());
        assert!(search.query("   ").is_empty());
    }

    #[test]
    fn test_limit() {
        let search = AirportSearch::new(&airports(), 2);
        assert_eq!(vec![0, 1], search.query("airport"));
    }
}
