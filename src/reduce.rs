//! Incremental per-group statistics.
//!
//! Every accumulator here supports `add` and its exact inverse `remove`, so a
//! group can follow a changing filter selection without being rebuilt.

use crate::flight::Flight;
use std::fmt::Debug;

/// Drives an accumulator from the dimensional index.
pub trait Reducer<R> {
    type Acc: Clone + Debug + PartialEq;

    fn initial(&self) -> Self::Acc;
    fn add(&self, acc: &mut Self::Acc, record: &R);
    fn remove(&self, acc: &mut Self::Acc, record: &R);
}

fn average(total: f64, count: u64) -> Option<f64> {
    (count > 0).then(|| total / count as f64)
}

/// Departure delay tally for one destination or carrier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DelayStats {
    pub count: u64,
    pub cumulative_delay: f64,
    /// `None` while the group holds no flights.
    pub average_delay: Option<f64>,
    pub cancelled: u64,
}

impl DelayStats {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flight: &Flight) {
        self.count += 1;
        self.cumulative_delay += flight.dep_delay;
        self.average_delay = average(self.cumulative_delay, self.count);
        if flight.cancelled {
            self.cancelled += 1;
        }
    }

    pub fn remove(&mut self, flight: &Flight) {
        debug_assert!(self.count > 0, "remove from an empty delay group");
        self.count = self.count.saturating_sub(1);
        self.cumulative_delay -= flight.dep_delay;
        if self.count == 0 {
            // drop accumulated float residue along with the last flight
            self.cumulative_delay = 0.0;
        }
        self.average_delay = average(self.cumulative_delay, self.count);
        if flight.cancelled {
            debug_assert!(self.cancelled > 0, "remove of an uncounted cancellation");
            self.cancelled = self.cancelled.saturating_sub(1);
        }
    }
}

/// Distance tally for one destination.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceStats {
    pub count: u64,
    pub cumulative_distance: f64,
    pub average_distance: Option<f64>,
}

impl DistanceStats {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flight: &Flight) {
        self.count += 1;
        self.cumulative_distance += flight.distance;
        self.average_distance = average(self.cumulative_distance, self.count);
    }

    pub fn remove(&mut self, flight: &Flight) {
        debug_assert!(self.count > 0, "remove from an empty distance group");
        self.count = self.count.saturating_sub(1);
        self.cumulative_distance -= flight.distance;
        if self.count == 0 {
            self.cumulative_distance = 0.0;
        }
        self.average_distance = average(self.cumulative_distance, self.count);
    }
}

pub struct DelayReducer;
pub struct DistanceReducer;
pub struct CountReducer;

impl Reducer<Flight> for DelayReducer {
    type Acc = DelayStats;

    fn initial(&self) -> DelayStats {
        DelayStats::initial()
    }

    fn add(&self, acc: &mut DelayStats, record: &Flight) {
        acc.add(record)
    }

    fn remove(&self, acc: &mut DelayStats, record: &Flight) {
        acc.remove(record)
    }
}

impl Reducer<Flight> for DistanceReducer {
    type Acc = DistanceStats;

    fn initial(&self) -> DistanceStats {
        DistanceStats::initial()
    }

    fn add(&self, acc: &mut DistanceStats, record: &Flight) {
        acc.add(record)
    }

    fn remove(&self, acc: &mut DistanceStats, record: &Flight) {
        acc.remove(record)
    }
}

/// Plain record count, works for any record type.
impl<R> Reducer<R> for CountReducer {
    type Acc = u64;

    fn initial(&self) -> u64 {
        0
    }

    fn add(&self, acc: &mut u64, _record: &R) {
        *acc += 1;
    }

    fn remove(&self, acc: &mut u64, _record: &R) {
        debug_assert!(*acc > 0, "remove from an empty count group");
        *acc = acc.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::Weekday;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn flight(dep_delay: f64, cancelled: bool) -> Flight {
        Flight {
            origin: Arc::from("JFK"),
            destination: Arc::from("LAX"),
            carrier: Arc::from("AA"),
            day_of_week: Weekday::Mon,
            dep_delay,
            distance: 2475.0,
            cancelled,
        }
    }

    fn scenario() -> Vec<Flight> {
        vec![flight(10.0, false), flight(-5.0, true), flight(20.0, false)]
    }

    #[test]
    fn test_initial_is_empty() {
        let acc = DelayStats::initial();
        assert_eq!(0, acc.count);
        assert_eq!(0.0, acc.cumulative_delay);
        assert_eq!(None, acc.average_delay);
        assert_eq!(0, acc.cancelled);
    }

    #[test]
    fn test_add_three_flights() {
        let mut acc = DelayStats::initial();
        scenario().iter().for_each(|f| acc.add(f));

        assert_eq!(3, acc.count);
        assert_eq!(25.0, acc.cumulative_delay);
        assert!((acc.average_delay.unwrap() - 8.33).abs() < 0.01);
        assert_eq!(1, acc.cancelled);
    }

    #[test]
    fn test_remove_middle_flight() {
        let flights = scenario();
        let mut acc = DelayStats::initial();
        flights.iter().for_each(|f| acc.add(f));
        acc.remove(&flights[1]);

        assert_eq!(2, acc.count);
        assert_eq!(15.0, acc.cumulative_delay);
        assert_eq!(Some(7.5), acc.average_delay);
        assert_eq!(0, acc.cancelled);
    }

    #[test]
    fn test_remove_last_flight_has_no_average() {
        let f = flight(12.0, false);
        let mut acc = DelayStats::initial();
        acc.add(&f);
        acc.remove(&f);

        assert_eq!(DelayStats::initial(), acc);
    }

    #[test]
    fn test_distance_average() {
        let mut a = flight(0.0, false);
        a.distance = 100.0;
        let mut b = flight(0.0, false);
        b.distance = 300.0;

        let mut acc = DistanceStats::initial();
        acc.add(&a);
        acc.add(&b);
        assert_eq!(Some(200.0), acc.average_distance);

        acc.remove(&b);
        assert_eq!(Some(100.0), acc.average_distance);
        acc.remove(&a);
        assert_eq!(DistanceStats::initial(), acc);
    }

    #[test]
    fn test_count_reducer() {
        let f = flight(0.0, false);
        let mut acc = Reducer::<Flight>::initial(&CountReducer);
        CountReducer.add(&mut acc, &f);
        CountReducer.add(&mut acc, &f);
        CountReducer.remove(&mut acc, &f);
        assert_eq!(1, acc);
    }

    fn arb_flight() -> impl Strategy<Value = Flight> {
        (-120i32..600, 50u32..5000, any::<bool>()).prop_map(|(delay, distance, cancelled)| {
            let mut f = flight(delay as f64, cancelled);
            f.distance = distance as f64;
            f
        })
    }

    proptest! {
        #[test]
        fn test_add_then_remove_in_any_order_restores_initial(
            (flights, order) in prop::collection::vec(arb_flight(), 0..40)
                .prop_flat_map(|fs| {
                    let idx: Vec<usize> = (0..fs.len()).collect();
                    (Just(fs), Just(idx).prop_shuffle())
                })
        ) {
            let mut delay = DelayStats::initial();
            let mut distance = DistanceStats::initial();
            for f in &flights {
                delay.add(f);
                distance.add(f);
            }
            for i in order {
                delay.remove(&flights[i]);
                distance.remove(&flights[i]);
            }
            prop_assert_eq!(DelayStats::initial(), delay);
            prop_assert_eq!(DistanceStats::initial(), distance);
        }

        #[test]
        fn test_average_matches_cumulative_over_count(
            flights in prop::collection::vec(arb_flight(), 1..40)
        ) {
            let mut acc = DelayStats::initial();
            flights.iter().for_each(|f| acc.add(f));

            let expected = acc.cumulative_delay / acc.count as f64;
            let actual = acc.average_delay.unwrap();
            prop_assert!((expected - actual).abs() < 1e-9);
            prop_assert_eq!(flights.len() as u64, acc.count);
            prop_assert_eq!(flights.iter().filter(|f| f.cancelled).count() as u64, acc.cancelled);
        }

        #[test]
        fn test_remove_undoes_add(
            base in prop::collection::vec(arb_flight(), 1..20),
            extra in arb_flight()
        ) {
            let mut acc = DelayStats::initial();
            base.iter().for_each(|f| acc.add(f));
            let before = acc.clone();

            acc.add(&extra);
            acc.remove(&extra);

            prop_assert_eq!(before.count, acc.count);
            prop_assert_eq!(before.cumulative_delay, acc.cumulative_delay);
            prop_assert_eq!(before.cancelled, acc.cancelled);
            prop_assert!((before.average_delay.unwrap() - acc.average_delay.unwrap()).abs() < 1e-9);
        }
    }
}
