use crate::crossfilter::{Crossfilter, DimensionId};
use crate::flight::Flight;
use crate::weekday::Weekday;
use proptest::prelude::*;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn add_flight(
    flights: &mut Vec<Flight>,
    destination: &str,
    carrier: &str,
    day: u8,
    dep_delay: f64,
    distance: f64,
    cancelled: bool,
) {
    flights.push(Flight {
        origin: id("JFK"),
        destination: id(destination),
        carrier: id(carrier),
        day_of_week: Weekday::from_number(day).unwrap(),
        dep_delay,
        distance,
        cancelled,
    });
}

pub struct Dims {
    pub dest: DimensionId,
    pub carrier: DimensionId,
    pub day: DimensionId,
}

pub fn index(flights: Vec<Flight>) -> (Crossfilter<Flight, String>, Dims) {
    let mut cf = Crossfilter::new(flights);
    let dest = cf.add_dimension("dest", |f: &Flight| f.destination.to_string());
    let carrier = cf.add_dimension("carrier", |f: &Flight| f.carrier.to_string());
    let day = cf.add_dimension("day", |f: &Flight| f.day_of_week.to_string());
    (cf, Dims { dest, carrier, day })
}

pub fn arb_code(prefix: &'static str) -> impl Strategy<Value = Arc<str>> {
    prop_oneof![
        Just(Arc::from(format!("{}1", prefix))),
        Just(Arc::from(format!("{}2", prefix))),
        Just(Arc::from(format!("{}3", prefix))),
    ]
}

pub fn arb_flight() -> impl Strategy<Value = Flight> {
    (
        arb_code("AP"),
        arb_code("CX"),
        1..=7u8,
        -30..300i32,
        100..3000u32,
        any::<bool>(),
    )
        .prop_map(|(dst, carrier, day, delay, distance, cancelled)| Flight {
            origin: id("JFK"),
            destination: dst,
            carrier,
            day_of_week: Weekday::from_number(day).unwrap(),
            dep_delay: delay as f64,
            distance: distance as f64,
            cancelled,
        })
}
