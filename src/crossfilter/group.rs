use crate::crossfilter::{Crossfilter, DimensionId, FilterDelta, Mask};
use crate::reduce::Reducer;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Per-key accumulators over one dimension.
///
/// Keys stay in the group once seen, even when every record behind them is
/// filtered out; their accumulator then equals the reducer's initial value.
pub struct Group<R, K, Rd: Reducer<R>> {
    dimension: DimensionId,
    reducer: Rd,
    values: BTreeMap<K, Rd::Acc>,
    _record: PhantomData<fn(&R)>,
}

impl<R, K: Ord + Clone, Rd: Reducer<R>> Group<R, K, Rd> {
    pub fn new(crossfilter: &Crossfilter<R, K>, dimension: DimensionId, reducer: Rd) -> Self {
        let mut values = BTreeMap::new();
        let ignore = !dimension.bit();
        for (i, record) in crossfilter.records().iter().enumerate() {
            let acc = values
                .entry(crossfilter.key(dimension, i).clone())
                .or_insert_with(|| reducer.initial());
            if crossfilter.mask(i) & ignore == 0 {
                reducer.add(acc, record);
            }
        }
        Group {
            dimension,
            reducer,
            values,
            _record: PhantomData,
        }
    }

    fn visible(&self, mask: Mask) -> bool {
        mask & !self.dimension.bit() == 0
    }

    /// Replays a filter delta: records entering this group's view are added,
    /// records leaving it are removed. Deltas from the group's own dimension
    /// are ignored.
    pub fn apply(&mut self, crossfilter: &Crossfilter<R, K>, delta: &FilterDelta) {
        if delta.dimension == self.dimension {
            return;
        }
        for change in &delta.changes {
            let before = self.visible(change.before);
            let after = self.visible(change.after);
            if before == after {
                continue;
            }
            let record = &crossfilter.records()[change.record];
            let key = crossfilter.key(self.dimension, change.record);
            let Some(acc) = self.values.get_mut(key) else {
                continue;
            };
            if after {
                self.reducer.add(acc, record);
            } else {
                self.reducer.remove(acc, record);
            }
        }
    }

    /// All keys in key order.
    pub fn all(&self) -> impl Iterator<Item = (&K, &Rd::Acc)> {
        self.values.iter()
    }

    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<&Rd::Acc> {
        self.values.get(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Entries ordered by descending `value`, keys without a value last, ties
    /// by ascending key.
    pub fn sorted_desc<F>(&self, value: F) -> Vec<(&K, &Rd::Acc)>
    where
        F: Fn(&Rd::Acc) -> Option<f64>,
    {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|(ka, a), (kb, b)| {
            let by_value = match (value(a), value(b)) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| ka.cmp(kb))
        });
        entries
    }
}
