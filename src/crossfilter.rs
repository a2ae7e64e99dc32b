//! A small crossfilter: records, dimensions with optional key filters, and
//! groups kept in sync through filter deltas.
//!
//! Each record carries a bit mask; bit `d` is set while dimension `d`
//! filters the record out. A group bound to dimension `d` sees every record
//! whose mask is empty once its own bit is ignored, which is what lets a
//! chart keep showing its own bars after the user filters on it.

mod group;

pub use group::Group;

use std::collections::BTreeSet;

pub type Mask = u32;

pub const MAX_DIMENSIONS: usize = Mask::BITS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionId(usize);

impl DimensionId {
    pub fn bit(self) -> Mask {
        1 << self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskChange {
    pub record: usize,
    pub before: Mask,
    pub after: Mask,
}

/// Records whose filter mask changed after a filter operation on `dimension`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDelta {
    pub dimension: DimensionId,
    pub changes: Vec<MaskChange>,
}

#[cfg(test)]
impl FilterDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

struct Dimension<K> {
    name: &'static str,
    keys: Vec<K>,
    filter: Option<BTreeSet<K>>,
}

pub struct Crossfilter<R, K> {
    records: Vec<R>,
    masks: Vec<Mask>,
    dimensions: Vec<Dimension<K>>,
}

impl<R, K: Ord + Clone> Crossfilter<R, K> {
    pub fn new(records: Vec<R>) -> Self {
        let masks = vec![0; records.len()];
        Crossfilter {
            records,
            masks,
            dimensions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Computes the key of every record once; keys are never recomputed.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_DIMENSIONS`] dimensions are added.
    pub fn add_dimension<F>(&mut self, name: &'static str, key_fn: F) -> DimensionId
    where
        F: Fn(&R) -> K,
    {
        assert!(
            self.dimensions.len() < MAX_DIMENSIONS,
            "crossfilter supports at most {} dimensions",
            MAX_DIMENSIONS
        );
        let keys = self.records.iter().map(key_fn).collect();
        self.dimensions.push(Dimension {
            name,
            keys,
            filter: None,
        });
        DimensionId(self.dimensions.len() - 1)
    }

    #[cfg(test)]
    pub fn dimension(&self, name: &str) -> Option<DimensionId> {
        self.dimensions
            .iter()
            .position(|d| d.name == name)
            .map(DimensionId)
    }

    pub fn dimension_name(&self, dim: DimensionId) -> &'static str {
        self.dimensions[dim.0].name
    }

    pub fn key(&self, dim: DimensionId, record: usize) -> &K {
        &self.dimensions[dim.0].keys[record]
    }

    pub(crate) fn mask(&self, record: usize) -> Mask {
        self.masks[record]
    }

    /// Active key filter of a dimension, `None` when it selects everything.
    pub fn filters(&self, dim: DimensionId) -> Option<&BTreeSet<K>> {
        self.dimensions[dim.0].filter.as_ref()
    }

    /// Restricts `dim` to records whose key is in `keys`.
    pub fn filter<I>(&mut self, dim: DimensionId, keys: I) -> FilterDelta
    where
        I: IntoIterator<Item = K>,
    {
        self.dimensions[dim.0].filter = Some(keys.into_iter().collect());
        self.refilter(dim)
    }

    /// Clears the filter on `dim`.
    pub fn filter_all(&mut self, dim: DimensionId) -> FilterDelta {
        self.dimensions[dim.0].filter = None;
        self.refilter(dim)
    }

    /// Records passing every dimension's filter.
    pub fn selected(&self) -> impl Iterator<Item = &R> {
        self.records
            .iter()
            .zip(&self.masks)
            .filter(|(_, mask)| **mask == 0)
            .map(|(r, _)| r)
    }

    fn refilter(&mut self, dim: DimensionId) -> FilterDelta {
        let bit = dim.bit();
        let dimension = &self.dimensions[dim.0];
        let changes = self
            .masks
            .iter_mut()
            .zip(&dimension.keys)
            .enumerate()
            .filter_map(|(record, (mask, key))| {
                let excluded = dimension
                    .filter
                    .as_ref()
                    .is_some_and(|keys| !keys.contains(key));
                let before = *mask;
                let after = if excluded { before | bit } else { before & !bit };
                *mask = after;
                (before != after).then_some(MaskChange {
                    record,
                    before,
                    after,
                })
            })
            .collect();
        FilterDelta {
            dimension: dim,
            changes,
        }
    }
}
