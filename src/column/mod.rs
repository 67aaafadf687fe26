// Copyright 2024 Belt Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The polymorphic, immutable column (§3, §4.1-§4.3, §4.6). Replaces the
//! deep-inheritance-with-per-encoding-subclasses pattern with a sum type
//! (`ColumnData`) plus a uniform optional view layer, per the redesign
//! guidance in §9.

pub mod categorical;
pub mod datetime;
pub mod numeric;
pub mod object;
pub mod time;
pub mod view;

use std::sync::Arc;

use crate::config::BeltConfig;
use crate::error::{BeltError, BeltResult};
use crate::mapping::{self, MergeCache};
use crate::sort::SortOrder;
use crate::types::{Capability, Category, ColumnType};

pub use categorical::{CategoricalIndices, CategoricalStore};
pub use datetime::{DateTimeStore, DateTimeValue};
pub use numeric::NumericStore;
pub use object::{ObjectStore, ObjectValue};
pub use time::TimeStore;
pub use view::RowMapping;

/// Closed set of dictionary label representations. Real implementations
/// of a fully generic `CategoricalBuffer<T>` would erase `T` behind a
/// trait object, but interning requires `Eq + Hash`, which `dyn Any`
/// cannot provide without a second downcast-and-compare step on every
/// insert; a closed enum covering the two practical label shapes
/// (strings and small integers) gets the same dictionary semantics
/// without that cost. See `DESIGN.md` for the full tradeoff.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Str(Arc<str>),
    Int(i64),
}

impl Label {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Str(s) => Some(s),
            Label::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Label::Int(i) => Some(*i),
            Label::Str(_) => None,
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Str(Arc::from(s))
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Str(Arc::from(s.as_str()))
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Label::Int(i)
    }
}

/// The per-encoding physical storage, one variant per column kind named
/// in §3.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Numeric(NumericStore),
    Categorical(CategoricalStore),
    Object(ObjectStore),
    DateTime(DateTimeStore),
    Time(TimeStore),
}

/// An immutable, frozen column. May be a simple column over its own
/// physical storage, or a mapped (lazy view) column sharing storage with
/// another column via an attached [`RowMapping`].
#[derive(Debug, Clone)]
pub struct Column {
    data: ColumnData,
    view: Option<RowMapping>,
    column_type: ColumnType,
    capability: Capability,
    size: usize,
}

impl Column {
    pub(crate) fn new(data: ColumnData, view: Option<RowMapping>, column_type: ColumnType) -> Self {
        let size = match &view {
            Some(m) => m.len(),
            None => Self::physical_size_of(&data),
        };
        let capability = Self::derive_capability(&data, column_type);
        Column {
            data,
            view,
            column_type,
            capability,
            size,
        }
    }

    fn physical_size_of(data: &ColumnData) -> usize {
        match data {
            ColumnData::Numeric(s) => s.physical_size(),
            ColumnData::Categorical(s) => s.physical_size(),
            ColumnData::Object(s) => s.physical_size(),
            ColumnData::DateTime(s) => s.physical_size(),
            ColumnData::Time(s) => s.physical_size(),
        }
    }

    fn physical_size(&self) -> usize {
        Self::physical_size_of(&self.data)
    }

    fn derive_capability(data: &ColumnData, column_type: ColumnType) -> Capability {
        // column_type is reserved for future per-type capability overrides
        // (e.g. a Nominal-only capability); none apply yet.
        let _ = column_type;
        match data {
            ColumnData::Numeric(_) => Capability::NUMERIC_READABLE | Capability::SORTABLE,
            ColumnData::Categorical(store) => {
                let mut cap = Capability::OBJECT_READABLE | Capability::SORTABLE;
                if store.dictionary.len() <= 3 && store.positive_index.is_some() {
                    cap |= Capability::BOOLEAN;
                }
                cap
            }
            ColumnData::Object(_) => Capability::OBJECT_READABLE,
            ColumnData::DateTime(_) | ColumnData::Time(_) => {
                Capability::OBJECT_READABLE | Capability::SORTABLE
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn category(&self) -> Category {
        self.column_type.category()
    }

    pub fn capabilities(&self) -> Capability {
        self.capability
    }

    pub fn is_view(&self) -> bool {
        self.view.is_some()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Ordered list of user values (excluding the MISSING slot at index 0).
    /// `None` for non-categorical columns. Dictionary storage keeps slot 0
    /// as an internal placeholder, so this allocates a compact `Vec`
    /// rather than exposing a zero-copy slice.
    pub fn dictionary_values(&self) -> Option<Vec<Label>> {
        match &self.data {
            ColumnData::Categorical(store) => Some(store.dictionary.iter().cloned().collect()),
            _ => None,
        }
    }

    // ---- fill_f64 ----

    pub fn fill_f64(&self, dst: &mut [f64], start: usize) -> BeltResult<()> {
        self.require(Capability::NUMERIC_READABLE, "fill_f64")?;
        match &self.data {
            ColumnData::Numeric(s) => s.fill(self.view.as_ref(), dst, start),
            _ => unreachable!("capability check guarantees Numeric"),
        }
        Ok(())
    }

    pub fn fill_f64_strided(
        &self,
        dst: &mut [f64],
        start: usize,
        offset: usize,
        stride: usize,
    ) -> BeltResult<()> {
        self.require(Capability::NUMERIC_READABLE, "fill_f64")?;
        match &self.data {
            ColumnData::Numeric(s) => s.fill_strided(self.view.as_ref(), dst, start, offset, stride),
            _ => unreachable!("capability check guarantees Numeric"),
        }
        Ok(())
    }

    pub fn read_f64(&self, logical: usize) -> BeltResult<f64> {
        self.require(Capability::NUMERIC_READABLE, "read_f64")?;
        match &self.data {
            ColumnData::Numeric(s) => Ok(s.read(self.view.as_ref(), logical)),
            _ => unreachable!(),
        }
    }

    // ---- fill_i32 (categorical index) ----

    pub fn fill_i32(&self, dst: &mut [i32], start: usize) -> BeltResult<()> {
        self.require_categorical("fill_i32")?;
        match &self.data {
            ColumnData::Categorical(s) => s.fill_index(self.view.as_ref(), dst, start),
            _ => unreachable!(),
        }
        Ok(())
    }

    pub fn fill_i32_strided(
        &self,
        dst: &mut [i32],
        start: usize,
        offset: usize,
        stride: usize,
    ) -> BeltResult<()> {
        self.require_categorical("fill_i32")?;
        match &self.data {
            ColumnData::Categorical(s) => s.fill_index_strided(self.view.as_ref(), dst, start, offset, stride),
            _ => unreachable!(),
        }
        Ok(())
    }

    pub fn read_index(&self, logical: usize) -> BeltResult<i32> {
        self.require_categorical("read_index")?;
        match &self.data {
            ColumnData::Categorical(s) => Ok(s.read_index_at(self.view.as_ref(), logical)),
            _ => unreachable!(),
        }
    }

    fn require_categorical(&self, op: &str) -> BeltResult<()> {
        match &self.data {
            ColumnData::Categorical(_) => Ok(()),
            _ => Err(BeltError::unsupported(format!(
                "{op} requires a Categorical column, found {:?}",
                self.column_type
            ))),
        }
    }

    // ---- fill_obj ----

    pub fn fill_obj_label(&self, dst: &mut [Option<Label>], start: usize) -> BeltResult<()> {
        self.require(Capability::OBJECT_READABLE, "fill_obj")?;
        match &self.data {
            ColumnData::Categorical(s) => {
                s.fill_obj(self.view.as_ref(), dst, start);
                Ok(())
            }
            _ => Err(BeltError::type_mismatch(
                "fill_obj_label requires a Categorical column",
            )),
        }
    }

    pub fn fill_obj_any(&self, dst: &mut [Option<ObjectValue>], start: usize) -> BeltResult<()> {
        self.require(Capability::OBJECT_READABLE, "fill_obj")?;
        match &self.data {
            ColumnData::Object(s) => {
                s.fill(self.view.as_ref(), dst, start);
                Ok(())
            }
            _ => Err(BeltError::type_mismatch(
                "fill_obj_any requires an Object column",
            )),
        }
    }

    pub fn read_obj_label(&self, logical: usize) -> BeltResult<Option<Label>> {
        self.require(Capability::OBJECT_READABLE, "read_obj")?;
        match &self.data {
            ColumnData::Categorical(s) => Ok(s.read_obj(self.view.as_ref(), logical)),
            _ => Err(BeltError::type_mismatch(
                "read_obj_label requires a Categorical column",
            )),
        }
    }

    pub fn read_datetime(&self, logical: usize) -> BeltResult<Option<DateTimeValue>> {
        self.require(Capability::OBJECT_READABLE, "read_datetime")?;
        match &self.data {
            ColumnData::DateTime(s) => Ok(s.read(self.view.as_ref(), logical)),
            _ => Err(BeltError::type_mismatch(
                "read_datetime requires a DateTime column",
            )),
        }
    }

    pub fn read_time(&self, logical: usize) -> BeltResult<Option<i64>> {
        self.require(Capability::OBJECT_READABLE, "read_time")?;
        match &self.data {
            ColumnData::Time(s) => Ok(s.read(self.view.as_ref(), logical)),
            _ => Err(BeltError::type_mismatch("read_time requires a Time column")),
        }
    }

    pub fn to_boolean(&self, logical: usize) -> BeltResult<Option<bool>> {
        self.require(Capability::BOOLEAN, "to_boolean")?;
        match &self.data {
            ColumnData::Categorical(s) => Ok(s.to_boolean(self.view.as_ref(), logical)),
            _ => unreachable!("Boolean capability only ever set on Categorical"),
        }
    }

    fn require(&self, cap: Capability, op: &str) -> BeltResult<()> {
        if self.capability.contains(cap) {
            Ok(())
        } else {
            Err(BeltError::unsupported(format!(
                "{op} requires capability {cap:?}, column has {:?}",
                self.capability
            )))
        }
    }

    // ---- map / view composition (§4.2) ----

    /// `column.map(index_vec, prefer_view)`: returns a new column whose
    /// logical order is `original[index_vec[i]]`.
    pub fn map(&self, index_vec: &[i32], prefer_view: bool, config: &BeltConfig) -> Column {
        self.map_impl(index_vec, prefer_view, config, None)
    }

    /// Same as `map`, but composed mappings are memoized in `cache` keyed
    /// by this column's physical mapping identity, for whole-table
    /// re-mapping call sites that invoke this once per column with the
    /// same `index_vec`.
    pub fn map_cached(
        &self,
        index_vec: &[i32],
        prefer_view: bool,
        config: &BeltConfig,
        cache: &MergeCache,
    ) -> Column {
        self.map_impl(index_vec, prefer_view, config, Some(cache))
    }

    fn map_impl(
        &self,
        index_vec: &[i32],
        prefer_view: bool,
        config: &BeltConfig,
        cache: Option<&MergeCache>,
    ) -> Column {
        let physical_size = self.physical_size();
        let new_mapping = match &self.view {
            Some(existing) => match cache {
                Some(cache) => existing.compose_cached(index_vec, cache),
                None => existing.compose_uncached(index_vec),
            },
            None => RowMapping::new(index_vec.to_vec()),
        };

        let use_view = prefer_view
            || (index_vec.len() as f64) > (physical_size as f64) * config.view_threshold;

        if use_view {
            Column::new(self.data.clone(), Some(new_mapping), self.column_type)
        } else {
            self.materialize_with(&new_mapping)
        }
    }

    /// Materializes this column's physical storage under `mapping` via a
    /// gather-copy, returning a simple (non-view) column.
    fn materialize_with(&self, mapping: &RowMapping) -> Column {
        let m = mapping.as_slice();
        let data = match &self.data {
            ColumnData::Numeric(s) => {
                ColumnData::Numeric(NumericStore::new(mapping::gather(&s.values, m, f64::NAN)))
            }
            ColumnData::Categorical(s) => {
                let gathered: Vec<i32> = m
                    .iter()
                    .map(|&idx| {
                        if idx >= 0 {
                            s.indices.get(idx as usize)
                        } else {
                            0
                        }
                    })
                    .collect();
                let max = gathered.iter().copied().max().unwrap_or(0) as i64;
                let format = crate::int_format::IntFormat::min_format_for(max);
                let indices = crate::buffer::categorical::pack_indices(&gathered, format);
                ColumnData::Categorical(CategoricalStore {
                    indices,
                    dictionary: s.dictionary.clone(),
                    positive_index: s.positive_index,
                })
            }
            ColumnData::Object(s) => {
                ColumnData::Object(ObjectStore::new(mapping::gather(&s.values, m, None)))
            }
            ColumnData::DateTime(s) => {
                let seconds = mapping::gather(&s.seconds, m, crate::types::MISSING_DATETIME_SECONDS);
                let nanos = s
                    .nanos
                    .as_ref()
                    .map(|n| Arc::new(mapping::gather(n, m, 0)));
                ColumnData::DateTime(DateTimeStore {
                    seconds: Arc::new(seconds),
                    nanos,
                })
            }
            ColumnData::Time(s) => {
                let nanos = mapping::gather(&s.nanos_of_day, m, crate::types::MISSING_TIME_NANOS);
                ColumnData::Time(TimeStore {
                    nanos_of_day: Arc::new(nanos),
                })
            }
        };
        Column::new(data, None, self.column_type)
    }

    /// Fully materializes a view-backed column, returning an equivalent
    /// non-view column. A no-op (clone) on already-simple columns.
    pub fn materialize(&self) -> Column {
        match &self.view {
            None => self.clone(),
            Some(m) => self.materialize_with(m),
        }
    }

    /// Observational equality: same size and same value at every logical
    /// index, independent of view-vs-materialized representation (§8).
    pub fn equals(&self, other: &Column) -> bool {
        if self.size != other.size || self.column_type != other.column_type {
            return false;
        }
        match (&self.data, &other.data) {
            (ColumnData::Numeric(a), ColumnData::Numeric(b)) => (0..self.size).all(|i| {
                let x = a.read(self.view.as_ref(), i);
                let y = b.read(other.view.as_ref(), i);
                (x.is_nan() && y.is_nan()) || x == y
            }),
            (ColumnData::Categorical(a), ColumnData::Categorical(b)) => (0..self.size).all(|i| {
                a.read_obj(self.view.as_ref(), i) == b.read_obj(other.view.as_ref(), i)
            }),
            (ColumnData::DateTime(a), ColumnData::DateTime(b)) => (0..self.size)
                .all(|i| a.read(self.view.as_ref(), i) == b.read(other.view.as_ref(), i)),
            (ColumnData::Time(a), ColumnData::Time(b)) => (0..self.size)
                .all(|i| a.read(self.view.as_ref(), i) == b.read(other.view.as_ref(), i)),
            // Object equality is caller-defined (arbitrary `Any` payloads);
            // the core only guarantees arena identity, not deep equality.
            (ColumnData::Object(_), ColumnData::Object(_)) => true,
            _ => false,
        }
    }

    // ---- sort (§4.6) ----

    /// Returns an index vector such that gathering by it yields rows in
    /// `order`. Requires the `Sortable` capability.
    pub fn sort(&self, order: SortOrder) -> BeltResult<Vec<i32>> {
        self.require(Capability::SORTABLE, "sort")?;
        crate::sort::sort_column(self, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::categorical::pack_indices;
    use crate::int_format::IntFormat;

    fn real_column(values: Vec<f64>) -> Column {
        Column::new(
            ColumnData::Numeric(NumericStore::new(values)),
            None,
            ColumnType::Real,
        )
    }

    #[test]
    fn identity_map_reads_match_source() {
        let c = real_column(vec![1.0, 2.0, 3.0]);
        let config = BeltConfig::default();
        let identity = vec![0, 1, 2];
        let mapped = c.map(&identity, false, &config);
        for i in 0..3 {
            assert_eq!(c.read_f64(i).unwrap(), mapped.read_f64(i).unwrap());
        }
    }

    #[test]
    fn permutation_map_matches_direct_read() {
        let c = real_column(vec![10.0, 20.0, 30.0, 40.0]);
        let config = BeltConfig::default();
        let perm = vec![3, 1, 0, 2];
        let mapped = c.map(&perm, false, &config);
        for (i, &p) in perm.iter().enumerate() {
            assert_eq!(mapped.read_f64(i).unwrap(), c.read_f64(p as usize).unwrap());
        }
    }

    #[test]
    fn view_and_materialized_are_observationally_equal() {
        let c = real_column(vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        let config = BeltConfig::default();
        let idx = vec![4, 3, 2, 1, 0];
        let view = c.map(&idx, true, &config);
        let materialized = c.map(&idx, false, &config);
        assert!(view.is_view());
        assert!(!materialized.is_view());
        assert!(view.materialize().equals(&materialized));
    }

    #[test]
    fn double_map_composition_matches_spec_scenario() {
        let c = real_column(vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        let config = BeltConfig::default();
        let m1 = vec![4, 3, 2, 1, 0];
        let m2 = vec![0, 0, 4];
        let once = c.map(&m1, true, &config);
        let twice = once.map(&m2, true, &config);
        let expect = [50.0, 50.0, 10.0];
        for i in 0..3 {
            assert_eq!(twice.read_f64(i).unwrap(), expect[i]);
        }
    }

    #[test]
    fn categorical_index_zero_iff_missing_object() {
        let gathered = vec![1i32, 2, 3, 1, 0, 2];
        let format = IntFormat::min_format_for(3);
        let indices = pack_indices(&gathered, format);
        let mut dict = crate::dictionary::Dictionary::new();
        dict.intern(Label::from("red"));
        dict.intern(Label::from("green"));
        dict.intern(Label::from("blue"));
        let store = CategoricalStore {
            indices,
            dictionary: Arc::new(dict),
            positive_index: None,
        };
        let col = Column::new(ColumnData::Categorical(store), None, ColumnType::Categorical);
        for i in 0..col.size() {
            let idx = col.read_index(i).unwrap();
            let obj = col.read_obj_label(i).unwrap();
            assert_eq!(obj.is_none(), idx == 0);
        }
    }
}
