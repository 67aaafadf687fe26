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

//! Single- and multi-key sort (§4.6). Returns index vectors rather than
//! reordering data, consistent with the rest of the lazy-view model:
//! gathering a column by the returned vector yields the requested order.

use std::cmp::Ordering;

use crate::column::{Column, ColumnData, DateTimeValue, Label};
use crate::error::{ensure_arg, BeltError, BeltResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Orders `Some(a)` vs `Some(b)` by `cmp`, flipped for `Descending`, while
/// always placing `None` last regardless of direction.
fn compare_missing_last<T>(a: &Option<T>, b: &Option<T>, order: SortOrder, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let base = cmp(x, y);
            match order {
                SortOrder::Ascending => base,
                SortOrder::Descending => base.reverse(),
            }
        }
    }
}

fn f64_as_option(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

fn sort_indices_by<T>(n: usize, key: impl Fn(usize) -> T, cmp: impl Fn(&T, &T) -> Ordering) -> Vec<i32> {
    let keys: Vec<T> = (0..n).map(key).collect();
    let mut idx: Vec<i32> = (0..n as i32).collect();
    idx.sort_by(|&a, &b| cmp(&keys[a as usize], &keys[b as usize]));
    idx
}

/// `column.sort(order)`: produces an index vector such that gathering the
/// column by it yields rows in `order`.
pub fn sort_column(column: &Column, order: SortOrder) -> BeltResult<Vec<i32>> {
    let n = column.size();
    match column.data() {
        ColumnData::Numeric(_) => Ok(sort_indices_by(
            n,
            |i| f64_as_option(column.read_f64(i).expect("NumericReadable checked by caller")),
            |a, b| compare_missing_last(a, b, order, |x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal)),
        )),
        ColumnData::Categorical(_) => Ok(sort_indices_by(
            n,
            |i| column.read_obj_label(i).expect("ObjectReadable checked by caller"),
            |a, b| compare_missing_last(a, b, order, |x: &Label, y: &Label| x.cmp(y)),
        )),
        ColumnData::DateTime(_) => Ok(sort_indices_by(
            n,
            |i| column.read_datetime(i).expect("ObjectReadable checked by caller"),
            |a, b| compare_missing_last(a, b, order, |x: &DateTimeValue, y: &DateTimeValue| x.cmp(y)),
        )),
        ColumnData::Time(_) => Ok(sort_indices_by(
            n,
            |i| column.read_time(i).expect("ObjectReadable checked by caller"),
            |a, b| compare_missing_last(a, b, order, |x: &i64, y: &i64| x.cmp(y)),
        )),
        ColumnData::Object(_) => Err(BeltError::unsupported("Object columns are not Sortable")),
    }
}

/// Per-column decoded sort key, extracted once up front so the multi-key
/// comparator doesn't repeatedly re-dispatch through `Column`.
enum KeyColumn {
    F64(Vec<Option<f64>>),
    Label(Vec<Option<Label>>),
    DateTime(Vec<Option<DateTimeValue>>),
    Time(Vec<Option<i64>>),
}

fn extract_keys(column: &Column) -> BeltResult<KeyColumn> {
    let n = column.size();
    Ok(match column.data() {
        ColumnData::Numeric(_) => {
            KeyColumn::F64((0..n).map(|i| f64_as_option(column.read_f64(i).unwrap())).collect())
        }
        ColumnData::Categorical(_) => {
            KeyColumn::Label((0..n).map(|i| column.read_obj_label(i).unwrap()).collect())
        }
        ColumnData::DateTime(_) => {
            KeyColumn::DateTime((0..n).map(|i| column.read_datetime(i).unwrap()).collect())
        }
        ColumnData::Time(_) => KeyColumn::Time((0..n).map(|i| column.read_time(i).unwrap()).collect()),
        ColumnData::Object(_) => return Err(BeltError::unsupported("Object columns are not Sortable")),
    })
}

fn compare_key_column(keys: &KeyColumn, a: usize, b: usize, order: SortOrder) -> Ordering {
    match keys {
        KeyColumn::F64(v) => compare_missing_last(&v[a], &v[b], order, |x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal)),
        KeyColumn::Label(v) => compare_missing_last(&v[a], &v[b], order, |x, y| x.cmp(y)),
        KeyColumn::DateTime(v) => compare_missing_last(&v[a], &v[b], order, |x, y| x.cmp(y)),
        KeyColumn::Time(v) => compare_missing_last(&v[a], &v[b], order, |x, y| x.cmp(y)),
    }
}

/// Multi-key sort over a set of columns (§4.6): stable-by-key, each
/// subsequent key refines only within equal-value runs of prior keys.
/// All participating columns must be `Sortable` and have equal `size()`,
/// and `columns.len()` must equal `orders.len()`.
pub fn multi_key_sort(columns: &[&Column], orders: &[SortOrder]) -> BeltResult<Vec<i32>> {
    ensure_arg(!columns.is_empty(), "multi-key sort requires at least one column")?;
    ensure_arg(
        columns.len() == orders.len(),
        "sort order count must match column count",
    )?;
    let n = columns[0].size();
    ensure_arg(
        columns.iter().all(|c| c.size() == n),
        "all sort columns must have equal size",
    )?;
    for c in columns {
        ensure_arg(
            c.capabilities().contains(crate::types::Capability::SORTABLE),
            "all sort columns must be Sortable",
        )?;
    }

    let key_columns: Vec<KeyColumn> = columns
        .iter()
        .map(|c| extract_keys(c))
        .collect::<BeltResult<_>>()?;

    let mut idx: Vec<i32> = (0..n as i32).collect();
    idx.sort_by(|&a, &b| {
        for (key_col, &order) in key_columns.iter().zip(orders) {
            let ord = compare_key_column(key_col, a as usize, b as usize, order);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnData, NumericStore};
    use crate::types::ColumnType;

    fn real_column(values: Vec<f64>) -> Column {
        Column::new(
            ColumnData::Numeric(NumericStore::new(values)),
            None,
            ColumnType::Real,
        )
    }

    #[test]
    fn numeric_sort_places_nan_last_regardless_of_order() {
        let c = real_column(vec![3.0, f64::NAN, 1.0, 2.0]);
        let asc = sort_column(&c, SortOrder::Ascending).unwrap();
        assert_eq!(asc, vec![2, 3, 0, 1]);
        let desc = sort_column(&c, SortOrder::Descending).unwrap();
        assert_eq!(desc, vec![0, 3, 2, 1]);
    }

    #[test]
    fn multi_key_sort_matches_spec_scenario() {
        let k1 = real_column(vec![2.0, 1.0, 2.0, 1.0]);
        let k2 = real_column(vec![20.0, 10.0, 10.0, 20.0]);
        let order = multi_key_sort(&[&k1, &k2], &[SortOrder::Ascending, SortOrder::Ascending]).unwrap();
        assert_eq!(order, vec![1, 3, 2, 0]);
        let gathered_k2: Vec<f64> = order.iter().map(|&i| k2.read_f64(i as usize).unwrap()).collect();
        assert_eq!(gathered_k2, vec![10.0, 20.0, 10.0, 20.0]);
    }

    #[test]
    fn mismatched_order_count_is_bad_argument() {
        let k1 = real_column(vec![1.0, 2.0]);
        let err = multi_key_sort(&[&k1], &[SortOrder::Ascending, SortOrder::Descending]).unwrap_err();
        assert!(matches!(err, BeltError::BadArgument(_)));
    }
}
