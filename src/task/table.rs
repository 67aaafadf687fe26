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

//! A named, ordered set of equal-length columns — the unit `TableTask`
//! operates over.

use crate::column::Column;
use crate::error::{ensure_arg, BeltResult};

#[derive(Debug, Clone)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(named_columns: Vec<(String, Column)>) -> BeltResult<Self> {
        ensure_arg(!named_columns.is_empty(), "a table requires at least one column")?;
        let size = named_columns[0].1.size();
        ensure_arg(
            named_columns.iter().all(|(_, c)| c.size() == size),
            "all columns of a table must have equal size",
        )?;
        let mut seen = std::collections::HashSet::new();
        for (name, _) in &named_columns {
            ensure_arg(seen.insert(name.clone()), format!("duplicate column name {name}"))?;
        }
        let (names, columns) = named_columns.into_iter().unzip();
        Ok(Table { names, columns })
    }

    pub fn size(&self) -> usize {
        self.columns.first().map(|c| c.size()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names.iter().position(|n| n == name).map(|i| &self.columns[i])
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnData, NumericStore};
    use crate::types::ColumnType;

    fn real_column(values: Vec<f64>) -> Column {
        Column::new(ColumnData::Numeric(NumericStore::new(values)), None, ColumnType::Real)
    }

    #[test]
    fn looks_up_columns_by_name() {
        let table = Table::new(vec![
            ("a".to_string(), real_column(vec![1.0, 2.0])),
            ("b".to_string(), real_column(vec![3.0, 4.0])),
        ])
        .unwrap();
        assert_eq!(table.size(), 2);
        assert!(table.column("a").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn rejects_mismatched_sizes() {
        let err = Table::new(vec![
            ("a".to_string(), real_column(vec![1.0, 2.0])),
            ("b".to_string(), real_column(vec![3.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, crate::error::BeltError::BadArgument(_)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            ("a".to_string(), real_column(vec![1.0])),
            ("a".to_string(), real_column(vec![2.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, crate::error::BeltError::BadArgument(_)));
    }
}
