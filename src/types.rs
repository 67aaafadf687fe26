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

//! Column type tags, categories and capability flags (§3).

use bitflags::bitflags;

/// Tagged kind of a column, per the data model's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Real,
    Integer,
    Nominal,
    Categorical,
    DateTime,
    Time,
    Object,
}

/// Broad grouping of a column's physical representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Numeric,
    Categorical,
    Object,
}

impl ColumnType {
    pub fn category(self) -> Category {
        match self {
            ColumnType::Real | ColumnType::Integer => Category::Numeric,
            ColumnType::Nominal | ColumnType::Categorical => Category::Categorical,
            // DateTime/Time read through the object path (no faithful f64
            // encoding), matching the NumericReadable-withheld capability
            // `Column::derive_capability` gives them.
            ColumnType::DateTime | ColumnType::Time | ColumnType::Object => Category::Object,
        }
    }
}

bitflags! {
    /// Declarative capability tags controlling which read APIs are legal
    /// for a column (§3, §4.1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capability: u8 {
        const NUMERIC_READABLE = 0b0001;
        const OBJECT_READABLE  = 0b0010;
        const SORTABLE         = 0b0100;
        const BOOLEAN          = 0b1000;
    }
}

/// MISSING sentinel for dense `f64` numeric storage.
pub const MISSING_F64: f64 = f64::NAN;

/// MISSING sentinel for packed/wide categorical index storage. Used
/// uniformly across all packed widths including `Int32`, per §9's note
/// that Int32 wastes a value but gains uniformity.
pub const MISSING_CATEGORY_INDEX: i32 = 0;

/// MISSING sentinel for epoch-seconds date-time storage.
pub const MISSING_DATETIME_SECONDS: i64 = i64::MIN;

/// MISSING sentinel for nanos-of-day time storage.
pub const MISSING_TIME_NANOS: i64 = i64::MIN;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_mapping() {
        assert_eq!(ColumnType::Real.category(), Category::Numeric);
        assert_eq!(ColumnType::DateTime.category(), Category::Object);
        assert_eq!(ColumnType::Time.category(), Category::Object);
        assert_eq!(ColumnType::Categorical.category(), Category::Categorical);
        assert_eq!(ColumnType::Object.category(), Category::Object);
    }

    #[test]
    fn capability_bits_compose() {
        let c = Capability::NUMERIC_READABLE | Capability::SORTABLE;
        assert!(c.contains(Capability::SORTABLE));
        assert!(!c.contains(Capability::BOOLEAN));
    }
}
