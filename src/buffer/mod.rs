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

//! Mutable write-once staging containers that freeze into columns (§3,
//! §4.3, §6). Each concrete buffer owns its storage exclusively until
//! `to_column()`, after which it becomes immutable and further writes
//! fail with a `State`-kind error.

pub mod categorical;
pub mod datetime;
pub mod object;
pub mod real;
pub mod time;

pub use categorical::CategoricalBuffer;
pub use datetime::{HighPrecisionDateTimeBuffer, LowPrecisionDateTimeBuffer};
pub use object::{FreeColumnBuffer, ObjectBuffer};
pub use real::{FixedIntegerBuffer, FixedRealBuffer};
pub use time::TimeColumnBuffer;

use crate::error::{BeltError, BeltResult};

/// Shared freeze-state bookkeeping used by every buffer kind.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FreezeGuard {
    frozen: bool,
}

impl FreezeGuard {
    pub(crate) fn ensure_writable(&self) -> BeltResult<()> {
        if self.frozen {
            Err(BeltError::state("write on a frozen buffer"))
        } else {
            Ok(())
        }
    }

    pub(crate) fn freeze(&mut self) -> BeltResult<()> {
        if self.frozen {
            Err(BeltError::state("buffer already frozen"))
        } else {
            self.frozen = true;
            Ok(())
        }
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }
}
