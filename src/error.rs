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

//! Error kinds for the Belt column core, one variant per failure kind in
//! the error handling design: `BadArgument`, `OutOfRange`, `Unsupported`,
//! `TypeMismatch`, `State`, `Aborted`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BeltError {
    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("illegal state: {0}")]
    State(String),

    #[error("aborted: {0}")]
    Aborted(String),
}

pub type BeltResult<T> = Result<T, BeltError>;

impl BeltError {
    pub fn bad_argument(msg: impl Into<String>) -> Self {
        BeltError::BadArgument(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        BeltError::OutOfRange(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        BeltError::Unsupported(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        BeltError::TypeMismatch(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        BeltError::State(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        BeltError::Aborted(msg.into())
    }

    /// `Aborted` preempts all other pending errors of the same operation (§7).
    pub fn combine_preferring_abort(self, other: Self) -> Self {
        match (&self, &other) {
            (BeltError::Aborted(_), _) => self,
            (_, BeltError::Aborted(_)) => other,
            _ => self,
        }
    }
}

/// Validates eagerly at an API boundary; fails fast before any batch work
/// is submitted.
pub fn ensure_arg(cond: bool, msg: impl Into<String>) -> BeltResult<()> {
    if cond {
        Ok(())
    } else {
        Err(BeltError::bad_argument(msg))
    }
}

pub fn ensure_in_range(cond: bool, msg: impl Into<String>) -> BeltResult<()> {
    if cond {
        Ok(())
    } else {
        Err(BeltError::out_of_range(msg))
    }
}

pub fn ensure_capability(cond: bool, msg: impl Into<String>) -> BeltResult<()> {
    if cond {
        Ok(())
    } else {
        Err(BeltError::unsupported(msg))
    }
}
