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

//! Elementwise `apply`: one output cell per input row, independent of its
//! neighbors, which makes it the simplest `Calculator` to parallelize —
//! every batch writes its own disjoint slice of the output.

use std::cell::UnsafeCell;

use crate::calculator::{Calculator, SyncSlicePtr};
use crate::error::BeltResult;

/// Rounds half away from zero, i.e. `2.5 -> 3.0` and `-2.5 -> -3.0`,
/// matching the Integer-target rounding rule a numeric-to-categorical or
/// numeric-to-integer `apply` uses instead of `f64::round`'s
/// ties-away-from-zero-but-platform-dependent behavior for subnormal
/// inputs.
pub fn round_half_away_from_zero(v: f64) -> f64 {
    if v.is_nan() {
        v
    } else {
        v.trunc() + (v.fract().abs() >= 0.5) as i32 as f64 * v.signum()
    }
}

/// Applies `f` to every index in `0..n`, writing one `T` per row — the
/// `apply<srcCategory>To<dstKind>` matrix collapses to this single
/// generic body with a per-row-shape reader feeding `f` (§9). `f`
/// returning `Err` for any row fails the whole operation once all
/// in-flight batches finish (partial results from other batches are
/// discarded).
pub struct ApplyCalculator<T, F> {
    n: usize,
    f: F,
    output: UnsafeCell<Vec<T>>,
}

unsafe impl<T: Send, F: Sync> Sync for ApplyCalculator<T, F> {}

impl<T, F> ApplyCalculator<T, F>
where
    T: Default + Clone + Send,
    F: Fn(usize) -> BeltResult<T> + Send + Sync,
{
    pub fn new(n: usize, f: F) -> Self {
        ApplyCalculator {
            n,
            f,
            output: UnsafeCell::new(Vec::new()),
        }
    }
}

impl<T, F> Calculator for ApplyCalculator<T, F>
where
    T: Default + Clone + Send + Sync,
    F: Fn(usize) -> BeltResult<T> + Send + Sync,
{
    type Output = Vec<T>;

    fn init(&self, _num_batches: usize) {
        // SAFETY: `init` runs before any `do_part`, single-threaded.
        unsafe {
            *self.output.get() = vec![T::default(); self.n];
        }
    }

    fn num_operations(&self) -> usize {
        self.n
    }

    fn do_part(&self, from: usize, to: usize, _batch_index: usize) -> BeltResult<()> {
        // SAFETY: the planner hands out disjoint [from, to) ranges across
        // concurrent calls, so this slice never overlaps another's.
        let slice = unsafe {
            let out = &mut *self.output.get();
            SyncSlicePtr::new(out).slice_mut(from, to)
        };
        for (offset, cell) in slice.iter_mut().enumerate() {
            *cell = (self.f)(from + offset)?;
        }
        Ok(())
    }

    fn result(&self) -> Vec<T> {
        // SAFETY: called after every `do_part` has returned, no writers left.
        unsafe { (*self.output.get()).clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeltConfig;
    use crate::executor::{run_calculator, ExecutionContext, Workload};

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_half_away_from_zero(2.5), 3.0);
        assert_eq!(round_half_away_from_zero(-2.5), -3.0);
        assert_eq!(round_half_away_from_zero(2.4), 2.0);
        assert_eq!(round_half_away_from_zero(-2.4), -2.0);
    }

    #[test]
    fn apply_doubles_each_cell() {
        let calc = ApplyCalculator::new(8, |i| Ok((i as f64) * 2.0));
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let out = run_calculator(&calc, &ctx, Workload::LargePerCell, &config).unwrap();
        assert_eq!(out, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);
    }

    #[test]
    fn apply_propagates_row_errors() {
        let calc = ApplyCalculator::new(4, |i| {
            if i == 2 {
                Err(crate::error::BeltError::bad_argument("bad row"))
            } else {
                Ok(i as f64)
            }
        });
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let err = run_calculator(&calc, &ctx, Workload::TrivialPerCell, &config).unwrap_err();
        assert!(matches!(err, crate::error::BeltError::BadArgument(_)));
    }

    #[test]
    fn apply_to_non_f64_destination() {
        // A numeric -> Categorical apply: destination cells are dictionary
        // indices (i32), not the f64 the source rows read as.
        let calc: ApplyCalculator<i32, _> = ApplyCalculator::new(5, |i| Ok((i % 3) as i32));
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let out = run_calculator(&calc, &ctx, Workload::SmallPerCell, &config).unwrap();
        assert_eq!(out, vec![0, 1, 2, 0, 1]);
    }
}
