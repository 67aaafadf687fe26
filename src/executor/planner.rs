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

//! Batch planning and dispatch (§4.4 steps 1-5).
//!
//! 1. Below `config.sequential_threshold(workload)` total operations, run
//!    on the calling thread; spinning up the pool would cost more than it
//!    saves.
//! 2. Otherwise pick a batch size from `config.target_batch_cells`,
//!    clamped to `[min_batch, max_batch]`.
//! 3. Split `[0, num_operations)` into `K = ceil(N / batch_size)` disjoint
//!    ranges.
//! 4. Submit all `K` parts to the pool and join, checking
//!    `context.is_active()` between submission and join so a cancellation
//!    raised mid-flight short-circuits instead of waiting out every batch.
//! 5. Call `calculator.result()` once every part has returned.

use crate::calculator::Calculator;
use crate::config::BeltConfig;
use crate::error::{BeltError, BeltResult};
use crate::executor::{ExecutionContext, Workload};

/// Runs `calculator` over `[0, num_operations)`, sequentially or in
/// parallel batches depending on `workload` and `config`.
pub fn run_calculator<C: Calculator>(
    calculator: &C,
    context: &ExecutionContext,
    workload: Workload,
    config: &BeltConfig,
) -> BeltResult<C::Output> {
    let n = calculator.num_operations();
    if n == 0 {
        calculator.init(0);
        return Ok(calculator.result());
    }

    if !context.is_active() {
        return Err(BeltError::aborted("execution context already cancelled"));
    }

    let threshold = config.sequential_threshold(workload);
    if n <= threshold {
        calculator.init(1);
        calculator.do_part(0, n, 0)?;
        return Ok(calculator.result());
    }

    let batch_size = config
        .target_batch_cells(workload)
        .clamp(config.min_batch, config.max_batch);
    let num_batches = n.div_ceil(batch_size);
    calculator.init(num_batches);

    let ranges: Vec<(usize, usize, usize)> = (0..num_batches)
        .map(|b| {
            let from = b * batch_size;
            let to = (from + batch_size).min(n);
            (from, to, b)
        })
        .collect();

    let results: Vec<BeltResult<()>> = context.install(|| {
        use rayon::prelude::*;
        ranges
            .par_iter()
            .map(|&(from, to, batch_index)| {
                if !context.is_active() {
                    return Err(BeltError::aborted("execution cancelled"));
                }
                calculator.do_part(from, to, batch_index)
            })
            .collect()
    });

    let mut combined: Option<BeltError> = None;
    for r in results {
        if let Err(e) = r {
            combined = Some(match combined {
                Some(prev) => prev.combine_preferring_abort(e),
                None => e,
            });
        }
    }
    if let Some(e) = combined {
        context.mark_completed();
        return Err(e);
    }

    context.mark_completed();
    Ok(calculator.result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::apply::ApplyCalculator;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    struct SumCalculator {
        input: Vec<f64>,
        partials: Mutex<Vec<f64>>,
        batches: std::sync::atomic::AtomicUsize,
    }

    impl Calculator for SumCalculator {
        type Output = f64;

        fn init(&self, num_batches: usize) {
            self.batches.store(num_batches, Ordering::SeqCst);
            *self.partials.lock().unwrap() = vec![0.0; num_batches];
        }

        fn num_operations(&self) -> usize {
            self.input.len()
        }

        fn do_part(&self, from: usize, to: usize, batch_index: usize) -> BeltResult<()> {
            let sum: f64 = self.input[from..to].iter().sum();
            self.partials.lock().unwrap()[batch_index] = sum;
            Ok(())
        }

        fn result(&self) -> f64 {
            self.partials.lock().unwrap().iter().sum()
        }
    }

    #[test]
    fn sequential_path_sums_correctly() {
        let calc = SumCalculator {
            input: (0..100).map(|i| i as f64).collect(),
            partials: Mutex::new(vec![]),
            batches: std::sync::atomic::AtomicUsize::new(0),
        };
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let total = run_calculator(&calc, &ctx, Workload::TrivialPerCell, &config).unwrap();
        assert_eq!(total, 4950.0);
    }

    #[test]
    fn parallel_path_sums_correctly() {
        let calc = SumCalculator {
            input: (0..10_000).map(|i| i as f64).collect(),
            partials: Mutex::new(vec![]),
            batches: std::sync::atomic::AtomicUsize::new(0),
        };
        let ctx = ExecutionContext::global();
        let mut config = BeltConfig::default();
        config.min_batch = 16;
        let total = run_calculator(&calc, &ctx, Workload::Huge, &config).unwrap();
        assert_eq!(total, (0..10_000i64).sum::<i64>() as f64);
    }

    #[test]
    fn cancelled_context_aborts_before_start() {
        let calc = SumCalculator {
            input: vec![1.0, 2.0, 3.0],
            partials: Mutex::new(vec![]),
            batches: std::sync::atomic::AtomicUsize::new(0),
        };
        let ctx = ExecutionContext::global();
        ctx.cancel();
        let config = BeltConfig::default();
        let err = run_calculator(&calc, &ctx, Workload::Huge, &config).unwrap_err();
        assert!(matches!(err, BeltError::Aborted(_)));
    }

    #[test]
    fn empty_input_short_circuits() {
        let counter = AtomicI64::new(0);
        let calc = ApplyCalculator::new(0, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(0.0)
        });
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let out = run_calculator(&calc, &ctx, Workload::MediumPerCell, &config).unwrap();
        assert!(out.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
