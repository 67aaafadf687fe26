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

//! Associative `reduce`: each batch folds its own range down to one
//! partial value, then the partials are folded together in `result`.
//! Unlike `apply`, batches don't own disjoint output slices — they each
//! own one slot of a per-batch partials vector instead.

use std::sync::Mutex;

use crate::calculator::Calculator;
use crate::error::BeltResult;

pub struct ReduceCalculator<T, F, C> {
    n: usize,
    identity: T,
    read: F,
    combine: C,
    partials: Mutex<Vec<T>>,
}

impl<T, F, C> ReduceCalculator<T, F, C>
where
    T: Clone + Send,
    F: Fn(usize) -> BeltResult<T> + Send + Sync,
    C: Fn(&T, &T) -> T + Send + Sync,
{
    pub fn new(n: usize, identity: T, read: F, combine: C) -> Self {
        ReduceCalculator {
            n,
            identity,
            read,
            combine,
            partials: Mutex::new(Vec::new()),
        }
    }
}

impl<T, F, C> Calculator for ReduceCalculator<T, F, C>
where
    T: Clone + Send + Sync,
    F: Fn(usize) -> BeltResult<T> + Send + Sync,
    C: Fn(&T, &T) -> T + Send + Sync,
{
    type Output = T;

    fn init(&self, num_batches: usize) {
        *self.partials.lock().expect("reduce partials mutex poisoned") =
            vec![self.identity.clone(); num_batches.max(1)];
    }

    fn num_operations(&self) -> usize {
        self.n
    }

    fn do_part(&self, from: usize, to: usize, batch_index: usize) -> BeltResult<()> {
        let mut acc = self.identity.clone();
        for i in from..to {
            let v = (self.read)(i)?;
            acc = (self.combine)(&acc, &v);
        }
        self.partials.lock().expect("reduce partials mutex poisoned")[batch_index] = acc;
        Ok(())
    }

    fn result(&self) -> T {
        let partials = self.partials.lock().expect("reduce partials mutex poisoned");
        let mut acc = self.identity.clone();
        for p in partials.iter() {
            acc = (self.combine)(&acc, p);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeltConfig;
    use crate::executor::{run_calculator, ExecutionContext, Workload};

    #[test]
    fn reduce_sums_all_rows() {
        let calc = ReduceCalculator::new(1000, 0.0f64, |i| Ok(i as f64), |a, b| a + b);
        let ctx = ExecutionContext::global();
        let mut config = BeltConfig::default();
        config.min_batch = 32;
        let out = run_calculator(&calc, &ctx, Workload::Huge, &config).unwrap();
        assert_eq!(out, (0..1000i64).sum::<i64>() as f64);
    }

    #[test]
    fn reduce_on_empty_input_yields_identity() {
        let calc = ReduceCalculator::new(0, 7.0f64, |i| Ok(i as f64), |a, b| a + b);
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let out = run_calculator(&calc, &ctx, Workload::MediumPerCell, &config).unwrap();
        assert_eq!(out, 7.0);
    }
}
