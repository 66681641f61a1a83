// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The deduplicating store of all cores accumulated over a run.

use crate::cores::Core;
use crate::traits::CutConstraint;
use rustc_hash::FxHashMap;
use ward_model::index::DayIndex;
use ward_model::instance::ServiceRequest;

/// Accumulates cores across iterations, merging cores with identical
/// component sets by unioning their day sets.
///
/// `merge` returns, per incoming core, a copy restricted to the days that
/// were actually new to the store. Feeding the same cores twice therefore
/// accepts nothing the second time, and the cut count grows monotonically.
#[derive(Clone, Debug, Default)]
pub struct CoreStore {
    cores: Vec<Core>,
    index: FxHashMap<Vec<ServiceRequest>, usize>,
}

impl CoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct component sets.
    #[inline]
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Returns all stored cores.
    #[inline]
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Returns the total number of (core, day) cuts the store induces.
    pub fn num_cuts(&self) -> usize {
        self.cores.iter().map(|core| core.days().len()).sum()
    }

    /// Merges incoming cores into the store.
    ///
    /// Returns the accepted cores: for each incoming core whose day set
    /// contributed at least one day unknown for its component set, a copy
    /// carrying exactly those new days. Incoming cores with nothing new are
    /// discarded.
    pub fn merge(&mut self, incoming: Vec<Core>) -> Vec<Core> {
        let mut accepted = Vec::new();
        for core in incoming {
            match self.index.get(core.components()) {
                None => {
                    self.index
                        .insert(core.components().to_vec(), self.cores.len());
                    self.cores.push(core.clone());
                    accepted.push(core);
                }
                Some(&slot) => {
                    let stored = &mut self.cores[slot];
                    let new_days: Vec<DayIndex> = core
                        .days()
                        .iter()
                        .copied()
                        .filter(|day| stored.days().binary_search(day).is_err())
                        .collect();
                    if new_days.is_empty() {
                        continue;
                    }
                    stored.add_days(&new_days);
                    let mut fresh = core;
                    fresh.set_days(new_days);
                    accepted.push(fresh);
                }
            }
        }
        accepted
    }

    /// Materializes one master cut per (core, day) pair.
    pub fn cut_constraints(&self) -> Vec<CutConstraint<'_>> {
        let mut cuts = Vec::with_capacity(self.num_cuts());
        for core in &self.cores {
            for day in core.days() {
                cuts.push(CutConstraint {
                    components: core.components(),
                    day: *day,
                });
            }
        }
        cuts
    }
}
