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

//! Per-care-unit day domination.
//!
//! Day `B` is dominated by day `A` in a care unit when every operator shift
//! of `B` fits inside some operator shift of `A`, with shifts that overlap in
//! `B` placed on different operators of `A`. A conflict certificate that
//! holds on `A` then also holds on every day it dominates, since the
//! dominated day offers strictly less placement room.

use num_traits::{PrimInt, Signed};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use ward_model::index::{CareUnitIndex, DayIndex};
use ward_model::instance::{Instance, OperatorShift};

/// Precomputed day domination per care unit.
///
/// Built once per instance; `dominated(unit, day)` lists all days whose
/// roster packs into `day`'s roster of that unit. The relation is
/// transitively closed and irreflexive.
#[derive(Clone, Debug)]
pub struct DaySubsumptionIndex {
    /// `dominated[care_unit][day]` is sorted and free of `day` itself.
    dominated: Vec<Vec<Vec<DayIndex>>>,
}

impl DaySubsumptionIndex {
    /// Builds the domination index for all (care unit, day) pairs.
    pub fn build<T>(instance: &Instance<T>) -> Self
    where
        T: PrimInt + Signed,
    {
        let num_days = instance.num_days();
        let num_units = instance.num_care_units();
        let mut dominated: Vec<Vec<Vec<DayIndex>>> =
            vec![vec![Vec::new(); num_days]; num_units];

        for unit_id in 0..num_units {
            let unit = CareUnitIndex::new(unit_id);
            for day_id in 0..num_days {
                let day = DayIndex::new(day_id);
                let mut smaller: FxHashSet<DayIndex> = FxHashSet::default();

                for other_id in 0..num_days {
                    if other_id == day_id {
                        continue;
                    }
                    let other = DayIndex::new(other_id);
                    // A roster with more total duration can never pack.
                    if instance.capacity(day, unit) < instance.capacity(other, unit) {
                        continue;
                    }
                    if smaller.contains(&other) {
                        continue;
                    }
                    if roster_packs_into(instance.roster(other, unit), instance.roster(day, unit))
                    {
                        smaller.insert(other);
                        // Fold in the already computed closure of the
                        // dominated day; packing is transitive.
                        for dominated_day in &dominated[unit_id][other_id] {
                            if *dominated_day != day {
                                smaller.insert(*dominated_day);
                            }
                        }
                    }
                }

                let mut smaller: Vec<DayIndex> = smaller.into_iter().collect();
                smaller.sort();
                dominated[unit_id][day_id] = smaller;
            }
        }

        Self { dominated }
    }

    /// Returns the days dominated by `day` in `care_unit`, sorted.
    #[inline]
    pub fn dominated(&self, care_unit: CareUnitIndex, day: DayIndex) -> &[DayIndex] {
        &self.dominated[care_unit.get()][day.get()]
    }
}

/// Returns `true` if every shift of `small` fits inside a shift of `big`,
/// with overlapping `small` shifts placed on different `big` operators.
pub fn roster_packs_into<T>(small: &[OperatorShift<T>], big: &[OperatorShift<T>]) -> bool
where
    T: PrimInt + Signed,
{
    if small.is_empty() {
        return true;
    }
    if big.is_empty() {
        return false;
    }
    // Identical roster fast path; common with periodic schedules.
    if small.len() == big.len() && small.iter().zip(big).all(|(a, b)| a == b) {
        return true;
    }

    // Candidate big operators per small shift.
    let mut domains: Vec<SmallVec<[usize; 8]>> = Vec::with_capacity(small.len());
    for shift in small {
        let domain: SmallVec<[usize; 8]> = big
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.interval().contains_interval(&shift.interval()))
            .map(|(slot, _)| slot)
            .collect();
        if domain.is_empty() {
            return false;
        }
        domains.push(domain);
    }

    // Only shifts that overlap another small shift constrain each other;
    // conflict-free shifts can take any candidate independently.
    let mut conflicted: Vec<usize> = (0..small.len())
        .filter(|&slot| {
            small.iter().enumerate().any(|(other, shift)| {
                other != slot && shift.interval().overlaps(&small[slot].interval())
            })
        })
        .collect();
    if conflicted.is_empty() {
        return true;
    }

    // Most constrained first keeps the search shallow.
    conflicted.sort_by_key(|&slot| domains[slot].len());

    let mut chosen: Vec<usize> = Vec::with_capacity(conflicted.len());
    assign_conflicted(&conflicted, &domains, small, &mut chosen)
}

fn assign_conflicted<T>(
    conflicted: &[usize],
    domains: &[SmallVec<[usize; 8]>],
    small: &[OperatorShift<T>],
    chosen: &mut Vec<usize>,
) -> bool
where
    T: PrimInt + Signed,
{
    if chosen.len() == conflicted.len() {
        return true;
    }
    let slot = conflicted[chosen.len()];
    'candidate: for &big_slot in &domains[slot] {
        for (prev, &prev_big) in chosen.iter().enumerate() {
            let prev_slot = conflicted[prev];
            if prev_big == big_slot
                && small[slot].interval().overlaps(&small[prev_slot].interval())
            {
                continue 'candidate;
            }
        }
        chosen.push(big_slot);
        if assign_conflicted(conflicted, domains, small, chosen) {
            return true;
        }
        chosen.pop();
    }
    false
}
