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

//! Combinatorial no-good cuts ("cores") derived from day rejections.
//!
//! A core is a set of requests a day could not serve together, tagged with
//! the days on which that conflict certificate applies. Every (core, day)
//! pair becomes a master cut forbidding the full component set on that day.

pub mod expand;
pub mod generate;
pub mod store;
pub mod subsume;

use ward_model::index::DayIndex;
use ward_model::instance::ServiceRequest;

/// How cores are derived from a day's rejections.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum CoreStrategy {
    /// One core per conflicting day: all scheduled and rejected requests of
    /// that day. Cheap and coarse.
    Generalist,
    /// One core per rejection: the rejected request plus everything the day
    /// scheduled.
    Basic,
    /// One core per rejection, restricted to the requests connected to the
    /// rejection through shared patients or care units. Tightest cuts.
    #[default]
    Reduced,
}

impl std::fmt::Display for CoreStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generalist => write!(f, "Generalist"),
            Self::Basic => write!(f, "Basic"),
            Self::Reduced => write!(f, "Reduced"),
        }
    }
}

/// A conflict certificate: the day(s) cannot serve all `components` at once.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Core {
    components: Vec<ServiceRequest>,
    days: Vec<DayIndex>,
}

impl Core {
    /// Creates a new core. Components and days are sorted and deduplicated.
    ///
    /// # Panics
    ///
    /// Panics if `components` or `days` is empty after deduplication.
    pub fn new(mut components: Vec<ServiceRequest>, mut days: Vec<DayIndex>) -> Self {
        components.sort();
        components.dedup();
        days.sort();
        days.dedup();
        assert!(
            !components.is_empty(),
            "called `Core::new` with an empty component set"
        );
        assert!(!days.is_empty(), "called `Core::new` with an empty day set");
        Self { components, days }
    }

    /// Returns the component requests, sorted and deduplicated.
    #[inline]
    pub fn components(&self) -> &[ServiceRequest] {
        &self.components
    }

    /// Returns the days the core applies to, sorted.
    #[inline]
    pub fn days(&self) -> &[DayIndex] {
        &self.days
    }

    /// Returns `true` if `request` is a component of the core.
    #[inline]
    pub fn contains(&self, request: ServiceRequest) -> bool {
        self.components.binary_search(&request).is_ok()
    }

    /// Replaces the day set. Days are sorted and deduplicated.
    ///
    /// # Panics
    ///
    /// Panics if `days` is empty.
    pub(crate) fn set_days(&mut self, mut days: Vec<DayIndex>) {
        days.sort();
        days.dedup();
        assert!(!days.is_empty(), "called `Core::set_days` with an empty day set");
        self.days = days;
    }

    /// Adds days to the day set, keeping it sorted and deduplicated.
    pub(crate) fn add_days(&mut self, days: &[DayIndex]) {
        self.days.extend_from_slice(days);
        self.days.sort();
        self.days.dedup();
    }
}

impl std::fmt::Display for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Core({} components, {} days)", self.components.len(), self.days.len())
    }
}
