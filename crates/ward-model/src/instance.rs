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

//! The immutable problem instance for multi-day care scheduling.
//!
//! An `Instance` describes services (each owned by one care unit, with a
//! fixed positive duration), patients (with a priority weight and request
//! windows), and a horizon of days, each carrying per-care-unit operator
//! rosters. The data is held in a Structure-of-Arrays layout addressed by
//! typed indices, pre-validated by `InstanceBuilder::build`.
//!
//! Besides the raw data, the instance owns two derived read-only indices the
//! engine relies on:
//! - per-(day, care unit) total operator capacity,
//! - the per-day *reachable-request* index: every `(patient, service)` pair
//!   with at least one request window containing that day.

use crate::index::{CareUnitIndex, DayIndex, OperatorIndex, PatientIndex, ServiceIndex};
use num_traits::{PrimInt, Signed};
use ward_core::math::interval::Interval;

/// A `(patient, service)` pair: the unit of master proposals, subproblem
/// acceptance and rejection, and core components.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ServiceRequest {
    pub patient: PatientIndex,
    pub service: ServiceIndex,
}

impl ServiceRequest {
    #[inline]
    pub const fn new(patient: PatientIndex, service: ServiceIndex) -> Self {
        Self { patient, service }
    }
}

impl std::fmt::Display for ServiceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.patient.get(), self.service.get())
    }
}

/// An inclusive day range `[first, last]` in which one occurrence of a
/// requested service may be placed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DayWindow {
    first: DayIndex,
    last: DayIndex,
}

impl DayWindow {
    /// Creates a new `DayWindow`.
    ///
    /// # Panics
    ///
    /// Panics if `first > last`.
    #[inline]
    pub fn new(first: DayIndex, last: DayIndex) -> Self {
        assert!(
            first <= last,
            "called `DayWindow::new` with first day {} after last day {}",
            first.get(),
            last.get()
        );
        Self { first, last }
    }

    /// Returns the first (inclusive) day of the window.
    #[inline]
    pub const fn first(&self) -> DayIndex {
        self.first
    }

    /// Returns the last (inclusive) day of the window.
    #[inline]
    pub const fn last(&self) -> DayIndex {
        self.last
    }

    /// Returns `true` if `day` lies inside the window.
    #[inline]
    pub fn contains(&self, day: DayIndex) -> bool {
        self.first <= day && day <= self.last
    }

    /// Returns an iterator over the days of the window.
    #[inline]
    pub fn days(&self) -> impl Iterator<Item = DayIndex> {
        (self.first.get()..=self.last.get()).map(DayIndex::new)
    }
}

impl std::fmt::Display for DayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first.get(), self.last.get())
    }
}

/// One request window: a `(patient, service)` pair together with the
/// inclusive day range in which this occurrence may be served.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RequestWindow {
    pub request: ServiceRequest,
    pub window: DayWindow,
}

/// An operator availability interval on one (day, care unit) roster.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OperatorShift<T> {
    start: T,
    duration: T,
}

impl<T> OperatorShift<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(start: T, duration: T) -> Self {
        Self { start, duration }
    }

    /// Returns the start time of the shift.
    #[inline]
    pub fn start(&self) -> T {
        self.start
    }

    /// Returns the duration of the shift.
    #[inline]
    pub fn duration(&self) -> T {
        self.duration
    }

    /// Returns the exclusive end time of the shift.
    #[inline]
    pub fn end(&self) -> T {
        self.start + self.duration
    }

    /// Returns the shift as a half-open time interval `[start, start + duration)`.
    #[inline]
    pub fn interval(&self) -> Interval<T> {
        Interval::from_start_and_length(self.start, self.duration)
    }
}

/// The immutable data model describing care units, services, operator
/// rosters, patients, and request windows.
///
/// Construction:
/// - Use `InstanceBuilder` and call `InstanceBuilder::build` to obtain a
///   validated `Instance`.
#[derive(Clone, Debug)]
pub struct Instance<T>
where
    T: PrimInt + Signed,
{
    num_days: usize,
    care_unit_names: Vec<String>,
    service_names: Vec<String>,            // len = num_services
    service_care_units: Vec<CareUnitIndex>, // len = num_services
    service_durations: Vec<T>,             // len = num_services
    patient_names: Vec<String>,            // len = num_patients
    patient_priorities: Vec<T>,            // len = num_patients
    /// All request windows, sorted by (patient, service, window).
    requests: Vec<RequestWindow>,
    /// `rosters[day][care_unit]` is the operator roster of that day and unit.
    rosters: Vec<Vec<Vec<OperatorShift<T>>>>,
    /// `capacities[day][care_unit]` is the summed operator duration.
    capacities: Vec<Vec<T>>,
    /// `reachable[day]` is the sorted, deduplicated list of requests with at
    /// least one window containing that day.
    reachable: Vec<Vec<ServiceRequest>>,
}

impl<T> Instance<T>
where
    T: PrimInt + Signed,
{
    /// Returns the number of days in the planning horizon.
    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Returns the number of care units.
    #[inline]
    pub fn num_care_units(&self) -> usize {
        self.care_unit_names.len()
    }

    /// Returns the number of services.
    #[inline]
    pub fn num_services(&self) -> usize {
        self.service_names.len()
    }

    /// Returns the number of patients.
    #[inline]
    pub fn num_patients(&self) -> usize {
        self.patient_names.len()
    }

    /// Returns the name of a care unit.
    #[inline]
    pub fn care_unit_name(&self, care_unit: CareUnitIndex) -> &str {
        &self.care_unit_names[care_unit.get()]
    }

    /// Returns the name of a service.
    #[inline]
    pub fn service_name(&self, service: ServiceIndex) -> &str {
        &self.service_names[service.get()]
    }

    /// Returns the name of a patient.
    #[inline]
    pub fn patient_name(&self, patient: PatientIndex) -> &str {
        &self.patient_names[patient.get()]
    }

    /// Returns the care unit that delivers a service.
    #[inline]
    pub fn care_unit_of(&self, service: ServiceIndex) -> CareUnitIndex {
        self.service_care_units[service.get()]
    }

    /// Returns the duration of a service.
    #[inline]
    pub fn duration_of(&self, service: ServiceIndex) -> T {
        self.service_durations[service.get()]
    }

    /// Returns the priority weight of a patient.
    #[inline]
    pub fn priority_of(&self, patient: PatientIndex) -> T {
        self.patient_priorities[patient.get()]
    }

    /// Returns the value of serving one occurrence of a request:
    /// service duration times patient priority.
    #[inline]
    pub fn value_of(&self, request: ServiceRequest) -> T {
        self.duration_of(request.service) * self.priority_of(request.patient)
    }

    /// Returns the operator roster of a (day, care unit).
    #[inline]
    pub fn roster(&self, day: DayIndex, care_unit: CareUnitIndex) -> &[OperatorShift<T>] {
        &self.rosters[day.get()][care_unit.get()]
    }

    /// Returns one operator shift of a (day, care unit) roster.
    #[inline]
    pub fn shift(
        &self,
        day: DayIndex,
        care_unit: CareUnitIndex,
        operator: OperatorIndex,
    ) -> OperatorShift<T> {
        self.rosters[day.get()][care_unit.get()][operator.get()]
    }

    /// Returns the total operator duration of a (day, care unit).
    #[inline]
    pub fn capacity(&self, day: DayIndex, care_unit: CareUnitIndex) -> T {
        self.capacities[day.get()][care_unit.get()]
    }

    /// Returns all request windows, sorted by (patient, service, window).
    #[inline]
    pub fn request_windows(&self) -> &[RequestWindow] {
        &self.requests
    }

    /// Returns the request windows of one `(patient, service)` pair.
    pub fn windows_of(&self, request: ServiceRequest) -> &[RequestWindow] {
        let start = self
            .requests
            .partition_point(|r| (r.request.patient, r.request.service) < (request.patient, request.service));
        let mut end = start;
        while end < self.requests.len() && self.requests[end].request == request {
            end += 1;
        }
        &self.requests[start..end]
    }

    /// Returns every request that is theoretically placeable on `day`,
    /// sorted and deduplicated.
    #[inline]
    pub fn reachable_requests(&self, day: DayIndex) -> &[ServiceRequest] {
        &self.reachable[day.get()]
    }

    /// Returns `true` if `request` has at least one window containing `day`.
    #[inline]
    pub fn is_reachable(&self, day: DayIndex, request: ServiceRequest) -> bool {
        self.reachable[day.get()].binary_search(&request).is_ok()
    }

    /// Returns an iterator over all day indices of the horizon.
    #[inline]
    pub fn days(&self) -> impl Iterator<Item = DayIndex> {
        (0..self.num_days).map(DayIndex::new)
    }

    /// Returns an iterator over all care unit indices.
    #[inline]
    pub fn care_units(&self) -> impl Iterator<Item = CareUnitIndex> {
        (0..self.care_unit_names.len()).map(CareUnitIndex::new)
    }
}

/// The error type for instance construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceBuildError {
    /// The horizon must contain at least one day.
    EmptyHorizon,
    /// A service was registered with a non-positive duration.
    NonPositiveServiceDuration { service: ServiceIndex },
    /// A patient was registered with a priority below one.
    InvalidPriority { patient: PatientIndex },
    /// A request window reaches outside the planning horizon.
    WindowOutOfHorizon { request: RequestWindow },
    /// An operator shift has a negative start or non-positive duration.
    InvalidShift { day: DayIndex, care_unit: CareUnitIndex },
}

impl std::fmt::Display for InstanceBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyHorizon => write!(f, "Planning horizon must contain at least one day"),
            Self::NonPositiveServiceDuration { service } => {
                write!(f, "Service {} has a non-positive duration", service.get())
            }
            Self::InvalidPriority { patient } => {
                write!(f, "Patient {} has a priority below one", patient.get())
            }
            Self::WindowOutOfHorizon { request } => write!(
                f,
                "Request window {} of {} reaches outside the planning horizon",
                request.window, request.request
            ),
            Self::InvalidShift { day, care_unit } => write!(
                f,
                "Operator shift on day {} in care unit {} has a negative start or non-positive duration",
                day.get(),
                care_unit.get()
            ),
        }
    }
}

impl std::error::Error for InstanceBuildError {}

/// A builder for `Instance`.
///
/// Names are interned to typed indices as entities are added; `build`
/// validates the assembled data and computes the derived capacity and
/// reachable-request indices.
#[derive(Clone, Debug)]
pub struct InstanceBuilder<T>
where
    T: PrimInt + Signed,
{
    num_days: usize,
    care_unit_names: Vec<String>,
    service_names: Vec<String>,
    service_care_units: Vec<CareUnitIndex>,
    service_durations: Vec<T>,
    patient_names: Vec<String>,
    patient_priorities: Vec<T>,
    requests: Vec<RequestWindow>,
    rosters: Vec<Vec<Vec<OperatorShift<T>>>>,
}

impl<T> InstanceBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Creates a new builder for a horizon of `num_days` days.
    pub fn new(num_days: usize) -> Self {
        Self {
            num_days,
            care_unit_names: Vec::new(),
            service_names: Vec::new(),
            service_care_units: Vec::new(),
            service_durations: Vec::new(),
            patient_names: Vec::new(),
            patient_priorities: Vec::new(),
            requests: Vec::new(),
            rosters: vec![Vec::new(); num_days],
        }
    }

    /// Registers a care unit and returns its index.
    pub fn add_care_unit<S>(&mut self, name: S) -> CareUnitIndex
    where
        S: Into<String>,
    {
        let index = CareUnitIndex::new(self.care_unit_names.len());
        self.care_unit_names.push(name.into());
        for day in &mut self.rosters {
            day.push(Vec::new());
        }
        index
    }

    /// Registers a service delivered by `care_unit` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `care_unit` was not created by this builder.
    pub fn add_service<S>(&mut self, name: S, care_unit: CareUnitIndex, duration: T) -> ServiceIndex
    where
        S: Into<String>,
    {
        assert!(
            care_unit.get() < self.care_unit_names.len(),
            "called `InstanceBuilder::add_service` with unknown care unit index {}",
            care_unit.get()
        );
        let index = ServiceIndex::new(self.service_names.len());
        self.service_names.push(name.into());
        self.service_care_units.push(care_unit);
        self.service_durations.push(duration);
        index
    }

    /// Registers a patient with the default priority of one.
    pub fn add_patient<S>(&mut self, name: S) -> PatientIndex
    where
        S: Into<String>,
    {
        self.add_patient_with_priority(name, T::one())
    }

    /// Registers a patient with an explicit priority weight.
    pub fn add_patient_with_priority<S>(&mut self, name: S, priority: T) -> PatientIndex
    where
        S: Into<String>,
    {
        let index = PatientIndex::new(self.patient_names.len());
        self.patient_names.push(name.into());
        self.patient_priorities.push(priority);
        index
    }

    /// Adds a request window for one occurrence of `service` by `patient`.
    ///
    /// Windows of the same pair may overlap; each window stands for its own
    /// occurrence.
    ///
    /// # Panics
    ///
    /// Panics if `patient` or `service` were not created by this builder.
    pub fn add_request(&mut self, patient: PatientIndex, service: ServiceIndex, window: DayWindow) {
        assert!(
            patient.get() < self.patient_names.len(),
            "called `InstanceBuilder::add_request` with unknown patient index {}",
            patient.get()
        );
        assert!(
            service.get() < self.service_names.len(),
            "called `InstanceBuilder::add_request` with unknown service index {}",
            service.get()
        );
        self.requests.push(RequestWindow {
            request: ServiceRequest::new(patient, service),
            window,
        });
    }

    /// Adds an operator shift to the (day, care unit) roster and returns the
    /// operator's index within that roster.
    ///
    /// # Panics
    ///
    /// Panics if `day` is outside the horizon or `care_unit` was not created
    /// by this builder.
    pub fn add_shift(
        &mut self,
        day: DayIndex,
        care_unit: CareUnitIndex,
        start: T,
        duration: T,
    ) -> OperatorIndex {
        assert!(
            day.get() < self.num_days,
            "called `InstanceBuilder::add_shift` with day {} outside the horizon of {} days",
            day.get(),
            self.num_days
        );
        assert!(
            care_unit.get() < self.care_unit_names.len(),
            "called `InstanceBuilder::add_shift` with unknown care unit index {}",
            care_unit.get()
        );
        let roster = &mut self.rosters[day.get()][care_unit.get()];
        let index = OperatorIndex::new(roster.len());
        roster.push(OperatorShift::new(start, duration));
        index
    }

    /// Validates the assembled data and builds the `Instance`.
    pub fn build(mut self) -> Result<Instance<T>, InstanceBuildError> {
        if self.num_days == 0 {
            return Err(InstanceBuildError::EmptyHorizon);
        }
        for (index, duration) in self.service_durations.iter().enumerate() {
            if *duration <= T::zero() {
                return Err(InstanceBuildError::NonPositiveServiceDuration {
                    service: ServiceIndex::new(index),
                });
            }
        }
        for (index, priority) in self.patient_priorities.iter().enumerate() {
            if *priority < T::one() {
                return Err(InstanceBuildError::InvalidPriority {
                    patient: PatientIndex::new(index),
                });
            }
        }
        for request in &self.requests {
            if request.window.last().get() >= self.num_days {
                return Err(InstanceBuildError::WindowOutOfHorizon { request: *request });
            }
        }
        for (day, units) in self.rosters.iter().enumerate() {
            for (unit, roster) in units.iter().enumerate() {
                for shift in roster {
                    if shift.start() < T::zero() || shift.duration() <= T::zero() {
                        return Err(InstanceBuildError::InvalidShift {
                            day: DayIndex::new(day),
                            care_unit: CareUnitIndex::new(unit),
                        });
                    }
                }
            }
        }

        self.requests.sort();

        let capacities = self
            .rosters
            .iter()
            .map(|units| {
                units
                    .iter()
                    .map(|roster| {
                        roster
                            .iter()
                            .fold(T::zero(), |acc, shift| acc + shift.duration())
                    })
                    .collect()
            })
            .collect();

        let mut reachable: Vec<Vec<ServiceRequest>> = vec![Vec::new(); self.num_days];
        for request in &self.requests {
            for day in request.window.days() {
                reachable[day.get()].push(request.request);
            }
        }
        for day in &mut reachable {
            day.sort();
            day.dedup();
        }

        Ok(Instance {
            num_days: self.num_days,
            care_unit_names: self.care_unit_names,
            service_names: self.service_names,
            service_care_units: self.service_care_units,
            service_durations: self.service_durations,
            patient_names: self.patient_names,
            patient_priorities: self.patient_priorities,
            requests: self.requests,
            rosters: self.rosters,
            capacities,
            reachable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    fn two_day_instance() -> Instance<IntegerType> {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let a = builder.add_service("srv_a", unit, 3);
        let b = builder.add_service("srv_b", unit, 3);
        let p = builder.add_patient_with_priority("pat0", 2);
        builder.add_request(p, a, DayWindow::new(DayIndex::new(0), DayIndex::new(1)));
        builder.add_request(p, b, DayWindow::new(DayIndex::new(0), DayIndex::new(1)));
        builder.add_shift(DayIndex::new(0), unit, 0, 4);
        builder.add_shift(DayIndex::new(1), unit, 0, 4);
        builder.build().expect("instance must build")
    }

    #[test]
    fn test_build_and_accessors() {
        let instance = two_day_instance();
        assert_eq!(instance.num_days(), 2);
        assert_eq!(instance.num_care_units(), 1);
        assert_eq!(instance.num_services(), 2);
        assert_eq!(instance.num_patients(), 1);

        let unit = CareUnitIndex::new(0);
        let a = ServiceIndex::new(0);
        let p = PatientIndex::new(0);
        assert_eq!(instance.care_unit_of(a), unit);
        assert_eq!(instance.duration_of(a), 3);
        assert_eq!(instance.priority_of(p), 2);
        assert_eq!(instance.value_of(ServiceRequest::new(p, a)), 6);
        assert_eq!(instance.capacity(DayIndex::new(0), unit), 4);
        assert_eq!(instance.roster(DayIndex::new(1), unit).len(), 1);
    }

    #[test]
    fn test_reachable_requests() {
        let instance = two_day_instance();
        let p = PatientIndex::new(0);
        let a = ServiceRequest::new(p, ServiceIndex::new(0));
        let b = ServiceRequest::new(p, ServiceIndex::new(1));

        for day in instance.days() {
            assert_eq!(instance.reachable_requests(day), &[a, b]);
            assert!(instance.is_reachable(day, a));
            assert!(instance.is_reachable(day, b));
        }
    }

    #[test]
    fn test_windows_of() {
        let instance = two_day_instance();
        let p = PatientIndex::new(0);
        let a = ServiceRequest::new(p, ServiceIndex::new(0));
        let windows = instance.windows_of(a);
        assert_eq!(windows.len(), 1);
        assert_eq!(
            windows[0].window,
            DayWindow::new(DayIndex::new(0), DayIndex::new(1))
        );
    }

    #[test]
    fn test_build_rejects_zero_duration_service() {
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        let unit = builder.add_care_unit("cu0");
        builder.add_service("bad", unit, 0);
        assert!(matches!(
            builder.build(),
            Err(InstanceBuildError::NonPositiveServiceDuration { .. })
        ));
    }

    #[test]
    fn test_build_rejects_window_outside_horizon() {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let s = builder.add_service("srv", unit, 1);
        let p = builder.add_patient("pat");
        builder.add_request(p, s, DayWindow::new(DayIndex::new(1), DayIndex::new(2)));
        assert!(matches!(
            builder.build(),
            Err(InstanceBuildError::WindowOutOfHorizon { .. })
        ));
    }

    #[test]
    fn test_build_rejects_empty_horizon() {
        let builder = InstanceBuilder::<IntegerType>::new(0);
        assert!(matches!(builder.build(), Err(InstanceBuildError::EmptyHorizon)));
    }

    #[test]
    fn test_operator_shift_interval() {
        let shift = OperatorShift::new(2_i64, 5);
        assert_eq!(shift.end(), 7);
        assert!(shift.interval().contains(2));
        assert!(!shift.interval().contains(7));
    }
}
