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

use ward_core::utils::index::{TypedIndex, TypedIndexTag};

/// A tag type for patient indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PatientIndexTag;

impl TypedIndexTag for PatientIndexTag {
    const NAME: &'static str = "PatientIndex";
}

/// A typed index for patients.
pub type PatientIndex = TypedIndex<PatientIndexTag>;

/// A tag type for service indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ServiceIndexTag;

impl TypedIndexTag for ServiceIndexTag {
    const NAME: &'static str = "ServiceIndex";
}

/// A typed index for services.
pub type ServiceIndex = TypedIndex<ServiceIndexTag>;

/// A tag type for care unit indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CareUnitIndexTag;

impl TypedIndexTag for CareUnitIndexTag {
    const NAME: &'static str = "CareUnitIndex";
}

/// A typed index for care units.
pub type CareUnitIndex = TypedIndex<CareUnitIndexTag>;

/// A tag type for day indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DayIndexTag;

impl TypedIndexTag for DayIndexTag {
    const NAME: &'static str = "DayIndex";
}

/// A typed index for days of the planning horizon.
pub type DayIndex = TypedIndex<DayIndexTag>;

/// A tag type for operator indices.
///
/// Operator indices are local to one (day, care unit) roster.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OperatorIndexTag;

impl TypedIndexTag for OperatorIndexTag {
    const NAME: &'static str = "OperatorIndex";
}

/// A typed index for operators within a (day, care unit) roster.
pub type OperatorIndex = TypedIndex<OperatorIndexTag>;

/// A tag type for iteration indices of the decomposition loop.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct IterationIndexTag;

impl TypedIndexTag for IterationIndexTag {
    const NAME: &'static str = "IterationIndex";
}

/// A typed index for decomposition iterations.
pub type IterationIndex = TypedIndex<IterationIndexTag>;
