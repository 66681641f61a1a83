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

use num_traits::PrimInt;
use std::iter::FusedIterator;

/// A half-open interval `[start, end)` defined by a start (inclusive) and
/// end (exclusive).
///
/// This struct represents a contiguous set of integers. It supports the
/// geometric queries the scheduling pipeline relies on: point containment,
/// interval containment, and overlap checks.
///
/// # Invariants
/// `start_inclusive` must always be less than or equal to `end_exclusive`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval<T>
where
    T: PrimInt,
{
    start_inclusive: T,
    end_exclusive: T,
}

impl<T> Interval<T>
where
    T: PrimInt,
{
    /// Creates a new `Interval`.
    ///
    /// # Panics
    ///
    /// Panics if `start_inclusive > end_exclusive`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ward_core::math::interval::Interval;
    ///
    /// let iv = Interval::new(0, 10);
    /// assert_eq!(iv.len(), 10);
    /// ```
    #[inline]
    pub fn new(start_inclusive: T, end_exclusive: T) -> Self {
        assert!(
            start_inclusive <= end_exclusive,
            "Invalid interval: start_inclusive must be less than or equal to end_exclusive"
        );
        Self {
            start_inclusive,
            end_exclusive,
        }
    }

    /// Creates a new `Interval` if the inputs are valid.
    ///
    /// Returns `None` if `start_inclusive > end_exclusive`.
    #[inline]
    pub fn checked_new(start_inclusive: T, end_exclusive: T) -> Option<Self> {
        if start_inclusive <= end_exclusive {
            Some(Self {
                start_inclusive,
                end_exclusive,
            })
        } else {
            None
        }
    }

    /// Creates a new `Interval` from a start point and a length.
    ///
    /// # Panics
    ///
    /// Panics if `length` is negative.
    #[inline]
    pub fn from_start_and_length(start_inclusive: T, length: T) -> Self {
        Self::new(start_inclusive, start_inclusive + length)
    }

    /// Returns the inclusive start of the interval.
    #[inline]
    pub fn start(&self) -> T {
        self.start_inclusive
    }

    /// Returns the exclusive end of the interval.
    #[inline]
    pub fn end(&self) -> T {
        self.end_exclusive
    }

    /// Returns the number of integer points contained in the interval.
    #[inline]
    pub fn len(&self) -> T {
        self.end_exclusive - self.start_inclusive
    }

    /// Returns `true` if the interval contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_inclusive == self.end_exclusive
    }

    /// Returns `true` if `point` lies inside the interval.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ward_core::math::interval::Interval;
    ///
    /// let iv = Interval::new(2, 5);
    /// assert!(iv.contains(2));
    /// assert!(iv.contains(4));
    /// assert!(!iv.contains(5));
    /// ```
    #[inline]
    pub fn contains(&self, point: T) -> bool {
        point >= self.start_inclusive && point < self.end_exclusive
    }

    /// Returns `true` if `other` is fully contained in `self` (`other ⊆ self`).
    ///
    /// An empty interval is contained in every interval.
    #[inline]
    pub fn contains_interval(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.start_inclusive >= self.start_inclusive
                && other.end_exclusive <= self.end_exclusive)
    }

    /// Returns `true` if `self` and `other` share at least one point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ward_core::math::interval::Interval;
    ///
    /// let a = Interval::new(0, 4);
    /// let b = Interval::new(3, 8);
    /// let c = Interval::new(4, 8);
    /// assert!(a.overlaps(&b));
    /// assert!(!a.overlaps(&c));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_inclusive < other.end_exclusive && other.start_inclusive < self.end_exclusive
    }

    /// Returns an iterator over the integer points of the interval.
    #[inline]
    pub fn iter(&self) -> IntervalIterator<T> {
        IntervalIterator {
            end_exclusive: self.end_exclusive,
            current: self.start_inclusive,
        }
    }
}

impl<T> std::fmt::Debug for Interval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

impl<T> std::fmt::Display for Interval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

/// An iterator over the integer points contained within an `Interval`.
pub struct IntervalIterator<T>
where
    T: PrimInt,
{
    end_exclusive: T,
    current: T,
}

impl<T> Iterator for IntervalIterator<T>
where
    T: PrimInt,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.end_exclusive {
            let result = self.current;
            self.current = self.current + T::one();
            Some(result)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end_exclusive - self.current)
            .max(T::zero())
            .to_usize()
            .unwrap_or(usize::MAX);
        (len, Some(len))
    }
}

impl<T> FusedIterator for IntervalIterator<T> where T: PrimInt {}
