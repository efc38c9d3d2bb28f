//! Ordered, growable sequence that keeps its first `N` elements inline.
//!
//! Storage is a tagged union of an inline array and an exactly-sized heap
//! slice. Migration is one way: once a [`SmallVec`] has spilled to the heap
//! it never returns to inline storage, even when it shrinks.
//!
//! Capacity policy:
//! - growth on a full push goes to the next power of two above the current
//!   capacity;
//! - [`SmallVec::reserve`] goes to the next power of two at or above the
//!   request;
//! - removals reallocate a heap buffer down to the next power of two at or
//!   above the new length when that is strictly smaller than the capacity;
//! - [`SmallVec::shrink_to_fit`] reallocates a heap buffer to exactly the
//!   length.

use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut, Range};
use std::ptr;

use serde::{Serialize, Serializer};

/// Range errors raised by the checked accessors of [`SmallVec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmallVecError {
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    Empty {
        op: &'static str,
    },
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

impl Display for SmallVecError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::IndexOutOfRange {
                index,
                len,
            } => write!(f, "index {index} out of range for length {len}"),
            Self::Empty {
                op,
            } => write!(f, "{op}() called on an empty sequence"),
            Self::InvalidRange {
                start,
                end,
                len,
            } => write!(f, "range {start}..{end} invalid for length {len}"),
        }
    }
}

impl std::error::Error for SmallVecError {}

enum Storage<T, const N: usize> {
    Inline([MaybeUninit<T>; N]),
    Heap(Box<[MaybeUninit<T>]>),
}

pub struct SmallVec<T, const N: usize> {
    len: usize,
    storage: Storage<T, N>,
    _owns: PhantomData<T>,
}

/// Smallest power of two at or above `n`, saturating at `usize::MAX`.
fn pow2_at_least(n: usize) -> usize {
    n.checked_next_power_of_two().unwrap_or(usize::MAX)
}

impl<T, const N: usize> SmallVec<T, N> {
    pub const fn new() -> Self {
        Self {
            len: 0,
            storage: Storage::Inline([const { MaybeUninit::uninit() }; N]),
            _owns: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => N,
            Storage::Heap(buf) => buf.len(),
        }
    }

    /// `true` while the elements still live in the inline buffer.
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    fn slots(&self) -> &[MaybeUninit<T>] {
        match &self.storage {
            Storage::Inline(buf) => &buf[..],
            Storage::Heap(buf) => &buf[..],
        }
    }

    fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        match &mut self.storage {
            Storage::Inline(buf) => &mut buf[..],
            Storage::Heap(buf) => &mut buf[..],
        }
    }

    fn as_ptr(&self) -> *const T {
        self.slots().as_ptr().cast()
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.slots_mut().as_mut_ptr().cast()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are always initialized.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: the first `len` slots are always initialized.
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Move the live elements into a fresh heap buffer of exactly
    /// `capacity` slots. The caller guarantees `capacity >= len`.
    fn reallocate(
        &mut self,
        capacity: usize,
    ) {
        debug_assert!(capacity >= self.len);
        let mut buf: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(capacity);
        // SAFETY: the regions belong to different allocations and `len`
        // fits in both. The old buffer is released without dropping its
        // slots, so every element is moved exactly once.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), buf.as_mut_ptr().cast::<T>(), self.len);
        }
        self.storage = Storage::Heap(buf);
    }

    fn grow_for_push(&mut self) {
        let capacity = self.capacity();
        self.reallocate(pow2_at_least(capacity.saturating_add(1)));
    }

    fn shrink_after_removal(&mut self) {
        if self.is_inline() {
            return;
        }
        let target = pow2_at_least(self.len);
        if target < self.capacity() {
            self.reallocate(target);
        }
    }

    /// Grow capacity to the next power of two at or above `n`. Never shrinks.
    pub fn reserve(
        &mut self,
        n: usize,
    ) {
        if n > self.capacity() {
            self.reallocate(pow2_at_least(n));
        }
    }

    /// Reallocate a heap buffer down to exactly `len` slots. Inline storage
    /// is left untouched.
    pub fn shrink_to_fit(&mut self) {
        if !self.is_inline() && self.len < self.capacity() {
            self.reallocate(self.len);
        }
    }

    pub fn push(
        &mut self,
        value: T,
    ) {
        self.push_mut(value);
    }

    /// Append `value` and return a mutable reference to it.
    pub fn push_mut(
        &mut self,
        value: T,
    ) -> &mut T {
        if self.len == self.capacity() {
            self.grow_for_push();
        }
        let index = self.len;
        let slot = &mut self.slots_mut()[index];
        slot.write(value);
        self.len += 1;
        // SAFETY: written just above.
        unsafe { self.slots_mut()[index].assume_init_mut() }
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index is initialized and is no
        // longer counted by `len`.
        let value = unsafe { self.slots()[self.len].assume_init_read() };
        self.shrink_after_removal();
        Some(value)
    }

    /// Insert `value` at `index`, shifting the suffix one slot to the right.
    pub fn insert(
        &mut self,
        index: usize,
        value: T,
    ) -> Result<(), SmallVecError> {
        if index > self.len {
            return Err(SmallVecError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        if self.len == self.capacity() {
            self.grow_for_push();
        }
        let len = self.len;
        // SAFETY: capacity > len, so shifting `len - index` elements by one
        // stays in bounds; the vacated slot is then initialized.
        unsafe {
            let base = self.as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + 1), len - index);
            ptr::write(base.add(index), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`, shifting the suffix left.
    pub fn remove(
        &mut self,
        index: usize,
    ) -> Result<T, SmallVecError> {
        if index >= self.len {
            return Err(SmallVecError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let len = self.len;
        // SAFETY: `index < len`; the element is read out before its slot is
        // overwritten by the shifted suffix.
        let value = unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(index));
            ptr::copy(base.add(index + 1), base.add(index), len - index - 1);
            value
        };
        self.len -= 1;
        self.shrink_after_removal();
        Ok(value)
    }

    /// Drop the elements in `range` and close the gap.
    pub fn remove_range(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), SmallVecError> {
        let Range {
            start,
            end,
        } = range;
        if start > end || end > self.len {
            return Err(SmallVecError::InvalidRange {
                start,
                end,
                len: self.len,
            });
        }
        let tail = self.len - end;
        // Elements past `start` are not counted while they are dropped, so a
        // panicking destructor leaks the tail instead of double-dropping it.
        self.len = start;
        // SAFETY: `start..end` were initialized and are dropped once; the
        // tail is then moved down over them.
        unsafe {
            let base = self.as_mut_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        self.shrink_after_removal();
        Ok(())
    }

    /// Drop everything past `len`, then apply the removal shrink policy.
    pub fn truncate(
        &mut self,
        len: usize,
    ) {
        if len >= self.len {
            return;
        }
        let old_len = self.len;
        self.len = len;
        // SAFETY: `len..old_len` were initialized and are no longer counted.
        unsafe {
            let base = self.as_mut_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(len), old_len - len));
        }
        self.shrink_after_removal();
    }

    /// Drop every element. Capacity is kept.
    pub fn clear(&mut self) {
        let old_len = self.len;
        self.len = 0;
        // SAFETY: `0..old_len` were initialized and are no longer counted.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), old_len));
        }
    }

    pub fn at(
        &self,
        index: usize,
    ) -> Result<&T, SmallVecError> {
        self.as_slice().get(index).ok_or(SmallVecError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    pub fn at_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut T, SmallVecError> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(SmallVecError::IndexOutOfRange {
            index,
            len,
        })
    }

    pub fn front(&self) -> Result<&T, SmallVecError> {
        self.as_slice().first().ok_or(SmallVecError::Empty {
            op: "front",
        })
    }

    pub fn back(&self) -> Result<&T, SmallVecError> {
        self.as_slice().last().ok_or(SmallVecError::Empty {
            op: "back",
        })
    }

    pub fn back_mut(&mut self) -> Result<&mut T, SmallVecError> {
        self.as_mut_slice().last_mut().ok_or(SmallVecError::Empty {
            op: "back",
        })
    }

    /// Exchange contents with `other`.
    ///
    /// Two heap-backed sequences trade buffers in O(1). If either side is
    /// inline, elements are exchanged instead: the common prefix is swapped
    /// pairwise and the longer side's tail is moved across, so neither
    /// sequence ever migrates back to inline storage.
    pub fn swap_with(
        &mut self,
        other: &mut Self,
    ) {
        if !self.is_inline() && !other.is_inline() {
            mem::swap(&mut self.storage, &mut other.storage);
            mem::swap(&mut self.len, &mut other.len);
        } else if self.len >= other.len {
            Self::swap_elements(self, other);
        } else {
            Self::swap_elements(other, self);
        }
    }

    fn swap_elements(
        longer: &mut Self,
        shorter: &mut Self,
    ) {
        let long_len = longer.len;
        let short_len = shorter.len;

        shorter.reserve(long_len);
        longer.as_mut_slice()[..short_len].swap_with_slice(&mut shorter.as_mut_slice()[..short_len]);

        // SAFETY: `shorter` has room for `long_len` elements after the
        // reserve; the tail slots of `longer` are moved bitwise and then no
        // longer counted by it.
        unsafe {
            let src = longer.as_ptr().add(short_len);
            let dst = shorter.as_mut_ptr().add(short_len);
            ptr::copy_nonoverlapping(src, dst, long_len - short_len);
        }
        shorter.len = long_len;
        longer.len = short_len;
        longer.shrink_to_fit();
    }
}

impl<T: Clone, const N: usize> SmallVec<T, N> {
    /// Insert clones of `items` at `index`, shifting the suffix right.
    pub fn insert_from_slice(
        &mut self,
        index: usize,
        items: &[T],
    ) -> Result<(), SmallVecError> {
        if index > self.len {
            return Err(SmallVecError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let count = items.len();
        let len = self.len;
        self.reserve(len + count);
        // Only the untouched prefix is counted while clones run, so a
        // panicking clone leaks the shifted tail instead of exposing gaps.
        self.len = index;
        // SAFETY: capacity covers `len + count`; the tail is shifted right by
        // `count` and the opened gap is filled before `len` counts it again.
        unsafe {
            let base = self.as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + count), len - index);
            for (offset, item) in items.iter().enumerate() {
                ptr::write(base.add(index + offset), item.clone());
            }
        }
        self.len = len + count;
        Ok(())
    }

    /// Grow with clones of `value` or truncate down to `len`.
    pub fn resize(
        &mut self,
        len: usize,
        value: T,
    ) {
        if len > self.len {
            self.reserve(len);
            while self.len < len {
                self.push(value.clone());
            }
        } else {
            self.truncate(len);
        }
    }

}

impl<T, const N: usize> Drop for SmallVec<T, N> {
    fn drop(&mut self) {
        // SAFETY: exactly the first `len` slots are initialized. The buffer
        // itself holds `MaybeUninit` and frees without touching them.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len));
        }
    }
}

impl<T, const N: usize> Default for SmallVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for SmallVec<T, N> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        out.reserve(self.len);
        for item in self.iter() {
            out.push(item.clone());
        }
        out
    }
}

impl<T, const N: usize> Deref for SmallVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for SmallVec<T, N> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Debug, const N: usize> Debug for SmallVec<T, N> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, const N: usize, const M: usize> PartialEq<SmallVec<T, M>> for SmallVec<T, N> {
    fn eq(
        &self,
        other: &SmallVec<T, M>,
    ) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for SmallVec<T, N> {}

impl<T, const N: usize> FromIterator<T> for SmallVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<T, const N: usize> Extend<T> for SmallVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.len.saturating_add(lower));
        for item in iter {
            self.push(item);
        }
    }
}

impl<T, const N: usize> From<Vec<T>> for SmallVec<T, N> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SmallVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut SmallVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Owning iterator over a [`SmallVec`].
pub struct IntoIter<T, const N: usize> {
    vec: SmallVec<T, N>,
    next: usize,
    end: usize,
}

impl<T, const N: usize> IntoIterator for SmallVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len;
        // The iterator owns the elements from here on; the sequence only
        // keeps the buffer alive.
        self.len = 0;
        IntoIter {
            vec: self,
            next: 0,
            end,
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        // SAFETY: slots in `next..end` are initialized and each is read once.
        let value = unsafe { self.vec.slots()[self.next].assume_init_read() };
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        let remaining = self.end - self.next;
        // SAFETY: the unread slots are still initialized.
        unsafe {
            let base = self.vec.as_mut_ptr().add(self.next);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, remaining));
        }
    }
}

impl<T: Serialize, const N: usize> Serialize for SmallVec<T, N> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
#[path = "../../tests/src/common/small_vec_tests.rs"]
mod tests;
