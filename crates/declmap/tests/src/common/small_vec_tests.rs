use std::cell::Cell;
use std::rc::Rc;

use super::*;

#[derive(Default)]
struct Counters {
    clones: Cell<usize>,
    drops: Cell<usize>,
}

impl Counters {
    fn reset(&self) {
        self.clones.set(0);
        self.drops.set(0);
    }
}

#[derive(Debug)]
struct Tracked {
    value: i32,
    counters: Rc<Counters>,
}

impl Tracked {
    fn new(
        counters: &Rc<Counters>,
        value: i32,
    ) -> Self {
        Self {
            value,
            counters: Rc::clone(counters),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.counters.clones.set(self.counters.clones.get() + 1);
        Self {
            value: self.value,
            counters: Rc::clone(&self.counters),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.drops.set(self.counters.drops.get() + 1);
    }
}

impl std::fmt::Debug for Counters {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Counters(clones={}, drops={})", self.clones.get(), self.drops.get())
    }
}

fn tracked_items<const N: usize>(
    counters: &Rc<Counters>,
    count: i32,
) -> SmallVec<Tracked, N> {
    (0..count).map(|v| Tracked::new(counters, v)).collect()
}

fn values<const N: usize>(v: &SmallVec<Tracked, N>) -> Vec<i32> {
    v.iter().map(|t| t.value).collect()
}

fn filled<const N: usize>(range: std::ops::Range<i32>) -> SmallVec<i32, N> {
    range.collect()
}

#[test]
fn new_sequence_uses_inline_capacity() {
    let v: SmallVec<u64, 20> = SmallVec::new();
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 20);
    assert!(v.is_inline());
}

#[test]
fn zero_inline_capacity_starts_on_the_heap() {
    let mut v: SmallVec<i32, 0> = SmallVec::new();
    assert_eq!(v.capacity(), 0);

    v.push(7);
    assert!(!v.is_inline());
    assert_eq!(v.capacity(), 1);
    v.extend([8, 9]);
    assert_eq!(v.capacity(), 4);
    assert_eq!(v.as_slice(), &[7, 8, 9]);
}

#[test]
fn pushes_within_inline_capacity_stay_inline() {
    let mut v: SmallVec<i32, 8> = SmallVec::new();
    for i in 0..8 {
        v.push(i);
        assert!(v.is_inline(), "push #{i} should not spill");
        assert_eq!(v.capacity(), 8);
    }
    assert_eq!(v.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn spilled_capacity_is_smallest_power_of_two() {
    for n in 1..=40usize {
        let mut v: SmallVec<usize, 5> = SmallVec::new();
        for i in 0..n {
            v.push(i);
        }
        if n <= 5 {
            assert!(v.is_inline());
            assert_eq!(v.capacity(), 5);
        } else {
            assert!(!v.is_inline());
            assert_eq!(v.capacity(), n.next_power_of_two(), "n = {n}");
        }
        assert_eq!(v.len(), n);
        assert!(v.iter().copied().eq(0..n));
    }
}

#[test]
fn move_push_never_clones() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 20> = tracked_items(&counters, 10);
    counters.reset();

    v.push(Tracked::new(&counters, 999));

    assert_eq!(v.len(), 11);
    assert_eq!(v.back().map(|t| t.value), Ok(999));
    assert_eq!(counters.clones.get(), 0);
    assert_eq!(counters.drops.get(), 0);
}

#[test]
fn copy_push_clones_exactly_once() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 20> = tracked_items(&counters, 10);
    let added = Tracked::new(&counters, 999);
    counters.reset();

    v.push(added.clone());

    assert_eq!(v.len(), 11);
    assert_eq!(v.back().map(|t| t.value), Ok(added.value));
    assert_eq!(counters.clones.get(), 1);
}

#[test]
fn growth_moves_elements_without_cloning() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 2> = SmallVec::new();
    for i in 0..17 {
        v.push(Tracked::new(&counters, i));
    }
    assert_eq!(v.capacity(), 32);
    assert_eq!(counters.clones.get(), 0);
    assert_eq!(counters.drops.get(), 0);
    assert_eq!(values(&v), (0..17).collect::<Vec<_>>());
}

#[test]
fn reserve_rounds_up_and_never_shrinks() {
    let mut v: SmallVec<i32, 4> = filled(0..3);

    v.reserve(3);
    assert!(v.is_inline());
    assert_eq!(v.capacity(), 4);

    v.reserve(9);
    assert!(!v.is_inline());
    assert_eq!(v.capacity(), 16);
    assert_eq!(v.as_slice(), &[0, 1, 2]);

    v.reserve(16);
    assert_eq!(v.capacity(), 16);
    v.reserve(2);
    assert_eq!(v.capacity(), 16);
}

#[test]
fn shrink_to_fit_after_growth_and_removal() {
    let mut v: SmallVec<i32, 4> = filled(0..10);
    assert_eq!(v.capacity(), 16);

    v.remove_range(0..7).expect("valid range");
    // Removal already dropped to the next power of two.
    assert_eq!(v.capacity(), 4);

    v.shrink_to_fit();
    assert_eq!(v.capacity(), 3);
    assert_eq!(v.capacity(), v.len());
    assert!(!v.is_inline(), "never migrates back to inline storage");
    assert_eq!(v.as_slice(), &[7, 8, 9]);
}

#[test]
fn shrink_to_fit_keeps_inline_capacity() {
    let mut v: SmallVec<i32, 8> = filled(0..3);
    v.shrink_to_fit();
    assert!(v.is_inline());
    assert_eq!(v.capacity(), 8);
}

#[test]
fn pop_reallocates_down_to_power_of_two() {
    let mut v: SmallVec<i32, 2> = filled(0..9);
    assert_eq!(v.capacity(), 16);

    assert_eq!(v.pop(), Some(8));
    assert_eq!(v.capacity(), 8);

    assert_eq!(v.pop(), Some(7));
    assert_eq!(v.pop(), Some(6));
    assert_eq!(v.pop(), Some(5));
    assert_eq!(v.capacity(), 8);

    assert_eq!(v.pop(), Some(4));
    assert_eq!(v.len(), 4);
    assert_eq!(v.capacity(), 4);
    assert!(!v.is_inline());
    assert_eq!(v.as_slice(), &[0, 1, 2, 3]);
}

#[test]
fn pop_on_empty_returns_none() {
    let mut v: SmallVec<i32, 2> = SmallVec::new();
    assert_eq!(v.pop(), None);
    assert_eq!(v.capacity(), 2);
}

#[test]
fn insert_shifts_suffix_without_cloning() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 4> = tracked_items(&counters, 5);
    counters.reset();

    v.insert(2, Tracked::new(&counters, 99)).expect("in range");

    assert_eq!(values(&v), vec![0, 1, 99, 2, 3, 4]);
    assert_eq!(counters.clones.get(), 0);
    assert_eq!(counters.drops.get(), 0);
}

#[test]
fn insert_at_end_appends() {
    let mut v: SmallVec<i32, 4> = filled(1..4);
    v.insert(3, 9).expect("end position is valid");
    assert_eq!(v.as_slice(), &[1, 2, 3, 9]);
    assert!(v.is_inline());
}

#[test]
fn insert_out_of_range_fails() {
    let mut v: SmallVec<i32, 4> = filled(1..4);
    assert_eq!(
        v.insert(4, 9),
        Err(SmallVecError::IndexOutOfRange {
            index: 4,
            len: 3
        })
    );
    assert_eq!(v.as_slice(), &[1, 2, 3]);
}

#[test]
fn insert_from_slice_clones_each_item_once() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 4> = tracked_items(&counters, 4);
    let extra = vec![Tracked::new(&counters, 10), Tracked::new(&counters, 11), Tracked::new(&counters, 12)];
    counters.reset();

    v.insert_from_slice(1, &extra).expect("in range");

    assert_eq!(values(&v), vec![0, 10, 11, 12, 1, 2, 3]);
    assert_eq!(counters.clones.get(), 3);
    assert_eq!(v.capacity(), 8);
}

#[test]
fn remove_preserves_order_and_rejects_bad_index() {
    let mut v: SmallVec<i32, 4> = filled(0..6);

    assert_eq!(v.remove(2), Ok(2));
    assert_eq!(v.as_slice(), &[0, 1, 3, 4, 5]);

    assert_eq!(
        v.remove(5),
        Err(SmallVecError::IndexOutOfRange {
            index: 5,
            len: 5
        })
    );
    assert_eq!(v.len(), 5);
}

#[test]
fn remove_range_validates_bounds() {
    let mut v: SmallVec<i32, 4> = filled(0..6);
    let (start, end) = (3, 2);

    assert_eq!(
        v.remove_range(start..end),
        Err(SmallVecError::InvalidRange {
            start: 3,
            end: 2,
            len: 6
        })
    );
    assert_eq!(
        v.remove_range(0..10),
        Err(SmallVecError::InvalidRange {
            start: 0,
            end: 10,
            len: 6
        })
    );

    v.remove_range(1..3).expect("valid range");
    assert_eq!(v.as_slice(), &[0, 3, 4, 5]);
}

#[test]
fn remove_range_drops_each_removed_element_once() {
    let counters = Rc::new(Counters::default());
    let mut v: SmallVec<Tracked, 4> = tracked_items(&counters, 8);
    counters.reset();

    v.remove_range(2..5).expect("valid range");

    assert_eq!(counters.drops.get(), 3);
    assert_eq!(counters.clones.get(), 0);
    assert_eq!(values(&v), vec![0, 1, 5, 6, 7]);
}

#[test]
fn checked_accessors_report_range_errors() {
    let mut v: SmallVec<i32, 4> = SmallVec::new();
    assert_eq!(
        v.front(),
        Err(SmallVecError::Empty {
            op: "front"
        })
    );
    assert_eq!(
        v.back(),
        Err(SmallVecError::Empty {
            op: "back"
        })
    );
    assert_eq!(
        v.at(0),
        Err(SmallVecError::IndexOutOfRange {
            index: 0,
            len: 0
        })
    );

    v.push(7);
    v.push(8);
    assert_eq!(v.front(), Ok(&7));
    assert_eq!(v.back(), Ok(&8));
    assert_eq!(v.at(1), Ok(&8));
    assert!(v.at(2).is_err());

    *v.at_mut(0).expect("in range") = 70;
    assert_eq!(v[0], 70);
}

#[test]
fn error_messages_name_the_violation() {
    let err = SmallVecError::IndexOutOfRange {
        index: 4,
        len: 3,
    };
    assert_eq!(err.to_string(), "index 4 out of range for length 3");
    let err = SmallVecError::Empty {
        op: "front",
    };
    assert_eq!(err.to_string(), "front() called on an empty sequence");
}

#[test]
fn swap_small_with_small() {
    let mut a: SmallVec<i32, 4> = filled(1..3);
    let mut b: SmallVec<i32, 4> = filled(7..10);

    a.swap_with(&mut b);

    assert_eq!(a.as_slice(), &[7, 8, 9]);
    assert_eq!(b.as_slice(), &[1, 2]);
    assert!(a.is_inline());
    assert!(b.is_inline());
}

#[test]
fn swap_small_with_large_in_both_directions() {
    let mut small: SmallVec<i32, 4> = filled(1..3);
    let mut large: SmallVec<i32, 4> = filled(0..10);

    small.swap_with(&mut large);

    assert!(small.iter().copied().eq(0..10));
    assert_eq!(large.as_slice(), &[1, 2]);
    assert!(!small.is_inline());
    assert!(!large.is_inline(), "heap-backed side stays on the heap");

    small.swap_with(&mut large);
    assert_eq!(small.as_slice(), &[1, 2]);
    assert!(large.iter().copied().eq(0..10));
}

#[test]
fn swap_large_with_large_exchanges_buffers() {
    let mut a: SmallVec<i32, 4> = filled(0..10);
    let mut b: SmallVec<i32, 4> = filled(100..105);
    assert_eq!((a.capacity(), b.capacity()), (16, 8));

    a.swap_with(&mut b);

    assert!(a.iter().copied().eq(100..105));
    assert!(b.iter().copied().eq(0..10));
    assert_eq!((a.capacity(), b.capacity()), (8, 16));
}

#[test]
fn swap_moves_elements_without_cloning() {
    let counters = Rc::new(Counters::default());
    let mut small: SmallVec<Tracked, 4> = tracked_items(&counters, 2);
    let mut large: SmallVec<Tracked, 4> = tracked_items(&counters, 9);
    counters.reset();

    small.swap_with(&mut large);

    assert_eq!(values(&small), (0..9).collect::<Vec<_>>());
    assert_eq!(values(&large), vec![0, 1]);
    assert_eq!(counters.clones.get(), 0);
    assert_eq!(counters.drops.get(), 0);
}

#[test]
fn clone_is_deep() {
    let original: SmallVec<String, 2> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let mut copy = original.clone();
    copy[0].push('!');
    copy.push("d".to_owned());

    assert_eq!(original.as_slice(), &["a", "b", "c"]);
    assert_eq!(copy.as_slice(), &["a!", "b", "c", "d"]);
    assert_eq!(original.capacity(), 4);
}

#[test]
fn drop_releases_every_element_once() {
    let counters = Rc::new(Counters::default());
    {
        let mut v: SmallVec<Tracked, 4> = tracked_items(&counters, 10);
        let removed = v.remove(3).expect("in range");
        drop(removed);
        assert_eq!(counters.drops.get(), 1);
    }
    assert_eq!(counters.drops.get(), 10);
}

#[test]
fn into_iter_drops_unconsumed_elements() {
    let counters = Rc::new(Counters::default());
    let v: SmallVec<Tracked, 4> = tracked_items(&counters, 6);

    let mut iter = v.into_iter();
    let first = iter.next().map(|t| t.value);
    let second = iter.next().map(|t| t.value);
    assert_eq!((first, second), (Some(0), Some(1)));
    assert_eq!(iter.len(), 4);
    drop(iter);

    assert_eq!(counters.drops.get(), 6);
}

#[test]
fn resize_grows_with_clones_and_truncates() {
    let mut v: SmallVec<i32, 4> = filled(0..2);
    v.resize(6, 7);
    assert_eq!(v.as_slice(), &[0, 1, 7, 7, 7, 7]);
    assert_eq!(v.capacity(), 8);

    v.resize(1, 0);
    assert_eq!(v.as_slice(), &[0]);
    assert_eq!(v.capacity(), 1);
}

#[test]
fn clear_keeps_capacity() {
    let mut v: SmallVec<i32, 4> = filled(0..10);
    v.clear();
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 16);
}

#[test]
fn serializes_as_sequence() {
    let v: SmallVec<i32, 2> = filled(1..4);
    assert_eq!(serde_json::to_string(&v).expect("serializable"), "[1,2,3]");
}
