//! Stable handles into growable storage.
//!
//! A [`Handle`] names "the element at index `i` of store `S`" instead of an
//! address, so it stays valid while the store grows and reallocates. The
//! store is identified by a process-unique [`StoreId`]; resolving a handle
//! against a different store yields `None`.

use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};

use super::small_vec::SmallVec;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(NonZeroU64);

impl StoreId {
    fn next() -> Self {
        let raw = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at one and would need 2^64 stores to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }
}

pub struct Handle<T> {
    store: Option<StoreId>,
    index: usize,
    _target: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub const fn null() -> Self {
        Self {
            store: None,
            index: 0,
            _target: PhantomData,
        }
    }

    fn new(
        store: StoreId,
        index: usize,
    ) -> Self {
        Self {
            store: Some(store),
            index,
            _target: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.store.is_none()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn store_id(&self) -> Option<StoreId> {
        self.store
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.store == other.store && self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.store.hash(state);
        self.index.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        match self.store {
            Some(store) => write!(f, "Handle({}#{})", store.0, self.index),
            None => f.write_str("Handle(null)"),
        }
    }
}

/// Serialized as the element index, or `null` for a null handle.
impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.store {
            Some(_) => serializer.serialize_some(&self.index),
            None => serializer.serialize_none(),
        }
    }
}

/// Append-only owner of `T` values that hands out [`Handle`]s.
pub struct Store<T, const N: usize> {
    id: StoreId,
    items: SmallVec<T, N>,
}

impl<T, const N: usize> Default for Store<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Store<T, N> {
    pub fn new() -> Self {
        Self {
            id: StoreId::next(),
            items: SmallVec::new(),
        }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(
        &mut self,
        value: T,
    ) -> Handle<T> {
        let index = self.items.len();
        self.items.push(value);
        Handle::new(self.id, index)
    }

    /// Handle for an existing index, or `None` past the end.
    pub fn handle(
        &self,
        index: usize,
    ) -> Option<Handle<T>> {
        (index < self.items.len()).then(|| Handle::new(self.id, index))
    }

    fn owns(
        &self,
        handle: Handle<T>,
    ) -> bool {
        handle.store == Some(self.id)
    }

    pub fn get(
        &self,
        handle: Handle<T>,
    ) -> Option<&T> {
        if !self.owns(handle) {
            return None;
        }
        self.items.get(handle.index)
    }

    pub fn get_mut(
        &mut self,
        handle: Handle<T>,
    ) -> Option<&mut T> {
        if !self.owns(handle) {
            return None;
        }
        self.items.get_mut(handle.index)
    }

    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let id = self.id;
        self.items.iter().enumerate().map(move |(index, item)| (Handle::new(id, index), item))
    }
}

#[cfg(test)]
#[path = "../../tests/src/common/handle_tests.rs"]
mod tests;
