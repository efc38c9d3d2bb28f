use std::collections::HashMap;
use std::hash::Hash;

/// Registry mapping a discriminant to a handler, with an optional fallback.
///
/// Handlers are plain `Copy` values (usually `fn` pointers). [`Dispatcher::execute`]
/// hands the selected handler to a caller-supplied invoker so the table works
/// for any handler signature; when no handler and no fallback exist the
/// invoker is skipped and `R::default()` is returned.
#[derive(Debug, Clone)]
pub struct Dispatcher<K, H> {
    handlers: HashMap<K, H>,
    fallback: Option<H>,
}

impl<K, H> Default for Dispatcher<K, H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: None,
        }
    }
}

impl<K: Eq + Hash, H: Copy> Dispatcher<K, H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: K,
        handler: H,
    ) -> &mut Self {
        self.handlers.insert(key, handler);
        self
    }

    /// Register `handler` for every key in `keys`.
    pub fn register_all(
        &mut self,
        keys: impl IntoIterator<Item = K>,
        handler: H,
    ) -> &mut Self {
        for key in keys {
            self.handlers.insert(key, handler);
        }
        self
    }

    pub fn set_fallback(
        &mut self,
        handler: H,
    ) -> &mut Self {
        self.fallback = Some(handler);
        self
    }

    pub fn is_registered(
        &self,
        key: &K,
    ) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered handler for `key`, else the fallback.
    pub fn handler(
        &self,
        key: &K,
    ) -> Option<H> {
        self.handlers.get(key).copied().or(self.fallback)
    }

    pub fn execute<R: Default>(
        &self,
        key: &K,
        invoke: impl FnOnce(H) -> R,
    ) -> R {
        match self.handler(key) {
            Some(handler) => invoke(handler),
            None => R::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/common/dispatcher_tests.rs"]
mod tests;
