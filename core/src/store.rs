use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::cell::RefCell;

use crate::*;

/// String-keyed, string-valued storage backend.
///
/// Browser stores are process-wide singletons, so every operation takes `&self`.
pub trait KeyValueStore {
    /// Returns the stored value, `Ok(None)` when the key is missing.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`, succeeding when it was already missing.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store, used natively and as the fake in tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            values: RefCell::new(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Legacy tier for platforms that never had one, always empty.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NoLegacy;

impl KeyValueStore for NoLegacy {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use core::cell::Cell;

    /// Wraps a store and counts how often it is touched.
    #[derive(Debug, Default)]
    pub(crate) struct CountingStore {
        pub inner: MemoryStore,
        pub gets: Cell<usize>,
        pub sets: Cell<usize>,
        pub removes: Cell<usize>,
    }

    impl CountingStore {
        pub fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                ..Default::default()
            }
        }

        pub fn accesses(&self) -> usize {
            self.gets.get() + self.sets.get() + self.removes.get()
        }
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.gets.set(self.gets.get() + 1);
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.sets.set(self.sets.get() + 1);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.removes.set(self.removes.get() + 1);
            self.inner.remove(key)
        }
    }

    /// Wraps a store and fails its first `failures` removals.
    #[derive(Debug, Default)]
    pub(crate) struct StickyStore {
        pub inner: MemoryStore,
        failures: Cell<usize>,
    }

    impl StickyStore {
        pub fn new(inner: MemoryStore, failures: usize) -> Self {
            Self {
                inner,
                failures: Cell::new(failures),
            }
        }
    }

    impl KeyValueStore for StickyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            match self.failures.get() {
                0 => self.inner.remove(key),
                left => {
                    self.failures.set(left - 1);
                    Err(StoreError::Remove {
                        key: key.to_string(),
                        reason: "cookie is locked".to_string(),
                    })
                }
            }
        }
    }

    /// A store whose every operation fails.
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Err(StoreError::Read {
                key: key.to_string(),
                reason: "unavailable".to_string(),
            })
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&self, key: &str) -> Result<()> {
            Err(StoreError::Remove {
                key: key.to_string(),
                reason: "unavailable".to_string(),
            })
        }
    }
}
