//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use mcommon::{MetadataMap, Registry, SessionId};
//!
//! let session = SessionId::from("conversation-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let mut registry = Registry::new();
//! registry.insert("search".to_string(), 1_u32);
//!
//! assert_eq!(session.as_str(), "conversation-1");
//! assert_eq!(registry.get("search"), Some(&1));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use mcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and the conversation identifier newtype.
    //!
    //! ```rust
    //! use mcommon::{MetadataMap, SessionId};
    //!
    //! let session = SessionId::new("session-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("env".to_string(), "test".to_string());
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    /// Identifies the conversation an orchestrator instance serves.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Default for SessionId {
        fn default() -> Self {
            Self::new("default")
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod registry {
    //! Insertion-ordered registry map used by name-addressed tables.
    //!
    //! Re-inserting an existing key replaces the value in place, so the last
    //! registration wins while iteration keeps the first registration's position.
    //!
    //! ```rust
    //! use mcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("beta".to_string(), 1_u32);
    //! registry.insert("alpha".to_string(), 2_u32);
    //! registry.insert("beta".to_string(), 3_u32);
    //!
    //! assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["beta", "alpha"]);
    //! assert_eq!(registry.get("beta"), Some(&3));
    //! ```

    use std::borrow::Borrow;
    use std::hash::Hash;

    use indexmap::IndexMap;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: IndexMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: IndexMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns the replaced value when `key` was already registered.
        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.shift_remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, SessionId};
pub use future::BoxFuture;
pub use registry::Registry;
