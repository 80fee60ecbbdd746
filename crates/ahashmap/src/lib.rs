#[cfg(feature = "ahash")]
pub type RandomState = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
pub type RandomState = std::collections::hash_map::RandomState;

pub type AHashMap<K, V> = std::collections::HashMap<K, V, RandomState>;
pub type AHashSet<T> = std::collections::HashSet<T, RandomState>;

pub use std::collections::hash_map;
pub use std::collections::hash_set;
