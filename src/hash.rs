use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::types::RecordId;

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

pub fn stable_hash_ids(batch_size: usize, ids: &[RecordId]) -> u64 {
    stable_hash_with(|hasher| {
        batch_size.hash(hasher);
        ids.hash(hasher);
    })
}
