/// Filesystem line readers.
pub mod fs;
