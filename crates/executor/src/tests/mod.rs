//! Test modules for the executor crate.

pub mod guard;

use editlog_core::OpRegistry;
use editlog_durability::testing::SampleEdits;
use std::path::{Path, PathBuf};

/// Write the standard sample log to `dir/name` and return its path.
pub(crate) fn write_sample(dir: &Path, name: &str, pad_to: Option<u64>) -> PathBuf {
    let registry = OpRegistry::standard();
    let path = dir.join(name);
    SampleEdits::new(&registry)
        .write_binary(&path, pad_to)
        .unwrap();
    path
}
