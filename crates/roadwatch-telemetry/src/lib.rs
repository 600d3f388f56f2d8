//! Data directory resolution, JSONL run log and atomic file helpers

mod io;
mod paths;
mod types;

pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use paths::{Paths, HOME_ENV};
pub use types::RunRecord;
