//! CLI command handlers, one per file.

mod collect;
mod completions;
mod fingerprint;
mod list;

pub use collect::run_collect;
pub use completions::run_completions;
pub use fingerprint::run_fingerprint;
pub use list::run_list;
