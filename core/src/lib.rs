//! Build log pattern engine.
//!
//! Turns an unstructured build log into diagnostics grouped by target file:
//!
//! ```text
//! content -> lines -> classify (PatternSet) -> map_severity -> DiagnosticAssembler
//!                                                                   |
//!                                                                   v
//!                                                           DiagnosticsByFile
//! ```
//!
//! Nothing here performs IO; callers read the log and publish the result.

mod assemble;
mod classify;
mod path;
mod pattern;
pub mod presets;
mod severity;

pub use assemble::DiagnosticAssembler;
pub use classify::classify;
pub use path::{normalize_path, resolve_target};
pub use pattern::{CompiledPattern, PatternInvalid, PatternSet};
pub use severity::map_severity;
