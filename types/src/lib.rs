//! Core domain types for logdiag.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The pattern engine in `logdiag-core` produces these types and the watch
//! layer in `logdiag-watch` publishes them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod diagnostic;
mod pattern;

pub use diagnostic::{
    DEFAULT_SOURCE_LABEL, Diagnostic, DiagnosticSeverity, DiagnosticsByFile, Location, Position,
    Range, RelatedInformation, Severity,
};
pub use pattern::{ErrorInfo, GroupIndices, PatternSpec, PatternSpecError};
