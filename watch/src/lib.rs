//! Build-log watching: wildcard expansion, a polling watcher task, and the
//! session that turns log changes into published diagnostics.

pub mod types;

pub(crate) mod diagnostics;
pub(crate) mod poller;

mod session;
mod sink;
mod wildcard;

pub use diagnostics::DiagnosticsStore;
pub use session::WatchSession;
pub use sink::{DiagnosticSink, publish};
pub use types::{
    DiagnosticsSnapshot, Notice, NoticeLevel, SeverityCounts, WatchError, WatchEvent,
};
pub use wildcard::{Expansion, expand};
