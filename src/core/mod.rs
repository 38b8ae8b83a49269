//! Immutable run-scoped state.
//!
//! Everything the run decides up front lives here: the probed host
//! environment and the resolved install plan. Both are computed once in
//! `main` and threaded explicitly through every operation instead of being
//! re-queried from globals at arbitrary points.

pub mod host;
pub mod plan;

pub use host::{HostEnvironment, OsFamily};
pub use plan::InstallPlan;
