//! Seed lifecycle orchestration.
//!
//! One run walks a fixed sequence of states:
//!
//! ```text
//! Start → SeedSelected → Reseeded → Drawn → Persisted → Done
//!             │              │          │
//!             └──────────────┴──→ Failed(kind)     (persist failure → Done)
//! ```
//!
//! Output is handed to the caller only once `Drawn` is reached, so no
//! failure path can emit partial bytes. Persistence runs after delivery
//! and its failure never fails the run.

mod manager;

pub use manager::{FailureKind, LifecycleError, LifecycleState, RunReport, SeedLifecycle};
