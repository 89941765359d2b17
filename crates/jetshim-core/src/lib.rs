// ─────────────────────────────────────────────────────────────────────
// Jetshim — Bridge Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Boundary layer between raw particle buffers and the clustering engine.
//!
//! raw buffer → [`convert`] → `Vec<PseudoJet>` → [`invoker`] →
//! `ClusterSequence` → caller walks jets → [`capability`] per jet.
//!
//! # Invariants
//!
//! 1. **No out-of-bounds reads**: buffer shape is validated before any
//!    record is touched; a mismatch is `JetError::InvalidInput`.
//! 2. **Identical calling code under both engine variants**: area queries
//!    go through `ActiveBackend`, chosen by the `full` feature. The
//!    reduced variant answers `false` / `-1` / `-1`.
//! 3. **Engine failures never escape unencoded**: every engine call runs
//!    inside [`translate::guard`], which also catches panics. Messages
//!    are right-trimmed.

pub mod capability;
pub mod convert;
pub mod diagnostics;
pub mod invoker;
pub mod pipeline;
pub mod translate;

pub use capability::{
    jet_area, jet_area_error, jet_has_area, ActiveBackend, AreaCapability, ReducedBackend,
    AREA_SENTINEL, USING_FULL_BACKEND,
};
pub use convert::{
    convert_records, convert_records_indexed, convert_records_into, ep_to_ptepm, ptepm_to_ep,
};
pub use diagnostics::{configure_diagnostics, diagnostics_configured};
pub use invoker::{cluster, definition_from_name};
pub use pipeline::Clusterer;
pub use translate::guard;

#[cfg(feature = "full")]
pub use capability::FullBackend;
#[cfg(feature = "full")]
pub use invoker::{area_definition_from_name, cluster_with_area};
