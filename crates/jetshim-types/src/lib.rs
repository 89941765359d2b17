// ─────────────────────────────────────────────────────────────────────
// Jetshim — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Canonical four-momentum, clustering configuration, and the error
//! hierarchy shared by every Jetshim crate.

pub mod config;
pub mod error;
pub mod momentum;

pub use config::{AreaConfig, AreaKind, ClusterConfig, Encoding};
pub use error::{JetError, JetResult};
pub use momentum::{rap_phi_distance2, PseudoJet, MAX_RAP};
