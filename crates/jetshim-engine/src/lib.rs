// ─────────────────────────────────────────────────────────────────────
// Jetshim — Clustering Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Generalized-kt sequential recombination engine.
//!
//! Two build variants exist:
//! - with the `area` feature ("full"), sequences can be built with an
//!   [`AreaDefinition`] and every jet reports an active area;
//! - without it ("reduced"), the area API is absent altogether.
//!
//! # Invariants
//!
//! 1. **History is complete**: a sequence over N particles has exactly 2N
//!    history entries (N originals, then N merge-or-beam steps).
//! 2. **Four-momentum is conserved**: the inclusive jets of a sequence sum
//!    to the sum of its input particles (E-scheme recombination).
//! 3. **Jets borrow their sequence**: a [`Jet`] cannot outlive the
//!    [`ClusterSequence`] that produced it.

pub mod definition;
pub mod diagnostics;
pub mod error;
pub mod sequence;

#[cfg(feature = "area")]
pub mod area;

pub use definition::JetDefinition;
pub use diagnostics::BannerSink;
pub use error::{EngineError, EngineResult};
pub use sequence::{sorted_by_pt, ClusterSequence, HistoryElement, Jet, Step};

#[cfg(feature = "area")]
pub use area::{AreaDefinition, AreaType, GhostedAreaSpec, JetArea};
