// ─────────────────────────────────────────────────────────────────────
// Jetshim — Clustering Invoker
// ─────────────────────────────────────────────────────────────────────
//! Builds the generalized-kt jet definition and runs the engine.
//!
//! The returned `ClusterSequence` is owned by the caller; jets borrowed
//! from it cannot outlive it.

use jetshim_engine::{ClusterSequence, JetDefinition};
use jetshim_types::{JetResult, PseudoJet};

#[cfg(feature = "full")]
use jetshim_engine::AreaDefinition;

use crate::translate::guard;

/// Resolve an algorithm name (`genkt`, `kt`, `cambridge`, `antikt`) and
/// its parameters. Rejections come from the engine, so they surface as
/// `JetError::Clustering` like any other engine failure.
pub fn definition_from_name(
    algo: &str,
    radius: Option<f64>,
    power: Option<i32>,
) -> JetResult<JetDefinition> {
    guard(|| JetDefinition::from_name(algo, radius, power))
}

/// Resolve an area type name with the default ghost placement.
#[cfg(feature = "full")]
pub fn area_definition_from_name(name: &str) -> JetResult<AreaDefinition> {
    guard(|| AreaDefinition::from_name(name))
}

/// Cluster `particles` with generalized-kt of radius `radius` and power
/// `power` (1 = kt, 0 = Cambridge/Aachen, -1 = anti-kt).
pub fn cluster(particles: Vec<PseudoJet>, radius: f64, power: i32) -> JetResult<ClusterSequence> {
    let n = particles.len();
    let seq = guard(|| {
        let definition = JetDefinition::new(radius, power)?;
        ClusterSequence::new(particles, definition)
    })?;
    log::debug!("cluster: {n} particles, R = {radius}, p = {power}");
    Ok(seq)
}

/// As [`cluster`], with an active area attached to every jet.
#[cfg(feature = "full")]
pub fn cluster_with_area(
    particles: Vec<PseudoJet>,
    radius: f64,
    power: i32,
    area_definition: &AreaDefinition,
) -> JetResult<ClusterSequence> {
    let n = particles.len();
    let seq = guard(|| {
        let definition = JetDefinition::new(radius, power)?;
        ClusterSequence::with_area(particles, definition, area_definition)
    })?;
    log::debug!(
        "cluster_with_area: {n} particles, R = {radius}, p = {power}, {:?}",
        area_definition.area_type()
    );
    Ok(seq)
}
