// ─────────────────────────────────────────────────────────────────────
// Jetshim — Area Capability Shim
// ─────────────────────────────────────────────────────────────────────
//! Uniform per-jet area queries over both engine variants.
//!
//! The variant is fixed at build time by the `full` feature and exposed
//! as [`ActiveBackend`]. Callers use [`jet_has_area`], [`jet_area`] and
//! [`jet_area_error`]; under the reduced variant those answer `false`,
//! [`AREA_SENTINEL`] and [`AREA_SENTINEL`] for every jet. Real areas are
//! never negative, so the sentinel is unambiguous.

use jetshim_engine::Jet;

/// "Area not available".
pub const AREA_SENTINEL: f64 = -1.0;

/// Per-jet area queries for one engine variant.
pub trait AreaCapability {
    const NAME: &'static str;
    const SUPPORTS_AREA: bool;

    fn has_area(jet: &Jet<'_>) -> bool;
    fn area(jet: &Jet<'_>) -> f64;
    fn area_error(jet: &Jet<'_>) -> f64;
}

/// Engine without area support.
pub struct ReducedBackend;

impl AreaCapability for ReducedBackend {
    const NAME: &'static str = "reduced";
    const SUPPORTS_AREA: bool = false;

    fn has_area(_jet: &Jet<'_>) -> bool {
        false
    }

    fn area(_jet: &Jet<'_>) -> f64 {
        AREA_SENTINEL
    }

    fn area_error(_jet: &Jet<'_>) -> f64 {
        AREA_SENTINEL
    }
}

/// Area-capable engine. A jet has an area only if its sequence was
/// built with an area definition.
#[cfg(feature = "full")]
pub struct FullBackend;

#[cfg(feature = "full")]
impl AreaCapability for FullBackend {
    const NAME: &'static str = "full";
    const SUPPORTS_AREA: bool = true;

    fn has_area(jet: &Jet<'_>) -> bool {
        jet.has_area()
    }

    fn area(jet: &Jet<'_>) -> f64 {
        jet.area().unwrap_or(AREA_SENTINEL)
    }

    fn area_error(jet: &Jet<'_>) -> f64 {
        jet.area_error().unwrap_or(AREA_SENTINEL)
    }
}

#[cfg(feature = "full")]
pub type ActiveBackend = FullBackend;

#[cfg(not(feature = "full"))]
pub type ActiveBackend = ReducedBackend;

pub const USING_FULL_BACKEND: bool = <ActiveBackend as AreaCapability>::SUPPORTS_AREA;

pub fn jet_has_area(jet: &Jet<'_>) -> bool {
    ActiveBackend::has_area(jet)
}

pub fn jet_area(jet: &Jet<'_>) -> f64 {
    ActiveBackend::area(jet)
}

pub fn jet_area_error(jet: &Jet<'_>) -> f64 {
    ActiveBackend::area_error(jet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetshim_engine::{ClusterSequence, JetDefinition};
    use jetshim_types::PseudoJet;

    fn particles() -> Vec<PseudoJet> {
        vec![
            PseudoJet::from_pt_y_phi(60.0, 0.0, 1.0),
            PseudoJet::from_pt_y_phi(15.0, 0.2, 1.1),
            PseudoJet::from_pt_y_phi(40.0, -0.6, 4.0),
        ]
    }

    #[test]
    fn test_reduced_backend_sentinels() {
        for (r, p) in [(0.4, -1), (0.8, 0), (1.2, 1)] {
            let seq = ClusterSequence::new(particles(), JetDefinition::new(r, p).unwrap()).unwrap();
            for jet in seq.inclusive_jets(0.0) {
                assert!(!ReducedBackend::has_area(&jet));
                assert_eq!(ReducedBackend::area(&jet), AREA_SENTINEL);
                assert_eq!(ReducedBackend::area_error(&jet), AREA_SENTINEL);
            }
        }
    }

    #[test]
    fn test_active_backend_matches_feature() {
        assert_eq!(USING_FULL_BACKEND, cfg!(feature = "full"));
        assert_eq!(
            <ActiveBackend as AreaCapability>::NAME,
            if cfg!(feature = "full") { "full" } else { "reduced" }
        );
    }

    #[test]
    fn test_plain_run_reports_no_area() {
        let seq = ClusterSequence::new(particles(), JetDefinition::new(0.4, -1).unwrap()).unwrap();
        for jet in seq.inclusive_jets(0.0) {
            assert!(!jet_has_area(&jet));
            assert_eq!(jet_area(&jet), AREA_SENTINEL);
            assert_eq!(jet_area_error(&jet), AREA_SENTINEL);
        }
    }

    #[cfg(feature = "full")]
    #[test]
    fn test_full_backend_area_run() {
        use jetshim_engine::{AreaDefinition, AreaType, GhostedAreaSpec};

        let area_def = AreaDefinition::new(
            AreaType::Active,
            GhostedAreaSpec {
                ghost_maxrap: 2.0,
                ghost_area: 0.05,
                ..Default::default()
            },
        )
        .unwrap();
        let seq = ClusterSequence::with_area(
            particles(),
            JetDefinition::new(0.4, -1).unwrap(),
            &area_def,
        )
        .unwrap();
        for jet in seq.inclusive_jets(0.0) {
            assert!(jet_has_area(&jet));
            assert!(jet_area(&jet) >= 0.0);
            assert!(jet_area_error(&jet) >= 0.0);
        }
    }
}
