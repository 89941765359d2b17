// ─────────────────────────────────────────────────────────────────────
// Jetshim — Convert-and-Cluster Pipeline
// ─────────────────────────────────────────────────────────────────────
//! `Clusterer`: one validated `ClusterConfig`, reused for many events.

use jetshim_engine::ClusterSequence;
use jetshim_types::{ClusterConfig, JetResult, PseudoJet};

#[cfg(feature = "full")]
use jetshim_engine::{AreaDefinition, AreaType, GhostedAreaSpec};
#[cfg(feature = "full")]
use jetshim_types::{AreaConfig, AreaKind};

use crate::convert::convert_records;
use crate::invoker;
#[cfg(feature = "full")]
use crate::translate::guard;

pub struct Clusterer {
    config: ClusterConfig,
    #[cfg(feature = "full")]
    area: Option<AreaDefinition>,
}

#[cfg(feature = "full")]
fn area_definition(config: &AreaConfig) -> JetResult<AreaDefinition> {
    let area_type = match config.kind {
        AreaKind::Active => AreaType::Active,
        AreaKind::ActiveExplicitGhosts => AreaType::ActiveExplicitGhosts,
    };
    let spec = GhostedAreaSpec {
        ghost_maxrap: config.ghost_maxrap,
        ghost_area: config.ghost_area,
        grid_scatter: config.grid_scatter,
        repeat: config.repeat,
        seed: config.seed,
        ..Default::default()
    };
    guard(|| AreaDefinition::new(area_type, spec))
}

impl Clusterer {
    pub fn new(config: ClusterConfig) -> JetResult<Self> {
        config.validate()?;

        #[cfg(feature = "full")]
        {
            let area = config.area.as_ref().map(area_definition).transpose()?;
            Ok(Self { config, area })
        }

        #[cfg(not(feature = "full"))]
        {
            if config.area.is_some() {
                log::warn!("area requested but this engine has no area support; areas read as -1");
            }
            Ok(Self { config })
        }
    }

    /// Construct from JSON string.
    pub fn from_json(json: &str) -> JetResult<Self> {
        Self::new(ClusterConfig::from_json(json)?)
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Whether sequences from this clusterer carry jet areas.
    pub fn computes_areas(&self) -> bool {
        #[cfg(feature = "full")]
        {
            self.area.is_some()
        }
        #[cfg(not(feature = "full"))]
        {
            false
        }
    }

    /// Convert `count` records of the configured encoding.
    pub fn convert(&self, buffer: &[f64], count: usize) -> JetResult<Vec<PseudoJet>> {
        let encoding = self.config.encoding;
        convert_records(buffer, count, encoding.fields(), self.config.eta_max, encoding)
    }

    /// Cluster already-converted particles.
    pub fn cluster(&self, particles: Vec<PseudoJet>) -> JetResult<ClusterSequence> {
        #[cfg(feature = "full")]
        {
            if let Some(area) = &self.area {
                return invoker::cluster_with_area(
                    particles,
                    self.config.radius,
                    self.config.power,
                    area,
                );
            }
        }
        invoker::cluster(particles, self.config.radius, self.config.power)
    }

    /// Convert then cluster.
    pub fn run(&self, buffer: &[f64], count: usize) -> JetResult<ClusterSequence> {
        let particles = self.convert(buffer, count)?;
        self.cluster(particles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{jet_area, jet_has_area, AREA_SENTINEL};
    use jetshim_types::{AreaConfig, Encoding, JetError};

    const TWO_EP: [f64; 8] = [10.0, 3.0, 4.0, 0.0, 5.0, 0.0, 0.0, 5.0];

    #[test]
    fn test_default_pipeline() {
        let clusterer = Clusterer::new(ClusterConfig {
            encoding: Encoding::Ep,
            ..Default::default()
        })
        .unwrap();
        let seq = clusterer.run(&TWO_EP, 2).unwrap();
        assert_eq!(seq.n_particles(), 2);
        assert!(!clusterer.computes_areas());
    }

    #[test]
    fn test_eta_cut_applied() {
        let clusterer = Clusterer::new(ClusterConfig {
            encoding: Encoding::Ep,
            eta_max: 0.1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(clusterer.run(&TWO_EP, 2).unwrap().n_particles(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Clusterer::new(ClusterConfig {
            radius: -1.0,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, JetError::Config(_)));
    }

    #[test]
    fn test_shape_error_propagates() {
        let clusterer = Clusterer::new(ClusterConfig::default()).unwrap();
        assert!(matches!(
            clusterer.run(&TWO_EP, 5),
            Err(JetError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let clusterer = Clusterer::from_json(r#"{"radius": 0.6, "power": 1, "encoding": "ep"}"#).unwrap();
        assert_eq!(clusterer.config().power, 1);
        let seq = clusterer.run(&TWO_EP, 2).unwrap();
        assert!((seq.definition().r() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_area_config_follows_backend() {
        let clusterer = Clusterer::new(ClusterConfig {
            encoding: Encoding::Ep,
            area: Some(AreaConfig {
                ghost_maxrap: 2.0,
                ghost_area: 0.05,
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(clusterer.computes_areas(), cfg!(feature = "full"));

        let seq = clusterer.run(&[10.0, 3.0, 4.0, 0.0], 1).unwrap();
        for jet in seq.inclusive_jets(0.0) {
            if cfg!(feature = "full") {
                assert!(jet_has_area(&jet));
                assert!(jet_area(&jet) > 0.0);
            } else {
                assert!(!jet_has_area(&jet));
                assert_eq!(jet_area(&jet), AREA_SENTINEL);
            }
        }
    }
}
