// ─────────────────────────────────────────────────────────────────────
// Jetshim — Clustering Configuration
// ─────────────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JetError, JetResult};

/// Field layout of an input particle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// `(E, px, py, pz)`.
    Ep,
    /// `(pt, eta, phi, mass)`.
    #[default]
    PtEtaPhiMass,
}

impl Encoding {
    /// Doubles per record for this encoding.
    pub const fn fields(self) -> usize {
        4
    }

    pub fn from_ep_flag(ep: bool) -> Self {
        if ep {
            Encoding::Ep
        } else {
            Encoding::PtEtaPhiMass
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Ep => f.write_str("ep"),
            Encoding::PtEtaPhiMass => f.write_str("pt_eta_phi_mass"),
        }
    }
}

/// Jet area flavour requested from an area-capable engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    /// Ghosts added, clustered, and removed again; averaged over repeats.
    #[default]
    Active,
    /// Single ghosted run.
    ActiveExplicitGhosts,
}

impl FromStr for AreaKind {
    type Err = JetError;

    fn from_str(s: &str) -> JetResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AreaKind::Active),
            "active_explicit_ghosts" => Ok(AreaKind::ActiveExplicitGhosts),
            other => Err(JetError::Config(format!("unsupported area type '{other}'"))),
        }
    }
}

/// Ghost placement parameters for area computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub kind: AreaKind,

    /// Ghosts cover `|y| < ghost_maxrap`.
    /// Default: 6.0.
    pub ghost_maxrap: f64,

    /// Nominal area per ghost.
    /// Default: 0.01.
    pub ghost_area: f64,

    /// Fraction of a grid cell by which ghost positions are jittered.
    /// Default: 1.0.
    pub grid_scatter: f64,

    /// Number of independent ghost configurations averaged over.
    /// Default: 1.
    pub repeat: usize,

    /// Seed for the ghost jitter.
    pub seed: u64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            kind: AreaKind::Active,
            ghost_maxrap: 6.0,
            ghost_area: 0.01,
            grid_scatter: 1.0,
            repeat: 1,
            seed: 0x5EED_0F_6A05,
        }
    }
}

impl AreaConfig {
    pub fn validate(&self) -> JetResult<()> {
        if !(self.ghost_maxrap.is_finite() && self.ghost_maxrap > 0.0) {
            return Err(JetError::Config(format!(
                "ghost_maxrap must be > 0, got {}",
                self.ghost_maxrap
            )));
        }
        if !(self.ghost_area.is_finite() && self.ghost_area > 0.0) {
            return Err(JetError::Config(format!(
                "ghost_area must be > 0, got {}",
                self.ghost_area
            )));
        }
        if !(0.0..=1.0).contains(&self.grid_scatter) {
            return Err(JetError::Config(format!(
                "grid_scatter must be in [0, 1], got {}",
                self.grid_scatter
            )));
        }
        if self.repeat < 1 {
            return Err(JetError::Config(format!(
                "repeat must be >= 1, got {}",
                self.repeat
            )));
        }
        Ok(())
    }
}

/// Everything needed to turn a raw buffer into a clustering sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Jet radius R.
    /// Default: 0.4.
    pub radius: f64,

    /// Generalized-kt power: 1 = kt, 0 = Cambridge/Aachen, -1 = anti-kt.
    /// Default: -1.
    pub power: i32,

    /// Maximum |eta| accepted during conversion; `<= 0` disables the cut.
    /// Default: 0.0.
    pub eta_max: f64,

    /// Input record layout.
    pub encoding: Encoding,

    /// Area computation; ignored by engines without area support.
    pub area: Option<AreaConfig>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: 0.4,
            power: -1,
            eta_max: 0.0,
            encoding: Encoding::PtEtaPhiMass,
            area: None,
        }
    }
}

impl ClusterConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> JetResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(JetError::Config(format!(
                "radius must be > 0, got {}",
                self.radius
            )));
        }
        if self.eta_max.is_nan() {
            return Err(JetError::Config("eta_max must not be NaN".to_string()));
        }
        if !(-1..=1).contains(&self.power) {
            log::warn!(
                "generalized-kt power {} is outside the usual kt/CA/anti-kt range",
                self.power
            );
        }
        if let Some(area) = &self.area {
            area.validate()?;
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> JetResult<Self> {
        serde_json::from_str(json).map_err(|e| JetError::Config(format!("JSON parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(ClusterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let cfg = ClusterConfig {
            radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(JetError::Config(_))));
    }

    #[test]
    fn test_negative_eta_max_is_valid() {
        let cfg = ClusterConfig {
            eta_max: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_bad_area_rejected() {
        let cfg = ClusterConfig {
            area: Some(AreaConfig {
                repeat: 0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = ClusterConfig::from_json(
            r#"{"radius": 0.6, "encoding": "ep", "area": {"ghost_area": 0.05}}"#,
        )
        .unwrap();
        assert!((cfg.radius - 0.6).abs() < 1e-12);
        assert_eq!(cfg.power, -1);
        assert_eq!(cfg.encoding, Encoding::Ep);
        let area = cfg.area.unwrap();
        assert!((area.ghost_area - 0.05).abs() < 1e-12);
        assert!((area.ghost_maxrap - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_garbage() {
        assert!(matches!(
            ClusterConfig::from_json("{not json"),
            Err(JetError::Config(_))
        ));
    }

    #[test]
    fn test_area_kind_parse() {
        assert_eq!("active".parse::<AreaKind>().unwrap(), AreaKind::Active);
        assert_eq!(
            "Active_Explicit_Ghosts".parse::<AreaKind>().unwrap(),
            AreaKind::ActiveExplicitGhosts
        );
        assert!("voronoi".parse::<AreaKind>().is_err());
    }
}
