// ─────────────────────────────────────────────────────────────────────
// Jetshim — Jet Definition
// ─────────────────────────────────────────────────────────────────────
//! Generalized-kt jet definition: radius R and power p.
//!
//! Distances (E-scheme, rapidity–azimuth plane):
//!   d_iB = kt2_i^p
//!   d_ij = min(kt2_i^p, kt2_j^p) · ΔR_ij² / R²

use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Momentum factor used for zero-pt objects when `p <= 0`.
const ZERO_PT_FACTOR: f64 = 1e300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetDefinition {
    r: f64,
    p: i32,
}

impl JetDefinition {
    pub fn new(r: f64, p: i32) -> EngineResult<Self> {
        if !r.is_finite() || r <= 0.0 {
            return Err(EngineError::new(format!(
                "JetDefinition: R must be a positive finite number, got {r}"
            )));
        }
        Ok(Self { r, p })
    }

    /// Build from an algorithm name.
    ///
    /// `"genkt"` needs both `r` and `p`; `"kt"`, `"cambridge"` and
    /// `"antikt"` fix `p` themselves and only need `r`.
    pub fn from_name(name: &str, r: Option<f64>, p: Option<i32>) -> EngineResult<Self> {
        let fixed_p = match name.trim().to_ascii_lowercase().as_str() {
            "genkt" => None,
            "kt" => Some(1),
            "cambridge" | "cam" | "ca" | "cambridge_aachen" => Some(0),
            "antikt" | "anti-kt" | "anti_kt" => Some(-1),
            _ => {
                return Err(EngineError::new(format!(
                    "JetDefinition: unrecognized jet algorithm '{name}'"
                )))
            }
        };
        let r = r.ok_or_else(|| {
            EngineError::new(format!(
                "JetDefinition: algorithm '{name}' requires a radius R"
            ))
        })?;
        let p = match (fixed_p, p) {
            (Some(fixed), Some(given)) if fixed != given => {
                return Err(EngineError::new(format!(
                    "JetDefinition: algorithm '{name}' implies p = {fixed}, got p = {given}"
                )))
            }
            (Some(fixed), _) => fixed,
            (None, Some(given)) => given,
            (None, None) => {
                return Err(EngineError::new(
                    "JetDefinition: genkt requires a power p (too few parameters)",
                ))
            }
        };
        Self::new(r, p)
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn r2(&self) -> f64 {
        self.r * self.r
    }

    pub fn p(&self) -> i32 {
        self.p
    }

    /// `kt2^p`, with zero-pt objects pushed to the end for `p <= 0`.
    #[inline]
    pub fn momentum_factor(&self, kt2: f64) -> f64 {
        if self.p <= 0 && kt2 == 0.0 {
            ZERO_PT_FACTOR
        } else {
            kt2.powi(self.p)
        }
    }

    /// Whether exclusive jets have their usual meaning (kt-like ordering).
    pub fn is_exclusive_safe(&self) -> bool {
        self.p >= 0
    }

    fn family_name(&self) -> &'static str {
        match self.p {
            1 => "kt",
            0 => "Cambridge/Aachen",
            -1 => "anti-kt",
            _ => "generalized-kt",
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Longitudinally invariant genkt algorithm ({}) with R = {} and p = {} and E scheme recombination",
            self.family_name(),
            self.r,
            self.p
        )
    }
}

impl fmt::Display for JetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_radius() {
        assert!(JetDefinition::new(0.0, -1).is_err());
        assert!(JetDefinition::new(-0.4, -1).is_err());
        assert!(JetDefinition::new(f64::NAN, -1).is_err());
    }

    #[test]
    fn test_named_aliases() {
        assert_eq!(JetDefinition::from_name("antikt", Some(0.4), None).unwrap().p(), -1);
        assert_eq!(JetDefinition::from_name("kt", Some(0.4), None).unwrap().p(), 1);
        assert_eq!(JetDefinition::from_name("CA", Some(0.4), None).unwrap().p(), 0);
        assert_eq!(JetDefinition::from_name("genkt", Some(0.4), Some(2)).unwrap().p(), 2);
    }

    #[test]
    fn test_genkt_needs_power() {
        let err = JetDefinition::from_name("genkt", Some(0.6), None).unwrap_err();
        assert!(err.message().contains("too few parameters"));
    }

    #[test]
    fn test_missing_radius() {
        assert!(JetDefinition::from_name("antikt", None, None).is_err());
    }

    #[test]
    fn test_conflicting_power() {
        assert!(JetDefinition::from_name("kt", Some(0.4), Some(-1)).is_err());
        assert!(JetDefinition::from_name("kt", Some(0.4), Some(1)).is_ok());
    }

    #[test]
    fn test_unknown_algorithm() {
        assert!(JetDefinition::from_name("siscone", Some(0.4), None).is_err());
    }

    #[test]
    fn test_momentum_factor() {
        let antikt = JetDefinition::new(0.4, -1).unwrap();
        assert!((antikt.momentum_factor(4.0) - 0.25).abs() < 1e-12);
        assert_eq!(antikt.momentum_factor(0.0), ZERO_PT_FACTOR);
        let ca = JetDefinition::new(0.4, 0).unwrap();
        assert_eq!(ca.momentum_factor(9.0), 1.0);
        let kt = JetDefinition::new(0.4, 1).unwrap();
        assert_eq!(kt.momentum_factor(0.0), 0.0);
    }

    #[test]
    fn test_description() {
        let def = JetDefinition::new(0.4, -1).unwrap();
        assert!(def.description().contains("anti-kt"));
        assert!(def.to_string().contains("R = 0.4"));
    }
}
