// ─────────────────────────────────────────────────────────────────────
// Jetshim — Canonical Four-Momentum
// ─────────────────────────────────────────────────────────────────────
//! `PseudoJet`: the canonical `(px, py, pz, E)` four-vector used by the
//! clustering engine, plus the derived kinematic quantities.

use std::f64::consts::{PI, TAU};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Rapidity magnitude assigned to objects travelling along the beam.
pub const MAX_RAP: f64 = 1e5;

/// Canonical four-momentum.
///
/// Field order is always `(px, py, pz, E)`, whatever encoding the input
/// record used. Addition is the E-scheme (plain four-vector sum).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PseudoJet {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl PseudoJet {
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Build from an `(E, px, py, pz)` record.
    pub const fn from_ep(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self::new(px, py, pz, e)
    }

    /// Build from a `(pt, eta, phi, mass)` record.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self::new(px, py, pz, e)
    }

    /// Massless object with the given transverse momentum, rapidity and
    /// azimuth.
    pub fn from_pt_y_phi(pt: f64, rap: f64, phi: f64) -> Self {
        Self::new(
            pt * phi.cos(),
            pt * phi.sin(),
            pt * rap.sinh(),
            pt * rap.cosh(),
        )
    }

    #[inline]
    pub fn pt2(&self) -> f64 {
        self.px * self.px + self.py * self.py
    }

    #[inline]
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    pub fn m2(&self) -> f64 {
        (self.e + self.pz) * (self.e - self.pz) - self.pt2()
    }

    /// Invariant mass; negative when `m2` is negative (spacelike).
    pub fn mass(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Azimuth in `[0, 2π)`. Zero for objects with no transverse momentum.
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            return 0.0;
        }
        let phi = self.py.atan2(self.px);
        if phi < 0.0 {
            phi + TAU
        } else if phi >= TAU {
            phi - TAU
        } else {
            phi
        }
    }

    /// Azimuth in `(-π, π]`.
    pub fn phi_std(&self) -> f64 {
        let phi = self.phi();
        if phi > PI {
            phi - TAU
        } else {
            phi
        }
    }

    /// Pseudorapidity. Objects along the beam get `±MAX_RAP`.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz < 0.0 { -MAX_RAP } else { MAX_RAP };
        }
        (self.pz / pt).asinh()
    }

    /// Rapidity `½ ln((E + pz) / (E − pz))`, regularised for massless
    /// objects along the beam and for spacelike vectors.
    pub fn rap(&self) -> f64 {
        let pt2 = self.pt2();
        if self.e == self.pz.abs() && pt2 == 0.0 {
            let max_rap_here = MAX_RAP + self.pz.abs();
            return if self.pz >= 0.0 {
                max_rap_here
            } else {
                -max_rap_here
            };
        }
        let effective_m2 = self.m2().max(0.0);
        let e_plus_pz = self.e + self.pz.abs();
        let rap = 0.5 * ((pt2 + effective_m2) / (e_plus_pz * e_plus_pz)).ln();
        if self.pz > 0.0 {
            -rap
        } else {
            rap
        }
    }

    /// `(E, px, py, pz)` as an array.
    pub fn to_ep(&self) -> [f64; 4] {
        [self.e, self.px, self.py, self.pz]
    }

    /// `(pt, eta, phi, mass)` as an array, with `phi` in `(-π, π]`.
    pub fn to_pt_eta_phi_m(&self) -> [f64; 4] {
        [self.pt(), self.eta(), self.phi_std(), self.mass()]
    }

    pub fn is_finite(&self) -> bool {
        self.px.is_finite() && self.py.is_finite() && self.pz.is_finite() && self.e.is_finite()
    }
}

/// Squared distance in the rapidity–azimuth plane, with the azimuthal
/// difference wrapped into `[0, π]`.
#[inline]
pub fn rap_phi_distance2(rap1: f64, phi1: f64, rap2: f64, phi2: f64) -> f64 {
    let drap = rap1 - rap2;
    let mut dphi = (phi1 - phi2).abs();
    if dphi > PI {
        dphi = TAU - dphi;
    }
    drap * drap + dphi * dphi
}

impl Add for PseudoJet {
    type Output = PseudoJet;

    fn add(self, rhs: PseudoJet) -> PseudoJet {
        PseudoJet::new(
            self.px + rhs.px,
            self.py + rhs.py,
            self.pz + rhs.pz,
            self.e + rhs.e,
        )
    }
}

impl AddAssign for PseudoJet {
    fn add_assign(&mut self, rhs: PseudoJet) {
        *self = *self + rhs;
    }
}

impl Sum for PseudoJet {
    fn sum<I: Iterator<Item = PseudoJet>>(iter: I) -> Self {
        iter.fold(PseudoJet::default(), Add::add)
    }
}

impl<'a> Sum<&'a PseudoJet> for PseudoJet {
    fn sum<I: Iterator<Item = &'a PseudoJet>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
