// ─────────────────────────────────────────────────────────────────────
// Jetshim — Active Jet Areas
// ─────────────────────────────────────────────────────────────────────
//! Active jet areas from ghost particles.
//!
//! A grid of infinitesimally soft ghosts covers `|y| < ghost_maxrap`.
//! Hard particles plus ghosts are clustered together; the area of a jet
//! is the number of ghosts it swallowed times the area per ghost. Jets of
//! the ghosted run are matched to jets of the ghost-free run through
//! their hard constituents, so the returned sequence contains only the
//! caller's particles.
//!
//! With `repeat > 1` each repetition jitters the ghosts differently; the
//! area is the mean and the area error the RMS spread.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::str::FromStr;

use jetshim_types::PseudoJet;

use crate::definition::JetDefinition;
use crate::error::{EngineError, EngineResult};
use crate::sequence::{ClusterSequence, Step};

/// Relative spread of ghost transverse momenta around `mean_ghost_pt`.
const GHOST_PT_SCATTER: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JetArea {
    pub area: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaType {
    /// Averaged over `repeat` ghost configurations.
    Active,
    /// One ghost configuration.
    ActiveExplicitGhosts,
}

impl FromStr for AreaType {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AreaType::Active),
            "active_explicit_ghosts" => Ok(AreaType::ActiveExplicitGhosts),
            other => Err(EngineError::new(format!(
                "AreaDefinition: unsupported area type '{other}'"
            ))),
        }
    }
}

/// Ghost placement.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostedAreaSpec {
    pub ghost_maxrap: f64,
    pub ghost_area: f64,
    pub grid_scatter: f64,
    pub mean_ghost_pt: f64,
    pub repeat: usize,
    pub seed: u64,
}

impl Default for GhostedAreaSpec {
    fn default() -> Self {
        Self {
            ghost_maxrap: 6.0,
            ghost_area: 0.01,
            grid_scatter: 1.0,
            mean_ghost_pt: 1e-100,
            repeat: 1,
            seed: 0x5EED_0F_6A05,
        }
    }
}

struct GhostGrid {
    nrap: i64,
    nphi: i64,
    drap: f64,
    dphi: f64,
}

impl GhostedAreaSpec {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.ghost_maxrap.is_finite() && self.ghost_maxrap > 0.0) {
            return Err(EngineError::new(format!(
                "GhostedAreaSpec: ghost_maxrap must be > 0, got {}",
                self.ghost_maxrap
            )));
        }
        if !(self.ghost_area.is_finite() && self.ghost_area > 0.0) {
            return Err(EngineError::new(format!(
                "GhostedAreaSpec: ghost_area must be > 0, got {}",
                self.ghost_area
            )));
        }
        if !(0.0..=1.0).contains(&self.grid_scatter) {
            return Err(EngineError::new(format!(
                "GhostedAreaSpec: grid_scatter must be in [0, 1], got {}",
                self.grid_scatter
            )));
        }
        if !(self.mean_ghost_pt > 0.0) {
            return Err(EngineError::new(format!(
                "GhostedAreaSpec: mean_ghost_pt must be > 0, got {}",
                self.mean_ghost_pt
            )));
        }
        if self.repeat == 0 {
            return Err(EngineError::new("GhostedAreaSpec: repeat must be >= 1"));
        }
        Ok(())
    }

    /// Cell sizes adjusted so the grid tiles the rapidity range and the
    /// full azimuth exactly.
    fn grid(&self) -> GhostGrid {
        let nominal = self.ghost_area.sqrt();
        let nphi = (TAU / nominal).ceil().max(1.0) as i64;
        let nrap = (self.ghost_maxrap / nominal).ceil().max(1.0) as i64;
        GhostGrid {
            nrap,
            nphi,
            drap: self.ghost_maxrap / nrap as f64,
            dphi: TAU / nphi as f64,
        }
    }

    /// Area carried by one ghost after grid adjustment.
    pub fn actual_ghost_area(&self) -> f64 {
        let g = self.grid();
        g.drap * g.dphi
    }

    pub fn n_ghosts(&self) -> usize {
        let g = self.grid();
        (2 * g.nrap * g.nphi) as usize
    }

    fn ghosts(&self, rng: &mut SimpleRng) -> Vec<PseudoJet> {
        let g = self.grid();
        let mut ghosts = Vec::with_capacity(self.n_ghosts());
        for irap in -g.nrap..g.nrap {
            for iphi in 0..g.nphi {
                let rap = (irap as f64 + 0.5) * g.drap
                    + g.drap * self.grid_scatter * (rng.next_f64() - 0.5);
                let phi = (iphi as f64 + 0.5) * g.dphi
                    + g.dphi * self.grid_scatter * (rng.next_f64() - 0.5);
                let pt = self.mean_ghost_pt * (1.0 + GHOST_PT_SCATTER * (rng.next_f64() - 0.5));
                ghosts.push(PseudoJet::from_pt_y_phi(pt, rap, phi));
            }
        }
        ghosts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaDefinition {
    area_type: AreaType,
    spec: GhostedAreaSpec,
}

impl AreaDefinition {
    pub fn new(area_type: AreaType, spec: GhostedAreaSpec) -> EngineResult<Self> {
        spec.validate()?;
        Ok(Self { area_type, spec })
    }

    /// Parse an area type name and use the default ghost placement.
    pub fn from_name(name: &str) -> EngineResult<Self> {
        Self::new(name.parse()?, GhostedAreaSpec::default())
    }

    pub fn area_type(&self) -> AreaType {
        self.area_type
    }

    pub fn spec(&self) -> &GhostedAreaSpec {
        &self.spec
    }

    pub fn repeats(&self) -> usize {
        match self.area_type {
            AreaType::Active => self.spec.repeat,
            AreaType::ActiveExplicitGhosts => 1,
        }
    }
}

impl ClusterSequence {
    /// Cluster `particles` and attach an active area to every jet.
    pub fn with_area(
        particles: Vec<PseudoJet>,
        definition: JetDefinition,
        area_definition: &AreaDefinition,
    ) -> EngineResult<Self> {
        let mut seq = ClusterSequence::new(particles.clone(), definition)?;
        let hard = seq.n_particles;
        let keys: Vec<Vec<usize>> = (0..seq.jets.len())
            .map(|j| seq.constituent_indices(j))
            .collect();

        let spec = area_definition.spec();
        let ghost_area = spec.actual_ghost_area();
        let repeats = area_definition.repeats();
        let mut sum = vec![0.0; keys.len()];
        let mut sum2 = vec![0.0; keys.len()];
        let mut rng = SimpleRng::new(spec.seed);

        for rep in 0..repeats {
            let mut ghosted_input = particles.clone();
            ghosted_input.extend(spec.ghosts(&mut rng));
            let ghosted = ClusterSequence::new(ghosted_input, definition)?;
            let counts = ghost_counts_by_hard_content(&ghosted, hard);

            let mut unmatched = 0usize;
            for (j, key) in keys.iter().enumerate() {
                let area = match counts.get(key) {
                    Some(&n) => n as f64 * ghost_area,
                    None => {
                        unmatched += 1;
                        0.0
                    }
                };
                sum[j] += area;
                sum2[j] += area * area;
            }
            if unmatched > 0 {
                log::debug!("area repetition {rep}: {unmatched} jets without a ghosted counterpart");
            }
        }

        let n = repeats as f64;
        let areas = sum
            .iter()
            .zip(&sum2)
            .map(|(&s, &s2)| {
                let mean = s / n;
                JetArea {
                    area: mean,
                    error: (s2 / n - mean * mean).max(0.0).sqrt(),
                }
            })
            .collect();
        seq.areas = Some(areas);

        log::debug!(
            "computed active areas over {} repetitions of {} ghosts (area {:.4} each)",
            repeats,
            spec.n_ghosts(),
            ghost_area
        );
        Ok(seq)
    }
}

/// For every hard-particle set that formed a jet in the ghosted run, the
/// number of ghosts that jet held just before it was merged with another
/// hard jet or sent to the beam.
fn ghost_counts_by_hard_content(
    ghosted: &ClusterSequence,
    n_hard: usize,
) -> HashMap<Vec<usize>, usize> {
    let mut content: Vec<Option<(Vec<usize>, usize)>> = (0..ghosted.jets.len())
        .map(|j| {
            if j < n_hard {
                Some((vec![j], 0))
            } else if j < ghosted.n_particles {
                Some((Vec::new(), 1))
            } else {
                None
            }
        })
        .collect();
    let mut counts = HashMap::new();

    for h in &ghosted.history {
        match h.step {
            Step::Original => {}
            Step::Merge { parent1, parent2 } => {
                let (Some(j1), Some(j2), Some(jn)) = (
                    ghosted.history[parent1].jet_index,
                    ghosted.history[parent2].jet_index,
                    h.jet_index,
                ) else {
                    continue;
                };
                let (k1, c1) = content[j1].take().unwrap_or_default();
                let (k2, c2) = content[j2].take().unwrap_or_default();
                if !k1.is_empty() && !k2.is_empty() {
                    counts.insert(k1.clone(), c1);
                    counts.insert(k2.clone(), c2);
                }
                content[jn] = Some((merge_sorted(k1, k2), c1 + c2));
            }
            Step::Beam { parent } => {
                if let Some(j) = ghosted.history[parent].jet_index {
                    if let Some((key, count)) = content[j].take() {
                        if !key.is_empty() {
                            counts.insert(key, count);
                        }
                    }
                }
            }
        }
    }
    counts
}

fn merge_sorted(a: Vec<usize>, b: Vec<usize>) -> Vec<usize> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Minimal xorshift64 RNG for ghost jitter (no external dep).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF_CAFE_BABE } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn small_spec() -> GhostedAreaSpec {
        GhostedAreaSpec {
            ghost_maxrap: 1.5,
            ghost_area: 0.01,
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_tiles_region() {
        let spec = small_spec();
        let total = spec.actual_ghost_area() * spec.n_ghosts() as f64;
        assert!((total - 2.0 * 1.5 * TAU).abs() < 1e-9);
    }

    #[test]
    fn test_area_type_parse() {
        assert_eq!("active".parse::<AreaType>().unwrap(), AreaType::Active);
        assert!("voronoi".parse::<AreaType>().is_err());
    }

    #[test]
    fn test_spec_validation() {
        let bad = GhostedAreaSpec {
            ghost_area: 0.0,
            ..Default::default()
        };
        assert!(AreaDefinition::new(AreaType::Active, bad).is_err());
        let bad = GhostedAreaSpec {
            repeat: 0,
            ..Default::default()
        };
        assert!(AreaDefinition::new(AreaType::Active, bad).is_err());
    }

    #[test]
    fn test_isolated_antikt_jet_area_near_pi_r2() {
        let particles = vec![PseudoJet::from_pt_y_phi(50.0, 0.0, 1.0)];
        let def = JetDefinition::new(0.4, -1).unwrap();
        let area_def = AreaDefinition::new(AreaType::ActiveExplicitGhosts, small_spec()).unwrap();
        let seq = ClusterSequence::with_area(particles, def, &area_def).unwrap();
        let jets = seq.inclusive_jets(0.0);
        assert_eq!(jets.len(), 1);
        assert!(jets[0].has_area());
        let area = jets[0].area().unwrap();
        assert!((area - PI * 0.16).abs() < 0.15, "area = {area}");
        assert_eq!(jets[0].area_error(), Some(0.0));
    }

    #[test]
    fn test_areas_non_negative_and_hard_jets_positive() {
        let particles = vec![
            PseudoJet::from_pt_y_phi(40.0, 0.0, 1.0),
            PseudoJet::from_pt_y_phi(10.0, 0.2, 1.2),
            PseudoJet::from_pt_y_phi(30.0, -0.5, 4.0),
            PseudoJet::from_pt_y_phi(2.0, 0.8, 2.5),
        ];
        for p in [-1, 0, 1] {
            let def = JetDefinition::new(0.5, p).unwrap();
            let spec = GhostedAreaSpec {
                ghost_area: 0.05,
                repeat: 2,
                ..small_spec()
            };
            let area_def = AreaDefinition::new(AreaType::Active, spec).unwrap();
            let seq = ClusterSequence::with_area(particles.clone(), def, &area_def).unwrap();
            for jet in seq.inclusive_jets(0.0) {
                let area = jet.area().unwrap();
                assert!(area >= 0.0);
                assert!(jet.area_error().unwrap() >= 0.0);
                if jet.pt() > 20.0 {
                    assert!(area > 0.0, "p = {p}: hard jet with zero area");
                }
            }
        }
    }

    #[test]
    fn test_plain_sequence_has_no_area() {
        let particles = vec![PseudoJet::from_pt_y_phi(50.0, 0.0, 1.0)];
        let seq = ClusterSequence::new(particles, JetDefinition::new(0.4, -1).unwrap()).unwrap();
        let jets = seq.inclusive_jets(0.0);
        assert!(!jets[0].has_area());
        assert!(jets[0].area().is_none());
    }

    #[test]
    fn test_area_sequence_hides_ghosts() {
        let particles = vec![
            PseudoJet::from_pt_y_phi(50.0, 0.0, 1.0),
            PseudoJet::from_pt_y_phi(20.0, 0.5, 3.0),
        ];
        let area_def = AreaDefinition::new(
            AreaType::Active,
            GhostedAreaSpec {
                ghost_area: 0.05,
                ..small_spec()
            },
        )
        .unwrap();
        let seq = ClusterSequence::with_area(
            particles,
            JetDefinition::new(0.4, -1).unwrap(),
            &area_def,
        )
        .unwrap();
        assert_eq!(seq.n_particles(), 2);
        assert_eq!(seq.history().len(), 4);
    }

    #[test]
    fn test_merge_sorted() {
        assert_eq!(merge_sorted(vec![1, 4], vec![2, 3, 9]), vec![1, 2, 3, 4, 9]);
        assert_eq!(merge_sorted(Vec::new(), vec![5]), vec![5]);
    }
}
