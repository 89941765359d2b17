// ─────────────────────────────────────────────────────────────────────
// Jetshim — Cluster Sequence
// ─────────────────────────────────────────────────────────────────────
//! Plain N² sequential recombination with cached nearest neighbours.
//!
//! Every active object keeps its geometric nearest neighbour within R.
//! Each step picks the smallest of `d_iB` and `d_i,NN(i)`, recombines,
//! and refreshes only the neighbour caches that pointed at the objects
//! that disappeared.

use std::fmt;
use std::ops::Deref;

use jetshim_types::{rap_phi_distance2, PseudoJet};

use crate::definition::JetDefinition;
use crate::diagnostics;
use crate::error::{EngineError, EngineResult};

#[cfg(feature = "area")]
use crate::area::JetArea;

/// How a history entry came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An input particle.
    Original,
    /// Two entries recombined into a new jet.
    Merge { parent1: usize, parent2: usize },
    /// An entry recombined with the beam; it is a final inclusive jet.
    Beam { parent: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryElement {
    pub step: Step,
    /// History entry that consumed this one.
    pub child: Option<usize>,
    /// Index into the sequence's jet list; `None` for beam steps.
    pub jet_index: Option<usize>,
    /// Distance at which this step happened (0 for originals).
    pub dij: f64,
    pub max_dij_so_far: f64,
}

/// Result of clustering a set of particles with one jet definition.
///
/// Owns the input particles, every intermediate jet, and the history.
pub struct ClusterSequence {
    pub(crate) definition: JetDefinition,
    pub(crate) jets: Vec<PseudoJet>,
    pub(crate) jet_history: Vec<usize>,
    pub(crate) history: Vec<HistoryElement>,
    pub(crate) n_particles: usize,
    #[cfg(feature = "area")]
    pub(crate) areas: Option<Vec<JetArea>>,
}

/// Per-object bookkeeping for the N² loop.
struct Brief {
    jet: usize,
    rap: f64,
    phi: f64,
    nn: Option<usize>,
    nn_dist: f64,
}

impl Brief {
    fn new(jet: usize, momentum: &PseudoJet, r2: f64) -> Self {
        Self {
            jet,
            rap: momentum.rap(),
            phi: momentum.phi(),
            nn: None,
            nn_dist: r2,
        }
    }

    #[inline]
    fn geometric_distance(&self, other: &Brief) -> f64 {
        rap_phi_distance2(self.rap, self.phi, other.rap, other.phi)
    }

    /// `d_iB` or `d_i,NN` scaled by R², whichever applies.
    #[inline]
    fn dij(&self, momentum_factors: &[f64]) -> f64 {
        let own = momentum_factors[self.jet];
        let factor = match self.nn {
            Some(nn) => own.min(momentum_factors[nn]),
            None => own,
        };
        self.nn_dist * factor
    }
}

impl ClusterSequence {
    /// Cluster `particles` with `definition`.
    ///
    /// Fails on non-finite input momenta. An empty input is valid and
    /// produces a sequence without jets.
    pub fn new(particles: Vec<PseudoJet>, definition: JetDefinition) -> EngineResult<Self> {
        diagnostics::print_banner();

        if let Some(i) = particles.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::new(format!(
                "ClusterSequence: input particle {i} has a non-finite four-momentum"
            )));
        }

        let n = particles.len();
        let mut seq = Self {
            definition,
            jets: Vec::with_capacity(2 * n),
            jet_history: Vec::with_capacity(2 * n),
            history: Vec::with_capacity(2 * n),
            n_particles: n,
            #[cfg(feature = "area")]
            areas: None,
        };
        for (i, p) in particles.into_iter().enumerate() {
            seq.jets.push(p);
            seq.jet_history.push(i);
            seq.history.push(HistoryElement {
                step: Step::Original,
                child: None,
                jet_index: Some(i),
                dij: 0.0,
                max_dij_so_far: 0.0,
            });
        }

        seq.run();
        log::debug!(
            "clustered {} particles with {}: {} history entries",
            n,
            seq.definition,
            seq.history.len()
        );
        Ok(seq)
    }

    fn run(&mut self) {
        let r2 = self.definition.r2();
        let inv_r2 = 1.0 / r2;

        let mut momentum_factors: Vec<f64> = Vec::with_capacity(2 * self.n_particles);
        momentum_factors.extend(
            self.jets
                .iter()
                .map(|p| self.definition.momentum_factor(p.pt2())),
        );
        let mut active: Vec<Brief> = self
            .jets
            .iter()
            .enumerate()
            .map(|(i, p)| Brief::new(i, p, r2))
            .collect();

        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                let d = active[i].geometric_distance(&active[j]);
                if d < active[i].nn_dist {
                    active[i].nn_dist = d;
                    active[i].nn = Some(active[j].jet);
                }
                if d < active[j].nn_dist {
                    active[j].nn_dist = d;
                    active[j].nn = Some(active[i].jet);
                }
            }
        }

        while !active.is_empty() {
            let (ia, dmin) = active
                .iter()
                .enumerate()
                .map(|(k, b)| (k, b.dij(&momentum_factors)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap_or((0, f64::INFINITY));
            let dij = dmin * inv_r2;
            let ja = active[ia].jet;

            match active[ia].nn {
                Some(jb) => {
                    let ib = position_of(&active, jb);
                    let merged = self.jets[ja] + self.jets[jb];
                    let jn = self.record_merge(ja, jb, dij, merged);
                    momentum_factors.push(self.definition.momentum_factor(merged.pt2()));

                    active[ia] = Brief::new(jn, &merged, r2);
                    active.swap_remove(ib);

                    for k in 0..active.len() {
                        if active[k].jet != jn && (active[k].nn == Some(ja) || active[k].nn == Some(jb)) {
                            refresh_nn(&mut active, k, r2);
                        }
                    }
                    let inew = position_of(&active, jn);
                    for k in 0..active.len() {
                        if k == inew {
                            continue;
                        }
                        let d = active[inew].geometric_distance(&active[k]);
                        if d < active[inew].nn_dist {
                            active[inew].nn_dist = d;
                            active[inew].nn = Some(active[k].jet);
                        }
                        if d < active[k].nn_dist {
                            active[k].nn_dist = d;
                            active[k].nn = Some(jn);
                        }
                    }
                }
                None => {
                    self.record_beam(ja, dij);
                    active.swap_remove(ia);
                    for k in 0..active.len() {
                        if active[k].nn == Some(ja) {
                            refresh_nn(&mut active, k, r2);
                        }
                    }
                }
            }
        }
    }

    fn next_max_dij(&self, dij: f64) -> f64 {
        self.history
            .last()
            .map_or(dij, |h| h.max_dij_so_far.max(dij))
    }

    fn record_merge(&mut self, ja: usize, jb: usize, dij: f64, momentum: PseudoJet) -> usize {
        let ha = self.jet_history[ja];
        let hb = self.jet_history[jb];
        let new_jet = self.jets.len();
        let new_hist = self.history.len();
        let max_dij_so_far = self.next_max_dij(dij);

        self.jets.push(momentum);
        self.jet_history.push(new_hist);
        self.history.push(HistoryElement {
            step: Step::Merge {
                parent1: ha.min(hb),
                parent2: ha.max(hb),
            },
            child: None,
            jet_index: Some(new_jet),
            dij,
            max_dij_so_far,
        });
        self.history[ha].child = Some(new_hist);
        self.history[hb].child = Some(new_hist);
        new_jet
    }

    fn record_beam(&mut self, ja: usize, dij: f64) {
        let ha = self.jet_history[ja];
        let new_hist = self.history.len();
        let max_dij_so_far = self.next_max_dij(dij);
        self.history.push(HistoryElement {
            step: Step::Beam { parent: ha },
            child: None,
            jet_index: None,
            dij,
            max_dij_so_far,
        });
        self.history[ha].child = Some(new_hist);
    }

    pub fn definition(&self) -> &JetDefinition {
        &self.definition
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    /// The input particles, in input order.
    pub fn particles(&self) -> &[PseudoJet] {
        &self.jets[..self.n_particles]
    }

    /// Every jet ever formed: the particles first, then each merge result.
    pub fn jets(&self) -> &[PseudoJet] {
        &self.jets
    }

    pub fn history(&self) -> &[HistoryElement] {
        &self.history
    }

    pub fn jet(&self, index: usize) -> Option<Jet<'_>> {
        (index < self.jets.len()).then_some(Jet { seq: self, index })
    }

    /// Jets that recombined with the beam and have `pt >= ptmin`, in
    /// history order.
    pub fn inclusive_jets(&self, ptmin: f64) -> Vec<Jet<'_>> {
        let ptmin2 = ptmin * ptmin;
        self.history
            .iter()
            .filter_map(|h| match h.step {
                Step::Beam { parent } => self.history[parent].jet_index,
                _ => None,
            })
            .filter(|&j| self.jets[j].pt2() >= ptmin2)
            .map(|index| Jet { seq: self, index })
            .collect()
    }

    /// The jets present when the event had been clustered down to
    /// exactly `njets` objects.
    pub fn exclusive_jets(&self, njets: usize) -> EngineResult<Vec<Jet<'_>>> {
        if njets > self.n_particles {
            return Err(EngineError::new(format!(
                "Requested {} exclusive jets, but there were only {} particles in the event",
                njets, self.n_particles
            )));
        }
        if !self.definition.is_exclusive_safe() {
            diagnostics::warn(
                "exclusive jets for generalized-kt with p < 0 should be interpreted with care",
            );
        }

        let stop_point = 2 * self.n_particles - njets;
        let mut jets = Vec::with_capacity(njets);
        for h in &self.history[stop_point..] {
            let parents = match h.step {
                Step::Merge { parent1, parent2 } => [Some(parent1), Some(parent2)],
                Step::Beam { parent } => [Some(parent), None],
                Step::Original => [None, None],
            };
            for parent in parents.into_iter().flatten() {
                if parent < stop_point {
                    if let Some(index) = self.history[parent].jet_index {
                        jets.push(Jet { seq: self, index });
                    }
                }
            }
        }
        Ok(jets)
    }

    /// Number of exclusive jets that would be obtained with `d_cut`.
    pub fn n_exclusive_jets(&self, dcut: f64) -> usize {
        let mut stop_point = self.history.len();
        while stop_point > 0 && self.history[stop_point - 1].max_dij_so_far > dcut {
            stop_point -= 1;
        }
        (2 * self.n_particles)
            .saturating_sub(stop_point)
            .min(self.n_particles)
    }

    pub fn exclusive_jets_dcut(&self, dcut: f64) -> EngineResult<Vec<Jet<'_>>> {
        self.exclusive_jets(self.n_exclusive_jets(dcut))
    }

    /// Indices of the input particles that make up jet `index`, ascending.
    pub fn constituent_indices(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![self.jet_history[index]];
        while let Some(h) = stack.pop() {
            match self.history[h].step {
                Step::Original => out.push(h),
                Step::Merge { parent1, parent2 } => {
                    stack.push(parent1);
                    stack.push(parent2);
                }
                Step::Beam { parent } => stack.push(parent),
            }
        }
        out.sort_unstable();
        out
    }

    /// Input particles that never took part in a merge or beam step.
    /// Empty once generalized-kt has run to completion.
    pub fn unclustered_particles(&self) -> Vec<Jet<'_>> {
        self.history[..self.n_particles]
            .iter()
            .filter(|h| h.child.is_none())
            .filter_map(|h| h.jet_index)
            .map(|index| Jet { seq: self, index })
            .collect()
    }

    /// Whether the sequence was built with area information.
    pub fn has_areas(&self) -> bool {
        #[cfg(feature = "area")]
        {
            self.areas.is_some()
        }
        #[cfg(not(feature = "area"))]
        {
            false
        }
    }
}

impl fmt::Debug for ClusterSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSequence")
            .field("definition", &self.definition)
            .field("n_particles", &self.n_particles)
            .field("n_jets", &self.jets.len())
            .field("has_areas", &self.has_areas())
            .finish()
    }
}

fn position_of(active: &[Brief], jet: usize) -> usize {
    active
        .iter()
        .position(|b| b.jet == jet)
        .unwrap_or_else(|| unreachable!("jet {jet} is not active"))
}

fn refresh_nn(active: &mut [Brief], k: usize, r2: f64) {
    let mut nn = None;
    let mut nn_dist = r2;
    for (i, other) in active.iter().enumerate() {
        if i == k {
            continue;
        }
        let d = active[k].geometric_distance(other);
        if d < nn_dist {
            nn_dist = d;
            nn = Some(other.jet);
        }
    }
    active[k].nn = nn;
    active[k].nn_dist = nn_dist;
}

/// Sort jets by decreasing transverse momentum.
pub fn sorted_by_pt<'a>(mut jets: Vec<Jet<'a>>) -> Vec<Jet<'a>> {
    jets.sort_by(|a, b| b.pt2().total_cmp(&a.pt2()));
    jets
}

/// A jet of a [`ClusterSequence`]; dereferences to its four-momentum.
#[derive(Clone, Copy)]
pub struct Jet<'a> {
    seq: &'a ClusterSequence,
    index: usize,
}

impl<'a> Jet<'a> {
    /// Position in [`ClusterSequence::jets`].
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn momentum(&self) -> &'a PseudoJet {
        &self.seq.jets[self.index]
    }

    fn history_index(&self) -> usize {
        self.seq.jet_history[self.index]
    }

    pub fn constituents(&self) -> Vec<Jet<'a>> {
        self.seq
            .constituent_indices(self.index)
            .into_iter()
            .map(|index| Jet {
                seq: self.seq,
                index,
            })
            .collect()
    }

    pub fn n_constituents(&self) -> usize {
        self.seq.constituent_indices(self.index).len()
    }

    /// The two jets this one was formed from, if it is not a particle.
    pub fn parents(&self) -> Option<(Jet<'a>, Jet<'a>)> {
        match self.seq.history[self.history_index()].step {
            Step::Merge { parent1, parent2 } => {
                let p1 = self.seq.history[parent1].jet_index?;
                let p2 = self.seq.history[parent2].jet_index?;
                Some((self.seq.jet(p1)?, self.seq.jet(p2)?))
            }
            _ => None,
        }
    }

    /// The jet this one was merged into; `None` if it went to the beam.
    pub fn child(&self) -> Option<Jet<'a>> {
        let child = self.seq.history[self.history_index()].child?;
        let index = self.seq.history[child].jet_index?;
        self.seq.jet(index)
    }

    #[cfg(feature = "area")]
    pub fn has_area(&self) -> bool {
        self.seq.areas.is_some()
    }

    /// Active area, if the sequence was built with one.
    #[cfg(feature = "area")]
    pub fn area(&self) -> Option<f64> {
        self.seq.areas.as_ref().map(|a| a[self.index].area)
    }

    #[cfg(feature = "area")]
    pub fn area_error(&self) -> Option<f64> {
        self.seq.areas.as_ref().map(|a| a[self.index].error)
    }
}

impl Deref for Jet<'_> {
    type Target = PseudoJet;

    fn deref(&self) -> &PseudoJet {
        self.momentum()
    }
}

impl PartialEq for Jet<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.seq, other.seq) && self.index == other.index
    }
}

impl fmt::Debug for Jet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jet")
            .field("index", &self.index)
            .field("momentum", self.momentum())
            .finish()
    }
}
