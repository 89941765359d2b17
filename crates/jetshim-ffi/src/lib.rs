// ─────────────────────────────────────────────────────────────────────
// Jetshim — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the jet clustering bridge.
//!
//! Exposes `cluster`, `JetDefinition`, `ClusterSequence` and `PseudoJet`
//! to Python via PyO3.
//!
//! # FFI Safety
//!
//! - Input arrays are copied into Rust-owned buffers before conversion.
//! - A `ClusterSequence` is shared through `Arc` with every `PseudoJet`
//!   taken from it, so jets stay valid after the sequence object is dropped
//!   on the Python side.
//! - Engine failures and panics never cross the boundary; they arrive as
//!   `RuntimeError`. Malformed input and configuration raise `ValueError`.
//! - Per-particle `userinfo` objects are shared through `Arc` and handed
//!   out with `clone_ref` under the GIL.
//!
//! Install: `pip install -e crates/jetshim-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! import jetshim
//!
//! jetshim.configure_diagnostics()
//! seq = jetshim.cluster([50.0, 0.0, 1.0, 0.0, 20.0, 0.3, 1.2, 0.0], R=0.4, p=-1)
//! for jet in seq.inclusive_jets(ptmin=10.0):
//!     print(jet.pt, jet.eta, jet.phi, len(jet))
//! ```

use std::sync::Arc;

use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use jetshim_core::convert::FIELDS_PER_RECORD;
use jetshim_core::{guard, AREA_SENTINEL, USING_FULL_BACKEND};
use jetshim_engine::{sorted_by_pt, ClusterSequence, Jet, JetDefinition};
use jetshim_types::{Encoding, JetError, PseudoJet};

// ─── PyJetDefinition ────────────────────────────────────────────────

/// Python-visible generalized-kt jet definition.
#[pyclass(name = "JetDefinition")]
#[derive(Clone)]
struct PyJetDefinition {
    inner: JetDefinition,
}

#[pymethods]
impl PyJetDefinition {
    #[new]
    #[pyo3(signature = (algo = "genkt", R = None, p = None))]
    #[allow(non_snake_case)]
    fn new(algo: &str, R: Option<f64>, p: Option<i32>) -> PyResult<Self> {
        let inner = jetshim_core::definition_from_name(algo, R, p).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter(R)]
    fn radius(&self) -> f64 {
        self.inner.r()
    }

    #[getter]
    fn p(&self) -> i32 {
        self.inner.p()
    }

    #[getter]
    fn description(&self) -> String {
        self.inner.description()
    }

    fn __repr__(&self) -> String {
        format!("JetDefinition(R={}, p={})", self.inner.r(), self.inner.p())
    }
}

// ─── Clustered ──────────────────────────────────────────────────────

/// A sequence plus the bookkeeping that ties its particles back to the
/// caller's input rows.
struct Clustered {
    seq: ClusterSequence,
    /// Input row of every particle, in particle order.
    rows: Vec<usize>,
    /// One object per input row, when the caller supplied them.
    userinfo: Option<Arc<Vec<PyObject>>>,
}

impl Clustered {
    fn row_of(&self, jet: Jet<'_>) -> Option<usize> {
        (jet.index() < self.seq.n_particles()).then(|| self.rows[jet.index()])
    }
}

// ─── PyPseudoJet ────────────────────────────────────────────────────

/// Python-visible four-momentum, optionally tied to the sequence it
/// came from.
#[pyclass(name = "PseudoJet")]
struct PyPseudoJet {
    momentum: PseudoJet,
    source: Option<(Arc<Clustered>, usize)>,
    userinfo: Option<PyObject>,
}

impl PyPseudoJet {
    fn wrap(clustered: &Arc<Clustered>, jet: Jet<'_>) -> Self {
        Self {
            momentum: *jet.momentum(),
            source: Some((Arc::clone(clustered), jet.index())),
            userinfo: None,
        }
    }

    fn wrap_all(clustered: &Arc<Clustered>, jets: Vec<Jet<'_>>) -> Vec<Self> {
        jets.into_iter().map(|j| Self::wrap(clustered, j)).collect()
    }

    fn with_jet<T>(&self, f: impl FnOnce(&Arc<Clustered>, Jet<'_>) -> T) -> Option<T> {
        let (clustered, index) = self.source.as_ref()?;
        let jet = clustered.seq.jet(*index)?;
        Some(f(clustered, jet))
    }

    fn standalone_copy(&self, py: Python<'_>) -> Self {
        Self {
            momentum: self.momentum,
            source: None,
            userinfo: self.userinfo.as_ref().map(|o| o.clone_ref(py)),
        }
    }

    /// Constituent momenta, their input rows, and the userinfo list the
    /// rows index into.
    fn reclustering_input(&self) -> (Vec<PseudoJet>, Vec<usize>, Option<Arc<Vec<PyObject>>>) {
        self.with_jet(|clustered, jet| {
            let constituents = jet.constituents();
            let momenta = constituents.iter().map(|c| *c.momentum()).collect();
            let rows = constituents
                .iter()
                .filter_map(|&c| clustered.row_of(c))
                .collect();
            (momenta, rows, clustered.userinfo.clone())
        })
        .unwrap_or_else(|| (vec![self.momentum], vec![0], None))
    }

    fn constituent_momenta(&self) -> Vec<PseudoJet> {
        self.with_jet(|_, jet| jet.constituents().iter().map(|c| *c.momentum()).collect())
            .unwrap_or_else(|| vec![self.momentum])
    }
}

#[pymethods]
impl PyPseudoJet {
    /// Standalone jet from `(px, py, pz, e)`.
    #[new]
    fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            momentum: PseudoJet::new(px, py, pz, e),
            source: None,
            userinfo: None,
        }
    }

    #[getter]
    fn px(&self) -> f64 {
        self.momentum.px
    }

    #[getter]
    fn py(&self) -> f64 {
        self.momentum.py
    }

    #[getter]
    fn pz(&self) -> f64 {
        self.momentum.pz
    }

    #[getter]
    fn e(&self) -> f64 {
        self.momentum.e
    }

    #[getter]
    fn pt(&self) -> f64 {
        self.momentum.pt()
    }

    #[getter]
    fn eta(&self) -> f64 {
        self.momentum.eta()
    }

    #[getter]
    fn phi(&self) -> f64 {
        self.momentum.phi_std()
    }

    #[getter]
    fn mass(&self) -> f64 {
        self.momentum.mass()
    }

    /// Input row of an original particle; `None` for merged jets and
    /// standalone objects.
    #[getter]
    fn user_index(&self) -> Option<usize> {
        self.with_jet(|clustered, jet| clustered.row_of(jet)).flatten()
    }

    /// Object attached to this particle: the value assigned on this
    /// object if any, else the caller's entry for its input row.
    #[getter]
    fn userinfo(&self, py: Python<'_>) -> Option<PyObject> {
        if let Some(own) = &self.userinfo {
            return Some(own.clone_ref(py));
        }
        self.with_jet(|clustered, jet| {
            let row = clustered.row_of(jet)?;
            let list = clustered.userinfo.as_ref()?;
            list.get(row).map(|o| o.clone_ref(py))
        })
        .flatten()
    }

    #[setter]
    fn set_userinfo(&mut self, value: PyObject) {
        self.userinfo = Some(value);
    }

    #[getter]
    fn has_area(&self) -> bool {
        self.with_jet(|_, jet| jetshim_core::jet_has_area(&jet))
            .unwrap_or(false)
    }

    /// `(area, area_error)`; both are `AREA_SENTINEL` when unavailable.
    #[getter]
    fn area(&self) -> (f64, f64) {
        self.with_jet(|_, jet| {
            (
                jetshim_core::jet_area(&jet),
                jetshim_core::jet_area_error(&jet),
            )
        })
        .unwrap_or((AREA_SENTINEL, AREA_SENTINEL))
    }

    /// Original particles of this jet; a standalone jet is its own
    /// only constituent.
    fn constituents(&self, py: Python<'_>) -> Vec<PyPseudoJet> {
        self.with_jet(|clustered, jet| Self::wrap_all(clustered, jet.constituents()))
            .unwrap_or_else(|| vec![self.standalone_copy(py)])
    }

    /// Constituents as flat records, 4 floats each: `(pt, eta, phi, mass)`
    /// or, with `ep=True`, `(E, px, py, pz)`.
    #[pyo3(signature = (ep = false))]
    fn constituents_array(&self, ep: bool) -> Vec<f64> {
        self.constituent_momenta()
            .iter()
            .flat_map(|c| match Encoding::from_ep_flag(ep) {
                Encoding::Ep => c.to_ep(),
                Encoding::PtEtaPhiMass => c.to_pt_eta_phi_m(),
            })
            .collect()
    }

    #[getter]
    fn parents(&self) -> Option<(PyPseudoJet, PyPseudoJet)> {
        self.with_jet(|clustered, jet| {
            jet.parents()
                .map(|(a, b)| (Self::wrap(clustered, a), Self::wrap(clustered, b)))
        })
        .flatten()
    }

    #[getter]
    fn child(&self) -> Option<PyPseudoJet> {
        self.with_jet(|clustered, jet| jet.child().map(|c| Self::wrap(clustered, c)))
            .flatten()
    }

    fn __len__(&self) -> usize {
        self.with_jet(|_, jet| jet.n_constituents()).unwrap_or(1)
    }

    /// Constituent `index`; negative indices count from the end. Makes
    /// `for constit in jet` work.
    fn __getitem__(&self, py: Python<'_>, index: isize) -> PyResult<PyPseudoJet> {
        let mut all = self.constituents(py);
        let len = all.len() as isize;
        let i = if index < 0 { index + len } else { index };
        if !(0..len).contains(&i) {
            return Err(PyIndexError::new_err("constituent index out of range"));
        }
        Ok(all.swap_remove(i as usize))
    }

    fn __repr__(&self) -> String {
        format!(
            "PseudoJet(pt={:.3}, eta={:.3}, phi={:.3}, mass={:.3})",
            self.momentum.pt(),
            self.momentum.eta(),
            self.momentum.phi_std(),
            self.momentum.mass()
        )
    }
}

// ─── PyClusterSequence ──────────────────────────────────────────────

/// Python-visible clustering result.
#[pyclass(name = "ClusterSequence")]
struct PyClusterSequence {
    inner: Arc<Clustered>,
}

#[pymethods]
impl PyClusterSequence {
    /// Jets above `ptmin`, hardest first.
    #[pyo3(signature = (ptmin = 0.0))]
    fn inclusive_jets(&self, ptmin: f64) -> Vec<PyPseudoJet> {
        let seq = &self.inner.seq;
        PyPseudoJet::wrap_all(&self.inner, sorted_by_pt(seq.inclusive_jets(ptmin)))
    }

    fn exclusive_jets(&self, njets: usize) -> PyResult<Vec<PyPseudoJet>> {
        let seq = &self.inner.seq;
        let jets = guard(|| seq.exclusive_jets(njets)).map_err(to_py_err)?;
        Ok(PyPseudoJet::wrap_all(&self.inner, sorted_by_pt(jets)))
    }

    fn exclusive_jets_dcut(&self, dcut: f64) -> PyResult<Vec<PyPseudoJet>> {
        let seq = &self.inner.seq;
        let jets = guard(|| seq.exclusive_jets_dcut(dcut)).map_err(to_py_err)?;
        Ok(PyPseudoJet::wrap_all(&self.inner, sorted_by_pt(jets)))
    }

    fn n_exclusive_jets(&self, dcut: f64) -> usize {
        self.inner.seq.n_exclusive_jets(dcut)
    }

    /// Particles that ended up in no jet.
    fn unclustered_particles(&self) -> Vec<PyPseudoJet> {
        PyPseudoJet::wrap_all(&self.inner, self.inner.seq.unclustered_particles())
    }

    #[getter]
    fn n_particles(&self) -> usize {
        self.inner.seq.n_particles()
    }

    #[getter]
    fn jet_def(&self) -> PyJetDefinition {
        PyJetDefinition {
            inner: *self.inner.seq.definition(),
        }
    }

    fn __repr__(&self) -> String {
        let def = self.inner.seq.definition();
        format!(
            "ClusterSequence(n_particles={}, R={}, p={})",
            self.inner.seq.n_particles(),
            def.r(),
            def.p()
        )
    }
}

// ─── Module functions ───────────────────────────────────────────────

fn to_py_err(err: JetError) -> PyErr {
    match err {
        JetError::InvalidInput(_) | JetError::Config(_) => PyValueError::new_err(err.to_string()),
        JetError::Clustering(msg) => PyRuntimeError::new_err(msg),
    }
}

/// Flat float records from a list, tuple, or anything with
/// `ravel().tolist()` (numpy arrays).
fn flat_records(vectors: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    match vectors.extract::<Vec<f64>>() {
        Ok(flat) => Ok(flat),
        Err(err) if vectors.hasattr("ravel")? => vectors
            .call_method0("ravel")?
            .call_method0("tolist")?
            .extract::<Vec<f64>>()
            .map_err(|_| err),
        Err(err) => Err(err),
    }
}

fn run_clustering(
    particles: Vec<PseudoJet>,
    definition: JetDefinition,
    area: Option<&str>,
) -> PyResult<ClusterSequence> {
    #[cfg(feature = "full")]
    {
        if let Some(name) = area {
            let area_def = jetshim_core::area_definition_from_name(name).map_err(to_py_err)?;
            return jetshim_core::cluster_with_area(
                particles,
                definition.r(),
                definition.p(),
                &area_def,
            )
            .map_err(to_py_err);
        }
    }
    #[cfg(not(feature = "full"))]
    {
        if let Some(name) = area {
            log::warn!("area '{name}' requested but this build has no area support");
        }
    }
    jetshim_core::cluster(particles, definition.r(), definition.p()).map_err(to_py_err)
}

/// Cluster flat particle records, or recluster the constituents of a
/// `PseudoJet`.
///
/// Flat `vectors` hold 4 floats per particle: `(pt, eta, phi, mass)` or,
/// with `ep=True`, `(E, px, py, pz)`. Particles with `|eta| > eta_max`
/// are dropped when `eta_max > 0`. A `PseudoJet` argument is reclustered
/// as-is; `ep` and `eta_max` do not apply to it.
///
/// `userinfo`, if given, holds one object per input record (or per
/// constituent when reclustering) and is exposed on the resulting
/// particles. `area` names an active area type (`"active"` or
/// `"active_explicit_ghosts"`).
#[pyfunction]
#[pyo3(name = "cluster")]
#[pyo3(signature = (vectors, R = None, p = None, algo = "genkt", ep = false, eta_max = 0.0, area = None, userinfo = None))]
#[allow(non_snake_case, clippy::too_many_arguments)]
fn py_cluster(
    vectors: &Bound<'_, PyAny>,
    R: Option<f64>,
    p: Option<i32>,
    algo: &str,
    ep: bool,
    eta_max: f64,
    area: Option<&str>,
    userinfo: Option<Vec<PyObject>>,
) -> PyResult<PyClusterSequence> {
    let reclustering = vectors.downcast::<PyPseudoJet>().ok();
    let (particles, rows, inherited, n_rows) =
        if let Some(jet) = reclustering {
            let (particles, rows, inherited) = jet.borrow().reclustering_input();
            let n = particles.len();
            (particles, rows, inherited, n)
        } else {
            let flat = flat_records(vectors)?;
            if flat.len() % FIELDS_PER_RECORD != 0 {
                return Err(PyValueError::new_err(format!(
                    "vectors length {} is not a multiple of {FIELDS_PER_RECORD}",
                    flat.len()
                )));
            }
            let encoding = Encoding::from_ep_flag(ep);
            let count = flat.len() / FIELDS_PER_RECORD;
            let (particles, rows) = jetshim_core::convert_records_indexed(
                &flat,
                count,
                encoding.fields(),
                eta_max,
                encoding,
            )
            .map_err(to_py_err)?;
            (particles, rows, None, count)
        };

    let (rows, userinfo) = match userinfo {
        Some(list) if list.len() != n_rows => {
            return Err(PyValueError::new_err(format!(
                "userinfo has {} entries, expected {n_rows}",
                list.len()
            )))
        }
        Some(list) if reclustering.is_some() => ((0..n_rows).collect(), Some(Arc::new(list))),
        Some(list) => (rows, Some(Arc::new(list))),
        None => (rows, inherited),
    };

    let definition = jetshim_core::definition_from_name(algo, R, p).map_err(to_py_err)?;
    let seq = run_clustering(particles, definition, area)?;
    Ok(PyClusterSequence {
        inner: Arc::new(Clustered {
            seq,
            rows,
            userinfo,
        }),
    })
}

/// Silence the engine banner, engine error printing, and panic output
/// from caught engine failures.
#[pyfunction]
#[pyo3(name = "configure_diagnostics")]
fn py_configure_diagnostics() {
    jetshim_core::configure_diagnostics();
}

/// `(pt, eta, phi, mass)` records → `(E, px, py, pz)` records.
#[pyfunction]
#[pyo3(name = "ptepm_to_ep")]
fn py_ptepm_to_ep(vectors: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    jetshim_core::ptepm_to_ep(&flat_records(vectors)?).map_err(to_py_err)
}

/// `(E, px, py, pz)` records → `(pt, eta, phi, mass)` records.
#[pyfunction]
#[pyo3(name = "ep_to_ptepm")]
fn py_ep_to_ptepm(vectors: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    jetshim_core::ep_to_ptepm(&flat_records(vectors)?).map_err(to_py_err)
}

// ─── Module ─────────────────────────────────────────────────────────

#[pymodule]
fn jetshim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyJetDefinition>()?;
    m.add_class::<PyClusterSequence>()?;
    m.add_class::<PyPseudoJet>()?;
    m.add_function(wrap_pyfunction!(py_cluster, m)?)?;
    m.add_function(wrap_pyfunction!(py_configure_diagnostics, m)?)?;
    m.add_function(wrap_pyfunction!(py_ptepm_to_ep, m)?)?;
    m.add_function(wrap_pyfunction!(py_ep_to_ptepm, m)?)?;
    m.add("USING_FULL_BACKEND", USING_FULL_BACKEND)?;
    m.add("AREA_SENTINEL", AREA_SENTINEL)?;
    Ok(())
}
