// ─────────────────────────────────────────────────────────────────────
// Jetshim — Kinematic Converter
// ─────────────────────────────────────────────────────────────────────
//! Flat `f64` buffers → canonical `PseudoJet`s.
//!
//! A buffer holds `count` records of `fields_per_record` doubles each.
//! `Encoding::Ep` records are `(E, px, py, pz)`; `Encoding::PtEtaPhiMass`
//! records are `(pt, eta, phi, mass)`. A positive `eta_max` drops every
//! particle with `|eta| > eta_max`; zero or negative disables the cut.

use jetshim_types::{Encoding, JetError, JetResult, PseudoJet};

/// Doubles per record, for either encoding.
pub const FIELDS_PER_RECORD: usize = 4;

/// Convert `count` records from `buffer` into a fresh vector.
pub fn convert_records(
    buffer: &[f64],
    count: usize,
    fields_per_record: usize,
    eta_max: f64,
    encoding: Encoding,
) -> JetResult<Vec<PseudoJet>> {
    let mut out = Vec::new();
    convert_records_into(&mut out, buffer, count, fields_per_record, eta_max, encoding)?;
    Ok(out)
}

/// Same as [`convert_records`], reusing `out`.
///
/// `out` is cleared before it is filled. On error it is left untouched.
pub fn convert_records_into(
    out: &mut Vec<PseudoJet>,
    buffer: &[f64],
    count: usize,
    fields_per_record: usize,
    eta_max: f64,
    encoding: Encoding,
) -> JetResult<()> {
    let records = checked_records(buffer, count, fields_per_record, encoding)?;

    out.clear();
    out.reserve(count);
    let dropped = accept_records(records, fields_per_record, eta_max, encoding, |_, p| {
        out.push(p)
    });

    log::debug!(
        "converted {count} {encoding} records: {} kept, {dropped} dropped",
        out.len()
    );
    Ok(())
}

/// As [`convert_records`], also returning the input row of every kept
/// particle so results can be traced back to the caller's records.
pub fn convert_records_indexed(
    buffer: &[f64],
    count: usize,
    fields_per_record: usize,
    eta_max: f64,
    encoding: Encoding,
) -> JetResult<(Vec<PseudoJet>, Vec<usize>)> {
    let records = checked_records(buffer, count, fields_per_record, encoding)?;
    let mut particles = Vec::with_capacity(count);
    let mut rows = Vec::with_capacity(count);
    let dropped = accept_records(records, fields_per_record, eta_max, encoding, |row, p| {
        particles.push(p);
        rows.push(row);
    });
    log::debug!(
        "converted {count} {encoding} records with row indices: {} kept, {dropped} dropped",
        particles.len()
    );
    Ok((particles, rows))
}

/// Decode validated records in order, handing every particle that passes
/// the eta cut to `keep`. Returns the number dropped.
fn accept_records(
    records: &[f64],
    fields_per_record: usize,
    eta_max: f64,
    encoding: Encoding,
    mut keep: impl FnMut(usize, PseudoJet),
) -> usize {
    let cut = eta_max > 0.0;
    let mut dropped = 0usize;

    for (i, record) in records.chunks_exact(fields_per_record).enumerate() {
        let particle = match encoding {
            Encoding::Ep => PseudoJet::from_ep(record[0], record[1], record[2], record[3]),
            Encoding::PtEtaPhiMass => {
                PseudoJet::from_pt_eta_phi_m(record[0], record[1], record[2], record[3])
            }
        };
        if cut {
            let eta = particle.eta();
            if eta.abs() > eta_max {
                log::trace!("record {i}: |eta| = {:.3} > {eta_max}, dropped", eta.abs());
                dropped += 1;
                continue;
            }
        }
        keep(i, particle);
    }
    dropped
}

/// Validate the buffer shape and return exactly the bytes that will be read.
fn checked_records(
    buffer: &[f64],
    count: usize,
    fields_per_record: usize,
    encoding: Encoding,
) -> JetResult<&[f64]> {
    if fields_per_record != encoding.fields() {
        return Err(JetError::InvalidInput(format!(
            "{encoding} records need {} fields, got {fields_per_record}",
            encoding.fields()
        )));
    }
    let needed = count.checked_mul(fields_per_record).ok_or_else(|| {
        JetError::InvalidInput(format!(
            "{count} records of {fields_per_record} fields overflow the address space"
        ))
    })?;
    if needed > buffer.len() {
        return Err(JetError::InvalidInput(format!(
            "{count} records of {fields_per_record} fields need {needed} values, buffer holds {}",
            buffer.len()
        )));
    }
    Ok(&buffer[..needed])
}

fn checked_flat(records: &[f64]) -> JetResult<()> {
    if records.len() % FIELDS_PER_RECORD != 0 {
        return Err(JetError::InvalidInput(format!(
            "buffer length {} is not a multiple of {FIELDS_PER_RECORD}",
            records.len()
        )));
    }
    Ok(())
}

/// `(pt, eta, phi, mass)` records → `(E, px, py, pz)` records.
pub fn ptepm_to_ep(records: &[f64]) -> JetResult<Vec<f64>> {
    checked_flat(records)?;
    Ok(records
        .chunks_exact(FIELDS_PER_RECORD)
        .flat_map(|r| PseudoJet::from_pt_eta_phi_m(r[0], r[1], r[2], r[3]).to_ep())
        .collect())
}

/// `(E, px, py, pz)` records → `(pt, eta, phi, mass)` records.
pub fn ep_to_ptepm(records: &[f64]) -> JetResult<Vec<f64>> {
    checked_flat(records)?;
    Ok(records
        .chunks_exact(FIELDS_PER_RECORD)
        .flat_map(|r| PseudoJet::from_ep(r[0], r[1], r[2], r[3]).to_pt_eta_phi_m())
        .collect())
}
