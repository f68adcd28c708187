//! Turns a desired proton count into beaker add/remove requests.
//!
//! The delta is taken against the last count the subscribers reported, not
//! against requests still queued in the beaker. The counter catches up once
//! the beaker works the request off.

use serde::Serialize;
use tracing::debug;

use crate::beaker::Container;
use crate::chemistry::MAX_PROTONS;
use crate::events::ParticleKind;
use crate::session::Counters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "count", rename_all = "snake_case")]
pub enum ProtonRequest {
    Unchanged,
    Add(u32),
    Remove(u32),
}

/// Request needed to move `current` to `desired`, with `desired` clamped to
/// the slider range first.
pub fn plan(desired: i64, current: u32) -> ProtonRequest {
    let desired = desired.clamp(0, MAX_PROTONS);
    let delta = desired - i64::from(current);
    match delta {
        0 => ProtonRequest::Unchanged,
        d if d > 0 => ProtonRequest::Add(d as u32),
        d => ProtonRequest::Remove(d.unsigned_abs() as u32),
    }
}

pub fn reconcile_protons<C: Container + ?Sized>(
    desired: i64,
    counters: &Counters,
    container: &mut C,
) -> ProtonRequest {
    let request = plan(desired, counters.protons);
    match request {
        ProtonRequest::Unchanged => {}
        ProtonRequest::Add(n) => container.add_particles(ParticleKind::Proton, n),
        ProtonRequest::Remove(n) => container.remove_particles(ParticleKind::Proton, n),
    }
    if request != ProtonRequest::Unchanged {
        debug!(desired, current = counters.protons, ?request, "reconciling protons");
    }
    request
}
