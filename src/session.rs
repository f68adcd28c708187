//! Per-session state and the lifecycle subscribers that maintain it.
//!
//! Counters are written only by the four subscribers registered here, each
//! reacting to one beaker hook. Nothing else in the crate mutates them.

use tracing::trace;

use crate::chemistry::NUM_CONJUGATE_BASES;
use crate::events::{EventBus, HookEvent, Lifecycle, ParticleKind, Phase};
use crate::view::Views;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Counters {
    /// Free protons currently in the beaker
    pub protons: u32,
    /// Conjugate bases currently holding a proton
    pub acids: u32,
}

impl Counters {
    pub fn conjugate_bases(&self) -> u32 {
        NUM_CONJUGATE_BASES.saturating_sub(self.acids)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub counters: Counters,
    pub views: Views,
}

impl SessionState {
    pub fn new(views: Views) -> Self {
        SessionState {
            counters: Counters::default(),
            views,
        }
    }
}

pub fn on_proton_created(state: &mut SessionState, _event: &HookEvent) {
    state.counters.protons += 1;
    state.views.show_protons(state.counters.protons);
}

pub fn on_proton_removed(state: &mut SessionState, _event: &HookEvent) {
    state.counters.protons = state.counters.protons.saturating_sub(1);
    state.views.show_protons(state.counters.protons);
}

/// Runs before the acid gives its proton back.
pub fn on_releases_proton(state: &mut SessionState, _event: &HookEvent) {
    state.counters.acids = state.counters.acids.saturating_sub(1);
    state.views.show_acids(state.counters.acids);
    state.views.show_ph(state.counters.protons);
}

/// Runs after the base has taken up a proton.
pub fn on_reacts_with_proton(state: &mut SessionState, _event: &HookEvent) {
    state.counters.acids = (state.counters.acids + 1).min(NUM_CONJUGATE_BASES);
    state.views.show_acids(state.counters.acids);
    state.views.show_ph(state.counters.protons);
}

pub fn register_subscribers(bus: &mut EventBus<SessionState>) {
    bus.register(ParticleKind::Proton, Lifecycle::Created, Phase::After, on_proton_created);
    bus.register(ParticleKind::Proton, Lifecycle::Removed, Phase::After, on_proton_removed);
    bus.register(
        ParticleKind::ConjugateBase,
        Lifecycle::ReleasesProton,
        Phase::Before,
        on_releases_proton,
    );
    bus.register(
        ParticleKind::ConjugateBase,
        Lifecycle::ReactsWithProton,
        Phase::After,
        on_reacts_with_proton,
    );
    trace!(handlers = bus.len(), "session subscribers registered");
}
