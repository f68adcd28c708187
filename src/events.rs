//! Per-container particle lifecycle hooks.
//!
//! Every beaker owns its own `EventBus`, so two beakers never see each
//! other's events. Handlers are registered against a `(kind, event, phase)`
//! triple and receive a mutable context `C` (the session state) plus the
//! event that fired. `Phase::Before` handlers run before the container applies
//! the state change, `Phase::After` handlers once it has been applied.

use serde::Serialize;
use tracing::trace;

/// Particle kinds the beaker knows about. An acid is a bound conjugate base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Proton,
    ConjugateBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Created,
    Removed,
    /// A conjugate base took up a proton and became an acid.
    ReactsWithProton,
    /// An acid gave its proton back and became a conjugate base.
    ReleasesProton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Before,
    After,
}

pub type ParticleId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HookEvent {
    pub kind: ParticleKind,
    pub lifecycle: Lifecycle,
    pub phase: Phase,
    pub particle: ParticleId,
    pub position: [f32; 2],
}

pub type Handler<C> = Box<dyn FnMut(&mut C, &HookEvent) + Send>;

struct Registration<C> {
    kind: ParticleKind,
    lifecycle: Lifecycle,
    phase: Phase,
    handler: Handler<C>,
}

pub struct EventBus<C> {
    registrations: Vec<Registration<C>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one kind, lifecycle event and phase.
    /// Handlers for the same triple run in registration order.
    pub fn register<F>(&mut self, kind: ParticleKind, lifecycle: Lifecycle, phase: Phase, handler: F)
    where
        F: FnMut(&mut C, &HookEvent) + Send + 'static,
    {
        self.registrations.push(Registration {
            kind,
            lifecycle,
            phase,
            handler: Box::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Run every handler matching the event. Returns how many ran.
    pub fn emit(&mut self, ctx: &mut C, event: &HookEvent) -> usize {
        let mut fired = 0;
        for reg in self.registrations.iter_mut() {
            if reg.kind == event.kind && reg.lifecycle == event.lifecycle && reg.phase == event.phase {
                (reg.handler)(ctx, event);
                fired += 1;
            }
        }
        if fired > 0 {
            trace!(
                kind = ?event.kind,
                lifecycle = ?event.lifecycle,
                phase = ?event.phase,
                particle = event.particle,
                fired,
                "hook dispatched"
            );
        }
        fired
    }
}

impl<C> std::fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
