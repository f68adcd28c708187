//! The simulated beaker.
//!
//! A small 2D particle box: protons and conjugate bases drift with Brownian
//! jitter, bounce off the walls and react when they touch. Add/remove requests
//! are queued and worked off at the start of each step, so callers only see
//! their effect through the lifecycle hooks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::assets::SpriteKind;
use crate::config::SimConfig;
use crate::events::{EventBus, HookEvent, Lifecycle, ParticleId, ParticleKind, Phase};

/// What the session needs from a particle container.
pub trait Container {
    type Context;

    /// Queue `count` new particles of `kind`.
    fn add_particles(&mut self, kind: ParticleKind, count: u32);
    /// Queue removal of `count` particles of `kind`.
    fn remove_particles(&mut self, kind: ParticleKind, count: u32);
    /// Advance one simulation step, firing hooks against `ctx`.
    fn step(&mut self, ctx: &mut Self::Context);
    fn draw(&self) -> Frame;
    fn hooks(&mut self) -> &mut EventBus<Self::Context>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeakerGeometry {
    pub width: f32,
    pub height: f32,
    /// Glass thickness; particles stay inside it
    pub wall: f32,
}

impl Default for BeakerGeometry {
    fn default() -> Self {
        BeakerGeometry {
            width: 360.0,
            height: 420.0,
            wall: 12.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Particle {
    id: ParticleId,
    kind: ParticleKind,
    pos: [f32; 2],
    vel: [f32; 2],
    radius: f32,
    /// Only meaningful for conjugate bases: true while holding a proton
    bound: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    add: u32,
    remove: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawnParticle {
    pub id: ParticleId,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub sprite: SpriteKind,
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub geometry: BeakerGeometry,
    pub step: u64,
    pub particles: Vec<DrawnParticle>,
}

pub struct Beaker<C> {
    cfg: SimConfig,
    particles: Vec<Particle>,
    pending_protons: Pending,
    pending_bases: Pending,
    hooks: EventBus<C>,
    rng: StdRng,
    next_id: ParticleId,
    steps: u64,
}

impl<C> Beaker<C> {
    pub fn new(cfg: SimConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Beaker {
            cfg,
            particles: Vec::new(),
            pending_protons: Pending::default(),
            pending_bases: Pending::default(),
            hooks: EventBus::new(),
            rng,
            next_id: 1,
            steps: 0,
        }
    }

    pub fn geometry(&self) -> BeakerGeometry {
        self.cfg.geometry
    }

    pub fn free_protons(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Proton)
            .count()
    }

    pub fn acids(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::ConjugateBase && p.bound)
            .count()
    }

    pub fn conjugate_bases(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::ConjugateBase && !p.bound)
            .count()
    }

    /// True while add/remove requests are still queued.
    pub fn has_pending(&self) -> bool {
        self.pending_protons != Pending::default() || self.pending_bases != Pending::default()
    }

    fn pending_mut(&mut self, kind: ParticleKind) -> &mut Pending {
        match kind {
            ParticleKind::Proton => &mut self.pending_protons,
            ParticleKind::ConjugateBase => &mut self.pending_bases,
        }
    }

    fn radius_for(&self, kind: ParticleKind) -> f32 {
        match kind {
            ParticleKind::Proton => self.cfg.proton_radius,
            ParticleKind::ConjugateBase => self.cfg.base_radius,
        }
    }

    fn event(&self, p: &Particle, lifecycle: Lifecycle, phase: Phase) -> HookEvent {
        HookEvent {
            kind: p.kind,
            lifecycle,
            phase,
            particle: p.id,
            position: p.pos,
        }
    }

    fn random_interior_point(&mut self, radius: f32) -> [f32; 2] {
        let g = self.cfg.geometry;
        let lo = g.wall + radius;
        let x = self.rng.gen_range(lo..(g.width - lo).max(lo + 1.0));
        let y = self.rng.gen_range(lo..(g.height - lo).max(lo + 1.0));
        [x, y]
    }

    fn clamp_inside(&self, pos: [f32; 2], radius: f32) -> [f32; 2] {
        let g = self.cfg.geometry;
        let lo = g.wall + radius;
        [
            pos[0].clamp(lo, (g.width - lo).max(lo)),
            pos[1].clamp(lo, (g.height - lo).max(lo)),
        ]
    }

    fn spawn(&mut self, ctx: &mut C, kind: ParticleKind, at: Option<[f32; 2]>) -> bool {
        if self.particles.len() >= self.cfg.particle_budget {
            return false;
        }
        let radius = self.radius_for(kind);
        let pos = match at {
            Some(pos) => self.clamp_inside(pos, radius),
            None => self.random_interior_point(radius),
        };
        let speed = self.cfg.max_speed * 0.5;
        let vel = [
            self.rng.gen_range(-speed..=speed),
            self.rng.gen_range(-speed..=speed),
        ];
        let particle = Particle {
            id: self.next_id,
            kind,
            pos,
            vel,
            radius,
            bound: false,
        };
        self.next_id += 1;

        let before = self.event(&particle, Lifecycle::Created, Phase::Before);
        self.hooks.emit(ctx, &before);
        let after = self.event(&particle, Lifecycle::Created, Phase::After);
        self.particles.push(particle);
        self.hooks.emit(ctx, &after);
        true
    }

    /// Remove the newest free particle of `kind`. Acids cannot be removed.
    fn despawn(&mut self, ctx: &mut C, kind: ParticleKind) -> bool {
        let Some(idx) = self
            .particles
            .iter()
            .rposition(|p| p.kind == kind && !p.bound)
        else {
            return false;
        };
        self.remove_at(ctx, idx);
        true
    }

    fn remove_at(&mut self, ctx: &mut C, idx: usize) {
        let before = self.event(&self.particles[idx], Lifecycle::Removed, Phase::Before);
        self.hooks.emit(ctx, &before);
        let particle = self.particles.remove(idx);
        let after = self.event(&particle, Lifecycle::Removed, Phase::After);
        self.hooks.emit(ctx, &after);
    }

    fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.iter().position(|p| p.id == id)
    }

    fn apply_requests(&mut self, ctx: &mut C) {
        for kind in [ParticleKind::ConjugateBase, ParticleKind::Proton] {
            let budget = self.cfg.spawn_per_step;
            let pending = *self.pending_mut(kind);

            let adds = pending.add.min(budget);
            let mut dropped_adds = 0;
            for _ in 0..adds {
                if !self.spawn(ctx, kind, None) {
                    dropped_adds += 1;
                }
            }

            let removes = pending.remove.min(budget);
            let mut dropped_removes = 0;
            for _ in 0..removes {
                if !self.despawn(ctx, kind) {
                    dropped_removes += 1;
                }
            }

            if dropped_adds > 0 || dropped_removes > 0 {
                debug!(?kind, dropped_adds, dropped_removes, "beaker could not satisfy request");
            }

            let pending = self.pending_mut(kind);
            if dropped_adds > 0 {
                pending.add = 0;
            } else {
                pending.add -= adds;
            }
            if dropped_removes > 0 {
                pending.remove = 0;
            } else {
                pending.remove -= removes;
            }
        }
    }

    fn advance(&mut self) {
        let g = self.cfg.geometry;
        let jitter = self.cfg.jitter;
        let max_speed = self.cfg.max_speed;
        for p in self.particles.iter_mut() {
            for axis in 0..2 {
                p.vel[axis] += self.rng.gen_range(-jitter..=jitter);
                p.vel[axis] = p.vel[axis].clamp(-max_speed, max_speed);
                p.pos[axis] += p.vel[axis];
            }

            let lo = g.wall + p.radius;
            let hi = [(g.width - lo).max(lo), (g.height - lo).max(lo)];
            for axis in 0..2 {
                if p.pos[axis] < lo {
                    p.pos[axis] = 2.0 * lo - p.pos[axis];
                    p.vel[axis] = p.vel[axis].abs();
                } else if p.pos[axis] > hi[axis] {
                    p.pos[axis] = 2.0 * hi[axis] - p.pos[axis];
                    p.vel[axis] = -p.vel[axis].abs();
                }
                p.pos[axis] = p.pos[axis].clamp(lo, hi[axis]);
            }
        }
    }

    /// Acids present at the start of the step may give their proton back.
    fn release(&mut self, ctx: &mut C) {
        let acids: Vec<ParticleId> = self
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::ConjugateBase && p.bound)
            .map(|p| p.id)
            .collect();

        for id in acids {
            if self.rng.gen::<f32>() >= self.cfg.release_probability {
                continue;
            }
            // The freed proton needs a slot; a full beaker keeps the acid bound.
            if self.particles.len() >= self.cfg.particle_budget {
                continue;
            }
            let Some(idx) = self.index_of(id) else { continue };

            let before = self.event(&self.particles[idx], Lifecycle::ReleasesProton, Phase::Before);
            self.hooks.emit(ctx, &before);
            self.particles[idx].bound = false;

            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let reach = self.cfg.reaction_radius * 1.5;
            let origin = self.particles[idx].pos;
            let at = [origin[0] + reach * angle.cos(), origin[1] + reach * angle.sin()];
            self.spawn(ctx, ParticleKind::Proton, Some(at));

            if let Some(idx) = self.index_of(id) {
                let after = self.event(&self.particles[idx], Lifecycle::ReleasesProton, Phase::After);
                self.hooks.emit(ctx, &after);
            }
        }
    }

    /// Free conjugate bases touching a proton may take it up.
    fn bind(&mut self, ctx: &mut C) {
        let bases: Vec<ParticleId> = self
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::ConjugateBase && !p.bound)
            .map(|p| p.id)
            .collect();
        let reach_sq = self.cfg.reaction_radius * self.cfg.reaction_radius;

        for base_id in bases {
            let Some(base_idx) = self.index_of(base_id) else { continue };
            let base_pos = self.particles[base_idx].pos;
            let proton = self.particles.iter().position(|p| {
                let dx = p.pos[0] - base_pos[0];
                let dy = p.pos[1] - base_pos[1];
                p.kind == ParticleKind::Proton && dx * dx + dy * dy <= reach_sq
            });
            let Some(proton_idx) = proton else { continue };
            if self.rng.gen::<f32>() >= self.cfg.bind_probability {
                continue;
            }

            let before = self.event(&self.particles[base_idx], Lifecycle::ReactsWithProton, Phase::Before);
            self.hooks.emit(ctx, &before);
            self.remove_at(ctx, proton_idx);
            if let Some(idx) = self.index_of(base_id) {
                self.particles[idx].bound = true;
                let after = self.event(&self.particles[idx], Lifecycle::ReactsWithProton, Phase::After);
                self.hooks.emit(ctx, &after);
            }
        }
    }
}

impl<C> Container for Beaker<C> {
    type Context = C;

    fn add_particles(&mut self, kind: ParticleKind, count: u32) {
        let pending = self.pending_mut(kind);
        pending.add = pending.add.saturating_add(count);
    }

    fn remove_particles(&mut self, kind: ParticleKind, count: u32) {
        let pending = self.pending_mut(kind);
        pending.remove = pending.remove.saturating_add(count);
    }

    fn step(&mut self, ctx: &mut C) {
        self.apply_requests(ctx);
        self.advance();
        self.release(ctx);
        self.bind(ctx);
        self.steps += 1;
    }

    fn draw(&self) -> Frame {
        Frame {
            geometry: self.cfg.geometry,
            step: self.steps,
            particles: self
                .particles
                .iter()
                .map(|p| DrawnParticle {
                    id: p.id,
                    x: p.pos[0],
                    y: p.pos[1],
                    radius: p.radius,
                    sprite: match (p.kind, p.bound) {
                        (ParticleKind::Proton, _) => SpriteKind::Proton,
                        (ParticleKind::ConjugateBase, false) => SpriteKind::ConjugateBase,
                        (ParticleKind::ConjugateBase, true) => SpriteKind::Acid,
                    },
                })
                .collect(),
        }
    }

    fn hooks(&mut self) -> &mut EventBus<C> {
        &mut self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        created: i64,
        removed: i64,
        bound: i64,
        released: i64,
        log: Vec<(Lifecycle, Phase, usize)>,
    }

    fn quiet_config() -> SimConfig {
        SimConfig {
            seed: Some(11),
            bind_probability: 0.0,
            release_probability: 0.0,
            spawn_per_step: 100,
            ..SimConfig::default()
        }
    }

    fn tallying(cfg: SimConfig) -> Beaker<Tally> {
        let mut beaker = Beaker::new(cfg);
        let hooks = beaker.hooks();
        hooks.register(ParticleKind::Proton, Lifecycle::Created, Phase::After, |t: &mut Tally, _| {
            t.created += 1
        });
        hooks.register(ParticleKind::Proton, Lifecycle::Removed, Phase::After, |t: &mut Tally, _| {
            t.removed += 1
        });
        hooks.register(
            ParticleKind::ConjugateBase,
            Lifecycle::ReactsWithProton,
            Phase::After,
            |t: &mut Tally, _| t.bound += 1,
        );
        hooks.register(
            ParticleKind::ConjugateBase,
            Lifecycle::ReleasesProton,
            Phase::Before,
            |t: &mut Tally, _| t.released += 1,
        );
        beaker
    }

    #[test]
    fn requests_are_deferred_until_step() {
        let mut beaker = tallying(quiet_config());
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::Proton, 5);
        assert_eq!(beaker.free_protons(), 0);
        assert!(beaker.has_pending());

        beaker.step(&mut tally);
        assert_eq!(beaker.free_protons(), 5);
        assert_eq!(tally.created, 5);
        assert!(!beaker.has_pending());
    }

    #[test]
    fn requests_are_worked_off_incrementally() {
        let mut beaker = tallying(SimConfig {
            spawn_per_step: 2,
            ..quiet_config()
        });
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::Proton, 5);
        beaker.step(&mut tally);
        assert_eq!(tally.created, 2);
        beaker.step(&mut tally);
        beaker.step(&mut tally);
        assert_eq!(tally.created, 5);
        assert!(!beaker.has_pending());
    }

    #[test]
    fn removing_more_than_present_drops_excess() {
        let mut beaker = tallying(quiet_config());
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::Proton, 3);
        beaker.step(&mut tally);
        beaker.remove_particles(ParticleKind::Proton, 10);
        beaker.step(&mut tally);
        assert_eq!(beaker.free_protons(), 0);
        assert_eq!(tally.removed, 3);
        assert!(!beaker.has_pending());

        beaker.add_particles(ParticleKind::Proton, 1);
        beaker.step(&mut tally);
        assert_eq!(beaker.free_protons(), 1);
    }

    #[test]
    fn budget_caps_additions() {
        let mut beaker = tallying(SimConfig {
            particle_budget: 4,
            ..quiet_config()
        });
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::Proton, 10);
        beaker.step(&mut tally);
        assert_eq!(beaker.free_protons(), 4);
        assert!(!beaker.has_pending());
    }

    #[test]
    fn particles_stay_inside_the_walls() {
        let cfg = SimConfig {
            jitter: 5.0,
            max_speed: 20.0,
            ..quiet_config()
        };
        let g = cfg.geometry;
        let mut beaker = tallying(cfg);
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::Proton, 20);
        beaker.add_particles(ParticleKind::ConjugateBase, 10);
        for _ in 0..200 {
            beaker.step(&mut tally);
        }
        for p in beaker.draw().particles {
            assert!(p.x >= g.wall + p.radius - 1e-3 && p.x <= g.width - g.wall - p.radius + 1e-3);
            assert!(p.y >= g.wall + p.radius - 1e-3 && p.y <= g.height - g.wall - p.radius + 1e-3);
        }
    }

    #[test]
    fn binding_consumes_a_proton_and_marks_an_acid() {
        let mut beaker = tallying(SimConfig {
            bind_probability: 1.0,
            reaction_radius: 10_000.0,
            ..quiet_config()
        });
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::ConjugateBase, 3);
        beaker.add_particles(ParticleKind::Proton, 5);
        beaker.step(&mut tally);

        assert_eq!(beaker.acids(), 3);
        assert_eq!(beaker.conjugate_bases(), 0);
        assert_eq!(beaker.free_protons(), 2);
        assert_eq!(tally.bound, 3);
        assert_eq!(tally.created - tally.removed, 2);

        let frame = beaker.draw();
        let acid_sprites = frame
            .particles
            .iter()
            .filter(|p| p.sprite == SpriteKind::Acid)
            .count();
        assert_eq!(acid_sprites, 3);
    }

    #[test]
    fn release_restores_base_and_proton() {
        let mut beaker = tallying(SimConfig {
            bind_probability: 1.0,
            reaction_radius: 10_000.0,
            ..quiet_config()
        });
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::ConjugateBase, 2);
        beaker.add_particles(ParticleKind::Proton, 2);
        beaker.step(&mut tally);
        assert_eq!(beaker.acids(), 2);

        beaker.cfg.bind_probability = 0.0;
        beaker.cfg.release_probability = 1.0;
        beaker.step(&mut tally);
        assert_eq!(beaker.acids(), 0);
        assert_eq!(beaker.conjugate_bases(), 2);
        assert_eq!(beaker.free_protons(), 2);
        assert_eq!(tally.released, 2);
    }

    #[test]
    fn full_beaker_keeps_acids_bound() {
        let mut beaker = tallying(SimConfig {
            bind_probability: 1.0,
            reaction_radius: 10_000.0,
            ..quiet_config()
        });
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::ConjugateBase, 1);
        beaker.add_particles(ParticleKind::Proton, 1);
        beaker.step(&mut tally);
        assert_eq!(beaker.acids(), 1);

        beaker.cfg.bind_probability = 0.0;
        beaker.add_particles(ParticleKind::Proton, 3);
        beaker.step(&mut tally);
        assert_eq!(beaker.free_protons(), 3);

        beaker.cfg.particle_budget = 4;
        beaker.cfg.release_probability = 1.0;
        for _ in 0..5 {
            beaker.step(&mut tally);
        }
        assert_eq!(beaker.acids(), 1);
        assert_eq!(beaker.free_protons(), 3);
        assert_eq!(tally.released, 0);
    }

    #[test]
    fn before_hooks_see_the_old_state() {
        let mut beaker: Beaker<Tally> = Beaker::new(SimConfig {
            bind_probability: 1.0,
            reaction_radius: 10_000.0,
            ..quiet_config()
        });
        // Record how many hooks had fired so far, letting us check ordering
        for phase in [Phase::Before, Phase::After] {
            for lifecycle in [Lifecycle::ReactsWithProton, Lifecycle::Removed] {
                for kind in [ParticleKind::Proton, ParticleKind::ConjugateBase] {
                    beaker.hooks().register(kind, lifecycle, phase, move |t: &mut Tally, _| {
                        let n = t.log.len();
                        t.log.push((lifecycle, phase, n));
                    });
                }
            }
        }
        let mut tally = Tally::default();
        beaker.add_particles(ParticleKind::ConjugateBase, 1);
        beaker.add_particles(ParticleKind::Proton, 1);
        beaker.step(&mut tally);

        let order: Vec<(Lifecycle, Phase)> = tally.log.iter().map(|(l, p, _)| (*l, *p)).collect();
        assert_eq!(
            order,
            vec![
                (Lifecycle::ReactsWithProton, Phase::Before),
                (Lifecycle::Removed, Phase::Before),
                (Lifecycle::Removed, Phase::After),
                (Lifecycle::ReactsWithProton, Phase::After),
            ]
        );
    }

    #[test]
    fn seeded_beakers_are_reproducible() {
        let run = || {
            let mut beaker = tallying(SimConfig {
                seed: Some(99),
                ..SimConfig::default()
            });
            let mut tally = Tally::default();
            beaker.add_particles(ParticleKind::ConjugateBase, 10);
            beaker.add_particles(ParticleKind::Proton, 10);
            for _ in 0..50 {
                beaker.step(&mut tally);
            }
            beaker
                .draw()
                .particles
                .iter()
                .map(|p| (p.id, p.x.to_bits(), p.y.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
