//! Preload, setup and per-frame entry points for one beaker session.
//!
//! The render loop drives a [`Sketch`] through `preload` -> `setup` ->
//! `frame`*. Each stage owns what the previous one produced, so a frame can
//! only run against a fully built beaker.

use tracing::{debug, info};

use crate::assets::{self, SpriteSet};
use crate::beaker::{Beaker, BeakerGeometry, Container, Frame};
use crate::chemistry::{INITIAL_PROTONS, NUM_CONJUGATE_BASES};
use crate::config::SimConfig;
use crate::error::LifecycleError;
use crate::events::ParticleKind;
use crate::reconciler::{reconcile_protons, ProtonRequest};
use crate::session::{register_subscribers, SessionState};
use crate::view::{build_views, desired_protons, Control};

struct Running {
    sprites: SpriteSet,
    state: SessionState,
    beaker: Beaker<SessionState>,
}

enum Stage {
    Fresh,
    Preloaded(SpriteSet),
    Running(Box<Running>),
}

pub struct Sketch {
    cfg: SimConfig,
    stage: Stage,
}

impl Sketch {
    pub fn new(cfg: SimConfig) -> Self {
        Sketch {
            cfg,
            stage: Stage::Fresh,
        }
    }

    /// Load the beaker, conjugate-base, acid and proton sprites.
    pub fn preload(&mut self) -> Result<SpriteSet, LifecycleError> {
        if !matches!(self.stage, Stage::Fresh) {
            return Err(LifecycleError::AlreadyPreloaded);
        }
        let sprites = assets::preload()?;
        self.stage = Stage::Preloaded(sprites.clone());
        Ok(sprites)
    }

    /// Build the beaker and views, hook up the subscribers and request the
    /// starting particles. The particles appear over the following frames.
    pub fn setup(&mut self) -> Result<BeakerGeometry, LifecycleError> {
        let sprites = match std::mem::replace(&mut self.stage, Stage::Fresh) {
            Stage::Preloaded(sprites) => sprites,
            other => {
                let err = match &other {
                    Stage::Fresh => LifecycleError::NotPreloaded,
                    _ => LifecycleError::AlreadySetUp,
                };
                self.stage = other;
                return Err(err);
            }
        };

        let mut beaker = Beaker::new(self.cfg.clone());
        let geometry = beaker.geometry();
        let state = SessionState::new(build_views(INITIAL_PROTONS, &sprites));
        register_subscribers(beaker.hooks());

        beaker.add_particles(ParticleKind::ConjugateBase, NUM_CONJUGATE_BASES);
        beaker.add_particles(ParticleKind::Proton, INITIAL_PROTONS as u32);
        info!(
            width = geometry.width,
            height = geometry.height,
            bases = NUM_CONJUGATE_BASES,
            protons = INITIAL_PROTONS,
            "beaker set up"
        );

        self.stage = Stage::Running(Box::new(Running {
            sprites,
            state,
            beaker,
        }));
        Ok(geometry)
    }

    /// Advance the beaker one step and draw it.
    pub fn frame(&mut self) -> Result<Frame, LifecycleError> {
        let running = self.running_mut()?;
        running.beaker.step(&mut running.state);
        Ok(running.beaker.draw())
    }

    /// Route a slider or pH edit to the reconciler. Returns `None` when the
    /// text is not a number, in which case nothing changes.
    pub fn edit(&mut self, control: Control, text: &str) -> Result<Option<ProtonRequest>, LifecycleError> {
        let running = self.running_mut()?;
        let Some(desired) = desired_protons(control, text) else {
            return Ok(None);
        };
        debug!(?control, desired, "edit");
        Ok(Some(reconcile_protons(
            desired,
            &running.state.counters,
            &mut running.beaker,
        )))
    }

    pub fn state(&self) -> Option<&SessionState> {
        match &self.stage {
            Stage::Running(running) => Some(&running.state),
            _ => None,
        }
    }

    pub fn sprites(&self) -> Option<&SpriteSet> {
        match &self.stage {
            Stage::Fresh => None,
            Stage::Preloaded(sprites) => Some(sprites),
            Stage::Running(running) => Some(&running.sprites),
        }
    }

    /// Beaker drawing without stepping, for a page that reconnects.
    pub fn draw(&self) -> Option<Frame> {
        match &self.stage {
            Stage::Running(running) => Some(running.beaker.draw()),
            _ => None,
        }
    }

    fn running_mut(&mut self) -> Result<&mut Running, LifecycleError> {
        match &mut self.stage {
            Stage::Running(running) => Ok(&mut **running),
            _ => Err(LifecycleError::NotSetUp),
        }
    }
}
