//! Command-line and simulation configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::beaker::BeakerGeometry;

#[derive(Debug, Clone, Parser)]
#[command(name = "proton-beaker", about = "Acid / conjugate-base proton exchange visualizer")]
pub struct Cli {
    /// Address the web server binds to
    #[arg(long, env = "BEAKER_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Seed for the particle simulation. Random when omitted.
    #[arg(long, env = "BEAKER_SEED")]
    pub seed: Option<u64>,

    /// Chance per step that a proton touching a free conjugate base binds to it
    #[arg(long, default_value_t = 0.2)]
    pub bind_probability: f32,

    /// Chance per step that an acid gives its proton back
    #[arg(long, default_value_t = 0.01)]
    pub release_probability: f32,

    /// Particle add/remove requests processed per kind per frame
    #[arg(long, default_value_t = 4)]
    pub spawn_per_step: u32,

    /// Sessions that request no frames for this many seconds are dropped
    #[arg(long, default_value_t = 600)]
    pub session_idle_secs: u64,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn sim_config(&self) -> SimConfig {
        let defaults = SimConfig::default();
        SimConfig {
            seed: self.seed,
            bind_probability: probability(self.bind_probability, defaults.bind_probability),
            release_probability: probability(self.release_probability, defaults.release_probability),
            spawn_per_step: self.spawn_per_step.max(1),
            ..defaults
        }
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs.max(1))
    }
}

/// Non-finite values fall back to `default`.
fn probability(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

/// Tuning for one beaker. Every session gets its own beaker built from this.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub geometry: BeakerGeometry,
    /// Hard cap on particles in the beaker, bound or free
    pub particle_budget: usize,
    pub spawn_per_step: u32,
    pub reaction_radius: f32,
    pub bind_probability: f32,
    pub release_probability: f32,
    /// Largest random velocity change applied per step
    pub jitter: f32,
    pub max_speed: f32,
    pub proton_radius: f32,
    pub base_radius: f32,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            geometry: BeakerGeometry::default(),
            particle_budget: 128,
            spawn_per_step: 4,
            reaction_radius: 16.0,
            bind_probability: 0.2,
            release_probability: 0.01,
            jitter: 0.6,
            max_speed: 3.0,
            proton_radius: 5.0,
            base_radius: 12.0,
            seed: None,
        }
    }
}
