//! Acid / conjugate-base proton exchange visualizer.
//!
//! A learner sets the number of free protons in a simulated beaker, either
//! directly or through pH, and watches conjugate bases take them up and give
//! them back. The crate holds the beaker engine, the per-session bookkeeping
//! that keeps the slider, pH field and count table in step with it, and the
//! web server that serves the page.

pub mod assets;
pub mod beaker;
pub mod chemistry;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod lifecycle;
pub mod page;
pub mod reconciler;
pub mod server;
pub mod session;
pub mod view;
