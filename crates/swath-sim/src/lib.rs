//! Swath Sim - twin-disc spreader particle simulation
//!
//! Models how a twin-disc spreader distributes granular material:
//! particles fall from a feed aperture, are carried by one of two
//! counter-rotating discs, release at a blade strike, fly ballistically,
//! and settle into a deposition pattern on the ground.
//!
//! The crate is an in-process library: an external driver calls
//! [`SpreaderSim::step`] once per frame and reads back packed particle
//! instances and disc poses for display. Rendering, camera handling, and
//! on-screen controls live outside this crate.

pub mod ballistic;
pub mod carry;
pub mod config;
pub mod disc;
pub mod eject;
pub mod emitter;
pub mod pool;
pub mod rand;
pub mod sim;

pub use config::{GroundPolicy, SpreaderConfig};
pub use disc::{Disc, DiscSide};
pub use emitter::FeedEmitter;
pub use pool::{ParticlePool, Phase};
pub use sim::{ParticleInstance, SpreaderSim};
