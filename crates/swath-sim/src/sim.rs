//! Top-level simulation: owns all state and advances it one step at a time.
//!
//! Single-threaded and step-driven: the external render loop calls
//! `step(dt)` and all work for the step completes before control returns.
//! `reset()` must not be interleaved inside a step, which the `&mut self`
//! receivers already guarantee.

use bytemuck::{Pod, Zeroable};
use swath_core::{Result, Vec3};

use crate::ballistic;
use crate::carry;
use crate::config::{GroundPolicy, SpreaderConfig};
use crate::disc::{self, Disc, DiscSide};
use crate::eject;
use crate::emitter::FeedEmitter;
use crate::pool::{ParticlePool, Phase};
use crate::rand::SimRng;

const GROUND_Y: f32 = 0.0;

/// Per-particle render data — one vec4 per alive particle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// xyz = world position, w = lifecycle phase code
    pub pos_phase: [f32; 4],
}

/// The twin-disc spreader simulation
pub struct SpreaderSim {
    config: SpreaderConfig,
    pool: ParticlePool,
    emitter: FeedEmitter,
    discs: [Disc; 2],
    machine_z: f32,
    rng: SimRng,
    /// Pre-allocated instance buffer for the renderer
    instances: Vec<ParticleInstance>,
}

impl SpreaderSim {
    /// Validates the configuration and builds the simulation.
    pub fn new(config: SpreaderConfig) -> Result<Self> {
        Self::with_seed(config, 0xDEAD_BEEF)
    }

    /// As `new`, with an explicit RNG seed for reproducible runs.
    pub fn with_seed(config: SpreaderConfig, seed: u32) -> Result<Self> {
        config.validate()?;
        let pool = ParticlePool::new(config.capacity);
        let discs = [
            Disc::new(DiscSide::Left, &config),
            Disc::new(DiscSide::Right, &config),
        ];
        Ok(Self {
            pool,
            emitter: FeedEmitter::new(),
            discs,
            machine_z: 0.0,
            rng: SimRng::new(seed),
            instances: Vec::with_capacity(config.capacity),
            config,
        })
    }

    /// Advance the whole simulation by one step. `dt` is clamped to the
    /// configured maximum to bound integration error during slow frames.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, self.config.max_step);
        if dt <= 0.0 {
            return;
        }

        self.machine_z += self.config.forward_speed * dt;
        for d in &mut self.discs {
            d.advance(dt, self.machine_z);
        }

        self.emitter
            .step(dt, self.machine_z, &self.config, &mut self.pool, &mut self.rng);

        for i in 0..self.pool.capacity() {
            if !self.pool.alive[i] {
                continue;
            }
            let phase = self.pool.phase[i];
            match phase {
                Phase::Falling => {
                    ballistic::integrate(
                        &mut self.pool.position[i],
                        &mut self.pool.velocity[i],
                        self.config.gravity,
                        self.config.drag,
                        dt,
                    );
                    if self.pool.position[i].y <= GROUND_Y {
                        self.settle(i);
                        continue;
                    }
                    let position = self.pool.position[i];
                    let velocity = self.pool.velocity[i];
                    if let Some(side) =
                        disc::detect_capture(position, velocity, &self.discs, &self.config)
                    {
                        let disc = self.discs[side.index()];
                        let (radius, angle, angular_velocity) =
                            carry::begin_carry(position, &disc, &self.config);
                        self.pool.position[i] =
                            carry::carry_position(radius, angle, &disc, &self.config);
                        self.pool.velocity[i] = Vec3::ZERO;
                        self.pool.phase[i] = Phase::OnDisc {
                            side,
                            radius,
                            angle,
                            angular_velocity,
                        };
                    }
                }
                Phase::OnDisc {
                    side,
                    mut radius,
                    mut angle,
                    mut angular_velocity,
                } => {
                    let disc = self.discs[side.index()];
                    let release = carry::update_carry(
                        &mut radius,
                        &mut angle,
                        &mut angular_velocity,
                        &disc,
                        &self.config,
                        dt,
                    );
                    self.pool.position[i] =
                        carry::carry_position(radius, angle, &disc, &self.config);
                    match release {
                        Some(rel) => {
                            self.pool.velocity[i] =
                                eject::launch_velocity(&disc, &rel, &self.config, &mut self.rng);
                            self.pool.phase[i] = Phase::Flying;
                        }
                        None => {
                            self.pool.phase[i] = Phase::OnDisc {
                                side,
                                radius,
                                angle,
                                angular_velocity,
                            };
                        }
                    }
                }
                Phase::Flying => {
                    ballistic::integrate(
                        &mut self.pool.position[i],
                        &mut self.pool.velocity[i],
                        self.config.gravity,
                        self.config.drag,
                        dt,
                    );
                    if self.pool.position[i].y <= GROUND_Y {
                        self.settle(i);
                    }
                }
                Phase::Landed => {}
            }
        }
    }

    /// Ground contact: clamp to the ground plane, kill velocity, then
    /// retain or recycle per policy
    fn settle(&mut self, index: usize) {
        self.pool.position[index].y = GROUND_Y;
        self.pool.velocity[index] = Vec3::ZERO;
        match self.config.ground_policy {
            GroundPolicy::Retain => self.pool.phase[index] = Phase::Landed,
            GroundPolicy::Recycle => self.pool.free(index),
        }
    }

    /// Clear all particles and rewind the machine to its starting pose.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.emitter.reset();
        self.machine_z = 0.0;
        for d in &mut self.discs {
            d.angle = 0.0;
            d.center_z = 0.0;
        }
        self.instances.clear();
        println!("[sim] reset");
    }

    // ── Control surface ──

    pub fn set_disc_speed_rpm(&mut self, rpm: f32) {
        self.config.disc_speed_rpm = rpm.max(0.0);
        let omega = self.config.disc_omega();
        for d in &mut self.discs {
            d.set_speed(omega);
        }
    }

    pub fn set_emission_rate(&mut self, particles_per_second: f32) {
        self.config.emission_rate = particles_per_second.max(0.0);
    }

    pub fn set_forward_speed(&mut self, meters_per_second: f32) {
        self.config.forward_speed = meters_per_second.max(0.0);
    }

    // ── Renderer outputs ──

    /// Pack every alive particle's position and phase into the instance
    /// buffer. Call after `step()`.
    pub fn pack_instances(&mut self) {
        self.instances.clear();
        for (_, position, phase) in self.pool.iter_alive() {
            self.instances.push(ParticleInstance {
                pos_phase: [position.x, position.y, position.z, phase.code()],
            });
        }
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    pub fn discs(&self) -> &[Disc; 2] {
        &self.discs
    }

    pub fn disc(&self, side: DiscSide) -> &Disc {
        &self.discs[side.index()]
    }

    pub fn machine_position(&self) -> f32 {
        self.machine_z
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn config(&self) -> &SpreaderConfig {
        &self.config
    }

    pub fn total_emitted(&self) -> u64 {
        self.emitter.total_emitted()
    }
}
