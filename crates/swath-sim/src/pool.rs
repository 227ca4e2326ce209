//! Particle storage: structure-of-arrays pool with wrap-around allocation

use crate::disc::DiscSide;
use swath_core::Vec3;

/// Lifecycle phase of a particle. On-disc fields live only in the
/// `OnDisc` variant and are meaningless elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Falling from the feed orifice toward the discs
    Falling,
    /// Riding a disc
    OnDisc {
        side: DiscSide,
        /// Polar radius from the disc center
        radius: f32,
        /// World-frame polar angle around the disc center
        angle: f32,
        /// The particle's own spin rate, distinct from the disc's
        angular_velocity: f32,
    },
    /// Free flight after ejection
    Flying,
    /// Terminal: settled on the ground
    Landed,
}

impl Phase {
    /// Numeric code packed into renderer instances
    pub fn code(&self) -> f32 {
        match self {
            Phase::Falling => 0.0,
            Phase::OnDisc { .. } => 1.0,
            Phase::Flying => 2.0,
            Phase::Landed => 3.0,
        }
    }
}

/// Fixed-capacity particle pool. Slots are handed out by a monotonically
/// advancing cursor modulo capacity; allocation unconditionally overwrites
/// whatever occupied the slot, so a still-Landed particle in a reused slot
/// is silently discarded.
pub struct ParticlePool {
    pub(crate) alive: Vec<bool>,
    pub(crate) phase: Vec<Phase>,
    pub(crate) position: Vec<Vec3>,
    pub(crate) velocity: Vec<Vec3>,
    cursor: usize,
    alive_count: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be at least 1");
        Self {
            alive: vec![false; capacity],
            phase: vec![Phase::Falling; capacity],
            position: vec![Vec3::ZERO; capacity],
            velocity: vec![Vec3::ZERO; capacity],
            cursor: 0,
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Claim the next slot for a freshly emitted Falling particle,
    /// overwriting any previous occupant
    pub fn allocate(&mut self, position: Vec3, velocity: Vec3) -> usize {
        let i = self.cursor;
        self.cursor = (self.cursor + 1) % self.alive.len();
        if !self.alive[i] {
            self.alive_count += 1;
        }
        self.alive[i] = true;
        self.phase[i] = Phase::Falling;
        self.position[i] = position;
        self.velocity[i] = velocity;
        i
    }

    /// Release a slot for reuse
    pub fn free(&mut self, index: usize) {
        if self.alive[index] {
            self.alive[index] = false;
            self.alive_count -= 1;
        }
    }

    /// Clear all particles and rewind the cursor
    pub fn reset(&mut self) {
        self.alive.fill(false);
        self.cursor = 0;
        self.alive_count = 0;
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.alive[index]
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.position[index]
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        self.velocity[index]
    }

    pub fn phase(&self, index: usize) -> &Phase {
        &self.phase[index]
    }

    /// Iterate alive particles as (index, position, phase)
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, Vec3, &Phase)> {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, &a)| a)
            .map(move |(i, _)| (i, self.position[i], &self.phase[i]))
    }
}
