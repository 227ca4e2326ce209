//! Spinner discs and capture of falling particles

use crate::config::SpreaderConfig;
use std::f32::consts::TAU;
use swath_core::Vec3;

/// Which of the two counter-rotating discs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscSide {
    Left,
    Right,
}

impl DiscSide {
    /// Sign of the disc's x offset from the machine centerline
    pub fn sign(&self) -> f32 {
        match self {
            DiscSide::Left => -1.0,
            DiscSide::Right => 1.0,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DiscSide::Left => 0,
            DiscSide::Right => 1,
        }
    }
}

/// One spinner disc. The pair counter-rotates: left spins positive,
/// right negative.
#[derive(Debug, Clone, Copy)]
pub struct Disc {
    pub side: DiscSide,
    /// Fixed offset from the machine centerline
    pub center_x: f32,
    /// Tracks the machine's forward position
    pub center_z: f32,
    /// Integrated continuously, never wrapped
    pub angle: f32,
    /// Signed spin rate in rad/s
    pub angular_velocity: f32,
    pub radius: f32,
    /// Blades evenly spaced at 2*pi/blade_count
    pub blade_count: u32,
}

impl Disc {
    pub fn new(side: DiscSide, config: &SpreaderConfig) -> Self {
        Self {
            side,
            center_x: side.sign() * config.disc_offset_x,
            center_z: 0.0,
            angle: 0.0,
            angular_velocity: Self::signed_omega(side, config.disc_omega()),
            radius: config.disc_radius,
            blade_count: config.blade_count,
        }
    }

    fn signed_omega(side: DiscSide, omega: f32) -> f32 {
        match side {
            DiscSide::Left => omega,
            DiscSide::Right => -omega,
        }
    }

    /// Change spin rate, preserving this disc's spin direction
    pub fn set_speed(&mut self, omega: f32) {
        self.angular_velocity = Self::signed_omega(self.side, omega);
    }

    /// Integrate rotation and follow the machine forward
    pub fn advance(&mut self, dt: f32, machine_z: f32) {
        self.angle += self.angular_velocity * dt;
        self.center_z = machine_z;
    }

    pub fn blade_spacing(&self) -> f32 {
        TAU / self.blade_count as f32
    }

    /// Ground-plane distance from a world position to the disc center
    pub fn horizontal_distance(&self, p: Vec3) -> f32 {
        let dx = p.x - self.center_x;
        let dz = p.z - self.center_z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Decide whether a falling particle is captured by a disc, and which one.
///
/// Only descending particles within the pickup window of the disc plane
/// qualify. When the particle is over both discs (overlapping radii), the
/// nearer disc by horizontal distance wins; an exact tie goes left.
pub fn detect_capture(
    position: Vec3,
    velocity: Vec3,
    discs: &[Disc; 2],
    config: &SpreaderConfig,
) -> Option<DiscSide> {
    if velocity.y > 0.0 {
        return None;
    }
    if (position.y - config.disc_height).abs() > config.pickup_window {
        return None;
    }

    let mut best: Option<(f32, DiscSide)> = None;
    for disc in discs {
        let d = disc.horizontal_distance(position);
        if d > disc.radius {
            continue;
        }
        match best {
            Some((bd, _)) if d >= bd => {}
            _ => best = Some((d, disc.side)),
        }
    }
    best.map(|(_, side)| side)
}
