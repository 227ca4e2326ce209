//! Disc carry model: how a captured particle rides a disc, slips toward
//! the disc's spin, drifts outward, and decides its release moment.
//!
//! This is a stylized heuristic tuned by feel, not a contact solver: the
//! slip coupling is a first-order lag standing in for Coulomb-like
//! friction, and the outward drift is a constant rate standing in for
//! centrifugal displacement along a vane.

use crate::config::SpreaderConfig;
use crate::disc::Disc;
use std::f32::consts::{PI, TAU};
use swath_core::Vec3;

/// A release decision: where on the disc the particle lets go
#[derive(Debug, Clone, Copy)]
pub struct Release {
    /// World-frame angle of the releasing blade
    pub blade_angle: f32,
    /// Polar radius at release
    pub radius: f32,
}

/// Wrap an angle into (-pi, pi]
pub(crate) fn wrap_angle(a: f32) -> f32 {
    let mut a = a % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Initialize on-disc state at the moment of capture.
///
/// Returns (radius, angle, angular_velocity). The radius is clamped into
/// `[min_radius, disc_radius - rim_margin]`, and the particle starts with
/// only a fraction of the disc's spin — it does not instantly match.
pub fn begin_carry(position: Vec3, disc: &Disc, config: &SpreaderConfig) -> (f32, f32, f32) {
    let dx = position.x - disc.center_x;
    let dz = position.z - disc.center_z;
    let radius = (dx * dx + dz * dz)
        .sqrt()
        .clamp(config.min_radius, disc.radius - config.rim_margin);
    let angle = dz.atan2(dx);
    let angular_velocity = config.slip_fraction * disc.angular_velocity;
    (radius, angle, angular_velocity)
}

/// Advance one on-disc particle by one step, mutating its polar state in
/// place. Returns `Some(Release)` when the particle should leave the disc.
///
/// Release fires when a blade catches the particle (angular alignment
/// within tolerance, slip above threshold, radius off the floor) or when
/// the particle has drifted out to the release radius without being caught.
pub fn update_carry(
    radius: &mut f32,
    angle: &mut f32,
    angular_velocity: &mut f32,
    disc: &Disc,
    config: &SpreaderConfig,
    dt: f32,
) -> Option<Release> {
    // First-order lag toward the disc's spin
    *angular_velocity += (disc.angular_velocity - *angular_velocity) * config.friction_rate * dt;
    *angle += *angular_velocity * dt;
    *radius = (*radius + config.radial_drift * dt).min(disc.radius - config.rim_margin);

    // Nearest blade, in the disc's rotating frame
    let spacing = disc.blade_spacing();
    let relative = wrap_angle(*angle - disc.angle);
    let blade_relative = (relative / spacing).round() * spacing;
    let blade_distance = wrap_angle(relative - blade_relative).abs();
    let slip = (disc.angular_velocity - *angular_velocity).abs();

    let caught = blade_distance <= config.blade_tolerance
        && slip >= config.slip_threshold
        && *radius > config.min_radius;
    let at_rim = *radius >= config.release_fraction * disc.radius;

    if caught || at_rim {
        Some(Release {
            blade_angle: disc.angle + blade_relative,
            radius: *radius,
        })
    } else {
        None
    }
}

/// World position of an on-disc particle
pub fn carry_position(radius: f32, angle: f32, disc: &Disc, config: &SpreaderConfig) -> Vec3 {
    Vec3::new(
        disc.center_x + radius * angle.cos(),
        config.disc_height,
        disc.center_z + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::DiscSide;

    fn setup() -> (SpreaderConfig, Disc) {
        let config = SpreaderConfig::default();
        let disc = Disc::new(DiscSide::Left, &config);
        (config, disc)
    }

    #[test]
    fn wrap_angle_ranges() {
        assert!((wrap_angle(0.0)).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-TAU - 0.5) + 0.5).abs() < 1e-5);
        assert!((wrap_angle(PI + 0.1) + PI - 0.1).abs() < 1e-5);
    }

    #[test]
    fn begin_carry_clamps_radius_and_slips() {
        let (config, disc) = setup();

        // Particle essentially at the disc center: radius floored
        let at_center = Vec3::new(disc.center_x, config.disc_height, 0.0);
        let (r, _, w) = begin_carry(at_center, &disc, &config);
        assert!((r - config.min_radius).abs() < 1e-6);
        assert!((w - config.slip_fraction * disc.angular_velocity).abs() < 1e-4);

        // Particle outside the rim: radius clamped below it
        let outside = Vec3::new(disc.center_x + 2.0, config.disc_height, 0.0);
        let (r, angle, _) = begin_carry(outside, &disc, &config);
        assert!((r - (disc.radius - config.rim_margin)).abs() < 1e-6);
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn radius_never_exceeds_rim_margin() {
        let (config, mut disc) = setup();
        let spawn = Vec3::new(disc.center_x + 0.3, config.disc_height, 0.1);
        let (mut r, mut a, mut w) = begin_carry(spawn, &disc, &config);

        let dt = 1.0 / 60.0;
        for _ in 0..2000 {
            disc.advance(dt, 0.0);
            update_carry(&mut r, &mut a, &mut w, &disc, &config, dt);
            assert!(r <= disc.radius - config.rim_margin + 1e-6);
            assert!(r >= config.min_radius);
        }
    }

    #[test]
    fn slip_relaxes_toward_disc_spin() {
        let (config, mut disc) = setup();
        let spawn = Vec3::new(disc.center_x + 0.2, config.disc_height, 0.0);
        let (mut r, mut a, mut w) = begin_carry(spawn, &disc, &config);

        let initial_slip = (disc.angular_velocity - w).abs();
        let dt = 1.0 / 240.0;
        for _ in 0..120 {
            disc.advance(dt, 0.0);
            update_carry(&mut r, &mut a, &mut w, &disc, &config, dt);
        }
        let final_slip = (disc.angular_velocity - w).abs();
        assert!(final_slip < initial_slip);
        // Half a second at friction_rate 6.0: slip should have decayed hard
        assert!(final_slip < initial_slip * 0.1);
    }

    #[test]
    fn particle_eventually_releases() {
        let (config, mut disc) = setup();
        let spawn = Vec3::new(disc.center_x + 0.2, config.disc_height, 0.0);
        let (mut r, mut a, mut w) = begin_carry(spawn, &disc, &config);

        let dt = 1.0 / 60.0;
        let mut released = None;
        for _ in 0..600 {
            disc.advance(dt, 0.0);
            if let Some(rel) = update_carry(&mut r, &mut a, &mut w, &disc, &config, dt) {
                released = Some(rel);
                break;
            }
        }
        let rel = released.expect("carry never released within ten seconds");
        assert!(rel.radius >= config.min_radius);
        assert!(rel.radius <= disc.radius - config.rim_margin + 1e-6);
    }

    #[test]
    fn rim_release_without_blade_catch() {
        // Kill the blade path (impossible slip threshold); the particle must
        // still release by drifting out to the release radius
        let (mut config, mut disc) = setup();
        config.slip_threshold = f32::MAX;

        let spawn = Vec3::new(disc.center_x + 0.1, config.disc_height, 0.0);
        let (mut r, mut a, mut w) = begin_carry(spawn, &disc, &config);

        let dt = 1.0 / 60.0;
        let mut released = None;
        for _ in 0..600 {
            disc.advance(dt, 0.0);
            if let Some(rel) = update_carry(&mut r, &mut a, &mut w, &disc, &config, dt) {
                released = Some(rel);
                break;
            }
        }
        let rel = released.expect("no rim release");
        assert!(rel.radius >= config.release_fraction * disc.radius - 1e-5);
    }
}
