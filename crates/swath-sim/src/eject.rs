//! Ejection velocity synthesis at blade release

use crate::carry::Release;
use crate::config::SpreaderConfig;
use crate::disc::Disc;
use crate::rand::SimRng;
use swath_core::Vec3;

const MIN_HORIZONTAL_SPEED: f32 = 1e-6;

/// Synthesize the launch velocity for a particle releasing from a disc.
///
/// The horizontal direction blends the blade-angle tangential and radial
/// unit vectors by the configured blade pitch, gets an outward x bias per
/// disc side, and is then clamped into the rear cone. The vertical
/// component comes from the throw-up angle plus jitter.
pub fn launch_velocity(
    disc: &Disc,
    release: &Release,
    config: &SpreaderConfig,
    rng: &mut SimRng,
) -> Vec3 {
    let theta = release.blade_angle + rng.normal() * config.blade_jitter;
    let radius = release.radius.max(config.min_radius);

    let (sin_t, cos_t) = theta.sin_cos();
    let radial = Vec3::new(cos_t, 0.0, sin_t);
    // Tangential direction flips with spin direction
    let spin = if disc.angular_velocity >= 0.0 { 1.0 } else { -1.0 };
    let tangential = Vec3::new(-sin_t * spin, 0.0, cos_t * spin);

    let rim_speed = disc.angular_velocity.abs() * radius;
    let kick = (rim_speed + rng.normal() * config.kick_std_fraction * rim_speed)
        .max(config.kick_floor_fraction * rim_speed);

    let blend = tangential * config.blade_pitch.cos() + radial * config.blade_pitch.sin();
    let len = blend.horizontal_length().max(MIN_HORIZONTAL_SPEED);
    let mut velocity = blend * (kick / len);

    // Diverging twin-fan: each disc biases further to its own side
    velocity.x += disc.side.sign() * config.outward_bias * kick;

    velocity = clamp_to_rear_cone(velocity, config.rear_cone_half_angle);

    velocity.y = (kick * config.throw_up_angle.sin() + rng.normal() * config.vertical_jitter)
        .max(0.0);
    velocity
}

/// Clamp the horizontal direction of `v` so its angle from the machine's
/// rear axis (-z) does not exceed `half_angle`. Preserves horizontal speed
/// and the y component.
pub fn clamp_to_rear_cone(v: Vec3, half_angle: f32) -> Vec3 {
    let speed = v.horizontal_length();
    if speed <= MIN_HORIZONTAL_SPEED {
        return v;
    }
    let angle = v.x.atan2(-v.z);
    let clamped = angle.clamp(-half_angle, half_angle);
    if clamped == angle {
        return v;
    }
    Vec3::new(clamped.sin() * speed, v.y, -clamped.cos() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::DiscSide;

    fn release(config: &SpreaderConfig) -> Release {
        Release {
            blade_angle: 0.7,
            radius: config.release_fraction * config.disc_radius,
        }
    }

    #[test]
    fn clamp_passes_rear_directions_through() {
        let rear = Vec3::new(0.5, 2.0, -4.0);
        let clamped = clamp_to_rear_cone(rear, 1.0);
        assert_eq!(rear, clamped);
    }

    #[test]
    fn clamp_pulls_forward_throws_back() {
        let forward = Vec3::new(0.1, 1.0, 3.0);
        let clamped = clamp_to_rear_cone(forward, 1.0);
        let angle = clamped.x.atan2(-clamped.z);
        assert!(angle.abs() <= 1.0 + 1e-5);
        // Horizontal speed and vertical component preserved
        assert!((clamped.horizontal_length() - forward.horizontal_length()).abs() < 1e-4);
        assert_eq!(clamped.y, forward.y);
        // Sideways sign preserved
        assert!(clamped.x > 0.0);
    }

    #[test]
    fn every_ejection_lands_in_the_rear_cone() {
        let config = SpreaderConfig::default();
        for seed in 1..200u32 {
            let mut rng = SimRng::new(seed);
            for side in [DiscSide::Left, DiscSide::Right] {
                let mut disc = Disc::new(side, &config);
                disc.angle = rng.range(0.0, std::f32::consts::TAU);
                let rel = Release {
                    blade_angle: disc.angle,
                    radius: rng.range(config.min_radius, config.disc_radius),
                };
                let v = launch_velocity(&disc, &rel, &config, &mut rng);
                let angle = v.x.atan2(-v.z);
                assert!(
                    angle.abs() <= config.rear_cone_half_angle + 1e-4,
                    "seed {seed}: angle {angle} outside cone"
                );
            }
        }
    }

    #[test]
    fn kick_magnitude_is_floored() {
        let config = SpreaderConfig::default();
        let rel = release(&config);
        let disc = Disc::new(DiscSide::Right, &config);
        let rim_speed = disc.angular_velocity.abs() * rel.radius;

        for seed in 1..100u32 {
            let mut rng = SimRng::new(seed);
            let v = launch_velocity(&disc, &rel, &config, &mut rng);
            // The x bias can cancel at most outward_bias of the kick
            let floor = (1.0 - config.outward_bias) * config.kick_floor_fraction * rim_speed;
            assert!(v.horizontal_length() >= floor - 1e-3);
            assert!(v.y >= 0.0);
        }
    }

    #[test]
    fn zero_spin_produces_no_velocity_blowup() {
        // rpm 0 means rim speed 0; the result must be finite and tiny
        let config = SpreaderConfig {
            disc_speed_rpm: 0.0,
            ..Default::default()
        };
        let disc = Disc::new(DiscSide::Left, &config);
        let rel = release(&config);
        let mut rng = SimRng::new(5);
        let v = launch_velocity(&disc, &rel, &config, &mut rng);
        assert!(v.length().is_finite());
        assert!(v.horizontal_length() < 1e-3);
    }
}
