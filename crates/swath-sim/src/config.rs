//! Spreader configuration (parsed from TOML) and construction-time validation

use std::f32::consts::{FRAC_PI_2, TAU};
use swath_core::{Result, SwathError};

/// What happens to a particle on ground contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundPolicy {
    /// Keep the particle as a terminal Landed record (deposition pattern display).
    /// With a wrap-around pool, old Landed particles are silently overwritten
    /// once total emission exceeds capacity — size `capacity` accordingly.
    Retain,
    /// Free the slot immediately for reuse
    Recycle,
}

/// Tuning constants for the whole simulation.
///
/// Angles are radians, lengths meters, speeds meters-per-second unless noted.
#[derive(Debug, Clone)]
pub struct SpreaderConfig {
    // Pool
    pub capacity: usize,
    pub ground_policy: GroundPolicy,

    // Machine
    pub forward_speed: f32,

    // Discs
    pub disc_radius: f32,
    /// Disc center offset from the machine centerline (left at -x, right at +x)
    pub disc_offset_x: f32,
    /// Height of the disc plane above ground
    pub disc_height: f32,
    pub blade_count: u32,
    /// Disc rotational speed in revolutions per minute
    pub disc_speed_rpm: f32,

    // Feed
    /// Target emission rate in particles per second (both orifices combined)
    pub emission_rate: f32,
    /// Orifice center offset from the machine centerline (inner side of each disc)
    pub orifice_offset_x: f32,
    pub orifice_width: f32,
    pub orifice_length: f32,
    pub feed_height: f32,
    /// Std dev of horizontal spawn velocity jitter
    pub spawn_jitter: f32,
    /// Initial downward speed of a freshly spawned particle
    pub spawn_drop_speed: f32,

    // Free flight
    pub gravity: f32,
    /// Isotropic drag rate (per second, exponential decay)
    pub drag: f32,
    /// Maximum integration step; larger external dt values are clamped
    pub max_step: f32,

    // Disc carry
    /// Height band around the disc plane within which a falling particle
    /// can be captured
    pub pickup_window: f32,
    /// Fraction of the disc's angular velocity a particle starts with on capture
    pub slip_fraction: f32,
    /// First-order lag rate coupling particle spin to disc spin (per second)
    pub friction_rate: f32,
    /// Outward radial drift rate while riding a disc
    pub radial_drift: f32,
    /// Radius floor, keeps polar math away from the disc center
    pub min_radius: f32,
    /// Radius is clamped below `disc_radius - rim_margin` while on a disc
    pub rim_margin: f32,
    /// Angular distance to a blade within which the blade can catch the particle
    pub blade_tolerance: f32,
    /// Minimum slip for a blade catch (rad/s)
    pub slip_threshold: f32,
    /// Fraction of disc radius at which the particle releases regardless of blades
    pub release_fraction: f32,

    // Ejection
    /// Blade pitch: 0 = pure tangential throw, pi/2 = pure radial
    pub blade_pitch: f32,
    /// Kick magnitude std dev as a fraction of rim speed
    pub kick_std_fraction: f32,
    /// Kick magnitude floor as a fraction of rim speed
    pub kick_floor_fraction: f32,
    /// Std dev of the random jitter added to the release blade angle
    pub blade_jitter: f32,
    /// Outward x bias per disc side, as a fraction of the kick magnitude
    pub outward_bias: f32,
    /// Half-angle of the rear cone the horizontal throw direction is
    /// clamped to. Capped at pi/2: anything wider would admit throws past
    /// the beam axis into the direction of travel, and the cone would no
    /// longer be a rear cone.
    pub rear_cone_half_angle: f32,
    /// Upward throw angle applied to the kick magnitude
    pub throw_up_angle: f32,
    /// Std dev of the random vertical velocity added at release
    pub vertical_jitter: f32,
}

impl Default for SpreaderConfig {
    fn default() -> Self {
        Self {
            capacity: 50_000,
            ground_policy: GroundPolicy::Recycle,
            forward_speed: 3.5,
            disc_radius: 0.95,
            disc_offset_x: 1.35,
            disc_height: 0.6,
            blade_count: 4,
            disc_speed_rpm: 540.0,
            emission_rate: 1000.0,
            orifice_offset_x: 0.6,
            orifice_width: 0.3,
            orifice_length: 0.25,
            feed_height: 1.15,
            spawn_jitter: 0.12,
            spawn_drop_speed: 0.3,
            gravity: -9.81,
            drag: 1.1,
            max_step: 0.02,
            pickup_window: 0.06,
            slip_fraction: 0.25,
            friction_rate: 6.0,
            radial_drift: 0.55,
            min_radius: 0.05,
            rim_margin: 0.02,
            blade_tolerance: 0.12,
            slip_threshold: 2.0,
            release_fraction: 0.86,
            blade_pitch: 10.0f32.to_radians(),
            kick_std_fraction: 0.25,
            kick_floor_fraction: 0.3,
            blade_jitter: 0.04,
            outward_bias: 0.18,
            rear_cone_half_angle: 1.0,
            throw_up_angle: 8.0f32.to_radians(),
            vertical_jitter: 0.35,
        }
    }
}

impl SpreaderConfig {
    /// Disc angular speed magnitude in rad/s
    pub fn disc_omega(&self) -> f32 {
        self.disc_speed_rpm * TAU / 60.0
    }

    /// Fail fast on precondition violations. Called by `SpreaderSim::new`.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SwathError::ConfigError(
                "capacity must be at least 1".into(),
            ));
        }
        if self.disc_radius <= 0.0 {
            return Err(SwathError::ConfigError(
                "disc_radius must be positive".into(),
            ));
        }
        if self.blade_count == 0 {
            return Err(SwathError::ConfigError(
                "blade_count must be at least 1".into(),
            ));
        }
        if self.rim_margin <= 0.0 || self.rim_margin >= self.disc_radius {
            return Err(SwathError::ValueOutOfRange {
                field: "rim_margin".into(),
                min: 0.0,
                max: self.disc_radius as f64,
                value: self.rim_margin as f64,
            });
        }
        if self.min_radius <= 0.0 || self.min_radius >= self.disc_radius - self.rim_margin {
            return Err(SwathError::ValueOutOfRange {
                field: "min_radius".into(),
                min: 0.0,
                max: (self.disc_radius - self.rim_margin) as f64,
                value: self.min_radius as f64,
            });
        }
        if self.release_fraction <= 0.0 || self.release_fraction > 1.0 {
            return Err(SwathError::ValueOutOfRange {
                field: "release_fraction".into(),
                min: 0.0,
                max: 1.0,
                value: self.release_fraction as f64,
            });
        }
        if self.rear_cone_half_angle <= 0.0 || self.rear_cone_half_angle > FRAC_PI_2 {
            return Err(SwathError::ValueOutOfRange {
                field: "rear_cone_half_angle".into(),
                min: 0.0,
                max: FRAC_PI_2 as f64,
                value: self.rear_cone_half_angle as f64,
            });
        }
        if self.max_step <= 0.0 {
            return Err(SwathError::ConfigError("max_step must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.slip_fraction) {
            return Err(SwathError::ValueOutOfRange {
                field: "slip_fraction".into(),
                min: 0.0,
                max: 1.0,
                value: self.slip_fraction as f64,
            });
        }
        if self.emission_rate < 0.0
            || self.forward_speed < 0.0
            || self.disc_speed_rpm < 0.0
            || self.drag < 0.0
        {
            return Err(SwathError::ConfigError(
                "rates and speeds must be non-negative".into(),
            ));
        }
        if self.orifice_width <= 0.0 || self.orifice_length <= 0.0 {
            return Err(SwathError::ConfigError(
                "orifice dimensions must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parse a SpreaderConfig from a TOML table, falling back to defaults
    /// for absent keys
    pub fn from_toml(table: &toml::value::Table) -> Self {
        let mut config = Self::default();

        if let Some(v) = table.get("capacity") {
            // Negative or absurd values keep the default
            if let Some(n) = v.as_integer().and_then(|i| usize::try_from(i).ok()) {
                config.capacity = n.min(1_000_000);
            }
        }
        if let Some(v) = table.get("ground_policy") {
            config.ground_policy = match v.as_str().unwrap_or("recycle") {
                "retain" => GroundPolicy::Retain,
                _ => GroundPolicy::Recycle,
            };
        }
        if let Some(v) = table.get("forward_speed") {
            config.forward_speed = toml_f32(v, config.forward_speed);
        }
        if let Some(v) = table.get("disc_radius") {
            config.disc_radius = toml_f32(v, config.disc_radius);
        }
        if let Some(v) = table.get("disc_offset_x") {
            config.disc_offset_x = toml_f32(v, config.disc_offset_x);
        }
        if let Some(v) = table.get("disc_height") {
            config.disc_height = toml_f32(v, config.disc_height);
        }
        if let Some(v) = table.get("blade_count") {
            if let Some(n) = v.as_integer().and_then(|i| u32::try_from(i).ok()) {
                config.blade_count = n;
            }
        }
        if let Some(v) = table.get("disc_speed_rpm") {
            config.disc_speed_rpm = toml_f32(v, config.disc_speed_rpm);
        }
        if let Some(v) = table.get("emission_rate") {
            config.emission_rate = toml_f32(v, config.emission_rate);
        }
        if let Some(v) = table.get("orifice_offset_x") {
            config.orifice_offset_x = toml_f32(v, config.orifice_offset_x);
        }
        if let Some(v) = table.get("orifice_width") {
            config.orifice_width = toml_f32(v, config.orifice_width);
        }
        if let Some(v) = table.get("orifice_length") {
            config.orifice_length = toml_f32(v, config.orifice_length);
        }
        if let Some(v) = table.get("feed_height") {
            config.feed_height = toml_f32(v, config.feed_height);
        }
        if let Some(v) = table.get("spawn_jitter") {
            config.spawn_jitter = toml_f32(v, config.spawn_jitter);
        }
        if let Some(v) = table.get("spawn_drop_speed") {
            config.spawn_drop_speed = toml_f32(v, config.spawn_drop_speed);
        }
        if let Some(v) = table.get("gravity") {
            config.gravity = toml_f32(v, config.gravity);
        }
        if let Some(v) = table.get("drag") {
            config.drag = toml_f32(v, config.drag);
        }
        if let Some(v) = table.get("max_step") {
            config.max_step = toml_f32(v, config.max_step);
        }
        if let Some(v) = table.get("pickup_window") {
            config.pickup_window = toml_f32(v, config.pickup_window);
        }
        if let Some(v) = table.get("slip_fraction") {
            config.slip_fraction = toml_f32(v, config.slip_fraction);
        }
        if let Some(v) = table.get("friction_rate") {
            config.friction_rate = toml_f32(v, config.friction_rate);
        }
        if let Some(v) = table.get("radial_drift") {
            config.radial_drift = toml_f32(v, config.radial_drift);
        }
        if let Some(v) = table.get("min_radius") {
            config.min_radius = toml_f32(v, config.min_radius);
        }
        if let Some(v) = table.get("rim_margin") {
            config.rim_margin = toml_f32(v, config.rim_margin);
        }
        if let Some(v) = table.get("blade_tolerance") {
            config.blade_tolerance = toml_f32(v, config.blade_tolerance);
        }
        if let Some(v) = table.get("slip_threshold") {
            config.slip_threshold = toml_f32(v, config.slip_threshold);
        }
        if let Some(v) = table.get("release_fraction") {
            config.release_fraction = toml_f32(v, config.release_fraction);
        }
        if let Some(v) = table.get("blade_pitch_deg") {
            config.blade_pitch = toml_f32(v, config.blade_pitch.to_degrees()).to_radians();
        }
        if let Some(v) = table.get("kick_std_fraction") {
            config.kick_std_fraction = toml_f32(v, config.kick_std_fraction);
        }
        if let Some(v) = table.get("kick_floor_fraction") {
            config.kick_floor_fraction = toml_f32(v, config.kick_floor_fraction);
        }
        if let Some(v) = table.get("blade_jitter") {
            config.blade_jitter = toml_f32(v, config.blade_jitter);
        }
        if let Some(v) = table.get("outward_bias") {
            config.outward_bias = toml_f32(v, config.outward_bias);
        }
        if let Some(v) = table.get("rear_cone_half_angle_deg") {
            config.rear_cone_half_angle =
                toml_f32(v, config.rear_cone_half_angle.to_degrees()).to_radians();
        }
        if let Some(v) = table.get("throw_up_angle_deg") {
            config.throw_up_angle = toml_f32(v, config.throw_up_angle.to_degrees()).to_radians();
        }
        if let Some(v) = table.get("vertical_jitter") {
            config.vertical_jitter = toml_f32(v, config.vertical_jitter);
        }

        config
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}
