//! Free-flight integration: gravity plus isotropic drag

use swath_core::Vec3;

/// Advance one particle through one step of free flight.
///
/// Drag is applied as an exponential decay so the trajectory does not
/// depend on how a given duration is subdivided into steps.
pub fn integrate(position: &mut Vec3, velocity: &mut Vec3, gravity: f32, drag: f32, dt: f32) {
    velocity.y += gravity * dt;
    if drag > 0.0 {
        let decay = (-drag * dt).exp();
        velocity.x *= decay;
        velocity.y *= decay;
        velocity.z *= decay;
    }
    *position = *position + *velocity * dt;
}
