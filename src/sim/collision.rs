//! Collision detection and response for circular bubbles
//!
//! Bubbles collide with each other and, optionally, with the container walls.
//! Static bodies have infinite mass: they push, but never move.

use glam::Vec2;

use super::body::Bubble;

/// A detected overlap
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the first body toward the second
    /// (for walls: pointing back into the container)
    pub normal: Vec2,
    /// Overlap depth
    pub penetration: f32,
}

/// Check overlap between two circles
pub fn circle_circle(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let dist_sq = delta.length_squared();
    let reach = a_radius + b_radius;

    if dist_sq >= reach * reach {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centers - pick an arbitrary but stable separation axis
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };

    Some(Contact {
        normal,
        penetration: reach - dist,
    })
}

/// Check a circle against the container walls
///
/// Returns the deepest wall overlap. An axis narrower than the circle's
/// diameter is ignored so walls never fight each other.
pub fn circle_wall(pos: Vec2, radius: f32, bounds: Vec2) -> Option<Contact> {
    let mut best: Option<Contact> = None;
    let mut consider = |normal: Vec2, penetration: f32| {
        if penetration > 0.0 && best.is_none_or(|c| penetration > c.penetration) {
            best = Some(Contact {
                normal,
                penetration,
            });
        }
    };

    if bounds.x >= radius * 2.0 {
        consider(Vec2::X, radius - pos.x);
        consider(Vec2::NEG_X, pos.x + radius - bounds.x);
    }
    if bounds.y >= radius * 2.0 {
        consider(Vec2::Y, radius - pos.y);
        consider(Vec2::NEG_Y, pos.y + radius - bounds.y);
    }

    best
}

/// Separate two overlapping bubbles and exchange impulses
///
/// Uses the lower restitution of the pair and Coulomb friction clamped by
/// the normal impulse.
pub fn resolve_pair(a: &mut Bubble, b: &mut Bubble, contact: Contact, restitution: f32, friction: f32) {
    let inv_a = a.inv_mass();
    let inv_b = b.inv_mass();
    let inv_total = inv_a + inv_b;
    if inv_total <= 0.0 {
        return; // Both static
    }

    let n = contact.normal;

    // Positional correction, split by inverse mass
    let correction = n * (contact.penetration / inv_total);
    a.pos -= correction * inv_a;
    b.pos += correction * inv_b;

    let rel_vel = b.vel - a.vel;
    let vel_along_normal = rel_vel.dot(n);
    if vel_along_normal > 0.0 {
        return; // Already separating
    }

    let j = -(1.0 + restitution) * vel_along_normal / inv_total;
    a.vel -= n * (j * inv_a);
    b.vel += n * (j * inv_b);

    // Friction along the contact tangent
    let tangent = (rel_vel - n * vel_along_normal).normalize_or_zero();
    if tangent == Vec2::ZERO {
        return;
    }
    let jt = (-rel_vel.dot(tangent) / inv_total).clamp(-friction * j, friction * j);
    a.vel -= tangent * (jt * inv_a);
    b.vel += tangent * (jt * inv_b);
}

/// Push a bubble back inside the container and reflect its velocity
pub fn resolve_wall(bubble: &mut Bubble, contact: Contact, restitution: f32) {
    if bubble.is_static {
        return;
    }
    let n = contact.normal;
    bubble.pos += n * contact.penetration;

    let vel_along_normal = bubble.vel.dot(n);
    if vel_along_normal < 0.0 {
        bubble.vel -= n * (vel_along_normal * (1.0 + restitution));
    }
}
