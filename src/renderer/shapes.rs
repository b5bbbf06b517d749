//! Outline geometry for the debug overlay

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{OUTLINE_FALLBACK, Vertex, parse_hex_color};
use crate::sim::PhysicsWorld;

/// Segments per outline ring
const RING_SEGMENTS: u32 = 48;
/// Outline stroke width (pixels)
const OUTLINE_WIDTH: f32 = 2.0;
/// Outline opacity
const OUTLINE_ALPHA: f32 = 0.35;

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let point = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = point(inner_radius, theta1);
        let outer1 = point(outer_radius, theta1);
        let inner2 = point(inner_radius, theta2);
        let outer2 = point(outer_radius, theta2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// One tinted ring per bubble, hugging its collision radius
pub fn bubble_outlines(world: &PhysicsWorld) -> Vec<Vertex> {
    world
        .bubbles()
        .iter()
        .flat_map(|b| {
            let color = parse_hex_color(&b.color, OUTLINE_ALPHA).unwrap_or(OUTLINE_FALLBACK);
            ring(b.pos, b.radius - OUTLINE_WIDTH, b.radius, color, RING_SEGMENTS)
        })
        .collect()
}
