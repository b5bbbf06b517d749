//! Vertex type for outline geometry

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position (CSS pixels) and straight-alpha RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Parse `#RGB` or `#RRGGBB` into RGBA with the given alpha
pub fn parse_hex_color(hex: &str, alpha: f32) -> Option<[f32; 4]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);

    let (r, g, b) = match digits.len() {
        6 => (
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ),
        3 => {
            let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
            (expand(0)?, expand(1)?, expand(2)?)
        }
        _ => return None,
    };
    Some([r, g, b, alpha])
}

/// Fallback outline color (slate)
pub const OUTLINE_FALLBACK: [f32; 4] = [0.39, 0.45, 0.55, 0.5];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        let c = parse_hex_color("#3B82F6", 1.0).unwrap();
        assert!((c[0] - 59.0 / 255.0).abs() < 1e-6);
        assert!((c[1] - 130.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 246.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse_hex_color("#fff", 0.5), Some([1.0, 1.0, 1.0, 0.5]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_hex_color("#12345", 1.0), None);
        assert_eq!(parse_hex_color("#zzzzzz", 1.0), None);
        assert_eq!(parse_hex_color("#éa", 1.0), None);
    }

    #[test]
    fn test_vertex_is_pod() {
        let verts = [Vertex::new(1.0, 2.0, [0.0; 4])];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), std::mem::size_of::<Vertex>());
    }
}
