//! Position synchronization
//!
//! Labels are rendered by someone else; this module only moves them. Each
//! label is centered on its body by offsetting the translation by half the
//! label's rendered size.

use glam::Vec2;

use crate::sim::PhysicsWorld;

/// The externally rendered label elements, addressed by bubble index
pub trait LabelSink {
    /// Rendered size of label `index`, or `None` if it is not mounted yet
    fn label_size(&self, index: usize) -> Option<Vec2>;
    /// Set label `index`'s translation (top-left corner, in container pixels)
    fn translate(&mut self, index: usize, offset: Vec2);
}

/// Translation that centers a label of `size` on `center`
#[inline]
pub fn label_offset(center: Vec2, size: Vec2) -> Vec2 {
    center - size * 0.5
}

/// Mirror every body onto its label; returns how many labels were moved
///
/// Missing labels are skipped for this frame only.
pub fn synchronize(world: &PhysicsWorld, labels: &mut dyn LabelSink) -> usize {
    let mut moved = 0;
    for bubble in world.bubbles() {
        if let Some(size) = labels.label_size(bubble.index) {
            labels.translate(bubble.index, label_offset(bubble.pos, size));
            moved += 1;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::platform::headless::FixedLabels;
    use crate::sim::layout;

    fn assert_offset(labels: &FixedLabels, index: usize, expected: Vec2) {
        let got = labels.offset(index).expect("label moved");
        assert!((got - expected).length() < 1e-3, "{got} != {expected}");
    }

    #[test]
    fn test_label_offset_centers() {
        let offset = label_offset(Vec2::new(152.0, 75.0), Vec2::new(120.0, 40.0));
        assert_eq!(offset, Vec2::new(92.0, 55.0));
    }

    #[test]
    fn test_synchronize_skips_missing_labels() {
        let config = EngineConfig::default();
        let plan = layout::plan(400.0, 300.0, 3).unwrap();
        let world = PhysicsWorld::new(plan.size, &config, &plan);

        let mut labels = FixedLabels::new(3, Vec2::new(100.0, 50.0));
        labels.set_mounted(1, false);

        assert_eq!(synchronize(&world, &mut labels), 2);
        assert_offset(&labels, 0, Vec2::new(102.0, 50.0));
        assert_eq!(labels.offset(1), None);
        assert_offset(&labels, 2, Vec2::new(102.0, 200.0));

        // Label mounts later and is picked up on the next frame
        labels.set_mounted(1, true);
        assert_eq!(synchronize(&world, &mut labels), 3);
        assert_offset(&labels, 1, Vec2::new(198.0, 125.0));
    }

    #[test]
    fn test_destroyed_world_moves_nothing() {
        let config = EngineConfig::default();
        let plan = layout::plan(400.0, 300.0, 3).unwrap();
        let mut world = PhysicsWorld::new(plan.size, &config, &plan);
        world.destroy();

        let mut labels = FixedLabels::new(3, Vec2::new(100.0, 50.0));
        assert_eq!(synchronize(&world, &mut labels), 0);
        assert_eq!(labels.translations(), 0);
    }
}
