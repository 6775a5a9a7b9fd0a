//! Placement rules that turn an element count into scene positions.
//!
//! Layout is never incremental: every mutation or configuration change
//! recomputes the full set of positions from scratch.

use std::f32::consts::TAU;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::StructureKind;

/// Geometric parameters shared by every layout rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Edge length of a single element cube.
    pub element_size: f32,
    /// Distance between neighbouring element centres on linear layouts.
    pub spacing: f32,
    /// Radius of the circle used by [`StructureKind::Ring`].
    pub ring_radius: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            element_size: 1.0,
            spacing: 3.0,
            ring_radius: 5.0,
        }
    }
}

/// Computes the position of each of the `count` elements of a structure.
///
/// Linear layouts are centred on the origin; queues and arrays run along the
/// x axis, stacks grow upwards along y. Rings place elements evenly on a
/// circle in the xy plane, starting on the positive x axis.
pub fn compute_positions(
    kind: StructureKind,
    count: usize,
    params: &LayoutParams,
) -> Vec<Vector3<f32>> {
    if count == 0 {
        return Vec::new();
    }

    let span = (count - 1) as f32 * params.spacing;
    let start = -span / 2.0;

    (0..count)
        .map(|i| {
            let offset = start + i as f32 * params.spacing;
            match kind {
                StructureKind::Queue | StructureKind::Array => Vector3::new(offset, 0.0, 0.0),
                StructureKind::Stack => Vector3::new(0.0, offset, 0.0),
                StructureKind::Ring => {
                    let angle = i as f32 / count as f32 * TAU;
                    Vector3::new(
                        params.ring_radius * angle.cos(),
                        params.ring_radius * angle.sin(),
                        0.0,
                    )
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;
    use proptest::prelude::*;

    use super::*;

    const KINDS: [StructureKind; 4] = [
        StructureKind::Queue,
        StructureKind::Stack,
        StructureKind::Array,
        StructureKind::Ring,
    ];

    fn params(spacing: f32) -> LayoutParams {
        LayoutParams {
            spacing,
            ..LayoutParams::default()
        }
    }

    #[test]
    fn empty_structure_has_no_positions() {
        for kind in KINDS {
            assert!(compute_positions(kind, 0, &LayoutParams::default()).is_empty());
        }
    }

    #[test]
    fn queue_is_centred_on_x_axis() {
        let positions = compute_positions(StructureKind::Queue, 3, &params(3.0));
        assert_eq!(
            positions,
            vec![
                Vector3::new(-3.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(3.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn stack_grows_upwards() {
        let positions = compute_positions(StructureKind::Stack, 2, &params(4.0));
        assert_eq!(
            positions,
            vec![Vector3::new(0.0, -2.0, 0.0), Vector3::new(0.0, 2.0, 0.0)]
        );
    }

    #[test]
    fn single_ring_element_sits_on_positive_x() {
        let positions = compute_positions(StructureKind::Ring, 1, &LayoutParams::default());
        assert_eq!(positions, vec![Vector3::new(5.0, 0.0, 0.0)]);
    }

    proptest! {
        #[test]
        fn returns_one_position_per_element(count in 0usize..64, spacing in 0.1f32..10.0) {
            for kind in KINDS {
                prop_assert_eq!(compute_positions(kind, count, &params(spacing)).len(), count);
            }
        }

        #[test]
        fn linear_layouts_are_symmetric(count in 1usize..64, spacing in 0.1f32..10.0) {
            for kind in [StructureKind::Queue, StructureKind::Array] {
                let positions = compute_positions(kind, count, &params(spacing));
                for (front, back) in positions.iter().zip(positions.iter().rev()) {
                    prop_assert_eq!(front.y, 0.0);
                    prop_assert_eq!(front.z, 0.0);
                    prop_assert!((front.x + back.x).abs() < 1e-3);
                }
            }
        }

        #[test]
        fn ring_positions_share_a_radius(count in 1usize..64, radius in 0.5f32..20.0) {
            let params = LayoutParams { ring_radius: radius, ..LayoutParams::default() };
            for position in compute_positions(StructureKind::Ring, count, &params) {
                prop_assert!((position.magnitude() - radius).abs() < 1e-3);
                prop_assert_eq!(position.z, 0.0);
            }
        }
    }
}
