//! # Obstacle Placement
//!
//! Every episode the obstacles are scattered over a fixed pool of candidate
//! slots. Each slot index exists on both sides of the track, but an index can
//! host at most one obstacle per placement pass, whichever side it lands on.
//!
//! Uniqueness comes from the [`SlotAllocator`]: it shuffles the slot indices
//! once per pass and hands them out in order, so a pass always terminates and
//! never repeats an index. Whether the pool is large enough is checked when the
//! placer is built.

use crate::error::TrackError;
use crate::registry::EntityRegistry;
use layout::{Side, SlotTable};
use physics::Transform;

/// Hands out distinct slot indices for one placement pass
#[derive(Clone, Debug)]
pub struct SlotAllocator {
    order: Vec<usize>,
    taken: Vec<bool>,
    cursor: usize,
}

impl SlotAllocator {
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            order: (0..slot_count).collect(),
            taken: vec![false; slot_count],
            cursor: 0,
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.order.len()
    }

    /// Release every slot and reshuffle the hand-out order.
    pub fn clear(&mut self, rng: &fastrand::Rng) {
        rng.shuffle(&mut self.order);
        self.taken.fill(false);
        self.cursor = 0;
    }

    /// Next free slot index, or `None` once the pool is exhausted.
    pub fn take(&mut self) -> Option<usize> {
        let index = *self.order.get(self.cursor)?;
        self.cursor += 1;
        self.taken[index] = true;
        Some(index)
    }

    #[must_use]
    pub fn is_taken(&self, index: usize) -> bool {
        self.taken.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }
}

/// One obstacle's assignment from a placement pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub side: Side,
    pub slot: usize,
    pub transform: Transform,
    pub handler: Transform,
}

/// Assigns obstacles to slots of a [`SlotTable`]
#[derive(Clone, Debug)]
pub struct ObstaclePlacer {
    slots: SlotTable,
    allocator: SlotAllocator,
    pub scale: f32,
    pub handler_offset: f32,
}

impl ObstaclePlacer {
    /// Build a placer for `obstacle_count` obstacles.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::MismatchedSlotTable`] if the two sides of the
    /// table differ in length and [`TrackError::TooManyObstacles`] if there are
    /// more obstacles than slot indices.
    pub fn new(
        slots: SlotTable,
        obstacle_count: usize,
        scale: f32,
        handler_offset: f32,
    ) -> Result<Self, TrackError> {
        if slots.left.len() != slots.right.len() {
            return Err(TrackError::MismatchedSlotTable {
                right: slots.right.len(),
                left: slots.left.len(),
            });
        }
        if obstacle_count > slots.len() {
            return Err(TrackError::TooManyObstacles {
                obstacles: obstacle_count,
                slots: slots.len(),
            });
        }
        let allocator = SlotAllocator::new(slots.len());
        Ok(Self {
            slots,
            allocator,
            scale,
            handler_offset,
        })
    }

    #[must_use]
    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    /// Free every slot before a new pass.
    pub fn remove_positions(&mut self, rng: &fastrand::Rng) {
        self.allocator.clear(rng);
    }

    /// Resolve a slot into the obstacle and handler transforms.
    ///
    /// The handler sits `handler_offset` along the obstacle's forward axis on
    /// the right side and against it on the left side.
    #[must_use]
    pub fn resolve(&self, side: Side, slot: usize) -> Option<Placement> {
        let base = self.slots.get(side, slot)?;
        let handler = Transform::new(
            base.position + side.handler_sign() * self.handler_offset * base.forward(),
            base.rotation,
        );
        Some(Placement {
            side,
            slot,
            transform: base.with_uniform_scale(self.scale),
            handler,
        })
    }

    /// Place every obstacle of `registry` on a distinct slot index.
    ///
    /// Sides are drawn independently per obstacle. Call
    /// [`remove_positions`](Self::remove_positions) first to start a fresh pass.
    pub fn place(&mut self, registry: &mut EntityRegistry, rng: &fastrand::Rng) {
        for obstacle in registry.obstacles_mut() {
            let side = if rng.bool() { Side::Right } else { Side::Left };
            let Some(slot) = self.allocator.take() else {
                tracing::error!("slot pool exhausted; obstacle {} left unplaced", obstacle.id.0);
                obstacle.slot = None;
                continue;
            };
            let Some(placement) = self.resolve(side, slot) else {
                tracing::error!(
                    "slot {slot} has no {side:?} pose; obstacle {} left unplaced",
                    obstacle.id.0
                );
                obstacle.slot = None;
                continue;
            };
            obstacle.transform = placement.transform;
            obstacle.handler = placement.handler;
            obstacle.slot = Some((side, slot));
        }
        tracing::debug!(
            "placed {} obstacles, {} slots left",
            registry.obstacles().len(),
            self.allocator.remaining()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::Pose;
    use physics::Vec3;

    fn table(n: usize) -> SlotTable {
        #[allow(clippy::cast_precision_loss)]
        let pose = |i: usize, z: f32, yaw: f32| Pose {
            position: [i as f32 * 10.0, 0.0, z],
            euler: [0.0, yaw, 0.0],
        };
        SlotTable {
            right: (0..n).map(|i| pose(i, -3.0, 0.0)).collect(),
            left: (0..n).map(|i| pose(i, 3.0, 180.0)).collect(),
        }
    }

    #[test]
    fn allocator_hands_out_each_index_once() {
        let rng = fastrand::Rng::with_seed(1);
        let mut a = SlotAllocator::new(5);
        a.clear(&rng);
        let mut seen: Vec<usize> = std::iter::from_fn(|| a.take()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(a.take().is_none());
        assert!((0..5).all(|i| a.is_taken(i)));

        a.clear(&rng);
        assert_eq!(a.remaining(), 5);
        assert!(!a.is_taken(0));
    }

    #[test]
    fn too_many_obstacles_fail_at_setup() {
        let err = ObstaclePlacer::new(table(3), 4, 1.0, 3.5).unwrap_err();
        assert!(matches!(err, TrackError::TooManyObstacles { obstacles: 4, slots: 3 }));
    }

    #[test]
    fn mismatched_sides_fail_at_setup() {
        let mut slots = table(3);
        slots.left.pop();
        assert!(matches!(
            ObstaclePlacer::new(slots, 1, 1.0, 3.5),
            Err(TrackError::MismatchedSlotTable { right: 3, left: 2 })
        ));
    }

    #[test]
    fn handler_offset_flips_with_side() {
        let placer = ObstaclePlacer::new(table(2), 1, 0.8153, 3.5).unwrap();
        let right = placer.resolve(Side::Right, 1).unwrap();
        assert!(right.handler.position.abs_diff_eq(Vec3::new(10.0, 0.0, 0.5), 1e-5));
        assert_eq!(right.transform.scale, Vec3::splat(0.8153));

        // Left slots face -Z, so the negated offset lands at +Z again
        let left = placer.resolve(Side::Left, 1).unwrap();
        assert!(left.handler.position.abs_diff_eq(Vec3::new(10.0, 0.0, 6.5), 1e-5));
        assert_eq!(left.handler.scale, Vec3::ONE);
    }

    #[test]
    fn place_writes_transforms_into_registry() {
        let rng = fastrand::Rng::with_seed(9);
        let mut placer = ObstaclePlacer::new(table(4), 4, 1.0, 3.5).unwrap();
        let mut registry = EntityRegistry::new(Vec::<Transform>::new(), 4);
        placer.remove_positions(&rng);
        placer.place(&mut registry, &rng);
        for obstacle in registry.obstacles() {
            let (side, slot) = obstacle.slot.unwrap();
            let expected = placer.resolve(side, slot).unwrap();
            assert_eq!(obstacle.transform, expected.transform);
            assert_eq!(obstacle.handler, expected.handler);
        }
    }

    #[test]
    fn obstacle_without_a_pose_loses_its_stale_slot() {
        let rng = fastrand::Rng::with_seed(5);
        let mut placer = ObstaclePlacer::new(table(3), 3, 1.0, 3.5).unwrap();
        let mut registry = EntityRegistry::new(Vec::<Transform>::new(), 3);
        placer.remove_positions(&rng);
        placer.place(&mut registry, &rng);
        assert!(registry.obstacles().iter().all(|o| o.slot.is_some()));

        placer.slots.right.clear();
        placer.slots.left.clear();
        placer.remove_positions(&rng);
        placer.place(&mut registry, &rng);
        assert!(registry.obstacles().iter().all(|o| o.slot.is_none()));
    }
}
