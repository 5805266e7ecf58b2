//! Transform hierarchy stored in an arena
//!
//! Every placed thing in a level (player, goals, collider geometry, dozers)
//! owns a [`Transform`] in a [`TransformArena`]. Parents are referenced by
//! [`TransformKey`] handles, so copying a level is a plain `clone()`: the
//! copied arena keeps the same keys, and every handle held elsewhere in the
//! level already points at the copy.

use rollpool_math::{Mat4x3, Quat, Vec3};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a transform in a [`TransformArena`]
    pub struct TransformKey;
}

/// Position, rotation and (per-axis) scale relative to an optional parent
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub parent: Option<TransformKey>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
        }
    }
}

impl Transform {
    /// Named root transform at a position
    pub fn named(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: TransformKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Local space to parent space
    pub fn make_local_to_parent(&self) -> Mat4x3 {
        Mat4x3::from_trs(self.position, self.rotation, self.scale)
    }

    /// Parent space to local space (a zero scale axis collapses to zero)
    pub fn make_parent_to_local(&self) -> Mat4x3 {
        Mat4x3::from_inverse_trs(self.position, self.rotation, self.scale)
    }
}

/// Arena owning every transform of a level
#[derive(Clone, Debug, Default)]
pub struct TransformArena {
    transforms: SlotMap<TransformKey, Transform>,
}

impl TransformArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transform: Transform) -> TransformKey {
        self.transforms.insert(transform)
    }

    /// Remove a transform
    ///
    /// Children of the removed transform are re-rooted (their parent becomes
    /// `None`) so no dangling parent handle survives.
    pub fn remove(&mut self, key: TransformKey) -> Option<Transform> {
        let removed = self.transforms.remove(key)?;
        for (_, t) in self.transforms.iter_mut() {
            if t.parent == Some(key) {
                t.parent = None;
            }
        }
        Some(removed)
    }

    #[inline]
    pub fn get(&self, key: TransformKey) -> Option<&Transform> {
        self.transforms.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: TransformKey) -> Option<&mut Transform> {
        self.transforms.get_mut(key)
    }

    pub fn contains(&self, key: TransformKey) -> bool {
        self.transforms.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransformKey, &Transform)> {
        self.transforms.iter()
    }

    /// Find the first transform with the given name
    pub fn find(&self, name: &str) -> Option<TransformKey> {
        self.transforms
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(k, _)| k)
    }

    /// Local space of `key` to world space
    ///
    /// Walks up the parent chain. A missing parent ends the walk, and the
    /// walk never visits more transforms than the arena holds, so a parent
    /// cycle cannot loop forever. Returns `None` if `key` itself is missing.
    pub fn make_local_to_world(&self, key: TransformKey) -> Option<Mat4x3> {
        let mut current = self.get(key)?;
        let mut m = current.make_local_to_parent();
        let mut steps = 0;
        while let Some(parent) = current.parent.and_then(|p| self.get(p)) {
            steps += 1;
            if steps > self.transforms.len() {
                log::warn!("Transform '{}' has a parent cycle", current.name);
                break;
            }
            m = parent.make_local_to_parent() * m;
            current = parent;
        }
        Some(m)
    }

    /// World space to local space of `key`
    pub fn make_world_to_local(&self, key: TransformKey) -> Option<Mat4x3> {
        let mut current = self.get(key)?;
        let mut m = current.make_parent_to_local();
        let mut steps = 0;
        while let Some(parent) = current.parent.and_then(|p| self.get(p)) {
            steps += 1;
            if steps > self.transforms.len() {
                log::warn!("Transform '{}' has a parent cycle", current.name);
                break;
            }
            m = m * parent.make_parent_to_local();
            current = parent;
        }
        Some(m)
    }

    /// World-space position of a transform's origin
    pub fn world_position(&self, key: TransformKey) -> Option<Vec3> {
        self.make_local_to_world(key).map(|m| m.translation())
    }

    /// World-space orientation of `key` (scales along the chain are ignored)
    pub fn world_rotation(&self, key: TransformKey) -> Option<Quat> {
        let mut current = self.get(key)?;
        let mut q = current.rotation;
        let mut steps = 0;
        while let Some(parent) = current.parent.and_then(|p| self.get(p)) {
            steps += 1;
            if steps > self.transforms.len() {
                log::warn!("Transform '{}' has a parent cycle", current.name);
                break;
            }
            q = parent.rotation * q;
            current = parent;
        }
        Some(q)
    }

    /// Move `key` so that its origin sits at the world-space `position`
    ///
    /// The stored position stays parent-relative. Returns false if `key` is
    /// missing.
    pub fn set_world_position(&mut self, key: TransformKey, position: Vec3) -> bool {
        let Some(parent) = self.get(key).map(|t| t.parent) else {
            return false;
        };
        let local = match parent.and_then(|p| self.make_world_to_local(p)) {
            Some(world_to_parent) => world_to_parent.transform_point(position),
            None => position,
        };
        match self.get_mut(key) {
            Some(t) => {
                t.position = local;
                true
            }
            None => false,
        }
    }

    /// Apply a world-space rotation on top of `key`'s current orientation
    pub fn rotate_world(&mut self, key: TransformKey, rotation: Quat) -> bool {
        let parent_rotation = self
            .get(key)
            .and_then(|t| t.parent)
            .and_then(|p| self.world_rotation(p))
            .unwrap_or(Quat::IDENTITY);
        match self.get_mut(key) {
            Some(t) => {
                let local = parent_rotation.inverse() * rotation * parent_rotation;
                t.rotation = (local * t.rotation).normalize();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_root_local_to_world() {
        let mut arena = TransformArena::new();
        let key = arena.insert(Transform::named("root", Vec3::new(1.0, 2.0, 3.0)));
        let m = arena.make_local_to_world(key).unwrap();
        assert!(vec_approx_eq(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_parent_chain() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(
            Transform::named("parent", Vec3::new(10.0, 0.0, 0.0))
                .with_rotation(Quat::from_axis_angle(Vec3::Z, PI / 2.0)),
        );
        let child = arena.insert(Transform::named("child", Vec3::X).with_parent(parent));

        // child origin sits at parent's local +x, which the parent turns to +y
        let p = arena.world_position(child).unwrap();
        assert!(vec_approx_eq(p, Vec3::new(10.0, 1.0, 0.0)), "got {:?}", p);

        let to_local = arena.make_world_to_local(child).unwrap();
        assert!(vec_approx_eq(to_local.transform_point(p), Vec3::ZERO));
    }

    #[test]
    fn test_set_world_position_under_parent() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(
            Transform::named("parent", Vec3::new(10.0, 0.0, 0.0))
                .with_rotation(Quat::from_axis_angle(Vec3::Z, PI / 2.0)),
        );
        let child = arena.insert(Transform::named("child", Vec3::Z).with_parent(parent));

        let target = Vec3::new(10.0, 2.0, 1.0);
        assert!(arena.set_world_position(child, target));
        assert!(vec_approx_eq(arena.world_position(child).unwrap(), target));
        // stored relative to the turned parent
        assert!(vec_approx_eq(arena.get(child).unwrap().position, Vec3::new(2.0, 0.0, 1.0)));

        // writing the current world position back is a no-op
        let before = arena.get(child).unwrap().position;
        assert!(arena.set_world_position(child, target));
        assert!(vec_approx_eq(arena.get(child).unwrap().position, before));
    }

    #[test]
    fn test_set_world_position_missing_key() {
        let mut arena = TransformArena::new();
        let key = arena.insert(Transform::named("gone", Vec3::ZERO));
        arena.remove(key);
        assert!(!arena.set_world_position(key, Vec3::X));
        assert!(!arena.rotate_world(key, Quat::IDENTITY));
    }

    #[test]
    fn test_rotate_world_under_parent() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(
            Transform::named("parent", Vec3::ZERO).with_rotation(Quat::from_axis_angle(Vec3::Z, PI / 2.0)),
        );
        let child = arena.insert(Transform::named("child", Vec3::ZERO).with_parent(parent));

        // a world quarter turn about x
        assert!(arena.rotate_world(child, Quat::from_axis_angle(Vec3::X, PI / 2.0)));

        let world = arena.world_rotation(child).unwrap();
        let expected = Quat::from_axis_angle(Vec3::X, PI / 2.0) * Quat::from_axis_angle(Vec3::Z, PI / 2.0);
        assert!(vec_approx_eq(world.rotate(Vec3::X), expected.rotate(Vec3::X)));
        assert!(vec_approx_eq(world.rotate(Vec3::Y), expected.rotate(Vec3::Y)));
    }

    #[test]
    fn test_clone_keeps_keys() {
        let mut arena = TransformArena::new();
        let key = arena.insert(Transform::named("a", Vec3::ZERO));
        let mut copy = arena.clone();
        copy.get_mut(key).unwrap().position = Vec3::X;

        assert_eq!(arena.get(key).unwrap().position, Vec3::ZERO);
        assert_eq!(copy.get(key).unwrap().position, Vec3::X);
    }

    #[test]
    fn test_remove_reroots_children() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(Transform::named("parent", Vec3::X));
        let child = arena.insert(Transform::named("child", Vec3::Y).with_parent(parent));

        assert!(arena.remove(parent).is_some());
        assert!(arena.get(parent).is_none());
        assert_eq!(arena.get(child).unwrap().parent, None);
        assert!(vec_approx_eq(arena.world_position(child).unwrap(), Vec3::Y));
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut arena = TransformArena::new();
        let a = arena.insert(Transform::named("a", Vec3::X));
        let b = arena.insert(Transform::named("b", Vec3::X).with_parent(a));
        arena.get_mut(a).unwrap().parent = Some(b);
        assert!(arena.make_local_to_world(a).is_some());
    }

    #[test]
    fn test_find_by_name() {
        let mut arena = TransformArena::new();
        arena.insert(Transform::named("one", Vec3::ZERO));
        let two = arena.insert(Transform::named("two", Vec3::ZERO));
        assert_eq!(arena.find("two"), Some(two));
        assert_eq!(arena.find("three"), None);
    }
}
