//! Scene graph port
//!
//! The rig never owns its pivots. It reaches them through [`SceneGraph`], a
//! small capability interface over whatever hierarchy the host runs.
//! [`TransformTree`] is a self-contained implementation for tests, demos and
//! hosts without a scene graph of their own.

use camrig_math::{Rotator, Transform, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;

new_key_type! {
    /// Handle to a node in a scene graph
    pub struct NodeId;
}

/// The part a scene node plays in the camera stick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PivotRole {
    /// Orbit pivot; its rotation is the stick orientation
    Target,
    /// Child of the target holding the undamped stick length on its -X axis
    RestPoint,
    /// Child of the rest point carrying the damped offset
    Camera,
}

impl fmt::Display for PivotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotRole::Target => write!(f, "target"),
            PivotRole::RestPoint => write!(f, "rest point"),
            PivotRole::Camera => write!(f, "camera"),
        }
    }
}

/// The three nodes a rig is attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pivots {
    pub target: NodeId,
    pub rest_point: NodeId,
    pub camera: NodeId,
}

impl Pivots {
    pub fn new(target: NodeId, rest_point: NodeId, camera: NodeId) -> Self {
        Self {
            target,
            rest_point,
            camera,
        }
    }

    /// Every pivot paired with its role, root first
    pub fn iter(&self) -> impl Iterator<Item = (PivotRole, NodeId)> {
        [
            (PivotRole::Target, self.target),
            (PivotRole::RestPoint, self.rest_point),
            (PivotRole::Camera, self.camera),
        ]
        .into_iter()
    }
}

/// How one channel of a node's placement is treated when it is reparented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachRule {
    /// Keep the local value, so the world value follows the new parent
    #[default]
    KeepRelative,
    /// Keep the world value, recomputing the local one
    KeepWorld,
    /// Reset the local value so the node matches its parent
    SnapToTarget,
}

/// Per-channel attachment rules
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachRules {
    pub location: AttachRule,
    pub rotation: AttachRule,
}

impl AttachRules {
    pub const KEEP_RELATIVE: AttachRules = AttachRules {
        location: AttachRule::KeepRelative,
        rotation: AttachRule::KeepRelative,
    };

    pub const KEEP_WORLD: AttachRules = AttachRules {
        location: AttachRule::KeepWorld,
        rotation: AttachRule::KeepWorld,
    };

    pub const SNAP_TO_TARGET: AttachRules = AttachRules {
        location: AttachRule::SnapToTarget,
        rotation: AttachRule::SnapToTarget,
    };

    pub fn new(location: AttachRule, rotation: AttachRule) -> Self {
        Self { location, rotation }
    }
}

/// What the rig needs from a scene graph.
///
/// Getters return `None` for nodes that are not (or no longer) valid; setters
/// on invalid nodes are ignored.
pub trait SceneGraph {
    fn is_valid(&self, node: NodeId) -> bool;

    fn local_position(&self, node: NodeId) -> Option<Vec3>;

    fn set_local_position(&mut self, node: NodeId, position: Vec3);

    fn local_rotation(&self, node: NodeId) -> Option<Rotator>;

    fn set_local_rotation(&mut self, node: NodeId, rotation: Rotator);

    fn world_transform(&self, node: NodeId) -> Option<Transform>;

    /// Make `child` a child of `parent`. Returns `false` when either node is
    /// invalid or the attachment would create a cycle.
    fn attach(&mut self, child: NodeId, parent: NodeId, rules: AttachRules) -> bool;

    /// Turn `node` into a root, keeping its local values
    fn detach(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Root of the hierarchy `node` belongs to (the node itself when it has no parent)
    fn owner(&self, node: NodeId) -> Option<NodeId>;

    /// `true` when `ancestor` is `node` or sits above it
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Low-pass `node`'s world rotation toward `target`'s world rotation.
///
/// `alpha` at or below zero leaves `node` alone, at or above one copies the
/// target rotation. Positions are not touched. Returns `false` when either
/// node is missing.
pub fn low_pass_world_rotation<S: SceneGraph + ?Sized>(
    scene: &mut S,
    node: NodeId,
    target: NodeId,
    alpha: f32,
) -> bool {
    let (Some(current), Some(goal)) = (scene.world_transform(node), scene.world_transform(target))
    else {
        return false;
    };
    if !(alpha > 0.0) {
        return true;
    }

    let world = current.rotation.interp_to(goal.rotation, alpha, 1.0);
    let parent = scene
        .parent(node)
        .and_then(|p| scene.world_transform(p))
        .unwrap_or(Transform::IDENTITY);
    let local = parent.rotation.conjugate().mul(&world).normalize();
    scene.set_local_rotation(node, local.to_rotator());
    true
}

/// Node data stored by [`TransformTree`]
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    /// Optional name for debugging
    pub name: Option<String>,
    position: Vec3,
    rotation: Rotator,
}

impl SceneNode {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Rotator {
        self.rotation
    }
}

/// In-memory transform hierarchy
///
/// Local placements are stored as position + [`Rotator`]; world transforms are
/// composed on demand by walking up the parent chain.
#[derive(Default)]
pub struct TransformTree {
    nodes: SlotMap<NodeId, SceneNode>,
    children: FxHashMap<NodeId, SmallVec<[NodeId; 4]>>,
    parents: FxHashMap<NodeId, NodeId>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: FxHashMap::default(),
            parents: FxHashMap::default(),
        }
    }

    /// Spawn a root node at `position`
    pub fn spawn(&mut self, position: Vec3) -> NodeId {
        self.nodes.insert(SceneNode {
            name: None,
            position,
            rotation: Rotator::ZERO,
        })
    }

    /// Spawn a named root node
    pub fn spawn_named(&mut self, name: impl Into<String>, position: Vec3) -> NodeId {
        self.nodes.insert(SceneNode {
            name: Some(name.into()),
            position,
            rotation: Rotator::ZERO,
        })
    }

    pub fn get(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Despawn a node and all its children
    pub fn despawn(&mut self, node: NodeId) {
        if let Some(children) = self.children.remove(&node) {
            for child in children {
                self.despawn(child);
            }
        }

        self.detach(node);
        self.nodes.remove(node);
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn local_transform(&self, node: &SceneNode) -> Transform {
        Transform::from_parts(node.position, node.rotation)
    }

    fn parent_world(&self, node: NodeId) -> Transform {
        self.parent(node)
            .and_then(|p| self.world_transform(p))
            .unwrap_or(Transform::IDENTITY)
    }

}

impl SceneGraph for TransformTree {
    fn is_valid(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn local_position(&self, node: NodeId) -> Option<Vec3> {
        self.nodes.get(node).map(|n| n.position)
    }

    fn set_local_position(&mut self, node: NodeId, position: Vec3) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.position = position;
        }
    }

    fn local_rotation(&self, node: NodeId) -> Option<Rotator> {
        self.nodes.get(node).map(|n| n.rotation)
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Rotator) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.rotation = rotation;
        }
    }

    fn world_transform(&self, node: NodeId) -> Option<Transform> {
        let local = self.local_transform(self.nodes.get(node)?);
        Some(self.parent_world(node).compose(&local))
    }

    fn attach(&mut self, child: NodeId, parent: NodeId, rules: AttachRules) -> bool {
        if !self.is_valid(child) || !self.is_valid(parent) || self.is_ancestor(child, parent) {
            return false;
        }

        let world_before = self.world_transform(child).unwrap_or_default();

        self.detach(child);
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);

        let parent_world = self.world_transform(parent).unwrap_or_default();
        let kept_world = parent_world.relative(&world_before);

        if let Some(n) = self.nodes.get_mut(child) {
            match rules.location {
                AttachRule::KeepRelative => {}
                AttachRule::KeepWorld => n.position = kept_world.translation,
                AttachRule::SnapToTarget => n.position = Vec3::ZERO,
            }
            match rules.rotation {
                AttachRule::KeepRelative => {}
                AttachRule::KeepWorld => n.rotation = kept_world.rotation.to_rotator(),
                AttachRule::SnapToTarget => n.rotation = Rotator::ZERO,
            }
        }

        true
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.parents.remove(&node) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|n| *n != node);
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    fn owner(&self, node: NodeId) -> Option<NodeId> {
        if !self.is_valid(node) {
            return None;
        }

        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_transform_follows_parent() {
        let mut tree = TransformTree::new();
        let root = tree.spawn(Vec3::new(100.0, 0.0, 0.0));
        tree.set_local_rotation(root, Rotator::new(0.0, 90.0, 0.0));

        let child = tree.spawn(Vec3::new(-10.0, 0.0, 0.0));
        assert!(tree.attach(child, root, AttachRules::KEEP_RELATIVE));

        let world = tree.world_transform(child).unwrap();
        assert!(world.translation.max_abs_diff(Vec3::new(100.0, -10.0, 0.0)) < 1e-4);
        assert_eq!(tree.local_position(child), Some(Vec3::new(-10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_attach_keep_world() {
        let mut tree = TransformTree::new();
        let root = tree.spawn(Vec3::new(5.0, 5.0, 0.0));
        let child = tree.spawn(Vec3::new(10.0, 0.0, 0.0));

        assert!(tree.attach(child, root, AttachRules::KEEP_WORLD));
        let world = tree.world_transform(child).unwrap();
        assert!(world.translation.max_abs_diff(Vec3::new(10.0, 0.0, 0.0)) < 1e-4);
        assert!(tree.local_position(child).unwrap().max_abs_diff(Vec3::new(5.0, -5.0, 0.0)) < 1e-4);
    }

    #[test]
    fn test_attach_snap_rotation() {
        let mut tree = TransformTree::new();
        let root = tree.spawn(Vec3::ZERO);
        let child = tree.spawn(Vec3::new(-300.0, 0.0, 0.0));
        tree.set_local_rotation(child, Rotator::new(10.0, 20.0, 0.0));

        let rules = AttachRules::new(AttachRule::KeepRelative, AttachRule::SnapToTarget);
        assert!(tree.attach(child, root, rules));
        assert_eq!(tree.local_rotation(child), Some(Rotator::ZERO));
        assert_eq!(tree.local_position(child), Some(Vec3::new(-300.0, 0.0, 0.0)));
    }

    #[test]
    fn test_attach_rejects_cycle_and_invalid() {
        let mut tree = TransformTree::new();
        let a = tree.spawn(Vec3::ZERO);
        let b = tree.spawn(Vec3::ZERO);
        assert!(tree.attach(b, a, AttachRules::KEEP_RELATIVE));
        assert!(!tree.attach(a, b, AttachRules::KEEP_RELATIVE));
        assert!(!tree.attach(a, a, AttachRules::KEEP_RELATIVE));

        tree.despawn(b);
        assert!(!tree.attach(b, a, AttachRules::KEEP_RELATIVE));
    }

    #[test]
    fn test_low_pass_world_rotation() {
        let mut tree = TransformTree::new();
        let body = tree.spawn(Vec3::ZERO);
        tree.set_local_rotation(body, Rotator::new(0.0, 30.0, 0.0));
        let head = tree.spawn(Vec3::new(0.0, 0.0, 50.0));
        tree.attach(head, body, AttachRules::KEEP_RELATIVE);
        let goal = tree.spawn(Vec3::new(300.0, 0.0, 0.0));
        tree.set_local_rotation(goal, Rotator::new(0.0, 90.0, 0.0));

        assert!(low_pass_world_rotation(&mut tree, head, goal, 0.0));
        assert_eq!(tree.local_rotation(head), Some(Rotator::ZERO));

        assert!(low_pass_world_rotation(&mut tree, head, goal, 0.5));
        let world = tree.world_transform(head).unwrap().rotation.to_rotator();
        assert!(world.equals(Rotator::new(0.0, 60.0, 0.0), 1e-2), "{world:?}");
        assert!(tree.local_rotation(head).unwrap().equals(Rotator::new(0.0, 30.0, 0.0), 1e-2));
        assert_eq!(tree.local_position(head), Some(Vec3::new(0.0, 0.0, 50.0)));

        assert!(low_pass_world_rotation(&mut tree, head, goal, 1.0));
        let world = tree.world_transform(head).unwrap().rotation.to_rotator();
        assert!(world.equals(Rotator::new(0.0, 90.0, 0.0), 1e-2));

        tree.despawn(goal);
        assert!(!low_pass_world_rotation(&mut tree, head, goal, 0.5));
    }

    #[test]
    fn test_reattach_moves_child() {
        let mut tree = TransformTree::new();
        let a = tree.spawn(Vec3::ZERO);
        let b = tree.spawn(Vec3::ZERO);
        let c = tree.spawn(Vec3::ZERO);

        tree.attach(c, a, AttachRules::KEEP_RELATIVE);
        tree.attach(c, b, AttachRules::KEEP_RELATIVE);

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[c]);
        assert_eq!(tree.parent(c), Some(b));
    }

    #[test]
    fn test_owner_is_root() {
        let mut tree = TransformTree::new();
        let actor = tree.spawn_named("actor", Vec3::ZERO);
        let target = tree.spawn(Vec3::ZERO);
        let rest = tree.spawn(Vec3::ZERO);
        tree.attach(target, actor, AttachRules::KEEP_RELATIVE);
        tree.attach(rest, target, AttachRules::KEEP_RELATIVE);

        assert_eq!(tree.owner(rest), Some(actor));
        assert_eq!(tree.owner(actor), Some(actor));
        assert_eq!(tree.get(actor).and_then(|n| n.name.as_deref()), Some("actor"));
    }

    #[test]
    fn test_despawn_removes_subtree() {
        let mut tree = TransformTree::new();
        let root = tree.spawn(Vec3::ZERO);
        let child = tree.spawn(Vec3::ZERO);
        let grandchild = tree.spawn(Vec3::ZERO);
        tree.attach(child, root, AttachRules::KEEP_RELATIVE);
        tree.attach(grandchild, child, AttachRules::KEEP_RELATIVE);

        tree.despawn(child);
        assert!(tree.is_valid(root));
        assert!(!tree.is_valid(child));
        assert!(!tree.is_valid(grandchild));
        assert_eq!(tree.len(), 1);
        assert!(tree.world_transform(grandchild).is_none());
    }
}
