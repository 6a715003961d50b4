use generational_arena::{Arena, Index};

use crate::{
    clock::{Spin, Tick},
    math::Angle,
    sprite::SpriteDescriptor,
    texture::SubTexture,
    transform::Affine,
    Error,
};

/// Identifies a node within a [`Scene`]. Ids of removed nodes are never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// How a node's transform is updated during [`Scene::arrange`].
#[derive(Debug, Clone)]
pub enum Arrangement {
    /// The transform only changes through [`Scene::set_transform`].
    Static,
    /// The transform is recomputed every frame to draw `sprite` rotated by
    /// the angle `spin` gives for that frame.
    Spin {
        /// The sprite being drawn.
        sprite: SpriteDescriptor,
        /// The rotation speed.
        spin: Spin,
    },
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::Static
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, Default)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    sub_texture: Option<SubTexture>,
    transform: Affine,
    arrangement: Arrangement,
}

impl Node {
    /// The parent of this node. `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The children of this node, in drawing order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The texture region this node draws, if any.
    #[must_use]
    pub const fn sub_texture(&self) -> Option<&SubTexture> {
        self.sub_texture.as_ref()
    }

    /// The transform relative to the parent node.
    #[must_use]
    pub const fn transform(&self) -> Affine {
        self.transform
    }

    /// How the transform is updated each frame.
    #[must_use]
    pub const fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }
}

/// A tree of nodes, drawn depth-first from the root.
#[derive(Debug)]
pub struct Scene {
    nodes: Arena<Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Returns a scene containing only a root node with the identity
    /// transform.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = NodeId(nodes.insert(Node::default()));
        Self { nodes, root }
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a scene has at least its root node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`.
    pub fn node(&self, id: NodeId) -> crate::Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode)
    }

    fn node_mut(&mut self, id: NodeId) -> crate::Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::UnknownNode)
    }

    /// Adds an empty node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId) -> crate::Result<NodeId> {
        self.node(parent)?;
        let id = NodeId(self.nodes.insert(Node {
            parent: Some(parent),
            ..Node::default()
        }));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Adds a node drawing `sprite` that spins at `spin`, as the last child
    /// of `parent`. The node starts out unrotated.
    pub fn append_sprite(
        &mut self,
        parent: NodeId,
        sprite: SpriteDescriptor,
        spin: Spin,
    ) -> crate::Result<NodeId> {
        let id = self.append_child(parent)?;
        let node = self.node_mut(id)?;
        node.sub_texture = Some(sprite.source().clone());
        node.transform = sprite.transform(Angle::zero());
        node.arrangement = Arrangement::Spin { sprite, spin };
        Ok(id)
    }

    /// Sets the texture region drawn by `id`.
    pub fn set_sub_texture(
        &mut self,
        id: NodeId,
        sub_texture: Option<SubTexture>,
    ) -> crate::Result<()> {
        self.node_mut(id)?.sub_texture = sub_texture;
        Ok(())
    }

    /// Sets the transform of `id` relative to its parent.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) -> crate::Result<()> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    /// Sets how `id` is updated each frame.
    pub fn set_arrangement(&mut self, id: NodeId, arrangement: Arrangement) -> crate::Result<()> {
        self.node_mut(id)?.arrangement = arrangement;
        Ok(())
    }

    /// Returns the children of `id`, in drawing order.
    pub fn children(&self, id: NodeId) -> crate::Result<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Removes `id` and everything below it. Removing the root removes all
    /// of its children but keeps the root itself.
    pub fn remove(&mut self, id: NodeId) -> crate::Result<()> {
        let node = self.node(id)?;
        let mut pending = node.children.clone();
        let parent = node.parent;

        if id == self.root {
            self.node_mut(id)?.children.clear();
        } else {
            if let Some(parent) = parent {
                self.node_mut(parent)?.children.retain(|child| *child != id);
            }
            self.nodes.remove(id.0);
        }

        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(child.0) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Recomputes the transform of every spinning node for `tick`. Static
    /// nodes are left untouched.
    pub fn arrange(&mut self, tick: Tick) {
        for (_, node) in self.nodes.iter_mut() {
            if let Arrangement::Spin { sprite, spin } = &node.arrangement {
                node.transform = sprite.transform(spin.angle(tick));
            }
        }
    }

    /// Visits every node depth-first, parents before children, passing the
    /// node's transform composed with all of its ancestors'.
    pub fn walk<F: FnMut(NodeId, &Node, Affine)>(&self, mut visit: F) {
        let mut stack = vec![(self.root, Affine::identity())];
        while let Some((id, parent_world)) = stack.pop() {
            if let Some(node) = self.nodes.get(id.0) {
                let world = parent_world * node.transform;
                visit(id, node, world);
                stack.extend(node.children.iter().rev().map(|child| (*child, world)));
            }
        }
    }
}
