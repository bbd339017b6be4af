use std::mem::size_of;

use crate::geometry::aabb::AxisAlignedBox;

/// Packed BVH node. The most significant bit of the first data word tags
/// the node as a leaf:
///  - leaf: `[offset | LEAF_BIT, count]` into the primitive array
///  - interior: `[left, right]` child node indices
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Node {
    pub bounds: AxisAlignedBox,
    data: [u32; 2],
}

/// Decoded view of a [`Node`]'s data words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { offset: u32, count: u32 },
    Interior { left: u32, right: u32 },
}

const _: () = assert!(size_of::<Node>() == 32);

impl Node {
    pub const LEAF_BIT: u32 = 1 << 31;

    pub fn leaf(bounds: AxisAlignedBox, offset: u32, count: u32) -> Self {
        debug_assert_eq!(offset & Self::LEAF_BIT, 0, "Primitive offset too large");
        Self {
            bounds,
            data: [offset | Self::LEAF_BIT, count],
        }
    }

    pub fn interior(bounds: AxisAlignedBox, left: u32, right: u32) -> Self {
        debug_assert_eq!(left & Self::LEAF_BIT, 0, "Node index too large");
        Self {
            bounds,
            data: [left, right],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.data[0] & Self::LEAF_BIT != 0
    }

    pub fn kind(&self) -> NodeKind {
        let [first, second] = self.data;
        if self.is_leaf() {
            NodeKind::Leaf {
                offset: first & !Self::LEAF_BIT,
                count: second,
            }
        } else {
            NodeKind::Interior {
                left: first,
                right: second,
            }
        }
    }

    /// The raw data words, as laid out in memory.
    pub fn data(&self) -> [u32; 2] {
        self.data
    }
}

#[cfg(test)]
mod test {
    use super::{Node, NodeKind};
    use crate::geometry::aabb::AxisAlignedBox;

    #[test]
    fn leaf_encoding() {
        let leaf = Node::leaf(AxisAlignedBox::empty(), 12, 3);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.data(), [12 | Node::LEAF_BIT, 3]);
        assert_eq!(leaf.kind(), NodeKind::Leaf { offset: 12, count: 3 });
    }

    #[test]
    fn interior_encoding() {
        let node = Node::interior(AxisAlignedBox::empty(), 1, 7);
        assert!(!node.is_leaf());
        assert_eq!(node.data(), [1, 7]);
        assert_eq!(node.kind(), NodeKind::Interior { left: 1, right: 7 });
    }
}
