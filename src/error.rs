//! # Error Types for Tree Validation
//!
//! This module defines the error type returned by [`Tree::validate`], the
//! structural self-check that walks the whole tree and verifies the AA
//! balancing rules.
//!
//! ## Error Handling Strategy
//!
//! The container operations themselves are infallible: absence is signalled
//! by `None` ("not found" / "empty tree") and replacement by `Some` from
//! [`Tree::insert`]. The only fallible surface is validation, which reports
//! the first rule it finds violated, together with the levels or counts
//! involved so a failing test can say exactly which rule broke and where.
//!
//! ## The Rules
//!
//! An AA tree encodes a 2-3 tree in binary links by giving every node a
//! level. The walk checks, for every node:
//!
//! 1. A leaf has level 1.
//! 2. A left child sits exactly one level below its parent.
//! 3. A right child sits at the parent's level or one below.
//! 4. A right grandchild sits strictly below its grandparent
//!    (no two consecutive horizontal right links).
//! 5. A node above level 1 has both children.
//! 6. An in-order walk visits strictly increasing keys.
//!
//! On top of the per-node rules the walk cross-checks the stored element
//! count and the height bound `2 * ceil(log2(n + 1))` that the level rules
//! imply.
//!
//! [`Tree::validate`]: crate::Tree::validate
//! [`Tree::insert`]: crate::Tree::insert

use thiserror::Error;

/// A structural rule violated somewhere in the tree.
///
/// Returned by [`Tree::validate`](crate::Tree::validate). Each variant
/// corresponds to one of the AA balancing rules; the fields carry the levels
/// or counts observed at the offending node.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// A node with no children does not sit at level 1.
	#[error("leaf node has level {level}, expected 1")]
	LeafLevel {
		/// The level found on the leaf.
		level: u32,
	},

	/// A left child is not exactly one level below its parent.
	#[error("left child at level {child} under parent at level {parent}")]
	LeftChildLevel {
		/// The parent's level.
		parent: u32,
		/// The left child's level.
		child: u32,
	},

	/// A right child is more than one level below its parent, or above it.
	#[error("right child at level {child} under parent at level {parent}")]
	RightChildLevel {
		/// The parent's level.
		parent: u32,
		/// The right child's level.
		child: u32,
	},

	/// Two consecutive horizontal right links: a right grandchild at its
	/// grandparent's level.
	#[error("right grandchild at level {grandchild} under grandparent at level {grandparent}")]
	RightGrandchildLevel {
		/// The grandparent's level.
		grandparent: u32,
		/// The right grandchild's level.
		grandchild: u32,
	},

	/// A node above level 1 is missing a child.
	#[error("node at level {level} is missing a child")]
	MissingChild {
		/// The level of the node with a missing child.
		level: u32,
	},

	/// An in-order walk visited keys out of order (or a duplicate key).
	#[error("keys out of order in in-order traversal")]
	OutOfOrder,

	/// The number of reachable nodes does not match the recorded length.
	#[error("tree holds {found} nodes but records a length of {expected}")]
	CountMismatch {
		/// The length the tree records.
		expected: usize,
		/// The number of nodes the walk visited.
		found: usize,
	},

	/// The tree is taller than the balancing rules allow for its size.
	#[error("height {height} exceeds bound {bound} for {len} nodes")]
	HeightBound {
		/// The measured height.
		height: usize,
		/// The maximum height allowed for `len` nodes.
		bound: usize,
		/// The number of nodes in the tree.
		len: usize,
	},
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
