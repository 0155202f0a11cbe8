//! # Test Utilities for the AA Tree
//!
//! This module provides a boxed node type for the crate's internal tests and
//! a loader that builds trees from JSON fixtures. It's only compiled in test
//! builds (`#[cfg(test)]`).
//!
//! ## Purpose
//!
//! The rebalancing primitives only ever see a handful of local shapes, but
//! producing one particular shape through the public insert path is awkward:
//! the shape depends on the whole insertion history. Instead, a fixture
//! names the exact structure (per node its key, its level, and its children)
//! and the loader wires the links directly, bypassing `insert`.
//! This also allows deliberately *invalid* shapes, which the validation
//! tests need.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "key": 10, "level": 2,
//!   "left":  { "key": 5,  "level": 1 },
//!   "right": { "key": 15, "level": 1 }
//! }
//! ```
//!
//! Children are optional; `null` is the empty tree.
//!
//! ## Usage
//!
//! ```ignore
//! let tree = tree_from_json(r#"{ "key": 1, "level": 1 }"#);
//! tree.assert_invariants();
//! ```

use crate::{Linked, Links, Tree};

use serde::Deserialize;
use std::ptr::NonNull;

/// A boxed tree member for tests.
///
/// Ordered by `key`; `tag` is opaque payload, used by tests that need to
/// tell two entries with the same key apart.
pub struct TestEntry {
	pub links: Links<TestEntry>,
	pub key: i32,
	pub tag: u32,
}

impl TestEntry {
	pub fn new(key: i32) -> Box<TestEntry> {
		TestEntry::tagged(key, 0)
	}

	pub fn tagged(key: i32, tag: u32) -> Box<TestEntry> {
		Box::new(TestEntry {
			links: Links::new(),
			key,
			tag,
		})
	}
}

unsafe impl Linked for TestEntry {
	type Handle = Box<TestEntry>;
	type Key = i32;

	fn into_ptr(handle: Box<TestEntry>) -> NonNull<TestEntry> {
		NonNull::from(Box::leak(handle))
	}

	unsafe fn from_ptr(ptr: NonNull<TestEntry>) -> Box<TestEntry> {
		unsafe { Box::from_raw(ptr.as_ptr()) }
	}

	unsafe fn links(ptr: NonNull<TestEntry>) -> NonNull<Links<TestEntry>> {
		ptr.map_addr(|addr| {
			addr.checked_add(core::mem::offset_of!(TestEntry, links))
				.unwrap()
		})
		.cast()
	}

	fn key(&self) -> &i32 {
		&self.key
	}
}

/// A node in the JSON fixture structure.
#[derive(Deserialize, Debug)]
struct Shape {
	/// The node's key.
	key: i32,
	/// The node's AA level, installed verbatim.
	level: u32,
	/// The left subtree, if any.
	#[serde(default)]
	left: Option<Box<Shape>>,
	/// The right subtree, if any.
	#[serde(default)]
	right: Option<Box<Shape>>,
}

/// Builds a tree with the exact structure described by a JSON fixture.
///
/// Levels and links are installed verbatim, so the result is only as valid
/// as the fixture; malformed shapes are accepted on purpose. The recorded
/// length is the node count of the fixture.
///
/// # Panics
///
/// Panics if the JSON cannot be parsed.
pub fn tree_from_json(json: &str) -> Tree<TestEntry> {
	let shape: Option<Shape> = serde_json::from_str(json).expect("failed to parse fixture");

	let mut len = 0;
	let root = shape.map(|shape| build(shape, &mut len));

	Tree { root, len }
}

/// Recursively translates a fixture node into a linked `TestEntry`.
fn build(shape: Shape, len: &mut usize) -> NonNull<TestEntry> {
	let ptr = TestEntry::into_ptr(TestEntry::new(shape.key));
	*len += 1;

	let left = shape.left.map(|child| build(*child, len));
	let right = shape.right.map(|child| build(*child, len));

	unsafe {
		let links = TestEntry::links(ptr).as_mut();
		links.set_level(shape.level);
		links.set_left(left);
		links.set_right(right);
	}

	ptr
}
