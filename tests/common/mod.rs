//! Shared support for the integration suites: a boxed tree member type and
//! a few helpers.
//!
//! Each suite exercises the tree through the public API only, so the member
//! type lives here rather than in the crate.

#![allow(dead_code)]

use aldertree::{Linked, Links, Tree};
use std::ptr::NonNull;

/// A boxed tree member ordered by `key`.
///
/// `tag` is opaque payload for tests that need to tell two entries with the
/// same key apart.
pub struct Entry {
	pub links: Links<Entry>,
	pub key: i32,
	pub tag: u32,
}

impl Entry {
	pub fn new(key: i32) -> Box<Entry> {
		Entry::tagged(key, 0)
	}

	pub fn tagged(key: i32, tag: u32) -> Box<Entry> {
		Box::new(Entry {
			links: Links::new(),
			key,
			tag,
		})
	}
}

unsafe impl Linked for Entry {
	type Handle = Box<Entry>;
	type Key = i32;

	fn into_ptr(handle: Box<Entry>) -> NonNull<Entry> {
		NonNull::from(Box::leak(handle))
	}

	unsafe fn from_ptr(ptr: NonNull<Entry>) -> Box<Entry> {
		unsafe { Box::from_raw(ptr.as_ptr()) }
	}

	unsafe fn links(ptr: NonNull<Entry>) -> NonNull<Links<Entry>> {
		ptr.map_addr(|addr| {
			addr.checked_add(core::mem::offset_of!(Entry, links))
				.unwrap()
		})
		.cast()
	}

	fn key(&self) -> &i32 {
		&self.key
	}
}

/// Collects the tree's keys in iteration order.
pub fn keys(tree: &Tree<Entry>) -> Vec<i32> {
	tree.iter().map(|entry| entry.key).collect()
}
