//! Implementation of an intrusive, allocation-free AA tree.
//!
//! An AA tree ([Andersson, 1993](https://user.it.uu.se/~arnea/ps/simp.pdf))
//! is a balanced binary search tree that encodes a 2-3 tree in binary links
//! by storing a small level number in every node. Rebalancing needs only two
//! local primitives, `skew` and `split`, which keeps insertion and deletion
//! short while preserving an `O(log n)` height bound.
//!
//! The container is *intrusive*: the left/right/level fields live inside the
//! caller's own records, embedded as a [`Links`] value, and the tree never
//! allocates, copies or frees a record. Records enter the tree through
//! [`Tree::insert`], which takes ownership of the node's [`Linked::Handle`],
//! and leave it detached through one of the removal operations, which hand
//! the handle back.
//!
//! ```
//! use aldertree::{Linked, Links, Tree};
//! use std::ptr::NonNull;
//!
//! struct Task {
//!     links: Links<Task>,
//!     deadline: u64,
//! }
//!
//! unsafe impl Linked for Task {
//!     type Handle = Box<Task>;
//!     type Key = u64;
//!
//!     fn into_ptr(handle: Box<Task>) -> NonNull<Task> {
//!         NonNull::from(Box::leak(handle))
//!     }
//!
//!     unsafe fn from_ptr(ptr: NonNull<Task>) -> Box<Task> {
//!         unsafe { Box::from_raw(ptr.as_ptr()) }
//!     }
//!
//!     unsafe fn links(ptr: NonNull<Task>) -> NonNull<Links<Task>> {
//!         ptr.map_addr(|addr| {
//!             addr.checked_add(core::mem::offset_of!(Task, links)).unwrap()
//!         })
//!         .cast()
//!     }
//!
//!     fn key(&self) -> &u64 {
//!         &self.deadline
//!     }
//! }
//!
//! let mut tree: Tree<Task> = Tree::new();
//! tree.insert(Box::new(Task { links: Links::new(), deadline: 40 }));
//! tree.insert(Box::new(Task { links: Links::new(), deadline: 20 }));
//!
//! assert_eq!(tree.first().map(|t| t.deadline), Some(20));
//! assert_eq!(tree.pop_first().map(|t| t.deadline), Some(20));
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! The tree is single-threaded: a shared borrow is required for lookups and
//! iteration, an exclusive borrow for mutation, and consumers needing
//! concurrency wrap the tree in their own synchronization.

use smallvec::SmallVec;

use std::borrow::Borrow;
use std::cell::UnsafeCell;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomPinned;
use std::ptr::NonNull;

pub mod error;
pub mod iter;
#[cfg(test)]
pub mod util;

pub use iter::Iter;

/// An owned or absent node pointer.
pub(crate) type Link<T> = Option<NonNull<T>>;

/// Trait implemented by types which can be members of a [`Tree`].
///
/// A member type embeds a [`Links`] value, names an owning [`Handle`] type
/// (such as `Box<Self>`), and exposes the [`Key`] its ordering is derived
/// from. The tree compares nodes only through [`key`]; the rest of the record
/// is opaque payload.
///
/// # Safety
///
/// This is unsafe to implement because the implementation is responsible for
/// upholding the intrusive-collection contract:
///
/// - A node must not move or be deallocated while it is linked into a tree.
///   The handle returned by [`into_ptr`] must keep the pointed-to value alive
///   and pinned until [`from_ptr`] reclaims it.
/// - [`links`] must return a pointer to the `Links` field embedded in the
///   node itself, without creating an intermediate reference to the whole
///   node (see below).
/// - The key of a linked node must not change, and [`Key`]'s `Ord` must be a
///   total order. Violating either scrambles the search structure.
///
/// # Implementing `Linked::links`
///
/// The obvious implementation, `NonNull::from(&mut target.as_mut().links)`,
/// materializes a unique reference to the whole node and is rejected under
/// Stacked Borrows. Compute the field address without a reference instead:
///
/// ```
/// use aldertree::{Linked, Links};
/// use core::ptr::NonNull;
///
/// struct Entry {
///     links: Links<Entry>,
///     key: i32,
/// }
///
/// unsafe impl Linked for Entry {
///     # type Handle = Box<Entry>;
///     # type Key = i32;
///     # fn into_ptr(handle: Box<Entry>) -> NonNull<Entry> { NonNull::from(Box::leak(handle)) }
///     # unsafe fn from_ptr(ptr: NonNull<Entry>) -> Box<Entry> { unsafe { Box::from_raw(ptr.as_ptr()) } }
///     # fn key(&self) -> &i32 { &self.key }
///     // ...
///
///     unsafe fn links(ptr: NonNull<Entry>) -> NonNull<Links<Entry>> {
///         ptr.map_addr(|addr| {
///             addr.checked_add(core::mem::offset_of!(Entry, links)).unwrap()
///         })
///         .cast()
///     }
/// }
/// ```
///
/// [`Handle`]: Linked::Handle
/// [`Key`]: Linked::Key
/// [`key`]: Linked::key
/// [`links`]: Linked::links
/// [`into_ptr`]: Linked::into_ptr
/// [`from_ptr`]: Linked::from_ptr
pub unsafe trait Linked {
	/// The handle owning nodes outside the tree.
	///
	/// This type must have ownership over a `Self`-typed value: inserting
	/// consumes a `Handle`, removal produces one again. `Box<Self>` is the
	/// quintessential example; a static arena slot or reference-counted
	/// pointer works equally as long as the pointee stays put while linked.
	type Handle;

	/// The type nodes are ordered by.
	///
	/// Keys must form a total order and at most one node per key may reside
	/// in the tree at a time; inserting a node with an equal key displaces
	/// the previous holder.
	type Key: Ord;

	/// Convert a [`Self::Handle`] to a raw pointer, taking ownership of it in
	/// the process.
	fn into_ptr(handle: Self::Handle) -> NonNull<Self>;

	/// Convert a raw pointer back into an owning [`Self::Handle`].
	///
	/// # Safety
	///
	/// The pointer must have come from [`Linked::into_ptr`], exactly one
	/// handle may be reconstructed from it, and the pointee must still be
	/// alive.
	unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle;

	/// Return the [`Links`] embedded in the node pointed to by `ptr`.
	///
	/// # Safety
	///
	/// `ptr` must point to a valid instance of `Self`. See the
	/// [trait-level documentation](#implementing-linkedlinks) for how to
	/// implement this without an intermediate reference.
	unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>>;

	/// Retrieve the key this node is ordered by.
	fn key(&self) -> &Self::Key;
}

/// Links to other nodes in a [`Tree`].
///
/// In order to be part of a [`Tree`], a type must contain an instance of this
/// type and implement the [`Linked`] trait. The links hold the node's left
/// and right children and its AA level; a detached node has no children and
/// level zero.
///
/// While the node is linked, these fields belong to the tree: the caller must
/// not touch them (there is no API to), and must not move or drop the node.
pub struct Links<T: ?Sized> {
	inner: UnsafeCell<LinksInner<T>>,
}

struct LinksInner<T: ?Sized> {
	left: Link<T>,
	right: Link<T>,
	level: u32,
	/// Intrusive links must always be `!Unpin`, to ensure they never receive
	/// LLVM `noalias` annotations; see
	/// <https://github.com/rust-lang/rust/issues/63818>.
	_unpin: PhantomPinned,
}

// The links only carry pointers to `T`; whether they may cross threads is
// decided by `T` itself.
unsafe impl<T: Send + ?Sized> Send for Links<T> {}
unsafe impl<T: Sync + ?Sized> Sync for Links<T> {}

impl<T: ?Sized> Links<T> {
	/// Returns new, unlinked links.
	pub const fn new() -> Self {
		Links {
			inner: UnsafeCell::new(LinksInner {
				left: None,
				right: None,
				level: 0,
				_unpin: PhantomPinned,
			}),
		}
	}

	/// Returns `true` while the node is in a tree.
	///
	/// Linked nodes sit at level 1 or above; every removal resets the links
	/// to the detached state before the handle is returned.
	pub fn is_linked(&self) -> bool {
		self.level() != 0
	}

	pub(crate) fn left(&self) -> Link<T> {
		unsafe { (*self.inner.get()).left }
	}

	pub(crate) fn right(&self) -> Link<T> {
		unsafe { (*self.inner.get()).right }
	}

	pub(crate) fn level(&self) -> u32 {
		unsafe { (*self.inner.get()).level }
	}

	pub(crate) fn set_left(&mut self, left: Link<T>) {
		self.inner.get_mut().left = left;
	}

	pub(crate) fn set_right(&mut self, right: Link<T>) {
		self.inner.get_mut().right = right;
	}

	pub(crate) fn set_level(&mut self, level: u32) {
		self.inner.get_mut().level = level;
	}

	/// Resets the links to the detached state.
	pub(crate) fn unlink(&mut self) {
		let inner = self.inner.get_mut();
		inner.left = None;
		inner.right = None;
		inner.level = 0;
	}
}

impl<T: ?Sized> Default for Links<T> {
	fn default() -> Self {
		Links::new()
	}
}

impl<T: ?Sized> fmt::Debug for Links<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Links")
			.field("level", &self.level())
			.field("has_left", &self.left().is_some())
			.field("has_right", &self.right().is_some())
			.finish()
	}
}

/// An intrusive AA tree.
///
/// An ordered associative container over caller-owned records. All
/// operations complete in `O(log n)`: point lookup ([`get`]), ordered
/// stepping ([`successor`]/[`predecessor`]), range positioning
/// ([`lower_bound`]), insertion and removal by key or from either end.
///
/// The whole container state is the root link plus the [`Links`] embedded in
/// the reachable nodes; the tree performs no allocation of its own. Handles
/// still inside the tree when it is dropped are reclaimed and dropped then.
///
/// [`get`]: Tree::get
/// [`successor`]: Tree::successor
/// [`predecessor`]: Tree::predecessor
/// [`lower_bound`]: Tree::lower_bound
pub struct Tree<T: Linked + ?Sized> {
	pub(crate) root: Link<T>,
	pub(crate) len: usize,
}

unsafe impl<T: Linked + ?Sized + Send> Send for Tree<T> {}
unsafe impl<T: Linked + ?Sized + Sync> Sync for Tree<T> {}

impl<T: Linked + ?Sized> Default for Tree<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Linked + ?Sized> Drop for Tree<T> {
	fn drop(&mut self) {
		self.clear();
	}
}

impl<T: Linked + ?Sized> Tree<T> {
	/// Makes a new, empty `Tree`.
	pub const fn new() -> Self {
		Tree {
			root: None,
			len: 0,
		}
	}

	/// Returns the number of nodes in the tree.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Inserts a node into the tree.
	///
	/// If the tree did not hold a node with this key, `None` is returned.
	///
	/// If it did, the new node takes the old one's place in the structure and
	/// the displaced node's handle is returned, its links reset to the
	/// detached state. The caller typically wants to reclaim its storage.
	///
	/// The node behind `item` must be detached. Handing the tree a handle to
	/// a node that is still linked anywhere is a contract violation and
	/// undefined behavior; debug builds catch it with an assertion.
	pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
		unsafe {
			let item = T::into_ptr(item);
			debug_assert!(
				!T::links(item).as_ref().is_linked(),
				"inserted node is already linked"
			);

			let mut replaced = None;
			self.root = Some(Self::insert_at(self.root, item, &mut replaced));

			match replaced {
				Some(old) => {
					T::links(old).as_mut().unlink();
					Some(T::from_ptr(old))
				}
				None => {
					self.len += 1;
					None
				}
			}
		}
	}

	/// Removes the node with this key from the tree and returns its handle,
	/// links reset to the detached state, or `None` if no node matches.
	pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
	where
		T::Key: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		let mut deleted = None;
		self.root = unsafe { Self::remove_at(self.root, key, &mut deleted) };
		self.detach(deleted)
	}

	/// Removes the node with the smallest key and returns its handle, or
	/// `None` if the tree is empty.
	pub fn pop_first(&mut self) -> Option<T::Handle> {
		let mut deleted = None;
		self.root = unsafe { Self::pop_first_at(self.root, &mut deleted) };
		self.detach(deleted)
	}

	/// Removes the node with the largest key and returns its handle, or
	/// `None` if the tree is empty.
	pub fn pop_last(&mut self) -> Option<T::Handle> {
		let mut deleted = None;
		self.root = unsafe { Self::pop_last_at(self.root, &mut deleted) };
		self.detach(deleted)
	}

	/// Returns a reference to the node with this key, or `None`.
	pub fn get<Q>(&self, key: &Q) -> Option<&T>
	where
		T::Key: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		let mut node = self.root;
		while let Some(cur) = node {
			unsafe {
				match key.cmp(cur.as_ref().key().borrow()) {
					Ordering::Less => node = T::links(cur).as_ref().left(),
					Ordering::Greater => node = T::links(cur).as_ref().right(),
					Ordering::Equal => return Some(cur.as_ref()),
				}
			}
		}
		None
	}

	/// Returns `true` if a node with this key is in the tree.
	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		T::Key: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		self.get(key).is_some()
	}

	/// Returns a reference to the node with the smallest key, or `None` if
	/// the tree is empty.
	pub fn first(&self) -> Option<&T> {
		self.first_ptr().map(|node| unsafe { node.as_ref() })
	}

	/// Returns a reference to the node with the largest key, or `None` if
	/// the tree is empty.
	pub fn last(&self) -> Option<&T> {
		let mut node = self.root?;
		unsafe {
			while let Some(right) = T::links(node).as_ref().right() {
				node = right;
			}
			Some(node.as_ref())
		}
	}

	/// Detaches every node and drops its handle, leaving the tree empty.
	pub fn clear(&mut self) {
		// The stack never holds more than one pending node per tree level,
		// so the inline capacity covers any realistically sized tree.
		let mut stack: SmallVec<[NonNull<T>; 32]> = SmallVec::new();
		stack.extend(self.root.take());

		while let Some(node) = stack.pop() {
			unsafe {
				let links = T::links(node).as_mut();
				stack.extend(links.left());
				stack.extend(links.right());
				links.unlink();
				drop(T::from_ptr(node));
			}
		}

		self.len = 0;
	}

	/// Walks the whole tree and checks the AA structural rules, the element
	/// count, and the height bound.
	///
	/// Returns the first violation found. See [`error::Error`] for the rule
	/// set.
	pub fn validate(&self) -> error::Result<()> {
		let Some(root) = self.root else {
			return if self.len == 0 {
				Ok(())
			} else {
				Err(error::Error::CountMismatch {
					expected: self.len,
					found: 0,
				})
			};
		};

		let mut count = 0;
		let mut last = None;
		let height = unsafe { Self::validate_at(root, None, &mut count, &mut last)? };

		if count != self.len {
			return Err(error::Error::CountMismatch {
				expected: self.len,
				found: count,
			});
		}

		let bound = 2 * (self.len + 1).next_power_of_two().trailing_zeros() as usize;
		if height > bound {
			return Err(error::Error::HeightBound {
				height,
				bound,
				len: self.len,
			});
		}

		Ok(())
	}

	/// Panics if [`validate`](Tree::validate) reports a violation.
	///
	/// Intended for tests, after every mutation under scrutiny.
	pub fn assert_invariants(&self) {
		if let Err(err) = self.validate() {
			panic!("tree invariant violated: {err}");
		}
	}

	pub(crate) fn first_ptr(&self) -> Link<T> {
		let mut node = self.root?;
		unsafe {
			while let Some(left) = T::links(node).as_ref().left() {
				node = left;
			}
		}
		Some(node)
	}

	/// Resets a removed node's links and rebuilds its handle.
	fn detach(&mut self, deleted: Link<T>) -> Option<T::Handle> {
		let node = deleted?;
		self.len -= 1;
		unsafe {
			T::links(node).as_mut().unlink();
			Some(T::from_ptr(node))
		}
	}

	/// Right-rotates away a horizontal left link, if present.
	///
	/// # Safety
	///
	/// `node` and everything reachable from it must be valid tree nodes,
	/// exclusively borrowed by the caller.
	unsafe fn skew(node: NonNull<T>) -> NonNull<T> {
		unsafe {
			if let Some(left) = T::links(node).as_ref().left() {
				if T::links(left).as_ref().level() == T::links(node).as_ref().level() {
					T::links(node).as_mut().set_left(T::links(left).as_ref().right());
					T::links(left).as_mut().set_right(Some(node));
					return left;
				}
			}
		}
		node
	}

	/// Left-rotates and promotes away two consecutive horizontal right
	/// links, if present.
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn split(node: NonNull<T>) -> NonNull<T> {
		unsafe {
			if let Some(right) = T::links(node).as_ref().right() {
				if let Some(right_right) = T::links(right).as_ref().right() {
					if T::links(right_right).as_ref().level() == T::links(node).as_ref().level() {
						T::links(node).as_mut().set_right(T::links(right).as_ref().left());
						T::links(right).as_mut().set_left(Some(node));
						let level = T::links(right).as_ref().level();
						T::links(right).as_mut().set_level(level + 1);
						return right;
					}
				}
			}
		}
		node
	}

	/// Recursive insertion rewrite. Installs `item` at its leaf position (or
	/// in the slot of an equal-keyed node, recorded in `replaced`) and
	/// rebalances with skew + split on the way back up, returning the new
	/// subtree root.
	///
	/// # Safety
	///
	/// `item` must be detached; the subtree under `node` must be exclusively
	/// borrowed by the caller.
	unsafe fn insert_at(node: Link<T>, item: NonNull<T>, replaced: &mut Link<T>) -> NonNull<T> {
		unsafe {
			let node = match node {
				None => {
					let links = T::links(item).as_mut();
					links.set_left(None);
					links.set_right(None);
					links.set_level(1);
					item
				}
				Some(node) => match item.as_ref().key().cmp(node.as_ref().key()) {
					Ordering::Less => {
						let left = Self::insert_at(T::links(node).as_ref().left(), item, replaced);
						T::links(node).as_mut().set_left(Some(left));
						node
					}
					Ordering::Greater => {
						let right = Self::insert_at(T::links(node).as_ref().right(), item, replaced);
						T::links(node).as_mut().set_right(Some(right));
						node
					}
					Ordering::Equal => {
						// Equal key: `item` inherits the slot wholesale.
						*replaced = Some(node);
						let (left, right, level) = {
							let links = T::links(node).as_ref();
							(links.left(), links.right(), links.level())
						};
						let links = T::links(item).as_mut();
						links.set_left(left);
						links.set_right(right);
						links.set_level(level);
						item
					}
				},
			};
			Self::split(Self::skew(node))
		}
	}

	/// Drops the node's level to one above its lower child after a removal
	/// below it, clamping a right child that would be left above the new
	/// level.
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn decrease_level(node: NonNull<T>) {
		unsafe {
			let (left, right) = {
				let links = T::links(node).as_ref();
				(links.left(), links.right())
			};
			if left.is_none() && right.is_none() {
				return;
			}

			let level = match (left, right) {
				(Some(left), Some(right)) => {
					let left_level = T::links(left).as_ref().level();
					let right_level = T::links(right).as_ref().level();
					left_level.min(right_level) + 1
				}
				_ => 1,
			};

			if level < T::links(node).as_ref().level() {
				T::links(node).as_mut().set_level(level);
				if let Some(right) = right {
					if level < T::links(right).as_ref().level() {
						T::links(right).as_mut().set_level(level);
					}
				}
			}
		}
	}

	/// Restores the AA rules at `node` after a removal somewhere below it.
	///
	/// The sequence (decrease level, then three skews down the right spine,
	/// then two splits) is fixed; reordering it leaves invariant violations
	/// behind.
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn fixup_remove(node: NonNull<T>) -> NonNull<T> {
		unsafe {
			Self::decrease_level(node);
			let node = Self::skew(node);
			if let Some(right) = T::links(node).as_ref().right() {
				let right = Self::skew(right);
				T::links(node).as_mut().set_right(Some(right));
				if let Some(right_right) = T::links(right).as_ref().right() {
					T::links(right).as_mut().set_right(Some(Self::skew(right_right)));
				}
			}
			let node = Self::split(node);
			if let Some(right) = T::links(node).as_ref().right() {
				T::links(node).as_mut().set_right(Some(Self::split(right)));
			}
			node
		}
	}

	/// Recursive leftmost removal. Records the detached minimum in `deleted`
	/// and returns the new subtree root.
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn pop_first_at(node: Link<T>, deleted: &mut Link<T>) -> Link<T> {
		unsafe {
			let node = node?;
			match T::links(node).as_ref().left() {
				None => {
					// The minimum: splice in its right child (a lone
					// horizontal link, or nothing).
					*deleted = Some(node);
					T::links(node).as_ref().right()
				}
				Some(left) => {
					let left = Self::pop_first_at(Some(left), deleted);
					T::links(node).as_mut().set_left(left);
					Some(Self::fixup_remove(node))
				}
			}
		}
	}

	/// Recursive rightmost removal, the mirror of
	/// [`pop_first_at`](Tree::pop_first_at).
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn pop_last_at(node: Link<T>, deleted: &mut Link<T>) -> Link<T> {
		unsafe {
			let node = node?;
			match T::links(node).as_ref().right() {
				None => {
					*deleted = Some(node);
					T::links(node).as_ref().left()
				}
				Some(right) => {
					let right = Self::pop_last_at(Some(right), deleted);
					T::links(node).as_mut().set_right(right);
					Some(Self::fixup_remove(node))
				}
			}
		}
	}

	/// Recursive removal by key. A matching leaf unlinks in place; a
	/// matching interior node is replaced by its in-order neighbour, pulled
	/// out of the taller-preferred subtree so the caller gets back exactly
	/// the record it asked for. Fixup runs at every node on the unwound
	/// path.
	///
	/// # Safety
	///
	/// Same contract as [`Tree::skew`].
	unsafe fn remove_at<Q>(node: Link<T>, key: &Q, deleted: &mut Link<T>) -> Link<T>
	where
		T::Key: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		unsafe {
			let node = node?;
			let node = match key.cmp(node.as_ref().key().borrow()) {
				Ordering::Less => {
					let left = Self::remove_at(T::links(node).as_ref().left(), key, deleted);
					T::links(node).as_mut().set_left(left);
					node
				}
				Ordering::Greater => {
					let right = Self::remove_at(T::links(node).as_ref().right(), key, deleted);
					T::links(node).as_mut().set_right(right);
					node
				}
				Ordering::Equal => {
					*deleted = Some(node);
					let (left, right) = {
						let links = T::links(node).as_ref();
						(links.left(), links.right())
					};
					if left.is_none() && right.is_none() {
						return None;
					}

					// Pull the in-order neighbour out of a subtree and
					// install it in the vacated slot.
					let mut heir = None;
					if left.is_none() {
						let right = Self::pop_first_at(right, &mut heir);
						T::links(node).as_mut().set_right(right);
					} else {
						let left = Self::pop_last_at(left, &mut heir);
						T::links(node).as_mut().set_left(left);
					}
					let heir = heir.expect("nonempty subtree yields a node");

					let (left, right, level) = {
						let links = T::links(node).as_ref();
						(links.left(), links.right(), links.level())
					};
					let links = T::links(heir).as_mut();
					links.set_left(left);
					links.set_right(right);
					links.set_level(level);
					heir
				}
			};
			Some(Self::fixup_remove(node))
		}
	}

	/// Recursive validation walk. Returns the subtree height.
	///
	/// Ordering is only checked from the second visited node onward, against
	/// the previously visited one.
	///
	/// # Safety
	///
	/// The subtree under `node` must consist of valid, live nodes.
	unsafe fn validate_at(
		node: NonNull<T>,
		parent_level: Option<u32>,
		count: &mut usize,
		last: &mut Link<T>,
	) -> error::Result<usize> {
		unsafe {
			let (left, right, level) = {
				let links = T::links(node).as_ref();
				(links.left(), links.right(), links.level())
			};

			if left.is_none() && right.is_none() && level != 1 {
				return Err(error::Error::LeafLevel { level });
			}
			if let Some(left) = left {
				let child = T::links(left).as_ref().level();
				if child + 1 != level {
					return Err(error::Error::LeftChildLevel { parent: level, child });
				}
			}
			if let Some(right) = right {
				let child = T::links(right).as_ref().level();
				if child != level && child + 1 != level {
					return Err(error::Error::RightChildLevel { parent: level, child });
				}
				if let Some(grandparent) = parent_level {
					if child >= grandparent {
						return Err(error::Error::RightGrandchildLevel {
							grandparent,
							grandchild: child,
						});
					}
				}
			}
			if level > 1 && (left.is_none() || right.is_none()) {
				return Err(error::Error::MissingChild { level });
			}

			let left_height = match left {
				Some(left) => Self::validate_at(left, Some(level), count, last)?,
				None => 0,
			};

			if let Some(prev) = *last {
				if prev.as_ref().key() >= node.as_ref().key() {
					return Err(error::Error::OutOfOrder);
				}
			}
			*last = Some(node);
			*count += 1;

			let right_height = match right {
				Some(right) => Self::validate_at(right, Some(level), count, last)?,
				None => 0,
			};

			Ok(1 + left_height.max(right_height))
		}
	}
}

impl<T> fmt::Debug for Tree<T>
where
	T: Linked + ?Sized,
	T::Key: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter().map(T::key)).finish()
	}
}
