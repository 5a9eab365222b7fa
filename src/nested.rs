//! Nested array values and their recursive marshaling.
//!
//! This module defines [`NestedArray`], the trait connecting nested Rust
//! values to flat row-major buffers.
//!
//! ## Nesting model
//! - Scalar primitives (via [`Scalar`]) are depth-0 leaves.
//! - `[T; N]` adds a *static* axis of length `N` over `T`.
//! - `Vec<T>` adds a *dynamic* axis over `T`, sized per instance.
//!
//! Any mix nests to arbitrary depth: `Vec<[[f32; 2]; 3]>` is a depth-3
//! value with one dynamic and two static axes.
//!
//! ## Non-ragged invariant
//! Sibling sub-arrays at the same level must agree in shape at every deeper
//! level. [`NestedArray::is_ragged`] detects violations; the cast entry
//! point rejects ragged values before allocating anything.
//!
//! ## Copy cursors
//! `write_into`/`read_from` thread a single shared cursor through the
//! recursion. The innermost all-scalar level moves whole runs with one
//! block copy; deeper levels recurse per element. After a full traversal
//! the cursor has advanced by exactly `product(shape)` elements.

use bytes::BytesMut;

use crate::{
    dtype::Scalar,
    shape::{AxesVec, AxisLen, ShapeVec},
};

/// Shared output cursor for the cast direction.
///
/// Appends native scalar bytes to a growing buffer and counts the elements
/// written.
pub struct WriteCursor<'a, S: Scalar> {
    buf: &'a mut BytesMut,
    elems: usize,
    _marker: std::marker::PhantomData<S>,
}

impl<'a, S: Scalar> WriteCursor<'a, S> {
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self {
            buf,
            elems: 0,
            _marker: std::marker::PhantomData,
        }
    }

    /// Append a contiguous run of scalars as native bytes.
    pub fn put_run(&mut self, run: &[S]) {
        // Safety: any initialized Copy scalar slice can be read as raw bytes.
        let bytes = unsafe {
            std::slice::from_raw_parts(run.as_ptr() as *const u8, std::mem::size_of_val(run))
        };
        self.buf.extend_from_slice(bytes);
        self.elems += run.len();
    }

    pub fn put_one(&mut self, v: S) {
        self.put_run(std::slice::from_ref(&v));
    }

    /// Elements written so far.
    pub fn elems(&self) -> usize {
        self.elems
    }
}

/// Shared input cursor for the load direction.
pub struct ReadCursor<'a, S: Scalar> {
    src: &'a [S],
    pos: usize,
}

impl<'a, S: Scalar> ReadCursor<'a, S> {
    pub fn new(src: &'a [S]) -> Self {
        Self { src, pos: 0 }
    }

    /// Take the next `n` scalars. Panics if fewer remain; callers validate
    /// total counts before traversal.
    pub fn take_run(&mut self, n: usize) -> &'a [S] {
        let run = &self.src[self.pos..self.pos + n];
        self.pos += n;
        run
    }

    pub fn take_one(&mut self) -> S {
        self.take_run(1)[0]
    }

    pub fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }
}

/// A value marshalable to and from a flat row-major scalar buffer.
///
/// Implemented for scalar leaves, `[T; N]`, and `Vec<T>`; see the module
/// docs for the nesting model.
pub trait NestedArray {
    /// The scalar element type at the innermost level.
    type Leaf: Scalar;

    /// Number of nesting levels. Scalars are 0; marshalable values are >= 1.
    const DEPTH: usize;

    /// Append this type's per-axis kinds, outermost first.
    fn axes(out: &mut AxesVec);

    /// Append this value's per-axis lengths, outermost first.
    ///
    /// Deeper axes are read from the first child only; the non-ragged
    /// invariant guarantees siblings agree. From the first zero-length axis
    /// down, all remaining axes are reported as 0.
    fn record_shape(&self, out: &mut ShapeVec);

    /// True iff sibling sub-arrays disagree in shape at any depth.
    fn is_ragged(&self) -> bool;

    /// Resize dynamic axes to `shape`, which must have length `DEPTH` and
    /// match every static axis (validated by the load entry point).
    fn resize_to(&mut self, shape: &[usize]);

    /// A value with every dynamic axis at length 0.
    fn empty() -> Self;

    /// Write every scalar in row-major order, advancing the shared cursor.
    fn write_into(&self, out: &mut WriteCursor<'_, Self::Leaf>);

    /// Populate every scalar in row-major order from the shared cursor.
    fn read_from(&mut self, src: &mut ReadCursor<'_, Self::Leaf>);

    /// For scalar leaves, view a run of `Self` as a run of scalars.
    ///
    /// Containers return `None`. The `Some` case marks the innermost
    /// all-scalar level and enables the block-copy fast path.
    fn leaf_run(run: &[Self]) -> Option<&[Self::Leaf]>
    where
        Self: Sized,
    {
        let _ = run;
        None
    }

    fn leaf_run_mut(run: &mut [Self]) -> Option<&mut [Self::Leaf]>
    where
        Self: Sized,
    {
        let _ = run;
        None
    }
}

macro_rules! impl_leaf_nested {
    ($($ty:ty),* $(,)?) => {$(
        impl NestedArray for $ty {
            type Leaf = $ty;
            const DEPTH: usize = 0;

            fn axes(_out: &mut AxesVec) {}

            fn record_shape(&self, _out: &mut ShapeVec) {}

            fn is_ragged(&self) -> bool {
                false
            }

            fn resize_to(&mut self, shape: &[usize]) {
                debug_assert!(shape.is_empty());
            }

            fn empty() -> Self {
                Self::default()
            }

            fn write_into(&self, out: &mut WriteCursor<'_, $ty>) {
                out.put_one(*self);
            }

            fn read_from(&mut self, src: &mut ReadCursor<'_, $ty>) {
                *self = src.take_one();
            }

            fn leaf_run(run: &[Self]) -> Option<&[$ty]> {
                Some(run)
            }

            fn leaf_run_mut(run: &mut [Self]) -> Option<&mut [$ty]> {
                Some(run)
            }
        }
    )*};
}

impl_leaf_nested!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

fn record_tail_shape<T: NestedArray>(children: &[T], out: &mut ShapeVec) {
    match children.first() {
        Some(first) => first.record_shape(out),
        None => out.extend(std::iter::repeat(0).take(T::DEPTH)),
    }
}

fn ragged_among<T: NestedArray>(children: &[T]) -> bool {
    let Some(first) = children.first() else {
        return false;
    };
    let mut reference = ShapeVec::new();
    first.record_shape(&mut reference);

    children.iter().any(|child| {
        let mut shape = ShapeVec::new();
        child.record_shape(&mut shape);
        shape != reference || child.is_ragged()
    })
}

fn write_children<T: NestedArray>(children: &[T], out: &mut WriteCursor<'_, T::Leaf>) {
    if let Some(run) = T::leaf_run(children) {
        out.put_run(run);
    } else {
        for child in children {
            child.write_into(out);
        }
    }
}

fn read_children<T: NestedArray>(children: &mut [T], src: &mut ReadCursor<'_, T::Leaf>) {
    if let Some(run) = T::leaf_run_mut(children) {
        let n = run.len();
        run.copy_from_slice(src.take_run(n));
    } else {
        for child in children.iter_mut() {
            child.read_from(src);
        }
    }
}

impl<T: NestedArray> NestedArray for Vec<T> {
    type Leaf = T::Leaf;
    const DEPTH: usize = T::DEPTH + 1;

    fn axes(out: &mut AxesVec) {
        out.push(AxisLen::Dynamic);
        T::axes(out);
    }

    fn record_shape(&self, out: &mut ShapeVec) {
        out.push(self.len());
        record_tail_shape(self, out);
    }

    fn is_ragged(&self) -> bool {
        ragged_among(self)
    }

    fn resize_to(&mut self, shape: &[usize]) {
        let (&len, rest) = match shape.split_first() {
            Some(v) => v,
            None => panic!("shape shorter than nesting depth"),
        };
        self.resize_with(len, T::empty);
        for child in self.iter_mut() {
            child.resize_to(rest);
        }
    }

    fn empty() -> Self {
        Vec::new()
    }

    fn write_into(&self, out: &mut WriteCursor<'_, Self::Leaf>) {
        write_children(self, out);
    }

    fn read_from(&mut self, src: &mut ReadCursor<'_, Self::Leaf>) {
        read_children(self, src);
    }
}

impl<T: NestedArray, const N: usize> NestedArray for [T; N] {
    type Leaf = T::Leaf;
    const DEPTH: usize = T::DEPTH + 1;

    fn axes(out: &mut AxesVec) {
        out.push(AxisLen::Fixed(N));
        T::axes(out);
    }

    fn record_shape(&self, out: &mut ShapeVec) {
        out.push(N);
        record_tail_shape(self, out);
    }

    fn is_ragged(&self) -> bool {
        ragged_among(self)
    }

    fn resize_to(&mut self, shape: &[usize]) {
        let (&len, rest) = match shape.split_first() {
            Some(v) => v,
            None => panic!("shape shorter than nesting depth"),
        };
        debug_assert_eq!(len, N);
        for child in self.iter_mut() {
            child.resize_to(rest);
        }
    }

    fn empty() -> Self {
        std::array::from_fn(|_| T::empty())
    }

    fn write_into(&self, out: &mut WriteCursor<'_, Self::Leaf>) {
        write_children(self, out);
    }

    fn read_from(&mut self, src: &mut ReadCursor<'_, Self::Leaf>) {
        read_children(self, src);
    }
}
