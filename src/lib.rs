//! Marshal nested numeric arrays to and from flat, contiguous, row-major
//! interchange buffers.
//!
//! Nested values mix statically sized axes (`[T; N]`) with dynamically
//! sized axes (`Vec<T>`) to arbitrary depth over fixed-width numeric
//! scalars. [`cast`] copies such a value into a fresh [`InterchangeBuffer`]
//! (bytes + shape + row-major strides + scalar tag); [`load`] resizes a
//! value to a buffer's shape and copies the payload back, force-converting
//! the scalar type if needed.
//!
//! Ragged values (sibling sub-arrays of differing lengths) are rejected
//! before any buffer is allocated.
//!
//! ```
//! use ravel::{cast, load};
//!
//! let v = vec![[1.0f32, 2.0], [3.0, 4.0]];
//! let buf = cast(&v).unwrap();
//! assert_eq!(buf.shape(), &[2, 2]);
//!
//! let mut back: Vec<[f32; 2]> = Vec::new();
//! load(&mut back, &buf).unwrap();
//! assert_eq!(back, v);
//! ```

pub mod buffer;
pub mod descr;
pub mod dtype;
pub mod error;
pub mod marshal;
pub mod nested;
pub mod shape;

pub use buffer::InterchangeBuffer;
pub use dtype::{Scalar, ScalarType};
pub use error::{BufferError, ConversionError, LoadError, RaggedArrayError};
pub use marshal::{cast, load};
pub use nested::NestedArray;
