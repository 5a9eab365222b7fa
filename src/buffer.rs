//! Flat row-major interchange buffers.
//!
//! [`InterchangeBuffer`] is the external array-interchange object: a
//! contiguous byte payload plus per-axis shape, per-axis byte strides, and a
//! runtime [`ScalarType`] tag. Strides always follow the row-major
//! convention; non-contiguous layouts are not representable.
//!
//! ## Construction
//! - [`InterchangeBuffer::try_new`] validates bytes against shape and dtype
//!   (checked element count, exact byte length).
//! - [`InterchangeBuffer::from_ndarray`] copies a standard-layout `ndarray`
//!   into a fresh buffer.
//! - The cast entry point builds buffers internally after writing exactly
//!   `product(shape)` scalars.
//!
//! ## Forced conversion
//! [`InterchangeBuffer::to_scalars`] materializes the payload as a run of a
//! requested scalar type:
//! - same dtype with aligned backing bytes is a zero-copy borrow;
//! - same dtype with unaligned backing bytes (e.g. a sliced `Bytes`) is an
//!   exact byte copy;
//! - differing dtypes convert element-wise through `f64`.

use std::borrow::Cow;

use bytes::Bytes;
use ndarray::IxDyn;

use crate::{
    dtype::{Scalar, ScalarType},
    error::{BufferError, ConversionError},
    shape::{num_elements, row_major_strides, ShapeVec, StrideVec},
};

/// A contiguous, row-major, homogeneously typed flat buffer.
#[derive(Debug, Clone)]
pub struct InterchangeBuffer {
    data: Bytes,
    shape: ShapeVec,
    strides: StrideVec,
    dtype: ScalarType,
}

impl InterchangeBuffer {
    /// Create a validated buffer over `data`.
    ///
    /// Row-major strides are computed from `shape` and `dtype`.
    ///
    /// # Errors
    /// Returns [`BufferError`] if the element count implied by `shape`
    /// overflows or `data.len()` is not exactly `product(shape) * dtype.size()`.
    pub fn try_new(data: Bytes, shape: ShapeVec, dtype: ScalarType) -> Result<Self, BufferError> {
        let n = num_elements(&shape)?;
        let expected = n
            .checked_mul(dtype.size())
            .ok_or(BufferError::ShapeOverflow)?;
        if data.len() != expected {
            return Err(BufferError::WrongByteLen {
                expected,
                actual: data.len(),
            });
        }
        // 0/1 encoding is load-bearing: `to_scalars` reinterprets the
        // payload as `&[bool]` on the same-dtype path.
        if dtype == ScalarType::Bool && data.iter().any(|&b| b > 1) {
            return Err(BufferError::InvalidBoolByte);
        }
        let strides = row_major_strides(&shape, dtype.size());
        Ok(Self {
            data,
            shape,
            strides,
            dtype,
        })
    }

    /// Construct without validation. The cast entry point upholds the byte
    /// length and stride invariants itself.
    pub(crate) fn from_raw(
        data: Bytes,
        shape: ShapeVec,
        strides: StrideVec,
        dtype: ScalarType,
    ) -> Self {
        Self {
            data,
            shape,
            strides,
            dtype,
        }
    }

    /// Copy a standard-layout (contiguous, row-major) `ndarray` into a
    /// fresh buffer. Non-standard layouts (e.g. a transpose view) are
    /// rejected.
    pub fn from_ndarray<S, Src>(array: &ndarray::ArrayBase<Src, IxDyn>) -> Result<Self, BufferError>
    where
        S: Scalar,
        Src: ndarray::Data<Elem = S>,
    {
        if !array.is_standard_layout() {
            return Err(BufferError::NonContiguous);
        }
        let elems = array
            .as_slice_memory_order()
            .ok_or(BufferError::NonContiguous)?;

        let shape: ShapeVec = array.shape().iter().copied().collect();
        let strides = row_major_strides(&shape, std::mem::size_of::<S>());

        // Safety: any initialized Copy scalar slice can be read as raw bytes.
        let raw = unsafe {
            std::slice::from_raw_parts(elems.as_ptr() as *const u8, std::mem::size_of_val(elems))
        };

        Ok(Self {
            data: Bytes::copy_from_slice(raw),
            shape,
            strides,
            dtype: S::TYPE,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Per-axis extents, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Per-axis byte strides, outermost first.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub const fn dtype(&self) -> ScalarType {
        self.dtype
    }

    /// The raw payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total number of scalar elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release ownership of the parts to the caller.
    pub fn into_parts(self) -> (Bytes, ShapeVec, StrideVec, ScalarType) {
        (self.data, self.shape, self.strides, self.dtype)
    }

    /// Materialize the payload as a contiguous run of `S`.
    ///
    /// See the module docs for the borrow/copy/convert cases.
    ///
    /// # Errors
    /// Returns [`ConversionError::WrongByteLen`] if the payload length is
    /// inconsistent with the buffer's shape and dtype.
    pub fn to_scalars<S: Scalar>(&self) -> Result<Cow<'_, [S]>, ConversionError> {
        let n = self.len();
        let expected = n * self.dtype.size();
        if self.data.len() != expected {
            return Err(ConversionError::WrongByteLen {
                dtype: self.dtype,
                expected,
                actual: self.data.len(),
            });
        }

        if self.dtype == S::TYPE {
            let ptr = self.data.as_ptr();
            if (ptr as usize) % std::mem::align_of::<S>() == 0 {
                // Safety: dtype and byte length checked above, pointer aligned.
                let run = unsafe { std::slice::from_raw_parts(ptr as *const S, n) };
                return Ok(Cow::Borrowed(run));
            }

            // Unaligned backing bytes: copy verbatim so 64-bit integers
            // survive exactly.
            let mut out = vec![S::default(); n];
            // Safety: `out`'s byte span is exactly `expected` bytes long.
            unsafe {
                std::ptr::copy_nonoverlapping(ptr, out.as_mut_ptr() as *mut u8, expected);
            }
            return Ok(Cow::Owned(out));
        }

        Ok(Cow::Owned(convert_run::<S>(self.dtype, &self.data)))
    }

    /// Materialize an owned `ndarray` of `S`, force-converting if needed.
    pub fn to_ndarray<S: Scalar>(&self) -> Result<ndarray::ArrayD<S>, ConversionError> {
        let scalars = self.to_scalars::<S>()?.into_owned();
        match ndarray::ArrayD::from_shape_vec(IxDyn(&self.shape), scalars) {
            Ok(arr) => Ok(arr),
            Err(e) => panic!("invalid ndarray shape for validated buffer: {e}"),
        }
    }
}

fn convert_run<S: Scalar>(dtype: ScalarType, bytes: &[u8]) -> Vec<S> {
    macro_rules! widen {
        ($ty:ty) => {
            bytes
                .chunks_exact(std::mem::size_of::<$ty>())
                .map(|chunk| <$ty>::from_ne_bytes(chunk.try_into().unwrap()))
                .map(|v| S::from_f64(v.to_f64()))
                .collect()
        };
    }

    match dtype {
        ScalarType::I8 => widen!(i8),
        ScalarType::I16 => widen!(i16),
        ScalarType::I32 => widen!(i32),
        ScalarType::I64 => widen!(i64),
        ScalarType::U8 => widen!(u8),
        ScalarType::U16 => widen!(u16),
        ScalarType::U32 => widen!(u32),
        ScalarType::U64 => widen!(u64),
        ScalarType::F32 => widen!(f32),
        ScalarType::F64 => widen!(f64),
        ScalarType::Bool => bytes
            .iter()
            .map(|&b| S::from_f64(if b != 0 { 1.0 } else { 0.0 }))
            .collect(),
    }
}
