//! Load/cast entry points.
//!
//! `cast` marshals a nested value into a freshly allocated
//! [`InterchangeBuffer`]; `load` populates a nested value from one. Both
//! run to completion on the calling thread and share no state across calls.

use bytes::BytesMut;

use crate::{
    buffer::InterchangeBuffer,
    dtype::Scalar,
    error::{LoadError, RaggedArrayError},
    nested::{NestedArray, ReadCursor, WriteCursor},
    shape::{row_major_strides, AxesVec, AxisLen, ShapeVec},
};

/// Marshal a nested value into a new row-major buffer.
///
/// Ownership of the buffer moves to the caller.
///
/// # Errors
/// Returns [`RaggedArrayError`] if sub-arrays disagree in shape at any
/// depth. The check runs before any allocation; no partial buffer is ever
/// produced.
pub fn cast<T: NestedArray>(value: &T) -> Result<InterchangeBuffer, RaggedArrayError> {
    if value.is_ragged() {
        return Err(RaggedArrayError);
    }

    let mut shape = ShapeVec::new();
    value.record_shape(&mut shape);
    let elem_size = std::mem::size_of::<T::Leaf>();
    let strides = row_major_strides(&shape, elem_size);

    // The value is live in memory, so its element count cannot overflow.
    let total: usize = shape.iter().product();
    let mut buf = BytesMut::with_capacity(total * elem_size);
    let mut cursor = WriteCursor::new(&mut buf);
    value.write_into(&mut cursor);
    debug_assert_eq!(cursor.elems(), total);

    Ok(InterchangeBuffer::from_raw(
        buf.freeze(),
        shape,
        strides,
        T::Leaf::TYPE,
    ))
}

/// Populate a nested value from a flat buffer.
///
/// The buffer's dimensionality must equal the target's nesting depth and
/// every static axis must match the buffer's extent on that axis. The
/// payload is force-converted to the target scalar type if the dtypes
/// differ. Dynamic axes are resized to the buffer's shape before copying.
///
/// Axes below the first zero-length axis carry no elements and are not
/// checked against static lengths, matching the degenerate shapes that
/// `cast` reports for empty values.
///
/// # Errors
/// All [`LoadError`] variants are recoverable; on failure the destination
/// is left in its prior state.
pub fn load<T: NestedArray>(value: &mut T, src: &InterchangeBuffer) -> Result<(), LoadError> {
    if src.ndim() != T::DEPTH {
        return Err(LoadError::ShapeMismatch {
            expected: T::DEPTH,
            actual: src.ndim(),
        });
    }

    let mut axes = AxesVec::new();
    T::axes(&mut axes);
    let mut degenerate = false;
    for (axis, (kind, &dim)) in axes.iter().zip(src.shape()).enumerate() {
        if !degenerate {
            if let AxisLen::Fixed(expected) = *kind {
                if expected != dim {
                    return Err(LoadError::StaticAxisMismatch {
                        axis,
                        expected,
                        actual: dim,
                    });
                }
            }
        }
        degenerate = degenerate || dim == 0;
    }

    let scalars = src.to_scalars::<T::Leaf>()?;
    value.resize_to(src.shape());
    let mut cursor = ReadCursor::new(&scalars);
    value.read_from(&mut cursor);
    debug_assert_eq!(cursor.remaining(), 0);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::ScalarType;
    use crate::error::ConversionError;
    use bytes::Bytes;
    use smallvec::smallvec;

    #[test]
    fn cast_reports_shape_strides_and_dtype() {
        let v = vec![[1.0f64, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let buf = cast(&v).unwrap();

        assert_eq!(buf.shape(), &[3, 2]);
        assert_eq!(buf.strides(), &[16, 8]);
        assert_eq!(buf.dtype(), ScalarType::F64);
        assert_eq!(buf.data().len(), 48);
    }

    #[test]
    fn cast_rejects_ragged_before_allocating() {
        let v = vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0]];
        assert!(cast(&v).is_err());
    }

    #[test]
    fn cast_of_empty_outer_axis_succeeds() {
        let v: Vec<Vec<f32>> = Vec::new();
        let buf = cast(&v).unwrap();
        assert_eq!(buf.shape(), &[0, 0]);
        assert!(buf.is_empty());
        assert!(buf.data().is_empty());
    }

    #[test]
    fn load_rejects_depth_mismatch() {
        let buf = InterchangeBuffer::try_new(
            Bytes::from(vec![0u8; 32]),
            smallvec![2, 2, 2],
            ScalarType::F32,
        )
        .unwrap();

        let mut target: Vec<Vec<f32>> = Vec::new();
        let err = load(&mut target, &buf).unwrap_err();
        match err {
            LoadError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn load_rejects_static_axis_mismatch() {
        let buf = InterchangeBuffer::try_new(
            Bytes::from(vec![0u8; 32]),
            smallvec![2, 4],
            ScalarType::F32,
        )
        .unwrap();

        let mut target: Vec<[f32; 3]> = Vec::new();
        let err = load(&mut target, &buf).unwrap_err();
        match err {
            LoadError::StaticAxisMismatch {
                axis,
                expected,
                actual,
            } => {
                assert_eq!(axis, 1);
                assert_eq!(expected, 3);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn load_skips_static_check_below_zero_axis() {
        // A degenerate [0, 0] buffer loads into Vec<[f32; 3]>: there are no
        // elements, so the fixed inner axis is unconstrained.
        let buf =
            InterchangeBuffer::try_new(Bytes::new(), smallvec![0, 0], ScalarType::F32).unwrap();

        let mut target: Vec<[f32; 3]> = vec![[9.0; 3]];
        load(&mut target, &buf).unwrap();
        assert!(target.is_empty());
    }

    #[test]
    fn load_force_converts_scalar_types() {
        let mut payload = Vec::new();
        for v in [1.0f64, 2.5, -3.0] {
            payload.extend_from_slice(&v.to_ne_bytes());
        }
        let buf =
            InterchangeBuffer::try_new(Bytes::from(payload), smallvec![3], ScalarType::F64)
                .unwrap();

        let mut target: Vec<f32> = Vec::new();
        load(&mut target, &buf).unwrap();
        assert_eq!(target, vec![1.0f32, 2.5, -3.0]);
    }

    #[test]
    fn load_surfaces_conversion_failure() {
        let buf = InterchangeBuffer::from_raw(
            Bytes::from(vec![0u8; 5]),
            smallvec![2],
            smallvec![4],
            ScalarType::F32,
        );

        let mut target: Vec<f32> = vec![7.0];
        let err = load(&mut target, &buf).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Conversion(ConversionError::WrongByteLen { .. })
        ));
        // Prior state untouched: every check precedes mutation.
        assert_eq!(target, vec![7.0]);
    }
}
