//! Shape, stride, and axis-kind descriptors.
//!
//! Shapes and strides are ordered outermost first. Strides follow the
//! row-major convention: the last axis is contiguous.

use smallvec::SmallVec;

use crate::error::BufferError;

/// Per-axis extents, outermost first.
pub type ShapeVec = SmallVec<[usize; 4]>;

/// Per-axis byte strides, same order as [`ShapeVec`].
pub type StrideVec = SmallVec<[usize; 4]>;

/// Axis kind of a nested array type.
///
/// `Fixed` axes have a length known without inspecting any value; `Dynamic`
/// axes are sized per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLen {
    Fixed(usize),
    Dynamic,
}

pub type AxesVec = SmallVec<[AxisLen; 4]>;

/// Total element count implied by `shape`, with overflow checking.
pub fn num_elements(shape: &[usize]) -> Result<usize, BufferError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(BufferError::ShapeOverflow)
}

/// Row-major byte strides for `shape` with elements of `elem_size` bytes.
///
/// `stride[last] = elem_size` and `stride[i] = shape[i + 1] * stride[i + 1]`.
/// A zero axis yields degenerate but well-formed strides by the same rule.
pub fn row_major_strides(shape: &[usize], elem_size: usize) -> StrideVec {
    let mut strides = StrideVec::from_elem(0, shape.len());
    if let Some(last) = strides.last_mut() {
        *last = elem_size;
    }
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = shape[i + 1] * strides[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_law_holds() {
        let shape = [2usize, 3, 4, 5];
        let elem = 8usize;
        let strides = row_major_strides(&shape, elem);

        assert_eq!(strides[shape.len() - 1], elem);
        for i in 0..shape.len() - 1 {
            assert_eq!(strides[i], shape[i + 1] * strides[i + 1]);
        }
        assert_eq!(&strides[..], &[480, 160, 40, 8]);
    }

    #[test]
    fn single_axis_stride_is_elem_size() {
        assert_eq!(&row_major_strides(&[7], 4)[..], &[4]);
    }

    #[test]
    fn zero_axis_gives_degenerate_strides() {
        let strides = row_major_strides(&[0, 0], 4);
        assert_eq!(&strides[..], &[0, 4]);
    }

    #[test]
    fn empty_shape_gives_empty_strides() {
        assert!(row_major_strides(&[], 4).is_empty());
    }

    #[test]
    fn num_elements_checks_overflow() {
        assert_eq!(num_elements(&[2, 3, 4]).unwrap(), 24);
        assert_eq!(num_elements(&[]).unwrap(), 1);
        assert_eq!(num_elements(&[5, 0]).unwrap(), 0);
        assert!(matches!(
            num_elements(&[usize::MAX, 2]),
            Err(BufferError::ShapeOverflow)
        ));
    }
}
