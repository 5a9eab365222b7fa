//! Human-readable type descriptors for tooling and error messages.

use std::fmt::Write;

use crate::{
    dtype::Scalar,
    nested::NestedArray,
    shape::{AxesVec, AxisLen},
};

/// Summarize a nested array type's element type and per-axis shape, e.g.
/// `ndarray[dtype=f32, shape=(3, n)]`.
///
/// Static axes print their fixed length; dynamic axes print `n`.
pub fn type_descr<T: NestedArray>() -> String {
    let mut axes = AxesVec::new();
    T::axes(&mut axes);

    let mut out = String::new();
    out.push_str("ndarray[dtype=");
    out.push_str(T::Leaf::TYPE.name());
    out.push_str(", shape=(");
    for (i, kind) in axes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match kind {
            AxisLen::Fixed(n) => {
                let _ = write!(out, "{n}");
            }
            AxisLen::Dynamic => out.push('n'),
        }
    }
    out.push_str(")]");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descr_mixes_fixed_and_dynamic_axes() {
        assert_eq!(type_descr::<Vec<f32>>(), "ndarray[dtype=f32, shape=(n)]");
        assert_eq!(
            type_descr::<Vec<[f32; 3]>>(),
            "ndarray[dtype=f32, shape=(n, 3)]"
        );
        assert_eq!(
            type_descr::<[[i64; 2]; 4]>(),
            "ndarray[dtype=i64, shape=(4, 2)]"
        );
        assert_eq!(
            type_descr::<Vec<Vec<[bool; 2]>>>(),
            "ndarray[dtype=bool, shape=(n, n, 2)]"
        );
    }
}
