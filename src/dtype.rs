/// Runtime tag for the scalar element type of an interchange buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScalarType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
}

impl ScalarType {
    /// Byte width of one element.
    pub const fn size(&self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 | ScalarType::Bool => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::U64 | ScalarType::F64 => 8,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Bool => "bool",
        }
    }
}

/// A fixed-width numeric scalar that can sit at the innermost level of a
/// nested array.
///
/// `to_f64`/`from_f64` implement forced conversion between buffers of
/// differing scalar types. Integer magnitudes above 2^53 round through the
/// `f64` intermediate.
pub trait Scalar: Copy + Default + 'static {
    const TYPE: ScalarType;

    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_scalar_numeric {
    ($ty:ty, $tag:ident) => {
        impl Scalar for $ty {
            const TYPE: ScalarType = ScalarType::$tag;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
        }
    };
}

impl_scalar_numeric!(i8, I8);
impl_scalar_numeric!(i16, I16);
impl_scalar_numeric!(i32, I32);
impl_scalar_numeric!(i64, I64);
impl_scalar_numeric!(u8, U8);
impl_scalar_numeric!(u16, U16);
impl_scalar_numeric!(u32, U32);
impl_scalar_numeric!(u64, U64);
impl_scalar_numeric!(f32, F32);
impl_scalar_numeric!(f64, F64);

impl Scalar for bool {
    const TYPE: ScalarType = ScalarType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_sizes_match_native_widths() {
        assert_eq!(ScalarType::I8.size(), std::mem::size_of::<i8>());
        assert_eq!(ScalarType::U16.size(), std::mem::size_of::<u16>());
        assert_eq!(ScalarType::F32.size(), std::mem::size_of::<f32>());
        assert_eq!(ScalarType::F64.size(), std::mem::size_of::<f64>());
        assert_eq!(ScalarType::Bool.size(), 1);
    }

    #[test]
    fn forced_conversion_through_f64() {
        assert_eq!(i32::from_f64(3.9), 3);
        assert_eq!(u8::from_f64(-1.0), 0);
        assert_eq!(f32::from_f64(0.5), 0.5f32);
        assert!(bool::from_f64(2.0));
        assert!(!bool::from_f64(0.0));
    }
}
