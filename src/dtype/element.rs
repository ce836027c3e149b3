//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;
use std::ops::Add;

/// Trait for types that can be reduction values
///
/// This trait connects Rust's type system to the runtime dtype tag.
/// It's implemented for all primitive numeric types.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - values cross worker boundaries
/// - `Pod + Zeroable` - views can be reinterpreted as bytes (bytemuck)
/// - `Add` - the additive identity and combine
/// - `PartialOrd` - comparison for bounded combines
pub trait Element:
    Copy + Send + Sync + Pod + Zeroable + Debug + 'static + Add<Output = Self> + PartialOrd
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Zero value (additive identity)
    fn zero() -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident, $zero:expr);* $(;)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn zero() -> Self {
                    $zero
                }
            }
        )*
    };
}

impl_element! {
    f64 => F64, 0.0;
    f32 => F32, 0.0;
    i64 => I64, 0;
    i32 => I32, 0;
    i16 => I16, 0;
    i8 => I8, 0;
    u64 => U64, 0;
    u32 => U32, 0;
    u16 => U16, 0;
    u8 => U8, 0;
}

// Note: bool doesn't implement Add, so boolean reductions go through u8.
