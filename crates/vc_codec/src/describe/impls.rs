use super::{Describe, Descriptor};

macro_rules! impl_describe_scalar {
    ($($ty:ty),*) => {
        $(
            impl Describe for $ty {
                #[inline]
                fn describe() -> Descriptor {
                    Descriptor::scalar::<Self>()
                }
            }
        )*
    };
}

impl_describe_scalar!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String
);

impl<T: Describe> Describe for Option<T> {
    #[inline]
    fn describe() -> Descriptor {
        Descriptor::optional::<T>()
    }
}

impl<T: Describe> Describe for Box<T> {
    #[inline]
    fn describe() -> Descriptor {
        Descriptor::boxed::<T>()
    }
}

impl<T: Describe> Describe for Vec<T> {
    #[inline]
    fn describe() -> Descriptor {
        Descriptor::sequence::<T>()
    }
}
