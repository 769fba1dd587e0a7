use tilecl_runtime::Element;

/// Keys sortable by digits.
///
/// `to_radix` maps a key to an unsigned integer with the same order, so sorting the radix
/// representations digit by digit sorts the keys.
pub trait RadixKey: Element {
    /// Number of significant bits of the radix representation.
    const BITS: u32;

    /// The order-preserving unsigned representation of the key.
    fn to_radix(self) -> u64;
}

macro_rules! impl_radix_unsigned {
    ($($ty:ty),*) => {
        $(
            impl RadixKey for $ty {
                const BITS: u32 = <$ty>::BITS;

                fn to_radix(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

macro_rules! impl_radix_signed {
    ($($ty:ty => $unsigned:ty),*) => {
        $(
            impl RadixKey for $ty {
                const BITS: u32 = <$ty>::BITS;

                fn to_radix(self) -> u64 {
                    // Flipping the sign bit orders negative values first.
                    ((self as $unsigned) ^ (1 << (<$ty>::BITS - 1))) as u64
                }
            }
        )*
    };
}

impl_radix_unsigned!(u8, u16, u32, u64, usize);
impl_radix_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize);

impl RadixKey for f32 {
    const BITS: u32 = 32;

    fn to_radix(self) -> u64 {
        let bits = self.to_bits();
        let ordered = match bits >> 31 {
            1 => !bits,
            _ => bits | (1 << 31),
        };
        ordered as u64
    }
}

impl RadixKey for f64 {
    const BITS: u32 = 64;

    fn to_radix(self) -> u64 {
        let bits = self.to_bits();
        match bits >> 63 {
            1 => !bits,
            _ => bits | (1 << 63),
        }
    }
}
