//! Conversions between normalized samples and PCM integers.
//!
//! Samples live in `[-1.0, 1.0]`. On disk, 8-bit PCM is unsigned with a bias
//! of 128, 16-bit and 24-bit PCM are signed little-endian.

const SIXTEEN_BIT_SCALE: f32 = 32768.;
const SIXTEEN_BIT_MAX: f32 = 32767.;
const TWENTY_FOUR_BIT_SCALE: f32 = 8388608.;
const TWENTY_FOUR_BIT_MIN: i32 = -0x80_0000;
const TWENTY_FOUR_BIT_MAX: i32 = 0x7F_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Reads a `width`-byte integer starting at `offset`.
///
/// `width` must be between 1 and 4. Signed values have their top bit
/// extended through the returned `i32`; unsigned 4-byte values wrap.
///
/// # Panics
///
/// Panics if `offset + width` is past the end of `bytes`.
pub fn read_int(
    bytes: &[u8],
    offset: usize,
    width: usize,
    endianness: Endianness,
    signedness: Signedness,
) -> i32 {
    debug_assert!((1..=4).contains(&width));
    let raw = &bytes[offset..offset + width];
    let value = match endianness {
        Endianness::Little => raw
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
        Endianness::Big => raw.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
    };

    match signedness {
        Signedness::Signed => {
            let shift = 32 - 8 * width as u32;
            ((value << shift) as i32) >> shift
        }
        Signedness::Unsigned => value as i32,
    }
}

/// Appends the low `width` bytes of `value`.
pub fn write_int(out: &mut Vec<u8>, value: i32, width: usize, endianness: Endianness) {
    debug_assert!((1..=4).contains(&width));
    let bytes = value.to_le_bytes();
    match endianness {
        Endianness::Little => out.extend_from_slice(&bytes[..width]),
        Endianness::Big => out.extend(bytes[..width].iter().rev()),
    }
}

pub fn four_bytes_to_int(bytes: &[u8], offset: usize, endianness: Endianness) -> i32 {
    read_int(bytes, offset, 4, endianness, Signedness::Signed)
}

pub fn two_bytes_to_int(bytes: &[u8], offset: usize, endianness: Endianness) -> i16 {
    read_int(bytes, offset, 2, endianness, Signedness::Signed) as i16
}

/// Limits `value` to `[min_value, max_value]`.
pub fn clamp(value: f32, min_value: f32, max_value: f32) -> f32 {
    value.min(max_value).max(min_value)
}

pub fn sixteen_bit_int_to_sample(sample: i16) -> f32 {
    f32::from(sample) / SIXTEEN_BIT_SCALE
}

pub fn sample_to_sixteen_bit_int(sample: f32) -> i16 {
    (clamp(sample, -1., 1.) * SIXTEEN_BIT_MAX).round() as i16
}

pub fn single_byte_to_sample(sample: u8) -> f32 {
    (f32::from(sample) - 128.) / 128.
}

pub fn sample_to_single_byte(sample: f32) -> u8 {
    let unipolar = (clamp(sample, -1., 1.) + 1.) / 2.;
    (unipolar * 255.) as u8
}

/// `sample` must already be sign-extended from bit 23.
pub fn twenty_four_bit_int_to_sample(sample: i32) -> f32 {
    sample as f32 / TWENTY_FOUR_BIT_SCALE
}

/// Full scale positive input saturates at `0x7FFFFF` instead of wrapping.
pub fn sample_to_twenty_four_bit_int(sample: f32) -> i32 {
    let value = (clamp(sample, -1., 1.) * TWENTY_FOUR_BIT_SCALE) as i32;
    value.clamp(TWENTY_FOUR_BIT_MIN, TWENTY_FOUR_BIT_MAX)
}

/// The PCM sample widths the codec reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
}

impl BitDepth {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            24 => Some(BitDepth::TwentyFour),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        usize::from(self.bits() / 8)
    }

    /// Decodes one sample at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `bytes_per_sample()` bytes remain at `offset`.
    pub fn read_sample(self, bytes: &[u8], offset: usize) -> f32 {
        match self {
            BitDepth::Eight => single_byte_to_sample(bytes[offset]),
            BitDepth::Sixteen => {
                sixteen_bit_int_to_sample(two_bytes_to_int(bytes, offset, Endianness::Little))
            }
            BitDepth::TwentyFour => twenty_four_bit_int_to_sample(read_int(
                bytes,
                offset,
                3,
                Endianness::Little,
                Signedness::Signed,
            )),
        }
    }

    /// Encodes one sample, clamping it to the representable range.
    pub fn write_sample(self, out: &mut Vec<u8>, sample: f32) {
        match self {
            BitDepth::Eight => out.push(sample_to_single_byte(sample)),
            BitDepth::Sixteen => write_int(
                out,
                i32::from(sample_to_sixteen_bit_int(sample)),
                2,
                Endianness::Little,
            ),
            BitDepth::TwentyFour => write_int(
                out,
                sample_to_twenty_four_bit_int(sample),
                3,
                Endianness::Little,
            ),
        }
    }
}
