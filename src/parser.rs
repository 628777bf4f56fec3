use nom::{
    bytes::complete::{tag, take, take_until},
    combinator::{map, verify},
    number::complete::{le_u16, le_u32},
    sequence::{pair, tuple},
    Err, IResult,
};

pub(crate) const RIFF_HEADER_SIZE: usize = 12;
pub(crate) const CHUNK_HEADER_SIZE: usize = 8;
/// Size of the PCM `fmt ` chunk body.
pub(crate) const WAVEFORMAT: usize = 16;

pub(crate) const FMT_ID: &[u8; 4] = b"fmt ";
pub(crate) const DATA_ID: &[u8; 4] = b"data";

// Custom error codes
pub(crate) const NOT_FOUND: u8 = 1;

#[derive(Debug, PartialEq)]
pub struct Error<'a> {
    input: &'a [u8],
    pub(crate) kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Nom(nom::error::ErrorKind),
    Custom(u8),
}

impl<'a> nom::error::ParseError<&'a [u8]> for Error<'a> {
    fn from_error_kind(input: &'a [u8], kind: nom::error::ErrorKind) -> Self {
        Error {
            input,
            kind: ErrorKind::Nom(kind),
        }
    }

    fn append(_input: &'a [u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

pub(crate) fn custom_error(input: &[u8], code: u8) -> Error {
    Error {
        input,
        kind: ErrorKind::Custom(code),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub file_size: u32,
}

pub(crate) fn riff_magic(input: &[u8]) -> IResult<&[u8], &[u8], Error> {
    tag(b"RIFF")(input)
}

/// AIFF container magic.
pub(crate) fn form_magic(input: &[u8]) -> IResult<&[u8], &[u8], Error> {
    tag(b"FORM")(input)
}

pub(crate) fn header(input: &[u8]) -> IResult<&[u8], Header, Error> {
    map(
        tuple((riff_magic, le_u32, tag(b"WAVE"))),
        |(_, file_size, _)| Header { file_size },
    )(input)
}

/// The fields of a `fmt ` chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Format {
    pub format_tag: u16,
    pub channels: u16,
    pub samples_per_sec: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl Format {
    /// Builds an uncompressed PCM format, deriving the byte rate and block
    /// alignment from the other fields.
    ///
    /// Fails if either derived field does not fit its `fmt ` slot.
    pub fn pcm(channels: u16, samples_per_sec: u32, bits_per_sample: u16) -> crate::Result<Self> {
        let avg_bytes_per_sec =
            u64::from(channels) * u64::from(samples_per_sec) * u64::from(bits_per_sample) / 8;
        let avg_bytes_per_sec = u32::try_from(avg_bytes_per_sec).map_err(|_| {
            crate::Error::Unsupported(format!(
                "byte rate of {} channels at {} Hz and {} bit does not fit in 32 bits",
                channels, samples_per_sec, bits_per_sample
            ))
        })?;
        let block_align = channels.checked_mul(bits_per_sample / 8).ok_or_else(|| {
            crate::Error::Unsupported(format!(
                "block align of {} channels at {} bit does not fit in 16 bits",
                channels, bits_per_sample
            ))
        })?;

        Ok(Format {
            format_tag: crate::PCM_FORMAT_ID,
            channels,
            samples_per_sec,
            avg_bytes_per_sec,
            block_align,
            bits_per_sample,
        })
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }
}

/// Location of a sub-chunk inside the RIFF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Offset of the chunk id.
    pub offset: usize,
    /// Declared size of the chunk body.
    pub size: u32,
}

impl ChunkHeader {
    /// Offset of the first byte of the chunk body.
    pub fn body_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }
}

fn parse_fmt(input: &[u8]) -> IResult<&[u8], Format, Error> {
    verify(read_chunks_type, |t| t.0 == FMT_ID)(input).and_then(|(i, _)| {
        map(
            tuple((le_u16, le_u16, le_u32, le_u32, le_u16, le_u16)),
            |t| Format {
                format_tag: t.0,
                channels: t.1,
                samples_per_sec: t.2,
                avg_bytes_per_sec: t.3,
                block_align: t.4,
                bits_per_sample: t.5,
            },
        )(i)
    })
}

/// Parses the `fmt ` chunk whose id starts at `offset`.
pub(crate) fn parse_fmt_at(input: &[u8], offset: usize) -> IResult<&[u8], Format, Error> {
    take(offset)(input).and_then(|(i, _)| parse_fmt(i))
}

/// Reads the header of the chunk whose id starts at `offset`.
pub(crate) fn chunk_header_at(input: &[u8], offset: usize) -> IResult<&[u8], ChunkHeader, Error> {
    take(offset)(input).and_then(|(i, _)| {
        map(read_chunks_type, |(_, size)| ChunkHeader { offset, size })(i)
    })
}

/// Finds the first occurrence of `id` at or after `from`.
pub(crate) fn find_chunk<'a>(
    input: &'a [u8],
    id: &[u8],
    from: usize,
) -> IResult<&'a [u8], usize, Error<'a>> {
    let (i, _) = take::<_, _, Error>(from)(input)?;
    match take_until::<_, _, Error>(id)(i) {
        Ok((rest, skipped)) => Ok((rest, from + skipped.len())),
        Err(_) => Err(Err::Error(custom_error(i, NOT_FOUND))),
    }
}

pub(crate) fn get_data(input: &[u8], data_size: usize) -> IResult<&[u8], &[u8], Error> {
    take(data_size)(input)
}

pub(crate) fn read_chunks_type(input: &[u8]) -> IResult<&[u8], (&[u8], u32), Error> {
    pair(take(4usize), le_u32)(input)
}
