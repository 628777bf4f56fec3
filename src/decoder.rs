use log::debug;

use crate::buffer::AudioBuffer;
use crate::error::{Error, Result};
use crate::parser::{
    chunk_header_at, find_chunk, get_data, header, parse_fmt_at, Format, DATA_ID, FMT_ID,
    RIFF_HEADER_SIZE,
};
use crate::sample::BitDepth;
use crate::{find_codec_from_wav_twocc, PCM_FORMAT_ID};

/// Decodes a complete RIFF/WAVE PCM stream.
///
/// The `fmt ` and `data` chunks are located by searching for their ids, so
/// other chunks may precede them.
#[derive(Debug, Clone, Default)]
pub struct WavDecoder {
    pub format: Format,
    bit_depth: Option<BitDepth>,
    data_pos: usize,
    num_samples: usize,
}

impl WavDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the RIFF header and the `fmt ` chunk and locates the
    /// sample data.
    pub fn parse_headers(&mut self, input: &[u8]) -> Result<()> {
        let (_, riff) =
            header(input).map_err(|_| Error::format("this doesn't seem to be a RIFF/WAVE stream"))?;

        let (_, fmt_pos) = find_chunk(input, FMT_ID, RIFF_HEADER_SIZE)
            .map_err(|_| Error::format("no fmt chunk"))?;
        let (_, data_pos) = find_chunk(input, DATA_ID, RIFF_HEADER_SIZE)
            .map_err(|_| Error::format("no data chunk"))?;

        let (_, format) =
            parse_fmt_at(input, fmt_pos).map_err(|_| Error::format("truncated fmt chunk"))?;
        debug!(
            "riff size {}, fmt at {}: {:?}, data at {}",
            riff.file_size, fmt_pos, format, data_pos
        );

        let bit_depth = Self::analyze_fmt(&format)?;

        let (_, data) = chunk_header_at(input, data_pos)
            .map_err(|_| Error::format("truncated data chunk header"))?;
        let block_align = usize::from(format.block_align);
        let num_samples = data.size as usize / block_align;
        let available = input.len() - data.body_offset();
        if num_samples * block_align > available {
            return Err(Error::format(format!(
                "data chunk declares {} bytes but only {} follow",
                data.size, available
            )));
        }

        self.format = format;
        self.bit_depth = Some(bit_depth);
        self.data_pos = data.body_offset();
        self.num_samples = num_samples;
        Ok(())
    }

    fn analyze_fmt(format: &Format) -> Result<BitDepth> {
        if format.format_tag != PCM_FORMAT_ID {
            let cname = find_codec_from_wav_twocc(format.format_tag).unwrap_or("unknown");
            return Err(Error::unsupported(format!(
                "audio format {:#06x} ({}) is compressed or not integer PCM",
                format.format_tag, cname
            )));
        }

        if !(1..=2).contains(&format.channels) {
            return Err(Error::unsupported(format!(
                "{} channels, only mono and stereo are supported",
                format.channels
            )));
        }

        let bit_depth = BitDepth::from_bits(format.bits_per_sample).ok_or_else(|| {
            Error::unsupported(format!(
                "bit depth {} is not 8, 16 or 24",
                format.bits_per_sample
            ))
        })?;

        let avg_bytes_per_sec = u64::from(format.channels)
            * u64::from(format.samples_per_sec)
            * u64::from(format.bits_per_sample)
            / 8;
        if u64::from(format.avg_bytes_per_sec) != avg_bytes_per_sec {
            return Err(Error::HeaderInconsistency(format!(
                "byte rate is {}, expected {}",
                format.avg_bytes_per_sec, avg_bytes_per_sec
            )));
        }

        let block_align = format.channels * format.bytes_per_sample();
        if format.block_align != block_align {
            return Err(Error::HeaderInconsistency(format!(
                "block align is {}, expected {}",
                format.block_align, block_align
            )));
        }

        Ok(bit_depth)
    }

    /// Number of samples per channel, valid after `parse_headers`.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Decodes the sample frames located by `parse_headers` from the same
    /// input.
    pub fn decode_samples(&self, input: &[u8]) -> Result<AudioBuffer> {
        let bit_depth = self
            .bit_depth
            .ok_or_else(|| Error::format("headers have not been parsed"))?;
        let channels = usize::from(self.format.channels);
        let block_align = usize::from(self.format.block_align);
        let bytes_per_sample = bit_depth.bytes_per_sample();

        let data = input
            .get(self.data_pos..)
            .and_then(|i| get_data(i, self.num_samples * block_align).ok())
            .map(|(_, data)| data)
            .ok_or_else(|| Error::format("sample data is shorter than declared"))?;

        let mut buffer = AudioBuffer::new(channels, self.num_samples);
        for (i, frame) in data.chunks_exact(block_align).enumerate() {
            for c in 0..channels {
                buffer[(c, i)] = bit_depth.read_sample(frame, c * bytes_per_sample);
            }
        }

        Ok(buffer)
    }

    pub fn decode(&mut self, input: &[u8]) -> Result<AudioBuffer> {
        self.parse_headers(input)?;
        self.decode_samples(input)
    }
}
