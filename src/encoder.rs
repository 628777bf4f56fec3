use std::io::Write;

use log::debug;

use crate::buffer::AudioBuffer;
use crate::error::{Error, Result};
use crate::parser::{chunk_header_at, header, Format, DATA_ID, RIFF_HEADER_SIZE, WAVEFORMAT};
use crate::sample::BitDepth;
use crate::PCM_FORMAT_ID;

/// Bytes counted by the RIFF size field besides the sample data: the `WAVE`
/// tag, the whole `fmt ` chunk and the `data` chunk header.
const RIFF_OVERHEAD: u32 = 4 + 24 + 8;
const DATA_CHUNK_POS: usize = RIFF_HEADER_SIZE + 8 + WAVEFORMAT;

/// Writes canonical PCM WAVE files.
///
/// Only the channel count, sample rate and bit depth of `format` are used;
/// the byte rate and block alignment are always derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct WavEncoder {
    format: Format,
}

impl WavEncoder {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        let bit_depth = BitDepth::from_bits(self.format.bits_per_sample).ok_or_else(|| {
            Error::unsupported(format!(
                "cannot write bit depth {}",
                self.format.bits_per_sample
            ))
        })?;

        if !(1..=2).contains(&self.format.channels) {
            return Err(Error::unsupported(format!(
                "cannot write {} channels",
                self.format.channels
            )));
        }

        let channels = usize::from(self.format.channels);
        if buffer.num_channels() != channels {
            return Err(Error::InvalidBuffer(format!(
                "buffer has {} channels, format has {}",
                buffer.num_channels(),
                channels
            )));
        }

        let num_samples = buffer.num_samples();
        let block_align = self.format.channels * bit_depth.bytes_per_sample() as u16;
        let data_chunk_size = Self::data_chunk_size(num_samples, block_align)
            .filter(|size| size.checked_add(RIFF_OVERHEAD).is_some())
            .ok_or_else(|| {
                Error::unsupported(format!(
                    "{} samples per channel do not fit in a RIFF file",
                    num_samples
                ))
            })?;
        let file_size = data_chunk_size + RIFF_OVERHEAD;

        let avg_bytes_per_sec = u32::try_from(
            u64::from(self.format.channels)
                * u64::from(self.format.samples_per_sec)
                * u64::from(bit_depth.bits())
                / 8,
        )
        .map_err(|_| {
            Error::unsupported(format!(
                "sample rate {} is too high",
                self.format.samples_per_sec
            ))
        })?;

        let mut buf = Vec::with_capacity(file_size as usize + 8);
        buf.extend_from_slice(b"RIFF");
        buf.write_all(&file_size.to_le_bytes())?;
        buf.extend_from_slice(b"WAVEfmt ");
        buf.write_all(&(WAVEFORMAT as u32).to_le_bytes())?;
        buf.write_all(&PCM_FORMAT_ID.to_le_bytes())?;
        buf.write_all(&self.format.channels.to_le_bytes())?;
        buf.write_all(&self.format.samples_per_sec.to_le_bytes())?;
        buf.write_all(&avg_bytes_per_sec.to_le_bytes())?;
        buf.write_all(&block_align.to_le_bytes())?;
        buf.write_all(&bit_depth.bits().to_le_bytes())?;
        buf.extend_from_slice(DATA_ID);
        buf.write_all(&data_chunk_size.to_le_bytes())?;

        for i in 0..num_samples {
            for c in 0..channels {
                bit_depth.write_sample(&mut buf, buffer[(c, i)]);
            }
        }

        Self::check_sizes(&buf, num_samples, block_align)?;
        debug!(
            "encoded {} samples x {} channels at {} bit, {} bytes",
            num_samples,
            channels,
            bit_depth.bits(),
            buf.len()
        );

        Ok(buf)
    }

    fn data_chunk_size(num_samples: usize, block_align: u16) -> Option<u32> {
        num_samples
            .checked_mul(usize::from(block_align))
            .and_then(|size| u32::try_from(size).ok())
    }

    /// Reads the size fields back out of `buf` and compares them with the
    /// bytes actually written.
    fn check_sizes(buf: &[u8], num_samples: usize, block_align: u16) -> Result<()> {
        let (_, riff) = header(buf)
            .map_err(|_| Error::InternalConsistency("RIFF header was not written".into()))?;
        let (_, data) = chunk_header_at(buf, DATA_CHUNK_POS)
            .map_err(|_| Error::InternalConsistency("data chunk header was not written".into()))?;

        if riff.file_size as usize != buf.len() - 8 {
            return Err(Error::InternalConsistency(format!(
                "RIFF size is {} but {} bytes follow it",
                riff.file_size,
                buf.len() - 8
            )));
        }

        if Self::data_chunk_size(num_samples, block_align) != Some(data.size)
            || data.size as usize != buf.len() - data.body_offset()
        {
            return Err(Error::InternalConsistency(format!(
                "data chunk size is {} but {} sample bytes were written",
                data.size,
                buf.len() - data.body_offset()
            )));
        }

        Ok(())
    }
}
