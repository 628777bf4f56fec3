//! PCM WAV decoder and encoder
//!
//! Reads RIFF/WAVE byte streams into normalized multichannel sample buffers
//! and writes them back as canonical 44-byte-header PCM files.
//!
//! To better understand the WAV format, read the
//! <a href="http://www-mmsp.ece.mcgill.ca/Documents/AudioFormats/WAVE/WAVE.html" target="_blank">WAV Specification</a>.

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file;
pub mod parser;
pub mod sample;

pub use buffer::AudioBuffer;
pub use error::{Error, Result};
pub use file::{AudioFileFormat, WaveFile};

/// Uncompressed integer PCM, the only format tag the codec decodes.
pub(crate) const PCM_FORMAT_ID: u16 = 0x0001;

static WAV_CODEC_REGISTER: &[(u16, &str)] = &[
    (0x0000, "unknown"),
    (PCM_FORMAT_ID, "pcm"),
    (0x0002, "ms-adpcm"),
    (0x0003, "pcm-float"),
    (0x0006, "alaw"),
    (0x0007, "mulaw"),
    (0x0011, "ima-adpcm-ms"),
    (0x0055, "mp3"),
    (0x0061, "adpcm-dk4"),
    (0x0062, "adpcm-dk3"),
    (0xFFFE, "extensible"),
];

pub(crate) fn find_codec_from_wav_twocc(tcc: u16) -> Option<&'static str> {
    WAV_CODEC_REGISTER
        .iter()
        .find(|(twocc, _)| *twocc == tcc)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_register() {
        assert_eq!(find_codec_from_wav_twocc(PCM_FORMAT_ID), Some("pcm"));
        assert_eq!(find_codec_from_wav_twocc(0x0002), Some("ms-adpcm"));
        assert_eq!(find_codec_from_wav_twocc(0x1234), None);
    }
}
