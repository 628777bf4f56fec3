//! The user-facing audio file: a sample buffer plus the metadata needed to
//! write it back out.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use av_data::audiosample::{ChannelMap, Soniton};
use log::{debug, warn};

use crate::buffer::AudioBuffer;
use crate::decoder::WavDecoder;
use crate::encoder::WavEncoder;
use crate::error::{Error, Result};
use crate::parser::{form_magic, riff_magic, Format};
use crate::sample::BitDepth;

/// The container an audio file was loaded from or should be saved as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFileFormat {
    /// The last load failed.
    Error,
    #[default]
    NotLoaded,
    Wave,
    /// Recognized but there is no AIFF codec.
    Aiff,
}

impl AudioFileFormat {
    /// Identifies the container from its magic bytes.
    pub fn sniff(input: &[u8]) -> Self {
        if riff_magic(input).is_ok() {
            AudioFileFormat::Wave
        } else if form_magic(input).is_ok() {
            AudioFileFormat::Aiff
        } else {
            AudioFileFormat::Error
        }
    }
}

/// An in-memory audio file.
///
/// `samples` can be read and written directly; the sample rate and bit depth
/// are used by [`WaveFile::save`] and [`WaveFile::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct WaveFile {
    pub samples: AudioBuffer,
    sample_rate: u32,
    bit_depth: u16,
    audio_file_format: AudioFileFormat,
}

impl Default for WaveFile {
    fn default() -> Self {
        WaveFile {
            samples: AudioBuffer::new(1, 0),
            sample_rate: 44100,
            bit_depth: 16,
            audio_file_format: AudioFileFormat::NotLoaded,
        }
    }
}

impl WaveFile {
    /// An empty mono, 44.1 kHz, 16-bit file.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = fs::read(path).map_err(|e| {
            warn!("cannot read {}: {}", path.display(), e);
            e
        })?;

        let mut file = Self::new();
        file.load(&input)?;
        Ok(file)
    }

    /// Decodes `input`, replacing the buffer and metadata.
    ///
    /// On failure the buffer is left untouched, but callers should not rely
    /// on its contents.
    pub fn load(&mut self, input: &[u8]) -> Result<()> {
        self.audio_file_format = AudioFileFormat::sniff(input);

        let res = match self.audio_file_format {
            AudioFileFormat::Wave => self.decode_wave_file(input),
            AudioFileFormat::Aiff => Err(Error::format("AIFF files are not supported")),
            _ => Err(Error::format("audio file type not recognized")),
        };

        if let Err(e) = &res {
            warn!("cannot load audio: {}", e);
            if self.audio_file_format == AudioFileFormat::Wave {
                self.audio_file_format = AudioFileFormat::Error;
            }
        }
        res
    }

    fn decode_wave_file(&mut self, input: &[u8]) -> Result<()> {
        let mut decoder = WavDecoder::new();
        let samples = decoder.decode(input)?;

        self.samples = samples;
        self.sample_rate = decoder.format.samples_per_sec;
        self.bit_depth = decoder.format.bits_per_sample;
        debug!(
            "loaded {} channels x {} samples",
            self.num_channels(),
            self.num_samples_per_channel()
        );
        Ok(())
    }

    /// Encodes the file as PCM WAVE.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let channels = u16::try_from(self.num_channels()).map_err(|_| {
            Error::unsupported(format!("cannot write {} channels", self.num_channels()))
        })?;
        WavEncoder::new(Format::pcm(channels, self.sample_rate, self.bit_depth)?)
            .encode(&self.samples)
    }

    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        let data = self.encode()?;
        out.write_all(&data)?;
        Ok(())
    }

    /// Encodes the file and writes it to `path`.
    ///
    /// Only [`AudioFileFormat::Wave`] can be saved.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: AudioFileFormat) -> Result<()> {
        let path = path.as_ref();
        if format != AudioFileFormat::Wave {
            return Err(Error::format(format!("cannot save as {:?}", format)));
        }

        let res = self
            .encode()
            .and_then(|data| fs::write(path, data).map_err(Error::from));
        if let Err(e) = &res {
            warn!("cannot save {}: {}", path.display(), e);
        }
        res
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.samples.num_channels()
    }

    pub fn is_mono(&self) -> bool {
        self.num_channels() == 1
    }

    pub fn is_stereo(&self) -> bool {
        self.num_channels() == 2
    }

    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    pub fn num_samples_per_channel(&self) -> usize {
        self.samples.num_samples()
    }

    pub fn length_in_seconds(&self) -> f64 {
        self.num_samples_per_channel() as f64 / f64::from(self.sample_rate)
    }

    pub fn audio_file_format(&self) -> AudioFileFormat {
        self.audio_file_format
    }

    /// Replaces the buffer with a copy of `channels`.
    ///
    /// Nothing changes if `channels` is empty or ragged.
    pub fn set_audio_buffer<C: AsRef<[f32]>>(&mut self, channels: &[C]) -> Result<()> {
        self.samples = AudioBuffer::from_channels(channels)?;
        Ok(())
    }

    pub fn set_audio_buffer_size(&mut self, num_channels: usize, num_samples: usize) {
        self.samples.resize(num_channels, num_samples);
    }

    pub fn set_num_samples_per_channel(&mut self, num_samples: usize) {
        self.samples.set_num_samples(num_samples);
    }

    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.samples.set_num_channels(num_channels);
    }

    pub fn set_bit_depth(&mut self, bit_depth: u16) {
        self.bit_depth = bit_depth;
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Sample layout of the encoded data, if the bit depth can be encoded.
    pub fn soniton(&self) -> Option<Soniton> {
        BitDepth::from_bits(self.bit_depth).map(|depth| {
            let signed = depth != BitDepth::Eight;
            Soniton::new(depth.bits() as u8, false, false, false, false, signed)
        })
    }

    pub fn channel_map(&self) -> ChannelMap {
        ChannelMap::default_map(self.num_channels())
    }

    pub fn write_summary<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "|======================================|")?;
        writeln!(out, "Num Channels: {}", self.num_channels())?;
        writeln!(out, "Num Samples Per Channel: {}", self.num_samples_per_channel())?;
        writeln!(out, "Sample Rate: {}", self.sample_rate)?;
        writeln!(out, "Bit Depth: {}", self.bit_depth)?;
        writeln!(out, "Length in Seconds: {}", self.length_in_seconds())?;
        writeln!(out, "|======================================|")
    }
}

impl fmt::Display for WaveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f)
    }
}

#[cfg(test)]
#[allow(non_upper_case_globals)]
mod tests {
    use super::*;

    const mono16: &[u8] = include_bytes!("../assets/mono16.wav");
    const stereo24: &[u8] = include_bytes!("../assets/stereo24_list.wav");

    #[test]
    fn defaults() {
        let file = WaveFile::new();
        assert_eq!(file.audio_file_format(), AudioFileFormat::NotLoaded);
        assert!(file.is_mono());
        assert_eq!(file.num_samples_per_channel(), 0);
        assert_eq!(file.sample_rate(), 44100);
        assert_eq!(file.bit_depth(), 16);
    }

    #[test]
    fn sniff() {
        assert_eq!(AudioFileFormat::sniff(mono16), AudioFileFormat::Wave);
        assert_eq!(AudioFileFormat::sniff(b"FORM\0\0\0\0AIFF"), AudioFileFormat::Aiff);
        assert_eq!(AudioFileFormat::sniff(b"OggS"), AudioFileFormat::Error);
        assert_eq!(AudioFileFormat::sniff(b"RI"), AudioFileFormat::Error);
    }

    #[test]
    fn load_mono() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();

        assert_eq!(file.audio_file_format(), AudioFileFormat::Wave);
        assert_eq!(file.sample_rate(), 8000);
        assert_eq!(file.bit_depth(), 16);
        assert_eq!(file.num_channels(), 1);
        assert_eq!(file.num_samples_per_channel(), 4);
        assert_eq!(file.samples[(0, 1)], 0.5);
        assert_eq!(file.samples[(0, 2)], -0.5);
    }

    #[test]
    fn load_failures() {
        let mut file = WaveFile::new();
        file.load(stereo24).unwrap();

        assert!(matches!(file.load(b"not a wave file"), Err(Error::Format(_))));
        assert_eq!(file.audio_file_format(), AudioFileFormat::Error);

        assert!(matches!(file.load(b"FORM\0\0\0\0AIFF"), Err(Error::Format(_))));
        assert_eq!(file.audio_file_format(), AudioFileFormat::Aiff);

        assert!(matches!(file.load(&mono16[..40]), Err(Error::Format(_))));
        assert_eq!(file.audio_file_format(), AudioFileFormat::Error);
    }

    #[test]
    fn sixteen_bit_round_trip() {
        let left: Vec<f32> = vec![0.0, 0.25, -0.25, 0.5, -0.5, 1.0, -1.0, 0.3];
        let right: Vec<f32> = vec![0.7, 0.125, -0.125, 0.0, 0.0, 0.0, 0.0, 0.0];

        let mut file = WaveFile::new();
        file.set_audio_buffer(&[left.clone(), right.clone()]).unwrap();
        file.set_sample_rate(22050);

        let mut decoded = WaveFile::new();
        decoded.load(&file.encode().unwrap()).unwrap();

        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.num_samples_per_channel(), 8);
        assert_eq!(decoded.sample_rate(), 22050);
        for (c, expected) in [left, right].iter().enumerate() {
            for (got, want) in decoded.samples.channel(c).iter().zip(expected) {
                assert!((got - want).abs() <= 1. / 32768., "{} != {}", got, want);
            }
        }
    }

    #[test]
    fn twenty_four_bit_round_trip_is_lossless_for_stored_values() {
        let mut file = WaveFile::new();
        file.load(stereo24).unwrap();

        let mut decoded = WaveFile::new();
        decoded.load(&file.encode().unwrap()).unwrap();
        assert_eq!(decoded.samples, file.samples);
        assert_eq!(decoded.bit_depth(), 24);
    }

    #[test]
    fn encode_requires_supported_bit_depth() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();
        file.set_bit_depth(32);
        assert!(matches!(file.encode(), Err(Error::Unsupported(_))));
        assert!(file.soniton().is_none());
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut file = WaveFile::new();
        file.set_audio_buffer(&[vec![0f32, 0.5, -0.5, 1.0]]).unwrap();
        file.set_sample_rate(8000);
        file.save(&path, AudioFileFormat::Wave).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), mono16);
        let reopened = WaveFile::open(&path).unwrap();
        assert_eq!(reopened.samples.channel(0), [0.0, 0.5, -0.5, 32767. / 32768.]);
        assert_eq!(reopened.sample_rate(), 8000);
        assert_eq!(reopened.audio_file_format(), AudioFileFormat::Wave);
    }

    #[test]
    fn save_failures() {
        let dir = tempfile::tempdir().unwrap();
        let file = WaveFile::new();

        assert!(matches!(
            file.save(dir.path().join("missing").join("out.wav"), AudioFileFormat::Wave),
            Err(Error::Io(_))
        ));
        assert!(matches!(
            file.save(dir.path().join("out.aiff"), AudioFileFormat::Aiff),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            WaveFile::open(dir.path().join("nothing.wav")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn write_to_sink() {
        let mut file = WaveFile::new();
        file.set_audio_buffer(&[vec![0f32, 0.5, -0.5, 1.0]]).unwrap();
        file.set_sample_rate(8000);
        let mut out = Vec::new();
        file.write(&mut out).unwrap();
        assert_eq!(out, mono16);
    }

    #[test]
    fn reencoding_full_scale_sixteen_bit_drops_one_step() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();
        let out = file.encode().unwrap();

        assert_eq!(&out[..48], &mono16[..48]);
        assert_eq!(&out[48..], [0x00, 0xC0, 0xFE, 0x7F]);
    }

    #[test]
    fn encode_rejects_byte_rate_overflow() {
        let mut file = WaveFile::new();
        file.set_audio_buffer(&[vec![0f32; 2], vec![0f32; 2]]).unwrap();
        file.set_bit_depth(24);
        file.set_sample_rate(u32::MAX);
        assert!(matches!(file.encode(), Err(Error::Unsupported(_))));
    }

    #[test]
    fn set_audio_buffer_rejects_without_mutating() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();
        let before = file.samples.clone();

        let empty: [Vec<f32>; 0] = [];
        assert!(file.set_audio_buffer(&empty).is_err());
        assert!(file.set_audio_buffer(&[vec![0f32; 2], vec![0f32; 3]]).is_err());
        assert_eq!(file.samples, before);
    }

    #[test]
    fn channel_count_changes() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();
        let original = file.samples.channel(0).to_vec();

        file.set_num_channels(3);
        assert_eq!(file.num_channels(), 3);
        assert_eq!(file.samples.channel(1), [0.0; 4]);
        assert_eq!(file.samples.channel(2), [0.0; 4]);
        assert!(matches!(file.encode(), Err(Error::Unsupported(_))));

        file.set_num_channels(1);
        assert_eq!(file.samples.channel(0), original.as_slice());

        file.set_num_samples_per_channel(6);
        assert_eq!(file.samples.channel(0)[4..], [0.0, 0.0]);

        file.set_audio_buffer_size(2, 3);
        assert!(file.is_stereo());
        assert_eq!(file.samples.channel(0), &original[..3]);
    }

    #[test]
    fn length_in_seconds() {
        let mut file = WaveFile::new();
        file.set_audio_buffer_size(1, 44100);
        file.set_sample_rate(44100);
        assert_eq!(file.length_in_seconds(), 1.0);
    }

    #[test]
    fn summary() {
        let mut file = WaveFile::new();
        file.load(mono16).unwrap();

        let mut text = String::new();
        file.write_summary(&mut text).unwrap();
        assert!(text.contains("Num Channels: 1\n"));
        assert!(text.contains("Num Samples Per Channel: 4\n"));
        assert!(text.contains("Sample Rate: 8000\n"));
        assert!(text.contains("Bit Depth: 16\n"));
        assert!(text.contains("Length in Seconds: 0.0005\n"));
        assert_eq!(text, file.to_string());
    }

    #[test]
    fn av_data_description() {
        let mut file = WaveFile::new();
        file.load(stereo24).unwrap();

        let soniton = file.soniton().unwrap();
        assert_eq!(soniton.bits, 24);
        assert!(soniton.signed);
        assert!(!soniton.be);
        assert_eq!(file.channel_map().len(), 2);

        file.set_bit_depth(8);
        assert!(!file.soniton().unwrap().signed);
    }
}
