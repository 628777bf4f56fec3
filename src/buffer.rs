//! Multichannel sample storage.

use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// Normalized samples for every channel, held in one contiguous region.
///
/// Channels are stored back to back, so every channel always has exactly
/// `num_samples()` samples. A buffer without channels has no samples.
/// Index with `buffer[(channel, sample)]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    data: Vec<f32>,
    num_channels: usize,
    num_samples: usize,
}

impl AudioBuffer {
    /// Creates a silent buffer.
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        let num_samples = if num_channels == 0 { 0 } else { num_samples };
        AudioBuffer {
            data: vec![0.; num_channels * num_samples],
            num_channels,
            num_samples,
        }
    }

    /// Copies samples from per-channel sequences.
    ///
    /// Fails if there are no channels or if the channels differ in length.
    pub fn from_channels<C: AsRef<[f32]>>(channels: &[C]) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(Error::InvalidBuffer("the buffer has no channels".into()));
        };
        let num_samples = first.as_ref().len();

        if let Some(c) = channels
            .iter()
            .position(|c| c.as_ref().len() != num_samples)
        {
            return Err(Error::InvalidBuffer(format!(
                "channel {} has {} samples, expected {}",
                c,
                channels[c].as_ref().len(),
                num_samples
            )));
        }

        let mut data = Vec::with_capacity(channels.len() * num_samples);
        for channel in channels {
            data.extend_from_slice(channel.as_ref());
        }

        Ok(AudioBuffer {
            data,
            num_channels: channels.len(),
            num_samples,
        })
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of samples in each channel.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `channel >= num_channels()`.
    pub fn channel(&self, channel: usize) -> &[f32] {
        assert!(channel < self.num_channels, "channel {} out of range", channel);
        let start = channel * self.num_samples;
        &self.data[start..start + self.num_samples]
    }

    /// # Panics
    ///
    /// Panics if `channel >= num_channels()`.
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        assert!(channel < self.num_channels, "channel {} out of range", channel);
        let start = channel * self.num_samples;
        &mut self.data[start..start + self.num_samples]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.num_channels).map(move |c| self.channel(c))
    }

    pub fn get(&self, channel: usize, sample: usize) -> Option<f32> {
        if channel < self.num_channels && sample < self.num_samples {
            Some(self.data[channel * self.num_samples + sample])
        } else {
            None
        }
    }

    /// Adds silent channels or drops trailing ones. Existing channels keep
    /// their samples.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        if num_channels == 0 {
            self.clear();
            return;
        }
        self.data.resize(num_channels * self.num_samples, 0.);
        self.num_channels = num_channels;
    }

    /// Pads every channel with silence or truncates it. Has no effect on a
    /// buffer without channels.
    pub fn set_num_samples(&mut self, num_samples: usize) {
        if num_samples == self.num_samples || self.num_channels == 0 {
            return;
        }

        let keep = num_samples.min(self.num_samples);
        let mut data = Vec::with_capacity(self.num_channels * num_samples);
        for c in 0..self.num_channels {
            data.extend_from_slice(&self.channel(c)[..keep]);
            data.resize((c + 1) * num_samples, 0.);
        }

        self.data = data;
        self.num_samples = num_samples;
    }

    pub fn resize(&mut self, num_channels: usize, num_samples: usize) {
        self.set_num_channels(num_channels);
        self.set_num_samples(num_samples);
    }

    /// Removes every channel.
    pub fn clear(&mut self) {
        self.data.clear();
        self.num_channels = 0;
        self.num_samples = 0;
    }
}

impl Index<(usize, usize)> for AudioBuffer {
    type Output = f32;

    fn index(&self, (channel, sample): (usize, usize)) -> &f32 {
        &self.channel(channel)[sample]
    }
}

impl IndexMut<(usize, usize)> for AudioBuffer {
    fn index_mut(&mut self, (channel, sample): (usize, usize)) -> &mut f32 {
        &mut self.channel_mut(channel)[sample]
    }
}
