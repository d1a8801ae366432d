//! Acquisition sources
//!
//! Stand-ins for the digitizer that feeds the driver loop:
//! - `IterSource` - any iterator of ready-made spectrum pairs
//! - `SyntheticSource` - a shared tone on two channels with a fixed phase lag plus Gaussian noise
//! - `WavSource` - consecutive frames of a stereo WAV recording
//!
//! Time-domain frames are transformed with a plain forward FFT (rectangular window).

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use num::complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rustfft::{Fft, FftPlanner};
use snafu::{ensure, ResultExt};

use crate::driver::SpectrumSource;
use crate::error::{
    InvalidFrameLengthSnafu, InvalidSyntheticSnafu, OpenWavSnafu, ReadWavSnafu, SourceError,
    UnsupportedFormatSnafu,
};
use crate::spectrum::ComplexSpectrum;

type Pair = (ComplexSpectrum, ComplexSpectrum);

/// Wraps an iterator of spectrum pairs
pub struct IterSource<I> {
    pairs: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Pair>,
{
    pub fn new(pairs: I) -> Self {
        Self { pairs }
    }
}

impl<I> SpectrumSource for IterSource<I>
where
    I: Iterator<Item = Pair>,
{
    fn next_pair(&mut self) -> Result<Option<Pair>, SourceError> {
        Ok(self.pairs.next())
    }
}

/// Forward FFT of real frames
struct FrameTransformer {
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl FrameTransformer {
    fn new(fft_len: usize) -> Self {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(fft_len);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }

    fn transform(&mut self, samples: &[f64]) -> ComplexSpectrum {
        let mut buffer: Vec<Complex64> = samples.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer.into()
    }
}

/// Parameters for `SyntheticSource`
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Samples per frame (and bins per spectrum)
    pub fft_len: usize,
    /// Bin the tone sits on
    pub tone_bin: usize,
    /// How far channel 1 leads channel 2
    pub phase_offset_degrees: f64,
    /// Tone amplitude
    pub amplitude: f64,
    /// Standard deviation of the additive noise on each channel
    pub noise_sigma: f64,
    /// RNG seed
    pub seed: u64,
    /// Pairs to produce, `None` for an endless source
    pub pairs: Option<usize>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            fft_len: 1024,
            tone_bin: 100,
            phase_offset_degrees: 45.0,
            amplitude: 1.0,
            noise_sigma: 1.0,
            seed: 0x5eed,
            pairs: None,
        }
    }
}

/// Two noisy copies of one tone, channel 2 lagging channel 1 by a fixed phase
///
/// The tone's absolute phase is redrawn for every pair, as it would be for free-running
/// acquisitions; only the inter-channel offset is stable.
pub struct SyntheticSource {
    config: SyntheticConfig,
    rng: StdRng,
    noise: Normal<f64>,
    transformer: FrameTransformer,
    produced: usize,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Result<Self, SourceError> {
        ensure!(
            config.fft_len > 0 && config.fft_len % 2 == 0,
            InvalidFrameLengthSnafu { len: config.fft_len }
        );
        ensure!(
            config.tone_bin < config.fft_len / 2,
            InvalidSyntheticSnafu {
                reason: format!(
                    "tone bin {} outside half-spectrum of {} bins",
                    config.tone_bin,
                    config.fft_len / 2
                ),
            }
        );
        let noise = Normal::new(0.0, config.noise_sigma).map_err(|e| {
            InvalidSyntheticSnafu { reason: format!("noise sigma {}: {}", config.noise_sigma, e) }
                .build()
        })?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            transformer: FrameTransformer::new(config.fft_len),
            noise,
            produced: 0,
            config,
        })
    }

    fn channel(&mut self, start_phase: f64) -> Vec<f64> {
        let n = self.config.fft_len;
        let omega = 2.0 * std::f64::consts::PI * self.config.tone_bin as f64 / n as f64;
        (0..n)
            .map(|t| {
                self.config.amplitude * (omega * t as f64 + start_phase).cos()
                    + self.noise.sample(&mut self.rng)
            })
            .collect()
    }
}

impl SpectrumSource for SyntheticSource {
    fn next_pair(&mut self) -> Result<Option<Pair>, SourceError> {
        if self.config.pairs.is_some_and(|limit| self.produced >= limit) {
            return Ok(None);
        }
        self.produced += 1;

        let start_phase = self.rng.random::<f64>() * 2.0 * std::f64::consts::PI;
        let lag = self.config.phase_offset_degrees.to_radians();

        let ch1 = self.channel(start_phase);
        let ch2 = self.channel(start_phase - lag);

        Ok(Some((self.transformer.transform(&ch1), self.transformer.transform(&ch2))))
    }
}

/// Frames of a stereo recording, left channel as channel 1
pub struct WavSource {
    left: Vec<f64>,
    right: Vec<f64>,
    fft_len: usize,
    position: usize,
    transformer: FrameTransformer,
}

impl WavSource {
    /// Open a stereo WAV file (16-bit PCM or 32-bit float)
    pub fn open<P: AsRef<Path>>(path: P, fft_len: usize) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path).context(OpenWavSnafu {
            path: path.display().to_string(),
        })?;
        Self::from_wav_reader(reader, fft_len)
    }

    /// Read a stereo WAV stream from any reader
    pub fn from_reader<R: Read>(reader: R, fft_len: usize) -> Result<Self, SourceError> {
        let reader = hound::WavReader::new(reader).context(OpenWavSnafu {
            path: "<stream>".to_string(),
        })?;
        Self::from_wav_reader(reader, fft_len)
    }

    fn from_wav_reader<R: Read>(
        reader: hound::WavReader<R>,
        fft_len: usize,
    ) -> Result<Self, SourceError> {
        ensure!(fft_len > 0 && fft_len % 2 == 0, InvalidFrameLengthSnafu { len: fft_len });

        let spec = reader.spec();
        let supported = spec.channels == 2
            && matches!(
                (spec.sample_format, spec.bits_per_sample),
                (hound::SampleFormat::Int, 16) | (hound::SampleFormat::Float, 32)
            );
        ensure!(
            supported,
            UnsupportedFormatSnafu { channels: spec.channels, bits: spec.bits_per_sample }
        );

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f64 / 32768.0))
                .collect::<Result<Vec<f64>, hound::Error>>(),
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<Vec<f64>, hound::Error>>(),
        }
        .context(ReadWavSnafu)?;

        let left = interleaved.iter().step_by(2).copied().collect();
        let right = interleaved.iter().skip(1).step_by(2).copied().collect();

        Ok(Self {
            left,
            right,
            fft_len,
            position: 0,
            transformer: FrameTransformer::new(fft_len),
        })
    }

    /// Whole frames left to read
    pub fn frames_remaining(&self) -> usize {
        self.right.len().saturating_sub(self.position) / self.fft_len
    }
}

impl SpectrumSource for WavSource {
    fn next_pair(&mut self) -> Result<Option<Pair>, SourceError> {
        let end = self.position + self.fft_len;
        // A trailing partial frame is dropped
        if end > self.right.len() {
            return Ok(None);
        }

        let spectrum1 = self.transformer.transform(&self.left[self.position..end]);
        let spectrum2 = self.transformer.transform(&self.right[self.position..end]);
        self.position = end;

        Ok(Some((spectrum1, spectrum2)))
    }
}
