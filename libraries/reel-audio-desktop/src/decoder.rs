//! Streaming track decoder using Symphonia
//!
//! Decodes a file packet by packet into interleaved f32 chunks already shaped for the
//! output device: channel count mapped, sample rate converted with rubato.
//!
//! ## Sample conversion
//!
//! Every Symphonia sample format goes through the same planar conversion with a
//! per-format normalization function:
//! - **Float formats**: pass through (F32) or cast (F64)
//! - **Signed ints**: divide by MAX value
//! - **Unsigned ints**: normalize to [0,1], scale to [-1,1]
//! - **24-bit types**: extract `.inner()`, normalize
//!
//! ## Channel mapping
//!
//! - Same count: unchanged
//! - Mono source: duplicated to every output channel
//! - Mono output: average of all source channels
//! - Otherwise: extra source channels dropped, missing output channels silent

use reel_playback::PlaybackError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Frames per resampler input chunk
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Planar audio: one sample vector per channel
type Planar = Vec<Vec<f32>>;

/// Decoder for a single track
pub struct TrackDecoder {
    path: PathBuf,
    source_rate: u32,
    output_rate: u32,
    output_channels: usize,

    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,

    // Resampler (if needed) and the input it has not consumed yet
    resampler: Option<SincFixedIn<f32>>,
    pending: Planar,

    is_eof: bool,
}

impl TrackDecoder {
    /// Open and probe `path` for output at `output_rate` Hz with `output_channels`
    ///
    /// # Returns
    /// * `Ok(decoder)` - Ready to stream chunks
    /// * `Err(_)` - File could not be opened, probed or decoded
    pub fn open(
        path: impl AsRef<Path>,
        output_rate: u32,
        output_channels: usize,
    ) -> Result<Self, PlaybackError> {
        let path = path.as_ref().to_path_buf();
        let output_channels = output_channels.max(1);

        let file = File::open(&path).map_err(|e| PlaybackError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::Probe(format!("{}: {}", path.display(), e)))?;

        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::NoAudioTrack(path.display().to_string()))?;

        let source_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::Decoder(format!("Failed to create decoder: {}", e)))?;

        let resampler = if source_rate == output_rate {
            None
        } else {
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };

            let resampler = SincFixedIn::<f32>::new(
                f64::from(output_rate) / f64::from(source_rate),
                2.0,
                params,
                RESAMPLE_CHUNK_FRAMES,
                output_channels,
            )
            .map_err(|e| PlaybackError::Decoder(format!("Failed to create resampler: {}", e)))?;
            Some(resampler)
        };

        tracing::debug!(
            "Opened {} ({} Hz -> {} Hz, {} output channels)",
            path.display(),
            source_rate,
            output_rate,
            output_channels
        );

        Ok(Self {
            path,
            source_rate,
            output_rate,
            output_channels,
            format_reader,
            decoder,
            track_id,
            resampler,
            pending: vec![Vec::new(); output_channels],
            is_eof: false,
        })
    }

    /// Decode the next interleaved chunk
    ///
    /// Returns `Ok(None)` once the track is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<f32>>, PlaybackError> {
        loop {
            if self.is_eof {
                return Ok(None);
            }

            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    self.is_eof = true;
                    return self.flush();
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.is_eof = true;
                    return self.flush();
                }
                Err(e) => {
                    return Err(PlaybackError::Decoder(format!(
                        "Error reading packet: {}",
                        e
                    )))
                }
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            let planar = match self.decoder.decode(&packet) {
                Ok(decoded) => map_channels(to_planar_f32(decoded), self.output_channels),
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping corrupt packet in {}: {}", self.path.display(), e);
                    continue;
                }
                Err(e) => return Err(PlaybackError::Decoder(e.to_string())),
            };

            let output = self.resample(planar)?;
            if output.first().is_some_and(|channel| !channel.is_empty()) {
                return Ok(Some(interleave(&output)));
            }
        }
    }

    /// Run decoded audio through the resampler, keeping incomplete input for later
    fn resample(&mut self, planar: Planar) -> Result<Planar, PlaybackError> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(planar);
        };

        for (pending, channel) in self.pending.iter_mut().zip(planar) {
            pending.extend(channel);
        }

        let mut output: Planar = vec![Vec::new(); self.output_channels];
        loop {
            let needed = resampler.input_frames_next();
            if self.pending[0].len() < needed {
                break;
            }

            let chunk: Planar = self
                .pending
                .iter_mut()
                .map(|channel| channel.drain(..needed).collect())
                .collect();

            let resampled = resampler
                .process(&chunk, None)
                .map_err(|e| PlaybackError::Decoder(format!("Resampling error: {}", e)))?;

            for (out, channel) in output.iter_mut().zip(resampled) {
                out.extend(channel);
            }
        }

        Ok(output)
    }

    /// Push leftover input through the resampler at end of stream
    fn flush(&mut self) -> Result<Option<Vec<f32>>, PlaybackError> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(None);
        };

        if self.pending[0].is_empty() {
            return Ok(None);
        }

        let tail = resampler
            .process_partial(Some(self.pending.as_slice()), None)
            .map_err(|e| PlaybackError::Decoder(format!("Resampling error: {}", e)))?;
        self.pending.iter_mut().for_each(Vec::clear);

        if tail.first().is_some_and(|channel| !channel.is_empty()) {
            Ok(Some(interleave(&tail)))
        } else {
            Ok(None)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample rate of the file
    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    /// Sample rate of produced chunks
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Channel count of produced chunks
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }
}

/// Convert a planar buffer of any sample type with a normalization function
fn planar_f32<T, F>(buf: &AudioBuffer<T>, normalize: F) -> Planar
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    (0..channels)
        .map(|ch| buf.chan(ch).iter().map(|&s| normalize(s)).collect())
        .collect()
}

/// Convert Symphonia `AudioBufferRef` to planar f32 in [-1.0, 1.0]
fn to_planar_f32(decoded: AudioBufferRef<'_>) -> Planar {
    match decoded {
        // Float formats - already normalized
        AudioBufferRef::F32(buf) => planar_f32(&buf, |s| s),
        AudioBufferRef::F64(buf) => planar_f32(&buf, |s| s as f32),

        // Signed integer formats - normalize by dividing by MAX
        AudioBufferRef::S8(buf) => planar_f32(&buf, |s| s as f32 / i8::MAX as f32),
        AudioBufferRef::S16(buf) => planar_f32(&buf, |s| s as f32 / i16::MAX as f32),
        AudioBufferRef::S24(buf) => planar_f32(&buf, |s| s.inner() as f32 / 8_388_607.0),
        AudioBufferRef::S32(buf) => planar_f32(&buf, |s| s as f32 / i32::MAX as f32),

        // Unsigned integer formats - normalize and center around 0
        AudioBufferRef::U8(buf) => planar_f32(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0),
        AudioBufferRef::U16(buf) => {
            planar_f32(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            planar_f32(&buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            planar_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}

/// Shape planar audio to `channels` output channels
pub(crate) fn map_channels(planar: Planar, channels: usize) -> Planar {
    let source = planar.len();
    if source == channels || source == 0 {
        return planar;
    }

    let frames = planar[0].len();

    if source == 1 {
        return vec![planar[0].clone(); channels];
    }

    if channels == 1 {
        let mixed = (0..frames)
            .map(|i| planar.iter().map(|ch| ch[i]).sum::<f32>() / source as f32)
            .collect();
        return vec![mixed];
    }

    let mut mapped: Planar = planar.into_iter().take(channels).collect();
    mapped.resize(channels, vec![0.0; frames]);
    mapped
}

/// Interleave planar audio frame by frame
pub(crate) fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            interleaved.push(channel[frame]);
        }
    }
    interleaved
}
