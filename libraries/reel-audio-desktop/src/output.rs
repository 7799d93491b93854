/// CPAL-based playback engine (audio thread + decoder thread)
use crate::decoder::TrackDecoder;
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use reel_playback::volume::{clamp_level, perceptual_gain};
use reel_playback::{PlaybackEngine, PlaybackError, TrackRef};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// Decoded chunks buffered between the decoder thread and the audio callback
const CHUNK_QUEUE_CAPACITY: usize = 16;

/// Commands sent to the audio thread
enum AudioCommand {
    /// Shutdown the audio thread
    Shutdown,
}

/// Track currently feeding the output stream
struct Playback {
    chunks: Receiver<Vec<f32>>,
    current: Vec<f32>,
    position: usize,
}

impl Playback {
    fn new(chunks: Receiver<Vec<f32>>) -> Self {
        Self {
            chunks,
            current: Vec::new(),
            position: 0,
        }
    }

    /// Fill `output` with gain applied, returning false once the track is exhausted
    ///
    /// An empty queue with a live decoder is an underrun: silence, still playing.
    fn fill(&mut self, output: &mut [f32], gain: f32) -> bool {
        let mut written = 0;
        while written < output.len() {
            if self.position >= self.current.len() {
                match self.chunks.try_recv() {
                    Ok(chunk) => {
                        self.current = chunk;
                        self.position = 0;
                        continue;
                    }
                    Err(TryRecvError::Empty) => {
                        output[written..].fill(0.0);
                        return true;
                    }
                    Err(TryRecvError::Disconnected) => {
                        output[written..].fill(0.0);
                        return false;
                    }
                }
            }

            let count = (self.current.len() - self.position).min(output.len() - written);
            let source = &self.current[self.position..self.position + count];
            for (out, sample) in output[written..written + count].iter_mut().zip(source) {
                *out = sample * gain;
            }
            written += count;
            self.position += count;
        }
        true
    }
}

/// Shared audio state between engine handle and audio callback
struct AudioState {
    playback: Mutex<Option<Playback>>,
    /// Track is loaded and not yet exhausted
    active: AtomicBool,
    /// Linear gain stored as f32 bits
    gain: AtomicU32,
}

impl AudioState {
    fn new() -> Self {
        Self {
            playback: Mutex::new(None),
            active: AtomicBool::new(false),
            gain: AtomicU32::new(perceptual_gain(0.5).to_bits()),
        }
    }

    fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    fn lock_playback(&self) -> MutexGuard<'_, Option<Playback>> {
        self.playback
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Render one callback buffer
    fn render(&self, output: &mut [f32]) {
        let gain = self.gain();
        let Ok(mut slot) = self.playback.try_lock() else {
            // Engine handle is swapping tracks
            output.fill(0.0);
            return;
        };

        let finished = match slot.as_mut() {
            Some(playback) => !playback.fill(output, gain),
            None => {
                output.fill(0.0);
                false
            }
        };

        if finished {
            *slot = None;
            self.active.store(false, Ordering::Release);
        }
    }

    /// Drop the current track after a stream error so the manager sees it end
    fn abort(&self) {
        *self.lock_playback() = None;
        self.active.store(false, Ordering::Release);
    }
}

/// CPAL playback engine
///
/// **Architecture**: a dedicated audio thread owns the CPAL Stream for the whole
/// session, rendering silence while idle. Each `load_and_play` opens the file on the
/// caller's thread (so open and probe failures are returned synchronously), then
/// spawns a decoder thread that streams device-shaped chunks into a bounded channel
/// read by the audio callback. Dropping the receiver ends the decoder thread.
pub struct CpalEngine {
    /// Channel to send commands to the audio thread
    command_tx: Sender<AudioCommand>,
    /// Output device format
    sample_rate: u32,
    channels: usize,
    state: Arc<AudioState>,
    /// Handle to the audio thread (optional, for joining on drop)
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalEngine {
    /// Open the default output device and start the output stream
    ///
    /// # Errors
    /// Returns an error if no audio device is found or the stream cannot be started.
    /// Both are fatal for the application.
    pub fn new() -> Result<Self> {
        let state = Arc::new(AudioState::new());
        let (command_tx, command_rx) = bounded::<AudioCommand>(4);
        let (ready_tx, ready_rx) = bounded::<Result<(u32, usize)>>(1);

        let state_clone = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("reel-audio".to_string())
            .spawn(move || Self::audio_thread_run(&state_clone, &command_rx, &ready_tx))
            .map_err(|e| AudioError::Thread(e.to_string()))?;

        let (sample_rate, channels) = ready_rx
            .recv()
            .map_err(|_| AudioError::Thread("audio thread exited during startup".into()))??;

        tracing::info!(
            "Audio output ready: {} Hz, {} channels",
            sample_rate,
            channels
        );

        Ok(Self {
            command_tx,
            sample_rate,
            channels,
            state,
            audio_thread: Some(audio_thread),
        })
    }

    /// Output device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output device channel count
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Audio thread main loop
    ///
    /// Builds the stream, reports the device format (or the failure), then keeps the
    /// stream alive until shutdown.
    fn audio_thread_run(
        state: &Arc<AudioState>,
        command_rx: &Receiver<AudioCommand>,
        ready_tx: &Sender<Result<(u32, usize)>>,
    ) {
        let stream = match Self::open_stream(state) {
            Ok((stream, sample_rate, channels)) => {
                let _ = ready_tx.send(Ok((sample_rate, channels)));
                stream
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        // Process commands
        while let Ok(cmd) = command_rx.recv() {
            match cmd {
                AudioCommand::Shutdown => break,
            }
        }

        drop(stream);
        tracing::debug!("Audio thread stopped");
    }

    fn open_stream(state: &Arc<AudioState>) -> Result<(Stream, u32, usize)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = usize::from(config.channels);

        tracing::debug!(
            "Output device {}: {:?} {} Hz, {} channels",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_format,
            sample_rate,
            channels
        );

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, state)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, state)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, state)?,
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &config, state)?,
            other => {
                return Err(AudioError::DeviceError(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream.play()?;
        Ok((stream, sample_rate, channels))
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        state: &Arc<AudioState>,
    ) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let render_state = Arc::clone(state);
        let error_state = Arc::clone(state);
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                render_state.render(&mut scratch);
                for (out, sample) in data.iter_mut().zip(&scratch) {
                    *out = T::from_sample(*sample);
                }
            },
            move |err| {
                tracing::error!("Audio stream error: {}", err);
                error_state.abort();
            },
            None,
        )?;

        Ok(stream)
    }
}

impl PlaybackEngine for CpalEngine {
    fn load_and_play(&mut self, track: &TrackRef) -> std::result::Result<(), PlaybackError> {
        let mut decoder = TrackDecoder::open(track.path(), self.sample_rate, self.channels)?;
        let (chunk_tx, chunk_rx) = bounded::<Vec<f32>>(CHUNK_QUEUE_CAPACITY);

        let name = track.to_string();
        thread::Builder::new()
            .name("reel-decoder".to_string())
            .spawn(move || loop {
                match decoder.next_chunk() {
                    Ok(Some(chunk)) => {
                        if chunk_tx.send(chunk).is_err() {
                            // Receiver dropped: playback was stopped or replaced
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Decoding {} failed: {}", name, e);
                        break;
                    }
                }
            })
            .map_err(|e| PlaybackError::Engine(e.to_string()))?;

        let mut slot = self.state.lock_playback();
        *slot = Some(Playback::new(chunk_rx));
        self.state.active.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) {
        let mut slot = self.state.lock_playback();
        *slot = None;
        self.state.active.store(false, Ordering::Release);
    }

    fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    fn set_volume(&mut self, level: f32) {
        let gain = perceptual_gain(clamp_level(level));
        self.state.gain.store(gain.to_bits(), Ordering::Relaxed);
    }
}

impl Drop for CpalEngine {
    fn drop(&mut self) {
        self.stop();
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}
