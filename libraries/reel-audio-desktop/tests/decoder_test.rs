//! Decoder tests against synthesized WAV files
//!
//! These run without an audio device: they exercise the file -> device-shaped chunk
//! path that feeds the output stream.

use reel_audio_desktop::TrackDecoder;
use reel_playback::PlaybackError;
use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a 440 Hz sine WAV and return its path
fn write_sine_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, frames: usize) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for frame in 0..frames {
        let t = frame as f32 / sample_rate as f32;
        let sample = ((2.0 * PI * 440.0 * t).sin() * 0.5 * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
    path
}

fn decode_all(decoder: &mut TrackDecoder) -> Vec<f32> {
    let mut samples = Vec::new();
    while let Some(chunk) = decoder.next_chunk().unwrap() {
        assert!(!chunk.is_empty());
        samples.extend(chunk);
    }
    samples
}

#[test]
fn stereo_at_device_rate_passes_through() {
    let temp = TempDir::new().unwrap();
    let path = write_sine_wav(temp.path(), "stereo.wav", 44100, 2, 22050);

    let mut decoder = TrackDecoder::open(&path, 44100, 2).unwrap();
    assert_eq!(decoder.source_rate(), 44100);

    let samples = decode_all(&mut decoder);

    assert_eq!(samples.len(), 22050 * 2);
    assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    assert!(samples.iter().any(|s| s.abs() > 0.4));

    // Exhausted decoder keeps reporting the end
    assert!(decoder.next_chunk().unwrap().is_none());
}

#[test]
fn mono_file_fills_both_device_channels() {
    let temp = TempDir::new().unwrap();
    let path = write_sine_wav(temp.path(), "mono.wav", 44100, 1, 4410);

    let mut decoder = TrackDecoder::open(&path, 44100, 2).unwrap();
    let samples = decode_all(&mut decoder);

    assert_eq!(samples.len(), 4410 * 2);
    for frame in samples.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
    }
}

#[test]
fn stereo_file_on_mono_device() {
    let temp = TempDir::new().unwrap();
    let path = write_sine_wav(temp.path(), "stereo.wav", 44100, 2, 4410);

    let mut decoder = TrackDecoder::open(&path, 44100, 1).unwrap();
    let samples = decode_all(&mut decoder);

    assert_eq!(decoder.output_channels(), 1);
    assert_eq!(samples.len(), 4410);
}

#[test]
fn resamples_to_device_rate() {
    let temp = TempDir::new().unwrap();
    let path = write_sine_wav(temp.path(), "cd.wav", 44100, 2, 44100);

    let mut decoder = TrackDecoder::open(&path, 48000, 2).unwrap();
    let samples = decode_all(&mut decoder);

    assert_eq!(samples.len() % 2, 0);
    let frames = samples.len() / 2;
    // One second of audio, allowing for resampler delay at the edges
    assert!(
        (45_000..=50_000).contains(&frames),
        "expected about 48000 frames, got {}",
        frames
    );
    assert!(samples.iter().all(|s| s.is_finite()));
}

#[test]
fn garbage_file_fails_to_probe() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("noise.mp3");
    fs::write(&path, vec![0x42; 4096]).unwrap();

    let result = TrackDecoder::open(&path, 44100, 2);

    assert!(matches!(
        result,
        Err(PlaybackError::Probe(_) | PlaybackError::NoAudioTrack(_) | PlaybackError::Decoder(_))
    ));
}

#[test]
fn missing_file_fails_to_open() {
    let temp = TempDir::new().unwrap();

    let result = TrackDecoder::open(temp.path().join("gone.wav"), 44100, 2);

    assert!(matches!(result, Err(PlaybackError::Open { .. })));
}
