//! Audio file loading and decoding

use crossbeam_channel::{bounded, Receiver};
use std::path::{Path, PathBuf};
use std::thread;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during track loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Track metadata
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub duration_secs: f64,
    pub source_sample_rate: u32,
    pub source_channels: u16,
}

/// A loaded and decoded audio track
pub struct LoadedTrack {
    /// Interleaved stereo samples (f32, normalized to -1.0 to 1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Track metadata
    pub metadata: TrackMetadata,
}

impl LoadedTrack {
    /// Name to show for the track: tag title, else the file name
    pub fn display_name(&self, path: &Path) -> String {
        if self.metadata.title.is_empty() {
            path.file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string())
        } else {
            self.metadata.title.clone()
        }
    }
}

/// Result of a background load
pub enum LoadEvent {
    Loaded { path: PathBuf, track: LoadedTrack },
    Failed { path: PathBuf, error: LoadError },
}

/// Audio file loader using Symphonia
#[derive(Debug, Clone, Copy)]
pub struct TrackLoader {
    target_sample_rate: u32,
}

impl Default for TrackLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackLoader {
    /// Create a new track loader with default 48kHz sample rate
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a new track loader with specific sample rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Decode on a background thread; the result arrives on the returned channel
    pub fn spawn_load(&self, path: PathBuf) -> Receiver<LoadEvent> {
        let (tx, rx) = bounded(1);
        let loader = *self;
        thread::spawn(move || {
            let event = match loader.load(&path) {
                Ok(track) => LoadEvent::Loaded { path, track },
                Err(error) => {
                    warn!(path = %path.display(), %error, "track load failed");
                    LoadEvent::Failed { path, error }
                }
            };
            let _ = tx.send(event);
        });
        rx
    }

    /// Load and decode an audio file
    pub fn load(&self, path: &Path) -> Result<LoadedTrack, LoadError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from file extension
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
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        // Find first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2)
            .max(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut metadata = Self::extract_metadata(&mut format);
        metadata.source_sample_rate = source_sample_rate;
        metadata.source_channels = channels;

        // Decode all packets into interleaved samples
        let mut samples: Vec<f32> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        if samples.is_empty() {
            return Err(LoadError::Decode("no audio frames decoded".into()));
        }

        let stereo = to_stereo(&samples, channels);
        let total_frames = stereo.len() / 2;
        metadata.duration_secs = total_frames as f64 / source_sample_rate as f64;

        let (samples, sample_rate) = if source_sample_rate != self.target_sample_rate {
            (
                self.resample(&stereo, source_sample_rate)?,
                self.target_sample_rate,
            )
        } else {
            (stereo, source_sample_rate)
        };

        info!(
            path = %path.display(),
            secs = metadata.duration_secs,
            source_rate = source_sample_rate,
            "track decoded"
        );

        Ok(LoadedTrack {
            samples,
            sample_rate,
            metadata,
        })
    }

    /// Resample interleaved stereo audio to the target sample rate
    fn resample(&self, samples: &[f32], source_rate: u32) -> Result<Vec<f32>, LoadError> {
        use rubato::{FftFixedInOut, Resampler};

        const CHANNELS: usize = 2;
        let frames = samples.len() / CHANNELS;

        let mut resampler = FftFixedInOut::<f32>::new(
            source_rate as usize,
            self.target_sample_rate as usize,
            1024,
            CHANNELS,
        )
        .map_err(|e| LoadError::Decode(e.to_string()))?;

        // Deinterleave
        let deinterleaved: Vec<Vec<f32>> = (0..CHANNELS)
            .map(|ch| (0..frames).map(|f| samples[f * CHANNELS + ch]).collect())
            .collect();

        let chunk_size = resampler.input_frames_next();
        let mut output: Vec<Vec<f32>> = vec![Vec::new(); CHANNELS];

        let mut pos = 0;
        while pos + chunk_size <= frames {
            let input_refs: Vec<&[f32]> = deinterleaved
                .iter()
                .map(|ch| &ch[pos..pos + chunk_size])
                .collect();

            let resampled = resampler
                .process(&input_refs, None)
                .map_err(|e| LoadError::Decode(e.to_string()))?;

            for (ch, data) in resampled.into_iter().enumerate() {
                output[ch].extend(data);
            }

            pos += chunk_size;
        }

        // Tail: pad with zeros and keep only the proportional output
        if pos < frames {
            let remaining = frames - pos;
            let padded: Vec<Vec<f32>> = deinterleaved
                .iter()
                .map(|ch| {
                    let mut v = ch[pos..].to_vec();
                    v.resize(chunk_size, 0.0);
                    v
                })
                .collect();

            let input_refs: Vec<&[f32]> = padded.iter().map(|v| v.as_slice()).collect();

            if let Ok(resampled) = resampler.process(&input_refs, None) {
                let output_frames =
                    (remaining * self.target_sample_rate as usize) / source_rate as usize;
                for (ch, data) in resampled.into_iter().enumerate() {
                    output[ch].extend(&data[..output_frames.min(data.len())]);
                }
            }
        }

        // Reinterleave
        let output_frames = output[0].len();
        let mut interleaved = Vec::with_capacity(output_frames * CHANNELS);
        for frame_idx in 0..output_frames {
            for channel in &output {
                interleaved.push(channel[frame_idx]);
            }
        }

        Ok(interleaved)
    }

    /// Extract tag metadata from the format reader
    fn extract_metadata(
        format: &mut Box<dyn symphonia::core::formats::FormatReader>,
    ) -> TrackMetadata {
        let mut metadata = TrackMetadata::default();

        if let Some(meta) = format.metadata().current() {
            for tag in meta.tags() {
                match tag.std_key {
                    Some(symphonia::core::meta::StandardTagKey::TrackTitle) => {
                        metadata.title = tag.value.to_string();
                    }
                    Some(symphonia::core::meta::StandardTagKey::Artist) => {
                        metadata.artist = tag.value.to_string();
                    }
                    _ => {}
                }
            }
        }

        metadata
    }
}

/// Convert interleaved audio with any channel count to interleaved stereo
///
/// Mono is duplicated to both sides; extra channels beyond the first two are
/// dropped.
pub fn to_stereo(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples
            .chunks_exact(n as usize)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_duplicated() {
        assert_eq!(to_stereo(&[0.1, 0.2], 1), vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_surround_keeps_front_pair() {
        let six = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        assert_eq!(to_stereo(&six, 6), vec![1.0, 2.0, 7.0, 8.0]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = TrackLoader::new();
        let result = loader.load(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_spawn_load_reports_failure() {
        let loader = TrackLoader::with_sample_rate(44100);
        let rx = loader.spawn_load(PathBuf::from("/definitely/not/here.mp3"));
        match rx.recv().unwrap() {
            LoadEvent::Failed { path, error } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.mp3"));
                assert!(matches!(error, LoadError::Io(_)));
            }
            LoadEvent::Loaded { .. } => panic!("loaded a missing file"),
        }
    }

    #[test]
    fn test_resample_changes_length_proportionally() {
        let loader = TrackLoader::with_sample_rate(48000);
        // one second of stereo at 24 kHz
        let samples = vec![0.25f32; 24000 * 2];
        let out = loader.resample(&samples, 24000).unwrap();
        let frames = out.len() / 2;
        // FFT resampler has some latency; allow a chunk of slack
        assert!(frames > 46000 && frames <= 48000 + 2048, "got {frames}");
    }

    #[test]
    fn test_display_name_falls_back_to_file_name() {
        let track = LoadedTrack {
            samples: Vec::new(),
            sample_rate: 48000,
            metadata: TrackMetadata::default(),
        };
        assert_eq!(track.display_name(Path::new("/a/b/talk.mp3")), "talk.mp3");
    }
}
