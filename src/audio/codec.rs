//! Container decode and WAV encode for the editor buffer.
//!
//! WAV goes through `hound` first; anything `hound` rejects is retried with
//! rodio's decoder so other formats and slightly malformed headers still load.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use hound::SampleFormat;
use rodio::{Decoder, Source};
use thiserror::Error;
use tracing::debug;

/// Mono samples produced by [`decode`] along with the source format.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Channel-averaged samples.
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    /// Channel count of the source before downmixing.
    pub channels: u16,
    pub duration_seconds: f64,
}

/// Errors raised while decoding audio.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read audio file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported or corrupt audio data: {message}")]
    Invalid { message: String },
    #[error("Failed to read sample: {source}")]
    Sample { source: hound::Error },
    #[error("Audio contains no samples")]
    Empty,
    #[error("Audio reports an invalid sample rate")]
    InvalidSampleRate,
    #[error("Failed to start decode worker: {source}")]
    SpawnWorker { source: std::io::Error },
    #[error("Decode worker stopped before delivering a result")]
    WorkerGone,
}

/// Errors raised while writing audio.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to create {path}: {source}")]
    Create { path: PathBuf, source: hound::Error },
    #[error("Failed to write sample to {path}: {source}")]
    Write { path: PathBuf, source: hound::Error },
    #[error("Failed to finalize {path}: {source}")]
    Finalize { path: PathBuf, source: hound::Error },
    #[error("Cannot write audio at sample rate {0}")]
    InvalidSampleRate(u32),
}

/// Decode the file at `path` into mono samples.
pub fn decode(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let hint = path.extension().and_then(|ext| ext.to_str());
    decode_bytes(&bytes, hint)
}

/// Decode in-memory container bytes; `hint` is the file extension if known.
pub fn decode_bytes(bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    let decoded = match decode_wav(bytes)? {
        Some(decoded) => decoded,
        None => decode_with_rodio(bytes, hint)?,
    };
    if decoded.samples.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(decoded)
}

fn decode_wav(bytes: &[u8]) -> Result<Option<DecodedAudio>, DecodeError> {
    let mut reader = match hound::WavReader::new(Cursor::new(bytes)) {
        Ok(reader) => reader,
        Err(err) => {
            debug!("hound rejected input, falling back to rodio: {err}");
            return Ok(None);
        }
    };
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(DecodeError::InvalidSampleRate);
    }
    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from).map_err(|source| DecodeError::Sample { source }))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f64;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| f64::from(v) / scale)
                        .map_err(|source| DecodeError::Sample { source })
                })
                .collect::<Result<_, _>>()?
        }
    };
    Ok(Some(finish(interleaved, spec.channels, spec.sample_rate)))
}

fn decode_with_rodio(bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    let owned: Arc<[u8]> = Arc::from(bytes.to_vec());
    let byte_len = owned.len() as u64;
    let mut builder = Decoder::builder()
        .with_data(Cursor::new(owned))
        .with_byte_len(byte_len)
        .with_seekable(false);
    if let Some(hint) = hint {
        builder = builder.with_hint(hint);
    }
    let decoder = builder.build().map_err(|error| DecodeError::Invalid {
        message: error.to_string(),
    })?;
    let sample_rate = decoder.sample_rate();
    if sample_rate == 0 {
        return Err(DecodeError::InvalidSampleRate);
    }
    let channels = decoder.channels();
    let interleaved: Vec<f64> = decoder.map(f64::from).collect();
    Ok(finish(interleaved, channels, sample_rate))
}

fn finish(interleaved: Vec<f64>, channels: u16, sample_rate: u32) -> DecodedAudio {
    let channels = channels.max(1);
    let samples = downmix(interleaved, channels as usize);
    let duration_seconds = samples.len() as f64 / sample_rate as f64;
    DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_seconds,
    }
}

/// Average interleaved frames into one channel. A trailing partial frame is dropped.
pub fn downmix(interleaved: Vec<f64>, channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

/// Write mono samples to `path` as 32-bit float WAV.
pub fn encode(path: &Path, samples: &[f64], sample_rate: u32) -> Result<(), EncodeError> {
    if sample_rate == 0 {
        return Err(EncodeError::InvalidSampleRate(sample_rate));
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|source| EncodeError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    for &sample in samples {
        writer
            .write_sample(sample as f32)
            .map_err(|source| EncodeError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.finalize().map_err(|source| EncodeError::Finalize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn wav_bytes_i16(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
            for &sample in samples {
                writer.write_sample(sample).expect("write sample");
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    #[test]
    fn int_wav_is_scaled_to_unit_range() {
        let bytes = wav_bytes_i16(1, &[0, 16_384, -32_768]);
        let decoded = decode_bytes(&bytes, Some("wav")).unwrap();
        assert_eq!(decoded.samples, vec![0.0, 0.5, -1.0]);
        assert_eq!(decoded.sample_rate, 48_000);
        assert_eq!(decoded.channels, 1);
    }

    #[test]
    fn stereo_is_averaged_to_mono() {
        let bytes = wav_bytes_i16(2, &[16_384, 0, -16_384, -16_384]);
        let decoded = decode_bytes(&bytes, None).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples, vec![0.25, -0.5]);
        assert!((decoded.duration_seconds - 2.0 / 48_000.0).abs() < 1e-12);
    }

    #[test]
    fn empty_wav_is_rejected() {
        let bytes = wav_bytes_i16(1, &[]);
        assert!(matches!(decode_bytes(&bytes, None), Err(DecodeError::Empty)));
    }

    #[test]
    fn garbage_is_reported_invalid() {
        let err = decode_bytes(b"definitely not audio", Some("wav")).unwrap_err();
        assert!(matches!(err, DecodeError::Invalid { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.wav");
        match decode(&missing) {
            Err(DecodeError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn rodio_fallback_decodes_ill_formed_byte_rate() {
        let mut bytes = wav_bytes_i16(1, &[0, 1000, -1000, 0]);
        // Zero the fmt chunk's byte-rate field so hound refuses the header.
        let byte_rate_offset = 12 + 8 + 2 + 2 + 4;
        bytes[byte_rate_offset..byte_rate_offset + 4].copy_from_slice(&0u32.to_le_bytes());
        assert!(hound::WavReader::new(Cursor::new(bytes.as_slice())).is_err());

        let decoded = decode_bytes(&bytes, Some("wav")).unwrap();
        assert_eq!(decoded.sample_rate, 48_000);
        assert!(!decoded.samples.is_empty());
    }

    #[test]
    fn encode_writes_float_wav_that_decodes_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = vec![0.0, 0.25, -0.75, 1.0];
        encode(&path, &samples, 22_050).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_format, SampleFormat::Float);
        assert_eq!(reader.spec().bits_per_sample, 32);

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.samples, samples);
        assert_eq!(decoded.sample_rate, 22_050);
    }

    #[test]
    fn encode_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("out.wav");
        let err = encode(&path, &[0.0], 44_100).unwrap_err();
        assert!(matches!(err, EncodeError::Create { .. }));
    }
}
