/// Symphonia-backed PCM source
use crate::error::{AudioError, Result};
use drumline_loudness::{LoudnessError, PcmSource};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Streams interleaved f32 PCM out of an audio file
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// The source owns the open file, container reader and codec. All of them
/// are released when the source is dropped, whichever way measurement ends.
pub struct SymphoniaSource {
    /// Format reader (container parser)
    format: Box<dyn FormatReader>,
    /// Audio decoder
    decoder: Box<dyn Decoder>,
    /// Track being decoded
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    /// Reused conversion buffer
    sample_buf: Option<SampleBuffer<f32>>,
    /// Frames `sample_buf` can hold
    sample_buf_frames: usize,
    finished: bool,
}

impl SymphoniaSource {
    /// Open a file and prepare its first audio track for decoding
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        Self::from_stream(mss, &hint)
    }

    /// Prepare decoding from an already opened media stream
    pub fn from_stream(mss: MediaSourceStream, hint: &Hint) -> Result<Self> {
        let probed = symphonia::default::get_probe()
            .format(
                hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to probe: {}", e)))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnsupportedFormat("No audio track found".to_string()))?;

        let track_id = track.id;
        // Unknown parameters surface as rate 0 / no channels and are
        // handled by the meter's validation
        let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let channels = track.codec_params.channels.map_or(0, |c| c.count());

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Symphonia(format!("Failed to create decoder: {}", e)))?;

        tracing::debug!(
            "Opened track {}: {} Hz, {} channels",
            track_id,
            sample_rate,
            channels
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            sample_buf: None,
            sample_buf_frames: 0,
            finished: false,
        })
    }

    /// Decode the next packet of our track into `sample_buf`
    ///
    /// Returns the number of samples written, or `None` at end of stream.
    fn decode_next(&mut self) -> std::result::Result<Option<usize>, LoudnessError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    tracing::warn!("Stream parameters changed mid-file, stopping decode");
                    return Ok(None);
                }
                Err(e) => return Err(LoudnessError::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt packet: skip it and keep going
                    tracing::warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(LoudnessError::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            if spec.channels.count() != self.channels {
                return Err(LoudnessError::Decode(format!(
                    "Channel count changed from {} to {}",
                    self.channels,
                    spec.channels.count()
                )));
            }

            let frames = decoded.capacity();
            if self.sample_buf.is_none() || self.sample_buf_frames < frames {
                self.sample_buf = Some(SampleBuffer::new(frames as u64, spec));
                self.sample_buf_frames = frames;
            }

            if let Some(buf) = self.sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                if buf.len() > 0 {
                    return Ok(Some(buf.len()));
                }
            }
        }
    }
}

impl PcmSource for SymphoniaSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn next_chunk(&mut self) -> drumline_loudness::Result<Option<&[f32]>> {
        if self.finished {
            return Ok(None);
        }

        match self.decode_next()? {
            Some(_) => Ok(self.sample_buf.as_ref().map(SampleBuffer::samples)),
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}
