//! Playback gain from integrated loudness
//!
//! Maps a measured loudness to the gain that brings the track to a target
//! level. Any measurement that is not a usable loudness (the silence
//! sentinel, negative infinity, NaN) yields no gain so playback stays at
//! its default volume.

use crate::{
    EBU_R128_BROADCAST_LUFS, EBU_R128_STREAMING_LUFS, MAX_PREAMP_DB, MIN_PREAMP_DB,
    REPLAYGAIN_REFERENCE_LUFS, SILENCE_LUFS,
};

/// Target level for normalization
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NormalizationTarget {
    /// No normalization applied
    #[default]
    Disabled,
    /// ReplayGain 2.0 reference (-18 LUFS)
    ReplayGain,
    /// EBU R128 broadcast level (-23 LUFS)
    Broadcast,
    /// Streaming platform level (-14 LUFS)
    Streaming,
    /// Arbitrary level in LUFS
    Custom(f64),
}

impl NormalizationTarget {
    /// Reference level in LUFS, `None` when disabled
    pub fn reference_lufs(&self) -> Option<f64> {
        match self {
            Self::Disabled => None,
            Self::ReplayGain => Some(REPLAYGAIN_REFERENCE_LUFS),
            Self::Broadcast => Some(EBU_R128_BROADCAST_LUFS),
            Self::Streaming => Some(EBU_R128_STREAMING_LUFS),
            Self::Custom(lufs) => Some(*lufs),
        }
    }

    /// Parse from a settings string
    ///
    /// Custom targets are not parsed here; callers build them from a number.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disabled" | "off" | "none" => Some(Self::Disabled),
            "replaygain" | "rg" | "track" => Some(Self::ReplayGain),
            "ebu_r128" | "ebur128" | "broadcast" => Some(Self::Broadcast),
            "streaming" | "ebu_streaming" => Some(Self::Streaming),
            _ => None,
        }
    }

    /// Settings string, `custom` for [`Self::Custom`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::ReplayGain => "replaygain",
            Self::Broadcast => "ebu_r128",
            Self::Streaming => "streaming",
            Self::Custom(_) => "custom",
        }
    }
}

/// Whether `lufs` is a loudness a gain can be derived from
pub fn is_measurable(lufs: f64) -> bool {
    lufs.is_finite() && lufs != SILENCE_LUFS
}

/// Converts measured loudness into playback gain
///
/// # Example
///
/// ```ignore
/// use drumline_loudness::{NormalizationTarget, VolumeNormalizer};
///
/// let normalizer = VolumeNormalizer::new(NormalizationTarget::ReplayGain);
/// if let Some(gain) = normalizer.linear_gain(lufs) {
///     channel.set_volume(gain);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeNormalizer {
    target: NormalizationTarget,
    /// Pre-amplification gain in dB (-12 to +12)
    preamp_db: f64,
    /// Upper bound on boost in dB, `None` for unbounded
    max_gain_db: Option<f64>,
}

impl VolumeNormalizer {
    pub fn new(target: NormalizationTarget) -> Self {
        Self {
            target,
            preamp_db: 0.0,
            max_gain_db: None,
        }
    }

    pub fn target(&self) -> NormalizationTarget {
        self.target
    }

    pub fn set_target(&mut self, target: NormalizationTarget) {
        self.target = target;
    }

    /// Set pre-amplification gain in dB, clamped to -12..=12
    pub fn set_preamp_db(&mut self, preamp_db: f64) {
        self.preamp_db = preamp_db.clamp(MIN_PREAMP_DB, MAX_PREAMP_DB);
    }

    pub fn preamp_db(&self) -> f64 {
        self.preamp_db
    }

    /// Limit how far quiet tracks may be boosted
    pub fn set_max_gain_db(&mut self, max_gain_db: Option<f64>) {
        self.max_gain_db = max_gain_db;
    }

    pub fn max_gain_db(&self) -> Option<f64> {
        self.max_gain_db
    }

    /// Gain in dB for a track measured at `lufs`
    ///
    /// `None` when normalization is disabled or the loudness is not
    /// measurable.
    pub fn gain_db(&self, lufs: f64) -> Option<f64> {
        let reference = self.target.reference_lufs()?;
        if !is_measurable(lufs) {
            return None;
        }

        let gain = reference - lufs + self.preamp_db;
        Some(match self.max_gain_db {
            Some(max) => gain.min(max),
            None => gain,
        })
    }

    /// Linear volume multiplier for a track measured at `lufs`
    pub fn linear_gain(&self, lufs: f64) -> Option<f32> {
        self.gain_db(lufs)
            .map(|db| 10.0_f64.powf(db / 20.0) as f32)
    }

    /// Apply the gain for `lufs` to a buffer in place
    ///
    /// Leaves the buffer untouched when no gain applies.
    pub fn process(&self, samples: &mut [f32], lufs: f64) {
        let Some(gain) = self.linear_gain(lufs) else {
            return;
        };

        if (gain - 1.0).abs() > 0.0001 {
            for sample in samples.iter_mut() {
                *sample *= gain;
            }
        }
    }
}

impl Default for VolumeNormalizer {
    fn default() -> Self {
        Self::new(NormalizationTarget::ReplayGain)
    }
}
