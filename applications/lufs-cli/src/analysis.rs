/// Concurrent file analysis
use drumline_audio::AudioError;
use drumline_loudness::{is_measurable, LoudnessMeasurement, VolumeNormalizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// How a track's measurement turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    /// Loudness measured, gain available
    Measured,
    /// Decoded fine but too short or too quiet to normalize
    Unmeasurable,
    /// Sample rate or channel layout the meter does not handle
    Unsupported,
    /// File could not be opened or decoded
    Failed,
}

/// Result row for one file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport {
    pub path: String,
    pub status: TrackStatus,
    /// Integrated loudness in LUFS (absent when not finite)
    pub lufs: Option<f64>,
    /// Gain to apply in dB
    pub gain_db: Option<f64>,
    /// Volume multiplier for playback
    pub linear_gain: Option<f32>,
    pub duration_seconds: Option<f64>,
    pub error: Option<String>,
}

impl TrackReport {
    /// Classify a measurement outcome and derive its playback gain
    pub fn from_result(
        path: &Path,
        result: Result<LoudnessMeasurement, AudioError>,
        normalizer: &VolumeNormalizer,
    ) -> Self {
        let path = path.display().to_string();

        match result {
            Ok(measurement) => {
                let lufs = measurement.integrated_lufs;
                let status = if is_measurable(lufs) {
                    TrackStatus::Measured
                } else {
                    TrackStatus::Unmeasurable
                };

                Self {
                    path,
                    status,
                    lufs: lufs.is_finite().then_some(lufs),
                    gain_db: normalizer.gain_db(lufs),
                    linear_gain: normalizer.linear_gain(lufs),
                    duration_seconds: Some(measurement.duration_seconds),
                    error: None,
                }
            }
            Err(err) => {
                let status = if err.is_unsupported_layout() {
                    TrackStatus::Unsupported
                } else {
                    TrackStatus::Failed
                };
                tracing::warn!("{}: normalization unavailable: {}", path, err);
                Self::failed(path, status, err.to_string())
            }
        }
    }

    fn failed(path: String, status: TrackStatus, error: String) -> Self {
        Self {
            path,
            status,
            lufs: None,
            gain_db: None,
            linear_gain: None,
            duration_seconds: None,
            error: Some(error),
        }
    }
}

/// Measure one file on the blocking pool
pub async fn measure_file(path: PathBuf) -> Result<LoudnessMeasurement, AudioError> {
    let task_path = path.clone();
    match tokio::task::spawn_blocking(move || drumline_audio::file_loudness(&task_path)).await {
        Ok(result) => result,
        Err(e) => Err(AudioError::DecodeError(format!(
            "Analysis task for {} failed: {}",
            path.display(),
            e
        ))),
    }
}

/// Measure many files with at most `jobs` running at once
///
/// Reports come back in input order. Every file gets its own decoder and
/// meter; a failure only affects that file's row.
pub async fn analyze_files(
    paths: Vec<PathBuf>,
    jobs: usize,
    normalizer: &VolumeNormalizer,
) -> Vec<TrackReport> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            tracing::info!("Analyzing {}", path.display());
            let result = measure_file(path.clone()).await;
            (index, path, result)
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, path, result)) => {
                reports.push((index, TrackReport::from_result(&path, result, normalizer)));
            }
            Err(e) => tracing::error!("Analysis task panicked: {}", e),
        }
    }

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}
