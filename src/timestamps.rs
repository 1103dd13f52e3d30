//! Conversions between sample counts and time values.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SortingError};

/// Unit of a time value returned by [`convert_samples_to_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Time in seconds
    Seconds,
    /// Time in minutes
    #[default]
    Minutes,
}

fn check_sample_rate(fs: f64) -> Result<()> {
    if !(fs > 0.0 && fs.is_finite()) {
        return Err(SortingError::InvalidSampleRate { fs });
    }
    Ok(())
}

/// Converts a number of samples to the length of time they span.
///
/// # Examples
///
/// ```
/// use combinato_sorting::timestamps::{convert_samples_to_time, TimeUnit};
///
/// let minutes = convert_samples_to_time(60_000, 1000.0, TimeUnit::Minutes).unwrap();
/// assert_eq!(minutes, 1.0);
/// ```
pub fn convert_samples_to_time(n_samples: usize, fs: f64, unit: TimeUnit) -> Result<f64> {
    check_sample_rate(fs)?;

    let n_seconds = n_samples as f64 / fs;
    Ok(match unit {
        TimeUnit::Seconds => n_seconds,
        TimeUnit::Minutes => n_seconds / 60.0,
    })
}

/// Creates timestamps, in seconds, for `n_samples` consecutive samples.
///
/// The first sample is at `offset` and each following sample is `1 / fs` later.
pub fn create_timestamps_from_samples(n_samples: usize, fs: f64, offset: f64) -> Result<Array1<f64>> {
    check_sample_rate(fs)?;

    Ok(Array1::from_iter(
        (0..n_samples).map(|sample| offset + sample as f64 / fs),
    ))
}

/// Creates timestamps for a run of sample indices.
///
/// One timestamp is produced per entry of `samples`, starting at the time of
/// the first sample index plus `offset`.
pub fn create_timestamps_from_sample_indices(samples: &[i64], fs: f64, offset: f64) -> Result<Array1<f64>> {
    let start = match samples.first() {
        Some(&first) => offset + first as f64 / fs,
        None => offset,
    };
    create_timestamps_from_samples(samples.len(), fs, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_samples_to_time() {
        assert_eq!(convert_samples_to_time(1000, 500.0, TimeUnit::Seconds).unwrap(), 2.0);
        assert_eq!(convert_samples_to_time(60_000, 500.0, TimeUnit::Minutes).unwrap(), 2.0);
        assert!(matches!(
            convert_samples_to_time(10, 0.0, TimeUnit::Seconds),
            Err(SortingError::InvalidSampleRate { .. })
        ));
    }

    #[test]
    fn test_create_timestamps_from_samples() {
        let timestamps = create_timestamps_from_samples(4, 2.0, 1.0).unwrap();
        assert_eq!(timestamps.to_vec(), vec![1.0, 1.5, 2.0, 2.5]);

        assert!(create_timestamps_from_samples(0, 2.0, 0.0).unwrap().is_empty());
        assert!(create_timestamps_from_samples(4, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_create_timestamps_from_sample_indices() {
        let timestamps = create_timestamps_from_sample_indices(&[8, 9, 10], 4.0, 0.5).unwrap();
        assert_eq!(timestamps.to_vec(), vec![2.5, 2.75, 3.0]);
    }
}
