//! Error types for spike sorting reconciliation.

use std::path::PathBuf;

/// Result type alias for sorting operations.
pub type Result<T> = std::result::Result<T, SortingError>;

/// Errors raised while loading or reconciling spike sorting data.
///
/// Every variant is fatal for the channel being processed. An empty result
/// (no valid clusters, no surviving events) is not an error.
#[derive(Debug, thiserror::Error)]
pub enum SortingError {
    /// Detection arrays disagree in event count.
    #[error(
        "detection record is inconsistent: {times} times, {waveforms} waveforms, {artifacts} artifact flags"
    )]
    DetectionShape {
        /// Length of the times array.
        times: usize,
        /// Number of waveform rows.
        waveforms: usize,
        /// Length of the artifacts array.
        artifacts: usize,
    },

    /// Sort arrays have mismatched or invalid shapes.
    #[error("sort record is inconsistent: {message}")]
    SortShape {
        /// Description of the mismatch.
        message: String,
    },

    /// The sort index does not cover exactly the non-artifact detection events.
    #[error(
        "sort index has {index_len} entries but detection record has {sortable} non-artifact events"
    )]
    ArtifactCountMismatch {
        /// Length of the sort index.
        index_len: usize,
        /// Number of detection events not flagged as artifacts.
        sortable: usize,
    },

    /// A sort index entry points outside the detection arrays.
    #[error("sort index entry {value} at position {position} is outside 0..{n_detected}")]
    IndexOutOfBounds {
        /// The offending index value.
        value: i64,
        /// Position of the entry within the sort index.
        position: usize,
        /// Number of detection events.
        n_detected: usize,
    },

    /// A sort index entry points at an event flagged as an artifact.
    #[error("sort index entry {value} at position {position} refers to an artifact event")]
    IndexNotSortable {
        /// The offending index value.
        value: i64,
        /// Position of the entry within the sort index.
        position: usize,
    },

    /// A sort index entry repeats a detection event already listed.
    #[error("sort index entry {value} at position {position} repeats an earlier entry")]
    DuplicateIndex {
        /// The repeated index value.
        value: i64,
        /// Position of the repeated entry within the sort index.
        position: usize,
    },

    /// A class label has no row in the class to group mapping.
    #[error("class {class} at position {position} has no group assignment")]
    UnmappedClass {
        /// The unmapped class label.
        class: i64,
        /// Position of the event within the sort record.
        position: usize,
    },

    /// A class label has more than one row in the class to group mapping.
    #[error("class {class} has more than one group assignment")]
    DuplicateClass {
        /// The duplicated class label.
        class: i64,
    },

    /// Waveform snapshots have an unexpected number of samples.
    #[error("waveforms have {found} samples per event, expected {expected}")]
    WaveformWidth {
        /// Configured waveform width.
        expected: usize,
        /// Width found in the data.
        found: usize,
    },

    /// Sampling rate must be strictly positive.
    #[error("invalid sampling rate: {fs}")]
    InvalidSampleRate {
        /// The rejected sampling rate.
        fs: f64,
    },

    /// Unrecognized polarity name.
    #[error("unknown polarity '{name}', expected 'neg' or 'pos'")]
    UnknownPolarity {
        /// The rejected name.
        name: String,
    },

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read an HDF5 file.
    #[cfg(feature = "hdf5")]
    #[error("failed to read HDF5 file '{path}'")]
    Hdf5 {
        /// Path to the HDF5 file.
        path: PathBuf,
        /// Underlying HDF5 error.
        #[source]
        source: hdf5::Error,
    },
}
