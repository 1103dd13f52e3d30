//! Reconciliation of combinato spike detection and spike sorting outputs.
//!
//! Detection files hold every threshold crossing found on a channel, including
//! events later rejected as artifacts. Sort files hold the clustering of the
//! remaining events. This crate combines the two into the spike times and
//! waveforms of each accepted unit.
//!
//! Reading the HDF5 files requires the `hdf5` feature.

pub mod config;
pub mod error;
pub mod labels;
pub mod process;
#[cfg(feature = "hdf5")]
pub mod reader;
pub mod timestamps;
pub mod types;

// Re-export types
pub use error::{Result, SortingError};
pub use process::{collect_all_sorting, extract_clusters, sort_channels, ChannelOutcome};
pub use types::*;

#[cfg(feature = "hdf5")]
pub use reader::{load_channel, load_data_chan, load_sort_cat};

/// Reconciles one channel and splits it into cluster records.
///
/// # Examples
///
/// ```
/// use combinato_sorting::{sort_into_clusters, DetectionRecord, SortRecord};
/// use ndarray::{array, Array2};
///
/// let detection = DetectionRecord::new(
///     array![0.1, 0.2, 0.3, 0.4],
///     Array2::zeros((4, 64)),
///     array![0, 0, 1, 0],
/// )
/// .unwrap();
/// let sort = SortRecord::new(array![0, 1, 3], array![0, 1, 1], array![[0, -1], [1, 2]]).unwrap();
///
/// let clusters = sort_into_clusters(&detection, &sort).unwrap();
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].ind, 2);
/// assert_eq!(clusters[0].times, array![0.2, 0.4]);
/// ```
pub fn sort_into_clusters(detection: &DetectionRecord, sort: &SortRecord) -> Result<Vec<ClusterRecord>> {
    let sorting = collect_all_sorting(detection, sort)?;
    Ok(extract_clusters(&sorting))
}
