use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SortingError};

/// Conventional number of samples in a combinato waveform snapshot.
pub const DEFAULT_WAVEFORM_SAMPLES: usize = 64;

/// Polarity of detected spike events.
///
/// Combinato detects threshold crossings separately for negative and positive
/// deflections and stores them under the `neg` and `pos` groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// Negative-going spikes (`neg`)
    #[default]
    #[serde(rename = "neg")]
    Negative,
    /// Positive-going spikes (`pos`)
    #[serde(rename = "pos")]
    Positive,
}

impl Polarity {
    /// Returns the label used for this polarity in combinato files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Negative => "neg",
            Polarity::Positive => "pos",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Polarity {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neg" => Ok(Polarity::Negative),
            "pos" => Ok(Polarity::Positive),
            _ => Err(SortingError::UnknownPolarity {
                name: s.to_string(),
            }),
        }
    }
}

/// Identifies one channel, polarity and reviewer combination.
///
/// Each combination is reconciled independently of all others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    /// Channel number or label, as used in `data_chan_<channel>.h5`
    pub channel: String,
    /// Which polarity of detected spikes
    pub polarity: Polarity,
    /// Initials of the person who reviewed the sorting, if any
    pub reviewer: Option<String>,
}

impl ChannelKey {
    /// Creates a key with no reviewer.
    pub fn new(channel: impl fmt::Display, polarity: Polarity) -> Self {
        ChannelKey {
            channel: channel.to_string(),
            polarity,
            reviewer: None,
        }
    }

    /// Sets the reviewer for this key.
    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.reviewer {
            Some(reviewer) => write!(f, "chan_{} ({}, {})", self.channel, self.polarity, reviewer),
            None => write!(f, "chan_{} ({})", self.channel, self.polarity),
        }
    }
}

/// All candidate spike events detected on one channel for one polarity.
///
/// This is the content of a `data_chan_XX.h5` detection file, before any
/// clustering. Events flagged as artifacts were never passed to the sorter,
/// so this record holds more events than the matching [`SortRecord`].
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    /// Time of each detected event
    pub times: Array1<f64>,
    /// Waveform snapshot of each event
    /// - Shape: [num_events, waveform_samples]
    pub waveforms: Array2<f64>,
    /// Artifact flag of each event
    /// - 0: event was passed to clustering
    /// - nonzero: event was rejected as an artifact (value is the artifact category)
    pub artifacts: Array1<i64>,
}

impl DetectionRecord {
    /// Creates a detection record, checking that all fields hold the same number of events.
    pub fn new(times: Array1<f64>, waveforms: Array2<f64>, artifacts: Array1<i64>) -> Result<Self> {
        let record = DetectionRecord {
            times,
            waveforms,
            artifacts,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks that times, waveforms and artifacts are index-aligned.
    pub fn validate(&self) -> Result<()> {
        let times = self.times.len();
        let waveforms = self.waveforms.nrows();
        let artifacts = self.artifacts.len();
        if times != waveforms || times != artifacts {
            return Err(SortingError::DetectionShape {
                times,
                waveforms,
                artifacts,
            });
        }
        Ok(())
    }

    /// Returns the number of detected events.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if no events were detected.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the number of events flagged as artifacts.
    pub fn num_artifacts(&self) -> usize {
        self.artifacts.iter().filter(|&&flag| flag != 0).count()
    }

    /// Returns the number of events that were passed on to clustering.
    pub fn num_sortable(&self) -> usize {
        self.len() - self.num_artifacts()
    }

    /// Returns the number of samples in each waveform snapshot.
    pub fn waveform_samples(&self) -> usize {
        self.waveforms.ncols()
    }
}

/// Result of clustering the non-artifact events of one channel.
///
/// This is the content of a combinato `sort_cat.h5` file.
#[derive(Debug, Clone)]
pub struct SortRecord {
    /// Position in the detection arrays of each sorted event
    pub index: Array1<i64>,
    /// Class assigned to each sorted event, aligned with `index`
    pub classes: Array1<i64>,
    /// Class to group mapping
    /// - Shape: [num_classes, 2]
    /// - Column 0: class label
    /// - Column 1: group label (0 = unassigned, negative = rejected, positive = unit)
    pub groups: Array2<i64>,
}

impl SortRecord {
    /// Creates a sort record, checking the shapes of its fields.
    pub fn new(index: Array1<i64>, classes: Array1<i64>, groups: Array2<i64>) -> Result<Self> {
        let record = SortRecord {
            index,
            classes,
            groups,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks that `index` and `classes` align and that `groups` has two columns.
    pub fn validate(&self) -> Result<()> {
        if self.index.len() != self.classes.len() {
            return Err(SortingError::SortShape {
                message: format!(
                    "index has {} entries but classes has {}",
                    self.index.len(),
                    self.classes.len()
                ),
            });
        }
        check_groups_shape(&self.groups)
    }

    /// Returns the number of sorted events.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no events were sorted.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

pub(crate) fn check_groups_shape(groups: &Array2<i64>) -> Result<()> {
    if groups.ncols() != 2 {
        return Err(SortingError::SortShape {
            message: format!(
                "groups must have 2 columns (class, group), found {}",
                groups.ncols()
            ),
        });
    }
    Ok(())
}

/// Spike sorting information for all valid events of one channel.
///
/// Holds only events that were not artifacts and whose class belongs to a
/// positive group. All fields have the same length, which may be zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSorting {
    /// Spike time of each kept event
    pub times: Array1<f64>,
    /// Waveform of each kept event
    /// - Shape: [num_kept, waveform_samples]
    pub waveforms: Array2<f64>,
    /// Class assignment of each kept event
    pub classes: Array1<i64>,
    /// Cluster (group) assignment of each kept event
    pub clusters: Array1<i64>,
}

impl ChannelSorting {
    /// Returns the number of kept events.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if no events were kept.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the distinct cluster ids present, in ascending order.
    pub fn cluster_ids(&self) -> Vec<i64> {
        self.clusters
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// The events of a single cluster, ready to be stored as one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRecord {
    /// Cluster (group) identifier
    pub ind: i64,
    /// Spike times of the cluster's events
    pub times: Array1<f64>,
    /// Waveforms of the cluster's events
    /// - Shape: [num_events, waveform_samples]
    pub waveforms: Array2<f64>,
    /// Class assignment of the cluster's events
    pub classes: Array1<i64>,
}

impl ClusterRecord {
    /// Returns the number of events in the cluster.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the cluster holds no events.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_polarity_round_trips_through_names() {
        assert_eq!("neg".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert_eq!("pos".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert_eq!(Polarity::Positive.to_string(), "pos");
        assert!(matches!(
            "both".parse::<Polarity>(),
            Err(SortingError::UnknownPolarity { .. })
        ));
    }

    #[test]
    fn test_detection_record_rejects_misaligned_fields() {
        let err = DetectionRecord::new(
            array![0.0, 1.0, 2.0],
            Array2::zeros((2, 64)),
            array![0, 0, 0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SortingError::DetectionShape {
                times: 3,
                waveforms: 2,
                artifacts: 3
            }
        ));
    }

    #[test]
    fn test_detection_record_counts_artifacts_by_nonzero_flag() {
        let record = DetectionRecord::new(
            array![0.0, 1.0, 2.0, 3.0, 4.0],
            Array2::zeros((5, 64)),
            array![0, 3, 0, -1, 0],
        )
        .unwrap();
        assert_eq!(record.len(), 5);
        assert_eq!(record.num_artifacts(), 2);
        assert_eq!(record.num_sortable(), 3);
        assert_eq!(record.waveform_samples(), DEFAULT_WAVEFORM_SAMPLES);
    }

    #[test]
    fn test_sort_record_checks_shapes() {
        let err = SortRecord::new(array![0, 1, 2], array![0, 1], array![[0, 1]]).unwrap_err();
        assert!(matches!(err, SortingError::SortShape { .. }));

        let err = SortRecord::new(array![0, 1], array![0, 1], array![[0, 1, 2]]).unwrap_err();
        assert!(matches!(err, SortingError::SortShape { .. }));

        assert!(SortRecord::new(array![0, 1], array![0, 1], array![[0, 0], [1, 1]]).is_ok());
    }

    #[test]
    fn test_channel_key_display() {
        let key = ChannelKey::new(12, Polarity::Negative);
        assert_eq!(key.to_string(), "chan_12 (neg)");
        assert_eq!(key.with_reviewer("tf").to_string(), "chan_12 (neg, tf)");
    }
}
