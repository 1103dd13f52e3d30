//! Reconciliation of detection and sorting outputs into per-unit spike trains.

use ndarray::{Array1, Axis};
use tracing::{debug, info, warn};

use crate::error::{Result, SortingError};
use crate::labels::{group_labels, sorting_kept_labels, valid_class_mask};
use crate::types::{ChannelKey, ChannelSorting, ClusterRecord, DetectionRecord, SortRecord};

/// Collects the sorting information of all valid events in one channel.
///
/// Events are kept only if they were passed to clustering (not an artifact)
/// and their class belongs to a positive group. Spike times and waveforms are
/// taken from the detection arrays by first mapping each sorted event back to
/// its detection position through `sort.index`, then applying the class mask.
///
/// # Errors
///
/// Fails if the two records do not describe the same set of events, or if a
/// class in `sort.classes` has no group assignment. An input with no valid
/// classes returns an empty [`ChannelSorting`] rather than an error.
pub fn collect_all_sorting(detection: &DetectionRecord, sort: &SortRecord) -> Result<ChannelSorting> {
    detection.validate()?;
    sort.validate()?;

    let sortable = detection.num_sortable();
    if sort.len() != sortable {
        return Err(SortingError::ArtifactCountMismatch {
            index_len: sort.len(),
            sortable,
        });
    }
    let positions = detection_positions(&sort.index, detection)?;

    // Group label of every sorted event, valid or not
    let labels = group_labels(&sort.classes, &sort.groups)?;

    let (valid_classes, _) = sorting_kept_labels(&sort.groups)?;
    let class_mask = valid_class_mask(&sort.classes, &valid_classes);

    // Kept events, in sorted-event space and in detection space
    let kept_events: Vec<usize> = class_mask
        .iter()
        .enumerate()
        .filter_map(|(event, &kept)| kept.then_some(event))
        .collect();
    let kept_positions: Vec<usize> = kept_events.iter().map(|&event| positions[event]).collect();

    debug!(
        "Keeping {} of {} sorted events ({} detected, {} artifacts)",
        kept_events.len(),
        sort.len(),
        detection.len(),
        detection.len() - sortable
    );

    Ok(ChannelSorting {
        times: detection.times.select(Axis(0), &kept_positions),
        waveforms: detection.waveforms.select(Axis(0), &kept_positions),
        classes: sort.classes.select(Axis(0), &kept_events),
        clusters: labels.select(Axis(0), &kept_events),
    })
}

/// Converts sort index entries into positions within the detection arrays.
///
/// Each entry must name a distinct, non-artifact detection event.
fn detection_positions(index: &Array1<i64>, detection: &DetectionRecord) -> Result<Vec<usize>> {
    let n_detected = detection.len();
    let mut seen = vec![false; n_detected];

    index
        .iter()
        .enumerate()
        .map(|(position, &value)| {
            let pos = usize::try_from(value)
                .ok()
                .filter(|&pos| pos < n_detected)
                .ok_or(SortingError::IndexOutOfBounds {
                    value,
                    position,
                    n_detected,
                })?;
            if detection.artifacts[pos] != 0 {
                return Err(SortingError::IndexNotSortable { value, position });
            }
            if std::mem::replace(&mut seen[pos], true) {
                return Err(SortingError::DuplicateIndex { value, position });
            }
            Ok(pos)
        })
        .collect()
}

/// Splits a channel's sorting information into one record per cluster.
///
/// Clusters are returned in ascending order of their id. Every event of the
/// channel appears in exactly one cluster record. A channel with no kept
/// events yields no clusters.
pub fn extract_clusters(data: &ChannelSorting) -> Vec<ClusterRecord> {
    data.cluster_ids()
        .into_iter()
        .map(|cluster_ind| {
            let members: Vec<usize> = data
                .clusters
                .iter()
                .enumerate()
                .filter_map(|(event, &cluster)| (cluster == cluster_ind).then_some(event))
                .collect();

            ClusterRecord {
                ind: cluster_ind,
                times: data.times.select(Axis(0), &members),
                waveforms: data.waveforms.select(Axis(0), &members),
                classes: data.classes.select(Axis(0), &members),
            }
        })
        .collect()
}

/// Outcome of reconciling one channel in [`sort_channels`].
#[derive(Debug)]
pub struct ChannelOutcome {
    /// Which channel, polarity and reviewer this outcome belongs to
    pub key: ChannelKey,
    /// Reconciled sorting, or the reason the channel could not be processed
    pub result: Result<ChannelSorting>,
}

/// Reconciles several channels, each independently of the others.
///
/// A channel that fails is logged and reported in its [`ChannelOutcome`];
/// processing continues with the remaining channels. Skipping or aborting on
/// failures is left to the caller.
pub fn sort_channels<I>(channels: I) -> Vec<ChannelOutcome>
where
    I: IntoIterator<Item = (ChannelKey, DetectionRecord, SortRecord)>,
{
    let outcomes: Vec<ChannelOutcome> = channels
        .into_iter()
        .map(|(key, detection, sort)| {
            let result = collect_all_sorting(&detection, &sort);
            match &result {
                Ok(sorting) => debug!(
                    "{}: {} kept events in {} clusters",
                    key,
                    sorting.len(),
                    sorting.cluster_ids().len()
                ),
                Err(e) => warn!("{}: could not reconcile sorting: {}", key, e),
            }
            ChannelOutcome { key, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|outcome| outcome.result.is_err()).count();
    info!(
        "Reconciled {} channel{}, {} failed",
        outcomes.len(),
        if outcomes.len() != 1 { "s" } else { "" },
        failed
    );

    outcomes
}
