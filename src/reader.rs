use hdf5::{File, Group};
use ndarray::{Array1, Array2};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{data_chan_file_name, SortingConfig, SORT_CAT_STEM, H5_EXT};
use crate::error::{Result, SortingError};
use crate::types::*;

/// Loads a combinato spike detection file (`data_chan_<channel>.h5`).
///
/// The file holds every putative spike event detected on the channel, before
/// clustering, under one group per polarity with the datasets:
/// - `times`: time of each event
/// - `spikes`: extracted waveforms, shape [num_events, 64]
/// - `artifacts`: nonzero for events discarded as artifacts before sorting
///
/// Because artifact events are included, this file holds more events than the
/// matching sort file. The number of sorted events is
/// `num_events - num_artifacts`.
///
/// # Arguments
///
/// * `channel` - Channel number or label of the file to load
/// * `directory` - Directory containing the file
/// * `polarity` - Which polarity of detected spikes to load
pub fn load_data_chan<P: AsRef<Path>>(
    channel: &str,
    directory: P,
    polarity: Polarity,
) -> Result<DetectionRecord> {
    let tic = Instant::now();
    let path = directory.as_ref().join(data_chan_file_name(channel));

    let file = open_h5file(&path)?;
    let group = file
        .group(polarity.as_str())
        .map_err(|e| hdf5_error(&path, e))?;

    let times = read_1d_f64(&group, "times", &path)?;
    let waveforms = read_2d_f64(&group, "spikes", &path)?;
    let artifacts = read_1d_i64(&group, "artifacts", &path)?;

    let record = DetectionRecord::new(times, waveforms, artifacts)?;
    print_detection_summary(channel, polarity, &record);

    debug!(
        "Loaded {} in {:.3} seconds",
        path.display(),
        tic.elapsed().as_secs_f64()
    );

    Ok(record)
}

/// Loads a combinato sorting output file (`sort_cat.h5`) from `directory`.
///
/// Only the datasets needed for reconciliation are read:
/// - `groups`: class and group assignments, shape [num_classes, 2]
/// - `index`: detection position of each sorted event
/// - `classes`: class of each sorted event
///
/// The `index` and `classes` datasets are shorter than the detection arrays,
/// since artifact events were removed before clustering.
pub fn load_sort_cat<P: AsRef<Path>>(directory: P) -> Result<SortRecord> {
    let path = directory
        .as_ref()
        .join(format!("{SORT_CAT_STEM}.{H5_EXT}"));

    let file = open_h5file(&path)?;

    let groups = read_2d_i64(&file, "groups", &path)?;
    let index = read_1d_i64(&file, "index", &path)?;
    let classes = read_1d_i64(&file, "classes", &path)?;

    let record = SortRecord::new(index, classes, groups)?;
    debug!(
        "Loaded {}: {} sorted events in {} classes",
        path.display(),
        record.len(),
        record.groups.nrows()
    );

    Ok(record)
}

/// Loads the detection and sort records for one channel, polarity and reviewer.
///
/// File locations come from `config`. If the config sets an expected waveform
/// width, the detection waveforms are checked against it.
pub fn load_channel(config: &SortingConfig, key: &ChannelKey) -> Result<(DetectionRecord, SortRecord)> {
    let detection = load_data_chan(&key.channel, &config.sorting_dir, key.polarity)?;
    config.check_waveform_samples(detection.waveform_samples())?;

    let sort = load_sort_cat(config.sort_cat_dir(key))?;

    Ok((detection, sort))
}

/// Helper function to open an HDF5 file for reading
fn open_h5file(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(SortingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }
    File::open(path).map_err(|e| hdf5_error(path, e))
}

fn hdf5_error(path: &Path, source: hdf5::Error) -> SortingError {
    SortingError::Hdf5 {
        path: path.to_path_buf(),
        source,
    }
}

fn read_1d_f64(group: &Group, name: &str, path: &Path) -> Result<Array1<f64>> {
    group
        .dataset(name)
        .and_then(|ds| ds.read_1d::<f64>())
        .map_err(|e| hdf5_error(path, e))
}

fn read_1d_i64(group: &Group, name: &str, path: &Path) -> Result<Array1<i64>> {
    group
        .dataset(name)
        .and_then(|ds| ds.read_1d::<i64>())
        .map_err(|e| hdf5_error(path, e))
}

fn read_2d_f64(group: &Group, name: &str, path: &Path) -> Result<Array2<f64>> {
    group
        .dataset(name)
        .and_then(|ds| ds.read_2d::<f64>())
        .map_err(|e| hdf5_error(path, e))
}

fn read_2d_i64(group: &Group, name: &str, path: &Path) -> Result<Array2<i64>> {
    group
        .dataset(name)
        .and_then(|ds| ds.read_2d::<i64>())
        .map_err(|e| hdf5_error(path, e))
}

// Helper function to log a detection file summary
fn print_detection_summary(channel: &str, polarity: Polarity, record: &DetectionRecord) {
    info!(
        "Found {} {} event{} on channel {} ({} artifact{}, {} samples per waveform).",
        record.len(),
        polarity,
        if record.len() != 1 { "s" } else { "" },
        channel,
        record.num_artifacts(),
        if record.num_artifacts() != 1 { "s" } else { "" },
        record.waveform_samples()
    );
}
