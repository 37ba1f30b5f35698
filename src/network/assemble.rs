//! # Dataset assembly
//!
//! Re-materializes every observation of the file list into one collection sorted by
//! group label. Within a group, observations keep their file-order position, so the new
//! order is a stable permutation of the file-order concatenation.
//!
//! Only one input file is resident at a time: each file is loaded raw (packed values and
//! packing descriptors kept verbatim), scattered into the output, then dropped.
use camino::Utf8PathBuf;
use tracing::info;

use crate::constants::{GroupLabel, TRACK_FIELD};
use crate::network::progress::FileProgress;
use crate::network_errors::NetworkError;
use crate::observations::{Column, ObservationStore, Observations};

/// Destination row of every observation once sorted by group.
///
/// Stable counting sort: bucket sizes per label, exclusive prefix sum as bucket starts,
/// then each observation, in original order, takes the next free row of its bucket.
pub fn get_next_index(groups: &[GroupLabel]) -> Vec<u32> {
    let n_labels = groups.iter().max().map_or(0, |&m| m as usize + 1);

    let mut cursor = vec![0u32; n_labels];
    for &g in groups {
        cursor[g as usize] += 1;
    }
    let mut start = 0u32;
    for slot in cursor.iter_mut() {
        let count = *slot;
        *slot = start;
        start += count;
    }

    groups
        .iter()
        .map(|&g| {
            let slot = &mut cursor[g as usize];
            let row = *slot;
            *slot += 1;
            row
        })
        .collect()
}

/// Build the group-sorted dataset of `filenames`.
///
/// Arguments
/// ---------
/// * `filenames`: files in time order, the order the groups were computed in.
/// * `store`: source of the observations.
/// * `groups`: label of every observation in flat file order.
///
/// Return
/// ------
/// * A collection with the schema, packing and `sign_type` of the last file, every field
///   filled, plus a `track` field (`u32`) holding the group label of each row.
///
/// Errors
/// ------
/// * [`NetworkError::ObservationCountMismatch`] if a file does not hold as many rows as
///   `groups` expects, [`NetworkError::TotalCountMismatch`] if the files hold fewer rows
///   than `groups`.
/// * [`NetworkError::MissingField`] / [`NetworkError::ColumnTypeMismatch`] if a file does
///   not share the schema of the last one.
pub fn build_dataset<S>(
    filenames: &[Utf8PathBuf],
    store: &S,
    groups: &[GroupLabel],
) -> Result<Observations, NetworkError>
where
    S: ObservationStore + ?Sized,
{
    let Some(last) = filenames.last() else {
        return Err(NetworkError::EmptyFileList);
    };
    let model = store.load(last, None, true)?;
    let mut dataset = Observations::new_like(&model, groups.len());
    let field_names: Vec<String> = model.elements().map(str::to_string).collect();
    drop(model);

    let new_i = get_next_index(groups);
    let mut progress = FileProgress::new("dataset assembly", filenames.len());

    let mut start = 0usize;
    for filename in filenames {
        let observations = store.load(filename, None, true)?;
        let stop = start + observations.len();
        if stop > groups.len() {
            return Err(NetworkError::ObservationCountMismatch {
                file: filename.clone(),
                expected: groups.len().saturating_sub(start),
                found: observations.len(),
            });
        }

        let positions = &new_i[start..stop];
        for name in &field_names {
            let column = observations
                .field(name)
                .ok_or_else(|| NetworkError::MissingField(name.clone()))?;
            dataset.scatter_field(name, positions, column)?;
        }

        start = stop;
        progress.step(filename);
    }
    progress.finish();

    if start != groups.len() {
        return Err(NetworkError::TotalCountMismatch {
            expected: groups.len(),
            found: start,
        });
    }

    let mut track = vec![0u32; groups.len()];
    for (&row, &g) in new_i.iter().zip(groups) {
        track[row as usize] = g;
    }
    dataset.push_field(TRACK_FIELD, Column::U32(track), None)?;

    info!(
        "{} observations from {} files assembled by group",
        dataset.len(),
        filenames.len()
    );
    Ok(dataset)
}
