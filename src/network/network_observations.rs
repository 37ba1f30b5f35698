//! # Network observations
//!
//! A group-sorted dataset, once split into segments by an external process, is reordered
//! by `(group, track, time)` so that every network, and every segment inside it, is a
//! contiguous run of rows. The successor / predecessor links of the split index point to
//! rows of the dataset *before* the reordering; they are translated so that they point to
//! the same observations *after* it.
//!
//! Fields of a [`NetworkObservations`]
//! -----------------
//! * every field of the group dataset, reordered,
//! * `track` (`u32`) – network id, kept from the dataset or taken from the split groups,
//! * `segment` (`u32`) – segment id, from the split tracks,
//! * `next_obs`, `previous_obs` (`i32`) – translated links, `-1` for no link.
use std::ops::Range;

use camino::Utf8Path;
use ordered_float::OrderedFloat;

use crate::constants::{NEXT_OBS_FIELD, NO_LINK, PREVIOUS_OBS_FIELD, SEGMENT_FIELD, TRACK_FIELD};
use crate::network_errors::NetworkError;
use crate::observations::{Column, Observations};

/// Output of the splitting process, one row per observation of the group dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitIndex {
    pub group: Vec<u32>,
    pub track: Vec<u32>,
    pub time: Vec<f64>,
    /// Row of the successor in the group dataset, `-1` for none.
    pub next_obs: Vec<i32>,
    /// Row of the predecessor in the group dataset, `-1` for none.
    pub previous_obs: Vec<i32>,
}

impl SplitIndex {
    /// Return
    /// ------
    /// * `Err(NetworkError::SplitLengthMismatch)` if the columns do not share the length of `group`.
    pub fn new(
        group: Vec<u32>,
        track: Vec<u32>,
        time: Vec<f64>,
        next_obs: Vec<i32>,
        previous_obs: Vec<i32>,
    ) -> Result<Self, NetworkError> {
        let expected = group.len();
        for found in [track.len(), time.len(), next_obs.len(), previous_obs.len()] {
            if found != expected {
                return Err(NetworkError::SplitLengthMismatch { expected, found });
            }
        }
        Ok(SplitIndex {
            group,
            track,
            time,
            next_obs,
            previous_obs,
        })
    }

    pub fn len(&self) -> usize {
        self.group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    fn check_lengths(&self) -> Result<(), NetworkError> {
        let expected = self.group.len();
        for found in [
            self.track.len(),
            self.time.len(),
            self.next_obs.len(),
            self.previous_obs.len(),
        ] {
            if found != expected {
                return Err(NetworkError::SplitLengthMismatch { expected, found });
            }
        }
        Ok(())
    }
}

/// Stable argsort of the rows of `split` by `(group, track, time)`.
///
/// Times compare with a total order, NaN after every number.
pub fn sort_order(split: &SplitIndex) -> Vec<usize> {
    let mut order: Vec<usize> = (0..split.len()).collect();
    order.sort_by_key(|&k| (split.group[k], split.track[k], OrderedFloat(split.time[k])));
    order
}

/// Links of the rows `index_order`, rewritten to point into the reordered rows.
///
/// Arguments
/// ---------
/// * `links`: link of every original row, `-1` for none.
/// * `index_order`: original row of every new row, a permutation of `0..links.len()`.
///
/// Return
/// ------
/// * The translated links in new row order.
/// * `Err(NetworkError::SplitLengthMismatch)` if `index_order` and `links` differ in length.
/// * `Err(NetworkError::InvalidIndexOrder)` if `index_order` repeats a row or names one out of range.
/// * `Err(NetworkError::InvalidLink)` if a link is neither `-1` nor a valid row.
pub fn translate_links(links: &[i32], index_order: &[usize]) -> Result<Vec<i32>, NetworkError> {
    let n = index_order.len();
    if links.len() != n {
        return Err(NetworkError::SplitLengthMismatch {
            expected: links.len(),
            found: n,
        });
    }

    let mut translate = vec![NO_LINK; n];
    for (k, &row) in index_order.iter().enumerate() {
        match translate.get_mut(row) {
            Some(slot) if *slot == NO_LINK => *slot = k as i32,
            _ => return Err(NetworkError::InvalidIndexOrder { position: k, row }),
        }
    }

    index_order
        .iter()
        .map(|&row| match links[row] {
            NO_LINK => Ok(NO_LINK),
            value if value >= 0 && (value as usize) < n => Ok(translate[value as usize]),
            value => Err(NetworkError::InvalidLink { row, value }),
        })
        .collect()
}

/// Runs of equal consecutive values, as `(rows, value)`.
fn runs(values: &[u32]) -> Vec<(Range<usize>, u32)> {
    let mut out = Vec::new();
    let mut start = 0;
    for k in 1..=values.len() {
        if k == values.len() || values[k] != values[start] {
            out.push((start..k, values[start]));
            start = k;
        }
    }
    out
}

/// Observations sorted by network, segment and time, with consistent links.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkObservations {
    observations: Observations,
}

impl NetworkObservations {
    /// Reorder `group_dataset` by `(group, track, time)` of `split` and translate its links.
    ///
    /// Arguments
    /// ---------
    /// * `group_dataset`: the assembled dataset (see [`build_dataset`](crate::network::assemble::build_dataset)).
    /// * `split`: the split index of `group_dataset`, row for row.
    ///
    /// Return
    /// ------
    /// * The network observations. The input dataset is left untouched.
    ///
    /// Errors
    /// ------
    /// * [`NetworkError::SplitLengthMismatch`] if the split index and the dataset differ in length.
    /// * [`NetworkError::InvalidLink`] if a link points outside the dataset.
    /// * [`NetworkError::ColumnTypeMismatch`] if the dataset holds a `track` field that is not `u32`.
    pub fn from_split_network(
        group_dataset: &Observations,
        split: &SplitIndex,
    ) -> Result<Self, NetworkError> {
        split.check_lengths()?;
        if split.len() != group_dataset.len() {
            return Err(NetworkError::SplitLengthMismatch {
                expected: group_dataset.len(),
                found: split.len(),
            });
        }

        let index_order = sort_order(split);
        let next_obs = translate_links(&split.next_obs, &index_order)?;
        let previous_obs = translate_links(&split.previous_obs, &index_order)?;

        let mut observations = group_dataset.gather(&index_order);
        match observations.field(TRACK_FIELD) {
            Some(Column::U32(_)) => {}
            Some(_) => {
                return Err(NetworkError::ColumnTypeMismatch {
                    field: TRACK_FIELD.to_string(),
                })
            }
            None => {
                let track = index_order.iter().map(|&k| split.group[k]).collect();
                observations.push_field(TRACK_FIELD, Column::U32(track), None)?;
            }
        }
        let segment = index_order.iter().map(|&k| split.track[k]).collect();
        observations.push_field(SEGMENT_FIELD, Column::U32(segment), None)?;
        observations.push_field(NEXT_OBS_FIELD, Column::I32(next_obs), None)?;
        observations.push_field(PREVIOUS_OBS_FIELD, Column::I32(previous_obs), None)?;

        Ok(NetworkObservations { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn sign_type(&self) -> Option<i8> {
        self.observations.sign_type
    }

    pub fn track(&self) -> &[u32] {
        self.u32_field(TRACK_FIELD)
    }

    pub fn segment(&self) -> &[u32] {
        self.u32_field(SEGMENT_FIELD)
    }

    pub fn next_obs(&self) -> &[i32] {
        self.i32_field(NEXT_OBS_FIELD)
    }

    pub fn previous_obs(&self) -> &[i32] {
        self.i32_field(PREVIOUS_OBS_FIELD)
    }

    pub fn time(&self) -> Result<Vec<f64>, NetworkError> {
        self.observations.time()
    }

    /// Contiguous rows of every segment, in row order.
    pub fn segment_slices(&self) -> Vec<(Range<usize>, u32)> {
        runs(self.segment())
    }

    /// Contiguous rows of every network, in row order.
    pub fn network_slices(&self) -> Vec<(Range<usize>, u32)> {
        runs(self.track())
    }

    pub fn observations(&self) -> &Observations {
        &self.observations
    }

    pub fn into_observations(self) -> Observations {
        self.observations
    }

    pub fn write_parquet(&self, path: &Utf8Path) -> Result<(), NetworkError> {
        crate::observations::write_parquet(&self.observations, path)
    }

    // Field presence and types are checked by every constructor.
    fn u32_field(&self, name: &str) -> &[u32] {
        match self.observations.field(name) {
            Some(Column::U32(values)) => values,
            _ => &[],
        }
    }

    fn i32_field(&self, name: &str) -> &[i32] {
        match self.observations.field(name) {
            Some(Column::I32(values)) => values,
            _ => &[],
        }
    }
}

impl TryFrom<Observations> for NetworkObservations {
    type Error = NetworkError;

    /// Wrap a collection already holding the network fields, e.g. read back from a file.
    ///
    /// Links are checked to stay inside the collection.
    fn try_from(observations: Observations) -> Result<Self, Self::Error> {
        for name in [TRACK_FIELD, SEGMENT_FIELD] {
            match observations.field(name) {
                Some(Column::U32(_)) => {}
                Some(_) => {
                    return Err(NetworkError::ColumnTypeMismatch {
                        field: name.to_string(),
                    })
                }
                None => return Err(NetworkError::MissingField(name.to_string())),
            }
        }
        let n = observations.len();
        for name in [NEXT_OBS_FIELD, PREVIOUS_OBS_FIELD] {
            match observations.field(name) {
                Some(Column::I32(links)) => {
                    if let Some((row, &value)) = links
                        .iter()
                        .enumerate()
                        .find(|&(_, &v)| v != NO_LINK && (v < 0 || v as usize >= n))
                    {
                        return Err(NetworkError::InvalidLink { row, value });
                    }
                }
                Some(_) => {
                    return Err(NetworkError::ColumnTypeMismatch {
                        field: name.to_string(),
                    })
                }
                None => return Err(NetworkError::MissingField(name.to_string())),
            }
        }
        Ok(NetworkObservations { observations })
    }
}

#[cfg(test)]
mod test_network_observations {
    use super::*;
    use crate::observations::FieldEntry;

    /// Group dataset of two networks, rows deliberately out of time order.
    fn dataset() -> Observations {
        Observations::from_fields(
            vec![
                FieldEntry::new("time", Column::U32(vec![12, 10, 11, 20, 21]), None),
                FieldEntry::new("amplitude", Column::F32(vec![0.2, 0.0, 0.1, 1.0, 1.1]), None),
                FieldEntry::new(TRACK_FIELD, Column::U32(vec![1, 1, 1, 2, 2]), None),
            ],
            Some(1),
        )
        .unwrap()
    }

    /// One segment per network, chained in time order.
    fn split() -> SplitIndex {
        SplitIndex::new(
            vec![1, 1, 1, 2, 2],
            vec![5, 5, 5, 9, 9],
            vec![12.0, 10.0, 11.0, 20.0, 21.0],
            // 10 -> 11 -> 12 and 20 -> 21
            vec![-1, 2, 0, 4, -1],
            vec![2, -1, 1, -1, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_sort_order_is_stable() {
        assert_eq!(sort_order(&split()), vec![1, 2, 0, 3, 4]);

        let ties = SplitIndex::new(vec![0; 3], vec![0; 3], vec![1.0; 3], vec![-1; 3], vec![-1; 3])
            .unwrap();
        assert_eq!(sort_order(&ties), vec![0, 1, 2]);

        let nan = SplitIndex::new(
            vec![0; 3],
            vec![0; 3],
            vec![f64::NAN, 2.0, 1.0],
            vec![-1; 3],
            vec![-1; 3],
        )
        .unwrap();
        assert_eq!(sort_order(&nan), vec![2, 1, 0]);
    }

    #[test]
    fn test_translate_links() {
        let order = [1, 2, 0];
        assert_eq!(translate_links(&[-1, 2, 0], &order), Ok(vec![1, 2, -1]));
        assert_eq!(
            translate_links(&[-1, 3, 0], &order),
            Err(NetworkError::InvalidLink { row: 1, value: 3 })
        );
        assert_eq!(
            translate_links(&[-2, 0, 0], &order),
            Err(NetworkError::InvalidLink { row: 0, value: -2 })
        );
    }

    #[test]
    fn test_translate_links_rejects_non_permutation() {
        // row 1 never placed: its link target would be lost
        assert_eq!(
            translate_links(&[1, 0], &[0, 0]),
            Err(NetworkError::InvalidIndexOrder { position: 1, row: 0 })
        );
        assert_eq!(
            translate_links(&[1, 0], &[0, 2]),
            Err(NetworkError::InvalidIndexOrder { position: 1, row: 2 })
        );
        assert_eq!(
            translate_links(&[-1], &[0, 1]),
            Err(NetworkError::SplitLengthMismatch {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(translate_links(&[], &[]), Ok(vec![]));
    }

    #[test]
    fn test_from_split_network() {
        let network = NetworkObservations::from_split_network(&dataset(), &split()).unwrap();

        assert_eq!(network.len(), 5);
        assert_eq!(network.sign_type(), Some(1));
        assert_eq!(network.time().unwrap(), vec![10.0, 11.0, 12.0, 20.0, 21.0]);
        assert_eq!(network.track(), &[1, 1, 1, 2, 2]);
        assert_eq!(network.segment(), &[5, 5, 5, 9, 9]);
        assert_eq!(network.next_obs(), &[1, 2, -1, 4, -1]);
        assert_eq!(network.previous_obs(), &[-1, 0, 1, -1, 3]);
        assert_eq!(
            network.observations().field("amplitude"),
            Some(&Column::F32(vec![0.0, 0.1, 0.2, 1.0, 1.1]))
        );
        assert_eq!(network.network_slices(), vec![(0..3, 1), (3..5, 2)]);
        assert_eq!(network.segment_slices(), vec![(0..3, 5), (3..5, 9)]);
    }

    #[test]
    fn test_track_filled_from_split() {
        let without_track = dataset().project(&["time", "amplitude"]).unwrap();
        let network = NetworkObservations::from_split_network(&without_track, &split()).unwrap();
        assert_eq!(network.track(), &[1, 1, 1, 2, 2]);
        assert_eq!(
            network.observations().elements().collect::<Vec<_>>(),
            vec!["time", "amplitude", "track", "segment", "next_obs", "previous_obs"]
        );
    }

    #[test]
    fn test_split_errors() {
        let mut short = split();
        short.track.pop();
        assert_eq!(
            NetworkObservations::from_split_network(&dataset(), &short),
            Err(NetworkError::SplitLengthMismatch {
                expected: 5,
                found: 4
            })
        );

        let shorter = dataset().gather(&[0, 1, 2]);
        assert_eq!(
            NetworkObservations::from_split_network(&shorter, &split()),
            Err(NetworkError::SplitLengthMismatch {
                expected: 3,
                found: 5
            })
        );

        let mut dangling = split();
        dangling.next_obs[1] = 5;
        assert_eq!(
            NetworkObservations::from_split_network(&dataset(), &dangling),
            Err(NetworkError::InvalidLink { row: 1, value: 5 })
        );
    }

    #[test]
    fn test_try_from_observations() {
        let network = NetworkObservations::from_split_network(&dataset(), &split()).unwrap();
        let back = NetworkObservations::try_from(network.clone().into_observations()).unwrap();
        assert_eq!(back, network);

        assert_eq!(
            NetworkObservations::try_from(dataset()),
            Err(NetworkError::MissingField(SEGMENT_FIELD.into()))
        );
    }

    #[test]
    fn test_runs() {
        assert!(runs(&[]).is_empty());
        assert_eq!(runs(&[3]), vec![(0..1, 3)]);
        assert_eq!(runs(&[1, 1, 2, 1]), vec![(0..2, 1), (2..3, 2), (3..4, 1)]);
    }
}
