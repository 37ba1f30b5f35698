//! # Pairwise overlap scan
//!
//! Compares every file with the `window` files that follow it in the sorted file list and
//! records the observation pairs whose contours overlap.
//!
//! For file `i`, the compared files are `i+1 .. min(i + window + 1, N)`. Near the end of
//! the list the window is shorter, which is not an error. One [`PairRecord`] is produced
//! per compared file pair, in scan order, even when no pair survives the threshold.
//!
//! Geometry is obtained through the [`ContourCache`]: with a cache of at least `window`
//! files, every file is decoded once.
use camino::Utf8PathBuf;
use tracing::{debug, trace};

use crate::constants::{FileIndex, LocalIndex, OVERLAP_THRESHOLD};
use crate::contour_cache::ContourCache;
use crate::geometry::{BboxFilter, OverlapRatio};
use crate::network::progress::FileProgress;
use crate::network_errors::NetworkError;
use crate::observations::ObservationStore;

/// Matched observations between two files `i < j`: `ii[k]` of file `i` overlaps `ij[k]` of file `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    pub i: FileIndex,
    pub j: FileIndex,
    pub ii: Vec<LocalIndex>,
    pub ij: Vec<LocalIndex>,
}

impl PairRecord {
    pub fn new(i: FileIndex, j: FileIndex, ii: Vec<LocalIndex>, ij: Vec<LocalIndex>) -> Self {
        assert_eq!(ii.len(), ij.len(), "ii and ij must have the same length");
        PairRecord { i, j, ii, ij }
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.ii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ii.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (LocalIndex, LocalIndex)> + '_ {
        self.ii.iter().copied().zip(self.ij.iter().copied())
    }
}

/// Output of [`scan_overlaps`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapScan {
    pub records: Vec<PairRecord>,
    /// Observation count of every file, in file order.
    pub nb_obs: Vec<u32>,
}

impl OverlapScan {
    /// Total number of observations.
    pub fn total(&self) -> usize {
        self.nb_obs.iter().map(|&n| n as usize).sum()
    }

    /// Total number of matched pairs over all records.
    pub fn nb_pairs(&self) -> usize {
        self.records.iter().map(PairRecord::len).sum()
    }
}

/// Keep the candidate pairs whose ratio is strictly greater than [`OVERLAP_THRESHOLD`].
pub fn keep_overlapping(
    ii: &[LocalIndex],
    ij: &[LocalIndex],
    ratios: &[f64],
) -> (Vec<LocalIndex>, Vec<LocalIndex>) {
    ii.iter()
        .zip(ij)
        .zip(ratios)
        .filter(|&(_, &ratio)| ratio > OVERLAP_THRESHOLD)
        .map(|((&a, &b), _)| (a, b))
        .unzip()
}

/// Scan the sorted file list for overlapping observations.
///
/// Arguments
/// ---------
/// * `filenames`: files in time order.
/// * `window`: number of following files compared with each file.
/// * `store`: source of the observations.
/// * `cache`: contour cache, reused across calls.
/// * `bbox`: candidate pair filter.
/// * `overlap`: overlap score of the candidate pairs.
///
/// Return
/// ------
/// * The pair records in scan order and the observation count of every file.
///   Any load error aborts the scan.
pub fn scan_overlaps<S, B, O>(
    filenames: &[Utf8PathBuf],
    window: usize,
    store: &S,
    cache: &mut ContourCache,
    bbox: &B,
    overlap: &O,
) -> Result<OverlapScan, NetworkError>
where
    S: ObservationStore + ?Sized,
    B: BboxFilter + ?Sized,
    O: OverlapRatio + ?Sized,
{
    let n = filenames.len();
    let mut nb_obs = Vec::with_capacity(n);
    let mut records = Vec::new();
    let mut progress = FileProgress::new("overlap scan", n);

    for (i, filename) in filenames.iter().enumerate() {
        let contours_i = cache.load(store, filename)?;
        nb_obs.push(contours_i.len() as u32);

        let last = (i + window + 1).min(n);
        if last - (i + 1) < window {
            trace!(
                "{filename}: window truncated to {} files at the end of the list",
                last - (i + 1)
            );
        }

        for j in i + 1..last {
            let contours_j = cache.load(store, &filenames[j])?;
            let (ci, cj) = bbox.candidates(&contours_i, &contours_j);
            let ratios = overlap.ratios(&contours_i, &ci, &contours_j, &cj);
            let (ii, ij) = keep_overlapping(&ci, &cj, &ratios);
            debug!(
                "{filename} / {}: {} candidates, {} overlaps",
                filenames[j],
                ci.len(),
                ii.len()
            );
            records.push(PairRecord::new(i, j, ii, ij));
        }
        progress.step(filename);
    }
    progress.finish();

    Ok(OverlapScan { records, nb_obs })
}
