//! # Networks of overlapping observations
//!
//! A *network* is a set of observations connected by contour overlaps between files at
//! most `window` timesteps apart. The pipeline is:
//!
//! 1. [`scan_overlaps`] – matched pairs between every file and its `window` followers,
//! 2. [`get_group_array`] – one group label per observation,
//! 3. [`build_dataset`] – every observation, sorted by group,
//! 4. (external) splitting of each network into segments,
//! 5. [`NetworkObservations::from_split_network`] – rows sorted by `(group, track, time)`,
//!    links translated.
//!
//! [`Network`] drives steps 1 to 3 over a sorted file list.
//!
//! # Example
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use regex::Regex;
//! use eddynet::network::Network;
//! use eddynet::params::NetworkParams;
//!
//! let params = NetworkParams::builder().window(3).build().unwrap();
//! let pattern = Regex::new(r"^Anticyclonic_\d{8}\.parquet$").unwrap();
//! let mut network =
//!     Network::from_directory(Utf8Path::new("/data/eddies"), &pattern, params).unwrap();
//!
//! let groups = network.group_observations_default().unwrap();
//! let dataset = network.build_dataset(&groups).unwrap();
//! ```
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::{debug, info};

use crate::constants::GroupLabel;
use crate::contour_cache::ContourCache;
use crate::geometry::{BboxFilter, BboxIntersection, OverlapRatio, VerticeOverlap};
use crate::network_errors::NetworkError;
use crate::observations::{ObservationStore, Observations, ParquetStore};
use crate::params::NetworkParams;

pub mod assemble;
pub mod group;
pub mod network_observations;
pub mod progress;
pub mod scan;
pub mod stats;

pub use assemble::{build_dataset, get_next_index};
pub use group::{apply_replace, get_group_array};
pub use network_observations::{sort_order, translate_links, NetworkObservations, SplitIndex};
pub use scan::{keep_overlapping, scan_overlaps, OverlapScan, PairRecord};
pub use stats::{GroupStats, GroupSummary};

/// Grouping of the observations of a sorted file list.
#[derive(Debug)]
pub struct Network<S: ObservationStore = ParquetStore> {
    filenames: Vec<Utf8PathBuf>,
    params: NetworkParams,
    store: S,
    cache: ContourCache,
}

impl Network<ParquetStore> {
    /// Network over Parquet files, sorted by name.
    ///
    /// Return
    /// ------
    /// * `Err(NetworkError::EmptyFileList)` if `filenames` is empty,
    ///   `Err(NetworkError::InvalidParameter)` if `params` do not validate.
    pub fn new(filenames: Vec<Utf8PathBuf>, params: NetworkParams) -> Result<Self, NetworkError> {
        let store = ParquetStore::new(params.memory);
        Network::with_store(filenames, params, store)
    }

    /// Network over the files of `dir` whose name matches `pattern`.
    pub fn from_directory(
        dir: &Utf8Path,
        pattern: &Regex,
        params: NetworkParams,
    ) -> Result<Self, NetworkError> {
        let filenames = list_matching(dir, pattern)?;
        debug!("{} files match {} in {dir}", filenames.len(), pattern.as_str());
        Network::new(filenames, params)
    }
}

impl<S: ObservationStore> Network<S> {
    pub fn with_store(
        mut filenames: Vec<Utf8PathBuf>,
        params: NetworkParams,
        store: S,
    ) -> Result<Self, NetworkError> {
        params.validate()?;
        if filenames.is_empty() {
            return Err(NetworkError::EmptyFileList);
        }
        filenames.sort();

        let cache = ContourCache::new(params.cache_capacity(), params.contour);
        Ok(Network {
            filenames,
            params,
            store,
            cache,
        })
    }

    pub fn filenames(&self) -> &[Utf8PathBuf] {
        &self.filenames
    }

    pub fn nb_input(&self) -> usize {
        self.filenames.len()
    }

    pub fn window(&self) -> usize {
        self.params.window
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &ContourCache {
        &self.cache
    }

    /// Group label of every observation, in file order.
    ///
    /// Arguments
    /// ---------
    /// * `bbox`: candidate pair filter.
    /// * `overlap`: overlap score of the candidate pairs.
    ///
    /// Return
    /// ------
    /// * One label per observation, [`NOGROUP`](crate::constants::NOGROUP) for isolated ones.
    pub fn group_observations<B, O>(
        &mut self,
        bbox: &B,
        overlap: &O,
    ) -> Result<Vec<GroupLabel>, NetworkError>
    where
        B: BboxFilter + ?Sized,
        O: OverlapRatio + ?Sized,
    {
        let scan = scan_overlaps(
            &self.filenames,
            self.params.window,
            &self.store,
            &mut self.cache,
            bbox,
            overlap,
        )?;
        debug!(
            "{} pairs over {} file comparisons, cache: {}",
            scan.nb_pairs(),
            scan.records.len(),
            self.cache.stats()
        );

        let groups = get_group_array(&scan.records, &scan.nb_obs);
        info!("{}", GroupSummary::from_groups(&groups));
        if let Some(stats) = GroupStats::from_groups(&groups) {
            debug!("{stats}");
        }
        Ok(groups)
    }

    /// [`group_observations`](Network::group_observations) with [`BboxIntersection`] and
    /// the union-based [`VerticeOverlap`].
    pub fn group_observations_default(&mut self) -> Result<Vec<GroupLabel>, NetworkError> {
        self.group_observations(&BboxIntersection, &VerticeOverlap::default())
    }

    /// Every observation of the file list, sorted by group, with its `track` field.
    pub fn build_dataset(&self, groups: &[GroupLabel]) -> Result<Observations, NetworkError> {
        build_dataset(&self.filenames, &self.store, groups)
    }
}

/// Sorted files of `dir` whose file name matches `pattern`.
fn list_matching(dir: &Utf8Path, pattern: &Regex) -> Result<Vec<Utf8PathBuf>, NetworkError> {
    let mut out = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_file() && pattern.is_match(entry.file_name()) {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod test_network {
    use super::*;
    use crate::constants::NOGROUP;
    use crate::observations::{Column, ContourSet, FieldEntry, InMemoryStore};

    fn day(x0: &[f32]) -> Observations {
        let x = x0.iter().map(|&x| vec![x, x + 2.0, x + 2.0, x]).collect();
        let y = x0.iter().map(|_| vec![0.0, 0.0, 2.0, 2.0]).collect();
        Observations::from_fields(
            vec![
                FieldEntry::new("time", Column::U32(vec![0; x0.len()]), None),
                FieldEntry::new("contour_lon_e", Column::F32List(x), None),
                FieldEntry::new("contour_lat_e", Column::F32List(y), None),
            ],
            Some(1),
        )
        .unwrap()
    }

    fn store(days: Vec<Observations>) -> (Vec<Utf8PathBuf>, InMemoryStore) {
        // registered in reverse order to check sorting
        let names: Vec<Utf8PathBuf> = (0..days.len())
            .rev()
            .map(|k| Utf8PathBuf::from(format!("2020010{k}.parquet")))
            .collect();
        let store = names.iter().cloned().zip(days.into_iter().rev()).collect();
        (names, store)
    }

    #[test]
    fn test_empty_file_list() {
        assert_eq!(
            Network::new(vec![], NetworkParams::default()).map(|_| ()),
            Err(NetworkError::EmptyFileList)
        );
        let params = NetworkParams {
            window: 0,
            ..NetworkParams::default()
        };
        assert!(matches!(
            Network::new(vec!["a".into()], params),
            Err(NetworkError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_group_and_build() {
        let (names, store) = store(vec![day(&[0.0, 50.0]), day(&[0.5]), day(&[20.0, 1.0])]);
        let params = NetworkParams::builder().window(1).build().unwrap();
        let mut network = Network::with_store(names, params, store).unwrap();
        assert_eq!(network.filenames()[0], "20200100.parquet");
        assert_eq!(network.nb_input(), 3);

        let groups = network.group_observations_default().unwrap();
        let label = groups[0];
        assert_ne!(label, NOGROUP);
        assert_eq!(groups, vec![label, NOGROUP, label, NOGROUP, label]);
        assert_eq!(network.store().loads(), 3);

        let dataset = network.build_dataset(&groups).unwrap();
        assert_eq!(
            dataset.field("track"),
            Some(&Column::U32(vec![0, 0, label, label, label]))
        );
        let lon = dataset.lists_f64("contour_lon_e").unwrap();
        let origins: Vec<f64> = lon.iter().map(|c| c[0]).collect();
        assert_eq!(origins, vec![50.0, 20.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_custom_strategies() {
        let (names, store) = store(vec![day(&[0.0]), day(&[100.0])]);
        let mut network = Network::with_store(names, NetworkParams::default(), store).unwrap();

        let everything = |a: &ContourSet, b: &ContourSet| {
            let (mut ia, mut ib) = (Vec::new(), Vec::new());
            for i in 0..a.len() as u32 {
                for j in 0..b.len() as u32 {
                    ia.push(i);
                    ib.push(j);
                }
            }
            (ia, ib)
        };
        let full = |_: &ContourSet, ia: &[u32], _: &ContourSet, _: &[u32]| vec![1.0; ia.len()];

        let groups = network.group_observations(&everything, &full).unwrap();
        assert_eq!(groups, vec![1, 1]);
    }

    #[test]
    fn test_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        for name in ["Cyclonic_20200102.parquet", "Cyclonic_20200101.parquet", "notes.txt"] {
            std::fs::write(root.join(name), b"").unwrap();
        }
        std::fs::create_dir(root.join("Cyclonic_20200103.parquet")).unwrap();

        let pattern = Regex::new(r"^Cyclonic_\d{8}\.parquet$").unwrap();
        let network = Network::from_directory(root, &pattern, NetworkParams::default()).unwrap();
        let names: Vec<&str> = network
            .filenames()
            .iter()
            .map(|f| f.file_name().unwrap())
            .collect();
        assert_eq!(names, vec!["Cyclonic_20200101.parquet", "Cyclonic_20200102.parquet"]);
        assert_eq!(network.window(), 5);
        assert_eq!(network.cache().buffer_size(), 5);

        let none = Regex::new(r"^Anticyclonic_").unwrap();
        assert_eq!(
            Network::from_directory(root, &none, NetworkParams::default()).map(|_| ()),
            Err(NetworkError::EmptyFileList)
        );
    }
}
