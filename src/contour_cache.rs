//! # Contour cache
//!
//! Bounded, file-keyed cache of decoded contours used by the overlap scan. Each file of
//! the sliding window is compared with up to `W` following files, so keeping about `W`
//! files resident avoids decoding the same file `W + 1` times.
//!
//! Eviction policy
//! -----------------
//! Strict FIFO on load order. A hit does not refresh the entry. On a miss, when more than
//! `buffer_size` files are resident, the oldest one is dropped before the new file is
//! loaded, so at most `buffer_size + 1` files are resident at any time.
//!
//! Geometry is handed out as [`Arc<ContourSet>`]: a contour set stays valid for its
//! holder even after it has been evicted.
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, trace};

use crate::network_errors::NetworkError;
use crate::observations::{ContourKind, ContourSet, ObservationStore};

/// Hit / miss / eviction counters of a [`ContourCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses, {} evictions",
            self.hits, self.misses, self.evictions
        )
    }
}

#[derive(Debug, Clone)]
pub struct ContourCache {
    buffer_size: usize,
    contour: ContourKind,
    data: HashMap<Utf8PathBuf, Arc<ContourSet>, RandomState>,
    load_order: VecDeque<Utf8PathBuf>,
    stats: CacheStats,
}

impl ContourCache {
    /// Arguments
    /// ---------
    /// * `buffer_size`: number of resident files above which the oldest one is evicted on a miss.
    /// * `contour`: which contour fields are loaded.
    pub fn new(buffer_size: usize, contour: ContourKind) -> Self {
        ContourCache {
            buffer_size,
            contour,
            data: HashMap::with_capacity_and_hasher(buffer_size + 1, RandomState::new()),
            load_order: VecDeque::with_capacity(buffer_size + 1),
            stats: CacheStats::default(),
        }
    }

    /// Contours of `file_id`, loaded through `store` on a miss.
    ///
    /// Only the two fields of the configured [`ContourKind`] are requested, decoded.
    ///
    /// Return
    /// ------
    /// * The contours, or the store error. A failed load leaves the cache without the file.
    pub fn load<S: ObservationStore + ?Sized>(
        &mut self,
        store: &S,
        file_id: &Utf8Path,
    ) -> Result<Arc<ContourSet>, NetworkError> {
        if let Some(contours) = self.data.get(file_id) {
            self.stats.hits += 1;
            trace!("contour cache hit for {file_id}");
            return Ok(Arc::clone(contours));
        }

        self.stats.misses += 1;
        if self.load_order.len() > self.buffer_size {
            if let Some(oldest) = self.load_order.pop_front() {
                self.data.remove(&oldest);
                self.stats.evictions += 1;
                debug!("contour cache evicts {oldest}");
            }
        }

        trace!("contour cache loads {file_id}");
        let contours = Arc::new(
            store
                .load(file_id, Some(&self.contour.field_names()), false)?
                .contours(self.contour)?,
        );
        self.load_order.push_back(file_id.to_owned());
        self.data.insert(file_id.to_owned(), Arc::clone(&contours));
        Ok(contours)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn contour(&self) -> ContourKind {
        self.contour
    }

    /// Number of resident files.
    pub fn len(&self) -> usize {
        self.load_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_order.is_empty()
    }

    pub fn contains(&self, file_id: &Utf8Path) -> bool {
        self.data.contains_key(file_id)
    }

    /// Resident files, oldest first.
    pub fn resident(&self) -> impl Iterator<Item = &Utf8Path> + '_ {
        self.load_order.iter().map(|id| id.as_path())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every resident file and reset the counters.
    pub fn clear(&mut self) {
        self.data.clear();
        self.load_order.clear();
        self.stats = CacheStats::default();
    }
}
