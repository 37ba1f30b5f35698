//! # Observations: columnar collections and their stores
//!
//! An observation is one detected feature (a closed contour) at one timestep. All the
//! observations of one timestep live in one file and are loaded together as an
//! [`Observations`] collection: named, typed columns of equal length plus the polarity
//! (`sign_type`) shared by the whole file.
//!
//! Modules
//! -----------------
//! * `column` – [`Column`] typed values and [`Packing`] storage encoding, Arrow conversions.
//! * `contour` – [`ContourKind`] (which contour drives overlaps) and decoded [`ContourSet`]s.
//! * `observations` – the [`Observations`] collection itself.
//! * `parquet_reader` / `parquet_writer` – Parquet I/O through [`ParquetStore`] and [`write_parquet`].
//! * `memory_store` – [`InMemoryStore`], collections already resident in memory.
//!
//! Stores
//! -----------------
//! The network stages never open files themselves, they go through an [`ObservationStore`]:
//! the contour cache asks for the two contour fields only, the dataset assembler asks for
//! every field in raw mode.
use camino::Utf8Path;

use crate::network_errors::NetworkError;

pub mod column;
pub mod contour;
pub mod memory_store;
#[allow(clippy::module_inception)]
pub mod observations;
pub mod parquet_reader;
pub mod parquet_writer;

pub use column::{Column, Packing};
pub use contour::{ContourKind, ContourSet};
pub use memory_store::InMemoryStore;
pub use observations::{FieldEntry, Observations};
pub use parquet_reader::ParquetStore;
pub use parquet_writer::{to_record_batch, write_parquet};

/// Source of per-timestep observation collections.
pub trait ObservationStore {
    /// Load the observations of one file.
    ///
    /// Arguments
    /// ---------
    /// * `id`: identifier of the file (its path for file based stores).
    /// * `include_fields`: load only these fields, `None` for all of them.
    /// * `raw`: keep packed fields as stored instead of decoding them.
    ///
    /// Return
    /// ------
    /// * The collection, or the I/O / decoding error. Errors are fatal for a network run.
    fn load(
        &self,
        id: &Utf8Path,
        include_fields: Option<&[&str]>,
        raw: bool,
    ) -> Result<Observations, NetworkError>;
}

impl<T: ObservationStore + ?Sized> ObservationStore for &T {
    fn load(
        &self,
        id: &Utf8Path,
        include_fields: Option<&[&str]>,
        raw: bool,
    ) -> Result<Observations, NetworkError> {
        (**self).load(id, include_fields, raw)
    }
}
