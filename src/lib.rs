//! # eddynet
//!
//! Links per-timestep contour observations (e.g. ocean eddies) into **networks**: sets
//! of observations connected by contour overlaps between files at most `window`
//! timesteps apart.
//!
//! Modules
//! -----------------
//! * [`observations`] – columnar observation collections, Parquet store and writer.
//! * [`geometry`] – bounding-box filter and polygon overlap strategies.
//! * [`contour_cache`] – bounded FIFO cache of decoded contours.
//! * [`network`] – overlap scan, group resolution, dataset assembly, link reconstruction.
//! * [`params`] – run configuration.
//! * [`network_errors`] – the crate error type.
pub mod constants;
pub mod contour_cache;
pub mod geometry;
pub mod network;
pub mod network_errors;
pub mod observations;
pub mod params;

pub use contour_cache::ContourCache;
pub use network::{Network, NetworkObservations, SplitIndex};
pub use network_errors::NetworkError;
pub use observations::{ObservationStore, Observations, ParquetStore};
pub use params::NetworkParams;
