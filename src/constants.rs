//! # Constants and type definitions for eddynet
//!
//! This module centralizes the **sentinels**, **thresholds**, **field names** and
//! **common type aliases** used by the grouping pipeline.
//!
//! ## Overview
//!
//! - Group label sentinel ([`NOGROUP`]) and link sentinel ([`NO_LINK`])
//! - Overlap threshold applied by the scanner
//! - Default scan window
//! - Names of the fields produced by the network stages

// -------------------------------------------------------------------------------------------------
// Sentinels
// -------------------------------------------------------------------------------------------------

/// Group label of an observation not linked to any other observation.
pub const NOGROUP: GroupLabel = 0;

/// Value of `next_obs` / `previous_obs` when there is no link.
pub const NO_LINK: i32 = -1;

// -------------------------------------------------------------------------------------------------
// Scan configuration
// -------------------------------------------------------------------------------------------------

/// A pair of contours is a match when its overlap ratio is strictly greater than this value.
pub const OVERLAP_THRESHOLD: f64 = 0.2;

/// Number of following files compared with each file when nothing else is configured.
pub const DEFAULT_WINDOW: usize = 5;

// -------------------------------------------------------------------------------------------------
// Field names
// -------------------------------------------------------------------------------------------------

/// Time of the observation.
pub const TIME_FIELD: &str = "time";

/// Network id, written by the dataset assembler.
pub const TRACK_FIELD: &str = "track";

/// Sub-chain id inside a network.
pub const SEGMENT_FIELD: &str = "segment";

/// Row index of the successor observation.
pub const NEXT_OBS_FIELD: &str = "next_obs";

/// Row index of the predecessor observation.
pub const PREVIOUS_OBS_FIELD: &str = "previous_obs";

/// Schema metadata key holding the polarity of the observations of a file.
pub const SIGN_TYPE_KEY: &str = "sign_type";

/// Field metadata keys describing a packed column.
pub const SCALE_FACTOR_KEY: &str = "scale_factor";
pub const ADD_OFFSET_KEY: &str = "add_offset";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Integer id of a network (0 is [`NOGROUP`]).
pub type GroupLabel = u32;

/// Index of an observation inside its own file.
pub type LocalIndex = u32;

/// Index of a file in the sorted file list.
pub type FileIndex = usize;
