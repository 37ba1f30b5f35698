//! # Parquet store for per-day observation files
//!
//! Reads one observation file (one timestep) from **Apache Parquet** into an
//! [`Observations`] collection. Each top-level column is one field; contours are stored
//! as lists of floats.
//!
//! ## Overview
//! -----------------
//! * **Projection-first**: when `include_fields` is given, only those root columns are
//!   decoded (the contour cache asks for the two contour fields only).
//! * **Path or bytes**: [`ParquetStore`] either opens the file by path, or reads the whole
//!   file into memory first (`memory = true`) and decodes from a [`Bytes`] buffer, which suits
//!   remote or streamed storage mounted as files.
//! * **Raw or decoded**: a raw load keeps stored values and their packing descriptors, a
//!   decoded load applies `scale_factor`/`add_offset` to packed columns.
//!
//! ## Expected metadata
//! -----------------
//! * Schema metadata `sign_type` (optional) – polarity of the observations, parsed as `i8`.
//! * Field metadata `scale_factor` / `add_offset` (optional) – packing of the column.
//!
//! ## Error Handling
//! -----------------
//! * I/O and decoding failures surface as [`NetworkError::IoError`],
//!   [`NetworkError::ParquetError`] or [`NetworkError::ArrowError`]. They are fatal for a run.
//! * A requested field absent from the schema is a [`NetworkError::MissingField`].
use std::fs::File;

use bytes::Bytes;
use camino::Utf8Path;
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ProjectionMask};
use parquet::file::reader::ChunkReader;

use crate::constants::SIGN_TYPE_KEY;
use crate::network_errors::NetworkError;
use crate::observations::column::{Column, Packing};
use crate::observations::observations::{FieldEntry, Observations};
use crate::observations::ObservationStore;

/// Default number of rows decoded per Arrow record batch.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// [`ObservationStore`] backed by one Parquet file per timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParquetStore {
    memory: bool,
    batch_size: usize,
}

impl Default for ParquetStore {
    fn default() -> Self {
        ParquetStore::new(false)
    }
}

impl ParquetStore {
    /// Arguments
    /// ---------
    /// * `memory`: read the whole file into memory before decoding it, instead of opening it by path.
    pub fn new(memory: bool) -> Self {
        ParquetStore {
            memory,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn memory(&self) -> bool {
        self.memory
    }
}

impl ObservationStore for ParquetStore {
    fn load(
        &self,
        id: &Utf8Path,
        include_fields: Option<&[&str]>,
        raw: bool,
    ) -> Result<Observations, NetworkError> {
        if self.memory {
            let buffer = Bytes::from(std::fs::read(id)?);
            read_observations(buffer, include_fields, raw, self.batch_size)
        } else {
            let file = File::open(id)?;
            read_observations(file, include_fields, raw, self.batch_size)
        }
    }
}

/// Decode a Parquet source into an [`Observations`] collection.
///
/// Arguments
/// -----------------
/// * `reader` – any Parquet chunk reader (an open [`File`], a [`Bytes`] buffer).
/// * `include_fields` – root columns to decode, `None` for all of them.
/// * `raw` – keep packed values as stored.
/// * `batch_size` – Arrow reader batch size.
///
/// Return
/// ----------
/// * The collection, fields in file order, `sign_type` read from the schema metadata.
pub(crate) fn read_observations<R: ChunkReader + 'static>(
    reader: R,
    include_fields: Option<&[&str]>,
    raw: bool,
    batch_size: usize,
) -> Result<Observations, NetworkError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();

    let sign_type = match schema.metadata().get(SIGN_TYPE_KEY) {
        None => None,
        Some(raw_sign) => Some(raw_sign.trim().parse::<i8>().map_err(|_| {
            NetworkError::InvalidMetadata(format!("{SIGN_TYPE_KEY}='{raw_sign}' is not an i8"))
        })?),
    };

    // Root indices, kept in file order whatever the order of `include_fields`.
    let mut selected: Vec<usize> = match include_fields {
        Some(names) => names
            .iter()
            .map(|name| {
                schema
                    .index_of(name)
                    .map_err(|_| NetworkError::MissingField(name.to_string()))
            })
            .collect::<Result<_, _>>()?,
        None => (0..schema.fields().len()).collect(),
    };
    selected.sort_unstable();
    selected.dedup();

    let mask = ProjectionMask::roots(builder.parquet_schema(), selected.iter().copied());
    let batches = builder
        .with_projection(mask)
        .with_batch_size(batch_size)
        .build()?;

    // One column per selected field, typed from the schema so that empty files keep their types.
    let mut columns: Vec<Column> = selected
        .iter()
        .map(|&k| {
            let field = schema.field(k);
            Column::from_arrow(
                field.name(),
                arrow_array::new_empty_array(field.data_type()).as_ref(),
            )
        })
        .collect::<Result<_, _>>()?;

    for batch in batches {
        let batch = batch?;
        for (column, &k) in columns.iter_mut().zip(&selected) {
            let name = schema.field(k).name();
            let array = batch
                .column_by_name(name)
                .ok_or_else(|| NetworkError::MissingField(name.to_string()))?;
            if !column.append(Column::from_arrow(name, array.as_ref())?) {
                return Err(NetworkError::ColumnTypeMismatch {
                    field: name.to_string(),
                });
            }
        }
    }

    let fields = selected
        .iter()
        .zip(columns)
        .map(|(&k, column)| {
            let field = schema.field(k);
            let packing = Packing::from_metadata(field.name(), field.metadata())?;
            Ok(FieldEntry::new(field.name().clone(), column, packing))
        })
        .collect::<Result<Vec<_>, NetworkError>>()?;

    let observations = Observations::from_fields(fields, sign_type)?;
    Ok(if raw {
        observations
    } else {
        observations.unpacked()
    })
}
