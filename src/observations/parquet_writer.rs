use std::collections::HashMap;
use std::fs::File;
use std::sync::Arc;

use arrow_array::{RecordBatch, RecordBatchOptions};
use arrow_schema::{Field, Schema};
use camino::Utf8Path;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::constants::SIGN_TYPE_KEY;
use crate::network_errors::NetworkError;
use crate::observations::observations::Observations;

/// Arrow record batch holding every field of `observations`, packing stored as field metadata
/// and `sign_type` as schema metadata.
pub fn to_record_batch(observations: &Observations) -> Result<RecordBatch, NetworkError> {
    let fields: Vec<Field> = observations
        .fields()
        .iter()
        .map(|f| {
            let field = Field::new(f.name.as_str(), f.column.data_type(), false);
            match f.packing {
                Some(packing) => field.with_metadata(packing.to_metadata()),
                None => field,
            }
        })
        .collect();

    let mut metadata = HashMap::new();
    if let Some(sign_type) = observations.sign_type {
        metadata.insert(SIGN_TYPE_KEY.to_string(), sign_type.to_string());
    }
    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));

    let columns = observations
        .fields()
        .iter()
        .map(|f| f.column.to_arrow())
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(observations.len()));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Write `observations` to a single-batch, snappy-compressed Parquet file.
pub fn write_parquet(observations: &Observations, path: &Utf8Path) -> Result<(), NetworkError> {
    let batch = to_record_batch(observations)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
