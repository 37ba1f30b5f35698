//! # Typed columns of an observation collection
//!
//! A [`Column`] holds the values of one field for every observation of a collection.
//! Scalar fields map to Arrow primitive arrays, contour coordinates map to Arrow
//! (fixed size) lists of floats.
//!
//! Packed columns
//! -----------------
//! A column may be stored packed: integers on disk, decoded as
//! `value * scale_factor + add_offset`. The [`Packing`] descriptor lives next to the column
//! (see [`FieldEntry`](crate::observations::FieldEntry)) and travels through raw loads
//! untouched so that a dataset can be written back with its original encoding.
use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt8Type,
};
use arrow_array::{
    Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    ListArray, UInt16Array, UInt32Array, UInt8Array,
};
use arrow_schema::{DataType, Field};

use crate::constants::{ADD_OFFSET_KEY, SCALE_FACTOR_KEY};
use crate::network_errors::NetworkError;

/// Storage encoding of a packed column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packing {
    pub scale_factor: f64,
    pub add_offset: f64,
}

impl Packing {
    pub fn new(scale_factor: f64, add_offset: f64) -> Self {
        Packing {
            scale_factor,
            add_offset,
        }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale_factor + self.add_offset
    }

    /// Read the packing descriptor of a field from its Arrow metadata.
    ///
    /// Return
    /// ------
    /// * `Ok(None)` when neither `scale_factor` nor `add_offset` is present.
    /// * `Ok(Some(_))` otherwise, a missing key defaults to the identity value.
    /// * `Err(NetworkError::InvalidMetadata)` when a value cannot be parsed as `f64`.
    pub fn from_metadata(
        field: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<Option<Self>, NetworkError> {
        let parse = |key: &str, default: f64| -> Result<f64, NetworkError> {
            match metadata.get(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                    NetworkError::InvalidMetadata(format!("{field}: {key}='{raw}' is not a number"))
                }),
            }
        };

        if !metadata.contains_key(SCALE_FACTOR_KEY) && !metadata.contains_key(ADD_OFFSET_KEY) {
            return Ok(None);
        }

        Ok(Some(Packing::new(
            parse(SCALE_FACTOR_KEY, 1.0)?,
            parse(ADD_OFFSET_KEY, 0.0)?,
        )))
    }

    pub fn to_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (SCALE_FACTOR_KEY.to_string(), self.scale_factor.to_string()),
            (ADD_OFFSET_KEY.to_string(), self.add_offset.to_string()),
        ])
    }
}

/// Values of one field for every observation of a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I64(Vec<i64>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    F64List(Vec<Vec<f64>>),
    F32List(Vec<Vec<f32>>),
}

/// Evaluate `$body` with `$v` bound to the inner vector, whatever the variant.
macro_rules! with_values {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::F64($v) => $body,
            Column::F32($v) => $body,
            Column::I64($v) => $body,
            Column::I32($v) => $body,
            Column::U32($v) => $body,
            Column::I16($v) => $body,
            Column::U16($v) => $body,
            Column::I8($v) => $body,
            Column::U8($v) => $body,
            Column::F64List($v) => $body,
            Column::F32List($v) => $body,
        }
    };
}

/// Build a column of the same variant from `$body`, evaluated with `$v` bound to the inner vector.
macro_rules! map_values {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::F64($v) => Column::F64($body),
            Column::F32($v) => Column::F32($body),
            Column::I64($v) => Column::I64($body),
            Column::I32($v) => Column::I32($body),
            Column::U32($v) => Column::U32($body),
            Column::I16($v) => Column::I16($body),
            Column::U16($v) => Column::U16($body),
            Column::I8($v) => Column::I8($body),
            Column::U8($v) => Column::U8($body),
            Column::F64List($v) => Column::F64List($body),
            Column::F32List($v) => Column::F32List($body),
        }
    };
}

/// Run `$body` on the two inner vectors when both columns share the same variant.
/// Evaluates to `false` on a variant mismatch.
macro_rules! with_pair {
    ($dst:expr, $src:expr, ($d:ident, $s:ident) => $body:expr) => {
        match ($dst, $src) {
            (Column::F64($d), Column::F64($s)) => { $body; true }
            (Column::F32($d), Column::F32($s)) => { $body; true }
            (Column::I64($d), Column::I64($s)) => { $body; true }
            (Column::I32($d), Column::I32($s)) => { $body; true }
            (Column::U32($d), Column::U32($s)) => { $body; true }
            (Column::I16($d), Column::I16($s)) => { $body; true }
            (Column::U16($d), Column::U16($s)) => { $body; true }
            (Column::I8($d), Column::I8($s)) => { $body; true }
            (Column::U8($d), Column::U8($s)) => { $body; true }
            (Column::F64List($d), Column::F64List($s)) => { $body; true }
            (Column::F32List($d), Column::F32List($s)) => { $body; true }
            _ => false,
        }
    };
}

fn scatter_into<T: Clone>(dst: &mut [T], positions: &[u32], src: &[T]) {
    for (&p, v) in positions.iter().zip(src) {
        dst[p as usize] = v.clone();
    }
}

fn list_type(inner: DataType) -> DataType {
    DataType::List(Arc::new(Field::new("item", inner, true)))
}

fn float_lists<T: ArrowPrimitiveType>(
    rows: impl Iterator<Item = Option<ArrayRef>>,
) -> Vec<Vec<T::Native>> {
    rows.map(|row| match row {
        Some(values) => values.as_primitive::<T>().values().to_vec(),
        None => Vec::new(),
    })
    .collect()
}

impl Column {
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A column of the same type holding `n` default values (zeros, empty contours).
    pub fn zeros_like(&self, n: usize) -> Column {
        map_values!(self, v => {
            let _ = v;
            vec![Default::default(); n]
        })
    }

    /// Values taken at `order`, i.e. `out[k] = self[order[k]]`.
    ///
    /// Panics if an index of `order` is out of range.
    pub fn gather(&self, order: &[usize]) -> Column {
        map_values!(self, v => order.iter().map(|&k| v[k].clone()).collect())
    }

    /// Write `src[k]` at `self[positions[k]]` for every `k`.
    ///
    /// Return
    /// ------
    /// * `false` if `src` does not hold the same variant as `self` (nothing is written).
    ///
    /// Panics if a position is out of range.
    pub fn scatter(&mut self, positions: &[u32], src: &Column) -> bool {
        with_pair!(self, src, (d, s) => scatter_into(d, positions, s))
    }

    /// Append the values of `other` at the end of `self`.
    ///
    /// Return
    /// ------
    /// * `false` on a variant mismatch (nothing is appended).
    pub fn append(&mut self, other: Column) -> bool {
        with_pair!(self, other, (d, s) => d.extend(s))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Column::F64List(_) | Column::F32List(_))
    }

    /// Scalar values widened to `f64`. `None` for list columns.
    pub fn to_f64_values(&self) -> Option<Vec<f64>> {
        match self {
            Column::F64(v) => Some(v.clone()),
            Column::F32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::I64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::I32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::U32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::I16(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::U16(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::I8(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::U8(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::F64List(_) | Column::F32List(_) => None,
        }
    }

    /// List values widened to `f64`. `None` for scalar columns.
    pub fn to_f64_lists(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            Column::F64List(v) => Some(v.clone()),
            Column::F32List(v) => Some(
                v.iter()
                    .map(|row| row.iter().map(|&x| x as f64).collect())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Decode a packed column: scalars become [`Column::F64`], lists become [`Column::F64List`].
    pub fn unpack(&self, packing: &Packing) -> Column {
        match self.to_f64_lists() {
            Some(lists) => Column::F64List(
                lists
                    .into_iter()
                    .map(|row| row.into_iter().map(|x| packing.apply(x)).collect())
                    .collect(),
            ),
            None => Column::F64(
                self.to_f64_values()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|x| packing.apply(x))
                    .collect(),
            ),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::F64(_) => DataType::Float64,
            Column::F32(_) => DataType::Float32,
            Column::I64(_) => DataType::Int64,
            Column::I32(_) => DataType::Int32,
            Column::U32(_) => DataType::UInt32,
            Column::I16(_) => DataType::Int16,
            Column::U16(_) => DataType::UInt16,
            Column::I8(_) => DataType::Int8,
            Column::U8(_) => DataType::UInt8,
            Column::F64List(_) => list_type(DataType::Float64),
            Column::F32List(_) => list_type(DataType::Float32),
        }
    }

    pub fn to_arrow(&self) -> ArrayRef {
        match self {
            Column::F64(v) => Arc::new(Float64Array::from(v.clone())),
            Column::F32(v) => Arc::new(Float32Array::from(v.clone())),
            Column::I64(v) => Arc::new(Int64Array::from(v.clone())),
            Column::I32(v) => Arc::new(Int32Array::from(v.clone())),
            Column::U32(v) => Arc::new(UInt32Array::from(v.clone())),
            Column::I16(v) => Arc::new(Int16Array::from(v.clone())),
            Column::U16(v) => Arc::new(UInt16Array::from(v.clone())),
            Column::I8(v) => Arc::new(Int8Array::from(v.clone())),
            Column::U8(v) => Arc::new(UInt8Array::from(v.clone())),
            Column::F64List(v) => Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(
                v.iter().map(|row| Some(row.iter().copied().map(Some))),
            )),
            Column::F32List(v) => Arc::new(ListArray::from_iter_primitive::<Float32Type, _, _>(
                v.iter().map(|row| Some(row.iter().copied().map(Some))),
            )),
        }
    }

    /// Convert an Arrow array into a column.
    ///
    /// Null slots of primitive arrays are read as their stored value, null list rows as empty
    /// contours. Lists, large lists and fixed size lists of `Float64`/`Float32` are accepted.
    pub fn from_arrow(field: &str, array: &dyn Array) -> Result<Column, NetworkError> {
        let unsupported = || NetworkError::UnsupportedColumnType {
            field: field.to_string(),
            data_type: array.data_type().clone(),
        };

        let column = match array.data_type() {
            DataType::Float64 => Column::F64(array.as_primitive::<Float64Type>().values().to_vec()),
            DataType::Float32 => Column::F32(array.as_primitive::<Float32Type>().values().to_vec()),
            DataType::Int64 => Column::I64(array.as_primitive::<Int64Type>().values().to_vec()),
            DataType::Int32 => Column::I32(array.as_primitive::<Int32Type>().values().to_vec()),
            DataType::UInt32 => Column::U32(array.as_primitive::<UInt32Type>().values().to_vec()),
            DataType::Int16 => Column::I16(array.as_primitive::<Int16Type>().values().to_vec()),
            DataType::UInt16 => Column::U16(array.as_primitive::<UInt16Type>().values().to_vec()),
            DataType::Int8 => Column::I8(array.as_primitive::<Int8Type>().values().to_vec()),
            DataType::UInt8 => Column::U8(array.as_primitive::<UInt8Type>().values().to_vec()),
            DataType::List(inner) => match inner.data_type() {
                DataType::Float64 => {
                    Column::F64List(float_lists::<Float64Type>(array.as_list::<i32>().iter()))
                }
                DataType::Float32 => {
                    Column::F32List(float_lists::<Float32Type>(array.as_list::<i32>().iter()))
                }
                _ => return Err(unsupported()),
            },
            DataType::LargeList(inner) => match inner.data_type() {
                DataType::Float64 => {
                    Column::F64List(float_lists::<Float64Type>(array.as_list::<i64>().iter()))
                }
                DataType::Float32 => {
                    Column::F32List(float_lists::<Float32Type>(array.as_list::<i64>().iter()))
                }
                _ => return Err(unsupported()),
            },
            DataType::FixedSizeList(inner, _) => match inner.data_type() {
                DataType::Float64 => Column::F64List(float_lists::<Float64Type>(
                    array.as_fixed_size_list().iter(),
                )),
                DataType::Float32 => Column::F32List(float_lists::<Float32Type>(
                    array.as_fixed_size_list().iter(),
                )),
                _ => return Err(unsupported()),
            },
            _ => return Err(unsupported()),
        };
        Ok(column)
    }
}

#[cfg(test)]
mod test_column {
    use super::*;

    #[test]
    fn test_scatter_and_gather() {
        let mut dst = Column::I32(vec![0; 4]);
        assert!(dst.scatter(&[3, 0], &Column::I32(vec![7, 9])));
        assert_eq!(dst, Column::I32(vec![9, 0, 0, 7]));

        assert_eq!(dst.gather(&[3, 3, 0]), Column::I32(vec![7, 7, 9]));
    }

    #[test]
    fn test_scatter_type_mismatch() {
        let mut dst = Column::I32(vec![0; 2]);
        assert!(!dst.scatter(&[0], &Column::F64(vec![1.0])));
        assert_eq!(dst, Column::I32(vec![0, 0]));
    }

    #[test]
    fn test_zeros_like_lists() {
        let model = Column::F32List(vec![vec![1.0, 2.0]]);
        assert_eq!(model.zeros_like(3), Column::F32List(vec![vec![], vec![], vec![]]));
    }

    #[test]
    fn test_unpack() {
        let packed = Column::I16(vec![0, 10, -10]);
        let packing = Packing::new(0.5, 100.0);
        assert_eq!(packed.unpack(&packing), Column::F64(vec![100.0, 105.0, 95.0]));

        let lists = Column::F32List(vec![vec![2.0], vec![]]);
        assert_eq!(
            lists.unpack(&Packing::new(2.0, 0.0)),
            Column::F64List(vec![vec![4.0], vec![]])
        );
    }

    #[test]
    fn test_arrow_conversion_keeps_list_type() {
        let column = Column::F64List(vec![vec![0.0, 1.0, 1.0], vec![], vec![2.5]]);
        let array = column.to_arrow();
        assert_eq!(array.data_type(), &column.data_type());
        assert_eq!(Column::from_arrow("contour", array.as_ref()).unwrap(), column);
    }

    #[test]
    fn test_unsupported_arrow_type() {
        let array = arrow_array::BooleanArray::from(vec![true, false]);
        assert!(matches!(
            Column::from_arrow("flag", &array),
            Err(NetworkError::UnsupportedColumnType { .. })
        ));
    }

    #[test]
    fn test_packing_metadata() {
        let metadata = HashMap::from([(SCALE_FACTOR_KEY.to_string(), "0.01".to_string())]);
        assert_eq!(
            Packing::from_metadata("amplitude", &metadata).unwrap(),
            Some(Packing::new(0.01, 0.0))
        );
        assert_eq!(Packing::from_metadata("amplitude", &HashMap::new()).unwrap(), None);

        let broken = HashMap::from([(ADD_OFFSET_KEY.to_string(), "abc".to_string())]);
        assert!(Packing::from_metadata("amplitude", &broken).is_err());
    }
}
