use crate::constants::TIME_FIELD;
use crate::network_errors::NetworkError;
use crate::observations::column::{Column, Packing};
use crate::observations::contour::{ContourKind, ContourSet};

/// One named field of an [`Observations`] collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub name: String,
    pub column: Column,
    /// Storage encoding of the values, kept verbatim by raw loads.
    pub packing: Option<Packing>,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, column: Column, packing: Option<Packing>) -> Self {
        FieldEntry {
            name: name.into(),
            column,
            packing,
        }
    }
}

/// A columnar collection of observations.
///
/// Every field holds exactly [`len`](Observations::len) values, field order is preserved
/// (it is the column order of the file the collection was read from). The `sign_type`
/// attribute is the polarity shared by all the observations of the collection.
///
/// Observations loaded from a file are never mutated in place by the network stages:
/// the assembler and the link reconstructor always allocate a fresh collection
/// (see [`Observations::new_like`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations {
    fields: Vec<FieldEntry>,
    len: usize,
    pub sign_type: Option<i8>,
}

impl Observations {
    /// An empty collection, without any field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from its fields.
    ///
    /// Return
    /// ------
    /// * `Err(NetworkError::ColumnLengthMismatch)` if the fields do not share the same length.
    pub fn from_fields(
        fields: Vec<FieldEntry>,
        sign_type: Option<i8>,
    ) -> Result<Self, NetworkError> {
        let mut observations = Observations {
            fields: Vec::with_capacity(fields.len()),
            len: 0,
            sign_type,
        };
        for entry in fields {
            observations.push_entry(entry)?;
        }
        Ok(observations)
    }

    /// Allocate a zero-filled collection with the same schema, packing and sign type as `model`,
    /// holding `n` observations.
    pub fn new_like(model: &Observations, n: usize) -> Self {
        Observations {
            fields: model
                .fields
                .iter()
                .map(|f| FieldEntry::new(f.name.clone(), f.column.zeros_like(n), f.packing))
                .collect(),
            len: n,
            sign_type: model.sign_type,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Field names, in storage order.
    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn field_entry(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Column> {
        self.field_entry(name).map(|f| &f.column)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.column)
    }

    /// Add a field, or replace the field with the same name.
    ///
    /// The first field pushed into an empty, field-less collection fixes its length.
    pub fn push_field(
        &mut self,
        name: impl Into<String>,
        column: Column,
        packing: Option<Packing>,
    ) -> Result<(), NetworkError> {
        self.push_entry(FieldEntry::new(name, column, packing))
    }

    fn push_entry(&mut self, entry: FieldEntry) -> Result<(), NetworkError> {
        if self.fields.is_empty() {
            self.len = entry.column.len();
        } else if entry.column.len() != self.len {
            return Err(NetworkError::ColumnLengthMismatch {
                field: entry.name,
                expected: self.len,
                found: entry.column.len(),
            });
        }

        match self.fields.iter_mut().find(|f| f.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.fields.push(entry),
        }
        Ok(())
    }

    /// Write the values of `src` at `positions` of the field `name`.
    ///
    /// Panics if a position is out of range.
    pub fn scatter_field(
        &mut self,
        name: &str,
        positions: &[u32],
        src: &Column,
    ) -> Result<(), NetworkError> {
        let dst = self
            .field_mut(name)
            .ok_or_else(|| NetworkError::MissingField(name.to_string()))?;
        if dst.scatter(positions, src) {
            Ok(())
        } else {
            Err(NetworkError::ColumnTypeMismatch {
                field: name.to_string(),
            })
        }
    }

    /// A new collection holding the observations at `order`, in that order.
    pub fn gather(&self, order: &[usize]) -> Self {
        Observations {
            fields: self
                .fields
                .iter()
                .map(|f| FieldEntry::new(f.name.clone(), f.column.gather(order), f.packing))
                .collect(),
            len: order.len(),
            sign_type: self.sign_type,
        }
    }

    /// Keep only the fields listed in `include_fields`, in storage order.
    ///
    /// Return
    /// ------
    /// * `Err(NetworkError::MissingField)` if a requested field does not exist.
    pub fn project(&self, include_fields: &[&str]) -> Result<Self, NetworkError> {
        if let Some(missing) = include_fields.iter().find(|name| !self.has_field(name)) {
            return Err(NetworkError::MissingField(missing.to_string()));
        }
        Ok(Observations {
            fields: self
                .fields
                .iter()
                .filter(|f| include_fields.contains(&f.name.as_str()))
                .cloned()
                .collect(),
            len: self.len,
            sign_type: self.sign_type,
        })
    }

    /// Decode every packed field. Decoded fields lose their packing descriptor.
    pub fn unpacked(self) -> Self {
        Observations {
            fields: self
                .fields
                .into_iter()
                .map(|f| match f.packing {
                    Some(packing) => FieldEntry::new(f.name, f.column.unpack(&packing), None),
                    None => f,
                })
                .collect(),
            len: self.len,
            sign_type: self.sign_type,
        }
    }

    /// Scalar field `name` decoded to `f64`.
    pub fn values_f64(&self, name: &str) -> Result<Vec<f64>, NetworkError> {
        let entry = self
            .field_entry(name)
            .ok_or_else(|| NetworkError::MissingField(name.to_string()))?;
        let values = entry
            .column
            .to_f64_values()
            .ok_or_else(|| NetworkError::ColumnTypeMismatch {
                field: name.to_string(),
            })?;
        Ok(match entry.packing {
            Some(packing) => values.into_iter().map(|v| packing.apply(v)).collect(),
            None => values,
        })
    }

    /// List field `name` decoded to `f64`.
    pub fn lists_f64(&self, name: &str) -> Result<Vec<Vec<f64>>, NetworkError> {
        let entry = self
            .field_entry(name)
            .ok_or_else(|| NetworkError::MissingField(name.to_string()))?;
        let lists = entry
            .column
            .to_f64_lists()
            .ok_or_else(|| NetworkError::ColumnTypeMismatch {
                field: name.to_string(),
            })?;
        Ok(match entry.packing {
            Some(packing) => lists
                .into_iter()
                .map(|row| row.into_iter().map(|v| packing.apply(v)).collect())
                .collect(),
            None => lists,
        })
    }

    pub fn time(&self) -> Result<Vec<f64>, NetworkError> {
        self.values_f64(TIME_FIELD)
    }

    pub fn contours(&self, kind: ContourKind) -> Result<ContourSet, NetworkError> {
        Ok(ContourSet::new(
            self.lists_f64(kind.x_field())?,
            self.lists_f64(kind.y_field())?,
        ))
    }
}
