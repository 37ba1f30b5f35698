use std::cell::Cell;
use std::collections::HashMap;

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};

use crate::network_errors::NetworkError;
use crate::observations::observations::Observations;
use crate::observations::ObservationStore;

/// [`ObservationStore`] over collections already resident in memory, keyed by file id.
///
/// Loads clone the stored collection (after projection). The number of loads served is
/// counted, which makes the store handy to observe caching behaviour.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    files: HashMap<Utf8PathBuf, Observations, RandomState>,
    loads: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<Utf8PathBuf>, observations: Observations) {
        self.files.insert(id.into(), observations);
    }

    /// File ids, sorted.
    pub fn ids(&self) -> Vec<Utf8PathBuf> {
        let mut ids: Vec<Utf8PathBuf> = self.files.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of successful loads served so far.
    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl FromIterator<(Utf8PathBuf, Observations)> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = (Utf8PathBuf, Observations)>>(iter: I) -> Self {
        InMemoryStore {
            files: iter.into_iter().collect(),
            loads: Cell::new(0),
        }
    }
}

impl ObservationStore for InMemoryStore {
    fn load(
        &self,
        id: &Utf8Path,
        include_fields: Option<&[&str]>,
        raw: bool,
    ) -> Result<Observations, NetworkError> {
        let stored = self.files.get(id).ok_or_else(|| {
            NetworkError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no observations registered for {id}"),
            ))
        })?;

        let observations = match include_fields {
            Some(names) => stored.project(names)?,
            None => stored.clone(),
        };
        self.loads.set(self.loads.get() + 1);

        Ok(if raw {
            observations
        } else {
            observations.unpacked()
        })
    }
}
