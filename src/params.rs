//! # Network parameters
//!
//! Configuration of a [`Network`](crate::network::Network) run:
//!
//! * `window` – number of following files each file is compared with.
//! * `contour` – which contour drives the overlap test.
//! * `memory` – read each file into memory before decoding it.
//! * `buffer_size` – contour cache size, defaults to `window`.
//!
//! Parameters are built with [`NetworkParams::builder`], which validates them. They are
//! also `serde` (de)serializable so they can live inside a caller's configuration file;
//! call [`NetworkParams::validate`] on deserialized values.
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WINDOW;
use crate::network_errors::NetworkError;
use crate::observations::ContourKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub window: usize,
    pub contour: ContourKind,
    pub memory: bool,
    /// Number of resident files above which the contour cache evicts, `None` for `window`.
    pub buffer_size: Option<usize>,
}

impl NetworkParams {
    /// Equivalent to [`NetworkParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`NetworkParamsBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddynet::params::NetworkParams;
    ///
    /// let params = NetworkParams::builder()
    ///     .window(3)
    ///     .intern(true)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.cache_capacity(), 3);
    /// ```
    pub fn builder() -> NetworkParamsBuilder {
        NetworkParamsBuilder::new()
    }

    /// Effective contour cache size.
    pub fn cache_capacity(&self) -> usize {
        self.buffer_size.unwrap_or(self.window)
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.window < 1 {
            return Err(NetworkError::InvalidParameter(
                "window must be >= 1".into(),
            ));
        }
        if self.buffer_size == Some(0) {
            return Err(NetworkError::InvalidParameter(
                "buffer_size must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        NetworkParams {
            window: DEFAULT_WINDOW,
            contour: ContourKind::Effective,
            memory: false,
            buffer_size: None,
        }
    }
}

/// Builder for [`NetworkParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct NetworkParamsBuilder {
    params: NetworkParams,
}

impl NetworkParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: NetworkParams::default(),
        }
    }

    pub fn window(mut self, v: usize) -> Self {
        self.params.window = v;
        self
    }
    pub fn contour(mut self, v: ContourKind) -> Self {
        self.params.contour = v;
        self
    }
    /// Use the speed contour instead of the effective one.
    pub fn intern(mut self, v: bool) -> Self {
        self.params.contour = ContourKind::from_intern(v);
        self
    }
    pub fn memory(mut self, v: bool) -> Self {
        self.params.memory = v;
        self
    }
    pub fn buffer_size(mut self, v: usize) -> Self {
        self.params.buffer_size = Some(v);
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ------
    /// * `Err(NetworkError::InvalidParameter)` if `window` or `buffer_size` is zero.
    pub fn build(self) -> Result<NetworkParams, NetworkError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
