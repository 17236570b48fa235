// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Configuration for a local application. Used to set various parameters as key-value pairs.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::errors::SparkError;

pub const APP_NAME: &str = "spark.app.name";
pub const SESSION_ID: &str = "minispark.session.id";
pub const DEFAULT_PARALLELISM: &str = "minispark.default.parallelism";

/// Keys fixed for the lifetime of the session
const STATIC_KEYS: [&str; 2] = [APP_NAME, SESSION_ID];

/// User-facing configuration API, accessible through `SparkSession::conf`.
///
/// # Example
/// ```rust
/// spark
///    .conf()
///    .set("minispark.default.parallelism", "4")?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct RunTimeConfig {
    settings: Arc<RwLock<HashMap<String, String>>>,
}

impl RunTimeConfig {
    pub(crate) fn new(settings: HashMap<String, String>) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Sets the given runtime configuration property.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SparkError> {
        if !self.is_modifiable(key) {
            return Err(SparkError::InvalidArgument(format!(
                "Cannot modify the value of a static config: {key}"
            )));
        }

        self.write()?.insert(key.to_string(), value.to_string());

        Ok(())
    }

    /// Resets the configuration property for the given key.
    pub fn unset(&self, key: &str) -> Result<(), SparkError> {
        if !self.is_modifiable(key) {
            return Err(SparkError::InvalidArgument(format!(
                "Cannot modify the value of a static config: {key}"
            )));
        }

        self.write()?.remove(key);

        Ok(())
    }

    /// Returns the value of the property, or `default` when the key is not set
    pub fn get(&self, key: &str, default: Option<&str>) -> Result<String, SparkError> {
        let settings = self
            .settings
            .read()
            .map_err(|err| SparkError::Aborted(err.to_string()))?;

        match (settings.get(key), default) {
            (Some(value), _) => Ok(value.clone()),
            (None, Some(default)) => Ok(default.to_string()),
            (None, None) => Err(SparkError::NotFound(format!("config key {key}"))),
        }
    }

    /// Indicates whether the configuration property with the given key is modifiable in the current session.
    pub fn is_modifiable(&self, key: &str) -> bool {
        !STATIC_KEYS.contains(&key)
    }

    /// All settings, sorted by key
    pub fn get_all(&self) -> Result<BTreeMap<String, String>, SparkError> {
        let settings = self
            .settings
            .read()
            .map_err(|err| SparkError::Aborted(err.to_string()))?;

        Ok(settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Number of partitions a local relation is split into
    pub fn default_parallelism(&self) -> Result<usize, SparkError> {
        let value = self.get(DEFAULT_PARALLELISM, Some("1"))?;
        let parallelism: usize = value.trim().parse()?;

        if parallelism == 0 {
            return Err(SparkError::InvalidArgument(format!(
                "{DEFAULT_PARALLELISM} must be at least 1"
            )));
        }

        Ok(parallelism)
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, String>>, SparkError> {
        self.settings
            .write()
            .map_err(|err| SparkError::Aborted(err.to_string()))
    }
}
