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

//! Spark Session owning the local execution context

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arrow::record_batch::RecordBatch;

use tracing::{debug, info};
use uuid::Uuid;

use crate::conf::{self, RunTimeConfig};
use crate::dataframe::{DataFrame, DataFrameReader};
use crate::errors::SparkError;
use crate::execution::{self, split_partitions};
use crate::plan::{LogicalPlan, LogicalPlanBuilder};

/// SparkSessionBuilder creates a local Spark Session from a set of config options.
#[derive(Clone, Debug, Default)]
pub struct SparkSessionBuilder {
    configs: HashMap<String, String>,
}

impl SparkSessionBuilder {
    /// Sets a config option.
    pub fn config(mut self, key: &str, value: &str) -> Self {
        self.configs.insert(key.into(), value.into());
        self
    }

    /// Sets a name for the application.
    pub fn app_name(mut self, name: &str) -> Self {
        self.configs.insert(conf::APP_NAME.to_string(), name.into());
        self
    }

    /// Validate the config options and return a [SparkSession]
    pub fn build(&self) -> Result<SparkSession, SparkError> {
        let session_id = Uuid::new_v4().to_string();

        let mut settings = self.configs.clone();
        settings
            .entry(conf::APP_NAME.to_string())
            .or_insert_with(|| "minispark".to_string());
        settings.insert(conf::SESSION_ID.to_string(), session_id.clone());

        let runtime_conf = RunTimeConfig::new(settings);
        let parallelism = runtime_conf.default_parallelism()?;

        info!(
            app_name = %runtime_conf.get(conf::APP_NAME, None)?,
            session_id = %session_id,
            parallelism,
            "spark session started"
        );

        Ok(SparkSession {
            inner: Arc::new(SessionState {
                session_id,
                conf: runtime_conf,
                active: AtomicBool::new(true),
            }),
        })
    }
}

#[derive(Debug)]
struct SessionState {
    session_id: String,
    conf: RunTimeConfig,
    active: AtomicBool,
}

/// The entry point to the local DataFrame engine.
///
/// Clones share the same state, so stopping any handle stops the session for all of them.
#[derive(Clone, Debug)]
pub struct SparkSession {
    inner: Arc<SessionState>,
}

impl SparkSession {
    pub fn builder() -> SparkSessionBuilder {
        SparkSessionBuilder::default()
    }

    /// Returns a [DataFrameReader] that can be used to read data in as a [DataFrame]
    pub fn read(&self) -> DataFrameReader {
        DataFrameReader::new(self.clone())
    }

    /// Create a [DataFrame] from an arrow [RecordBatch], split into
    /// `minispark.default.parallelism` partitions
    pub fn create_dataframe(&self, data: &RecordBatch) -> Result<DataFrame, SparkError> {
        self.check_active()?;

        let partitions = split_partitions(data, self.conf().default_parallelism()?)?;
        let plan = LogicalPlanBuilder::local_relation(data.schema(), partitions);

        Ok(DataFrame::new(self.clone(), plan))
    }

    /// Runtime configuration interface
    pub fn conf(&self) -> RunTimeConfig {
        self.inner.conf.clone()
    }

    /// Unique id of the session
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Stop the session. Calling `stop` more than once has no effect.
    pub fn stop(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            info!(session_id = %self.inner.session_id, "spark session stopped");
        }
    }

    pub(crate) fn check_active(&self) -> Result<(), SparkError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SparkError::SessionClosed(format!(
                "session {} has been stopped",
                self.inner.session_id
            )))
        }
    }

    /// Evaluate a plan on the blocking thread pool
    pub(crate) async fn execute_plan(
        &self,
        plan: LogicalPlan,
    ) -> Result<Vec<RecordBatch>, SparkError> {
        self.check_active()?;

        debug!(session_id = %self.inner.session_id, "executing plan\n{plan}");

        tokio::task::spawn_blocking(move || execution::execute(&plan)).await?
    }
}
