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

//! Defines a [SparkError] for representing failures in the local engine.
//! Most of these are wrappers for arrow, io or regex error messages
use std::error::Error;
use std::fmt::Debug;

use arrow::error::ArrowError;
use thiserror::Error;

/// Different engine error types
#[derive(Error, Debug)]
pub enum SparkError {
    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    #[error("Analysis Exception: {0}")]
    AnalysisException(String),

    #[error("Apache Arrow Error: {0}")]
    ArrowError(#[from] ArrowError),

    #[error("External Error: {0}")]
    ExternalError(Box<dyn Error + Send + Sync>),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Io Error: {0}")]
    IoError(String, std::io::Error),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Not Yet Implemented: {0}")]
    NotYetImplemented(String),

    #[error("Session Closed: {0}")]
    SessionClosed(String),
}

impl SparkError {
    /// Wraps an external error in an `SparkError`.
    pub fn from_external_error(error: Box<dyn Error + Send + Sync>) -> Self {
        Self::ExternalError(error)
    }

    pub(crate) fn column_not_found(name: &str, available: &[String]) -> Self {
        SparkError::AnalysisException(format!(
            "cannot resolve column `{name}` given input columns: [{}]",
            available.join(", ")
        ))
    }
}

impl From<std::io::Error> for SparkError {
    fn from(error: std::io::Error) -> Self {
        SparkError::IoError(error.to_string(), error)
    }
}

impl From<regex::Error> for SparkError {
    fn from(error: regex::Error) -> Self {
        SparkError::InvalidArgument(error.to_string())
    }
}

impl From<std::num::ParseIntError> for SparkError {
    fn from(error: std::num::ParseIntError) -> Self {
        SparkError::InvalidArgument(error.to_string())
    }
}

impl From<tokio::task::JoinError> for SparkError {
    fn from(error: tokio::task::JoinError) -> Self {
        SparkError::Aborted(error.to_string())
    }
}
