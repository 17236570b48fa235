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

//! Descriptive analysis of a small labeled-text dataset
//!
//! The sample rows pair a mood label with a piece of free text. The pipeline
//! cleans the table, reports statistics and per-mood counts, tokenizes the
//! text into words, and writes the cleaned rows and the most frequent words
//! out as CSV.
//!
//! ```rust
//! use minispark::SparkSessionBuilder;
//! use mood_analysis::config::AnalysisConfig;
//! use mood_analysis::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let spark = SparkSessionBuilder::default().build()?;
//!
//!     let report = pipeline::run(&spark, &AnalysisConfig::default()).await;
//!     spark.stop();
//!
//!     println!("{:?}", report?.top_words);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod pipeline;

/// Application name the binary registers with its session
pub const APP_NAME: &str = "BigData_Analysis_Project";
