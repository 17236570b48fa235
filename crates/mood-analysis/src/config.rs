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

//! Command line flags and the settings derived from them

use clap::Parser;

use minispark::conf;

use crate::dataset::{MOOD_COLUMN, TEXT_COLUMN};

/// Descriptive statistics, group counts and word frequencies over a labeled-text sample
#[derive(Parser, Debug, Clone)]
#[command(name = "mood-analysis")]
#[command(version)]
pub struct Cli {
    /// Output directory for the cleaned table
    #[arg(long, value_name = "DIR", default_value = "clean_output_csv")]
    pub clean_output: String,

    /// Output directory for the top word frequencies
    #[arg(long, value_name = "DIR", default_value = "top_words_output")]
    pub words_output: String,

    /// Column holding the category label
    #[arg(long, value_name = "NAME", default_value = MOOD_COLUMN)]
    pub group_column: String,

    /// Column holding the free text
    #[arg(long, value_name = "NAME", default_value = TEXT_COLUMN)]
    pub text_column: String,

    /// Number of most frequent words to keep
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Number of partitions the sample is split into
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub partitions: u16,

    /// Write a header line in every CSV part file
    #[arg(long)]
    pub header: bool,

    /// Extra session config, may be repeated
    #[arg(long = "conf", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub confs: Vec<(String, String)>,

    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid KEY=VALUE: no `=` found in `{s}`")),
    }
}

/// Where and how the result tables are written
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub clean_output: String,
    pub words_output: String,
    pub header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clean_output: "clean_output_csv".to_string(),
            words_output: "top_words_output".to_string(),
            header: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub group_column: String,
    pub text_column: String,
    pub top: usize,
    pub output: OutputConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            group_column: MOOD_COLUMN.to_string(),
            text_column: TEXT_COLUMN.to_string(),
            top: 20,
            output: OutputConfig::default(),
        }
    }
}

impl Cli {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            group_column: self.group_column.clone(),
            text_column: self.text_column.clone(),
            top: self.top,
            output: OutputConfig {
                clean_output: self.clean_output.clone(),
                words_output: self.words_output.clone(),
                header: self.header,
            },
        }
    }

    /// Session configs: `--partitions` first so an explicit `--conf` wins
    pub fn session_configs(&self) -> Vec<(String, String)> {
        let mut configs = vec![(
            conf::DEFAULT_PARALLELISM.to_string(),
            self.partitions.to_string(),
        )];
        configs.extend(self.confs.iter().cloned());
        configs
    }

    /// Filter directive for the log subscriber
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
