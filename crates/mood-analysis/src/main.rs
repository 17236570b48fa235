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

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

use minispark::SparkSession;
use mood_analysis::config::Cli;
use mood_analysis::{pipeline, APP_NAME};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("mood-analysis started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let builder = cli
        .session_configs()
        .iter()
        .fold(SparkSession::builder().app_name(APP_NAME), |builder, (key, value)| {
            builder.config(key, value)
        });

    let spark = builder.build().context("failed to start the spark session")?;

    // the session is released whether or not the analysis succeeded
    let result = pipeline::run(&spark, &cli.analysis_config()).await;
    spark.stop();
    println!("Spark session stopped");

    let report = result?;
    debug!(
        cleaned_rows = report.cleaned_rows,
        groups = report.group_counts.len(),
        words = report.top_words.len(),
        "analysis finished"
    );

    Ok(())
}
