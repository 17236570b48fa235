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

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::record_batch::RecordBatch;
use regex::Regex;

use minispark::errors::SparkError;
use minispark::{SparkSession, SparkSessionBuilder};

use mood_analysis::config::{AnalysisConfig, OutputConfig};
use mood_analysis::dataset::{create_sample_dataframe, MOOD_COLUMN, TEXT_COLUMN};
use mood_analysis::pipeline::{self, clean, collect_counts, group_counts, tokenize, top_words};

fn setup(partitions: usize) -> SparkSession {
    SparkSessionBuilder::default()
        .app_name("mood_analysis_tests")
        .config("minispark.default.parallelism", &partitions.to_string())
        .build()
        .unwrap()
}

fn part_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("part-"))
        .collect();
    names.sort();
    names
}

fn output_config(dir: &Path) -> OutputConfig {
    OutputConfig {
        clean_output: dir.join("clean_output_csv").to_string_lossy().to_string(),
        words_output: dir.join("top_words_output").to_string_lossy().to_string(),
        header: true,
    }
}

#[tokio::test]
async fn test_sample_table_shape() -> Result<(), SparkError> {
    let spark = setup(3);
    let df = create_sample_dataframe(&spark)?;

    assert_eq!(15, df.clone().count().await?);
    assert_eq!(
        vec![MOOD_COLUMN.to_string(), TEXT_COLUMN.to_string()],
        df.columns().await?
    );
    Ok(())
}

#[tokio::test]
async fn test_clean_is_idempotent() -> Result<(), SparkError> {
    let spark = setup(2);
    let df = create_sample_dataframe(&spark)?;

    let once = clean(df).await?;
    let twice = clean(once.clone()).await?;

    let once = once.collect().await?;
    assert_eq!(15, once.num_rows());
    assert_eq!(once, twice.collect().await?);
    Ok(())
}

#[tokio::test]
async fn test_group_counts_by_mood() -> Result<(), SparkError> {
    let spark = setup(4);
    let cleaned = clean(create_sample_dataframe(&spark)?).await?;

    let groups = group_counts(cleaned, MOOD_COLUMN)
        .await?
        .expect("mood column exists");
    let counts = collect_counts(groups).await?;

    assert_eq!(
        vec![
            ("Happy".to_string(), 6),
            ("Angry".to_string(), 3),
            ("Neutral".to_string(), 3),
            ("Sad".to_string(), 3),
        ],
        counts
    );
    assert_eq!(15, counts.iter().map(|(_, count)| count).sum::<i64>());
    Ok(())
}

#[tokio::test]
async fn test_missing_columns_skip_stages() -> Result<(), SparkError> {
    let spark = setup(1);
    let df = create_sample_dataframe(&spark)?;

    assert!(group_counts(df.clone(), "category").await?.is_none());
    assert!(tokenize(df.clone(), "User_Input").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_tokens_are_lowercase_words() -> Result<(), SparkError> {
    let spark = setup(3);
    let cleaned = clean(create_sample_dataframe(&spark)?).await?;

    let tokens = tokenize(cleaned, TEXT_COLUMN)
        .await?
        .expect("text column exists")
        .select("word")
        .collect()
        .await?;

    let word = Regex::new("^[a-z]+$").unwrap();
    let words = tokens.column(0).as_string::<i32>();

    assert_eq!(82, tokens.num_rows());
    assert_eq!(0, tokens.column(0).null_count());
    assert!(words.iter().flatten().all(|token| word.is_match(token)));
    Ok(())
}

#[tokio::test]
async fn test_top_words_order() -> Result<(), SparkError> {
    let spark = setup(2);
    let cleaned = clean(create_sample_dataframe(&spark)?).await?;
    let tokens = tokenize(cleaned, TEXT_COLUMN).await?.expect("text column exists");

    let words = collect_counts(top_words(tokens, 20)).await?;

    assert_eq!(20, words.len());
    assert_eq!(("it".to_string(), 4), words[0]);
    assert_eq!(("i".to_string(), 3), words[1]);
    assert_eq!(("very".to_string(), 3), words[2]);
    assert!(words.iter().all(|(_, count)| *count >= 1));
    assert!(words.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    Ok(())
}

#[tokio::test]
async fn test_overwrite_leaves_no_stale_files() -> Result<(), SparkError> {
    let dir = tempfile::tempdir()?;
    let output = output_config(dir.path());
    let clean_dir = dir.path().join("clean_output_csv");

    let wide = setup(4);
    let cleaned = clean(create_sample_dataframe(&wide)?).await?;
    pipeline::write_outputs(cleaned, None, &output).await?;
    assert_eq!(4, part_files(&clean_dir).len());

    let narrow = setup(1);
    let cleaned = clean(create_sample_dataframe(&narrow)?).await?;
    pipeline::write_outputs(cleaned, None, &output).await?;
    assert_eq!(1, part_files(&clean_dir).len());
    assert!(clean_dir.join("_SUCCESS").exists());

    let reread = narrow
        .read()
        .format("csv")
        .option("header", "true")
        .load([output.clean_output.as_str()])?;

    assert_eq!(15, reread.clone().count().await?);
    assert_eq!(
        vec![MOOD_COLUMN.to_string(), TEXT_COLUMN.to_string()],
        reread.columns().await?
    );
    Ok(())
}

#[tokio::test]
async fn test_run_reports_and_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let spark = setup(2);
    let config = AnalysisConfig {
        output: output_config(dir.path()),
        ..AnalysisConfig::default()
    };

    let report = pipeline::run(&spark, &config).await?;
    spark.stop();

    assert_eq!(15, report.total_rows);
    assert_eq!(15, report.cleaned_rows);
    assert_eq!(4, report.group_counts.len());
    assert!(report.top_words.len() <= 20);

    assert_eq!(
        Some(config.output.words_output.clone()),
        report.outputs.words_output
    );

    let words_dir = dir.path().join("top_words_output");
    assert_eq!(1, part_files(&words_dir).len());
    assert!(words_dir.join("_SUCCESS").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_after_stop_fails() -> Result<(), SparkError> {
    let spark = setup(1);
    spark.stop();

    assert!(pipeline::run(&spark, &AnalysisConfig::default()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_empty_top_words_are_still_written() -> Result<(), SparkError> {
    let dir = tempfile::tempdir()?;
    let output = output_config(dir.path());
    let spark = setup(2);

    let text: ArrayRef = Arc::new(StringArray::from(vec!["!!!", "42 / 7"]));
    let batch = RecordBatch::try_from_iter(vec![(TEXT_COLUMN, text)])?;
    let cleaned = clean(spark.create_dataframe(&batch)?).await?;

    let tokens = tokenize(cleaned.clone(), TEXT_COLUMN)
        .await?
        .expect("text column exists");
    let words = top_words(tokens, 20);
    assert!(words.clone().is_empty().await?);

    let written = pipeline::write_outputs(cleaned, Some(words), &output).await?;

    assert_eq!(Some(output.words_output.clone()), written.words_output);
    let words_dir = dir.path().join("top_words_output");
    assert_eq!(1, part_files(&words_dir).len());
    assert!(words_dir.join("_SUCCESS").exists());
    Ok(())
}

#[tokio::test]
async fn test_unwritable_destination_is_an_error() -> Result<(), SparkError> {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory")?;

    let output = OutputConfig {
        clean_output: blocker.join("clean").to_string_lossy().to_string(),
        ..output_config(dir.path())
    };

    let spark = setup(1);
    let cleaned = clean(create_sample_dataframe(&spark)?).await?;
    let res = pipeline::write_outputs(cleaned, None, &output).await;

    assert!(matches!(res, Err(SparkError::IoError(_, _))));
    assert!(blocker.is_file());
    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_plain_file() -> Result<(), SparkError> {
    let dir = tempfile::tempdir()?;
    let output = output_config(dir.path());
    let words_dir = dir.path().join("top_words_output");
    std::fs::write(&words_dir, "stale")?;

    let spark = setup(1);
    let cleaned = clean(create_sample_dataframe(&spark)?).await?;
    let tokens = tokenize(cleaned.clone(), TEXT_COLUMN)
        .await?
        .expect("text column exists");

    pipeline::write_outputs(cleaned, Some(top_words(tokens, 5)), &output).await?;

    assert!(words_dir.is_dir());
    assert_eq!(1, part_files(&words_dir).len());
    assert!(words_dir.join("_SUCCESS").exists());
    Ok(())
}
