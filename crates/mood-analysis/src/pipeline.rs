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

//! The analysis stages and the driver running them in order
//!
//! Each stage is a plain function from [DataFrame] to [DataFrame]. Stages that
//! depend on a named column return `None` when the column is absent, so the
//! driver can skip them and carry on.

use anyhow::Context;
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Int64Type};

use minispark::dataframe::SaveMode;
use minispark::errors::SparkError;
use minispark::functions::{col, explode, lit, lower, nullif, regexp_replace, split};
use minispark::{DataFrame, SparkSession};

use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, OutputConfig};
use crate::dataset::create_sample_dataframe;

/// Column produced by [tokenize]
pub const WORD_COLUMN: &str = "word";

const FILL_VALUE: &str = "Unknown";

/// What a run computed, for callers that want more than the console report
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisReport {
    pub total_rows: i64,
    pub cleaned_rows: i64,
    pub columns: Vec<String>,
    pub group_counts: Vec<(String, i64)>,
    pub top_words: Vec<(String, i64)>,
    pub outputs: WrittenOutputs,
}

/// Directories [write_outputs] wrote to
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub clean_output: String,
    /// `None` when there was no top-word table to write
    pub words_output: Option<String>,
}

async fn has_column(df: &DataFrame, column: &str) -> Result<bool, SparkError> {
    let columns = df.clone().columns().await?;

    Ok(columns.iter().any(|name| name == column))
}

/// Drop rows where every field is missing and fill the remaining gaps with `"Unknown"`.
///
/// Null and the empty string both count as missing.
pub async fn clean(df: DataFrame) -> Result<DataFrame, SparkError> {
    let schema = df.clone().schema().await?;

    let normalized: Vec<(String, _)> = schema
        .fields()
        .iter()
        .filter(|field| field.data_type() == &DataType::Utf8)
        .map(|field| (field.name().clone(), nullif(col(field.name()), lit(""))))
        .collect();

    Ok(df
        .with_columns(normalized)
        .na()
        .drop("all", None, None)
        .na()
        .fill(FILL_VALUE, None))
}

/// Summary statistics over the integer and floating point columns, `None` when there are none
pub async fn numeric_statistics(df: DataFrame) -> Result<Option<DataFrame>, SparkError> {
    let schema = df.clone().schema().await?;

    let numeric: Vec<String> = schema
        .fields()
        .iter()
        .filter(|field| field.data_type().is_integer() || field.data_type().is_floating())
        .map(|field| field.name().clone())
        .collect();

    if numeric.is_empty() {
        info!("no numeric columns, skipping statistics");
        return Ok(None);
    }

    debug!(columns = ?numeric, "describing numeric columns");

    Ok(Some(df.describe(Some(numeric.iter().map(String::as_str)))))
}

/// Row count per distinct value of `column`, largest group first
pub async fn group_counts(df: DataFrame, column: &str) -> Result<Option<DataFrame>, SparkError> {
    if !has_column(&df, column).await? {
        warn!(column, "group column not found, skipping group counts");
        return Ok(None);
    }

    Ok(Some(
        df.group_by(Some(column))
            .count()
            .sort([col("count").desc(), col(column).asc()]),
    ))
}

/// One row per word of `text_column`, in a new `word` column.
///
/// Text is lowercased and anything outside `[a-zA-Z ]` becomes a space before
/// splitting on whitespace. Empty tokens are dropped.
pub async fn tokenize(df: DataFrame, text_column: &str) -> Result<Option<DataFrame>, SparkError> {
    if !has_column(&df, text_column).await? {
        warn!(column = text_column, "text column not found, skipping tokenizer");
        return Ok(None);
    }

    let tokens = df
        .with_column(
            text_column,
            regexp_replace(lower(col(text_column)), "[^a-zA-Z ]", " "),
        )
        .with_column(WORD_COLUMN, explode(split(col(text_column), r"\s+")))
        .filter(col(WORD_COLUMN).neq(lit("")));

    Ok(Some(tokens))
}

/// The `limit` most frequent words, ties broken alphabetically
pub fn top_words(tokens: DataFrame, limit: usize) -> DataFrame {
    tokens
        .group_by(Some(WORD_COLUMN))
        .count()
        .sort([col("count").desc(), col(WORD_COLUMN).asc()])
        .limit(limit)
}

async fn write_csv(df: DataFrame, path: &str, header: bool) -> Result<(), SparkError> {
    df.write()
        .format("csv")
        .mode(SaveMode::Overwrite)
        .option("header", &header.to_string())
        .save(path)
        .await
}

/// Write the cleaned table and, when present, the top words, replacing earlier output
pub async fn write_outputs(
    clean: DataFrame,
    top_words: Option<DataFrame>,
    output: &OutputConfig,
) -> Result<WrittenOutputs, SparkError> {
    write_csv(clean, &output.clean_output, output.header).await?;
    info!(path = %output.clean_output, "cleaned data written");

    let words_output = match top_words {
        Some(words) => {
            write_csv(words, &output.words_output, output.header).await?;
            info!(path = %output.words_output, "top words written");
            Some(output.words_output.clone())
        }
        None => {
            warn!(path = %output.words_output, "tokenizer skipped, top words not written");
            None
        }
    };

    Ok(WrittenOutputs {
        clean_output: output.clean_output.clone(),
        words_output,
    })
}

/// Collect a `(key, count)` table as owned pairs, rendering the key as text
pub async fn collect_counts(df: DataFrame) -> Result<Vec<(String, i64)>, SparkError> {
    let batch = df.collect().await?;

    if batch.num_columns() != 2 {
        return Err(SparkError::AnalysisException(format!(
            "expected a (key, count) table, got {} columns",
            batch.num_columns()
        )));
    }

    let keys = cast(batch.column(0), &DataType::Utf8)?;
    let keys = keys.as_string::<i32>();
    let counts = batch
        .column(1)
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| SparkError::AnalysisException("count column is not bigint".to_string()))?;

    Ok((0..batch.num_rows())
        .map(|idx| {
            let key = if keys.is_null(idx) {
                "null".to_string()
            } else {
                keys.value(idx).to_string()
            };
            (key, counts.value(idx))
        })
        .collect())
}

/// Run every stage over the sample, print the console report and write the outputs
pub async fn run(spark: &SparkSession, config: &AnalysisConfig) -> anyhow::Result<AnalysisReport> {
    println!("Spark session started (session id {})", spark.session_id());

    let df = create_sample_dataframe(spark).context("failed to build the sample dataset")?;

    let total_rows = df.clone().count().await?;
    println!("Total rows: {total_rows}");
    print!("{}", df.clone().print_schema().await?);
    print!("{}", df.clone().show_string(Some(10), Some(0), None).await?);

    let columns = df.clone().columns().await?;
    println!("Total columns: {}", columns.len());
    println!("Column names: {}", columns.join(", "));

    let cleaned = clean(df).await?;
    let cleaned_rows = cleaned.clone().count().await?;
    println!("Rows after cleaning: {cleaned_rows}");

    match numeric_statistics(cleaned.clone()).await? {
        Some(stats) => print!("{}", stats.show_string(None, None, None).await?),
        None => println!("No numeric columns found for statistics."),
    }

    let group_counts = match group_counts(cleaned.clone(), &config.group_column).await? {
        Some(groups) => {
            println!("Rows per {}:", config.group_column);
            print!("{}", groups.clone().show_string(None, None, None).await?);
            collect_counts(groups).await?
        }
        None => vec![],
    };

    let words = tokenize(cleaned.clone(), &config.text_column)
        .await?
        .map(|tokens| top_words(tokens, config.top));

    let top_words = match &words {
        Some(words) => {
            println!("Top {} words:", config.top);
            print!("{}", words.clone().show_string(Some(config.top), None, None).await?);
            collect_counts(words.clone()).await?
        }
        None => vec![],
    };

    let outputs = write_outputs(cleaned, words, &config.output)
        .await
        .context("failed to write the analysis output")?;

    println!("Cleaned data saved to {}", outputs.clean_output);
    if let Some(path) = &outputs.words_output {
        println!("Top words saved to {path}");
    }

    Ok(AnalysisReport {
        total_rows,
        cleaned_rows,
        columns,
        group_counts,
        top_words,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::record_batch::RecordBatch;

    use minispark::SparkSessionBuilder;

    fn setup() -> SparkSession {
        SparkSessionBuilder::default()
            .app_name("mood_pipeline")
            .config("minispark.default.parallelism", "2")
            .build()
            .unwrap()
    }

    fn gappy_data() -> RecordBatch {
        let mood: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Happy"),
            None,
            Some(""),
            None,
        ]));
        let text: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Great"),
            Some("no label"),
            None,
            Some(""),
        ]));

        RecordBatch::try_from_iter(vec![("mood_type", mood), ("user_input", text)]).unwrap()
    }

    #[tokio::test]
    async fn test_clean_drops_and_fills() -> Result<(), SparkError> {
        let spark = setup();
        let df = spark.create_dataframe(&gappy_data())?;

        let res = clean(df).await?.collect().await?;

        let mood: ArrayRef = Arc::new(StringArray::from(vec!["Happy", "Unknown"]));
        let text: ArrayRef = Arc::new(StringArray::from(vec!["Great", "no label"]));

        assert_eq!(vec![mood, text], res.columns().to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn test_numeric_statistics() -> Result<(), SparkError> {
        let spark = setup();

        let text_only = spark.create_dataframe(&gappy_data())?;
        assert!(numeric_statistics(text_only).await?.is_none());

        let score: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
        let label: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "c"]));
        let batch = RecordBatch::try_from_iter(vec![("label", label), ("score", score)])?;
        let df = spark.create_dataframe(&batch)?;

        let stats = numeric_statistics(df)
            .await?
            .expect("score is numeric")
            .columns()
            .await?;

        assert_eq!(vec!["summary".to_string(), "score".to_string()], stats);
        Ok(())
    }

    #[tokio::test]
    async fn test_tokenize_strips_punctuation() -> Result<(), SparkError> {
        let spark = setup();
        let text: ArrayRef = Arc::new(StringArray::from(vec!["It's GREAT, 10/10!", "  "]));
        let batch = RecordBatch::try_from_iter(vec![("user_input", text)])?;
        let df = spark.create_dataframe(&batch)?;

        let tokens = tokenize(df, "user_input")
            .await?
            .expect("column exists")
            .select("word")
            .collect()
            .await?;

        let words: Vec<&str> = tokens.column(0).as_string::<i32>().iter().flatten().collect();
        assert_eq!(vec!["it", "s", "great"], words);
        Ok(())
    }

    #[tokio::test]
    async fn test_top_words_tie_break() -> Result<(), SparkError> {
        let spark = setup();
        let word: ArrayRef = Arc::new(StringArray::from(vec!["b", "a", "c", "b", "a", "d"]));
        let batch = RecordBatch::try_from_iter(vec![("word", word)])?;
        let df = spark.create_dataframe(&batch)?;

        let res = collect_counts(top_words(df, 3)).await?;

        assert_eq!(
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 2),
                ("c".to_string(), 1)
            ],
            res
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_write_outputs_without_words() -> Result<(), SparkError> {
        let spark = setup();
        let dir = tempfile::tempdir()?;
        let output = OutputConfig {
            clean_output: dir.path().join("clean").to_string_lossy().to_string(),
            words_output: dir.path().join("words").to_string_lossy().to_string(),
            header: true,
        };

        let df = spark.create_dataframe(&gappy_data())?;
        let written = write_outputs(clean(df).await?, None, &output).await?;

        assert_eq!(output.clean_output, written.clean_output);
        assert_eq!(None, written.words_output);
        assert!(dir.path().join("clean").join("_SUCCESS").exists());
        assert!(!dir.path().join("words").exists());
        Ok(())
    }
}
