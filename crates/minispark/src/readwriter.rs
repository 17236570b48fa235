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

//! DataFrameReader & DataFrameWriter representations

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::dataframe::DataFrame;
use crate::errors::SparkError;
use crate::plan::{LogicalPlan, LogicalPlanBuilder};
use crate::session::SparkSession;

use arrow::csv::WriterBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use tracing::debug;
use uuid::Uuid;

/// Specifies the behavior when data already exists at the output path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveMode {
    /// Add new part files next to the existing ones
    Append,
    /// Remove the whole output directory before writing
    Overwrite,
    /// Fail with [SparkError::AlreadyExists]
    #[default]
    ErrorIfExists,
    /// Leave existing data untouched and skip the write
    Ignore,
}

impl FromStr for SaveMode {
    type Err = SparkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(SaveMode::Append),
            "overwrite" => Ok(SaveMode::Overwrite),
            "error" | "errorifexists" => Ok(SaveMode::ErrorIfExists),
            "ignore" => Ok(SaveMode::Ignore),
            other => Err(SparkError::InvalidArgument(format!(
                "Unknown save mode: {other}. Accepted save modes are 'overwrite', 'append', 'ignore', 'error', 'errorifexists'."
            ))),
        }
    }
}

/// DataFrameReader represents the entrypoint to create a DataFrame
/// from a specific file format.
#[derive(Clone, Debug)]
pub struct DataFrameReader {
    spark_session: SparkSession,
    format: Option<String>,
    schema: Option<SchemaRef>,
    read_options: HashMap<String, String>,
}

impl DataFrameReader {
    /// Create a new DataFrameReader with a [SparkSession]
    pub fn new(spark_session: SparkSession) -> Self {
        Self {
            spark_session,
            format: None,
            schema: None,
            read_options: HashMap::new(),
        }
    }

    /// Specifies the input data source format, `csv` when not set
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Add an input option for the underlying data source
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.read_options.insert(key.to_string(), value.to_string());
        self
    }

    /// Use an explicit schema instead of inferring one from the data
    pub fn schema(mut self, schema: SchemaRef) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set many input options based on an iterator of (key/value pairs) for the underlying data source
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.read_options = options
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        self
    }

    /// Loads data from a data source and returns it as a [DataFrame]
    ///
    /// Example:
    /// ```rust
    /// let path = vec!["clean_output_csv/"];
    ///
    /// // returns a DataFrame from a csv directory with a header
    /// let mut df = spark.read().format("csv").option("header", "true").load(path);
    /// ```
    pub fn load<'a, I>(self, paths: I) -> Result<DataFrame, SparkError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.spark_session.check_active()?;

        let logical_plan = LogicalPlanBuilder::new(LogicalPlan::Read {
            format: self.format.unwrap_or_else(|| "csv".to_string()),
            paths: paths.into_iter().map(|p| p.to_string()).collect(),
            schema: self.schema,
            options: self.read_options,
        });

        Ok(DataFrame::new(self.spark_session, logical_plan))
    }

    /// Loads a CSV file or directory of part files
    pub fn csv(self, path: &str) -> Result<DataFrame, SparkError> {
        self.format("csv").load([path])
    }
}

/// DataFrameWriter provides the ability to output a [DataFrame]
/// to a specific file format
pub struct DataFrameWriter {
    dataframe: DataFrame,
    format: Option<String>,
    mode: SaveMode,
    write_options: HashMap<String, String>,
}

impl DataFrameWriter {
    /// Create a new DataFrameWriter from a provided [DataFrame]
    ///
    /// # Defaults
    /// - `format`: None (csv),
    /// - `mode`: [SaveMode::ErrorIfExists],
    /// - `write_options`: HashMap::new()
    ///
    pub fn new(dataframe: DataFrame) -> Self {
        Self {
            dataframe,
            format: None,
            mode: SaveMode::default(),
            write_options: HashMap::new(),
        }
    }

    /// Target format to output the [DataFrame]
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Specifies the behavior when data already exists
    pub fn mode(mut self, mode: SaveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add an output option for the underlying data source
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.write_options
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Set many output options based on an iterator of (key/value pairs) for the underlying data source
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.write_options = options
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        self
    }

    fn option_value(&self, key: &str) -> Option<&String> {
        self.write_options
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    fn header(&self) -> Result<bool, SparkError> {
        match self.option_value("header") {
            None => Ok(false),
            Some(value) => value.trim().to_lowercase().parse::<bool>().map_err(|_| {
                SparkError::InvalidArgument(format!(
                    "option header expects true or false, got {value}"
                ))
            }),
        }
    }

    fn delimiter(&self) -> Result<u8, SparkError> {
        let value = self
            .option_value("sep")
            .or_else(|| self.option_value("delimiter"));

        match value.map(|v| v.as_bytes()) {
            None => Ok(b','),
            Some([byte]) => Ok(*byte),
            Some(_) => Err(SparkError::InvalidArgument(
                "delimiter must be a single byte character".to_string(),
            )),
        }
    }

    /// Save the contents of the [DataFrame] to a data source.
    ///
    /// The output is a directory holding one `part-NNNNN-<uuid>.csv` file per
    /// non-empty partition and an empty `_SUCCESS` marker.
    pub async fn save(self, path: &str) -> Result<(), SparkError> {
        let format = self.format.clone().unwrap_or_else(|| "csv".to_string());
        if !format.eq_ignore_ascii_case("csv") {
            return Err(SparkError::NotYetImplemented(format!(
                "data source format {format}"
            )));
        }

        let header = self.header()?;
        let delimiter = self.delimiter()?;

        let output = Path::new(path);
        let exists = tokio::fs::try_exists(output)
            .await
            .map_err(|err| io_error(output, err))?;

        match (self.mode, exists) {
            (SaveMode::ErrorIfExists, true) => {
                return Err(SparkError::AlreadyExists(format!(
                    "path {} already exists",
                    output.display()
                )))
            }
            (SaveMode::Ignore, true) => {
                debug!(path = %output.display(), "output exists, skipping write");
                return Ok(());
            }
            _ => {}
        }

        // executed before touching the output so a failing plan leaves it intact
        let partitions = self.dataframe.collect_partitions().await?;

        if self.mode == SaveMode::Overwrite && exists {
            debug!(path = %output.display(), "removing existing output");
            remove_path(output).await?;
        }

        tokio::fs::create_dir_all(output)
            .await
            .map_err(|err| io_error(output, err))?;

        let job_id = Uuid::new_v4();
        let mut written = 0;

        for (idx, batch) in partitions.iter().enumerate() {
            // an empty result still produces one (possibly header-only) file
            if batch.num_rows() == 0 && !(idx + 1 == partitions.len() && written == 0) {
                continue;
            }

            let file = output.join(format!("part-{idx:05}-{job_id}.csv"));
            let bytes = encode_csv(batch, header, delimiter)?;

            debug!(file = %file.display(), rows = batch.num_rows(), "writing part file");

            tokio::fs::write(&file, bytes)
                .await
                .map_err(|err| io_error(&file, err))?;
            written += 1;
        }

        let marker = output.join("_SUCCESS");
        tokio::fs::write(&marker, b"")
            .await
            .map_err(|err| io_error(&marker, err))?;

        debug!(path = %output.display(), files = written, "write committed");

        Ok(())
    }

    /// Saves the content of the [DataFrame] in CSV format at the specified path.
    pub async fn csv(self, path: &str) -> Result<(), SparkError> {
        self.format("csv").save(path).await
    }
}

fn io_error(path: &Path, err: std::io::Error) -> SparkError {
    SparkError::IoError(format!("{}: {err}", path.display()), err)
}

async fn remove_path(path: &Path) -> Result<(), SparkError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| io_error(path, err))?;

    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    removed.map_err(|err| io_error(path, err))
}

fn encode_csv(batch: &RecordBatch, header: bool, delimiter: u8) -> Result<Vec<u8>, SparkError> {
    let mut writer = WriterBuilder::new()
        .with_header(header)
        .with_delimiter(delimiter)
        .build(Vec::new());

    writer.write(batch)?;

    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow::array::{Array, ArrayRef, AsArray, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Int64Type, Schema};

    use crate::functions::*;
    use crate::SparkSessionBuilder;

    fn setup(parallelism: usize) -> SparkSession {
        SparkSessionBuilder::default()
            .app_name("rust_readwriter")
            .config("minispark.default.parallelism", &parallelism.to_string())
            .build()
            .unwrap()
    }

    fn mock_data() -> RecordBatch {
        let word: ArrayRef = Arc::new(StringArray::from(vec![
            Some("day"),
            None,
            Some("happy"),
            Some("great"),
        ]));
        let count: ArrayRef = Arc::new(Int64Array::from(vec![3, 2, 1, 1]));

        RecordBatch::try_from_iter(vec![("word", word), ("count", count)]).unwrap()
    }

    fn list_dir(path: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(path)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn part_files(path: &Path) -> Vec<String> {
        list_dir(path)
            .into_iter()
            .filter(|name| name.starts_with("part-"))
            .collect()
    }

    #[test]
    fn test_save_mode_from_str() -> Result<(), SparkError> {
        assert_eq!(SaveMode::Overwrite, "Overwrite".parse()?);
        assert_eq!(SaveMode::ErrorIfExists, "error".parse()?);
        assert!("upsert".parse::<SaveMode>().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_layout_and_read_back() -> Result<(), SparkError> {
        let spark = setup(2);
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("words");
        let path_str = path.to_string_lossy().to_string();

        spark
            .create_dataframe(&mock_data())?
            .write()
            .option("header", "true")
            .csv(&path_str)
            .await?;

        let files = list_dir(&path);
        assert!(files.contains(&"_SUCCESS".to_string()));
        assert_eq!(2, part_files(&path).len());

        let first = std::fs::read_to_string(path.join(&part_files(&path)[0]))?;
        assert!(first.starts_with("word,count\n"));

        let schema = Arc::new(Schema::new(vec![
            Field::new("word", DataType::Utf8, true),
            Field::new("count", DataType::Int64, true),
        ]));

        let res = spark
            .read()
            .schema(schema)
            .option("header", "true")
            .csv(&path_str)?
            .sort([col("count").desc(), col("word")])
            .collect()
            .await?;

        // nulls are written as empty fields and read back as null
        assert_eq!(4, res.num_rows());
        assert_eq!("day", res.column(0).as_string::<i32>().value(0));
        assert!(res.column(0).is_null(1));
        assert_eq!(
            &Int64Array::from(vec![3, 2, 1, 1]),
            res.column(1).as_primitive::<Int64Type>()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_write_modes() -> Result<(), SparkError> {
        let spark = setup(1);
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out");
        let path_str = path.to_string_lossy().to_string();

        let df = spark.create_dataframe(&mock_data())?;

        df.clone().write().save(&path_str).await?;

        let res = df.clone().write().save(&path_str).await;
        assert!(matches!(res, Err(SparkError::AlreadyExists(_))));

        df.clone()
            .write()
            .mode(SaveMode::Ignore)
            .save(&path_str)
            .await?;
        assert_eq!(1, part_files(&path).len());

        df.clone()
            .write()
            .mode(SaveMode::Append)
            .save(&path_str)
            .await?;
        assert_eq!(2, part_files(&path).len());

        df.write()
            .mode(SaveMode::Overwrite)
            .save(&path_str)
            .await?;
        assert_eq!(1, part_files(&path).len());
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_stale_files() -> Result<(), SparkError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out");
        let path_str = path.to_string_lossy().to_string();

        setup(4)
            .create_dataframe(&mock_data())?
            .write()
            .mode(SaveMode::Overwrite)
            .save(&path_str)
            .await?;
        assert_eq!(4, part_files(&path).len());

        let spark = setup(1);
        spark
            .create_dataframe(&mock_data())?
            .write()
            .mode(SaveMode::Overwrite)
            .save(&path_str)
            .await?;
        assert_eq!(1, part_files(&path).len());

        let res = spark.read().csv(&path_str)?.count().await?;
        assert_eq!(4, res);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_empty_result() -> Result<(), SparkError> {
        let spark = setup(2);
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty");

        spark
            .create_dataframe(&mock_data())?
            .filter(col("count").gt(lit(10)))
            .write()
            .option("header", "true")
            .save(&path.to_string_lossy())
            .await?;

        let parts = part_files(&path);
        assert_eq!(1, parts.len());
        assert_eq!("word,count\n", std::fs::read_to_string(path.join(&parts[0]))?);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_unsupported_format() -> Result<(), SparkError> {
        let spark = setup(1);
        let dir = tempfile::tempdir()?;

        let res = spark
            .create_dataframe(&mock_data())?
            .write()
            .format("parquet")
            .save(&dir.path().join("out").to_string_lossy())
            .await;

        assert!(matches!(res, Err(SparkError::NotYetImplemented(_))));
        Ok(())
    }
}
