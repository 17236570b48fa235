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

//! File sources for `LogicalPlan::Read`

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use regex::Regex;

use tracing::debug;

use crate::errors::SparkError;

use super::coalesce;

const BATCH_SIZE: usize = 8192;

/// Case-insensitive lookup of a boolean reader option
fn bool_option(options: &HashMap<String, String>, key: &str) -> Result<bool, SparkError> {
    match option(options, key) {
        None => Ok(false),
        Some(value) => value.trim().to_lowercase().parse::<bool>().map_err(|_| {
            SparkError::InvalidArgument(format!("option {key} expects true or false, got {value}"))
        }),
    }
}

fn option<'a>(options: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
    options
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn delimiter(options: &HashMap<String, String>) -> Result<u8, SparkError> {
    let value = option(options, "sep").or_else(|| option(options, "delimiter"));

    match value.map(|v| v.as_bytes()) {
        None => Ok(b','),
        Some([byte]) => Ok(*byte),
        Some(_) => Err(SparkError::InvalidArgument(
            "delimiter must be a single byte character".to_string(),
        )),
    }
}

/// Data files under `path`: the file itself, or the visible files of a directory
fn data_files(path: &str) -> Result<Vec<PathBuf>, SparkError> {
    let path = Path::new(path);

    if !path.exists() {
        return Err(SparkError::AnalysisException(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = vec![];
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let hidden = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('_') || name.starts_with('.'))
            .unwrap_or(true);

        if !hidden && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(files)
}

/// Read every file in `paths`, one partition per file
pub(crate) fn read(
    format: &str,
    paths: &[String],
    schema: Option<SchemaRef>,
    options: &HashMap<String, String>,
) -> Result<Vec<RecordBatch>, SparkError> {
    if !format.eq_ignore_ascii_case("csv") {
        return Err(SparkError::NotYetImplemented(format!(
            "data source format {format}"
        )));
    }

    let header = bool_option(options, "header")?;
    let infer = bool_option(options, "inferSchema")?;
    let delimiter = delimiter(options)?;

    let mut files = vec![];
    for path in paths {
        files.extend(data_files(path)?);
    }

    debug!(files = files.len(), header, infer, "reading csv");

    let schema = match (schema, files.first()) {
        (Some(schema), _) => schema,
        (None, Some(first)) => infer_schema(first, header, infer, delimiter)?,
        (None, None) => {
            return Err(SparkError::AnalysisException(
                "Unable to infer schema for CSV. It must be specified manually.".to_string(),
            ))
        }
    };

    if files.is_empty() {
        return Ok(vec![RecordBatch::new_empty(schema)]);
    }

    files
        .iter()
        .map(|file| read_file(file, schema.clone(), header, delimiter))
        .collect()
}

fn infer_schema(
    file: &Path,
    header: bool,
    infer: bool,
    delimiter: u8,
) -> Result<SchemaRef, SparkError> {
    let format = Format::default()
        .with_header(header)
        .with_delimiter(delimiter);

    let (inferred, _) = format.infer_schema(File::open(file)?, None)?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let name = if header {
                field.name().clone()
            } else {
                format!("_c{idx}")
            };
            let data_type = if infer {
                field.data_type().clone()
            } else {
                DataType::Utf8
            };
            Field::new(name, data_type, true)
        })
        .collect();

    Ok(Arc::new(Schema::new(fields)))
}

fn read_file(
    file: &Path,
    schema: SchemaRef,
    header: bool,
    delimiter: u8,
) -> Result<RecordBatch, SparkError> {
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(header)
        .with_delimiter(delimiter)
        .with_null_regex(Regex::new("^$")?)
        .with_batch_size(BATCH_SIZE)
        .build(File::open(file)?)?;

    let batches = reader.collect::<Result<Vec<RecordBatch>, _>>()?;

    if batches.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    coalesce(batches)
}
