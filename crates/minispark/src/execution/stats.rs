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

//! Summary statistics for `describe`

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;

use crate::errors::SparkError;
use crate::types::SparkDataType;

use super::resolve_index;

const STATISTICS: [&str; 5] = ["count", "mean", "stddev", "min", "max"];

/// One row per statistic, one string column per described input column
pub(crate) fn describe(batch: &RecordBatch, columns: &[String]) -> Result<RecordBatch, SparkError> {
    let schema = batch.schema();

    let indices: Vec<usize> = if columns.is_empty() {
        schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.data_type().is_numeric() || field.data_type().is_string())
            .map(|(idx, _)| idx)
            .collect()
    } else {
        columns
            .iter()
            .map(|name| resolve_index(&schema, name))
            .collect::<Result<_, _>>()?
    };

    let mut fields = vec![Field::new("summary", DataType::Utf8, true)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(STATISTICS.to_vec()))];

    for idx in indices {
        let stats = column_statistics(batch.column(idx))?;

        fields.push(Field::new(schema.field(idx).name(), DataType::Utf8, true));
        arrays.push(Arc::new(StringArray::from(stats.to_vec())));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn column_statistics(column: &ArrayRef) -> Result<[Option<String>; 5], SparkError> {
    let data_type = column.data_type();
    let count = Some((column.len() - column.null_count()).to_string());

    if data_type.is_numeric() {
        let floats = cast(column.as_ref(), &DataType::Float64)?;
        let values: Vec<f64> = floats.as_primitive::<Float64Type>().iter().flatten().collect();

        let n = values.len() as f64;
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / n);
        let stddev = mean.filter(|_| values.len() > 1).map(|mean| {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        });

        let (min, max) = if data_type.is_integer() {
            let ints = cast(column.as_ref(), &DataType::Int64)?;
            let ints = ints.as_primitive::<Int64Type>();
            (
                ints.iter().flatten().min().map(|v| v.to_string()),
                ints.iter().flatten().max().map(|v| v.to_string()),
            )
        } else {
            (
                values.iter().copied().reduce(f64::min).map(|v| format!("{v:?}")),
                values.iter().copied().reduce(f64::max).map(|v| format!("{v:?}")),
            )
        };

        return Ok([
            count,
            mean.map(|v| format!("{v:?}")),
            stddev.map(|v| format!("{v:?}")),
            min,
            max,
        ]);
    }

    if data_type.is_string() {
        let strings = cast(column.as_ref(), &DataType::Utf8)?;
        let strings = strings.as_string::<i32>();

        return Ok([
            count,
            None,
            None,
            strings.iter().flatten().min().map(str::to_string),
            strings.iter().flatten().max().map(str::to_string),
        ]);
    }

    Ok([count, None, None, None, None])
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::array::Int64Array;

    fn strings(batch: &RecordBatch, idx: usize) -> Vec<Option<String>> {
        batch
            .column(idx)
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_describe_numeric_and_string() -> Result<(), SparkError> {
        let age: ArrayRef = Arc::new(Int64Array::from(vec![Some(2), Some(4), None]));
        let name: ArrayRef = Arc::new(StringArray::from(vec![Some("Bob"), Some("Alice"), None]));
        let data = RecordBatch::try_from_iter(vec![("age", age), ("name", name)])?;

        let res = describe(&data, &[])?;

        assert_eq!(3, res.num_columns());
        assert_eq!(some(&STATISTICS), strings(&res, 0));
        assert_eq!(
            some(&["2", "3.0", "1.4142135623730951", "2", "4"]),
            strings(&res, 1)
        );
        assert_eq!(
            vec![
                Some("2".to_string()),
                None,
                None,
                Some("Alice".to_string()),
                Some("Bob".to_string())
            ],
            strings(&res, 2)
        );
        Ok(())
    }

    #[test]
    fn test_describe_single_value_has_no_stddev() -> Result<(), SparkError> {
        let score: ArrayRef = Arc::new(Int64Array::from(vec![7]));
        let data = RecordBatch::try_from_iter(vec![("score", score)])?;

        let res = describe(&data, &["score".to_string()])?;

        assert_eq!(None, strings(&res, 1)[2]);
        Ok(())
    }
}
