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

//! Missing value handling for `dropna` and `fillna`

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{cast, filter_record_batch, is_not_null};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;

use crate::errors::SparkError;
use crate::expressions::Literal;
use crate::types::SparkDataType;

use super::expr::literal_array;
use super::resolve_index;

fn column_indices(schema: &Schema, subset: Option<&[String]>) -> Result<Vec<usize>, SparkError> {
    match subset {
        Some(names) => names
            .iter()
            .map(|name| resolve_index(schema, name))
            .collect(),
        None => Ok((0..schema.fields().len()).collect()),
    }
}

/// Drop rows with missing values.
///
/// `how` is either `any` or `all`. When `threshold` is given it takes precedence
/// and rows with fewer than `threshold` non-null values are dropped.
pub(crate) fn drop_na(
    batch: &RecordBatch,
    how: &str,
    threshold: Option<usize>,
    subset: Option<&[String]>,
) -> Result<RecordBatch, SparkError> {
    let indices = column_indices(batch.schema_ref(), subset)?;

    let min_non_nulls = match (threshold, how.to_lowercase().as_str()) {
        (Some(threshold), _) => threshold,
        (None, "any") => indices.len(),
        (None, "all") => 1,
        (None, other) => {
            return Err(SparkError::InvalidArgument(format!(
                "how ('{other}') should be 'any' or 'all'"
            )))
        }
    };

    let mut non_nulls = vec![0usize; batch.num_rows()];
    for idx in indices {
        let column = batch.column(idx);
        for (row, count) in non_nulls.iter_mut().enumerate() {
            if column.is_valid(row) {
                *count += 1;
            }
        }
    }

    let keep: BooleanArray = non_nulls
        .into_iter()
        .map(|count| Some(count >= min_non_nulls))
        .collect();

    Ok(filter_record_batch(batch, &keep)?)
}

fn fills(value: &Literal, data_type: &DataType) -> bool {
    match value {
        Literal::Utf8(_) => data_type.is_string(),
        Literal::Boolean(_) => *data_type == DataType::Boolean,
        Literal::Int64(_) | Literal::Float64(_) => data_type.is_numeric(),
        Literal::Null => false,
    }
}

/// Replace nulls with `value` in every column whose type matches the value,
/// columns of other types are left untouched
pub(crate) fn fill_na(
    batch: &RecordBatch,
    value: &Literal,
    subset: Option<&[String]>,
) -> Result<RecordBatch, SparkError> {
    if *value == Literal::Null {
        return Err(SparkError::InvalidArgument(
            "value should be a float, int, string or bool".to_string(),
        ));
    }

    let indices = column_indices(batch.schema_ref(), subset)?;
    let replacement = literal_array(value, batch.num_rows());

    let columns = batch
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let data_type = column.data_type();

            if !indices.contains(&idx) || !fills(value, data_type) || column.null_count() == 0 {
                return Ok(column.clone());
            }

            let fill = cast(replacement.as_ref(), data_type)?;
            let filled: ArrayRef = zip(&is_not_null(column.as_ref())?, column, &fill)?;
            Ok(filled)
        })
        .collect::<Result<Vec<ArrayRef>, SparkError>>()?;

    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow::array::{AsArray, Int64Array, StringArray};
    use arrow::datatypes::Int64Type;

    fn batch() -> RecordBatch {
        let mood: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Happy"),
            None,
            None,
            Some("Sad"),
        ]));
        let text: ArrayRef = Arc::new(StringArray::from(vec![
            Some("good day"),
            Some("meh"),
            None,
            None,
        ]));
        let score: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, None, Some(4)]));

        RecordBatch::try_from_iter(vec![("mood", mood), ("text", text), ("score", score)])
            .unwrap()
    }

    #[test]
    fn test_drop_all_and_any() -> Result<(), SparkError> {
        let data = batch();

        assert_eq!(3, drop_na(&data, "all", None, None)?.num_rows());
        assert_eq!(1, drop_na(&data, "any", None, None)?.num_rows());
        assert_eq!(3, drop_na(&data, "any", Some(1), None)?.num_rows());

        let subset = vec!["mood".to_string()];
        assert_eq!(2, drop_na(&data, "any", None, Some(&subset))?.num_rows());
        Ok(())
    }

    #[test]
    fn test_drop_invalid_how() {
        let res = drop_na(&batch(), "some", None, None);

        assert!(matches!(res, Err(SparkError::InvalidArgument(_))));
    }

    #[test]
    fn test_fill_only_matching_types() -> Result<(), SparkError> {
        let res = fill_na(&batch(), &Literal::from("Unknown"), None)?;

        assert_eq!(
            &StringArray::from(vec!["Happy", "Unknown", "Unknown", "Sad"]),
            res.column(0).as_string::<i32>()
        );
        assert_eq!(0, res.column(1).null_count());
        assert_eq!(2, res.column(2).null_count());
        assert_eq!(batch().schema(), res.schema());

        let res = fill_na(&res, &Literal::from(0), Some(&["score".to_string()]))?;
        assert_eq!(
            &Int64Array::from(vec![1, 0, 0, 4]),
            res.column(2).as_primitive::<Int64Type>()
        );
        Ok(())
    }

    #[test]
    fn test_fill_unknown_subset_column() {
        let res = fill_na(&batch(), &Literal::from("x"), Some(&["nope".to_string()]));

        assert!(matches!(res, Err(SparkError::AnalysisException(_))));
    }
}
