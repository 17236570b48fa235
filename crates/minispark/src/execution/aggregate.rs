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

//! Hash aggregation over the coalesced input

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Builder, Int64Builder, StringBuilder, UInt32Array,
};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{OwnedRow, RowConverter, SortField};

use crate::errors::SparkError;
use crate::expressions::Expr;
use crate::types::SparkDataType;

use super::expr::{evaluate, AGGREGATE_FUNCTIONS};

/// Row indices of every group, in order of first appearance
pub(crate) struct Groups {
    pub(crate) first_rows: Vec<u32>,
    pub(crate) rows: Vec<Vec<u32>>,
}

/// Partition the rows of `keys` by distinct value, null being its own group
pub(crate) fn group_rows(keys: &[ArrayRef], num_rows: usize) -> Result<Groups, SparkError> {
    if keys.is_empty() {
        return Ok(Groups {
            first_rows: vec![0],
            rows: vec![(0..num_rows as u32).collect()],
        });
    }

    let converter = RowConverter::new(
        keys.iter()
            .map(|key| SortField::new(key.data_type().clone()))
            .collect(),
    )?;
    let rows = converter.convert_columns(keys)?;

    let mut index: HashMap<OwnedRow, usize> = HashMap::new();
    let mut groups = Groups {
        first_rows: vec![],
        rows: vec![],
    };

    for (row_idx, row) in rows.iter().enumerate() {
        let group = *index.entry(row.owned()).or_insert_with(|| {
            groups.first_rows.push(row_idx as u32);
            groups.rows.push(vec![]);
            groups.rows.len() - 1
        });
        groups.rows[group].push(row_idx as u32);
    }

    Ok(groups)
}

pub(crate) fn aggregate(
    batch: &RecordBatch,
    grouping: &[Expr],
    aggregates: &[Expr],
) -> Result<RecordBatch, SparkError> {
    let keys = grouping
        .iter()
        .map(|expr| evaluate(expr, batch))
        .collect::<Result<Vec<ArrayRef>, SparkError>>()?;

    let groups = group_rows(&keys, batch.num_rows())?;

    let mut fields: Vec<Field> = vec![];
    let mut columns: Vec<ArrayRef> = vec![];

    // a global aggregation over an empty input still yields one row
    let first_rows = UInt32Array::from(groups.first_rows.clone());
    for (expr, key) in grouping.iter().zip(keys.iter()) {
        let values = if batch.num_rows() == 0 {
            key.slice(0, 0)
        } else {
            take(key.as_ref(), &first_rows, None)?
        };
        fields.push(Field::new(expr.name(), values.data_type().clone(), true));
        columns.push(values);
    }

    for expr in aggregates {
        let (values, nullable) = aggregate_expr(expr, batch, &groups)?;
        fields.push(Field::new(
            expr.name(),
            values.data_type().clone(),
            nullable,
        ));
        columns.push(values);
    }

    let num_rows = if grouping.is_empty() || batch.num_rows() > 0 {
        groups.rows.len()
    } else {
        0
    };

    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));

    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}

fn aggregate_expr(
    expr: &Expr,
    batch: &RecordBatch,
    groups: &Groups,
) -> Result<(ArrayRef, bool), SparkError> {
    let (function_name, arguments) = match expr.unaliased() {
        Expr::UnresolvedFunction {
            function_name,
            arguments,
        } if AGGREGATE_FUNCTIONS.contains(&function_name.as_str()) => {
            (function_name.as_str(), arguments)
        }
        other => {
            return Err(SparkError::AnalysisException(format!(
                "expression {other} is neither present in the group by, nor is it an aggregate function"
            )))
        }
    };

    if arguments.len() != 1 {
        return Err(SparkError::AnalysisException(format!(
            "aggregate function {function_name} requires 1 argument, got {}",
            arguments.len()
        )));
    }

    let group_sizes = groups.rows.iter();

    if function_name == "count" {
        let mut builder = Int64Builder::with_capacity(groups.rows.len());

        if arguments[0] == Expr::UnresolvedStar {
            group_sizes.for_each(|rows| builder.append_value(rows.len() as i64));
        } else {
            let values = evaluate(&arguments[0], batch)?;
            for rows in group_sizes {
                let valid = rows.iter().filter(|&&row| values.is_valid(row as usize));
                builder.append_value(valid.count() as i64);
            }
        }

        return Ok((Arc::new(builder.finish()), false));
    }

    let values = evaluate(&arguments[0], batch)?;
    let data_type = values.data_type();

    let result: ArrayRef = match function_name {
        "min" | "max" if data_type.is_string() => {
            let values = cast(values.as_ref(), &DataType::Utf8)?;
            let values = values.as_string::<i32>();
            let mut builder = StringBuilder::new();

            for rows in group_sizes {
                let candidates = rows
                    .iter()
                    .filter(|&&row| values.is_valid(row as usize))
                    .map(|&row| values.value(row as usize));
                let value = if function_name == "min" {
                    candidates.min()
                } else {
                    candidates.max()
                };
                builder.append_option(value);
            }
            Arc::new(builder.finish())
        }
        "sum" | "min" | "max" if data_type.is_integer() => {
            let values = cast(values.as_ref(), &DataType::Int64)?;
            let values = values.as_primitive::<Int64Type>();
            let mut builder = Int64Builder::new();

            for rows in group_sizes {
                let mut valid = rows
                    .iter()
                    .filter(|&&row| values.is_valid(row as usize))
                    .map(|&row| values.value(row as usize));

                let value = match function_name {
                    "sum" => valid.try_fold(None, |acc: Option<i64>, v| {
                        acc.unwrap_or(0).checked_add(v).map(Some).ok_or_else(|| {
                            SparkError::InvalidArgument("integer overflow in sum".to_string())
                        })
                    })?,
                    "min" => valid.min(),
                    _ => valid.max(),
                };
                builder.append_option(value);
            }
            Arc::new(builder.finish())
        }
        "sum" | "min" | "max" | "avg" if data_type.is_numeric() => {
            let values = cast(values.as_ref(), &DataType::Float64)?;
            let values = values.as_primitive::<Float64Type>();
            let mut builder = Float64Builder::new();

            for rows in group_sizes {
                let valid: Vec<f64> = rows
                    .iter()
                    .filter(|&&row| values.is_valid(row as usize))
                    .map(|&row| values.value(row as usize))
                    .collect();

                let value = if valid.is_empty() {
                    None
                } else {
                    match function_name {
                        "sum" => Some(valid.iter().sum()),
                        "avg" => Some(valid.iter().sum::<f64>() / valid.len() as f64),
                        "min" => valid.iter().copied().reduce(f64::min),
                        _ => valid.iter().copied().reduce(f64::max),
                    }
                };
                builder.append_option(value);
            }
            Arc::new(builder.finish())
        }
        _ => {
            return Err(SparkError::AnalysisException(format!(
                "function {function_name} does not support input type {}",
                data_type.simple_string()
            )))
        }
    };

    Ok((result, true))
}

/// Keep the first occurrence of every distinct row
pub(crate) fn distinct(batch: &RecordBatch) -> Result<RecordBatch, SparkError> {
    if batch.num_columns() == 0 {
        return Ok(batch.clone());
    }

    let groups = group_rows(batch.columns(), batch.num_rows())?;

    Ok(arrow::compute::take_record_batch(
        batch,
        &UInt32Array::from(groups.first_rows),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::array::{Float64Array, Int64Array, StringArray};

    use crate::functions::*;

    fn batch() -> RecordBatch {
        let mood: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Happy"),
            Some("Sad"),
            Some("Happy"),
            None,
        ]));
        let score: ArrayRef = Arc::new(Int64Array::from(vec![Some(3), Some(1), None, Some(2)]));

        RecordBatch::try_from_iter(vec![("mood", mood), ("score", score)]).unwrap()
    }

    #[test]
    fn test_group_rows_first_seen_order() -> Result<(), SparkError> {
        let data = batch();
        let groups = group_rows(&[data.column(0).clone()], data.num_rows())?;

        assert_eq!(vec![0, 1, 3], groups.first_rows);
        assert_eq!(vec![vec![0, 2], vec![1], vec![3]], groups.rows);
        Ok(())
    }

    #[test]
    fn test_aggregate_functions() -> Result<(), SparkError> {
        let res = aggregate(
            &batch(),
            &[col("mood").expression],
            &[
                count(lit(1)).alias("count").expression,
                count(col("score")).alias("non_null").expression,
                sum(col("score")).alias("sum").expression,
                avg(col("score")).alias("avg").expression,
                max(col("score")).alias("max").expression,
            ],
        )?;

        assert_eq!(3, res.num_rows());
        assert_eq!(
            &Int64Array::from(vec![2, 1, 1]),
            res.column(1).as_primitive::<Int64Type>()
        );
        assert_eq!(
            &Int64Array::from(vec![1, 1, 1]),
            res.column(2).as_primitive::<Int64Type>()
        );
        assert_eq!(
            &Int64Array::from(vec![3, 1, 2]),
            res.column(3).as_primitive::<Int64Type>()
        );
        assert_eq!(
            &Float64Array::from(vec![3.0, 1.0, 2.0]),
            res.column(4).as_primitive::<Float64Type>()
        );
        assert_eq!(
            &Int64Array::from(vec![3, 1, 2]),
            res.column(5).as_primitive::<Int64Type>()
        );
        Ok(())
    }

    #[test]
    fn test_global_count_of_empty_input() -> Result<(), SparkError> {
        let empty = batch().slice(0, 0);

        let res = aggregate(&empty, &[], &[count(lit(1)).alias("count").expression])?;

        assert_eq!(1, res.num_rows());
        assert_eq!(
            &Int64Array::from(vec![0]),
            res.column(0).as_primitive::<Int64Type>()
        );

        let grouped = aggregate(
            &empty,
            &[col("mood").expression],
            &[count(lit(1)).alias("count").expression],
        )?;
        assert_eq!(0, grouped.num_rows());
        Ok(())
    }

    #[test]
    fn test_non_aggregate_expression_is_rejected() {
        let res = aggregate(&batch(), &[], &[col("score").expression]);

        assert!(matches!(res, Err(SparkError::AnalysisException(_))));
    }

    #[test]
    fn test_distinct() -> Result<(), SparkError> {
        let mood: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "a", "a"]));
        let data = RecordBatch::try_from_iter(vec![("mood", mood)])?;

        let res = distinct(&data)?;

        assert_eq!(
            &StringArray::from(vec!["a", "b"]),
            res.column(0).as_string::<i32>()
        );
        Ok(())
    }
}
