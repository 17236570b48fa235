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

//! Executes a [LogicalPlan] against in-memory arrow partitions
//!
//! Narrow nodes (projections, filters, na functions) run partition by partition.
//! Wide nodes (sort, aggregate, limit, distinct, describe) coalesce their input
//! into a single partition first. The output of every node is a non-empty list
//! of partitions sharing one schema.

pub(crate) mod aggregate;
pub(crate) mod expr;
pub(crate) mod na;
pub(crate) mod source;
pub(crate) mod stats;

use std::sync::Arc;

use arrow::array::{Array, AsArray, UInt32Array};
use arrow::compute::{
    concat_batches, filter_record_batch, take_record_batch, LexicographicalComparator, SortColumn,
    SortOptions,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use tracing::debug;

use crate::errors::SparkError;
use crate::expressions::Expr;
use crate::plan::LogicalPlan;

/// Position of the column called `name`, matched case-sensitively
pub(crate) fn resolve_index(schema: &Schema, name: &str) -> Result<usize, SparkError> {
    schema.index_of(name).map_err(|_| {
        let available = schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect::<Vec<String>>();
        SparkError::column_not_found(name, &available)
    })
}

/// Evaluate `plan` bottom-up, returning the resulting partitions
pub(crate) fn execute(plan: &LogicalPlan) -> Result<Vec<RecordBatch>, SparkError> {
    debug!(node = %plan.node_name(), "executing plan node");

    match plan {
        LogicalPlan::LocalRelation { schema, partitions } => {
            if partitions.is_empty() {
                Ok(vec![RecordBatch::new_empty(schema.clone())])
            } else {
                Ok(partitions.clone())
            }
        }
        LogicalPlan::Read {
            format,
            paths,
            schema,
            options,
        } => source::read(format, paths, schema.clone(), options),
        LogicalPlan::Project { input, exprs } => execute(input)?
            .iter()
            .map(|batch| expr::project(batch, exprs))
            .collect(),
        LogicalPlan::WithColumns { input, columns } => {
            let partitions = execute(input)?;
            let exprs = with_columns_exprs(&partitions[0].schema(), columns);

            partitions
                .iter()
                .map(|batch| expr::project(batch, &exprs))
                .collect()
        }
        LogicalPlan::WithColumnsRenamed { input, renames } => execute(input)?
            .iter()
            .map(|batch| rename_columns(batch, renames))
            .collect(),
        LogicalPlan::Drop { input, columns } => execute(input)?
            .iter()
            .map(|batch| drop_columns(batch, columns))
            .collect(),
        LogicalPlan::Filter { input, condition } => execute(input)?
            .iter()
            .map(|batch| filter(batch, condition))
            .collect(),
        LogicalPlan::Sort { input, order } => {
            let batch = coalesce(execute(input)?)?;
            Ok(vec![sort(&batch, order)?])
        }
        LogicalPlan::Limit { input, limit } => {
            let batch = coalesce(execute(input)?)?;
            let len = batch.num_rows().min(*limit);
            Ok(vec![batch.slice(0, len)])
        }
        LogicalPlan::Aggregate {
            input,
            grouping,
            aggregates,
        } => {
            let batch = coalesce(execute(input)?)?;
            Ok(vec![aggregate::aggregate(&batch, grouping, aggregates)?])
        }
        LogicalPlan::Deduplicate { input } => {
            let batch = coalesce(execute(input)?)?;
            Ok(vec![aggregate::distinct(&batch)?])
        }
        LogicalPlan::Describe { input, columns } => {
            let batch = coalesce(execute(input)?)?;
            Ok(vec![stats::describe(&batch, columns)?])
        }
        LogicalPlan::DropNa {
            input,
            how,
            threshold,
            subset,
        } => execute(input)?
            .iter()
            .map(|batch| na::drop_na(batch, how, *threshold, subset.as_deref()))
            .collect(),
        LogicalPlan::FillNa {
            input,
            value,
            subset,
        } => execute(input)?
            .iter()
            .map(|batch| na::fill_na(batch, value, subset.as_deref()))
            .collect(),
        LogicalPlan::Repartition {
            input,
            num_partitions,
        } => {
            let batch = coalesce(execute(input)?)?;
            split_partitions(&batch, *num_partitions)
        }
    }
}

/// Concatenate all partitions into one batch
pub(crate) fn coalesce(partitions: Vec<RecordBatch>) -> Result<RecordBatch, SparkError> {
    match partitions.as_slice() {
        [] => Err(SparkError::Aborted(
            "relation produced no partitions".to_string(),
        )),
        [single] => Ok(single.clone()),
        [first, ..] => Ok(concat_batches(&first.schema(), &partitions)?),
    }
}

/// Split `batch` into `num_partitions` contiguous slices whose sizes differ by at most one
pub(crate) fn split_partitions(
    batch: &RecordBatch,
    num_partitions: usize,
) -> Result<Vec<RecordBatch>, SparkError> {
    if num_partitions == 0 {
        return Err(SparkError::InvalidArgument(
            "number of partitions must be positive".to_string(),
        ));
    }

    let rows = batch.num_rows();
    let base = rows / num_partitions;
    let extra = rows % num_partitions;

    let mut offset = 0;
    let mut partitions = Vec::with_capacity(num_partitions);

    for idx in 0..num_partitions {
        let len = base + usize::from(idx < extra);
        partitions.push(batch.slice(offset, len));
        offset += len;
    }

    Ok(partitions)
}

fn with_columns_exprs(schema: &SchemaRef, columns: &[(String, Expr)]) -> Vec<Expr> {
    let replacement = |name: &str| {
        columns
            .iter()
            .rev()
            .find(|(col_name, _)| col_name == name)
            .map(|(col_name, expr)| Expr::Alias {
                expr: Box::new(expr.clone()),
                name: col_name.clone(),
            })
    };

    let mut exprs: Vec<Expr> = schema
        .fields()
        .iter()
        .map(|field| {
            replacement(field.name())
                .unwrap_or_else(|| Expr::UnresolvedAttribute(field.name().clone()))
        })
        .collect();

    for (idx, (name, _)) in columns.iter().enumerate() {
        let existing = schema.index_of(name).is_ok();
        let repeated = columns[idx + 1..].iter().any(|(other, _)| other == name);

        if !existing && !repeated {
            if let Some(expr) = replacement(name) {
                exprs.push(expr);
            }
        }
    }

    exprs
}

fn rename_columns(
    batch: &RecordBatch,
    renames: &[(String, String)],
) -> Result<RecordBatch, SparkError> {
    let fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|field| {
            match renames.iter().find(|(existing, _)| existing == field.name()) {
                Some((_, new_name)) => field.as_ref().clone().with_name(new_name),
                None => field.as_ref().clone(),
            }
        })
        .collect();

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        batch.columns().to_vec(),
    )?)
}

/// Dropping a column that does not exist is a no-op
fn drop_columns(batch: &RecordBatch, columns: &[String]) -> Result<RecordBatch, SparkError> {
    let schema = batch.schema();

    let (fields, arrays): (Vec<Field>, Vec<_>) = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .filter(|(field, _)| !columns.contains(field.name()))
        .map(|(field, array)| (field.as_ref().clone(), array.clone()))
        .unzip();

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));

    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

fn filter(batch: &RecordBatch, condition: &Expr) -> Result<RecordBatch, SparkError> {
    let mask = expr::evaluate(condition, batch)?;

    match mask.data_type() {
        DataType::Boolean => Ok(filter_record_batch(batch, mask.as_boolean())?),
        // a null literal keeps no rows
        DataType::Null => Ok(batch.slice(0, 0)),
        other => Err(SparkError::AnalysisException(format!(
            "filter expression '{condition}' of type {other} is not a boolean"
        ))),
    }
}

/// Stable multi-key sort: rows comparing equal keep their input order
fn sort(batch: &RecordBatch, order: &[Expr]) -> Result<RecordBatch, SparkError> {
    if order.is_empty() || batch.num_rows() < 2 {
        return Ok(batch.clone());
    }

    let columns = order
        .iter()
        .map(|expr| {
            let (child, ascending, nulls_first) = match expr {
                Expr::SortOrder {
                    child,
                    ascending,
                    nulls_first,
                } => (child.as_ref(), *ascending, *nulls_first),
                other => (other, true, true),
            };

            Ok(SortColumn {
                values: expr::evaluate(child, batch)?,
                options: Some(SortOptions {
                    descending: !ascending,
                    nulls_first,
                }),
            })
        })
        .collect::<Result<Vec<SortColumn>, SparkError>>()?;

    let comparator = LexicographicalComparator::try_new(&columns)?;

    let mut indices: Vec<u32> = (0..batch.num_rows() as u32).collect();
    indices.sort_by(|a, b| comparator.compare(*a as usize, *b as usize));

    Ok(take_record_batch(batch, &UInt32Array::from(indices))?)
}
