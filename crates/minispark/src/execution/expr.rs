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

//! Evaluation of resolved expressions against a single partition

use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int32Array, Int64Array,
    ListBuilder, StringArray, StringBuilder, UInt32Array,
};
use arrow::compute::kernels::{boolean, cmp, numeric, zip::zip};
use arrow::compute::{cast, is_not_null, is_null, nullif, take};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use regex::Regex;

use crate::errors::SparkError;
use crate::expressions::{Expr, Literal};
use crate::types::SparkDataType;

use super::resolve_index;

pub(crate) const AGGREGATE_FUNCTIONS: [&str; 5] = ["count", "sum", "avg", "min", "max"];

const GENERATOR: &str = "explode";

/// Evaluate an expression into an array with one value per row of `batch`
pub(crate) fn evaluate(expr: &Expr, batch: &RecordBatch) -> Result<ArrayRef, SparkError> {
    match expr {
        Expr::UnresolvedAttribute(name) => {
            let idx = resolve_index(batch.schema_ref(), name)?;
            Ok(batch.column(idx).clone())
        }
        Expr::Literal(value) => Ok(literal_array(value, batch.num_rows())),
        Expr::Alias { expr, .. } => evaluate(expr, batch),
        Expr::SortOrder { child, .. } => evaluate(child, batch),
        Expr::UnresolvedStar => Err(SparkError::AnalysisException(
            "Invalid usage of '*' in expression".to_string(),
        )),
        Expr::UnresolvedFunction {
            function_name,
            arguments,
        } => invoke(function_name, arguments, batch),
    }
}

/// Evaluate a list of projections, expanding `*` and at most one `explode` generator
pub(crate) fn project(batch: &RecordBatch, exprs: &[Expr]) -> Result<RecordBatch, SparkError> {
    if exprs.is_empty() {
        return Err(SparkError::InvalidArgument(
            "select requires at least one column".to_string(),
        ));
    }

    let schema = batch.schema();
    let mut fields: Vec<Field> = vec![];
    let mut columns: Vec<ArrayRef> = vec![];
    let mut generator: Option<(usize, &Expr)> = None;

    for expr in exprs {
        match expr {
            Expr::UnresolvedStar => {
                for (idx, field) in schema.fields().iter().enumerate() {
                    fields.push(field.as_ref().clone());
                    columns.push(batch.column(idx).clone());
                }
            }
            expr if expr.function_name() == Some(GENERATOR) => {
                if generator.is_some() {
                    return Err(SparkError::AnalysisException(
                        "Only one generator allowed per select clause".to_string(),
                    ));
                }
                generator = Some((columns.len(), expr));
                // placeholder, replaced once the other columns are expanded
                fields.push(Field::new(expr_output_name(expr), DataType::Null, true));
                columns.push(new_null_array(&DataType::Null, batch.num_rows()));
            }
            expr => {
                let array = evaluate(expr, batch)?;
                let nullable = match expr.unaliased() {
                    Expr::UnresolvedAttribute(name) => {
                        schema.field(resolve_index(&schema, name)?).is_nullable()
                    }
                    _ => true,
                };
                fields.push(Field::new(expr.name(), array.data_type().clone(), nullable));
                columns.push(array);
            }
        }
    }

    let num_rows = match generator {
        Some((position, expr)) => {
            let (indices, values) = generate(expr, batch)?;

            for column in columns.iter_mut() {
                *column = take(column.as_ref(), &indices, None)?;
            }

            fields[position] = Field::new(
                expr_output_name(expr),
                values.data_type().clone(),
                true,
            );
            columns[position] = values;

            indices.len()
        }
        None => batch.num_rows(),
    };

    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));

    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}

/// Spark names an unaliased generator output `col`
fn expr_output_name(expr: &Expr) -> String {
    match expr {
        Expr::Alias { name, .. } => name.clone(),
        _ => "col".to_string(),
    }
}

/// Row indices to repeat and the flattened element values for an `explode`
fn generate(expr: &Expr, batch: &RecordBatch) -> Result<(UInt32Array, ArrayRef), SparkError> {
    let argument = match expr.unaliased() {
        Expr::UnresolvedFunction { arguments, .. } if arguments.len() == 1 => &arguments[0],
        _ => {
            return Err(SparkError::AnalysisException(
                "explode takes exactly one argument".to_string(),
            ))
        }
    };

    let array = evaluate(argument, batch)?;

    let list = match array.data_type() {
        DataType::List(_) => array.as_list::<i32>(),
        other => {
            return Err(SparkError::AnalysisException(format!(
                "explode requires an array input, got {}",
                other.simple_string()
            )))
        }
    };

    let offsets = list.value_offsets();
    let mut row_indices: Vec<u32> = vec![];
    let mut value_indices: Vec<u32> = vec![];

    for row in 0..list.len() {
        if list.is_null(row) {
            continue;
        }
        for value in offsets[row]..offsets[row + 1] {
            row_indices.push(row as u32);
            value_indices.push(value as u32);
        }
    }

    let values = take(list.values().as_ref(), &UInt32Array::from(value_indices), None)?;

    Ok((UInt32Array::from(row_indices), values))
}

pub(crate) fn literal_array(value: &Literal, len: usize) -> ArrayRef {
    match value {
        Literal::Null => new_null_array(&DataType::Null, len),
        Literal::Boolean(val) => Arc::new(BooleanArray::from(vec![*val; len])),
        Literal::Int64(val) => Arc::new(Int64Array::from(vec![*val; len])),
        Literal::Float64(val) => Arc::new(Float64Array::from(vec![*val; len])),
        Literal::Utf8(val) => Arc::new(StringArray::from(vec![val.as_str(); len])),
    }
}

fn expect_args<'a>(name: &str, args: &'a [Expr], count: usize) -> Result<&'a [Expr], SparkError> {
    if args.len() != count {
        return Err(SparkError::AnalysisException(format!(
            "function {name} requires {count} argument(s), got {}",
            args.len()
        )));
    }
    Ok(args)
}

fn literal_str<'a>(name: &str, expr: &'a Expr) -> Result<&'a str, SparkError> {
    match expr {
        Expr::Literal(Literal::Utf8(value)) => Ok(value.as_str()),
        other => Err(SparkError::AnalysisException(format!(
            "function {name} requires a string literal, got {other}"
        ))),
    }
}

/// Implicit cast to string, as Spark does for string functions
fn to_utf8(array: &ArrayRef) -> Result<ArrayRef, SparkError> {
    match array.data_type() {
        DataType::Utf8 => Ok(array.clone()),
        _ => Ok(cast(array.as_ref(), &DataType::Utf8)?),
    }
}

fn map_strings<F>(array: &ArrayRef, func: F) -> Result<ArrayRef, SparkError>
where
    F: Fn(&str) -> String,
{
    let array = to_utf8(array)?;
    let mapped: StringArray = array
        .as_string::<i32>()
        .iter()
        .map(|value| value.map(&func))
        .collect();

    Ok(Arc::new(mapped))
}

fn test_strings<F>(array: &ArrayRef, func: F) -> Result<ArrayRef, SparkError>
where
    F: Fn(&str) -> bool,
{
    let array = to_utf8(array)?;
    let tested: BooleanArray = array
        .as_string::<i32>()
        .iter()
        .map(|value| value.map(&func))
        .collect();

    Ok(Arc::new(tested))
}

fn as_boolean(name: &str, array: &ArrayRef) -> Result<BooleanArray, SparkError> {
    match array.data_type() {
        DataType::Boolean => Ok(array.as_boolean().clone()),
        DataType::Null => Ok(new_null_array(&DataType::Boolean, array.len())
            .as_boolean()
            .clone()),
        other => Err(SparkError::AnalysisException(format!(
            "function {name} requires a boolean input, got {}",
            other.simple_string()
        ))),
    }
}

/// Cast two arrays to a common type
pub(crate) fn coerce_pair(
    left: ArrayRef,
    right: ArrayRef,
) -> Result<(ArrayRef, ArrayRef), SparkError> {
    let target = {
        let (lt, rt) = (left.data_type(), right.data_type());

        if lt == rt {
            return Ok((left, right));
        }

        match (lt, rt) {
            (DataType::Null, other) | (other, DataType::Null) => other.clone(),
            (l, r) if l.is_numeric() && r.is_numeric() => {
                if l.is_integer() && r.is_integer() {
                    DataType::Int64
                } else {
                    DataType::Float64
                }
            }
            (l, r) if l.is_string() || r.is_string() => DataType::Utf8,
            (l, r) => {
                return Err(SparkError::AnalysisException(format!(
                    "data type mismatch: {} and {}",
                    l.simple_string(),
                    r.simple_string()
                )))
            }
        }
    };

    Ok((
        cast(left.as_ref(), &target)?,
        cast(right.as_ref(), &target)?,
    ))
}

fn compare(op: &str, left: ArrayRef, right: ArrayRef) -> Result<ArrayRef, SparkError> {
    let (left, right) = coerce_pair(left, right)?;

    if left.data_type() == &DataType::Null {
        return Ok(new_null_array(&DataType::Boolean, left.len()));
    }

    let result = match op {
        "==" => cmp::eq(&left, &right)?,
        "!=" => cmp::neq(&left, &right)?,
        ">" => cmp::gt(&left, &right)?,
        ">=" => cmp::gt_eq(&left, &right)?,
        "<" => cmp::lt(&left, &right)?,
        "<=" => cmp::lt_eq(&left, &right)?,
        other => {
            return Err(SparkError::AnalysisException(format!(
                "unknown comparison {other}"
            )))
        }
    };

    Ok(Arc::new(result))
}

fn arithmetic(op: &str, left: ArrayRef, right: ArrayRef) -> Result<ArrayRef, SparkError> {
    for array in [&left, &right] {
        let dt = array.data_type();
        if !dt.is_numeric() && dt != &DataType::Null {
            return Err(SparkError::AnalysisException(format!(
                "arithmetic {op} requires numeric input, got {}",
                dt.simple_string()
            )));
        }
    }

    let target = if op != "/" && left.data_type().is_integer() && right.data_type().is_integer()
    {
        DataType::Int64
    } else {
        DataType::Float64
    };

    let left = cast(left.as_ref(), &target)?;
    let right = cast(right.as_ref(), &target)?;

    let result = match op {
        "+" => numeric::add(&left, &right)?,
        "-" => numeric::sub(&left, &right)?,
        "*" => numeric::mul(&left, &right)?,
        _ => numeric::div(&left, &right)?,
    };

    Ok(result)
}

fn invoke(name: &str, args: &[Expr], batch: &RecordBatch) -> Result<ArrayRef, SparkError> {
    match name {
        "lower" => {
            let args = expect_args(name, args, 1)?;
            map_strings(&evaluate(&args[0], batch)?, |s| s.to_lowercase())
        }
        "upper" => {
            let args = expect_args(name, args, 1)?;
            map_strings(&evaluate(&args[0], batch)?, |s| s.to_uppercase())
        }
        "trim" => {
            let args = expect_args(name, args, 1)?;
            map_strings(&evaluate(&args[0], batch)?, |s| s.trim_matches(' ').to_string())
        }
        "length" => {
            let args = expect_args(name, args, 1)?;
            let array = to_utf8(&evaluate(&args[0], batch)?)?;
            let lengths: Int32Array = array
                .as_string::<i32>()
                .iter()
                .map(|value| value.map(|s| s.chars().count() as i32))
                .collect();
            Ok(Arc::new(lengths))
        }
        "regexp_replace" => {
            let args = expect_args(name, args, 3)?;
            let pattern = Regex::new(literal_str(name, &args[1])?)?;
            let replacement = literal_str(name, &args[2])?;
            map_strings(&evaluate(&args[0], batch)?, |s| {
                pattern.replace_all(s, replacement).into_owned()
            })
        }
        "split" => {
            let args = expect_args(name, args, 2)?;
            let pattern = Regex::new(literal_str(name, &args[1])?)?;
            let array = to_utf8(&evaluate(&args[0], batch)?)?;

            let mut builder = ListBuilder::new(StringBuilder::new());
            for value in array.as_string::<i32>().iter() {
                match value {
                    Some(s) => {
                        for token in pattern.split(s) {
                            builder.values().append_value(token);
                        }
                        builder.append(true);
                    }
                    None => builder.append(false),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        "contains" | "startswith" | "endswith" => {
            let args = expect_args(name, args, 2)?;
            let needle = literal_str(name, &args[1])?;
            let array = evaluate(&args[0], batch)?;
            match name {
                "contains" => test_strings(&array, |s| s.contains(needle)),
                "startswith" => test_strings(&array, |s| s.starts_with(needle)),
                _ => test_strings(&array, |s| s.ends_with(needle)),
            }
        }
        "rlike" => {
            let args = expect_args(name, args, 2)?;
            let pattern = Regex::new(literal_str(name, &args[1])?)?;
            test_strings(&evaluate(&args[0], batch)?, |s| pattern.is_match(s))
        }
        "nullif" => {
            let args = expect_args(name, args, 2)?;
            let (left, right) =
                coerce_pair(evaluate(&args[0], batch)?, evaluate(&args[1], batch)?)?;
            if left.data_type() == &DataType::Null {
                return Ok(left);
            }
            let equal = cmp::eq(&left, &right)?;
            Ok(nullif(left.as_ref(), &equal)?)
        }
        "coalesce" => {
            let mut arrays = args
                .iter()
                .map(|arg| evaluate(arg, batch))
                .collect::<Result<Vec<ArrayRef>, SparkError>>()?;

            let mut result = arrays.pop().ok_or_else(|| {
                SparkError::AnalysisException("coalesce requires at least one argument".into())
            })?;

            while let Some(array) = arrays.pop() {
                let (array, rest) = coerce_pair(array, result)?;
                result = zip(&is_not_null(array.as_ref())?, &array, &rest)?;
            }
            Ok(result)
        }
        "isnull" => {
            let args = expect_args(name, args, 1)?;
            Ok(Arc::new(is_null(evaluate(&args[0], batch)?.as_ref())?))
        }
        "isnotnull" => {
            let args = expect_args(name, args, 1)?;
            Ok(Arc::new(is_not_null(evaluate(&args[0], batch)?.as_ref())?))
        }
        "not" => {
            let args = expect_args(name, args, 1)?;
            let array = as_boolean(name, &evaluate(&args[0], batch)?)?;
            Ok(Arc::new(boolean::not(&array)?))
        }
        "and" | "or" => {
            let args = expect_args(name, args, 2)?;
            let left = as_boolean(name, &evaluate(&args[0], batch)?)?;
            let right = as_boolean(name, &evaluate(&args[1], batch)?)?;
            let result = if name == "and" {
                boolean::and_kleene(&left, &right)?
            } else {
                boolean::or_kleene(&left, &right)?
            };
            Ok(Arc::new(result))
        }
        "==" | "!=" | ">" | ">=" | "<" | "<=" => {
            let args = expect_args(name, args, 2)?;
            compare(name, evaluate(&args[0], batch)?, evaluate(&args[1], batch)?)
        }
        "+" | "-" | "*" | "/" => {
            let args = expect_args(name, args, 2)?;
            arithmetic(name, evaluate(&args[0], batch)?, evaluate(&args[1], batch)?)
        }
        GENERATOR => Err(SparkError::AnalysisException(
            "Generators are not supported when nested in expressions".to_string(),
        )),
        name if AGGREGATE_FUNCTIONS.contains(&name) => Err(SparkError::AnalysisException(
            format!("aggregate function {name} is only allowed in an aggregation"),
        )),
        other => Err(SparkError::AnalysisException(format!(
            "Cannot resolve function `{other}`"
        ))),
    }
}
