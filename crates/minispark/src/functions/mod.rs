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

//! A re-implementation of the Spark functions used for text and aggregate processing

use crate::column::Column;
use crate::expressions::{Expr, Literal};

pub fn invoke_func<I, S>(name: &str, args: I) -> Column
where
    I: IntoIterator<Item = S>,
    S: Into<Column>,
{
    Column::from(Expr::UnresolvedFunction {
        function_name: name.to_string(),
        arguments: args
            .into_iter()
            .map(|arg| arg.into().expression)
            .collect(),
    })
}

/// Create a column from a &str
pub fn col(value: &str) -> Column {
    Column::from(value)
}

/// Create a column from a &str
pub fn column(value: &str) -> Column {
    Column::from(value)
}

/// Create a literal value from a rust data type
pub fn lit(col: impl Into<Literal>) -> Column {
    Column::from(col.into())
}

/// Converts a string expression to lower case
pub fn lower(col: Column) -> Column {
    invoke_func("lower", vec![col])
}

/// Converts a string expression to upper case
pub fn upper(col: Column) -> Column {
    invoke_func("upper", vec![col])
}

/// Trim the spaces from both ends of the string column
pub fn trim(col: Column) -> Column {
    invoke_func("trim", vec![col])
}

/// Character length of string data
pub fn length(col: Column) -> Column {
    invoke_func("length", vec![col])
}

/// Replace all substrings of the string value that match `pattern` with `replacement`
pub fn regexp_replace(col: Column, pattern: &str, replacement: &str) -> Column {
    invoke_func("regexp_replace", vec![col, lit(pattern), lit(replacement)])
}

/// Splits the string around matches of the regex `pattern` into an array
pub fn split(col: Column, pattern: &str) -> Column {
    invoke_func("split", vec![col, lit(pattern)])
}

/// Returns a new row for each element in the given array
pub fn explode(col: Column) -> Column {
    invoke_func("explode", vec![col])
}

/// Returns null if `col1` equals `col2`, otherwise `col1`
pub fn nullif(col1: Column, col2: Column) -> Column {
    invoke_func("nullif", vec![col1, col2])
}

/// Returns the first column that is not null
pub fn coalesce<I>(cols: I) -> Column
where
    I: IntoIterator<Item = Column>,
{
    invoke_func("coalesce", cols)
}

pub fn count(col: Column) -> Column {
    invoke_func("count", vec![col])
}

pub fn sum(col: Column) -> Column {
    invoke_func("sum", vec![col])
}

pub fn avg(col: Column) -> Column {
    invoke_func("avg", vec![col])
}

pub fn mean(col: Column) -> Column {
    avg(col)
}

pub fn min(col: Column) -> Column {
    invoke_func("min", vec![col])
}

pub fn max(col: Column) -> Column {
    invoke_func("max", vec![col])
}

pub fn asc(col: Column) -> Column {
    col.asc()
}

pub fn asc_nulls_first(col: Column) -> Column {
    col.asc_nulls_first()
}

pub fn asc_nulls_last(col: Column) -> Column {
    col.asc_nulls_last()
}

pub fn desc(col: Column) -> Column {
    col.desc()
}

pub fn desc_nulls_first(col: Column) -> Column {
    col.desc_nulls_first()
}

pub fn desc_nulls_last(col: Column) -> Column {
    col.desc_nulls_last()
}
