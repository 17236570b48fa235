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

use crate::column::Column;
use crate::expressions::Expr;

/// Normalize columns into sort orders, plain columns sort ascending with nulls first
pub fn sort_order<I>(cols: I) -> Vec<Expr>
where
    I: IntoIterator<Item = Column>,
{
    cols.into_iter()
        .map(|col| match col.expression {
            Expr::SortOrder { .. } => col.expression,
            other => Expr::SortOrder {
                child: Box::new(other),
                ascending: true,
                nulls_first: true,
            },
        })
        .collect()
}

/// Compares column names and values, ignoring field nullability
#[cfg(test)]
pub(crate) fn assert_batches_eq(
    expected: &arrow::record_batch::RecordBatch,
    actual: &arrow::record_batch::RecordBatch,
) {
    let names = |batch: &arrow::record_batch::RecordBatch| {
        batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect::<Vec<String>>()
    };

    assert_eq!(names(expected), names(actual));
    assert_eq!(expected.columns(), actual.columns());
}
