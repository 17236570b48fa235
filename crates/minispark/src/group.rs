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

//! A DataFrame created with an aggregate statement

use crate::column::Column;
use crate::dataframe::DataFrame;
use crate::expressions::{Expr, ToVecExpr};
use crate::functions::{invoke_func, lit};
use crate::plan::LogicalPlanBuilder;

#[derive(Clone, Debug)]
pub struct GroupedData {
    df: DataFrame,
    grouping_cols: Vec<Expr>,
}

impl GroupedData {
    pub fn new(df: DataFrame, grouping_cols: Vec<Expr>) -> GroupedData {
        Self { df, grouping_cols }
    }

    /// Compute aggregates and returns the result as a [DataFrame]
    pub fn agg<T: ToVecExpr>(self, exprs: T) -> DataFrame {
        let logical_plan = LogicalPlanBuilder::aggregate(self.df.plan, self.grouping_cols, exprs);

        DataFrame::new(*self.df.spark_session, logical_plan)
    }

    fn agg_each<T: ToVecExpr>(self, function_name: &str, cols: T) -> DataFrame {
        let aggregates: Vec<Column> = cols
            .to_vec_expr()
            .into_iter()
            .map(|expr| invoke_func(function_name, vec![Column::from(expr)]))
            .collect();

        self.agg(aggregates)
    }

    /// Computes average values for each numeric columns for each group.
    pub fn avg<T: ToVecExpr>(self, cols: T) -> DataFrame {
        self.agg_each("avg", cols)
    }

    /// Alias for [GroupedData::avg]
    pub fn mean<T: ToVecExpr>(self, cols: T) -> DataFrame {
        self.agg_each("avg", cols)
    }

    /// Computes the min value for each numeric column for each group.
    pub fn min<T: ToVecExpr>(self, cols: T) -> DataFrame {
        self.agg_each("min", cols)
    }

    /// Computes the max value for each numeric columns for each group.
    pub fn max<T: ToVecExpr>(self, cols: T) -> DataFrame {
        self.agg_each("max", cols)
    }

    /// Computes the sum for each numeric columns for each group.
    pub fn sum<T: ToVecExpr>(self, cols: T) -> DataFrame {
        self.agg_each("sum", cols)
    }

    /// Counts the number of records for each group, in a column named `count`.
    pub fn count(self) -> DataFrame {
        self.agg(invoke_func("count", vec![lit(1)]).alias("count"))
    }
}
