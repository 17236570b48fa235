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

//! Logical Plan representation

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::column::Column;
use crate::expressions::{Expr, Literal, ToFilterExpr, ToVecExpr};
use crate::utils::sort_order;

static NEXT_PLAN_ID: AtomicI64 = AtomicI64::new(1);

/// An unresolved relation, evaluated by the executor when an action is called
#[derive(Clone, Debug)]
pub enum LogicalPlan {
    LocalRelation {
        schema: SchemaRef,
        partitions: Vec<RecordBatch>,
    },
    Read {
        format: String,
        paths: Vec<String>,
        schema: Option<SchemaRef>,
        options: HashMap<String, String>,
    },
    Project {
        input: Box<LogicalPlan>,
        exprs: Vec<Expr>,
    },
    WithColumns {
        input: Box<LogicalPlan>,
        columns: Vec<(String, Expr)>,
    },
    WithColumnsRenamed {
        input: Box<LogicalPlan>,
        renames: Vec<(String, String)>,
    },
    Drop {
        input: Box<LogicalPlan>,
        columns: Vec<String>,
    },
    Filter {
        input: Box<LogicalPlan>,
        condition: Expr,
    },
    Sort {
        input: Box<LogicalPlan>,
        order: Vec<Expr>,
    },
    Limit {
        input: Box<LogicalPlan>,
        limit: usize,
    },
    Aggregate {
        input: Box<LogicalPlan>,
        grouping: Vec<Expr>,
        aggregates: Vec<Expr>,
    },
    Deduplicate {
        input: Box<LogicalPlan>,
    },
    Describe {
        input: Box<LogicalPlan>,
        columns: Vec<String>,
    },
    DropNa {
        input: Box<LogicalPlan>,
        how: String,
        threshold: Option<usize>,
        subset: Option<Vec<String>>,
    },
    FillNa {
        input: Box<LogicalPlan>,
        value: Literal,
        subset: Option<Vec<String>>,
    },
    Repartition {
        input: Box<LogicalPlan>,
        num_partitions: usize,
    },
}

impl LogicalPlan {
    pub(crate) fn node_name(&self) -> String {
        let join = |exprs: &[Expr]| {
            exprs
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        };

        match self {
            LogicalPlan::LocalRelation { schema, partitions } => format!(
                "LocalRelation [{}], partitions={}",
                schema
                    .fields()
                    .iter()
                    .map(|f| f.name().as_str())
                    .collect::<Vec<&str>>()
                    .join(", "),
                partitions.len()
            ),
            LogicalPlan::Read { format, paths, .. } => {
                format!("Relation {format} [{}]", paths.join(", "))
            }
            LogicalPlan::Project { exprs, .. } => format!("Project [{}]", join(exprs)),
            LogicalPlan::WithColumns { columns, .. } => format!(
                "WithColumns [{}]",
                columns
                    .iter()
                    .map(|(name, expr)| format!("{expr} AS {name}"))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            LogicalPlan::WithColumnsRenamed { renames, .. } => format!(
                "WithColumnsRenamed [{}]",
                renames
                    .iter()
                    .map(|(from, to)| format!("{from} -> {to}"))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            LogicalPlan::Drop { columns, .. } => format!("Drop [{}]", columns.join(", ")),
            LogicalPlan::Filter { condition, .. } => format!("Filter {condition}"),
            LogicalPlan::Sort { order, .. } => format!("Sort [{}]", join(order)),
            LogicalPlan::Limit { limit, .. } => format!("GlobalLimit {limit}"),
            LogicalPlan::Aggregate {
                grouping,
                aggregates,
                ..
            } => format!("Aggregate [{}], [{}]", join(grouping), join(aggregates)),
            LogicalPlan::Deduplicate { .. } => "Deduplicate".to_string(),
            LogicalPlan::Describe { columns, .. } => {
                format!("Describe [{}]", columns.join(", "))
            }
            LogicalPlan::DropNa {
                how,
                threshold,
                subset,
                ..
            } => format!(
                "DropNa how={how}, thresh={threshold:?}, subset={:?}",
                subset
            ),
            LogicalPlan::FillNa { value, subset, .. } => {
                format!("FillNa value={value}, subset={subset:?}")
            }
            LogicalPlan::Repartition { num_partitions, .. } => {
                format!("Repartition {num_partitions}")
            }
        }
    }

    /// Input relation of the node, `None` for leaf relations
    pub fn input(&self) -> Option<&LogicalPlan> {
        match self {
            LogicalPlan::LocalRelation { .. } | LogicalPlan::Read { .. } => None,
            LogicalPlan::Project { input, .. }
            | LogicalPlan::WithColumns { input, .. }
            | LogicalPlan::WithColumnsRenamed { input, .. }
            | LogicalPlan::Drop { input, .. }
            | LogicalPlan::Filter { input, .. }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Limit { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::Deduplicate { input }
            | LogicalPlan::Describe { input, .. }
            | LogicalPlan::DropNa { input, .. }
            | LogicalPlan::FillNa { input, .. }
            | LogicalPlan::Repartition { input, .. } => Some(&**input),
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut node = Some(self);
        let mut depth = 0;

        while let Some(plan) = node {
            if depth == 0 {
                writeln!(f, "{}", plan.node_name())?;
            } else {
                writeln!(f, "{}+- {}", "   ".repeat(depth - 1), plan.node_name())?;
            }
            node = plan.input();
            depth += 1;
        }

        Ok(())
    }
}

/// Implements a struct to hold the current [LogicalPlan]
/// which represents an unresolved relation
#[derive(Clone, Debug)]
pub struct LogicalPlanBuilder {
    plan: LogicalPlan,
    plan_id: i64,
}

impl LogicalPlanBuilder {
    fn next_plan_id() -> i64 {
        NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed)
    }

    /// Create a new Logical Plan from an initial [LogicalPlan]
    pub fn new(plan: LogicalPlan) -> LogicalPlanBuilder {
        LogicalPlanBuilder {
            plan,
            plan_id: LogicalPlanBuilder::next_plan_id(),
        }
    }

    pub fn plan(&self) -> &LogicalPlan {
        &self.plan
    }

    pub fn into_plan(self) -> LogicalPlan {
        self.plan
    }

    pub fn plan_id(&self) -> i64 {
        self.plan_id
    }

    fn input(self) -> Box<LogicalPlan> {
        Box::new(self.plan)
    }

    pub fn local_relation(schema: SchemaRef, partitions: Vec<RecordBatch>) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::LocalRelation { schema, partitions })
    }

    pub fn aggregate<T: ToVecExpr>(
        input: LogicalPlanBuilder,
        grouping_cols: Vec<Expr>,
        agg_expression: T,
    ) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Aggregate {
            input: input.input(),
            grouping: grouping_cols,
            aggregates: agg_expression.to_vec_expr(),
        })
    }

    pub fn select<T: ToVecExpr>(self, cols: T) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Project {
            input: self.input(),
            exprs: cols.to_vec_expr(),
        })
    }

    pub fn filter<T: ToFilterExpr>(self, condition: T) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Filter {
            input: self.input(),
            condition: condition.to_filter_expr(),
        })
    }

    pub fn with_columns<I, K>(self, col_map: I) -> LogicalPlanBuilder
    where
        I: IntoIterator<Item = (K, Column)>,
        K: AsRef<str>,
    {
        LogicalPlanBuilder::new(LogicalPlan::WithColumns {
            input: self.input(),
            columns: col_map
                .into_iter()
                .map(|(name, col)| (name.as_ref().to_string(), col.expression))
                .collect(),
        })
    }

    pub fn with_columns_renamed<I, K, V>(self, cols: I) -> LogicalPlanBuilder
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        LogicalPlanBuilder::new(LogicalPlan::WithColumnsRenamed {
            input: self.input(),
            renames: cols
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        })
    }

    pub fn drop<'a, I>(self, cols: I) -> LogicalPlanBuilder
    where
        I: IntoIterator<Item = &'a str>,
    {
        LogicalPlanBuilder::new(LogicalPlan::Drop {
            input: self.input(),
            columns: cols.into_iter().map(|c| c.to_string()).collect(),
        })
    }

    pub fn sort<I>(self, cols: I) -> LogicalPlanBuilder
    where
        I: IntoIterator<Item = Column>,
    {
        LogicalPlanBuilder::new(LogicalPlan::Sort {
            input: self.input(),
            order: sort_order(cols),
        })
    }

    pub fn limit(self, limit: usize) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Limit {
            input: self.input(),
            limit,
        })
    }

    pub fn distinct(self) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Deduplicate {
            input: self.input(),
        })
    }

    pub fn describe<'a, I>(self, cols: Option<I>) -> LogicalPlanBuilder
    where
        I: IntoIterator<Item = &'a str>,
    {
        let columns = cols
            .map(|cols| cols.into_iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        LogicalPlanBuilder::new(LogicalPlan::Describe {
            input: self.input(),
            columns,
        })
    }

    pub fn dropna(
        self,
        how: &str,
        threshold: Option<usize>,
        subset: Option<Vec<&str>>,
    ) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::DropNa {
            input: self.input(),
            how: how.to_string(),
            threshold,
            subset: subset.map(|cols| cols.iter().map(|c| c.to_string()).collect()),
        })
    }

    pub fn fillna(self, value: Literal, subset: Option<Vec<&str>>) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::FillNa {
            input: self.input(),
            value,
            subset: subset.map(|cols| cols.iter().map(|c| c.to_string()).collect()),
        })
    }

    pub fn repartition(self, num_partitions: usize) -> LogicalPlanBuilder {
        LogicalPlanBuilder::new(LogicalPlan::Repartition {
            input: self.input(),
            num_partitions,
        })
    }
}
