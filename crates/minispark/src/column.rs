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

//! [Column] represents a column in a DataFrame that holds an unresolved [Expr]
use std::convert::From;
use std::ops::{Add, Div, Mul, Not, Sub};

use crate::expressions::{Expr, Literal, ToExpr, ToLiteralExpr};
use crate::functions::invoke_func;

/// # Column
///
/// A column holds a specific [Expr] which will be resolved once an action is called.
/// The columns are resolved by the local executor against the schema of the input.
///
/// A column created with `col("*")` is an unresolved star attribute which will select
/// all columns of the input.
///
/// ```rust
/// // As a &str representing an unresolved column in the dataframe
/// df.select("mood_type");
///
/// // By using the `col` function
/// df.select(col("mood_type"));
///
/// // By using the `lit` function to return a literal value
/// df.select(lit(4.0).alias("num_col"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// an [Expr] containing any unresolved value to be evaluated by the executor
    pub expression: Expr,
}

impl From<Expr> for Column {
    fn from(expression: Expr) -> Self {
        Self { expression }
    }
}

impl From<Literal> for Column {
    fn from(value: Literal) -> Self {
        Column::from(Expr::Literal(value))
    }
}

impl From<&str> for Column {
    /// `"*"` is created as an unresolved star expression,
    /// otherwise the value is created as an unresolved attribute
    fn from(value: &str) -> Self {
        let expression = match value {
            "*" => Expr::UnresolvedStar,
            _ => Expr::UnresolvedAttribute(value.to_string()),
        };

        Column::from(expression)
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        Column::from(value.as_str())
    }
}

impl Column {
    /// Returns the column with a new name
    ///
    /// # Example:
    /// ```rust
    /// let cols = [
    ///     col("name").alias("new_name"),
    ///     col("age").alias("new_age")
    /// ];
    ///
    /// df.select(cols);
    /// ```
    pub fn alias(self, value: &str) -> Column {
        Column::from(Expr::Alias {
            expr: Box::new(self.expression),
            name: value.to_string(),
        })
    }

    /// An alias for the function `alias`
    pub fn name(self, value: &str) -> Column {
        self.alias(value)
    }

    /// Returns a sorted expression based on the ascending order of the column
    ///
    /// # Example:
    /// ```rust
    /// let df: DataFrame = df.sort([col("id").asc()]);
    ///
    /// let df: DataFrame = df.sort([asc(col("id"))]);
    /// ```
    pub fn asc(self) -> Column {
        self.asc_nulls_first()
    }

    pub fn asc_nulls_first(self) -> Column {
        self.sort_order(true, true)
    }

    pub fn asc_nulls_last(self) -> Column {
        self.sort_order(true, false)
    }

    /// Returns a sorted expression based on the descending order of the column
    ///
    /// # Example:
    /// ```rust
    /// let df: DataFrame = df.sort([col("count").desc()]);
    ///
    /// let df: DataFrame = df.sort([desc(col("count"))]);
    /// ```
    pub fn desc(self) -> Column {
        self.desc_nulls_last()
    }

    pub fn desc_nulls_first(self) -> Column {
        self.sort_order(false, true)
    }

    pub fn desc_nulls_last(self) -> Column {
        self.sort_order(false, false)
    }

    fn sort_order(self, ascending: bool, nulls_first: bool) -> Column {
        let child = match self.expression {
            Expr::SortOrder { child, .. } => child,
            other => Box::new(other),
        };

        Column::from(Expr::SortOrder {
            child,
            ascending,
            nulls_first,
        })
    }

    /// A filter expression that evaluates if the column contains a string literal
    pub fn contains<T: ToLiteralExpr>(self, other: T) -> Column {
        invoke_func("contains", vec![self.to_expr(), other.to_literal_expr()])
    }

    /// A filter expression that evaluates if the column startswith a string literal
    pub fn startswith<T: ToLiteralExpr>(self, other: T) -> Column {
        invoke_func("startswith", vec![self.to_expr(), other.to_literal_expr()])
    }

    /// A filter expression that evaluates if the column endswith a string literal
    pub fn endswith<T: ToLiteralExpr>(self, other: T) -> Column {
        invoke_func("endswith", vec![self.to_expr(), other.to_literal_expr()])
    }

    /// A filter expression that evaluates the column based on a regex match
    pub fn rlike<T: ToLiteralExpr>(self, other: T) -> Column {
        invoke_func("rlike", vec![self.to_expr(), other.to_literal_expr()])
    }

    /// Equality comparion. Cannot overload the '==' and return something other
    /// than a bool
    pub fn eq<T: ToExpr>(self, other: T) -> Column {
        invoke_func("==", vec![self.to_expr(), other.to_expr()])
    }

    /// Inequality comparion
    pub fn neq<T: ToExpr>(self, other: T) -> Column {
        invoke_func("!=", vec![self.to_expr(), other.to_expr()])
    }

    pub fn gt<T: ToExpr>(self, other: T) -> Column {
        invoke_func(">", vec![self.to_expr(), other.to_expr()])
    }

    pub fn ge<T: ToExpr>(self, other: T) -> Column {
        invoke_func(">=", vec![self.to_expr(), other.to_expr()])
    }

    pub fn lt<T: ToExpr>(self, other: T) -> Column {
        invoke_func("<", vec![self.to_expr(), other.to_expr()])
    }

    pub fn le<T: ToExpr>(self, other: T) -> Column {
        invoke_func("<=", vec![self.to_expr(), other.to_expr()])
    }

    /// Logical AND comparion. Cannot overload the '&&' and return something other
    /// than a bool
    pub fn and<T: ToExpr>(self, other: T) -> Column {
        invoke_func("and", vec![self.to_expr(), other.to_expr()])
    }

    /// Logical OR comparion.
    pub fn or<T: ToExpr>(self, other: T) -> Column {
        invoke_func("or", vec![self.to_expr(), other.to_expr()])
    }

    /// A filter expression that evaluates to true is the expression is null
    pub fn is_null(self) -> Column {
        invoke_func("isnull", vec![self])
    }

    /// A filter expression that evaluates to true is the expression is NOT null
    pub fn is_not_null(self) -> Column {
        invoke_func("isnotnull", vec![self])
    }
}

impl Add for Column {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        invoke_func("+", vec![self, other])
    }
}

impl Sub for Column {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        invoke_func("-", vec![self, other])
    }
}

impl Mul for Column {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        invoke_func("*", vec![self, other])
    }
}

impl Div for Column {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        invoke_func("/", vec![self, other])
    }
}

impl Not for Column {
    type Output = Self;

    fn not(self) -> Self::Output {
        invoke_func("not", vec![self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::*;

    #[test]
    fn test_column_from_str() {
        assert_eq!(Expr::UnresolvedStar, Column::from("*").expression);
        assert_eq!(
            Expr::UnresolvedAttribute("mood_type".to_string()),
            Column::from("mood_type").expression
        );
    }

    #[test]
    fn test_sort_order_replaces_previous_direction() {
        let order = col("count").asc().desc();

        assert_eq!(
            Expr::SortOrder {
                child: Box::new(Expr::UnresolvedAttribute("count".to_string())),
                ascending: false,
                nulls_first: false,
            },
            order.expression
        );
    }

    #[test]
    fn test_operator_overloads() {
        let expr = (col("a") + lit(1)).expression;

        assert_eq!(Some("+"), expr.function_name());
        assert_eq!("(a + 1)", expr.name());

        let expr = (!col("flag")).expression;
        assert_eq!("not(flag)", expr.name());
    }
}
