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

//! Unresolved expressions and the traits for converting Rust types into them
//!
//! Expressions are resolved against the input schema only when an action is called.
//! Function calls are kept by name, the executor looks them up at that point.
//!
//! ## Overview
//!
//! - [Expr] is the unresolved expression tree held by a [Column]
//! - [Literal] is a constant value embedded in an expression
//! - [ToExpr] accepts a `&str`, `String`, or [Column]. This trait uses the method `from`
//!   on the Column to create an expression.
//! - [ToLiteral] is used for taking rust types into a [Literal]
//! - [ToVecExpr] many plan methods require a `Vec<Expr>` this trait is a shorthand
//!   for that transformation
//! - [ToFilterExpr] is specifically used for filter statements

use std::fmt;

use crate::column::Column;

/// A constant value
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(val) => write!(f, "{val}"),
            Literal::Int64(val) => write!(f, "{val}"),
            Literal::Float64(val) => write!(f, "{val:?}"),
            Literal::Utf8(val) => write!(f, "{val}"),
        }
    }
}

macro_rules! impl_from_for_literal {
    ($type:ty, $inner_type:ident, $cast:ty) => {
        impl From<$type> for Literal {
            fn from(value: $type) -> Self {
                Literal::$inner_type(value as $cast)
            }
        }
    };
}

impl_from_for_literal!(i16, Int64, i64);
impl_from_for_literal!(i32, Int64, i64);
impl_from_for_literal!(i64, Int64, i64);
impl_from_for_literal!(usize, Int64, i64);
impl_from_for_literal!(f32, Float64, f64);
impl_from_for_literal!(f64, Float64, f64);

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Utf8(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Utf8(value)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Literal::Null)
    }
}

/// An unresolved expression
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Every column of the input
    UnresolvedStar,
    /// A reference to a column by name
    UnresolvedAttribute(String),
    Literal(Literal),
    Alias {
        expr: Box<Expr>,
        name: String,
    },
    /// A function call, operators included, resolved by name during execution
    UnresolvedFunction {
        function_name: String,
        arguments: Vec<Expr>,
    },
    SortOrder {
        child: Box<Expr>,
        ascending: bool,
        nulls_first: bool,
    },
}

const BINARY_OPERATORS: [&str; 12] = [
    "==", "!=", ">", ">=", "<", "<=", "and", "or", "+", "-", "*", "/",
];

impl Expr {
    /// Output name of the expression, following the Spark naming of unaliased columns
    pub fn name(&self) -> String {
        match self {
            Expr::UnresolvedStar => "*".to_string(),
            Expr::UnresolvedAttribute(name) => name.clone(),
            Expr::Literal(value) => value.to_string(),
            Expr::Alias { name, .. } => name.clone(),
            Expr::SortOrder { child, .. } => child.name(),
            Expr::UnresolvedFunction {
                function_name,
                arguments,
            } => {
                if arguments.len() == 2 && BINARY_OPERATORS.contains(&function_name.as_str()) {
                    let op = match function_name.as_str() {
                        "==" => "=",
                        "and" => "AND",
                        "or" => "OR",
                        other => other,
                    };
                    return format!("({} {} {})", arguments[0].name(), op, arguments[1].name());
                }

                let args = arguments
                    .iter()
                    .map(|arg| arg.name())
                    .collect::<Vec<String>>()
                    .join(", ");

                format!("{function_name}({args})")
            }
        }
    }

    /// The expression with any top level alias removed
    pub fn unaliased(&self) -> &Expr {
        match self {
            Expr::Alias { expr, .. } => expr.unaliased(),
            other => other,
        }
    }

    /// Function name when the expression (ignoring aliases) is a function call
    pub fn function_name(&self) -> Option<&str> {
        match self.unaliased() {
            Expr::UnresolvedFunction { function_name, .. } => Some(function_name.as_str()),
            _ => None,
        }
    }

    /// Returns true if the function `name` appears anywhere in the expression tree
    pub fn contains_function(&self, name: &str) -> bool {
        match self {
            Expr::Alias { expr, .. } => expr.contains_function(name),
            Expr::SortOrder { child, .. } => child.contains_function(name),
            Expr::UnresolvedFunction {
                function_name,
                arguments,
            } => {
                function_name == name || arguments.iter().any(|arg| arg.contains_function(name))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Alias { expr, name } => write!(f, "{expr} AS {name}"),
            Expr::SortOrder {
                child,
                ascending,
                nulls_first,
            } => {
                let direction = if *ascending { "ASC" } else { "DESC" };
                let nulls = if *nulls_first { "FIRST" } else { "LAST" };
                write!(f, "{child} {direction} NULLS {nulls}")
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Translate string values into an [Expr]
pub trait ToExpr {
    fn to_expr(&self) -> Expr;
}

impl ToExpr for &str {
    fn to_expr(&self) -> Expr {
        Column::from(*self).expression
    }
}

impl ToExpr for String {
    fn to_expr(&self) -> Expr {
        Column::from(self.as_str()).expression
    }
}

impl ToExpr for Column {
    fn to_expr(&self) -> Expr {
        self.expression.clone()
    }
}

impl ToExpr for Expr {
    fn to_expr(&self) -> Expr {
        self.clone()
    }
}

/// Translate values into a `Vec<Expr>`
pub trait ToVecExpr {
    fn to_vec_expr(&self) -> Vec<Expr>;
}

impl<T> ToVecExpr for T
where
    T: ToExpr,
{
    fn to_vec_expr(&self) -> Vec<Expr> {
        vec![self.to_expr()]
    }
}

impl<T> ToVecExpr for Vec<T>
where
    T: ToExpr,
{
    fn to_vec_expr(&self) -> Vec<Expr> {
        self.iter().map(|col| col.to_expr()).collect()
    }
}

impl<const N: usize, T> ToVecExpr for [T; N]
where
    T: ToExpr,
{
    fn to_vec_expr(&self) -> Vec<Expr> {
        self.iter().map(|col| col.to_expr()).collect()
    }
}

/// Create a filter expression
pub trait ToFilterExpr {
    fn to_filter_expr(&self) -> Expr;
}

impl ToFilterExpr for Column {
    fn to_filter_expr(&self) -> Expr {
        self.to_expr()
    }
}

/// Translate a rust value into a [Literal]
pub trait ToLiteral {
    fn to_literal(&self) -> Literal;
}

impl<T> ToLiteral for T
where
    T: Into<Literal> + Clone,
{
    fn to_literal(&self) -> Literal {
        self.clone().into()
    }
}

/// Translate a rust value into a literal [Expr]
pub trait ToLiteralExpr {
    fn to_literal_expr(&self) -> Expr;
}

impl<T> ToLiteralExpr for T
where
    T: ToLiteral,
{
    fn to_literal_expr(&self) -> Expr {
        Expr::Literal(self.to_literal())
    }
}
