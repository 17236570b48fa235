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

//! Arrow Types to Spark Types

use arrow::datatypes::{DataType, Schema};

/// Represents the Spark naming of an arrow [DataType]
pub trait SparkDataType {
    /// Name used by `printSchema`, e.g. `long` or `array`
    fn type_name(&self) -> String;

    /// Name used by `dtypes`, e.g. `bigint` or `array<string>`
    fn simple_string(&self) -> String;

    fn is_string(&self) -> bool;
}

impl SparkDataType for DataType {
    fn type_name(&self) -> String {
        match self {
            DataType::Null => "void".to_string(),
            DataType::Boolean => "boolean".to_string(),
            DataType::Int8 | DataType::UInt8 => "byte".to_string(),
            DataType::Int16 | DataType::UInt16 => "short".to_string(),
            DataType::Int32 | DataType::UInt32 => "integer".to_string(),
            DataType::Int64 | DataType::UInt64 => "long".to_string(),
            DataType::Float16 | DataType::Float32 => "float".to_string(),
            DataType::Float64 => "double".to_string(),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "string".to_string(),
            DataType::Binary | DataType::LargeBinary => "binary".to_string(),
            DataType::Date32 | DataType::Date64 => "date".to_string(),
            DataType::Timestamp(_, _) => "timestamp".to_string(),
            DataType::List(_) | DataType::LargeList(_) => "array".to_string(),
            DataType::Struct(_) => "struct".to_string(),
            other => other.to_string().to_lowercase(),
        }
    }

    fn simple_string(&self) -> String {
        match self {
            DataType::Int8 | DataType::UInt8 => "tinyint".to_string(),
            DataType::Int16 | DataType::UInt16 => "smallint".to_string(),
            DataType::Int32 | DataType::UInt32 => "int".to_string(),
            DataType::Int64 | DataType::UInt64 => "bigint".to_string(),
            DataType::List(field) | DataType::LargeList(field) => {
                format!("array<{}>", field.data_type().simple_string())
            }
            other => other.type_name(),
        }
    }

    fn is_string(&self) -> bool {
        matches!(
            self,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
        )
    }
}

/// Render a schema as the Spark `printSchema` tree
pub fn tree_string(schema: &Schema) -> String {
    let mut out = String::from("root\n");

    for field in schema.fields() {
        out.push_str(&format!(
            " |-- {}: {} (nullable = {})\n",
            field.name(),
            field.data_type().type_name(),
            field.is_nullable()
        ));

        if let DataType::List(element) | DataType::LargeList(element) = field.data_type() {
            out.push_str(&format!(
                " |    |-- element: {} (containsNull = {})\n",
                element.data_type().type_name(),
                element.is_nullable()
            ));
        }
    }

    out
}
