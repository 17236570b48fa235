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

//! Local Spark-style DataFrames for Rust
//!
//! A [DataFrame] is a lazy logical plan over in-memory [arrow] partitions. Transformations
//! only extend the plan; actions such as `collect`, `count` or `write().save(..)` execute it
//! on the Tokio blocking pool and return arrow data.
//!
//! # Quickstart
//!
//! Create a Spark Session and create a [DataFrame] from a [arrow::array::RecordBatch].
//!
//! ```rust
//! use minispark::{SparkSession, SparkSessionBuilder};
//! use minispark::functions::{col, lit}
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//!     let spark: SparkSession = SparkSessionBuilder::default()
//!         .app_name("example_rs")
//!         .build()?;
//!
//!     let name: ArrayRef = Arc::new(StringArray::from(vec!["Tom", "Alice", "Bob"]));
//!     let age: ArrayRef = Arc::new(Int64Array::from(vec![14, 23, 16]));
//!
//!     let data = RecordBatch::try_from_iter(vec![("name", name), ("age", age)])?
//!
//!     let df = spark.create_dataframe(&data)?
//!
//!     // 2 records total
//!     let records = df.select(["*"])
//!         .with_column("age_plus", col("age") + lit(4))
//!         .filter(col("name").contains("o"))
//!         .count()
//!         .await?;
//!
//!     spark.stop();
//!
//!     Ok(())
//! };
//!```
//!
//! Read a directory of CSV part files, apply function transformations, and write the results:
//!
//! ```rust
//! use minispark::SparkSessionBuilder;
//! use minispark::dataframe::SaveMode;
//!
//! use minispark::functions as F;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//!     let spark = SparkSessionBuilder::default().build()?;
//!
//!     let df = spark
//!         .read()
//!         .format("csv")
//!         .option("header", "true")
//!         .load(["clean_output_csv/"])?;
//!
//!     let words = df
//!         .select(F::explode(F::split(F::lower(F::col("user_input")), r"\s+")).alias("word"))
//!         .group_by(Some("word"))
//!         .count();
//!
//!     words.write()
//!       .mode(SaveMode::Overwrite)
//!       .option("header", "true")
//!       .save("words/")
//!       .await?;
//!
//!     Ok(())
//! };
//!```

pub mod column;
pub mod conf;
pub mod dataframe;
pub mod errors;
pub mod expressions;
pub mod functions;
pub mod group;
pub mod plan;
pub mod readwriter;
pub mod session;
pub mod types;

mod execution;
mod utils;

pub use dataframe::{DataFrame, DataFrameReader, DataFrameWriter};
pub use session::{SparkSession, SparkSessionBuilder};
