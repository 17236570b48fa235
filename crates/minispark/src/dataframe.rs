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

//! DataFrame representation for the local engine

use crate::column::Column;
use crate::errors::SparkError;
use crate::execution::coalesce;
use crate::expressions::{ToFilterExpr, ToLiteral, ToVecExpr};
use crate::group::GroupedData;
use crate::plan::LogicalPlanBuilder;
use crate::session::SparkSession;
use crate::types::{tree_string, SparkDataType};

pub use crate::readwriter::{DataFrameReader, DataFrameWriter, SaveMode};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};

/// DataFrame is composed of a [SparkSession] and a [LogicalPlanBuilder] which
/// represents the unresolved plan evaluated when an action is called.
///
/// The [LogicalPlanBuilder] is a series of unresolved logical plans, and every additional
/// transformation takes the prior plan and builds onto it.
///
/// ## create_dataframe
///
/// A `DataFrame` can be created with an [arrow::array::RecordBatch]
///
/// ```rust
/// let name: ArrayRef = Arc::new(StringArray::from(vec!["Tom", "Alice", "Bob"]));
/// let age: ArrayRef = Arc::new(Int64Array::from(vec![14, 23, 16]));
///
/// let data = RecordBatch::try_from_iter(vec![("name", name), ("age", age)])?
///
/// let df = spark.create_dataframe(&data)?
/// ```
///
/// ## read
///
/// A `DataFrame` is also created from a `spark.read()` statement.
///
/// ```rust
/// let df = spark
///     .read()
///     .format("csv")
///     .option("header", "true")
///     .option("delimiter", ";")
///     .load(paths)?;
/// ````
#[derive(Clone, Debug)]
pub struct DataFrame {
    /// Global [SparkSession] owning the execution context
    pub(crate) spark_session: Box<SparkSession>,

    /// Logical Plan representing the unresolved Relation
    pub(crate) plan: LogicalPlanBuilder,
}

impl DataFrame {
    /// create default DataFrame based on a spark session and initial logical plan
    pub fn new(spark_session: SparkSession, plan: LogicalPlanBuilder) -> DataFrame {
        DataFrame {
            spark_session: Box::new(spark_session),
            plan,
        }
    }

    /// Aggregate on the entire [DataFrame] without groups (shorthand for `df.group_by().agg()`)
    pub fn agg<T: ToVecExpr>(self, exprs: T) -> DataFrame {
        self.group_by::<Column>(None).agg(exprs)
    }

    /// Execute the plan and return the partitions as they were produced
    pub(crate) async fn collect_partitions(self) -> Result<Vec<RecordBatch>, SparkError> {
        self.spark_session
            .execute_plan(self.plan.into_plan())
            .await
    }

    /// Returns all the records as a single [RecordBatch]
    pub async fn collect(self) -> Result<RecordBatch, SparkError> {
        coalesce(self.collect_partitions().await?)
    }

    /// Retrieves the names of all columns in the [DataFrame] as a `Vec<String>`.
    pub async fn columns(self) -> Result<Vec<String>, SparkError> {
        let schema = self.schema().await?;

        Ok(schema
            .fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect())
    }

    /// Returns the number of rows in this [DataFrame]
    pub async fn count(self) -> Result<i64, SparkError> {
        let partitions = self.collect_partitions().await?;

        Ok(partitions.iter().map(|p| p.num_rows() as i64).sum())
    }

    /// Computes basic statistics for numeric and string columns.
    /// This includes count, mean, stddev, min, and max.
    /// If no columns are given, this function computes statistics for all numerical or string columns.
    pub fn describe<'a, I>(self, cols: Option<I>) -> DataFrame
    where
        I: IntoIterator<Item = &'a str>,
    {
        let plan = self.plan.describe(cols);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a new [DataFrame] containing the distinct rows in this [DataFrame].
    pub fn distinct(self) -> DataFrame {
        let plan = self.plan.distinct();

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a new [DataFrame] without the specified columns, unknown columns are ignored
    pub fn drop<'a, I>(self, cols: I) -> DataFrame
    where
        I: IntoIterator<Item = &'a str>,
    {
        let plan = self.plan.drop(cols);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a new [DataFrame] omitting rows with null values.
    ///
    /// # Arguments:
    ///
    /// * `how`: `any` drops a row if it contains any nulls. `all` drops a row only if all its values are null.
    /// * `threshold`: drop rows that have less than `threshold` non-null values. This overwrites the `how` parameter.
    /// * `subset`: optional list of column names to consider.
    pub fn dropna(self, how: &str, threshold: Option<usize>, subset: Option<Vec<&str>>) -> DataFrame {
        let plan = self.plan.dropna(how, threshold, subset);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns all column names and their data types as a Vec containing
    /// the field name as a String and the Spark simple type name as a String
    pub async fn dtypes(self) -> Result<Vec<(String, String)>, SparkError> {
        let schema = self.schema().await?;

        Ok(schema
            .fields()
            .iter()
            .map(|field| (field.name().to_string(), field.data_type().simple_string()))
            .collect())
    }

    /// Returns the logical plan as a tree, without executing it
    pub async fn explain(self) -> Result<String, SparkError> {
        self.spark_session.check_active()?;

        Ok(format!("== Logical Plan ==\n{}", self.plan.plan()))
    }

    /// Replace null values with `value`, only in columns whose type matches the value.
    pub fn fillna<T: ToLiteral>(self, value: T, subset: Option<Vec<&str>>) -> DataFrame {
        let plan = self.plan.fillna(value.to_literal(), subset);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Filters rows using a given conditions and returns a new [DataFrame]
    ///
    /// # Example:
    /// ```rust
    /// async {
    ///     df.filter(col("age").gt(lit(30))).collect().await?;
    /// }
    /// ```
    pub fn filter<T: ToFilterExpr>(self, condition: T) -> DataFrame {
        let plan = self.plan.filter(condition);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Alias for [DataFrame::filter]
    pub fn where_<T: ToFilterExpr>(self, condition: T) -> DataFrame {
        self.filter(condition)
    }

    /// Groups the DataFrame using the specified columns, and returns a [GroupedData] object
    pub fn group_by<T: ToVecExpr>(self, cols: Option<T>) -> GroupedData {
        let grouping_cols = match cols {
            Some(cols) => cols.to_vec_expr(),
            None => vec![],
        };

        GroupedData::new(self, grouping_cols)
    }

    /// Returns the first `n` rows, one when `n` is not given
    pub async fn head(self, n: Option<usize>) -> Result<RecordBatch, SparkError> {
        self.limit(n.unwrap_or(1)).collect().await
    }

    /// Checks if the [DataFrame] is empty and returns a boolean value.
    pub async fn is_empty(self) -> Result<bool, SparkError> {
        Ok(self.limit(1).count().await? == 0)
    }

    /// Limits the result count to the number specified and returns a new [DataFrame]
    pub fn limit(self, limit: usize) -> DataFrame {
        let plan = self.plan.limit(limit);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a [DataFrameNaFunctions] for handling missing values.
    pub fn na(self) -> DataFrameNaFunctions {
        DataFrameNaFunctions::new(self)
    }

    /// Alias for [DataFrame::sort]
    pub fn order_by<I>(self, cols: I) -> DataFrame
    where
        I: IntoIterator<Item = Column>,
    {
        self.sort(cols)
    }

    /// Returns the schema in the Spark tree format
    pub async fn print_schema(self) -> Result<String, SparkError> {
        let schema = self.schema().await?;

        Ok(tree_string(&schema))
    }

    /// Returns a new [DataFrame] split into exactly `num_partitions` partitions
    pub fn repartition(self, num_partitions: usize) -> DataFrame {
        let plan = self.plan.repartition(num_partitions);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns the schema of this DataFrame as an arrow [SchemaRef]
    pub async fn schema(self) -> Result<SchemaRef, SparkError> {
        let partitions = self.collect_partitions().await?;

        partitions
            .first()
            .map(|batch| batch.schema())
            .ok_or_else(|| SparkError::Aborted("relation produced no partitions".to_string()))
    }

    /// Projects a set of expressions and returns a new [DataFrame]
    ///
    /// # Arguments:
    ///
    /// * `cols` - An object that implements [ToVecExpr]
    ///
    /// # Example:
    /// ```rust
    /// async {
    ///     df.select(vec![col("age"), col("name")]).collect().await?;
    /// }
    /// ```
    pub fn select<T: ToVecExpr>(self, cols: T) -> DataFrame {
        let plan = self.plan.select(cols);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Prints the first `n` rows to the console
    ///
    /// # Arguments:
    ///
    /// * `num_row`: (int, optional) number of rows to show (default 20)
    /// * `truncate`: (int, optional) maximum width of a cell (default 20). If set to 0, strings are not truncated.
    /// * `vertical`: (bool, optional) If set to true, prints output rows vertically (one line per column value).
    ///
    pub async fn show(
        self,
        num_rows: Option<usize>,
        truncate: Option<usize>,
        vertical: Option<bool>,
    ) -> Result<(), SparkError> {
        let output = self.show_string(num_rows, truncate, vertical).await?;
        print!("{output}");
        Ok(())
    }

    /// Render the first `n` rows the same way [DataFrame::show] prints them
    pub async fn show_string(
        self,
        num_rows: Option<usize>,
        truncate: Option<usize>,
        vertical: Option<bool>,
    ) -> Result<String, SparkError> {
        let num_rows = num_rows.unwrap_or(20);
        let truncate = truncate.unwrap_or(20);

        let batch = self.limit(num_rows + 1).collect().await?;
        let has_more = batch.num_rows() > num_rows;
        let batch = batch.slice(0, batch.num_rows().min(num_rows));

        let (header, rows) = format_cells(&batch, truncate)?;

        let mut out = if vertical.unwrap_or(false) {
            render_vertical(&header, &rows)
        } else {
            render_table(&header, &rows, truncate > 0)
        };

        if has_more {
            let noun = if num_rows == 1 { "row" } else { "rows" };
            out.push_str(&format!("only showing top {num_rows} {noun}\n"));
        }

        Ok(out)
    }

    /// Returns a new [DataFrame] sorted by the specified columns.
    ///
    /// Plain columns sort ascending. The sort is stable, rows comparing equal keep their order.
    pub fn sort<I>(self, cols: I) -> DataFrame
    where
        I: IntoIterator<Item = Column>,
    {
        let plan = self.plan.sort(cols);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    pub fn spark_session(self) -> Box<SparkSession> {
        self.spark_session
    }

    /// Returns a new [DataFrame] by adding a column or replacing the existing column that has the same name.
    pub fn with_column(self, col_name: &str, col: Column) -> DataFrame {
        self.with_columns(vec![(col_name, col)])
    }

    /// Returns a new [DataFrame] by adding multiple columns or replacing the existing columns that have the same names.
    pub fn with_columns<I, K>(self, col_map: I) -> DataFrame
    where
        I: IntoIterator<Item = (K, Column)>,
        K: AsRef<str>,
    {
        let plan = self.plan.with_columns(col_map);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a new [DataFrame] by renaming an existing column.
    pub fn with_column_renamed<K, V>(self, existing: K, new: V) -> DataFrame
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.with_columns_renamed(vec![(existing, new)])
    }

    /// Returns a new [DataFrame] by renaming multiple columns.
    pub fn with_columns_renamed<I, K, V>(self, cols: I) -> DataFrame
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let plan = self.plan.with_columns_renamed(cols);

        DataFrame {
            spark_session: self.spark_session,
            plan,
        }
    }

    /// Returns a [DataFrameWriter] struct based on the current [DataFrame]
    pub fn write(self) -> DataFrameWriter {
        DataFrameWriter::new(self)
    }
}

/// Stringify the header and every cell, applying the truncation width
fn format_cells(
    batch: &RecordBatch,
    truncate: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>), SparkError> {
    let cut = |value: String| {
        if truncate == 0 || value.chars().count() <= truncate {
            value
        } else if truncate < 4 {
            value.chars().take(truncate).collect()
        } else {
            let mut short: String = value.chars().take(truncate - 3).collect();
            short.push_str("...");
            short
        }
    };

    let header = batch
        .schema()
        .fields()
        .iter()
        .map(|field| cut(field.name().to_string()))
        .collect();

    let options = FormatOptions::default().with_null("null");
    let formatters = batch
        .columns()
        .iter()
        .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..batch.num_rows())
        .map(|row| {
            formatters
                .iter()
                .map(|formatter| cut(formatter.value(row).to_string()))
                .collect()
        })
        .collect();

    Ok((header, rows))
}

fn width(value: &str) -> usize {
    value.chars().count()
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

fn render_table(header: &[String], rows: &[Vec<String>], right_align: bool) -> String {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            rows.iter()
                .map(|row| width(&row[idx]))
                .chain([width(name), 3])
                .max()
                .unwrap_or(3)
        })
        .collect();

    let sep = format!(
        "+{}+\n",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("+")
    );

    let line = |cells: &[String]| {
        format!(
            "|{}|\n",
            cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, w)| pad(cell, *w, right_align))
                .collect::<Vec<String>>()
                .join("|")
        )
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push_str(&line(header));
    out.push_str(&sep);
    for row in rows {
        out.push_str(&line(row));
    }
    out.push_str(&sep);
    out
}

fn render_vertical(header: &[String], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(0 rows)\n".to_string();
    }

    let name_width = header.iter().map(|h| width(h)).chain([3]).max().unwrap_or(3);
    let data_width = rows
        .iter()
        .flatten()
        .map(|cell| width(cell))
        .chain([3])
        .max()
        .unwrap_or(3);

    let mut out = String::new();
    for (idx, row) in rows.iter().enumerate() {
        let record = format!("-RECORD {idx}");
        out.push_str(&format!("{record:-<w$}\n", w = name_width + data_width + 5));

        for (name, cell) in header.iter().zip(row) {
            out.push_str(&format!(
                " {} | {} \n",
                pad(name, name_width, false),
                pad(cell, data_width, false)
            ));
        }
    }
    out
}

/// Functionality for working with missing data in [DataFrame].
pub struct DataFrameNaFunctions {
    df: DataFrame,
}

impl DataFrameNaFunctions {
    pub(crate) fn new(df: DataFrame) -> DataFrameNaFunctions {
        DataFrameNaFunctions { df }
    }

    pub fn drop(self, how: &str, threshold: Option<usize>, subset: Option<Vec<&str>>) -> DataFrame {
        self.df.dropna(how, threshold, subset)
    }

    pub fn fill<T: ToLiteral>(self, value: T, subset: Option<Vec<&str>>) -> DataFrame {
        self.df.fillna(value, subset)
    }
}

#[cfg(test)]
mod tests {

    use arrow::{
        array::{ArrayRef, AsArray, Float64Array, Int64Array, StringArray},
        datatypes::{DataType, Int64Type},
        record_batch::RecordBatch,
    };
    use std::sync::Arc;

    use super::*;

    use crate::functions::*;
    use crate::utils::assert_batches_eq;
    use crate::SparkSessionBuilder;

    fn setup() -> SparkSession {
        SparkSessionBuilder::default()
            .app_name("rust_df")
            .config("minispark.default.parallelism", "2")
            .build()
            .unwrap()
    }

    fn mock_data() -> RecordBatch {
        let name: ArrayRef = Arc::new(StringArray::from(vec!["Tom", "Alice", "Bob"]));
        let age: ArrayRef = Arc::new(Int64Array::from(vec![14, 23, 16]));

        RecordBatch::try_from_iter(vec![("name", name), ("age", age)]).unwrap()
    }

    fn mood_data() -> RecordBatch {
        let mood: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Happy"),
            Some(""),
            None,
            Some("Sad"),
        ]));
        let text: ArrayRef = Arc::new(StringArray::from(vec![
            Some("Great day!"),
            Some(""),
            None,
            None,
        ]));

        RecordBatch::try_from_iter(vec![("mood", mood), ("text", text)]).unwrap()
    }

    #[tokio::test]
    async fn test_df_select_and_filter() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df
            .filter(col("age").gt(lit(15)))
            .select(["name"])
            .collect()
            .await?;

        let name: ArrayRef = Arc::new(StringArray::from(vec!["Alice", "Bob"]));
        let expected = RecordBatch::try_from_iter(vec![("name", name)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_filter_string_predicates() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df
            .filter(col("name").startswith("A").or(col("name").rlike("^T.m$")))
            .filter(col("name").contains("o").or(col("name").endswith("ce")))
            .select(["name"])
            .collect()
            .await?;

        let name: ArrayRef = Arc::new(StringArray::from(vec!["Tom", "Alice"]));
        let expected = RecordBatch::try_from_iter(vec![("name", name)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_where_with_column() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df
            .with_column("age", col("age") + lit(1))
            .with_column("adult", col("age").ge(lit(18)))
            .where_(col("name").neq(lit("Tom")))
            .collect()
            .await?;

        assert_eq!(3, res.num_columns());
        assert_eq!(
            &Int64Array::from(vec![24, 17]),
            res.column(1).as_primitive::<Int64Type>()
        );
        assert_eq!(
            vec![true, false],
            res.column(2).as_boolean().iter().flatten().collect::<Vec<bool>>()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_df_columns_dtypes_schema() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        assert_eq!(vec!["name", "age"], df.clone().columns().await?);
        assert_eq!(
            vec![
                ("name".to_string(), "string".to_string()),
                ("age".to_string(), "bigint".to_string())
            ],
            df.clone().dtypes().await?
        );
        assert_eq!(&DataType::Utf8, df.clone().schema().await?.field(0).data_type());

        let tree = df.print_schema().await?;
        assert_eq!(
            "root\n |-- name: string (nullable = false)\n |-- age: long (nullable = false)\n",
            tree
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_df_count_head_is_empty() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        assert_eq!(3, df.clone().count().await?);
        assert_eq!(1, df.clone().head(None).await?.num_rows());
        assert_eq!(2, df.clone().head(Some(2)).await?.num_rows());
        assert!(!df.clone().is_empty().await?);
        assert!(df.filter(col("age").gt(lit(100))).is_empty().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_sort_limit() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df.sort([col("age").desc()]).limit(2).collect().await?;

        let name: ArrayRef = Arc::new(StringArray::from(vec!["Alice", "Bob"]));
        let age: ArrayRef = Arc::new(Int64Array::from(vec![23, 16]));
        let expected = RecordBatch::try_from_iter(vec![("name", name), ("age", age)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_group_by_count() -> Result<(), SparkError> {
        let spark = setup();

        let mood: ArrayRef = Arc::new(StringArray::from(vec!["Sad", "Happy", "Sad", "Calm"]));
        let data = RecordBatch::try_from_iter(vec![("mood", mood)])?;

        let res = spark
            .create_dataframe(&data)?
            .group_by(Some(["mood"]))
            .count()
            .order_by([col("count").desc(), col("mood")])
            .collect()
            .await?;

        let mood: ArrayRef = Arc::new(StringArray::from(vec!["Sad", "Calm", "Happy"]));
        let count: ArrayRef = Arc::new(Int64Array::from(vec![2, 1, 1]));
        let expected = RecordBatch::try_from_iter(vec![("mood", mood), ("count", count)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_agg_without_groups() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df
            .agg([avg(col("age")).alias("avg_age"), count(col("name"))])
            .collect()
            .await?;

        assert_eq!("count(name)", res.schema().field(1).name());
        assert_eq!(
            &Float64Array::from(vec![53.0 / 3.0]),
            res.column(0).as_primitive::<arrow::datatypes::Float64Type>()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_df_na_drop_fill() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mood_data())?;

        let res = df
            .select([
                nullif(col("mood"), lit("")).alias("mood"),
                nullif(col("text"), lit("")).alias("text"),
            ])
            .na()
            .drop("all", None, None)
            .na()
            .fill("Unknown", None)
            .collect()
            .await?;

        let mood: ArrayRef = Arc::new(StringArray::from(vec!["Happy", "Sad"]));
        let text: ArrayRef = Arc::new(StringArray::from(vec!["Great day!", "Unknown"]));
        let expected = RecordBatch::try_from_iter(vec![("mood", mood), ("text", text)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_describe() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let res = df.describe(Some(["age"])).collect().await?;

        assert_eq!(5, res.num_rows());
        assert_eq!("summary", res.schema().field(0).name());
        assert_eq!("3", res.column(1).as_string::<i32>().value(0));
        assert_eq!("14", res.column(1).as_string::<i32>().value(3));
        assert_eq!("23", res.column(1).as_string::<i32>().value(4));
        Ok(())
    }

    #[tokio::test]
    async fn test_df_distinct_drop_rename() -> Result<(), SparkError> {
        let spark = setup();

        let mood: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "a"]));
        let n: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 1]));
        let data = RecordBatch::try_from_iter(vec![("mood", mood), ("n", n)])?;

        let res = spark
            .create_dataframe(&data)?
            .distinct()
            .drop(["n"])
            .with_column_renamed("mood", "label")
            .collect()
            .await?;

        let label: ArrayRef = Arc::new(StringArray::from(vec!["a", "b"]));
        let expected = RecordBatch::try_from_iter(vec![("label", label)])?;

        assert_batches_eq(&expected, &res);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_repartition() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        assert_eq!(2, df.clone().collect_partitions().await?.len());
        assert_eq!(3, df.clone().repartition(3).collect_partitions().await?.len());
        assert!(df.repartition(0).collect().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_df_show_string() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark.create_dataframe(&mock_data())?;

        let output = df.clone().show_string(Some(2), None, None).await?;
        let expected = "+-----+---+\n\
                        | name|age|\n\
                        +-----+---+\n\
                        |  Tom| 14|\n\
                        |Alice| 23|\n\
                        +-----+---+\n\
                        only showing top 2 rows\n";
        assert_eq!(expected, output);

        let output = df.show_string(Some(1), Some(0), Some(true)).await?;
        let expected = "-RECORD 0---\n \
                        name | Tom \n \
                        age  | 14  \n\
                        only showing top 1 row\n";
        assert_eq!(expected, output);
        Ok(())
    }

    #[tokio::test]
    async fn test_df_show_truncates_long_values() -> Result<(), SparkError> {
        let spark = setup();

        let text: ArrayRef = Arc::new(StringArray::from(vec![
            "this sentence is definitely longer than twenty characters",
        ]));
        let data = RecordBatch::try_from_iter(vec![("text", text)])?;

        let output = spark.create_dataframe(&data)?.show_string(None, None, None).await?;

        assert!(output.contains("|this sentence is ...|"));
        assert!(!output.contains("only showing"));
        Ok(())
    }

    #[tokio::test]
    async fn test_df_explain() -> Result<(), SparkError> {
        let spark = setup();

        let df = spark
            .create_dataframe(&mock_data())?
            .filter(col("age").gt(lit(15)))
            .select(["name"]);

        let plan = df.explain().await?;

        assert!(plan.starts_with("== Logical Plan =="));
        assert!(plan.contains("Project [name]"));
        assert!(plan.contains("+- Filter (age > 15)"));
        Ok(())
    }
}
