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

//! The labeled-text sample the analysis runs over

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use minispark::errors::SparkError;
use minispark::{DataFrame, SparkSession};

pub const MOOD_COLUMN: &str = "mood_type";
pub const TEXT_COLUMN: &str = "user_input";

const ROWS: [(&str, &str); 15] = [
    ("Happy", "I love this product, it works great!"),
    ("Sad", "This is terrible, I'm very disappointed"),
    ("Neutral", "The item is okay, nothing special"),
    ("Happy", "Amazing experience, highly recommended"),
    ("Angry", "Worst purchase ever, total waste of money"),
    ("Happy", "Absolutely fantastic, exceeded expectations"),
    ("Neutral", "It does what it's supposed to do"),
    ("Sad", "Very disappointed with the quality"),
    ("Happy", "Best decision ever, love it so much"),
    ("Angry", "Complete disaster, never buying again"),
    ("Happy", "Wonderful product, very satisfied"),
    ("Neutral", "Average, could be better"),
    ("Sad", "Not what I expected at all"),
    ("Happy", "Excellent quality, highly impressed"),
    ("Angry", "Frustrating experience, poor service"),
];

/// The fixed 15 row sample with nullable `mood_type` and `user_input` string columns
pub fn sample_data() -> Result<RecordBatch, SparkError> {
    let schema = Schema::new(vec![
        Field::new(MOOD_COLUMN, DataType::Utf8, true),
        Field::new(TEXT_COLUMN, DataType::Utf8, true),
    ]);

    let moods: ArrayRef = Arc::new(StringArray::from_iter_values(
        ROWS.iter().map(|(mood, _)| *mood),
    ));
    let texts: ArrayRef = Arc::new(StringArray::from_iter_values(
        ROWS.iter().map(|(_, text)| *text),
    ));

    Ok(RecordBatch::try_new(Arc::new(schema), vec![moods, texts])?)
}

pub fn create_sample_dataframe(spark: &SparkSession) -> Result<DataFrame, SparkError> {
    spark.create_dataframe(&sample_data()?)
}
