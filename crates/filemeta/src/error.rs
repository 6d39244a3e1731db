// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for metadata extraction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type '.{extension}' for {name}")]
    UnsupportedFormat { extension: String, name: String },

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Avro error: {0}")]
    Avro(#[from] Box<apache_avro::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<apache_avro::Error> for ExtractError {
    fn from(err: apache_avro::Error) -> Self {
        ExtractError::Avro(Box::new(err))
    }
}

impl ExtractError {
    pub fn unsupported<E: Into<String>, N: Into<String>>(extension: E, name: N) -> Self {
        ExtractError::UnsupportedFormat {
            extension: extension.into(),
            name: name.into(),
        }
    }
}
