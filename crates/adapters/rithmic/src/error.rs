// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Top-level error types for the Rithmic adapter.

use std::fmt::Debug;

use thiserror::Error;

use crate::{
    common::credential::RithmicCredentialBuilderError, websocket::error::RithmicWsError,
};

#[derive(Error, Debug)]
pub enum RithmicError {
    #[error(transparent)]
    WebSocket(#[from] RithmicWsError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid credential: {0}")]
    Credential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RithmicResult<T> = Result<T, RithmicError>;

impl From<RithmicCredentialBuilderError> for RithmicError {
    fn from(error: RithmicCredentialBuilderError) -> Self {
        Self::Credential(error.to_string())
    }
}
