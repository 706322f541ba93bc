// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the Lexio API layer. Background work never
//! surfaces these: sync failures are logged and reported as `false`
//! return values while the cache keeps serving. Only construction and
//! explicit configuration calls return errors.

use thiserror::Error;

use crate::cache::CacheError;
use crate::realtime::ChannelError;
use crate::remote::GatewayError;

/// Unified error type for Lexio operations.
#[derive(Error, Debug)]
pub enum LexioError {
    /// Persistence operation failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// API request failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Realtime channel failed.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for Lexio operations.
pub type LexioResult<T> = Result<T, LexioError>;
