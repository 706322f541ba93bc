// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public API
//!
//! The [`Lexio`] client, its configuration, the error type and the
//! update delivery surface.

mod config;
mod error;
mod events;
mod lexio;

pub use config::LexioConfig;
pub use error::{LexioError, LexioResult};
pub use events::{
    CallbackHandler, HandlerId, ResourceChanged, ResourceUpdate, UpdateDispatcher, UpdateHandler,
    UpdatePayload,
};
pub use lexio::Lexio;
