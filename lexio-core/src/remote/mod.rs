// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote access module
//!
//! Typed requests against the content API: authentication, localized
//! resources, color and image sets, and data stores. Authentication
//! material is attached through the [`RequestSigner`] seam so the
//! engine never sees how requests are signed.

mod gateway;
mod signer;
mod types;

pub use gateway::{Gateway, GatewayError};
pub use signer::{BearerSigner, RequestSigner};
pub use types::{is_valid_hex_color, AuthResponse, ResourcePayload, Session};
