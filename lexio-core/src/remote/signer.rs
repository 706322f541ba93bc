// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request signing seam
//!
//! How authentication material is attached to outgoing traffic is opaque
//! to the engine. The default signer speaks plain bearer tokens; hosts
//! with custom auth schemes inject their own implementation.

use reqwest::RequestBuilder;

/// Attaches authentication material to outgoing requests and frames.
pub trait RequestSigner: Send + Sync {
    /// Attaches authorization to an API request.
    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder;

    /// Token string embedded in the realtime handshake frame.
    fn channel_token(&self, token: &str) -> String;
}

/// Default signer: standard `Authorization: Bearer` headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerSigner;

impl RequestSigner for BearerSigner {
    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }

    fn channel_token(&self, token: &str) -> String {
        token.to_string()
    }
}
