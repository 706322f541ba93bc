// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request gateway for the content API
//!
//! Builds typed requests, executes them with a bounded timeout and
//! parses the responses into cache shapes. A 404 on a content path is a
//! successful empty result: the resource exists in the project but has
//! nothing published yet.

use std::sync::Arc;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::LexioConfig;
use crate::cache::{Credentials, EntryMap, StoreRecord};
use crate::sync::Resource;

use super::signer::RequestSigner;
use super::types::{
    is_valid_hex_color, AuthRequest, AuthResponse, ColorsResponse, ImagesResponse,
    LocalizedResponse, ResourcePayload, Session, StoreResponse,
};

/// Typed HTTP gateway to the content backend.
pub struct Gateway {
    client: Client,
    api_url: String,
    project_id: String,
    signer: Arc<dyn RequestSigner>,
}

impl Gateway {
    /// Creates a gateway from the configuration.
    pub fn new(config: &LexioConfig, signer: Arc<dyn RequestSigner>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!(
                "Lexio/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            signer,
        })
    }

    /// Authenticates with the backend and opens a session.
    ///
    /// The auth endpoint is the only one that carries credentials in the
    /// body instead of signer headers.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, GatewayError> {
        let url = format!("{}/auth", self.api_url);
        let body = AuthRequest {
            api_key: &credentials.api_key,
            api_secret: &credentials.api_secret,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response)?;
        let auth: AuthResponse = response.json().await?;
        debug!(
            "Authenticated: {} tabs, {} stores, {} languages",
            auth.tabs.len(),
            auth.stores.len(),
            auth.available_languages.len()
        );
        Ok(Session::from(auth))
    }

    /// Fetches the content of one resource.
    pub async fn fetch(
        &self,
        token: &str,
        resource: &Resource,
    ) -> Result<ResourcePayload, GatewayError> {
        match resource {
            Resource::Tab(id) => Ok(ResourcePayload::Entries(self.fetch_tab(token, id).await?)),
            Resource::Colors => Ok(ResourcePayload::Entries(self.fetch_colors(token).await?)),
            Resource::Images => Ok(ResourcePayload::Entries(self.fetch_images(token).await?)),
            Resource::Store(id) => Ok(ResourcePayload::Records(
                self.fetch_store(token, id).await?,
            )),
        }
    }

    /// Fetches a translation tab.
    pub async fn fetch_tab(&self, token: &str, tab: &str) -> Result<EntryMap, GatewayError> {
        let url = self.resource_url(tab);
        match self.get_json::<LocalizedResponse>(&url, token).await? {
            Some(body) => Ok(body.into_entries()),
            None => Ok(EntryMap::new()),
        }
    }

    /// Fetches the color set.
    pub async fn fetch_colors(&self, token: &str) -> Result<EntryMap, GatewayError> {
        let url = self.resource_url(crate::sync::COLORS_ID);
        let Some(body) = self.get_json::<ColorsResponse>(&url, token).await? else {
            return Ok(EntryMap::new());
        };
        for item in &body.items {
            if !is_valid_hex_color(&item.value) {
                warn!("Color {} has invalid hex value {:?}", item.key, item.value);
            }
        }
        Ok(body.into_entries())
    }

    /// Fetches the global image set.
    pub async fn fetch_images(&self, token: &str) -> Result<EntryMap, GatewayError> {
        let url = self.resource_url(crate::sync::IMAGES_ID);
        match self.get_json::<ImagesResponse>(&url, token).await? {
            Some(body) => Ok(body.into_entries()),
            None => Ok(EntryMap::new()),
        }
    }

    /// Fetches the records of a data store.
    pub async fn fetch_store(
        &self,
        token: &str,
        store: &str,
    ) -> Result<Vec<StoreRecord>, GatewayError> {
        let url = format!("{}/store/{}/{}", self.api_url, self.project_id, store);
        match self.get_json::<StoreResponse>(&url, token).await? {
            Some(body) => Ok(body.items.into_iter().map(|i| i.into_record()).collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Base URL of the backend.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn resource_url(&self, id: &str) -> String {
        format!("{}/resource/{}/{}", self.api_url, self.project_id, id)
    }

    /// GET with signer headers; `None` means 404 (nothing published).
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<Option<T>, GatewayError> {
        let request = self.signer.authorize(self.client.get(url), token);
        let response = request.send().await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = check_status(response)?;
        Ok(Some(response.json().await?))
    }
}

fn check_status(response: Response) -> Result<Response, GatewayError> {
    match response.status().as_u16() {
        200..=299 => Ok(response),
        401 => Err(GatewayError::Unauthorized),
        status => Err(GatewayError::Http(status)),
    }
}

/// Errors that can occur talking to the content API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP error with status code
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Session token rejected or expired
    #[error("authentication rejected")]
    Unauthorized,

    /// Network/request error (includes response decode failures)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
