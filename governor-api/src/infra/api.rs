// This file is part of governor-indexer.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod v1;

use crate::domain::{Api, storage::Storage};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use log::{info, warn};
use metrics::{Counter, counter};
use serde::Deserialize;
use std::{io, net::IpAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

/// [Api] implementation based on axum and async-graphql.
pub struct AxumApi<S> {
    config: Config,
    storage: S,
}

impl<S> AxumApi<S>
where
    S: Storage,
{
    pub fn new(config: Config, storage: S) -> Self {
        Self { config, storage }
    }
}

impl<S> Api for AxumApi<S>
where
    S: Storage,
{
    type Error = AxumApiError;

    async fn serve(self) -> Result<(), Self::Error> {
        let Config {
            address,
            port,
            request_body_limit,
            max_complexity,
            max_depth,
        } = self.config;

        let app = make_app(
            self.storage,
            max_complexity,
            max_depth,
            request_body_limit as usize,
        );

        let listener = TcpListener::bind((address, port))
            .await
            .map_err(AxumApiError::Bind)?;
        info!(address:?, port; "listening to TCP connections");

        axum::serve(listener, app)
            .await
            .map_err(AxumApiError::Serve)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    #[serde(with = "byte_unit_serde")]
    pub request_body_limit: u64,
    pub max_complexity: usize,
    pub max_depth: usize,
}

#[derive(Debug, Error)]
pub enum AxumApiError {
    #[error("cannot bind tcp listener")]
    Bind(#[source] io::Error),

    #[error("cannot serve API")]
    Serve(#[source] io::Error),
}

/// API metrics.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub proposals_queries: Counter,
    pub failed_queries: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            proposals_queries: counter!("governor_api_proposals_queries"),
            failed_queries: counter!("governor_api_failed_queries"),
        }
    }
}

fn make_app<S>(
    storage: S,
    max_complexity: usize,
    max_depth: usize,
    request_body_limit: usize,
) -> Router
where
    S: Storage,
{
    let v1_app = v1::make_app(storage.clone(), max_complexity, max_depth);

    Router::new()
        .route("/ready", get(ready::<S>))
        .nest("/api/v1", v1_app)
        .with_state(storage)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(request_body_limit))
                .layer(CorsLayer::permissive()),
        )
}

async fn ready<S>(State(storage): State<S>) -> impl IntoResponse
where
    S: Storage,
{
    match storage.ping().await {
        Ok(()) => StatusCode::OK.into_response(),

        Err(error) => {
            warn!(error:%; "database not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "database not ready").into_response()
        }
    }
}
