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

use fastrace::collector::Config as CollectorConfig;
use fastrace_opentelemetry::OpenTelemetryReporter;
use log::{LevelFilter, error, info};
use logforth::{
    append::{FastraceEvent, Stdout},
    diagnostic::FastraceDiagnostic,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::InstrumentationScope;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use serde::Deserialize;
use std::{borrow::Cow, env, net::IpAddr};

const LOG_LEVEL_VAR: &str = "RUST_LOG";

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "tracing")]
    pub tracing_config: TracingConfig,

    #[serde(rename = "metrics")]
    pub metrics_config: MetricsConfig,
}

/// Tracing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    pub enabled: bool,
    pub service_name: String,
    pub otlp_exporter_endpoint: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: IpAddr,
    pub port: u16,
}

/// Initialize logging: log records go to stdout, enriched with the current trace ID, and are also
/// attached as events to the current span. The level is taken from `RUST_LOG`, default `info`.
pub fn init_logging() {
    let level = env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    logforth::starter_log::builder()
        .dispatch(|d| {
            d.diagnostic(FastraceDiagnostic::default())
                .append(Stdout::default())
        })
        .dispatch(|d| d.append(FastraceEvent::default()))
        .apply();

    log::set_max_level(level);
}

/// Initialize tracing: if enabled, spans are exported via OTLP/gRPC.
pub fn init_tracing(config: TracingConfig) {
    let TracingConfig {
        enabled,
        service_name,
        otlp_exporter_endpoint,
    } = config;

    if !enabled {
        return;
    }

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_exporter_endpoint)
        .build();
    let exporter = match exporter {
        Ok(exporter) => exporter,

        Err(error) => {
            error!(error:%, otlp_exporter_endpoint:%; "cannot create OTLP span exporter");
            return;
        }
    };

    let resource = Resource::builder().with_service_name(service_name).build();
    let scope = InstrumentationScope::builder(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .build();
    let reporter = OpenTelemetryReporter::new(exporter, Cow::Owned(resource), scope);
    fastrace::set_reporter(reporter, CollectorConfig::default());

    info!(otlp_exporter_endpoint:%; "tracing initialized");
}

/// Initialize metrics: if enabled, a Prometheus scrape endpoint is exposed at the configured
/// address and port. Must be called from within a Tokio runtime.
pub fn init_metrics(config: MetricsConfig) {
    let MetricsConfig {
        enabled,
        address,
        port,
    } = config;

    if !enabled {
        return;
    }

    match PrometheusBuilder::new()
        .with_http_listener((address, port))
        .install()
    {
        Ok(()) => info!(address:%, port; "metrics initialized"),
        Err(error) => error!(error:%; "cannot install Prometheus exporter"),
    }
}

/// Flush pending spans, e.g. before the process exits.
pub fn flush() {
    fastrace::flush();
}
