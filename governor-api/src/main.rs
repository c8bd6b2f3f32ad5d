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

use anyhow::Context;
use governor_api::{
    application,
    config::Config,
    infra::{self, api::AxumApi, storage::Storage},
};
use indexer_common::{config::ConfigExt, infra::pool::sqlite::SqlitePool, telemetry};
use log::{error, info, warn};
use std::panic;
use tokio::{
    select,
    signal::{
        ctrl_c,
        unix::{SignalKind, signal},
    },
};

#[tokio::main]
async fn main() {
    telemetry::init_logging();
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    let result = run().await;
    telemetry::flush();

    if let Err(error) = result {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("register SIGTERM handler")?;
    let config = Config::load().context("load configuration")?;
    info!(config:?; "starting");
    let Config {
        infra_config,
        telemetry_config:
            telemetry::Config {
                tracing_config,
                metrics_config,
            },
    } = config;

    telemetry::init_tracing(tracing_config);
    telemetry::init_metrics(metrics_config);

    let infra::Config {
        api_config,
        storage_config,
    } = infra_config;

    let pool = SqlitePool::new(storage_config)
        .await
        .context("create DB pool for SQLite")?;
    let api = AxumApi::new(api_config, Storage::new(pool.clone()));

    let shutdown = async move {
        select! {
            _ = sigterm.recv() => warn!("SIGTERM received"),
            _ = ctrl_c() => warn!("Ctrl-C received"),
        }
    };

    let result = application::run(api, shutdown)
        .await
        .context("run governor API application");
    pool.close().await;

    result
}
