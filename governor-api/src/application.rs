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

use crate::domain::Api;
use anyhow::Context;
use log::warn;
use std::future::Future;
use tokio::{select, task};

/// Serve the API until the given shutdown future completes. On shutdown the API is stopped and
/// dropped before returning, so its resources can be released by the caller.
pub async fn run(api: impl Api, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let mut serve_api_task = task::spawn(async move { api.serve().await.context("serving API") });

    select! {
        result = &mut serve_api_task => result
            .context("serve_api_task panicked")
            .and_then(|r| r.context("serve_api_task failed")),

        _ = shutdown => {
            warn!("shutdown requested, stopping API");
            serve_api_task.abort();
            let _ = serve_api_task.await;
            Ok(())
        }
    }
}
