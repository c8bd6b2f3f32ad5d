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

mod ingestion;
mod metrics;
mod registry;

pub use self::ingestion::{Ingested, ingest_proposals, ingest_votes};
pub use self::metrics::Metrics;
pub use self::registry::refresh_registry;

use crate::domain::{Stream, node::Node, registry::Registry, storage::Storage};
use anyhow::Context;
use fastrace::{Span, future::FutureExt, prelude::SpanContext};
use log::{error, info, warn};
use serde::Deserialize;
use std::{future::Future, pin::pin, time::Duration};
use tokio::{select, time::sleep};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Default watermark for streams which have never been ingested.
    pub start_block: u64,

    /// Time to wait after a cycle has completed before starting the next one.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

/// Run a cycle at start and then after each interval, until the given shutdown future completes.
/// Cycles never overlap. A failed cycle is logged and the next one runs as scheduled.
pub async fn run(
    config: Config,
    node: impl Node,
    registry: impl Registry,
    storage: impl Storage,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let Config {
        start_block,
        interval,
    } = config;

    let mut tx = storage.create_tx().await.context("create transaction")?;
    let proposals_watermark = storage
        .get_watermark(Stream::Proposals, &mut tx)
        .await
        .context("get proposals watermark")?;
    let votes_watermark = storage
        .get_watermark(Stream::Votes, &mut tx)
        .await
        .context("get votes watermark")?;
    drop(tx);

    info!(
        start_block,
        proposals_watermark:?,
        votes_watermark:?,
        interval:?;
        "starting indexing"
    );
    let metrics = Metrics::new(proposals_watermark, votes_watermark);

    let node = &node;
    let registry = &registry;
    let storage = &storage;
    let metrics = &metrics;
    schedule(interval, shutdown, move || async move {
        match run_cycle(start_block, node, registry, storage, metrics)
            .in_span(Span::root("cycle", SpanContext::random()))
            .await
        {
            Ok(()) => metrics.cycle_completed(),

            Err(error) => {
                let error = format!("{error:#}");
                error!(error; "cycle failed");
                metrics.cycle_failed();
            }
        }
    })
    .await;

    Ok(())
}

/// Run one cycle: refresh the registry, then ingest proposals, then votes, all up to the current
/// chain head. A failed registry refresh is logged and the cycle continues with the cached
/// records; a failed ingestion ends the cycle with an error.
pub async fn run_cycle(
    start_block: u64,
    node: &impl Node,
    registry: &impl Registry,
    storage: &impl Storage,
    metrics: &Metrics,
) -> anyhow::Result<()> {
    if let Err(error) = refresh_registry(registry, storage, metrics).await {
        let error = format!("{error:#}");
        warn!(error; "cannot refresh registry, using cached records");
        metrics.registry_refresh_failed();
    }

    let to_block = node
        .latest_block_number()
        .await
        .context("get latest block number")?;

    ingest_proposals(node, storage, start_block, to_block, metrics)
        .await
        .context("ingest proposals")?;
    ingest_votes(node, storage, start_block, to_block, metrics)
        .await
        .context("ingest votes")?;

    Ok(())
}

async fn schedule<C, F>(interval: Duration, shutdown: impl Future<Output = ()>, mut cycle: C)
where
    C: FnMut() -> F,
    F: Future<Output = ()>,
{
    let mut shutdown = pin!(shutdown);

    loop {
        let cycle_and_wait = async {
            cycle().await;
            sleep(interval).await;
        };

        select! {
            _ = cycle_and_wait => {}

            _ = &mut shutdown => {
                warn!("shutdown requested, stopping indexing");
                return;
            }
        }
    }
}
