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

use crate::{
    application::metrics::Metrics,
    domain::{
        RegistryRecord, normalize_address,
        registry::{RawRegistryRecord, Registry},
        storage::Storage,
    },
};
use anyhow::Context;
use fastrace::trace;
use itertools::{Either, Itertools};
use log::{info, warn};

/// Fetch the full registry snapshot and upsert all valid records in one transaction. If the
/// snapshot cannot be fetched, the stored records are left untouched.
#[trace]
pub async fn refresh_registry(
    registry: &impl Registry,
    storage: &impl Storage,
    metrics: &Metrics,
) -> anyhow::Result<()> {
    let raw_records = registry
        .fetch_records()
        .await
        .context("fetch registry records")?;

    let (records, skipped): (Vec<_>, Vec<_>) =
        raw_records.into_iter().partition_map(registry_record);
    for raw_record in &skipped {
        warn!(name:% = raw_record.name; "skipping registry record without address");
    }

    let mut tx = storage.create_tx().await.context("create transaction")?;
    storage
        .save_registry_records(&records, &mut tx)
        .await
        .context("save registry records")?;
    tx.commit().await.context("commit transaction")?;

    info!(upserted = records.len(), skipped = skipped.len(); "registry refreshed");
    metrics.registry_refreshed(records.len(), skipped.len());

    Ok(())
}

fn registry_record(raw_record: RawRegistryRecord) -> Either<RegistryRecord, RawRegistryRecord> {
    let Some(address) = raw_record.eth_address.as_deref().map(normalize_address) else {
        return Either::Right(raw_record);
    };
    if address.is_empty() {
        return Either::Right(raw_record);
    }

    let RawRegistryRecord {
        eth_address: _,
        total_stake,
        reward_cut,
        fee_cut,
        activation_status,
        name,
        service_uri,
        avatar,
    } = raw_record;

    Either::Left(RegistryRecord {
        address,
        total_stake,
        reward_cut,
        fee_cut,
        activation_status,
        name,
        service_uri,
        avatar,
    })
}
