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

use crate::domain::{Proposal, RegistryRecord, Stream, Vote};

/// Sqlx transaction for SQLite.
pub type SqlxTransaction = sqlx::Transaction<'static, sqlx::Sqlite>;

/// Storage abstraction.
#[trait_variant::make(Send)]
pub trait Storage
where
    Self: Clone + Send + Sync + 'static,
{
    /// Create a new transaction. Dropping it without commit rolls it back.
    async fn create_tx(&self) -> Result<SqlxTransaction, sqlx::Error>;

    /// Get the next block to fetch for the given [Stream], if ever saved.
    async fn get_watermark(
        &self,
        stream: Stream,
        tx: &mut SqlxTransaction,
    ) -> Result<Option<u64>, sqlx::Error>;

    /// Save the next block to fetch for the given [Stream]. A value below the stored one is
    /// ignored, i.e. watermarks never move backward.
    async fn save_watermark(
        &self,
        stream: Stream,
        next_block: u64,
        tx: &mut SqlxTransaction,
    ) -> Result<(), sqlx::Error>;

    /// Check whether a proposal with the given id is stored.
    async fn proposal_exists(
        &self,
        id: &str,
        tx: &mut SqlxTransaction,
    ) -> Result<bool, sqlx::Error>;

    /// Save the given proposal if absent; returns whether it has been inserted.
    async fn save_proposal(
        &self,
        proposal: &Proposal,
        tx: &mut SqlxTransaction,
    ) -> Result<bool, sqlx::Error>;

    /// Save the given vote if no vote for the same proposal and voter is stored; returns whether
    /// it has been inserted.
    async fn save_vote(&self, vote: &Vote, tx: &mut SqlxTransaction) -> Result<bool, sqlx::Error>;

    /// Get the registry record for the given lowercase address.
    async fn get_registry_record(
        &self,
        address: &str,
        tx: &mut SqlxTransaction,
    ) -> Result<Option<RegistryRecord>, sqlx::Error>;

    /// Insert or wholesale replace the given registry records.
    async fn save_registry_records(
        &self,
        records: &[RegistryRecord],
        tx: &mut SqlxTransaction,
    ) -> Result<(), sqlx::Error>;
}
