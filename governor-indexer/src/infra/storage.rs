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

use crate::domain::{self, Proposal, RegistryRecord, Stream, Vote, storage::SqlxTransaction};
use fastrace::trace;
use indexer_common::infra::pool::sqlite::SqlitePool;
use indoc::indoc;

/// SQLite based implementation of [domain::storage::Storage].
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl domain::storage::Storage for Storage {
    #[trace]
    async fn create_tx(&self) -> Result<SqlxTransaction, sqlx::Error> {
        self.pool.begin().await
    }

    #[trace(properties = { "stream": "{stream}" })]
    async fn get_watermark(
        &self,
        stream: Stream,
        tx: &mut SqlxTransaction,
    ) -> Result<Option<u64>, sqlx::Error> {
        let query = indoc! {"
            SELECT next_block
            FROM watermarks
            WHERE stream = $1
        "};

        let next_block = sqlx::query_as::<_, (i64,)>(query)
            .bind(stream.as_str())
            .fetch_optional(&mut **tx)
            .await?
            .map(|(next_block,)| next_block as u64);

        Ok(next_block)
    }

    #[trace(properties = { "stream": "{stream}", "next_block": "{next_block}" })]
    async fn save_watermark(
        &self,
        stream: Stream,
        next_block: u64,
        tx: &mut SqlxTransaction,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            INSERT INTO watermarks (stream, next_block)
            VALUES ($1, $2)
            ON CONFLICT (stream) DO UPDATE
            SET next_block = MAX(next_block, excluded.next_block)
        "};

        sqlx::query(query)
            .bind(stream.as_str())
            .bind(next_block as i64)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    #[trace(properties = { "id": "{id}" })]
    async fn proposal_exists(
        &self,
        id: &str,
        tx: &mut SqlxTransaction,
    ) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            SELECT EXISTS (
                SELECT 1
                FROM proposals
                WHERE id = $1
            )
        "};

        let (exists,) = sqlx::query_as::<_, (bool,)>(query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;

        Ok(exists)
    }

    #[trace]
    async fn save_proposal(
        &self,
        proposal: &Proposal,
        tx: &mut SqlxTransaction,
    ) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            INSERT INTO proposals (
                id,
                title,
                description,
                proposer_address,
                proposer_name,
                proposer_avatar,
                created_at,
                block_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
        "};

        let result = sqlx::query(query)
            .bind(&proposal.id)
            .bind(&proposal.title)
            .bind(&proposal.description)
            .bind(&proposal.proposer_address)
            .bind(&proposal.proposer_name)
            .bind(&proposal.proposer_avatar)
            .bind(proposal.created_at as i64)
            .bind(proposal.block_number as i64)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[trace]
    async fn save_vote(&self, vote: &Vote, tx: &mut SqlxTransaction) -> Result<bool, sqlx::Error> {
        let query = indoc! {"
            INSERT INTO votes (
                proposal_id,
                voter_address,
                voter_name,
                voter_avatar,
                support,
                stake_amount,
                block_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (proposal_id, voter_address) DO NOTHING
        "};

        let result = sqlx::query(query)
            .bind(&vote.proposal_id)
            .bind(&vote.voter_address)
            .bind(&vote.voter_name)
            .bind(&vote.voter_avatar)
            .bind(vote.support.to_string())
            .bind(vote.stake_amount)
            .bind(vote.block_number as i64)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[trace(properties = { "address": "{address}" })]
    async fn get_registry_record(
        &self,
        address: &str,
        tx: &mut SqlxTransaction,
    ) -> Result<Option<RegistryRecord>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                address,
                total_stake,
                reward_cut,
                fee_cut,
                activation_status,
                name,
                service_uri,
                avatar
            FROM registry_records
            WHERE address = $1
        "};

        let record = sqlx::query_as::<_, (String, f64, f64, f64, bool, String, String, String)>(
            query,
        )
        .bind(address)
        .fetch_optional(&mut **tx)
        .await?
        .map(
            |(
                address,
                total_stake,
                reward_cut,
                fee_cut,
                activation_status,
                name,
                service_uri,
                avatar,
            )| RegistryRecord {
                address,
                total_stake,
                reward_cut,
                fee_cut,
                activation_status,
                name,
                service_uri,
                avatar,
            },
        );

        Ok(record)
    }

    #[trace]
    async fn save_registry_records(
        &self,
        records: &[RegistryRecord],
        tx: &mut SqlxTransaction,
    ) -> Result<(), sqlx::Error> {
        let query = indoc! {"
            INSERT INTO registry_records (
                address,
                total_stake,
                reward_cut,
                fee_cut,
                activation_status,
                name,
                service_uri,
                avatar
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (address) DO UPDATE SET
                total_stake = excluded.total_stake,
                reward_cut = excluded.reward_cut,
                fee_cut = excluded.fee_cut,
                activation_status = excluded.activation_status,
                name = excluded.name,
                service_uri = excluded.service_uri,
                avatar = excluded.avatar
        "};

        for record in records {
            sqlx::query(query)
                .bind(&record.address)
                .bind(record.total_stake)
                .bind(record.reward_cut)
                .bind(record.fee_cut)
                .bind(record.activation_status)
                .bind(&record.name)
                .bind(&record.service_uri)
                .bind(&record.avatar)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}
