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

use crate::domain::{self, Proposal, Vote};
use fastrace::trace;
use indexer_common::infra::pool::sqlite::SqlitePool;
use indoc::indoc;

/// SQLite based implementation of [domain::storage::Storage], read-only.
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
    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.pool)
            .await?;
        Ok(())
    }

    #[trace]
    async fn get_proposals(&self) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                id,
                title,
                description,
                proposer_address,
                proposer_name,
                proposer_avatar,
                created_at
            FROM proposals
            ORDER BY rowid
        "};

        let proposals =
            sqlx::query_as::<_, (String, String, String, String, String, String, i64)>(query)
                .fetch_all(&*self.pool)
                .await?
                .into_iter()
                .map(
                    |(
                        id,
                        title,
                        description,
                        proposer_address,
                        proposer_name,
                        proposer_avatar,
                        created_at,
                    )| Proposal {
                        id,
                        title,
                        description,
                        proposer_address,
                        proposer_name,
                        proposer_avatar,
                        created_at,
                        votes: vec![],
                    },
                )
                .collect();

        Ok(proposals)
    }

    #[trace(properties = { "proposal_id": "{proposal_id}" })]
    async fn get_votes_by_proposal_id(&self, proposal_id: &str) -> Result<Vec<Vote>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                voter_address,
                voter_name,
                voter_avatar,
                support,
                stake_amount
            FROM votes
            WHERE proposal_id = $1
            ORDER BY id
        "};

        let votes = sqlx::query_as::<_, (String, String, String, String, f64)>(query)
            .bind(proposal_id)
            .fetch_all(&*self.pool)
            .await?
            .into_iter()
            .map(
                |(voter_address, voter_name, voter_avatar, support, stake_amount)| Vote {
                    voter_address,
                    voter_name,
                    voter_avatar,
                    support,
                    stake_amount,
                },
            )
            .collect();

        Ok(votes)
    }
}
