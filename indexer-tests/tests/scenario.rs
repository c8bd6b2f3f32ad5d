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

//! End-to-end scenarios running indexing cycles against mocked chain and registry sources and
//! reading the results back through the API domain.

use anyhow::Context;
use governor_api::domain::list_proposals;
use governor_indexer::{
    application::{Metrics, run_cycle},
    domain::{
        node::{Node, RawProposalEvent, RawVoteEvent},
        registry::{RawRegistryRecord, Registry},
    },
};
use indexer_common::infra::{
    migrations,
    pool::sqlite::{Config, SqlitePool},
};
use indexer_tests::e2e::{self, check_proposals};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tempfile::TempDir;
use thiserror::Error;

const START_BLOCK: u64 = 100;

#[tokio::test]
async fn test_proposal_with_vote() -> anyhow::Result<()> {
    let (_temp_dir, pool) = pool().await?;

    let node = MockNode {
        latest_block: 110,
        proposals: vec![proposal_event("1", "0xAAA", "# Increase cap\nDetails here", 100)],
        votes: vec![vote_event("1", "0xBBB", 1, "1000000000000000000000", 101)],
    };
    let registry = MockRegistry::new(vec![registry_record("0xBBB", "orchestrator")]);
    let indexer_storage = governor_indexer::infra::storage::Storage::new(pool.clone());
    let metrics = Metrics::default();

    run_cycle(START_BLOCK, &node, &registry, &indexer_storage, &metrics)
        .await
        .context("run cycle")?;
    // A second cycle over the same head stores nothing new.
    run_cycle(START_BLOCK, &node, &registry, &indexer_storage, &metrics)
        .await
        .context("run cycle again")?;

    let api_storage = governor_api::infra::storage::Storage::new(pool.clone());
    let proposals = list_proposals(&api_storage)
        .await
        .context("list proposals")?;

    assert_eq!(proposals.len(), 1);
    let proposal = &proposals[0];
    assert_eq!(proposal.id, "1");
    assert_eq!(proposal.title, "Increase cap");
    assert_eq!(proposal.description, "# Increase cap\nDetails here");
    assert_eq!(proposal.proposer_address, "0xaaa");
    assert_eq!(proposal.proposer_name, "");
    assert_eq!(proposal.created_at, 1_700_000_100);

    assert_eq!(proposal.votes.len(), 1);
    let vote = &proposal.votes[0];
    assert_eq!(vote.voter_address, "0xbbb");
    assert_eq!(vote.voter_name, "orchestrator");
    assert_eq!(vote.voter_avatar, "orchestrator.png");
    assert_eq!(vote.support, "Yes");
    assert_eq!(vote.stake_amount, 1000.0);

    let proposals = proposals
        .into_iter()
        .map(e2e::Proposal::from)
        .collect::<Vec<_>>();
    check_proposals(&proposals)?;

    Ok(())
}

#[tokio::test]
async fn test_registry_failure_keeps_cache() -> anyhow::Result<()> {
    let (_temp_dir, pool) = pool().await?;

    let node = MockNode {
        latest_block: 110,
        proposals: vec![proposal_event("1", "0xAAA", "Cached", 100)],
        votes: vec![],
    };
    let registry = MockRegistry::new(vec![registry_record("0xAAA", "cached")]);
    let storage = governor_indexer::infra::storage::Storage::new(pool.clone());
    let metrics = Metrics::default();

    run_cycle(START_BLOCK, &node, &registry, &storage, &metrics).await?;

    registry.fail.store(true, Ordering::SeqCst);
    run_cycle(START_BLOCK, &node, &registry, &storage, &metrics)
        .await
        .context("cycle with failing registry")?;

    let names = sqlx::query_scalar::<_, String>("SELECT name FROM registry_records")
        .fetch_all(&*pool)
        .await?;
    assert_eq!(names, vec!["cached"]);

    let api_storage = governor_api::infra::storage::Storage::new(pool.clone());
    let proposals = list_proposals(&api_storage).await?;
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].proposer_name, "cached");

    Ok(())
}

async fn pool() -> anyhow::Result<(TempDir, SqlitePool)> {
    let temp_dir = tempfile::tempdir().context("cannot create tempdir")?;
    let cnn_url = temp_dir.path().join("governor.sqlite").display().to_string();

    let pool = SqlitePool::new(Config { cnn_url })
        .await
        .context("create pool")?;
    migrations::sqlite::run(&pool)
        .await
        .context("run migrations")?;

    Ok((temp_dir, pool))
}

#[derive(Debug, Error)]
#[error("mock failure")]
struct MockError;

#[derive(Clone)]
struct MockNode {
    latest_block: u64,
    proposals: Vec<RawProposalEvent>,
    votes: Vec<RawVoteEvent>,
}

impl Node for MockNode {
    type Error = MockError;

    async fn latest_block_number(&self) -> Result<u64, Self::Error> {
        Ok(self.latest_block)
    }

    async fn proposal_created_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawProposalEvent>, Self::Error> {
        let events = self
            .proposals
            .iter()
            .filter(|event| (from_block..=to_block).contains(&event.block_number))
            .cloned()
            .collect();
        Ok(events)
    }

    async fn vote_cast_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawVoteEvent>, Self::Error> {
        let events = self
            .votes
            .iter()
            .filter(|event| (from_block..=to_block).contains(&event.block_number))
            .cloned()
            .collect();
        Ok(events)
    }
}

#[derive(Clone)]
struct MockRegistry {
    records: Arc<Vec<RawRegistryRecord>>,
    fail: Arc<AtomicBool>,
}

impl MockRegistry {
    fn new(records: Vec<RawRegistryRecord>) -> Self {
        Self {
            records: Arc::new(records),
            fail: Default::default(),
        }
    }
}

impl Registry for MockRegistry {
    type Error = MockError;

    async fn fetch_records(&self) -> Result<Vec<RawRegistryRecord>, Self::Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MockError);
        }

        Ok(self.records.as_ref().clone())
    }
}

fn proposal_event(
    id: &str,
    proposer: &str,
    description: &str,
    block_number: u64,
) -> RawProposalEvent {
    RawProposalEvent {
        proposal_id: Some(id.to_owned()),
        proposer: proposer.to_owned(),
        description: description.to_owned(),
        block_number,
        timestamp: 1_700_000_000 + block_number,
    }
}

fn vote_event(
    proposal_id: &str,
    voter: &str,
    support: i64,
    weight: &str,
    block_number: u64,
) -> RawVoteEvent {
    RawVoteEvent {
        proposal_id: Some(proposal_id.to_owned()),
        voter: Some(voter.to_owned()),
        support,
        weight: weight.to_owned(),
        block_number,
    }
}

fn registry_record(address: &str, name: &str) -> RawRegistryRecord {
    RawRegistryRecord {
        eth_address: Some(address.to_owned()),
        total_stake: 1000.0,
        name: name.to_owned(),
        avatar: format!("{name}.png"),
        ..Default::default()
    }
}
