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
        Enrichment, Proposal, Stream, Support, Vote,
        node::{Node, RawProposalEvent, RawVoteEvent},
        normalize_address, stake_amount,
        storage::{SqlxTransaction, Storage},
        title,
    },
};
use anyhow::Context;
use fastrace::trace;
use log::{debug, info, warn};

/// Outcome of ingesting one [Stream].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingested {
    pub stored: usize,
    pub skipped: usize,
    /// The watermark after ingestion.
    pub next_block: u64,
}

/// Ingest the `ProposalCreated` events from the proposal watermark (or the given start block) up
/// to and including the given block. All proposals and the advanced watermark are committed in
/// one transaction.
#[trace(properties = { "to_block": "{to_block}" })]
pub async fn ingest_proposals(
    node: &impl Node,
    storage: &impl Storage,
    start_block: u64,
    to_block: u64,
    metrics: &Metrics,
) -> anyhow::Result<Ingested> {
    let mut tx = storage.create_tx().await.context("create transaction")?;

    let from_block = storage
        .get_watermark(Stream::Proposals, &mut tx)
        .await
        .context("get proposals watermark")?
        .unwrap_or(start_block);
    if from_block > to_block {
        debug!(from_block, to_block; "no new blocks for proposals");
        return Ok(Ingested {
            stored: 0,
            skipped: 0,
            next_block: from_block,
        });
    }

    let events = node
        .proposal_created_events(from_block, to_block)
        .await
        .context("get ProposalCreated events")?;
    debug!(from_block, to_block, count = events.len(); "fetched ProposalCreated events");

    let mut stored = 0;
    let mut skipped = 0;
    for event in events {
        match ingest_proposal(event, storage, &mut tx).await? {
            true => stored += 1,
            false => skipped += 1,
        }
    }

    let next_block = to_block + 1;
    storage
        .save_watermark(Stream::Proposals, next_block, &mut tx)
        .await
        .context("save proposals watermark")?;
    tx.commit().await.context("commit transaction")?;

    info!(from_block, to_block, stored, skipped; "proposals ingested");
    metrics.stored(Stream::Proposals, stored);
    metrics.skipped(Stream::Proposals, skipped);
    metrics.set_watermark(Stream::Proposals, next_block);

    Ok(Ingested {
        stored,
        skipped,
        next_block,
    })
}

/// Ingest the `VoteCast` events from the vote watermark (or the given start block) up to and
/// including the given block. Votes for unknown proposals are discarded. All votes and the
/// advanced watermark are committed in one transaction.
#[trace(properties = { "to_block": "{to_block}" })]
pub async fn ingest_votes(
    node: &impl Node,
    storage: &impl Storage,
    start_block: u64,
    to_block: u64,
    metrics: &Metrics,
) -> anyhow::Result<Ingested> {
    let mut tx = storage.create_tx().await.context("create transaction")?;

    let from_block = storage
        .get_watermark(Stream::Votes, &mut tx)
        .await
        .context("get votes watermark")?
        .unwrap_or(start_block);
    if from_block > to_block {
        debug!(from_block, to_block; "no new blocks for votes");
        return Ok(Ingested {
            stored: 0,
            skipped: 0,
            next_block: from_block,
        });
    }

    let events = node
        .vote_cast_events(from_block, to_block)
        .await
        .context("get VoteCast events")?;
    debug!(from_block, to_block, count = events.len(); "fetched VoteCast events");

    let mut stored = 0;
    let mut skipped = 0;
    for event in events {
        match ingest_vote(event, storage, &mut tx).await? {
            true => stored += 1,
            false => skipped += 1,
        }
    }

    let next_block = to_block + 1;
    storage
        .save_watermark(Stream::Votes, next_block, &mut tx)
        .await
        .context("save votes watermark")?;
    tx.commit().await.context("commit transaction")?;

    info!(from_block, to_block, stored, skipped; "votes ingested");
    metrics.stored(Stream::Votes, stored);
    metrics.skipped(Stream::Votes, skipped);
    metrics.set_watermark(Stream::Votes, next_block);

    Ok(Ingested {
        stored,
        skipped,
        next_block,
    })
}

/// Returns whether the proposal has been stored.
async fn ingest_proposal(
    event: RawProposalEvent,
    storage: &impl Storage,
    tx: &mut SqlxTransaction,
) -> anyhow::Result<bool> {
    let RawProposalEvent {
        proposal_id,
        proposer,
        description,
        block_number,
        timestamp,
    } = event;

    let Some(id) = proposal_id else {
        warn!(block_number; "skipping proposal without id");
        return Ok(false);
    };

    if storage
        .proposal_exists(&id, tx)
        .await
        .context("check whether proposal exists")?
    {
        debug!(id:%; "skipping already stored proposal");
        return Ok(false);
    }

    let proposer_address = normalize_address(&proposer);
    let Enrichment { name, avatar } = storage
        .get_registry_record(&proposer_address, tx)
        .await
        .context("get registry record for proposer")?
        .into();

    let proposal = Proposal {
        title: title(&description),
        id,
        description,
        proposer_address,
        proposer_name: name,
        proposer_avatar: avatar,
        created_at: timestamp,
        block_number,
    };

    let stored = storage
        .save_proposal(&proposal, tx)
        .await
        .context("save proposal")?;
    if stored {
        debug!(id:% = proposal.id, block_number; "proposal stored");
    }

    Ok(stored)
}

/// Returns whether the vote has been stored.
async fn ingest_vote(
    event: RawVoteEvent,
    storage: &impl Storage,
    tx: &mut SqlxTransaction,
) -> anyhow::Result<bool> {
    let RawVoteEvent {
        proposal_id,
        voter,
        support,
        weight,
        block_number,
    } = event;

    let (Some(proposal_id), Some(voter)) = (proposal_id, voter) else {
        warn!(block_number; "skipping vote without proposal id or voter");
        return Ok(false);
    };

    if !storage
        .proposal_exists(&proposal_id, tx)
        .await
        .context("check whether proposal exists")?
    {
        warn!(proposal_id:%, block_number; "skipping vote for unknown proposal");
        return Ok(false);
    }

    let stake_amount = match stake_amount(&weight) {
        Ok(stake_amount) => stake_amount,

        Err(error) => {
            warn!(error:%, proposal_id:%, weight:%; "skipping vote with invalid weight");
            return Ok(false);
        }
    };

    let voter_address = normalize_address(&voter);
    let Enrichment { name, avatar } = storage
        .get_registry_record(&voter_address, tx)
        .await
        .context("get registry record for voter")?
        .into();

    let vote = Vote {
        proposal_id,
        voter_address,
        voter_name: name,
        voter_avatar: avatar,
        support: Support::from(support),
        stake_amount,
        block_number,
    };

    let stored = storage.save_vote(&vote, tx).await.context("save vote")?;
    if stored {
        debug!(
            proposal_id:% = vote.proposal_id,
            voter_address:% = vote.voter_address;
            "vote stored"
        );
    } else {
        debug!(
            proposal_id:% = vote.proposal_id,
            voter_address:% = vote.voter_address;
            "skipping already stored vote"
        );
    }

    Ok(stored)
}
