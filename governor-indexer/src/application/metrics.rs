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

use crate::domain::Stream;
use metrics::{Counter, Gauge, counter, gauge};

/// Metrics of the ingestion cycles.
#[derive(Debug, Clone)]
pub struct Metrics {
    cycles_completed: Counter,
    cycles_failed: Counter,
    proposals_stored: Counter,
    votes_stored: Counter,
    proposal_events_skipped: Counter,
    vote_events_skipped: Counter,
    registry_records_upserted: Counter,
    registry_records_skipped: Counter,
    registry_refreshes_failed: Counter,
    proposals_watermark: Gauge,
    votes_watermark: Gauge,
}

impl Metrics {
    pub fn new(proposals_watermark: Option<u64>, votes_watermark: Option<u64>) -> Self {
        let metrics = Self::default();

        if let Some(next_block) = proposals_watermark {
            metrics.set_watermark(Stream::Proposals, next_block);
        }
        if let Some(next_block) = votes_watermark {
            metrics.set_watermark(Stream::Votes, next_block);
        }

        metrics
    }

    pub fn cycle_completed(&self) {
        self.cycles_completed.increment(1);
    }

    pub fn cycle_failed(&self) {
        self.cycles_failed.increment(1);
    }

    pub fn stored(&self, stream: Stream, count: usize) {
        match stream {
            Stream::Proposals => self.proposals_stored.increment(count as u64),
            Stream::Votes => self.votes_stored.increment(count as u64),
        }
    }

    pub fn skipped(&self, stream: Stream, count: usize) {
        match stream {
            Stream::Proposals => self.proposal_events_skipped.increment(count as u64),
            Stream::Votes => self.vote_events_skipped.increment(count as u64),
        }
    }

    pub fn set_watermark(&self, stream: Stream, next_block: u64) {
        match stream {
            Stream::Proposals => self.proposals_watermark.set(next_block as f64),
            Stream::Votes => self.votes_watermark.set(next_block as f64),
        }
    }

    pub fn registry_refreshed(&self, upserted: usize, skipped: usize) {
        self.registry_records_upserted.increment(upserted as u64);
        self.registry_records_skipped.increment(skipped as u64);
    }

    pub fn registry_refresh_failed(&self) {
        self.registry_refreshes_failed.increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            cycles_completed: counter!("governor_indexer_cycles_completed"),
            cycles_failed: counter!("governor_indexer_cycles_failed"),
            proposals_stored: counter!("governor_indexer_proposals_stored"),
            votes_stored: counter!("governor_indexer_votes_stored"),
            proposal_events_skipped: counter!(
                "governor_indexer_events_skipped",
                "stream" => Stream::Proposals.as_str()
            ),
            vote_events_skipped: counter!(
                "governor_indexer_events_skipped",
                "stream" => Stream::Votes.as_str()
            ),
            registry_records_upserted: counter!("governor_indexer_registry_records_upserted"),
            registry_records_skipped: counter!("governor_indexer_registry_records_skipped"),
            registry_refreshes_failed: counter!("governor_indexer_registry_refreshes_failed"),
            proposals_watermark: gauge!(
                "governor_indexer_watermark",
                "stream" => Stream::Proposals.as_str()
            ),
            votes_watermark: gauge!(
                "governor_indexer_watermark",
                "stream" => Stream::Votes.as_str()
            ),
        }
    }
}
