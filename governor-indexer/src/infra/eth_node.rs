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

use crate::domain::node::{Node, RawProposalEvent, RawVoteEvent};
use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, Filter, Log},
    sol,
    sol_types::SolEvent,
    transports::TransportError,
};
use fastrace::trace;
use indexer_common::error::BoxError;
use log::{debug, warn};
use reqwest::Url;
use serde::Deserialize;
use std::{collections::HashMap, future::Future, iter};
use thiserror::Error;

sol! {
    event ProposalCreated(
        uint256 proposalId,
        address proposer,
        address[] targets,
        uint256[] values,
        string[] signatures,
        bytes[] calldatas,
        uint256 voteStart,
        uint256 voteEnd,
        string description
    );

    event VoteCast(
        address indexed voter,
        uint256 proposalId,
        uint8 support,
        uint256 weight,
        string reason
    );
}

/// Configuration for [EthNode].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub url: String,
    pub governor_address: Address,
    /// Maximum number of blocks covered by a single `eth_getLogs` call.
    pub max_block_range: u64,
}

/// [Node] implementation for Ethereum-compatible JSON-RPC endpoints.
#[derive(Clone, Debug)]
pub struct EthNode {
    provider: DynProvider,
    governor_address: Address,
    max_block_range: u64,
}

impl EthNode {
    pub fn new(config: Config) -> Result<Self, Error> {
        let Config {
            url,
            governor_address,
            max_block_range,
        } = config;

        let parsed_url = url
            .parse::<Url>()
            .map_err(|error| Error::InvalidUrl(url.clone(), Box::new(error)))?;
        let provider = ProviderBuilder::new().connect_http(parsed_url).erased();

        Ok(Self {
            provider,
            governor_address,
            max_block_range: max_block_range.max(1),
        })
    }

    /// All logs of the given event of the governor contract in the inclusive block range, fetched
    /// window by window. Any failing window fails the whole call.
    async fn logs<E>(&self, from_block: u64, to_block: u64) -> Result<Vec<Log>, Error>
    where
        E: SolEvent,
    {
        let mut logs = vec![];

        for (from_block, to_block) in block_windows(from_block, to_block, self.max_block_range) {
            let filter = Filter::new()
                .address(self.governor_address)
                .event_signature(E::SIGNATURE_HASH)
                .from_block(from_block)
                .to_block(to_block);

            let window_logs = self.provider.get_logs(&filter).await?;
            debug!(
                event = E::SIGNATURE,
                from_block,
                to_block,
                count = window_logs.len();
                "fetched logs"
            );

            logs.extend(window_logs);
        }

        Ok(logs)
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, Error> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await?
            .ok_or(Error::BlockNotFound(block_number))?;

        Ok(block.header.timestamp)
    }
}

impl Node for EthNode {
    type Error = Error;

    #[trace]
    async fn latest_block_number(&self) -> Result<u64, Self::Error> {
        let block_number = self.provider.get_block_number().await?;
        Ok(block_number)
    }

    #[trace(properties = { "from_block": "{from_block}", "to_block": "{to_block}" })]
    async fn proposal_created_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawProposalEvent>, Self::Error> {
        let logs = self.logs::<ProposalCreated>(from_block, to_block).await?;

        let mut timestamps = HashMap::new();
        let mut events = Vec::with_capacity(logs.len());

        for log in logs {
            let Some(decoded) = decode::<ProposalCreated>(&log) else {
                continue;
            };

            let timestamp = block_timestamp(
                &mut timestamps,
                decoded.block_number,
                decoded.block_timestamp,
                |block_number| self.block_timestamp(block_number),
            )
            .await?;

            events.push(proposal_event(decoded, timestamp));
        }

        Ok(events)
    }

    #[trace(properties = { "from_block": "{from_block}", "to_block": "{to_block}" })]
    async fn vote_cast_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawVoteEvent>, Self::Error> {
        let logs = self.logs::<VoteCast>(from_block, to_block).await?;

        let events = logs
            .iter()
            .filter_map(decode::<VoteCast>)
            .map(vote_event)
            .collect();

        Ok(events)
    }
}

/// A successfully decoded governor event together with the block data of its log.
struct Decoded<E> {
    event: E,
    block_number: u64,
    block_timestamp: Option<u64>,
}

/// Decode the given log as event `E`. Logs without a block number or with undecodable data are
/// logged and skipped.
fn decode<E>(log: &Log) -> Option<Decoded<E>>
where
    E: SolEvent,
{
    let Some(block_number) = log.block_number else {
        warn!(
            event = E::SIGNATURE,
            transaction_hash:? = log.transaction_hash;
            "skipping log without block number"
        );
        return None;
    };

    match log.log_decode::<E>() {
        Ok(decoded) => Some(Decoded {
            event: decoded.inner.data,
            block_number,
            block_timestamp: log.block_timestamp,
        }),

        Err(error) => {
            warn!(event = E::SIGNATURE, error:%, block_number; "skipping undecodable log");
            None
        }
    }
}

/// The timestamp carried by the log if any, else the cached or freshly fetched one of its block.
async fn block_timestamp<F, Fut>(
    timestamps: &mut HashMap<u64, u64>,
    block_number: u64,
    log_timestamp: Option<u64>,
    fetch: F,
) -> Result<u64, Error>
where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<u64, Error>>,
{
    if let Some(timestamp) = log_timestamp {
        return Ok(timestamp);
    }

    if let Some(timestamp) = timestamps.get(&block_number) {
        return Ok(*timestamp);
    }

    let timestamp = fetch(block_number).await?;
    timestamps.insert(block_number, timestamp);

    Ok(timestamp)
}

fn proposal_event(decoded: Decoded<ProposalCreated>, timestamp: u64) -> RawProposalEvent {
    let Decoded {
        event,
        block_number,
        ..
    } = decoded;

    RawProposalEvent {
        proposal_id: Some(event.proposalId.to_string()),
        proposer: event.proposer.to_string(),
        description: event.description,
        block_number,
        timestamp,
    }
}

fn vote_event(decoded: Decoded<VoteCast>) -> RawVoteEvent {
    let Decoded {
        event,
        block_number,
        ..
    } = decoded;

    RawVoteEvent {
        proposal_id: Some(event.proposalId.to_string()),
        voter: Some(event.voter.to_string()),
        support: event.support.into(),
        weight: event.weight.to_string(),
        block_number,
    }
}

/// Error possibly returned by [EthNode].
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid node URL {0}")]
    InvalidUrl(String, #[source] BoxError),

    #[error("cannot make JSON-RPC call")]
    Transport(#[from] TransportError),

    #[error("block {0} not found")]
    BlockNotFound(u64),
}

/// Split the inclusive block range into consecutive inclusive windows of at most `max` blocks.
fn block_windows(from_block: u64, to_block: u64, max: u64) -> impl Iterator<Item = (u64, u64)> {
    let max = max.max(1);

    iter::successors(
        (from_block <= to_block).then_some(from_block),
        move |&start| {
            let next = start.checked_add(max)?;
            (next <= to_block).then_some(next)
        },
    )
    .map(move |start| (start, start.saturating_add(max - 1).min(to_block)))
}

#[cfg(test)]
mod tests {
    use crate::infra::eth_node::{
        Config, EthNode, Error, ProposalCreated, VoteCast, block_timestamp, block_windows, decode,
        proposal_event, vote_event,
    };
    use alloy::{
        primitives::{self, Address, Bytes, LogData, U256, address},
        rpc::types::Log,
        sol_types::SolEvent,
    };
    use assert_matches::assert_matches;
    use std::{collections::HashMap, future::ready};

    const GOVERNOR: Address = address!("0xcfe4e2879b786c3aa075813f0e364bb5accb6aa0");
    const PROPOSER: Address = address!("0x00000000000000000000000000000000000000aa");
    const VOTER: Address = address!("0x00000000000000000000000000000000000000bb");

    #[test]
    fn test_proposal_event() {
        let event = ProposalCreated {
            proposalId: U256::from(42),
            proposer: PROPOSER,
            targets: vec![GOVERNOR],
            values: vec![U256::ZERO],
            signatures: vec![String::new()],
            calldatas: vec![Bytes::from_static(&[0xca, 0xfe])],
            voteStart: U256::from(110),
            voteEnd: U256::from(200),
            description: "# Increase cap\nDetails here".to_owned(),
        };
        let log = log(event.encode_log_data(), Some(100), Some(1_700_000_000));

        let decoded = decode::<ProposalCreated>(&log).expect("log can be decoded");
        assert_eq!(decoded.block_number, 100);
        assert_eq!(decoded.block_timestamp, Some(1_700_000_000));

        let event = proposal_event(decoded, 1_700_000_000);
        assert_eq!(event.proposal_id.as_deref(), Some("42"));
        assert_eq!(event.proposer, PROPOSER.to_string());
        assert_eq!(event.description, "# Increase cap\nDetails here");
        assert_eq!(event.block_number, 100);
        assert_eq!(event.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_vote_event() {
        let event = VoteCast {
            voter: VOTER,
            proposalId: U256::from(42),
            support: 2,
            weight: U256::from(1_000u128 * 10u128.pow(18)),
            reason: "why not".to_owned(),
        };
        let log = log(event.encode_log_data(), Some(101), None);

        let event = vote_event(decode::<VoteCast>(&log).expect("log can be decoded"));
        assert_eq!(event.proposal_id.as_deref(), Some("42"));
        assert_eq!(event.voter, Some(VOTER.to_string()));
        assert_eq!(event.support, 2);
        assert_eq!(event.weight, "1000000000000000000000");
        assert_eq!(event.block_number, 101);
    }

    #[test]
    fn test_decode_skips_malformed_logs() {
        let garbage = LogData::new_unchecked(
            vec![ProposalCreated::SIGNATURE_HASH],
            Bytes::from_static(&[1, 2, 3]),
        );
        assert!(decode::<ProposalCreated>(&log(garbage, Some(100), None)).is_none());

        let vote = VoteCast {
            voter: VOTER,
            proposalId: U256::from(1),
            support: 1,
            weight: U256::from(1),
            reason: String::new(),
        };
        // A VoteCast log is not a ProposalCreated log.
        assert!(decode::<ProposalCreated>(&log(vote.encode_log_data(), Some(100), None)).is_none());

        assert!(decode::<VoteCast>(&log(vote.encode_log_data(), None, None)).is_none());
    }

    #[tokio::test]
    async fn test_block_timestamp() -> Result<(), Error> {
        let mut timestamps = HashMap::new();
        let mut fetched = vec![];

        // The timestamp of the log wins and nothing is fetched.
        let timestamp = block_timestamp(&mut timestamps, 100, Some(1_000), |_| async {
            Err(Error::BlockNotFound(100))
        })
        .await?;
        assert_eq!(timestamp, 1_000);

        for block_number in [100, 100, 101, 100] {
            let timestamp = block_timestamp(&mut timestamps, block_number, None, |block_number| {
                fetched.push(block_number);
                ready(Ok(block_number * 10))
            })
            .await?;
            assert_eq!(timestamp, block_number * 10);
        }
        assert_eq!(fetched, vec![100, 101]);

        let result = block_timestamp(&mut timestamps, 102, None, |block_number| {
            ready(Err(Error::BlockNotFound(block_number)))
        })
        .await;
        assert_matches!(result, Err(Error::BlockNotFound(102)));
        assert!(!timestamps.contains_key(&102));

        Ok(())
    }

    fn log(data: LogData, block_number: Option<u64>, block_timestamp: Option<u64>) -> Log {
        Log {
            inner: primitives::Log {
                address: GOVERNOR,
                data,
            },
            block_number,
            block_timestamp,
            ..Default::default()
        }
    }

    #[test]
    fn test_block_windows() {
        let windows = block_windows(100, 100, 10).collect::<Vec<_>>();
        assert_eq!(windows, vec![(100, 100)]);

        let windows = block_windows(100, 125, 10).collect::<Vec<_>>();
        assert_eq!(windows, vec![(100, 109), (110, 119), (120, 125)]);

        let windows = block_windows(100, 119, 10).collect::<Vec<_>>();
        assert_eq!(windows, vec![(100, 109), (110, 119)]);

        let windows = block_windows(101, 100, 10).collect::<Vec<_>>();
        assert!(windows.is_empty());

        let windows = block_windows(0, 2, 0).collect::<Vec<_>>();
        assert_eq!(windows, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_new() {
        let config = Config {
            url: "http://localhost:8545".to_owned(),
            governor_address: Default::default(),
            max_block_range: 10_000,
        };
        assert!(EthNode::new(config).is_ok());

        let config = Config {
            url: "not a url".to_owned(),
            governor_address: Default::default(),
            max_block_range: 10_000,
        };
        assert_matches!(EthNode::new(config), Err(Error::InvalidUrl(url, _)) if url == "not a url");
    }
}
