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

//! e2e testing library

use anyhow::{Context, bail, ensure};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

const PROPOSALS_QUERY: &str = "{
    proposals {
        id
        title
        description
        proposerAddress
        proposerName
        proposerAvatar
        createdAt
        votes {
            voterAddress
            voterName
            voterAvatar
            support
            stakeAmount
        }
    }
}";

/// Run e2e tests against a running Governor API exposed securely (https) or insecurely (http) at
/// the given host and port. The Governor Indexer is expected to have completed at least one cycle.
pub async fn run(host: &str, port: u16, secure: bool) -> anyhow::Result<()> {
    println!("Starting e2e testing");

    let base_url = if secure {
        format!("https://{host}:{port}")
    } else {
        format!("http://{host}:{port}")
    };
    let client = Client::new();

    let status = client
        .get(format!("{base_url}/ready"))
        .send()
        .await
        .context("send ready request")?
        .status();
    ensure!(status == StatusCode::OK, "API not ready: {status}");

    let response = client
        .post(format!("{base_url}/api/v1/graphql"))
        .json(&json!({ "query": PROPOSALS_QUERY }))
        .send()
        .await
        .context("send proposals query")?
        .error_for_status()
        .context("proposals query")?
        .json::<Response>()
        .await
        .context("deserialize proposals response")?;

    if let Some(errors) = response.errors {
        bail!("proposals query returned errors: {errors}");
    }
    let proposals = response
        .data
        .context("proposals response without data")?
        .proposals;

    check_proposals(&proposals).context("check proposals")?;

    println!("Successfully finished e2e testing for {} proposals", proposals.len());

    Ok(())
}

/// Check the invariants of a `proposals` query result.
pub fn check_proposals(proposals: &[Proposal]) -> anyhow::Result<()> {
    for pair in proposals.windows(2) {
        ensure!(
            pair[0].created_at >= pair[1].created_at,
            "proposals {} and {} not ordered by descending creation time",
            pair[0].id,
            pair[1].id
        );
    }

    for proposal in proposals {
        ensure!(!proposal.id.is_empty(), "proposal without id");
        ensure!(
            proposal.proposer_address == proposal.proposer_address.to_lowercase(),
            "proposer address of proposal {} not lowercase",
            proposal.id
        );

        for pair in proposal.votes.windows(2) {
            ensure!(
                pair[0].stake_amount >= pair[1].stake_amount,
                "votes of proposal {} not ordered by descending stake",
                proposal.id
            );
        }

        let mut voters = proposal
            .votes
            .iter()
            .map(|vote| vote.voter_address.as_str())
            .collect::<Vec<_>>();
        voters.sort_unstable();
        voters.dedup();
        ensure!(
            voters.len() == proposal.votes.len(),
            "duplicate votes for proposal {}",
            proposal.id
        );

        for vote in &proposal.votes {
            ensure!(
                matches!(vote.support.as_str(), "Yes" | "No" | "Abstain"),
                "invalid support {} for proposal {}",
                vote.support,
                proposal.id
            );
            ensure!(
                vote.voter_address == vote.voter_address.to_lowercase(),
                "voter address {} not lowercase",
                vote.voter_address
            );
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct Response {
    data: Option<Data>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Data {
    proposals: Vec<Proposal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposer_address: String,
    pub proposer_name: String,
    pub proposer_avatar: String,
    pub created_at: i64,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_address: String,
    pub voter_name: String,
    pub voter_avatar: String,
    pub support: String,
    pub stake_amount: f64,
}

impl From<governor_api::domain::Proposal> for Proposal {
    fn from(proposal: governor_api::domain::Proposal) -> Self {
        Self {
            id: proposal.id,
            title: proposal.title,
            description: proposal.description,
            proposer_address: proposal.proposer_address,
            proposer_name: proposal.proposer_name,
            proposer_avatar: proposal.proposer_avatar,
            created_at: proposal.created_at,
            votes: proposal.votes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<governor_api::domain::Vote> for Vote {
    fn from(vote: governor_api::domain::Vote) -> Self {
        Self {
            voter_address: vote.voter_address,
            voter_name: vote.voter_name,
            voter_avatar: vote.voter_avatar,
            support: vote.support,
            stake_amount: vote.stake_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::e2e::{Proposal, Vote, check_proposals};

    #[test]
    fn test_check_proposals() {
        let proposals = vec![
            proposal("2", 200, vec![vote("0xb", 5.0), vote("0xc", 1.0)]),
            proposal("1", 100, vec![]),
        ];
        assert!(check_proposals(&proposals).is_ok());

        let unordered = vec![proposal("1", 100, vec![]), proposal("2", 200, vec![])];
        assert!(check_proposals(&unordered).is_err());

        let unordered_votes = vec![proposal("1", 100, vec![vote("0xb", 1.0), vote("0xc", 5.0)])];
        assert!(check_proposals(&unordered_votes).is_err());

        let duplicate_votes = vec![proposal("1", 100, vec![vote("0xb", 1.0), vote("0xb", 1.0)])];
        assert!(check_proposals(&duplicate_votes).is_err());
    }

    fn proposal(id: &str, created_at: i64, votes: Vec<Vote>) -> Proposal {
        Proposal {
            id: id.to_owned(),
            title: format!("Proposal {id}"),
            description: String::new(),
            proposer_address: "0xaaa".to_owned(),
            proposer_name: String::new(),
            proposer_avatar: String::new(),
            created_at,
            votes,
        }
    }

    fn vote(voter_address: &str, stake_amount: f64) -> Vote {
        Vote {
            voter_address: voter_address.to_owned(),
            voter_name: String::new(),
            voter_avatar: String::new(),
            support: "Yes".to_owned(),
            stake_amount,
        }
    }
}
