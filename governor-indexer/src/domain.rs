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

pub mod node;
pub mod registry;
pub mod storage;

use derive_more::Display;
use std::{fmt, num::ParseFloatError};

/// Number of decimals of the fixed-point vote weight.
const WEIGHT_DECIMALS: i32 = 18;

/// A governance proposal, immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Decimal representation of the uint256 proposal id.
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposer_address: String,
    pub proposer_name: String,
    pub proposer_avatar: String,
    /// Block timestamp in seconds since the Unix epoch.
    pub created_at: u64,
    pub block_number: u64,
}

/// A vote cast on a [Proposal]. Keyed by proposal id and voter address.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub proposal_id: String,
    pub voter_address: String,
    pub voter_name: String,
    pub voter_avatar: String,
    pub support: Support,
    pub stake_amount: f64,
    pub block_number: u64,
}

/// Decoded support decision of a [Vote].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Yes,
    No,
    Abstain,
}

impl From<i64> for Support {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Yes,
            2 => Self::Abstain,
            _ => Self::No,
        }
    }
}

/// A participant record of the external registry, keyed by lowercase address.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRecord {
    pub address: String,
    pub total_stake: f64,
    pub reward_cut: f64,
    pub fee_cut: f64,
    pub activation_status: bool,
    pub name: String,
    pub service_uri: String,
    pub avatar: String,
}

/// Display metadata resolved for an address at ingestion time. Unknown addresses resolve to
/// empty strings, never to an absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub name: String,
    pub avatar: String,
}

impl From<Option<RegistryRecord>> for Enrichment {
    fn from(record: Option<RegistryRecord>) -> Self {
        record
            .map(|record| Self {
                name: record.name,
                avatar: record.avatar,
            })
            .unwrap_or_default()
    }
}

/// A logical event feed with its own watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Proposals,
    Votes,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposals => "proposals",
            Self::Votes => "votes",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a proposal title from its description: the first non-empty line, without a single `#`
/// marker at its very start and without surrounding whitespace.
pub fn title(description: &str) -> String {
    description
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.strip_prefix('#').unwrap_or(line).trim().to_owned())
        .unwrap_or_default()
}

/// Convert a decimal 18-decimal fixed-point weight into a floating-point stake amount.
pub fn stake_amount(weight: &str) -> Result<f64, ParseFloatError> {
    let weight = weight.trim().parse::<f64>()?;
    Ok(weight / 10f64.powi(WEIGHT_DECIMALS))
}

/// Normalize an address for storage and lookups.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}
