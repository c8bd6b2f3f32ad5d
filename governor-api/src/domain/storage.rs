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

use crate::domain::{Proposal, Vote};

/// Storage abstraction.
#[trait_variant::make(Send)]
pub trait Storage
where
    Self: Clone + Send + Sync + 'static,
{
    /// Check whether the database can be queried.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Get all proposals in stored order, without votes.
    async fn get_proposals(&self) -> Result<Vec<Proposal>, sqlx::Error>;

    /// Get the votes for the given proposal in stored order.
    async fn get_votes_by_proposal_id(&self, proposal_id: &str) -> Result<Vec<Vote>, sqlx::Error>;
}
