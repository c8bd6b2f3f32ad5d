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
    domain::{self, list_proposals, storage::Storage},
    infra::api::Metrics,
};
use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject,
    http::GraphiQLSource,
};
use async_graphql_axum::GraphQL;
use axum::{
    Router,
    response::{Html, IntoResponse},
    routing::get,
};
use log::error;
use std::marker::PhantomData;

const GRAPHQL_PATH: &str = "/api/v1/graphql";

/// Export the GraphQL schema in SDL format.
pub fn export_schema<S>() -> String
where
    S: Storage,
{
    Schema::build(Query::<S>::default(), EmptyMutation, EmptySubscription)
        .finish()
        .sdl()
}

pub fn make_app<S, T>(storage: S, max_complexity: usize, max_depth: usize) -> Router<T>
where
    S: Storage,
    T: Clone + Send + Sync + 'static,
{
    let schema = Schema::build(Query::<S>::default(), EmptyMutation, EmptySubscription)
        .data(storage)
        .data(Metrics::default())
        .limit_complexity(max_complexity)
        .limit_depth(max_depth)
        .finish();

    Router::new().route(
        "/graphql",
        get(graphiql).post_service(GraphQL::new(schema)),
    )
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

pub struct Query<S> {
    _s: PhantomData<S>,
}

impl<S> Default for Query<S> {
    fn default() -> Self {
        Self { _s: PhantomData }
    }
}

#[Object]
impl<S> Query<S>
where
    S: Storage,
{
    /// All proposals, newest first, each with its votes ordered by descending stake.
    async fn proposals(&self, cx: &Context<'_>) -> async_graphql::Result<Vec<Proposal>> {
        let storage = cx.data::<S>()?;
        let metrics = cx.data::<Metrics>()?;
        metrics.proposals_queries.increment(1);

        let proposals = list_proposals(storage).await.map_err(|error| {
            error!(error:%; "cannot list proposals");
            metrics.failed_queries.increment(1);
            async_graphql::Error::new("internal server error")
        })?;

        Ok(proposals.into_iter().map(Into::into).collect())
    }
}

/// A governance proposal.
#[derive(Debug, SimpleObject)]
pub struct Proposal {
    /// The decimal proposal ID.
    id: String,

    /// The first line of the description.
    title: String,

    description: String,

    /// The lowercase address of the proposer.
    proposer_address: String,

    /// The registry name of the proposer, empty if unknown.
    proposer_name: String,

    /// The registry avatar of the proposer, empty if unknown.
    proposer_avatar: String,

    /// The UNIX timestamp of the block the proposal was created in.
    created_at: i64,

    /// The votes, ordered by descending stake.
    votes: Vec<Vote>,
}

impl From<domain::Proposal> for Proposal {
    fn from(proposal: domain::Proposal) -> Self {
        let domain::Proposal {
            id,
            title,
            description,
            proposer_address,
            proposer_name,
            proposer_avatar,
            created_at,
            votes,
        } = proposal;

        Self {
            id,
            title,
            description,
            proposer_address,
            proposer_name,
            proposer_avatar,
            created_at,
            votes: votes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A vote cast on a proposal.
#[derive(Debug, SimpleObject)]
pub struct Vote {
    /// The lowercase address of the voter.
    voter_address: String,

    /// The registry name of the voter, empty if unknown.
    voter_name: String,

    /// The registry avatar of the voter, empty if unknown.
    voter_avatar: String,

    /// One of `Yes`, `No` or `Abstain`.
    support: String,

    stake_amount: f64,
}

impl From<domain::Vote> for Vote {
    fn from(vote: domain::Vote) -> Self {
        let domain::Vote {
            voter_address,
            voter_name,
            voter_avatar,
            support,
            stake_amount,
        } = vote;

        Self {
            voter_address,
            voter_name,
            voter_avatar,
            support,
            stake_amount,
        }
    }
}
