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

use derive_more::Deref;
use log::debug;
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::time::Duration;
use thiserror::Error;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// New type for [sqlx::SqlitePool], allowing for some custom extensions as well as security.
/// Dereferences to the wrapped pool, hence it can be used as an executor via `&*pool`.
#[derive(Debug, Clone, Deref)]
pub struct SqlitePool(sqlx::SqlitePool);

impl SqlitePool {
    /// Try to create a new [SqlitePool] with the given [Config]. The database file is created if
    /// missing and opened in WAL mode, so that readers in other processes do not block the
    /// writer.
    pub async fn new(config: Config) -> Result<Self, Error> {
        let Config { cnn_url } = config;

        let connect_options = SqliteConnectOptions::new()
            .filename(&cnn_url)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_options)
            .await?;
        debug!(cnn_url:%; "created pool for SQLite");

        Ok(Self(pool))
    }

    /// Close all connections, waiting for checked out ones to be returned.
    pub async fn close(&self) {
        self.0.close().await;
    }
}

/// Configuration for [SqlitePool].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path of the database file.
    pub cnn_url: String,
}

/// Error possibly returned by [SqlitePool::new].
#[derive(Debug, Error)]
#[error("cannot create pool for SQLite")]
pub struct Error(#[from] sqlx::Error);

#[cfg(test)]
mod tests {
    use crate::infra::pool::sqlite::{Config, SqlitePool};
    use anyhow::Context;

    #[tokio::test]
    async fn test_new() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir().context("cannot create tempdir")?;
        let cnn_url = temp_dir.path().join("test.sqlite").display().to_string();

        let pool = SqlitePool::new(Config { cnn_url })
            .await
            .context("create pool")?;
        let (one,) = sqlx::query_as::<_, (i64,)>("SELECT 1")
            .fetch_one(&*pool)
            .await?;
        assert_eq!(one, 1);

        let clone = pool.clone();
        pool.close().await;
        assert!(clone.is_closed());

        Ok(())
    }
}
