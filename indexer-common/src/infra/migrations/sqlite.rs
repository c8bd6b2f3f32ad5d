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

use crate::infra::pool::sqlite::SqlitePool;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Run the database migrations for SQLite.
pub async fn run(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("migrations/sqlite").run(&**pool).await?;
    Ok(())
}

/// Error possibly returned by [run].
#[derive(Debug, Error)]
#[error("cannot run migrations for SQLite")]
pub struct Error(#[from] MigrateError);

#[cfg(test)]
mod tests {
    use crate::infra::{
        migrations,
        pool::sqlite::{Config, SqlitePool},
    };
    use anyhow::Context;

    #[tokio::test]
    async fn test_run() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir().context("cannot create tempdir")?;
        let cnn_url = temp_dir.path().join("test.sqlite").display().to_string();
        let pool = SqlitePool::new(Config { cnn_url }).await?;

        migrations::sqlite::run(&pool)
            .await
            .context("run migrations")?;
        // Migrations are idempotent.
        migrations::sqlite::run(&pool)
            .await
            .context("run migrations again")?;

        let tables = sqlx::query_as::<_, (String,)>(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&*pool)
        .await?
        .into_iter()
        .map(|(name,)| name)
        .filter(|name| !name.starts_with("sqlite_") && !name.starts_with("_sqlx"))
        .collect::<Vec<_>>();
        assert_eq!(
            tables,
            vec!["proposals", "registry_records", "votes", "watermarks"]
        );

        Ok(())
    }
}
