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

use clap::Parser;
use indexer_tests::e2e;

/// Run e2e tests against a running Governor API.
#[derive(Debug, Parser)]
struct Cli {
    /// The host of the Governor API.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// The port of the Governor API.
    #[arg(long, default_value_t = 8088)]
    port: u16,

    /// Use https instead of http.
    #[arg(long)]
    secure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { host, port, secure } = Cli::parse();
    e2e::run(&host, port, secure).await
}
