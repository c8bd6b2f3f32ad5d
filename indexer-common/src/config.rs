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

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;
use std::env;

/// Environment variable pointing to the YAML configuration file.
pub const CONFIG_FILE: &str = "CONFIG_FILE";

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const ENV_PREFIX: &str = "APP__";

/// Extension methods for configuration structs.
pub trait ConfigExt
where
    Self: for<'de> Deserialize<'de>,
{
    /// Load the configuration from the YAML file given by the `CONFIG_FILE` environment variable
    /// (default: `config.yaml`) and from environment variables prefixed with `APP__`, the latter
    /// taking precedence. Nested keys are separated by a double underscore, e.g.
    /// `APP__INFRA__NODE__URL`.
    fn load() -> Result<Self, Box<figment::Error>> {
        let config_file = env::var(CONFIG_FILE).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());

        Figment::new()
            .merge(Yaml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }
}

impl<T> ConfigExt for T where T: for<'de> Deserialize<'de> {}

#[cfg(test)]
mod tests {
    use crate::config::ConfigExt;
    use figment::Jail;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Config {
        interval: String,
        node: NodeConfig,
    }

    #[derive(Debug, Deserialize)]
    struct NodeConfig {
        url: String,
    }

    #[test]
    fn test_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "interval: 5m\nnode:\n  url: http://localhost:8545\n",
            )?;
            jail.set_env("APP__NODE__URL", "http://node:8545");

            let config = Config::load().map_err(|error| *error)?;
            assert_eq!(config.interval, "5m");
            assert_eq!(config.node.url, "http://node:8545");

            Ok(())
        });
    }
}
