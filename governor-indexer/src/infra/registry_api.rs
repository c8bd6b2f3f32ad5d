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

use crate::domain::registry::{RawRegistryRecord, Registry};
use fastrace::trace;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Configuration for [RegistryApi].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub url: String,
}

/// [Registry] implementation for the HTTP/JSON participant registry.
#[derive(Debug, Clone)]
pub struct RegistryApi {
    client: reqwest::Client,
    url: String,
}

impl RegistryApi {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url,
        }
    }
}

impl Registry for RegistryApi {
    type Error = Error;

    #[trace]
    async fn fetch_records(&self) -> Result<Vec<RawRegistryRecord>, Self::Error> {
        let payload = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let records = parse(payload)?;
        debug!(url:% = self.url, count = records.len(); "fetched registry records");

        Ok(records)
    }
}

/// Error possibly returned by [RegistryApi].
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot fetch registry records")]
    Http(#[from] reqwest::Error),

    #[error("registry payload is not an array but {0}")]
    NotAnArray(&'static str),
}

/// Parse the registry payload, leniently coercing the fields of each record.
fn parse(payload: Value) -> Result<Vec<RawRegistryRecord>, Error> {
    let Value::Array(items) = payload else {
        return Err(Error::NotAnArray(kind(&payload)));
    };

    let records = items
        .into_iter()
        .map(|item| match item {
            Value::Object(object) => raw_registry_record(&object),
            _ => RawRegistryRecord::default(),
        })
        .collect();

    Ok(records)
}

fn raw_registry_record(object: &Map<String, Value>) -> RawRegistryRecord {
    let eth_address = object
        .get("eth_address")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(ToOwned::to_owned);

    RawRegistryRecord {
        eth_address,
        total_stake: number(object.get("total_stake")),
        reward_cut: number(object.get("reward_cut")),
        fee_cut: number(object.get("fee_cut")),
        activation_status: truthy(object.get("activation_status")),
        name: string(object.get("name")),
        service_uri: string(object.get("service_uri")),
        avatar: string(object.get("avatar")),
    }
}

/// JSON numbers as they are, numeric strings parsed, anything else zero.
fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or_default(),
        _ => 0.0,
    }
}

/// Strings are truthy unless empty, `"false"` or `"0"`.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty() && s != "false" && s != "0",
        _ => false,
    }
}

fn string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::registry::RawRegistryRecord,
        infra::registry_api::{Error, parse, truthy},
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_parse() {
        let payload = json!([
            {
                "eth_address": "0xAbC",
                "total_stake": 1234.5,
                "reward_cut": "0.25",
                "fee_cut": "n/a",
                "activation_status": true,
                "name": "orch",
                "service_uri": "https://orch.example:8935",
                "avatar": "orch.png"
            },
            {
                "eth_address": "0xdef",
                "activation_status": "0",
                "name": null
            },
            {
                "eth_address": "",
                "activation_status": 1
            },
            42
        ]);

        let records = parse(payload).expect("payload can be parsed");
        assert_eq!(
            records,
            vec![
                RawRegistryRecord {
                    eth_address: Some("0xAbC".to_owned()),
                    total_stake: 1234.5,
                    reward_cut: 0.25,
                    fee_cut: 0.0,
                    activation_status: true,
                    name: "orch".to_owned(),
                    service_uri: "https://orch.example:8935".to_owned(),
                    avatar: "orch.png".to_owned(),
                },
                RawRegistryRecord {
                    eth_address: Some("0xdef".to_owned()),
                    ..Default::default()
                },
                RawRegistryRecord {
                    eth_address: None,
                    activation_status: true,
                    ..Default::default()
                },
                RawRegistryRecord::default(),
            ]
        );
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(2))));
        assert!(truthy(Some(&json!("active"))));
        assert!(truthy(Some(&json!("true"))));

        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(0.0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!("false"))));
        assert!(!truthy(Some(&json!("0"))));
        assert!(!truthy(Some(&json!([1]))));
    }

    #[test]
    fn test_parse_not_an_array() {
        assert_matches!(
            parse(json!({ "error": "rate limited" })),
            Err(Error::NotAnArray("an object"))
        );
        assert_matches!(parse(json!(null)), Err(Error::NotAnArray("null")));
    }

    #[test]
    fn test_parse_empty() {
        let records = parse(json!([])).expect("payload can be parsed");
        assert!(records.is_empty());
    }
}
