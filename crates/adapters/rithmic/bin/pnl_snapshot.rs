// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Requests a PnL and position snapshot for one account and prints the report.
//!
//! Usage:
//! ```bash
//! RITHMIC_URI=wss://rituz00100.rithmic.com:443 \
//!   RITHMIC_CERT_PATH=./rithmic_ssl_cert_auth_params \
//!   cargo run --bin rithmic-pnl-snapshot -p nautilus-adapters-rithmic -- \
//!   USER PASSWORD FCM IB ACCOUNT
//! ```
//!
//! `RITHMIC_CONFIG` may point to a JSON file with any `RithmicConfig` fields.

use anyhow::{Context, bail};
use nautilus_adapters_rithmic::{
    RithmicConfig, RithmicCredential, RithmicSession, StreamEnd, WsConnector,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rithmic-pnl-snapshot USER PASSWORD FCM IB ACCOUNT";

fn load_config() -> anyhow::Result<RithmicConfig> {
    let config = match std::env::var("RITHMIC_CONFIG") {
        Ok(path) => RithmicConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => RithmicConfig::default(),
    }
    .with_env_overrides();

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [user, password, fcm_id, ib_id, account_id] = args.as_slice() else {
        bail!(USAGE);
    };

    let credential = RithmicCredential::builder()
        .user(user.as_str())
        .password(password.as_str())
        .fcm_id(fcm_id.as_str())
        .ib_id(ib_id.as_str())
        .account_id(account_id.as_str())
        .build()?;

    let config = load_config()?;
    info!(uri = %config.uri, system_name = %config.system_name, "Starting PnL snapshot");

    let connector = WsConnector::from_config(&config)?;
    let mut session = RithmicSession::new(config, credential, connector);

    match session.run().await? {
        StreamEnd::Completed => info!("Snapshot complete"),
        StreamEnd::MessageCap => warn!("Message cap reached before the snapshot completed"),
        StreamEnd::ConnectionClosed => warn!("Connection closed before the snapshot completed"),
    }

    for line in session.report().report() {
        println!("{line}");
    }

    Ok(())
}
