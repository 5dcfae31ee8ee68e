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

//! Lists the systems available on a Rithmic gateway.
//!
//! Usage:
//! ```bash
//! RITHMIC_URI=wss://rituz00100.rithmic.com:443 \
//!   RITHMIC_CERT_PATH=./rithmic_ssl_cert_auth_params \
//!   cargo run --bin rithmic-system-info -p nautilus-adapters-rithmic
//! ```

use anyhow::Context;
use nautilus_adapters_rithmic::{RithmicConfig, RithmicCredential, RithmicSession, WsConnector};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("RITHMIC_CONFIG") {
        Ok(path) => RithmicConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => RithmicConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    // System info is requested before login, the credential is never sent
    let credential = RithmicCredential::builder()
        .user("")
        .password("")
        .fcm_id("")
        .ib_id("")
        .account_id("")
        .build()?;

    let connector = WsConnector::from_config(&config)?;
    let mut session = RithmicSession::new(config, credential, connector);

    session.connect().await?;
    let result = session.list_systems().await;
    if let Err(e) = session.teardown().await {
        warn!("Teardown failed: {e}");
    }

    println!("Available Systems:");
    println!("==================");
    for system in result? {
        println!("{system}");
    }

    Ok(())
}
