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

//! Enumerations shared across the Rithmic adapter.

use serde::{Deserialize, Serialize};

use crate::websocket::messages::SysInfraType;

/// The logical service endpoint ("plant") a session logs into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RithmicPlant {
    Ticker,
    Order,
    History,
    #[default]
    Pnl,
    Repository,
}

impl RithmicPlant {
    /// Returns the wire-level infrastructure type for the plant.
    #[must_use]
    pub fn infra_type(self) -> SysInfraType {
        match self {
            Self::Ticker => SysInfraType::TickerPlant,
            Self::Order => SysInfraType::OrderPlant,
            Self::History => SysInfraType::HistoryPlant,
            Self::Pnl => SysInfraType::PnlPlant,
            Self::Repository => SysInfraType::RepositoryPlant,
        }
    }
}

impl std::fmt::Display for RithmicPlant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RithmicPlant::Ticker => write!(f, "TICKER_PLANT"),
            RithmicPlant::Order => write!(f, "ORDER_PLANT"),
            RithmicPlant::History => write!(f, "HISTORY_PLANT"),
            RithmicPlant::Pnl => write!(f, "PNL_PLANT"),
            RithmicPlant::Repository => write!(f, "REPOSITORY_PLANT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(RithmicPlant::Ticker, 1)]
    #[case(RithmicPlant::Order, 2)]
    #[case(RithmicPlant::History, 3)]
    #[case(RithmicPlant::Pnl, 4)]
    #[case(RithmicPlant::Repository, 5)]
    fn test_plant_infra_type_values(#[case] plant: RithmicPlant, #[case] expected: i32) {
        assert_eq!(plant.infra_type() as i32, expected);
    }

    #[rstest]
    fn test_plant_serde_and_display() {
        let json = serde_json::to_string(&RithmicPlant::Pnl).unwrap();
        assert_eq!(json, "\"PNL\"");
        assert_eq!(RithmicPlant::default(), RithmicPlant::Pnl);
        assert_eq!(RithmicPlant::History.to_string(), "HISTORY_PLANT");
    }
}
