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

//! Append-only aggregation of PnL and position updates into report lines.

use serde::Serialize;

use crate::websocket::messages::{AccountPnLPositionUpdate, InstrumentPnLPositionUpdate};

/// Account-level PnL snapshot. Money fields are kept as delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub account_balance: String,
    pub margin_balance: String,
    pub day_pnl: String,
}

impl From<&AccountPnLPositionUpdate> for AccountSnapshot {
    fn from(msg: &AccountPnLPositionUpdate) -> Self {
        Self {
            account_id: msg.account_id.clone().unwrap_or_default(),
            account_balance: msg.account_balance.clone().unwrap_or_default(),
            margin_balance: msg.margin_balance.clone().unwrap_or_default(),
            day_pnl: msg.day_pnl.clone().unwrap_or_default(),
        }
    }
}

/// Instrument-level position and PnL snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentSnapshot {
    pub symbol: String,
    pub open_position_quantity: i32,
    pub closed_position_quantity: i32,
    pub fill_buy_qty: i32,
    pub fill_sell_qty: i32,
    pub day_open_pnl: f64,
    pub day_closed_pnl: f64,
    pub day_pnl: f64,
}

impl From<&InstrumentPnLPositionUpdate> for InstrumentSnapshot {
    fn from(msg: &InstrumentPnLPositionUpdate) -> Self {
        Self {
            symbol: msg.symbol.clone().unwrap_or_default(),
            open_position_quantity: msg.open_position_quantity.unwrap_or_default(),
            closed_position_quantity: msg.closed_position_quantity.unwrap_or_default(),
            fill_buy_qty: msg.fill_buy_qty.unwrap_or_default(),
            fill_sell_qty: msg.fill_sell_qty.unwrap_or_default(),
            day_open_pnl: msg.day_open_pnl.unwrap_or_default(),
            day_closed_pnl: msg.day_closed_pnl.unwrap_or_default(),
            day_pnl: msg.day_pnl.unwrap_or_default(),
        }
    }
}

/// One group of report lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportGroup {
    Account(AccountSnapshot),
    Instrument(InstrumentSnapshot),
}

impl ReportGroup {
    /// Renders the group as lines, terminated by an empty separator line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Account(account) => vec![
                format!("Account: {}", account.account_id),
                format!("Account Balance: {}", account.account_balance),
                format!("Margin Balance: {}", account.margin_balance),
                format!("Daily Pnl: {}", account.day_pnl),
                String::new(),
            ],
            Self::Instrument(inst) => {
                let sym = &inst.symbol;
                vec![
                    format!("{sym} number of open positions: {}", inst.open_position_quantity),
                    format!("{sym} number of closed positions: {}", inst.closed_position_quantity),
                    format!("{sym} number of long orders filled: {}", inst.fill_buy_qty),
                    format!("{sym} number of short orders filled: {}", inst.fill_sell_qty),
                    format!("{sym} open pnl: {:?}", inst.day_open_pnl),
                    format!("{sym} closed pnl: {:?}", inst.day_closed_pnl),
                    format!("{sym} daily pnl: {:?}", inst.day_pnl),
                    String::new(),
                ]
            }
        }
    }
}

/// Session-scoped PnL and position report.
///
/// Groups are appended in arrival order and never removed; [`PnlReport::report`]
/// may be called at any point, including mid-stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PnlReport {
    groups: Vec<ReportGroup>,
}

impl PnlReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_account_snapshot(&mut self, snapshot: AccountSnapshot) {
        self.groups.push(ReportGroup::Account(snapshot));
    }

    /// Appends an instrument group; returns `false` and appends nothing when
    /// the symbol is empty (a placeholder record).
    pub fn append_instrument_snapshot(&mut self, snapshot: InstrumentSnapshot) -> bool {
        if snapshot.symbol.is_empty() {
            return false;
        }
        self.groups.push(ReportGroup::Instrument(snapshot));
        true
    }

    /// Returns every line accumulated so far, in order.
    #[must_use]
    pub fn report(&self) -> Vec<String> {
        self.groups.iter().flat_map(ReportGroup::lines).collect()
    }

    #[must_use]
    pub fn groups(&self) -> &[ReportGroup] {
        &self.groups
    }

    #[must_use]
    pub fn account_groups(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g, ReportGroup::Account(_)))
            .count()
    }

    #[must_use]
    pub fn instrument_groups(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g, ReportGroup::Instrument(_)))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::common::testing::{account_update, instrument_update};

    #[rstest]
    fn test_account_group_lines() {
        let mut report = PnlReport::new();
        report.append_account_snapshot(AccountSnapshot::from(&account_update(
            "999999", "10000.0", "9500.0", "50.0",
        )));

        assert_eq!(
            report.report(),
            vec![
                "Account: 999999",
                "Account Balance: 10000.0",
                "Margin Balance: 9500.0",
                "Daily Pnl: 50.0",
                "",
            ]
        );
        assert_eq!(report.account_groups(), 1);
    }

    #[rstest]
    fn test_instrument_group_lines() {
        let mut report = PnlReport::new();
        let update = instrument_update("ESZ5", 2, 125.5);
        let appended = report.append_instrument_snapshot(InstrumentSnapshot::from(&update));

        assert!(appended);
        assert_eq!(
            report.report(),
            vec![
                "ESZ5 number of open positions: 2",
                "ESZ5 number of closed positions: 0",
                "ESZ5 number of long orders filled: 2",
                "ESZ5 number of short orders filled: 0",
                "ESZ5 open pnl: 125.5",
                "ESZ5 closed pnl: 0.0",
                "ESZ5 daily pnl: 125.5",
                "",
            ]
        );
    }

    #[rstest]
    fn test_empty_symbol_is_skipped() {
        let mut report = PnlReport::new();

        let update = instrument_update("", 1, 10.0);
        let appended = report.append_instrument_snapshot(InstrumentSnapshot::from(&update));

        assert!(!appended);
        assert!(report.is_empty());
        assert!(report.report().is_empty());
    }

    #[rstest]
    fn test_unset_fields_render_defaults() {
        let snapshot = AccountSnapshot::from(&AccountPnLPositionUpdate::default());
        let lines = ReportGroup::Account(snapshot).lines();

        assert_eq!(lines[0], "Account: ");
        assert_eq!(lines[3], "Daily Pnl: ");
    }

    #[rstest]
    fn test_groups_keep_arrival_order_and_report_is_repeatable() {
        let mut report = PnlReport::new();
        let update = instrument_update("NQZ5", 1, -3.25);
        report.append_instrument_snapshot(InstrumentSnapshot::from(&update));
        let mid_stream = report.report();

        report.append_account_snapshot(AccountSnapshot::from(&account_update("A1", "1", "2", "3")));

        assert_eq!(report.report()[..mid_stream.len()], mid_stream[..]);
        assert_eq!(report.report().len(), 8 + 5);
        assert!(matches!(report.groups()[0], ReportGroup::Instrument(_)));
        assert!(matches!(report.groups()[1], ReportGroup::Account(_)));
        assert_eq!(report.instrument_groups(), 1);
    }
}
