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

//! Protobuf message schemas for the Rithmic PnL plant.
//!
//! Every message shares the `template_id` field (tag 154467), which is all
//! [`Base`] decodes. The remaining fields are only decoded once the template
//! id has selected the concrete schema.

/// Generic envelope exposing only the template id discriminator.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Base {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
}

/// Infrastructure ("plant") selector carried by the login request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SysInfraType {
    TickerPlant = 1,
    OrderPlant = 2,
    HistoryPlant = 3,
    PnlPlant = 4,
    RepositoryPlant = 5,
}

/// Template 10.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestLogin {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, optional, tag = "153634")]
    pub template_version: Option<String>,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, optional, tag = "131003")]
    pub user: Option<String>,
    #[prost(string, optional, tag = "130004")]
    pub password: Option<String>,
    #[prost(string, optional, tag = "130002")]
    pub app_name: Option<String>,
    #[prost(string, optional, tag = "131803")]
    pub app_version: Option<String>,
    #[prost(string, optional, tag = "153628")]
    pub system_name: Option<String>,
    #[prost(enumeration = "SysInfraType", optional, tag = "153621")]
    pub infra_type: Option<i32>,
}

/// Template 11.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseLogin {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, optional, tag = "153634")]
    pub template_version: Option<String>,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, repeated, tag = "132766")]
    pub rp_code: Vec<String>,
    #[prost(string, optional, tag = "154013")]
    pub fcm_id: Option<String>,
    #[prost(string, optional, tag = "154014")]
    pub ib_id: Option<String>,
    #[prost(string, optional, tag = "154712")]
    pub country_code: Option<String>,
    #[prost(string, optional, tag = "154713")]
    pub state_code: Option<String>,
    #[prost(string, optional, tag = "153428")]
    pub unique_user_id: Option<String>,
    #[prost(double, optional, tag = "153633")]
    pub heartbeat_interval: Option<f64>,
}

/// Template 12.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestLogout {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
}

/// Template 13.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseLogout {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, repeated, tag = "132766")]
    pub rp_code: Vec<String>,
}

/// Template 16.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestRithmicSystemInfo {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
}

/// Template 17.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseRithmicSystemInfo {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, repeated, tag = "132766")]
    pub rp_code: Vec<String>,
    #[prost(string, repeated, tag = "153628")]
    pub system_name: Vec<String>,
    #[prost(bool, repeated, packed = "false", tag = "153649")]
    pub has_aggregated_quotes: Vec<bool>,
}

/// Template 18. Carries nothing beyond the discriminator.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestHeartbeat {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
}

/// Template 19.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseHeartbeat {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, repeated, tag = "132766")]
    pub rp_code: Vec<String>,
    #[prost(int32, optional, tag = "150100")]
    pub ssboe: Option<i32>,
    #[prost(int32, optional, tag = "150101")]
    pub usecs: Option<i32>,
}

/// Template 402.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestPnLPositionSnapshot {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, optional, tag = "154013")]
    pub fcm_id: Option<String>,
    #[prost(string, optional, tag = "154014")]
    pub ib_id: Option<String>,
    #[prost(string, optional, tag = "154008")]
    pub account_id: Option<String>,
}

/// Template 403. A non-empty `rp_code` marks the snapshot as complete.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponsePnLPositionSnapshot {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(string, repeated, tag = "132760")]
    pub user_msg: Vec<String>,
    #[prost(string, repeated, tag = "132766")]
    pub rp_code: Vec<String>,
}

/// Template 450.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstrumentPnLPositionUpdate {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(bool, optional, tag = "110121")]
    pub is_snapshot: Option<bool>,
    #[prost(string, optional, tag = "154013")]
    pub fcm_id: Option<String>,
    #[prost(string, optional, tag = "154014")]
    pub ib_id: Option<String>,
    #[prost(string, optional, tag = "154008")]
    pub account_id: Option<String>,
    #[prost(string, optional, tag = "110100")]
    pub symbol: Option<String>,
    #[prost(string, optional, tag = "110101")]
    pub exchange: Option<String>,
    #[prost(string, optional, tag = "100749")]
    pub product_code: Option<String>,
    #[prost(int32, optional, tag = "154041")]
    pub fill_buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154042")]
    pub fill_sell_qty: Option<i32>,
    #[prost(int32, optional, tag = "154037")]
    pub order_buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154038")]
    pub order_sell_qty: Option<i32>,
    #[prost(int32, optional, tag = "154260")]
    pub buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154261")]
    pub sell_qty: Option<i32>,
    #[prost(double, optional, tag = "154434")]
    pub avg_open_fill_price: Option<f64>,
    #[prost(double, optional, tag = "157954")]
    pub day_open_pnl: Option<f64>,
    #[prost(double, optional, tag = "157955")]
    pub day_closed_pnl: Option<f64>,
    #[prost(double, optional, tag = "157956")]
    pub day_pnl: Option<f64>,
    #[prost(string, optional, tag = "156961")]
    pub open_position_pnl: Option<String>,
    #[prost(int32, optional, tag = "156962")]
    pub open_position_quantity: Option<i32>,
    #[prost(string, optional, tag = "156963")]
    pub closed_position_pnl: Option<String>,
    #[prost(int32, optional, tag = "156964")]
    pub closed_position_quantity: Option<i32>,
    #[prost(int32, optional, tag = "156967")]
    pub net_quantity: Option<i32>,
    #[prost(int32, optional, tag = "150100")]
    pub ssboe: Option<i32>,
    #[prost(int32, optional, tag = "150101")]
    pub usecs: Option<i32>,
}

/// Template 451.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountPnLPositionUpdate {
    #[prost(int32, required, tag = "154467")]
    pub template_id: i32,
    #[prost(bool, optional, tag = "110121")]
    pub is_snapshot: Option<bool>,
    #[prost(string, optional, tag = "154013")]
    pub fcm_id: Option<String>,
    #[prost(string, optional, tag = "154014")]
    pub ib_id: Option<String>,
    #[prost(string, optional, tag = "154008")]
    pub account_id: Option<String>,
    #[prost(int32, optional, tag = "154041")]
    pub fill_buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154042")]
    pub fill_sell_qty: Option<i32>,
    #[prost(int32, optional, tag = "154037")]
    pub order_buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154038")]
    pub order_sell_qty: Option<i32>,
    #[prost(int32, optional, tag = "154260")]
    pub buy_qty: Option<i32>,
    #[prost(int32, optional, tag = "154261")]
    pub sell_qty: Option<i32>,
    #[prost(string, optional, tag = "156961")]
    pub open_position_pnl: Option<String>,
    #[prost(int32, optional, tag = "156962")]
    pub open_position_quantity: Option<i32>,
    #[prost(string, optional, tag = "156963")]
    pub closed_position_pnl: Option<String>,
    #[prost(int32, optional, tag = "156964")]
    pub closed_position_quantity: Option<i32>,
    #[prost(int32, optional, tag = "156967")]
    pub net_quantity: Option<i32>,
    #[prost(string, optional, tag = "156991")]
    pub excess_buy_margin: Option<String>,
    #[prost(string, optional, tag = "156977")]
    pub margin_balance: Option<String>,
    #[prost(string, optional, tag = "156976")]
    pub min_margin_balance: Option<String>,
    #[prost(string, optional, tag = "156968")]
    pub min_account_balance: Option<String>,
    #[prost(string, optional, tag = "156970")]
    pub account_balance: Option<String>,
    #[prost(string, optional, tag = "156971")]
    pub cash_on_hand: Option<String>,
    #[prost(string, optional, tag = "157015")]
    pub available_buying_power: Option<String>,
    #[prost(string, optional, tag = "157954")]
    pub day_open_pnl: Option<String>,
    #[prost(string, optional, tag = "157955")]
    pub day_closed_pnl: Option<String>,
    #[prost(string, optional, tag = "157956")]
    pub day_pnl: Option<String>,
    #[prost(int32, optional, tag = "150100")]
    pub ssboe: Option<i32>,
    #[prost(int32, optional, tag = "150101")]
    pub usecs: Option<i32>,
}
