#![doc = include_str!("../README.md")]

pub mod common;
pub mod config;
pub mod error;
pub mod report;
pub mod tls;
pub mod websocket;

pub use common::*;
pub use config::RithmicConfig;
pub use error::{RithmicError, RithmicResult};
pub use report::*;
pub use websocket::{
    RithmicMessage, RithmicSession, RithmicWsError, RithmicWsResult, SessionState, StreamEnd,
    WsConnector,
};
