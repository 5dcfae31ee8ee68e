pub mod client;
pub mod enums;
pub mod error;
pub mod frame;
pub mod handler;
pub mod heartbeat;
pub mod messages;
pub mod parse;
pub mod session;
pub mod transport;

pub use client::{WsConnector, WsTransport};
pub use enums::*;
pub use error::*;
pub use frame::*;
pub use heartbeat::*;
pub use parse::*;
pub use session::*;
pub use transport::*;
