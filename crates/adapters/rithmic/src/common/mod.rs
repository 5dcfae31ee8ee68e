pub mod consts;
pub mod credential;
pub mod enums;
pub mod testing;
pub mod urls;

pub use consts::*;
pub use credential::*;
pub use enums::*;
pub use urls::*;
