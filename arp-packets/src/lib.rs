mod hardware_addr;
pub use self::hardware_addr::*;

mod ethernet;
pub use self::ethernet::*;

mod arp;
pub use self::arp::*;

mod error;
pub use self::error::*;
