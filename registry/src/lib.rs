pub use self::registry::{BanEntry, BanRegistry, MemBanRegistry};
pub use self::subnet::{Subnet, SubnetParseError};

mod registry;
mod subnet;
