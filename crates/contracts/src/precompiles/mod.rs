pub mod common_errors;
pub mod distribution;
pub mod staking;

pub use common_errors::*;
pub use distribution::*;
pub use staking::*;

use alloy::primitives::{Address, address};

pub const STAKING_PRECOMPILE_ADDRESS: Address =
    address!("0xd9a998cac66092748ffec7cfbd155aae1737c2ff");
pub const DISTRIBUTION_PRECOMPILE_ADDRESS: Address =
    address!("0x0000000000000000000000000000000000000069");
