//! FlightSurety Core - Domain types
//!
//! This crate contains the fundamental types shared by every ledger component:
//! - `Amount`: Non-negative decimal wrapper for premiums, funding and payouts
//! - `Principal`: Identity of an operator, passenger, oracle or gateway
//! - `Clock`: Source of "now" for departure checks and journal timestamps

pub mod amount;
pub mod clock;
pub mod principal;

pub use amount::{Amount, AmountError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use principal::{Principal, PrincipalError};
