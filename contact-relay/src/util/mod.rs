//! Small shared helpers.

pub mod client_ip;
pub mod clock;

pub use client_ip::client_ip;
pub use clock::{Clock, SystemClock};
