#![cfg_attr(not(test), no_std)]

//! Bring-up of a cellular modem over a serial PPP link.
//!
//! The modem is power cycled through its control lines ([`pwr`]), a
//! [`session::ModemSession`] is opened over the serial port and switched into
//! PPP data mode, and a [`bridge::NetworkEventBridge`] follows the IP and PPP
//! events until an address has been obtained. [`bringup::Bringup`] runs these
//! steps in order.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bridge;
pub mod bringup;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod modules;
#[cfg(feature = "ppp")]
pub mod ppp;
pub mod pwr;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use bridge::{ConnectionState, NetworkEventBridge};
pub use bringup::{Bringup, Connected};
pub use error::Error;
pub use modules::ModemVariant;
