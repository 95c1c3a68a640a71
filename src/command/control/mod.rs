//! ### V.25ter control
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::Echo;

/// Command echo E
///
/// Controls whether the DCE echoes characters received from the DTE while in
/// command state. Echo is turned off before dialing so responses can be
/// parsed without stripping the echoed command.
#[derive(Clone, AtatCmd)]
#[at_cmd("E", NoResponse, value_sep = false)]
pub struct SetEcho {
    #[at_arg(position = 0)]
    pub enabled: Echo,
}

/// Escape sequence +++
///
/// Switches the DCE from data mode to online command mode while keeping the
/// PPP call up. Must be surrounded by at least the module's guard time of
/// silence on the line, and carries no `AT` prefix or line termination.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "+++",
    NoResponse,
    cmd_prefix = "",
    termination = "",
    timeout_ms = 2000
)]
pub struct EscapeDataMode;
