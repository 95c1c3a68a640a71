//! ### Mobile equipment control and status Commands
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::{Functionality, ResetMode};

/// Set module functionality +CFUN
///
/// Selects the level of functionality <fun> in the MT. With <rst> set to
/// [`ResetMode::Reset`] the MT reboots before applying it.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CFUN", NoResponse, timeout_ms = 180000)]
pub struct SetModuleFunctionality {
    #[at_arg(position = 0)]
    pub fun: Functionality,
    #[at_arg(position = 1)]
    pub rst: Option<ResetMode>,
}
