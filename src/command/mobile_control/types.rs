//! Argument and parameter types used by Mobile equipment control and status Commands
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum Functionality {
    /// 0: minimum functionality, RF circuits disabled
    Minimum = 0,
    /// 1 (factory-programmed value): full functionality
    Full = 1,
    /// 4: RF circuits disabled, airplane mode
    AirplaneMode = 4,
}

/// Reset mode. This parameter can be used only when <fun> is 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum ResetMode {
    /// Do not reset the MT before setting it to the selected <fun>
    DontReset = 0,
    /// Reset the MT before setting it to the selected <fun>
    Reset = 1,
}
