pub(crate) mod bg96;
pub(crate) mod sim7000;
pub(crate) mod sim7070;
pub(crate) mod sim7600;
pub(crate) mod sim800;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

pub trait ModuleParams: Copy {
    /// The time for which PWRKEY must be pulled low to effect power-on
    fn power_on_pull_time(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// How long the supply has to be stable before PWRKEY may be pulsed
    fn power_settle_time(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// How long the reset line has to be held low to reset the module
    fn reset_hold(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// How long to wait before the module is ready after boot
    fn boot_wait(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// How long to wait before the module is ready after it has been commanded
    /// to reboot
    fn reboot_command_wait(&self) -> Duration {
        Duration::from_secs(10)
    }

    /// Idle time required on the line before and after the `+++` escape
    /// sequence
    fn escape_guard_time(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// How long to wait between the end of one AT command and the start of the
    /// next, default value
    fn command_delay_default(&self) -> Duration {
        Duration::from_millis(100)
    }
}

/// The closed set of supported modem chipsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemVariant {
    Generic,
    Sim800,
    Sim7000,
    Sim7070,
    Sim7600,
    Bg96,
}

impl ModemVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sim800 => "SIM800",
            Self::Sim7000 => "SIM7000",
            Self::Sim7070 => "SIM7070",
            Self::Sim7600 => "SIM7600",
            Self::Bg96 => "BG96",
        }
    }
}

macro_rules! inner {
    ($self: ident, $fn: ident) => {
        match $self {
            Self::Generic => Generic.$fn(),
            Self::Sim800 => sim800::Sim800.$fn(),
            Self::Sim7000 => sim7000::Sim7000.$fn(),
            Self::Sim7070 => sim7070::Sim7070.$fn(),
            Self::Sim7600 => sim7600::Sim7600.$fn(),
            Self::Bg96 => bg96::Bg96.$fn(),
        }
    };
}

impl ModuleParams for ModemVariant {
    fn power_on_pull_time(&self) -> Duration {
        inner!(self, power_on_pull_time)
    }

    fn power_settle_time(&self) -> Duration {
        inner!(self, power_settle_time)
    }

    fn reset_hold(&self) -> Duration {
        inner!(self, reset_hold)
    }

    fn boot_wait(&self) -> Duration {
        inner!(self, boot_wait)
    }

    fn reboot_command_wait(&self) -> Duration {
        inner!(self, reboot_command_wait)
    }

    fn escape_guard_time(&self) -> Duration {
        inner!(self, escape_guard_time)
    }

    fn command_delay_default(&self) -> Duration {
        inner!(self, command_delay_default)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Generic;

impl ModuleParams for Generic {}
