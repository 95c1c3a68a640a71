use core::convert::Infallible;
use embassy_time::Duration;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use heapless::String;
use serde::{Deserialize, Serialize};

use crate::{error::InitError, modules::ModemVariant};

/// Maximum APN length, per 3GPP TS 23.003
pub const APN_MAX_LEN: usize = 99;

/// Stand-in for a modem control line that is not wired up.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Inverts an output, for control lines driven through an open-collector
/// transistor stage.
pub struct ReverseOutputPin<P: OutputPin>(pub P);

impl<P: OutputPin> ErrorType for ReverseOutputPin<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for ReverseOutputPin<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        self.0.set_state(!state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    RtsCts,
}

/// DTE side of the serial link, handed to the transport driver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,

    pub tx_pin: u8,
    pub rx_pin: u8,
    /// `None` leaves the line unassigned
    pub rts_pin: Option<u8>,
    pub cts_pin: Option<u8>,

    pub rx_buffer_size: usize,
    pub tx_buffer_size: usize,
    pub event_queue_size: usize,
    pub dte_buffer_size: usize,

    pub task_priority: u8,
    pub task_stack_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            tx_pin: 27,
            rx_pin: 26,
            rts_pin: None,
            cts_pin: None,
            rx_buffer_size: 1024,
            tx_buffer_size: 512,
            event_queue_size: 30,
            dte_buffer_size: 1024 / 2,
            task_priority: 5,
            task_stack_size: 2048,
        }
    }
}

/// Which chipset is on the other end of the serial link, and the APN to
/// dial into. Only constructed through [`ModemProfile::new`], so it is not
/// `Deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModemProfile {
    variant: ModemVariant,
    apn: String<APN_MAX_LEN>,
}

impl ModemProfile {
    pub fn new(variant: ModemVariant, apn: &str) -> Result<Self, InitError> {
        if apn.is_empty() {
            return Err(InitError::InvalidApn);
        }

        let mut s = String::new();
        s.push_str(apn).map_err(|_| InitError::InvalidApn)?;

        Ok(Self { variant, apn: s })
    }

    pub fn variant(&self) -> ModemVariant {
        self.variant
    }

    pub fn apn(&self) -> &str {
        self.apn.as_str()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ModemProfile {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "{:?} apn={=str}", self.variant, self.apn.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BringupConfig {
    /// Upper bound on the wait for an IP address. `None` waits forever.
    pub connect_timeout: Option<Duration>,
}
