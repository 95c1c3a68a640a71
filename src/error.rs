use crate::session::{ModemMode, StatusCode};

/// Resource allocation failures while setting up the bring-up. All of these
/// are fatal and abort the remaining bring-up steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The backend could not allocate a network interface for the PPP link
    Netif,
    /// The backend could not construct a device handle, e.g. because the
    /// serial port is already owned by another session
    Device,
    /// No free handler slot left on the event loop
    EventLoopFull,
    /// Empty APN, or longer than the 99 bytes allowed by 3GPP TS 23.003
    InvalidApn,
}

/// The modem rejected a mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeError {
    /// The mode that was requested
    pub mode: ModemMode,
    /// Status code reported by the device handle
    pub code: StatusCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    Init(InitError),
    Mode(ModeError),

    /// No IP address was obtained within `BringupConfig::connect_timeout`
    ConnectTimeout,
    /// The address was lost again before bring-up could hand it over
    ConnectionLost,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Init(e) => defmt::write!(f, "Init({:?})", e),
            Self::Mode(e) => defmt::write!(f, "Mode({:?})", e),
            Self::ConnectTimeout => defmt::write!(f, "ConnectTimeout"),
            Self::ConnectionLost => defmt::write!(f, "ConnectionLost"),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<ModeError> for Error {
    fn from(e: ModeError) -> Self {
        Self::Mode(e)
    }
}
