use crate::{
    config::{ModemProfile, SerialConfig},
    error::{Error, InitError, ModeError},
};

/// Status code reported by a device handle when it rejects a mode change.
pub type StatusCode = i32;

/// Operating mode of the modem's serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemMode {
    /// AT command mode
    Command,
    /// PPP data mode
    Data,
    /// Reboot the module, ending up in command mode
    Reset,
}

/// A constructed modem device, as handed out by a [`ModemBackend`].
pub trait DeviceHandle {
    /// Ask the modem firmware to switch modes. For [`ModemMode::Data`] this
    /// starts PPP negotiation over the serial link.
    fn set_mode(&mut self, mode: ModemMode) -> Result<(), StatusCode>;
}

/// The AT/PPP engine that owns the serial port and the network interface.
pub trait ModemBackend {
    type Netif;
    type Device: DeviceHandle;

    /// Allocate the network interface the PPP link attaches to.
    fn new_netif(&mut self) -> Option<Self::Netif>;

    /// Construct the device handle for `profile` on the serial port described
    /// by `serial`, attached to `netif`.
    fn new_device(
        &mut self,
        serial: &SerialConfig,
        profile: &ModemProfile,
        netif: &Self::Netif,
    ) -> Option<Self::Device>;
}

/// One live modem: exactly one device handle and one network interface.
///
/// Mode changes take `&mut self`, so two transitions can never be in flight
/// at the same time.
pub struct ModemSession<B: ModemBackend> {
    serial: SerialConfig,
    profile: ModemProfile,
    netif: B::Netif,
    device: B::Device,
    mode: ModemMode,
}

impl<B: ModemBackend> ModemSession<B> {
    pub fn open(
        serial: SerialConfig,
        profile: ModemProfile,
        backend: &mut B,
    ) -> Result<Self, Error> {
        let netif = backend.new_netif().ok_or_else(|| {
            error!("Failed to allocate PPP network interface");
            InitError::Netif
        })?;

        info!(
            "Initializing modem for the {} module...",
            profile.variant().name()
        );
        let device = backend
            .new_device(&serial, &profile, &netif)
            .ok_or_else(|| {
                error!("Failed to create {} device", profile.variant().name());
                InitError::Device
            })?;

        Ok(Self {
            serial,
            profile,
            netif,
            device,
            mode: ModemMode::Command,
        })
    }

    pub fn set_mode(&mut self, mode: ModemMode) -> Result<(), Error> {
        if mode == self.mode {
            debug!("Modem already in {:?} mode", mode);
            return Ok(());
        }

        debug!("Switching modem {:?} -> {:?}", self.mode, mode);
        self.device
            .set_mode(mode)
            .map_err(|code| ModeError { mode, code })?;

        self.mode = match mode {
            ModemMode::Reset => ModemMode::Command,
            m => m,
        };
        Ok(())
    }

    pub fn mode(&self) -> ModemMode {
        self.mode
    }

    pub fn serial(&self) -> &SerialConfig {
        &self.serial
    }

    pub fn profile(&self) -> &ModemProfile {
        &self.profile
    }

    pub fn netif(&self) -> &B::Netif {
        &self.netif
    }

    pub fn device_mut(&mut self) -> &mut B::Device {
        &mut self.device
    }

    /// Tear the session down, giving back the handles it owned.
    pub fn close(self) -> (B::Device, B::Netif) {
        debug!("Closing modem session");
        (self.device, self.netif)
    }
}
