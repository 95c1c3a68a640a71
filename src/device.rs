use atat::blocking::AtatClient;
use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::{
    command::{
        control::{types::Echo, EscapeDataMode, SetEcho},
        mobile_control::{
            types::{Functionality, ResetMode},
            SetModuleFunctionality,
        },
        psn::{DeactivatePDPContext, EnterPPP, SetPDPContextDefinition},
        ContextId, AT,
    },
    config::{ModemProfile, SerialConfig},
    modules::ModuleParams as _,
    session::{DeviceHandle, ModemBackend, ModemMode, StatusCode},
};

/// Generic failure
pub const STATUS_FAIL: StatusCode = -1;
/// The modem did not answer in time
pub const STATUS_TIMEOUT: StatusCode = 0x107;

/// PDP context the PPP call is dialed on
const DATA_CONTEXT: ContextId = ContextId(1);

fn status_code(e: atat::Error) -> StatusCode {
    warn!("AT command failed: {:?}", e);
    match e {
        atat::Error::Timeout => STATUS_TIMEOUT,
        _ => STATUS_FAIL,
    }
}

/// Device handle that drives mode changes with AT commands.
pub struct AtDevice<C, D> {
    client: C,
    delay: D,
    profile: ModemProfile,
    data_mode: bool,
}

impl<C, D> AtDevice<C, D>
where
    C: AtatClient,
    D: DelayNs,
{
    pub fn new(client: C, delay: D, profile: ModemProfile) -> Self {
        Self {
            client,
            delay,
            profile,
            data_mode: false,
        }
    }

    fn wait(&mut self, duration: Duration) {
        let mut remaining = duration.as_micros();
        while remaining > 0 {
            let chunk = remaining.min(u32::MAX as u64);
            self.delay.delay_us(chunk as u32);
            remaining -= chunk;
        }
    }

    fn send<Cmd: atat::AtatCmd>(&mut self, cmd: &Cmd) -> Result<Cmd::Response, StatusCode> {
        let res = self.client.send(cmd).map_err(status_code);
        self.wait(self.profile.variant().command_delay_default());
        res
    }

    fn enter_data_mode(&mut self) -> Result<(), StatusCode> {
        self.send(&AT)?;
        self.send(&SetEcho {
            enabled: Echo::Disable,
        })?;

        let profile = self.profile.clone();
        self.send(&SetPDPContextDefinition {
            cid: DATA_CONTEXT,
            pdp_type: "IP",
            apn: profile.apn(),
        })?;

        self.send(&EnterPPP { cid: DATA_CONTEXT })?;
        info!("Modem entered PPP data mode on apn {}", profile.apn());

        self.data_mode = true;
        Ok(())
    }

    fn escape_data_mode(&mut self) -> Result<(), StatusCode> {
        let guard = self.profile.variant().escape_guard_time();
        self.wait(guard);
        let res = self.client.send(&EscapeDataMode).map_err(status_code);
        self.wait(guard);
        res?;

        self.data_mode = false;
        Ok(())
    }

    fn reboot(&mut self) -> Result<(), StatusCode> {
        if self.data_mode {
            self.escape_data_mode()?;
            self.send(&DeactivatePDPContext)?;
        }

        warn!("Rebooting {} module", self.profile.variant().name());
        self.send(&SetModuleFunctionality {
            fun: Functionality::Full,
            rst: Some(ResetMode::Reset),
        })?;
        self.wait(self.profile.variant().reboot_command_wait());
        Ok(())
    }

    pub fn release(self) -> (C, D) {
        (self.client, self.delay)
    }
}

impl<C, D> DeviceHandle for AtDevice<C, D>
where
    C: AtatClient,
    D: DelayNs,
{
    fn set_mode(&mut self, mode: ModemMode) -> Result<(), StatusCode> {
        match mode {
            ModemMode::Data if self.data_mode => Ok(()),
            ModemMode::Data => self.enter_data_mode(),
            ModemMode::Command if !self.data_mode => Ok(()),
            ModemMode::Command => self.escape_data_mode(),
            ModemMode::Reset => self.reboot(),
        }
    }
}

/// Owns the AT client of one serial port and the network interface the PPP
/// link is attached to. Each is handed out once, so a port can back at most
/// one [`ModemSession`](crate::session::ModemSession).
pub struct AtBackend<C, D, N> {
    port: Option<(C, D)>,
    netif: Option<N>,
}

impl<C, D, N> AtBackend<C, D, N> {
    pub fn new(client: C, delay: D, netif: N) -> Self {
        Self {
            port: Some((client, delay)),
            netif: Some(netif),
        }
    }
}

impl<C, D, N> ModemBackend for AtBackend<C, D, N>
where
    C: AtatClient,
    D: DelayNs,
{
    type Netif = N;
    type Device = AtDevice<C, D>;

    fn new_netif(&mut self) -> Option<N> {
        self.netif.take()
    }

    fn new_device(
        &mut self,
        serial: &SerialConfig,
        profile: &ModemProfile,
        _netif: &N,
    ) -> Option<Self::Device> {
        let (client, delay) = self.port.take()?;
        debug!(
            "DTE {} baud, rx {} / tx {} bytes",
            serial.baud_rate, serial.rx_buffer_size, serial.tx_buffer_size
        );
        Some(AtDevice::new(client, delay, profile.clone()))
    }
}
