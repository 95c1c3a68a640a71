use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    bridge::NetworkEventBridge,
    config::{BringupConfig, ModemProfile, SerialConfig},
    error::{Error, ModeError},
    event::{EventBus, IpInfo},
    pwr::{ResetSequencer, ResetTiming},
    session::{ModemBackend, ModemMode, ModemSession},
};

/// A modem in data mode with an IP address.
pub struct Connected<B: ModemBackend> {
    pub session: ModemSession<B>,
    pub ip_info: IpInfo,
}

/// Runs the bring-up sequence once: subscribe to network events, power cycle
/// the modem, open the session, dial PPP and wait for an address.
///
/// Every step is fatal on failure and nothing is retried.
pub struct Bringup<'t, PK, RST, PWR, DTR, D> {
    sequencer: ResetSequencer<PK, RST, PWR, DTR, D>,
    timing: ResetTiming<'t>,
    serial: SerialConfig,
    profile: ModemProfile,
    config: BringupConfig,
}

impl<'t, PK, RST, PWR, DTR, D> Bringup<'t, PK, RST, PWR, DTR, D>
where
    PK: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DTR: OutputPin,
    D: DelayNs,
{
    pub fn new(
        sequencer: ResetSequencer<PK, RST, PWR, DTR, D>,
        timing: ResetTiming<'t>,
        serial: SerialConfig,
        profile: ModemProfile,
    ) -> Self {
        Self {
            sequencer,
            timing,
            serial,
            profile,
            config: BringupConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BringupConfig) -> Self {
        self.config = config;
        self
    }

    /// On failure after subscribing, `bridge` is unsubscribed from `bus`
    /// again and left in [`ConnectionState::Error`](crate::bridge::ConnectionState::Error).
    pub fn run<'a, B, E>(
        &mut self,
        bridge: &'a NetworkEventBridge,
        bus: &E,
        backend: &mut B,
    ) -> Result<Connected<B>, Error>
    where
        B: ModemBackend,
        E: EventBus<'a> + ?Sized,
    {
        info!("Startup..");
        bridge.subscribe(bus)?;

        self.connect(bridge, backend).map_err(|e| {
            bridge.unsubscribe(bus);
            bridge.mark_failed();
            e
        })
    }

    fn connect<B: ModemBackend>(
        &mut self,
        bridge: &NetworkEventBridge,
        backend: &mut B,
    ) -> Result<Connected<B>, Error> {
        self.sequencer.run(&self.timing);

        let mut session = ModemSession::open(self.serial.clone(), self.profile.clone(), backend)?;

        bridge.begin_connecting();
        if let Err(e) = session.set_mode(ModemMode::Data) {
            if let Error::Mode(ModeError { code, .. }) = e {
                error!("set_mode(Data) failed with {}", code);
            }
            return Err(e);
        }

        if !bridge.wait_connected(self.config.connect_timeout) {
            error!("No IP address obtained in time");
            return Err(Error::ConnectTimeout);
        }

        let ip_info = bridge.ip_info().ok_or_else(|| {
            error!("Connection dropped before bring-up completed");
            Error::ConnectionLost
        })?;

        Ok(Connected { session, ip_info })
    }

    pub fn release(self) -> ResetSequencer<PK, RST, PWR, DTR, D> {
        self.sequencer
    }
}
