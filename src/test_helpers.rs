//! Doubles for the hardware, the AT client and the modem backend.

use std::{cell::RefCell, rc::Rc, sync::Once};

use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, ErrorType, OutputPin, PinState},
};

use crate::{
    config::{ModemProfile, SerialConfig},
    pwr::PinRole,
    session::{DeviceHandle, ModemBackend, ModemMode, StatusCode},
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
            .is_test(true)
            .init();
    });
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HwOp {
    Set(PinRole, PinState),
    Delay(Duration),
}

/// Every pin change and delay, in the order they happened.
#[derive(Clone, Default)]
pub struct HwLog(Rc<RefCell<Vec<HwOp>>>);

impl HwLog {
    pub fn ops(&self) -> Vec<HwOp> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, op: HwOp) {
        self.0.borrow_mut().push(op);
    }
}

pub struct MockPin {
    role: PinRole,
    log: HwLog,
    fail: bool,
}

impl MockPin {
    pub fn new(role: PinRole, log: &HwLog) -> Self {
        Self {
            role,
            log: log.clone(),
            fail: false,
        }
    }

    /// A pin whose every write fails, without being recorded.
    pub fn failing(role: PinRole, log: &HwLog) -> Self {
        Self {
            fail: true,
            ..Self::new(role, log)
        }
    }

    fn set(&mut self, level: PinState) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.log.push(HwOp::Set(self.role, level));
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(PinState::High)
    }
}

/// Records delays instead of sleeping.
pub struct MockDelay {
    log: HwLog,
}

impl MockDelay {
    pub fn new(log: &HwLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log
            .push(HwOp::Delay(Duration::from_micros(u64::from(ns) / 1000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.push(HwOp::Delay(Duration::from_micros(u64::from(us))));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(HwOp::Delay(Duration::from_millis(u64::from(ms))));
    }
}

/// Answers every command with an empty `OK`, except those starting with a
/// configured prefix.
#[derive(Clone, Default)]
pub struct MockAtClient {
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    fail: Option<(&'static [u8], atat::Error)>,
}

impl MockAtClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, prefix: &'static [u8], error: atat::Error) -> Self {
        self.fail = Some((prefix, error));
        self
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }
}

impl atat::blocking::AtatClient for MockAtClient {
    fn send<Cmd: atat::AtatCmd>(&mut self, cmd: &Cmd) -> Result<Cmd::Response, atat::Error> {
        let mut buf = vec![0u8; Cmd::MAX_LEN];
        let len = cmd.write(&mut buf);
        buf.truncate(len);

        let failed = matches!(&self.fail, Some((prefix, _)) if buf.starts_with(prefix));
        self.sent.borrow_mut().push(buf);

        match &self.fail {
            Some((_, error)) if failed => Err(error.clone()),
            _ => cmd.parse(Ok(b"")),
        }
    }
}

#[derive(Debug)]
pub struct MockNetif(pub u32);

pub struct MockDevice {
    pub netif: u32,
    pub requested: Vec<ModemMode>,
    reject: Option<(ModemMode, StatusCode)>,
}

impl DeviceHandle for MockDevice {
    fn set_mode(&mut self, mode: ModemMode) -> Result<(), StatusCode> {
        self.requested.push(mode);
        match self.reject {
            Some((rejected, code)) if rejected == mode => Err(code),
            _ => Ok(()),
        }
    }
}

pub struct MockBackend {
    pub netifs_created: usize,
    pub devices_created: usize,
    netif: bool,
    device: bool,
    reject: Option<(ModemMode, StatusCode)>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            netifs_created: 0,
            devices_created: 0,
            netif: true,
            device: true,
            reject: None,
        }
    }

    pub fn without_netif(mut self) -> Self {
        self.netif = false;
        self
    }

    pub fn without_device(mut self) -> Self {
        self.device = false;
        self
    }

    /// Devices reject switching to `mode` with `code`.
    pub fn rejecting(mut self, mode: ModemMode, code: StatusCode) -> Self {
        self.reject = Some((mode, code));
        self
    }
}

impl ModemBackend for MockBackend {
    type Netif = MockNetif;
    type Device = MockDevice;

    fn new_netif(&mut self) -> Option<MockNetif> {
        if !self.netif {
            return None;
        }
        self.netifs_created += 1;
        Some(MockNetif(self.netifs_created as u32))
    }

    fn new_device(
        &mut self,
        _serial: &SerialConfig,
        _profile: &ModemProfile,
        netif: &MockNetif,
    ) -> Option<MockDevice> {
        if !self.device {
            return None;
        }
        self.devices_created += 1;
        Some(MockDevice {
            netif: netif.0,
            requested: vec![],
            reject: self.reject,
        })
    }
}
