use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    signal::Signal,
};
use embassy_time::{with_timeout, Duration};
use no_std_net::Ipv4Addr;

use crate::{
    error::InitError,
    event::{Dotted, EventBus, EventClass, EventSubscriber, IpEvent, IpInfo, PppStatus},
};

/// Connection state as seen from the IP/PPP event stream.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    /// The PPP layer reported an error. No recovery is attempted.
    Error,
}

struct Shared {
    state: ConnectionState,
    ip_info: Option<IpInfo>,
    last_error: Option<PppStatus>,
}

/// Turns IP and PPP lifecycle events into a [`ConnectionState`], and lets one
/// waiter block until an IP address has been obtained.
///
/// Event handlers only update state and signal, they never block. The
/// signal is a single slot consumed by the waiter, so a connection wakes the
/// waiter exactly once.
pub struct NetworkEventBridge {
    shared: Mutex<CriticalSectionRawMutex, RefCell<Shared>>,
    connected: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for NetworkEventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkEventBridge {
    pub const fn new() -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                state: ConnectionState::Idle,
                ip_info: None,
                last_error: None,
            })),
            connected: Signal::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock(|s| s.borrow().state)
    }

    /// Addressing of the current connection, if any.
    pub fn ip_info(&self) -> Option<IpInfo> {
        self.shared.lock(|s| s.borrow().ip_info)
    }

    /// The last error reported by the PPP layer.
    pub fn last_error(&self) -> Option<PppStatus> {
        self.shared.lock(|s| s.borrow().last_error)
    }

    /// Register for IP and PPP events on `bus`. Subscribing twice to the same
    /// bus is a no-op.
    pub fn subscribe<'a, B>(&'a self, bus: &B) -> Result<(), InitError>
    where
        B: EventBus<'a> + ?Sized,
    {
        bus.register(EventClass::Ip, self)?;
        if let Err(e) = bus.register(EventClass::Ppp, self) {
            bus.unregister(self);
            return Err(e);
        }
        debug!("Subscribed to IP and PPP events");
        Ok(())
    }

    pub fn unsubscribe<'a, B>(&self, bus: &B)
    where
        B: EventBus<'a> + ?Sized,
    {
        bus.unregister(self);
        debug!("Unsubscribed from IP and PPP events");
    }

    /// Data mode was requested, an IP address is expected next.
    pub fn begin_connecting(&self) {
        self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            match s.state {
                ConnectionState::Idle | ConnectionState::Disconnected | ConnectionState::Error => {
                    debug!("Connection state {:?} -> Connecting", s.state);
                    s.state = ConnectionState::Connecting;
                }
                state => debug!("Already {:?}", state),
            }
        })
    }

    /// Bring-up was aborted.
    pub(crate) fn mark_failed(&self) {
        self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            s.state = ConnectionState::Error;
            s.ip_info = None;
        });
        self.connected.reset();
    }

    /// Block until an IP address has been obtained. Returns `false` if
    /// `timeout` elapsed first, `None` waits forever.
    pub fn wait_connected(&self, timeout: Option<Duration>) -> bool {
        embassy_futures::block_on(self.wait_for_connection(timeout))
    }

    /// Async version of [`Self::wait_connected`].
    pub async fn wait_for_connection(&self, timeout: Option<Duration>) -> bool {
        if self.state() == ConnectionState::Connected {
            self.connected.reset();
            return true;
        }

        match timeout {
            None => {
                self.connected.wait().await;
                true
            }
            Some(timeout) => with_timeout(timeout, self.connected.wait()).await.is_ok(),
        }
    }

    /// Accepted from any state, including `Idle`: an address that shows up
    /// before data mode was requested still counts as a connection.
    fn got_ip(&self, info: &IpInfo) {
        let (previous, had_address) = self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            let previous = s.state;
            let had_address = s.ip_info.is_some();
            s.state = ConnectionState::Connected;
            s.ip_info = Some(*info);
            (previous, had_address)
        });

        if previous == ConnectionState::Idle {
            debug!("Got IP before data mode was requested");
        }

        info!("Modem Connect to PPP Server");
        info!("~~~~~~~~~~~~~~");
        info!("IP          : {}", Dotted(info.ip));
        info!("Netmask     : {}", Dotted(info.netmask));
        info!("Gateway     : {}", Dotted(info.gateway));
        info!(
            "Name Server1: {}",
            Dotted(info.dns[0].unwrap_or(Ipv4Addr::UNSPECIFIED))
        );
        info!(
            "Name Server2: {}",
            Dotted(info.dns[1].unwrap_or(Ipv4Addr::UNSPECIFIED))
        );
        info!("~~~~~~~~~~~~~~");

        if had_address {
            debug!("IP info updated");
        } else {
            self.connected.signal(());
            info!("GOT ip event!!!");
        }
    }

    /// Also ends a connection that a PPP error marked as `Error`, as long as
    /// it still holds an address.
    fn lost_ip(&self) {
        let was_connected = self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            if s.ip_info.is_none() {
                return false;
            }
            s.state = ConnectionState::Disconnected;
            s.ip_info = None;
            true
        });

        if was_connected {
            self.connected.reset();
            info!("Modem Disconnect from PPP Server");
        } else {
            debug!("Lost IP while not connected, ignoring");
        }
    }
}

impl EventSubscriber for NetworkEventBridge {
    fn on_ip_event(&self, event: &IpEvent) {
        match event {
            IpEvent::GotIp(info) => self.got_ip(info),
            IpEvent::LostIp => self.lost_ip(),
        }
    }

    fn on_ppp_event(&self, status: PppStatus) {
        info!("PPP state changed event {}", status.code());

        if status == PppStatus::ErrorUser {
            info!("User interrupted");
        }

        // Informational only: addressing and a pending wake-up are kept.
        if status.is_error() {
            warn!("PPP error {:?}", status);
            self.shared.lock(|s| {
                let s = &mut *s.borrow_mut();
                s.state = ConnectionState::Error;
                s.last_error = Some(status);
            });
        }
    }
}
