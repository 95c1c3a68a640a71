//! IP and PPP lifecycle events, and a small dispatch loop to deliver them.

use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    channel::{Channel, TrySendError},
};
use heapless::Vec;
use no_std_net::Ipv4Addr;

use crate::error::InitError;

/// Addressing handed out by the PPP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dns: [Option<Ipv4Addr>; 2],
}

#[cfg(feature = "defmt")]
impl defmt::Format for IpInfo {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "IpInfo {{ ip: {}, netmask: {}, gateway: {} }}",
            Dotted(self.ip),
            Dotted(self.netmask),
            Dotted(self.gateway)
        )
    }
}

/// Formats an address as `a.b.c.d`, with either logging backend.
#[derive(Clone, Copy)]
pub struct Dotted(pub Ipv4Addr);

impl core::fmt::Display for Dotted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d] = self.0.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Dotted {
    fn format(&self, f: defmt::Formatter<'_>) {
        let [a, b, c, d] = self.0.octets();
        defmt::write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpEvent {
    GotIp(IpInfo),
    LostIp,
}

const PHASE_OFFSET: i32 = 0x100;

/// Status reported by the PPP layer. Codes below [`PHASE_OFFSET`] are the
/// error class, the others are negotiation phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum PppStatus {
    ErrorNone = 0,
    ErrorParam = 1,
    ErrorOpen = 2,
    ErrorDevice = 3,
    ErrorAlloc = 4,
    /// Negotiation was stopped by the local side
    ErrorUser = 5,
    ErrorConnect = 6,
    ErrorAuthFail = 7,
    ErrorProtocol = 8,
    ErrorPeerDead = 9,
    ErrorIdleTimeout = 10,
    ErrorConnectTime = 11,
    ErrorLoopback = 12,

    PhaseDead = PHASE_OFFSET,
    PhaseMaster = PHASE_OFFSET + 1,
    PhaseHoldoff = PHASE_OFFSET + 2,
    PhaseInitialize = PHASE_OFFSET + 3,
    PhaseSerialConn = PHASE_OFFSET + 4,
    PhaseDormant = PHASE_OFFSET + 5,
    PhaseEstablish = PHASE_OFFSET + 6,
    PhaseAuthenticate = PHASE_OFFSET + 7,
    PhaseCallback = PHASE_OFFSET + 8,
    PhaseNetwork = PHASE_OFFSET + 9,
    PhaseRunning = PHASE_OFFSET + 10,
    PhaseTerminate = PHASE_OFFSET + 11,
    PhaseDisconnect = PHASE_OFFSET + 12,
}

impl PppStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_error(self) -> bool {
        self != Self::ErrorNone && self.code() < PHASE_OFFSET
    }
}

impl TryFrom<i32> for PppStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::ErrorNone,
            1 => Self::ErrorParam,
            2 => Self::ErrorOpen,
            3 => Self::ErrorDevice,
            4 => Self::ErrorAlloc,
            5 => Self::ErrorUser,
            6 => Self::ErrorConnect,
            7 => Self::ErrorAuthFail,
            8 => Self::ErrorProtocol,
            9 => Self::ErrorPeerDead,
            10 => Self::ErrorIdleTimeout,
            11 => Self::ErrorConnectTime,
            12 => Self::ErrorLoopback,
            0x100 => Self::PhaseDead,
            0x101 => Self::PhaseMaster,
            0x102 => Self::PhaseHoldoff,
            0x103 => Self::PhaseInitialize,
            0x104 => Self::PhaseSerialConn,
            0x105 => Self::PhaseDormant,
            0x106 => Self::PhaseEstablish,
            0x107 => Self::PhaseAuthenticate,
            0x108 => Self::PhaseCallback,
            0x109 => Self::PhaseNetwork,
            0x10a => Self::PhaseRunning,
            0x10b => Self::PhaseTerminate,
            0x10c => Self::PhaseDisconnect,
            other => return Err(other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetEvent {
    Ip(IpEvent),
    Ppp(PppStatus),
}

impl NetEvent {
    pub fn class(&self) -> EventClass {
        match self {
            Self::Ip(_) => EventClass::Ip,
            Self::Ppp(_) => EventClass::Ppp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventClass {
    Ip,
    Ppp,
}

/// Receives events from an [`EventBus`]. Handlers run in the dispatch context
/// and must not block.
pub trait EventSubscriber: Sync {
    fn on_ip_event(&self, event: &IpEvent);
    fn on_ppp_event(&self, status: PppStatus);
}

pub trait EventBus<'a> {
    /// Register `handler` for every event of `class`. Registering the same
    /// handler for the same class again is a no-op.
    fn register(
        &self,
        class: EventClass,
        handler: &'a dyn EventSubscriber,
    ) -> Result<(), InitError>;

    /// Drop every registration of `handler`.
    fn unregister(&self, handler: &dyn EventSubscriber);
}

fn same_handler(a: &dyn EventSubscriber, b: &dyn EventSubscriber) -> bool {
    core::ptr::eq(
        a as *const dyn EventSubscriber as *const (),
        b as *const dyn EventSubscriber as *const (),
    )
}

type Registry<'a, const N: usize> = Vec<(EventClass, &'a dyn EventSubscriber), N>;

/// Bounded handler registry with synchronous dispatch.
pub struct EventLoop<'a, const N: usize> {
    handlers: Mutex<CriticalSectionRawMutex, RefCell<Registry<'a, N>>>,
}

impl<'a, const N: usize> Default for EventLoop<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> EventLoop<'a, N> {
    pub const fn new() -> Self {
        Self {
            handlers: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of registrations currently held.
    pub fn len(&self) -> usize {
        self.handlers.lock(|h| h.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every handler registered for its class.
    ///
    /// Handlers are called after the registry lock is released, so they may
    /// (un)register themselves.
    pub fn post(&self, event: &NetEvent) {
        let handlers = self.handlers.lock(|h| h.borrow().clone());
        let class = event.class();

        for (_, handler) in handlers.iter().filter(|(c, _)| *c == class) {
            match event {
                NetEvent::Ip(ev) => handler.on_ip_event(ev),
                NetEvent::Ppp(status) => handler.on_ppp_event(*status),
            }
        }
    }

    /// Dispatch everything arriving on `channel`, forever.
    pub async fn run<const M: usize>(&self, channel: &EventChannel<M>) -> ! {
        loop {
            let event = channel.receive().await;
            trace!("Dispatching {:?}", event.class());
            self.post(&event);
        }
    }
}

impl<'a, const N: usize> EventBus<'a> for EventLoop<'a, N> {
    fn register(
        &self,
        class: EventClass,
        handler: &'a dyn EventSubscriber,
    ) -> Result<(), InitError> {
        self.handlers.lock(|h| {
            let mut h = h.borrow_mut();
            if h
                .iter()
                .any(|(c, other)| *c == class && same_handler(*other, handler))
            {
                return Ok(());
            }
            h.push((class, handler)).map_err(|_| InitError::EventLoopFull)
        })
    }

    fn unregister(&self, handler: &dyn EventSubscriber) {
        self.handlers
            .lock(|h| h.borrow_mut().retain(|(_, other)| !same_handler(*other, handler)));
    }
}

/// Queue between event producers (e.g. a PPP runner callback) and
/// [`EventLoop::run`].
pub struct EventChannel<const N: usize> {
    inner: Channel<CriticalSectionRawMutex, NetEvent, N>,
}

impl<const N: usize> Default for EventChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventChannel<N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Queue `event` without waiting. Hands the event back if the queue is
    /// full.
    pub fn try_post(&self, event: NetEvent) -> Result<(), NetEvent> {
        self.inner.try_send(event).map_err(|e| match e {
            TrySendError::Full(e) => e,
        })
    }

    pub async fn send(&self, event: NetEvent) {
        self.inner.send(event).await
    }

    pub async fn receive(&self) -> NetEvent {
        self.inner.receive().await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        ip: AtomicUsize,
        ppp: AtomicUsize,
    }

    impl EventSubscriber for Counter {
        fn on_ip_event(&self, _event: &IpEvent) {
            self.ip.fetch_add(1, Ordering::Relaxed);
        }

        fn on_ppp_event(&self, _status: PppStatus) {
            self.ppp.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn ppp_status_codes() {
        assert_eq!(PppStatus::try_from(5), Ok(PppStatus::ErrorUser));
        assert_eq!(PppStatus::try_from(0x10a), Ok(PppStatus::PhaseRunning));
        assert_eq!(PppStatus::try_from(13), Err(13));
        assert_eq!(PppStatus::PhaseDisconnect.code(), 0x10c);

        assert!(PppStatus::ErrorUser.is_error());
        assert!(PppStatus::ErrorLoopback.is_error());
        assert!(!PppStatus::ErrorNone.is_error());
        assert!(!PppStatus::PhaseDead.is_error());
    }

    #[test]
    fn dotted_formatting() {
        let addr = Dotted(Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(std::format!("{}", addr), "10.0.0.5");
    }

    #[test]
    fn post_only_reaches_matching_class() {
        let ip_only = Counter::default();
        let both = Counter::default();
        let bus: EventLoop<'_, 4> = EventLoop::new();

        bus.register(EventClass::Ip, &ip_only).unwrap();
        bus.register(EventClass::Ip, &both).unwrap();
        bus.register(EventClass::Ppp, &both).unwrap();

        bus.post(&NetEvent::Ip(IpEvent::LostIp));
        bus.post(&NetEvent::Ppp(PppStatus::PhaseRunning));

        assert_eq!(ip_only.ip.load(Ordering::Relaxed), 1);
        assert_eq!(ip_only.ppp.load(Ordering::Relaxed), 0);
        assert_eq!(both.ip.load(Ordering::Relaxed), 1);
        assert_eq!(both.ppp.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn registry_is_bounded_and_deduplicated() {
        let a = Counter::default();
        let b = Counter::default();
        let bus: EventLoop<'_, 2> = EventLoop::new();

        bus.register(EventClass::Ip, &a).unwrap();
        bus.register(EventClass::Ip, &a).unwrap();
        assert_eq!(bus.len(), 1);

        bus.register(EventClass::Ppp, &a).unwrap();
        assert_eq!(
            bus.register(EventClass::Ip, &b),
            Err(InitError::EventLoopFull)
        );

        bus.unregister(&a);
        assert!(bus.is_empty());
        bus.post(&NetEvent::Ip(IpEvent::LostIp));
        assert_eq!(a.ip.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn channel_hands_back_events_when_full() {
        let channel: EventChannel<1> = EventChannel::new();
        let lost = NetEvent::Ip(IpEvent::LostIp);

        assert_eq!(channel.try_post(lost), Ok(()));
        assert_eq!(
            channel.try_post(NetEvent::Ppp(PppStatus::ErrorUser)),
            Err(NetEvent::Ppp(PppStatus::ErrorUser))
        );
        assert_eq!(embassy_futures::block_on(channel.receive()), lost);
    }

    #[test]
    fn run_dispatches_queued_events() {
        let counter = Counter::default();
        let bus: EventLoop<'_, 2> = EventLoop::new();
        let channel: EventChannel<4> = EventChannel::new();
        bus.register(EventClass::Ppp, &counter).unwrap();

        channel.try_post(NetEvent::Ppp(PppStatus::PhaseEstablish)).unwrap();
        channel.try_post(NetEvent::Ppp(PppStatus::PhaseRunning)).unwrap();

        embassy_futures::block_on(async {
            embassy_futures::select::select(bus.run(&channel), async {
                while counter.ppp.load(Ordering::Relaxed) < 2 {
                    embassy_futures::yield_now().await;
                }
            })
            .await;
        });

        assert_eq!(counter.ppp.load(Ordering::Relaxed), 2);
    }
}
