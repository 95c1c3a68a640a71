use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{OutputPin, PinState},
};

use crate::modules::{ModemVariant, ModuleParams as _};

/// Role of a modem control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    /// `PWRKEY`, pulsed low to switch the module on
    PowerKey,
    /// `RESET`, active low hard reset
    Reset,
    /// Enable of the modem supply regulator
    PowerOn,
    /// Data Terminal Ready
    Dtr,
}

/// Drive `role` to `level`, then hold for `hold` before the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetStep {
    pub role: PinRole,
    pub level: PinState,
    pub hold: Duration,
}

impl ResetStep {
    pub const fn new(role: PinRole, level: PinState, hold: Duration) -> Self {
        Self { role, level, hold }
    }
}

const NO_HOLD: Duration = Duration::from_ticks(0);

const SIMCOM_STEPS: [ResetStep; 10] = [
    ResetStep::new(PinRole::PowerKey, PinState::High, NO_HOLD),
    ResetStep::new(PinRole::Reset, PinState::High, NO_HOLD),
    ResetStep::new(PinRole::PowerOn, PinState::Low, Duration::from_secs(1)),
    ResetStep::new(PinRole::PowerOn, PinState::High, Duration::from_secs(1)),
    ResetStep::new(PinRole::PowerKey, PinState::Low, Duration::from_secs(1)),
    ResetStep::new(PinRole::PowerKey, PinState::High, NO_HOLD),
    ResetStep::new(PinRole::Reset, PinState::High, Duration::from_secs(1)),
    ResetStep::new(PinRole::Reset, PinState::Low, Duration::from_secs(1)),
    ResetStep::new(PinRole::Reset, PinState::High, Duration::from_secs(15)),
    ResetStep::new(PinRole::Dtr, PinState::Low, NO_HOLD),
];

/// Ordered power-on / reset sequence. Never mutated once built.
#[derive(Debug, Clone, Copy)]
pub struct ResetTiming<'a> {
    steps: &'a [ResetStep],
}

impl<'a> ResetTiming<'a> {
    /// Power cycle for SIMCom modules on boards with a switchable supply:
    /// supply enabled once the rails are stable, one second `PWRKEY` pulse,
    /// one second hard reset, then 15 seconds for the module to boot before
    /// `DTR` is asserted.
    pub const SIMCOM: ResetTiming<'static> = ResetTiming {
        steps: &SIMCOM_STEPS,
    };

    pub const fn new(steps: &'a [ResetStep]) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &'a [ResetStep] {
        self.steps
    }

    /// Total time the sequence blocks for.
    pub fn duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(NO_HOLD, |acc, step| acc + step.hold)
    }
}

/// Same shape as [`ResetTiming::SIMCOM`], with the hold times taken from the
/// module's datasheet parameters instead of the conservative one second
/// pulses.
pub fn power_cycle_steps(variant: ModemVariant) -> [ResetStep; 10] {
    [
        ResetStep::new(PinRole::PowerKey, PinState::High, NO_HOLD),
        ResetStep::new(PinRole::Reset, PinState::High, NO_HOLD),
        ResetStep::new(PinRole::PowerOn, PinState::Low, variant.power_settle_time()),
        ResetStep::new(PinRole::PowerOn, PinState::High, variant.power_settle_time()),
        ResetStep::new(PinRole::PowerKey, PinState::Low, variant.power_on_pull_time()),
        ResetStep::new(PinRole::PowerKey, PinState::High, NO_HOLD),
        ResetStep::new(PinRole::Reset, PinState::High, variant.power_settle_time()),
        ResetStep::new(PinRole::Reset, PinState::Low, variant.reset_hold()),
        ResetStep::new(PinRole::Reset, PinState::High, variant.boot_wait()),
        ResetStep::new(PinRole::Dtr, PinState::Low, NO_HOLD),
    ]
}

/// The four modem control lines. Unconnected lines can be filled with
/// [`NoPin`](crate::config::NoPin).
pub struct ModemPins<PK, RST, PWR, DTR> {
    pub power_key: PK,
    pub reset: RST,
    pub power_on: PWR,
    pub dtr: DTR,
}

impl<PK, RST, PWR, DTR> ModemPins<PK, RST, PWR, DTR>
where
    PK: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DTR: OutputPin,
{
    fn set(&mut self, role: PinRole, level: PinState) -> bool {
        match role {
            PinRole::PowerKey => self.power_key.set_state(level).is_ok(),
            PinRole::Reset => self.reset.set_state(level).is_ok(),
            PinRole::PowerOn => self.power_on.set_state(level).is_ok(),
            PinRole::Dtr => self.dtr.set_state(level).is_ok(),
        }
    }
}

/// Drives a [`ResetTiming`] onto the modem control lines.
///
/// Pins are taken as `OutputPin`s, so the HAL has already configured them as
/// outputs. Holds are blocking delays.
pub struct ResetSequencer<PK, RST, PWR, DTR, D> {
    pins: ModemPins<PK, RST, PWR, DTR>,
    delay: D,
}

impl<PK, RST, PWR, DTR, D> ResetSequencer<PK, RST, PWR, DTR, D>
where
    PK: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DTR: OutputPin,
    D: DelayNs,
{
    pub fn new(pins: ModemPins<PK, RST, PWR, DTR>, delay: D) -> Self {
        Self { pins, delay }
    }

    /// Apply every step of `timing`, in order.
    ///
    /// A pin that fails to switch is reported and the sequence carries on:
    /// the modem gives no feedback here, so a bad power cycle only shows up
    /// later as a rejected mode change or a connection that never comes up.
    pub fn run(&mut self, timing: &ResetTiming<'_>) {
        info!("Power-on / reset modem START");

        for step in timing.steps() {
            trace!("{:?} -> {:?}", step.role, PinLevel(step.level));
            if !self.pins.set(step.role, step.level) {
                warn!("Failed to drive {:?} {:?}", step.role, PinLevel(step.level));
            }
            if step.hold > NO_HOLD {
                self.hold(step.hold);
            }
        }

        info!("Power-on / reset modem END");
    }

    fn hold(&mut self, duration: Duration) {
        let mut remaining = duration.as_micros();
        while remaining > 0 {
            let chunk = remaining.min(u32::MAX as u64);
            self.delay.delay_us(chunk as u32);
            remaining -= chunk;
        }
    }

    pub fn release(self) -> (ModemPins<PK, RST, PWR, DTR>, D) {
        (self.pins, self.delay)
    }
}

/// `PinState` only implements `Debug`, this bridges it to `defmt` as well.
struct PinLevel(PinState);

impl core::fmt::Debug for PinLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            PinState::Low => f.write_str("Low"),
            PinState::High => f.write_str("High"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinLevel {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self.0 {
            PinState::Low => defmt::write!(f, "Low"),
            PinState::High => defmt::write!(f, "High"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::NoPin;
    use crate::modules::ModuleParams;
    use crate::test_helpers::{HwLog, HwOp, MockDelay, MockPin};

    fn sequencer(
        log: &HwLog,
    ) -> ResetSequencer<MockPin, MockPin, MockPin, MockPin, MockDelay> {
        ResetSequencer::new(
            ModemPins {
                power_key: MockPin::new(PinRole::PowerKey, log),
                reset: MockPin::new(PinRole::Reset, log),
                power_on: MockPin::new(PinRole::PowerOn, log),
                dtr: MockPin::new(PinRole::Dtr, log),
            },
            MockDelay::new(log),
        )
    }

    #[test]
    fn simcom_sequence_is_applied_in_order_with_exact_holds() {
        let log = HwLog::default();
        sequencer(&log).run(&ResetTiming::SIMCOM);

        let ms = |ms: u64| HwOp::Delay(Duration::from_millis(ms));
        let set = |role, level| HwOp::Set(role, level);

        assert_eq!(
            log.ops(),
            [
                set(PinRole::PowerKey, PinState::High),
                set(PinRole::Reset, PinState::High),
                set(PinRole::PowerOn, PinState::Low),
                ms(1000),
                set(PinRole::PowerOn, PinState::High),
                ms(1000),
                set(PinRole::PowerKey, PinState::Low),
                ms(1000),
                set(PinRole::PowerKey, PinState::High),
                set(PinRole::Reset, PinState::High),
                ms(1000),
                set(PinRole::Reset, PinState::Low),
                ms(1000),
                set(PinRole::Reset, PinState::High),
                ms(15000),
                set(PinRole::Dtr, PinState::Low),
            ]
        );
        assert_eq!(ResetTiming::SIMCOM.duration(), Duration::from_secs(20));
    }

    #[test]
    fn arbitrary_sequence_is_not_reordered_or_skipped() {
        let steps = [
            ResetStep::new(PinRole::Dtr, PinState::High, Duration::from_millis(3)),
            ResetStep::new(PinRole::Dtr, PinState::High, NO_HOLD),
            ResetStep::new(PinRole::PowerOn, PinState::Low, Duration::from_millis(7)),
            ResetStep::new(PinRole::PowerKey, PinState::Low, Duration::from_micros(50)),
        ];
        let log = HwLog::default();
        sequencer(&log).run(&ResetTiming::new(&steps));

        assert_eq!(
            log.ops(),
            [
                HwOp::Set(PinRole::Dtr, PinState::High),
                HwOp::Delay(Duration::from_millis(3)),
                HwOp::Set(PinRole::Dtr, PinState::High),
                HwOp::Set(PinRole::PowerOn, PinState::Low),
                HwOp::Delay(Duration::from_millis(7)),
                HwOp::Set(PinRole::PowerKey, PinState::Low),
                HwOp::Delay(Duration::from_micros(50)),
            ]
        );
    }

    #[test]
    fn failing_pin_does_not_stop_the_sequence() {
        let log = HwLog::default();
        let mut seq = ResetSequencer::new(
            ModemPins {
                power_key: MockPin::new(PinRole::PowerKey, &log),
                reset: MockPin::failing(PinRole::Reset, &log),
                power_on: MockPin::new(PinRole::PowerOn, &log),
                dtr: MockPin::new(PinRole::Dtr, &log),
            },
            MockDelay::new(&log),
        );
        seq.run(&ResetTiming::SIMCOM);

        let ops = log.ops();
        assert!(!ops
            .iter()
            .any(|op| matches!(op, HwOp::Set(PinRole::Reset, _))));
        assert_eq!(ops.last(), Some(&HwOp::Set(PinRole::Dtr, PinState::Low)));
    }

    #[test]
    fn unwired_lines_are_skipped() {
        let log = HwLog::default();
        let mut seq = ResetSequencer::new(
            ModemPins {
                power_key: MockPin::new(PinRole::PowerKey, &log),
                reset: MockPin::new(PinRole::Reset, &log),
                power_on: NoPin,
                dtr: NoPin,
            },
            MockDelay::new(&log),
        );
        seq.run(&ResetTiming::SIMCOM);

        let ops = log.ops();
        assert_eq!(ops.first(), Some(&HwOp::Set(PinRole::PowerKey, PinState::High)));
        assert!(!ops.iter().any(|op| matches!(
            op,
            HwOp::Set(PinRole::PowerOn, _) | HwOp::Set(PinRole::Dtr, _)
        )));
        assert_eq!(ops.last(), Some(&HwOp::Delay(Duration::from_secs(15))));
    }

    #[test]
    fn variant_timing_uses_module_params() {
        let steps = power_cycle_steps(ModemVariant::Sim7600);
        let timing = ResetTiming::new(&steps);

        assert_eq!(steps[4].role, PinRole::PowerKey);
        assert_eq!(steps[4].hold, ModemVariant::Sim7600.power_on_pull_time());
        assert_eq!(steps[7].hold, ModemVariant::Sim7600.reset_hold());
        assert_eq!(steps[8].hold, ModemVariant::Sim7600.boot_wait());
        assert_eq!(
            timing.duration(),
            ModemVariant::Sim7600.power_settle_time() * 3
                + ModemVariant::Sim7600.power_on_pull_time()
                + ModemVariant::Sim7600.reset_hold()
                + ModemVariant::Sim7600.boot_wait()
        );
    }
}
