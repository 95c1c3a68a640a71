use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Bg96;

impl ModuleParams for Bg96 {
    fn power_on_pull_time(&self) -> Duration {
        Duration::from_millis(500)
    }
    fn power_settle_time(&self) -> Duration {
        Duration::from_millis(30)
    }
    fn reset_hold(&self) -> Duration {
        Duration::from_millis(300)
    }
    fn boot_wait(&self) -> Duration {
        Duration::from_millis(4800)
    }
    fn reboot_command_wait(&self) -> Duration {
        Duration::from_secs(15)
    }
    fn command_delay_default(&self) -> Duration {
        Duration::from_millis(20)
    }
}
