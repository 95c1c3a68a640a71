use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim7600;

impl ModuleParams for Sim7600 {
    fn power_on_pull_time(&self) -> Duration {
        Duration::from_millis(500)
    }
    fn reset_hold(&self) -> Duration {
        Duration::from_millis(2500)
    }
    fn boot_wait(&self) -> Duration {
        Duration::from_secs(16)
    }
    fn reboot_command_wait(&self) -> Duration {
        Duration::from_secs(20)
    }
    fn command_delay_default(&self) -> Duration {
        Duration::from_millis(20)
    }
}
