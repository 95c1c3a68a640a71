use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim7070;

impl ModuleParams for Sim7070 {
    fn power_on_pull_time(&self) -> Duration {
        Duration::from_secs(1)
    }
    fn reset_hold(&self) -> Duration {
        Duration::from_secs(13)
    }
    fn boot_wait(&self) -> Duration {
        Duration::from_millis(2500)
    }
    fn command_delay_default(&self) -> Duration {
        Duration::from_millis(50)
    }
}
