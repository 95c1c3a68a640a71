use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim800;

impl ModuleParams for Sim800 {
    fn power_on_pull_time(&self) -> Duration {
        Duration::from_secs(1)
    }
    fn reset_hold(&self) -> Duration {
        Duration::from_millis(105)
    }
    fn boot_wait(&self) -> Duration {
        Duration::from_secs(3)
    }
    fn reboot_command_wait(&self) -> Duration {
        Duration::from_secs(5)
    }
}
