use std::time::Duration;

use crate::definitions::debug::DEFAULT_WAIT;
use crate::error::Fault;
use crate::machine::{Machine, StepOutcome};

/// Everything a front end chooses when it starts a machine running.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// How long to sleep between steps. Zero runs flat out.
    pub delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config { delay: DEFAULT_WAIT }
    }
}

/// Drives a `Machine` one tick at a time. The front end calls `tick`
/// in a loop, refreshing its display between calls as it sees fit — the
/// runner itself only owns the timing and the step, not presentation.
pub struct Runner {
    machine: Machine,
    config: Config,
}

impl Runner {
    pub fn new(machine: Machine, config: Config) -> Self {
        Runner { machine, config }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// Sleeps for the configured delay, then runs one fetch/execute cycle.
    pub fn tick(&mut self) -> Result<StepOutcome, Fault> {
        if !self.config.delay.is_zero() {
            std::thread::sleep(self.config.delay);
        }
        self.machine.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_zero_delay_runner_does_not_sleep() {
        let mut m = Machine::new(0xFFFF);
        m.memory_mut().ensure(16).unwrap();
        m.memory_mut().store_u8(0, b'#');
        m.memory_mut().store_u8(1, b'U');
        m.memory_mut().store_u8(2, b'U');
        m.memory_mut().store_u8(3, b'U');
        let mut runner = Runner::new(m, Config { delay: Duration::ZERO });
        assert_eq!(runner.tick().unwrap(), StepOutcome::Halted);
    }
}
