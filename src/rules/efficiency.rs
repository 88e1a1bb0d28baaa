use serde::Serialize;

use super::device::{Device, DeviceBank};

/// Power figures after a toggle. Percentages are in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyReading {
    pub used_watts: f64,
    pub total_watts: f64,
    pub power_usage: f64,
    pub efficiency: f64,
}

impl EfficiencyReading {
    pub fn measure(bank: &DeviceBank) -> Self {
        let total_watts: f64 = bank.devices().iter().map(|d| d.watts).sum();
        let used_watts: f64 = bank.active().map(|d| d.watts).sum();
        let power_usage = if total_watts > 0.0 {
            (used_watts / total_watts * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        EfficiencyReading {
            used_watts,
            total_watts,
            power_usage,
            efficiency: 100.0 - power_usage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EfficiencyOutcome {
    /// Efficiency reached the target for the first time; the key is earned.
    KeyEarned(EfficiencyReading),
    /// More than the allowed share of power is drawn.
    Wasteful(EfficiencyReading),
    Steady(EfficiencyReading),
}

impl EfficiencyOutcome {
    pub fn reading(&self) -> EfficiencyReading {
        match *self {
            EfficiencyOutcome::KeyEarned(r)
            | EfficiencyOutcome::Wasteful(r)
            | EfficiencyOutcome::Steady(r) => r,
        }
    }
}

/// Level 2: the kitchen. Efficiency is the share of total wattage left switched off.
#[derive(Debug, Clone)]
pub struct EfficiencyPuzzle {
    bank: DeviceBank,
    target: f64,
    key_awarded: bool,
}

impl EfficiencyPuzzle {
    pub fn new(devices: Vec<Device>, target: f64) -> Self {
        EfficiencyPuzzle {
            bank: DeviceBank::new(devices),
            target,
            key_awarded: false,
        }
    }

    pub fn devices(&self) -> &[Device] {
        self.bank.devices()
    }

    pub fn key_awarded(&self) -> bool {
        self.key_awarded
    }

    pub fn reading(&self) -> EfficiencyReading {
        EfficiencyReading::measure(&self.bank)
    }

    /// Flip a device and score the new configuration. `None` for an unknown device.
    pub fn toggle(&mut self, name: &str) -> Option<EfficiencyOutcome> {
        self.bank.toggle(name)?;
        Some(self.evaluate())
    }

    fn evaluate(&mut self) -> EfficiencyOutcome {
        let reading = self.reading();
        if reading.efficiency >= self.target && !self.key_awarded {
            self.key_awarded = true;
            EfficiencyOutcome::KeyEarned(reading)
        } else if reading.power_usage > 100.0 - self.target && self.bank.any_on() {
            EfficiencyOutcome::Wasteful(reading)
        } else {
            EfficiencyOutcome::Steady(reading)
        }
    }
}
