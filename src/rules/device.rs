use serde::{Deserialize, Serialize};

/// A switchable appliance inside a level.
///
/// `hours` is the daily usage duration and only matters for billing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub watts: f64,
    #[serde(default)]
    pub hours: f64,
    #[serde(default = "default_on")]
    pub on: bool,
}

fn default_on() -> bool {
    true
}

impl Device {
    pub fn new(name: &str, watts: f64, hours: f64, on: bool) -> Self {
        Device {
            name: name.to_string(),
            watts,
            hours,
            on,
        }
    }
}

/// The devices of one level, addressed by unique name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceBank {
    devices: Vec<Device>,
}

impl DeviceBank {
    pub fn new(devices: Vec<Device>) -> Self {
        DeviceBank { devices }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Flip a device. Returns its new state, or `None` for an unknown name.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let device = self.devices.iter_mut().find(|d| d.name == name)?;
        device.on = !device.on;
        Some(device.on)
    }

    pub fn set_all(&mut self, on: bool) {
        for d in &mut self.devices {
            d.on = on;
        }
    }

    pub fn any_on(&self) -> bool {
        self.devices.iter().any(|d| d.on)
    }

    pub fn active(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> DeviceBank {
        DeviceBank::new(vec![
            Device::new("fan", 50.0, 0.0, false),
            Device::new("iron", 1000.0, 0.0, true),
        ])
    }

    #[test]
    fn toggle_flips_only_named_device() {
        let mut b = bank();
        assert_eq!(b.toggle("fan"), Some(true));
        assert!(b.get("fan").unwrap().on);
        assert!(b.get("iron").unwrap().on);
        assert_eq!(b.toggle("fan"), Some(false));
    }

    #[test]
    fn toggle_unknown_is_none() {
        let mut b = bank();
        assert_eq!(b.toggle("toaster"), None);
        assert_eq!(b, bank());
    }

    #[test]
    fn active_and_any_on() {
        let mut b = bank();
        assert_eq!(b.active().count(), 1);
        b.set_all(false);
        assert!(!b.any_on());
        b.set_all(true);
        assert_eq!(b.active().count(), 2);
    }

    #[test]
    fn deserialize_defaults_hours_and_on() {
        let d: Device = toml::from_str("name = \"fan\"\nwatts = 50.0").unwrap();
        assert_eq!(d.hours, 0.0);
        assert!(d.on);
    }
}
