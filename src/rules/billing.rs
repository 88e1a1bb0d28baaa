use serde::Serialize;

use super::device::{Device, DeviceBank};
use super::formulas::{bill, kwh};

/// Daily consumption and the resulting bill, rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillReading {
    pub total_kwh: f64,
    pub bill: f64,
}

impl BillReading {
    pub fn measure(bank: &DeviceBank, price_per_kwh: f64) -> Self {
        let total_kwh: f64 = bank.active().map(|d| kwh(d.watts, d.hours)).sum();
        let total: f64 = bank
            .active()
            .map(|d| bill(kwh(d.watts, d.hours), price_per_kwh))
            .sum();
        BillReading {
            total_kwh,
            bill: total.round(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BillingOutcome {
    /// First time under target; the key is earned.
    KeyEarned(BillReading),
    /// Under target again after having gone over. No second key.
    BackUnderTarget(BillReading),
    UnderTarget(BillReading),
    OverTarget(BillReading),
    /// Nothing is switched on.
    Idle(BillReading),
}

impl BillingOutcome {
    pub fn reading(&self) -> BillReading {
        match *self {
            BillingOutcome::KeyEarned(r)
            | BillingOutcome::BackUnderTarget(r)
            | BillingOutcome::UnderTarget(r)
            | BillingOutcome::OverTarget(r)
            | BillingOutcome::Idle(r) => r,
        }
    }
}

/// Level 3: the laboratory. Keep the daily bill at or below the target.
#[derive(Debug, Clone)]
pub struct BillingPuzzle {
    bank: DeviceBank,
    price_per_kwh: f64,
    target: f64,
    completed: bool,
    key_awarded: bool,
}

impl BillingPuzzle {
    pub fn new(devices: Vec<Device>, price_per_kwh: f64, target: f64) -> Self {
        BillingPuzzle {
            bank: DeviceBank::new(devices),
            price_per_kwh,
            target,
            completed: false,
            key_awarded: false,
        }
    }

    pub fn devices(&self) -> &[Device] {
        self.bank.devices()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn key_awarded(&self) -> bool {
        self.key_awarded
    }

    pub fn reading(&self) -> BillReading {
        BillReading::measure(&self.bank, self.price_per_kwh)
    }

    /// Flip a device and score the new configuration. `None` for an unknown device.
    pub fn toggle(&mut self, name: &str) -> Option<BillingOutcome> {
        self.bank.toggle(name)?;
        Some(self.evaluate())
    }

    fn evaluate(&mut self) -> BillingOutcome {
        let reading = self.reading();
        if reading.bill > self.target {
            self.completed = false;
            return BillingOutcome::OverTarget(reading);
        }
        if reading.bill <= 0.0 {
            return BillingOutcome::Idle(reading);
        }
        if self.completed {
            return BillingOutcome::UnderTarget(reading);
        }
        self.completed = true;
        if self.key_awarded {
            BillingOutcome::BackUnderTarget(reading)
        } else {
            self.key_awarded = true;
            BillingOutcome::KeyEarned(reading)
        }
    }
}

/// Format an amount with `.` thousands separators, e.g. `300000` as `300.000`.
pub fn format_rupiah(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if amount < 0.0 && whole > 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::formulas::DEFAULT_PRICE_PER_KWH;

    fn lab(lamp_on: bool) -> BillingPuzzle {
        BillingPuzzle::new(
            vec![
                Device::new("lamp", 60.0, 24.0, lamp_on),
                Device::new("ac", 1000.0, 8.0, true),
                Device::new("tv", 150.0, 6.0, true),
                Device::new("fridge", 150.0, 24.0, true),
            ],
            DEFAULT_PRICE_PER_KWH,
            300_000.0,
        )
    }

    #[test]
    fn ac_tv_fridge_bill_matches_worked_example() {
        let p = lab(false);
        let r = p.reading();
        assert_eq!(r.bill, 18750.0);
        assert!((r.total_kwh - 12.5).abs() < 1e-9);
    }

    #[test]
    fn first_toggle_under_target_earns_key() {
        let mut p = lab(true);
        let outcome = p.toggle("lamp").unwrap();
        assert_eq!(outcome, BillingOutcome::KeyEarned(p.reading()));
        assert_eq!(outcome.reading().bill, 18750.0);
        assert!(p.completed());
        assert!(p.key_awarded());
    }

    #[test]
    fn over_target_revokes_completion_but_not_key() {
        let mut p = BillingPuzzle::new(
            vec![
                Device::new("ac", 1000.0, 8.0, false),
                Device::new("heater", 2000.0, 100.0, false),
            ],
            DEFAULT_PRICE_PER_KWH,
            300_000.0,
        );
        assert!(matches!(p.toggle("ac"), Some(BillingOutcome::KeyEarned(_))));

        // 200 kWh of heating alone is 300.000; together with the AC it is over.
        let over = p.toggle("heater").unwrap();
        assert!(matches!(over, BillingOutcome::OverTarget(_)));
        assert_eq!(over.reading().bill, 312_000.0);
        assert!(!p.completed());
        assert!(p.key_awarded());

        let back = p.toggle("ac").unwrap();
        assert!(matches!(back, BillingOutcome::BackUnderTarget(_)));
        assert_eq!(back.reading().bill, 300_000.0);
        assert!(p.completed());
    }

    #[test]
    fn staying_under_target_does_not_repeat() {
        let mut p = lab(true);
        assert!(matches!(p.toggle("lamp"), Some(BillingOutcome::KeyEarned(_))));
        assert!(matches!(p.toggle("tv"), Some(BillingOutcome::UnderTarget(_))));
    }

    #[test]
    fn everything_off_is_idle_not_a_solution() {
        let mut p = BillingPuzzle::new(
            vec![Device::new("ac", 1000.0, 8.0, true)],
            DEFAULT_PRICE_PER_KWH,
            300_000.0,
        );
        let outcome = p.toggle("ac").unwrap();
        assert!(matches!(outcome, BillingOutcome::Idle(_)));
        assert_eq!(outcome.reading().bill, 0.0);
        assert!(!p.key_awarded());
    }

    #[test]
    fn bill_is_rounded_to_whole_units() {
        let p = BillingPuzzle::new(vec![Device::new("led", 7.0, 1.0, true)], 1500.0, 300_000.0);
        // 0.007 kWh * 1500 = 10.5
        assert_eq!(p.reading().bill, 11.0);
    }

    #[test]
    fn unknown_device_is_ignored() {
        let mut p = lab(true);
        assert!(p.toggle("kettle").is_none());
    }

    #[test]
    fn rupiah_formatting() {
        assert_eq!(format_rupiah(0.0), "0");
        assert_eq!(format_rupiah(750.0), "750");
        assert_eq!(format_rupiah(18750.0), "18.750");
        assert_eq!(format_rupiah(300000.0), "300.000");
        assert_eq!(format_rupiah(1234567.0), "1.234.567");
    }
}
