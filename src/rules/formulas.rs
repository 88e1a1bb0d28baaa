use rand::Rng;

/// Tariff applied when a caller has no configured price, in currency units per kWh.
pub const DEFAULT_PRICE_PER_KWH: f64 = 1500.0;

/// Energy drawn by a device running at `power_watts` for `hours`, in kWh.
///
/// Negative inputs give a negative result; callers supply non-negative values.
pub fn kwh(power_watts: f64, hours: f64) -> f64 {
    power_watts * hours / 1000.0
}

/// Cost of `kwh` of energy at `price_per_kwh`.
pub fn bill(kwh: f64, price_per_kwh: f64) -> f64 {
    kwh * price_per_kwh
}

/// Return a uniformly random permutation of `items`, leaving the input untouched.
///
/// Fisher-Yates from the back: at each index `i` swap with a uniform `j <= i`.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
