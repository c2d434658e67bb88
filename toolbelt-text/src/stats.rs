//! Population statistics over `f64` samples.

/// Drop everything after `p` decimal figures (toward zero, no rounding).
pub fn truncate(f: f64, p: i32) -> f64 {
    let scale = 10f64.powi(p);
    (f * scale).trunc() / scale
}

/// Arithmetic mean.  `None` for an empty sample.
pub fn average(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation.  `None` for an empty sample.
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let mean = average(samples)?;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(var.sqrt())
}
