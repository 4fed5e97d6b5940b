//! Pure scoring functions shared by the live stats bar and the results screen.

/// Characters per "word" in the standard WPM definition.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Lower bound for elapsed minutes at result time so near-instant sessions don't explode.
pub const MIN_ELAPSED_MINUTES: f64 = 0.01;

/// Words per minute from correct characters and elapsed seconds.
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs == 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Percentage of correct characters, 100 when nothing was typed.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    (correct_chars as f64 / total_chars as f64 * 100.0).round() as u32
}

/// Characters per minute.
pub fn cpm(total_chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs == 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    (total_chars as f64 / minutes).round() as u32
}

/// Elapsed minutes clamped to [`MIN_ELAPSED_MINUTES`].
pub fn floored_minutes(elapsed_secs: f64) -> f64 {
    (elapsed_secs / 60.0).max(MIN_ELAPSED_MINUTES)
}

/// Elapsed seconds clamped so that `floored_minutes` holds; use at call sites
/// that feed [`wpm`] / [`cpm`] with a final duration.
pub fn floored_secs(elapsed_secs: f64) -> f64 {
    floored_minutes(elapsed_secs) * 60.0
}

/// Consistency score from sampled WPM values.
///
/// Fewer than three samples is not enough signal and scores a full 100.
/// Otherwise `100 - 2 * stddev`, rounded and clamped to `0..=100`.
pub fn consistency(samples: &[f64]) -> u32 {
    if samples.len() <= 2 {
        return 100;
    }
    match std_dev(samples) {
        Some(sd) => (100.0 - sd * 2.0).round().clamp(0.0, 100.0) as u32,
        None => 100,
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
