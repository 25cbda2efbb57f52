//! Pure indicator math over closing-price slices.
//!
//! No I/O, no side effects. Every function returns `None` (or an empty `Vec`)
//! when the input is too short for its window, leaving the fallback policy to
//! the caller.

use statrs::statistics::Statistics;

/// Simple moving average of the last `window` values.
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(values[values.len() - window..].iter().mean())
}

/// Exponential moving average series.
///
/// Multiplier `alpha = 2 / (span + 1)`. The first output is seeded with the
/// mean of the first `span` values, so the output holds
/// `values.len() - span + 1` points and output `i` lines up with input
/// `i + span - 1`. Returns an empty `Vec` if there is insufficient data.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.len() < span {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let seed = values[..span].iter().mean();

    let mut result = Vec::with_capacity(values.len() - span + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[span..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        result.push(prev);
    }

    result
}

/// Relative Strength Index at the final bar.
///
/// Average gain and loss are the simple mean of the last `period` price
/// changes. A window with losses but no gains reads 0; gains but no losses
/// reads 100; a flat window (no gains, no losses) reads 50.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let window = &values[values.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gain, loss), delta| {
            if delta > 0.0 {
                (gain + delta, loss)
            } else {
                (gain, loss - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_gain == 0.0 && avg_loss == 0.0 {
        return Some(50.0);
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}

/// Final MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValues {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Moving Average Convergence Divergence at the final bar.
///
/// The MACD line lives on the slow EMA's timeline, so a signal value needs
/// at least `slow + signal - 1` closes.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValues> {
    if fast == 0 || signal == 0 || fast >= slow || values.len() < slow + signal - 1 {
        return None;
    }

    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let offset = slow - fast;

    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + offset] - slow_value)
        .collect();

    let signal_line = ema(&macd_line, signal);
    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;

    Some(MacdValues {
        macd,
        signal,
        histogram: macd - signal,
    })
}

/// Upper, middle and lower Bollinger band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the last `window` values.
///
/// Band width uses the sample standard deviation (n - 1 denominator), so the
/// window must hold at least two values.
pub fn bollinger(values: &[f64], window: usize, k: f64) -> Option<Bands> {
    if window < 2 || values.len() < window {
        return None;
    }

    let tail = &values[values.len() - window..];
    let middle = tail.iter().mean();
    let std_dev = tail.iter().std_dev();

    Some(Bands {
        upper: middle + k * std_dev,
        middle,
        lower: middle - k * std_dev,
    })
}
