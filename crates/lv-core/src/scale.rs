//! Scales mapping data values to pixel positions

/// Continuous linear mapping from a data domain to a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value into the range.
    ///
    /// A collapsed domain maps every value to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }

    /// Map a range value back into the domain
    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        let t = if span == 0.0 { 0.5 } else { (position - r0) / span };
        d0 + t * (d1 - d0)
    }

    /// Round tick values covering the domain, roughly `count` of them
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut start, mut stop) = self.domain;
        if !start.is_finite() || !stop.is_finite() || count == 0 {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }
        let reverse = stop < start;
        if reverse {
            std::mem::swap(&mut start, &mut stop);
        }

        let step = tick_step(start, stop, count);
        if step <= 0.0 || !step.is_finite() {
            return Vec::new();
        }
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        let mut ticks: Vec<f64> = (first..=last).map(|i| i as f64 * step).collect();
        if reverse {
            ticks.reverse();
        }
        ticks
    }
}

/// Step of 1, 2 or 5 times a power of ten
fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start) / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Ordinal band scale with equal inner and outer padding and a rounded range
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let reverse = r1 < r0;
        let (lo, hi) = if reverse { (r1, r0) } else { (r0, r1) };
        let padding = padding.clamp(0.0, 1.0);

        let step = ((hi - lo) / (n - padding + 2.0 * padding).max(1.0)).floor();
        let start = (lo + (hi - lo - step * (n - padding)) * 0.5).round();
        let bandwidth = (step * (1.0 - padding)).round();

        let (start, step) = if reverse {
            (start + step * (n - 1.0), -step)
        } else {
            (start, step)
        };

        Self {
            domain,
            start,
            step,
            bandwidth,
        }
    }

    /// Left edge of the band for `name`
    pub fn position(&self, name: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == name)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step.abs()
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Clamp helper bound to fixed limits
pub fn clamp(lo: f64, hi: f64) -> impl Fn(f64) -> f64 {
    move |x| x.min(hi).max(lo)
}
