use std::ops::Deref;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub const MIDPOINT: Percentage = Percentage(50.);

    /// Forces a value into `[0, 100]`. NaN is treated as 0.
    pub fn clamped(value: f64) -> Percentage {
        if value.is_nan() {
            Percentage(0.)
        } else {
            Percentage(value.clamp(0., 100.))
        }
    }

    /// Share of `width` cells that this percentage covers, rounded to the nearest cell.
    pub fn of_width(&self, width: usize) -> usize {
        ((self.0 / 100.) * width as f64).round() as usize
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Linear position of `value` between `min` and `max`.
pub fn ratio_percentage(value: i64, min: i64, max: i64) -> Percentage {
    Percentage::clamped((value - min) as f64 / (max - min) as f64 * 100.)
}
