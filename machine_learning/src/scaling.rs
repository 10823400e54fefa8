/// Per-dimension min-max scaling into `[0, 1]`.
///
/// Dimensions with no spread map to `0` and back to their only value.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    /// Learns the ranges of `width` wide `rows`.
    pub fn fit<'a, I>(rows: I, width: usize) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];

        for row in rows {
            for ((lo, hi), &v) in min.iter_mut().zip(max.iter_mut()).zip(row) {
                *lo = lo.min(v);
                *hi = hi.max(v);
            }
        }

        for (lo, hi) in min.iter_mut().zip(max.iter_mut()) {
            if !lo.is_finite() || !hi.is_finite() {
                *lo = 0.0;
                *hi = 0.0;
            }
        }

        Self { min, max }
    }

    pub fn scale(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&lo, &hi))| if hi > lo { (v - lo) / (hi - lo) } else { 0.0 })
            .collect()
    }

    pub fn unscale(&self, y: &[f64]) -> Vec<f64> {
        y.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&lo, &hi))| lo + v * (hi - lo))
            .collect()
    }
}
