//! Per-field min-max scaling.
//!
//! Fit once per forecast call on the available history and threaded through
//! the rollout as local state; nothing is retained between calls.

/// Fitted min-max statistics for each tracked field.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    range: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit column-wise minimum and range on `matrix`.
    ///
    /// A constant column gets range 1.0 so it maps to 0.0 and back to its
    /// constant value.
    pub fn fit(matrix: &[Vec<f64>]) -> Self {
        let cols = matrix.first().map_or(0, Vec::len);
        let mut min = vec![f64::INFINITY; cols];
        let mut max = vec![f64::NEG_INFINITY; cols];

        for row in matrix {
            for (j, &x) in row.iter().enumerate().take(cols) {
                min[j] = min[j].min(x);
                max[j] = max[j].max(x);
            }
        }

        let range = min
            .iter()
            .zip(max.iter())
            .map(|(lo, hi)| {
                let r = hi - lo;
                if r > 0.0 && r.is_finite() {
                    r
                } else {
                    1.0
                }
            })
            .collect();
        let min = min.into_iter().map(|m| if m.is_finite() { m } else { 0.0 }).collect();

        Self { min, range }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(self.range.iter()))
            .map(|(&x, (&lo, &r))| (x - lo) / r)
            .collect()
    }

    pub fn inverse_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(self.range.iter()))
            .map(|(&x, (&lo, &r))| x * r + lo)
            .collect()
    }

    /// Inverse-transform a single value of field `index`.
    pub fn inverse_value(&self, index: usize, value: f64) -> f64 {
        match (self.min.get(index), self.range.get(index)) {
            (Some(&lo), Some(&r)) => value * r + lo,
            _ => value,
        }
    }

    pub fn transform(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
        matrix.iter().map(|row| self.transform_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_into_unit_interval() {
        let m = vec![vec![10.0, 0.0], vec![20.0, 5.0], vec![30.0, 10.0]];
        let s = MinMaxScaler::fit(&m);
        let t = s.transform(&m);
        assert_eq!(t[0], vec![0.0, 0.0]);
        assert_eq!(t[1], vec![0.5, 0.5]);
        assert_eq!(t[2], vec![1.0, 1.0]);
    }

    #[test]
    fn test_inverse_recovers_values() {
        let m = vec![vec![3.0, -4.0], vec![7.5, 12.0], vec![1.0, 2.0]];
        let s = MinMaxScaler::fit(&m);
        for row in &m {
            let back = s.inverse_row(&s.transform_row(row));
            for (a, b) in back.iter().zip(row.iter()) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let m = vec![vec![42.0], vec![42.0]];
        let s = MinMaxScaler::fit(&m);
        assert_eq!(s.transform_row(&[42.0]), vec![0.0]);
        assert_eq!(s.inverse_row(&[0.0]), vec![42.0]);
    }

    #[test]
    fn test_fits_are_independent() {
        let a = MinMaxScaler::fit(&[vec![0.0], vec![10.0]]);
        let b = MinMaxScaler::fit(&[vec![100.0], vec![200.0]]);
        assert_eq!(a.transform_row(&[5.0]), vec![0.5]);
        assert_eq!(b.transform_row(&[150.0]), vec![0.5]);
        assert_eq!(a, MinMaxScaler::fit(&[vec![0.0], vec![10.0]]));
    }
}
