use std::cmp::Ordering;




/// An error type for failed spline construction
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {

    #[error("the spline abscissae must increase monotonically")]
    UnorderedNodes,

    #[error("a not-a-knot cubic spline needs at least four nodes, got {0}")]
    TooFewNodes(usize),

    #[error("got {0} abscissae but {1} ordinates")]
    LengthMismatch(usize, usize),
}




/**
 * Interpolating cubic spline with not-a-knot end conditions: the third
 * derivative is continuous across the second and the second-to-last nodes.
 * Outside the tabulated range the end polynomials are extended.
 */
#[derive(Clone, Debug)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivative: Vec<f64>,
}




// ============================================================================
impl CubicSpline {

    /// Build a spline through the points `(x[i], y[i])`. An
    /// `UnorderedNodes` error is returned unless `x` increases strictly.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, Error> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch(x.len(), y.len()))
        }
        if x.len() < 4 {
            return Err(Error::TooFewNodes(x.len()))
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::UnorderedNodes)
        }
        let second_derivative = not_a_knot_second_derivatives(&x, &y);
        Ok(Self { x, y, second_derivative })
    }

    pub fn sample(&self, x: f64) -> f64 {
        let i = self.segment_containing(x);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.second_derivative[i], self.second_derivative[i + 1]);
        let h = x1 - x0;
        let (a, b) = (x1 - x, x - x0);

        m0 * a * a * a / (6.0 * h)
            + m1 * b * b * b / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    fn segment_containing(&self, x: f64) -> usize {
        let index = match self.x.binary_search_by(|&xi| compare_f64(xi, x)) {
            Ok(index) => index,
            Err(index) => index,
        };
        index.max(1).min(self.x.len() - 1) - 1
    }
}




// ============================================================================
fn compare_f64(a: f64, b: f64) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}




/**
 * Solve for the second derivatives at the nodes. The not-a-knot conditions
 * eliminate the two end unknowns, leaving a tridiagonal system for the
 * interior nodes which is solved with the Thomas algorithm.
 */
fn not_a_knot_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let d: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // Rows for unknowns 1..=n-2
    let m = n - 2;
    let mut lower = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut upper = vec![0.0; m];
    let mut rhs = vec![0.0; m];

    for k in 0..m {
        let i = k + 1;
        lower[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        upper[k] = h[i];
        rhs[k] = 6.0 * (d[i] - d[i - 1]);
    }

    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    upper[0] = (h1 * h1 - h0 * h0) / h1;

    let (ha, hb) = (h[n - 3], h[n - 2]);
    diag[m - 1] = (ha + hb) * (2.0 * ha + hb) / ha;
    lower[m - 1] = (ha * ha - hb * hb) / ha;

    for k in 1..m {
        let w = lower[k] / diag[k - 1];
        diag[k] -= w * upper[k - 1];
        rhs[k] -= w * rhs[k - 1];
    }
    let mut interior = vec![0.0; m];
    interior[m - 1] = rhs[m - 1] / diag[m - 1];
    for k in (0..m - 1).rev() {
        interior[k] = (rhs[k] - upper[k] * interior[k + 1]) / diag[k];
    }

    let mut result = vec![0.0; n];
    result[1..n - 1].copy_from_slice(&interior);
    result[0] = ((h0 + h1) * result[1] - h0 * result[2]) / h1;
    result[n - 1] = ((ha + hb) * result[n - 2] - hb * result[n - 3]) / ha;
    result
}
