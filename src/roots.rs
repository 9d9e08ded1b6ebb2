//! Bracketing root finder used to invert cumulative mass laws.




/// Absolute tolerance on the root location
const XTOL: f64 = 2e-12;

/// Relative tolerance on the root location
const RTOL: f64 = 4.0 * f64::EPSILON;

const MAX_ITERATIONS: usize = 100;




// ============================================================================
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {

    #[error("f(a) and f(b) must have opposite signs: f({a:.4e}) = {fa:.4e}, f({b:.4e}) = {fb:.4e}")]
    NotBracketed { a: f64, b: f64, fa: f64, fb: f64 },

    #[error("the root finder failed to converge after {0} iterations")]
    NoConvergence(usize),

    #[error("sample fraction {0} is outside the open interval (0, 1)")]
    FractionOutOfRange(f64),
}




// ============================================================================
/**
 * Return an error unless the given cumulative fraction lies strictly between
 * zero and one; inverse CDFs are undefined at the endpoints.
 */
pub fn require_open_unit(fraction: f64) -> Result<(), Error> {
    if fraction > 0.0 && fraction < 1.0 {
        Ok(())
    } else {
        Err(Error::FractionOutOfRange(fraction))
    }
}




/**
 * Find a zero of `f` in the bracket [a, b] by Brent's method: inverse
 * quadratic interpolation and secant steps, falling back to bisection when
 * those do not shrink the bracket fast enough. `f(a)` and `f(b)` must differ
 * in sign.
 */
pub fn brent<F>(f: F, a: f64, b: f64) -> Result<f64, Error>
where
    F: Fn(f64) -> f64
{
    let (mut xpre, mut xcur) = (a, b);
    let (mut fpre, mut fcur) = (f(xpre), f(xcur));

    if fpre == 0.0 {
        return Ok(xpre)
    }
    if fcur == 0.0 {
        return Ok(xcur)
    }
    if fpre.signum() == fcur.signum() {
        return Err(Error::NotBracketed { a, b, fa: fpre, fb: fcur })
    }

    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    for _ in 0..MAX_ITERATIONS {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = 0.5 * (XTOL + RTOL * xcur.abs());
        let sbis = 0.5 * (xblk - xcur);

        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur)
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };

            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;

        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }
    Err(Error::NoConvergence(MAX_ITERATIONS))
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brent_finds_square_root() {
        let x = brent(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((x - 2f64.sqrt()).abs() < 1e-11);
    }

    #[test]
    fn brent_handles_a_very_wide_bracket() {
        let x = brent(|x| 1.0 - (1.0 + x) * (-x).exp() - 0.5, 0.0, 1.0e10).unwrap();
        assert!((x - 1.678_346_990_016_661).abs() < 1e-9);
    }

    #[test]
    fn brent_returns_an_exact_endpoint_root() {
        assert_eq!(brent(|x| x - 1.0, 1.0, 3.0).unwrap(), 1.0);
    }

    #[test]
    fn brent_rejects_an_unbracketed_interval() {
        assert!(matches!(brent(|x| x * x + 1.0, -1.0, 1.0), Err(Error::NotBracketed { .. })));
    }

    #[test]
    fn open_unit_interval_excludes_endpoints() {
        assert!(require_open_unit(0.5).is_ok());
        assert_eq!(require_open_unit(0.0), Err(Error::FractionOutOfRange(0.0)));
        assert_eq!(require_open_unit(1.0), Err(Error::FractionOutOfRange(1.0)));
    }
}
