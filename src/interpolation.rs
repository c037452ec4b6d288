use itertools::{izip, Itertools};
use metfor::{HectoPascal, Quantity};
use optional::Optioned;

/// Interpolate a value from parallel slices of pressure and data using pressure as the vertical
/// coordinate.
///
/// Assumes that `pressure` is monotonic, in either direction. Samples with missing data are
/// skipped over so the points on either side of them are used. A target outside of the pressure
/// range is missing, there is no extrapolation.
pub(crate) fn linear_interpolate(
    pressure: &[HectoPascal],
    values: &[Optioned<f64>],
    target_p: HectoPascal,
) -> Optioned<f64> {
    debug_assert_eq!(pressure.len(), values.len());

    enum BracketType {
        Bracket((HectoPascal, f64), (HectoPascal, f64)),
        EndEqual(f64),
    }

    let make_bracket = |pnt_0, pnt_1| -> Option<BracketType> {
        let (p0, v0): (HectoPascal, f64) = pnt_0;
        let (p1, v1): (HectoPascal, f64) = pnt_1;

        if (p0 < target_p && p1 > target_p) || (p0 > target_p && p1 < target_p) {
            Some(BracketType::Bracket(pnt_0, pnt_1))
        } else if (p0 - target_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(v0))
        } else if (p1 - target_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(v1))
        } else {
            None
        }
    };

    // A single sample only brackets itself.
    if pressure.len() == 1 {
        return match values[0].into_option() {
            Some(v) if (pressure[0] - target_p).unpack().abs() < std::f64::EPSILON => {
                Optioned::from(v)
            }
            _ => Optioned::default(),
        };
    }

    let value_opt = izip!(pressure, values)
        // Skip levels with missing values
        .filter_map(|(p, v)| v.into_option().map(|v| (*p, v)))
        // Look at them in pairs.
        .tuple_windows::<(_, _)>()
        // Make a bracket and filter out all levels that don't create a bracket.
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        // Get the first (and only) one that brackets the target value
        .next()
        // Map from the bracket type to the interpolated value
        .map(|bracket| match bracket {
            BracketType::Bracket((p0, v0), (p1, v1)) => linear_interp(target_p, p0, p1, v0, v1),
            BracketType::EndEqual(v) => v,
        });

    Optioned::from(value_opt)
}

/// Linear interpolation of `y` at `x_val` between the points `(x1, y1)` and `(x2, y2)`.
#[inline]
pub(crate) fn linear_interp(
    x_val: HectoPascal,
    x1: HectoPascal,
    x2: HectoPascal,
    y1: f64,
    y2: f64,
) -> f64 {
    debug_assert_ne!(x1, x2);

    let run = (x2 - x1).unpack();
    let rise = y2 - y1;
    let dx = (x_val - x1).unpack();

    y1 + dx * (rise / run)
}
