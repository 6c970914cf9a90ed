//! Sampling an expression along the x axis, e.g. to draw its graph.

use crate::{ops::Context, Expression};

pub type Point = euclid::Point2D<f64, euclid::UnknownUnit>;

/// The most points a single call will evaluate.
pub const MAX_SAMPLES: usize = 1_000_000;

/// A run of points which can be joined up without lifting the pen.
pub type Segment = Vec<Point>;

/// Evaluate `expr` at evenly spaced values of `x` from `start` to `end`
/// (inclusive), `step` apart.
///
/// Wherever evaluation fails or the result isn't finite the curve is broken,
/// so asymptotes and holes in the domain don't get joined across. Empty
/// segments are never returned, and neither is anything for a range that
/// would need more than [`MAX_SAMPLES`] points.
pub fn sample<C>(
    expr: &Expression,
    start: f64,
    end: f64,
    step: f64,
    ctx: &C,
) -> Vec<Segment>
where
    C: Context,
{
    let mut segments = Vec::new();

    if !(step > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
        return segments;
    }

    let steps = ((end - start) / step).floor();
    if !(steps < MAX_SAMPLES as f64) {
        log::debug!(
            "Sampling {}..{} every {} needs too many points",
            start,
            end,
            step
        );
        return segments;
    }

    let samples = steps as usize + 1;
    let mut current = Segment::new();

    for i in 0..samples {
        // multiplying instead of accumulating stops rounding errors drifting
        let x = start + i as f64 * step;

        match expr.evaluate_at(x, ctx) {
            Ok(y) if y.is_finite() => current.push(Point::new(x, y)),
            other => {
                log::trace!("Breaking the curve at x = {}: {:?}", x, other);
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            },
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
