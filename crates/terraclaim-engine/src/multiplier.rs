//! Neighbor-relative pricing multiplier.
//!
//! A chunk that is richer than its surroundings costs more, a poorer one
//! costs less. The multiplier is the ratio of the chunk's base value to
//! the average of its available cardinal neighbors, clamped to the
//! configured bounds. No neighbors, or neighbors that average to nothing,
//! means neutral pricing.

/// Compute the neighbor-relative multiplier for a chunk.
///
/// `neighbor_values` holds the base values of whichever cardinal
/// neighbors could be evaluated; the caller drops unavailable ones before
/// calling. Total function: every input maps to a finite multiplier
/// within `[min, max]` (or exactly 1.0 for the neutral cases).
pub fn neighbor_multiplier(chunk_value: f64, neighbor_values: &[f64], min: f64, max: f64) -> f64 {
    if neighbor_values.is_empty() {
        return 1.0;
    }

    let sum: f64 = neighbor_values.iter().copied().filter(|v| v.is_finite()).sum();
    let count = neighbor_values.iter().filter(|v| v.is_finite()).count();
    if count == 0 {
        return 1.0;
    }

    #[allow(clippy::cast_precision_loss)] // at most 4 neighbors
    let average = sum / count as f64;
    if average.abs() < f64::EPSILON {
        return 1.0;
    }

    let ratio = chunk_value / average;
    if !ratio.is_finite() {
        return 1.0;
    }
    ratio.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f64 = 0.5;
    const MAX: f64 = 3.0;

    #[test]
    fn no_neighbors_is_neutral() {
        assert!((neighbor_multiplier(500.0, &[], MIN, MAX) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_value_is_neutral() {
        let m = neighbor_multiplier(100.0, &[100.0, 100.0, 100.0, 100.0], MIN, MAX);
        assert!((m - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn richer_than_neighbors_costs_more() {
        let m = neighbor_multiplier(200.0, &[100.0, 100.0], MIN, MAX);
        assert!((m - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamped_at_both_ends() {
        let high = neighbor_multiplier(10_000.0, &[1.0], MIN, MAX);
        assert!((high - MAX).abs() < f64::EPSILON);
        let low = neighbor_multiplier(1.0, &[10_000.0], MIN, MAX);
        assert!((low - MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn worthless_neighborhood_is_neutral() {
        // Average zero must not divide.
        let m = neighbor_multiplier(50.0, &[0.0, 0.0], MIN, MAX);
        assert!((m - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_neighbors_are_ignored() {
        let m = neighbor_multiplier(200.0, &[f64::NAN, 100.0], MIN, MAX);
        assert!((m - 2.0).abs() < f64::EPSILON);
        let all_bad = neighbor_multiplier(200.0, &[f64::NAN, f64::INFINITY], MIN, MAX);
        assert!((all_bad - 1.0).abs() < f64::EPSILON);
    }
}
