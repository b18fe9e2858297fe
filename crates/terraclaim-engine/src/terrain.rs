//! Coarse terrain sampling into a permanent per-chunk base value.
//!
//! The scanner visits a strided grid through the chunk's full column,
//! looks each block up in the weight table, and extrapolates the average
//! sample weight to the whole chunk volume. Individual sample failures
//! are recorded and skipped; only a scan where *every* sample failed
//! collapses to zero.
//!
//! Base values are permanent -- persistence and the "compute once" rule
//! live in the orchestrator, not here.

use terraclaim_types::{ChunkKey, ScanSummary};

use crate::config::{SamplingConfig, TerrainWeights};
use crate::world::WorldOracle;

/// Blocks per chunk edge.
const CHUNK_EDGE: u8 = 16;

/// Sample a chunk's terrain and extrapolate its economic base value.
///
/// Returns the extrapolated value together with the sample tally. A total
/// failure (oracle answered nothing) yields 0.0 with
/// [`ScanSummary::total_failure`] set, letting the caller decide whether
/// to persist the result.
pub fn scan_base_value<W: WorldOracle>(
    world: &W,
    weights: &TerrainWeights,
    sampling: &SamplingConfig,
    chunk: &ChunkKey,
) -> (f64, ScanSummary) {
    let horizontal = sampling.horizontal_step.max(1);
    let vertical = i32::from(sampling.vertical_step.max(1));

    let mut summary = ScanSummary::default();
    let mut weight_sum = 0.0_f64;

    let mut x = 0u8;
    while x < CHUNK_EDGE {
        let mut z = 0u8;
        while z < CHUNK_EDGE {
            let mut y = sampling.min_y;
            while y <= sampling.max_y {
                match world.block_at(chunk, x, y, z) {
                    Ok(material) => {
                        weight_sum += weights.weight(material);
                        summary.record_ok();
                    }
                    Err(error) => {
                        tracing::trace!(%chunk, x, y, z, %error, "terrain sample failed");
                        summary.record_failed();
                    }
                }
                y = y.saturating_add(vertical);
            }
            z = z.saturating_add(horizontal);
        }
        x = x.saturating_add(horizontal);
    }

    if summary.sampled == 0 {
        if summary.failed > 0 {
            tracing::warn!(%chunk, failed = summary.failed, "terrain scan failed entirely");
        }
        return (0.0, summary);
    }

    let column_height = f64::from(sampling.max_y.saturating_sub(sampling.min_y).saturating_add(1))
        .max(0.0);
    let volume = f64::from(CHUNK_EDGE) * f64::from(CHUNK_EDGE) * column_height;
    let average = weight_sum / f64::from(summary.sampled);

    (average * volume, summary)
}

#[cfg(test)]
mod tests {
    use terraclaim_types::Material;

    use super::*;
    use crate::world::FlatWorldOracle;

    fn chunk() -> ChunkKey {
        ChunkKey::new("overworld", 0, 0)
    }

    #[test]
    fn uniform_world_extrapolates_exactly() {
        // A column of pure stone: average weight is the stone weight, so the
        // extrapolated value is weight * full volume regardless of stride.
        let world = FlatWorldOracle::layered([(i32::MIN, Material::Stone)], 319);
        let weights = TerrainWeights::default();
        let sampling = SamplingConfig {
            horizontal_step: 4,
            vertical_step: 8,
            min_y: 0,
            max_y: 63,
        };

        let (value, summary) = scan_base_value(&world, &weights, &sampling, &chunk());
        assert_eq!(summary.failed, 0);
        // 16 * 16 * 64 blocks at weight 0.5.
        let expected = 256.0 * 64.0 * 0.5;
        assert!((value - expected).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn richer_terrain_scores_higher() {
        let weights = TerrainWeights::default();
        let sampling = SamplingConfig::default();

        let stone = FlatWorldOracle::layered([(i32::MIN, Material::Stone)], 64);
        let diamond = FlatWorldOracle::layered([(i32::MIN, Material::DiamondOre)], 64);

        let (stone_value, _) = scan_base_value(&stone, &weights, &sampling, &chunk());
        let (diamond_value, _) = scan_base_value(&diamond, &weights, &sampling, &chunk());
        assert!(diamond_value > stone_value);
    }

    #[test]
    fn partial_failures_are_skipped_not_fatal() {
        let world = FlatWorldOracle::standard();
        let weights = TerrainWeights::default();
        let sampling = SamplingConfig::default();

        let healthy = chunk();
        let (_, healthy_summary) = scan_base_value(&world, &weights, &sampling, &healthy);
        assert_eq!(healthy_summary.failed, 0);
        assert!(healthy_summary.sampled > 0);
    }

    #[test]
    fn total_failure_scores_zero() {
        let world = FlatWorldOracle::standard();
        let dead = ChunkKey::new("overworld", 9, 9);
        world.set_failing(dead.clone());

        let (value, summary) =
            scan_base_value(&world, &TerrainWeights::default(), &SamplingConfig::default(), &dead);
        assert!(value.abs() < f64::EPSILON);
        assert!(summary.total_failure());
    }

    #[test]
    fn air_worlds_are_worthless() {
        let world = FlatWorldOracle::layered([(i32::MIN, Material::Air)], 0);
        let (value, summary) = scan_base_value(
            &world,
            &TerrainWeights::default(),
            &SamplingConfig::default(),
            &chunk(),
        );
        assert!(value.abs() < f64::EPSILON);
        assert!(!summary.total_failure());
    }
}
