//! Core value objects: chunk identity, evaluations, payments, cache entries.
//!
//! Invariant violations are normalized at construction rather than rejected:
//! a negative score clamps to zero, a missing biome defaults to plains.
//! Nothing here can fail.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Biome, Difficulty, Material, ResourceTier};

/// Stable identity of a world grid cell: (world id, chunk x, chunk z).
///
/// Used as the cache and store key everywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    /// World identifier (the server's world name).
    pub world: String,
    /// Chunk x coordinate.
    pub x: i32,
    /// Chunk z coordinate.
    pub z: i32,
}

impl ChunkKey {
    /// Create a chunk key.
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }

    /// The 4 cardinal (non-diagonal) neighbors, used by the neighbor
    /// multiplier engine.
    pub fn cardinal_neighbors(&self) -> [Self; 4] {
        [
            Self::new(self.world.clone(), self.x.saturating_add(1), self.z),
            Self::new(self.world.clone(), self.x.saturating_sub(1), self.z),
            Self::new(self.world.clone(), self.x, self.z.saturating_add(1)),
            Self::new(self.world.clone(), self.x, self.z.saturating_sub(1)),
        ]
    }

    /// All 8 surrounding chunks, used by adjacent pre-calculation.
    pub fn surrounding(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(8);
        for dx in [-1i32, 0, 1] {
            for dz in [-1i32, 0, 1] {
                if dx == 0 && dz == 0 {
                    continue;
                }
                out.push(Self::new(
                    self.world.clone(),
                    self.x.saturating_add(dx),
                    self.z.saturating_add(dz),
                ));
            }
        }
        out
    }
}

impl core::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}:{}", self.world, self.x, self.z)
    }
}

/// Per-lookup snapshot of how a chunk evaluates; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkEvaluation {
    /// Economic score, always finite and non-negative.
    pub score: f64,
    /// Difficulty band derived from the score thresholds.
    pub difficulty: Difficulty,
    /// Biome at the chunk, defaulted when the oracle reports none.
    pub biome: Biome,
}

impl ChunkEvaluation {
    /// Build an evaluation, normalizing invariant violations instead of
    /// rejecting them: non-finite or negative scores clamp to 0.0 and a
    /// missing biome defaults to [`Biome::Plains`].
    pub fn new(score: f64, difficulty: Difficulty, biome: Option<Biome>) -> Self {
        let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
        Self {
            score,
            difficulty,
            biome: biome.unwrap_or_default(),
        }
    }
}

/// Permanent per-chunk economic weight from terrain sampling.
///
/// The `computed` flag disambiguates "never scanned" from "scanned and
/// genuinely worthless" -- a raw 0.0 alone cannot tell the two apart.
/// Once computed, the value is never rescanned except by explicit force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseValue {
    /// The economic weight, always finite and non-negative.
    pub value: f64,
    /// Whether a terrain scan has actually produced this value.
    pub computed: bool,
}

impl BaseValue {
    /// A value that has never been computed.
    pub const UNCOMPUTED: Self = Self {
        value: 0.0,
        computed: false,
    };

    /// Wrap a completed scan result, clamping to a finite non-negative value.
    pub fn computed(value: f64) -> Self {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            value,
            computed: true,
        }
    }
}

impl Default for BaseValue {
    fn default() -> Self {
        Self::UNCOMPUTED
    }
}

/// One material line of a payment requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCost {
    /// The item to pay with.
    pub material: Material,
    /// How many of it.
    pub amount: u32,
}

impl MaterialCost {
    /// Create a material cost line.
    pub const fn new(material: Material, amount: u32) -> Self {
        Self { material, amount }
    }
}

/// The computed unlock cost: either currency or a list of materials.
///
/// Immutable; the single output type of every pricing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PaymentRequirement {
    /// A currency amount.
    Currency {
        /// The amount to charge.
        amount: f64,
    },
    /// One or more material stacks.
    Materials {
        /// The items and amounts to charge.
        items: Vec<MaterialCost>,
        /// Optional human-readable justification (AI strategies only,
        /// config-gated).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
    },
}

impl PaymentRequirement {
    /// A currency requirement.
    pub const fn currency(amount: f64) -> Self {
        Self::Currency { amount }
    }

    /// A single-material requirement with no reasoning attached.
    pub fn material(material: Material, amount: u32) -> Self {
        Self::Materials {
            items: vec![MaterialCost::new(material, amount)],
            reasoning: None,
        }
    }
}

impl core::fmt::Display for PaymentRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Currency { amount } => write!(f, "${amount:.2}"),
            Self::Materials { items, .. } => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} x {}", item.amount, item.material.as_key())?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// One harvestable material found by the owned-resource scanner.
///
/// Ephemeral: rebuilt on every cache miss, discarded after TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// The block type found in the player's territory.
    pub material: Material,
    /// Estimated count after density scaling.
    pub count: u64,
    /// Harvest tier of the material.
    pub tier: ResourceTier,
}

/// Outcome aggregate for a sampling pass.
///
/// Scanning tolerates per-sample failures; this summary lets callers tell
/// systemic oracle failure apart from normal partial coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Samples that produced a block type.
    pub sampled: u32,
    /// Samples the oracle failed to answer.
    pub failed: u32,
}

impl ScanSummary {
    /// Record one successful sample.
    pub const fn record_ok(&mut self) {
        self.sampled = self.sampled.saturating_add(1);
    }

    /// Record one failed sample.
    pub const fn record_failed(&mut self) {
        self.failed = self.failed.saturating_add(1);
    }

    /// Fold another summary into this one.
    pub const fn merge(&mut self, other: Self) {
        self.sampled = self.sampled.saturating_add(other.sampled);
        self.failed = self.failed.saturating_add(other.failed);
    }

    /// Total samples attempted.
    pub const fn total(&self) -> u32 {
        self.sampled.saturating_add(self.failed)
    }

    /// True when every attempted sample failed.
    pub const fn total_failure(&self) -> bool {
        self.failed > 0 && self.sampled == 0
    }
}

/// A cost-cache entry: the requirement plus the settings fingerprint and
/// computation timestamp that govern its validity.
///
/// Entries are always replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCostEntry {
    /// The cached payment requirement.
    pub requirement: PaymentRequirement,
    /// Fingerprint of price-relevant settings at computation time.
    pub config_hash: u64,
    /// When the requirement was computed.
    pub computed_at: DateTime<Utc>,
}

impl CachedCostEntry {
    /// Create an entry stamped with the current time.
    pub fn new(requirement: PaymentRequirement, config_hash: u64) -> Self {
        Self {
            requirement,
            config_hash,
            computed_at: Utc::now(),
        }
    }

    /// Whether this entry may serve a read under the given fingerprint and
    /// maximum age. A fingerprint mismatch is always a miss -- settings
    /// changes invalidate transparently, without explicit eviction.
    pub fn is_valid(&self, config_hash: u64, max_age: TimeDelta, now: DateTime<Utc>) -> bool {
        self.config_hash == config_hash && now.signed_duration_since(self.computed_at) <= max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_neighbors_are_orthogonal() {
        let key = ChunkKey::new("overworld", 3, -2);
        let neighbors = key.cardinal_neighbors();
        assert_eq!(neighbors.len(), 4);
        for n in &neighbors {
            let manhattan = key.x.abs_diff(n.x) + key.z.abs_diff(n.z);
            assert_eq!(manhattan, 1, "cardinal neighbor must be adjacent");
            assert_eq!(n.world, key.world);
        }
    }

    #[test]
    fn surrounding_covers_eight_chunks() {
        let key = ChunkKey::new("overworld", 0, 0);
        let ring = key.surrounding();
        assert_eq!(ring.len(), 8);
        assert!(!ring.contains(&key));
    }

    #[test]
    fn evaluation_normalizes_bad_inputs() {
        let eval = ChunkEvaluation::new(-4.0, Difficulty::Hard, None);
        assert!(eval.score.abs() < f64::EPSILON);
        assert_eq!(eval.biome, Biome::Plains);

        let nan = ChunkEvaluation::new(f64::NAN, Difficulty::Easy, Some(Biome::Desert));
        assert!(nan.score.is_finite());
        assert_eq!(nan.biome, Biome::Desert);
    }

    #[test]
    fn base_value_distinguishes_uncomputed_from_worthless() {
        let never = BaseValue::UNCOMPUTED;
        let worthless = BaseValue::computed(0.0);
        assert!(!never.computed);
        assert!(worthless.computed);
        assert!(never.value.abs() < f64::EPSILON);
        assert!(worthless.value.abs() < f64::EPSILON);
    }

    #[test]
    fn cache_entry_rejects_fingerprint_mismatch() {
        let entry = CachedCostEntry::new(PaymentRequirement::currency(50.0), 0xAAAA);
        let now = Utc::now();
        assert!(entry.is_valid(0xAAAA, TimeDelta::minutes(5), now));
        assert!(!entry.is_valid(0xBBBB, TimeDelta::minutes(5), now));
    }

    #[test]
    fn cache_entry_expires_by_age() {
        let mut entry = CachedCostEntry::new(PaymentRequirement::currency(50.0), 7);
        entry.computed_at = Utc::now() - TimeDelta::hours(2);
        assert!(!entry.is_valid(7, TimeDelta::hours(1), Utc::now()));
        assert!(entry.is_valid(7, TimeDelta::hours(3), Utc::now()));
    }

    #[test]
    fn payment_display_reads_naturally() {
        let cur = PaymentRequirement::currency(262.5);
        assert_eq!(cur.to_string(), "$262.50");
        let mat = PaymentRequirement::material(Material::Coal, 16);
        assert_eq!(mat.to_string(), "16 x coal");
    }

    #[test]
    fn scan_summary_detects_total_failure() {
        let mut summary = ScanSummary::default();
        summary.record_failed();
        summary.record_failed();
        assert!(summary.total_failure());
        summary.record_ok();
        assert!(!summary.total_failure());
        assert_eq!(summary.total(), 3);
    }
}
