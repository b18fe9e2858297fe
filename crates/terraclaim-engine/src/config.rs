//! Typed configuration for the unlock-cost engine.
//!
//! All thresholds, multipliers, TTLs, and sampling rates live here as
//! strongly-typed structs mirroring a flat YAML file. Every field has a
//! sensible default, so an empty config is a valid config.
//!
//! The string-keyed tables (terrain weights, biome multipliers, biome
//! material templates, currency conversion) are built once at load time
//! and consulted through lookup helpers with explicit unknown-key
//! fallbacks -- a missing key is a normal case, never an error.
//!
//! [`EngineConfig::config_hash`] digests the *price-relevant* settings
//! (economy kind, base cost, AI enabled, AI model). Changing any of them
//! silently invalidates all cached costs via fingerprint mismatch.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use terraclaim_types::{EconomyKind, Material, MaterialCost};
use xxhash_rust::xxh3::xxh3_64;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Terrain sampling geometry.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Terrain weight table.
    #[serde(default)]
    pub terrain_weights: TerrainWeights,

    /// Neighbor multiplier bounds.
    #[serde(default)]
    pub multiplier: MultiplierConfig,

    /// Owned-resource scanner settings.
    #[serde(default)]
    pub resources: ResourceScanConfig,

    /// Score-to-difficulty thresholds.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Pricing strategy parameters.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// AI oracle gating.
    #[serde(default)]
    pub ai: AiConfig,

    /// Cost cache TTLs.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Fingerprint of the price-relevant settings.
    ///
    /// Only settings that change computed prices participate: the economy
    /// kind, the base cost, and whether/which AI model is active. Sampling
    /// rates and TTLs deliberately do not -- retuning those must not dump
    /// every cached price.
    pub fn config_hash(&self) -> u64 {
        let fingerprint = format!(
            "{}|{:x}|{}|{}",
            self.pricing.economy.as_key(),
            self.pricing.base_cost.to_bits(),
            self.ai.enabled,
            self.ai.model,
        );
        xxh3_64(fingerprint.as_bytes())
    }
}

/// Terrain sampling geometry.
///
/// The scanner visits every `horizontal_step`-th block in x and z and
/// every `vertical_step`-th block in y across the full world column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SamplingConfig {
    /// Horizontal stride in blocks (applies to x and z).
    #[serde(default = "default_horizontal_step")]
    pub horizontal_step: u8,

    /// Vertical stride in blocks.
    #[serde(default = "default_vertical_step")]
    pub vertical_step: u8,

    /// Lowest sampled y coordinate.
    #[serde(default = "default_min_y")]
    pub min_y: i32,

    /// Highest sampled y coordinate.
    #[serde(default = "default_max_y")]
    pub max_y: i32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            horizontal_step: default_horizontal_step(),
            vertical_step: default_vertical_step(),
            min_y: default_min_y(),
            max_y: default_max_y(),
        }
    }
}

/// Terrain weight table: block key -> economic weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerrainWeights {
    /// Weights keyed by material key (see `Material::as_key`).
    #[serde(default = "default_terrain_weights")]
    pub weights: BTreeMap<String, f64>,

    /// Weight applied to any block type missing from the table.
    #[serde(default = "default_unknown_weight")]
    pub unknown_weight: f64,
}

impl TerrainWeights {
    /// The weight of a block, falling back to [`Self::unknown_weight`]
    /// for anything outside the table.
    pub fn weight(&self, material: Material) -> f64 {
        self.weights
            .get(material.as_key())
            .copied()
            .unwrap_or(self.unknown_weight)
    }
}

impl Default for TerrainWeights {
    fn default() -> Self {
        Self {
            weights: default_terrain_weights(),
            unknown_weight: default_unknown_weight(),
        }
    }
}

/// Bounds for the neighbor-relative multiplier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiplierConfig {
    /// Lower clamp.
    #[serde(default = "default_multiplier_min")]
    pub min: f64,

    /// Upper clamp.
    #[serde(default = "default_multiplier_max")]
    pub max: f64,
}

impl MultiplierConfig {
    /// The clamp range, repaired to hard-coded sane values when the
    /// configured pair is inverted or non-finite.
    pub fn bounds(&self) -> (f64, f64) {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            (self.min, self.max)
        } else {
            tracing::warn!(
                min = self.min,
                max = self.max,
                "malformed multiplier bounds, using defaults"
            );
            (default_multiplier_min(), default_multiplier_max())
        }
    }
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            min: default_multiplier_min(),
            max: default_multiplier_max(),
        }
    }
}

/// Owned-resource scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceScanConfig {
    /// Seconds a per-group scan result stays cached.
    #[serde(default = "default_resource_ttl_secs")]
    pub ttl_secs: u64,

    /// Horizontal stride in blocks for the column scan.
    #[serde(default = "default_resource_step")]
    pub horizontal_step: u8,

    /// Minimum scaled count for a material to be reported at all.
    #[serde(default = "default_min_abundance")]
    pub min_abundance: u64,
}

impl Default for ResourceScanConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_resource_ttl_secs(),
            horizontal_step: default_resource_step(),
            min_abundance: default_min_abundance(),
        }
    }
}

/// Score thresholds separating the difficulty bands.
///
/// Must be strictly increasing; malformed values are repaired at
/// evaluation time (see [`crate::evaluation`]).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvaluationConfig {
    /// Scores below this are [`terraclaim_types::Difficulty::Easy`].
    #[serde(default = "default_easy_below")]
    pub easy_below: f64,

    /// Scores at or above this are [`terraclaim_types::Difficulty::Hard`].
    #[serde(default = "default_hard_from")]
    pub hard_from: f64,

    /// Scores at or above this are
    /// [`terraclaim_types::Difficulty::Impossible`].
    #[serde(default = "default_impossible_from")]
    pub impossible_from: f64,

    /// Divisor turning a base value into a score.
    #[serde(default = "default_score_divisor")]
    pub score_divisor: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            easy_below: default_easy_below(),
            hard_from: default_hard_from(),
            impossible_from: default_impossible_from(),
            score_divisor: default_score_divisor(),
        }
    }
}

/// Pricing strategy parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricingConfig {
    /// Which strategy is active. External policy; the engine only reads it.
    #[serde(default)]
    pub economy: EconomyKind,

    /// Base currency cost of an unlock.
    #[serde(default = "default_base_cost")]
    pub base_cost: f64,

    /// Additional currency cost per already-unlocked chunk.
    #[serde(default = "default_per_unlock_cost")]
    pub per_unlock_cost: f64,

    /// Base material amount (the "template" stack size).
    #[serde(default = "default_base_material_amount")]
    pub base_material_amount: u32,

    /// Lower clamp for material amounts.
    #[serde(default = "default_min_material_amount")]
    pub min_material_amount: u32,

    /// Upper clamp for material amounts.
    #[serde(default = "default_max_material_amount")]
    pub max_material_amount: u32,

    /// Legacy single-item fallback when a biome has no template.
    #[serde(default = "default_fallback_material")]
    pub fallback_material: Material,

    /// Whether the team cost multiplier applies.
    #[serde(default)]
    pub team_economy: bool,

    /// Difficulty multipliers keyed by difficulty key.
    #[serde(default = "default_difficulty_multipliers")]
    pub difficulty_multipliers: BTreeMap<String, f64>,

    /// Biome cost multipliers keyed by biome key; missing biome -> 1.0.
    #[serde(default = "default_biome_multipliers")]
    pub biome_multipliers: BTreeMap<String, f64>,

    /// Biome material templates keyed by biome key.
    #[serde(default = "default_biome_materials")]
    pub biome_materials: BTreeMap<String, Vec<MaterialCost>>,

    /// Currency value per unit of material (AI currency conversion).
    #[serde(default = "default_currency_per_material")]
    pub currency_per_material: BTreeMap<String, f64>,

    /// Currency value for materials missing from the conversion table.
    #[serde(default = "default_currency_fallback_rate")]
    pub currency_fallback_rate: f64,
}

impl PricingConfig {
    /// Difficulty multiplier with unknown-key fallback to 1.0.
    pub fn difficulty_multiplier(&self, key: &str) -> f64 {
        self.difficulty_multipliers.get(key).copied().unwrap_or(1.0)
    }

    /// Biome multiplier with unknown-key fallback to 1.0.
    pub fn biome_multiplier(&self, key: &str) -> f64 {
        self.biome_multipliers.get(key).copied().unwrap_or(1.0)
    }

    /// Currency conversion rate for a material.
    pub fn currency_rate(&self, material: Material) -> f64 {
        self.currency_per_material
            .get(material.as_key())
            .copied()
            .unwrap_or(self.currency_fallback_rate)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            economy: EconomyKind::default(),
            base_cost: default_base_cost(),
            per_unlock_cost: default_per_unlock_cost(),
            base_material_amount: default_base_material_amount(),
            min_material_amount: default_min_material_amount(),
            max_material_amount: default_max_material_amount(),
            fallback_material: default_fallback_material(),
            team_economy: false,
            difficulty_multipliers: default_difficulty_multipliers(),
            biome_multipliers: default_biome_multipliers(),
            biome_materials: default_biome_materials(),
            currency_per_material: default_currency_per_material(),
            currency_fallback_rate: default_currency_fallback_rate(),
        }
    }
}

/// AI oracle gating. Connection details live with the oracle itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiConfig {
    /// Whether AI-assisted strategies may call the oracle at all.
    #[serde(default)]
    pub enabled: bool,

    /// Model identifier; part of the config fingerprint.
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// Whether the model's reasoning is surfaced to players.
    #[serde(default)]
    pub show_reasoning: bool,

    /// Oracle call budget in milliseconds before falling back.
    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_ai_model(),
            show_reasoning: false,
            timeout_ms: default_ai_timeout_ms(),
        }
    }
}

/// Cost cache TTLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Memory-tier TTL in seconds.
    #[serde(default = "default_memory_ttl_secs")]
    pub memory_ttl_secs: u64,

    /// Durable-tier validity window in seconds.
    #[serde(default = "default_durable_ttl_secs")]
    pub durable_ttl_secs: u64,

    /// Age in hours past which maintenance deletes durable rows.
    #[serde(default = "default_purge_age_hours")]
    pub purge_age_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_ttl_secs: default_memory_ttl_secs(),
            durable_ttl_secs: default_durable_ttl_secs(),
            purge_age_hours: default_purge_age_hours(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_horizontal_step() -> u8 {
    4
}

const fn default_vertical_step() -> u8 {
    8
}

const fn default_min_y() -> i32 {
    -64
}

const fn default_max_y() -> i32 {
    319
}

fn default_terrain_weights() -> BTreeMap<String, f64> {
    let entries: [(&str, f64); 20] = [
        ("air", 0.0),
        ("water", 0.1),
        ("lava", 0.4),
        ("bedrock", 0.0),
        ("dirt", 0.2),
        ("grass_block", 0.25),
        ("sand", 0.2),
        ("gravel", 0.2),
        ("clay", 0.4),
        ("leaves", 0.1),
        ("stone", 0.5),
        ("oak_log", 1.0),
        ("birch_log", 1.0),
        ("spruce_log", 1.0),
        ("jungle_log", 1.0),
        ("coal_ore", 2.0),
        ("iron_ore", 4.0),
        ("gold_ore", 8.0),
        ("diamond_ore", 25.0),
        ("emerald_ore", 30.0),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

const fn default_unknown_weight() -> f64 {
    0.1
}

const fn default_multiplier_min() -> f64 {
    0.5
}

const fn default_multiplier_max() -> f64 {
    3.0
}

const fn default_resource_ttl_secs() -> u64 {
    60
}

const fn default_resource_step() -> u8 {
    2
}

const fn default_min_abundance() -> u64 {
    64
}

const fn default_easy_below() -> f64 {
    25.0
}

const fn default_hard_from() -> f64 {
    100.0
}

const fn default_impossible_from() -> f64 {
    250.0
}

const fn default_score_divisor() -> f64 {
    1000.0
}

const fn default_base_cost() -> f64 {
    100.0
}

const fn default_per_unlock_cost() -> f64 {
    25.0
}

const fn default_base_material_amount() -> u32 {
    16
}

const fn default_min_material_amount() -> u32 {
    1
}

const fn default_max_material_amount() -> u32 {
    64
}

const fn default_fallback_material() -> Material {
    Material::Coal
}

fn default_difficulty_multipliers() -> BTreeMap<String, f64> {
    [
        ("easy", 0.75),
        ("normal", 1.0),
        ("hard", 1.5),
        ("impossible", 3.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect()
}

fn default_biome_multipliers() -> BTreeMap<String, f64> {
    [
        ("plains", 1.0),
        ("forest", 1.0),
        ("desert", 1.1),
        ("jungle", 1.3),
        ("swamp", 1.1),
        ("mountains", 1.4),
        ("ocean", 1.5),
        ("tundra", 1.2),
        ("mushroom", 2.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect()
}

fn default_biome_materials() -> BTreeMap<String, Vec<MaterialCost>> {
    let entries: [(&str, Material, u32); 6] = [
        ("plains", Material::Wheat, 24),
        ("forest", Material::OakLog, 16),
        ("desert", Material::Sand, 32),
        ("jungle", Material::JungleLog, 16),
        ("mountains", Material::Cobblestone, 32),
        ("tundra", Material::SpruceLog, 16),
    ];
    entries
        .into_iter()
        .map(|(biome, material, amount)| {
            (biome.to_owned(), vec![MaterialCost::new(material, amount)])
        })
        .collect()
}

fn default_currency_per_material() -> BTreeMap<String, f64> {
    [
        ("dirt", 0.1),
        ("cobblestone", 0.2),
        ("oak_log", 1.0),
        ("wheat", 0.5),
        ("coal", 2.0),
        ("raw_copper", 3.0),
        ("raw_iron", 5.0),
        ("raw_gold", 12.0),
        ("redstone", 4.0),
        ("lapis_lazuli", 6.0),
        ("diamond", 100.0),
        ("emerald", 120.0),
        ("ancient_debris", 400.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect()
}

const fn default_currency_fallback_rate() -> f64 {
    1.0
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_owned()
}

const fn default_ai_timeout_ms() -> u64 {
    4000
}

const fn default_memory_ttl_secs() -> u64 {
    300
}

const fn default_durable_ttl_secs() -> u64 {
    3600
}

const fn default_purge_age_hours() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.sampling.horizontal_step, 4);
        assert_eq!(config.resources.ttl_secs, 60);
        assert_eq!(config.cache.memory_ttl_secs, 300);
        assert_eq!(config.pricing.economy, EconomyKind::TraditionalMaterial);
        assert!(!config.ai.enabled);
    }

    #[test]
    fn parse_minimal_yaml_keeps_defaults() {
        let yaml = "pricing:\n  base_cost: 250.0\n";
        let config = EngineConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert!((config.pricing.base_cost - 250.0).abs() < f64::EPSILON);
        // Everything else uses defaults.
        assert_eq!(config.sampling.vertical_step, 8);
        assert_eq!(config.pricing.max_material_amount, 64);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(EngineConfig::parse("").is_ok());
    }

    #[test]
    fn config_hash_tracks_price_relevant_settings_only() {
        let base = EngineConfig::default();

        let mut economy = base.clone();
        economy.pricing.economy = EconomyKind::TraditionalCurrency;
        assert_ne!(base.config_hash(), economy.config_hash());

        let mut ai = base.clone();
        ai.ai.enabled = true;
        assert_ne!(base.config_hash(), ai.config_hash());

        let mut model = base.clone();
        model.ai.model = "some-other-model".to_owned();
        assert_ne!(base.config_hash(), model.config_hash());

        // Non-price settings must not disturb the fingerprint.
        let mut ttl = base.clone();
        ttl.cache.memory_ttl_secs = 9;
        ttl.sampling.horizontal_step = 2;
        assert_eq!(base.config_hash(), ttl.config_hash());
    }

    #[test]
    fn unknown_terrain_key_uses_fallback_weight() {
        let weights = TerrainWeights::default();
        assert!((weights.weight(Material::Unknown) - 0.1).abs() < f64::EPSILON);
        assert!((weights.weight(Material::DiamondOre) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_multiplier_bounds_are_repaired() {
        let bad = MultiplierConfig { min: 5.0, max: 0.5 };
        assert_eq!(bad.bounds(), (0.5, 3.0));
        let good = MultiplierConfig { min: 0.8, max: 2.0 };
        assert_eq!(good.bounds(), (0.8, 2.0));
    }
}
