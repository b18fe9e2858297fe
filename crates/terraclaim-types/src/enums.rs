//! Enumeration types: biomes, materials, harvest tiers, difficulty, economy.
//!
//! The material vocabulary is deliberately fixed: only the blocks listed in
//! the six harvest tiers are ever offered as payment. Everything else a
//! world oracle can report still participates in terrain *valuation* via
//! the configurable weight table, but never in resource-aware pricing.

use serde::{Deserialize, Serialize};

/// Terrain/climate classification of a chunk, used for default cost lookups.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Flat grassland; the neutral default when the oracle reports nothing.
    #[default]
    Plains,
    /// Wooded terrain.
    Forest,
    /// Arid sand terrain.
    Desert,
    /// Dense tropical terrain.
    Jungle,
    /// Waterlogged lowland.
    Swamp,
    /// High-elevation stone terrain.
    Mountains,
    /// Open water.
    Ocean,
    /// Frozen terrain.
    Tundra,
    /// Rare fungal terrain.
    Mushroom,
    /// Any biome outside the known vocabulary.
    Other,
}

impl Biome {
    /// Stable string key used in configuration tables.
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Desert => "desert",
            Self::Jungle => "jungle",
            Self::Swamp => "swamp",
            Self::Mountains => "mountains",
            Self::Ocean => "ocean",
            Self::Tundra => "tundra",
            Self::Mushroom => "mushroom",
            Self::Other => "other",
        }
    }
}

/// Harvest tier for payable materials: 1 (common) through 6 (rare).
///
/// Higher tiers are rarer in the world and therefore *cheaper* to spend as
/// payment -- the cost multiplier shrinks as the tier rises.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTier {
    /// Tier 1: common fill blocks (dirt, sand, gravel).
    Common,
    /// Tier 2: wood.
    Timber,
    /// Tier 3: crops.
    Crop,
    /// Tier 4: stone and base ores.
    BaseOre,
    /// Tier 5: precious ores.
    PreciousOre,
    /// Tier 6: rare ores.
    RareOre,
}

impl ResourceTier {
    /// Numeric rank, 1 through 6.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Common => 1,
            Self::Timber => 2,
            Self::Crop => 3,
            Self::BaseOre => 4,
            Self::PreciousOre => 5,
            Self::RareOre => 6,
        }
    }

    /// Fixed cost-discount multiplier for this tier.
    ///
    /// Monotonically non-increasing with rank: paying in rarer materials
    /// requires fewer of them.
    pub const fn cost_multiplier(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Timber => 0.7,
            Self::Crop => 0.5,
            Self::BaseOre => 0.25,
            Self::PreciousOre => 0.1,
            Self::RareOre => 0.05,
        }
    }
}

/// Block and item vocabulary for terrain valuation and payment.
///
/// Block variants may carry a harvest tier (see [`Material::tier`]); ore
/// blocks map to the item they realistically drop (see
/// [`Material::drop_item`]). [`Material::Unknown`] stands in for any block
/// type outside this vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)] // Variant names are the documentation here.
pub enum Material {
    // Tier 1: common fill
    Dirt,
    GrassBlock,
    Sand,
    Gravel,
    Clay,
    // Tier 2: wood
    OakLog,
    BirchLog,
    SpruceLog,
    JungleLog,
    // Tier 3: crops
    Wheat,
    Carrots,
    Potatoes,
    Pumpkin,
    SugarCane,
    // Tier 4: stone and base ores
    Stone,
    CoalOre,
    CopperOre,
    IronOre,
    // Tier 5: precious ores
    GoldOre,
    RedstoneOre,
    LapisOre,
    // Tier 6: rare ores
    DiamondOre,
    EmeraldOre,
    AncientDebris,
    // Drop items (never tiered; produced by drop_item mapping)
    Cobblestone,
    Coal,
    RawCopper,
    RawIron,
    RawGold,
    Redstone,
    LapisLazuli,
    Diamond,
    Emerald,
    // Non-tiered terrain
    Air,
    Water,
    Lava,
    Bedrock,
    Leaves,
    /// Any block type outside the known vocabulary.
    Unknown,
}

impl Material {
    /// The harvest tier of this block, or `None` if it is not payable.
    ///
    /// Only blocks on the fixed six-tier allow-list are ever offered as
    /// payment; unrecognized-but-valuable blocks still contribute to
    /// terrain value through the weight table but never tier.
    pub const fn tier(self) -> Option<ResourceTier> {
        match self {
            Self::Dirt | Self::GrassBlock | Self::Sand | Self::Gravel | Self::Clay => {
                Some(ResourceTier::Common)
            }
            Self::OakLog | Self::BirchLog | Self::SpruceLog | Self::JungleLog => {
                Some(ResourceTier::Timber)
            }
            Self::Wheat | Self::Carrots | Self::Potatoes | Self::Pumpkin | Self::SugarCane => {
                Some(ResourceTier::Crop)
            }
            Self::Stone | Self::CoalOre | Self::CopperOre | Self::IronOre => {
                Some(ResourceTier::BaseOre)
            }
            Self::GoldOre | Self::RedstoneOre | Self::LapisOre => Some(ResourceTier::PreciousOre),
            Self::DiamondOre | Self::EmeraldOre | Self::AncientDebris => {
                Some(ResourceTier::RareOre)
            }
            _ => None,
        }
    }

    /// The item a player realistically holds after mining this block.
    ///
    /// Payment requirements are expressed in drop items so players can
    /// actually pay them; non-ore materials drop themselves.
    pub const fn drop_item(self) -> Self {
        match self {
            Self::Stone => Self::Cobblestone,
            Self::CoalOre => Self::Coal,
            Self::CopperOre => Self::RawCopper,
            Self::IronOre => Self::RawIron,
            Self::GoldOre => Self::RawGold,
            Self::RedstoneOre => Self::Redstone,
            Self::LapisOre => Self::LapisLazuli,
            Self::DiamondOre => Self::Diamond,
            Self::EmeraldOre => Self::Emerald,
            other => other,
        }
    }

    /// Stable string key used in configuration tables (weight maps,
    /// material-to-currency conversion).
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Dirt => "dirt",
            Self::GrassBlock => "grass_block",
            Self::Sand => "sand",
            Self::Gravel => "gravel",
            Self::Clay => "clay",
            Self::OakLog => "oak_log",
            Self::BirchLog => "birch_log",
            Self::SpruceLog => "spruce_log",
            Self::JungleLog => "jungle_log",
            Self::Wheat => "wheat",
            Self::Carrots => "carrots",
            Self::Potatoes => "potatoes",
            Self::Pumpkin => "pumpkin",
            Self::SugarCane => "sugar_cane",
            Self::Stone => "stone",
            Self::CoalOre => "coal_ore",
            Self::CopperOre => "copper_ore",
            Self::IronOre => "iron_ore",
            Self::GoldOre => "gold_ore",
            Self::RedstoneOre => "redstone_ore",
            Self::LapisOre => "lapis_ore",
            Self::DiamondOre => "diamond_ore",
            Self::EmeraldOre => "emerald_ore",
            Self::AncientDebris => "ancient_debris",
            Self::Cobblestone => "cobblestone",
            Self::Coal => "coal",
            Self::RawCopper => "raw_copper",
            Self::RawIron => "raw_iron",
            Self::RawGold => "raw_gold",
            Self::Redstone => "redstone",
            Self::LapisLazuli => "lapis_lazuli",
            Self::Diamond => "diamond",
            Self::Emerald => "emerald",
            Self::Air => "air",
            Self::Water => "water",
            Self::Lava => "lava",
            Self::Bedrock => "bedrock",
            Self::Leaves => "leaves",
            Self::Unknown => "unknown",
        }
    }
}

/// Difficulty rating attached to a chunk evaluation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Below the easy threshold.
    Easy,
    /// The default band.
    #[default]
    Normal,
    /// Above the hard threshold.
    Hard,
    /// Above the impossible threshold.
    Impossible,
}

impl Difficulty {
    /// Stable string key used in configuration tables.
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Impossible => "impossible",
        }
    }
}

/// Which pricing strategy is active.
///
/// Selection is external policy: the engine reads this from configuration
/// and never changes it. The AI variants fall back to their traditional
/// counterpart on any oracle failure; resource-aware falls back to
/// traditional material when the player's territory yields nothing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EconomyKind {
    /// Biome-keyed material templates.
    #[default]
    TraditionalMaterial,
    /// Flat currency formula.
    TraditionalCurrency,
    /// Material chosen from what the player's territory actually yields.
    ResourceMaterial,
    /// AI-suggested material, traditional-material fallback.
    AiMaterial,
    /// AI-suggested material converted to currency, traditional-currency
    /// fallback.
    AiCurrency,
}

impl EconomyKind {
    /// Stable string key, used in the config fingerprint.
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::TraditionalMaterial => "traditional_material",
            Self::TraditionalCurrency => "traditional_currency",
            Self::ResourceMaterial => "resource_material",
            Self::AiMaterial => "ai_material",
            Self::AiCurrency => "ai_currency",
        }
    }
}
