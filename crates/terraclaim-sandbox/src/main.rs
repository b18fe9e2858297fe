//! Pricing sandbox over a synthetic world.
//!
//! Builds a full engine against the in-memory store and a layered flat
//! world, then prices a ring of chunks around the origin so config and
//! strategy changes can be eyeballed without a game server. Point
//! `TERRACLAIM_CONFIG` at a YAML file to try different settings; the
//! default configuration is used otherwise.

use terraclaim_engine::{CostEngine, EngineConfig, FlatWorldOracle, SoloTeamResolver};
use terraclaim_oracle::DisabledOracle;
use terraclaim_store::MemoryChunkStore;
use terraclaim_types::{Biome, ChunkKey, Material, PlayerId};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Entry point: wire the engine, price a 3x3 neighborhood, log the results.
///
/// # Errors
///
/// Returns an error when the configuration file cannot be loaded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("terraclaim-sandbox starting");

    let config = match std::env::var("TERRACLAIM_CONFIG") {
        Ok(path) => {
            let config = EngineConfig::from_file(std::path::Path::new(&path))?;
            info!(path, "configuration loaded");
            config
        }
        Err(_) => {
            info!("no TERRACLAIM_CONFIG set, using defaults");
            EngineConfig::default()
        }
    };
    info!(
        economy = config.pricing.economy.as_key(),
        ai_enabled = config.ai.enabled,
        "pricing configuration"
    );

    let world = sandbox_world();
    let engine = CostEngine::new(
        config,
        MemoryChunkStore::new(),
        world,
        SoloTeamResolver,
        DisabledOracle::new(),
    );
    let player = PlayerId::new();

    for x in [-1_i32, 0, 1] {
        for z in [-1_i32, 0, 1] {
            let chunk = ChunkKey::new("sandbox", x, z);
            let evaluation = engine.evaluate(&chunk).await;
            let cost = engine.final_cost(&chunk, player).await;
            info!(
                %chunk,
                biome = evaluation.biome.as_key(),
                score = format_args!("{:.1}", evaluation.score),
                difficulty = evaluation.difficulty.as_key(),
                %cost,
                "priced"
            );
        }
    }

    info!("terraclaim-sandbox done");
    Ok(())
}

/// A flat world with one ore-rich chunk and one barren one, so the
/// neighbor multiplier and difficulty bands have something to react to.
fn sandbox_world() -> FlatWorldOracle {
    let world = FlatWorldOracle::standard();

    let rich = ChunkKey::new("sandbox", 1, 0);
    world.set_chunk_layers(
        rich.clone(),
        [
            (i32::MIN, Material::Stone),
            (0, Material::IronOre),
            (16, Material::DiamondOre),
            (24, Material::Stone),
            (65, Material::Air),
        ],
    );
    world.set_biome(rich, Biome::Mountains);

    let barren = ChunkKey::new("sandbox", -1, 0);
    world.set_chunk_layers(barren.clone(), [(i32::MIN, Material::Sand), (65, Material::Air)]);
    world.set_biome(barren, Biome::Desert);

    world
}
