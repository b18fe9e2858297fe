//! The async orchestrator tying every component together.
//!
//! [`CostEngine`] owns the wiring: it gathers evaluation, neighbor, and
//! progression inputs, dispatches the configured pricing strategy with
//! its fallback chain, and fronts everything with the two-tier cost
//! cache. The hot public methods are infallible -- every failure path
//! ends at a priced answer, never an error, because a player standing at
//! a border needs *a* price.
//!
//! Collaborators are held behind `Arc` so the engine clones cheaply into
//! spawned background tasks (async pre-warming, deadline-bounded
//! lookups).

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use futures::future::join_all;
use terraclaim_oracle::{CostSuggestion, CostSuggestionOracle, SuggestionRequest};
use terraclaim_store::ChunkStore;
use terraclaim_types::{
    BaseValue, CachedCostEntry, ChunkEvaluation, ChunkKey, EconomyKind, GroupId,
    PaymentRequirement, PlayerId,
};

use crate::cache::CostCache;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::evaluation::{derive_difficulty, score_of};
use crate::multiplier::neighbor_multiplier;
use crate::pricing;
use crate::pricing::PricingContext;
use crate::resources::ResourceScanner;
use crate::terrain::scan_base_value;
use crate::world::{TeamResolver, WorldOracle};

/// The unlock-cost engine.
///
/// Generic over its four ports; every instantiation is `Clone + Send +
/// Sync` and safe to share across tasks.
pub struct CostEngine<S, W, T, O> {
    config: Arc<EngineConfig>,
    store: Arc<S>,
    world: Arc<W>,
    teams: Arc<T>,
    oracle: Arc<O>,
    cache: Arc<CostCache>,
    scanner: Arc<ResourceScanner>,
    config_hash: u64,
}

impl<S, W, T, O> Clone for CostEngine<S, W, T, O> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            world: Arc::clone(&self.world),
            teams: Arc::clone(&self.teams),
            oracle: Arc::clone(&self.oracle),
            cache: Arc::clone(&self.cache),
            scanner: Arc::clone(&self.scanner),
            config_hash: self.config_hash,
        }
    }
}

impl<S, W, T, O> CostEngine<S, W, T, O>
where
    S: ChunkStore + 'static,
    W: WorldOracle + 'static,
    T: TeamResolver + 'static,
    O: CostSuggestionOracle + 'static,
{
    /// Assemble an engine from its collaborators.
    pub fn new(config: EngineConfig, store: S, world: W, teams: T, oracle: O) -> Self {
        let config_hash = config.config_hash();
        tracing::info!(
            economy = config.pricing.economy.as_key(),
            ai_enabled = config.ai.enabled,
            config_hash = format_args!("{config_hash:016x}"),
            "cost engine assembled"
        );
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            world: Arc::new(world),
            teams: Arc::new(teams),
            oracle: Arc::new(oracle),
            cache: Arc::new(CostCache::new()),
            scanner: Arc::new(ResourceScanner::new()),
            config_hash,
        }
    }

    /// The active settings fingerprint.
    pub const fn config_hash(&self) -> u64 {
        self.config_hash
    }

    /// Evaluate a chunk: score, difficulty band, biome.
    ///
    /// The neighbor-relative multiplier is folded into the score here,
    /// so a chunk surrounded by poor terrain evaluates (and prices)
    /// below its raw base value and vice versa. Everything downstream
    /// reads the adjusted score only.
    pub async fn evaluate(&self, chunk: &ChunkKey) -> ChunkEvaluation {
        let base = self.base_value(chunk).await;
        let raw = score_of(base.value, &self.config.evaluation);
        let score = raw * self.multiplier(chunk, base.value).await;
        let difficulty = derive_difficulty(score, &self.config.evaluation);
        ChunkEvaluation::new(score, difficulty, self.world.biome_at(chunk))
    }

    /// The chunk's base value, computing and persisting it on first touch.
    ///
    /// A totally failed scan is returned as uncomputed and *not*
    /// persisted, so the next lookup retries instead of freezing a bogus
    /// zero forever.
    pub async fn base_value(&self, chunk: &ChunkKey) -> BaseValue {
        match self.store.base_value(chunk).await {
            Ok(Some(stored)) if stored.computed => return stored,
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%chunk, %error, "base value read failed, rescanning");
            }
        }

        let (value, summary) = scan_base_value(
            self.world.as_ref(),
            &self.config.terrain_weights,
            &self.config.sampling,
            chunk,
        );
        if summary.total_failure() {
            return BaseValue::UNCOMPUTED;
        }

        let computed = BaseValue::computed(value);
        if let Err(error) = self.store.set_base_value(chunk, computed).await {
            tracing::warn!(%chunk, %error, "base value persist failed");
        }
        computed
    }

    /// Force a fresh terrain scan, overwriting the stored base value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the persist fails; maintenance
    /// callers need the truth.
    pub async fn recompute_base_value(&self, chunk: &ChunkKey) -> Result<BaseValue, EngineError> {
        let (value, _) = scan_base_value(
            self.world.as_ref(),
            &self.config.terrain_weights,
            &self.config.sampling,
            chunk,
        );
        let computed = BaseValue::computed(value);
        self.store.set_base_value(chunk, computed).await?;
        tracing::info!(%chunk, value = computed.value, "base value recomputed");
        Ok(computed)
    }

    /// The chunk's neighbor-relative multiplier.
    pub async fn multiplier(&self, chunk: &ChunkKey, chunk_value: f64) -> f64 {
        let neighbors = chunk.cardinal_neighbors();
        let values = join_all(neighbors.iter().map(|n| self.base_value(n))).await;
        let available: Vec<f64> = values
            .into_iter()
            .filter(|v| v.computed)
            .map(|v| v.value)
            .collect();
        let (min, max) = self.config.multiplier.bounds();
        neighbor_multiplier(chunk_value, &available, min, max)
    }

    /// The authoritative unlock cost for (chunk, player).
    ///
    /// Serves from the two-tier cache when possible, otherwise computes,
    /// caches, and returns. Infallible: every internal failure falls back
    /// to a simpler strategy.
    pub async fn final_cost(&self, chunk: &ChunkKey, player: PlayerId) -> PaymentRequirement {
        if let Some(entry) = self
            .cache
            .read_through(
                self.store.as_ref(),
                chunk,
                player,
                self.config_hash,
                delta_secs(self.config.cache.memory_ttl_secs),
                delta_secs(self.config.cache.durable_ttl_secs),
            )
            .await
        {
            return entry.requirement;
        }

        let requirement = self.compute_requirement(chunk, player).await;
        self.cache
            .write_through(
                self.store.as_ref(),
                chunk,
                player,
                CachedCostEntry::new(requirement.clone(), self.config_hash),
            )
            .await;
        requirement
    }

    /// Non-blocking lookup for latency-critical callers (UI hover).
    ///
    /// Answers instantly from the memory tier or with the unscaled biome
    /// template, and kicks the real computation off in the background so
    /// the next call is exact.
    pub fn final_cost_sync(&self, chunk: &ChunkKey, player: PlayerId) -> PaymentRequirement {
        if let Some(entry) = self.cache.memory_probe(
            chunk,
            player,
            self.config_hash,
            delta_secs(self.config.cache.memory_ttl_secs),
        ) {
            return entry.requirement;
        }

        let engine = self.clone();
        let warm_chunk = chunk.clone();
        tokio::spawn(async move {
            let _ = engine.final_cost(&warm_chunk, player).await;
        });

        let biome = self.world.biome_at(chunk).unwrap_or_default();
        pricing::default_template(&self.config.pricing, biome)
    }

    /// Compute the cost, but answer with the template if the budget runs
    /// out first. The real computation keeps running and lands in the
    /// cache either way.
    pub async fn final_cost_within(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        budget: Duration,
    ) -> PaymentRequirement {
        let engine = self.clone();
        let exact_chunk = chunk.clone();
        let mut handle =
            tokio::spawn(async move { engine.final_cost(&exact_chunk, player).await });

        match tokio::time::timeout(budget, &mut handle).await {
            Ok(Ok(requirement)) => requirement,
            Ok(Err(error)) => {
                tracing::warn!(%chunk, %error, "cost task failed, serving template");
                self.template_for(chunk)
            }
            Err(_) => {
                tracing::debug!(%chunk, ?budget, "cost budget exceeded, serving template");
                // The detached task finishes and populates the cache.
                self.template_for(chunk)
            }
        }
    }

    /// Warm the cost cache for every locked chunk around the given one.
    ///
    /// Fire-and-forget; call when a player approaches or unlocks a chunk.
    pub fn precalculate_adjacent(&self, chunk: &ChunkKey, player: PlayerId) {
        let engine = self.clone();
        let center = chunk.clone();
        tokio::spawn(async move {
            engine.warm_adjacent(&center, player).await;
        });
    }

    /// The synchronous body of [`Self::precalculate_adjacent`], awaitable
    /// directly by tests and batch jobs.
    pub async fn warm_adjacent(&self, chunk: &ChunkKey, player: PlayerId) {
        for neighbor in chunk.surrounding() {
            match self.store.is_unlocked(&neighbor).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(chunk = %neighbor, %error, "lock check failed during warmup");
                    continue;
                }
            }
            let _ = self.final_cost(&neighbor, player).await;
        }
    }

    /// Drop the cached resource scan for the player's group. Call when
    /// the group's territory changes.
    pub fn invalidate_resource_cache(&self, player: PlayerId) {
        self.scanner.invalidate(self.teams.group_of(player));
    }

    /// Delete durable cost rows past the configured retention age.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the deletion fails.
    pub async fn purge_durable_costs(&self) -> Result<u64, EngineError> {
        let age = delta_secs(self.config.cache.purge_age_hours.saturating_mul(3600));
        self.cache.purge_durable(self.store.as_ref(), age).await
    }

    /// Run the configured strategy with its fallback chain.
    async fn compute_requirement(&self, chunk: &ChunkKey, player: PlayerId) -> PaymentRequirement {
        let evaluation = self.evaluate(chunk).await;
        let group = self.teams.group_of(player);
        let unlocked_count = match self.store.unlocked_count(group).await {
            Ok(count) => count,
            Err(error) => {
                tracing::warn!(%group, %error, "unlocked count unavailable, assuming zero");
                0
            }
        };
        let context = PricingContext {
            evaluation,
            unlocked_count,
            team_multiplier: self.teams.cost_multiplier(group),
        };
        let pricing = &self.config.pricing;

        let requirement = match pricing.economy {
            EconomyKind::TraditionalMaterial => pricing::traditional_material(pricing, &context),
            EconomyKind::TraditionalCurrency => pricing::traditional_currency(pricing, &context),
            EconomyKind::ResourceMaterial => {
                match self.territory_scan(group).await {
                    Some(scan) => pricing::resource_material(pricing, &context, &scan)
                        .unwrap_or_else(|| pricing::traditional_material(pricing, &context)),
                    None => pricing::traditional_material(pricing, &context),
                }
            }
            EconomyKind::AiMaterial => {
                match self.oracle_suggestion(chunk, player, &context).await {
                    Some(suggestion) => pricing::ai_material(
                        pricing,
                        &suggestion,
                        self.config.ai.show_reasoning,
                    ),
                    None => pricing::traditional_material(pricing, &context),
                }
            }
            EconomyKind::AiCurrency => {
                match self.oracle_suggestion(chunk, player, &context).await {
                    Some(suggestion) => pricing::ai_currency(pricing, &context, &suggestion),
                    None => pricing::traditional_currency(pricing, &context),
                }
            }
        };

        tracing::debug!(
            %chunk,
            %player,
            economy = pricing.economy.as_key(),
            %requirement,
            "cost computed"
        );
        requirement
    }

    async fn territory_scan(&self, group: GroupId) -> Option<crate::resources::ResourceScanOutcome> {
        match self
            .scanner
            .scan(
                self.store.as_ref(),
                self.world.as_ref(),
                &self.config.resources,
                &self.config.sampling,
                group,
            )
            .await
        {
            Ok(scan) => Some(scan),
            Err(error) => {
                tracing::warn!(%group, %error, "resource scan failed, falling back");
                None
            }
        }
    }

    /// Ask the oracle, bounded by the configured timeout. `None` means
    /// "take the traditional fallback" for any reason: disabled, timeout,
    /// transport failure, unparseable answer.
    async fn oracle_suggestion(
        &self,
        chunk: &ChunkKey,
        player: PlayerId,
        context: &PricingContext,
    ) -> Option<CostSuggestion> {
        if !self.config.ai.enabled {
            return None;
        }
        let request = SuggestionRequest {
            player,
            chunk: chunk.clone(),
            biome: context.evaluation.biome,
            score: context.evaluation.score,
            difficulty: context.evaluation.difficulty,
            unlocked_count: context.unlocked_count,
        };
        let budget = Duration::from_millis(self.config.ai.timeout_ms);
        match tokio::time::timeout(budget, self.oracle.suggest(&request)).await {
            Ok(Ok(suggestion)) => Some(suggestion),
            Ok(Err(error)) => {
                tracing::warn!(%chunk, %error, "oracle suggestion failed, falling back");
                None
            }
            Err(_) => {
                tracing::warn!(%chunk, ?budget, "oracle suggestion timed out, falling back");
                None
            }
        }
    }

    fn template_for(&self, chunk: &ChunkKey) -> PaymentRequirement {
        let biome = self.world.biome_at(chunk).unwrap_or_default();
        pricing::default_template(&self.config.pricing, biome)
    }
}

/// Whole seconds to a `TimeDelta`, saturating on absurd configs.
fn delta_secs(secs: u64) -> TimeDelta {
    TimeDelta::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}
