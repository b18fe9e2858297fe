//! The five pricing strategies.
//!
//! Every function here is total and synchronous: the orchestrator gathers
//! the async inputs (evaluation, progression, scan results, oracle
//! suggestions) into a [`PricingContext`] and these functions turn it
//! into a [`PaymentRequirement`]. Fallback chains live in the
//! orchestrator; a strategy function never fails, it at most declines
//! (`resource_material` returning `None`).
//!
//! The neighbor-relative multiplier is already folded into the
//! evaluation score by the time pricing runs, so these formulas read it
//! only through `score` and the difficulty band.

use terraclaim_oracle::CostSuggestion;
use terraclaim_types::{Biome, ChunkEvaluation, MaterialCost, PaymentRequirement};

use crate::config::PricingConfig;
use crate::resources::ResourceScanOutcome;

/// Everything a pricing strategy needs to know, gathered asynchronously
/// by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingContext {
    /// The chunk's evaluation (score, difficulty, biome), neighbor
    /// adjustment included.
    pub evaluation: ChunkEvaluation,
    /// How many chunks the player's group has unlocked.
    pub unlocked_count: u64,
    /// The group's cost multiplier (1.0 when neutral or disabled).
    pub team_multiplier: f64,
}

impl PricingContext {
    /// Progression factor: each unlocked chunk adds 10%.
    pub fn progression_multiplier(&self) -> f64 {
        1.0 + to_f64(self.unlocked_count) / 10.0
    }
}

/// Biome-keyed material template pricing.
///
/// Amounts scale with progression and terrain score:
/// `1 + unlocked/10 + score/50`, times the team factor when the team
/// economy is active.
pub fn traditional_material(
    config: &PricingConfig,
    context: &PricingContext,
) -> PaymentRequirement {
    let scale = (1.0 + to_f64(context.unlocked_count) / 10.0 + context.evaluation.score / 50.0)
        * team_factor(config, context);
    let items = template_items(config, context.evaluation.biome)
        .into_iter()
        .map(|line| MaterialCost::new(line.material, scale_amount(config, line.amount, scale)))
        .collect();
    PaymentRequirement::Materials {
        items,
        reasoning: None,
    }
}

/// Flat currency formula: base plus a per-unlock surcharge, scaled by
/// the difficulty, biome, and team multipliers, floored at 1.0.
pub fn traditional_currency(
    config: &PricingConfig,
    context: &PricingContext,
) -> PaymentRequirement {
    let base = config.base_cost + to_f64(context.unlocked_count) * config.per_unlock_cost;
    let amount = base
        * config.difficulty_multiplier(context.evaluation.difficulty.as_key())
        * config.biome_multiplier(context.evaluation.biome.as_key())
        * team_factor(config, context);
    PaymentRequirement::currency(sanitize(amount).max(1.0))
}

/// Price in the best material the group's own territory yields:
/// `ceil(base_amount * tier_discount * progression)`, clamped to the
/// stack bounds and capped at a quarter of the scanned availability.
/// The cap is applied last and never exceeded.
///
/// Returns `None` when the scan found nothing payable, or when the
/// availability cap falls below the minimum chargeable amount -- asking
/// for more than the territory supports is worse than the traditional
/// fallback the orchestrator takes instead.
pub fn resource_material(
    config: &PricingConfig,
    context: &PricingContext,
    scan: &ResourceScanOutcome,
) -> Option<PaymentRequirement> {
    let best = scan.best()?;
    let available_cap = best.count / 4;
    if available_cap < u64::from(config.min_material_amount) {
        return None;
    }

    let factor = best.tier.cost_multiplier() * context.progression_multiplier();
    let amount = scale_amount(config, config.base_material_amount, factor);
    let amount = u64::from(amount)
        .min(available_cap)
        .try_into()
        .unwrap_or(u32::MAX);

    Some(PaymentRequirement::material(best.material.drop_item(), amount))
}

/// Price with an oracle suggestion, clamped to the configured bounds.
pub fn ai_material(
    config: &PricingConfig,
    suggestion: &CostSuggestion,
    show_reasoning: bool,
) -> PaymentRequirement {
    let amount = suggestion
        .amount
        .max(config.min_material_amount)
        .min(config.max_material_amount.max(config.min_material_amount));
    let reasoning = if show_reasoning {
        suggestion.reasoning.clone()
    } else {
        None
    };
    PaymentRequirement::Materials {
        items: vec![MaterialCost::new(suggestion.material, amount)],
        reasoning,
    }
}

/// Convert an oracle material suggestion into a currency amount.
///
/// The traditional-currency multiplier chain applies at dampened
/// exponents (0.7 for difficulty and biome, 0.5 for progression): the
/// suggestion already encodes difficulty context, so repeating the full
/// factors would double-charge. Floor raised to 10.0.
pub fn ai_currency(
    config: &PricingConfig,
    context: &PricingContext,
    suggestion: &CostSuggestion,
) -> PaymentRequirement {
    let base = f64::from(suggestion.amount) * config.currency_rate(suggestion.material);
    let amount = base
        * config
            .difficulty_multiplier(context.evaluation.difficulty.as_key())
            .powf(0.7)
        * config
            .biome_multiplier(context.evaluation.biome.as_key())
            .powf(0.7)
        * context.progression_multiplier().powf(0.5)
        * team_factor(config, context);
    PaymentRequirement::currency(sanitize(amount).max(10.0))
}

/// The unscaled biome template, used as the instant answer while the
/// real computation runs in the background.
pub fn default_template(config: &PricingConfig, biome: Biome) -> PaymentRequirement {
    PaymentRequirement::Materials {
        items: template_items(config, biome),
        reasoning: None,
    }
}

fn template_items(config: &PricingConfig, biome: Biome) -> Vec<MaterialCost> {
    config.biome_materials.get(biome.as_key()).map_or_else(
        || {
            vec![MaterialCost::new(
                config.fallback_material,
                config.base_material_amount,
            )]
        },
        Clone::clone,
    )
}

fn team_factor(config: &PricingConfig, context: &PricingContext) -> f64 {
    if config.team_economy {
        sanitize_or(context.team_multiplier, 1.0)
    } else {
        1.0
    }
}

/// Scale a base amount, round up, clamp to the configured stack bounds.
fn scale_amount(config: &PricingConfig, base: u32, factor: f64) -> u32 {
    let scaled = f64::from(base) * sanitize_or(factor, 1.0);
    let max = config.max_material_amount.max(config.min_material_amount);
    ceil_to_u32(scaled)
        .max(config.min_material_amount)
        .min(max)
}

const fn sanitize(value: f64) -> f64 {
    sanitize_or(value, 0.0)
}

const fn sanitize_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ceil_to_u32(value: f64) -> u32 {
    // Caller has sanitized to finite non-negative.
    let ceiled = value.ceil();
    if ceiled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        ceiled as u32
    }
}

/// Widen a progression count; precision loss is irrelevant at game scale.
fn to_f64(count: u64) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use terraclaim_types::{
        ChunkEvaluation, Difficulty, Material, ResourceEntry, ResourceTier, ScanSummary,
    };

    use super::*;

    fn context(score: f64, difficulty: Difficulty, biome: Biome, unlocked: u64) -> PricingContext {
        PricingContext {
            evaluation: ChunkEvaluation::new(score, difficulty, Some(biome)),
            unlocked_count: unlocked,
            team_multiplier: 1.0,
        }
    }

    fn scan_with(material: Material, count: u64, tier: ResourceTier) -> ResourceScanOutcome {
        ResourceScanOutcome {
            entries: vec![ResourceEntry {
                material,
                count,
                tier,
            }],
            summary: ScanSummary::default(),
            chunks_skipped: 0,
        }
    }

    #[test]
    fn currency_formula_matches_hand_calculation() {
        // (100 + 3 * 25) * hard 1.5 = 262.5 on neutral plains.
        let config = PricingConfig::default();
        let ctx = context(120.0, Difficulty::Hard, Biome::Plains, 3);
        let requirement = traditional_currency(&config, &ctx);
        assert_eq!(requirement, PaymentRequirement::currency(262.5));
    }

    #[test]
    fn currency_never_drops_below_one() {
        let config = PricingConfig {
            base_cost: 0.0,
            per_unlock_cost: 0.0,
            ..PricingConfig::default()
        };
        let ctx = context(1.0, Difficulty::Easy, Biome::Plains, 0);
        let requirement = traditional_currency(&config, &ctx);
        assert_eq!(requirement, PaymentRequirement::currency(1.0));
    }

    #[test]
    fn resource_pricing_discounts_by_tier_and_pays_in_drops() {
        // 16 base * tier-4 discount 0.25 * progression 1.2 = 4.8, rounded
        // up to 5, paid in the ore's drop item.
        let config = PricingConfig::default();
        let ctx = context(40.0, Difficulty::Normal, Biome::Plains, 2);
        let scan = scan_with(Material::IronOre, 10_000, ResourceTier::BaseOre);
        let requirement = resource_material(&config, &ctx, &scan);
        assert_eq!(requirement, Some(PaymentRequirement::material(Material::RawIron, 5)));
    }

    #[test]
    fn resource_pricing_caps_at_quarter_of_availability() {
        let config = PricingConfig::default();
        let ctx = context(40.0, Difficulty::Normal, Biome::Plains, 50);
        // Only 8 blocks found: never ask for more than 2.
        let scan = scan_with(Material::Dirt, 8, ResourceTier::Common);
        let requirement = resource_material(&config, &ctx, &scan);
        assert_eq!(requirement, Some(PaymentRequirement::material(Material::Dirt, 2)));
    }

    #[test]
    fn resource_pricing_declines_when_the_cap_is_below_the_minimum() {
        // Only 3 blocks found: a quarter of that is below the minimum
        // chargeable amount. The strategy must decline rather than let
        // the minimum floor breach the availability cap.
        let config = PricingConfig::default();
        let ctx = context(40.0, Difficulty::Normal, Biome::Plains, 0);
        let scan = scan_with(Material::Dirt, 3, ResourceTier::Common);
        assert!(resource_material(&config, &ctx, &scan).is_none());
    }

    #[test]
    fn resource_pricing_declines_on_empty_territory() {
        let config = PricingConfig::default();
        let ctx = context(40.0, Difficulty::Normal, Biome::Plains, 0);
        assert!(resource_material(&config, &ctx, &ResourceScanOutcome::default()).is_none());
    }

    #[test]
    fn material_template_scales_with_progression_and_score() {
        let config = PricingConfig::default();
        let amount_of = |req: &PaymentRequirement| match req {
            PaymentRequirement::Materials { items, .. } => {
                items.first().map_or(0, |line| line.amount)
            }
            PaymentRequirement::Currency { .. } => 0,
        };

        // score 50 alone doubles the base amount: 1 + 0 + 50/50 = 2.
        let fresh = traditional_material(&config, &context(50.0, Difficulty::Normal, Biome::Forest, 0));
        assert_eq!(amount_of(&fresh), 32);

        // Five unlocks add another 50%: 1 + 0.5 + 1 = 2.5 -> 40.
        let veteran =
            traditional_material(&config, &context(50.0, Difficulty::Normal, Biome::Forest, 5));
        assert_eq!(amount_of(&veteran), 40);
    }

    #[test]
    fn material_amounts_respect_stack_bounds() {
        let config = PricingConfig::default();
        let ctx = context(5_000.0, Difficulty::Impossible, Biome::Mushroom, 500);
        let requirement = traditional_material(&config, &ctx);
        let PaymentRequirement::Materials { items, .. } = requirement else {
            return;
        };
        assert!(items.iter().all(|line| line.amount <= 64));
        assert!(items.iter().all(|line| line.amount >= 1));
    }

    #[test]
    fn ai_material_clamps_and_gates_reasoning() {
        let config = PricingConfig::default();
        let suggestion = CostSuggestion {
            material: Material::Diamond,
            amount: 999,
            reasoning: Some("rich terrain".to_owned()),
            ai_processed: true,
        };
        let hidden = ai_material(&config, &suggestion, false);
        let PaymentRequirement::Materials { items, reasoning } = hidden else {
            return;
        };
        assert_eq!(items.first().map(|l| l.amount), Some(64));
        assert!(reasoning.is_none());

        let shown = ai_material(&config, &suggestion, true);
        let PaymentRequirement::Materials { reasoning, .. } = shown else {
            return;
        };
        assert_eq!(reasoning.as_deref(), Some("rich terrain"));
    }

    #[test]
    fn ai_currency_uses_conversion_rates_with_floor() {
        let config = PricingConfig::default();
        let ctx = context(40.0, Difficulty::Normal, Biome::Plains, 0);
        let cheap = CostSuggestion {
            material: Material::Dirt,
            amount: 1,
            reasoning: None,
            ai_processed: true,
        };
        // 1 dirt at 0.1 currency would be 0.1; the floor lifts it to 10.
        assert_eq!(ai_currency(&config, &ctx, &cheap), PaymentRequirement::currency(10.0));

        let rich = CostSuggestion {
            material: Material::Diamond,
            amount: 4,
            reasoning: None,
            ai_processed: true,
        };
        let PaymentRequirement::Currency { amount } = ai_currency(&config, &ctx, &rich) else {
            return;
        };
        assert!((amount - 400.0).abs() < 1e-9);
    }

    #[test]
    fn ai_currency_dampens_the_multiplier_chain() {
        let config = PricingConfig::default();
        let ctx = context(200.0, Difficulty::Hard, Biome::Plains, 0);
        let suggestion = CostSuggestion {
            material: Material::Diamond,
            amount: 1,
            reasoning: None,
            ai_processed: true,
        };
        let PaymentRequirement::Currency { amount } = ai_currency(&config, &ctx, &suggestion)
        else {
            return;
        };
        // 100 * 1.5^0.7, strictly less than the undamped 150.
        assert!((amount - 100.0 * 1.5_f64.powf(0.7)).abs() < 1e-9);
        assert!(amount < 150.0);
    }

    #[test]
    fn team_factor_only_applies_when_enabled() {
        let mut config = PricingConfig::default();
        let mut ctx = context(40.0, Difficulty::Normal, Biome::Plains, 0);
        ctx.team_multiplier = 0.5;

        let off = traditional_currency(&config, &ctx);
        config.team_economy = true;
        let on = traditional_currency(&config, &ctx);
        assert_eq!(off, PaymentRequirement::currency(100.0));
        assert_eq!(on, PaymentRequirement::currency(50.0));
    }

    #[test]
    fn default_template_falls_back_to_the_legacy_material() {
        let config = PricingConfig::default();
        // Mushroom has no template by default.
        let requirement = default_template(&config, Biome::Mushroom);
        assert_eq!(requirement, PaymentRequirement::material(Material::Coal, 16));
        // Forest does.
        let forest = default_template(&config, Biome::Forest);
        assert_eq!(forest, PaymentRequirement::material(Material::OakLog, 16));
    }
}
