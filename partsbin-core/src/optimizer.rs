//! Purchase optimizer - cheapest set of products that fills a gap
//!
//! A greedy weighted set-cover heuristic:
//!
//! 1. Score every product that supplies at least one missing part
//!    (`coverage * |provides| + tier weight - average price / divisor`).
//! 2. Rank by score, then coverage, then price.
//! 3. Walk the ranking, taking any product that adds an uncovered part;
//!    stop once the gap is covered.
//! 4. Drop selections made redundant by later picks, most expensive first.
//!
//! The same steps run again over the budget, premium and max-coverage pools
//! to produce labelled alternatives. Results are not guaranteed to be the
//! cheapest possible cover.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::analysis::{GapReport, PartRef, SlotSets};
use crate::catalog::Catalog;
use crate::model::{Product, Tier};

/// Weight per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub s_plus: f64,
    pub s: f64,
    pub a: f64,
    pub b: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            s_plus: 1000.0,
            s: 800.0,
            a: 600.0,
            b: 400.0,
        }
    }
}

impl TierWeights {
    pub fn weight(&self, tier: Tier) -> f64 {
        match tier {
            Tier::SPlus => self.s_plus,
            Tier::S => self.s,
            Tier::A => self.a,
            Tier::B => self.b,
        }
    }
}

/// Scoring policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerWeights {
    /// Points per missing part a product supplies
    pub coverage: f64,
    /// Average price is divided by this before being subtracted; 0 disables the price term
    pub price_divisor: f64,
    pub tiers: TierWeights,
}

impl Default for OptimizerWeights {
    fn default() -> Self {
        Self {
            coverage: 100.0,
            price_divisor: 10.0,
            tiers: TierWeights::default(),
        }
    }
}

impl OptimizerWeights {
    pub fn utility(&self, provides: usize, tier: Tier, price_average: f64) -> f64 {
        let price_penalty = if self.price_divisor == 0.0 {
            0.0
        } else {
            price_average / self.price_divisor
        };
        self.coverage * provides as f64 + self.tiers.weight(tier) - price_penalty
    }
}

/// A product annotated with the missing parts it supplies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub product: Product,
    pub provides: Vec<PartRef>,
    pub utility_score: f64,
    pub price_average: f64,
}

/// Candidate pool and ranking used for one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Every candidate, ranked by utility
    Optimal,
    /// Tiers A and B only
    Budget,
    /// Tiers S+ and S only
    Premium,
    /// Candidates supplying two or more parts, ranked by coverage first
    MaxCoverage,
}

impl SelectionPolicy {
    pub const ALTERNATIVES: [SelectionPolicy; 3] = [
        SelectionPolicy::Budget,
        SelectionPolicy::Premium,
        SelectionPolicy::MaxCoverage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SelectionPolicy::Optimal => "Optimal",
            SelectionPolicy::Budget => "Budget (A/B tiers)",
            SelectionPolicy::Premium => "Premium (S+/S tiers)",
            SelectionPolicy::MaxCoverage => "Max coverage",
        }
    }

    fn admits(&self, candidate: &Candidate) -> bool {
        match self {
            SelectionPolicy::Optimal => true,
            SelectionPolicy::Budget => matches!(candidate.product.tier(), Tier::A | Tier::B),
            SelectionPolicy::Premium => matches!(candidate.product.tier(), Tier::SPlus | Tier::S),
            SelectionPolicy::MaxCoverage => candidate.provides.len() >= 2,
        }
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        let by_utility = || b.utility_score.total_cmp(&a.utility_score);
        let by_coverage = || b.provides.len().cmp(&a.provides.len());
        let by_price = || a.price_average.total_cmp(&b.price_average);

        match self {
            SelectionPolicy::MaxCoverage => by_coverage()
                .then_with(by_utility)
                .then_with(by_price),
            _ => by_utility().then_with(by_coverage).then_with(by_price),
        }
    }
}

/// Products chosen under one policy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub policy: SelectionPolicy,
    pub label: &'static str,
    pub products: Vec<Candidate>,
    /// Sum of average prices
    pub total_cost: f64,
    pub covered: SlotSets,
}

/// How the optimal solution relates to the gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurchaseStatus {
    /// Nothing is missing; no purchase needed
    GapClosed,
    /// Parts are missing but no available product supplies any of them
    NoCoverageAvailable,
    /// Some missing parts cannot be supplied; see `uncoverable`
    PartiallyCovered,
    FullyCovered,
}

/// Saving of the optimal solution against the most expensive alternative
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Savings {
    pub amount: f64,
    /// 0..=100
    pub percentage: u8,
}

/// Full optimizer output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub needs_purchase: bool,
    pub status: PurchaseStatus,
    pub analysis: GapReport,
    pub optimal_solution: Vec<Candidate>,
    pub total_cost: f64,
    /// Missing parts no available product supplies
    pub uncoverable: SlotSets,
    pub alternatives: Vec<Selection>,
    pub savings: Savings,
}

/// Recommends products to buy for a gap
#[derive(Debug, Clone, Default)]
pub struct PurchaseOptimizer {
    weights: OptimizerWeights,
}

impl PurchaseOptimizer {
    pub fn new(weights: OptimizerWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &OptimizerWeights {
        &self.weights
    }

    /// Optimize against the catalog's purchasable products
    pub fn optimize(&self, analysis: &GapReport, catalog: &Catalog) -> OptimizationResult {
        self.optimize_products(analysis, catalog.products())
    }

    /// Optimize against an explicit product list. Discontinued products are ignored.
    pub fn optimize_products(&self, analysis: &GapReport, products: &[Product]) -> OptimizationResult {
        if analysis.missing.is_empty() {
            debug!("Gap already closed; no purchase needed");
            return OptimizationResult {
                needs_purchase: false,
                status: PurchaseStatus::GapClosed,
                analysis: analysis.clone(),
                optimal_solution: Vec::new(),
                total_cost: 0.0,
                uncoverable: SlotSets::default(),
                alternatives: Vec::new(),
                savings: Savings::default(),
            };
        }

        let candidates = self.score_candidates(&analysis.missing, products);
        debug!(
            "Scored {} candidates for {} missing parts",
            candidates.len(),
            analysis.missing_count
        );

        if candidates.is_empty() {
            info!(
                "No available product covers any of the {} missing parts",
                analysis.missing_count
            );
            return OptimizationResult {
                needs_purchase: true,
                status: PurchaseStatus::NoCoverageAvailable,
                analysis: analysis.clone(),
                optimal_solution: Vec::new(),
                total_cost: 0.0,
                uncoverable: analysis.missing.clone(),
                alternatives: Vec::new(),
                savings: Savings::default(),
            };
        }

        let optimal = select(&candidates, SelectionPolicy::Optimal, &analysis.missing);
        let uncoverable = analysis.missing.difference(&optimal.covered);

        let alternatives: Vec<Selection> = SelectionPolicy::ALTERNATIVES
            .into_iter()
            .map(|policy| select(&candidates, policy, &analysis.missing))
            .filter(|selection| !selection.products.is_empty())
            .collect();

        let savings = savings(optimal.total_cost, &alternatives);

        let status = if uncoverable.is_empty() {
            PurchaseStatus::FullyCovered
        } else {
            PurchaseStatus::PartiallyCovered
        };

        info!(
            "Recommending {} products (cost {:.0}); {} alternatives; {} parts uncoverable",
            optimal.products.len(),
            optimal.total_cost,
            alternatives.len(),
            uncoverable.len()
        );

        OptimizationResult {
            needs_purchase: true,
            status,
            analysis: analysis.clone(),
            optimal_solution: optimal.products,
            total_cost: optimal.total_cost,
            uncoverable,
            alternatives,
            savings,
        }
    }

    /// Annotate each product with the missing parts it supplies and its
    /// utility. Products supplying nothing are dropped.
    pub fn score_candidates(&self, missing: &SlotSets, products: &[Product]) -> Vec<Candidate> {
        products
            .iter()
            .filter(|product| !product.is_discontinued())
            .filter_map(|product| {
                let provides: Vec<PartRef> = product
                    .parts()
                    .iter()
                    .filter(|(slot, part)| missing.contains(*slot, &part.name))
                    .map(|(slot, part)| PartRef::new(slot, part.name.clone()))
                    .collect();

                if provides.is_empty() {
                    return None;
                }

                let price_average = product.price().average();
                let utility_score =
                    self.weights
                        .utility(provides.len(), product.tier(), price_average);

                Some(Candidate {
                    product: product.clone(),
                    provides,
                    utility_score,
                    price_average,
                })
            })
            .collect()
    }
}

/// Rank candidates for a policy. Stable: equal keys keep input order.
pub fn rank(candidates: &mut [Candidate], policy: SelectionPolicy) {
    candidates.sort_by(|a, b| policy.compare(a, b));
}

/// Greedy cover over an already ranked list, followed by redundancy pruning
pub fn greedy_cover(ranked: &[Candidate], missing: &SlotSets) -> Vec<Candidate> {
    let target = missing.len();
    let mut covered = SlotSets::default();
    let mut selected: Vec<Candidate> = Vec::new();

    for candidate in ranked {
        if covered.len() >= target {
            break;
        }

        let adds_new = candidate
            .provides
            .iter()
            .any(|part| !covered.contains(part.slot, &part.name));
        if !adds_new {
            continue;
        }

        for part in &candidate.provides {
            covered.insert(part.slot, &part.name);
        }
        selected.push(candidate.clone());
    }

    prune_redundant(selected)
}

/// Drop selections whose every part is also supplied by the remaining
/// selections, checking the most expensive first
fn prune_redundant(selected: Vec<Candidate>) -> Vec<Candidate> {
    let mut keep = vec![true; selected.len()];

    let mut order: Vec<usize> = (0..selected.len()).collect();
    order.sort_by(|&a, &b| {
        selected[b]
            .price_average
            .total_cmp(&selected[a].price_average)
            .then_with(|| b.cmp(&a))
    });

    for index in order {
        let redundant = selected[index].provides.iter().all(|part| {
            selected
                .iter()
                .enumerate()
                .any(|(other, c)| other != index && keep[other] && c.provides.contains(part))
        });

        if redundant {
            debug!(
                "Pruning redundant selection {}",
                selected[index].product.id()
            );
            keep[index] = false;
        }
    }

    selected
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect()
}

fn select(candidates: &[Candidate], policy: SelectionPolicy, missing: &SlotSets) -> Selection {
    let mut pool: Vec<Candidate> = candidates
        .iter()
        .filter(|c| policy.admits(c))
        .cloned()
        .collect();
    rank(&mut pool, policy);

    let products = greedy_cover(&pool, missing);
    let total_cost = products.iter().map(|c| c.price_average).sum();
    let covered = products
        .iter()
        .flat_map(|c| c.provides.iter().cloned())
        .collect();

    debug!(
        "{:?}: pool {} -> {} selected",
        policy,
        pool.len(),
        products.len()
    );

    Selection {
        policy,
        label: policy.label(),
        products,
        total_cost,
        covered,
    }
}

fn savings(optimal_cost: f64, alternatives: &[Selection]) -> Savings {
    let max_cost = alternatives
        .iter()
        .map(|s| s.total_cost)
        .fold(optimal_cost, f64::max);

    let amount = (max_cost - optimal_cost).max(0.0);
    let percentage = if max_cost <= 0.0 {
        0
    } else {
        (100.0 * amount / max_cost).round().clamp(0.0, 100.0) as u8
    };

    Savings { amount, percentage }
}
