//! Urgency-first collection ordering

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::types::{PriorityTier, RouteCandidate, RouteMethod, RouteResult};

/// Internal failure modes; never returned to callers.
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("Route distance is not finite ({0})")]
    NonFiniteDistance(f64),

    #[error("Efficiency score is not finite ({0})")]
    NonFiniteScore(f64),
}

/// Orders collection points so the most urgent, fullest bins come first.
///
/// This is a greedy priority sort, not a shortest-tour solver: the order is
/// chosen for collection risk, and the reported distance is simply the length
/// of that order. Replacing it with a distance-minimizing solver would change
/// the observable visit order.
#[derive(Debug, Clone, Default)]
pub struct RouteOptimizer {
    config: RoutingConfig,
}

impl RouteOptimizer {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Numeric weight of a priority tier.
    pub fn priority_weight(&self, tier: PriorityTier) -> f64 {
        match tier {
            PriorityTier::Urgent => self.config.weight_urgent,
            PriorityTier::High => self.config.weight_high,
            PriorityTier::Normal => self.config.weight_normal,
            PriorityTier::Low => self.config.weight_low,
        }
    }

    /// Main entry point. Never fails: on error the input order is returned
    /// with zero distance and a neutral efficiency.
    pub fn optimize(&self, candidates: &[RouteCandidate]) -> RouteResult {
        if candidates.len() < 2 {
            return RouteResult::unchanged(candidates, 1.0, RouteMethod::Trivial);
        }

        match self.try_optimize(candidates) {
            Ok(result) => {
                debug!(
                    stops = result.order.len(),
                    distance_km = result.total_distance_km,
                    efficiency = result.efficiency_score,
                    "Route optimized"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, stops = candidates.len(), "Route optimization failed, returning input order");
                RouteResult::unchanged(candidates, self.config.degraded_efficiency, RouteMethod::Degraded)
            }
        }
    }

    fn try_optimize(&self, candidates: &[RouteCandidate]) -> Result<RouteResult, RoutingError> {
        let ordered = self.order(candidates);

        let total_distance_km = route_distance_km(&ordered);
        if !total_distance_km.is_finite() {
            return Err(RoutingError::NonFiniteDistance(total_distance_km));
        }

        let efficiency_score = self.efficiency(&ordered);
        if !efficiency_score.is_finite() {
            return Err(RoutingError::NonFiniteScore(efficiency_score));
        }

        let minutes = total_distance_km * self.config.minutes_per_km;
        Ok(RouteResult {
            order: ordered.iter().map(|c| c.id.clone()).collect(),
            total_distance_km,
            efficiency_score,
            // Truncated whole minutes
            estimated_duration_minutes: minutes.max(0.0) as u64,
            method: RouteMethod::PriorityBased,
        })
    }

    /// Stable sort by `(priority weight, fill ratio)` descending; ties keep input order.
    fn order<'a>(&self, candidates: &'a [RouteCandidate]) -> Vec<&'a RouteCandidate> {
        let mut ordered: Vec<&RouteCandidate> = candidates.iter().collect();
        ordered.sort_by(|a, b| {
            self.priority_weight(b.priority)
                .total_cmp(&self.priority_weight(a.priority))
                .then_with(|| b.fill_ratio.total_cmp(&a.fill_ratio))
        });
        ordered
    }

    /// `priority_share * mean(weight) + fill_share * mean(fill)`, bounded to [0, 1].
    fn efficiency(&self, route: &[&RouteCandidate]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let n = route.len() as f64;
        let mean_weight = route.iter().map(|c| self.priority_weight(c.priority)).sum::<f64>() / n;
        let mean_fill = route.iter().map(|c| c.fill_ratio).sum::<f64>() / n;

        let score = self.config.priority_share * mean_weight + self.config.fill_share * mean_fill;
        if score.is_nan() {
            score
        } else {
            score.clamp(0.0, 1.0)
        }
    }
}

/// Sum of consecutive great-circle legs; no return-to-origin leg.
fn route_distance_km(route: &[&RouteCandidate]) -> f64 {
    route
        .windows(2)
        .map(|leg| leg[0].coordinate().distance_km(&leg[1].coordinate()))
        .sum()
}
