//! Itinerary ranking.
//!
//! Plans are compared on a fixed preference order:
//! 1. More distinct destinations, counted up to the destination cap
//! 2. Fewer calendar days
//! 3. Fewer flights plus overnight layovers
//! 4. Shorter effective duration
//!
//! Nothing breaks ties beyond that; whichever plan was found first keeps
//! its place.

use std::cmp::{Ordering, Reverse};

use chrono::Duration;

use crate::domain::Itinerary;

/// Ranking key for a plan. Smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlanScore {
    /// Distinct destinations, saturated at the cap (reversed: more is better).
    pub destinations: Reverse<usize>,
    /// Distinct calendar days.
    pub days: usize,
    /// Flights plus overnight layovers.
    pub complexity: usize,
    /// Effective duration.
    pub effective: Duration,
}

impl PlanScore {
    /// Score a plan under the given destination cap.
    pub fn of(plan: &Itinerary, dest_cap: usize) -> Self {
        Self {
            destinations: Reverse(plan.destination_count().min(dest_cap)),
            days: plan.total_days(),
            complexity: plan.segment_count() + plan.overnights(),
            effective: plan.effective_duration(),
        }
    }
}

/// Compare two plans; `Ordering::Less` means `a` is preferred.
pub fn compare_plans(a: &Itinerary, b: &Itinerary, dest_cap: usize) -> Ordering {
    PlanScore::of(a, dest_cap).cmp(&PlanScore::of(b, dest_cap))
}

/// True if `candidate` should replace `incumbent`.
///
/// Strict: a candidate that only ties the incumbent does not replace it.
pub fn is_better(incumbent: &Itinerary, candidate: &Itinerary, dest_cap: usize) -> bool {
    compare_plans(candidate, incumbent, dest_cap) == Ordering::Less
}

/// Sort plans best-first.
///
/// The sort is stable, so among equally ranked plans the earlier one in
/// the input stays first.
pub fn rank_plans(mut plans: Vec<Itinerary>, dest_cap: usize) -> Vec<Itinerary> {
    plans.sort_by_cached_key(|plan| PlanScore::of(plan, dest_cap));
    plans
}
