//! Chunked multi-threaded search.
//!
//! Splits the seed flights into contiguous chunks and searches each chunk
//! independently on the rayon pool. Every chunk gets its own stack and
//! its own full iteration budget. Results are merged in chunk order, so a
//! tie keeps the plan from the earliest chunk and the merged result does
//! not depend on thread scheduling.

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::Flight;

use super::config::SearchConfig;
use super::events::Discard;
use super::rank::rank_plans;
use super::search::{Planner, SearchError, SearchOutcome, Termination};

/// Search `flights` with the seeds split into `chunks` parts.
///
/// Progress and improvements are not streamed; per-chunk results are
/// logged and the merged outcome returned. Termination is `Cancelled` if
/// any chunk saw cancellation, else `BudgetReached` if any chunk ran out
/// of budget, else `Exhausted`.
pub fn search_chunked(
    flights: Vec<Flight>,
    config: &SearchConfig,
    chunks: usize,
    cancel: &CancellationToken,
) -> Result<SearchOutcome, SearchError> {
    let planner = Planner::new(config);
    let Some(prepared) = planner.prepare(flights, &mut Discard)? else {
        return Ok(SearchOutcome::empty(Termination::BudgetReached));
    };

    let chunk_size = prepared.seeds.len().div_ceil(chunks.max(1));
    debug!(
        seeds = prepared.seeds.len(),
        chunk_size, "Splitting search into chunks"
    );

    let outcomes: Vec<SearchOutcome> = prepared
        .seeds
        .par_chunks(chunk_size)
        .enumerate()
        .map(|(index, seeds)| {
            let outcome = planner.run(&prepared.graph, prepared.hub, seeds, cancel, &mut Discard);
            info!(
                chunk = index,
                seeds = seeds.len(),
                iterations = outcome.iterations,
                termination = ?outcome.termination,
                found = outcome.best.is_some(),
                "Chunk finished"
            );
            outcome
        })
        .collect();

    Ok(merge(outcomes, config.dest_cap))
}

/// Combine per-chunk outcomes, given in chunk order.
fn merge(outcomes: Vec<SearchOutcome>, dest_cap: usize) -> SearchOutcome {
    let iterations = outcomes.iter().map(|o| o.iterations).sum();

    let termination = if outcomes
        .iter()
        .any(|o| o.termination == Termination::Cancelled)
    {
        Termination::Cancelled
    } else if outcomes
        .iter()
        .any(|o| o.termination == Termination::BudgetReached)
    {
        Termination::BudgetReached
    } else {
        Termination::Exhausted
    };

    let candidates = outcomes.into_iter().filter_map(|o| o.best).collect();
    let best = rank_plans(candidates, dest_cap).into_iter().next();

    SearchOutcome {
        best,
        iterations,
        termination,
    }
}
