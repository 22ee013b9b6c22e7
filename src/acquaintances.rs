//! Two-hop aggregation over a frozen [`FriendGraph`].
//!
//! The acquaintances of `v` are
//! `(⋃ friends(w) for w in friends(v)) \ ({v} ∪ friends(v))`.
//! Each candidate is visited once per shared friend and deduplicated in a
//! set, so the cost follows the size of the two-hop neighbourhood rather than
//! the square of any one degree, and no pair of co-friends is ever enumerated.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinError;

use crate::friends::FriendGraph;
use crate::persons::Person;

/// Map from a Person to the number of their acquaintances
pub type AcquaintanceCounts = HashMap<Person, usize>;

/// the acquaintances of one person, ascending
pub fn acquaintances_of(graph: &FriendGraph, person: &Person) -> BTreeSet<Person> {
    let mut reach = HashSet::new();
    collect_two_hop(graph, person, &mut reach);
    reach.into_iter().collect()
}

/// count acquaintances for every person on the current thread
pub fn count_acquaintances(graph: &FriendGraph) -> AcquaintanceCounts {
    let mut reach = HashSet::new();
    graph
        .persons()
        .map(|person| (*person, collect_two_hop(graph, person, &mut reach)))
        .collect()
}

/// Count acquaintances for every person, spreading persons over `workers`
/// blocking tasks. The graph is never written, so workers share it without
/// synchronisation.
pub async fn count_acquaintances_parallel(
    graph: Arc<FriendGraph>,
    workers: usize,
) -> Result<AcquaintanceCounts, JoinError> {
    let workers = workers.max(1);
    let persons: Arc<Vec<Person>> = Arc::new(graph.persons().copied().collect());

    let mut join_handles = Vec::with_capacity(workers);
    for worker_id in 0..workers.min(persons.len()) {
        let graph = graph.clone();
        let persons = persons.clone();
        // interleaved rather than contiguous slices to spread hubs out
        let join_handle = tokio::task::spawn_blocking(move || {
            let mut reach = HashSet::new();
            persons
                .iter()
                .skip(worker_id)
                .step_by(workers)
                .map(|person| (*person, collect_two_hop(&graph, person, &mut reach)))
                .collect::<Vec<_>>()
        });
        join_handles.push(join_handle);
    }

    let mut counts = AcquaintanceCounts::with_capacity(persons.len());
    for join_handle in join_handles {
        counts.extend(join_handle.await?);
    }
    tracing::debug!("counted acquaintances of {} persons", counts.len());
    Ok(counts)
}

/// fill `reach` with the acquaintances of `person` and return how many there are
fn collect_two_hop(graph: &FriendGraph, person: &Person, reach: &mut HashSet<Person>) -> usize {
    reach.clear();
    let Some(friends) = graph.friends(person) else {
        return 0;
    };
    for friend in friends {
        let Some(theirs) = graph.friends(friend) else {
            continue;
        };
        reach.extend(
            theirs
                .iter()
                .filter(|candidate| *candidate != person && !friends.contains(*candidate)),
        );
    }
    reach.len()
}
