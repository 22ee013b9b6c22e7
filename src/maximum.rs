use crate::acquaintances::AcquaintanceCounts;
use crate::persons::Person;

/// the highest acquaintance count and every person reaching it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaxResult {
    pub count: usize,
    /// ascending by identifier
    pub persons: Vec<Person>,
}

/// Reduce per-person counts to the maximum and all its holders.
///
/// Ties are all kept. A maximum of zero means nobody has an acquaintance,
/// which reduces to `(0, [])` just like an empty graph.
pub fn max_acquaintances(counts: &AcquaintanceCounts) -> MaxResult {
    let mut best = MaxResult::default();
    for (person, &count) in counts {
        if count == 0 || count < best.count {
            continue;
        }
        if count > best.count {
            best.count = count;
            best.persons.clear();
        }
        best.persons.push(*person);
    }
    best.persons.sort_unstable();
    best
}
