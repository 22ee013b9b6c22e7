use crdts::{CmRDT, CvRDT};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use thiserror::Error;

use crate::persons::{ContactRecord, Person};

/// Map from a Person to the Set of their friends
type Adjacency = HashMap<Person, HashSet<Person>>;

/// returned Error for contacts the graph refuses
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// a Person cannot be their own friend
    #[error("{0} cannot be a friend of themselves")]
    SelfContact(Person),
}

/// Mutable friend graph owned by a single ingest worker.
///
/// Every contact inserts both directions, so the relation is symmetric by
/// construction. Shards built from disjoint slices of a source are combined
/// with [`CvRDT::merge`], a per-key set union, which makes the final graph
/// independent of how records were split and in what order they arrived.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FriendShard {
    friends: Adjacency,
}

impl FriendShard {
    pub fn new() -> Self {
        Self::default()
    }

    /// record a friendship; Ok(false) when the pair was already known
    pub fn insert(&mut self, contact: ContactRecord) -> Result<bool, GraphError> {
        self.validate_op(&contact)?;
        let ContactRecord { caller, callee } = contact;
        let forward = self.friends.entry(caller).or_default().insert(callee);
        let backward = self.friends.entry(callee).or_default().insert(caller);
        debug_assert_eq!(forward, backward, "friend sets out of step");
        Ok(forward)
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }

    /// end of ingestion: the returned graph is read-only
    pub fn freeze(self) -> FriendGraph {
        FriendGraph {
            friends: self.friends,
        }
    }
}

impl CmRDT for FriendShard {
    type Op = ContactRecord;
    type Validation = GraphError;

    fn validate_op(&self, op: &Self::Op) -> Result<(), Self::Validation> {
        if op.caller == op.callee {
            return Err(GraphError::SelfContact(op.caller));
        }
        Ok(())
    }

    fn apply(&mut self, op: Self::Op) {
        if let Err(e) = self.insert(op) {
            tracing::debug!("ignoring contact: {}", e);
        }
    }
}

impl CvRDT for FriendShard {
    type Validation = Infallible;

    fn validate_merge(&self, _other: &Self) -> Result<(), Self::Validation> {
        Ok(())
    }

    fn merge(&mut self, mut other: Self) {
        if other.friends.len() > self.friends.len() {
            std::mem::swap(&mut self.friends, &mut other.friends);
        }
        for (person, theirs) in other.friends {
            match self.friends.entry(person) {
                Entry::Vacant(slot) => {
                    slot.insert(theirs);
                }
                Entry::Occupied(mut slot) => {
                    let ours = slot.get_mut();
                    if theirs.len() > ours.len() {
                        let smaller = std::mem::replace(ours, theirs);
                        ours.extend(smaller);
                    } else {
                        ours.extend(theirs);
                    }
                }
            }
        }
    }
}

impl FromIterator<ContactRecord> for FriendShard {
    fn from_iter<I: IntoIterator<Item = ContactRecord>>(iter: I) -> Self {
        let mut shard = FriendShard::new();
        for contact in iter {
            shard.apply(contact);
        }
        shard
    }
}

/// Frozen friend graph, shared read-only by the aggregation workers
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FriendGraph {
    friends: Adjacency,
}

impl FriendGraph {
    /// friends of a person, None if the person never appeared in a valid record
    pub fn friends(&self, person: &Person) -> Option<&HashSet<Person>> {
        self.friends.get(person)
    }

    pub fn are_friends(&self, a: &Person, b: &Person) -> bool {
        self.friends
            .get(a)
            .map(|friends| friends.contains(b))
            .unwrap_or(false)
    }

    pub fn degree(&self, person: &Person) -> usize {
        self.friends.get(person).map(HashSet::len).unwrap_or(0)
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.friends.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Person, &HashSet<Person>)> {
        self.friends.iter()
    }

    /// number of persons
    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }

    /// number of distinct undirected friendships
    pub fn friendship_count(&self) -> usize {
        self.friends.values().map(HashSet::len).sum::<usize>() / 2
    }
}
