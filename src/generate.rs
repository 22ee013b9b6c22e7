use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::persons::Person;

const LOWEST_NUMBER: Person = 100_000_000_000_000;
const HIGHEST_NUMBER: Person = 999_999_999_999_999;

/// shape of a synthetic call log
#[derive(Debug, Clone, PartialEq)]
pub struct CallLogSettings {
    pub records: usize,
    pub people: usize,
    /// the first `hubs` people take part in `hub_share` of all calls
    pub hubs: usize,
    pub hub_share: f64,
    pub seed: Option<u64>,
    pub header: bool,
}

impl Default for CallLogSettings {
    fn default() -> Self {
        CallLogSettings {
            records: 1000,
            people: 200,
            hubs: 0,
            hub_share: 0.2,
            seed: None,
            header: true,
        }
    }
}

/// returned Error for generator failures
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A call needs two distinct people
    #[error("need at least 2 people, got {0}")]
    TooFewPeople(usize),

    #[error("{hubs} hubs out of {people} people")]
    TooManyHubs { hubs: usize, people: usize },

    #[error("hub share {0} is not within 0..=1")]
    InvalidHubShare(f64),
}

/// write a call log to `path`, returning the seed used
pub fn generate_file(path: &Path, settings: &CallLogSettings) -> Result<u64, GenerateError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let seed = write_call_log(&mut writer, settings)?;
    writer.flush()?;
    Ok(seed)
}

/// Write `settings.records` random calls between 15-digit numbers.
///
/// Returns the seed so that an unseeded log can be reproduced.
pub fn write_call_log<W: Write>(
    writer: &mut W,
    settings: &CallLogSettings,
) -> Result<u64, GenerateError> {
    if settings.people < 2 {
        return Err(GenerateError::TooFewPeople(settings.people));
    }
    if settings.hubs > settings.people {
        return Err(GenerateError::TooManyHubs {
            hubs: settings.hubs,
            people: settings.people,
        });
    }
    if !(0.0..=1.0).contains(&settings.hub_share) {
        return Err(GenerateError::InvalidHubShare(settings.hub_share));
    }

    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let people = phone_numbers(&mut rng, settings.people);
    let hubs = &people[..settings.hubs];

    if settings.header {
        writeln!(writer, "calling,called")?;
    }
    for _ in 0..settings.records {
        let (caller, callee) = if !hubs.is_empty() && rng.gen_bool(settings.hub_share) {
            let hub = pick(&mut rng, hubs)?;
            let other = pick_other(&mut rng, &people, hub)?;
            if rng.gen_bool(0.5) {
                (hub, other)
            } else {
                (other, hub)
            }
        } else {
            let caller = pick(&mut rng, &people)?;
            (caller, pick_other(&mut rng, &people, caller)?)
        };
        writeln!(writer, "{},{}", caller, callee)?;
    }

    tracing::debug!(
        "generated {} calls between {} people (seed {})",
        settings.records,
        settings.people,
        seed
    );
    Ok(seed)
}

/// `count` distinct 15-digit numbers
fn phone_numbers(rng: &mut StdRng, count: usize) -> Vec<Person> {
    let mut seen = HashSet::with_capacity(count);
    let mut numbers = Vec::with_capacity(count);
    while numbers.len() < count {
        let number = rng.gen_range(LOWEST_NUMBER..=HIGHEST_NUMBER);
        if seen.insert(number) {
            numbers.push(number);
        }
    }
    numbers
}

fn pick(rng: &mut StdRng, people: &[Person]) -> Result<Person, GenerateError> {
    people
        .choose(rng)
        .copied()
        .ok_or(GenerateError::TooFewPeople(people.len()))
}

/// anyone but `not`
fn pick_other(rng: &mut StdRng, people: &[Person], not: Person) -> Result<Person, GenerateError> {
    loop {
        let person = pick(rng, people)?;
        if person != not {
            return Ok(person);
        }
    }
}
