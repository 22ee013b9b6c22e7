use thiserror::Error;

/// opaque identifier of a party in the call log (phone numbers up to 15 digits)
pub type Person = u64;

/// one (caller, callee) pair as read from a source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRecord {
    pub caller: Person,
    pub callee: Person,
}

impl ContactRecord {
    pub fn new(caller: Person, callee: Person) -> Self {
        ContactRecord { caller, callee }
    }
}

/// returned Error for a record that cannot become a friendship
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// Wrong field count, or a field that is not an unsigned integer
    #[error("malformed record {line:?}: {reason}")]
    MalformedRecord { line: String, reason: String },

    /// A party calling itself
    #[error("invalid self call by {0}")]
    InvalidSelfCall(Person),
}

/// parse one delimited line into a validated contact record
pub fn parse_record(line: &str, delimiter: char) -> Result<ContactRecord, RecordError> {
    let (caller, callee) = parse_fields(line, delimiter)?;
    if caller == callee {
        return Err(RecordError::InvalidSelfCall(caller));
    }
    Ok(ContactRecord::new(caller, callee))
}

/// true when the line does not even parse as two integers;
/// only meaningful for the first line of a source
pub fn is_header(line: &str, delimiter: char) -> bool {
    parse_fields(line, delimiter).is_err()
}

fn parse_fields(line: &str, delimiter: char) -> Result<(Person, Person), RecordError> {
    let malformed = |reason: String| RecordError::MalformedRecord {
        line: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() != 2 {
        return Err(malformed(format!("expected 2 fields, found {}", fields.len())));
    }

    let mut values = [0; 2];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .parse::<Person>()
            .map_err(|e| malformed(format!("{:?}: {}", field, e)))?;
    }
    Ok((values[0], values[1]))
}

/// counters for one run over one source; merged across ingest workers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// data lines seen, header excluded
    pub records: usize,
    /// records that became (possibly duplicate) friendships
    pub accepted: usize,
    /// accepted records whose pair was already known
    pub duplicates: usize,
    pub malformed: usize,
    pub self_calls: usize,
    pub header_skipped: bool,
}

impl IngestStats {
    /// classify the outcome of one record
    pub fn record(&mut self, outcome: &Result<ContactRecord, RecordError>) {
        self.records += 1;
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(RecordError::MalformedRecord { .. }) => self.malformed += 1,
            Err(RecordError::InvalidSelfCall(_)) => self.self_calls += 1,
        }
    }

    pub fn merge(&mut self, other: IngestStats) {
        self.records += other.records;
        self.accepted += other.accepted;
        self.duplicates += other.duplicates;
        self.malformed += other.malformed;
        self.self_calls += other.self_calls;
        self.header_skipped |= other.header_skipped;
    }

    pub fn skipped(&self) -> usize {
        self.malformed + self.self_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fifteen_digit_pairs() {
        let record = parse_record("609924193100001, 201463888400002", ',').unwrap();
        assert_eq!(record, ContactRecord::new(609_924_193_100_001, 201_463_888_400_002));
    }

    #[test]
    fn rejects_self_call() {
        assert_eq!(parse_record("5,5", ','), Err(RecordError::InvalidSelfCall(5)));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["abc,123", "1,2,3", "1", "", "-4,2", "1,"] {
            assert!(
                matches!(parse_record(line, ','), Err(RecordError::MalformedRecord { .. })),
                "{:?} should be malformed",
                line
            );
        }
    }

    #[test]
    fn honours_delimiter() {
        assert_eq!(parse_record("7;8", ';').unwrap(), ContactRecord::new(7, 8));
        assert!(parse_record("7;8", ',').is_err());
    }

    #[test]
    fn detects_header() {
        assert!(is_header("calling,called", ','));
        assert!(!is_header("1,2", ','));
        // a self call is still two integers, so it is data
        assert!(!is_header("3,3", ','));
    }

    #[test]
    fn stats_count_by_outcome() {
        let mut stats = IngestStats::default();
        stats.record(&parse_record("1,2", ','));
        stats.record(&parse_record("abc,123", ','));
        stats.record(&parse_record("4,4", ','));

        let mut other = IngestStats {
            header_skipped: true,
            ..Default::default()
        };
        other.record(&parse_record("2,3", ','));
        stats.merge(other);

        assert_eq!(stats.records, 4);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.self_calls, 1);
        assert_eq!(stats.skipped(), 2);
        assert!(stats.header_skipped);
    }
}
