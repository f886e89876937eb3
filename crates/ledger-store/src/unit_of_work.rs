use crate::records::Record;
use crate::{LedgerStoreError, Result, Version};

/// A single intended write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Writes a new record at version 1. Fails if the key already exists.
    Insert(Record),

    /// Overwrites a record, but only if it is still at `expected`.
    Update { record: Record, expected: Version },
}

impl Mutation {
    pub fn insert(record: impl Into<Record>) -> Self {
        Mutation::Insert(record.into())
    }

    pub fn update(record: impl Into<Record>, expected: Version) -> Self {
        Mutation::Update {
            record: record.into(),
            expected,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            Mutation::Insert(record) | Mutation::Update { record, .. } => record,
        }
    }
}

/// Mutations committed together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOfWork {
    mutations: Vec<Mutation>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an insert of a new record.
    pub fn insert(mut self, record: impl Into<Record>) -> Self {
        self.mutations.push(Mutation::insert(record));
        self
    }

    /// Adds a compare-and-swap update against the version the record was read at.
    pub fn update(mut self, record: impl Into<Record>, expected: Version) -> Self {
        self.mutations.push(Mutation::update(record, expected));
        self
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Checks the shape of the unit before any storage is touched.
    pub fn validate(&self) -> Result<()> {
        if self.mutations.is_empty() {
            return Err(LedgerStoreError::InvalidUnitOfWork(
                "Cannot commit an empty unit of work".to_string(),
            ));
        }

        for (i, mutation) in self.mutations.iter().enumerate() {
            let record = mutation.record();

            if let Mutation::Update { expected, .. } = mutation {
                if !record.is_mutable() {
                    return Err(LedgerStoreError::ImmutableRecord {
                        collection: record.collection(),
                    });
                }
                if *expected < Version::first() {
                    return Err(LedgerStoreError::InvalidUnitOfWork(format!(
                        "Update of {} {} must expect a stored version, got {}",
                        record.collection(),
                        record.key(),
                        expected
                    )));
                }
            }

            // Each record may be touched at most once per unit
            let duplicate = self.mutations[..i].iter().any(|earlier| {
                earlier.record().collection() == record.collection()
                    && earlier.record().key() == record.key()
            });
            if duplicate {
                return Err(LedgerStoreError::InvalidUnitOfWork(format!(
                    "{} {} appears more than once",
                    record.collection(),
                    record.key()
                )));
            }
        }

        Ok(())
    }
}
