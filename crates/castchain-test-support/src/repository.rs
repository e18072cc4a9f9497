//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use castchain_core::error::DomainError;
use castchain_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that records all `append_events` calls. Returns the
/// configured events from every `load_events` call and always succeeds on
/// `append_events`.
#[derive(Debug)]
pub struct RecordingEventRepository {
    load_result: Mutex<Vec<StoredEvent>>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventRepository {
    /// Create a new recording repository that will return `events` from
    /// every `load_events` call.
    #[must_use]
    pub fn new(events: Vec<StoredEvent>) -> Self {
        Self {
            load_result: Mutex::new(events),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all events that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.load_result.lock().unwrap().clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn evict(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Ok(true)
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for testing "session not found" scenarios and
/// creation commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn evict(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Ok(false)
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn evict(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// An event repository whose appends always lose the race. Loads return the
/// configured events; counts every append attempt.
#[derive(Debug)]
pub struct ConflictingEventRepository {
    events: Vec<StoredEvent>,
    attempts: Mutex<u32>,
}

impl ConflictingEventRepository {
    #[must_use]
    pub fn new(events: Vec<StoredEvent>) -> Self {
        Self {
            events,
            attempts: Mutex::new(0),
        }
    }

    /// Number of `append_events` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EventRepository for ConflictingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.events.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        *self.attempts.lock().unwrap() += 1;
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected: expected_version,
            actual: expected_version + 1,
        })
    }

    async fn evict(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Ok(true)
    }
}

/// An event repository that simulates a rival writer: the first append
/// attempt fails because `rival` events were committed in the meantime, and
/// every later load sees them. Later appends are version-checked and kept.
#[derive(Debug)]
pub struct RacingEventRepository {
    stream: Mutex<Vec<StoredEvent>>,
    rival: Mutex<Option<Vec<StoredEvent>>>,
}

impl RacingEventRepository {
    #[must_use]
    pub fn new(initial: Vec<StoredEvent>, rival: Vec<StoredEvent>) -> Self {
        Self {
            stream: Mutex::new(initial),
            rival: Mutex::new(Some(rival)),
        }
    }

    /// The stream as currently committed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stream(&self) -> Vec<StoredEvent> {
        self.stream.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RacingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.lock().unwrap().clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut stream = self.stream.lock().unwrap();
        if let Some(rival) = self.rival.lock().unwrap().take() {
            stream.extend(rival);
        }

        let actual = stream.last().map_or(0, |e| e.sequence_number);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        stream.extend_from_slice(events);
        Ok(())
    }

    async fn evict(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        let mut stream = self.stream.lock().unwrap();
        let existed = !stream.is_empty();
        stream.clear();
        Ok(existed)
    }
}
