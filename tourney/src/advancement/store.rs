//! In-memory bracket store with result notifications.

use async_trait::async_trait;
use log::{debug, info};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::RwLock;

use super::engine::{override_result, record_result};
use super::models::ResultSubmission;
use crate::bracket::models::{Bracket, MatchId};
use crate::config::SchedulerConfig;
use crate::errors::{BracketError, BracketResult};
use crate::fingerprint::fingerprint;
use crate::pipeline::{GeneratedTournament, TournamentRequest, generate};

/// Bracket identifier assigned by the store
pub type BracketId = u64;

/// Generated tournaments kept by [`BracketStore::generate_cached`] by default
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Receives a snapshot after every accepted result
#[async_trait]
pub trait ResultObserver: Send + Sync {
    /// Called once per accepted submission, outside the store lock
    async fn result_recorded(&self, bracket_id: BracketId, match_id: MatchId, bracket: &Bracket);
}

/// Holds live brackets and serializes mutation per store
#[derive(Clone)]
pub struct BracketStore {
    /// Live brackets keyed by id
    brackets: Arc<RwLock<HashMap<BracketId, Bracket>>>,

    /// Next id to hand out
    next_id: Arc<RwLock<BracketId>>,

    /// Generated tournaments keyed by fingerprint of (request, config)
    generated: Arc<RwLock<GenerationCache>>,

    observers: Arc<RwLock<Vec<Arc<dyn ResultObserver>>>>,
}

/// Bounded cache, oldest entry evicted first
struct GenerationCache {
    entries: HashMap<String, GeneratedTournament>,
    order: VecDeque<String>,
    capacity: usize,
}

impl GenerationCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn insert(&mut self, key: String, generated: GeneratedTournament) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), generated).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!("Evicted generation cache entry {oldest}");
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl BracketStore {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Store whose generation cache holds at most `capacity` tournaments
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            brackets: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
            generated: Arc::new(RwLock::new(GenerationCache::new(capacity))),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register an observer for accepted results
    pub async fn subscribe(&self, observer: Arc<dyn ResultObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Take ownership of a bracket and return its id
    pub async fn insert(&self, bracket: Bracket) -> BracketId {
        let mut next_id = self.next_id.write().await;
        let id = *next_id;
        *next_id += 1;
        drop(next_id);

        self.brackets.write().await.insert(id, bracket);
        debug!("Stored bracket {id}");
        id
    }

    /// Snapshot of a bracket
    pub async fn get(&self, id: BracketId) -> Option<Bracket> {
        self.brackets.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: BracketId) -> Option<Bracket> {
        self.brackets.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.brackets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.brackets.read().await.is_empty()
    }

    /// Record a result and notify observers
    ///
    /// # Errors
    ///
    /// * `BracketNotFound` - no bracket with that id
    /// * Any error from [`record_result`]
    pub async fn submit_result(
        &self,
        id: BracketId,
        submission: ResultSubmission,
    ) -> BracketResult<Bracket> {
        let match_id = submission.match_id;
        let snapshot = {
            let mut brackets = self.brackets.write().await;
            let bracket = brackets
                .get_mut(&id)
                .ok_or(BracketError::BracketNotFound(id))?;
            record_result(bracket, submission)?.clone()
        };

        self.notify(id, match_id, &snapshot).await;
        Ok(snapshot)
    }

    /// Override a result and notify observers
    ///
    /// # Errors
    ///
    /// * `BracketNotFound` - no bracket with that id
    /// * Any error from [`override_result`]
    pub async fn override_result(
        &self,
        id: BracketId,
        submission: ResultSubmission,
        note: &str,
    ) -> BracketResult<Bracket> {
        let match_id = submission.match_id;
        let snapshot = {
            let mut brackets = self.brackets.write().await;
            let bracket = brackets
                .get_mut(&id)
                .ok_or(BracketError::BracketNotFound(id))?;
            override_result(bracket, submission, note)?.clone()
        };

        self.notify(id, match_id, &snapshot).await;
        Ok(snapshot)
    }

    /// Generate a tournament, reusing an earlier result for the same request
    /// and scheduler config
    ///
    /// # Errors
    ///
    /// Any error from [`generate`].
    pub async fn generate_cached(
        &self,
        request: &TournamentRequest,
        config: &SchedulerConfig,
    ) -> BracketResult<GeneratedTournament> {
        let key = fingerprint(&(request, config))?;
        if let Some(hit) = self.generated.read().await.entries.get(&key) {
            debug!("Generation cache hit for '{}'", request.name);
            return Ok(hit.clone());
        }

        let generated = generate(request, config)?;
        self.generated
            .write()
            .await
            .insert(key, generated.clone());
        Ok(generated)
    }

    /// Number of cached generated tournaments
    pub async fn cached_len(&self) -> usize {
        self.generated.read().await.entries.len()
    }

    /// Drop every cached generated tournament
    pub async fn clear_cache(&self) {
        self.generated.write().await.clear();
        debug!("Generation cache cleared");
    }

    async fn notify(&self, id: BracketId, match_id: MatchId, bracket: &Bracket) {
        let observers = self.observers.read().await.clone();
        for observer in &observers {
            observer.result_recorded(id, match_id, bracket).await;
        }
        info!(
            "Bracket {id}: {match_id} accepted, {} observer(s) notified",
            observers.len()
        );
    }
}

impl Default for BracketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::builder::{BuildOptions, build_bracket};
    use crate::bracket::models::Format;
    use crate::roster::models::Participant;
    use crate::schedule::models::{Constraints, TimeGrid};
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<(BracketId, MatchId, u64)>>,
    }

    #[async_trait]
    impl ResultObserver for Recorder {
        async fn result_recorded(&self, bracket_id: BracketId, match_id: MatchId, bracket: &Bracket) {
            self.seen
                .lock()
                .unwrap()
                .push((bracket_id, match_id, bracket.version()));
        }
    }

    fn four_player_bracket() -> Bracket {
        let roster: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| Participant::new(id, &id.to_uppercase()))
            .collect();
        build_bracket(Format::SingleElimination, &roster, &BuildOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = BracketStore::new();
        assert!(store.is_empty().await);
        let first = store.insert(four_player_bracket()).await;
        let second = store.insert(four_player_bracket()).await;
        assert_eq!((first, second), (1, 2));
        assert_eq!(store.len().await, 2);
        assert!(store.remove(first).await.is_some());
        assert!(store.get(first).await.is_none());
    }

    #[tokio::test]
    async fn test_submit_notifies_observers() {
        let store = BracketStore::new();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        store.subscribe(recorder.clone()).await;

        let id = store.insert(four_player_bracket()).await;
        let updated = store
            .submit_result(id, ResultSubmission::new(MatchId(1), "a", 0))
            .await
            .unwrap();
        assert_eq!(updated.version(), 1);
        assert_eq!(store.get(id).await.unwrap(), updated);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![(id, MatchId(1), 1)]);
    }

    #[tokio::test]
    async fn test_rejected_submission_is_not_broadcast() {
        let store = BracketStore::new();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        store.subscribe(recorder.clone()).await;
        let id = store.insert(four_player_bracket()).await;

        let err = store
            .submit_result(id, ResultSubmission::new(MatchId(3), "a", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BracketError::MatchNotReady(_)));

        let missing = store
            .submit_result(99, ResultSubmission::new(MatchId(1), "a", 0))
            .await
            .unwrap_err();
        assert!(matches!(missing, BracketError::BracketNotFound(99)));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_cached() {
        let store = BracketStore::new();
        let roster = (1..=5)
            .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
            .collect();
        let request = TournamentRequest::new("Open", Format::RoundRobin, roster);

        let first = store
            .generate_cached(&request, &SchedulerConfig::default())
            .await
            .unwrap();
        let second = store
            .generate_cached(&request, &SchedulerConfig::default())
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bracket.matches().len(), 10);
    }

    #[tokio::test]
    async fn test_generate_cached_keys_on_config() {
        let store = BracketStore::new();
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let roster = (1..=4)
            .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
            .collect();
        let mut grid = TimeGrid::new(4);
        grid.start = Some(start);
        let request = TournamentRequest::new("Open", Format::SingleElimination, roster)
            .with_constraints(Constraints {
                time_grid: Some(grid),
                ..Default::default()
            });

        let short = SchedulerConfig {
            default_slot_minutes: 30,
            ..Default::default()
        };
        let long = SchedulerConfig {
            default_slot_minutes: 90,
            ..Default::default()
        };
        store.generate_cached(&request, &short).await.unwrap();
        let cached = store.generate_cached(&request, &long).await.unwrap();

        assert_eq!(cached, generate(&request, &long).unwrap());
        let final_slot = cached.schedule.slot_of(MatchId(3)).unwrap();
        let offset = TimeDelta::minutes(90 * i64::from(final_slot.index));
        assert_eq!(final_slot.starts_at, Some(start + offset));
        assert_eq!(store.cached_len().await, 2);
    }

    #[tokio::test]
    async fn test_generation_cache_is_bounded() {
        let store = BracketStore::with_cache_capacity(2);
        let roster: Vec<Participant> = (1..=4)
            .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
            .collect();
        for name in ["Spring", "Summer", "Autumn"] {
            let request = TournamentRequest::new(name, Format::SingleElimination, roster.clone());
            store
                .generate_cached(&request, &SchedulerConfig::default())
                .await
                .unwrap();
        }
        assert_eq!(store.cached_len().await, 2);

        store.clear_cache().await;
        assert_eq!(store.cached_len().await, 0);
    }
}
