//! Repository core: in-memory collections persisted as JSON documents.
//!
//! ## Overview
//!
//! `Repository` owns four collections (cards, lanes, floors, users) plus the
//! login session. It is constructed once per process and shared through
//! `RepoHandle`; view adapters never own entity copies.
//!
//! ```text
//!  view ──> RepoHandle::lock() ──> Repository ──> AuditLog
//!                                     │
//!                                     └─ save() ──> ProcessLock ──> JsonStore
//! ```
//!
//! | File          | Operations                                              |
//! |---------------|---------------------------------------------------------|
//! | `mod.rs`      | construction, `load`, `save`, audit helper              |
//! | `accounts.rs` | `login`, `logout`, user create/update/remove            |
//! | `board.rs`    | lanes, cards, move-to-in-use and locater rules          |
//! | `floors.rs`   | floor plans, tables, seats                              |
//!
//! The process lock only brackets store I/O. In-memory mutation is guarded
//! by the `RepoHandle` mutex alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::config::{AuthSection, PlanifyConfig};
use crate::errors::StoreError;
use crate::lock::ProcessLock;
use crate::models::{BoardLane, Card, FloorPlan, Session, UserAccount};
use crate::seed;
use crate::store::{self, JsonStore};

mod accounts;
mod board;
mod floors;

pub use floors::Turn;

/// Why a collection was replaced by seed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    Missing,
    Empty,
    Corrupt(String),
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    Loaded,
    Seeded(SeedReason),
}

impl CollectionSource {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// Outcome of `Repository::load`. Loading itself never fails; this records
/// what was read and what was seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub locked: bool,
    pub cards: CollectionSource,
    pub floors: CollectionSource,
    pub lanes: CollectionSource,
    pub users: CollectionSource,
    /// Cards moved to the first lane because their lane was empty or unknown
    pub repaired_cards: usize,
}

impl LoadReport {
    pub fn fully_loaded(&self) -> bool {
        self.cards.is_loaded()
            && self.floors.is_loaded()
            && self.lanes.is_loaded()
            && self.users.is_loaded()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub locked: bool,
}

pub struct Repository {
    cards: Vec<Card>,
    floors: Vec<FloorPlan>,
    lanes: Vec<BoardLane>,
    users: Vec<UserAccount>,
    session: Session,
    store: JsonStore,
    lock: ProcessLock,
    lock_timeout: Duration,
    audit: AuditLog,
    auth: AuthSection,
}

impl Repository {
    pub fn new(
        store: JsonStore,
        lock: ProcessLock,
        lock_timeout: Duration,
        audit: AuditLog,
        auth: AuthSection,
    ) -> Self {
        Self {
            cards: Vec::new(),
            floors: Vec::new(),
            lanes: Vec::new(),
            users: Vec::new(),
            session: Session::default(),
            store,
            lock,
            lock_timeout,
            audit,
            auth,
        }
    }

    /// Build a repository over the configured data directory. Collections
    /// stay empty until `load`.
    pub fn open(config: &PlanifyConfig) -> Result<Self, StoreError> {
        let store = JsonStore::open(&config.data_dir)?;
        let lock = ProcessLock::new(&config.data_dir, &config.lock_name);
        let audit = AuditLog::new(&config.audit_file);
        Ok(Self::new(
            store,
            lock,
            config.lock_timeout,
            audit,
            config.auth.clone(),
        ))
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn floors(&self) -> &[FloorPlan] {
        &self.floors
    }

    pub fn lanes(&self) -> &[BoardLane] {
        &self.lanes
    }

    pub fn users(&self) -> &[UserAccount] {
        &self.users
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Append an audit entry attributed to the current user.
    pub fn log(&self, action: &str, details: &str) {
        self.audit.write(&self.session.current_user, action, details);
    }

    /// Read all four collections, seeding any that are missing or unreadable.
    ///
    /// Lanes are seeded when they load empty as well, since every card needs
    /// a lane. Afterwards, cards whose lane is empty or unknown move to the
    /// first lane by order.
    pub async fn load(&mut self) -> LoadReport {
        let guard = self.lock.try_acquire(self.lock_timeout).await;
        if guard.is_none() {
            warn!(
                path = %self.lock.path().display(),
                "process lock not acquired; loading without it"
            );
        }

        let (lanes, lanes_src) = self.load_or_seed(store::LANES, true, seed::seed_lanes).await;
        self.lanes = lanes;

        let today = Local::now().date_naive();
        let seed_lanes = self.lanes.clone();
        let (cards, cards_src) = self
            .load_or_seed(store::CARDS, false, || seed::seed_cards(&seed_lanes, today))
            .await;
        self.cards = cards;

        let (floors, floors_src) = self.load_or_seed(store::FLOORS, false, seed::seed_floors).await;
        self.floors = floors;

        let auth = self.auth.clone();
        let (users, users_src) = self
            .load_or_seed(store::USERS, false, || {
                seed::seed_users(
                    &auth.admin_username,
                    &auth.admin_password,
                    auth.pbkdf2_iterations,
                )
            })
            .await;
        self.users = users;

        let repaired_cards = self.repair_lane_references();
        let locked = guard.is_some();
        drop(guard);

        let report = LoadReport {
            locked,
            cards: cards_src,
            floors: floors_src,
            lanes: lanes_src,
            users: users_src,
            repaired_cards,
        };
        if report.fully_loaded() {
            debug!(cards = self.cards.len(), lanes = self.lanes.len(), "repository loaded");
        } else {
            info!(?report, "repository loaded with seeded collections");
        }
        report
    }

    async fn load_or_seed<T, F>(
        &self,
        name: &str,
        seed_when_empty: bool,
        seed: F,
    ) -> (Vec<T>, CollectionSource)
    where
        T: DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        let reason = match self.store.load::<Vec<T>>(name).await {
            Ok(Some(items)) if !(seed_when_empty && items.is_empty()) => {
                return (items, CollectionSource::Loaded);
            }
            Ok(Some(_)) => SeedReason::Empty,
            Ok(None) => SeedReason::Missing,
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(document = name, error = %e, "document unreadable; seeding over it");
                SeedReason::Corrupt(e.to_string())
            }
            Err(e) => {
                warn!(document = name, error = %e, "document read failed; seeding");
                SeedReason::Io(e.to_string())
            }
        };
        (seed(), CollectionSource::Seeded(reason))
    }

    /// Point cards with an empty or dangling lane at the first lane.
    fn repair_lane_references(&mut self) -> usize {
        let Some(first) = self.first_lane_id() else {
            return 0;
        };
        let mut repaired = 0;
        for card in &mut self.cards {
            let dangling = card.lane_id.trim().is_empty()
                || !self.lanes.iter().any(|l| l.id == card.lane_id);
            if dangling {
                card.lane_id = first.clone();
                repaired += 1;
            }
        }
        repaired
    }

    /// Write all four collections. Proceeds without the process lock when it
    /// cannot be acquired in time.
    pub async fn save(&self) -> Result<SaveReport, StoreError> {
        let guard = self.lock.try_acquire(self.lock_timeout).await;
        if guard.is_none() {
            warn!(
                path = %self.lock.path().display(),
                "process lock not acquired; saving without it"
            );
        }

        self.store.save(store::CARDS, &self.cards).await?;
        self.store.save(store::FLOORS, &self.floors).await?;
        self.store.save(store::LANES, &self.lanes).await?;
        self.store.save(store::USERS, &self.users).await?;

        let report = SaveReport {
            locked: guard.is_some(),
        };
        drop(guard);
        debug!(locked = report.locked, "repository saved");
        Ok(report)
    }
}

/// Shared, clonable handle to the process's single repository.
#[derive(Clone)]
pub struct RepoHandle {
    inner: Arc<tokio::sync::Mutex<Repository>>,
}

impl RepoHandle {
    pub fn new(repo: Repository) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(repo)),
        }
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Repository> {
        self.inner.lock().await
    }
}
