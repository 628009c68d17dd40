use tracing::debug;

use crate::errors::{MoveRejection, RepoError};
use crate::models::{Card, FloorPlan, Seat, Table};
use crate::repository::{LoadReport, RepoHandle, Repository, Turn};

/// Floor plan editor projection: the active floor and its table ids.
pub struct FloorView {
    repo: RepoHandle,
    active_floor_id: Option<String>,
    table_ids: Vec<String>,
}

fn table_ids_of(repo: &Repository, floor_id: Option<&str>) -> Vec<String> {
    floor_id
        .and_then(|id| repo.floor(id))
        .map(|f| f.tables.iter().map(|t| t.id.clone()).collect())
        .unwrap_or_default()
}

impl FloorView {
    pub fn new(repo: RepoHandle) -> Self {
        Self {
            repo,
            active_floor_id: None,
            table_ids: Vec::new(),
        }
    }

    /// Load the repository and select the first floor, if any.
    pub async fn init(&mut self) -> LoadReport {
        let mut repo = self.repo.lock().await;
        let report = repo.load().await;
        self.active_floor_id = repo.floors().first().map(|f| f.id.clone());
        self.table_ids = table_ids_of(&repo, self.active_floor_id.as_deref());
        report
    }

    pub fn active_floor_id(&self) -> Option<&str> {
        self.active_floor_id.as_deref()
    }

    pub fn table_ids(&self) -> &[String] {
        &self.table_ids
    }

    fn active_id(&self) -> Result<String, RepoError> {
        self.active_floor_id.clone().ok_or(RepoError::NoActiveFloor)
    }

    pub async fn floors(&self) -> Vec<FloorPlan> {
        self.repo.lock().await.floors().to_vec()
    }

    pub async fn select_floor(&mut self, floor_id: &str) -> Result<(), RepoError> {
        let repo = self.repo.lock().await;
        if repo.floor(floor_id).is_none() {
            return Err(RepoError::FloorNotFound {
                id: floor_id.to_string(),
            });
        }
        self.active_floor_id = Some(floor_id.to_string());
        self.table_ids = table_ids_of(&repo, Some(floor_id));
        debug!(floor = floor_id, "floor selected");
        Ok(())
    }

    pub async fn active_floor(&self) -> Option<FloorPlan> {
        let id = self.active_floor_id.as_deref()?;
        self.repo.lock().await.floor(id).cloned()
    }

    pub async fn current_level(&self) -> Option<i32> {
        self.active_floor().await.map(|f| f.level)
    }

    /// Add a floor and make it the active one.
    pub async fn add_floor(
        &mut self,
        name: &str,
        company: &str,
        building: &str,
        level: i32,
    ) -> Result<FloorPlan, RepoError> {
        let mut repo = self.repo.lock().await;
        let floor = repo.add_floor(name, company, building, level);
        let saved = repo.save().await;
        self.active_floor_id = Some(floor.id.clone());
        self.table_ids = table_ids_of(&repo, Some(&floor.id));
        saved?;
        Ok(floor)
    }

    pub async fn set_floor_image(&mut self, path: Option<&str>) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.set_floor_image(&floor_id, path) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn add_table(&mut self, name: &str) -> Result<Table, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        let table = repo.add_table(&floor_id, name)?;
        let saved = repo.save().await;
        self.table_ids = table_ids_of(&repo, Some(&floor_id));
        saved?;
        Ok(table)
    }

    pub async fn update_table_position(
        &mut self,
        table_id: &str,
        x: f64,
        y: f64,
    ) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.set_table_position(&floor_id, table_id, x, y) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn update_table_size(
        &mut self,
        table_id: &str,
        width: f64,
        height: f64,
    ) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.resize_table(&floor_id, table_id, width, height) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    /// Returns the new accumulated angle.
    pub async fn rotate_table(
        &mut self,
        table_id: &str,
        turn: Turn,
    ) -> Result<Option<i32>, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        let Some(angle) = repo.rotate_table(&floor_id, table_id, turn) else {
            return Ok(None);
        };
        repo.save().await?;
        Ok(Some(angle))
    }

    pub async fn duplicate_table(&mut self, table_id: &str) -> Result<Option<Table>, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        let Some(copy) = repo.duplicate_table(&floor_id, table_id) else {
            return Ok(None);
        };
        let saved = repo.save().await;
        self.table_ids = table_ids_of(&repo, Some(&floor_id));
        saved?;
        Ok(Some(copy))
    }

    pub async fn rename_table(&mut self, table_id: &str, name: &str) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.rename_table(&floor_id, table_id, name) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn remove_table(&mut self, table_id: &str) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.remove_table(&floor_id, table_id) {
            return Ok(false);
        }
        let saved = repo.save().await;
        self.table_ids = table_ids_of(&repo, Some(&floor_id));
        saved?;
        Ok(true)
    }

    pub async fn add_seat(
        &mut self,
        table_id: &str,
        locater_id: &str,
        role: &str,
    ) -> Result<Seat, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        let seat = repo.add_seat(&floor_id, table_id, locater_id, role)?;
        repo.save().await?;
        Ok(seat)
    }

    pub async fn remove_seat(&mut self, table_id: &str, seat_id: &str) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.remove_seat(&floor_id, table_id, seat_id) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    pub async fn set_seat_position(
        &mut self,
        table_id: &str,
        seat_id: &str,
        x: f64,
        y: f64,
    ) -> Result<bool, RepoError> {
        let floor_id = self.active_id()?;
        let mut repo = self.repo.lock().await;
        if !repo.set_seat_position(&floor_id, table_id, seat_id, x, y) {
            return Ok(false);
        }
        repo.save().await?;
        Ok(true)
    }

    /// Cards placed at a seat's locater.
    pub async fn cards_for_seat(&self, locater_id: &str) -> Vec<Card> {
        let repo = self.repo.lock().await;
        repo.cards_at_locater(locater_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Put a person at a desk. Returns how many cards were flagged for wiping.
    pub async fn assign_person(
        &mut self,
        locater_id: &str,
        person: &str,
    ) -> Result<usize, RepoError> {
        let mut repo = self.repo.lock().await;
        let changed = repo.assign_person_to_locater(locater_id, person);
        repo.save().await?;
        Ok(changed)
    }

    /// Check a card against the active floor's level. `Ok(None)` means the
    /// card may move to "in use".
    pub async fn can_move_to_in_use(
        &self,
        card_id: &str,
    ) -> Result<Option<MoveRejection>, RepoError> {
        let floor_id = self.active_id()?;
        let repo = self.repo.lock().await;
        let level = repo
            .floor(&floor_id)
            .map(|f| f.level)
            .ok_or(RepoError::FloorNotFound { id: floor_id })?;
        let card = repo.card(card_id).ok_or_else(|| RepoError::CardNotFound {
            id: card_id.to_string(),
        })?;
        Ok(repo.can_move_to_in_use(card, level).err())
    }
}
