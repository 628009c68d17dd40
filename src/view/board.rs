use std::collections::HashMap;

use tracing::debug;

use crate::errors::RepoError;
use crate::models::{BoardLane, Card, CardField, NewCard};
use crate::repository::{LoadReport, RepoHandle, Repository};

/// Direction for `BoardView::shift_card`, by lane order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Left,
    Right,
}

/// A lane with its cards, resolved at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSnapshot {
    pub lane: BoardLane,
    pub cards: Vec<Card>,
}

#[derive(Debug, Default)]
struct BoardProjection {
    lane_ids: Vec<String>,
    cards_by_lane: HashMap<String, Vec<String>>,
}

impl BoardProjection {
    fn build(repo: &Repository) -> Self {
        let lane_ids: Vec<String> = repo.lanes_ordered().iter().map(|l| l.id.clone()).collect();
        let mut cards_by_lane: HashMap<String, Vec<String>> =
            lane_ids.iter().map(|id| (id.clone(), Vec::new())).collect();
        for card in repo.cards() {
            if let Some(ids) = cards_by_lane.get_mut(&card.lane_id) {
                ids.push(card.id.clone());
            }
        }
        Self {
            lane_ids,
            cards_by_lane,
        }
    }

    /// Save, then rebuild from memory. The rebuild runs even when the save
    /// fails, so the projection never disagrees with the repository.
    async fn commit(&mut self, repo: &mut Repository) -> Result<(), RepoError> {
        let saved = repo.save().await;
        *self = Self::build(repo);
        saved?;
        Ok(())
    }
}

/// Kanban board projection.
pub struct BoardView {
    repo: RepoHandle,
    projection: BoardProjection,
}

impl BoardView {
    pub fn new(repo: RepoHandle) -> Self {
        Self {
            repo,
            projection: BoardProjection::default(),
        }
    }

    /// Load the repository and build the projection.
    pub async fn init(&mut self) -> LoadReport {
        let mut repo = self.repo.lock().await;
        let report = repo.load().await;
        self.projection = BoardProjection::build(&repo);
        report
    }

    /// Rebuild the projection without touching disk.
    pub async fn refresh(&mut self) {
        let repo = self.repo.lock().await;
        self.projection = BoardProjection::build(&repo);
    }

    /// Lane ids in display order.
    pub fn lane_ids(&self) -> &[String] {
        &self.projection.lane_ids
    }

    pub fn card_ids(&self, lane_id: &str) -> &[String] {
        self.projection
            .cards_by_lane
            .get(lane_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Current lanes and their cards. Ids that no longer resolve are skipped.
    pub async fn snapshot(&self) -> Vec<LaneSnapshot> {
        let repo = self.repo.lock().await;
        self.projection
            .lane_ids
            .iter()
            .filter_map(|lane_id| {
                let lane = repo.lane(lane_id)?.clone();
                let cards = self
                    .card_ids(lane_id)
                    .iter()
                    .filter_map(|id| repo.card(id).cloned())
                    .collect();
                Some(LaneSnapshot { lane, cards })
            })
            .collect()
    }

    pub async fn move_card(
        &mut self,
        card_id: &str,
        to_lane_id: &str,
    ) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if !repo.move_card(card_id, to_lane_id) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }

    /// Move a card to the neighbouring lane. No-op at either end.
    pub async fn shift_card(&mut self, card_id: &str, shift: Shift) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        let lane_id = repo
            .card(card_id)
            .map(|c| c.lane_id.clone())
            .ok_or_else(|| RepoError::CardNotFound {
                id: card_id.to_string(),
            })?;
        let lanes: Vec<String> = repo.lanes_ordered().iter().map(|l| l.id.clone()).collect();
        let Some(pos) = lanes.iter().position(|id| *id == lane_id) else {
            return Ok(false);
        };
        let target = match shift {
            Shift::Left => pos.checked_sub(1),
            Shift::Right => Some(pos + 1).filter(|p| *p < lanes.len()),
        };
        let Some(target) = target else {
            debug!(card = card_id, ?shift, "card already at the board edge");
            return Ok(false);
        };
        if !repo.move_card(card_id, &lanes[target]) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }

    pub async fn add_lane(&mut self, title: &str) -> Result<BoardLane, RepoError> {
        let mut repo = self.repo.lock().await;
        let lane = repo.add_lane(title);
        self.projection.commit(&mut repo).await?;
        Ok(lane)
    }

    pub async fn rename_lane(&mut self, lane_id: &str, title: &str) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if !repo.rename_lane(lane_id, title) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }

    /// Remove a lane, moving its cards to the first other lane by order.
    /// The last remaining lane cannot be removed.
    pub async fn remove_lane(&mut self, lane_id: &str) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        let fallback = repo
            .lanes_ordered()
            .iter()
            .find(|l| l.id != lane_id)
            .map(|l| l.id.clone());
        let Some(fallback) = fallback else {
            return Ok(false);
        };
        if !repo.remove_lane(lane_id, &fallback) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }

    pub async fn create_card(
        &mut self,
        lane_id: &str,
        new_card: NewCard,
    ) -> Result<Card, RepoError> {
        let mut repo = self.repo.lock().await;
        let card = repo.add_card(lane_id, new_card)?;
        self.projection.commit(&mut repo).await?;
        Ok(card)
    }

    pub async fn delete_card(&mut self, card_id: &str) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if !repo.remove_card(card_id) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }

    pub async fn edit_card_field(
        &mut self,
        card_id: &str,
        field: CardField,
        value: Option<&str>,
    ) -> Result<bool, RepoError> {
        let mut repo = self.repo.lock().await;
        if !repo.edit_card(card_id, field, value) {
            return Ok(false);
        }
        self.projection.commit(&mut repo).await?;
        Ok(true)
    }
}
