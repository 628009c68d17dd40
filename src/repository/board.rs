use chrono::NaiveDate;

use super::Repository;
use crate::errors::{MoveRejection, RepoError};
use crate::locater;
use crate::models::{BoardLane, Card, CardField, MachineStatus, NewCard};

impl Repository {
    // ---------- Lanes ----------

    /// Lanes sorted by `order` (stable for equal orders).
    pub fn lanes_ordered(&self) -> Vec<&BoardLane> {
        let mut lanes: Vec<&BoardLane> = self.lanes.iter().collect();
        lanes.sort_by_key(|l| l.order);
        lanes
    }

    pub fn first_lane_id(&self) -> Option<String> {
        self.lanes
            .iter()
            .min_by_key(|l| l.order)
            .map(|l| l.id.clone())
    }

    pub fn lane(&self, lane_id: &str) -> Option<&BoardLane> {
        self.lanes.iter().find(|l| l.id == lane_id)
    }

    /// Append a lane after the current highest order (0 on an empty board).
    pub fn add_lane(&mut self, title: &str) -> BoardLane {
        let order = self.lanes.iter().map(|l| l.order).max().map_or(0, |m| m + 1);
        let lane = BoardLane::new(title, order);
        self.lanes.push(lane.clone());
        self.log("AddLane", &format!("{} ({})", lane.title, lane.id));
        lane
    }

    pub fn rename_lane(&mut self, lane_id: &str, title: &str) -> bool {
        let Some(lane) = self.lanes.iter_mut().find(|l| l.id == lane_id) else {
            return false;
        };
        lane.title = title.to_string();
        self.log("RenameLane", &format!("{} -> {}", lane_id, title));
        true
    }

    /// Move every card of `lane_id` to `fallback_lane_id`, then drop the lane.
    ///
    /// No-op when the two ids are equal, or either lane is unknown.
    pub fn remove_lane(&mut self, lane_id: &str, fallback_lane_id: &str) -> bool {
        if lane_id == fallback_lane_id
            || self.lane(lane_id).is_none()
            || self.lane(fallback_lane_id).is_none()
        {
            return false;
        }
        for card in self.cards.iter_mut().filter(|c| c.lane_id == lane_id) {
            card.lane_id = fallback_lane_id.to_string();
        }
        self.lanes.retain(|l| l.id != lane_id);
        self.log(
            "RemoveLane",
            &format!("{} (cards -> {})", lane_id, fallback_lane_id),
        );
        true
    }

    // ---------- Cards ----------

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn cards_in_lane(&self, lane_id: &str) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.lane_id == lane_id).collect()
    }

    pub fn add_card(&mut self, lane_id: &str, new_card: NewCard) -> Result<Card, RepoError> {
        if self.lane(lane_id).is_none() {
            return Err(RepoError::LaneNotFound {
                id: lane_id.to_string(),
            });
        }
        let mut card = Card::new(lane_id);
        card.asset_tag = new_card.asset_tag.unwrap_or_default();
        card.model = new_card.model.unwrap_or_default();
        card.serial = new_card.serial.unwrap_or_default();
        self.cards.push(card.clone());
        self.log("AddCard", &format!("{} -> lane:{}", card.asset_tag, lane_id));
        Ok(card)
    }

    pub fn remove_card(&mut self, card_id: &str) -> bool {
        let Some(idx) = self.cards.iter().position(|c| c.id == card_id) else {
            return false;
        };
        let card = self.cards.remove(idx);
        self.log("RemoveCard", &format!("{} ({})", card.asset_tag, card_id));
        true
    }

    /// Reassign a card to another existing lane.
    pub fn move_card(&mut self, card_id: &str, to_lane_id: &str) -> bool {
        if self.lane(to_lane_id).is_none() {
            return false;
        }
        let Some(card) = self.cards.iter_mut().find(|c| c.id == card_id) else {
            return false;
        };
        if card.lane_id == to_lane_id {
            return false;
        }
        let from = std::mem::replace(&mut card.lane_id, to_lane_id.to_string());
        let details = format!("{} : {} -> {}", card.asset_tag, from, to_lane_id);
        self.log("MoveCard", &details);
        true
    }

    /// Set one field from its text form. `None` clears text fields.
    ///
    /// `Deadline` takes `YYYY-MM-DD`; anything unparseable clears it.
    /// `Status` takes the variant name; an unknown name leaves the card
    /// untouched and returns false. Setting `PersonName` on a placed card
    /// also renames every card sharing its locater and every table whose
    /// id is that locater.
    pub fn edit_card(&mut self, card_id: &str, field: CardField, value: Option<&str>) -> bool {
        let Some(idx) = self.cards.iter().position(|c| c.id == card_id) else {
            return false;
        };
        let text = value.unwrap_or_default().to_string();
        let card = &mut self.cards[idx];
        match field {
            CardField::AssetTag => card.asset_tag = text,
            CardField::Model => card.model = text,
            CardField::Serial => card.serial = text,
            CardField::LocaterId => card.locater_id = text.trim().to_string(),
            CardField::Role => card.role = text,
            CardField::Deadline => {
                card.setup_deadline = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok();
            }
            CardField::Status => match text.parse::<MachineStatus>() {
                Ok(status) => card.status = status,
                Err(_) => return false,
            },
            CardField::PersonName => {
                card.person_name = text.clone();
                if card.has_locater() {
                    let locater_id = card.locater_id.clone();
                    self.propagate_person_name(&locater_id, &text);
                }
            }
        }
        self.log("EditCard", &format!("{} {}", card_id, field.as_str()));
        true
    }

    /// Walks all cards and all tables on every floor.
    fn propagate_person_name(&mut self, locater_id: &str, person: &str) {
        for card in self.cards.iter_mut().filter(|c| c.shares_locater(locater_id)) {
            card.person_name = person.to_string();
        }
        for table in self
            .floors
            .iter_mut()
            .flat_map(|f| f.tables.iter_mut())
            .filter(|t| t.id.eq_ignore_ascii_case(locater_id))
        {
            table.name = person.to_string();
        }
    }

    // ---------- Rules ----------

    pub fn cards_at_locater(&self, locater_id: &str) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| c.shares_locater(locater_id))
            .collect()
    }

    /// Well-formed and present on some seat of a floor at `level`.
    pub fn locater_exists_on_level(&self, level: i32, locater_id: &str) -> bool {
        if !locater::is_well_formed(locater_id) {
            return false;
        }
        self.floors
            .iter()
            .filter(|f| f.level == level)
            .any(|f| f.seats().any(|s| s.locater_id == locater_id))
    }

    /// First failed precondition, checked in a fixed order.
    pub fn can_move_to_in_use(&self, card: &Card, level: i32) -> Result<(), MoveRejection> {
        if card.locater_id.trim().is_empty() {
            return Err(MoveRejection::MissingLocater);
        }
        if !self.locater_exists_on_level(level, &card.locater_id) {
            return Err(MoveRejection::UnknownLocater);
        }
        if card.asset_tag.trim().is_empty() {
            return Err(MoveRejection::MissingAssetTag);
        }
        if card.serial.trim().is_empty() {
            return Err(MoveRejection::MissingSerial);
        }
        if card.status == MachineStatus::ToWipe {
            return Err(MoveRejection::NeedsWipe);
        }
        if card.setup_deadline.is_none() {
            return Err(MoveRejection::MissingDeadline);
        }
        Ok(())
    }

    /// A new person takes the desk: every card at the locater that is not
    /// already `Ready` must be wiped. Returns how many cards changed.
    pub fn assign_person_to_locater(&mut self, locater_id: &str, person: &str) -> usize {
        let mut changed = 0;
        for card in self
            .cards
            .iter_mut()
            .filter(|c| c.shares_locater(locater_id))
        {
            if card.status != MachineStatus::Ready && card.status != MachineStatus::ToWipe {
                card.status = MachineStatus::ToWipe;
                changed += 1;
            }
        }
        self.log("AssignPerson", &format!("{} -> {}", person, locater_id));
        changed
    }

    pub fn status_text(&self, status: MachineStatus) -> &'static str {
        status.display_text()
    }
}
