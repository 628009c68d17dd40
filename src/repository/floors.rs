use super::Repository;
use crate::errors::RepoError;
use crate::locater;
use crate::models::{FloorPlan, Seat, Table, clamp_unit};

/// Offset applied to both axes of a duplicated table.
pub const DUPLICATE_OFFSET: f64 = 0.03;

/// Quarter-turn direction for `rotate_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

impl Turn {
    fn degrees(self) -> i32 {
        match self {
            Self::Clockwise => 90,
            Self::CounterClockwise => -90,
        }
    }
}

impl Repository {
    pub fn floor(&self, floor_id: &str) -> Option<&FloorPlan> {
        self.floors.iter().find(|f| f.id == floor_id)
    }

    fn floor_mut(&mut self, floor_id: &str) -> Result<&mut FloorPlan, RepoError> {
        self.floors
            .iter_mut()
            .find(|f| f.id == floor_id)
            .ok_or_else(|| RepoError::FloorNotFound {
                id: floor_id.to_string(),
            })
    }

    fn table_mut(&mut self, floor_id: &str, table_id: &str) -> Option<&mut Table> {
        self.floors
            .iter_mut()
            .find(|f| f.id == floor_id)?
            .table_mut(table_id)
    }

    pub fn add_floor(
        &mut self,
        name: &str,
        company: &str,
        building: &str,
        level: i32,
    ) -> FloorPlan {
        let floor = FloorPlan::new(name, company, building, level);
        self.floors.push(floor.clone());
        self.log("AddFloor", &format!("{} (level {})", floor.name, level));
        floor
    }

    /// `None` clears the background image.
    pub fn set_floor_image(&mut self, floor_id: &str, path: Option<&str>) -> bool {
        let Ok(floor) = self.floor_mut(floor_id) else {
            return false;
        };
        floor.image_path = path.map(str::to_string);
        true
    }

    // ---------- Tables ----------

    /// New table at the default position with the next free `T-NN` id.
    pub fn add_table(&mut self, floor_id: &str, name: &str) -> Result<Table, RepoError> {
        let floor = self.floor_mut(floor_id)?;
        let table = Table::new(&floor.next_table_id(), name);
        floor.tables.push(table.clone());
        self.log("AddTable", &format!("{} on {}", table.id, floor_id));
        Ok(table)
    }

    /// New table with a caller-chosen id, e.g. a locater.
    pub fn add_table_with_id(
        &mut self,
        floor_id: &str,
        table_id: &str,
        name: &str,
    ) -> Result<Table, RepoError> {
        let floor = self.floor_mut(floor_id)?;
        if floor.table(table_id).is_some() {
            return Err(RepoError::DuplicateTable {
                id: table_id.to_string(),
            });
        }
        let table = Table::new(table_id, name);
        floor.tables.push(table.clone());
        self.log("AddTable", &format!("{} on {}", table.id, floor_id));
        Ok(table)
    }

    pub fn rename_table(&mut self, floor_id: &str, table_id: &str, name: &str) -> bool {
        let Some(table) = self.table_mut(floor_id, table_id) else {
            return false;
        };
        table.name = name.to_string();
        true
    }

    /// Store a position clamped into `[0, 1]`.
    pub fn set_table_position(&mut self, floor_id: &str, table_id: &str, x: f64, y: f64) -> bool {
        let Some(table) = self.table_mut(floor_id, table_id) else {
            return false;
        };
        table.set_position(x, y);
        true
    }

    /// Store a size no smaller than 60×40.
    pub fn resize_table(
        &mut self,
        floor_id: &str,
        table_id: &str,
        width: f64,
        height: f64,
    ) -> bool {
        let Some(table) = self.table_mut(floor_id, table_id) else {
            return false;
        };
        table.set_size(width, height);
        true
    }

    /// Rotate by a quarter turn. The angle accumulates without wrapping.
    pub fn rotate_table(&mut self, floor_id: &str, table_id: &str, turn: Turn) -> Option<i32> {
        let table = self.table_mut(floor_id, table_id)?;
        table.rotation += turn.degrees();
        Some(table.rotation)
    }

    /// Copy size, rotation and name into a fresh table offset down-right.
    /// Seats are not copied.
    pub fn duplicate_table(&mut self, floor_id: &str, table_id: &str) -> Option<Table> {
        let floor = self.floor_mut(floor_id).ok()?;
        let source = floor.table(table_id)?;
        let max = 1.0 - DUPLICATE_OFFSET;
        let copy = Table {
            id: floor.next_table_id(),
            name: source.name.clone(),
            x: clamp_unit(source.x + DUPLICATE_OFFSET).min(max),
            y: clamp_unit(source.y + DUPLICATE_OFFSET).min(max),
            width: source.width,
            height: source.height,
            rotation: source.rotation,
            seats: Vec::new(),
        };
        floor.tables.push(copy.clone());
        self.log("DuplicateTable", &format!("{} -> {}", table_id, copy.id));
        Some(copy)
    }

    /// Remove a table together with its seats.
    pub fn remove_table(&mut self, floor_id: &str, table_id: &str) -> bool {
        let Ok(floor) = self.floor_mut(floor_id) else {
            return false;
        };
        let before = floor.tables.len();
        floor.tables.retain(|t| t.id != table_id);
        let removed = floor.tables.len() != before;
        if removed {
            self.log("RemoveTable", &format!("{} on {}", table_id, floor_id));
        }
        removed
    }

    // ---------- Seats ----------

    /// Add a seat; the locater must be `level.room.spot`. It is stored
    /// trimmed but otherwise as typed, so it matches cards by string.
    pub fn add_seat(
        &mut self,
        floor_id: &str,
        table_id: &str,
        locater_id: &str,
        role: &str,
    ) -> Result<Seat, RepoError> {
        let locater_id = locater_id.trim();
        if !locater::is_well_formed(locater_id) {
            return Err(RepoError::InvalidLocater {
                value: locater_id.to_string(),
            });
        }
        let floor = self.floor_mut(floor_id)?;
        let table = floor
            .table_mut(table_id)
            .ok_or_else(|| RepoError::TableNotFound {
                id: table_id.to_string(),
            })?;
        let seat = Seat::new(locater_id, role);
        table.seats.push(seat.clone());
        self.log("AddSeat", &format!("{} at {}", seat.locater_id, table_id));
        Ok(seat)
    }

    pub fn remove_seat(&mut self, floor_id: &str, table_id: &str, seat_id: &str) -> bool {
        let Some(table) = self.table_mut(floor_id, table_id) else {
            return false;
        };
        let before = table.seats.len();
        table.seats.retain(|s| s.id != seat_id);
        table.seats.len() != before
    }

    /// Position relative to the parent table, clamped into `[0, 1]`.
    pub fn set_seat_position(
        &mut self,
        floor_id: &str,
        table_id: &str,
        seat_id: &str,
        x: f64,
        y: f64,
    ) -> bool {
        let Some(seat) = self
            .table_mut(floor_id, table_id)
            .and_then(|t| t.seats.iter_mut().find(|s| s.id == seat_id))
        else {
            return false;
        };
        seat.x = clamp_unit(x);
        seat.y = clamp_unit(y);
        true
    }
}
