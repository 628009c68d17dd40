use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::PasswordHash;

/// Logical size of the floor design canvas in pixels. Table positions are
/// stored as fractions of this canvas.
pub const DESIGN_CANVAS_WIDTH: f64 = 1200.0;
pub const DESIGN_CANVAS_HEIGHT: f64 = 800.0;

pub const MIN_TABLE_WIDTH: f64 = 60.0;
pub const MIN_TABLE_HEIGHT: f64 = 40.0;
pub const DEFAULT_TABLE_WIDTH: f64 = 260.0;
pub const DEFAULT_TABLE_HEIGHT: f64 = 140.0;
pub const DEFAULT_TABLE_POSITION: f64 = 0.1;

/// Fresh opaque identifier (32 hex chars, no dashes).
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn default_table_width() -> f64 {
    DEFAULT_TABLE_WIDTH
}

fn default_table_height() -> f64 {
    DEFAULT_TABLE_HEIGHT
}

/// Clamp a fractional coordinate into `[0, 1]`. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MachineStatus {
    #[default]
    InStorage,
    Ready,
    InUse,
    ToWipe,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStorage => "InStorage",
            Self::Ready => "Ready",
            Self::InUse => "InUse",
            Self::ToWipe => "ToWipe",
        }
    }

    /// Label shown on the floor plan next to a machine.
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::ToWipe => "To-Wipe",
            Self::Ready => "Ready",
            Self::InUse => "I brug",
            Self::InStorage => "Lager",
        }
    }
}

impl FromStr for MachineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InStorage" => Ok(Self::InStorage),
            "Ready" => Ok(Self::Ready),
            "InUse" => Ok(Self::InUse),
            "ToWipe" => Ok(Self::ToWipe),
            _ => Err(format!("Invalid machine status: {}", s)),
        }
    }
}

/// A trackable machine on the setup board.
///
/// Missing members deserialize to their defaults so one incomplete record
/// does not invalidate the whole document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Card {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub lane_id: String,
    #[serde(default)]
    pub asset_tag: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub person_name: String,
    /// `level.room.spot`, e.g. "0.3.5". Empty when not placed.
    #[serde(default)]
    pub locater_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: MachineStatus,
    #[serde(default)]
    pub setup_deadline: Option<NaiveDate>,
}

impl Card {
    pub fn new(lane_id: &str) -> Self {
        Self {
            id: new_id(),
            lane_id: lane_id.to_string(),
            asset_tag: String::new(),
            serial: String::new(),
            model: String::new(),
            person_name: String::new(),
            locater_id: String::new(),
            role: String::new(),
            status: MachineStatus::InStorage,
            setup_deadline: None,
        }
    }

    pub fn deadline_overdue_on(&self, today: NaiveDate) -> bool {
        self.setup_deadline.is_some_and(|d| d < today)
    }

    pub fn deadline_due_tomorrow_on(&self, today: NaiveDate) -> bool {
        self.setup_deadline
            .is_some_and(|d| today.succ_opt() == Some(d))
    }

    /// Deadline has passed (local calendar day).
    pub fn deadline_overdue(&self) -> bool {
        self.deadline_overdue_on(Local::now().date_naive())
    }

    /// Deadline falls on tomorrow (local calendar day).
    pub fn deadline_due_tomorrow(&self) -> bool {
        self.deadline_due_tomorrow_on(Local::now().date_naive())
    }

    pub fn has_locater(&self) -> bool {
        !self.locater_id.trim().is_empty()
    }

    pub fn shares_locater(&self, locater_id: &str) -> bool {
        self.locater_id.eq_ignore_ascii_case(locater_id)
    }
}

/// Editable card fields, named as the board edit menu names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    AssetTag,
    Model,
    Serial,
    PersonName,
    LocaterId,
    Role,
    Deadline,
    Status,
}

impl CardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssetTag => "AssetTag",
            Self::Model => "Model",
            Self::Serial => "Serial",
            Self::PersonName => "PersonName",
            Self::LocaterId => "LocaterId",
            Self::Role => "Role",
            Self::Deadline => "Deadline",
            Self::Status => "Status",
        }
    }
}

impl FromStr for CardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AssetTag" => Ok(Self::AssetTag),
            "Model" => Ok(Self::Model),
            "Serial" => Ok(Self::Serial),
            "PersonName" => Ok(Self::PersonName),
            "LocaterId" => Ok(Self::LocaterId),
            "Role" => Ok(Self::Role),
            "Deadline" => Ok(Self::Deadline),
            "Status" => Ok(Self::Status),
            _ => Err(format!("Invalid card field: {}", s)),
        }
    }
}

/// A kanban column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BoardLane {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: i32,
}

impl BoardLane {
    pub fn new(title: &str, order: i32) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FloorPlan {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl FloorPlan {
    pub fn new(name: &str, company: &str, building: &str, level: i32) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            company: company.to_string(),
            building: building.to_string(),
            level,
            image_path: None,
            tables: Vec::new(),
        }
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn table_mut(&mut self, table_id: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == table_id)
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.tables.iter().flat_map(|t| t.seats.iter())
    }

    /// Next `T-NN` id not used by any table on this floor.
    pub fn next_table_id(&self) -> String {
        (1..)
            .map(|n| format!("T-{:02}", n))
            .find(|candidate| self.table(candidate).is_none())
            .unwrap_or_else(new_id)
    }
}

/// A desk on a floor plan.
///
/// `x`/`y` are fractions of the design canvas; `width`/`height` are design
/// canvas pixels; `rotation` is in degrees and is not normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_table_width")]
    pub width: f64,
    #[serde(default = "default_table_height")]
    pub height: f64,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl Table {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            x: DEFAULT_TABLE_POSITION,
            y: DEFAULT_TABLE_POSITION,
            width: DEFAULT_TABLE_WIDTH,
            height: DEFAULT_TABLE_HEIGHT,
            rotation: 0,
            seats: Vec::new(),
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = clamp_unit(x);
        self.y = clamp_unit(y);
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(MIN_TABLE_WIDTH);
        self.height = height.max(MIN_TABLE_HEIGHT);
    }

    /// `(left, top, width, height)` in design canvas pixels.
    pub fn canvas_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.x * DESIGN_CANVAS_WIDTH,
            self.y * DESIGN_CANVAS_HEIGHT,
            self.width,
            self.height,
        )
    }
}

/// A seat inside a table. `x`/`y` are fractions of the parent table's box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Seat {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub locater_id: String,
    #[serde(default)]
    pub role: String,
}

impl Seat {
    pub fn new(locater_id: &str, role: &str) -> Self {
        Self {
            id: new_id(),
            x: 0.5,
            y: 0.5,
            locater_id: locater_id.to_string(),
            role: role.to_string(),
        }
    }

    /// Design canvas pixel position, given the parent table (rotation ignored).
    pub fn canvas_point(&self, table: &Table) -> (f64, f64) {
        let (left, top, width, height) = table.canvas_rect();
        (left + self.x * width, top + self.y * height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UserAccount {
    pub username: String,
    pub credential: PasswordHash,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserAccount {
    pub fn matches(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub avatar: Option<String>,
}

/// Replacement fields for an existing account. `password: None` keeps the
/// stored credential.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub password: Option<String>,
    pub is_admin: bool,
    pub avatar: Option<String>,
}

/// Input for creating a card.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub asset_tag: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
}

/// Transient login state. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_user: String,
    pub is_admin: bool,
    pub is_logged_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_machine_status_from_str() {
        assert_eq!("ToWipe".parse::<MachineStatus>(), Ok(MachineStatus::ToWipe));
        assert!("to_wipe".parse::<MachineStatus>().is_err());
    }

    #[test]
    fn test_status_display_text() {
        assert_eq!(MachineStatus::ToWipe.display_text(), "To-Wipe");
        assert_eq!(MachineStatus::Ready.display_text(), "Ready");
        assert_eq!(MachineStatus::InUse.display_text(), "I brug");
        assert_eq!(MachineStatus::InStorage.display_text(), "Lager");
    }

    #[test]
    fn test_card_deadline_flags() {
        let today = day("2026-03-10");
        let mut card = Card::new("lane");
        assert!(!card.deadline_overdue_on(today));
        assert!(!card.deadline_due_tomorrow_on(today));

        card.setup_deadline = Some(day("2026-03-09"));
        assert!(card.deadline_overdue_on(today));
        assert!(!card.deadline_due_tomorrow_on(today));

        card.setup_deadline = Some(day("2026-03-11"));
        assert!(!card.deadline_overdue_on(today));
        assert!(card.deadline_due_tomorrow_on(today));

        card.setup_deadline = Some(today);
        assert!(!card.deadline_overdue_on(today));
        assert!(!card.deadline_due_tomorrow_on(today));
    }

    #[test]
    fn test_card_serializes_with_pascal_case_names() {
        let mut card = Card::new("lane-1");
        card.setup_deadline = Some(day("2026-01-02"));
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["LaneId"], "lane-1");
        assert_eq!(json["Status"], "InStorage");
        assert_eq!(json["SetupDeadline"], "2026-01-02");
    }

    #[test]
    fn test_card_without_role_still_deserializes() {
        let json = r#"{"Id":"c1","LaneId":"l1","AssetTag":"REAL-1","Serial":"S","Model":"iMac",
            "PersonName":"","LocaterId":"0.3.5","Status":"Ready"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.asset_tag, "REAL-1");
        assert_eq!(card.role, "");
        assert_eq!(card.status, MachineStatus::Ready);
        assert_eq!(card.setup_deadline, None);
    }

    #[test]
    fn test_sparse_records_take_defaults() {
        let card: Card = serde_json::from_str(r#"{"AssetTag":"X"}"#).unwrap();
        assert_eq!(card.id.len(), 32);
        assert_eq!(card.status, MachineStatus::InStorage);

        let table: Table = serde_json::from_str(r#"{"Id":"T-04"}"#).unwrap();
        assert_eq!(table.name, "");
        assert_eq!((table.width, table.height), (DEFAULT_TABLE_WIDTH, DEFAULT_TABLE_HEIGHT));

        let floor: FloorPlan = serde_json::from_str(r#"{"Level":2}"#).unwrap();
        assert_eq!(floor.level, 2);
        assert!(floor.name.is_empty() && floor.tables.is_empty());
    }

    #[test]
    fn test_table_position_and_size_clamp() {
        let mut table = Table::new("T-01", "Desk");
        table.set_position(1.4, -0.2);
        assert_eq!((table.x, table.y), (1.0, 0.0));
        table.set_position(f64::NAN, 0.5);
        assert_eq!((table.x, table.y), (0.0, 0.5));

        table.set_size(10.0, 500.0);
        assert_eq!((table.width, table.height), (MIN_TABLE_WIDTH, 500.0));
    }

    #[test]
    fn test_seat_canvas_point_is_relative_to_table() {
        let mut table = Table::new("T-01", "Desk");
        table.set_position(0.5, 0.25);
        table.set_size(200.0, 100.0);
        let mut seat = Seat::new("0.1.1", "Editor");
        seat.x = 0.25;
        seat.y = 1.0;
        let (px, py) = seat.canvas_point(&table);
        assert_eq!(px, 600.0 + 50.0);
        assert_eq!(py, 200.0 + 100.0);
    }

    #[test]
    fn test_next_table_id_skips_used_ids() {
        let mut floor = FloorPlan::new("St.", "Company1", "A", 0);
        assert_eq!(floor.next_table_id(), "T-01");
        floor.tables.push(Table::new("T-01", "a"));
        floor.tables.push(Table::new("T-03", "b"));
        assert_eq!(floor.next_table_id(), "T-02");
    }

    #[test]
    fn test_card_field_round_trips_names() {
        for field in [
            CardField::AssetTag,
            CardField::Model,
            CardField::Serial,
            CardField::PersonName,
            CardField::LocaterId,
            CardField::Role,
            CardField::Deadline,
            CardField::Status,
        ] {
            assert_eq!(field.as_str().parse::<CardField>(), Ok(field));
        }
        assert!("Colour".parse::<CardField>().is_err());
    }
}
