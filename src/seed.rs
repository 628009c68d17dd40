//! Starter data used when a collection is missing or unreadable.

use chrono::{Days, NaiveDate};

use crate::auth::PasswordHash;
use crate::models::{BoardLane, Card, FloorPlan, MachineStatus, Seat, Table, UserAccount};

pub const SEED_LANE_TITLES: [&str; 5] = ["SetupQueue", "David", "Done", "I brug", "Lager"];

pub fn seed_lanes() -> Vec<BoardLane> {
    SEED_LANE_TITLES
        .iter()
        .zip(0..)
        .map(|(title, order)| BoardLane::new(title, order))
        .collect()
}

/// Starter cards spread across `lanes`. Titles missing from `lanes` fall back
/// to the first lane by order.
pub fn seed_cards(lanes: &[BoardLane], today: NaiveDate) -> Vec<Card> {
    let fallback = lanes
        .iter()
        .min_by_key(|l| l.order)
        .map(|l| l.id.clone())
        .unwrap_or_default();
    let lane = |title: &str| {
        lanes
            .iter()
            .find(|l| l.title == title)
            .map(|l| l.id.clone())
            .unwrap_or_else(|| fallback.clone())
    };
    let card = |lane_title: &str,
                locater: &str,
                asset_tag: &str,
                serial: &str,
                model: &str,
                status: MachineStatus,
                deadline: Option<NaiveDate>| {
        let mut c = Card::new(&lane(lane_title));
        c.locater_id = locater.to_string();
        c.asset_tag = asset_tag.to_string();
        c.serial = serial.to_string();
        c.model = model.to_string();
        c.status = status;
        c.setup_deadline = deadline;
        c
    };

    let mut in_use = card(
        "I brug",
        "0.2.1",
        "IMAC-002",
        "S-002",
        "iMac 27",
        MachineStatus::InUse,
        Some(today),
    );
    in_use.person_name = "Mads".to_string();

    vec![
        card(
            "SetupQueue",
            "0.3.5",
            "IMAC-001",
            "S-001",
            "iMac 24",
            MachineStatus::Ready,
            today.checked_add_days(Days::new(1)),
        ),
        card(
            "David",
            "0.3.5",
            "LAP-101",
            "S-101",
            "MBP 14",
            MachineStatus::ToWipe,
            today.checked_sub_days(Days::new(1)),
        ),
        in_use,
        card(
            "Lager",
            "",
            "IMAC-050",
            "S-050",
            "iMac 24",
            MachineStatus::InStorage,
            None,
        ),
    ]
}

/// One ground-floor plan with a single desk and two seats.
pub fn seed_floors() -> Vec<FloorPlan> {
    let mut floor = FloorPlan::new("St.", "Company1", "A", 0);
    let mut table = Table::new("T-01", "Nyt bord");
    table.set_size(300.0, 160.0);

    let mut cutter = Seat::new("0.3.5", "Cutter");
    cutter.id = "S-01".to_string();
    cutter.x = 0.2;
    cutter.y = 0.5;
    let mut producer = Seat::new("0.2.1", "Producer");
    producer.id = "S-02".to_string();
    producer.x = 0.73;
    producer.y = 0.5;

    table.seats = vec![cutter, producer];
    floor.tables.push(table);
    vec![floor]
}

/// The built-in administrator.
pub fn seed_users(username: &str, password: &str, iterations: u32) -> Vec<UserAccount> {
    vec![UserAccount {
        username: username.to_string(),
        credential: PasswordHash::create(password, iterations),
        is_admin: true,
        avatar: None,
    }]
}
