//! Integration tests for the planify CLI
//!
//! Each test gets its own data directory and a planify.toml with a cheap
//! iteration count so password hashing stays fast.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("planify.toml"),
            "[lock]\ntimeout_ms = 200\n\n[auth]\npbkdf2_iterations = 1000\n",
        )
        .unwrap();
        Self { dir }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("planify.toml")
    }

    /// Command with `--config` and `--data-dir` pointing into the workspace.
    fn planify(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("planify");
        cmd.env_remove("PLANIFY_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config())
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    fn init(&self) {
        self.planify().arg("init").assert().success();
    }

    fn card_id(&self, asset_tag: &str) -> String {
        card_id_in(&self.data_dir(), asset_tag)
    }
}

fn card_id_in(data_dir: &Path, asset_tag: &str) -> String {
    let raw = fs::read_to_string(data_dir.join("cards.json")).unwrap();
    let cards: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    cards
        .iter()
        .find(|c| c["AssetTag"] == asset_tag)
        .and_then(|c| c["Id"].as_str())
        .unwrap()
        .to_string()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_planify_help() {
        cargo_bin_cmd!("planify").arg("--help").assert().success();
    }

    #[test]
    fn test_planify_version() {
        cargo_bin_cmd!("planify")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("planify"));
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        cargo_bin_cmd!("planify").arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Init / Board / Floors
// =============================================================================

mod data_directory {
    use super::*;

    #[test]
    fn test_init_writes_seed_documents() {
        let ws = Workspace::new();

        ws.planify()
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Data directory"))
            .stdout(predicate::str::contains("seeded (missing)"));

        for name in ["cards", "lanes", "floors", "users"] {
            assert!(ws.data_dir().join(format!("{name}.json")).exists());
        }
    }

    #[test]
    fn test_second_init_loads_existing_documents() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("loaded"))
            .stdout(predicate::str::contains("seeded").not());
    }

    #[test]
    fn test_init_reports_corrupt_document() {
        let ws = Workspace::new();
        ws.init();
        fs::write(ws.data_dir().join("floors.json"), "{ broken").unwrap();

        ws.planify()
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("seeded (corrupt"));
    }

    #[test]
    fn test_board_lists_seeded_lanes_and_cards() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .arg("board")
            .assert()
            .success()
            .stdout(predicate::str::contains("SetupQueue"))
            .stdout(predicate::str::contains("I brug"))
            .stdout(predicate::str::contains("IMAC-001"))
            .stdout(predicate::str::contains("[overdue]"));
    }

    #[test]
    fn test_floors_lists_tables_and_seats() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .arg("floors")
            .assert()
            .success()
            .stdout(predicate::str::contains("T-01"))
            .stdout(predicate::str::contains("0.3.5"))
            .stdout(predicate::str::contains("Producer"));
    }

    #[test]
    fn test_data_dir_from_environment() {
        let ws = Workspace::new();
        let env_dir = ws.dir.path().join("from-env");

        cargo_bin_cmd!("planify")
            .env("PLANIFY_DATA_DIR", &env_dir)
            .arg("--config")
            .arg(ws.config())
            .arg("init")
            .assert()
            .success();

        assert!(env_dir.join("lanes.json").exists());
    }
}

// =============================================================================
// Move-to-in-use check
// =============================================================================

mod check {
    use super::*;

    #[test]
    fn test_check_reports_first_failed_precondition() {
        let ws = Workspace::new();
        ws.init();
        let id = ws.card_id("IMAC-050");

        ws.planify()
            .args(["check", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("Locater id is missing"));
    }

    #[test]
    fn test_check_needs_wipe() {
        let ws = Workspace::new();
        ws.init();
        let id = ws.card_id("LAP-101");

        ws.planify()
            .args(["check", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("Machine must be wiped first"));
    }

    #[test]
    fn test_check_other_level_rejects_locater() {
        let ws = Workspace::new();
        ws.init();
        let id = ws.card_id("IMAC-001");

        ws.planify()
            .args(["check", &id, "--level", "3"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Locater id does not exist on this level",
            ));
    }

    #[test]
    fn test_check_unknown_card_fails() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .args(["check", "no-such-card"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }
}

// =============================================================================
// Accounts
// =============================================================================

mod accounts {
    use super::*;

    #[test]
    fn test_login_with_built_in_admin() {
        let ws = Workspace::new();

        ws.planify()
            .args(["login", "ADMIN", "--password", "admin"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed in as admin (admin)"));
    }

    #[test]
    fn test_login_wrong_password_fails() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .args(["login", "admin", "--password", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Login failed"));
    }

    #[test]
    fn test_create_list_login_remove_user() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .args(["users", "create", "mads", "--password", "desk42"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created user mads"));

        ws.planify()
            .args(["users", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mads"));

        let users = fs::read_to_string(ws.data_dir().join("users.json")).unwrap();
        assert!(!users.contains("desk42"));

        ws.planify()
            .args(["login", "mads", "--password", "desk42"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed in as mads"))
            .stdout(predicate::str::contains("(admin)").not());

        ws.planify()
            .args(["users", "remove", "MADS"])
            .assert()
            .success();

        ws.planify()
            .args(["login", "mads", "--password", "desk42"])
            .assert()
            .failure();
    }

    #[test]
    fn test_create_duplicate_user_fails() {
        let ws = Workspace::new();
        ws.init();

        ws.planify()
            .args(["users", "create", "Admin", "--password", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_mutations_are_audited() {
        let ws = Workspace::new();
        ws.init();
        ws.planify()
            .args(["users", "create", "lis", "--password", "pw"])
            .assert()
            .success();

        let audit = fs::read_to_string(ws.data_dir().join("audit.log")).unwrap();
        assert!(audit.lines().any(|l| l.contains("\tCreateUser\tlis")));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_validate_warns_on_weak_iterations() {
        let ws = Workspace::new();

        ws.planify()
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pbkdf2_iterations"));
    }

    #[test]
    fn test_config_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("planify.toml");

        cargo_bin_cmd!("planify")
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[lock]"));
        assert!(content.contains("timeout_ms = 1000"));
    }

    #[test]
    fn test_config_show_uses_cli_data_dir() {
        let ws = Workspace::new();

        ws.planify()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("lock.timeout_ms   = 200"))
            .stdout(predicate::str::contains("pbkdf2_iterations = 1000"));
    }
}
