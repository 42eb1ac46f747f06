#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use officina::core::clock::ManualClock;
use officina::core::vehicles::VehicleLogic;
use officina::db::pool::DbPool;
use officina::models::identity::{Identity, Role};
use officina::models::vehicle::{NewVehicle, Vehicle};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Binary under test, isolated from the developer's own config and identity.
pub fn off() -> Command {
    let mut home: PathBuf = env::temp_dir();
    home.push("officina_test_home");
    fs::create_dir_all(&home).ok();

    let mut cmd = cargo_bin_cmd!("officina");
    cmd.env("HOME", &home).env_remove("OFFICINA_USER");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_officina.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize DB and add one car (id 1) through the CLI
pub fn init_db_with_car(db_path: &str) {
    off()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    off()
        .args([
            "--db", db_path, "--user", "mario", "car", "add", "--model", "Fiat Panda", "--plate",
            "AB123CD",
        ])
        .assert()
        .success();
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 19, 8, 0, 0).unwrap()
}

pub fn clock() -> ManualClock {
    ManualClock::new(t0())
}

pub fn mario() -> Identity {
    Identity::new("mario", Role::Operator)
}

pub fn admin() -> Identity {
    Identity::new("alice", Role::Admin)
}

pub fn memory_pool() -> DbPool {
    DbPool::in_memory().expect("in-memory db")
}

pub fn add_car(pool: &mut DbPool, clock: &ManualClock, model: &str, plate: &str) -> Vehicle {
    VehicleLogic::new(clock)
        .create(
            pool,
            Some(&mario()),
            NewVehicle {
                model: model.into(),
                plate: plate.into(),
                ..Default::default()
            },
        )
        .expect("create car")
}
