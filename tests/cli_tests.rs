use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::Path;

mod common;
use common::{init_db_with_car, off, setup_test_db, temp_out};

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    off()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(Path::new(&db_path).exists());

    off()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("init"));
}

#[test]
fn test_session_start_stop_updates_total() {
    let db_path = setup_test_db("cli_start_stop");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "start", "1", "Mario"])
        .assert()
        .success()
        .stdout(contains("Mario working on car #1"));

    off()
        .args(["--db", &db_path, "--user", "mario", "--json", "session", "active", "1"])
        .assert()
        .success()
        .stdout(contains("\"operatorName\": \"Mario\""))
        .stdout(contains("\"endTime\": null"));

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "stop", "1", "Mario"])
        .assert()
        .success()
        .stdout(contains("Mario stopped on car #1 after 0 min"));

    off()
        .args(["--db", &db_path, "--user", "mario", "--json", "car", "show", "1"])
        .assert()
        .success()
        .stdout(contains("\"name\": \"Fiat Panda AB123CD\""))
        .stdout(contains("\"totalHours\": \"0h 0m\""));

    off()
        .args(["--db", &db_path, "--user", "mario", "--json", "session", "list", "1"])
        .assert()
        .success()
        .stdout(contains("\"carId\": 1"))
        .stdout(contains("\"durationMinutes\": 0"));
}

#[test]
fn test_stop_without_session_is_a_no_op() {
    let db_path = setup_test_db("cli_stop_noop");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "stop", "1", "Luigi"])
        .assert()
        .success()
        .stdout(contains("No open session for Luigi on car #1"));

    off()
        .args(["--db", &db_path, "--user", "mario", "--json", "session", "stop", "1", "Luigi"])
        .assert()
        .success()
        .stdout(contains("null"));
}

#[test]
fn test_missing_user_is_rejected() {
    let db_path = setup_test_db("cli_missing_user");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "session", "start", "1", "Mario"])
        .assert()
        .failure()
        .stderr(contains("User not logged in"));

    off()
        .env("OFFICINA_USER", "mario")
        .args(["--db", &db_path, "session", "start", "1", "Mario"])
        .assert()
        .success();
}

#[test]
fn test_unknown_car_and_bad_arguments() {
    let db_path = setup_test_db("cli_unknown_car");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "start", "42", "Mario"])
        .assert()
        .failure()
        .stderr(contains("Not found: car #42"));

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "start", "1", "  "])
        .assert()
        .failure()
        .stderr(contains("Invalid argument"));
}

#[test]
fn test_car_list_and_archive() {
    let db_path = setup_test_db("cli_car_list");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "list"])
        .assert()
        .success()
        .stdout(contains("Fiat Panda AB123CD"))
        .stdout(contains("In lavorazione"));

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "complete", "1"])
        .assert()
        .success();

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "list"])
        .assert()
        .success()
        .stdout(contains("No cars found"));

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "list", "--archive"])
        .assert()
        .success()
        .stdout(contains("Fiat Panda AB123CD").and(contains("Completata")));
}

#[test]
fn test_car_delete_needs_admin() {
    let db_path = setup_test_db("cli_car_del");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "del", "1", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Forbidden"));

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "start", "1", "Mario"])
        .assert()
        .success();

    off()
        .args([
            "--db", &db_path, "--user", "boss", "--role", "admin", "car", "del", "1", "--yes",
        ])
        .assert()
        .failure()
        .stderr(contains("delete refused"));

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "stop", "1", "Mario"])
        .assert()
        .success();

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "add", "--model", "Fiat Uno", "--plate", "ZZ999ZZ"])
        .assert()
        .success();

    off()
        .args([
            "--db", &db_path, "--user", "boss", "--role", "admin", "car", "del", "2", "--yes",
        ])
        .assert()
        .success()
        .stdout(contains("deleted"));
}

#[test]
fn test_export_sessions_csv_and_json() {
    let db_path = setup_test_db("cli_export");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "--user", "mario", "session", "start", "1", "Mario"])
        .assert()
        .success();

    let csv_out = temp_out("cli_export", "csv");
    off()
        .args([
            "--db", &db_path, "--user", "mario", "export", "--format", "csv", "--file", &csv_out,
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&csv_out).expect("read exported csv");
    assert!(content.starts_with("id,car_id,car,operator,start_time,end_time,duration_minutes"));
    assert!(content.contains("Fiat Panda AB123CD"));
    assert!(content.contains("Mario"));

    let json_out = temp_out("cli_export", "json");
    off()
        .args([
            "--db", &db_path, "--user", "mario", "export", "--format", "json", "--file",
            &json_out, "--car", "1",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&json_out).expect("read exported json");
    assert!(content.contains("\"operator\": \"Mario\""));
    assert!(content.contains("\"end_time\": \"\""));
}

#[test]
fn test_backup_plain_and_compressed() {
    let db_path = setup_test_db("cli_backup");
    init_db_with_car(&db_path);

    let out = temp_out("cli_backup", "sqlite");
    off()
        .args(["--db", &db_path, "backup", "--file", &out])
        .assert()
        .success()
        .stdout(contains("Backup created"));
    assert!(Path::new(&out).exists());

    let zipped = temp_out("cli_backup", "zip");
    off()
        .args(["--db", &db_path, "backup", "--file", &out, "--compress", "--force"])
        .assert()
        .success()
        .stdout(contains("Compressed"));
    assert!(Path::new(&zipped).exists());
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("cli_db_info");
    init_db_with_car(&db_path);

    off()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Vehicles:"))
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_no_identity_never_creates_the_database() {
    let db_path = setup_test_db("cli_no_identity");
    let csv_out = temp_out("cli_no_identity", "csv");

    let runs: [&[&str]; 3] = [
        &["session", "start", "1", "Mario"],
        &["car", "list"],
        &["export", "--format", "csv", "--file", csv_out.as_str()],
    ];
    for args in runs {
        off()
            .args(["--db", &db_path])
            .args(args)
            .assert()
            .failure()
            .stderr(contains("not logged in"));
        assert!(!Path::new(&db_path).exists());
    }
    assert!(!Path::new(&csv_out).exists());
}

#[test]
fn test_car_delete_checks_role_before_asking() {
    let db_path = setup_test_db("cli_car_del_prompt");
    init_db_with_car(&db_path);

    // Without --yes, even answering "y": an operator gets no prompt at all
    off()
        .args(["--db", &db_path, "--user", "mario", "car", "del", "1"])
        .write_stdin("y\n")
        .assert()
        .failure()
        .stdout(contains("Delete car").not())
        .stderr(contains("Delete car").not())
        .stderr(contains("Forbidden"));

    off()
        .args(["--db", &db_path, "--user", "mario", "car", "show", "1"])
        .assert()
        .success()
        .stdout(contains("Fiat Panda"));
}

#[test]
fn test_backup_to_zip_name_holds_the_database() {
    let db_path = setup_test_db("cli_backup_zip_name");
    init_db_with_car(&db_path);

    let zipped = temp_out("cli_backup_zip_name", "zip");
    off()
        .args(["--db", &db_path, "backup", "--file", &zipped, "--compress", "--force"])
        .assert()
        .success()
        .stdout(contains("Compressed"));

    let mut archive = zip::ZipArchive::new(fs::File::open(&zipped).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    let entry = archive.by_index(0).unwrap();
    assert_eq!(entry.size(), fs::metadata(&db_path).unwrap().len());
}
