use officina::db::initialize::init_db;
use officina::db::log::load_log;
use officina::db::sessions;
use officina::errors::AppError;
use rusqlite::Connection;

fn legacy_db(sessions_sql: &str) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE Cars (
            id INTEGER PRIMARY KEY, model TEXT, plate TEXT, status TEXT,
            lavorazioni TEXT, note TEXT, photo INTEGER,
            partialHours TEXT, totalHours TEXT, createdAt TEXT, updatedAt TEXT
        );
        INSERT INTO Cars VALUES
            (7, 'Fiat Panda', 'AB123CD', 'in_progress', 'tagliando', NULL, 0,
             NULL, '01:30', '2025-10-18 08:00:00.000 +00:00', '2025-10-18 09:30:00.000 +00:00');
        "#,
    )
    .unwrap();
    conn.execute_batch(sessions_sql).unwrap();
    conn
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn legacy_import_skips_incomplete_sessions() {
    let conn = legacy_db(
        r#"
        CREATE TABLE WorkSessions (
            id INTEGER PRIMARY KEY, carId INTEGER, operatorName TEXT,
            startTime TEXT, endTime TEXT, durationMinutes INTEGER
        );
        INSERT INTO WorkSessions VALUES
            (1, 7, 'Mario', '2025-10-18 08:00:00.000 +00:00', '2025-10-18 09:30:00.000 +00:00', 90),
            (2, 7, NULL, '2025-10-18 10:00:00.000 +00:00', NULL, NULL),
            (3, 7, 'Luigi', '2025-10-18 11:00:00.000 +00:00', NULL, NULL);
        "#,
    );

    init_db(&conn).unwrap();

    assert_eq!(count(&conn, "vehicles"), 1);
    assert_eq!(count(&conn, "work_sessions"), 2);

    let closed = sessions::find_session(&conn, 1).unwrap().unwrap();
    assert_eq!(closed.vehicle_id, 7);
    assert_eq!(closed.duration_minutes, Some(90));
    assert!(sessions::find_session(&conn, 2).unwrap().is_none());
    assert!(sessions::find_session(&conn, 3).unwrap().unwrap().is_open());

    let log = load_log(&conn).unwrap();
    assert!(log.iter().any(|e| e.operation == "migration_applied"
        && e.target == "20251019_0001_import_legacy_tables"
        && e.message.contains("1 skipped")));

    // Second open: already applied, nothing imported twice
    init_db(&conn).unwrap();
    assert_eq!(count(&conn, "work_sessions"), 2);
}

#[test]
fn failed_legacy_import_leaves_nothing_behind() {
    // No durationMinutes column: the session read fails after the cars are in
    let conn = legacy_db(
        r#"
        CREATE TABLE WorkSessions (
            id INTEGER PRIMARY KEY, carId INTEGER, operatorName TEXT,
            startTime TEXT, endTime TEXT
        );
        INSERT INTO WorkSessions VALUES
            (1, 7, 'Mario', '2025-10-18 08:00:00.000 +00:00', NULL);
        "#,
    );

    assert!(init_db(&conn).is_err());
    assert_eq!(count(&conn, "vehicles"), 0);
    assert_eq!(count(&conn, "work_sessions"), 0);

    let log = load_log(&conn).unwrap();
    assert!(!log.iter().any(|e| e.operation == "migration_applied"));
}

#[test]
fn open_session_guard_refuses_duplicates() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE work_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT, vehicle_id INTEGER NOT NULL,
            operator_name TEXT NOT NULL, start_time TEXT NOT NULL,
            end_time TEXT, duration_minutes INTEGER
        );
        INSERT INTO work_sessions (vehicle_id, operator_name, start_time) VALUES
            (1, 'Mario', '2025-10-19T08:00:00.000Z'),
            (1, 'Mario', '2025-10-19T09:00:00.000Z');
        "#,
    )
    .unwrap();

    assert!(matches!(init_db(&conn), Err(AppError::Migration(_))));

    // Once one of them is closed the guard goes in
    conn.execute(
        "UPDATE work_sessions SET end_time = '2025-10-19T08:30:00.000Z', duration_minutes = 30 WHERE id = 1",
        [],
    )
    .unwrap();
    init_db(&conn).unwrap();

    let index: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'ux_work_sessions_open'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index, 1);
}
