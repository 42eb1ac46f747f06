mod common;
use common::{add_car, admin, clock, memory_pool, mario};

use chrono::Duration;
use officina::config::OnVehicleDelete;
use officina::core::clock::Clock;
use officina::core::tracker::SessionTracker;
use officina::core::vehicles::VehicleLogic;
use officina::db::{sessions, vehicles};
use officina::errors::AppError;
use officina::models::vehicle::{NewVehicle, VehicleFilter, VehiclePatch, VehicleStatus};

#[test]
fn new_car_starts_in_the_workshop() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "  Fiat Panda ", "AB123CD ");

    assert_eq!(car.model, "Fiat Panda");
    assert_eq!(car.plate, "AB123CD");
    assert_eq!(car.display_name(), "Fiat Panda AB123CD");
    assert_eq!(car.status, VehicleStatus::InProgress);
    assert!(!car.photo);
    assert_eq!(car.total_hours, None);
}

#[test]
fn car_needs_model_and_plate() {
    let clock = clock();
    let mut pool = memory_pool();
    let logic = VehicleLogic::new(&clock);

    let res = logic.create(
        &mut pool,
        Some(&mario()),
        NewVehicle {
            model: " ".into(),
            plate: "AB123CD".into(),
            ..Default::default()
        },
    );
    assert!(matches!(res, Err(AppError::InvalidArgument(_))));

    let res = logic.create(&mut pool, None, NewVehicle::default());
    assert!(matches!(res, Err(AppError::Unauthenticated)));
}

#[test]
fn complete_and_restore_move_between_listings() {
    let clock = clock();
    let mut pool = memory_pool();
    let panda = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let _punto = add_car(&mut pool, &clock, "Fiat Punto", "EF456GH");
    let logic = VehicleLogic::new(&clock);
    let op = mario();
    let who = Some(&op);

    let done = logic.complete(&mut pool, who, panda.id).unwrap();
    assert_eq!(done.status, VehicleStatus::Completed);

    let workshop = logic.list(&mut pool, who, VehicleFilter::Workshop).unwrap();
    let archive = logic.list(&mut pool, who, VehicleFilter::Archive).unwrap();
    let all = logic.list(&mut pool, who, VehicleFilter::All).unwrap();
    assert_eq!(workshop.len(), 1);
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].id, panda.id);
    assert_eq!(all.len(), 2);

    logic.restore(&mut pool, who, panda.id).unwrap();
    assert_eq!(logic.list(&mut pool, who, VehicleFilter::Workshop).unwrap().len(), 2);
    assert!(logic.list(&mut pool, who, VehicleFilter::Archive).unwrap().is_empty());
}

#[test]
fn update_changes_only_given_fields() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);

    clock.advance(Duration::hours(1));
    let patch = VehiclePatch {
        note: Some("graffio portiera".into()),
        photo: Some(true),
        ..Default::default()
    };
    let updated = logic.update(&mut pool, Some(&mario()), car.id, &patch).unwrap();

    assert_eq!(updated.model, "Fiat Panda");
    assert_eq!(updated.note.as_deref(), Some("graffio portiera"));
    assert!(updated.photo);
    assert!(updated.updated_at > car.updated_at);

    let reloaded = logic.get(&mut pool, Some(&mario()), car.id).unwrap();
    assert_eq!(reloaded, updated);

    assert!(matches!(
        logic.update(&mut pool, Some(&mario()), car.id, &VehiclePatch::default()),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        logic.update(&mut pool, Some(&mario()), 99, &patch),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn recompute_puts_total_back_in_line() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);
    let tracker = SessionTracker::new(&clock);

    tracker.start(&mut pool, Some(&mario()), car.id, "Mario").unwrap();
    clock.advance(Duration::minutes(75));
    tracker.stop(&mut pool, Some(&mario()), car.id, "Mario").unwrap();

    let patch = VehiclePatch {
        total_hours: Some("99h 0m".into()),
        ..Default::default()
    };
    logic.update(&mut pool, Some(&mario()), car.id, &patch).unwrap();

    let total = logic.recompute_hours(&mut pool, Some(&mario()), car.id).unwrap();
    assert_eq!(total, "1h 15m");
    let car = logic.get(&mut pool, Some(&mario()), car.id).unwrap();
    assert_eq!(car.total_hours.as_deref(), Some("1h 15m"));
}

#[test]
fn only_admin_can_delete() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);

    assert!(matches!(
        logic.delete(&mut pool, Some(&mario()), car.id, OnVehicleDelete::Cascade),
        Err(AppError::Forbidden(_))
    ));

    let deleted = logic
        .delete(&mut pool, Some(&admin()), car.id, OnVehicleDelete::Restrict)
        .unwrap();
    assert_eq!(deleted.id, car.id);
    assert!(matches!(
        logic.get(&mut pool, Some(&mario()), car.id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn restrict_keeps_car_with_sessions() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);
    SessionTracker::new(&clock)
        .start(&mut pool, Some(&mario()), car.id, "Mario")
        .unwrap();

    assert!(matches!(
        logic.delete(&mut pool, Some(&admin()), car.id, OnVehicleDelete::Restrict),
        Err(AppError::InvalidArgument(_))
    ));
    assert!(logic.get(&mut pool, Some(&mario()), car.id).is_ok());
    assert_eq!(sessions::count_for_vehicle(&pool.conn, car.id).unwrap(), 1);
}

#[test]
fn cascade_removes_sessions() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);
    SessionTracker::new(&clock)
        .start(&mut pool, Some(&mario()), car.id, "Mario")
        .unwrap();

    logic
        .delete(&mut pool, Some(&admin()), car.id, OnVehicleDelete::Cascade)
        .unwrap();
    assert_eq!(sessions::count_for_vehicle(&pool.conn, car.id).unwrap(), 0);
}

#[test]
fn orphan_leaves_sessions_behind() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);
    let tracker = SessionTracker::new(&clock);
    tracker.start(&mut pool, Some(&mario()), car.id, "Mario").unwrap();

    logic
        .delete(&mut pool, Some(&admin()), car.id, OnVehicleDelete::Orphan)
        .unwrap();

    let left = tracker.by_vehicle(&mut pool, Some(&mario()), car.id).unwrap();
    assert_eq!(left.len(), 1);
    assert!(matches!(
        tracker.start(&mut pool, Some(&mario()), car.id, "Luigi"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn update_stores_trimmed_model_and_plate() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let logic = VehicleLogic::new(&clock);

    let patch = VehiclePatch {
        model: Some("  Fiat Punto ".into()),
        plate: Some(" ZZ999ZZ".into()),
        ..Default::default()
    };
    let updated = logic.update(&mut pool, Some(&mario()), car.id, &patch).unwrap();
    assert_eq!(updated.model, "Fiat Punto");
    assert_eq!(updated.plate, "ZZ999ZZ");

    let blank = VehiclePatch {
        plate: Some("   ".into()),
        ..Default::default()
    };
    assert!(matches!(
        logic.update(&mut pool, Some(&mario()), car.id, &blank),
        Err(AppError::InvalidArgument(_))
    ));
}

#[test]
fn patch_keeps_total_written_after_the_snapshot() {
    let clock = clock();
    let mut pool = memory_pool();
    let car = add_car(&mut pool, &clock, "Fiat Panda", "AB123CD");
    let tracker = SessionTracker::new(&clock);

    // Snapshot taken before the session closes
    let stale = VehicleLogic::new(&clock).get(&pool, Some(&mario()), car.id).unwrap();
    assert_eq!(stale.total_hours, None);

    tracker.start(&mut pool, Some(&mario()), car.id, "Mario").unwrap();
    clock.advance(Duration::minutes(90));
    tracker.stop(&mut pool, Some(&mario()), car.id, "Mario").unwrap();

    let patch = VehiclePatch {
        note: Some("cliente avvisato".into()),
        ..Default::default()
    };
    vehicles::apply_patch(&pool.conn, stale.id, &patch, clock.now()).unwrap();

    let reloaded = VehicleLogic::new(&clock).get(&pool, Some(&mario()), car.id).unwrap();
    assert_eq!(reloaded.total_hours.as_deref(), Some("1h 30m"));
    assert_eq!(reloaded.note.as_deref(), Some("cliente avvisato"));
    assert_eq!(reloaded.model, stale.model);
}
