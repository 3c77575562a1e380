mod common;

use common::{Call, MemoryStore, Op, seed};
use dynamo_migrate::{
    MigrationDefinition, MigrationError, MigrationFile, MigrationOutcome, SingleMigrationExecutor,
    StoreError, TableNamingPolicy,
};
use std::path::PathBuf;
use std::time::Duration;

fn dev_policy() -> TableNamingPolicy {
    TableNamingPolicy::new("dev_", "", PathBuf::from("dynamodb"))
}

fn users(seeds: usize) -> MigrationDefinition {
    let mut file = MigrationFile::template("Users");
    file.seeds = (0..seeds).map(|i| seed(&format!("u{i}"))).collect();
    file.into()
}

#[tokio::test]
async fn second_run_without_force_is_skipped() {
    let store = MemoryStore::new();
    let executor = SingleMigrationExecutor::new(&store);

    let first = executor
        .apply(&mut users(2), &dev_policy(), false)
        .await
        .unwrap();
    assert_eq!(
        first,
        MigrationOutcome::Created {
            table: "dev_Users".to_string(),
            seeded: 2
        }
    );

    let second = executor
        .apply(&mut users(2), &dev_policy(), false)
        .await
        .unwrap();
    assert_eq!(
        second,
        MigrationOutcome::Skipped {
            table: "dev_Users".to_string()
        }
    );

    // Skipped runs never seed again.
    assert_eq!(store.items("dev_Users").len(), 2);
    assert_eq!(
        store.calls(),
        vec![
            Call::Create("dev_Users".to_string()),
            Call::Seed("dev_Users".to_string()),
            Call::Create("dev_Users".to_string()),
        ]
    );
}

#[tokio::test]
async fn force_deletes_then_creates_then_seeds() {
    let store = MemoryStore::new().with_table("dev_Users");
    let executor = SingleMigrationExecutor::new(&store);

    let outcome = executor
        .apply(&mut users(1), &dev_policy(), true)
        .await
        .unwrap();

    assert!(matches!(outcome, MigrationOutcome::Created { seeded: 1, .. }));
    assert_eq!(
        store.calls(),
        vec![
            Call::Delete("dev_Users".to_string()),
            Call::Create("dev_Users".to_string()),
            Call::Seed("dev_Users".to_string()),
        ]
    );
}

#[tokio::test]
async fn force_on_missing_table_still_creates() {
    let store = MemoryStore::new();
    let executor = SingleMigrationExecutor::new(&store);

    let outcome = executor
        .apply(&mut users(1), &dev_policy(), true)
        .await
        .unwrap();

    assert!(matches!(outcome, MigrationOutcome::Created { .. }));
    assert!(store.has_table("dev_Users"));
    assert_eq!(store.calls()[0], Call::Delete("dev_Users".to_string()));
}

#[tokio::test]
async fn delete_failure_stops_before_create() {
    let store = MemoryStore::new().with_table("dev_Users").fail(
        Op::Delete,
        "dev_Users",
        vec![StoreError::AccessDenied("no".to_string())],
    );
    let executor = SingleMigrationExecutor::new(&store);

    let err = executor
        .apply(&mut users(1), &dev_policy(), true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Store {
            source: StoreError::AccessDenied(_),
            ..
        }
    ));
    assert_eq!(store.calls(), vec![Call::Delete("dev_Users".to_string())]);
}

#[tokio::test]
async fn create_failure_is_fatal() {
    let store = MemoryStore::new().fail(
        Op::Create,
        "dev_Users",
        vec![StoreError::Throttled("busy".to_string())],
    );
    let executor = SingleMigrationExecutor::new(&store);

    let err = executor
        .apply(&mut users(1), &dev_policy(), false)
        .await
        .unwrap_err();

    match err {
        MigrationError::Store { table, source } => {
            assert_eq!(table, "dev_Users");
            assert_eq!(source, StoreError::Throttled("busy".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.calls(), vec![Call::Create("dev_Users".to_string())]);
}

#[tokio::test]
async fn no_seeds_means_no_seed_write() {
    let store = MemoryStore::new();
    let executor = SingleMigrationExecutor::new(&store);

    let outcome = executor
        .apply(&mut users(0), &dev_policy(), false)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Created {
            table: "dev_Users".to_string(),
            seeded: 0
        }
    );
    assert_eq!(store.calls(), vec![Call::Create("dev_Users".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn seed_retries_until_the_table_is_visible() {
    let not_found = || StoreError::NotFound("dev_Users".to_string());
    let store = MemoryStore::new().fail(Op::Seed, "dev_Users", vec![not_found(), not_found()]);
    let executor = SingleMigrationExecutor::new(&store);

    let outcome = executor
        .apply(&mut users(3), &dev_policy(), false)
        .await
        .unwrap();

    assert!(matches!(outcome, MigrationOutcome::Created { seeded: 3, .. }));
    assert_eq!(store.items("dev_Users").len(), 3);

    let times = store.seed_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_millis(1000));
    assert_eq!(times[2] - times[1], Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn seed_gives_up_after_six_attempts() {
    let store = MemoryStore::new().never_ready("dev_Users");
    let executor = SingleMigrationExecutor::new(&store);

    let err = executor
        .apply(&mut users(1), &dev_policy(), false)
        .await
        .unwrap_err();

    match err {
        MigrationError::SeedTimeout { table, attempts } => {
            assert_eq!(table, "dev_Users");
            assert_eq!(attempts, 6);
        }
        other => panic!("unexpected error: {other}"),
    }

    let times = store.seed_times();
    assert_eq!(times.len(), 6);
    let gaps: Vec<u64> = times
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis() as u64)
        .collect();
    assert_eq!(gaps, vec![1000, 2000, 3000, 4000, 5000]);

    // Table stays in place, unseeded.
    assert!(store.has_table("dev_Users"));
    assert!(store.items("dev_Users").is_empty());
}

#[tokio::test(start_paused = true)]
async fn non_not_found_seed_error_is_not_retried() {
    let store = MemoryStore::new().fail(
        Op::Seed,
        "dev_Users",
        vec![StoreError::Validation("bad item".to_string())],
    );
    let executor = SingleMigrationExecutor::new(&store);

    let err = executor
        .apply(&mut users(1), &dev_policy(), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Store {
            source: StoreError::Validation(_),
            ..
        }
    ));
    assert_eq!(store.seed_times().len(), 1);
}

#[tokio::test]
async fn table_name_is_decorated_once() {
    let store = MemoryStore::new();
    let executor = SingleMigrationExecutor::new(&store);
    let mut migration = users(0);

    executor
        .apply(&mut migration, &dev_policy(), false)
        .await
        .unwrap();
    executor
        .apply(&mut migration, &dev_policy(), true)
        .await
        .unwrap();

    assert_eq!(migration.table_name(), "dev_Users");
    assert!(
        store
            .calls()
            .iter()
            .all(|call| !format!("{call:?}").contains("dev_dev_"))
    );
}
