use standsip_core::db::open_db_in_memory;
use standsip_core::{Category, Clock, FixedClock, HistoryService, LogStore, SqliteLogRepository};
use std::sync::Arc;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const MINUTE_MS: i64 = 60 * 1000;

fn clock_at_noon() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(2026, 6, 15, 12, 0).unwrap())
}

#[test]
fn append_assigns_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLogRepository::with_clock(&conn, clock_at_noon());

    let first = repo.append(Category::Stand, 1_000).unwrap();
    let second = repo.append(Category::Stand, 2_000).unwrap();
    assert!(second > first);
}

#[test]
fn count_today_ignores_other_days_and_categories() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock_at_noon();
    let repo = SqliteLogRepository::with_clock(&conn, clock.clone());
    let now_ms = clock.now().timestamp_millis();

    repo.append(Category::Water, now_ms).unwrap();
    repo.append(Category::Water, now_ms - 3 * 60 * MINUTE_MS).unwrap();
    repo.append(Category::Water, now_ms - DAY_MS).unwrap();
    repo.append(Category::Stand, now_ms).unwrap();

    assert_eq!(repo.count_today(Category::Water).unwrap(), 2);
    assert_eq!(repo.count_today(Category::Stand).unwrap(), 1);
    assert_eq!(repo.count_today(Category::Bathroom).unwrap(), 0);

    let yesterday = clock.now().date_naive().pred_opt().unwrap();
    assert_eq!(repo.count_on_day(Category::Water, yesterday).unwrap(), 1);
}

#[test]
fn delete_latest_today_removes_only_the_newest_row() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock_at_noon();
    let repo = SqliteLogRepository::with_clock(&conn, clock.clone());
    let now_ms = clock.now().timestamp_millis();

    let older = repo.append(Category::Bathroom, now_ms - 30 * MINUTE_MS).unwrap();
    let newer = repo.append(Category::Bathroom, now_ms).unwrap();

    assert!(repo.delete_latest_today(Category::Bathroom).unwrap());

    let remaining = repo.list_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, older);
    assert_ne!(remaining[0].id, newer);
}

#[test]
fn delete_latest_today_leaves_earlier_days_alone() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock_at_noon();
    let repo = SqliteLogRepository::with_clock(&conn, clock.clone());
    repo.append(Category::Stand, clock.now().timestamp_millis() - DAY_MS)
        .unwrap();

    assert!(!repo.delete_latest_today(Category::Stand).unwrap());
    assert_eq!(repo.list_all().unwrap().len(), 1);
}

#[test]
fn counts_follow_the_clock_across_midnight() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::at(2026, 6, 15, 23, 50).unwrap());
    let repo = SqliteLogRepository::with_clock(&conn, clock.clone());
    repo.append(Category::Water, clock.now().timestamp_millis())
        .unwrap();
    assert_eq!(repo.count_today(Category::Water).unwrap(), 1);

    clock.advance_minutes(20);
    assert_eq!(repo.count_today(Category::Water).unwrap(), 0);
}

#[test]
fn list_all_orders_by_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLogRepository::with_clock(&conn, clock_at_noon());

    repo.append(Category::Water, 3_000).unwrap();
    repo.append(Category::Stand, 1_000).unwrap();
    repo.append(Category::Bathroom, 2_000).unwrap();

    let order = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|entry| (entry.category, entry.timestamp_ms))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            (Category::Stand, 1_000),
            (Category::Bathroom, 2_000),
            (Category::Water, 3_000)
        ]
    );
}

#[test]
fn history_lists_newest_first_with_labels() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock_at_noon();
    let now_ms = clock.now().timestamp_millis();
    let repo = SqliteLogRepository::with_clock(&conn, clock.clone());
    repo.append(Category::Stand, now_ms - 60 * MINUTE_MS).unwrap();
    repo.append(Category::Water, now_ms).unwrap();

    let history = HistoryService::new(repo).history().unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].entry.category, Category::Water);
    assert_eq!(history[0].when, "15 Jun 2026 • 12:00");
    assert_eq!(history[1].label, Category::Stand.label());
    assert_eq!(history[1].when, "15 Jun 2026 • 11:00");
}

#[test]
fn today_counts_cover_every_category() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock_at_noon();
    let now_ms = clock.now().timestamp_millis();
    let repo = SqliteLogRepository::with_clock(&conn, clock);
    repo.append(Category::Stand, now_ms).unwrap();
    repo.append(Category::Stand, now_ms).unwrap();
    repo.append(Category::Bathroom, now_ms).unwrap();

    let counts = HistoryService::new(repo).today_counts().unwrap();

    assert_eq!(counts.stand, 2);
    assert_eq!(counts.water, 0);
    assert_eq!(counts.bathroom, 1);
}
