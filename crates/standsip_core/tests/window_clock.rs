use standsip_core::{is_in_window, next_delay_minutes, Settings};

const MINUTES_PER_DAY: u32 = 24 * 60;

fn configs() -> Vec<Settings> {
    [
        (480, 1200, 60),
        (480, 1200, 45),
        (540, 1020, 15),
        (1320, 360, 120),
        (1380, 60, 25),
        (600, 600, 50),
        (0, 1439, 90),
    ]
    .into_iter()
    .map(|(start, end, interval)| Settings::new(start, end, interval).unwrap())
    .collect()
}

fn reference_in_window(now: u32, settings: &Settings) -> bool {
    let (start, end) = (settings.start_minute, settings.end_minute);
    match start.cmp(&end) {
        std::cmp::Ordering::Equal => true,
        std::cmp::Ordering::Less => (start..end).contains(&now),
        std::cmp::Ordering::Greater => now >= start || now < end,
    }
}

#[test]
fn daytime_window_before_first_slot() {
    assert_eq!(next_delay_minutes(500, &Settings::default()), 40);
}

#[test]
fn daytime_window_after_end_waits_for_tomorrow() {
    assert_eq!(next_delay_minutes(1250, &Settings::default()), 670);
}

#[test]
fn overnight_window_after_midnight_counts_from_todays_start() {
    let settings = Settings::new(1320, 360, 120).unwrap();
    assert!(is_in_window(30, &settings));
    assert_eq!(next_delay_minutes(30, &settings), 210);
}

#[test]
fn overnight_window_on_a_slot_waits_one_interval() {
    let settings = Settings::new(1320, 360, 120).unwrap();
    assert_eq!(next_delay_minutes(120, &settings), 120);
    assert_eq!(next_delay_minutes(1330, &settings), 110);
}

#[test]
fn window_membership_matches_reference_for_every_minute() {
    for settings in configs() {
        for now in 0..MINUTES_PER_DAY {
            assert_eq!(
                is_in_window(now, &settings),
                reference_in_window(now, &settings),
                "now={now} settings={settings:?}"
            );
        }
    }
}

#[test]
fn delays_are_positive_and_land_on_slots() {
    for settings in configs() {
        let step = settings.interval_minute;
        for now in 0..MINUTES_PER_DAY {
            let delay = next_delay_minutes(now, &settings);
            assert!(delay > 0, "now={now} settings={settings:?}");

            if is_in_window(now, &settings) {
                let landed = i64::from(now + delay) - i64::from(settings.start_minute);
                assert!(delay < 2 * step, "now={now} settings={settings:?}");
                assert_eq!(landed % i64::from(step), 0, "now={now} settings={settings:?}");
                if now >= settings.start_minute {
                    assert!(delay <= step, "now={now} settings={settings:?}");
                }
            } else {
                assert_eq!(
                    (now + delay) % MINUTES_PER_DAY,
                    settings.start_minute,
                    "now={now} settings={settings:?}"
                );
            }
        }
    }
}

#[test]
fn repeated_calls_are_stable() {
    let settings = Settings::new(1320, 360, 120).unwrap();
    for now in [0, 359, 360, 1319, 1320, 1439] {
        assert_eq!(
            next_delay_minutes(now, &settings),
            next_delay_minutes(now, &settings)
        );
    }
}

#[test]
fn short_intervals_are_clamped_in_window_math() {
    let unvalidated = Settings {
        start_minute: 480,
        end_minute: 1200,
        interval_minute: 1,
    };
    assert_eq!(next_delay_minutes(481, &unvalidated), 14);
}
