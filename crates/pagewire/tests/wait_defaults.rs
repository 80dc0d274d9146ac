//! Process-wide wait defaults.
//!
//! Lives in its own test binary, as a single test, because it changes the
//! global timeout that every `should` without an explicit timeout uses.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::{Duration, Instant};

use pagewire::mock::MockPage;
use pagewire::prelude::*;
use pagewire::wait::{default_poll_interval, default_timeout};

#[derive(Composite)]
struct LoginForm {
    username: Wired<TextField>,
}

#[test]
fn global_defaults_drive_should() {
    assert_eq!(default_timeout(), Duration::from_millis(4_000));
    assert_eq!(default_poll_interval(), Duration::from_millis(100));

    set_default_timeout(Duration::from_millis(300));
    set_default_poll_interval(Duration::from_millis(20));

    let page = MockPage::new();
    let form: LoginForm = page.session().resolve_composite();
    assert_eq!(
        form.username.locator(),
        &chain([LocatorStep::stable_id("username")]).unwrap()
    );

    let start = Instant::now();
    let err = form.username.should(&visible()).unwrap_err();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(300), "gave up early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_000), "overshot: {elapsed:?}");
    match err {
        PagewireError::ConditionTimeout {
            timeout_ms,
            last_observed,
            ..
        } => {
            assert_eq!(timeout_ms, 300);
            assert_eq!(last_observed, LastObserved::Evaluated(false));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    // Polled repeatedly, not once
    assert!(page.call_count("find_all:") > 2);

    EngineConfig::default()
        .with_timeout_ms(1_500)
        .with_poll_interval_ms(50)
        .install();
    assert_eq!(WaitOptions::default().timeout(), Duration::from_millis(1_500));
    assert_eq!(WaitOptions::default().poll_interval(), Duration::from_millis(50));
}
