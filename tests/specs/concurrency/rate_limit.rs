//! Admission limits hold under concurrency and roll over with the window.

use crate::prelude::*;

#[tokio::test]
async fn concurrent_requests_admit_at_most_the_limit() {
    let world = world();

    // for_testing() allows 3 per identity per window
    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = world.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_request(NewBookingRequest {
                    contact: contact(),
                    schedule: raw("2024-07-04", None, None),
                    identity: "ada@example.com".to_string(),
                })
                .await
        }));
    }

    let mut admitted = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(LifecycleError::RateLimited { .. }) => limited += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(admitted, 3);
    assert_eq!(limited, 7);
    assert_eq!(world.store.booking_count(), 3);
}

#[tokio::test]
async fn the_window_rolls_over_and_purges() {
    let world = world();
    for _ in 0..3 {
        world.request("ada@example.com", "2024-07-04").await;
    }
    let denied = world
        .service
        .create_request(NewBookingRequest {
            contact: contact(),
            schedule: raw("2024-07-04", None, None),
            identity: "ada@example.com".to_string(),
        })
        .await;
    let reset_at = match denied {
        Err(LifecycleError::RateLimited { reset_at }) => reset_at,
        other => panic!("expected RateLimited, got {other:?}"),
    };
    assert_eq!(reset_at, Utc.with_ymd_and_hms(2024, 6, 1, 12, 1, 0).unwrap());

    world.clock.advance(Duration::from_secs(60));
    world.request("ada@example.com", "2024-07-05").await;

    // The old window's bucket is now purgeable
    assert_eq!(world.service.purge_rate_buckets().await.unwrap(), 1);
}

#[tokio::test]
async fn separate_identities_never_starve_each_other() {
    let world = world();
    for _ in 0..3 {
        world.request("ada@example.com", "2024-07-04").await;
    }
    let other = world.request("grace@example.com", "2024-07-04").await;
    assert_eq!(other.status, BookingStatus::Pending);
}

#[tokio::test]
async fn a_store_outage_admits_instead_of_refusing() {
    let world = world();
    world.store.fail_next_increment(1);

    let booking = world.request("ada@example.com", "2024-07-04").await;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(world.telemetry.rate_limit_bypasses(), 1);
}
