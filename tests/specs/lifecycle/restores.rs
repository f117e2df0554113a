//! Cancellation and the guarded ways back out of it.

use crate::prelude::*;

#[tokio::test]
async fn every_live_status_can_cancel() {
    let world = world();
    let staff = TransitionContext::staff("mgr");

    for status in [
        BookingStatus::Pending,
        BookingStatus::PendingDeposit,
        BookingStatus::PaidDeposit,
        BookingStatus::Confirmed,
    ] {
        let booking = world.seed(status, "2024-07-04", "10:00", "12:00");
        let cancelled = world
            .service
            .apply_transition(booking.id, BookingStatus::Cancelled, &staff)
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(!cancelled.is_blocking());
    }
}

#[tokio::test]
async fn finished_bookings_cannot_cancel() {
    let world = world();
    let booking = world.seed(BookingStatus::Finished, "2024-05-01", "10:00", "12:00");

    let staff = TransitionContext::staff("mgr");
    let result = world
        .service
        .apply_transition(booking.id, BookingStatus::Cancelled, &staff)
        .await;
    assert!(matches!(result, Err(LifecycleError::Illegal(_))));
}

#[tokio::test]
async fn cancelled_restores_to_pending_deposit_unconditionally() {
    let world = world();
    let booking = world.seed(BookingStatus::Cancelled, "2024-07-04", "10:00", "12:00");

    let staff = TransitionContext::staff("mgr");
    let restored = world
        .service
        .apply_transition(booking.id, BookingStatus::PendingDeposit, &staff)
        .await
        .unwrap();
    assert_eq!(restored.status, BookingStatus::PendingDeposit);
}

#[tokio::test]
async fn restore_with_deposit_demands_evidence() {
    let world = world();
    let staff = TransitionContext::staff("mgr");

    // Without evidence: refused
    let bare = world.seed(BookingStatus::Cancelled, "2024-07-04", "10:00", "12:00");
    let refused = world
        .service
        .apply_transition(bare.id, BookingStatus::PaidDeposit, &staff)
        .await;
    match refused {
        Err(LifecycleError::Denied { reason, .. }) => {
            assert!(reason.contains("deposit evidence"));
        }
        other => panic!("expected Denied, got {other:?}"),
    }

    // With evidence: restored
    let mut documented = world.seed(BookingStatus::Cancelled, "2024-07-05", "10:00", "12:00");
    documented.deposit_evidence = Some("wire-4411".to_string());
    world.store.seed_booking(documented.clone());
    let restored = world
        .service
        .apply_transition(documented.id, BookingStatus::PaidDeposit, &staff)
        .await
        .unwrap();
    assert_eq!(restored.status, BookingStatus::PaidDeposit);
}

#[tokio::test]
async fn restore_confirmed_rechecks_the_calendar() {
    let world = world();
    let staff = TransitionContext::staff("mgr");
    let booking = world.seed(BookingStatus::Cancelled, "2024-07-04", "10:00", "12:00");

    // The slot was taken while this booking sat cancelled
    world.seed(BookingStatus::Confirmed, "2024-07-04", "09:00", "11:00");
    let refused = world
        .service
        .apply_transition(booking.id, BookingStatus::Confirmed, &staff)
        .await;
    assert!(matches!(refused, Err(LifecycleError::Conflict { .. })));

    // A free slot restores fine
    let free = world.seed(BookingStatus::Cancelled, "2024-07-06", "10:00", "12:00");
    let restored = world
        .service
        .apply_transition(free.id, BookingStatus::Confirmed, &staff)
        .await
        .unwrap();
    assert_eq!(restored.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn reopening_finished_requires_admin_and_force_together() {
    let world = world();

    let cases = [
        (TransitionContext::staff("mgr"), false),
        (TransitionContext::staff("mgr").with_force(), false),
        (TransitionContext::admin("root"), false),
        (TransitionContext::admin("root").with_force(), true),
    ];
    for (ctx, expected_ok) in cases {
        let booking = world.seed(BookingStatus::Finished, "2024-05-01", "10:00", "12:00");
        let result = world
            .service
            .apply_transition(booking.id, BookingStatus::Confirmed, &ctx)
            .await;
        if expected_ok {
            assert_eq!(result.unwrap().status, BookingStatus::Confirmed);
        } else {
            assert!(matches!(result, Err(LifecycleError::Denied { .. })));
        }
    }
}

#[tokio::test]
async fn a_reopened_booking_still_respects_the_calendar() {
    let world = world();
    let booking = world.seed(BookingStatus::Finished, "2024-05-01", "10:00", "12:00");
    world.seed(BookingStatus::Confirmed, "2024-05-01", "10:00", "12:00");

    let admin = TransitionContext::admin("root").with_force();
    let result = world
        .service
        .apply_transition(booking.id, BookingStatus::Confirmed, &admin)
        .await;
    assert!(matches!(result, Err(LifecycleError::Conflict { .. })));
}

#[tokio::test]
async fn cancellation_records_the_reason_for_the_audit_trail() {
    let world = world();
    let booking = world.seed(BookingStatus::Confirmed, "2024-07-04", "10:00", "12:00");

    let ctx = TransitionContext::staff("mgr").with_reason("venue flooded");
    world
        .service
        .apply_transition(booking.id, BookingStatus::Cancelled, &ctx)
        .await
        .unwrap();

    let history = world.service.history(booking.id).await.unwrap();
    assert_eq!(history[0].reason.as_deref(), Some("venue flooded"));
    assert_eq!(history[0].from, Some(BookingStatus::Confirmed));
}
