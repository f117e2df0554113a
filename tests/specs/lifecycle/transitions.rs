//! The forward path: request, accept, deposit, confirm, finish.

use crate::prelude::*;

#[tokio::test]
async fn a_booking_travels_the_whole_happy_path() {
    let world = world();

    let booking = world.request("ada@example.com", "2024-07-04").await;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(booking.token.is_some());

    let staff = TransitionContext::staff("mgr");
    let accepted = world
        .service
        .apply_action(booking.id, Action::Accept, &staff)
        .await
        .unwrap();
    assert_eq!(accepted.status, BookingStatus::PendingDeposit);

    world
        .service
        .record_deposit(booking.id, "wire-881", "mgr")
        .await
        .unwrap();
    world.service.verify_deposit(booking.id, "mgr").await.unwrap();
    let paid = world
        .service
        .apply_transition(booking.id, BookingStatus::PaidDeposit, &staff)
        .await
        .unwrap();
    assert_eq!(paid.status, BookingStatus::PaidDeposit);
    assert!(paid.is_blocking());

    let confirmed = world
        .service
        .apply_action(booking.id, Action::Confirm, &staff)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // The event happens, then staff close it out
    world
        .clock
        .set(Utc.with_ymd_and_hms(2024, 7, 4, 13, 0, 0).unwrap());
    let finished = world
        .service
        .apply_action(booking.id, Action::Finish, &staff)
        .await
        .unwrap();
    assert_eq!(finished.status, BookingStatus::Finished);

    // The audit trail has every hop, oldest first
    let history = world.service.history(booking.id).await.unwrap();
    let hops: Vec<_> = history.iter().map(|r| r.to).collect();
    assert_eq!(
        hops,
        vec![
            BookingStatus::Pending,
            BookingStatus::PendingDeposit,
            BookingStatus::PaidDeposit,
            BookingStatus::Confirmed,
            BookingStatus::Finished,
        ]
    );
    assert_eq!(history[0].from, None);
    assert_eq!(history[4].from, Some(BookingStatus::Confirmed));

    // One notification per applied transition
    world.wait_for_notifications(4).await;
    assert_eq!(world.notifier.call_count(), 4);
}

#[tokio::test]
async fn paid_deposit_to_pending_deposit_is_a_wait_state_not_a_table_violation() {
    let world = world();
    let booking = world.seed(BookingStatus::PaidDeposit, "2024-07-04", "10:00", "12:00");

    let staff = TransitionContext::staff("mgr").with_reason("deposit bounced");
    let back = world
        .service
        .apply_transition(booking.id, BookingStatus::PendingDeposit, &staff)
        .await
        .unwrap();
    assert_eq!(back.status, BookingStatus::PendingDeposit);
    assert!(back.is_blocking());

    let history = world.service.history(booking.id).await.unwrap();
    assert_eq!(history[0].reason.as_deref(), Some("deposit bounced"));
}

#[tokio::test]
async fn same_status_requests_change_nothing() {
    let world = world();
    let booking = world.seed(BookingStatus::Confirmed, "2024-07-04", "10:00", "12:00");

    let staff = TransitionContext::staff("mgr");
    let unchanged = world
        .service
        .apply_transition(booking.id, BookingStatus::Confirmed, &staff)
        .await
        .unwrap();

    assert_eq!(unchanged.updated_at, booking.updated_at);
    assert!(world.service.history(booking.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn edges_outside_the_table_are_rejected_with_the_allowed_set() {
    let world = world();
    let booking = world.seed(BookingStatus::Pending, "2024-07-04", "10:00", "12:00");

    let staff = TransitionContext::staff("mgr");
    for target in [
        BookingStatus::PaidDeposit,
        BookingStatus::Confirmed,
        BookingStatus::Finished,
    ] {
        let result = world.service.apply_transition(booking.id, target, &staff).await;
        match result {
            Err(LifecycleError::Illegal(err)) => {
                assert!(err.allowed.contains("pending_deposit"));
            }
            other => panic!("expected Illegal for {target}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn staff_actions_spend_the_response_token() {
    let world = world();
    let booking = world.request("ada@example.com", "2024-07-04").await;

    let staff = TransitionContext::staff("mgr");
    let accepted = world
        .service
        .apply_action(booking.id, Action::Accept, &staff)
        .await
        .unwrap();
    assert!(accepted.token.is_none());

    let presented = booking.token.unwrap().token;
    let result = world.service.verify_token(booking.id, presented).await;
    assert!(matches!(result, Err(LifecycleError::Validation(_))));
}

#[tokio::test]
async fn a_refused_transition_leaves_no_trace() {
    let world = world();
    world.seed(BookingStatus::Confirmed, "2024-07-04", "10:00", "12:00");
    let booking = world.seed(BookingStatus::PendingDeposit, "2024-07-04", "11:00", "13:00");

    let staff = TransitionContext::staff("mgr");
    let refused = world
        .service
        .apply_transition(booking.id, BookingStatus::Confirmed, &staff)
        .await;
    assert!(matches!(refused, Err(LifecycleError::Conflict { .. })));

    let reloaded = world.service.load(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, BookingStatus::PendingDeposit);
    assert!(world.service.history(booking.id).await.unwrap().is_empty());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(world.notifier.call_count(), 0);
}

#[tokio::test]
async fn proposals_become_canonical_on_accept() {
    let world = world();
    let booking = world.request("ada@example.com", "2024-07-04").await;
    world
        .service
        .propose_schedule(booking.id, &raw("2024-07-10", Some("15:00"), Some("17:00")))
        .await
        .unwrap();

    let staff = TransitionContext::staff("mgr");
    let accepted = world
        .service
        .apply_action(booking.id, Action::Accept, &staff)
        .await
        .unwrap();

    assert_eq!(accepted.schedule.start_date.to_string(), "2024-07-10");
    assert!(accepted.proposed.is_none());
}
