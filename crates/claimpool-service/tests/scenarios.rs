//! End-to-end engine scenarios over the in-memory stores.

mod common;

use chrono::Duration;

use claimpool_entity::{ReleaseReason, ReservationStatus, UnitStatus};
use claimpool_service::{ReservationError, ReservationTarget};

use common::{Harness, holder};

#[tokio::test]
async fn test_first_allocation_gets_lowest_unit_and_is_reentrant() {
    let h = Harness::with_units(3).await;
    let h1 = holder("stake1h1");

    let first = h.engine.allocate(&h1).await.unwrap();
    assert!(!first.is_existing);
    assert_eq!(first.unit.ordinal, 1);
    assert_eq!(first.unit.status, UnitStatus::Reserved);
    assert_eq!(first.reservation.expires_at, h.now() + Duration::minutes(20));

    let again = h.engine.allocate(&h1).await.unwrap();
    assert!(again.is_existing);
    assert_eq!(again.reservation.id, first.reservation.id);
    assert_eq!(again.unit.ordinal, 1);

    let history = h.engine.holder_history(&h1).await.unwrap();
    assert_eq!(history.len(), 1);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_second_holder_gets_next_unit() {
    let h = Harness::with_units(3).await;
    h.engine.allocate(&holder("stake1h1")).await.unwrap();

    let second = h.engine.allocate(&holder("stake1h2")).await.unwrap();
    assert_eq!(second.unit.ordinal, 2);
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_open_payment_window_survives_sweep_until_closed() {
    let h = Harness::with_units(3).await;
    let allocation = h.engine.allocate(&holder("stake1h1")).await.unwrap();
    let id = allocation.reservation.id;
    h.engine.mark_payment_window_opened(id).await.unwrap();

    let at_deadline = allocation.reservation.reserved_at + Duration::minutes(20) + Duration::seconds(5);
    assert_eq!(h.engine.sweep(at_deadline).await.unwrap(), 0);
    let much_later = at_deadline + Duration::hours(6);
    let report = h.engine.sweep_report(much_later).await.unwrap();
    assert_eq!(report.expired, 0);
    assert_eq!(report.skipped_payment_window, 1);
    assert_eq!(h.reservation(id).await.status, ReservationStatus::Active);

    h.engine.mark_payment_window_closed(id).await.unwrap();
    assert_eq!(h.engine.sweep(much_later).await.unwrap(), 1);

    let reservation = h.reservation(id).await;
    assert_eq!(reservation.status, ReservationStatus::Expired);
    assert_eq!(reservation.expires_at, allocation.reservation.expires_at);
    let unit = h.unit(1).await;
    assert_eq!(unit.status, UnitStatus::Available);
    assert!(unit.reservation_id.is_none());
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_completed_holder_cannot_allocate_again() {
    let h = Harness::with_units(3).await;
    let h1 = holder("stake1h1");
    let allocation = h.engine.allocate(&h1).await.unwrap();

    let completion = h
        .engine
        .complete(ReservationTarget::Id(allocation.reservation.id), Some("tx-1"))
        .await
        .unwrap();
    assert_eq!(completion.reservation.status, ReservationStatus::Completed);
    assert_eq!(completion.reservation.external_ref.as_deref(), Some("tx-1"));
    assert_eq!(completion.unit.status, UnitStatus::Sold);
    assert_eq!(completion.unit.sold_to.as_ref(), Some(&h1));

    let err = h.engine.allocate(&h1).await.unwrap_err();
    assert!(matches!(err, ReservationError::AlreadyClaimed(ref who) if who == &h1));
    assert!(h.engine.has_claimed(&h1).await.unwrap());
}

#[tokio::test]
async fn test_capacity_outcomes() {
    let h = Harness::with_units(3).await;
    for name in ["stake1a", "stake1b"] {
        let holder = holder(name);
        h.engine.allocate(&holder).await.unwrap();
        h.engine
            .complete(ReservationTarget::Holder(holder), None)
            .await
            .unwrap();
    }
    let third = h.engine.allocate(&holder("stake1c")).await.unwrap();

    let err = h.engine.allocate(&holder("stake1d")).await.unwrap_err();
    assert!(matches!(err, ReservationError::TemporarilyUnavailable));
    assert!(err.is_capacity());

    h.engine
        .complete(ReservationTarget::Id(third.reservation.id), None)
        .await
        .unwrap();
    let err = h.engine.allocate(&holder("stake1d")).await.unwrap_err();
    assert!(matches!(err, ReservationError::PermanentlyUnavailable));

    let stats = h.stats().await;
    assert_eq!(stats.sold, 3);
    assert!(stats.is_sold_out());
}

#[tokio::test]
async fn test_empty_pool_is_permanently_unavailable() {
    let h = Harness::with_units(0).await;
    let err = h.engine.allocate(&holder("stake1h1")).await.unwrap_err();
    assert!(matches!(err, ReservationError::PermanentlyUnavailable));
}

#[tokio::test]
async fn test_cancel_returns_unit_and_allows_new_reservation() {
    let h = Harness::with_units(2).await;
    let h1 = holder("stake1h1");
    let first = h.engine.allocate(&h1).await.unwrap();

    let cancelled = h.engine.cancel_for_holder(&h1).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert!(cancelled.ended_at.is_some());
    assert_eq!(h.unit(1).await.status, UnitStatus::Available);
    assert!(h.engine.get_active(&h1).await.unwrap().is_none());

    let second = h.engine.allocate(&h1).await.unwrap();
    assert_ne!(second.reservation.id, first.reservation.id);
    assert_eq!(second.unit.ordinal, 1);
    assert_eq!(h.engine.holder_history(&h1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_terminal_reservations_are_never_overwritten() {
    let h = Harness::with_units(2).await;
    let allocation = h.engine.allocate(&holder("stake1h1")).await.unwrap();
    let id = allocation.reservation.id;
    h.engine.release(id, ReleaseReason::Cancelled).await.unwrap();

    let err = h.engine.release(id, ReleaseReason::Expired).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::NotActive {
            status: ReservationStatus::Cancelled,
            ..
        }
    ));
    let err = h
        .engine
        .complete(ReservationTarget::Id(id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::NotActive { .. }));
    let err = h.engine.mark_payment_window_opened(id).await.unwrap_err();
    assert!(matches!(err, ReservationError::NotActive { .. }));
    assert_eq!(h.reservation(id).await.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let h = Harness::with_units(1).await;
    let missing = claimpool_core::types::ReservationId::new();

    assert!(matches!(
        h.engine.release(missing, ReleaseReason::Cancelled).await,
        Err(ReservationError::NotFound(_))
    ));
    assert!(matches!(
        h.engine.mark_payment_window_closed(missing).await,
        Err(ReservationError::NotFound(_))
    ));
    assert!(matches!(
        h.engine
            .complete(ReservationTarget::Holder(holder("stake1nobody")), None)
            .await,
        Err(ReservationError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_allocation_sweeps_expired_reservations_first() {
    let h = Harness::with_units(1).await;
    let first = h.engine.allocate(&holder("stake1h1")).await.unwrap();

    let err = h.engine.allocate(&holder("stake1h2")).await.unwrap_err();
    assert!(matches!(err, ReservationError::TemporarilyUnavailable));

    h.clock.advance(Duration::minutes(21));
    let second = h.engine.allocate(&holder("stake1h2")).await.unwrap();
    assert_eq!(second.unit.ordinal, 1);
    assert_eq!(
        h.reservation(first.reservation.id).await.status,
        ReservationStatus::Expired
    );
    h.assert_consistent().await;
}

#[tokio::test]
async fn test_get_active_reports_countdown() {
    let h = Harness::with_units(1).await;
    let h1 = holder("stake1h1");
    h.engine.allocate(&h1).await.unwrap();

    h.clock.advance(Duration::minutes(5));
    let active = h.engine.get_active(&h1).await.unwrap().unwrap();
    assert_eq!(active.remaining_ms, Duration::minutes(15).num_milliseconds());
    assert!(!active.is_expired);
    assert!(!active.is_payment_window_open);
    assert_eq!(active.unit.ordinal, 1);

    h.clock.advance(Duration::minutes(16));
    let active = h.engine.get_active(&h1).await.unwrap().unwrap();
    assert_eq!(active.remaining_ms, 0);
    assert!(active.is_expired);
}

#[tokio::test]
async fn test_populate_skips_existing_ordinals_and_labels_units() {
    let h = Harness::with_units(3).await;
    let inserted = h.engine.populate(2, 4, Some("Lab Rat")).await.unwrap();
    assert_eq!(inserted, 2);

    let units = h.engine.list_units().await.unwrap();
    let ordinals: Vec<i64> = units.iter().map(|u| u.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    assert_eq!(units[4].label.as_deref(), Some("Lab Rat #5"));
    assert!(units[0].label.is_none());

    assert!(h.engine.populate(1, 0, None).await.is_err());
}

#[tokio::test]
async fn test_list_reservations_filters_by_status() {
    let h = Harness::with_units(3).await;
    let a = h.engine.allocate(&holder("stake1a")).await.unwrap();
    h.engine.allocate(&holder("stake1b")).await.unwrap();
    h.engine
        .release(a.reservation.id, ReleaseReason::Cancelled)
        .await
        .unwrap();

    let all = h.engine.list_reservations(None).await.unwrap();
    assert_eq!(all.len(), 2);
    let active = h
        .engine
        .list_reservations(Some(ReservationStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].holder_id, holder("stake1b"));
}
