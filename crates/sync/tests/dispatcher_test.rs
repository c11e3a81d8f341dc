use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use shiftflow_core::models::event::{EventMetadata, SyncEvent, SyncEventKind};
use shiftflow_sync::SyncDispatcher;

fn event(branch_id: Uuid, staff_user_id: Option<Uuid>) -> SyncEvent {
    SyncEvent {
        kind: SyncEventKind::ShiftPublished,
        metadata: EventMetadata {
            assignment_id: None,
            shift_id: Uuid::new_v4(),
            staff_user_id,
            shift_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            status: Some("PUBLISHED".to_string()),
            assignment_type: None,
            branch_id,
        },
    }
}

#[tokio::test]
async fn branch_subscriber_receives_branch_event() {
    let dispatcher = SyncDispatcher::new();
    let branch_id = Uuid::new_v4();

    let mut rx = dispatcher.subscribe_branch(branch_id).await;
    let sent = event(branch_id, None);
    dispatcher.publish(sent.clone()).await;

    let received = rx.recv().await.unwrap();
    assert_eq!(received.kind, sent.kind);
    assert_eq!(received.metadata.shift_id, sent.metadata.shift_id);
}

#[tokio::test]
async fn staff_channel_receives_only_their_events() {
    let dispatcher = SyncDispatcher::new();
    let branch_id = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let mut alice_rx = dispatcher.subscribe_staff(alice).await;
    let mut bob_rx = dispatcher.subscribe_staff(bob).await;

    dispatcher.publish(event(branch_id, Some(alice))).await;

    assert!(alice_rx.recv().await.is_ok());
    assert!(bob_rx.try_recv().is_err());
}

#[tokio::test]
async fn event_fans_out_to_branch_and_staff() {
    let dispatcher = SyncDispatcher::new();
    let branch_id = Uuid::new_v4();
    let staff_id = Uuid::new_v4();

    let mut branch_rx = dispatcher.subscribe_branch(branch_id).await;
    let mut staff_rx = dispatcher.subscribe_staff(staff_id).await;

    dispatcher.publish(event(branch_id, Some(staff_id))).await;

    assert!(branch_rx.recv().await.is_ok());
    assert!(staff_rx.recv().await.is_ok());
}

#[tokio::test]
async fn publish_without_subscribers_is_silent() {
    let dispatcher = SyncDispatcher::new();

    // No channel exists for this branch yet; the event just evaporates.
    dispatcher.publish(event(Uuid::new_v4(), None)).await;
}

#[tokio::test]
async fn other_branch_subscriber_hears_nothing() {
    let dispatcher = SyncDispatcher::new();
    let branch_a = Uuid::new_v4();
    let branch_b = Uuid::new_v4();

    let mut rx_b = dispatcher.subscribe_branch(branch_b).await;
    dispatcher.publish(event(branch_a, None)).await;

    assert!(rx_b.try_recv().is_err());
}
