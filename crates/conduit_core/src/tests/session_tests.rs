use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::{AuthToken, Username};

fn user(name: &str) -> User {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("timestamp");
    User {
        email: format!("{name}@example.com"),
        token: AuthToken::new(format!("token-{name}")),
        username: Username::new(name),
        bio: None,
        image: None,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn boot_payload_wraps_user_json_in_a_string() {
    let inner = encode_user(&user("jake")).expect("encode");
    let payload = serde_json::to_string(&inner).expect("wrap");
    assert_eq!(decode_boot_payload(&payload), Some(user("jake")));
}

#[test]
fn boot_payload_accepts_bare_user_object() {
    let payload = encode_user(&user("jake")).expect("encode");
    assert_eq!(decode_boot_payload(&payload), Some(user("jake")));
}

#[test]
fn invalid_boot_payloads_degrade_to_anonymous() {
    assert_eq!(decode_boot_payload("not json at all"), None);
    assert_eq!(decode_boot_payload("\"{broken\""), None);
    assert_eq!(decode_boot_payload("null"), None);
    assert_eq!(decode_boot_payload("42"), None);
    assert_eq!(decode_boot_payload("{\"username\":\"jake\"}"), None);
}

#[test]
fn malformed_session_notifications_mean_no_user() {
    assert_eq!(decode_user(""), None);
    assert_eq!(decode_user("null"), None);
    assert_eq!(decode_user("{\"token\":1}"), None);
    let raw = encode_user(&user("ann")).expect("encode");
    assert_eq!(decode_user(&raw), Some(user("ann")));
}

#[test]
fn set_user_reports_sign_out_only_on_present_to_absent() {
    let mut session = Session::anonymous();
    assert!(!session.set_user(None));
    assert!(!session.set_user(Some(user("jake"))));
    assert!(!session.set_user(Some(user("ann"))));
    assert!(session.set_user(None));
    assert!(!session.is_signed_in());
}

#[test]
fn memory_channel_store_and_clear() {
    let channel = MemorySessionChannel::new();
    channel.store(Some(&user("jake"))).expect("store");
    let stored = channel.load().expect("stored user");
    assert_eq!(decode_user(&stored), Some(user("jake")));

    channel.store(None).expect("clear");
    assert_eq!(channel.load(), None);
}

#[tokio::test]
async fn external_notifications_reach_subscribers_verbatim() {
    let channel = MemorySessionChannel::new();
    let mut rx = channel.subscribe();

    channel.notify_external("garbage");
    assert_eq!(rx.recv().await.expect("event"), "garbage");
    assert_eq!(channel.load().as_deref(), Some("garbage"));

    channel.notify_external("null");
    assert_eq!(rx.recv().await.expect("event"), "null");
    assert_eq!(channel.load(), None);
}

#[test]
fn own_writes_are_not_broadcast() {
    let channel = MemorySessionChannel::new();
    let mut rx = channel.subscribe();
    channel.store(Some(&user("jake"))).expect("store");
    assert!(rx.try_recv().is_err());
}
