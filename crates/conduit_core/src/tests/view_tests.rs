use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::AuthToken;

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
fn title_is_suffixed_with_app_name() {
    let doc = frame(false, None, &ActivePage::Other, Document::new("Login", ""));
    assert_eq!(doc.title, "Login - Conduit");

    let blank = frame(false, None, &ActivePage::Other, Document::new("", ""));
    assert_eq!(blank.title, "Conduit");
}

#[test]
fn anonymous_chrome_offers_sign_in_and_sign_up() {
    let doc = frame(false, None, &ActivePage::Login, Document::new("Login", "<p>form</p>"));
    assert!(doc
        .body
        .contains("<a class=\"nav-link active\" href=\"#/login\">Sign in</a>"));
    assert!(doc.body.contains("href=\"#/register\">Sign up</a>"));
    assert!(!doc.body.contains("Sign out"));
    assert!(doc.body.contains("<p>form</p>"));
}

#[test]
fn signed_in_chrome_links_to_profile_and_logout() {
    let jake = user("jake");
    let doc = frame(
        false,
        Some(&jake),
        &ActivePage::Profile(Username::new("jake")),
        Document::new("Profile - jake", ""),
    );
    assert!(doc
        .body
        .contains("<a class=\"nav-link active\" href=\"#/profile/jake\">jake</a>"));
    assert!(doc.body.contains("href=\"#/logout\">Sign out</a>"));
    assert!(doc.body.contains("New Post"));
    assert!(!doc.body.contains("Sign up"));
}

#[test]
fn other_never_highlights_sign_out() {
    let jake = user("jake");
    let doc = frame(false, Some(&jake), &ActivePage::Other, Document::new("x", ""));
    assert!(!doc.body.contains("nav-link active"));
}

#[test]
fn loading_indicator_only_while_transitioning() {
    let idle = frame(false, None, &ActivePage::Home, Document::new("Home", ""));
    let loading = frame(true, None, &ActivePage::Home, Document::new("Home", ""));
    assert!(!idle.body.contains("Loading..."));
    assert!(loading.body.contains("Loading..."));
}

#[test]
fn usernames_are_escaped_in_chrome() {
    let mut odd = user("x");
    odd.username = Username::new("<b>");
    let doc = frame(false, Some(&odd), &ActivePage::Other, Document::new("", ""));
    assert!(doc.body.contains("&lt;b&gt;"));
    assert!(doc.body.contains("href=\"#/profile/%3Cb%3E\""));
}

#[test]
fn error_list_is_empty_without_errors() {
    assert_eq!(error_list(&[]), "");
    assert_eq!(
        error_list(&["a & b".to_string()]),
        "<ul class=\"error-messages\"><li>a &amp; b</li></ul>"
    );
}
