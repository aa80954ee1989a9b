use super::*;
use shared::domain::User;

use crate::{
    error::ShellError,
    memory::InMemoryConduit,
    pages::login,
    session::{encode_user, MemorySessionChannel},
    shell::{Page, PageMsg, PageState},
};

const FIXTURE: &str = r#"{
  "users": [
    { "username": "jake", "email": "jake@example.com", "password": "jakejake" }
  ],
  "articles": [
    { "title": "Hello", "description": "first", "body": "post", "author": "jake" }
  ]
}"#;

fn backend() -> Arc<InMemoryConduit> {
    Arc::new(InMemoryConduit::from_fixture_json(FIXTURE).expect("fixture"))
}

async fn jake(api: &InMemoryConduit) -> User {
    api.login("jake@example.com", "jakejake").await.expect("login")
}

struct FailingChannel {
    events: broadcast::Sender<String>,
}

impl SessionChannel for FailingChannel {
    fn store(&self, _user: Option<&User>) -> Result<(), ShellError> {
        Err(ShellError::Persistence("storage is full".into()))
    }

    fn load(&self) -> Option<String> {
        None
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}

#[tokio::test]
async fn boot_at_root_redirects_and_loads_home() {
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(ShellConfig::default(), backend(), channel, "/");
    runtime.settle().await;

    assert_eq!(runtime.location(), "#/");
    assert!(matches!(
        &runtime.model().page_state,
        PageState::Loaded(Page::Home(home)) if home.feed.articles_count == 1
    ));
    assert_eq!(runtime.render().title, "Home - Conduit");
}

#[tokio::test]
async fn boot_restores_the_stored_session() {
    let api = backend();
    let user = jake(&api).await;
    let channel = Arc::new(MemorySessionChannel::with_stored(
        encode_user(&user).expect("encode"),
    ));
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel, "#/settings");
    runtime.settle().await;

    assert_eq!(runtime.model().session.user(), Some(&user));
    assert!(matches!(runtime.model().page(), Page::Settings(_)));
}

#[tokio::test]
async fn login_persists_user_and_lands_home() {
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(
        ShellConfig::default(),
        backend(),
        channel.clone(),
        "#/login",
    );
    runtime.settle().await;

    for msg in [
        login::Msg::SetEmail("jake@example.com".into()),
        login::Msg::SetPassword("jakejake".into()),
        login::Msg::Submit,
    ] {
        runtime.dispatch(Msg::Page(PageMsg::Login(msg)));
    }
    runtime.settle().await;

    let user = runtime.model().session.user().cloned().expect("signed in");
    assert_eq!(user.username.as_str(), "jake");
    let stored = channel.stored().expect("persisted");
    assert_eq!(crate::session::decode_user(&stored), Some(user));
    assert_eq!(runtime.location(), "#/");
    assert!(matches!(runtime.model().page(), Page::Home(_)));
}

#[tokio::test]
async fn logout_clears_storage_and_returns_home() {
    let api = backend();
    let user = jake(&api).await;
    let channel = Arc::new(MemorySessionChannel::with_stored(
        encode_user(&user).expect("encode"),
    ));
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel.clone(), "#/article/hello");
    runtime.settle().await;
    assert!(matches!(runtime.model().page(), Page::Article(_)));

    runtime.visit("#/logout");
    runtime.settle().await;

    assert!(!runtime.model().session.is_signed_in());
    assert_eq!(channel.stored(), None);
    assert!(matches!(runtime.model().page(), Page::Home(_)));
}

#[tokio::test]
async fn external_sign_out_redirects_home() {
    let api = backend();
    let user = jake(&api).await;
    let channel = Arc::new(MemorySessionChannel::with_stored(
        encode_user(&user).expect("encode"),
    ));
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel.clone(), "#/settings");
    runtime.settle().await;

    channel.notify_external("null");
    runtime.settle().await;

    assert!(!runtime.model().session.is_signed_in());
    assert_eq!(runtime.location(), "#/");
    assert!(matches!(runtime.model().page(), Page::Home(_)));
}

#[tokio::test]
async fn malformed_notifications_mean_no_user() {
    let api = backend();
    let user = jake(&api).await;
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel.clone(), "#/login");
    runtime.settle().await;

    channel.notify_external(encode_user(&user).expect("encode"));
    runtime.settle().await;
    assert_eq!(runtime.model().session.user(), Some(&user));
    assert!(matches!(runtime.model().page(), Page::Login(_)));

    channel.notify_external("{not json");
    runtime.settle().await;
    assert!(!runtime.model().session.is_signed_in());
}

#[tokio::test]
async fn unavailable_backend_renders_error_page() {
    let api = backend();
    api.set_unavailable(true);
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel, "#/");
    runtime.settle().await;

    let document = runtime.render();
    assert_eq!(document.title, "Error - Conduit");
    assert!(document.body.contains("Homepage is currently unavailable."));
}

#[tokio::test]
async fn persistence_failures_do_not_stop_the_shell() {
    let (events, _) = broadcast::channel(4);
    let channel = Arc::new(FailingChannel { events });
    let mut runtime = Runtime::boot(ShellConfig::default(), backend(), channel, "#/login");
    runtime.settle().await;

    runtime.dispatch(Msg::Page(PageMsg::Login(login::Msg::SetEmail(
        "jake@example.com".into(),
    ))));
    runtime.dispatch(Msg::Page(PageMsg::Login(login::Msg::SetPassword(
        "jakejake".into(),
    ))));
    runtime.dispatch(Msg::Page(PageMsg::Login(login::Msg::Submit)));
    runtime.settle().await;

    assert!(runtime.model().session.is_signed_in());
    assert!(matches!(runtime.model().page(), Page::Home(_)));
}

#[tokio::test]
async fn unknown_locations_render_not_found() {
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(ShellConfig::default(), backend(), channel, "#/nowhere");
    runtime.settle().await;
    assert_eq!(runtime.render().title, "Page Not Found - Conduit");
}
