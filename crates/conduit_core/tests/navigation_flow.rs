use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use conduit_core::{
    api::ApiResult,
    pages::{editor, register},
    ConduitApi, InMemoryConduit, LoadPolicy, MemorySessionChannel, Msg, Page, PageMsg, Runtime,
    ShellConfig,
};
use shared::{
    domain::{
        Article, ArticleDraft, AuthToken, Comment, CommentId, Profile, Slug, User, UserUpdate,
        Username,
    },
    protocol::{ArticleList, ArticleQuery},
};

const FIXTURE: &str = r#"{
  "users": [
    { "username": "celeb", "email": "celeb@example.com", "password": "celebceleb" }
  ],
  "articles": [
    { "title": "Slow", "description": "takes a while", "body": "zzz", "author": "celeb" },
    { "title": "Fast", "description": "instant", "body": "go", "author": "celeb" }
  ]
}"#;

/// Backend whose article lookups for one slug are artificially slow.
struct SlowArticle {
    inner: InMemoryConduit,
    slow: Slug,
}

#[async_trait]
impl ConduitApi for SlowArticle {
    async fn articles(&self, token: Option<&AuthToken>, query: ArticleQuery) -> ApiResult<ArticleList> {
        self.inner.articles(token, query).await
    }

    async fn feed(&self, token: &AuthToken, limit: u32, offset: u32) -> ApiResult<ArticleList> {
        self.inner.feed(token, limit, offset).await
    }

    async fn tags(&self) -> ApiResult<Vec<String>> {
        self.inner.tags().await
    }

    async fn article(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Article> {
        if slug == &self.slow {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        self.inner.article(token, slug).await
    }

    async fn comments(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Vec<Comment>> {
        self.inner.comments(token, slug).await
    }

    async fn post_comment(&self, token: &AuthToken, slug: &Slug, body: &str) -> ApiResult<Comment> {
        self.inner.post_comment(token, slug, body).await
    }

    async fn delete_comment(&self, token: &AuthToken, slug: &Slug, id: CommentId) -> ApiResult<()> {
        self.inner.delete_comment(token, slug, id).await
    }

    async fn profile(&self, token: Option<&AuthToken>, username: &Username) -> ApiResult<Profile> {
        self.inner.profile(token, username).await
    }

    async fn set_following(
        &self,
        token: &AuthToken,
        username: &Username,
        following: bool,
    ) -> ApiResult<Profile> {
        self.inner.set_following(token, username, following).await
    }

    async fn set_favorited(&self, token: &AuthToken, slug: &Slug, favorited: bool) -> ApiResult<Article> {
        self.inner.set_favorited(token, slug, favorited).await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.inner.login(email, password).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<User> {
        self.inner.register(username, email, password).await
    }

    async fn update_user(&self, token: &AuthToken, update: UserUpdate) -> ApiResult<User> {
        self.inner.update_user(token, update).await
    }

    async fn create_article(&self, token: &AuthToken, draft: ArticleDraft) -> ApiResult<Article> {
        self.inner.create_article(token, draft).await
    }

    async fn update_article(
        &self,
        token: &AuthToken,
        slug: &Slug,
        draft: ArticleDraft,
    ) -> ApiResult<Article> {
        self.inner.update_article(token, slug, draft).await
    }

    async fn delete_article(&self, token: &AuthToken, slug: &Slug) -> ApiResult<()> {
        self.inner.delete_article(token, slug).await
    }
}

fn slow_backend() -> Arc<SlowArticle> {
    Arc::new(SlowArticle {
        inner: InMemoryConduit::from_fixture_json(FIXTURE).expect("fixture"),
        slow: Slug::new("slow"),
    })
}

fn current_slug(runtime: &Runtime) -> Option<String> {
    match runtime.model().page() {
        Page::Article(state) => Some(state.article.slug.to_string()),
        _ => None,
    }
}

async fn race(policy: LoadPolicy) -> Runtime {
    let config = ShellConfig {
        load_policy: policy,
    };
    let channel = Arc::new(MemorySessionChannel::new());
    let mut runtime = Runtime::boot(config, slow_backend(), channel, "#/login");
    runtime.settle().await;
    runtime.visit("#/article/slow");
    runtime.visit("#/article/fast");
    runtime.settle().await;
    runtime
}

#[tokio::test]
async fn late_completion_overwrites_newer_page_by_default() {
    let runtime = race(LoadPolicy::LastCompletionWins).await;
    assert_eq!(current_slug(&runtime).as_deref(), Some("slow"));
    assert_eq!(runtime.location(), "#/article/fast");
}

#[tokio::test]
async fn latest_navigation_policy_keeps_the_newest_page() {
    let runtime = race(LoadPolicy::LatestNavigationOnly).await;
    assert_eq!(current_slug(&runtime).as_deref(), Some("fast"));
}

#[tokio::test]
async fn register_write_and_edit_an_article() {
    let channel = Arc::new(MemorySessionChannel::new());
    let api = Arc::new(InMemoryConduit::from_fixture_json(FIXTURE).expect("fixture"));
    let mut runtime = Runtime::boot(ShellConfig::default(), api, channel.clone(), "#/register");
    runtime.settle().await;

    for msg in [
        register::Msg::SetUsername("writer".into()),
        register::Msg::SetEmail("writer@example.com".into()),
        register::Msg::SetPassword("secret".into()),
        register::Msg::Submit,
    ] {
        runtime.dispatch(Msg::Page(PageMsg::Register(msg)));
    }
    runtime.settle().await;
    assert!(runtime.model().session.is_signed_in());
    assert!(channel.stored().is_some());
    assert!(matches!(runtime.model().page(), Page::Home(_)));

    runtime.visit("#/editor");
    runtime.settle().await;
    for msg in [
        editor::Msg::SetTitle("First Post".into()),
        editor::Msg::SetDescription("hello".into()),
        editor::Msg::SetBody("Body text".into()),
        editor::Msg::SetTags("intro".into()),
        editor::Msg::Save,
    ] {
        runtime.dispatch(Msg::Page(PageMsg::Editor(msg)));
    }
    runtime.settle().await;
    assert_eq!(runtime.location(), "#/article/first-post");
    assert_eq!(current_slug(&runtime).as_deref(), Some("first-post"));

    runtime.visit("#/editor/first-post");
    runtime.settle().await;
    let document = runtime.render();
    assert_eq!(document.title, "Edit Article - Conduit");
    assert!(document.body.contains("value=\"First Post\""));

    runtime.visit("#/logout");
    runtime.settle().await;
    assert!(!runtime.model().session.is_signed_in());
    assert_eq!(channel.stored(), None);

    runtime.visit("#/editor/first-post");
    runtime.settle().await;
    assert!(runtime
        .render()
        .body
        .contains("You must be signed in to edit an article."));
}
