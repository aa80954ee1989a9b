//! In-memory [`ConduitApi`] backend seeded from a JSON fixture.

use std::{
    collections::HashSet,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{
    domain::{
        Article, ArticleDraft, AuthToken, Comment, CommentId, Profile, Slug, User, UserUpdate,
        Username,
    },
    error::{ApiError, ErrorCode},
    protocol::{ArticleList, ArticleQuery},
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::{ApiResult, ConduitApi},
    error::ShellError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub articles: Vec<FixtureArticle>,
    #[serde(default)]
    pub comments: Vec<FixtureComment>,
    /// `[follower, followee]` pairs.
    #[serde(default)]
    pub follows: Vec<(String, String)>,
    /// `[username, slug]` pairs.
    #[serde(default)]
    pub favorites: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureArticle {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
    pub author: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureComment {
    pub article: String,
    pub author: String,
    pub body: String,
}

struct Account {
    user: User,
    password: String,
}

struct StoredComment {
    id: CommentId,
    body: String,
    created_at: DateTime<Utc>,
    author: usize,
}

struct StoredArticle {
    id: u64,
    slug: Slug,
    draft: ArticleDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author: usize,
    comments: Vec<StoredComment>,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    articles: Vec<StoredArticle>,
    follows: HashSet<(usize, usize)>,
    favorites: HashSet<(usize, u64)>,
    next_article_id: u64,
    next_comment_id: i64,
}

pub struct InMemoryConduit {
    store: RwLock<Store>,
    unavailable: AtomicBool,
}

impl InMemoryConduit {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Result<Self, ApiError> {
        let mut store = Store::default();
        for user in fixtures.users {
            let index = store.create_account(&user.username, &user.email, &user.password)?;
            let account = &mut store.accounts[index];
            account.user.bio = user.bio;
            account.user.image = user.image;
        }
        for article in fixtures.articles {
            let author = store.account_by_name(&article.author)?;
            let draft = ArticleDraft {
                title: article.title,
                description: article.description,
                body: article.body,
                tag_list: article.tag_list,
            };
            let index = store.insert_article(author, draft, article.slug.map(Slug::new))?;
            if let Some(created_at) = article.created_at {
                store.articles[index].created_at = created_at;
                store.articles[index].updated_at = created_at;
            }
        }
        for comment in fixtures.comments {
            let author = store.account_by_name(&comment.author)?;
            let index = store.article_index(&Slug::new(comment.article))?;
            store.insert_comment(index, author, comment.body);
        }
        for (follower, followee) in fixtures.follows {
            let follower = store.account_by_name(&follower)?;
            let followee = store.account_by_name(&followee)?;
            store.follows.insert((follower, followee));
        }
        for (username, slug) in fixtures.favorites {
            let account = store.account_by_name(&username)?;
            let index = store.article_index(&Slug::new(slug))?;
            let id = store.articles[index].id;
            store.favorites.insert((account, id));
        }
        Ok(Self {
            store: RwLock::new(store),
            unavailable: AtomicBool::new(false),
        })
    }

    pub fn from_fixture_json(raw: &str) -> Result<Self, ShellError> {
        let fixtures: Fixtures = serde_json::from_str(raw)?;
        Self::from_fixtures(fixtures).map_err(|err| ShellError::Fixture(err.message))
    }

    pub fn from_fixture_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures from '{}'", path.display()))?;
        Self::from_fixture_json(&raw)
            .with_context(|| format!("invalid fixtures in '{}'", path.display()))
    }

    /// While unavailable every call fails with [`ErrorCode::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> ApiResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ApiError::unavailable())
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryConduit {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_draft(draft: &ArticleDraft) -> ApiResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::validation("title can't be blank"));
    }
    if draft.body.trim().is_empty() {
        return Err(ApiError::validation("body can't be blank"));
    }
    Ok(())
}

impl Store {
    fn create_account(&mut self, username: &str, email: &str, password: &str) -> ApiResult<usize> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username can't be blank"));
        }
        if email.is_empty() {
            return Err(ApiError::validation("email can't be blank"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password can't be blank"));
        }
        if self
            .accounts
            .iter()
            .any(|account| account.user.username.as_str() == username)
        {
            return Err(ApiError::validation("username has already been taken"));
        }
        if self.accounts.iter().any(|account| account.user.email == email) {
            return Err(ApiError::validation("email has already been taken"));
        }
        let now = Utc::now();
        self.accounts.push(Account {
            user: User {
                email: email.to_string(),
                token: AuthToken::new(Uuid::new_v4().to_string()),
                username: Username::new(username),
                bio: None,
                image: None,
                created_at: now,
                updated_at: now,
            },
            password: password.to_string(),
        });
        Ok(self.accounts.len() - 1)
    }

    fn account_by_name(&self, username: &str) -> ApiResult<usize> {
        self.accounts
            .iter()
            .position(|account| account.user.username.as_str() == username)
            .ok_or_else(|| ApiError::not_found(format!("profile '{username}'")))
    }

    fn account_by_token(&self, token: &AuthToken) -> ApiResult<usize> {
        self.accounts
            .iter()
            .position(|account| &account.user.token == token)
            .ok_or_else(ApiError::unauthorized)
    }

    fn viewer(&self, token: Option<&AuthToken>) -> ApiResult<Option<usize>> {
        token.map(|token| self.account_by_token(token)).transpose()
    }

    fn article_index(&self, slug: &Slug) -> ApiResult<usize> {
        self.articles
            .iter()
            .position(|article| &article.slug == slug)
            .ok_or_else(|| ApiError::not_found(format!("article '{slug}'")))
    }

    fn insert_article(
        &mut self,
        author: usize,
        draft: ArticleDraft,
        slug: Option<Slug>,
    ) -> ApiResult<usize> {
        validate_draft(&draft)?;
        let slug = match slug {
            Some(slug) => slug,
            None => self.unique_slug(&draft.title),
        };
        if self.articles.iter().any(|article| article.slug == slug) {
            return Err(ApiError::validation(format!("slug '{slug}' is already in use")));
        }
        let now = Utc::now();
        self.next_article_id += 1;
        self.articles.push(StoredArticle {
            id: self.next_article_id,
            slug,
            draft,
            created_at: now,
            updated_at: now,
            author,
            comments: Vec::new(),
        });
        Ok(self.articles.len() - 1)
    }

    fn insert_comment(&mut self, article: usize, author: usize, body: String) -> CommentId {
        self.next_comment_id += 1;
        let id = CommentId(self.next_comment_id);
        self.articles[article].comments.push(StoredComment {
            id,
            body,
            created_at: Utc::now(),
            author,
        });
        id
    }

    fn unique_slug(&self, title: &str) -> Slug {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self
            .articles
            .iter()
            .any(|article| article.slug.as_str() == candidate)
        {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        Slug::new(candidate)
    }

    fn profile(&self, account: usize, viewer: Option<usize>) -> Profile {
        let user = &self.accounts[account].user;
        Profile {
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following: viewer.is_some_and(|viewer| self.follows.contains(&(viewer, account))),
        }
    }

    fn article(&self, index: usize, viewer: Option<usize>) -> Article {
        let stored = &self.articles[index];
        Article {
            slug: stored.slug.clone(),
            title: stored.draft.title.clone(),
            description: stored.draft.description.clone(),
            body: stored.draft.body.clone(),
            tag_list: stored.draft.tag_list.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            favorited: viewer.is_some_and(|viewer| self.favorites.contains(&(viewer, stored.id))),
            favorites_count: self
                .favorites
                .iter()
                .filter(|(_, id)| *id == stored.id)
                .count() as u32,
            author: self.profile(stored.author, viewer),
        }
    }

    fn comment(&self, comment: &StoredComment, viewer: Option<usize>) -> Comment {
        Comment {
            id: comment.id,
            body: comment.body.clone(),
            created_at: comment.created_at,
            updated_at: comment.created_at,
            author: self.profile(comment.author, viewer),
        }
    }

    fn list<F>(&self, viewer: Option<usize>, limit: u32, offset: u32, keep: F) -> ArticleList
    where
        F: Fn(&StoredArticle) -> bool,
    {
        let mut matching: Vec<usize> = (0..self.articles.len())
            .rev()
            .filter(|index| keep(&self.articles[*index]))
            .collect();
        matching.sort_by(|a, b| self.articles[*b].created_at.cmp(&self.articles[*a].created_at));
        let articles_count = matching.len() as u32;
        let articles = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|index| self.article(index, viewer))
            .collect();
        ArticleList {
            articles,
            articles_count,
        }
    }

    fn ensure_author(&self, index: usize, account: usize) -> ApiResult<()> {
        if self.articles[index].author == account {
            Ok(())
        } else {
            Err(ApiError::new(
                ErrorCode::Unauthorized,
                "only the author may change this article",
            ))
        }
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[async_trait]
impl ConduitApi for InMemoryConduit {
    async fn articles(
        &self,
        token: Option<&AuthToken>,
        query: ArticleQuery,
    ) -> ApiResult<ArticleList> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let viewer = store.viewer(token)?;
        let author = match &query.author {
            Some(name) => Some(store.account_by_name(name.as_str())?),
            None => None,
        };
        let favorited_by = match &query.favorited {
            Some(name) => Some(store.account_by_name(name.as_str())?),
            None => None,
        };
        debug!(?query, "listing articles");
        Ok(store.list(viewer, query.limit, query.offset, |article| {
            query
                .tag
                .as_ref()
                .map_or(true, |tag| article.draft.tag_list.contains(tag))
                && author.map_or(true, |author| article.author == author)
                && favorited_by.map_or(true, |account| {
                    store.favorites.contains(&(account, article.id))
                })
        }))
    }

    async fn feed(&self, token: &AuthToken, limit: u32, offset: u32) -> ApiResult<ArticleList> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let viewer = store.account_by_token(token)?;
        Ok(store.list(Some(viewer), limit, offset, |article| {
            store.follows.contains(&(viewer, article.author))
        }))
    }

    async fn tags(&self) -> ApiResult<Vec<String>> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let mut tags: Vec<String> = Vec::new();
        for article in store.articles.iter() {
            for tag in &article.draft.tag_list {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        Ok(tags)
    }

    async fn article(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Article> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let viewer = store.viewer(token)?;
        let index = store.article_index(slug)?;
        Ok(store.article(index, viewer))
    }

    async fn comments(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Vec<Comment>> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let viewer = store.viewer(token)?;
        let index = store.article_index(slug)?;
        Ok(store.articles[index]
            .comments
            .iter()
            .rev()
            .map(|comment| store.comment(comment, viewer))
            .collect())
    }

    async fn post_comment(&self, token: &AuthToken, slug: &Slug, body: &str) -> ApiResult<Comment> {
        self.ensure_available()?;
        if body.trim().is_empty() {
            return Err(ApiError::validation("body can't be blank"));
        }
        let mut store = self.store.write().await;
        let author = store.account_by_token(token)?;
        let index = store.article_index(slug)?;
        let id = store.insert_comment(index, author, body.to_string());
        let stored = store.articles[index]
            .comments
            .iter()
            .find(|comment| comment.id == id)
            .ok_or_else(|| ApiError::new(ErrorCode::Internal, "comment vanished"))?;
        Ok(store.comment(stored, Some(author)))
    }

    async fn delete_comment(&self, token: &AuthToken, slug: &Slug, id: CommentId) -> ApiResult<()> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let account = store.account_by_token(token)?;
        let index = store.article_index(slug)?;
        let comments = &mut store.articles[index].comments;
        let position = comments
            .iter()
            .position(|comment| comment.id == id)
            .ok_or_else(|| ApiError::not_found(format!("comment {}", id.0)))?;
        if comments[position].author != account {
            return Err(ApiError::new(
                ErrorCode::Unauthorized,
                "only the author may delete this comment",
            ));
        }
        comments.remove(position);
        Ok(())
    }

    async fn profile(&self, token: Option<&AuthToken>, username: &Username) -> ApiResult<Profile> {
        self.ensure_available()?;
        let store = self.store.read().await;
        let viewer = store.viewer(token)?;
        let account = store.account_by_name(username.as_str())?;
        Ok(store.profile(account, viewer))
    }

    async fn set_following(
        &self,
        token: &AuthToken,
        username: &Username,
        following: bool,
    ) -> ApiResult<Profile> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let viewer = store.account_by_token(token)?;
        let target = store.account_by_name(username.as_str())?;
        if following {
            store.follows.insert((viewer, target));
        } else {
            store.follows.remove(&(viewer, target));
        }
        Ok(store.profile(target, Some(viewer)))
    }

    async fn set_favorited(
        &self,
        token: &AuthToken,
        slug: &Slug,
        favorited: bool,
    ) -> ApiResult<Article> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let viewer = store.account_by_token(token)?;
        let index = store.article_index(slug)?;
        let id = store.articles[index].id;
        if favorited {
            store.favorites.insert((viewer, id));
        } else {
            store.favorites.remove(&(viewer, id));
        }
        Ok(store.article(index, Some(viewer)))
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.ensure_available()?;
        let store = self.store.read().await;
        store
            .accounts
            .iter()
            .find(|account| account.user.email == email.trim() && account.password == password)
            .map(|account| account.user.clone())
            .ok_or_else(|| ApiError::validation("email or password is invalid"))
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<User> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let index = store.create_account(username, email, password)?;
        Ok(store.accounts[index].user.clone())
    }

    async fn update_user(&self, token: &AuthToken, update: UserUpdate) -> ApiResult<User> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let index = store.account_by_token(token)?;
        if let Some(username) = &update.username {
            if username.as_str().trim().is_empty() {
                return Err(ApiError::validation("username can't be blank"));
            }
            let taken = store.accounts.iter().enumerate().any(|(other, account)| {
                other != index && &account.user.username == username
            });
            if taken {
                return Err(ApiError::validation("username has already been taken"));
            }
        }
        let email = update.email.as_deref().map(str::trim);
        if let Some(email) = email {
            if email.is_empty() {
                return Err(ApiError::validation("email can't be blank"));
            }
            let taken = store
                .accounts
                .iter()
                .enumerate()
                .any(|(other, account)| other != index && account.user.email == email);
            if taken {
                return Err(ApiError::validation("email has already been taken"));
            }
        }
        let email = email.map(str::to_string);
        let account = &mut store.accounts[index];
        if let Some(email) = email {
            account.user.email = email;
        }
        if let Some(username) = update.username {
            account.user.username = username;
        }
        if let Some(bio) = update.bio {
            account.user.bio = Some(bio).filter(|bio| !bio.is_empty());
        }
        if let Some(image) = update.image {
            account.user.image = Some(image).filter(|image| !image.is_empty());
        }
        if let Some(password) = update.password {
            account.password = password;
        }
        account.user.updated_at = Utc::now();
        Ok(account.user.clone())
    }

    async fn create_article(&self, token: &AuthToken, draft: ArticleDraft) -> ApiResult<Article> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let author = store.account_by_token(token)?;
        let index = store.insert_article(author, draft, None)?;
        Ok(store.article(index, Some(author)))
    }

    async fn update_article(
        &self,
        token: &AuthToken,
        slug: &Slug,
        draft: ArticleDraft,
    ) -> ApiResult<Article> {
        self.ensure_available()?;
        validate_draft(&draft)?;
        let mut store = self.store.write().await;
        let account = store.account_by_token(token)?;
        let index = store.article_index(slug)?;
        store.ensure_author(index, account)?;
        let stored = &mut store.articles[index];
        stored.draft = draft;
        stored.updated_at = Utc::now();
        Ok(store.article(index, Some(account)))
    }

    async fn delete_article(&self, token: &AuthToken, slug: &Slug) -> ApiResult<()> {
        self.ensure_available()?;
        let mut store = self.store.write().await;
        let account = store.account_by_token(token)?;
        let index = store.article_index(slug)?;
        store.ensure_author(index, account)?;
        let removed = store.articles.remove(index);
        store.favorites.retain(|(_, id)| *id != removed.id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
