use async_trait::async_trait;
use shared::{
    domain::{
        Article, ArticleDraft, AuthToken, Comment, CommentId, Profile, Slug, User, UserUpdate,
        Username,
    },
    error::ApiError,
    protocol::{ArticleList, ArticleQuery},
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend the pages load from and submit to.
#[async_trait]
pub trait ConduitApi: Send + Sync {
    async fn articles(&self, token: Option<&AuthToken>, query: ArticleQuery)
        -> ApiResult<ArticleList>;
    /// Articles by authors the token's user follows.
    async fn feed(&self, token: &AuthToken, limit: u32, offset: u32) -> ApiResult<ArticleList>;
    async fn tags(&self) -> ApiResult<Vec<String>>;
    async fn article(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Article>;
    async fn comments(&self, token: Option<&AuthToken>, slug: &Slug) -> ApiResult<Vec<Comment>>;
    async fn post_comment(&self, token: &AuthToken, slug: &Slug, body: &str)
        -> ApiResult<Comment>;
    async fn delete_comment(&self, token: &AuthToken, slug: &Slug, id: CommentId)
        -> ApiResult<()>;
    async fn profile(&self, token: Option<&AuthToken>, username: &Username) -> ApiResult<Profile>;
    async fn set_following(
        &self,
        token: &AuthToken,
        username: &Username,
        following: bool,
    ) -> ApiResult<Profile>;
    async fn set_favorited(
        &self,
        token: &AuthToken,
        slug: &Slug,
        favorited: bool,
    ) -> ApiResult<Article>;
    async fn login(&self, email: &str, password: &str) -> ApiResult<User>;
    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<User>;
    async fn update_user(&self, token: &AuthToken, update: UserUpdate) -> ApiResult<User>;
    async fn create_article(&self, token: &AuthToken, draft: ArticleDraft) -> ApiResult<Article>;
    async fn update_article(
        &self,
        token: &AuthToken,
        slug: &Slug,
        draft: ArticleDraft,
    ) -> ApiResult<Article>;
    async fn delete_article(&self, token: &AuthToken, slug: &Slug) -> ApiResult<()>;
}
