//! Single article with its comment thread.

use shared::{
    domain::{Article, AuthToken, Comment, CommentId, Profile, Slug, Username},
    error::ApiError,
};

use crate::{
    api::ConduitApi,
    page::{Command, PageLoadError, PageUnit, Step, SIGNED_OUT_ACTION},
    route::Route,
    session::Session,
    view::{error_list, escape, ActivePage, Document},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub article: Article,
    pub comments: Vec<Comment>,
    pub comment_draft: String,
    pub posting_comment: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SetCommentDraft(String),
    PostComment,
    CommentPosted(Result<Comment, ApiError>),
    DeleteComment(CommentId),
    CommentDeleted {
        id: CommentId,
        result: Result<(), ApiError>,
    },
    ToggleFavorite,
    FavoriteToggled(Result<Article, ApiError>),
    ToggleFollow,
    FollowToggled(Result<Profile, ApiError>),
    DeleteArticle,
    ArticleDeleted(Result<(), ApiError>),
    DismissErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    PostComment {
        token: AuthToken,
        slug: Slug,
        body: String,
    },
    DeleteComment {
        token: AuthToken,
        slug: Slug,
        id: CommentId,
    },
    SetFavorited {
        token: AuthToken,
        slug: Slug,
        favorited: bool,
    },
    SetFollowing {
        token: AuthToken,
        username: Username,
        following: bool,
    },
    DeleteArticle {
        token: AuthToken,
        slug: Slug,
    },
}

pub const LOAD_FAILED: &str = "Article is currently unavailable.";

pub async fn load(
    api: &dyn ConduitApi,
    token: Option<AuthToken>,
    slug: Slug,
) -> Result<Model, PageLoadError> {
    let (article, comments) = futures::future::try_join(
        api.article(token.as_ref(), &slug),
        api.comments(token.as_ref(), &slug),
    )
    .await
    .map_err(|err| {
        tracing::debug!(%slug, error = %err, "article load failed");
        PageLoadError::new(ActivePage::Other, LOAD_FAILED)
    })?;
    Ok(Model {
        article,
        comments,
        comment_draft: String::new(),
        posting_comment: false,
        errors: Vec::new(),
    })
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::PostComment { token, slug, body } => {
            Msg::CommentPosted(api.post_comment(&token, &slug, &body).await)
        }
        Request::DeleteComment { token, slug, id } => Msg::CommentDeleted {
            id,
            result: api.delete_comment(&token, &slug, id).await,
        },
        Request::SetFavorited {
            token,
            slug,
            favorited,
        } => Msg::FavoriteToggled(api.set_favorited(&token, &slug, favorited).await),
        Request::SetFollowing {
            token,
            username,
            following,
        } => Msg::FollowToggled(api.set_following(&token, &username, following).await),
        Request::DeleteArticle { token, slug } => {
            Msg::ArticleDeleted(api.delete_article(&token, &slug).await)
        }
    }
}

impl Model {
    fn signed_out(mut self) -> Step<Self, Request> {
        self.errors = vec![SIGNED_OUT_ACTION.to_string()];
        Step::stay(self)
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SetCommentDraft(draft) => {
                self.comment_draft = draft;
                Step::stay(self)
            }
            Msg::PostComment => {
                let Some(token) = session.token().cloned() else {
                    return self.signed_out();
                };
                let body = self.comment_draft.trim().to_string();
                if body.is_empty() || self.posting_comment {
                    return Step::stay(self);
                }
                self.posting_comment = true;
                let slug = self.article.slug.clone();
                Step::request(self, Request::PostComment { token, slug, body })
            }
            Msg::CommentPosted(Ok(comment)) => {
                self.posting_comment = false;
                self.comment_draft.clear();
                self.comments.insert(0, comment);
                Step::stay(self)
            }
            Msg::CommentPosted(Err(err)) => {
                self.posting_comment = false;
                self.errors = vec![err.message];
                Step::stay(self)
            }
            Msg::DeleteComment(id) => {
                let Some(token) = session.token().cloned() else {
                    return self.signed_out();
                };
                let slug = self.article.slug.clone();
                Step::request(self, Request::DeleteComment { token, slug, id })
            }
            Msg::CommentDeleted { id, result: Ok(()) } => {
                self.comments.retain(|comment| comment.id != id);
                Step::stay(self)
            }
            Msg::CommentDeleted { result: Err(err), .. } => {
                self.errors = vec![err.message];
                Step::stay(self)
            }
            Msg::ToggleFavorite => {
                let Some(token) = session.token().cloned() else {
                    return self.signed_out();
                };
                let request = Request::SetFavorited {
                    token,
                    slug: self.article.slug.clone(),
                    favorited: !self.article.favorited,
                };
                Step::request(self, request)
            }
            Msg::FavoriteToggled(Ok(article)) => {
                self.article = article;
                Step::stay(self)
            }
            Msg::ToggleFollow => {
                let Some(token) = session.token().cloned() else {
                    return self.signed_out();
                };
                let request = Request::SetFollowing {
                    token,
                    username: self.article.author.username.clone(),
                    following: !self.article.author.following,
                };
                Step::request(self, request)
            }
            Msg::FollowToggled(Ok(author)) => {
                self.article.author = author;
                Step::stay(self)
            }
            Msg::FavoriteToggled(Err(err)) | Msg::FollowToggled(Err(err)) => {
                self.errors = vec![err.message];
                Step::stay(self)
            }
            Msg::DeleteArticle => {
                let Some(token) = session.token().cloned() else {
                    return self.signed_out();
                };
                let slug = self.article.slug.clone();
                Step::request(self, Request::DeleteArticle { token, slug })
            }
            Msg::ArticleDeleted(Ok(())) => Step::stay(self).with_command(Command::Navigate(Route::Home)),
            Msg::ArticleDeleted(Err(err)) => {
                self.errors = vec![err.message];
                Step::stay(self)
            }
            Msg::DismissErrors => {
                self.errors.clear();
                Step::stay(self)
            }
        }
    }

    fn view(&self, session: &Session) -> Document {
        let article = &self.article;
        let viewer = session.user().map(|user| &user.username);
        let is_author = viewer == Some(&article.author.username);
        let actions = if is_author {
            format!(
                "<a class=\"btn btn-outline-secondary\" href=\"{}\">Edit Article</a><button class=\"btn btn-outline-danger\">Delete Article</button>",
                Route::EditArticle(article.slug.clone()).href()
            )
        } else {
            format!(
                "<button class=\"btn btn-outline-secondary\">{} {}</button><button class=\"btn btn-outline-primary\">{} Article ({})</button>",
                if article.author.following { "Unfollow" } else { "Follow" },
                escape(article.author.username.as_str()),
                if article.favorited { "Unfavorite" } else { "Favorite" },
                article.favorites_count,
            )
        };
        let comment_form = match session.user() {
            Some(user) => format!(
                "<form class=\"comment-form\"><textarea placeholder=\"Write a comment...\">{}</textarea>{}<button class=\"btn btn-primary\"{}>Post Comment</button></form>",
                escape(&self.comment_draft),
                super::avatar(user.image.as_deref()),
                if self.posting_comment { " disabled" } else { "" },
            ),
            None => format!(
                "<p><a href=\"{}\">Sign in</a> or <a href=\"{}\">sign up</a> to add comments on this article.</p>",
                Route::Login.href(),
                Route::Register.href()
            ),
        };
        let comments: Vec<String> = self
            .comments
            .iter()
            .map(|comment| {
                let delete = if viewer == Some(&comment.author.username) {
                    "<span class=\"mod-options\"><i class=\"ion-trash-a\"></i></span>"
                } else {
                    ""
                };
                format!(
                    "<div class=\"card\"><div class=\"card-block\"><p class=\"card-text\">{}</p></div><div class=\"card-footer\">{}{delete}</div></div>",
                    escape(&comment.body),
                    super::author_meta(&comment.author, &comment.created_at.format("%B %e, %Y").to_string()),
                )
            })
            .collect();
        let tags: Vec<String> = article
            .tag_list
            .iter()
            .map(|tag| format!("<li class=\"tag-pill\">{}</li>", escape(tag)))
            .collect();
        let body = format!(
            "<div class=\"article-page\">\n<div class=\"banner\"><h1>{title}</h1>{meta}{actions}</div>\n{errors}<div class=\"article-content\"><p>{content}</p><ul class=\"tag-list\">{tags}</ul></div>\n<div class=\"comments\">{comment_form}{comments}</div>\n</div>",
            title = escape(&article.title),
            meta = super::author_meta(&article.author, &article.created_at.format("%B %e, %Y").to_string()),
            errors = error_list(&self.errors),
            content = escape(&article.body),
            tags = tags.join(""),
            comments = comments.join("\n"),
        );
        Document::new(article.title.clone(), body)
    }
}
