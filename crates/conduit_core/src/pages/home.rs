//! Home feed: popular tags plus one selectable article feed.

use shared::{
    domain::{Article, AuthToken, Slug},
    error::ApiError,
    protocol::{ArticleList, ArticleQuery, DEFAULT_PAGE_SIZE},
};

use crate::{
    api::{ApiResult, ConduitApi},
    page::{PageLoadError, PageUnit, Step, SIGNED_OUT_ACTION},
    session::Session,
    view::{error_list, escape, ActivePage, Document},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Yours,
    Global,
    Tag(String),
}

impl FeedSource {
    fn label(&self) -> String {
        match self {
            FeedSource::Yours => "Your Feed".to_string(),
            FeedSource::Global => "Global Feed".to_string(),
            FeedSource::Tag(tag) => format!("#{tag}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub tags: Vec<String>,
    pub source: FeedSource,
    pub feed: ArticleList,
    pub loading_feed: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SelectFeed(FeedSource),
    FeedLoaded {
        source: FeedSource,
        result: Result<ArticleList, ApiError>,
    },
    ToggleFavorite(Slug),
    FavoriteToggled(Result<Article, ApiError>),
    DismissErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadFeed {
        token: Option<AuthToken>,
        source: FeedSource,
    },
    SetFavorited {
        token: AuthToken,
        slug: Slug,
        favorited: bool,
    },
}

pub const LOAD_FAILED: &str = "Homepage is currently unavailable.";

/// Signed-in visitors start on their own feed, everyone else on the global one.
pub async fn load(api: &dyn ConduitApi, token: Option<AuthToken>) -> Result<Model, PageLoadError> {
    let source = if token.is_some() {
        FeedSource::Yours
    } else {
        FeedSource::Global
    };
    let (tags, feed) = futures::future::try_join(
        api.tags(),
        fetch_feed(api, token.as_ref(), &source),
    )
    .await
    .map_err(|err| {
        tracing::debug!(error = %err, "home load failed");
        PageLoadError::new(ActivePage::Home, LOAD_FAILED)
    })?;
    Ok(Model {
        tags,
        source,
        feed,
        loading_feed: false,
        errors: Vec::new(),
    })
}

async fn fetch_feed(
    api: &dyn ConduitApi,
    token: Option<&AuthToken>,
    source: &FeedSource,
) -> ApiResult<ArticleList> {
    match source {
        FeedSource::Yours => match token {
            Some(token) => api.feed(token, DEFAULT_PAGE_SIZE, 0).await,
            None => Err(ApiError::unauthorized()),
        },
        FeedSource::Global => api.articles(token, ArticleQuery::default()).await,
        FeedSource::Tag(tag) => api.articles(token, ArticleQuery::tagged(tag.clone())).await,
    }
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::LoadFeed { token, source } => {
            let result = fetch_feed(api, token.as_ref(), &source).await;
            Msg::FeedLoaded { source, result }
        }
        Request::SetFavorited {
            token,
            slug,
            favorited,
        } => Msg::FavoriteToggled(api.set_favorited(&token, &slug, favorited).await),
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SelectFeed(source) => {
                if source == FeedSource::Yours && !session.is_signed_in() {
                    self.errors = vec![SIGNED_OUT_ACTION.to_string()];
                    return Step::stay(self);
                }
                self.source = source.clone();
                self.loading_feed = true;
                let token = session.token().cloned();
                Step::request(self, Request::LoadFeed { token, source })
            }
            Msg::FeedLoaded { source, result } => {
                // A feed the user already switched away from.
                if source != self.source {
                    return Step::stay(self);
                }
                self.loading_feed = false;
                match result {
                    Ok(feed) => self.feed = feed,
                    Err(err) => self.errors = vec![err.message],
                }
                Step::stay(self)
            }
            Msg::ToggleFavorite(slug) => {
                let Some(token) = session.token().cloned() else {
                    self.errors = vec![SIGNED_OUT_ACTION.to_string()];
                    return Step::stay(self);
                };
                let favorited = !self
                    .feed
                    .articles
                    .iter()
                    .any(|article| article.slug == slug && article.favorited);
                Step::request(
                    self,
                    Request::SetFavorited {
                        token,
                        slug,
                        favorited,
                    },
                )
            }
            Msg::FavoriteToggled(Ok(updated)) => {
                for article in self.feed.articles.iter_mut() {
                    if article.slug == updated.slug {
                        *article = updated.clone();
                    }
                }
                Step::stay(self)
            }
            Msg::FavoriteToggled(Err(err)) => {
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
        let mut sources = Vec::new();
        if session.is_signed_in() {
            sources.push(FeedSource::Yours);
        }
        sources.push(FeedSource::Global);
        if let FeedSource::Tag(tag) = &self.source {
            sources.push(FeedSource::Tag(tag.clone()));
        }
        let tabs: Vec<String> = sources
            .iter()
            .map(|source| {
                let class = if *source == self.source {
                    "nav-link active"
                } else {
                    "nav-link"
                };
                format!("<li class=\"nav-item\"><a class=\"{class}\">{}</a></li>", escape(&source.label()))
            })
            .collect();
        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|tag| format!("<a class=\"tag-pill\">{}</a>", escape(tag)))
            .collect();
        let feed = if self.loading_feed {
            "<div class=\"loading\">Loading...</div>".to_string()
        } else {
            super::article_list(&self.feed.articles)
        };
        let body = format!(
            "<div class=\"home-page\">\n<div class=\"banner\"><h1 class=\"logo-font\">conduit</h1><p>A place to share your knowledge.</p></div>\n{errors}<div class=\"feed-toggle\"><ul class=\"nav nav-pills\">{tabs}</ul></div>\n{feed}\n<div class=\"sidebar\"><p>Popular Tags</p><div class=\"tag-list\">{tags}</div></div>\n</div>",
            errors = error_list(&self.errors),
            tabs = tabs.join(""),
            tags = tags.join(""),
        );
        Document::new("Home", body)
    }
}
