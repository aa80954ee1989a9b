//! Author profile with their articles or the articles they favorited.

use shared::{
    domain::{AuthToken, Profile, Username},
    error::ApiError,
    protocol::{ArticleList, ArticleQuery},
};

use crate::{
    api::{ApiResult, ConduitApi},
    page::{PageLoadError, PageUnit, Step, SIGNED_OUT_ACTION},
    route::Route,
    session::Session,
    view::{error_list, escape, ActivePage, Document},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    MyArticles,
    FavoritedArticles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub profile: Profile,
    pub tab: Tab,
    pub articles: ArticleList,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SelectTab(Tab),
    ArticlesLoaded {
        tab: Tab,
        result: Result<ArticleList, ApiError>,
    },
    ToggleFollow,
    FollowToggled(Result<Profile, ApiError>),
    DismissErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadArticles {
        token: Option<AuthToken>,
        username: Username,
        tab: Tab,
    },
    SetFollowing {
        token: AuthToken,
        username: Username,
        following: bool,
    },
}

pub const LOAD_FAILED: &str = "Profile is currently unavailable.";

pub async fn load(
    api: &dyn ConduitApi,
    token: Option<AuthToken>,
    username: Username,
) -> Result<Model, PageLoadError> {
    let (profile, articles) = futures::future::try_join(
        api.profile(token.as_ref(), &username),
        fetch_articles(api, token.as_ref(), &username, Tab::MyArticles),
    )
    .await
    .map_err(|err| {
        tracing::debug!(%username, error = %err, "profile load failed");
        PageLoadError::new(ActivePage::Profile(username.clone()), LOAD_FAILED)
    })?;
    Ok(Model {
        profile,
        tab: Tab::MyArticles,
        articles,
        errors: Vec::new(),
    })
}

async fn fetch_articles(
    api: &dyn ConduitApi,
    token: Option<&AuthToken>,
    username: &Username,
    tab: Tab,
) -> ApiResult<ArticleList> {
    let query = match tab {
        Tab::MyArticles => ArticleQuery::by_author(username.clone()),
        Tab::FavoritedArticles => ArticleQuery::favorited_by(username.clone()),
    };
    api.articles(token, query).await
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::LoadArticles {
            token,
            username,
            tab,
        } => Msg::ArticlesLoaded {
            tab,
            result: fetch_articles(api, token.as_ref(), &username, tab).await,
        },
        Request::SetFollowing {
            token,
            username,
            following,
        } => Msg::FollowToggled(api.set_following(&token, &username, following).await),
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SelectTab(tab) => {
                self.tab = tab;
                let request = Request::LoadArticles {
                    token: session.token().cloned(),
                    username: self.profile.username.clone(),
                    tab,
                };
                Step::request(self, request)
            }
            Msg::ArticlesLoaded { tab, result } => {
                if tab != self.tab {
                    return Step::stay(self);
                }
                match result {
                    Ok(articles) => self.articles = articles,
                    Err(err) => self.errors = vec![err.message],
                }
                Step::stay(self)
            }
            Msg::ToggleFollow => {
                let Some(token) = session.token().cloned() else {
                    self.errors = vec![SIGNED_OUT_ACTION.to_string()];
                    return Step::stay(self);
                };
                let request = Request::SetFollowing {
                    token,
                    username: self.profile.username.clone(),
                    following: !self.profile.following,
                };
                Step::request(self, request)
            }
            Msg::FollowToggled(Ok(profile)) => {
                self.profile = profile;
                Step::stay(self)
            }
            Msg::FollowToggled(Err(err)) => {
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
        let profile = &self.profile;
        let is_self = session
            .user()
            .is_some_and(|user| user.username == profile.username);
        let action = if is_self {
            format!(
                "<a class=\"btn btn-outline-secondary\" href=\"{}\">Edit Profile Settings</a>",
                Route::Settings.href()
            )
        } else {
            format!(
                "<button class=\"btn btn-outline-secondary\">{} {}</button>",
                if profile.following { "Unfollow" } else { "Follow" },
                escape(profile.username.as_str())
            )
        };
        let tab = |tab: Tab, label: &str| {
            let class = if tab == self.tab {
                "nav-link active"
            } else {
                "nav-link"
            };
            format!("<li class=\"nav-item\"><a class=\"{class}\">{label}</a></li>")
        };
        let body = format!(
            "<div class=\"profile-page\">\n<div class=\"user-info\">{avatar}<h4>{name}</h4><p>{bio}</p>{action}</div>\n{errors}<div class=\"articles-toggle\"><ul class=\"nav nav-pills\">{mine}{favorited}</ul></div>\n{articles}\n</div>",
            avatar = super::avatar(profile.image.as_deref()),
            name = escape(profile.username.as_str()),
            bio = escape(profile.bio.as_deref().unwrap_or_default()),
            errors = error_list(&self.errors),
            mine = tab(Tab::MyArticles, "My Articles"),
            favorited = tab(Tab::FavoritedArticles, "Favorited Articles"),
            articles = super::article_list(&self.articles.articles),
        );
        Document::new(format!("Profile - {}", profile.username), body)
    }
}
