use std::{fmt, str::FromStr};

use serde::Deserialize;
use shared::domain::{AuthToken, Slug, User, Username};
use tracing::{debug, info, warn};

use crate::{
    api::ConduitApi,
    page::{Command, Outcome, PageLoadError, PageUnit, Step, Subscription},
    pages::{article, editor, errored, home, login, not_found, profile, register, settings},
    route::Route,
    session::{decode_boot_payload, Session},
    view::{frame, ActivePage, Document},
};

pub const SETTINGS_SIGNED_OUT: &str = "You must be signed in to access your settings.";
pub const NEW_ARTICLE_SIGNED_OUT: &str = "You must be signed in to post an article.";
pub const EDIT_ARTICLE_SIGNED_OUT: &str = "You must be signed in to edit an article.";
pub const EDITOR_NEW_SIGNED_OUT: &str = "You must be signed in to post articles.";
pub const EDITOR_EDIT_SIGNED_OUT: &str = "You must be signed in to edit articles.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Every completion is applied in arrival order, stale or not.
    #[default]
    LastCompletionWins,
    /// Completions issued before the most recent navigation are dropped.
    LatestNavigationOnly,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_completion_wins" => Ok(Self::LastCompletionWins),
            "latest_navigation" | "latest_navigation_only" => Ok(Self::LatestNavigationOnly),
            other => Err(format!("unknown load policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellConfig {
    pub load_policy: LoadPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub u64);

impl Epoch {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Blank,
    NotFound,
    Errored(PageLoadError),
    Home(home::Model),
    Settings(settings::Model),
    Login(login::Model),
    Register(register::Model),
    Profile(Username, profile::Model),
    Article(article::Model),
    Editor(Option<Slug>, editor::Model),
}

impl Page {
    pub fn kind(&self) -> &'static str {
        match self {
            Page::Blank => "blank",
            Page::NotFound => "not_found",
            Page::Errored(_) => "errored",
            Page::Home(_) => "home",
            Page::Settings(_) => "settings",
            Page::Login(_) => "login",
            Page::Register(_) => "register",
            Page::Profile(..) => "profile",
            Page::Article(_) => "article",
            Page::Editor(..) => "editor",
        }
    }
}

/// `TransitioningFrom` always holds the page being replaced, never the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Loaded(Page),
    TransitioningFrom(Page),
}

impl PageState {
    pub fn page(&self) -> &Page {
        match self {
            PageState::Loaded(page) | PageState::TransitioningFrom(page) => page,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, PageState::TransitioningFrom(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub session: Session,
    pub page_state: PageState,
    epoch: Epoch,
    load_policy: LoadPolicy,
}

impl Model {
    pub fn new(config: ShellConfig, session: Session) -> Self {
        Self {
            session,
            page_state: PageState::Loaded(Page::Blank),
            epoch: Epoch::default(),
            load_policy: config.load_policy,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn page(&self) -> &Page {
        self.page_state.page()
    }

    fn accepts(&self, epoch: Epoch) -> bool {
        match self.load_policy {
            LoadPolicy::LastCompletionWins => true,
            LoadPolicy::LatestNavigationOnly => epoch == self.epoch,
        }
    }

    fn token(&self) -> Option<AuthToken> {
        self.session.token().cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SetRoute(Option<Route>),
    HomeLoaded {
        epoch: Epoch,
        result: Result<home::Model, PageLoadError>,
    },
    ArticleLoaded {
        epoch: Epoch,
        slug: Slug,
        result: Result<article::Model, PageLoadError>,
    },
    ProfileLoaded {
        epoch: Epoch,
        username: Username,
        result: Result<profile::Model, PageLoadError>,
    },
    EditArticleLoaded {
        epoch: Epoch,
        slug: Slug,
        result: Result<editor::Model, PageLoadError>,
    },
    SetUser(Option<User>),
    Page(PageMsg),
}

impl Msg {
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::SetRoute(_) => "set_route",
            Msg::HomeLoaded { .. } => "home_loaded",
            Msg::ArticleLoaded { .. } => "article_loaded",
            Msg::ProfileLoaded { .. } => "profile_loaded",
            Msg::EditArticleLoaded { .. } => "edit_article_loaded",
            Msg::SetUser(_) => "set_user",
            Msg::Page(msg) => msg.kind(),
        }
    }
}

/// Input meant for one specific page. Dropped if that page is not current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMsg {
    Home(home::Msg),
    Settings(settings::Msg),
    Login(login::Msg),
    Register(register::Msg),
    Profile(profile::Msg),
    Article(article::Msg),
    Editor(editor::Msg),
}

impl PageMsg {
    pub fn kind(&self) -> &'static str {
        match self {
            PageMsg::Home(_) => "home_msg",
            PageMsg::Settings(_) => "settings_msg",
            PageMsg::Login(_) => "login_msg",
            PageMsg::Register(_) => "register_msg",
            PageMsg::Profile(_) => "profile_msg",
            PageMsg::Article(_) => "article_msg",
            PageMsg::Editor(_) => "editor_msg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Home {
        token: Option<AuthToken>,
    },
    Article {
        token: Option<AuthToken>,
        slug: Slug,
    },
    Profile {
        token: Option<AuthToken>,
        username: Username,
    },
    EditArticle {
        token: Option<AuthToken>,
        slug: Slug,
    },
}

impl LoadRequest {
    pub async fn perform(self, api: &dyn ConduitApi, epoch: Epoch) -> Msg {
        match self {
            LoadRequest::Home { token } => Msg::HomeLoaded {
                epoch,
                result: home::load(api, token).await,
            },
            LoadRequest::Article { token, slug } => Msg::ArticleLoaded {
                epoch,
                result: article::load(api, token, slug.clone()).await,
                slug,
            },
            LoadRequest::Profile { token, username } => Msg::ProfileLoaded {
                epoch,
                result: profile::load(api, token, username.clone()).await,
                username,
            },
            LoadRequest::EditArticle { token, slug } => Msg::EditArticleLoaded {
                epoch,
                result: editor::load_edit(api, token, slug.clone()).await,
                slug,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Home(home::Request),
    Settings(settings::Request),
    Login(login::Request),
    Register(register::Request),
    Profile(profile::Request),
    Article(article::Request),
    Editor(editor::Request),
}

impl PageRequest {
    pub async fn perform(self, api: &dyn ConduitApi) -> PageMsg {
        match self {
            PageRequest::Home(request) => PageMsg::Home(home::perform(api, request).await),
            PageRequest::Settings(request) => {
                PageMsg::Settings(settings::perform(api, request).await)
            }
            PageRequest::Login(request) => PageMsg::Login(login::perform(api, request).await),
            PageRequest::Register(request) => {
                PageMsg::Register(register::perform(api, request).await)
            }
            PageRequest::Profile(request) => {
                PageMsg::Profile(profile::perform(api, request).await)
            }
            PageRequest::Article(request) => {
                PageMsg::Article(article::perform(api, request).await)
            }
            PageRequest::Editor(request) => PageMsg::Editor(editor::perform(api, request).await),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load { epoch: Epoch, request: LoadRequest },
    StoreSession(Option<User>),
    /// Change the location without a reload; the new location comes back as `SetRoute`.
    ReplaceUrl(Route),
    Page(PageRequest),
}

pub fn init(
    config: ShellConfig,
    boot_payload: Option<&str>,
    route: Option<Route>,
) -> (Model, Vec<Effect>) {
    let user = boot_payload.and_then(decode_boot_payload);
    info!(signed_in = user.is_some(), "booting shell");
    let mut model = Model::new(config, Session::new(user));
    let effects = set_route(&mut model, route);
    (model, effects)
}

pub fn update(model: &mut Model, msg: Msg) -> Vec<Effect> {
    debug!(msg = msg.kind(), page = model.page().kind(), "handling message");
    match msg {
        Msg::SetRoute(route) => set_route(model, route),
        Msg::HomeLoaded { epoch, result } => {
            complete(model, epoch, "home", result.map(Page::Home))
        }
        Msg::ArticleLoaded {
            epoch,
            slug,
            result,
        } => {
            debug!(%slug, "article load completed");
            complete(model, epoch, "article", result.map(Page::Article))
        }
        Msg::ProfileLoaded {
            epoch,
            username,
            result,
        } => complete(
            model,
            epoch,
            "profile",
            result.map(|state| Page::Profile(username, state)),
        ),
        Msg::EditArticleLoaded {
            epoch,
            slug,
            result,
        } => complete(
            model,
            epoch,
            "editor",
            result.map(|state| Page::Editor(Some(slug), state)),
        ),
        Msg::SetUser(user) => set_user(model, user),
        Msg::Page(msg) => update_page(model, msg),
    }
}

fn set_route(model: &mut Model, route: Option<Route>) -> Vec<Effect> {
    info!(route = ?route, "route changed");
    let route = match route {
        Some(Route::Root) => return vec![Effect::ReplaceUrl(Route::Home)],
        Some(Route::Logout) => {
            model.session.set_user(None);
            info!("signed out");
            return vec![Effect::StoreSession(None), Effect::ReplaceUrl(Route::Home)];
        }
        other => other,
    };

    // Redirects above do not start a navigation of their own.
    model.epoch = model.epoch.next();
    let Some(route) = route else {
        return loaded(model, Page::NotFound);
    };
    let user = model.session.user().cloned();
    let token = model.token();
    match route {
        Route::Login => loaded(model, Page::Login(login::init())),
        Route::Register => loaded(model, Page::Register(register::init())),
        Route::Settings => match user {
            Some(user) => loaded(model, Page::Settings(settings::init(&user))),
            None => errored(model, ActivePage::Settings, SETTINGS_SIGNED_OUT),
        },
        Route::NewArticle => match user {
            Some(_) => loaded(model, Page::Editor(None, editor::new_article())),
            None => errored(model, ActivePage::NewArticle, NEW_ARTICLE_SIGNED_OUT),
        },
        Route::EditArticle(slug) => match user {
            Some(_) => transition(model, LoadRequest::EditArticle { token, slug }),
            None => errored(model, ActivePage::Other, EDIT_ARTICLE_SIGNED_OUT),
        },
        Route::Home => transition(model, LoadRequest::Home { token }),
        Route::Profile(username) => transition(model, LoadRequest::Profile { token, username }),
        Route::Article(slug) => transition(model, LoadRequest::Article { token, slug }),
        Route::Root | Route::Logout => Vec::new(),
    }
}

fn loaded(model: &mut Model, page: Page) -> Vec<Effect> {
    model.page_state = PageState::Loaded(page);
    Vec::new()
}

fn errored(model: &mut Model, active_page: ActivePage, message: &str) -> Vec<Effect> {
    loaded(
        model,
        Page::Errored(PageLoadError::new(active_page, message)),
    )
}

fn transition(model: &mut Model, request: LoadRequest) -> Vec<Effect> {
    let previous = std::mem::replace(&mut model.page_state, PageState::Loaded(Page::Blank));
    model.page_state = match previous {
        PageState::Loaded(page) | PageState::TransitioningFrom(page) => {
            PageState::TransitioningFrom(page)
        }
    };
    vec![Effect::Load {
        epoch: model.epoch,
        request,
    }]
}

fn complete(
    model: &mut Model,
    epoch: Epoch,
    target: &'static str,
    result: Result<Page, PageLoadError>,
) -> Vec<Effect> {
    if !model.accepts(epoch) {
        warn!(
            target_page = target,
            load_epoch = %epoch,
            current_epoch = %model.epoch,
            "discarding completion of a superseded navigation"
        );
        return Vec::new();
    }
    let page = result.unwrap_or_else(|err| {
        debug!(target_page = target, message = %err.message, "page load failed");
        Page::Errored(err)
    });
    model.page_state = PageState::Loaded(page);
    Vec::new()
}

fn set_user(model: &mut Model, user: Option<User>) -> Vec<Effect> {
    let signed_in = user.is_some();
    if model.session.set_user(user) {
        info!("session ended elsewhere; returning home");
        vec![Effect::ReplaceUrl(Route::Home)]
    } else {
        debug!(signed_in, "session updated");
        Vec::new()
    }
}

fn update_page(model: &mut Model, msg: PageMsg) -> Vec<Effect> {
    let state = std::mem::replace(&mut model.page_state, PageState::Loaded(Page::Blank));
    let page = match state {
        PageState::Loaded(page) => page,
        transitioning @ PageState::TransitioningFrom(_) => {
            debug!(msg = msg.kind(), "page input ignored during transition");
            model.page_state = transitioning;
            return Vec::new();
        }
    };

    match (msg, page) {
        (PageMsg::Home(msg), Page::Home(state)) => {
            let step = state.update(&model.session, msg);
            apply_step(model, step, Page::Home, PageRequest::Home)
        }
        (PageMsg::Settings(msg), Page::Settings(state)) => {
            let step = state.update(&model.session, msg);
            apply_step(model, step, Page::Settings, PageRequest::Settings)
        }
        (PageMsg::Login(msg), Page::Login(state)) => {
            let step = state.update(&model.session, msg);
            apply_step(model, step, Page::Login, PageRequest::Login)
        }
        (PageMsg::Register(msg), Page::Register(state)) => {
            let step = state.update(&model.session, msg);
            apply_step(model, step, Page::Register, PageRequest::Register)
        }
        (PageMsg::Profile(msg), Page::Profile(username, state)) => {
            let step = state.update(&model.session, msg);
            apply_step(
                model,
                step,
                |state| Page::Profile(username, state),
                PageRequest::Profile,
            )
        }
        (PageMsg::Article(msg), Page::Article(state)) => {
            let step = state.update(&model.session, msg);
            apply_step(model, step, Page::Article, PageRequest::Article)
        }
        (PageMsg::Editor(msg), Page::Editor(slug, state)) => {
            if !model.session.is_signed_in() {
                return match slug {
                    None => errored(model, ActivePage::NewArticle, EDITOR_NEW_SIGNED_OUT),
                    Some(_) => errored(model, ActivePage::Other, EDITOR_EDIT_SIGNED_OUT),
                };
            }
            let step = state.update(&model.session, msg);
            apply_step(
                model,
                step,
                |state| Page::Editor(slug, state),
                PageRequest::Editor,
            )
        }
        (msg, page) => {
            debug!(
                msg = msg.kind(),
                page = page.kind(),
                "dropping message for inactive page"
            );
            model.page_state = PageState::Loaded(page);
            Vec::new()
        }
    }
}

/// Writes a page update back: session outcome first, then the page state.
fn apply_step<M, R>(
    model: &mut Model,
    step: Step<M, R>,
    into_page: impl FnOnce(M) -> Page,
    into_request: fn(R) -> PageRequest,
) -> Vec<Effect> {
    let Step {
        model: state,
        commands,
        outcome,
    } = step;

    let mut effects = Vec::new();
    if let Outcome::SetUser(user) = outcome {
        info!(username = %user.username, "page signed in user");
        effects.push(Effect::StoreSession(Some(user.clone())));
        model.session.set_user(Some(user));
    }
    model.page_state = PageState::Loaded(into_page(state));

    effects.extend(commands.into_iter().map(|command| match command {
        Command::Request(request) => Effect::Page(into_request(request)),
        Command::Navigate(route) => Effect::ReplaceUrl(route),
    }));
    effects
}

pub fn subscriptions(model: &Model) -> Vec<Subscription> {
    let mut subscriptions = match model.page() {
        Page::Home(state) => state.subscriptions(),
        Page::Settings(state) => state.subscriptions(),
        Page::Login(state) => state.subscriptions(),
        Page::Register(state) => state.subscriptions(),
        Page::Profile(_, state) => state.subscriptions(),
        Page::Article(state) => state.subscriptions(),
        Page::Editor(_, state) => state.subscriptions(),
        Page::Blank | Page::NotFound | Page::Errored(_) => Vec::new(),
    };
    subscriptions.push(Subscription::SessionChanges);
    subscriptions
}

pub fn view(model: &Model) -> Document {
    let is_loading = model.page_state.is_transitioning();
    let session = &model.session;
    let (active_page, content) = match model.page() {
        Page::Blank => (ActivePage::Other, Document::new("", "")),
        Page::NotFound => (ActivePage::Other, not_found::view()),
        Page::Errored(error) => (ActivePage::Other, errored::view(session, error)),
        Page::Home(state) => (ActivePage::Home, state.view(session)),
        Page::Settings(state) => (ActivePage::Settings, state.view(session)),
        Page::Login(state) => (ActivePage::Login, state.view(session)),
        Page::Register(state) => (ActivePage::Register, state.view(session)),
        Page::Profile(username, state) => {
            (ActivePage::Profile(username.clone()), state.view(session))
        }
        Page::Article(state) => (ActivePage::Other, state.view(session)),
        Page::Editor(slug, state) => {
            let active = if slug.is_none() {
                ActivePage::NewArticle
            } else {
                ActivePage::Other
            };
            (active, state.view(session))
        }
    };
    frame(is_loading, session.user(), &active_page, content)
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
