//! Article editor, both for new articles and for editing an existing one.

use shared::{
    domain::{Article, ArticleDraft, AuthToken, Slug},
    error::ApiError,
};

use crate::{
    api::ConduitApi,
    page::{Command, PageLoadError, PageUnit, Step, SIGNED_OUT_ACTION},
    route::Route,
    session::Session,
    view::{error_list, escape, ActivePage, Document},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub editing: Option<Slug>,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: String,
    pub saving: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SetTitle(String),
    SetDescription(String),
    SetBody(String),
    SetTags(String),
    Save,
    Saved(Result<Article, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create {
        token: AuthToken,
        draft: ArticleDraft,
    },
    Update {
        token: AuthToken,
        slug: Slug,
        draft: ArticleDraft,
    },
}

pub const LOAD_FAILED: &str = "Article is currently unavailable.";

pub fn new_article() -> Model {
    Model::default()
}

pub async fn load_edit(
    api: &dyn ConduitApi,
    token: Option<AuthToken>,
    slug: Slug,
) -> Result<Model, PageLoadError> {
    let article = api.article(token.as_ref(), &slug).await.map_err(|err| {
        tracing::debug!(%slug, error = %err, "editor load failed");
        PageLoadError::new(ActivePage::Other, LOAD_FAILED)
    })?;
    Ok(Model {
        editing: Some(slug),
        title: article.title,
        description: article.description,
        body: article.body,
        tags: article.tag_list.join(" "),
        saving: false,
        errors: Vec::new(),
    })
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::Create { token, draft } => Msg::Saved(api.create_article(&token, draft).await),
        Request::Update { token, slug, draft } => {
            Msg::Saved(api.update_article(&token, &slug, draft).await)
        }
    }
}

impl Model {
    fn draft(&self) -> ArticleDraft {
        ArticleDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            body: self.body.clone(),
            tag_list: self
                .tags
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SetTitle(title) => {
                self.title = title;
                Step::stay(self)
            }
            Msg::SetDescription(description) => {
                self.description = description;
                Step::stay(self)
            }
            Msg::SetBody(body) => {
                self.body = body;
                Step::stay(self)
            }
            Msg::SetTags(tags) => {
                self.tags = tags;
                Step::stay(self)
            }
            Msg::Save => {
                let Some(token) = session.token().cloned() else {
                    self.errors = vec![SIGNED_OUT_ACTION.to_string()];
                    return Step::stay(self);
                };
                if self.saving {
                    return Step::stay(self);
                }
                self.saving = true;
                self.errors.clear();
                let draft = self.draft();
                let request = match self.editing.clone() {
                    Some(slug) => Request::Update { token, slug, draft },
                    None => Request::Create { token, draft },
                };
                Step::request(self, request)
            }
            Msg::Saved(Ok(article)) => {
                self.saving = false;
                Step::stay(self).with_command(Command::Navigate(Route::Article(article.slug)))
            }
            Msg::Saved(Err(err)) => {
                self.saving = false;
                self.errors = vec![err.message];
                Step::stay(self)
            }
        }
    }

    fn view(&self, _session: &Session) -> Document {
        let (title, button) = match &self.editing {
            Some(_) => ("Edit Article", "Update Article"),
            None => ("New Article", "Publish Article"),
        };
        let body = format!(
            "<div class=\"editor-page\">\n{errors}<form>\n<input class=\"form-control\" placeholder=\"Article Title\" value=\"{title_value}\">\n<input class=\"form-control\" placeholder=\"What's this article about?\" value=\"{description}\">\n<textarea class=\"form-control\" placeholder=\"Write your article (in markdown)\">{body}</textarea>\n<input class=\"form-control\" placeholder=\"Enter tags\" value=\"{tags}\">\n<button class=\"btn btn-primary\"{disabled}>{button}</button>\n</form>\n</div>",
            errors = error_list(&self.errors),
            title_value = escape(&self.title),
            description = escape(&self.description),
            body = escape(&self.body),
            tags = escape(&self.tags),
            disabled = if self.saving { " disabled" } else { "" },
        );
        Document::new(title, body)
    }
}
