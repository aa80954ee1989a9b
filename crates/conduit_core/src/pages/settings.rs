use shared::{
    domain::{AuthToken, User, UserUpdate, Username},
    error::ApiError,
};

use crate::{
    api::ConduitApi,
    page::{Command, Outcome, PageUnit, Step, SIGNED_OUT_ACTION},
    route::Route,
    session::Session,
    view::{error_list, escape, Document},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub email: String,
    pub username: String,
    pub bio: String,
    pub image: String,
    /// Left empty unless the user wants to change it.
    pub password: String,
    pub saving: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SetEmail(String),
    SetUsername(String),
    SetBio(String),
    SetImage(String),
    SetPassword(String),
    Submit,
    Saved(Result<User, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Save { token: AuthToken, update: UserUpdate },
}

pub fn init(user: &User) -> Model {
    Model {
        email: user.email.clone(),
        username: user.username.to_string(),
        bio: user.bio.clone().unwrap_or_default(),
        image: user.image.clone().unwrap_or_default(),
        password: String::new(),
        saving: false,
        errors: Vec::new(),
    }
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::Save { token, update } => Msg::Saved(api.update_user(&token, update).await),
    }
}

impl Model {
    fn update_request(&self) -> UserUpdate {
        UserUpdate {
            email: Some(self.email.trim().to_string()),
            username: Some(Username::new(self.username.trim())),
            bio: Some(self.bio.clone()),
            image: Some(self.image.trim().to_string()),
            password: Some(self.password.clone()).filter(|password| !password.is_empty()),
        }
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SetEmail(email) => {
                self.email = email;
                Step::stay(self)
            }
            Msg::SetUsername(username) => {
                self.username = username;
                Step::stay(self)
            }
            Msg::SetBio(bio) => {
                self.bio = bio;
                Step::stay(self)
            }
            Msg::SetImage(image) => {
                self.image = image;
                Step::stay(self)
            }
            Msg::SetPassword(password) => {
                self.password = password;
                Step::stay(self)
            }
            Msg::Submit => {
                let Some(token) = session.token().cloned() else {
                    self.errors = vec![SIGNED_OUT_ACTION.to_string()];
                    return Step::stay(self);
                };
                if self.saving {
                    return Step::stay(self);
                }
                self.saving = true;
                self.errors.clear();
                let update = self.update_request();
                Step::request(self, Request::Save { token, update })
            }
            Msg::Saved(Ok(user)) => {
                self.saving = false;
                self.password.clear();
                Step::stay(self)
                    .with_command(Command::Navigate(Route::Home))
                    .with_outcome(Outcome::SetUser(user))
            }
            Msg::Saved(Err(err)) => {
                self.saving = false;
                self.errors = vec![err.message];
                Step::stay(self)
            }
        }
    }

    fn view(&self, _session: &Session) -> Document {
        let body = format!(
            "<div class=\"settings-page\">\n<h1>Your Settings</h1>\n{errors}<form>\n<input class=\"form-control\" placeholder=\"URL of profile picture\" value=\"{image}\">\n<input class=\"form-control\" placeholder=\"Username\" value=\"{username}\">\n<textarea class=\"form-control\" placeholder=\"Short bio about you\">{bio}</textarea>\n<input class=\"form-control\" placeholder=\"Email\" value=\"{email}\">\n<input class=\"form-control\" type=\"password\" placeholder=\"Password\">\n<button class=\"btn btn-primary\"{disabled}>Update Settings</button>\n</form>\n<a class=\"btn btn-outline-danger\" href=\"{logout}\">Or click here to logout.</a>\n</div>",
            errors = error_list(&self.errors),
            image = escape(&self.image),
            username = escape(&self.username),
            bio = escape(&self.bio),
            email = escape(&self.email),
            disabled = if self.saving { " disabled" } else { "" },
            logout = Route::Logout.href(),
        );
        Document::new("Settings", body)
    }
}
