use shared::{domain::User, error::ApiError};

use crate::{
    api::ConduitApi,
    page::{Command, Outcome, PageUnit, Step},
    route::Route,
    session::Session,
    view::{error_list, escape, Document},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub email: String,
    pub password: String,
    pub submitting: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    SetEmail(String),
    SetPassword(String),
    Submit,
    Completed(Result<User, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Submit { email: String, password: String },
}

pub fn init() -> Model {
    Model::default()
}

pub async fn perform(api: &dyn ConduitApi, request: Request) -> Msg {
    match request {
        Request::Submit { email, password } => Msg::Completed(api.login(&email, &password).await),
    }
}

impl PageUnit for Model {
    type Msg = Msg;
    type Request = Request;

    fn update(mut self, _session: &Session, msg: Msg) -> Step<Self, Request> {
        match msg {
            Msg::SetEmail(email) => {
                self.email = email;
                Step::stay(self)
            }
            Msg::SetPassword(password) => {
                self.password = password;
                Step::stay(self)
            }
            Msg::Submit => {
                if self.submitting {
                    return Step::stay(self);
                }
                self.submitting = true;
                self.errors.clear();
                let request = Request::Submit {
                    email: self.email.clone(),
                    password: self.password.clone(),
                };
                Step::request(self, request)
            }
            Msg::Completed(Ok(user)) => {
                self.submitting = false;
                self.password.clear();
                Step::stay(self)
                    .with_command(Command::Navigate(Route::Home))
                    .with_outcome(Outcome::SetUser(user))
            }
            Msg::Completed(Err(err)) => {
                self.submitting = false;
                self.errors = vec![err.message];
                Step::stay(self)
            }
        }
    }

    fn view(&self, _session: &Session) -> Document {
        let body = format!(
            "<div class=\"auth-page\">\n<h1>Sign in</h1><p><a href=\"{register}\">Need an account?</a></p>\n{errors}<form>\n<input class=\"form-control\" placeholder=\"Email\" value=\"{email}\">\n<input class=\"form-control\" type=\"password\" placeholder=\"Password\">\n<button class=\"btn btn-primary\"{disabled}>Sign in</button>\n</form>\n</div>",
            register = Route::Register.href(),
            errors = error_list(&self.errors),
            email = escape(&self.email),
            disabled = if self.submitting { " disabled" } else { "" },
        );
        Document::new("Login", body)
    }
}
