use shared::domain::User;

use crate::{
    route::Route,
    session::Session,
    view::{ActivePage, Document},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    None,
    SetUser(User),
}

/// Work a page asks the shell to carry out after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<R> {
    /// Async request; its result comes back as a page message.
    Request(R),
    Navigate(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    SessionChanges,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step<M, R> {
    pub model: M,
    pub commands: Vec<Command<R>>,
    pub outcome: Outcome,
}

impl<M, R> Step<M, R> {
    pub fn stay(model: M) -> Self {
        Self {
            model,
            commands: Vec::new(),
            outcome: Outcome::None,
        }
    }

    pub fn request(model: M, request: R) -> Self {
        Self {
            model,
            commands: vec![Command::Request(request)],
            outcome: Outcome::None,
        }
    }

    pub fn with_command(mut self, command: Command<R>) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

pub trait PageUnit: Sized {
    type Msg;
    type Request;

    fn update(self, session: &Session, msg: Self::Msg) -> Step<Self, Self::Request>;

    fn view(&self, session: &Session) -> Document;

    fn subscriptions(&self) -> Vec<Subscription> {
        Vec::new()
    }
}

/// Why a page could not be entered. Rendered by the error page; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoadError {
    pub active_page: ActivePage,
    pub message: String,
}

impl PageLoadError {
    pub fn new(active_page: ActivePage, message: impl Into<String>) -> Self {
        Self {
            active_page,
            message: message.into(),
        }
    }
}

pub const SIGNED_OUT_ACTION: &str =
    "You are currently signed out. You must be signed in to perform this action.";
