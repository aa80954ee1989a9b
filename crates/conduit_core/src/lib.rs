//! Client core for the Conduit single-page application.

pub mod api;
pub mod error;
pub mod memory;
pub mod page;
pub mod pages;
pub mod route;
pub mod runtime;
pub mod session;
pub mod shell;
pub mod view;

pub use api::{ApiResult, ConduitApi};
pub use error::ShellError;
pub use memory::InMemoryConduit;
pub use route::Route;
pub use runtime::Runtime;
pub use session::{MemorySessionChannel, Session, SessionChannel};
pub use shell::{Effect, LoadPolicy, Model, Msg, Page, PageMsg, PageState, ShellConfig};
pub use view::{ActivePage, Document};
