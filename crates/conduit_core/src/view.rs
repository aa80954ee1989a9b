use shared::domain::{User, Username};

use crate::route::Route;

const APP_NAME: &str = "Conduit";

/// Which navigation entry to highlight. Distinct from the current page: it only
/// drives the chrome, never dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivePage {
    Other,
    Home,
    Login,
    Register,
    Settings,
    Profile(Username),
    NewArticle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub body: String,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Decorates page content with header navigation and footer.
pub fn frame(
    is_loading: bool,
    user: Option<&User>,
    active_page: &ActivePage,
    content: Document,
) -> Document {
    let title = if content.title.is_empty() {
        APP_NAME.to_string()
    } else {
        format!("{} - {APP_NAME}", content.title)
    };

    let mut links = vec![nav_link(active_page, &ActivePage::Home, &Route::Home, "Home")];
    match user {
        Some(user) => {
            links.push(nav_link(
                active_page,
                &ActivePage::NewArticle,
                &Route::NewArticle,
                "New Post",
            ));
            links.push(nav_link(
                active_page,
                &ActivePage::Settings,
                &Route::Settings,
                "Settings",
            ));
            links.push(nav_link(
                active_page,
                &ActivePage::Profile(user.username.clone()),
                &Route::Profile(user.username.clone()),
                user.username.as_str(),
            ));
            links.push(nav_link(active_page, &ActivePage::Other, &Route::Logout, "Sign out"));
        }
        None => {
            links.push(nav_link(active_page, &ActivePage::Login, &Route::Login, "Sign in"));
            links.push(nav_link(
                active_page,
                &ActivePage::Register,
                &Route::Register,
                "Sign up",
            ));
        }
    }

    let spinner = if is_loading {
        "\n  <li class=\"nav-item\"><span class=\"spinner\">Loading...</span></li>"
    } else {
        ""
    };

    let body = format!(
        "<nav class=\"navbar\">\n<a class=\"navbar-brand\" href=\"{home}\">conduit</a>\n<ul class=\"nav\">{spinner}\n{links}\n</ul>\n</nav>\n{content}\n<footer><a href=\"{home}\">conduit</a> An interactive learning project.</footer>",
        home = Route::Home.href(),
        links = links.join("\n"),
        content = content.body,
    );

    Document { title, body }
}

fn nav_link(active: &ActivePage, target: &ActivePage, route: &Route, label: &str) -> String {
    // Sign out is never highlighted even though it maps to `Other`.
    let class = if active == target && *route != Route::Logout {
        "nav-link active"
    } else {
        "nav-link"
    };
    format!(
        "  <li class=\"nav-item\"><a class=\"{class}\" href=\"{}\">{}</a></li>",
        route.href(),
        escape(label)
    )
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: Vec<String> = errors
        .iter()
        .map(|err| format!("<li>{}</li>", escape(err)))
        .collect();
    format!("<ul class=\"error-messages\">{}</ul>", items.join(""))
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
