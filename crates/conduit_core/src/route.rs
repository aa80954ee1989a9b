use shared::domain::{Slug, Username};
use url::Url;

const BASE: &str = "http://conduit.local/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Home,
    Login,
    Register,
    Settings,
    Logout,
    Profile(Username),
    Article(Slug),
    EditArticle(Slug),
    NewArticle,
}

impl Route {
    /// Fragment-style href for outbound navigation.
    pub fn href(&self) -> String {
        let pieces: Vec<String> = match self {
            Route::Root | Route::Home => Vec::new(),
            Route::Login => vec!["login".into()],
            Route::Register => vec!["register".into()],
            Route::Settings => vec!["settings".into()],
            Route::Logout => vec!["logout".into()],
            Route::Profile(username) => vec!["profile".into(), username.to_path_segment()],
            Route::Article(slug) => vec!["article".into(), slug.to_path_segment()],
            Route::EditArticle(slug) => vec!["editor".into(), slug.to_path_segment()],
            Route::NewArticle => vec!["editor".into()],
        };
        format!("#/{}", pieces.join("/"))
    }
}

/// Resolves a location (absolute URL, path, or `#/...` fragment) to a route.
pub fn resolve(location: &str) -> Option<Route> {
    let base = Url::parse(BASE).ok()?;
    let url = base.join(location.trim()).ok()?;

    match url.fragment() {
        None => {
            let segments = decode_segments(url.path())?;
            if segments.is_empty() {
                Some(Route::Root)
            } else {
                match_segments(&segments)
            }
        }
        Some(fragment) => {
            let segments = decode_segments(fragment)?;
            if segments.is_empty() {
                Some(Route::Home)
            } else {
                match_segments(&segments)
            }
        }
    }
}

fn decode_segments(path: &str) -> Option<Vec<String>> {
    // Drop any query carried inside the fragment.
    let path = path.split('?').next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .ok()
                .map(|decoded| decoded.into_owned())
        })
        .collect()
}

fn match_segments(segments: &[String]) -> Option<Route> {
    let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
    match parts.as_slice() {
        ["login"] => Some(Route::Login),
        ["logout"] => Some(Route::Logout),
        ["register"] => Some(Route::Register),
        ["settings"] => Some(Route::Settings),
        ["profile", username] => Some(Route::Profile(Username::new(*username))),
        ["article", slug] => Some(Route::Article(Slug::new(*slug))),
        ["editor"] => Some(Route::NewArticle),
        ["editor", slug] => Some(Route::EditArticle(Slug::new(*slug))),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/route_tests.rs"]
mod tests;
