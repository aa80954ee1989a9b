pub mod article;
pub mod editor;
pub mod errored;
pub mod home;
pub mod login;
pub mod not_found;
pub mod profile;
pub mod register;
pub mod settings;

use shared::domain::{Article, Profile};

use crate::{route::Route, view::escape};

pub(crate) fn article_preview(article: &Article) -> String {
    let favorite_class = if article.favorited {
        "btn-primary"
    } else {
        "btn-outline-primary"
    };
    let tags: Vec<String> = article
        .tag_list
        .iter()
        .map(|tag| format!("<li class=\"tag-pill\">{}</li>", escape(tag)))
        .collect();
    format!(
        "<div class=\"article-preview\">{meta}<button class=\"btn {favorite_class}\" data-slug=\"{slug}\">&#9829; {count}</button><a class=\"preview-link\" href=\"{href}\"><h1>{title}</h1><p>{description}</p><span>Read more...</span><ul class=\"tag-list\">{tags}</ul></a></div>",
        meta = author_meta(&article.author, &article.created_at.format("%B %e, %Y").to_string()),
        slug = escape(article.slug.as_str()),
        count = article.favorites_count,
        href = Route::Article(article.slug.clone()).href(),
        title = escape(&article.title),
        description = escape(&article.description),
        tags = tags.join(""),
    )
}

pub(crate) fn author_meta(author: &Profile, date: &str) -> String {
    format!(
        "<div class=\"article-meta\"><a href=\"{href}\">{image}</a><div class=\"info\"><a class=\"author\" href=\"{href}\">{name}</a><span class=\"date\">{date}</span></div></div>",
        href = Route::Profile(author.username.clone()).href(),
        image = avatar(author.image.as_deref()),
        name = escape(author.username.as_str()),
        date = escape(date),
    )
}

pub(crate) fn avatar(image: Option<&str>) -> String {
    let src = image
        .filter(|src| !src.is_empty())
        .unwrap_or("https://static.productionready.io/images/smiley-cyrus.jpg");
    format!("<img src=\"{}\">", escape(src))
}

pub(crate) fn article_list(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "<div class=\"article-preview\">No articles are here... yet.</div>".to_string();
    }
    articles
        .iter()
        .map(article_preview)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "../tests/pages_tests.rs"]
mod tests;
