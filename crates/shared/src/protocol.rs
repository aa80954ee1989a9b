use serde::{Deserialize, Serialize};

use crate::domain::{Article, Username};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter for article listings. Empty filters list every article, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Username>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited: Option<Username>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            tag: None,
            author: None,
            favorited: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ArticleQuery {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn by_author(author: Username) -> Self {
        Self {
            author: Some(author),
            ..Self::default()
        }
    }

    pub fn favorited_by(username: Username) -> Self {
        Self {
            favorited: Some(username),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub articles_count: u32,
}
