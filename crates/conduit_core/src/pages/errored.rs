use crate::{
    page::PageLoadError,
    session::Session,
    view::{escape, Document},
};

pub fn view(_session: &Session, error: &PageLoadError) -> Document {
    let body = format!(
        "<main id=\"content\" class=\"container\" tabindex=\"-1\">\n<h1>Error Loading Page</h1>\n<div class=\"row\"><p>{}</p></div>\n</main>",
        escape(&error.message)
    );
    Document::new("Error", body)
}
