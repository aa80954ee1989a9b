use crate::view::Document;

pub fn view() -> Document {
    Document::new(
        "Page Not Found",
        "<main id=\"content\" class=\"container\" tabindex=\"-1\">\n<h1>Not Found</h1>\n<div class=\"row\"><img src=\"/assets/images/error.jpg\" alt=\"giant laser walrus wreaking havoc\"></div>\n</main>",
    )
}
