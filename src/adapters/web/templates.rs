//! HTML templates using Askama.

use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub default_target: f64,
    pub autocomplete_enabled: bool,
}
