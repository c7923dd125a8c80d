//! HTML templates, compiled into the binary.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::error::ApiError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("index.html", include_str!("../templates/index.html")),
];

/// Build the template environment. `.html` templates are auto-escaped.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

pub fn render<S: Serialize>(env: &Environment<'_>, name: &str, ctx: S) -> Result<Html<String>, ApiError> {
    let template = env.get_template(name)?;
    Ok(Html(template.render(ctx)?))
}
