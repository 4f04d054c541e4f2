use chrono::DateTime;
use handlebars::{handlebars_helper, Handlebars, TemplateError};
use include_dir::{include_dir, Dir};
use serde_json::Value;

static TEMPLATE_DIR: Dir = include_dir!("templates");
static ASSET_DIR: Dir = include_dir!("assets");

/// Date format used on cards and the detail page, e.g. `07 Mar 2024`.
pub const DATE_FORMAT: &str = "%d %b %Y";

pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| !v.is_null());
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars_helper!(format_date: |s: String| format_date_str(&s));
    handlebars.register_helper("format_date", Box::new(format_date));

    handlebars
}

/// Handlebars with every embedded page template registered under its file stem.
/// Templates double as partials, so `{{> header}}` picks up `header.hbs`.
pub fn load_templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = get_handlebars();
    for file in TEMPLATE_DIR.files() {
        let path = file.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("hbs") {
            continue;
        }
        let (Some(name), Some(source)) = (
            path.file_stem().and_then(|stem| stem.to_str()),
            file.contents_utf8(),
        ) else {
            continue;
        };
        handlebars.register_template_string(name, source)?;
    }
    Ok(handlebars)
}

/// An embedded static asset and its content type.
pub fn asset(name: &str) -> Option<(&'static [u8], &'static str)> {
    let file = ASSET_DIR.get_file(name)?;
    let content_type = match file.path().extension().and_then(|ext| ext.to_str()) {
        Some("js") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    Some((file.contents(), content_type))
}

fn format_date_str(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => value.to_string(),
    }
}
