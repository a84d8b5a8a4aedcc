use super::{escape_html, ViewArgs};

/// Section heading in the settings area: the description if one is given,
/// otherwise a rule.
pub fn render_heading(args: &ViewArgs) -> String {
    match args.text("description") {
        Some(description) => format!(
            "<div class=\"charitable-description\">{}</div>\n",
            escape_html(&description)
        ),
        None => "<hr />\n".to_string(),
    }
}
