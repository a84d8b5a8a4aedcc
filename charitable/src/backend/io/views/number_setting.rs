use super::{escape_attr, escape_html, value_text, ViewArgs};
use crate::backend::config::Settings;

/// Number input on the settings page. The current value comes from the
/// stored option at the `key` path, falling back to `default`.
pub fn render_number_setting(args: &ViewArgs, settings: &Settings) -> String {
    let key_path = args.key_path("key");

    let value = settings
        .get_option(key_path.as_slice())
        .and_then(value_text)
        .or_else(|| args.text("default"))
        .unwrap_or_default();

    let bound = |name: &str| {
        args.text(name)
            .map(|v| format!(" {}=\"{}\"", name, escape_attr(&v)))
            .unwrap_or_default()
    };

    let mut html = format!(
        "<input type=\"number\" id=\"charitable_settings_{}\" name=\"charitable_settings[{}]\" value=\"{}\"{}{} />\n",
        escape_attr(&key_path.join("_")),
        escape_attr(&args.text_or_empty("name")),
        escape_attr(&value),
        bound("min"),
        bound("max")
    );
    if let Some(help) = args.text("help") {
        html.push_str(&format!(
            "<span class=\"charitable-help\">{}</span>\n",
            escape_html(&help)
        ));
    }
    html
}
