use super::{escape_attr, escape_html, FormView, ViewArgs};

/// Text input for an admin metabox. Renders nothing unless the form view
/// accepts the arguments.
pub fn render_text_field(args: &ViewArgs, form_view: Option<&dyn FormView>) -> String {
    let Some(form_view) = form_view else {
        return String::new();
    };
    if !form_view.field_has_required_args(args) {
        return String::new();
    }

    let attr = |key: &str| escape_attr(&args.text_or_empty(key));

    let mut html = format!(
        "<div id=\"{}\" class=\"{}\">\n",
        attr("wrapper_id"),
        attr("wrapper_class")
    );
    if let Some(label) = args.text("label") {
        html.push_str(&format!(
            "\t<label for=\"{}\">{}</label>\n",
            attr("id"),
            escape_html(&label)
        ));
    }
    html.push_str(&format!(
        "\t<input type=\"text\" id=\"{}\" name=\"{}\" value=\"{}\" tabindex=\"{}\" placeholder=\"{}\" />\n",
        attr("id"),
        attr("key"),
        attr("value"),
        attr("tabindex"),
        attr("placeholder")
    ));
    if let Some(description) = args.text("description") {
        html.push_str(&format!(
            "\t<span class=\"charitable-helper\">{}</span>\n",
            escape_html(&description)
        ));
    }
    html.push_str("</div>\n");
    html
}
