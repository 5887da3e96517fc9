use crate::api::error::ApiError;
use crate::types::Source;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use tracing::warn;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options
});

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// What the user sees when a call fails; the details go to the log.
pub fn user_facing_error(err: &ApiError) -> String {
    warn!(error = %err, "request failed");
    match err {
        ApiError::AuthRequired => "Please sign in first.".to_string(),
        ApiError::NotFound(_) => "Not found.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

#[component]
pub fn Notice(message: String, on_dismiss: EventHandler<()>) -> Element {
    rsx! {
        div { class: "notice",
            span { class: "notice-text", "{message}" }
            button {
                class: "btn-ghost notice-dismiss",
                r#type: "button",
                onclick: move |_| on_dismiss.call(()),
                dangerous_inner_html: "&times;"
            }
        }
    }
}

#[component]
pub fn SourceList(sources: Vec<Source>) -> Element {
    rsx! {
        div { class: "source-list",
            p { class: "source-heading", "Sources" }
            for source in sources.iter() {
                div { class: "source-row", key: "{source.url}",
                    a {
                        class: "source-link",
                        href: "{source.url}",
                        target: "_blank",
                        "{source.title}"
                    }
                    span { class: "source-score", {format!("{:.0}%", source.score * 100.0)} }
                }
            }
        }
    }
}
