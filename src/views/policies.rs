use crate::types::{Category, Policy};
use crate::ui::AppContext;
use crate::views::shared::{Notice, user_facing_error};
use dioxus::events::Key;
use dioxus::prelude::*;

#[component]
pub fn PoliciesView() -> Element {
    let ctx = use_context::<AppContext>();
    // Kept behind a signal so the search and category handlers stay Copy.
    let app = use_signal(|| ctx);
    let mut categories = use_signal(Vec::<Category>::new);
    let policies = use_signal(Vec::<Policy>::new);
    let selected = use_signal(|| Option::<i64>::None);
    let mut keyword = use_signal(String::new);
    let loading = use_signal(|| false);
    let fetched = use_signal(|| false);
    let mut notice = use_signal(|| Option::<String>::None);

    use_future(move || async move {
        let ctx = app();
        match ctx.client.active_categories().await {
            Ok(listing) => categories.set(listing),
            Err(err) => notice.set(Some(user_facing_error(&err))),
        }
    });

    let mut select_category = {
        let mut policies = policies;
        let mut selected = selected;
        let mut loading = loading;
        let mut fetched = fetched;
        move |category_id: i64| {
            selected.set(Some(category_id));
            loading.set(true);
            spawn(async move {
                let ctx = app();
                match ctx.client.faqs_by_category(category_id).await {
                    Ok(mut listing) => {
                        listing.sort_by_key(|policy| policy.order);
                        policies.set(listing);
                        fetched.set(true);
                    }
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
                loading.set(false);
            });
        }
    };

    let mut run_search = {
        let mut policies = policies;
        let mut selected = selected;
        let mut loading = loading;
        let mut fetched = fetched;
        let keyword = keyword;
        move || {
            let query = keyword().trim().to_string();
            if query.is_empty() {
                return;
            }
            selected.set(None);
            loading.set(true);
            spawn(async move {
                let ctx = app();
                match ctx.client.search_faqs(&query).await {
                    Ok(listing) => {
                        policies.set(listing);
                        fetched.set(true);
                    }
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
                loading.set(false);
            });
        }
    };

    let categories_snapshot = categories();
    let policies_snapshot = policies();
    let current_category = selected();

    rsx! {
        div { class: "main-container policies-layout",
            if let Some(message) = notice() {
                Notice { message, on_dismiss: move |_| notice.set(None) }
            }

            div { class: "search-row",
                input {
                    class: "search-input",
                    r#type: "text",
                    placeholder: "Search policies by keyword",
                    value: "{keyword}",
                    oninput: move |ev| keyword.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter {
                            ev.prevent_default();
                            run_search();
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: keyword().trim().is_empty(),
                    onclick: move |_| run_search(),
                    "Search"
                }
            }

            div { class: "category-grid",
                for category in categories_snapshot.iter() {
                    {
                        let id = category.id;
                        rsx! {
                            button {
                                key: "{id}",
                                class: format_args!(
                                    "category-chip {}",
                                    if current_category == Some(id) { "active" } else { "" }
                                ),
                                r#type: "button",
                                onclick: move |_| select_category(id),
                                span { class: "category-icon", "{category.icon}" }
                                span { class: "category-name", "{category.name}" }
                            }
                        }
                    }
                }
            }

            if loading() {
                p { class: "text-muted", "Loading…" }
            } else if policies_snapshot.is_empty() {
                if fetched() {
                    p { class: "text-muted", "No policies found." }
                } else {
                    p { class: "text-muted", "Pick a category or search to browse programs." }
                }
            } else {
                div { class: "policy-list",
                    for policy in policies_snapshot.iter() {
                        PolicyCard { policy: policy.clone(), key: "{policy.id}" }
                    }
                }
            }
        }
    }
}

#[component]
fn PolicyCard(policy: Policy) -> Element {
    rsx! {
        div { class: "policy-card",
            div { class: "policy-card-head",
                span { class: "tag-pill", "{policy.category_name}" }
                h3 { class: "policy-question", "{policy.question}" }
            }
            p { class: "policy-answer", "{policy.answer}" }
            if !policy.detail_url.is_empty() {
                a {
                    class: "policy-link",
                    href: "{policy.detail_url}",
                    target: "_blank",
                    "View details"
                }
            }
        }
    }
}
