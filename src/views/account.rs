use crate::api::client::{UserLoginRequest, UserRegisterRequest, UserUpdateRequest};
use crate::types::Identity;
use crate::ui::AppContext;
use crate::views::shared::{Notice, user_facing_error};
use dioxus::prelude::*;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

#[component]
pub fn AccountView() -> Element {
    let ctx = use_context::<AppContext>();
    let identity = use_signal(|| Identity::default());
    let mut notice = use_signal(|| Option::<String>::None);

    // Keep the panel in step with logins made elsewhere in the app.
    {
        let ctx = ctx.clone();
        let mut identity = identity;
        use_future(move || {
            let ctx = ctx.clone();
            async move {
                identity.set(ctx.session.current());
                let mut seen_epoch = ctx.session.epoch();
                loop {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    let epoch = ctx.session.epoch();
                    if epoch != seen_epoch {
                        seen_epoch = epoch;
                        identity.set(ctx.session.current());
                    }
                }
            }
        });
    }

    let current = identity();

    rsx! {
        div { class: "main-container account-layout",
            if let Some(message) = notice() {
                Notice { message, on_dismiss: move |_| notice.set(None) }
            }
            if let Some(user_id) = current.user_id {
                ProfilePanel { user_id, notice }
            } else {
                AuthPanel { notice }
            }
        }
    }
}

#[component]
fn AuthPanel(notice: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut mode = use_signal(|| AuthMode::Login);
    let mut login_id = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut name = use_signal(String::new);
    let mut residence = use_signal(String::new);
    let mut age = use_signal(String::new);
    let mut salary = use_signal(String::new);
    let mut assets = use_signal(String::new);
    let busy = use_signal(|| false);

    let mut submit = {
        let ctx = ctx.clone();
        let mut notice = notice;
        let mut busy = busy;
        move || {
            if busy() {
                return;
            }
            let id_value = login_id().trim().to_string();
            let password_value = password();
            if id_value.is_empty() || password_value.is_empty() {
                notice.set(Some("Enter a login id and password.".to_string()));
                return;
            }
            let current_mode = mode();
            let name_value = name().trim().to_string();
            if current_mode == AuthMode::Register && name_value.is_empty() {
                notice.set(Some("Enter a display name.".to_string()));
                return;
            }
            let residence_value = residence().trim().to_string();
            let age_value = age().trim().parse::<i32>().ok();
            let salary_value = salary().trim().parse::<i64>().ok();
            let assets_value = assets().trim().parse::<i64>().ok();
            let ctx = ctx.clone();
            busy.set(true);
            spawn(async move {
                let result = match current_mode {
                    AuthMode::Login => {
                        ctx.client
                            .login(&UserLoginRequest {
                                user_login_id: id_value,
                                user_password: password_value,
                            })
                            .await
                    }
                    AuthMode::Register => {
                        ctx.client
                            .register(&UserRegisterRequest {
                                user_login_id: id_value,
                                user_password: password_value,
                                user_name: name_value,
                                user_residence: if residence_value.is_empty() {
                                    None
                                } else {
                                    Some(residence_value)
                                },
                                user_age: age_value,
                                user_salary: salary_value,
                                user_assets: assets_value,
                                user_note: None,
                                user_agree_privacy: Some(true),
                            })
                            .await
                    }
                };
                match result {
                    Ok(user) => {
                        if let Err(err) = ctx.session.login(user.user_id, &user.user_name) {
                            notice.set(Some(err));
                        }
                    }
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
                busy.set(false);
            });
        }
    };

    let current_mode = mode();

    rsx! {
        div { class: "auth-panel",
            div { class: "auth-tabs",
                button {
                    class: format_args!(
                        "auth-tab {}",
                        if current_mode == AuthMode::Login { "active" } else { "" }
                    ),
                    r#type: "button",
                    onclick: move |_| mode.set(AuthMode::Login),
                    "Sign in"
                }
                button {
                    class: format_args!(
                        "auth-tab {}",
                        if current_mode == AuthMode::Register { "active" } else { "" }
                    ),
                    r#type: "button",
                    onclick: move |_| mode.set(AuthMode::Register),
                    "Create account"
                }
            }

            label { class: "field-label", "Login id" }
            input {
                class: "field-input",
                r#type: "text",
                value: "{login_id}",
                oninput: move |ev| login_id.set(ev.value()),
            }
            label { class: "field-label", "Password" }
            input {
                class: "field-input",
                r#type: "password",
                value: "{password}",
                oninput: move |ev| password.set(ev.value()),
            }

            if current_mode == AuthMode::Register {
                label { class: "field-label", "Name" }
                input {
                    class: "field-input",
                    r#type: "text",
                    value: "{name}",
                    oninput: move |ev| name.set(ev.value()),
                }
                label { class: "field-label", "Residence (optional)" }
                input {
                    class: "field-input",
                    r#type: "text",
                    value: "{residence}",
                    oninput: move |ev| residence.set(ev.value()),
                }
                label { class: "field-label", "Age (optional)" }
                input {
                    class: "field-input",
                    r#type: "number",
                    value: "{age}",
                    oninput: move |ev| age.set(ev.value()),
                }
                label { class: "field-label", "Annual salary (optional)" }
                input {
                    class: "field-input",
                    r#type: "number",
                    value: "{salary}",
                    oninput: move |ev| salary.set(ev.value()),
                }
                label { class: "field-label", "Assets (optional)" }
                input {
                    class: "field-input",
                    r#type: "number",
                    value: "{assets}",
                    oninput: move |ev| assets.set(ev.value()),
                }
            }

            button {
                class: "btn btn-primary auth-submit",
                r#type: "button",
                disabled: busy(),
                onclick: move |_| submit(),
                if current_mode == AuthMode::Login { "Sign in" } else { "Create account" }
            }
        }
    }
}

#[component]
fn ProfilePanel(user_id: i64, notice: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut name = use_signal(String::new);
    let mut residence = use_signal(String::new);
    let mut age = use_signal(String::new);
    let mut salary = use_signal(String::new);
    let mut assets = use_signal(String::new);
    let login_label = use_signal(String::new);
    let busy = use_signal(|| false);

    {
        let ctx = ctx.clone();
        let mut notice = notice;
        let mut name = name;
        let mut residence = residence;
        let mut age = age;
        let mut salary = salary;
        let mut assets = assets;
        let mut login_label = login_label;
        use_future(move || {
            let ctx = ctx.clone();
            async move {
                match ctx.client.user_info(user_id).await {
                    Ok(user) => {
                        name.set(user.user_name);
                        residence.set(user.user_residence.unwrap_or_default());
                        age.set(user.user_age.map(|n| n.to_string()).unwrap_or_default());
                        salary.set(user.user_salary.map(|n| n.to_string()).unwrap_or_default());
                        assets.set(user.user_assets.map(|n| n.to_string()).unwrap_or_default());
                        login_label.set(user.user_login_id);
                    }
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
            }
        });
    }

    let mut save_profile = {
        let ctx = ctx.clone();
        let mut notice = notice;
        let mut busy = busy;
        move || {
            if busy() {
                return;
            }
            let name_value = name().trim().to_string();
            if name_value.is_empty() {
                notice.set(Some("Enter a display name.".to_string()));
                return;
            }
            let residence_value = residence().trim().to_string();
            let age_value = age().trim().parse::<i32>().ok();
            let salary_value = salary().trim().parse::<i64>().ok();
            let assets_value = assets().trim().parse::<i64>().ok();
            let ctx = ctx.clone();
            busy.set(true);
            spawn(async move {
                let request = UserUpdateRequest {
                    user_name: Some(name_value),
                    user_residence: if residence_value.is_empty() {
                        None
                    } else {
                        Some(residence_value)
                    },
                    user_age: age_value,
                    user_salary: salary_value,
                    user_assets: assets_value,
                    user_note: None,
                };
                match ctx.client.update_user(user_id, &request).await {
                    Ok(user) => {
                        // Re-store so the header greeting picks up a renamed
                        // profile right away.
                        if let Err(err) = ctx.session.login(user.user_id, &user.user_name) {
                            notice.set(Some(err));
                        } else {
                            notice.set(Some("Profile updated.".to_string()));
                        }
                    }
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
                busy.set(false);
            });
        }
    };

    let logout = {
        let ctx = ctx.clone();
        let mut notice = notice;
        move |_| {
            if let Err(err) = ctx.session.logout() {
                notice.set(Some(err));
            }
        }
    };

    rsx! {
        div { class: "profile-panel",
            div { class: "profile-head",
                h2 { class: "profile-title", "My profile" }
                span { class: "text-muted", "{login_label}" }
            }

            label { class: "field-label", "Name" }
            input {
                class: "field-input",
                r#type: "text",
                value: "{name}",
                oninput: move |ev| name.set(ev.value()),
            }
            label { class: "field-label", "Residence" }
            input {
                class: "field-input",
                r#type: "text",
                value: "{residence}",
                oninput: move |ev| residence.set(ev.value()),
            }
            label { class: "field-label", "Age" }
            input {
                class: "field-input",
                r#type: "number",
                value: "{age}",
                oninput: move |ev| age.set(ev.value()),
            }
            label { class: "field-label", "Annual salary" }
            input {
                class: "field-input",
                r#type: "number",
                value: "{salary}",
                oninput: move |ev| salary.set(ev.value()),
            }
            label { class: "field-label", "Assets" }
            input {
                class: "field-input",
                r#type: "number",
                value: "{assets}",
                oninput: move |ev| assets.set(ev.value()),
            }

            div { class: "profile-actions",
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy(),
                    onclick: move |_| save_profile(),
                    "Save changes"
                }
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: logout,
                    "Sign out"
                }
            }
        }
    }
}
