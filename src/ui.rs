use crate::api::client::ApiClient;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use crate::storage::{self, DurableStore};
use crate::store::guest::GuestConversationStore;
use crate::theme::{ThemeMode, theme_definition};
use crate::views::{AccountView, ChatView, PoliciesView};
use dioxus::prelude::*;
use std::sync::Arc;

const COMPASS_CSS: Asset = asset!("/assets/compass.css");

/// Shared service handles, provided once at the root.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
}

impl AppContext {
    pub fn from_env() -> Self {
        let session = Arc::new(SessionStore::new(Arc::new(DurableStore::new("session"))));
        let client = Arc::new(ApiClient::new(&ApiConfig::from_env(), session.clone()));
        Self { session, client }
    }

    /// Guest threads live in the per-tab ephemeral area.
    pub fn guest_store(&self) -> GuestConversationStore {
        GuestConversationStore::new(storage::tab_store())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppTab {
    Chat,
    Policies,
    Account,
}

#[component]
pub fn App() -> Element {
    use_context_provider(AppContext::from_env);
    let active_tab = use_signal(|| AppTab::Chat);
    let theme = use_signal(|| ThemeMode::Light);

    rsx! {
        ThemeStyles { theme }
        AppHeader { active_tab, theme }
        TabPanels { active_tab }
    }
}

#[component]
fn ThemeStyles(theme: Signal<ThemeMode>) -> Element {
    let definition = theme_definition(theme());
    rsx! {
        document::Link { rel: "stylesheet", href: COMPASS_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(active_tab: Signal<AppTab>, theme: Signal<ThemeMode>) -> Element {
    let mut theme = theme;
    let next_mode = match theme() {
        ThemeMode::Light => ThemeMode::Dark,
        ThemeMode::Dark => ThemeMode::Light,
    };
    rsx! {
        div { class: "header",
            div { class: "header-content",
                span { class: "header-wordmark", "Youth Compass" }
                TabNavigation { active_tab }
                button {
                    class: "btn-ghost theme-toggle-btn",
                    r#type: "button",
                    onclick: move |_| theme.set(next_mode),
                    match theme() {
                        ThemeMode::Light => "Dark",
                        ThemeMode::Dark => "Light",
                    }
                }
            }
        }
    }
}

#[component]
fn TabNavigation(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "tabs",
            TabButton { active_tab, tab: AppTab::Chat, label: "Chat" }
            TabButton { active_tab, tab: AppTab::Policies, label: "Policies" }
            TabButton { active_tab, tab: AppTab::Account, label: "Account" }
        }
    }
}

#[component]
fn TabButton(active_tab: Signal<AppTab>, tab: AppTab, label: &'static str) -> Element {
    let mut active_tab = active_tab;
    let class = if active_tab() == tab {
        "tab active"
    } else {
        "tab"
    };
    rsx! {
        h1 {
            class: class,
            onclick: move |_| active_tab.set(tab),
            "{label}"
        }
    }
}

#[component]
fn TabPanels(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "tab-panels",
            TabPanel {
                active_tab,
                tab: AppTab::Chat,
                children: rsx!( ChatView {} ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Policies,
                children: rsx!( PoliciesView {} ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Account,
                children: rsx!( AccountView {} ),
            }
        }
    }
}

#[component]
fn TabPanel(active_tab: Signal<AppTab>, tab: AppTab, children: Element) -> Element {
    let is_active = active_tab() == tab;
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            class: format_args!("tab-panel {}", class_suffix),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}
