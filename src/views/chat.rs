use crate::api::client::SendMessageRequest;
use crate::api::error::ApiResult;
use crate::api::stream::{TranscriptUpdate, stream_chat};
use crate::session::{drop_authenticated_conversations, thread_crosses_partition};
use crate::store::guest::title_prefix;
use crate::store::{ConversationBackend, DEFAULT_TITLE, backend_for};
use crate::types::{ChatMessage, Conversation, Identity, Role, Source};
use crate::ui::AppContext;
use crate::views::shared::{Notice, SourceList, markdown_to_html, user_facing_error};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const WELCOME_MESSAGE: &str =
    "Hi! I can help you find youth support programs for housing, jobs, education and more. What would you like to know?";

const QUICK_QUESTIONS: &[&str] = &[
    "What housing support can I apply for?",
    "Are there job programs for first-time job seekers?",
    "How do I open a youth savings account?",
];

fn current_backend(ctx: &AppContext) -> Arc<dyn ConversationBackend> {
    backend_for(&ctx.session.current(), ctx.client.clone(), ctx.guest_store())
}

async fn reload_conversations(
    ctx: &AppContext,
    mut conversations: Signal<Vec<Conversation>>,
    mut notice: Signal<Option<String>>,
) {
    match current_backend(ctx).list().await {
        Ok(listing) => conversations.set(listing),
        Err(err) => notice.set(Some(user_facing_error(&err))),
    }
}

/// Run one user turn end to end: ensure a thread exists, push the user
/// message, stream the reply into the transcript, then persist and retitle
/// through the active backend.
async fn run_exchange(
    ctx: &AppContext,
    text: String,
    mut active_id: Signal<Option<i64>>,
    mut messages: Signal<Vec<ChatMessage>>,
    mut streaming: Signal<bool>,
) -> ApiResult<()> {
    let identity = ctx.session.current();
    let backend = backend_for(&identity, ctx.client.clone(), ctx.guest_store());

    let conversation_id = match active_id() {
        Some(id) => id,
        None => {
            let title = if identity.is_logged_in() {
                title_prefix(&text)
            } else {
                DEFAULT_TITLE.to_string()
            };
            let created = backend.create(&title).await?;
            active_id.set(Some(created.id));
            created.id
        }
    };

    messages.with_mut(|msgs| msgs.push(ChatMessage::user(text.as_str())));
    streaming.set(true);

    let request = SendMessageRequest {
        conversation_id: if conversation_id >= 0 {
            Some(conversation_id)
        } else {
            None
        },
        message: text.clone(),
    };

    let outcome = stream_chat(&ctx.client, &request, |update| match update {
        TranscriptUpdate::Begin(message) => messages.with_mut(|msgs| msgs.push(message)),
        TranscriptUpdate::Revise { content, sources } => messages.with_mut(|msgs| {
            if let Some(last) = msgs.last_mut()
                && last.role == Role::Assistant
            {
                last.content = content;
                last.sources = sources;
            }
        }),
    })
    .await?;
    streaming.set(false);

    if !outcome.content.is_empty() {
        let snapshot = messages();
        backend.save_messages(conversation_id, &snapshot).await?;
        backend.apply_default_title(conversation_id, &text).await?;
    }
    Ok(())
}

#[component]
pub fn ChatView() -> Element {
    let ctx = use_context::<AppContext>();
    // Handlers capture this instead of the context itself so they stay Copy
    // and can be shared between the sidebar rows and the composer.
    let app = use_signal(|| ctx);
    let conversations = use_signal(Vec::<Conversation>::new);
    let active_id = use_signal(|| Option::<i64>::None);
    let messages = use_signal(Vec::<ChatMessage>::new);
    let mut input = use_signal(String::new);
    let sending = use_signal(|| false);
    let streaming = use_signal(|| false);
    let mut notice = use_signal(|| Option::<String>::None);
    let identity = use_signal(|| Identity::default());

    // Initial load plus a watcher for login changes. Logging out drops every
    // server-backed thread from the open listing immediately.
    {
        let mut conversations = conversations;
        let mut messages = messages;
        let mut active_id = active_id;
        let mut identity = identity;
        use_future(move || async move {
            let ctx = app();
            identity.set(ctx.session.current());
            reload_conversations(&ctx, conversations, notice).await;
            let mut seen_epoch = ctx.session.epoch();
            loop {
                tokio::time::sleep(Duration::from_millis(250)).await;
                let epoch = ctx.session.epoch();
                if epoch == seen_epoch {
                    continue;
                }
                seen_epoch = epoch;
                let current = ctx.session.current();
                let was_logged_in = identity().is_logged_in();
                identity.set(current.clone());
                if was_logged_in && !current.is_logged_in() {
                    conversations.with_mut(drop_authenticated_conversations);
                }
                // Both directions: a guest thread left open across a login
                // (or a remote one across a logout) must not be written
                // through the newly selected backend.
                if thread_crosses_partition(&current, active_id()) {
                    active_id.set(None);
                    messages.set(Vec::new());
                }
                reload_conversations(&ctx, conversations, notice).await;
            }
        });
    }

    let mut open_conversation = {
        let mut messages = messages;
        let mut active_id = active_id;
        move |id: i64| {
            active_id.set(Some(id));
            spawn(async move {
                let ctx = app();
                match current_backend(&ctx).history(id).await {
                    Ok(history) => messages.set(history),
                    Err(err) => notice.set(Some(user_facing_error(&err))),
                }
            });
        }
    };

    let mut start_new_chat = {
        let mut messages = messages;
        let mut active_id = active_id;
        move || {
            active_id.set(None);
            messages.set(Vec::new());
        }
    };

    let mut delete_conversation = {
        let mut messages = messages;
        let mut active_id = active_id;
        move |id: i64| {
            spawn(async move {
                let ctx = app();
                if let Err(err) = current_backend(&ctx).delete(id).await {
                    notice.set(Some(user_facing_error(&err)));
                    return;
                }
                if active_id() == Some(id) {
                    active_id.set(None);
                    messages.set(Vec::new());
                }
                reload_conversations(&ctx, conversations, notice).await;
            });
        }
    };

    let mut send_message = {
        let mut input_signal = input;
        let mut sending_signal = sending;
        let mut streaming_signal = streaming;
        move |text: String| {
            let trimmed = text.trim().to_string();
            if trimmed.is_empty() || sending_signal() {
                return;
            }
            input_signal.set(String::new());
            notice.set(None);
            sending_signal.set(true);
            spawn(async move {
                let ctx = app();
                if let Err(err) =
                    run_exchange(&ctx, trimmed, active_id, messages, streaming_signal).await
                {
                    notice.set(Some(user_facing_error(&err)));
                }
                streaming_signal.set(false);
                sending_signal.set(false);
                reload_conversations(&ctx, conversations, notice).await;
            });
        }
    };

    let conversations_snapshot = conversations();
    let messages_snapshot = messages();
    let current_id = active_id();
    let is_streaming = streaming();

    rsx! {
        div { class: "main-container chat-layout",
            div { class: "sidebar",
                button {
                    class: "btn btn-primary sidebar-new",
                    r#type: "button",
                    onclick: move |_| start_new_chat(),
                    "New chat"
                }
                div { class: "thread-list",
                    for conv in conversations_snapshot.iter() {
                        {
                            let id = conv.id;
                            rsx! {
                                div {
                                    key: "{id}",
                                    class: format_args!(
                                        "thread-row {}",
                                        if current_id == Some(id) { "active" } else { "" }
                                    ),
                                    onclick: move |_| open_conversation(id),
                                    span { class: "thread-title", "{conv.title}" }
                                    button {
                                        class: "btn-ghost thread-delete",
                                        r#type: "button",
                                        title: "Delete conversation",
                                        onclick: move |ev| {
                                            ev.stop_propagation();
                                            delete_conversation(id);
                                        },
                                        dangerous_inner_html: "&times;"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            div { class: "chat-wrap",
                if let Some(message) = notice() {
                    Notice { message, on_dismiss: move |_| notice.set(None) }
                }
                div { id: "chat-list", class: "chat-list",
                    if messages_snapshot.is_empty() {
                        div { class: "message-row assistant",
                            div { class: "avatar assistant", "Y" }
                            div { class: "message-stack",
                                div { class: "bubble assistant",
                                    div { class: "md", "{WELCOME_MESSAGE}" }
                                }
                                div { class: "quick-questions",
                                    for question in QUICK_QUESTIONS.iter() {
                                        button {
                                            key: "{question}",
                                            class: "btn quick-question",
                                            r#type: "button",
                                            onclick: move |_| send_message(question.to_string()),
                                            "{question}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    for msg in messages_snapshot.iter() {
                        div {
                            key: "{msg.id}",
                            class: format_args!(
                                "message-row {}",
                                match msg.role { Role::User => "user", Role::Assistant => "assistant" }
                            ),
                            if matches!(msg.role, Role::Assistant) {
                                div { class: "avatar assistant", "Y" }
                            }
                            div { class: "message-stack",
                                div { class: format_args!(
                                        "bubble {}",
                                        match msg.role { Role::User => "user", Role::Assistant => "assistant" }
                                    ),
                                    if matches!(msg.role, Role::Assistant) {
                                        AssistantBubble {
                                            content: msg.content.clone(),
                                            sources: msg.sources.clone().unwrap_or_default(),
                                            show_copy: !is_streaming,
                                        }
                                    } else {
                                        "{msg.content}"
                                    }
                                }
                                if !msg.timestamp.is_empty() {
                                    div { class: format_args!(
                                            "message-meta {}",
                                            match msg.role { Role::User => "align-end", Role::Assistant => "align-start" }
                                        ),
                                        span { class: "message-timestamp", "{msg.timestamp}" }
                                    }
                                }
                            }
                        }
                    }
                    if is_streaming
                        && !messages_snapshot
                            .last()
                            .is_some_and(|msg| msg.role == Role::Assistant)
                    {
                        div { class: "message-row assistant",
                            div { class: "avatar assistant", "Y" }
                            div { class: "message-stack",
                                div { class: "shimmer-line",
                                    span { class: "shimmer-text", "Thinking…" }
                                }
                            }
                        }
                    }
                }

                form { class: "composer no-divider",
                    div { class: "composer-inner",
                        div { class: "hstack", style: "gap: 0.5rem; width: 100%; align-items: flex-end;",
                            textarea {
                                rows: "1",
                                placeholder: "Ask about youth policies and programs",
                                value: "{input}",
                                oninput: move |ev| input.set(ev.value()),
                                onkeydown: move |ev| {
                                    if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                        ev.prevent_default();
                                        let text = input();
                                        send_message(text);
                                    }
                                },
                                disabled: sending(),
                                autofocus: true,
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                disabled: sending() || input().trim().is_empty(),
                                onclick: move |_| {
                                    let text = input();
                                    send_message(text);
                                },
                                "Send"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AssistantBubble(content: String, sources: Vec<Source>, show_copy: bool) -> Element {
    let content_html = markdown_to_html(&content);
    let copy_payload = content.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(any(feature = "desktop", feature = "mobile"))]
            {
                if let Ok(mut cb) = arboard::Clipboard::new() {
                    let _ = cb.set_text(raw);
                }
            }
            #[cfg(not(any(feature = "desktop", feature = "mobile")))]
            {
                let _ = raw;
            }
        });
    };

    rsx! {
        if show_copy && !content.is_empty() {
            div { class: "bubble-controls",
                div { class: "actions",
                    button { class: "action-btn", title: "Copy answer", onclick: on_copy, "Copy" }
                }
            }
        }
        div { class: "md", dangerous_inner_html: "{content_html}" }
        if !sources.is_empty() {
            SourceList { sources }
        }
    }
}
