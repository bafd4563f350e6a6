use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::join;
use gloo_timers::callback::Interval;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::chat_panel::{can_submit, ChatPanel};
use crate::components::right_panel::RightPanel;
use crate::models::ChatMessage;
use crate::routes::Route;
use crate::services::api::{ApiClient, ApiError};
use crate::services::auth::{AuthAction, AuthContext};
use crate::services::progress::{GenerationProgress, ProgressAction, TICK_MS};
use crate::services::query::{CacheAction, ChatCache, RetryPolicy};
use crate::services::storage::{pending_message_key, LocalStorage, Storage};

/// Decides whether the description parked by the home page should go out as
/// the first generation request. `loaded_count` is `None` until the message
/// list has been fetched.
pub fn initial_prompt(
    loaded_count: Option<usize>,
    stored: Option<&str>,
    already_sent: bool,
    in_flight: bool,
) -> Option<String> {
    if already_sent || in_flight || loaded_count != Some(0) {
        return None;
    }
    stored.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// A parked description is stale once the chat already has messages, unless
/// this page sent it and the request has not settled yet.
pub fn discard_stored(loaded_count: Option<usize>, stored: bool, already_sent: bool) -> bool {
    stored && !already_sent && matches!(loaded_count, Some(n) if n > 0)
}

pub fn last_user_message(messages: &[ChatMessage]) -> Option<String> {
    messages.iter().rev().find(|m| m.is_user()).map(|m| m.content.clone())
}

pub fn is_valid_chat_id(id: &str) -> bool {
    !id.trim().is_empty()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationState {
    pub in_flight: bool,
    pub error: Option<String>,
    /// Last submitted text. A failed send may be missing from the refetched
    /// transcript, so "Try Again" reads this first.
    pub last_prompt: Option<String>,
}

pub enum GenerationAction {
    Started(String),
    Succeeded,
    Failed(String),
}

impl GenerationState {
    pub fn accepts(&self, text: &str) -> bool {
        can_submit(text, self.in_flight)
    }

    pub fn retry_text(&self, messages: &[ChatMessage]) -> Option<String> {
        self.last_prompt.clone().or_else(|| last_user_message(messages))
    }
}

impl Reducible for GenerationState {
    type Action = GenerationAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            GenerationAction::Started(text) => {
                if !self.accepts(&text) {
                    return self;
                }
                Rc::new(GenerationState {
                    in_flight: true,
                    error: None,
                    last_prompt: Some(text.trim().to_string()),
                })
            }
            GenerationAction::Succeeded => Rc::new(GenerationState {
                in_flight: false,
                error: None,
                last_prompt: self.last_prompt.clone(),
            }),
            GenerationAction::Failed(msg) => Rc::new(GenerationState {
                in_flight: false,
                error: Some(msg),
                last_prompt: self.last_prompt.clone(),
            }),
        }
    }
}

fn report_unauthorized(auth_ctx: &Option<AuthContext>, err: &ApiError) {
    if !err.is_unauthorized() {
        return;
    }
    tracing::info!("session expired, signing out");
    if let Some(ctx) = auth_ctx {
        ctx.dispatch(AuthAction::LoggedOut);
    }
}

#[derive(Properties, PartialEq)]
pub struct ChatPageProps {
    pub id: String,
}

#[function_component(ChatPage)]
pub fn chat_page(props: &ChatPageProps) -> Html {
    let auth_ctx = use_context::<AuthContext>();
    let cache = use_reducer(ChatCache::default);
    let progress = use_reducer(GenerationProgress::default);
    let generation = use_reducer(GenerationState::default);
    // Mirrors `generation.in_flight` without waiting for a re-render, so a
    // double submit in the same tick is still rejected.
    let busy: Rc<RefCell<bool>> = use_mut_ref(|| false);
    let initial_sent: Rc<RefCell<bool>> = use_mut_ref(|| false);

    // New chat id: start from an empty cache.
    {
        let cache = cache.clone();
        let initial_sent = initial_sent.clone();
        use_effect_with(props.id.clone(), move |id| {
            *initial_sent.borrow_mut() = false;
            cache.dispatch(CacheAction::Reset(id.clone()));
        });
    }

    // Fetch both lists whenever the cache is reset or invalidated.
    {
        let cache = cache.clone();
        let auth_ctx = auth_ctx.clone();
        use_effect_with((cache.chat_id.clone(), cache.version), move |(chat_id, _)| {
            if is_valid_chat_id(chat_id) {
                let chat_id = chat_id.clone();
                cache.dispatch(CacheAction::Fetching(chat_id.clone()));
                spawn_local(async move {
                    let client = ApiClient::default_client();
                    let policy = RetryPolicy::default();
                    let (client_ref, id) = (&client, chat_id.as_str());
                    let (messages, endpoints) = join(
                        policy.run(move || client_ref.fetch_messages(id)),
                        policy.run(move || client_ref.fetch_endpoints(id)),
                    )
                    .await;

                    match messages {
                        Ok(list) => cache.dispatch(CacheAction::MessagesLoaded(chat_id.clone(), list)),
                        Err(e) => {
                            tracing::error!(chat = %chat_id, error = %e, "failed to load messages");
                            report_unauthorized(&auth_ctx, &e);
                            cache.dispatch(CacheAction::MessagesFailed(chat_id.clone(), e.to_string()));
                        }
                    }
                    match endpoints {
                        Ok(list) => cache.dispatch(CacheAction::EndpointsLoaded(chat_id.clone(), list)),
                        Err(e) => {
                            tracing::error!(chat = %chat_id, error = %e, "failed to load endpoints");
                            report_unauthorized(&auth_ctx, &e);
                            cache.dispatch(CacheAction::EndpointsFailed(chat_id, e.to_string()));
                        }
                    }
                });
            }
        });
    }

    // Simulated progress while a generation is running.
    {
        let progress = progress.clone();
        use_effect_with(generation.in_flight, move |active| {
            let ticker = if *active {
                progress.dispatch(ProgressAction::Reset);
                let progress = progress.clone();
                Some(Interval::new(TICK_MS, move || progress.dispatch(ProgressAction::Tick)))
            } else {
                None
            };
            move || drop(ticker)
        });
    }

    let send = {
        let cache = cache.clone();
        let generation = generation.clone();
        let busy = busy.clone();
        let auth_ctx = auth_ctx.clone();
        let chat_id = props.id.clone();
        Callback::from(move |text: String| {
            let text = text.trim().to_string();
            if *busy.borrow() || !generation.accepts(&text) {
                return;
            }
            *busy.borrow_mut() = true;
            cache.dispatch(CacheAction::AppendOptimistic(ChatMessage::pending_user(&chat_id, &text)));
            generation.dispatch(GenerationAction::Started(text.clone()));

            let cache = cache.clone();
            let generation = generation.clone();
            let busy = busy.clone();
            let auth_ctx = auth_ctx.clone();
            let chat_id = chat_id.clone();
            spawn_local(async move {
                tracing::debug!(chat = %chat_id, "generating");
                match ApiClient::default_client().generate(&chat_id, &text).await {
                    Ok(_) => {
                        LocalStorage.remove_item(&pending_message_key(&chat_id));
                        tracing::info!(chat = %chat_id, "generation finished");
                        generation.dispatch(GenerationAction::Succeeded);
                    }
                    Err(e) => {
                        tracing::error!(chat = %chat_id, error = %e, "generation failed");
                        report_unauthorized(&auth_ctx, &e);
                        generation.dispatch(GenerationAction::Failed(e.to_string()));
                    }
                }
                *busy.borrow_mut() = false;
                cache.dispatch(CacheAction::Invalidate);
            });
        })
    };

    // First message of a fresh chat comes from the home page.
    {
        let send = send.clone();
        let initial_sent = initial_sent.clone();
        let loaded = cache.messages.data.as_ref().map(Vec::len);
        let chat_id = cache.chat_id.clone();
        use_effect_with((chat_id, loaded, generation.in_flight), move |(chat_id, loaded, in_flight)| {
            if is_valid_chat_id(chat_id) {
                let key = pending_message_key(chat_id);
                let stored = LocalStorage.get_item(&key);
                if let Some(text) = initial_prompt(*loaded, stored.as_deref(), *initial_sent.borrow(), *in_flight) {
                    *initial_sent.borrow_mut() = true;
                    send.emit(text);
                } else if discard_stored(*loaded, stored.is_some(), *initial_sent.borrow()) {
                    LocalStorage.remove_item(&key);
                }
            }
        });
    }

    let on_retry = {
        let send = send.clone();
        let text = generation.retry_text(cache.messages.data.as_deref().unwrap_or_default());
        Callback::from(move |_| match text.clone() {
            Some(text) => send.emit(text),
            None => tracing::warn!("nothing to retry"),
        })
    };

    let on_reload = {
        let cache = cache.clone();
        Callback::from(move |_| cache.dispatch(CacheAction::Invalidate))
    };

    let on_unauthorized = {
        let auth_ctx = auth_ctx.clone();
        Callback::from(move |_| report_unauthorized(&auth_ctx, &ApiError::Unauthorized))
    };

    if !is_valid_chat_id(&props.id) {
        return html! {
            <div class="page panel-card">
                <h3>{ "Invalid chat" }</h3>
                <p>{ "This chat link is missing its id." }</p>
                <Link<Route> to={Route::Home} classes="btn btn-primary">{ "Back to Home" }</Link<Route>>
            </div>
        };
    }

    if cache.messages.is_loading() || cache.chat_id != props.id {
        return html! {
            <div class="page panel-card">
                <span class="spinner"></span>
                <p>{ "Loading chat..." }</p>
            </div>
        };
    }

    if let (Some(err), None) = (cache.messages.error(), cache.messages.data.as_ref()) {
        return html! {
            <div class="page panel-card error" role="alert">
                <h3>{ "Failed to load chat" }</h3>
                <p>{ err }</p>
                <button class="btn btn-primary" onclick={on_reload}>{ "Retry" }</button>
            </div>
        };
    }

    let messages = cache.messages.data.clone().unwrap_or_default();
    let endpoints = cache.endpoints.data.clone().unwrap_or_default();

    html! {
        <div class="page chat-page">
            if let Some(err) = cache.endpoints.error() {
                <div class="error-banner" role="alert">
                    { format!("Could not load endpoints: {}", err) }
                    <button class="btn btn-sm" onclick={on_reload}>{ "Retry" }</button>
                </div>
            }
            <div class="chat-layout">
                <ChatPanel
                    messages={messages.clone()}
                    is_generating={generation.in_flight}
                    on_submit={send}
                />
                <RightPanel
                    chat_id={props.id.clone()}
                    endpoints={endpoints}
                    is_generating={generation.in_flight}
                    progress={(*progress).clone()}
                    error={generation.error.clone()}
                    has_messages={!messages.is_empty()}
                    on_retry={on_retry}
                    on_unauthorized={on_unauthorized}
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_description_goes_out_once_for_an_empty_chat() {
        assert_eq!(
            initial_prompt(Some(0), Some("  users api "), false, false).as_deref(),
            Some("users api")
        );
        assert_eq!(initial_prompt(Some(0), Some("users api"), true, false), None);
    }

    #[test]
    fn waits_for_messages_and_idle_client() {
        assert_eq!(initial_prompt(None, Some("users api"), false, false), None);
        assert_eq!(initial_prompt(Some(0), Some("users api"), false, true), None);
    }

    #[test]
    fn existing_conversations_ignore_stored_text() {
        assert_eq!(initial_prompt(Some(2), Some("users api"), false, false), None);
        assert_eq!(initial_prompt(Some(0), None, false, false), None);
        assert_eq!(initial_prompt(Some(0), Some("   "), false, false), None);
    }

    fn started(state: Rc<GenerationState>, text: &str) -> Rc<GenerationState> {
        state.reduce(GenerationAction::Started(text.to_string()))
    }

    #[test]
    fn second_send_is_rejected_while_one_is_in_flight() {
        let state = started(Rc::new(GenerationState::default()), "users api");
        assert!(state.in_flight);
        assert!(!state.accepts("orders api"));

        let again = started(state.clone(), "orders api");
        assert_eq!(*again, *state);
        assert_eq!(again.last_prompt.as_deref(), Some("users api"));
    }

    #[test]
    fn failure_keeps_the_error_until_the_next_send() {
        let state = started(Rc::new(GenerationState::default()), "users api")
            .reduce(GenerationAction::Failed("HTTP error! status: 500".into()));
        assert!(!state.in_flight);
        assert_eq!(state.error.as_deref(), Some("HTTP error! status: 500"));

        let retried = started(state, "users api");
        assert!(retried.in_flight);
        assert_eq!(retried.error, None);

        let done = retried.reduce(GenerationAction::Succeeded);
        assert!(!done.in_flight);
        assert_eq!(done.error, None);
    }

    #[test]
    fn blank_text_never_starts_a_generation() {
        let state = started(Rc::new(GenerationState::default()), "   ");
        assert_eq!(*state, GenerationState::default());
    }

    #[test]
    fn retry_uses_the_failed_prompt_even_if_the_transcript_lost_it() {
        let state = started(Rc::new(GenerationState::default()), " users api ")
            .reduce(GenerationAction::Failed("boom".into()));
        assert_eq!(state.retry_text(&[]).as_deref(), Some("users api"));

        let fresh = GenerationState::default();
        let msgs = vec![ChatMessage::pending_user("c1", "from history")];
        assert_eq!(fresh.retry_text(&msgs).as_deref(), Some("from history"));
        assert_eq!(fresh.retry_text(&[]), None);
    }

    #[test]
    fn stored_description_survives_its_own_pending_send() {
        // Optimistic append makes the list non-empty while the send is pending.
        assert!(!discard_stored(Some(1), true, true));
        assert!(discard_stored(Some(3), true, false));
        assert!(!discard_stored(Some(0), true, false));
        assert!(!discard_stored(None, true, false));
        assert!(!discard_stored(Some(2), false, false));
    }

    #[test]
    fn retry_picks_the_latest_user_message() {
        let mut reply = ChatMessage::pending_user("c1", "Here are your endpoints");
        reply.role = crate::models::Role::Assistant;
        let msgs = vec![
            ChatMessage::pending_user("c1", "first"),
            reply,
            ChatMessage::pending_user("c1", "second"),
        ];
        assert_eq!(last_user_message(&msgs).as_deref(), Some("second"));
        assert_eq!(last_user_message(&msgs[..2]).as_deref(), Some("first"));
        assert_eq!(last_user_message(&[]), None);
    }

    #[test]
    fn chat_ids_must_be_present() {
        assert!(is_valid_chat_id("9b2f0c1e"));
        assert!(!is_valid_chat_id("  "));
    }
}
