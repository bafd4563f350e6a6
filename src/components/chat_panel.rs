use web_sys::{HtmlElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::models::{ChatMessage, MessageStatus};
use crate::utils::{format_time, render_markdown};

pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Create a user management API with CRUD operations",
    "Build an e-commerce API with products and orders",
    "Generate a blog API with posts and comments",
    "Create a simple todo API with tasks and categories",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChatPhase {
    /// No messages yet; the user is composing the first description.
    Empty,
    AwaitingResponse,
    Idle,
}

pub fn phase(message_count: usize, in_flight: bool) -> ChatPhase {
    if in_flight {
        ChatPhase::AwaitingResponse
    } else if message_count == 0 {
        ChatPhase::Empty
    } else {
        ChatPhase::Idle
    }
}

pub fn can_submit(input: &str, in_flight: bool) -> bool {
    !in_flight && !input.trim().is_empty()
}

#[derive(Properties, PartialEq)]
pub struct ChatPanelProps {
    pub messages: Vec<ChatMessage>,
    pub is_generating: bool,
    pub on_submit: Callback<String>,
}

#[function_component(ChatPanel)]
pub fn chat_panel(props: &ChatPanelProps) -> Html {
    let input_text = use_state(String::new);
    let scroll_ref = use_node_ref();
    let input_ref = use_node_ref();
    let current = phase(props.messages.len(), props.is_generating);
    let submit_enabled = can_submit(&input_text, props.is_generating);

    // Auto-scroll effect
    {
        let div_ref = scroll_ref.clone();
        let len = props.messages.len();
        use_effect_with((len, props.is_generating), move |_| {
            if let Some(div) = div_ref.cast::<HtmlElement>() {
                div.set_scroll_top(div.scroll_height());
            }
        });
    }

    // Focus on mount
    {
        let input_ref = input_ref.clone();
        use_effect_with((), move |_| {
            if let Some(el) = input_ref.cast::<HtmlTextAreaElement>() {
                let _ = el.focus();
            }
        });
    }

    let submit = {
        let text = input_text.clone();
        let on_submit = props.on_submit.clone();
        let in_flight = props.is_generating;
        Callback::from(move |_: ()| {
            if can_submit(&text, in_flight) {
                on_submit.emit(text.trim().to_string());
                text.set(String::new());
            }
        })
    };

    let on_form_submit = {
        let submit = submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            submit.emit(());
        })
    };

    let on_keydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" && !e.shift_key() {
                e.prevent_default();
                submit.emit(());
            }
        })
    };

    let on_input = {
        let text = input_text.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            text.set(area.value());
            let style = area.style();
            let _ = style.set_property("height", "auto");
            let height = area.scroll_height().min(120);
            let _ = style.set_property("height", &format!("{}px", height));
        })
    };

    let css = r#"
        .chat-panel { display: flex; flex-direction: column; height: calc(100vh - 180px); min-height: 420px; background: var(--bg-card); border: 1px solid var(--border-color); border-radius: 10px; overflow: hidden; }
        .messages-container { flex-grow: 1; overflow-y: auto; padding: 20px; display: flex; flex-direction: column; gap: 15px; scroll-behavior: smooth; }
        .message-row { display: flex; width: 100%; }
        .message-row.user { justify-content: flex-end; }
        .message-row.assistant { justify-content: flex-start; }
        .msg-bubble { padding: 10px 15px; border-radius: 12px; font-size: 0.95rem; line-height: 1.5; max-width: 85%; overflow-wrap: anywhere; box-shadow: 0 1px 2px rgba(0,0,0,0.05); }
        .message-row.user .msg-bubble { background: var(--bg-user); color: var(--text-user); border-bottom-right-radius: 2px; }
        .message-row.assistant .msg-bubble { background: var(--bg-assistant); color: var(--text-primary); border-bottom-left-radius: 2px; }
        .msg-meta { font-size: 0.7rem; opacity: 0.7; margin-top: 4px; }
        .msg-pending { font-style: italic; }
        .empty-transcript { margin: auto; text-align: center; color: var(--text-secondary); }
        .input-wrapper { border-top: 1px solid var(--border-color); padding: 16px; }
        .chat-input { width: 100%; min-height: 80px; max-height: 120px; padding: 12px; border: 1px solid var(--border-color); border-radius: 8px; resize: none; font-family: inherit; background: var(--bg-app); color: var(--text-primary); outline: none; }
        .chat-input:focus { border-color: var(--accent-color); box-shadow: 0 0 0 2px rgba(16, 163, 127, 0.1); }
        .input-hint { font-size: 0.75rem; color: var(--text-secondary); margin: 4px 0 10px; }
        .input-footer { display: flex; justify-content: space-between; align-items: center; font-size: 0.85rem; color: var(--text-secondary); }
        .examples { margin-top: 12px; display: grid; gap: 6px; }
        .example-btn { text-align: left; padding: 8px; font-size: 0.85rem; border: none; background: transparent; color: var(--text-secondary); border-radius: 6px; cursor: pointer; }
        .example-btn:hover { background: var(--bg-hover); color: var(--text-primary); }
    "#;

    html! {
        <>
            <style>{ css }</style>
            <div class="chat-panel">
                <div class="messages-container" ref={scroll_ref}>
                    if current == ChatPhase::Empty {
                        <div class="empty-transcript">{ "Describe the API you want to mock to get started." }</div>
                    }
                    { for props.messages.iter().map(|msg| {
                        let role_cls = if msg.is_user() { "user" } else { "assistant" };
                        let pending = msg.status == MessageStatus::Pending;
                        html! {
                            <div key={msg.id.clone()} class={classes!("message-row", role_cls)}>
                                <div class={classes!("msg-bubble", pending.then(|| "msg-pending"))}>
                                    if msg.is_user() {
                                        <div style="white-space: pre-wrap;">{ &msg.content }</div>
                                    } else {
                                        { render_markdown(&msg.content) }
                                    }
                                    <div class="msg-meta">
                                        { format_time(&msg.created_at) }
                                        if pending { { " · sending" } }
                                    </div>
                                </div>
                            </div>
                        }
                    })}

                    if current == ChatPhase::AwaitingResponse {
                        <div class="message-row assistant">
                            <div class="msg-bubble" style="color: #888; font-style: italic;">
                                <span class="spinner"></span>{ " Generating your mock API..." }
                            </div>
                        </div>
                    }
                </div>

                <div class="input-wrapper">
                    <form onsubmit={on_form_submit}>
                        <label for="api-description" class="sr-only">{ "API Description" }</label>
                        <textarea
                            id="api-description"
                            class="chat-input"
                            ref={input_ref}
                            placeholder="Describe the API you want to mock..."
                            value={(*input_text).clone()}
                            oninput={on_input}
                            onkeydown={on_keydown}
                            disabled={props.is_generating}
                            aria-label="Describe the API you want to mock"
                        />
                        <p class="input-hint">{ "Press Enter to send, Shift+Enter for new line" }</p>
                        <div class="input-footer">
                            <span>
                                if props.is_generating {
                                    <span class="spinner"></span>{ " Generating your mock API..." }
                                } else {
                                    { "Ready to generate mock APIs" }
                                }
                            </span>
                            <button type="submit" class="btn btn-primary" disabled={!submit_enabled} aria-label="Generate mock API">
                                { if props.is_generating { "Generating..." } else { "Generate Mock" } }
                            </button>
                        </div>
                    </form>

                    if !props.is_generating && input_text.is_empty() {
                        <div class="examples">
                            <p class="input-hint">{ "Try these examples:" }</p>
                            { for EXAMPLE_PROMPTS.iter().map(|example| {
                                let text = input_text.clone();
                                let example = *example;
                                html! {
                                    <button type="button" class="example-btn" onclick={Callback::from(move |_| text.set(example.to_string()))}>
                                        { example }
                                    </button>
                                }
                            })}
                        </div>
                    }
                </div>
            </div>
        </>
    }
}
