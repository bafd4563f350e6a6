use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::models::{EndpointTestResult, MockEndpoint};
use crate::services::api::ApiClient;
use crate::utils::{
    copy_to_clipboard, download_filename, download_json, highlight_json, json_preview, method_class,
    pretty_body, pretty_json, status_class, status_label,
};

const PREVIEW_CHARS: usize = 200;

#[derive(Clone, PartialEq)]
enum TestState {
    Idle,
    Running,
    Done(EndpointTestResult),
    Failed(String),
}

#[derive(Properties, PartialEq)]
pub struct EndpointCardProps {
    pub chat_id: String,
    pub endpoint: MockEndpoint,
    pub on_edit: Callback<MockEndpoint>,
    pub on_delete: Callback<String>,
    /// Fired when the live call comes back 401.
    pub on_unauthorized: Callback<()>,
}

#[function_component(EndpointCard)]
pub fn endpoint_card(props: &EndpointCardProps) -> Html {
    let expanded = use_state(|| false);
    let copied = use_state(|| false);
    let test_state = use_state(|| TestState::Idle);
    let ep = &props.endpoint;

    let toggle = {
        let expanded = expanded.clone();
        Callback::from(move |_| expanded.set(!*expanded))
    };

    let on_copy = {
        let copied = copied.clone();
        let text = pretty_json(&ep.response_body);
        Callback::from(move |_| {
            let copied = copied.clone();
            let text = text.clone();
            spawn_local(async move {
                match copy_to_clipboard(&text).await {
                    Ok(()) => {
                        copied.set(true);
                        Timeout::new(2_000, move || copied.set(false)).forget();
                    }
                    Err(e) => tracing::error!(error = %e, "failed to copy to clipboard"),
                }
            });
        })
    };

    let on_download = {
        let ep = ep.clone();
        Callback::from(move |_| {
            let name = download_filename(&ep.method, &ep.path);
            if let Err(e) = download_json(&name, &ep.response_body) {
                tracing::error!(error = %e, file = %name, "download failed");
            }
        })
    };

    let on_test = {
        let ep = ep.clone();
        let chat_id = props.chat_id.clone();
        let state = test_state.clone();
        let on_unauthorized = props.on_unauthorized.clone();
        Callback::from(move |_| {
            if *state == TestState::Running {
                return;
            }
            state.set(TestState::Running);
            let ep = ep.clone();
            let chat_id = chat_id.clone();
            let state = state.clone();
            let on_unauthorized = on_unauthorized.clone();
            spawn_local(async move {
                let client = ApiClient::default_client();
                match client.test_endpoint(&chat_id, &ep).await {
                    Ok(res) => state.set(TestState::Done(res)),
                    Err(e) => {
                        if e.is_unauthorized() {
                            on_unauthorized.emit(());
                        }
                        state.set(TestState::Failed(e.to_string()));
                    }
                }
            });
        })
    };

    let on_edit = {
        let cb = props.on_edit.clone();
        let ep = ep.clone();
        Callback::from(move |_| cb.emit(ep.clone()))
    };

    let on_delete = {
        let cb = props.on_delete.clone();
        let id = ep.id.clone();
        Callback::from(move |_| cb.emit(id.clone()))
    };

    let test_output = match &*test_state {
        TestState::Idle => html! {},
        TestState::Running => html! { <p class="muted"><span class="spinner"></span>{ " Calling mock..." }</p> },
        TestState::Done(res) => html! {
            <div class="test-result">
                <span class={classes!("badge", status_class(res.status))}>{ format!("{} {}", res.status, status_label(res.status)) }</span>
                <pre class="json-block">{ pretty_body(&res.body) }</pre>
            </div>
        },
        TestState::Failed(msg) => html! { <p class="error-text">{ msg }</p> },
    };

    html! {
        <div class="endpoint-card">
            <div class="endpoint-head">
                <div class="endpoint-title">
                    <span class={classes!("badge", "method", method_class(&ep.method))}>{ &ep.method }</span>
                    <code>{ &ep.path }</code>
                </div>
                <span class={classes!("badge", status_class(ep.status_code))}>
                    { format!("{} {}", ep.status_code, status_label(ep.status_code)) }
                </span>
            </div>
            <p class="muted">{ &ep.description }</p>

            <div class="endpoint-response">
                <p class="label">{ "Response:" }</p>
                if *expanded {
                    { highlight_json(&ep.response_body) }
                } else {
                    <pre class="json-block">{ json_preview(&ep.response_body, PREVIEW_CHARS) }</pre>
                }
            </div>

            { test_output }

            <div class="endpoint-actions">
                <button class="btn btn-sm" onclick={toggle}>{ if *expanded { "Collapse" } else { "Expand" } }</button>
                <button class="btn btn-sm" onclick={on_copy}>{ if *copied { "Copied!" } else { "Copy JSON" } }</button>
                <button class="btn btn-sm" onclick={on_download}>{ "Download" }</button>
                <button class="btn btn-sm btn-primary" onclick={on_test} disabled={*test_state == TestState::Running}>{ "Test" }</button>
                <button class="btn btn-sm" onclick={on_edit}>{ "Edit" }</button>
                <button class="btn btn-sm btn-danger" onclick={on_delete}>{ "Delete" }</button>
            </div>
        </div>
    }
}
