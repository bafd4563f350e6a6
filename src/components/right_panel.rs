use yew::prelude::*;

use crate::components::endpoint_card::EndpointCard;
use crate::models::MockEndpoint;
use crate::services::progress::{GenerationProgress, STEPS};

/// What the result panel shows. Exactly one view is active.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelView {
    Error(String),
    Generating,
    Populated,
    Empty,
}

impl PanelView {
    /// Error beats generating, generating beats a populated list.
    pub fn select(error: Option<&str>, is_generating: bool, endpoint_count: usize) -> Self {
        if let Some(err) = error {
            PanelView::Error(err.to_string())
        } else if is_generating {
            PanelView::Generating
        } else if endpoint_count > 0 {
            PanelView::Populated
        } else {
            PanelView::Empty
        }
    }
}

pub const SUGGESTIONS: [&str; 3] = [
    "Be more specific about the endpoints you need",
    "Name the resources and the fields they carry",
    "Mention the HTTP methods and status codes you expect",
];

#[derive(Properties, PartialEq)]
pub struct RightPanelProps {
    pub chat_id: String,
    pub endpoints: Vec<MockEndpoint>,
    pub is_generating: bool,
    pub progress: GenerationProgress,
    #[prop_or_default]
    pub error: Option<String>,
    pub has_messages: bool,
    pub on_retry: Callback<()>,
    pub on_unauthorized: Callback<()>,
}

#[function_component(RightPanel)]
pub fn right_panel(props: &RightPanelProps) -> Html {
    let view = PanelView::select(props.error.as_deref(), props.is_generating, props.endpoints.len());

    let body = match view {
        PanelView::Error(message) => error_view(&message, props.on_retry.clone()),
        PanelView::Generating => generating_view(&props.progress),
        PanelView::Populated => endpoints_view(props),
        PanelView::Empty => empty_view(props.has_messages),
    };

    let css = r#"
        .right-panel { height: calc(100vh - 180px); min-height: 420px; overflow-y: auto; background: var(--bg-card); border: 1px solid var(--border-color); border-radius: 10px; padding: 20px; }
        .panel-card { text-align: center; padding: 40px 20px; color: var(--text-secondary); }
        .panel-card h3 { color: var(--text-primary); margin-bottom: 8px; }
        .panel-card.error h3 { color: var(--danger-color); }
        .panel-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 16px; }
        .panel-header h3 { margin: 0; }
        .suggestions { text-align: left; display: inline-block; margin-top: 12px; }
        .progress-bar { height: 8px; background: var(--bg-hover); border-radius: 4px; overflow: hidden; margin: 12px 0; }
        .progress-fill { height: 100%; background: var(--accent-color); transition: width 0.3s; }
        .step-list { list-style: none; padding: 0; text-align: left; }
        .step-list li { padding: 8px 0; display: flex; gap: 10px; align-items: flex-start; }
        .step-list li.done { color: var(--accent-color); }
        .step-list li.active { color: var(--text-primary); font-weight: 600; }
        .endpoint-card { border: 1px solid var(--border-color); border-radius: 8px; padding: 14px; margin-bottom: 14px; background: var(--bg-app); }
        .endpoint-head { display: flex; justify-content: space-between; align-items: center; gap: 10px; }
        .endpoint-title { display: flex; align-items: center; gap: 8px; }
        .endpoint-actions { display: flex; flex-wrap: wrap; gap: 6px; margin-top: 10px; }
        .json-block { background: var(--bg-hover); padding: 10px; border-radius: 6px; font-size: 0.8rem; overflow-x: auto; white-space: pre-wrap; }
        .json-key { color: #7c3aed; }
        .json-string { color: #059669; }
        .json-number { color: #2563eb; }
        .json-boolean { color: #d97706; }
        .json-null { color: #6b7280; }
    "#;

    html! {
        <>
            <style>{ css }</style>
            <div class="right-panel">{ body }</div>
        </>
    }
}

fn error_view(message: &str, on_retry: Callback<()>) -> Html {
    html! {
        <div class="panel-card error" role="alert">
            <h3>{ "Generation Failed" }</h3>
            <p>{ message }</p>
            <button class="btn btn-primary" onclick={Callback::from(move |_| on_retry.emit(()))}>{ "Try Again" }</button>
        </div>
    }
}

fn generating_view(progress: &GenerationProgress) -> Html {
    let overall = progress.overall();
    let current = progress.current_step();
    html! {
        <div class="panel-card">
            <h3>{ "Generating Mock API" }</h3>
            <p>{ current.description }</p>
            <div class="progress-bar" aria-valuenow={overall.to_string()} aria-valuemin="0" aria-valuemax="100" role="progressbar">
                <div class="progress-fill" style={format!("width: {}%;", overall)}></div>
            </div>
            <p>{ format!("{}%", overall) }</p>
            <ul class="step-list">
                { for STEPS.iter().enumerate().map(|(i, step)| {
                    let state = progress.steps[i];
                    let cls = if state.completed {
                        "done"
                    } else if i == progress.current {
                        "active"
                    } else {
                        ""
                    };
                    html! {
                        <li key={step.id} class={cls}>
                            <span>{ if state.completed { "✓" } else if i == progress.current { "●" } else { "○" } }</span>
                            <div>
                                <div>{ step.title }</div>
                                if i == progress.current {
                                    <small class="muted">{ format!("{}%", state.progress) }</small>
                                }
                            </div>
                        </li>
                    }
                }) }
            </ul>
        </div>
    }
}

fn endpoints_view(props: &RightPanelProps) -> Html {
    let on_edit = Callback::from(|ep: MockEndpoint| {
        tracing::info!(endpoint = %ep.id, path = %ep.path, "edit endpoint requested");
    });
    let on_delete = Callback::from(|id: String| {
        tracing::info!(endpoint = %id, "delete endpoint requested");
    });
    let on_add = Callback::from(|_| tracing::info!("add endpoint requested"));

    html! {
        <>
            <div class="panel-header">
                <h3>{ format!("Generated Endpoints ({})", props.endpoints.len()) }</h3>
                <button class="btn btn-sm" onclick={on_add}>{ "+ Add Endpoint" }</button>
            </div>
            { for props.endpoints.iter().map(|ep| html! {
                <EndpointCard
                    key={ep.id.clone()}
                    chat_id={props.chat_id.clone()}
                    endpoint={ep.clone()}
                    on_edit={on_edit.clone()}
                    on_delete={on_delete.clone()}
                    on_unauthorized={props.on_unauthorized.clone()}
                />
            }) }
        </>
    }
}

fn empty_view(has_messages: bool) -> Html {
    if has_messages {
        html! {
            <div class="panel-card">
                <h3>{ "No Response Generated" }</h3>
                <p>{ "The assistant answered, but no endpoints came out of it. Try refining your request:" }</p>
                <ul class="suggestions">
                    { for SUGGESTIONS.iter().map(|s| html! { <li>{ *s }</li> }) }
                </ul>
            </div>
        }
    } else {
        html! {
            <div class="panel-card">
                <h3>{ "Ready to Generate" }</h3>
                <p>{ "Describe your API in the chat and the generated endpoints will show up here." }</p>
            </div>
        }
    }
}
