use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::models::Theme;
use crate::routes::Route;
use crate::services::api::ApiClient;
use crate::services::auth::{self, AuthAction, AuthContext};

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub theme: Theme,
    pub on_toggle_theme: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let auth_ctx = use_context::<AuthContext>();
    let user = auth_ctx.as_ref().and_then(|a| a.user.clone());

    let on_logout = {
        let auth_ctx = auth_ctx.clone();
        Callback::from(move |_| {
            let auth_ctx = auth_ctx.clone();
            spawn_local(async move {
                auth::logout(&ApiClient::default_client()).await;
                if let Some(ctx) = auth_ctx {
                    ctx.dispatch(AuthAction::LoggedOut);
                }
            });
        })
    };

    let theme_label = match props.theme {
        Theme::Light => "🌙",
        Theme::Dark => "☀️",
    };

    html! {
        <header class="header">
            <Link<Route> to={Route::Home} classes="brand">
                <h2>{ "MaaS - Mock as a Service" }</h2>
            </Link<Route>>
            <div class="header-actions">
                <button
                    class="btn-icon"
                    onclick={props.on_toggle_theme.reform(|_| ())}
                    title="Toggle theme"
                    aria-label="Toggle theme"
                >
                    { theme_label }
                </button>
                if let Some(user) = user {
                    <span class="user-name" title={user.email.clone()}>{ user.full_name }</span>
                    <button class="btn" onclick={on_logout}>{ "Logout" }</button>
                }
            </div>
        </header>
    }
}
