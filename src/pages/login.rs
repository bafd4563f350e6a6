use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;
use crate::services::api::ApiClient;
use crate::services::auth::{self, AuthAction, AuthContext};

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let auth_ctx = use_context::<AuthContext>();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let is_loading = use_state(|| false);
    let error = use_state(|| Option::<String>::None);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            password.set(input.value());
        })
    };

    let on_submit = {
        let email = email.clone();
        let password = password.clone();
        let is_loading = is_loading.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *is_loading {
                return;
            }
            is_loading.set(true);
            error.set(None);

            let email = (*email).clone();
            let password = (*password).clone();
            let is_loading = is_loading.clone();
            let error = error.clone();
            let auth_ctx = auth_ctx.clone();
            spawn_local(async move {
                let result = auth::login(&ApiClient::default_client(), &email, &password).await;
                is_loading.set(false);
                match result {
                    // The guard moves us off /login once the context flips.
                    Ok(user) => match auth_ctx {
                        Some(ctx) => ctx.dispatch(AuthAction::LoggedIn(user)),
                        None => tracing::error!("auth context missing"),
                    },
                    Err(msg) => error.set(Some(msg)),
                }
            });
        })
    };

    html! {
        <div class="page auth-page">
            <div class="auth-card">
                <h1>{ "Welcome Back" }</h1>
                <p class="muted">{ "Sign in to generate and test mock APIs" }</p>

                if let Some(msg) = &*error {
                    <div class="error-banner" role="alert">{ msg }</div>
                }

                <form onsubmit={on_submit}>
                    <label class="form-label" for="login-email">{ "Email" }</label>
                    <input
                        id="login-email"
                        class="form-input"
                        type="email"
                        required=true
                        placeholder="you@example.com"
                        value={(*email).clone()}
                        oninput={on_email}
                        disabled={*is_loading}
                    />
                    <label class="form-label" for="login-password">{ "Password" }</label>
                    <input
                        id="login-password"
                        class="form-input"
                        type="password"
                        required=true
                        placeholder="••••••••"
                        value={(*password).clone()}
                        oninput={on_password}
                        disabled={*is_loading}
                    />
                    <button type="submit" class="btn btn-primary btn-block" disabled={*is_loading}>
                        if *is_loading {
                            <span class="spinner"></span>{ " Signing in..." }
                        } else {
                            { "Sign In" }
                        }
                    </button>
                </form>

                <div class="auth-footer">
                    <Link<Route> to={Route::Home} classes="auth-link">{ "Back to Home" }</Link<Route>>
                </div>
            </div>
        </div>
    }
}
