use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::header::Header;
use crate::models::Theme;
use crate::pages::{chat::ChatPage, home::HomePage, login::LoginPage};
use crate::routes::{guard, Access, Route};
use crate::services::auth::{self, AuthAction, AuthContext, AuthState};
use crate::services::storage::{LocalStorage, Storage, KEY_THEME};

const GLOBAL_STYLES: &str = r#"
    .theme-light {
        --bg-app: #ffffff;
        --bg-card: #ffffff;
        --bg-page: #f7f7f8;
        --bg-user: #10a37f;
        --text-user: #ffffff;
        --bg-assistant: #f4f4f4;
        --bg-hover: #f0f0f0;
        --border-color: #e5e5e5;
        --text-primary: #333;
        --text-secondary: #666;
        --accent-color: #10a37f;
        --accent-hover: #1a7f64;
        --danger-color: #ef4444;
    }
    .theme-dark {
        --bg-app: #1f2023;
        --bg-card: #26272b;
        --bg-page: #17181a;
        --bg-user: #10a37f;
        --text-user: #ffffff;
        --bg-assistant: #303136;
        --bg-hover: #34353a;
        --border-color: #3a3b40;
        --text-primary: #ececf1;
        --text-secondary: #a1a1aa;
        --accent-color: #19c37d;
        --accent-hover: #10a37f;
        --danger-color: #f87171;
    }

    * { box-sizing: border-box; }
    body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; }

    .app-container { min-height: 100vh; background: var(--bg-page); color: var(--text-primary); }
    .header { padding: 10px 20px; border-bottom: 1px solid var(--border-color); display: flex; justify-content: space-between; align-items: center; height: 60px; background: var(--bg-card); }
    .header h2 { font-size: 1rem; margin: 0; font-weight: 600; color: var(--text-primary); }
    .header .brand { text-decoration: none; }
    .header-actions { display: flex; align-items: center; gap: 12px; }
    .user-name { font-size: 0.9rem; color: var(--text-secondary); }

    .page { max-width: 1400px; margin: 0 auto; padding: 24px; }
    .chat-layout { display: grid; grid-template-columns: 2fr 3fr; gap: 20px; }
    @media (max-width: 900px) { .chat-layout { grid-template-columns: 1fr; } }

    .hero { max-width: 720px; margin: 40px auto; text-align: center; }
    .hero h1 { font-size: 2.4rem; margin-bottom: 12px; }
    .hero-form { display: flex; flex-direction: column; gap: 12px; margin-top: 24px; }
    .features { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 16px; max-width: 960px; margin: 0 auto; }
    .feature-card { background: var(--bg-card); border: 1px solid var(--border-color); border-radius: 10px; padding: 20px; }
    .feature-icon { font-size: 1.6rem; }

    .auth-page { display: flex; justify-content: center; padding-top: 60px; }
    .auth-card { width: 100%; max-width: 400px; background: var(--bg-card); border: 1px solid var(--border-color); border-radius: 10px; padding: 28px; }
    .auth-footer { margin-top: 16px; text-align: center; }
    .auth-link { color: var(--accent-color); }
    .form-label { display: block; font-size: 0.85rem; margin-bottom: 4px; color: var(--text-secondary); }

    .btn { cursor: pointer; border: 1px solid var(--border-color); background: var(--bg-card); padding: 8px 12px; border-radius: 6px; font-size: 0.9rem; transition: all 0.2s; color: var(--text-primary); text-decoration: none; }
    .btn:hover { background: var(--bg-hover); }
    .btn:disabled { opacity: 0.5; cursor: not-allowed; }
    .btn-sm { padding: 4px 8px; font-size: 0.8rem; }
    .btn-block { width: 100%; }
    .btn-primary { background: var(--accent-color); color: white; border-color: transparent; }
    .btn-primary:hover { background: var(--accent-hover); }
    .btn-danger { color: var(--danger-color); border-color: var(--danger-color); }
    .btn-icon { border: none; background: transparent; font-size: 1.2rem; padding: 5px; color: var(--text-secondary); cursor: pointer; }
    .btn-icon:hover { background: var(--bg-hover); color: var(--text-primary); }

    .form-input, .form-textarea { width: 100%; padding: 8px; border: 1px solid var(--border-color); border-radius: 6px; font-family: inherit; margin-bottom: 10px; background: var(--bg-app); color: var(--text-primary); }
    .form-input:focus, .form-textarea:focus { outline: 2px solid var(--accent-color); border-color: transparent; }

    .error-banner { background: rgba(239, 68, 68, 0.1); border: 1px solid var(--danger-color); color: var(--danger-color); padding: 10px 14px; border-radius: 6px; margin-bottom: 14px; display: flex; justify-content: space-between; align-items: center; gap: 10px; }
    .error-text { color: var(--danger-color); }
    .muted { color: var(--text-secondary); }
    .sr-only { position: absolute; width: 1px; height: 1px; overflow: hidden; clip: rect(0, 0, 0, 0); }

    .badge { display: inline-block; padding: 2px 8px; border-radius: 10px; font-size: 0.75rem; font-weight: 600; }
    .method-get { background: #dbeafe; color: #1d4ed8; }
    .method-post { background: #dcfce7; color: #15803d; }
    .method-put, .method-patch { background: #fef3c7; color: #b45309; }
    .method-delete { background: #fee2e2; color: #b91c1c; }
    .method-other, .status-other { background: #e5e7eb; color: #374151; }
    .status-ok { background: #dcfce7; color: #15803d; }
    .status-client { background: #fef3c7; color: #b45309; }
    .status-server { background: #fee2e2; color: #b91c1c; }

    .spinner { display: inline-block; width: 12px; height: 12px; border: 2px solid currentColor; border-right-color: transparent; border-radius: 50%; animation: spin 0.8s linear infinite; vertical-align: middle; }
    @keyframes spin { to { transform: rotate(360deg); } }

    .markdown-body { line-height: 1.6; font-size: 0.95rem; }
    .markdown-body pre { background: #2d2d2d; color: #fff; padding: 15px; border-radius: 6px; overflow-x: auto; }
    .markdown-body code { background: var(--bg-hover); padding: 2px 4px; border-radius: 4px; font-family: monospace; font-size: 0.9em; }
    .markdown-body pre code { background: transparent; color: inherit; }
    .markdown-body p { margin-top: 0; margin-bottom: 1em; }
"#;

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::Login => html! { <LoginPage /> },
        Route::Chat { id } => html! { <ChatPage key={id.clone()} id={id.clone()} /> },
        Route::NotFound => html! {
            <div class="page panel-card">
                <h3>{ "Page not found" }</h3>
                <Link<Route> to={Route::Home} classes="btn btn-primary">{ "Back to Home" }</Link<Route>>
            </div>
        },
    }
}

#[derive(Properties, PartialEq)]
struct GuardedProps {
    route: Route,
}

/// Applies the route guard once the stored session has been read.
#[function_component(Guarded)]
fn guarded(props: &GuardedProps) -> Html {
    let auth_ctx = use_context::<AuthContext>();
    let Some(auth) = auth_ctx else {
        return html! {};
    };
    if !auth.restored {
        return html! { <div class="page"><span class="spinner"></span></div> };
    }

    match guard(&props.route, auth.is_authenticated()) {
        Access::Render => switch(props.route.clone()),
        Access::Redirect(to) => {
            tracing::info!(from = ?props.route, to = ?to, "route guard redirect");
            html! { <Redirect<Route> to={to} /> }
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let auth = use_reducer(AuthState::default);
    let theme = use_state(|| LocalStorage.get::<Theme>(KEY_THEME).unwrap_or_default());

    // --- EFFECTS ---
    {
        let auth = auth.clone();
        use_effect_with((), move |_| {
            auth.dispatch(AuthAction::Restore(auth::restore(&LocalStorage)));
        });
    }
    {
        let theme = theme.clone();
        use_effect_with(theme, |t| LocalStorage.set(KEY_THEME, &**t));
    }

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_| theme.set(theme.toggled()))
    };

    html! {
        <>
            <style>{ GLOBAL_STYLES }</style>
            <ContextProvider<AuthContext> context={auth}>
                <BrowserRouter>
                    <div class={classes!("app-container", theme.class())}>
                        <Header theme={*theme} on_toggle_theme={on_toggle_theme} />
                        <Switch<Route> render={|route| html! { <Guarded route={route} /> }} />
                    </div>
                </BrowserRouter>
            </ContextProvider<AuthContext>>
        </>
    }
}
