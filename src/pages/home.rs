use uuid::Uuid;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;
use crate::services::storage::{pending_message_key, LocalStorage, Storage};

const FEATURES: [(&str, &str, &str); 3] = [
    ("⚡", "Instant Endpoints", "Describe an API in plain English and get working mock endpoints in seconds."),
    ("🧪", "Live Testing", "Call every generated endpoint straight from the browser and inspect the response."),
    ("📦", "Export Anywhere", "Copy or download realistic JSON responses for your frontend fixtures."),
];

/// Parks the description for the chat page and returns the new chat id.
pub fn start_chat<S: Storage>(storage: &S, description: &str) -> Option<String> {
    let description = description.trim();
    if description.is_empty() {
        return None;
    }
    let chat_id = Uuid::new_v4().to_string();
    storage.set_item(&pending_message_key(&chat_id), description);
    Some(chat_id)
}

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let navigator = use_navigator();
    let description = use_state(String::new);
    let can_generate = !description.trim().is_empty();

    let on_input = {
        let description = description.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            description.set(area.value());
        })
    };

    let on_submit = {
        let description = description.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(chat_id) = start_chat(&LocalStorage, &description) else {
                return;
            };
            tracing::info!(chat = %chat_id, "starting new chat");
            match &navigator {
                Some(nav) => nav.push(&Route::Chat { id: chat_id }),
                None => tracing::error!("navigator unavailable outside router"),
            }
        })
    };

    html! {
        <div class="page home-page">
            <section class="hero">
                <h1>{ "Mock APIs from a sentence" }</h1>
                <p class="muted">
                    { "Tell MaaS what your backend should look like. It designs the endpoints, schemas and sample data so you can build the frontend today." }
                </p>
                <form class="hero-form" onsubmit={on_submit}>
                    <label for="home-description" class="sr-only">{ "API Description" }</label>
                    <textarea
                        id="home-description"
                        class="form-textarea"
                        rows="5"
                        placeholder="e.g. A bookstore API with books, authors and orders"
                        value={(*description).clone()}
                        oninput={on_input}
                    />
                    <button type="submit" class="btn btn-primary" disabled={!can_generate}>
                        { "Generate Mock API" }
                    </button>
                </form>
            </section>

            <section class="features">
                { for FEATURES.iter().map(|(icon, title, text)| html! {
                    <div class="feature-card">
                        <div class="feature-icon">{ *icon }</div>
                        <h3>{ *title }</h3>
                        <p class="muted">{ *text }</p>
                    </div>
                }) }
            </section>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    #[test]
    fn stores_trimmed_description_under_chat_key() {
        let store = MemoryStorage::default();
        let id = start_chat(&store, "  Create a user management API  ").unwrap();

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(
            store.get_item(&pending_message_key(&id)).as_deref(),
            Some("Create a user management API")
        );
    }

    #[test]
    fn blank_descriptions_do_not_start_a_chat() {
        let store = MemoryStorage::default();
        assert_eq!(start_chat(&store, " \n "), None);
    }

    #[test]
    fn every_chat_gets_a_fresh_id() {
        let store = MemoryStorage::default();
        let a = start_chat(&store, "a").unwrap();
        let b = start_chat(&store, "a").unwrap();
        assert_ne!(a, b);
    }
}
