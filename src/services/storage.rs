use serde::{Deserialize, Serialize};
use web_sys::window;

pub const KEY_AUTH_TOKEN: &str = "authToken";
pub const KEY_USER_DATA: &str = "userData";
pub const KEY_THEME: &str = "theme";

/// Key under which the home page parks a description until the chat page
/// sends it as the first generation request.
pub fn pending_message_key(chat_id: &str) -> String {
    format!("chat_{}_message", chat_id)
}

/// String-valued key/value store. JSON helpers are layered on top so raw
/// values (the bearer token, pending descriptions) stay unquoted.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);

    fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let json = self.get_item(key)?;
        serde_json::from_str(&json).ok()
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Ok(json) = serde_json::to_string(value) {
            self.set_item(key, &json);
        }
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        window()?.local_storage().ok()?
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                tracing::warn!(key, "localStorage write failed");
            }
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(key).is_err() {
                tracing::warn!(key, "localStorage remove failed");
            }
        }
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::Storage;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-process stand-in for `localStorage`. Clones share the same map.
    #[derive(Clone, Default, Debug)]
    pub struct MemoryStorage {
        items: Rc<RefCell<HashMap<String, String>>>,
    }

    impl MemoryStorage {
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            let s = Self::default();
            for (k, v) in pairs {
                s.set_item(k, v);
            }
            s
        }

        pub fn contains(&self, key: &str) -> bool {
            self.items.borrow().contains_key(key)
        }
    }

    impl Storage for MemoryStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        fn set_item(&self, key: &str, value: &str) {
            self.items.borrow_mut().insert(key.to_string(), value.to_string());
        }

        fn remove_item(&self, key: &str) {
            self.items.borrow_mut().remove(key);
        }
    }
}
