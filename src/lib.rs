// cargo: dep = "yew"
// cargo: dep = "yew-router"
// cargo: dep = "serde"
// cargo: dep = "serde_json"
// cargo: dep = "reqwest"
// cargo: dep = "pulldown-cmark"
// cargo: dep = "futures-util"
// cargo: dep = "wasm-bindgen"
// cargo: dep = "wasm-bindgen-futures"
// cargo: dep = "web-sys"
// cargo: dep = "uuid"
// cargo: dep = "js-sys"
// cargo: dep = "anyhow"
// cargo: dep = "thiserror"
// cargo: dep = "console_error_panic_hook"
// cargo: dep = "tracing"
// cargo: dep = "tracing-wasm"
// cargo: dep = "chrono"
// cargo: dep = "gloo-timers"

mod app;
mod components;
mod config;
mod models;
mod pages;
mod routes;
mod services;
mod utils;

use wasm_bindgen::prelude::*;
use app::App;
use config::AppConfig;

#[wasm_bindgen(start)]
pub fn run_app() {
    utils::set_panic_hook();
    let config = AppConfig::load();
    utils::init_logging(&config);
    tracing::info!(base_url = %config.base_url, "starting MaaS client");
    yew::Renderer::<App>::new().render();
}
