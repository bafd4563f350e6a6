use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, Utc};
use pulldown_cmark::{Event as MdEvent, Options, Parser};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use yew::{html, AttrValue, Html};

use crate::config::AppConfig;

pub fn set_panic_hook() {
    // Panics otherwise surface as an opaque "unreachable executed" in the
    // console. See https://github.com/rustwasm/console_error_panic_hook#readme
    console_error_panic_hook::set_once();
}

pub fn init_logging(config: &AppConfig) {
    let layer = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(config.log_level)
        .build();
    tracing_wasm::set_as_global_default_with_config(layer);
}

pub fn render_markdown(text: &str) -> Html {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        MdEvent::SoftBreak => MdEvent::HardBreak,
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);

    let styled_html = format!(r#"<div class="markdown-body">{}</div>"#, html_output);
    Html::from_html_unchecked(AttrValue::from(styled_html))
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty body, cut at `max` chars with an ellipsis.
pub fn json_preview(value: &Value, max: usize) -> String {
    let full = pretty_json(value);
    if full.chars().count() <= max {
        return full;
    }
    let mut cut: String = full.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Re-indents a response body when it is JSON, otherwise returns it as-is.
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .map(|v| pretty_json(&v))
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JsonToken {
    Key,
    Str,
    Number,
    Boolean,
    Null,
    Plain,
}

impl JsonToken {
    fn class(self) -> &'static str {
        match self {
            JsonToken::Key => "json-key",
            JsonToken::Str => "json-string",
            JsonToken::Number => "json-number",
            JsonToken::Boolean => "json-boolean",
            JsonToken::Null => "json-null",
            JsonToken::Plain => "",
        }
    }
}

/// Splits pretty-printed JSON into classified spans for highlighting.
pub fn tokenize_json(src: &str) -> Vec<(JsonToken, &str)> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let token = match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(bytes.len());
                let rest = src[i..].trim_start_matches(' ');
                if rest.starts_with(':') {
                    JsonToken::Key
                } else {
                    JsonToken::Str
                }
            }
            b'-' | b'0'..=b'9' => {
                while i < bytes.len() && matches!(bytes[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9') {
                    i += 1;
                }
                JsonToken::Number
            }
            b't' if src[i..].starts_with("true") => {
                i += 4;
                JsonToken::Boolean
            }
            b'f' if src[i..].starts_with("false") => {
                i += 5;
                JsonToken::Boolean
            }
            b'n' if src[i..].starts_with("null") => {
                i += 4;
                JsonToken::Null
            }
            _ => {
                i += 1;
                continue;
            }
        };
        push_plain(&mut out, src, plain_start, start);
        out.push((token, &src[start..i]));
        plain_start = i;
    }
    push_plain(&mut out, src, plain_start, bytes.len());
    out
}

fn push_plain<'a>(out: &mut Vec<(JsonToken, &'a str)>, src: &'a str, from: usize, to: usize) {
    if to > from {
        out.push((JsonToken::Plain, &src[from..to]));
    }
}

pub fn highlight_json(value: &Value) -> Html {
    let text = pretty_json(value);
    html! {
        <pre class="json-block">
            { for tokenize_json(&text).into_iter().map(|(tok, s)| match tok {
                JsonToken::Plain => html! { <>{ s.to_string() }</> },
                _ => html! { <span class={tok.class()}>{ s.to_string() }</span> },
            }) }
        </pre>
    }
}

pub fn download_filename(method: &str, path: &str) -> String {
    format!("{}_{}.json", path.replace('/', "_"), method.to_lowercase())
}

pub fn method_class(method: &str) -> &'static str {
    match method.to_uppercase().as_str() {
        "GET" => "method-get",
        "POST" => "method-post",
        "PUT" => "method-put",
        "PATCH" => "method-patch",
        "DELETE" => "method-delete",
        _ => "method-other",
    }
}

pub fn status_label(status: u16) -> &'static str {
    match status {
        200..=299 => "Success",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Unknown",
    }
}

pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "status-ok",
        400..=499 => "status-client",
        500..=599 => "status-server",
        _ => "status-other",
    }
}

pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

pub async fn copy_to_clipboard(text: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("clipboard")).map_err(js_err)?;
    let write_text: js_sys::Function = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    let promise: js_sys::Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    JsFuture::from(promise).await.map_err(js_err)?;
    Ok(())
}

pub fn download_json(filename: &str, value: &Value) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;
    let body = document.body().ok_or_else(|| anyhow!("no body"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&pretty_json(value)));
    let opts = web_sys::BlobPropertyBag::new();
    opts.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| anyhow!("not an anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    body.append_child(&anchor).map_err(js_err)?;
    anchor.click();
    anchor.remove();
    web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
    Ok(())
}
