mod app;
mod components;
mod config;
mod models;

use app::App;
use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::{APP_NAME, MOUNT_ELEMENT_ID};

fn main() {
    console_error_panic_hook::set_once();

    let Some(root) = document().get_element_by_id(MOUNT_ELEMENT_ID) else {
        panic!("index.html has no #{MOUNT_ELEMENT_ID} element to mount {APP_NAME} into");
    };

    log!("[{APP_NAME}] mounting into #{MOUNT_ELEMENT_ID}");
    mount_to(root.unchecked_into::<web_sys::HtmlElement>(), App).forget();
}
