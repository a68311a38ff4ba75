#![recursion_limit = "256"]

pub mod api;
pub mod app;
pub mod display;
pub mod draft;
#[cfg(feature = "hydrate")]
pub mod map;
pub mod overlay;
pub mod regions;
#[cfg(feature = "ssr")]
pub mod server;
pub mod view;

pub use app::App;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    leptos::mount::hydrate_body(App);
}
