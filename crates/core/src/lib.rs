pub mod config;
pub mod fields;
pub mod notify;
pub mod store;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
