//! Namespaces generated by `build.rs` from `namespaces.toml`.

pub mod namespaces {
    include!(concat!(env!("OUT_DIR"), "/namespaces.rs"));
}

use namespaces::text::FmtWrite as _;
use namespaces::{text, time};

pub fn three_seconds() -> time::Duration {
    time::Duration::from_millis(3000)
}

pub fn bracketed(value: i32) -> Result<text::String, std::fmt::Error> {
    let mut out = text::String::new();
    write!(out, "[{}]", value)?;
    Ok(out)
}
