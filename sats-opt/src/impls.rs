/// Implementation using `good_lp` with the pure-Rust microlp backend
#[cfg(feature = "microlp")]
pub mod microlp;
