//! Data-access layer generated from `fsdb.yaml` at build time.

pub mod models;

pub mod store {
    use crate::models::{Meta, User};

    include!(concat!(env!("OUT_DIR"), "/store.rs"));
}
