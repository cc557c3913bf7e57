pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

/// Asset version of the site. Bump when static assets change to blow away
/// any browser caches; rendered pages receive it as the `Release` local.
pub const RELEASE: &str = "1";
