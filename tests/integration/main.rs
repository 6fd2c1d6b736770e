//! HTTP integration tests driving the router against in-memory collaborators.

mod admin_test;
mod auth_test;
mod helpers;
