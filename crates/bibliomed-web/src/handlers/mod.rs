//! HTTP handlers for all web routes.

pub mod api;
pub mod collect;
pub mod export;
pub mod login;
pub mod pages;
