#[macro_use]
extern crate failure;

pub mod access;
pub mod api;
pub mod app;
pub mod config;
pub mod details;
pub mod error;
pub mod images;
pub mod list;
pub mod newplate;
pub mod plates;
pub mod render;
pub mod screen;
pub mod types;
