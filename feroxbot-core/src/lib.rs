// src/lib.rs

pub mod db;
pub mod repositories;
pub mod platforms;
pub mod http;
pub mod cache;
pub mod features;
pub mod services;
pub mod utils;

pub use db::{Database, DatabaseOptions};
pub use feroxbot_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient, HttpResponse};
