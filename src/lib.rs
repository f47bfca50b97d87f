pub mod art_style;
pub mod batch;
pub mod config;
pub mod error;
pub mod game;
pub mod http;
pub mod image_info;
pub mod logging;
pub mod providers;
pub mod resolver;
pub mod settings;
