pub mod error;
pub mod image;
pub mod detection;
pub mod dictionary;
pub mod config;
pub mod composite;
pub mod playback;
pub mod draw;
