pub mod config;
pub mod fetch;
pub mod flickr;
pub mod output;

pub use config::Config;
pub use fetch::{ClassRequest, ClassUrlMap, FetchOrchestrator, FetchOutcome, FetchReport};
pub use flickr::{Client, PhotoSearch};
