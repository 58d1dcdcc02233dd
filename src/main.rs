mod app;
mod browse;
mod config;
mod error;
mod focus;
mod library;
mod logging;
mod mpris;
mod player;
mod runtime;
mod service;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
