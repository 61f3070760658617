#[macro_use]
extern crate derive_more;

#[macro_use]
extern crate log;

mod app;
mod classifier;
mod config;
mod coordinator;
mod data_structures;
mod prelude;
mod spec;
mod status;
mod util;

pub use app::App;
pub use prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    App::new().await?.start().await
}
