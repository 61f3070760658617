pub use crate::{config::*, coordinator::*, data_structures::*, util::*};
pub use anyhow::{Context, Error, Result};
pub use std::sync::Arc;
pub use tokio::sync::RwLock;

pub type SharedRwLock<T> = Arc<RwLock<T>>;
