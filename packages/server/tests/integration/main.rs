mod common;
#[cfg(unix)]
mod render;
mod scenes;
