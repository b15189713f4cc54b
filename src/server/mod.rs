// Server module entry
// Listener creation, per-connection serving, the accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::run;
pub use signal::shutdown_signal;
