pub mod api;
pub mod authorize;
pub mod client;
pub mod discovery;
pub mod session;
pub mod transport;
pub mod types;

pub use api::FreeboxApi;
pub use client::FreeboxClient;
pub use session::Session;
pub use transport::{HttpTransport, Transport};
