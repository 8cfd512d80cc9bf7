pub mod actions;
pub mod config;
pub mod cookies;
pub mod credentials;
pub mod executor;
pub mod page;
pub mod transport;

pub use actions::{Action, ActionDispatcher, ActionOutcome, Navigation};
pub use config::{load_settings, ClientSettings};
pub use cookies::get_cookie;
pub use credentials::{CredentialStore, FileCredentials, MemoryCredentials};
pub use executor::{ActionError, ActionRequest, RequestExecutor};
pub use page::{Page, PageEvent, RecordingPage};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};
