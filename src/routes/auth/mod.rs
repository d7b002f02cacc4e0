pub mod login;
pub mod logout;
pub mod session;
pub mod social;

pub use login::handle_login;
pub use logout::handle_logout;
pub use session::{handle_session, handle_session_update, refresh_session, AuthSession};
pub use social::handle_social_login;
