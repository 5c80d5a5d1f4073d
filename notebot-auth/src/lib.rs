pub mod error;
pub mod middleware;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use middleware::{AuthenticatedUser, AuthenticationMiddleware};
pub use password::{hash_password, verify_password};
pub use token::{bearer_token, create_access_token, verify_access_token, Claims, JwtSettings};
