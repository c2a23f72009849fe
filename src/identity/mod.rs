//! Identity for the participant API: bearer token verification, the two-tier access policy
//! and profile lookup. Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod token;
mod authorizer;
mod directory;

pub use principal::Principal;
pub use token::{AuthError, Claims, JwtVerifier, TokenVerifier, bearer_token};
pub use authorizer::{Action, Decision, DenyReason, Tier, authorize, authorize_tier};
pub use directory::{InMemoryDirectory, UserDirectory, UserProfile};
