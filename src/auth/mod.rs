pub mod authenticator;
pub mod clock;
pub mod signature;

pub use authenticator::{
    AuthConfig, AuthDecision, AuthError, RequestAuthenticator, SignedRequest,
    DEFAULT_FRESHNESS_WINDOW_SECS,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use signature::{sign, SignedHeaders, SIGNATURE_HEADER, TIMESTAMP_HEADER};
