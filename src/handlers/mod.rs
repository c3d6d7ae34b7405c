// handlers/mod.rs - request handlers
//
// Every route under /sql/* runs behind the HMAC gate and receives the
// already-parsed body as an `AuthenticatedBody` extension.
pub mod sql;
