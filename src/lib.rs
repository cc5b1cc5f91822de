//! # Docsgate
//!
//! `docsgate` is a thin HTTP gateway in front of a document upload/OCR
//! backend. All real work is delegated to two remote services:
//!
//! - an **auth service** issuing, verifying and refreshing opaque JWT
//!   access/refresh token pairs,
//! - a **docs service** handling file storage, OCR analysis, text
//!   retrieval and deletion.
//!
//! ## Session guard
//!
//! Protected routes sit behind a request-scoped session guard. On every
//! guarded request the guard validates the token pair stored in http-only
//! cookies against the auth service, exchanges the refresh token for a fresh
//! access token, and rewrites the `access_token` cookie on the outgoing
//! response. Any unrecoverable auth failure clears both cookies and the
//! inner handler never runs.
//!
//! Tokens are opaque to this crate: no local decoding or signature checks,
//! validity is whatever the auth service says it is.

pub mod cli;
pub mod docsgate;
