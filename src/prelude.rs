// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for convenient use.
//! Users of the library can import everything they need with:
//!
//! ```rust
//! use routeros_client::prelude::*;
//! ```

// Core types
pub use crate::config::{ClientOptions, Credentials};
pub use crate::error::{ApiError, Result};

// Client surface
pub use crate::client::{CommandReply, RouterOsClient};
pub use crate::create_client;

// Events
pub use crate::emitter::{Emitter, Event, Listener};

// Protocol types
pub use crate::protocol::{Record, Sentence, SentenceParser};
