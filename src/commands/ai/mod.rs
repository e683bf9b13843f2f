//! This module contains the commands that hand a prompt to a locally hosted model and relay
//! the result back into Discord.

/// Submodule defining the `/chat` command.
pub mod chat;
/// Submodule defining the `/image` command (requires the `image` feature).
#[cfg(feature = "image")]
pub mod image;

use crate::CommandResult;
use crate::Context;
