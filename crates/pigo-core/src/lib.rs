// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
mod emitter;
mod events;
mod history;
mod interrupt;
mod prompts;
mod session;
mod session_store;
mod turn;

pub use emitter::{Emitter, Subscriber, SubscriptionId};
pub use events::{AgentEvent, StopReason};
pub use history::{compact, CompactionResult};
pub use interrupt::{spawn_listener, InterruptController, InterruptState};
pub use prompts::system_prompt;
pub use session::Session;
pub use session_store::{list_sessions, load_messages, sessions_root, SessionRecord, SessionStore};
pub use turn::TurnLoop;
