// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
pub mod builtin;
pub mod registry;
pub mod rootcheck;
pub mod tool;

pub use registry::{ToolRegistry, ToolSchema};
pub use rootcheck::resolve_within_root;
pub use tool::{Tool, ToolCall, ToolContext, ToolResult};

pub use builtin::{BashTool, EditTool, FindTool, GrepTool, LsTool, ReadTool, WriteTool};
