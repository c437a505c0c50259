//! Tool registration
//!
//! ```text
//! register("getWeather", ..)  register("search", ..)
//!            │                          │
//!            ▼                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ ToolRegistry                                         │
//! │   [getWeather, search, ..., conversationalResponse]  │
//! │                              └─ always last          │
//! └──────────────────────────────────────────────────────┘
//!            │ snapshot()                │ lookup(name)
//!            ▼                           ▼
//!      prompt::render              chain dispatch
//! ```

mod handler;
mod registry;

pub use handler::{FallbackHandler, HandlerError, ToolHandler};
pub use registry::{
    ToolBinding, ToolDescriptor, ToolRegistry, FALLBACK_RESPONSE_FIELD, FALLBACK_TOOL_NAME,
};
