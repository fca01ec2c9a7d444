//! JSON-RPC 2.0 communication layer for the host web frontend.
//!
//! Implements bidirectional messaging between the engine and the host UI via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Engine (iframe)
//!        │                                        │
//!        ├─ set_nodes / start_formation ────────> │
//!        │                                        ├─ Applied before the frame advances
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <── node_select / formation_formed ────┤
//! ```
//!
//! Requests are handled before `FrameSet::Advance`, so node and formation
//! changes show up in the same frame. Engine events are forwarded in
//! `FrameSet::Bridge` and everything queued is flushed in `Last`.
//!
//! ## Adding New RPC Methods
//!
//! Add a match arm in `handle_rpc_request()` that calls a handler taking the
//! raw params and the pieces of [`web_rpc::RpcContext`] it needs, returning
//! `Result<Value, RpcError>`:
//!
//! ```rust,ignore
//! "remove_node" => handle_remove_node(&request.params, context.store),
//! ```
//!
//! Calls from the host page:
//!
//! ```typescript
//! frame.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "start_formation",
//!   params: { formingSeconds: 4 },
//!   id: 7
//! }), "*");
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Node Data
//! - `set_nodes`: Replace the node set; malformed entries are skipped and counted
//! - `upsert_node`: Insert or update one node (`{ "node": {...} }`)
//! - `remove_node`: Remove a node by `id`
//!
//! ### Formation
//! - `start_formation`: Arm the ceremony (`formingSeconds`, default 3)
//! - `lock_formation`: Force the Locked phase
//! - `reset_formation`: Return to a fresh Scattered state
//!
//! ### Camera
//! - `set_auto_orbit`: Enable or disable the idle orbit
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! `node_select`, `node_hover`, `node_completed`, `formation_forming_start`,
//! `formation_formed`, `formation_locked`, `fps_update`.

/// JSON-RPC 2.0 bidirectional communication with the host page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
