use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::engine::camera::CameraRig;
use crate::engine::core::engine::DreamEngine;
use crate::engine::formation::FormationPhaseEvent;
use crate::engine::nodes::store::Upsert;
use crate::engine::nodes::{NodeCompleted, NodeHoverEvent, NodeSelectEvent, NodeStore};
use crate::engine::systems::fps_tracking::smoothed_fps;
use crate::engine::systems::frame_driver::FrameSet;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// Forming duration used when `start_formation` omits it.
const DEFAULT_FORMING_SECONDS: f32 = 3.0;

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Outgoing message queues, flushed to the host page once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Notifications queued since the last flush.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage bridge for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(FrameSet::Advance),
            )
            .add_systems(Update, forward_engine_events.in_set(FrameSet::Bridge))
            .add_systems(Last, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw message received from the host page.
#[derive(Event)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Mutable engine state a request may touch. The engine and rig only exist
/// once loading has finished.
pub struct RpcContext<'a> {
    pub diagnostics: &'a DiagnosticsStore,
    pub store: &'a mut NodeStore,
    pub engine: Option<&'a mut DreamEngine>,
    pub rig: Option<&'a mut CameraRig>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut store: ResMut<NodeStore>,
    mut engine: Option<ResMut<DreamEngine>>,
    mut rig: Option<ResMut<CameraRig>>,
) {
    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Malformed RPC message dropped: {}", parse_error);
                continue;
            }
        };
        debug!("RPC {}", request.method);

        let mut context = RpcContext {
            diagnostics: &diagnostics,
            store: &mut store,
            engine: engine.as_deref_mut(),
            rig: rig.as_deref_mut(),
        };
        if let Some(response) = handle_rpc_request(&request, &mut context) {
            rpc_interface.queue_response(response);
        }
    }
}

/// Execute one request. Requests without an id are notifications: they run
/// but produce no response.
pub fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_nodes" => handle_set_nodes(&request.params, context.store),
        "upsert_node" => handle_upsert_node(&request.params, context.store),
        "remove_node" => handle_remove_node(&request.params, context.store),
        "start_formation" => handle_start_formation(&request.params, context.engine.as_deref_mut()),
        "lock_formation" => engine_call(context.engine.as_deref_mut(), |engine| {
            let locked = engine.lock_formation()?;
            Ok(json!({ "success": true, "changed": locked }))
        }),
        "reset_formation" => engine_call(context.engine.as_deref_mut(), |engine| {
            engine.reset_formation()?;
            Ok(json!({ "success": true }))
        }),
        "set_auto_orbit" => handle_set_auto_orbit(&request.params, context.rig.as_deref_mut()),
        "get_fps" => Ok(json!({ "fps": smoothed_fps(context.diagnostics) })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(json!({ "method": request.method })),
            })
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

/// Replace the whole node set. Malformed entries are skipped and counted.
fn handle_set_nodes(params: &Value, store: &mut NodeStore) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct SetNodesParams {
        nodes: Vec<Value>,
    }

    let parsed = serde_json::from_value::<SetNodesParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'nodes' array"))?;
    let total = parsed.nodes.len();
    let accepted = store.replace_all(parsed.nodes);

    Ok(json!({
        "success": true,
        "accepted": accepted,
        "skipped": total - accepted
    }))
}

fn handle_upsert_node(params: &Value, store: &mut NodeStore) -> Result<Value, RpcError> {
    let node = params.get("node").cloned().unwrap_or_else(|| params.clone());
    let outcome = match store.upsert_json(node) {
        Upsert::Inserted => "inserted",
        Upsert::Updated => "updated",
        Upsert::Unchanged => "unchanged",
        Upsert::Rejected => return Err(RpcError::invalid_params("Malformed node")),
    };
    Ok(json!({ "success": true, "outcome": outcome }))
}

fn handle_remove_node(params: &Value, store: &mut NodeStore) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct RemoveNodeParams {
        id: String,
    }

    let parsed = serde_json::from_value::<RemoveNodeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;
    Ok(json!({ "success": true, "removed": store.remove(&parsed.id) }))
}

fn handle_start_formation(params: &Value, engine: Option<&mut DreamEngine>) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct StartFormationParams {
        forming_seconds: Option<f32>,
    }

    let parsed = serde_json::from_value::<StartFormationParams>(params.clone())
        .unwrap_or(StartFormationParams {
            forming_seconds: None,
        });
    let seconds = parsed
        .forming_seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(DEFAULT_FORMING_SECONDS);

    engine_call(engine, |engine| {
        let armed = engine.start_formation(seconds)?;
        Ok(json!({ "success": true, "armed": armed, "formingSeconds": seconds }))
    })
}

fn handle_set_auto_orbit(params: &Value, rig: Option<&mut CameraRig>) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct AutoOrbitParams {
        enabled: bool,
    }

    let parsed = serde_json::from_value::<AutoOrbitParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'enabled' parameter"))?;
    let rig = rig.ok_or_else(|| RpcError::internal_error("Camera rig not ready"))?;
    rig.set_orbit_enabled(parsed.enabled);
    Ok(json!({ "success": true, "enabled": parsed.enabled }))
}

fn engine_call(
    engine: Option<&mut DreamEngine>,
    call: impl FnOnce(&mut DreamEngine) -> Result<Value, crate::engine::core::error::EngineError>,
) -> Result<Value, RpcError> {
    let engine = engine.ok_or_else(|| RpcError::internal_error("Engine not loaded"))?;
    call(engine).map_err(|error| RpcError::internal_error(&error.to_string()))
}

/// Mirror engine events to the host page as notifications.
pub fn forward_engine_events(
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut select_events: EventReader<NodeSelectEvent>,
    mut hover_events: EventReader<NodeHoverEvent>,
    mut completed_events: EventReader<NodeCompleted>,
    mut phase_events: EventReader<FormationPhaseEvent>,
) {
    for NodeSelectEvent(id) in select_events.read() {
        rpc_interface.send_notification("node_select", json!({ "id": id }));
    }
    for NodeHoverEvent(id) in hover_events.read() {
        rpc_interface.send_notification("node_hover", json!({ "id": id }));
    }
    for NodeCompleted(id) in completed_events.read() {
        rpc_interface.send_notification("node_completed", json!({ "id": id }));
    }
    for FormationPhaseEvent(event) in phase_events.read() {
        rpc_interface.send_notification(
            &format!("formation_{}", event.label()),
            json!({ "phase": event.phase() }),
        );
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::config::EngineConfig;

    fn request(method: &str, params: Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(json!(1)),
        }
    }

    fn small_engine() -> DreamEngine {
        let mut config = EngineConfig::default();
        config.particles.count = 20;
        config.flow.curve_count = 2;
        config.flow.segments = 8;
        config.formation.count = 16;
        let mut engine = DreamEngine::new(config).unwrap();
        engine.start(Vec2::new(640.0, 480.0)).unwrap();
        engine
    }

    #[test]
    fn set_nodes_reports_skipped_entries() {
        let diagnostics = DiagnosticsStore::default();
        let mut store = NodeStore::default();
        let mut context = RpcContext {
            diagnostics: &diagnostics,
            store: &mut store,
            engine: None,
            rig: None,
        };
        let response = handle_rpc_request(
            &request(
                "set_nodes",
                json!({ "nodes": [
                    { "id": "a", "position": { "x": 0, "y": 0, "z": 0 } },
                    { "position": "bad" }
                ] }),
            ),
            &mut context,
        )
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["accepted"], 1);
        assert_eq!(result["skipped"], 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn formation_methods_drive_the_engine() {
        let diagnostics = DiagnosticsStore::default();
        let mut store = NodeStore::default();
        let mut engine = small_engine();
        let mut context = RpcContext {
            diagnostics: &diagnostics,
            store: &mut store,
            engine: Some(&mut engine),
            rig: None,
        };

        let started = handle_rpc_request(&request("start_formation", json!({})), &mut context)
            .unwrap()
            .result
            .unwrap();
        assert_eq!(started["armed"], true);

        let locked = handle_rpc_request(&request("lock_formation", Value::Null), &mut context)
            .unwrap()
            .result
            .unwrap();
        assert_eq!(locked["changed"], true);
    }

    #[test]
    fn unknown_method_and_missing_engine_are_errors() {
        let diagnostics = DiagnosticsStore::default();
        let mut store = NodeStore::default();
        let mut context = RpcContext {
            diagnostics: &diagnostics,
            store: &mut store,
            engine: None,
            rig: None,
        };

        let unknown = handle_rpc_request(&request("warp_drive", Value::Null), &mut context).unwrap();
        assert_eq!(unknown.error.unwrap().code, -32601);

        let not_loaded =
            handle_rpc_request(&request("lock_formation", Value::Null), &mut context).unwrap();
        assert_eq!(not_loaded.error.unwrap().code, -32603);

        let mut notification = request("remove_node", json!({ "id": "x" }));
        notification.id = None;
        assert!(handle_rpc_request(&notification, &mut context).is_none());
    }
}
