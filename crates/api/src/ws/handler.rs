use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use nuhire_core::error::CoreError;
use nuhire_core::realtime::{validate_page, RealtimeMessage, Room};
use nuhire_core::types::DbId;
use nuhire_db::repositories::{ClassRepo, UserRepo};
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::ConnectionInfo;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// `GET /api/v1/ws?token=<access token>`.
///
/// Browsers cannot set headers on an upgrade request, so the access token
/// travels in the query string. The token and the account are checked
/// before upgrading; a bad token is a plain 401.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let token = params.token.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token parameter".into()))
    })?;
    let claims = validate_token(&token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account is not active".into())))?;

    let watched_classes: HashSet<DbId> = if claims.role == nuhire_core::roles::ROLE_ADMIN {
        ClassRepo::list_by_admin(&state.pool, user.id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect()
    } else {
        HashSet::new()
    };

    let info = ConnectionInfo {
        user_id: user.id,
        role: claims.role,
        class_id: user.class_id,
        group_id: user.group_id,
        watched_classes,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, info)))
}

/// Drive one connection until either side closes it.
///
/// A spawned task forwards manager messages to the sink while this task
/// reads client frames.
async fn handle_socket(socket: WebSocket, state: AppState, info: ConnectionInfo) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let user_id = info.user_id;
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), info).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => handle_client_frame(&state, &conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    if let Some(info) = state.ws_manager.remove(&conn_id).await {
        publish_presence(&state, &info).await;
    }
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}

async fn handle_client_frame(state: &AppState, conn_id: &str, text: &str) {
    let msg = match serde_json::from_str::<RealtimeMessage>(text) {
        Ok(msg) if msg.is_client_message() => msg,
        Ok(_) => {
            reply_error(state, conn_id, "Clients may only send presence messages").await;
            return;
        }
        Err(e) => {
            reply_error(state, conn_id, &format!("Malformed message: {e}")).await;
            return;
        }
    };

    let page = match msg {
        RealtimeMessage::PresenceJoin { page } => {
            if let Err(message) = validate_page(&page) {
                reply_error(state, conn_id, &message).await;
                return;
            }
            Some(page)
        }
        _ => None,
    };

    tracing::debug!(conn_id = %conn_id, page = ?page, "Presence changed");
    if let Some(info) = state.ws_manager.set_page(conn_id, page).await {
        publish_presence(state, &info).await;
    }
}

async fn reply_error(state: &AppState, conn_id: &str, message: &str) {
    let reply = RealtimeMessage::Error {
        message: message.to_string(),
    };
    state.ws_manager.send_to(conn_id, &reply).await;
}

/// Push the group's current presence to its members and the class admins.
async fn publish_presence(state: &AppState, info: &ConnectionInfo) {
    let Some(group_id) = info.group_id else {
        return;
    };
    let update = RealtimeMessage::PresenceUpdate {
        group_id,
        members: state.ws_manager.presence_for_group(group_id).await,
    };
    let mut rooms = vec![Room::Group(group_id)];
    if let Some(class_id) = info.class_id {
        rooms.push(Room::Class(class_id));
    }
    state.ws_manager.send_to_rooms(&rooms, &update).await;
}
