//! End-to-end socket tests against a served router.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::{app_for, build_test_state, put_json_auth, seed_class, start_at};
use futures::{SinkExt, StreamExt};
use nuhire_api::realtime::RealtimeRouter;
use nuhire_api::state::AppState;
use nuhire_core::progress::ProgressStep;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app on an ephemeral port with the realtime fan-out running.
async fn serve(state: &AppState) -> SocketAddr {
    tokio::spawn(RealtimeRouter::new(state.ws_manager.clone()).run(state.event_bus.subscribe()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_for(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(state: &AppState, addr: SocketAddr, token: &str) -> Client {
    let before = state.ws_manager.connection_count().await;
    let (client, _) = connect_async(format!("ws://{addr}/api/v1/ws?token={token}"))
        .await
        .unwrap();

    // Registration happens after the upgrade completes.
    for _ in 0..100 {
        if state.ws_manager.connection_count().await > before {
            return client;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection was never registered");
}

/// Next JSON text frame, skipping control frames.
async fn next_json(client: &mut Client) -> Value {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json(client: &mut Client, value: Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// A teammate's vote reaches the other member's socket.
#[sqlx::test(migrations = "../../db/migrations")]
async fn vote_is_pushed_to_group(pool: PgPool) {
    let fx = seed_class(&pool, "ws-vote", 2, 1).await;
    start_at(&pool, &fx, ProgressStep::Res1).await;
    let state = build_test_state(pool);
    let addr = serve(&state).await;
    let mut listener = connect(&state, addr, &fx.student_tokens[0]).await;

    put_json_auth(
        app_for(&state),
        &fx.group_uri(&format!("/votes/{}", fx.candidates[0].id)),
        &fx.student_tokens[1],
        json!({ "vote": "yes" }),
    )
    .await;

    let msg = next_json(&mut listener).await;
    assert_eq!(msg["type"], "votes.updated");
    assert_eq!(msg["group_id"], fx.group.id);
    assert_eq!(msg["candidate_id"], fx.candidates[0].id);
    assert_eq!(msg["tally"]["yes"], 1);
}

/// Joining a page broadcasts the group's presence, including to admins.
#[sqlx::test(migrations = "../../db/migrations")]
async fn presence_join_is_broadcast(pool: PgPool) {
    let fx = seed_class(&pool, "ws-presence", 2, 0).await;
    let state = build_test_state(pool);
    let addr = serve(&state).await;
    let mut admin = connect(&state, addr, &fx.admin_token).await;
    let mut mover = connect(&state, addr, &fx.student_tokens[0]).await;

    send_json(&mut mover, json!({ "type": "presence.join", "page": "/res-review" })).await;

    for client in [&mut mover, &mut admin] {
        let msg = next_json(client).await;
        assert_eq!(msg["type"], "presence.update");
        assert_eq!(msg["group_id"], fx.group.id);
        assert_eq!(msg["members"][0]["user_id"], fx.students[0].id);
        assert_eq!(msg["members"][0]["page"], "/res-review");
    }
}

/// Unknown pages and server-only messages get an error reply.
#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_client_frames_get_error(pool: PgPool) {
    let fx = seed_class(&pool, "ws-error", 1, 0).await;
    let state = build_test_state(pool);
    let addr = serve(&state).await;
    let mut client = connect(&state, addr, &fx.student_tokens[0]).await;

    send_json(&mut client, json!({ "type": "presence.join", "page": "/secret" })).await;
    assert_eq!(next_json(&mut client).await["type"], "error");

    send_json(&mut client, json!({ "type": "group.started", "group_id": 1 })).await;
    assert_eq!(next_json(&mut client).await["type"], "error");

    client.send(Message::Text("not json".into())).await.unwrap();
    assert_eq!(next_json(&mut client).await["type"], "error");
}

/// The upgrade is refused without a valid token.
#[sqlx::test(migrations = "../../db/migrations")]
async fn upgrade_requires_token(pool: PgPool) {
    let state = build_test_state(pool);
    let addr = serve(&state).await;

    assert!(connect_async(format!("ws://{addr}/api/v1/ws")).await.is_err());
    assert!(connect_async(format!("ws://{addr}/api/v1/ws?token=garbage"))
        .await
        .is_err());
    assert_eq!(state.ws_manager.connection_count().await, 0);
}

/// Closing the socket unregisters the connection.
#[sqlx::test(migrations = "../../db/migrations")]
async fn close_unregisters_connection(pool: PgPool) {
    let fx = seed_class(&pool, "ws-close", 1, 0).await;
    let state = build_test_state(pool);
    let addr = serve(&state).await;
    let mut client = connect(&state, addr, &fx.student_tokens[0]).await;

    client.close(None).await.unwrap();

    for _ in 0..100 {
        if state.ws_manager.connection_count().await == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection was not removed after close");
}
