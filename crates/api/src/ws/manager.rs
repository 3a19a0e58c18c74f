use std::collections::{BTreeMap, HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use nuhire_core::realtime::{PresenceEntry, RealtimeMessage, Room};
use nuhire_core::roles::ROLE_ADMIN;
use nuhire_core::types::{DbId, Timestamp};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Who a connection belongs to, captured at upgrade time.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub user_id: DbId,
    pub role: String,
    pub class_id: Option<DbId>,
    pub group_id: Option<DbId>,
    /// Classes an admin connection receives `Room::Class` messages for.
    pub watched_classes: HashSet<DbId>,
}

impl ConnectionInfo {
    fn in_room(&self, room: Room) -> bool {
        match room {
            Room::Group(id) => self.group_id == Some(id),
            Room::Class(id) => self.role == ROLE_ADMIN && self.watched_classes.contains(&id),
            Room::ClassStudents(id) => self.role != ROLE_ADMIN && self.class_id == Some(id),
            Room::User(id) => self.user_id == id,
        }
    }
}

pub struct WsConnection {
    pub info: ConnectionInfo,
    /// Page last reported with `presence.join`; `None` after `presence.leave`.
    pub page: Option<String>,
    pub page_updated_at: Timestamp,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Presence of one group's connected members, for admin dashboards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupPresence {
    pub group_id: DbId,
    pub members: Vec<PresenceEntry>,
}

/// Registry of live WebSocket connections.
///
/// Shared as `Arc<WsManager>`; all state sits behind one `RwLock`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection. The returned receiver feeds the socket sink.
    pub async fn add(
        &self,
        conn_id: String,
        info: ConnectionInfo,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let now = chrono::Utc::now();
        let conn = WsConnection {
            info,
            page: None,
            page_updated_at: now,
            sender: tx,
            connected_at: now,
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection, returning who it belonged to.
    pub async fn remove(&self, conn_id: &str) -> Option<ConnectionInfo> {
        self.connections
            .write()
            .await
            .remove(conn_id)
            .map(|conn| conn.info)
    }

    /// Record the page a connection is on.
    pub async fn set_page(&self, conn_id: &str, page: Option<String>) -> Option<ConnectionInfo> {
        let mut conns = self.connections.write().await;
        let conn = conns.get_mut(conn_id)?;
        conn.page = page;
        conn.page_updated_at = chrono::Utc::now();
        Some(conn.info.clone())
    }

    /// Add a class to every connection of an admin, e.g. after they create it.
    pub async fn watch_class(&self, admin_id: DbId, class_id: DbId) {
        let mut conns = self.connections.write().await;
        for conn in conns.values_mut() {
            if conn.info.user_id == admin_id && conn.info.role == ROLE_ADMIN {
                conn.info.watched_classes.insert(class_id);
            }
        }
    }

    /// Move every connection of a student to a new class and group.
    pub async fn reassign(&self, user_id: DbId, class_id: DbId, group_id: Option<DbId>) -> usize {
        let mut conns = self.connections.write().await;
        let mut moved = 0;
        for conn in conns.values_mut().filter(|c| c.info.user_id == user_id) {
            conn.info.class_id = Some(class_id);
            conn.info.group_id = group_id;
            moved += 1;
        }
        moved
    }

    /// Send to one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: &RealtimeMessage) -> bool {
        match self.connections.read().await.get(conn_id) {
            Some(conn) => conn.sender.send(to_frame(message)).is_ok(),
            None => false,
        }
    }

    /// Send to every connection in a room. Returns how many were reached.
    pub async fn send_to_room(&self, room: Room, message: &RealtimeMessage) -> usize {
        self.send_to_rooms(&[room], message).await
    }

    /// Send to every connection in any of `rooms`, at most once each.
    pub async fn send_to_rooms(&self, rooms: &[Room], message: &RealtimeMessage) -> usize {
        let frame = to_frame(message);
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if rooms.iter().any(|room| conn.info.in_room(*room))
                && conn.sender.send(frame.clone()).is_ok()
            {
                count += 1;
            }
        }
        count
    }

    /// Send to every connection. Closed channels are skipped.
    pub async fn broadcast(&self, message: &RealtimeMessage) {
        let frame = to_frame(message);
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(frame.clone());
        }
    }

    /// Connected members of a group and the page each is on.
    ///
    /// A member with several tabs is listed once, with the most recently
    /// reported page.
    pub async fn presence_for_group(&self, group_id: DbId) -> Vec<PresenceEntry> {
        let conns = self.connections.read().await;
        collect_presence(conns.values().filter(|c| c.info.group_id == Some(group_id)))
    }

    /// Presence for every group of a class that has someone connected.
    pub async fn presence_for_class(&self, class_id: DbId) -> Vec<GroupPresence> {
        let conns = self.connections.read().await;
        let mut by_group: BTreeMap<DbId, Vec<&WsConnection>> = BTreeMap::new();
        for conn in conns.values() {
            if conn.info.class_id != Some(class_id) {
                continue;
            }
            if let Some(group_id) = conn.info.group_id {
                by_group.entry(group_id).or_default().push(conn);
            }
        }
        by_group
            .into_iter()
            .map(|(group_id, members)| GroupPresence {
                group_id,
                members: collect_presence(members.into_iter()),
            })
            .collect()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connection.
    pub async fn ping_all(&self) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

fn to_frame(message: &RealtimeMessage) -> Message {
    Message::Text(message.to_json().into())
}

fn collect_presence<'a>(conns: impl Iterator<Item = &'a WsConnection>) -> Vec<PresenceEntry> {
    let mut latest: BTreeMap<DbId, &WsConnection> = BTreeMap::new();
    for conn in conns {
        latest
            .entry(conn.info.user_id)
            .and_modify(|best| {
                if conn.page_updated_at > best.page_updated_at {
                    *best = conn;
                }
            })
            .or_insert(conn);
    }
    latest
        .into_iter()
        .map(|(user_id, conn)| PresenceEntry {
            user_id,
            page: conn.page.clone(),
        })
        .collect()
}
