//! The reconnecting client against a live server, with a cuttable TCP
//! relay in between to simulate network drops while the server stays up.

mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use common::TestApp;
use comanda::client::{
    ClientConfig, ConnectionStatus, RealtimeClient, ReceivedNotification, ReconnectPolicy,
};
use comanda::domain::foundation::{Role, TableId};
use comanda::domain::realtime::{NotificationCategory, NotificationType, Room};

const WAIT: Duration = Duration::from_secs(5);

async fn serve(t: &TestApp) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = t.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Forwards TCP connections to `upstream` until `cut` is called.
struct Relay {
    addr: SocketAddr,
    links: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Relay {
    async fn start(upstream: SocketAddr) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let links: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::default();
        let accepted = links.clone();
        tokio::spawn(async move {
            while let Ok((mut inbound, _)) = listener.accept().await {
                let link = tokio::spawn(async move {
                    if let Ok(mut outbound) = TcpStream::connect(upstream).await {
                        let _ = tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await;
                    }
                });
                accepted.lock().unwrap().push(link);
            }
        });
        Self { addr, links }
    }

    fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Drops every open link; new connections are still accepted.
    fn cut(&self) {
        for link in self.links.lock().unwrap().drain(..) {
            link.abort();
        }
    }
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        initial_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(400),
        multiplier: 2.0,
        max_attempts: 5,
    }
}

async fn wait_for(
    status: &mut watch::Receiver<ConnectionStatus>,
    done: impl Fn(&ConnectionStatus) -> bool,
) -> ConnectionStatus {
    tokio::time::timeout(WAIT, async {
        loop {
            let current = status.borrow_and_update().clone();
            if done(&current) {
                return current;
            }
            status.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

async fn next_event(
    notifications: &mut broadcast::Receiver<ReceivedNotification>,
    kind: NotificationType,
) -> ReceivedNotification {
    tokio::time::timeout(WAIT, async {
        loop {
            let received = notifications.recv().await.unwrap();
            if received.notification.kind == kind {
                return received;
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn client_receives_room_notifications_over_a_real_socket() {
    let t = TestApp::new();
    let addr = serve(&t).await;
    let table = t.create_table(3).await;
    let soup = t.create_product("Soup", "5").await;

    let client = RealtimeClient::start(ClientConfig::new(
        format!("ws://{}", addr),
        Some(t.token(Role::Kitchen)),
    ));
    let mut status = client.status();
    let mut notifications = client.subscribe();
    let connected = wait_for(&mut status, ConnectionStatus::is_connected).await;
    match connected {
        ConnectionStatus::Connected { rooms, .. } => {
            assert!(rooms.contains(&Room::Kitchen));
            assert!(!rooms.contains(&Room::Waiters));
        }
        other => panic!("unexpected status {:?}", other),
    }

    t.place_order(&table, &[(&soup, 2)]).await;

    let received = next_event(&mut notifications, NotificationType::NewOrder).await;
    assert_eq!(received.event, "new-order");
    assert_eq!(received.room, Room::Kitchen);
    assert_eq!(received.notification.data["tableNumber"], 3);
    assert_eq!(client.buffers().orders().len(), 1);
    assert!(client.buffers().system().is_empty());
    assert_eq!(received.category(), NotificationCategory::Orders);

    client.disconnect().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(t.app.rooms.connection_count().await, 0);
}

#[tokio::test]
async fn guest_can_follow_a_table_room() {
    let t = TestApp::new();
    let addr = serve(&t).await;
    let table = t.create_table(7).await;
    let table_id: TableId = table["id"].as_str().unwrap().parse().unwrap();

    let client = RealtimeClient::start(ClientConfig::new(format!("ws://{}", addr), None));
    let mut status = client.status();
    wait_for(&mut status, ConnectionStatus::is_connected).await;
    assert!(client.join_table(table_id).is_ok());
    wait_for(&mut status, |s| {
        matches!(
            s,
            ConnectionStatus::Connected { rooms, .. } if rooms.contains(&Room::Table(table_id))
        )
    })
    .await;

    let mut notifications = client.subscribe();
    t.post(
        &format!("/api/socket/tables/{}/message", table_id),
        Role::Waiter,
        serde_json::json!({ "message": "Dessert menu?" }),
    )
    .await;

    let received = next_event(&mut notifications, NotificationType::TableMessage).await;
    assert_eq!(received.room, Room::Table(table_id));
    assert_eq!(client.buffers().tables().len(), 1);
    client.disconnect().await;
}

#[tokio::test]
async fn reconnect_restores_role_rooms_but_not_missed_notifications() {
    let t = TestApp::new();
    let addr = serve(&t).await;
    let relay = Relay::start(addr).await;
    let table = t.create_table(3).await;
    let table_id: TableId = table["id"].as_str().unwrap().parse().unwrap();
    let soup = t.create_product("Soup", "5").await;

    let mut config = ClientConfig::new(relay.url(), Some(t.token(Role::Manager)));
    config.policy = ReconnectPolicy {
        initial_delay: Duration::from_millis(300),
        ..fast_policy()
    };
    let client = RealtimeClient::start(config);
    let mut status = client.status();
    let first = wait_for(&mut status, ConnectionStatus::is_connected).await;
    client.join_table(table_id).unwrap();
    wait_for(&mut status, |s| {
        matches!(
            s,
            ConnectionStatus::Connected { rooms, .. } if rooms.contains(&Room::Table(table_id))
        )
    })
    .await;

    relay.cut();
    wait_for(&mut status, |s| matches!(s, ConnectionStatus::Reconnecting { .. })).await;
    assert!(client.ping().is_err());
    // Fired while the client is away.
    let (_, missed) = t.place_order(&table, &[(&soup, 1)]).await;

    let second = wait_for(&mut status, ConnectionStatus::is_connected).await;
    let ConnectionStatus::Connected {
        connection_id: old, ..
    } = first
    else {
        panic!("expected a connected state, got {:?}", first);
    };
    let ConnectionStatus::Connected {
        connection_id: new,
        rooms,
    } = second
    else {
        panic!("expected a connected state, got {:?}", second);
    };
    assert_ne!(old, new);
    assert!(rooms.contains(&Room::Management));
    assert!(!rooms.contains(&Room::Table(table_id)));

    let mut notifications = client.subscribe();
    let (_, fresh) = t.place_order(&table, &[(&soup, 2)]).await;
    let received = next_event(&mut notifications, NotificationType::NewOrder).await;
    assert_eq!(received.notification.data["orderId"], fresh["data"]["id"]);

    let buffered: Vec<_> = client
        .buffers()
        .orders()
        .into_iter()
        .filter(|r| r.notification.kind == NotificationType::NewOrder)
        .map(|r| r.notification.data["orderId"].clone())
        .collect();
    assert!(!buffered.contains(&missed["data"]["id"]));
    client.disconnect().await;
}

#[tokio::test]
async fn explicit_disconnect_never_reconnects() {
    let t = TestApp::new();
    let addr = serve(&t).await;

    let client = RealtimeClient::start(ClientConfig::new(
        format!("ws://{}", addr),
        Some(t.token(Role::Waiter)),
    ));
    let mut status = client.status();
    wait_for(&mut status, ConnectionStatus::is_connected).await;

    client.disconnect().await;

    assert_eq!(*status.borrow(), ConnectionStatus::Disconnected);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(t.app.rooms.connection_count().await, 0);
}

#[tokio::test]
async fn bad_token_is_refused_and_client_gives_up() {
    let t = TestApp::new();
    let addr = serve(&t).await;

    let mut config = ClientConfig::new(format!("ws://{}", addr), Some("forged".to_string()));
    config.policy = ReconnectPolicy {
        max_attempts: 2,
        ..fast_policy()
    };
    let client = RealtimeClient::start(config);
    let mut status = client.status();

    wait_for(&mut status, |s| *s == ConnectionStatus::Disconnected).await;
    assert_eq!(t.app.rooms.connection_count().await, 0);
}

/// Accepts TCP connections and never answers the upgrade.
async fn silent_server() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (addr, holder)
}

#[tokio::test]
async fn stalled_handshake_counts_as_a_failed_attempt() {
    let (addr, _holder) = silent_server().await;
    let mut config = ClientConfig::new(format!("ws://{}", addr), None);
    config.connect_timeout = Duration::from_millis(200);
    config.policy = ReconnectPolicy {
        max_attempts: 2,
        ..fast_policy()
    };
    let client = RealtimeClient::start(config);
    let mut status = client.status();

    wait_for(&mut status, |s| matches!(s, ConnectionStatus::Reconnecting { .. })).await;
    wait_for(&mut status, |s| *s == ConnectionStatus::Disconnected).await;
}

#[tokio::test]
async fn disconnect_interrupts_a_stalled_handshake() {
    let (addr, _holder) = silent_server().await;
    let mut config = ClientConfig::new(format!("ws://{}", addr), Some("any-token".to_string()));
    config.connect_timeout = Duration::from_secs(60);
    let client = RealtimeClient::start(config);
    let status = client.status();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*status.borrow(), ConnectionStatus::Connecting);

    tokio::time::timeout(WAIT, client.disconnect()).await.unwrap();
    assert_eq!(*status.borrow(), ConnectionStatus::Disconnected);
}
