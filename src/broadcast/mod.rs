//! WebSocket broadcast server (spec §6 wire format), grounded on the
//! teacher's `audio::recorder` background-writer-thread pattern and on
//! `tungstenite`'s synchronous server API (matching this crate's
//! thread-based, not async, concurrency model).

use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::{unbounded, Sender};
use log::{info, warn};
use serde::Serialize;
use tungstenite::{Message, WebSocket};

#[derive(Debug, Clone, Serialize)]
pub struct DetectionMsg {
    pub doppler: f64,
    pub range: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackMsg {
    pub id: u64,
    pub range: f64,
    pub doppler: f64,
    pub vr: f64,
    pub vd: f64,
}

/// Exact wire shape of spec §6.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastMessage {
    pub timestamp: f64,
    pub detections: Vec<DetectionMsg>,
    pub tracks: Vec<TrackMsg>,
}

struct ClientHandle {
    sender: Sender<Arc<str>>,
}

/// Accepts WebSocket connections and fans every `broadcast()` call out
/// to all currently-connected clients. A client whose write fails is
/// dropped from the list; broadcasting to the rest continues (spec §7
/// "downstream error: that client is removed, broadcast continues").
pub struct BroadcastServer {
    clients: Arc<Mutex<Vec<ClientHandle>>>,
}

impl BroadcastServer {
    pub fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("broadcast server listening on {addr}");
        let clients: Arc<Mutex<Vec<ClientHandle>>> = Arc::new(Mutex::new(Vec::new()));
        let clients_for_accept = Arc::clone(&clients);

        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => accept_client(stream, Arc::clone(&clients_for_accept)),
                    Err(e) => warn!("broadcast accept error: {e}"),
                }
            }
        });

        Ok(Self { clients })
    }

    /// Serializes `message` once and sends it to every connected client.
    pub fn broadcast(&self, message: &BroadcastMessage) {
        let text: Arc<str> = match serde_json::to_string(message) {
            Ok(s) => Arc::from(s.as_str()),
            Err(e) => {
                warn!("failed to serialize broadcast message: {e}");
                return;
            }
        };
        let mut clients = self.clients.lock().unwrap();
        clients.retain(|c| c.sender.send(Arc::clone(&text)).is_ok());
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }
}

fn accept_client(stream: TcpStream, clients: Arc<Mutex<Vec<ClientHandle>>>) {
    let peer = stream.peer_addr().ok();
    let ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake failed: {e}");
            return;
        }
    };
    let (tx, rx) = unbounded::<Arc<str>>();
    clients.lock().unwrap().push(ClientHandle { sender: tx });

    thread::spawn(move || {
        let mut ws: WebSocket<TcpStream> = ws;
        for text in rx.iter() {
            if ws.send(Message::Text(text.to_string())).is_err() {
                info!("broadcast client {peer:?} disconnected");
                break;
            }
        }
    });
}
