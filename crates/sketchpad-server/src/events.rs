//! Per-report change notifications.
//!
//! Every report with at least one listener has its own broadcast channel.
//! Mutations through the HTTP API publish a [`SketchEvent`] to the owning
//! report; WebSocket subscribers forward them as JSON text frames.

use axum::extract::ws::{Message, WebSocket};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use sketchpad_core::{ReportId, Sketch, SketchId};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 256;

/// A change to one of a report's sketches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SketchEvent {
    Created { sketch: Sketch },
    Updated { sketch: Sketch },
    Deleted { id: SketchId, report_id: ReportId },
}

/// Broadcast channels keyed by report id.
#[derive(Default)]
pub struct EventHub {
    reports: DashMap<ReportId, broadcast::Sender<SketchEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for events on a report, creating its channel if needed.
    pub fn subscribe(&self, report_id: &str) -> broadcast::Receiver<SketchEvent> {
        self.reports
            .entry(report_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send an event to a report's listeners. Returns how many received it.
    pub fn publish(&self, report_id: &str, event: SketchEvent) -> usize {
        match self.reports.get(report_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop a report's channel once nobody listens to it.
    pub fn release(&self, report_id: &str) {
        if self
            .reports
            .remove_if(report_id, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            debug!("Closed event channel for report {}", report_id);
        }
    }

    /// Number of reports with an open channel.
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }
}

/// Forward a report's events to one WebSocket client until it disconnects.
pub async fn handle_socket(socket: WebSocket, hub: Arc<EventHub>, report_id: ReportId) {
    let mut rx = hub.subscribe(&report_id);
    let (mut sender, mut receiver) = socket.split();
    info!("Subscriber joined report {}", report_id);

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Clients only listen
                    Some(Err(e)) => {
                        warn!("WebSocket error on report {}: {}", report_id, e);
                        break;
                    }
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("Failed to encode event: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Subscriber on report {} lagged, skipped {} events", report_id, n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    drop(rx);
    hub.release(&report_id);
    info!("Subscriber left report {}", report_id);
}
