//! The dashboard event stream.
//!
//! Admin dashboards hold a long-lived SSE connection to `/api/events` and receive every order and stats
//! event published after they connect. The stream is read-only and carries no history: it is a live window
//! onto the broadcaster, nothing more.

use actix_web::{get, web, HttpResponse, Responder};
use bytes::Bytes;
use futures::stream;
use log::*;
use storefront_engine::events::{DashboardEvent, EventBroadcaster};
use tokio::sync::broadcast::error::RecvError;

/// Formats one SSE frame: the topic as the `event:` field, the JSON payload as `data:`.
fn sse_frame(event: &DashboardEvent) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Bytes::from(format!("event: {}\ndata: {json}\n\n", event.topic()))),
        Err(e) => {
            error!("📡️ Could not serialize {} event: {e}", event.topic());
            None
        },
    }
}

#[get("/events")]
pub async fn event_stream(broadcaster: web::Data<EventBroadcaster>) -> impl Responder {
    debug!("📡️ Dashboard client connected to the event stream");
    let rx = broadcaster.subscribe();
    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match sse_frame(&event) {
                    Some(frame) => return Some((Ok::<_, actix_web::Error>(frame), rx)),
                    None => continue,
                },
                Err(RecvError::Lagged(missed)) => {
                    // The subscriber fell behind the buffer; skip ahead rather than disconnect
                    warn!("📡️ Slow event stream subscriber missed {missed} event(s)");
                    continue;
                },
                Err(RecvError::Closed) => return None,
            }
        }
    });
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

#[cfg(test)]
mod test {
    use storefront_common::Cents;
    use storefront_engine::stats::{DashboardStats, OrderTotals};

    use super::*;

    #[test]
    fn frames_carry_topic_and_json_payload() {
        let stats = DashboardStats::assemble(OrderTotals { total_revenue: Cents::from(500), pending_count: 2 }, 3, vec![]);
        let frame = sse_frame(&DashboardEvent::StatsUpdate(stats)).expect("frame should serialize");
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.starts_with("event: stats_update\ndata: "));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains(r#""totalRevenue":500"#));
        assert!(text.contains(r#""newOrdersCount":2"#));
    }
}
