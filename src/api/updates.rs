use rocket::{
    futures::StreamExt,
    response::stream::EventStream,
    tokio::select,
    Route, Shutdown, State,
};

use crate::{updates::Updates, Config};

pub fn routes() -> Vec<Route> {
    routes![candidate_updates]
}

/// Stream every admin write as a server-sent event, with a heartbeat while idle.
///
/// Runs until the client disconnects or the server shuts down.
#[get("/api/updates/candidates")]
fn candidate_updates(
    hub: &State<Updates>,
    config: &State<Config>,
    mut end: Shutdown,
) -> EventStream![] {
    // Subscribe before the first poll so nothing published after the request
    // is accepted can be missed.
    let mut updates = Box::pin(hub.stream(config.heartbeat_interval()));
    debug!("Update stream opened, {} now listening", hub.subscriber_count());
    EventStream! {
        loop {
            let update = select! {
                update = updates.next() => match update {
                    Some(update) => update,
                    None => break,
                },
                _ = &mut end => break,
            };
            yield update.into_event();
        }
    }
    .heartbeat(None)
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, serde_json, Value},
        tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    };

    use crate::updates::UpdateKind;

    use super::*;

    /// Read the next event block, returning its name and JSON data.
    async fn next_event<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> (String, Value) {
        let mut name = String::new();
        let mut data = String::new();
        loop {
            let line = lines
                .next_line()
                .await
                .unwrap()
                .expect("update stream ended early");
            if line.is_empty() {
                if data.is_empty() {
                    continue;
                }
                break;
            }
            if let Some(value) = line.strip_prefix("event:") {
                name = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("data:") {
                data.push_str(value.trim());
            }
        }
        (name, serde_json::from_str(&data).unwrap())
    }

    #[backend_test]
    async fn stream_carries_published_updates(client: Client) {
        let first = client.get(uri!(candidate_updates)).dispatch().await;
        assert_eq!(Status::Ok, first.status());
        assert_eq!(Some(ContentType::EventStream), first.content_type());
        let second = client.get(uri!(candidate_updates)).dispatch().await;

        let hub = client.rocket().state::<Updates>().unwrap();
        assert_eq!(2, hub.subscriber_count());
        hub.publish(UpdateKind::CandidateDeleted, &json!({ "id": 7 }));
        hub.publish(UpdateKind::ProfileDeleted, &json!({ "candidate_id": 7 }));

        // Both streams see both updates, in order.
        for response in [first, second] {
            let mut lines = BufReader::new(response).lines();
            let (name, data) = next_event(&mut lines).await;
            assert_eq!("candidate_deleted", name);
            assert_eq!(json!({ "id": 7 }), data);
            let (name, data) = next_event(&mut lines).await;
            assert_eq!("profile_deleted", name);
            assert_eq!(json!({ "candidate_id": 7 }), data);
        }
    }
}
