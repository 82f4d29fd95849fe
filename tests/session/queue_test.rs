//! Tests for the response queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uci_bridge::session::ResponseQueue;

#[tokio::test]
async fn wait_drain_times_out_empty() {
    let queue = ResponseQueue::new();

    let start = Instant::now();
    let lines = queue
        .wait_drain(Duration::from_millis(150), Duration::from_millis(20))
        .await;

    assert!(lines.is_empty());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(130), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
}

#[tokio::test]
async fn wait_drain_returns_three_lines_in_order() {
    let queue = Arc::new(ResponseQueue::new());

    let producer = Arc::clone(&queue);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        producer.push("id name Fake");
        producer.push("id author Tester");
        producer.push("uciok");
    });
    handle.await.unwrap();

    let lines = queue
        .wait_drain(Duration::from_millis(500), Duration::from_millis(10))
        .await;
    assert_eq!(lines, vec!["id name Fake", "id author Tester", "uciok"]);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn wait_drain_wakes_on_push() {
    let queue = Arc::new(ResponseQueue::new());

    let producer = Arc::clone(&queue);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        producer.push("readyok");
    });

    let start = Instant::now();
    let lines = queue
        .wait_drain(Duration::from_secs(5), Duration::from_millis(10))
        .await;
    assert_eq!(lines, vec!["readyok"]);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn requeue_front_preserves_order() {
    let queue = ResponseQueue::new();
    queue.push("c");
    queue.requeue_front(vec!["a".to_string(), "b".to_string()]);

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.drain(), vec!["a", "b", "c"]);
}
