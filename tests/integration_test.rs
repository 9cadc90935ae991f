use chrono::Utc;
use repltrack::{
    create_replication_tracker, Checkpoint, ClusterTopology, InMemoryCheckpoint, LogPosition,
    ReplicaId, ReplicaWriteAck, ReplicationEvent, ReplicationEventStream, TrackerClient,
    TrackerConfig,
};
use slog::Drain;
use std::fs::OpenOptions;

#[tokio::test]
async fn three_node_cluster_commits_after_quorum() {
    let (client, mut events, checkpoint) = tracker("leader-1", 3);
    client.become_leader().await;

    client.local_write_advanced(LogPosition::new(2000)).await;
    assert!(!client.is_current().await);
    assert_eq!(client.committed_position().await, LogPosition::zero());

    client.replica_write_ack(ack("replica-2", 2000)).await;

    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicatedTo(LogPosition::new(2000)))
    );
    assert_eq!(client.committed_position().await, LogPosition::new(2000));
    assert!(client.is_current().await);
    assert_eq!(checkpoint.read(), LogPosition::new(2000));
}

#[tokio::test]
async fn three_node_cluster_receives_duplicate_replica_write_acks() {
    let (client, mut events, checkpoint) = tracker("leader-1", 3);
    client.become_leader().await;

    // Same replica, same position, twice. The second ack carries no new information and
    // the only other voter (us) is at position 0.
    client.replica_write_ack(ack("replica-x", 4000)).await;
    client.replica_write_ack(ack("replica-x", 4000)).await;

    // Queries ride the same ordered queue, so once this returns, both acks have been
    // fully processed.
    assert!(client.is_current().await);

    assert_eq!(events.try_next(), None);
    assert_eq!(checkpoint.read(), LogPosition::zero());
    assert_eq!(checkpoint.read_non_flushed(), LogPosition::zero());
}

#[tokio::test]
async fn replica_reports_progress_toward_leader() {
    let (client, mut events, checkpoint) = tracker("replica-3", 3);
    client.become_replica().await;

    client.local_write_advanced(LogPosition::new(500)).await;

    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicaWriteAck(ack("replica-3", 500)))
    );
    assert!(client.is_current().await);

    // A replica never writes the replication checkpoint.
    assert_eq!(checkpoint.read_non_flushed(), LogPosition::zero());
}

#[tokio::test]
async fn single_node_cluster_is_current_without_any_replica() {
    let (client, mut events, checkpoint) = tracker("only-node", 1);
    client.become_leader().await;

    client.local_write_advanced(LogPosition::new(100)).await;

    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicatedTo(LogPosition::new(100)))
    );
    assert!(client.is_current().await);
    assert_eq!(checkpoint.read(), LogPosition::new(100));
}

#[tokio::test]
async fn leadership_change_starts_fresh_epoch() {
    let (client, mut events, _checkpoint) = tracker("leader-1", 3);
    client.become_leader().await;
    client.local_write_advanced(LogPosition::new(1000)).await;
    client.replica_write_ack(ack("replica-2", 1000)).await;
    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicatedTo(LogPosition::new(1000)))
    );

    // Step down, then regain leadership. The old epoch's acks must be gone.
    client.become_replica().await;
    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicaWriteAck(ack("leader-1", 1000)))
    );

    client.become_leader().await;
    client.replica_write_ack(ack("replica-2", 1000)).await;

    assert_eq!(client.committed_position().await, LogPosition::new(1000));
    assert_eq!(events.try_next(), None);
}

#[tokio::test]
async fn regained_leadership_keeps_checkpoint_monotonic() {
    let (client, mut events, checkpoint) = tracker("leader-1", 3);
    client.become_leader().await;
    client.local_write_advanced(LogPosition::new(1000)).await;

    // Two replicas ahead of the leader commit and checkpoint 5000.
    client.replica_write_ack(ack("replica-a", 5000)).await;
    client.replica_write_ack(ack("replica-b", 5000)).await;
    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicatedTo(LogPosition::new(1000)))
    );
    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicatedTo(LogPosition::new(5000)))
    );

    client.become_replica().await;
    assert_eq!(
        events.next().await,
        Some(ReplicationEvent::ReplicaWriteAck(ack("leader-1", 1000)))
    );

    // Regain leadership, then see a quorum below the old checkpoint.
    client.become_leader().await;
    client.replica_write_ack(ack("replica-a", 2000)).await;
    client.replica_write_ack(ack("replica-b", 2000)).await;

    // The tracker is still alive to answer, and nothing moved backwards.
    assert_eq!(client.committed_position().await, LogPosition::new(5000));
    assert_eq!(events.try_next(), None);
    assert_eq!(checkpoint.read(), LogPosition::new(5000));
    assert_eq!(checkpoint.read_non_flushed(), LogPosition::new(5000));
}

fn tracker(
    replica_id: &str,
    cluster_size: usize,
) -> (TrackerClient, ReplicationEventStream, InMemoryCheckpoint) {
    let checkpoint = InMemoryCheckpoint::new();
    let logger = create_root_logger_for_stdout(replica_id.to_string());

    let (client, events) = create_replication_tracker(TrackerConfig {
        logger,
        my_replica_id: ReplicaId::new(replica_id),
        topology: ClusterTopology::new(cluster_size).expect("valid cluster size"),
        replication_checkpoint: checkpoint.clone(),
        event_queue_buffer_size: 16,
    });

    (client, events, checkpoint)
}

fn ack(replica_id: &str, position: u64) -> ReplicaWriteAck {
    ReplicaWriteAck {
        replica_id: ReplicaId::new(replica_id),
        position: LogPosition::new(position),
    }
}

fn create_root_logger_for_stdout(replica_id: String) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("ReplicaId" => replica_id))
}

#[allow(dead_code)]
fn create_root_logger_for_file(directory_prefix: String, replica_id: String) -> slog::Logger {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = format!("{}/info_log_{}/{}_info.log", directory_prefix, replica_id, now);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .unwrap();

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}
