//! End-to-end tests: configuration → node → stream/replay → votes, against
//! the nullable ledger.

use std::sync::Arc;
use std::time::Duration;

use vanguard_client::{AccountPower, LedgerError, SubmitError};
use vanguard_node::{Node, NodeConfig, NodeError, Services};
use vanguard_nullables::{NullClock, NullDisabledVoterStore, NullLedger, NullRandom};
use vanguard_roster::{DisabledVoterStore, FileDisabledVoterStore};
use vanguard_types::{
    ActiveVote, Amount, Block, ContentSnapshot, Timestamp, Transfer, VoteWeight, VotingPower,
};

const NOW: u64 = 1_600_000_000;

const CONFIG: &str = r#"
    voters = ["v1 5Kone", "v2 5Ktwo", "v3 5Kthree"]
    bots = ["bot1"]

    [voting_rules]
    vote_weight = "100.0 %"
    min_transfer = "1.000 STEEM"
    max_transfer = "10.000 STEEM"
    min_wait = 1
    max_wait = 5
    min_voting_power = "80.0 %"
    reserve_voting_power = "5.0 %"
"#;

fn node_with(
    config: &NodeConfig,
    ledger: &Arc<NullLedger>,
    disabled: Arc<dyn DisabledVoterStore>,
) -> Arc<Node> {
    let services = Services {
        client: ledger.clone(),
        clock: Arc::new(NullClock::new(NOW)),
        // 3 minutes into the 1..5 minute wait window.
        random: Arc::new(NullRandom::new(0.5)),
        disabled,
    };
    Arc::new(Node::new(config, services).expect("node should build"))
}

fn node(ledger: &Arc<NullLedger>) -> Arc<Node> {
    let config = NodeConfig::from_toml_str(CONFIG).unwrap();
    node_with(&config, ledger, Arc::new(NullDisabledVoterStore::new()))
}

fn post(created: u64) -> ContentSnapshot {
    ContentSnapshot {
        author: "alice".into(),
        permlink: "my-post".into(),
        parent_author: String::new(),
        parent_permlink: "life".into(),
        created: Timestamp::new(created),
        cashout_time: Some(Timestamp::new(NOW + 86_400)),
        max_accepted_payout: Amount::from_milli(1_000_000_000, "SBD"),
        json_metadata: r#"{"tags":["life"]}"#.into(),
        author_reputation: 0,
        active_votes: Vec::new(),
    }
}

fn payment() -> Transfer {
    Transfer {
        from: "alice".into(),
        to: "bot1".into(),
        amount: "5.000 STEEM".parse().unwrap(),
        memo: "@alice/my-post".into(),
    }
}

fn power(name: &str, hundredths: u16) -> AccountPower {
    AccountPower {
        name: name.into(),
        voting_power: VotingPower::new(hundredths),
        last_vote_time: Timestamp::new(NOW),
    }
}

#[tokio::test(start_paused = true)]
async fn paid_post_gets_full_votes_from_eligible_voters() {
    let ledger = Arc::new(NullLedger::new());
    let mut content = post(NOW - 60);
    content.active_votes.push(ActiveVote {
        voter: "v3".into(),
        percent: 10_000,
    });
    ledger.set_content(content);
    ledger.set_account_power(power("v1", 10_000));
    // Below the lowered 75 % threshold for full-strength votes.
    ledger.set_account_power(power("v2", 5_000));
    ledger.set_account_power(power("v3", 10_000));

    let node = node(&ledger);
    let running = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.run(None).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    ledger.push_transfer(payment()).await;

    // 180 s target minus 60 s of content age.
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert!(ledger.submitted_votes().is_empty());
    assert_eq!(node.engine().pending(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let votes = ledger.submitted_votes();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].voter, "v1");
    assert_eq!(votes[0].author, "alice");
    assert_eq!(votes[0].permlink, "my-post");
    assert_eq!(votes[0].weight, VoteWeight::FULL);
    assert_eq!(node.engine().pending(), 0);
    assert!(node.engine().last_voted_for("alice").await.is_some());

    node.shutdown_controller().shutdown();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn bot_vote_at_revalidation_stops_the_task() {
    let ledger = Arc::new(NullLedger::new());
    ledger.push_content(post(NOW - 60));
    let mut voted = post(NOW - 60);
    voted.active_votes.push(ActiveVote {
        voter: "bot1".into(),
        percent: 10_000,
    });
    ledger.push_content(voted);

    let node = node(&ledger);
    let running = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.run(None).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    ledger.push_transfer(payment()).await;
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(ledger.submitted_votes().is_empty());
    assert_eq!(ledger.content_fetches().len(), 2);

    node.shutdown_controller().shutdown();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stream_failure_resets_and_reconnects() {
    let ledger = Arc::new(NullLedger::new());
    ledger.script_stream(vec![Err(LedgerError::Transport("connection reset".into()))]);

    let node = node(&ledger);
    let running = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.run(None).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(ledger.stream_opens(), 1);

    // Reconnect delay is 5 s.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ledger.stream_opens(), 2);

    // The new session is live.
    ledger.set_content(post(NOW - 60));
    ledger.push_transfer(payment()).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(node.engine().pending(), 1);

    node.shutdown_controller().shutdown();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn closed_stream_is_treated_as_a_failure() {
    let ledger = Arc::new(NullLedger::new());
    ledger.script_stream(Vec::new());
    ledger.script_stream(Vec::new());

    let node = node(&ledger);
    let running = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.run(None).await }
    });

    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(ledger.stream_opens(), 3);

    node.shutdown_controller().shutdown();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn replay_catches_up_on_old_transfers() {
    let ledger = Arc::new(NullLedger::new());
    ledger.set_content(post(NOW - 7_200));
    ledger.set_last_irreversible(100);
    ledger.add_block(Block {
        number: 95,
        timestamp: Timestamp::new(NOW - 3_600),
        transfers: vec![payment()],
    });
    ledger.add_block(Block {
        number: 80,
        timestamp: Timestamp::new(NOW - 4_000),
        transfers: vec![payment()],
    });

    let node = node(&ledger);
    let stats = node.replay_driver().replay(10).await.unwrap();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.transfers, 1);
    assert_eq!(stats.dispatched, 1);

    // The replayed event is far past its wait: only the settle delay applies,
    // and replay itself waited that long before returning.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(ledger.submitted_votes().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn replay_walks_the_range_in_batches() {
    let ledger = Arc::new(NullLedger::new());
    ledger.set_content(post(NOW - 7_200));
    ledger.set_last_irreversible(100);
    for number in 90..=100 {
        let mut transfer = payment();
        transfer.memo = "not a slug".into();
        ledger.add_block(Block {
            number,
            timestamp: Timestamp::new(NOW - 3_600),
            transfers: vec![transfer],
        });
    }

    let mut config = NodeConfig::from_toml_str(CONFIG).unwrap();
    config.replay_batch_size = 3;
    let node = node_with(&config, &ledger, Arc::new(NullDisabledVoterStore::new()));

    let stats = node.replay_driver().replay(10).await.unwrap();
    assert_eq!(stats.blocks, 11);
    assert_eq!(stats.transfers, 11);
    assert_eq!(stats.dispatched, 0);
    assert_eq!(stats.errors, 0);
}

#[tokio::test(start_paused = true)]
async fn missing_authority_is_persisted_and_excluded_next_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disabled.txt");
    let store = Arc::new(FileDisabledVoterStore::new(&path));

    let ledger = Arc::new(NullLedger::new());
    ledger.set_content(post(NOW - 7_200));
    ledger.set_last_irreversible(10);
    ledger.add_block(Block {
        number: 10,
        timestamp: Timestamp::new(NOW - 3_600),
        transfers: vec![payment()],
    });
    ledger.script_votes("v2", vec![Err(SubmitError::MissingAuthority)]);

    let config = NodeConfig::from_toml_str(CONFIG).unwrap();
    let node = node_with(&config, &ledger, store.clone());
    node.replay_driver().replay(0).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(ledger.submitted_votes().len(), 3);
    assert!(store.is_disabled("v2").unwrap());
    let persisted = std::fs::read_to_string(&path).unwrap();
    assert!(persisted.starts_with("v2 missing required posting authority"));

    let roster = config.roster().unwrap();
    assert_eq!(
        roster.active_voters(store.as_ref()).unwrap(),
        vec!["v1".to_string(), "v3".to_string()]
    );
}

#[tokio::test]
async fn empty_roster_is_rejected() {
    let config = NodeConfig::from_toml_str("bots = [\"bot1\"]").unwrap();
    let ledger = Arc::new(NullLedger::new());
    let services = Services {
        client: ledger,
        clock: Arc::new(NullClock::new(NOW)),
        random: Arc::new(NullRandom::default()),
        disabled: Arc::new(NullDisabledVoterStore::new()),
    };
    assert!(matches!(
        Node::new(&config, services),
        Err(NodeError::Roster(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_node() {
    let ledger = Arc::new(NullLedger::new());
    let node = node(&ledger);
    let running = tokio::spawn({
        let node = Arc::clone(&node);
        async move { node.run(Some(5)).await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    node.shutdown_controller().shutdown();
    tokio::time::timeout(Duration::from_secs(1), running)
        .await
        .expect("node should stop")
        .unwrap();
}
