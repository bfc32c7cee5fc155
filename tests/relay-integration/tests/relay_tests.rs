use fixtures::text_event;
use relay_integration::{spawn_relay, wait_for, RelayClient};

use agrideal_common::identity::UserId;
use agrideal_common::proposal::{ProposalId, ProposalStatus};
use agrideal_common::protocol::RelayEvent;

mod fixtures {
    use agrideal_common::identity::UserId;
    use agrideal_common::message::{ChatMessage, MessageId, MessageKind};
    use agrideal_common::negotiation::NegotiationId;
    use agrideal_common::protocol::RelayEvent;
    use chrono::Utc;

    pub fn text_event(room: &str, sender: &str, body: &str) -> RelayEvent {
        RelayEvent::NewMessage {
            message: ChatMessage {
                id: MessageId::random(),
                negotiation_id: NegotiationId(room.to_string()),
                sender_id: UserId(sender.to_string()),
                sender_name: sender.to_string(),
                kind: MessageKind::Text,
                content: Some(body.to_string()),
                bound_proposal_id: None,
                created_at: Utc::now(),
            },
        }
    }
}

#[tokio::test]
async fn events_fan_out_to_everyone_except_the_sender() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    let mut alice = RelayClient::connect(addr, "alice").await?;
    gary.join("neg-1").await?;
    emma.join("neg-1").await?;
    alice.join("neg-1").await?;
    wait_for(&registry, 1, 3).await?;

    let event = text_event("neg-1", "gary", "500t at 420?");
    gary.send_event(&event).await?;

    assert_eq!(emma.recv_event().await?, event);
    assert_eq!(alice.recv_event().await?, event);
    gary.expect_silence().await?;
    Ok(())
}

#[tokio::test]
async fn rooms_do_not_leak_into_each_other() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    gary.join("neg-1").await?;
    emma.join("neg-2").await?;
    wait_for(&registry, 2, 2).await?;

    gary.send_event(&text_event("neg-1", "gary", "hello")).await?;
    emma.expect_silence().await?;
    Ok(())
}

#[tokio::test]
async fn switching_rooms_stops_delivery_from_the_old_one() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    gary.join("neg-1").await?;
    emma.join("neg-1").await?;
    wait_for(&registry, 1, 2).await?;

    let first = text_event("neg-1", "gary", "before the switch");
    gary.send_event(&first).await?;
    assert_eq!(emma.recv_event().await?, first);

    emma.join("neg-2").await?;
    wait_for(&registry, 2, 2).await?;
    gary.send_event(&text_event("neg-1", "gary", "after the switch"))
        .await?;
    emma.expect_silence().await?;

    // emma switching in neg-2, gary still in neg-1.
    assert_eq!(registry.room_count(), 2);
    Ok(())
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_closing_the_socket() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    gary.join("neg-1").await?;
    emma.join("neg-1").await?;
    wait_for(&registry, 1, 2).await?;

    gary.send_raw("this is not json").await?;
    gary.send_raw(r#"{"type":"presence","whoKnows":true}"#).await?;
    emma.expect_silence().await?;

    // The connection survives and keeps relaying.
    let event = text_event("neg-1", "gary", "still here");
    gary.send_event(&event).await?;
    assert_eq!(emma.recv_event().await?, event);
    Ok(())
}

#[tokio::test]
async fn proposal_responses_are_relayed_verbatim() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    gary.join("neg-1").await?;
    emma.join("neg-1").await?;
    wait_for(&registry, 1, 2).await?;

    let event = RelayEvent::ProposalResponse {
        proposal_id: ProposalId("prop-1".to_string()),
        new_status: ProposalStatus::Rejected,
        message: None,
        negotiation_status: None,
        contract: None,
    };
    emma.send_event(&event).await?;
    assert_eq!(gary.recv_event().await?, event);
    Ok(())
}

#[tokio::test]
async fn typing_signals_reach_the_other_party() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    gary.join("neg-1").await?;
    emma.join("neg-1").await?;
    wait_for(&registry, 1, 2).await?;

    let event = RelayEvent::Typing {
        user_id: UserId("u-emma".to_string()),
        user_name: "Emma".to_string(),
    };
    emma.send_event(&event).await?;
    assert_eq!(gary.recv_event().await?, event);
    Ok(())
}

#[tokio::test]
async fn disconnecting_empties_the_room() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    gary.join("neg-1").await?;
    wait_for(&registry, 1, 1).await?;

    drop(gary);
    wait_for(&registry, 0, 0).await?;
    Ok(())
}

#[tokio::test]
async fn frames_sent_before_joining_go_nowhere() -> anyhow::Result<()> {
    let (addr, registry) = spawn_relay().await?;
    let mut gary = RelayClient::connect(addr, "gary").await?;
    let mut emma = RelayClient::connect(addr, "emma").await?;
    emma.join("neg-1").await?;
    wait_for(&registry, 1, 1).await?;

    gary.send_event(&text_event("neg-1", "gary", "shouting into the void"))
        .await?;
    emma.expect_silence().await?;
    Ok(())
}
