use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use magicord::prelude::*;
use magicord::OutboundMessage;
use tokio::time::timeout;

#[derive(Default)]
pub struct Greeter {
    greeted: AtomicUsize,
}

#[bot(token = "abc123")]
impl Greeter {
    /// Greets the author.
    #[prefix_command]
    fn hello(&self, event: &MessageCreateEvent) -> String {
        self.greeted.fetch_add(1, Ordering::SeqCst);
        format!("Hello, {}!", event.author().unwrap_or("stranger"))
    }

    #[prefix_command]
    fn bye(&self) -> String {
        "Goodbye!".to_string()
    }

    #[magicord::prefix_command]
    fn ping() -> &'static str {
        "pong"
    }
}

#[derive(Default)]
pub struct EnvBot;

#[bot(token_env = "MAGICORD_TEST_TOKEN_THAT_IS_NEVER_SET")]
impl EnvBot {
    #[prefix_command]
    fn ping(&self) -> String {
        "pong".to_string()
    }
}

async fn reply(gateway: &LoopbackGateway) -> OutboundMessage {
    timeout(Duration::from_secs(2), gateway.next_reply())
        .await
        .expect("timed out waiting for a reply")
        .expect("gateway closed")
}

#[test]
fn test_on_message_routes_by_exact_key() {
    let gateway = LoopbackGateway::new();
    let bot = MagicordGreeter::new();

    bot.on_message(&MessageCreateEvent::new("!bye", gateway.channel("general")));
    let reply = gateway.try_next_reply().unwrap();
    assert_eq!(reply.channel_id, "general");
    assert_eq!(reply.content, "Goodbye!");

    for content in ["bye", "!bye now", "!BYE", "just chatting", ""] {
        bot.on_message(&MessageCreateEvent::new(content, gateway.channel("general")));
    }
    assert!(gateway.try_next_reply().is_none());
}

#[test]
fn test_handler_runs_on_owned_bot() {
    let gateway = LoopbackGateway::new();
    let bot = MagicordGreeter::default();
    assert_eq!(bot.bot().greeted.load(Ordering::SeqCst), 0);

    let event = MessageCreateEvent::new("!hello", gateway.channel("general")).with_author("alice");
    bot.on_message(&event);

    assert_eq!(gateway.try_next_reply().unwrap().content, "Hello, alice!");
    assert_eq!(bot.bot().greeted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_logs_in_and_replies() {
    let gateway = LoopbackGateway::new();
    let client = MagicordGreeter::new()
        .run_with(ClientBuilder::new().with_gateway(gateway.clone()))
        .await
        .unwrap();

    assert_eq!(gateway.token().as_deref(), Some("abc123"));
    assert_eq!(client.listener_count(), 1);

    gateway.inject("general", "hello everyone").unwrap();
    gateway.inject("general", "ping").unwrap();
    gateway.inject("general", "!ping").unwrap();
    assert_eq!(reply(&gateway).await.content, "pong");

    gateway.inject("general", "!hello").unwrap();
    gateway.inject("random", "!bye").unwrap();
    assert_eq!(reply(&gateway).await.content, "Hello, stranger!");
    let bye = reply(&gateway).await;
    assert_eq!(bye.channel_id, "random");
    assert_eq!(bye.content, "Goodbye!");

    client.shutdown();
}

#[tokio::test]
async fn test_env_token_must_be_set() {
    let gateway = LoopbackGateway::new();
    let err = MagicordEnvBot::new()
        .run_with(ClientBuilder::new().with_gateway(gateway.clone()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::TokenEnv { ref var } if var == "MAGICORD_TEST_TOKEN_THAT_IS_NEVER_SET"
    ));
    assert!(!gateway.is_connected());
}

#[tokio::test]
async fn test_run_without_gateway_fails() {
    let err = MagicordGreeter::new().run().await.unwrap_err();
    assert!(matches!(err, ClientError::NoGateway));
}
