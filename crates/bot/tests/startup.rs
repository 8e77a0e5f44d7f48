#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    herald::{
        Activity, Bot, HandlerCatalog, HeraldConfig, LocalEventBus, PlatformSession, PresenceSink,
        handler_fn,
    },
    serde_json::{Value, json},
};

#[derive(Default)]
struct RecordingSession {
    published: Mutex<Vec<Value>>,
    presence: Mutex<Vec<Activity>>,
}

#[async_trait]
impl PresenceSink for RecordingSession {
    async fn set_presence(&self, activity: &Activity) -> anyhow::Result<()> {
        self.presence.lock().unwrap().push(activity.clone());
        Ok(())
    }
}

#[async_trait]
impl PlatformSession for RecordingSession {
    async fn login(&self, _token: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn publish_interactions(&self, descriptors: Vec<Value>) -> anyhow::Result<()> {
        self.published.lock().unwrap().extend(descriptors);
        Ok(())
    }

    fn ping(&self) -> Option<Duration> {
        None
    }

    fn guild_count(&self) -> usize {
        1
    }

    fn channel_count(&self) -> usize {
        4
    }

    fn user_count(&self) -> usize {
        12
    }
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}

fn catalog() -> HandlerCatalog {
    let reply = |text: &'static str| {
        handler_fn(text, move |_| async move { Ok::<_, anyhow::Error>(json!({ "content": text })) })
    };
    HandlerCatalog::new()
        .with(reply("pong"))
        .with(reply("help"))
        .with(reply("ban"))
        .with(reply("staff"))
        .with(reply("rules"))
        .with(reply("faq"))
}

fn plugin_tree(root: &Path) {
    let commands = root.join("commands");
    write(&commands, "ping.toml", "name = \"ping\"\n[text]\nhandler = \"pong\"\n");
    write(&commands, "help.toml", "name = \"help\"\n[text]\nhandler = \"help\"\n");
    write(
        &commands,
        "ban.toml",
        r#"
name = "ban"

[slash]
handler = "ban"
descriptor = { name = "ban", description = "Ban a member" }
"#,
    );
    write(&commands, "example.toml", "name = \"example\"\n[text]\nhandler = \"pong\"\n");

    write(
        &root.join("triggers"),
        "staff.toml",
        r#"
name = "staff"
handler = "staff"

[role]
activated = true
ids = ["1001"]
"#,
    );

    let canned = root.join("canned");
    write(&canned, "rules.toml", "name = \"rules\"\ndisplay_name = \"Server rules\"\nhandler = \"rules\"\n");
    write(&canned, "faq.toml", "name = \"faq\"\nhandler = \"faq\"\n");
}

fn config(root: &Path) -> HeraldConfig {
    let text = r#"
[bot]
token = "test-token"

[directories]
commands = "commands"
triggers = "triggers"
canned_messages = "canned"

[presence]
interval = "15s"
statuses = [{ kind = "watching", name = "The Server" }]
"#;
    let path = root.join("herald.toml");
    std::fs::write(&path, text).unwrap();
    herald::load_config(&path).unwrap()
}

#[tokio::test]
async fn discovered_plugins_are_counted_and_published() {
    let tmp = tempfile::tempdir().unwrap();
    plugin_tree(tmp.path());
    let session = Arc::new(RecordingSession::default());
    let bus = Arc::new(LocalEventBus::new());

    let bot = Bot::new(config(tmp.path()), session.clone(), bus.clone(), catalog()).unwrap();
    let stats = bot.registry().stats();

    assert_eq!(stats.get("commands.text").unwrap().registered, 2);
    assert_eq!(stats.get("commands.slash").unwrap().registered, 1);
    assert_eq!(stats.get("triggers.role").unwrap().registered, 1);
    assert_eq!(stats.get("triggers.message").unwrap().registered, 0);
    assert_eq!(stats.get("predefinedMessages").unwrap().registered, 2);
    assert!(bot.registry().command("example").is_none());

    let faq = bot.registry().canned_message("faq").unwrap();
    assert_eq!(faq.value(&Value::Null).await.unwrap(), json!({"content": "faq"}));
    assert_eq!(stats.get("predefinedMessages").unwrap().executed, 1);

    bot.start().await.unwrap();
    assert_eq!(
        *session.published.lock().unwrap(),
        vec![json!({"name": "ban", "description": "Ban a member"})]
    );

    bus.dispatch("ready", json!({})).await;
    assert!(bot.is_presence_running());

    let snapshot = bot.stats();
    assert_eq!(snapshot.registry.commands, 3);
    assert_eq!(snapshot.registry.canned_messages, 2);
    assert_eq!(snapshot.statistics.events.buckets["ready"].executed, 1);
    assert_eq!(snapshot.users, 12);

    bot.shutdown().await;
    assert!(!bot.is_presence_running());
}

#[tokio::test]
async fn a_broken_manifest_aborts_startup() {
    let tmp = tempfile::tempdir().unwrap();
    plugin_tree(tmp.path());
    write(
        &tmp.path().join("commands"),
        "kick.toml",
        "name = \"kick\"\n[text]\nhandler = \"not-in-catalog\"\n",
    );

    let err = Bot::new(
        config(tmp.path()),
        Arc::new(RecordingSession::default()),
        Arc::new(LocalEventBus::new()),
        catalog(),
    )
    .err()
    .unwrap();
    let message = err.to_string();
    assert!(message.contains("kick.toml"), "{message}");
    assert!(message.contains("not-in-catalog"), "{message}");
}
