//! # palaver-demo
//!
//! Scripted session against the in-memory conversation store.
//!
//! The binary seeds the demo directory, then plays a short script against
//! it: open a chat, type, send text and media, react, delete, place a call,
//! archive, manage a group. Every published snapshot is logged, and the
//! final state is printed to stdout as JSON.

mod config;
mod session;

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use palaver_shared::constants::APP_NAME;
use palaver_shared::format::format_duration;
use palaver_shared::{CommunityId, ConversationId, UserId};
use palaver_store::{ConversationStore, MediaFile, Seed, StoreSnapshot};

use crate::config::DemoConfig;
use crate::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,palaver_store=debug,palaver_demo=debug")
            }),
        )
        .init();

    info!("Starting {} demo v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = DemoConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Seed the store and attach a renderer
    // -----------------------------------------------------------------------
    let epoch = Utc::now();
    let store = ConversationStore::new(Seed::demo(epoch), config.store.clone(), epoch)?;

    let mut rx = store.subscribe();
    let renderer = tokio::spawn(async move {
        let mut frames = 0usize;
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            render(&snapshot);
            frames += 1;
        }
        frames
    });

    // -----------------------------------------------------------------------
    // 4. Play the script
    // -----------------------------------------------------------------------
    let mut session = Session::new(store, config.tick);
    run_script(&mut session, &config).await?;

    let store = session.finish();
    let final_state = store.snapshot();
    drop(store);

    let frames = renderer.await?;
    info!(frames, "Renderer finished");

    println!("{}", serde_json::to_string_pretty(&final_state)?);
    Ok(())
}

async fn run_script(session: &mut Session, config: &DemoConfig) -> anyhow::Result<()> {
    let chat = &config.conversation;
    let delivery = config.store.delivery_delay;

    session.store_mut().select_conversation(Some(chat))?;

    for _ in 0..3 {
        session.store_mut().keystroke()?;
        session.wait(Duration::from_millis(150)).await;
    }
    let greeting = session.store_mut().send_text("Hey! Got a minute?")?;

    if let Err(e) = session.store_mut().send_text("   ") {
        warn!(error = %e, "Rejected send");
    }

    session.wait(delivery).await;

    let photo = MediaFile {
        name: "sunset.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        url: "file:///tmp/sunset.jpg".to_string(),
        size_bytes: 1_843_200,
    };
    session
        .store_mut()
        .send_media(&[photo], Some("From last night"))?;

    let typo = session.store_mut().send_text("Sent to the wrong chat, sorry")?;
    session.store_mut().add_reaction(&greeting, "👍")?;
    session.store_mut().add_reaction(&greeting, "❤️")?;
    session.store_mut().delete_message(&typo)?;

    let call = session.store_mut().place_call(chat, config.call_medium)?;
    info!(call = %call, medium = %config.call_medium, "Calling");
    session.wait(config.store.call_end_delay + delivery).await;
    for record in session.store().recent_calls() {
        info!(
            call = %record.id,
            duration = %format_duration(record.duration_secs),
            "Call log"
        );
    }

    session.store_mut().toggle_favorite(chat)?;

    let community = CommunityId::from("community-1");
    let group = ConversationId::from("chat-group-2");
    session.store_mut().select_community_group(&community, &group)?;
    session
        .store_mut()
        .add_member(&group, &UserId::from("user-7"))?;
    session.store_mut().exit_group(&group)?;

    let unread: u32 = session
        .store()
        .conversations()
        .iter()
        .map(|c| c.unread_count)
        .sum();
    info!(
        unread,
        pending = session.store().pending_tasks(),
        active = ?session.store().active_id(),
        "Script finished"
    );
    Ok(())
}

fn render(snapshot: &StoreSnapshot) {
    match &snapshot.active {
        Some(chat) => {
            let last = chat.messages.last();
            info!(
                conversation = %chat.id,
                messages = chat.messages.len(),
                typing = chat.typing_users.len(),
                last_status = ?last.map(|m| m.status),
                last_text = last.map(|m| m.text.as_str()).unwrap_or_default(),
                calls = snapshot.recent_calls.len(),
                "Frame"
            );
        }
        None => info!(
            conversations = snapshot.conversations.len(),
            calls = snapshot.recent_calls.len(),
            "Frame (no active conversation)"
        ),
    }
}
