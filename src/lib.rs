pub mod args;
pub mod command;
pub mod generate;
pub mod help;
pub mod urange;

use anyhow::Context;
use matrix_sdk::{
    config::SyncSettings,
    room::Room,
    ruma::{
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{
                AddMentions, ForwardThread, MessageType, RoomMessageEventContent,
                SyncRoomMessageEvent,
            },
            tombstone::OriginalSyncRoomTombstoneEvent,
            topic::RoomTopicEventContent,
        },
        presence::PresenceState,
    },
    Client, LoopCtrl, RoomState,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use std::{env, fs};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, trace, warn};

use crate::command::Action;

/// The configuration to run a urandom-bot instance with.
#[derive(Deserialize)]
pub struct BotConfig {
    /// the matrix homeserver the bot should connect to.
    pub home_server: String,
    /// the user_id to be used on the homeserver.
    pub user_id: String,
    /// password to be used to log into the homeserver.
    pub password: String,
    /// where to store the matrix-sdk internal data.
    pub matrix_store_path: String,
}

impl BotConfig {
    /// Generate a `BotConfig` from a TOML config file.
    ///
    /// If `path` matches `None`, will search for a file called `config.toml` in an XDG
    /// compliant configuration directory (e.g ~/.config/urandom-bot/config.toml on Linux).
    pub fn from_config(path: Option<String>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(a) => a,
            None => {
                let dirs = directories::ProjectDirs::from("", "", "urandom-bot")
                    .context("config file not found")?;
                let path = dirs.config_dir().join("config.toml");
                path.to_str()
                    .context("config path isn't valid UTF-8")?
                    .to_owned()
            }
        };
        let contents = fs::read_to_string(&config_path)?;
        let config: BotConfig = toml::from_str(&contents)?;

        debug!("Using configuration from {config_path}");
        Ok(config)
    }

    /// Generate a `BotConfig` from the process' environment.
    pub fn from_env() -> anyhow::Result<Self> {
        // override environment variables with contents of .env file, unless they were already set
        // explicitly.
        dotenvy::dotenv().ok();

        let home_server = env::var("HOMESERVER").context("missing HOMESERVER variable")?;
        let user_id = env::var("BOT_USER_ID").context("missing bot user id in BOT_USER_ID")?;
        let password = env::var("BOT_PWD").context("missing bot password in BOT_PWD")?;
        let matrix_store_path =
            env::var("MATRIX_STORE_PATH").context("missing MATRIX_STORE_PATH")?;

        debug!("Using configuration from environment");
        Ok(Self {
            home_server,
            user_id,
            password,
            matrix_store_path,
        })
    }
}

/// After a room has been upgraded, automatically attempt to join the new room.
async fn on_room_upgrade(ev: OriginalSyncRoomTombstoneEvent, room: Room) {
    let content = ev.content;

    let alias_or_id = if let Some(alias) = room.canonical_alias() {
        alias.to_string()
    } else {
        room.room_id().to_string()
    };

    debug!(
        %alias_or_id,
        reason = content.body,
        "Room was upgraded, joining the new room.",
    );

    match room
        .client()
        .join_room_by_id(&content.replacement_room)
        .await
    {
        Ok(_) => {
            debug!("Successfully joined the upgraded room.");
        }
        Err(err) => {
            warn!(
                from = alias_or_id,
                to = %content.replacement_room,
                "Couldn't join the upgraded room: {err}"
            );
        }
    }
}

async fn on_message(ev: SyncRoomMessageEvent, room: Room, client: Client) -> anyhow::Result<()> {
    if room.state() != RoomState::Joined {
        // Ignore non-joined rooms events.
        return Ok(());
    }

    if ev.sender() == client.user_id().unwrap() {
        // Skip messages sent by the bot.
        return Ok(());
    }

    let Some(unredacted) = ev.as_original() else {
        return Ok(());
    };

    let content = if let MessageType::Text(text) = &unredacted.content.msgtype {
        text.body.as_str()
    } else {
        // Ignore other kinds of messages.
        return Ok(());
    };

    trace!(
        "Received a message from {} in {}: {}",
        ev.sender(),
        room.room_id(),
        content,
    );

    // A fresh generator per turn; no state is shared across invocations.
    let mut rng = StdRng::from_entropy();
    let Some(actions) = command::try_handle(content, &mut rng) else {
        return Ok(());
    };

    let full_ev = unredacted
        .clone()
        .into_full_event(room.room_id().to_owned());
    for action in actions {
        match action {
            Action::Notice(text) => {
                room.send(RoomMessageEventContent::notice_plain(text))
                    .await?;
            }
            Action::Reply(text) => {
                let content = RoomMessageEventContent::notice_plain(text).make_reply_to(
                    &full_ev,
                    ForwardThread::Yes,
                    AddMentions::No,
                );
                room.send(content).await?;
            }
            Action::SetTopic(text) => {
                room.send_state_event(RoomTopicEventContent::new(text))
                    .await?;
            }
        }
    }

    Ok(())
}

/// Autojoin mixin.
async fn on_stripped_state_member(
    room_member: StrippedRoomMemberEvent,
    client: Client,
    room: Room,
) {
    if room_member.state_key != client.user_id().unwrap() {
        // the invite we've seen isn't for us, but for someone else. ignore
        return;
    }

    // looks like the room is an invited room, let's attempt to join it, then.
    if room.state() == RoomState::Invited {
        // The event handlers are called before the next sync begins, but
        // methods that change the state of a room (joining, leaving a room)
        // wait for the sync to return the new room state so we need to spawn
        // a new task for them.
        tokio::spawn(async move {
            debug!("Autojoining room {}", room.room_id());
            let mut delay = 1;

            while let Err(err) = room.join().await {
                // retry autojoin due to synapse sending invites, before the
                // invited user can join for more information see
                // https://github.com/matrix-org/synapse/issues/4345
                warn!(
                    "Failed to join room {} ({err:?}), retrying in {delay}s",
                    room.room_id()
                );

                sleep(Duration::from_secs(delay)).await;
                delay *= 2;

                if delay > 3600 {
                    error!("Can't join room {} ({err:?})", room.room_id());
                    break;
                }
            }

            debug!("Successfully joined room {}", room.room_id());
        });
    }
}

/// Run the client for the given `BotConfig`.
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let client = Client::builder()
        .server_name(config.home_server.as_str().try_into()?)
        .sqlite_store(&config.matrix_store_path, None)
        .build()
        .await?;

    debug!("logging in...");
    client
        .matrix_auth()
        .login_username(&config.user_id, &config.password)
        .send()
        .await?;

    client
        .user_id()
        .context("impossible state: missing user id for the logged in bot?")?;

    // An initial sync to set up state and so our bot doesn't respond to old
    // messages. If the `StateStore` finds saved state in the location given the
    // initial sync will be skipped in favor of loading state from the store.
    debug!("starting initial sync...");
    client
        .sync_with_callback(SyncSettings::default(), |_| async { LoopCtrl::Break })
        .await?;

    debug!("setup ready! now listening to incoming messages.");
    client.add_event_handler(on_message);
    client.add_event_handler(on_room_upgrade);
    client.add_event_handler(on_stripped_state_member);

    tokio::select! {
        _ = handle_signals() => {
            // Exit :)
        }

        Err(err) = client.sync(SyncSettings::default()) => {
            anyhow::bail!(err);
        }
    }

    // Set bot presence to offline.
    let request = matrix_sdk::ruma::api::client::presence::set_presence::v3::Request::new(
        client.user_id().unwrap().to_owned(),
        PresenceState::Offline,
    );

    client.send(request, None).await?;

    info!("properly exited, have a nice day!");
    Ok(())
}

async fn handle_signals() -> anyhow::Result<()> {
    use futures::StreamExt as _;
    use signal_hook::consts::signal::*;
    use signal_hook_tokio::*;

    let mut signals = Signals::new([SIGINT, SIGHUP, SIGQUIT, SIGTERM])?;
    let handle = signals.handle();

    while let Some(signal) = signals.next().await {
        match signal {
            SIGINT | SIGHUP | SIGQUIT | SIGTERM => {
                handle.close();
                break;
            }
            _ => {
                // Don't care.
            }
        }
    }

    Ok(())
}
