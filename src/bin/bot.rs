use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pillbox::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandHandler,
};
use pillbox::core::Config;
use pillbox::features::health::{self, HealthState};
use pillbox::features::schedule::{ChannelNotifier, ReminderScheduler, ScheduleConfig, TriggerTable};
use pillbox::features::startup::StartupNotifier;

struct Handler {
    command_handler: Arc<CommandHandler>,
    guild_id: Option<GuildId>,
    startup_notifier: StartupNotifier,
    /// Taken by the first ready event; reconnects find it empty.
    scheduler: Mutex<Option<ReminderScheduler>>,
    scheduler_started: AtomicBool,
    reminder_channel_id: u64,
    mention_user_id: Option<u64>,
    trigger_count: usize,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        // Register slash commands - guild commands for development (instant),
        // global for production
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }

        // Start the tick loop exactly once; a reconnect delivers another
        // ready event and must not spawn a second loop.
        if !self.scheduler_started.swap(true, Ordering::SeqCst) {
            if let Some(scheduler) = self.scheduler.lock().unwrap().take() {
                let notifier = ChannelNotifier::new(
                    ctx.http.clone(),
                    self.reminder_channel_id,
                    self.mention_user_id,
                );
                tokio::spawn(async move {
                    scheduler.run(notifier).await;
                });
                info!("⏰ Reminder scheduler started");
            }
        } else {
            info!("Reminder scheduler already running (reconnect)");
        }

        self.startup_notifier
            .announce(&ctx.http, self.trigger_count)
            .await;
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        info!("🔗 Gateway session resumed; scheduler unaffected");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            if let Err(e) = self
                .command_handler
                .handle_slash_command(&ctx, &command)
                .await
            {
                error!(
                    "Error handling slash command '{}': {}",
                    command.data.name, e
                );

                let _ = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content(
                                    "❌ Sorry, I encountered an error processing your command.",
                                )
                            })
                    })
                    .await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Pillbox reminder bot...");

    // Load the schedule; the process must not run with an invalid one.
    let schedule = if std::path::Path::new(&config.triggers_path).exists() {
        info!("📄 Loading schedule from {}", config.triggers_path);
        ScheduleConfig::load(&config.triggers_path)?
    } else {
        info!(
            "📄 No schedule file at {} - using built-in schedule",
            config.triggers_path
        );
        ScheduleConfig::builtin()
    };
    let table = Arc::new(TriggerTable::from_config(&schedule)?);

    info!(
        "💊 Loaded {} reminders (timezone {})",
        table.len(),
        table.timezone()
    );
    for trigger in table.all() {
        info!(
            "   - {} at {} ({})",
            trigger.id,
            trigger.time_of_day.format("%H:%M"),
            trigger.label
        );
    }

    let scheduler = ReminderScheduler::new(table.clone());
    let command_context = Arc::new(CommandContext::new(table.clone()));
    let command_handler = Arc::new(CommandHandler::new(command_context));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        command_handler,
        guild_id,
        startup_notifier: StartupNotifier::new(config.reminder_channel_id),
        scheduler: Mutex::new(Some(scheduler)),
        scheduler_started: AtomicBool::new(false),
        reminder_channel_id: config.reminder_channel_id,
        mention_user_id: config.mention_user_id,
        trigger_count: table.len(),
    };

    // Slash commands and channel sends only; no message content needed.
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Liveness endpoint for process supervision, independent of the
    // gateway connection.
    let health_addr = config.health_bind_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(
            health_addr,
            HealthState {
                start_time: std::time::Instant::now(),
            },
        )
        .await
        {
            error!("Health endpoint failed: {e}");
        }
    });

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
