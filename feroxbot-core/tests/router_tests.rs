// tests/router_tests.rs

mod test_utils;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::InteractionResponseType;

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, MessageStyle, ReplyOptions,
};
use feroxbot_core::Error;
use feroxbot_core::services::responder::text;
use feroxbot_core::services::{
    CommandContext, CommandHandler, DispatchOutcome, RegisteredCommand,
};
use test_utils::*;

static GUARDED_RUNS: AtomicUsize = AtomicUsize::new(0);

struct Counting(&'static AtomicUsize);

#[async_trait]
impl CommandHandler for Counting {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        self.0.fetch_add(1, Ordering::SeqCst);
        ctx.responder.reply(event, text("ok"), ReplyOptions::default()).await
    }
}

fn guarded(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("guarded", "Needs to manage messages", CommandStatus::Enabled)
        .bot_permissions(Permissions::MANAGE_MESSAGES);
    Ok(RegisteredCommand::new(def, Counting(&GUARDED_RUNS)))
}

static COOLDOWN_RUNS: AtomicUsize = AtomicUsize::new(0);

fn cooled(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("cooled", "Has a cooldown", CommandStatus::Enabled).cooldown_ms(3000);
    Ok(RegisteredCommand::new(def, Counting(&COOLDOWN_RUNS)))
}

static NSFW_RUNS: AtomicUsize = AtomicUsize::new(0);

fn nsfw(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("spicy", "Age restricted", CommandStatus::Enabled).nsfw(true);
    Ok(RegisteredCommand::new(def, Counting(&NSFW_RUNS)))
}

static GUILD_ONLY_RUNS: AtomicUsize = AtomicUsize::new(0);

fn guild_only(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("serveronly", "No DMs", CommandStatus::Enabled).disable_dm(true);
    Ok(RegisteredCommand::new(def, Counting(&GUILD_ONLY_RUNS)))
}

struct Failing {
    acknowledge_first: bool,
}

#[async_trait]
impl CommandHandler for Failing {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        if self.acknowledge_first {
            ctx.responder.reply(event, text("working..."), ReplyOptions::default()).await?;
        }
        Err(Error::Platform("database went away".into()))
    }
}

fn failing(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("failing", "Always fails", CommandStatus::Enabled);
    Ok(RegisteredCommand::new(def, Failing { acknowledge_first: false }))
}

fn failing_late(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("failinglate", "Fails after replying", CommandStatus::Enabled);
    Ok(RegisteredCommand::new(def, Failing { acknowledge_first: true }))
}

struct Panicking;

#[async_trait]
impl CommandHandler for Panicking {
    async fn run(&self, _ctx: &CommandContext, _event: &InteractionEvent) -> Result<(), Error> {
        panic!("handler bug");
    }
}

fn panicking(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("panicking", "Panics", CommandStatus::Enabled);
    Ok(RegisteredCommand::new(def, Panicking))
}

static SLOW_RUNS: AtomicUsize = AtomicUsize::new(0);

/// Suspends for a while before answering, so overlapping dispatches
/// are all in flight at once.
struct Slow;

#[async_trait]
impl CommandHandler for Slow {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        SLOW_RUNS.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.responder.reply(event, text("done"), ReplyOptions::default()).await
    }
}

fn slow(_: &BotSettings) -> Result<RegisteredCommand, Error> {
    let def = CommandDefinition::new("slow", "Takes its time", CommandStatus::Enabled).cooldown_ms(3000);
    Ok(RegisteredCommand::new(def, Slow))
}

fn all() -> Vec<feroxbot_core::services::CommandFactory> {
    vec![guarded, cooled, nsfw, guild_only, failing, failing_late, panicking, slow]
}

fn baseline() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS
}

#[tokio::test]
async fn unknown_command_gets_exactly_one_generic_error() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(dm_command("doesnotexist", Vec::new())).await;

    assert_eq!(outcome, DispatchOutcome::RoutingFailed);
    let calls = h.api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].description().as_deref(),
        Some("⚠ **Something went wrong, please try again**")
    );
}

#[tokio::test]
async fn missing_permission_blocks_handler_and_warns_once() {
    let h = Harness::new(&all());

    let outcome = h
        .router
        .dispatch(guild_command("guarded", Vec::new(), baseline()))
        .await;

    assert_eq!(outcome, DispatchOutcome::MissingPermission);
    // Only the warning; the handler would have replied "ok".
    let calls = h.api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].description().as_deref(),
        Some("❌ **The bot doesn't have the `MANAGE_MESSAGES` permission in <#2>, Please contact a server admin!**")
    );
}

#[tokio::test]
async fn missing_permission_is_silent_without_baseline_capability() {
    let h = Harness::new(&all());

    let outcome = h
        .router
        .dispatch(guild_command("guarded", Vec::new(), Permissions::VIEW_CHANNEL))
        .await;

    assert_eq!(outcome, DispatchOutcome::MissingPermission);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn granted_permission_runs_the_handler() {
    let h = Harness::new(&all());

    let outcome = h
        .router
        .dispatch(guild_command("guarded", Vec::new(), baseline() | Permissions::MANAGE_MESSAGES))
        .await;

    assert_eq!(outcome, DispatchOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn cooldown_scenario() {
    let h = Harness::new(&all());
    let before = COOLDOWN_RUNS.load(Ordering::SeqCst);

    assert_eq!(
        h.router.dispatch(dm_command("cooled", Vec::new())).await,
        DispatchOutcome::Completed
    );

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let second = h.router.dispatch(dm_command("cooled", Vec::new())).await;
    let DispatchOutcome::Throttled(remaining) = second else {
        panic!("expected throttled, got {second:?}");
    };
    assert!(remaining >= Duration::from_millis(1000));
    let wait_reply = h.api.last().unwrap();
    assert_eq!(
        wait_reply.description().as_deref(),
        Some("⏱ **Please wait `2s` and try again**")
    );

    tokio::time::sleep(Duration::from_millis(2001)).await;
    assert_eq!(
        h.router.dispatch(dm_command("cooled", Vec::new())).await,
        DispatchOutcome::Completed
    );
    assert_eq!(COOLDOWN_RUNS.load(Ordering::SeqCst), before + 2);
}

#[tokio::test(start_paused = true)]
async fn nsfw_command_is_refused_in_regular_channels() {
    let h = Harness::new(&all());

    let outcome = h
        .router
        .dispatch(guild_command("spicy", Vec::new(), baseline()))
        .await;
    assert_eq!(outcome, DispatchOutcome::NsfwOnly);

    // Refusal disappears after a few seconds.
    tokio::time::sleep(Duration::from_secs(6)).await;
    let calls = h.api.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].description().as_deref(),
        Some("❌ **This command can only be used in **nsfw** channels!**")
    );
    assert!(matches!(calls[1], ApiCall::Delete(_)));

    let allowed = guild_command("spicy", Vec::new(), baseline()).with_nsfw_channel(true);
    assert_eq!(h.router.dispatch(allowed).await, DispatchOutcome::Completed);
}

#[tokio::test]
async fn dm_disabled_command_is_refused_in_dms() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(dm_command("serveronly", Vec::new())).await;

    assert_eq!(outcome, DispatchOutcome::DmDisabled);
    assert_eq!(
        h.api.calls()[0].description().as_deref(),
        Some("❌ **This command is disabled outside of servers!**")
    );
}

#[tokio::test]
async fn handler_error_becomes_generic_reply() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(dm_command("failing", Vec::new())).await;

    assert_eq!(outcome, DispatchOutcome::HandlerFailed);
    let calls = h.api.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0],
        ApiCall::Create { kind: InteractionResponseType::ChannelMessageWithSource, .. }
    ));
    let embed = first_embed(calls[0].data().unwrap()).unwrap();
    assert_eq!(embed.color, Some(MessageStyle::Error.color()));
}

#[tokio::test]
async fn failure_after_reply_edits_the_reply() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(dm_command("failinglate", Vec::new())).await;

    assert_eq!(outcome, DispatchOutcome::HandlerFailed);
    let calls = h.api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], ApiCall::Update(_)));
    assert_eq!(
        calls[1].description().as_deref(),
        Some("⚠ **Something went wrong while running the command, the command might have not worked fully!**")
    );
}

#[tokio::test]
async fn panicking_handler_does_not_escape_dispatch() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(dm_command("panicking", Vec::new())).await;

    assert_eq!(outcome, DispatchOutcome::HandlerFailed);
    assert_eq!(h.api.calls().len(), 1);

    // The router keeps working afterwards.
    assert_eq!(
        h.router.dispatch(dm_command("failing", Vec::new())).await,
        DispatchOutcome::HandlerFailed
    );
}

#[tokio::test]
async fn unclaimed_components_are_ignored() {
    let h = Harness::new(&all());

    let outcome = h.router.dispatch(button_press("1:confirm".into(), INVOKER)).await;

    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert!(h.api.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_run_the_handler_once() {
    const CALLERS: usize = 16;
    let h = Harness::new(&all());

    let mut running = Vec::with_capacity(CALLERS);
    for _ in 0..CALLERS {
        let router = h.router.clone();
        running.push(tokio::spawn(async move {
            router.dispatch(dm_command("slow", Vec::new())).await
        }));
    }

    let mut completed = 0;
    let mut throttled = 0;
    for task in running {
        match task.await.unwrap() {
            DispatchOutcome::Completed => completed += 1,
            DispatchOutcome::Throttled(_) => throttled += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(completed, 1);
    assert_eq!(throttled, CALLERS - 1);
    assert_eq!(SLOW_RUNS.load(Ordering::SeqCst), 1);
    assert_eq!(h.api.calls().len(), CALLERS);
}
