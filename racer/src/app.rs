//! # Runner Logic
//!
//! Sets up logging, loads the layout and configuration, picks the policy and
//! rolls out episodes on a [`HeadlessTrack`].
//!
//! Configuration reloads are only looked at between episodes. A file that
//! fails to parse or validate is reported and the current configuration
//! stays in effect.

use crate::watcher::{self, ConfigWatcher};
use crate::{Args, Key, PolicyKind};
use anyhow::{bail, Context, Result};
use layout::procedural::RingTrack;
use layout::TrackLayout;
use racer::HeadlessTrack;
use rl::{Env, HeuristicPolicy, Keys, LinearPolicy, Policy, RandomPolicy, Rollout};
use std::path::Path;
use track::TrackConfig;
use tracing::Level;

/// Run the episodes requested on the command line.
///
/// # Errors
///
/// Returns an error if the layout, configuration or policy weights cannot be
/// loaded, or if the controller rejects them.
pub fn run(args: &Args) -> Result<()> {
    init_logging(args);

    let layout = load_layout(args)?;
    let mut config = match &args.config {
        Some(path) => TrackConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TrackConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut env = HeadlessTrack::new(&layout, config)?;
    let mut policy = build_policy(args, &env)?;

    let config_watcher = args.config.as_deref().and_then(|path| match watcher::start(path) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::error!("Config hot-reload disabled: {e:?}");
            None
        }
    });

    tracing::info!(
        "Running {} episodes ({} checkpoints, {} obstacles, policy {:?})",
        args.episodes,
        layout.checkpoints.len(),
        layout.obstacle_count,
        args.policy
    );

    let mut rollout = Rollout::new(args.max_steps);
    let mut returns = Vec::with_capacity(args.episodes);
    for _ in 0..args.episodes {
        if let (Some(w), Some(path)) = (&config_watcher, &args.config) {
            reload_if_changed(w, path, args.seed, &mut env, &mut rollout);
        }

        let stats = rollout.run_episode(&mut env, policy.as_mut());
        let cause = env.last_step().cause;
        tracing::info!(
            "Episode {}: {} steps, return {:+.4}, ended by {}",
            rollout.episodes(),
            stats.steps,
            stats.total_reward,
            cause.map_or_else(|| "step budget".to_string(), |c| format!("{c:?}"))
        );
        returns.push(stats.total_reward);
    }

    if !returns.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let mean = returns.iter().sum::<f32>() / returns.len() as f32;
        let best = returns.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        tracing::info!("Mean return {mean:+.4}, best {best:+.4}");
    }
    let mut causes: Vec<_> = env.termination_counts().iter().collect();
    causes.sort_by_key(|(cause, _)| format!("{cause:?}"));
    for (cause, count) in causes {
        tracing::info!("{cause:?}: {count}");
    }

    Ok(())
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        Level::WARN
    } else {
        match args.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn load_layout(args: &Args) -> Result<TrackLayout> {
    if let Some(path) = &args.layout {
        return TrackLayout::from_path(path);
    }
    let ring = RingTrack {
        obstacles: args.obstacles,
        ..RingTrack::default()
    };
    let layout = ring.build();
    layout.validate()?;
    Ok(layout)
}

fn build_policy(args: &Args, env: &HeadlessTrack) -> Result<Box<dyn Policy>> {
    let policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Heuristic => Box::new(HeuristicPolicy::new(keys(&args.keys))),
        PolicyKind::Random => Box::new(RandomPolicy::new(
            env.action_size(),
            args.seed.unwrap_or(0),
        )),
        PolicyKind::Linear => {
            let Some(path) = &args.weights else {
                bail!("--policy linear needs --weights");
            };
            let policy = LinearPolicy::from_path(path)?;
            if policy.in_dim != env.obs_size() || policy.out_dim != env.action_size() {
                bail!(
                    "policy is {}x{}, environment needs {}x{}",
                    policy.out_dim,
                    policy.in_dim,
                    env.action_size(),
                    env.obs_size()
                );
            }
            Box::new(policy)
        }
    };
    Ok(policy)
}

fn keys(held: &[Key]) -> Keys {
    let mut keys = Keys::default();
    for key in held {
        match key {
            Key::Up => keys.up = true,
            Key::Down => keys.down = true,
            Key::Left => keys.left = true,
            Key::Right => keys.right = true,
            Key::Space => keys.space = true,
        }
    }
    keys
}

fn reload_if_changed(
    w: &ConfigWatcher,
    path: &Path,
    seed: Option<u64>,
    env: &mut HeadlessTrack,
    rollout: &mut Rollout,
) {
    if !w.take_change() {
        return;
    }
    let result = TrackConfig::from_path(path).and_then(|mut config| {
        if seed.is_some() {
            config.seed = seed;
        }
        env.reconfigure(config, rollout)
    });
    match result {
        Ok(()) => tracing::info!("Reloaded {}; applies from the next episode", path.display()),
        Err(e) => tracing::warn!("Ignoring invalid config {}: {e}", path.display()),
    }
}
