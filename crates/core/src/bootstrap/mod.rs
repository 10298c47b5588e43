//! Startup: load the external libraries stage by stage, then wire the
//! components together and hand back the runtime.

use crate::{
    assets::DependencyLoader,
    audio::{SoundEffectPlayer, ToneSink},
    backdrop::ParticleBackdrop,
    config::{Dependency, DependencyConfig},
    cursor::PointerFollower,
    runtime::HeroRuntime,
    scene::{HeroElements, Page},
    sequencer::{HeroEffects, PhraseSequencer},
    AppConfig, Result, TypewriterError,
};

/// Loads every stage in order. A stage only starts once the previous one
/// has fully loaded; the first failure stops the whole plan.
pub fn load_dependencies<L>(plan: &DependencyConfig, loader: &L) -> Result<()>
where
    L: DependencyLoader + ?Sized,
{
    for (index, stage) in plan.stages.iter().enumerate() {
        load_stage(stage, loader)?;
        tracing::debug!(stage = index, libraries = stage.len(), "dependency stage loaded");
    }
    Ok(())
}

/// Loads the libraries of one stage jointly. Errors are reported in
/// declaration order regardless of which thread finished first.
fn load_stage<L>(stage: &[Dependency], loader: &L) -> Result<()>
where
    L: DependencyLoader + ?Sized,
{
    let results: Vec<Result<()>> = std::thread::scope(|scope| {
        let handles: Vec<_> = stage
            .iter()
            .map(|dependency| scope.spawn(move || loader.load(dependency)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(TypewriterError::msg("dependency loader thread panicked")))
            })
            .collect()
    });

    for (dependency, result) in stage.iter().zip(results) {
        result?;
        tracing::info!(name = %dependency.name, "library loaded");
    }
    Ok(())
}

/// Brings the hero animation up on `page`.
///
/// Missing elements and failed library loads abort startup. A backdrop that
/// cannot be created is logged and skipped. The sequence itself waits for
/// the visibility trigger.
pub fn launch<L>(
    config: &AppConfig,
    page: &Page,
    loader: &L,
    sink: Box<dyn ToneSink>,
) -> Result<HeroRuntime>
where
    L: DependencyLoader + ?Sized,
{
    config.validate()?;
    let elements = HeroElements::resolve(page, &config.selectors).map_err(|err| {
        tracing::error!(%err, "required page elements missing, aborting");
        err
    })?;

    load_dependencies(&config.dependencies, loader).map_err(|err| {
        tracing::error!(%err, "dependency loading failed, aborting startup");
        err
    })?;
    tracing::info!("all libraries loaded");

    let mut follower = PointerFollower::new(config.cursor.clone());
    follower.init();

    let backdrop = match ParticleBackdrop::init(
        config.backdrop.clone(),
        page.viewport(),
        page.supports_graphics(),
    ) {
        Ok(mut backdrop) => {
            backdrop.start();
            Some(backdrop)
        }
        Err(err) if !err.is_fatal_to_startup() => {
            tracing::error!(%err, "continuing without the 3D backdrop");
            None
        }
        Err(err) => return Err(err),
    };

    let sound = SoundEffectPlayer::new(config.audio.clone(), sink);
    let sequencer = PhraseSequencer::new(config, elements, HeroEffects::new(sound, backdrop))?;
    let runtime = HeroRuntime::new(sequencer, follower, config.frame_interval_ms);
    tracing::info!("hero animation ready, controls available");
    Ok(runtime)
}
