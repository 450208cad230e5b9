//! Context & Settings Tests
//!
//! Tests for:
//! - RenderContextRef identity
//! - ContextManager create/destroy bookkeeping
//! - Destroyed contexts and registry handles
//! - Process-wide settings installation

use strata::prelude::*;
use strata::settings;

// ============================================================================
// Context Identity Tests
// ============================================================================

#[test]
fn context_refs_are_unique_and_ordered() {
    let a = RenderContextRef::new();
    let b = RenderContextRef::new();
    assert_ne!(a, b);
    assert!(a < b);
    assert!(a.raw() > 0);
}

#[test]
fn manager_tracks_live_contexts() {
    let contexts = ContextManager::new();
    assert!(contexts.is_empty());

    let main = contexts.create_context(Some("main"));
    let offscreen = contexts.create_context(None);
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts.label(main).as_deref(), Some("main"));
    assert_eq!(contexts.label(offscreen).as_deref(), Some("RenderContext"));
    assert_eq!(contexts.live_contexts(), vec![main, offscreen]);

    assert!(contexts.destroy_context(main));
    assert!(!contexts.is_live(main));
    assert!(!contexts.destroy_context(main), "already destroyed");
    assert_eq!(contexts.live_contexts(), vec![offscreen]);
}

#[test]
fn destroyed_context_handles_are_forgotten_not_deleted() -> anyhow::Result<()> {
    let contexts = ContextManager::new();
    let (main, shared) = (
        contexts.create_context(Some("main")),
        contexts.create_context(Some("shared")),
    );
    let mut registry: ResourceRegistry<FloatBufferData, u32> =
        ResourceRegistry::new(RegistrySettings::multi());
    let positions = Tracked::new(FloatBufferData::from_slice(&[0.0; 9]).with_tuple_size(3));
    let id = registry.register(&positions)?;
    registry.put(id, main, 1)?;
    registry.put(id, shared, 2)?;

    contexts.destroy_context(shared);
    assert_eq!(registry.forget_context(shared), vec![(id, 2)]);

    drop(positions);
    let mut deleted = Vec::new();
    registry.cleanup(&mut |ctx: RenderContextRef, handle: u32| deleted.push((ctx, handle)));
    assert_eq!(deleted, vec![(main, 1)]);
    Ok(())
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn settings_parse_from_json() -> anyhow::Result<()> {
    let parsed: RegistrySettings = serde_json::from_str(r#"{ "context_mode": "multi" }"#)?;
    assert_eq!(parsed.context_mode, ContextMode::Multi);
    assert_eq!(parsed.initial_capacity, RegistrySettings::default().initial_capacity);
    Ok(())
}

// The only test in this binary that touches the process-wide settings.
#[test]
fn installed_settings_apply_to_default_registries() -> anyhow::Result<()> {
    assert!(settings::installed().is_none());
    settings::install(RegistrySettings::multi())?;

    assert_eq!(
        settings::install(RegistrySettings::single()).unwrap_err(),
        StrataError::SettingsAlreadyInstalled
    );
    assert_eq!(
        settings::installed().map(|s| s.context_mode),
        Some(ContextMode::Multi)
    );

    let registry: ResourceRegistry<FloatBufferData, u32> = ResourceRegistry::default();
    assert_eq!(registry.mode(), ContextMode::Multi);
    Ok(())
}
