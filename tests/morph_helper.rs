//! Integration tests for `MorphHelper::apply_weights`.
//!
//! Every test runs against the dummy backend, which records the vertex
//! buffers, geometry, and weights the helper hands to the renderer.

mod common;

use glam::Vec4;
use rstest::rstest;

use common::{weights, EntityFixture, TestContext, INDEX_COUNT, VERTEX_COUNT};
use redlilium_morph::asset::PrimitiveMode;
use redlilium_morph::backend::{BackendError, PrimitiveTopology, VertexAttributeSemantic};
use redlilium_morph::{Entity, MorphCacheStats, MorphConfig, MorphError};

const E1: Entity = Entity::from_raw(1);
const E2: Entity = Entity::from_raw(2);

// ============================================================================
// Direct Path
// ============================================================================

#[rstest]
#[case::none(&[], Vec4::ZERO)]
#[case::three(&[0.5, 0.5, 0.5], Vec4::new(0.5, 0.5, 0.5, 0.0))]
#[case::four(&[0.25, 0.0, 1.0, 0.75], Vec4::new(0.25, 0.0, 1.0, 0.75))]
fn test_few_weights_set_uniform_directly(#[case] input: &[f32], #[case] expected: Vec4) {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 4, 1)]);
    ctx.apply(E1, input).unwrap();

    assert_eq!(ctx.backend.renderable_state(E1).unwrap().weights, expected);
    assert_eq!(ctx.helper.cache_len(), 0);
    assert_eq!(ctx.helper.stats(), MorphCacheStats::default());
    assert_eq!(ctx.backend.created_count(), 0);
    assert_eq!(ctx.backend.geometry_update_count(), 0);
}

// ============================================================================
// Variant Cache
// ============================================================================

#[test]
fn test_repeated_weights_hit_cache() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 8, 2)]);
    let input = weights(8, &[1, 3, 5, 7]);

    ctx.apply(E1, &input).unwrap();
    let first = ctx.backend.renderable_state(E1).unwrap().clone();
    ctx.apply(E1, &input).unwrap();
    let second = ctx.backend.renderable_state(E1).unwrap().clone();

    assert_eq!(first.geometry, second.geometry);
    assert_eq!(first.geometry.len(), 2);
    assert_eq!(ctx.backend.created_count(), 2);
    assert_eq!(ctx.backend.geometry_update_count(), 4);
    assert_eq!(
        ctx.helper.stats(),
        MorphCacheStats {
            hits: 1,
            misses: 1,
            buffers_created: 2
        }
    );
    assert_eq!(
        second.weights,
        Vec4::new(input[1], input[3], input[5], input[7])
    );
}

#[test]
fn test_geometry_draws_full_index_range() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 1)]);
    ctx.apply(E1, &weights(6, &[0, 1, 2, 3])).unwrap();

    let geometry = ctx.backend.renderable_state(E1).unwrap().geometry[0].unwrap();
    assert_eq!(geometry.topology, PrimitiveTopology::TriangleList);
    assert_eq!(geometry.offset, 0);
    assert_eq!(geometry.count, INDEX_COUNT);
}

#[test]
fn test_same_targets_in_different_rank_share_variant() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 10, 1)]);
    ctx.apply(E1, &weights(10, &[2, 4, 6, 8])).unwrap();
    ctx.apply(E1, &weights(10, &[8, 6, 4, 2])).unwrap();

    assert_eq!(ctx.helper.cache_len(), 1);
    assert_eq!(ctx.helper.stats().hits, 1);
}

#[test]
fn test_oscillating_combinations_build_once_each() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 10, 1)]);
    let a = weights(10, &[0, 1, 2, 3]);
    let b = weights(10, &[6, 7, 8, 9]);
    for _ in 0..3 {
        ctx.apply(E1, &a).unwrap();
        ctx.apply(E1, &b).unwrap();
    }

    assert_eq!(ctx.helper.cache_len(), 2);
    assert_eq!(ctx.backend.created_count(), 2);
    assert_eq!(ctx.helper.stats().misses, 2);
    assert_eq!(ctx.helper.stats().hits, 4);
}

#[test]
fn test_entities_get_separate_variants() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 1), EntityFixture::new(2, 6, 3)]);
    let input = weights(6, &[0, 2, 3, 5]);
    ctx.apply(E1, &input).unwrap();
    ctx.apply(E2, &input).unwrap();

    assert_eq!(ctx.helper.cache_len(), 2);
    assert_eq!(ctx.backend.created_count(), 4);

    let e1 = ctx.backend.renderable_state(E1).unwrap().geometry[0].unwrap();
    let e2 = ctx.backend.renderable_state(E2).unwrap().geometry[0].unwrap();
    assert_ne!(e1.vertices, e2.vertices);
}

#[test]
fn test_all_zero_weights_build_variant_without_targets() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 1)]);
    ctx.apply(E1, &[0.0; 6]).unwrap();

    let state = ctx.backend.renderable_state(E1).unwrap();
    assert_eq!(state.weights, Vec4::ZERO);
    let handle = state.geometry[0].unwrap().vertices;
    let descriptor = &ctx.backend.vertex_buffer(handle).unwrap().descriptor;
    assert!(!descriptor.has_semantic(VertexAttributeSemantic::MorphPosition(0)));
}

#[test]
fn test_weights_past_limit_are_ignored() {
    let config = MorphConfig {
        max_weights: 6,
        ..MorphConfig::default()
    };
    let mut ctx = TestContext::with_config(&[EntityFixture::new(1, 6, 1)], config);
    // The large trailing weights are past the limit and never selected.
    let mut input = weights(6, &[0, 1, 2, 3]);
    input.extend([5.0, 5.0]);
    ctx.apply(E1, &input).unwrap();

    let state = ctx.backend.renderable_state(E1).unwrap();
    assert_eq!(
        state.weights,
        Vec4::new(input[0], input[1], input[2], input[3])
    );
}

// ============================================================================
// Synthesized Layout
// ============================================================================

#[test]
fn test_variant_layout() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 8, 1)]);
    ctx.apply(E1, &weights(8, &[1, 2, 5, 6])).unwrap();

    let handle = ctx.backend.renderable_state(E1).unwrap().geometry[0]
        .unwrap()
        .vertices;
    let buffer = ctx.backend.vertex_buffer(handle).unwrap();
    let descriptor = &buffer.descriptor;

    assert_eq!(descriptor.label.as_deref(), Some("morph:1:0"));
    assert_eq!(descriptor.vertex_count, VERTEX_COUNT);
    for ordinal in 0..4 {
        assert!(descriptor.has_semantic(VertexAttributeSemantic::MorphPosition(ordinal)));
        assert!(descriptor.has_semantic(VertexAttributeSemantic::MorphTangents(ordinal)));
    }

    // The quad has UV0 but neither UV1 nor colors: both read one dummy slot.
    let uv1 = descriptor.attribute(VertexAttributeSemantic::Uv1).unwrap();
    let color = descriptor.attribute(VertexAttributeSemantic::Color).unwrap();
    assert_eq!(uv1.buffer_index, color.buffer_index);
    let dummy = buffer.slots[uv1.buffer_index as usize].as_ref().unwrap();
    assert_eq!(dummy.len(), 4 * VERTEX_COUNT as usize);

    // Every slot received data.
    assert_eq!(descriptor.buffer_count as usize, buffer.slots.len());
    assert!(buffer.slots.iter().all(Option::is_some));
}

#[test]
fn test_labels_can_be_disabled() {
    let config = MorphConfig {
        label_buffers: false,
        ..MorphConfig::default()
    };
    let mut ctx = TestContext::with_config(&[EntityFixture::new(1, 6, 1)], config);
    ctx.apply(E1, &weights(6, &[0, 1, 2, 3])).unwrap();

    let handle = ctx.backend.renderable_state(E1).unwrap().geometry[0]
        .unwrap()
        .vertices;
    assert_eq!(ctx.backend.vertex_buffer(handle).unwrap().descriptor.label, None);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_teardown_destroys_each_buffer_once() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 12, 2), EntityFixture::new(2, 12, 3)]);
    for hot in [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11], [0, 1, 2, 3]] {
        ctx.apply(E1, &weights(12, &hot)).unwrap();
        ctx.apply(E2, &weights(12, &hot)).unwrap();
    }
    assert_eq!(ctx.helper.cache_len(), 6);
    assert_eq!(ctx.backend.created_count(), 3 * 2 + 3 * 3);

    let backend = ctx.teardown();
    assert_eq!(backend.destroyed_count(), 15);
    assert_eq!(backend.invalid_destroy_count(), 0);
    assert_eq!(backend.live_buffer_count(), 0);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_failed_miss_releases_partial_variant() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 3)]);
    ctx.backend.fail_builds_after(2);

    let result = ctx.apply(E1, &weights(6, &[0, 1, 2, 3]));
    assert!(matches!(
        result,
        Err(MorphError::Backend(BackendError::OutOfMemory))
    ));
    assert_eq!(ctx.helper.cache_len(), 0);
    assert_eq!(ctx.backend.created_count(), 2);
    assert_eq!(ctx.backend.destroyed_count(), 2);
    assert_eq!(ctx.backend.live_buffer_count(), 0);
    assert_eq!(ctx.backend.geometry_update_count(), 0);

    let backend = ctx.teardown();
    assert_eq!(backend.destroyed_count(), 2);
    assert_eq!(backend.invalid_destroy_count(), 0);
}

#[test]
fn test_missing_renderable() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 1)]);
    let stranger = Entity::from_raw(42);
    assert!(matches!(
        ctx.apply(stranger, &[0.5; 3]),
        Err(MorphError::MissingRenderable(e)) if e == stranger
    ));
}

#[test]
fn test_renderable_outside_asset() {
    let mut ctx = TestContext::new(&[EntityFixture::new(1, 6, 1)]);
    let stranger = Entity::from_raw(42);
    ctx.backend.add_renderable(stranger);

    assert!(matches!(
        ctx.apply(stranger, &weights(6, &[0, 1, 2, 3])),
        Err(MorphError::UnknownEntity(e)) if e == stranger
    ));
    assert_eq!(ctx.helper.cache_len(), 0);
}

#[test]
fn test_unsupported_topology() {
    let fixture = EntityFixture::new(1, 6, 2).with_mode(PrimitiveMode::TriangleFan);
    let mut ctx = TestContext::new(&[fixture]);

    assert!(matches!(
        ctx.apply(E1, &weights(6, &[0, 1, 2, 3])),
        Err(MorphError::UnsupportedTopology(PrimitiveMode::TriangleFan))
    ));
    assert_eq!(ctx.backend.created_count(), 0);
}
