//! Tests for the Type Registry
//!
//! These tests verify:
//! - id -> name -> id round trips for every valid id
//! - Numeric token parsing and range checks
//! - Name lookup order with duplicate names
//! - Unknown / empty input handling

use bufsync::types::{TypeId, TypeRegistry, MAX_TYPES, PRIMITIVE_TYPES, UNKNOWN_TYPE_NAME};

// =============================================================================
// Helper Functions
// =============================================================================

fn app_registry() -> TypeRegistry {
    TypeRegistry::builder()
        .register_all(["SubSetting", "Color", "Settings"])
        .build()
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_unknown_is_id_zero() {
    let types = TypeRegistry::default();

    assert_eq!(TypeId::UNKNOWN.as_u16(), 0);
    assert_eq!(types.name_of(TypeId::UNKNOWN), UNKNOWN_TYPE_NAME);
}

#[test]
fn test_default_has_primitives_only() {
    let types = TypeRegistry::default();

    assert_eq!(types.eof(), 1 + PRIMITIVE_TYPES.len());
    assert_eq!(types.name_of(TypeId::new(1)), "bool");
    assert_eq!(types.name_of(TypeId::new(22)), "uint64_t");
}

#[test]
fn test_app_types_follow_primitives() {
    let types = app_registry();
    let first_app = (1 + PRIMITIVE_TYPES.len()) as u16;

    assert_eq!(types.id_of("SubSetting"), TypeId::new(first_app));
    assert_eq!(types.id_of("Color"), TypeId::new(first_app + 1));
    assert_eq!(types.id_of("Settings"), TypeId::new(first_app + 2));
    assert_eq!(types.eof(), first_app as usize + 3);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_name_id_round_trip_for_all_ids() {
    let types = app_registry();

    for raw in 0..types.eof() as u16 {
        let id = TypeId::new(raw);
        assert_eq!(types.id_of(types.name_of(id)), id, "round trip failed for {}", raw);
    }
}

#[test]
fn test_numeric_token_round_trip() {
    let types = app_registry();

    for (id, _) in types.iter() {
        assert_eq!(types.id_of(&id.to_string()), id);
    }
}

// =============================================================================
// Numeric Token Tests
// =============================================================================

#[test]
fn test_numeric_out_of_range_is_unknown() {
    let types = app_registry();

    assert_eq!(types.id_of(&types.eof().to_string()), TypeId::UNKNOWN);
    assert_eq!(types.id_of("999"), TypeId::UNKNOWN);
    assert_eq!(types.id_of("99999999999999"), TypeId::UNKNOWN);
}

#[test]
fn test_numeric_uses_leading_digits() {
    let types = TypeRegistry::default();

    assert_eq!(types.id_of("3abc"), TypeId::new(3));
    assert_eq!(types.id_of("007"), TypeId::new(7));
}

#[test]
fn test_name_of_out_of_range() {
    let types = TypeRegistry::default();

    assert_eq!(types.name_of(TypeId::new(500)), UNKNOWN_TYPE_NAME);
    assert!(!types.contains(TypeId::new(500)));
}

// =============================================================================
// Name Lookup Tests
// =============================================================================

#[test]
fn test_empty_token_is_unknown() {
    let types = app_registry();

    assert_eq!(types.id_of(""), TypeId::UNKNOWN);
}

#[test]
fn test_unregistered_name_is_unknown() {
    let types = app_registry();

    assert_eq!(types.id_of("Missing"), TypeId::UNKNOWN);
    assert_eq!(types.id_of("settings"), TypeId::UNKNOWN); // exact match only
}

#[test]
fn test_names_with_spaces() {
    let types = TypeRegistry::default();

    assert_eq!(types.name_of(types.id_of("unsigned long long")), "unsigned long long");
}

#[test]
fn test_duplicate_name_resolves_to_highest_id() {
    let types = TypeRegistry::builder()
        .register("Thing")
        .register("Other")
        .register("Thing")
        .build();

    let highest = TypeId::new((types.eof() - 1) as u16);
    assert_eq!(types.id_of("Thing"), highest);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_registry_capped_at_u16_ids() {
    let builtin = 1 + PRIMITIVE_TYPES.len();
    let names: Vec<String> = (0..MAX_TYPES + 10).map(|i| format!("T{}", i)).collect();

    let types = TypeRegistry::builder().register_all(names).build();

    assert_eq!(types.eof(), MAX_TYPES);
    let last = format!("T{}", MAX_TYPES - 1 - builtin);
    assert_eq!(types.id_of(&last), TypeId::new(u16::MAX));
    assert_eq!(types.name_of(TypeId::new(u16::MAX)), last);
    // Names past the last id are dropped, not wrapped onto low ids
    let dropped = format!("T{}", MAX_TYPES - builtin);
    assert_eq!(types.id_of(&dropped), TypeId::UNKNOWN);
    assert_eq!(types.name_of(TypeId::new(0)), UNKNOWN_TYPE_NAME);
}
