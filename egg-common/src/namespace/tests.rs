//! Tests for the namespace registry

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

const MAP_SCHEMA: &str = "\
// map commands
#define CMD_MAP_sprite 0x61 /* u16:pos u16:spriteid */
#define CMD_MAP_door 0x22
#define CMD_MAP_broken 0x23 /* no end
#define NS_dir_north 1
#define NS_dir_south 2
#define NS_dir_north 9
";

fn registry(text: &str) -> Registry {
    let mut registry = Registry::new();
    registry.add_schema_text("test", text);
    registry
}

fn schema_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_command_with_argspec() {
    let mut registry = registry(MAP_SCHEMA);
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Opcode, "MAP", "sprite")
            .unwrap(),
        0x61
    );
    let space = registry.namespace(NamespaceMode::Opcode, "MAP").unwrap();
    let entry = space.entry("sprite").unwrap();
    assert_eq!(entry.argspec.as_deref(), Some("u16:pos u16:spriteid"));
    assert_eq!(space.tid, Some(CoreTid::Map.tid()));
}

#[test]
fn test_unterminated_comment_ignored() {
    let mut registry = registry(MAP_SCHEMA);
    let err = registry
        .lookup_value_from_name(NamespaceMode::Opcode, "MAP", "broken")
        .unwrap_err();
    assert!(matches!(err, NamespaceError::UnknownSymbol { .. }));
    assert!(err.is_lookup_miss());
}

#[test]
fn test_namespace_names_ignore_case() {
    let mut registry = registry(MAP_SCHEMA);
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Opcode, "map", "door")
            .unwrap(),
        0x22
    );
    assert!(
        registry
            .lookup_value_from_name(NamespaceMode::Opcode, "map", "DOOR")
            .is_err()
    );
}

#[test]
fn test_first_definition_wins() {
    let mut registry = registry(MAP_SCHEMA);
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "north")
            .unwrap(),
        1
    );
    assert_eq!(registry.namespace(NamespaceMode::Value, "dir").unwrap().len(), 2);
}

#[test]
fn test_modes_are_separate() {
    let mut registry = registry(MAP_SCHEMA);
    assert!(matches!(
        registry.lookup_value_from_name(NamespaceMode::Value, "MAP", "sprite"),
        Err(NamespaceError::UnknownNamespace {
            mode: NamespaceMode::Value,
            ..
        })
    ));
}

#[test]
fn test_name_from_value() {
    let mut registry = registry(MAP_SCHEMA);
    assert_eq!(
        registry
            .lookup_name_from_value(NamespaceMode::Value, "dir", 2)
            .unwrap(),
        "south"
    );
    assert!(matches!(
        registry.lookup_name_from_value(NamespaceMode::Value, "dir", 9),
        Err(NamespaceError::UnknownValue { id: 9, .. })
    ));
}

#[test]
fn test_lazy_loading() {
    let mut registry = registry(MAP_SCHEMA);
    assert!(registry.namespaces().is_empty());
    registry.require().unwrap();
    assert_eq!(registry.namespaces().len(), 2);
}

#[test]
fn test_sources_load_in_order() {
    let mut registry = Registry::new();
    registry.add_schema_text("a", "#define NS_dir_up 1\n");
    registry.add_schema_text("b", "#define NS_dir_up 2\n#define NS_dir_down 3\n");
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "up")
            .unwrap(),
        1
    );
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "down")
            .unwrap(),
        3
    );
}

#[test]
fn test_tid_declaration_binds_commands() {
    let mut registry = registry(
        "#define NS_tid_hero 130\n\
         #define CMD_hero_jump 0x01\n\
         #define CMD_villain_run 0x02\n\
         #define NS_tid_villain 131\n",
    );
    registry.require().unwrap();
    let hero = registry.command_schema(130, None).unwrap();
    assert_eq!(hero.name, "hero");

    // Declared after its commands, so only reachable by name.
    assert!(registry.command_schema(131, None).is_none());
    let villain = registry.command_schema(131, Some("villain")).unwrap();
    assert_eq!(villain.value_of("run"), Some(2));
}

#[test]
fn test_tid_declaration_in_custom_range_not_bound() {
    let mut registry = registry("#define NS_tid_levels 20\n#define CMD_levels_exit 0x02\n");
    registry.require().unwrap();
    assert!(registry.command_schema(20, None).is_none());
    let levels = registry.command_schema(17, Some("levels")).unwrap();
    assert_eq!(levels.tid, None);
}

#[test]
fn test_schema_file() {
    let file = schema_file(MAP_SCHEMA);
    let mut registry = Registry::new();
    registry.add_schema_file(file.path());
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "south")
            .unwrap(),
        2
    );
}

#[test]
fn test_missing_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = Registry::new();
    registry.add_schema_file(dir.path().join("absent.h"));
    let err = registry.require().unwrap_err();
    assert!(matches!(err, NamespaceError::Io { .. }));
    assert!(!err.is_lookup_miss());
}

#[test]
fn test_flush_forgets_sources() {
    let mut registry = registry(MAP_SCHEMA);
    registry.require().unwrap();
    registry.flush();
    assert!(
        registry
            .lookup_value_from_name(NamespaceMode::Opcode, "MAP", "door")
            .is_err()
    );
}

#[test]
fn test_volatile_reload() {
    let file = schema_file("#define NS_dir_up 1\n");
    let mut registry = Registry::new();
    registry.set_volatile(true);
    registry.add_schema_file(file.path());
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "up")
            .unwrap(),
        1
    );

    std::fs::write(file.path(), "#define NS_dir_up 7\n").unwrap();
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "up")
            .unwrap(),
        1
    );

    registry.flush();
    assert_eq!(
        registry
            .lookup_value_from_name(NamespaceMode::Value, "dir", "up")
            .unwrap(),
        7
    );
}
