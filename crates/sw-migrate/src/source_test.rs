use super::*;
use crate::migration::SimpleMigration;

fn names(source: &dyn MigrationSource, versions: std::ops::RangeInclusive<Version>) -> Vec<String> {
    versions
        .filter_map(|v| source.get_migration(v).map(|m| m.name().to_string()))
        .collect()
}

#[test]
fn test_slice_maps_version_to_index() {
    let migrations = vec![
        SimpleMigration::new("first", "SELECT 1"),
        SimpleMigration::new("second", "SELECT 2"),
    ];
    let source = migrations.as_slice();

    assert!(source.get_migration(0).is_none());
    assert_eq!(source.get_migration(1).unwrap().name(), "first");
    assert_eq!(source.get_migration(2).unwrap().name(), "second");
    assert!(source.get_migration(3).is_none());
}

#[test]
fn test_list_versions_follow_push_order() {
    let list = MigrationList::new()
        .with(SimpleMigration::new("initial", "SELECT 1"))
        .with(SimpleMigration::reversible("images", "SELECT 2", "SELECT 3"));

    assert_eq!(list.len(), 2);
    assert!(!list.is_empty());
    assert_eq!(list.latest_version(), 2);
    assert_eq!(names(&list, 0..=3), vec!["initial", "images"]);
}

#[test]
fn test_empty_list() {
    let list = MigrationList::new();
    assert!(list.is_empty());
    assert_eq!(list.latest_version(), 0);
    assert!(list.get_migration(1).is_none());
}

#[test]
fn test_list_debug_shows_names() {
    let mut list = MigrationList::new();
    list.push(SimpleMigration::new("initial", "SELECT 1"));
    assert_eq!(format!("{list:?}"), r#"["initial"]"#);
}

#[test]
fn test_fn_source_builds_on_demand() {
    let source = from_fn(|version| {
        (version % 2 == 1).then(|| {
            Box::new(SimpleMigration::new(format!("odd_{version}"), "SELECT 1"))
                as Box<dyn Migration>
        })
    });

    assert_eq!(source.get_migration(1).unwrap().name(), "odd_1");
    assert!(source.get_migration(2).is_none());
    assert_eq!(source.get_migration(7).unwrap().name(), "odd_7");
}

#[test]
fn test_reference_and_box_sources_delegate() {
    let list = MigrationList::new().with(SimpleMigration::new("only", "SELECT 1"));
    let by_ref = &list;
    assert_eq!(by_ref.get_migration(1).unwrap().name(), "only");

    let boxed: Box<dyn MigrationSource> = Box::new(list);
    assert_eq!(boxed.get_migration(1).unwrap().name(), "only");
    assert!(boxed.get_migration(2).is_none());
}
