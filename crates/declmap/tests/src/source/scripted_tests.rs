use super::*;
use crate::model::TypeKind;

#[test]
fn stream_ends_with_empty_declaration() {
    let mut source = ScriptedSource::new();
    source.leaf(DeclarationKind::Struct, "A");

    let first = source.next();
    assert_eq!(first.qualified_name, "A");
    assert_eq!(first.identifier, "A");
    assert!(!first.is_empty());

    assert!(source.next().is_empty());
    assert!(source.next().is_empty());
    assert!(source.current_cursor_stack().is_empty());
}

#[test]
fn open_and_close_track_ancestors() {
    let mut source = ScriptedSource::new();
    source
        .open(DeclarationKind::Namespace, "geo")
        .open(DeclarationKind::Struct, "geo::Shape")
        .leaf(DeclarationKind::Field, "geo::Shape::id")
        .close()
        .leaf(DeclarationKind::Struct, "geo::Point")
        .close();

    let names = |source: &ScriptedSource| -> Vec<String> {
        source.current_cursor_stack().iter().map(|d| d.identifier.clone()).collect()
    };

    source.next();
    assert!(names(&source).is_empty());
    source.next();
    assert_eq!(names(&source), vec!["geo"]);
    let field = source.next();
    assert_eq!(field.identifier, "id");
    assert_eq!(names(&source), vec!["geo", "Shape"]);
    source.next();
    assert_eq!(names(&source), vec!["geo"]);
}

#[test]
fn per_declaration_queries_follow_the_script() {
    let mut source = ScriptedSource::new();
    source
        .leaf(DeclarationKind::Field, "A::x")
        .with_type(DeclaredType::new("int", TypeKind::Int))
        .with_visibility(Visibility::Protected);

    let field = source.next();
    assert_eq!(source.declared_type(&field).kind, TypeKind::Int);
    assert_eq!(source.visibility(&field), Visibility::Protected);
    assert_eq!(source.method_flags(&field), MethodFlags::default());
    assert_eq!(source.visibility(&Declaration::default()), Visibility::Invalid);
}

#[test]
fn type_queries_default_to_fixed_points() {
    let mut source = ScriptedSource::new();
    source.open(DeclarationKind::Struct, "A").close();
    let alias = DeclaredType::new("Id", TypeKind::Typedef);
    let int = DeclaredType::new("int", TypeKind::Int);
    source.define_type("Id", TypeInfo::alias_of(int.clone()));

    assert_eq!(source.canonical_type(&alias), int);
    assert_eq!(source.canonical_type(&int), int);
    assert!(source.element_type(&int).identifier.is_empty());

    let a = DeclaredType::new("A", TypeKind::Struct);
    assert_eq!(source.type_declaration(&a).kind, DeclarationKind::Struct);
    assert!(source.type_declaration(&int).is_empty());
    assert!(source.is_const_qualified(&a.clone().with_const(true)));
}

#[test]
fn rewind_replays_the_stream() {
    let mut source = ScriptedSource::new();
    source.leaf(DeclarationKind::Namespace, "n");
    assert!(!source.next().is_empty());
    assert!(source.next().is_empty());

    source.rewind();
    assert_eq!(source.next().qualified_name, "n");
}
