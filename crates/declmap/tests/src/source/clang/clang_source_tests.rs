use super::*;
use crate::model::Location;

const SHAPES_JSON: &str = include_str!("../../../fixtures/shapes.ast.json");
const SHAPES_HPP: &str = "/work/geo/shapes.hpp";

const BOXES_JSON: &str = include_str!("../../../fixtures/boxes.ast.json");

fn shapes() -> ClangSource {
    ClangSource::from_json(SHAPES_JSON, Path::new(SHAPES_HPP)).expect("fixture parses")
}

fn boxes() -> ClangSource {
    ClangSource::from_json(BOXES_JSON, Path::new("/work/geo/boxes.hpp")).expect("fixture parses")
}

/// Advance the stream to `qualified_name` and return it.
fn seek(
    source: &mut ClangSource,
    qualified_name: &str,
) -> Declaration {
    source.rewind();
    loop {
        let declaration = source.next();
        assert!(!declaration.is_empty(), "{qualified_name} not in stream");
        if declaration.qualified_name == qualified_name {
            return declaration;
        }
    }
}

fn declared(
    source: &mut ClangSource,
    qualified_name: &str,
) -> DeclaredType {
    let declaration = seek(source, qualified_name);
    source.declared_type(&declaration)
}

#[test]
fn stream_follows_source_order_and_skips_noise() {
    let source = shapes();

    let stream: Vec<_> = source.declarations().map(|d| (d.kind, d.qualified_name.as_str())).collect();

    assert_eq!(
        stream,
        vec![
            (DeclarationKind::Namespace, "geo"),
            (DeclarationKind::Struct, "geo::Point"),
            (DeclarationKind::Field, "geo::Point::x"),
            (DeclarationKind::Field, "geo::Point::y"),
            (DeclarationKind::Class, "geo::Shape"),
            (DeclarationKind::Method, "geo::Shape::area"),
            (DeclarationKind::Method, "geo::Shape::scale"),
            (DeclarationKind::Parameter, "geo::Shape::scale::factor"),
            (DeclarationKind::Field, "geo::Shape::origin"),
            (DeclarationKind::Field, "geo::Shape::next"),
            (DeclarationKind::Field, "geo::Shape::color"),
            (DeclarationKind::Field, "geo::Shape::corners"),
            (DeclarationKind::Field, "geo::Shape::id"),
            (DeclarationKind::Struct, "geo::Circle"),
            (DeclarationKind::BaseSpecifier, "geo::Shape"),
            (DeclarationKind::Field, "geo::Circle::radius"),
            (DeclarationKind::Field, "geo::Circle::center"),
            (DeclarationKind::Field, "geo::Circle::flags"),
        ]
    );
}

#[test]
fn locations_come_from_the_dump() {
    let mut source = shapes();

    let next = seek(&mut source, "geo::Shape::next");

    assert_eq!(next.identifier, "next");
    assert_eq!(next.location, Location::new(SHAPES_HPP, 14, 12));
}

#[test]
fn cursor_stack_lists_enclosing_scopes() {
    let mut source = shapes();

    seek(&mut source, "geo::Shape::scale::factor");
    let stack: Vec<_> = source.current_cursor_stack().iter().map(|d| d.qualified_name.as_str()).collect();
    assert_eq!(stack, vec!["geo", "geo::Shape", "geo::Shape::scale"]);

    seek(&mut source, "geo::Circle");
    let base = source.next();
    assert_eq!(base.kind, DeclarationKind::BaseSpecifier);
    assert_eq!(base.identifier, "Shape");
    assert_eq!(source.enclosing_stack_names(), vec!["geo", "geo::Circle"]);
}

#[test]
fn member_visibility_tracks_access_specifiers() {
    let mut source = shapes();

    let cases = [
        ("geo::Point::x", Visibility::Public),
        ("geo::Shape::area", Visibility::Public),
        ("geo::Shape::corners", Visibility::Public),
        ("geo::Shape::id", Visibility::Private),
        ("geo::Circle::radius", Visibility::Public),
        ("geo::Point", Visibility::Invalid),
    ];
    for (name, expected) in cases {
        let declaration = seek(&mut source, name);
        assert_eq!(source.visibility(&declaration), expected, "{name}");
    }
}

#[test]
fn field_types_are_qualified_and_classified() {
    let mut source = shapes();

    let cases = [
        ("geo::Point::x", "float", TypeKind::Float, 0),
        ("geo::Shape::origin", "geo::Point", TypeKind::Struct, 0),
        ("geo::Shape::next", "geo::Shape *", TypeKind::Pointer, 1),
        ("geo::Shape::color", "geo::Color", TypeKind::Enum, 0),
        ("geo::Shape::corners", "geo::Vec2[4]", TypeKind::ConstantArray, 1),
        ("geo::Circle::center", "geo::Vec2", TypeKind::Typedef, 0),
        ("geo::Circle::flags", "uint32_t", TypeKind::Typedef, 0),
    ];
    for (name, identifier, kind, dimensions) in cases {
        let ty = declared(&mut source, name);
        assert_eq!(ty.identifier, identifier, "{name}");
        assert_eq!(ty.kind, kind, "{name}");
        assert_eq!(ty.dimensions, dimensions, "{name}");
    }
}

#[test]
fn methods_report_return_type_and_flags() {
    let mut source = shapes();

    let area = seek(&mut source, "geo::Shape::area");
    assert_eq!(source.declared_type(&area), DeclaredType::new("double", TypeKind::Double));
    let flags = source.method_flags(&area);
    assert!(flags.is_virtual && flags.is_const);
    assert!(!flags.is_pure && !flags.is_static && !flags.is_ctor);

    let scale = seek(&mut source, "geo::Shape::scale");
    assert_eq!(source.declared_type(&scale).kind, TypeKind::Void);
    assert_eq!(source.method_flags(&scale), MethodFlags::default());
}

#[test]
fn canonical_type_strips_one_alias_layer() {
    let source = shapes();

    let vec2 = DeclaredType::new("geo::Vec2", TypeKind::Typedef);
    assert_eq!(source.canonical_type(&vec2), DeclaredType::new("geo::Point", TypeKind::Struct));

    let corners = DeclaredType::new("geo::Vec2[4]", TypeKind::ConstantArray).with_dimensions(1);
    let stripped = source.canonical_type(&corners);
    assert_eq!(stripped.identifier, "geo::Point[4]");
    assert_eq!(stripped.kind, TypeKind::ConstantArray);
    assert_eq!(source.canonical_type(&stripped), stripped);

    let flags = DeclaredType::new("uint32_t", TypeKind::Typedef);
    assert_eq!(source.canonical_type(&flags), DeclaredType::new("unsigned int", TypeKind::UInt));

    let point = DeclaredType::new("geo::Point", TypeKind::Struct);
    assert_eq!(source.canonical_type(&point), point);
}

#[test]
fn element_type_peels_one_layer() {
    let source = shapes();

    let next = DeclaredType::new("geo::Shape *", TypeKind::Pointer).with_dimensions(1);
    assert_eq!(source.element_type(&next), DeclaredType::new("geo::Shape", TypeKind::Struct));

    let corners = DeclaredType::new("geo::Vec2[4]", TypeKind::ConstantArray).with_dimensions(1);
    assert_eq!(source.element_type(&corners), DeclaredType::new("geo::Vec2", TypeKind::Typedef));

    assert_eq!(source.element_type(&DeclaredType::new("int", TypeKind::Int)), DeclaredType::default());
}

#[test]
fn type_declaration_finds_records_only_as_structures() {
    let source = shapes();

    let point = source.type_declaration(&DeclaredType::new("geo::Point", TypeKind::Struct));
    assert_eq!(point.kind, DeclarationKind::Struct);
    assert_eq!(point.qualified_name, "geo::Point");

    let timespec = source.type_declaration(&DeclaredType::new("timespec", TypeKind::Struct));
    assert_eq!(timespec.kind, DeclarationKind::Struct);
    assert_eq!(timespec.location.file, "/usr/include/time.h");

    let color = source.type_declaration(&DeclaredType::new("geo::Color", TypeKind::Enum));
    assert_eq!(color.kind, DeclarationKind::Unsupported);
    assert_eq!(color.qualified_name, "geo::Color");

    assert!(source.type_declaration(&DeclaredType::new("geo::Shape *", TypeKind::Pointer)).is_empty());
    assert!(source.type_declaration(&DeclaredType::new("Missing", TypeKind::Struct)).is_empty());
}

#[test]
fn const_qualification_reads_the_spelling() {
    let source = shapes();

    assert!(source.is_const_qualified(&DeclaredType::new("const geo::Point", TypeKind::Struct)));
    assert!(source.is_const_qualified(&DeclaredType::new("char *const", TypeKind::Pointer)));
    assert!(!source.is_const_qualified(&DeclaredType::new("const char *", TypeKind::Pointer)));
}

#[test]
fn malformed_json_is_reported_with_its_path() {
    let result = ClangSource::from_json("{\"kind\": ", Path::new("broken.hpp"));

    match result {
        Err(SourceError::InvalidJson {
            path,
            ..
        }) => assert_eq!(path, PathBuf::from("broken.hpp")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed JSON accepted"),
    }
}

#[test]
fn specializations_are_records_named_by_their_arguments() {
    let mut source = boxes();

    let stream: Vec<_> = source.declarations().map(|d| (d.kind, d.qualified_name.as_str())).collect();
    assert_eq!(
        stream,
        vec![
            (DeclarationKind::Namespace, "geo"),
            (DeclarationKind::Struct, "geo::User"),
            (DeclarationKind::Struct, "geo::Box"),
            (DeclarationKind::Field, "geo::Box::value"),
            (DeclarationKind::Struct, "geo::Box<int>"),
            (DeclarationKind::Field, "geo::Box<int>::value"),
            (DeclarationKind::Struct, "geo::Box<char>"),
            (DeclarationKind::Field, "geo::Box<char>::tag"),
            (DeclarationKind::Field, "geo::Box<char>::size"),
            (DeclarationKind::Struct, "geo::Box<type-parameter-0-0 *>"),
            (DeclarationKind::Field, "geo::Box<type-parameter-0-0 *>::target"),
            (DeclarationKind::Struct, "geo::User"),
            (DeclarationKind::Field, "geo::User::held"),
            (DeclarationKind::Field, "geo::User::tagged"),
        ]
    );

    seek(&mut source, "geo::Box<int>::value");
    assert_eq!(source.enclosing_stack_names(), vec!["geo", "geo::Box<int>"]);
}

#[test]
fn type_declaration_prefers_the_definition_over_a_forward_declaration() {
    let source = boxes();

    let user = source.type_declaration(&DeclaredType::new("geo::User", TypeKind::Struct));
    assert_eq!(user.kind, DeclarationKind::Struct);
    assert_eq!(user.location.line, 6);

    let boxed = source.type_declaration(&DeclaredType::new("geo::Box<int>", TypeKind::Struct));
    assert_eq!(boxed.identifier, "Box<int>");
}

#[test]
fn oversized_locations_saturate() {
    let json = r#"{
        "id": "0x1",
        "kind": "TranslationUnitDecl",
        "loc": {},
        "inner": [
            {
                "id": "0x2",
                "kind": "CXXRecordDecl",
                "loc": { "offset": 0, "file": "big.hpp", "line": 5000000000, "col": 8, "tokLen": 3 },
                "name": "Big",
                "tagUsed": "struct",
                "completeDefinition": true
            }
        ]
    }"#;
    let source = ClangSource::from_json(json, Path::new("big.hpp")).expect("parses");

    let big = source.declarations().next().expect("one record");
    assert_eq!(big.location, Location::new("big.hpp", u32::MAX, 8));
}

impl ClangSource {
    fn enclosing_stack_names(&self) -> Vec<&str> {
        self.current_cursor_stack().iter().map(|d| d.qualified_name.as_str()).collect()
    }
}
