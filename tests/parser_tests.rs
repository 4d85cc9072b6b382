// tests/parser_tests.rs
//! Integration tests for the interface parser.
//!
//! These tests parse complete interface files and check the generic tree
//! before any template is expanded.


use idlwrap::ast::{Declaration, Indirection, OperatorSymbol};
use idlwrap::{ParseErrorKind, parse, parse_type};
use test_harness::{TestHarness, class, namespace};

#[test]
fn test_geometry_declarations() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("geometry.i");
    let module = result.assert_success();

    assert!(matches!(&module.content()[0], Declaration::Include(i) if i.path == "gtsam/geometry/Point2.h"));
    let gtsam = namespace(module, "gtsam");
    assert_eq!(
        gtsam.names(),
        vec!["Point2", "Pose3", "Side", "kTolerance", "dimension"]
    );
}

#[test]
fn test_class_members() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("geometry.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let point = class(gtsam, "Point2");
    assert_eq!(point.ctors.len(), 2);
    assert_eq!(point.ctors[1].args.names(), vec!["x", "y"]);
    let methods: Vec<&str> = point.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        methods,
        vec!["x", "y", "vector", "distance", "equals", "print"]
    );
    assert!(point.methods.iter().all(|m| m.is_const));
    assert_eq!(point.static_methods[0].name, "Identity");

    let equals = &point.methods[4];
    assert_eq!(equals.args.args[0].ctype.name(), "This");
    assert_eq!(equals.args.args[1].default.as_deref(), Some("1e-9"));
    assert_eq!(point.methods[5].args.args[0].default.as_deref(), Some("\"\""));

    assert_eq!(point.operators.len(), 2);
    assert_eq!(point.operators[0].symbol, OperatorSymbol::Add);
    assert!(!point.operators[0].is_unary());
    assert_eq!(point.operators[1].name(), "operator-");
    assert!(point.operators[1].is_unary());
}

#[test]
fn test_qualifiers_and_return_types() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("geometry.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let pose = class(gtsam, "Pose3");
    assert!(pose.is_virtual);
    assert_eq!(pose.parent.as_ref().map(|p| p.canonical()).as_deref(), Some("gtsam::Value"));

    let decompose = &pose.methods[1];
    assert!(decompose.return_type.is_pair());
    assert_eq!(decompose.return_type.to_cpp(), "std::pair<gtsam::Rot3, gtsam::Point3>");

    let inverse = &pose.methods[3];
    assert!(inverse.return_type.type1.is_shared_ptr());
    assert_eq!(inverse.return_type.to_cpp(), "std::shared_ptr<gtsam::Pose3>");
    assert_eq!(pose.methods[4].return_type.type1.indirection, Some(Indirection::RawPtr));

    let dunders: Vec<&str> = pose.dunder_methods.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(dunders, vec!["len", "contains"]);
}

#[test]
fn test_enums_and_variables() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("geometry.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let Declaration::Enum(side) = &gtsam.content[2] else {
        panic!("expected enum");
    };
    assert!(side.is_scoped);
    assert_eq!(side.enumerators, vec!["LEFT", "RIGHT"]);
    assert_eq!(side.namespaces, vec!["gtsam"]);

    let Declaration::Variable(tol) = &gtsam.content[3] else {
        panic!("expected variable");
    };
    assert!(tol.ctype.is_const);
    assert_eq!(tol.default.as_deref(), Some("1e-9"));
}

#[test]
fn test_templates_are_recorded() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let fun = class(gtsam, "Fun");
    let template = fun.template.as_ref().unwrap();
    assert_eq!(template.names(), vec!["X", "Y"]);
    assert_eq!(template.params[1].instantiations.len(), 2);
    assert_eq!(template.to_string(), "template<X = {double, float}, Y = {gtsam::Pose2, gtsam::Pose3}>");

    let count = &fun.methods[3];
    assert_eq!(count.template.as_ref().map(|t| t.names()), Some(vec!["Z".to_string()]));

    let values = class(gtsam, "Values");
    assert!(values.methods[0].template.is_some());
    assert!(values.static_methods[0].template.is_some());
    assert_eq!(values.methods[1].return_type.to_cpp(), "std::vector<std::shared_ptr<T>>");

    assert!(gtsam.function("add").unwrap().template.is_some());
}

#[test]
fn test_rendering_reparses() {
    let harness = TestHarness::new();
    for file in ["geometry.i", "templates.i", "typedefs.i"] {
        let result = harness.load_and_parse(file);
        let once = result.assert_success().to_string();
        let twice = parse(&once)
            .unwrap_or_else(|e| panic!("{file} rendering failed to parse: {e}\n{once}"))
            .to_string();
        assert_eq!(once, twice, "{file}");
    }
}

#[test]
fn test_type_properties() {
    let ty = parse_type("const gtsam::Pose3&").unwrap();
    assert_eq!(ty.name(), "Pose3");
    assert_eq!(ty.typename.namespaces, vec!["gtsam"]);
    assert!(ty.is_const);
    assert!(ty.is_ref());
    assert!(!ty.is_shared_ptr());
    assert!(!ty.is_ptr());

    for source in [
        "int",
        "unsigned char",
        "gtsam::PinholeCamera<gtsam::Cal3_S2>*",
        "std::vector<std::vector<gtsam::Point3>>",
        "Matrix<double, 3, 4>",
    ] {
        let ty = parse_type(source).unwrap();
        assert_eq!(parse_type(&ty.to_string()).unwrap(), ty, "{source}");
    }
}

#[test]
fn test_grammar_errors() {
    let err = parse("class Foo { void f() }").unwrap_err();
    let first = err.first().unwrap();
    assert_eq!(first.kind, ParseErrorKind::ExpectedToken);

    let err = parse("typedef Foo FooAlias;").unwrap_err();
    assert_eq!(err.first().unwrap().kind, ParseErrorKind::ExpectedTemplateArgs);

    let err = parse("void f(int x = (1, 2;").unwrap_err();
    assert_eq!(err.first().unwrap().kind, ParseErrorKind::MismatchedDelimiter);
}
