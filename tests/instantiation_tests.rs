// tests/instantiation_tests.rs
//! Integration tests for template instantiation.
//!
//! Each fixture is parsed and instantiated end to end; the checks look at
//! generated names, substituted signatures and declaration order.


use idlwrap::{
    CollisionPolicy, InstantiationError, InstantiatorOptions, Instantiator, RenderConventions,
    WrapError, parse, wrap,
};
use test_harness::{TestHarness, class, forward_declaration, function, namespace};

#[test]
fn test_non_templated_file_passes_through() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("geometry.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    assert_eq!(
        gtsam.names(),
        vec!["Point2", "Pose3", "Side", "kTolerance", "dimension"]
    );
    let point = class(gtsam, "Point2");
    assert!(point.instantiation.is_none());
    assert_eq!(point.cpp_name(), "gtsam::Point2");
    assert_eq!(point.methods[4].args.to_cpp()[0], "const gtsam::Point2&");

    let vector = &point.methods[2].return_type.type1;
    assert_eq!(vector.to_cpp(), "Vector");
    assert_eq!(vector.to_cpp_with(&RenderConventions::gtsam()), "const gtsam::Vector&");
}

#[test]
fn test_declaration_order() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    assert_eq!(
        gtsam.names(),
        vec![
            "Pose2",
            "Pose3",
            "FunDoublePose2",
            "FunDoublePose3",
            "FunFloatPose2",
            "FunFloatPose3",
            "ValuesBasis",
            "ContainerString",
            "addDouble",
            "addInt",
            "WrapperPose3",
        ]
    );
}

#[test]
fn test_class_instances() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let fun = class(gtsam, "FunFloatPose3");
    assert_eq!(fun.cpp_name(), "gtsam::Fun<float, gtsam::Pose3>");
    assert_eq!(fun.ctors[0].name, "FunFloatPose3");
    assert_eq!(fun.ctors[0].args.to_cpp(), vec!["float", "const gtsam::Pose3&"]);

    let methods: Vec<&str> = fun.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["first", "second", "swap", "countInt", "countSize_t"]);

    let first = fun.methods[0].clone();
    assert_eq!(first.owner.to_cpp(), "gtsam::Fun<float, gtsam::Pose3>");
    assert_eq!(first.owner, fun.cpp_type());
    assert_eq!(fun.methods[0].return_type.type1.name(), "float");
    assert_eq!(fun.methods[1].return_type.type1.canonical(), "gtsam::Pose3");

    let swap = &fun.methods[2];
    assert_eq!(swap.return_type.type1.canonical(), "gtsam::Fun<float, gtsam::Pose3>");
    assert_eq!(swap.args.to_cpp(), vec!["const gtsam::Fun<float, gtsam::Pose3>&"]);

    let count = &fun.methods[4];
    assert_eq!(count.return_type.type1.name(), "size_t");
    assert_eq!(count.args.to_cpp(), vec!["const float&", "gtsam::Pose3"]);
    assert_eq!(count.cpp_name(), "count<size_t>");
}

#[test]
fn test_member_templates() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let values = class(gtsam, "ValuesBasis");
    let methods: Vec<&str> = values.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["insertVector", "insertMatrix", "all"]);
    assert_eq!(
        values.methods[2].return_type.to_cpp(),
        "std::vector<std::shared_ptr<gtsam::Basis>>"
    );
    assert_eq!(values.static_methods[0].name, "staticMethodDouble");

    let container = class(gtsam, "ContainerString");
    assert_eq!(container.ctors.len(), 1);
    assert_eq!(container.ctors[0].name, "ContainerStringDouble");
    // Declared order `Container(C x, const U& param)`: class binding first,
    // then the ctor's own. gtwrap emits the same order.
    assert_eq!(container.ctors[0].args.to_cpp(), vec!["string", "const double&"]);
}

#[test]
fn test_scoped_and_self_references() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let wrapper = class(gtsam, "WrapperPose3");
    assert_eq!(
        wrapper.parent.as_ref().map(|p| p.canonical()).as_deref(),
        Some("gtsam::Base<gtsam::Pose3>")
    );
    assert_eq!(wrapper.methods[0].return_type.type1.canonical(), "gtsam::Pose3::Value");
    assert_eq!(
        wrapper.methods[1].return_type.type1.canonical(),
        "gtsam::Wrapper<gtsam::Pose3>::Key"
    );
    assert_eq!(wrapper.properties[0].ctype.canonical(), "gtsam::Pose3");
    assert_eq!(
        wrapper.operators[0].args.to_cpp(),
        vec!["const gtsam::Wrapper<gtsam::Pose3>&"]
    );
}

#[test]
fn test_function_instances() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("templates.i");
    let gtsam = namespace(result.assert_success(), "gtsam");

    let add = function(gtsam, "addInt");
    assert_eq!(add.cpp_name(), "add<int>");
    assert_eq!(add.args.to_cpp(), vec!["const int&", "int"]);
    assert_eq!(add.return_type.type1.name(), "int");
}

#[test]
fn test_typedef_expansion() {
    let harness = TestHarness::new();
    let result = harness.load_and_wrap("typedefs.i");
    let module = result.assert_success();

    assert_eq!(module.names(), vec!["gtsam", "PairPoints"]);
    let gtsam = namespace(module, "gtsam");
    assert_eq!(
        gtsam.names(),
        vec!["FactorFromAnotherMother", "noise", "convertIntDouble", "FactorWeCanUse"]
    );

    let pair = class(namespace(module, "gtsam::noise"), "PairDoublePose3");
    assert_eq!(pair.cpp_name(), "gtsam::Pair<double, gtsam::Pose3>");
    assert_eq!(pair.ctors[0].name, "PairDoublePose3");
    assert_eq!(
        pair.ctors[0].args.to_cpp(),
        vec!["const double&", "const gtsam::Pose3&"]
    );

    let points = class(module, "PairPoints");
    assert_eq!(points.cpp_name(), "gtsam::Pair<gtsam::Point2, gtsam::Point3>");
    assert_eq!(points.methods[1].return_type.type1.canonical(), "gtsam::Point3");

    let convert = function(gtsam, "convertIntDouble");
    assert_eq!(convert.cpp_name(), "convert<int,double>");
    assert_eq!(convert.return_type.type1.name(), "double");

    let factor = forward_declaration(gtsam, "FactorWeCanUse");
    assert_eq!(factor.to_cpp(), "gtsam::FactorFromAnotherMother<gtsam::Pose3>");
}

#[test]
fn test_instantiation_is_repeatable() {
    let harness = TestHarness::new();
    let source = harness.load("templates.i");
    let generic = parse(&source).unwrap();
    let before = generic.clone();

    let instantiator = Instantiator::default();
    let first = instantiator.instantiate(&generic).unwrap();
    let snapshot = first.clone();
    let second = instantiator.instantiate(&generic).unwrap();

    assert_eq!(generic, before);
    assert_eq!(first, snapshot);
    assert_eq!(first, second);
}

#[test]
fn test_collision_policy() {
    let source = "
        namespace a { class Pose3 {}; }
        namespace b { class Pose3 {}; }
        template<T = {a::Pose3, b::Pose3}> class Factor {};
    ";
    let module = wrap(source).unwrap();
    assert_eq!(module.names(), vec!["a", "b", "FactorPose3", "FactorPose3"]);

    let options = InstantiatorOptions::new().with_collision_policy(CollisionPolicy::Error);
    let err = idlwrap::wrap_with(source, options).unwrap_err();
    let WrapError::Instantiation(InstantiationError::NameCollision { name, first, second, .. }) = &err
    else {
        panic!("expected a name collision, got {err:?}");
    };
    assert_eq!(name, "FactorPose3");
    assert_eq!(first, "Factor<a::Pose3>");
    assert_eq!(second, "Factor<b::Pose3>");
}

#[test]
fn test_run_failures() {
    let err = wrap("template<T = {int}> This make(T x);").unwrap_err();
    assert!(matches!(
        err,
        WrapError::Instantiation(InstantiationError::UnresolvedSelfReference { .. })
    ));

    let err = wrap("template<T, U> class Pair {};\ntypedef Pair<int> PairInt;").unwrap_err();
    assert!(matches!(
        err,
        WrapError::Instantiation(InstantiationError::TemplateArityMismatch { expected: 2, got: 1, .. })
    ));
    assert_eq!(err.span().map(|s| s.line), Some(2));

    let err = wrap("namespace a { typedef Missing<int> MissingInt; }").unwrap_err();
    assert!(err.is_instantiation());
}
