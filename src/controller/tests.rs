use std::any::Any;

use pretty_assertions::assert_eq;

use super::*;
use crate::config::ControllerConfig;
use crate::error::{DispatchError, SetupError};
use crate::rules::RuleSet;
use crate::signature::MethodSignature;
use crate::target::{ClassRegistry, TargetClass};
use crate::validation::{ErrorBag, Validated, ValidationEngine};
use crate::value::{Fields, Value};

/// Fixture target. Every method records the arguments it received.
#[derive(Debug, Default)]
struct Test {
    param: Value,
    received: Vec<Value>,
    ready: bool,
}

const RETURNS_TRUE: &[&str] = &[
    "noParams()",
    "stringParam(param: string)",
    "intParam(param: int)",
    "floatParam(param: float)",
    "boolParam(param: bool)",
    "arrayParam(param: array)",
    "objectParam(param: stdClass)",
    "untypedParam(param)",
    "multipleParams(param, param2, param3)",
    "mixedParam(param: mixed)",
    "intOrFloatParam(param: int|float)",
    "stringOrNullParam(param: ?string)",
    "mixedParamWithDefault(param = null)",
    "mixedParamWithDefaultAndVariadic(param = null, ...other)",
    "stringVariadicParam(...param: string)",
    "intVariadicParam(...param: int)",
    "floatVariadicParam(...param: float)",
    "boolVariadicParam(...param: bool)",
    "arrayVariadicParam(...param: array)",
    "objectVariadicParam(...param: stdClass)",
    "mixedVariadicParam(...param: mixed)",
    "variadicParam(...param)",
];

fn test_class() -> TargetClass {
    let mut builder = TargetClass::builder("Test", Test::default)
        .constructor("param = null", |args| {
            Ok(Test {
                param: args.into_iter().next().unwrap_or_default(),
                ..Test::default()
            })
        })
        .unwrap();

    for signature in RETURNS_TRUE {
        builder = builder
            .method(signature, |test: &mut Test, args: Vec<Value>| {
                test.received = args;
                Ok(Value::Bool(true))
            })
            .unwrap();
    }

    builder
        .method("sum(...values: int)", |_: &mut Test, args: Vec<Value>| {
            Ok(Value::Int(args.iter().filter_map(Value::as_i64).sum()))
        })
        .unwrap()
        .method("describe()", |test: &mut Test, _| Ok(test.param.clone()))
        .unwrap()
        .method("throwsException()", |_: &mut Test, _| {
            Err("Exception thrown".to_string())
        })
        .unwrap()
        .build()
}

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.register(test_class());
    registry
}

struct TestClassController;

impl ControllerDefinition for TestClassController {}

fn controller() -> ClassController {
    ClassController::new(&TestClassController, &registry()).unwrap()
}

fn error_messages(reply: &Reply, field: &str) -> Vec<String> {
    reply
        .json_body()
        .and_then(|body| body.get("errors"))
        .and_then(|errors| errors.get(field))
        .and_then(|messages| messages.as_array())
        .map(|messages| messages.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

fn first_error(reply: &Reply, field: &str) -> String {
    reply
        .json_body()
        .and_then(|body| body.get("errors"))
        .and_then(|errors| errors.get(field))
        .and_then(|messages| messages.as_array())
        .and_then(|messages| messages.first())
        .and_then(|message| message.as_str())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_target_is_inferred_from_controller_name() {
    let controller = controller();
    assert_eq!(controller.class_name(), "Test");
    assert!(controller.instance::<Test>().is_some());
    assert!(controller.instance::<String>().is_none());
}

#[test]
fn test_controller_without_suffix_is_not_configured() {
    struct UserController;
    impl ControllerDefinition for UserController {}

    let err = ClassController::new(&UserController, &registry()).unwrap_err();
    assert_eq!(err, SetupError::not_configured("ClassController"));
}

#[test]
fn test_unknown_class_is_reported() {
    let err = ClassController::for_class("NotFoundClass", &registry()).unwrap_err();
    assert_eq!(err.to_string(), "The class NotFoundClass does not exist.");
}

#[test]
fn test_explicit_class_wins_over_name() {
    struct OtherClassController;
    impl ControllerDefinition for OtherClassController {
        fn inherited_class(&self) -> Option<&str> {
            Some("Test")
        }
    }

    let controller = ClassController::new(&OtherClassController, &registry()).unwrap();
    assert_eq!(controller.class_name(), "Test");
}

#[test]
fn test_explicit_only_config_disables_inference() {
    let err = ClassController::with_config(
        &TestClassController,
        &registry(),
        &ControllerConfig::explicit_only(),
    )
    .unwrap_err();
    assert!(matches!(err, SetupError::TargetNotConfigured { .. }));
}

#[test]
fn test_custom_suffix() {
    struct TestEndpoint;
    impl ControllerDefinition for TestEndpoint {}

    let config = ControllerConfig {
        controller_suffix: "Endpoint".to_string(),
        ..ControllerConfig::default()
    };
    let controller = ClassController::with_config(&TestEndpoint, &registry(), &config).unwrap();
    assert_eq!(controller.class_name(), "Test");
}

#[test]
fn test_class_parameters_reach_the_constructor() {
    struct SeededTestClassController;
    impl ControllerDefinition for SeededTestClassController {
        fn inherited_class(&self) -> Option<&str> {
            Some("Test")
        }
        fn class_parameters(&self) -> Vec<Value> {
            vec![Value::from("seed")]
        }
    }

    let mut controller = ClassController::new(&SeededTestClassController, &registry()).unwrap();
    assert_eq!(controller.instance::<Test>().unwrap().param, Value::from("seed"));
    let reply = controller.call(&InboundCall::json("describe")).unwrap();
    assert_eq!(reply.json_body(), Some(&Value::from("seed")));
}

#[test]
fn test_missing_constructor_argument() {
    struct Billing;
    let mut registry = ClassRegistry::new();
    registry.register(
        TargetClass::builder("Billing", || Billing)
            .constructor("gateway: string", |_| Ok(Billing))
            .unwrap()
            .build(),
    );

    let err = ClassController::for_class("Billing", &registry).unwrap_err();
    assert_eq!(err, SetupError::missing_argument("Billing", "gateway", 1));
    let message = err.to_string();
    assert!(message.contains("requires the parameter gateway"));
    assert!(message.contains("the 1 parameter"));
}

#[test]
fn test_failing_constructor_is_a_setup_error() {
    struct Broken;
    let mut registry = ClassRegistry::new();
    registry.register(
        TargetClass::builder("Broken", || Broken)
            .constructor("", |_| Err::<Broken, _>("no database".to_string()))
            .unwrap()
            .build(),
    );

    let err = ClassController::for_class("Broken", &registry).unwrap_err();
    assert_eq!(err, SetupError::construction_failed("Broken", "no database"));
}

#[test]
fn test_post_class_setup_runs_once_on_new_instance() {
    struct ReadyTestClassController;
    impl ControllerDefinition for ReadyTestClassController {
        fn inherited_class(&self) -> Option<&str> {
            Some("Test")
        }
        fn post_class_setup(&self, instance: &mut dyn Any) -> Result<(), String> {
            let test = instance
                .downcast_mut::<Test>()
                .ok_or_else(|| "not a Test".to_string())?;
            test.ready = true;
            Ok(())
        }
    }

    let controller = ClassController::new(&ReadyTestClassController, &registry()).unwrap();
    assert!(controller.instance::<Test>().unwrap().ready);
}

#[test]
fn test_failing_post_class_setup() {
    struct RefusingClassController;
    impl ControllerDefinition for RefusingClassController {
        fn inherited_class(&self) -> Option<&str> {
            Some("Test")
        }
        fn post_class_setup(&self, _instance: &mut dyn Any) -> Result<(), String> {
            Err("refused".to_string())
        }
    }

    let err = ClassController::new(&RefusingClassController, &registry()).unwrap_err();
    assert!(matches!(err, SetupError::ConstructionFailed { .. }));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_no_params_returns_true() {
    let reply = controller().call(&InboundCall::json("noParams")).unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.json_body(), Some(&Value::Bool(true)));
}

#[test]
fn test_missing_required_param() {
    let reply = controller().call(&InboundCall::json("intParam")).unwrap();
    assert_eq!(reply.status(), 422);
    assert!(first_error(&reply, "param").contains("required"));
}

#[test]
fn test_every_required_param_reports_one_required_error() {
    let mut controller = controller();
    let mut checked = 0;

    for text in RETURNS_TRUE {
        let signature = MethodSignature::parse(text).unwrap();
        let required: Vec<&str> = signature
            .parameters()
            .iter()
            .filter(|p| !p.has_default())
            .map(|p| p.name())
            .collect();
        if required.is_empty() {
            continue;
        }
        checked += 1;

        let reply = controller.call(&InboundCall::json(signature.name())).unwrap();
        assert_eq!(reply.status(), 422, "{}", text);
        for name in &required {
            let messages = error_messages(&reply, name);
            assert_eq!(messages.len(), 1, "{} {}", text, name);
            assert!(messages[0].contains("required"), "{} {}", text, name);
        }

        let reply = controller.call(&InboundCall::form(signature.name())).unwrap();
        assert_eq!(reply.status(), 302, "{}", text);
        match reply.flash() {
            Some(Flash::Errors(errors)) => {
                for name in &required {
                    let messages = errors.get(name).unwrap_or_default();
                    assert_eq!(messages.len(), 1, "{} {}", text, name);
                    assert!(messages[0].contains("required"), "{} {}", text, name);
                }
            }
            other => panic!("Expected flashed errors for {}, got {:?}", text, other),
        }
    }

    assert_eq!(checked, RETURNS_TRUE.len() - 2);
}

#[test]
fn test_class_typed_param_accepts_a_string() {
    let mut controller = controller();
    let call = InboundCall::json("objectParam").with_field("param", "anything");
    assert!(controller.call(&call).unwrap().is_success());
    assert_eq!(
        controller.instance::<Test>().unwrap().received,
        vec![Value::from("anything")]
    );
}

#[test]
fn test_union_rejects_string() {
    let call = InboundCall::json("intOrFloatParam").with_field("param", "abc");
    let reply = controller().call(&call).unwrap();
    assert_eq!(reply.status(), 422);
    assert!(first_error(&reply, "param").contains("must be a type of integer or float"));
}

#[test]
fn test_union_accepts_each_member() {
    let mut controller = controller();
    for value in [Value::Int(1), Value::Float(1.5)] {
        let call = InboundCall::json("intOrFloatParam").with_field("param", value.clone());
        assert!(controller.call(&call).unwrap().is_success());
        assert_eq!(controller.instance::<Test>().unwrap().received, vec![value]);
    }
}

#[test]
fn test_exception_becomes_400() {
    let mut controller = controller();
    for call in [
        InboundCall::json("throwsException"),
        InboundCall::form("throwsException"),
    ] {
        let reply = controller.call(&call).unwrap();
        assert_eq!(reply.status(), 400);
        assert!(reply.message().unwrap_or_default().contains("Exception thrown"));
    }
}

#[test]
fn test_unknown_method() {
    let mut controller = controller();
    let err = controller.call(&InboundCall::json("nope")).unwrap_err();
    assert_eq!(err, DispatchError::unknown_method("Test", "nope"));

    let reply = controller.handle(&InboundCall::json("nope"));
    assert_eq!(reply.status(), 500);
    assert_eq!(reply.message(), Some("Method nope does not exist in class Test"));
}

#[test]
fn test_each_primitive_is_checked() {
    let cases = [
        ("stringParam", Value::Int(1), "The param must be a string."),
        ("intParam", Value::from("x"), "The param must be an integer."),
        ("floatParam", Value::from("x"), "The param must be a number."),
        ("boolParam", Value::from("x"), "The param field must be true or false."),
        ("arrayParam", Value::Int(1), "The param must be an array."),
        ("objectParam", Value::Int(1), "The param must be a string."),
    ];
    let mut controller = controller();
    for (method, value, message) in cases {
        let call = InboundCall::json(method).with_field("param", value);
        let reply = controller.call(&call).unwrap();
        assert!(reply.is_unprocessable(), "{}", method);
        assert_eq!(first_error(&reply, "param"), message);
    }
}

#[test]
fn test_untyped_and_mixed_accept_anything_present() {
    let mut controller = controller();
    for method in ["untypedParam", "mixedParam"] {
        let call = InboundCall::json(method).with_field("param", Value::Array(vec![Value::Int(1)]));
        assert!(controller.call(&call).unwrap().is_success(), "{}", method);
        assert!(controller.call(&InboundCall::json(method)).unwrap().is_unprocessable());
    }
}

#[test]
fn test_multiple_params_arrive_in_declaration_order() {
    let mut controller = controller();
    let call = InboundCall::json("multipleParams")
        .with_field("param3", 3)
        .with_field("param", 1)
        .with_field("param2", 2);
    assert!(controller.call(&call).unwrap().is_success());
    assert_eq!(
        controller.instance::<Test>().unwrap().received,
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_default_param_may_be_omitted() {
    let mut controller = controller();
    assert!(controller
        .call(&InboundCall::json("mixedParamWithDefault"))
        .unwrap()
        .is_success());
    assert_eq!(controller.instance::<Test>().unwrap().received, vec![Value::Null]);
}

#[test]
fn test_nullable_union_is_still_required() {
    let reply = controller()
        .call(&InboundCall::json("stringOrNullParam"))
        .unwrap();
    assert!(first_error(&reply, "param").contains("required"));

    let call = InboundCall::json("stringOrNullParam").with_field("param", "text");
    assert!(controller().call(&call).unwrap().is_success());
}

#[test]
fn test_variadic_values_are_spread_and_coerced() {
    let mut controller = controller();
    let call = InboundCall::json("sum")
        .with_field("values", Value::Array(vec![Value::from("1"), Value::Int(2), Value::Int(3)]));
    let reply = controller.call(&call).unwrap();
    assert_eq!(reply.json_body(), Some(&Value::Int(6)));
}

#[test]
fn test_variadic_element_errors_name_the_index() {
    let call = InboundCall::json("intVariadicParam")
        .with_field("param", Value::Array(vec![Value::Int(1), Value::from("two")]));
    let reply = controller().call(&call).unwrap();
    assert_eq!(first_error(&reply, "param.1"), "The param.1 must be an integer.");
}

#[test]
fn test_variadic_requires_an_array() {
    let mut controller = controller();
    let scalar = InboundCall::json("variadicParam").with_field("param", "one");
    assert_eq!(
        first_error(&controller.call(&scalar).unwrap(), "param"),
        "The param must be an array."
    );
    let missing = controller.call(&InboundCall::json("variadicParam")).unwrap();
    assert!(first_error(&missing, "param").contains("required"));
}

#[test]
fn test_optional_param_before_variadic() {
    let mut controller = controller();
    let call = InboundCall::json("mixedParamWithDefaultAndVariadic")
        .with_field("other", Value::Array(vec![Value::Int(1), Value::Int(2)]));
    assert!(controller.call(&call).unwrap().is_success());
    assert_eq!(
        controller.instance::<Test>().unwrap().received,
        vec![Value::Null, Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn test_route_parameters_override_body() {
    let mut controller = controller();
    let call = InboundCall::json("intParam")
        .with_field("param", "body")
        .merge_route_parameters([("param", 7)]);
    assert!(controller.call(&call).unwrap().is_success());
    assert_eq!(controller.instance::<Test>().unwrap().received, vec![Value::Int(7)]);
}

#[test]
fn test_form_callers_are_redirected_back() {
    let mut controller = controller();

    let ok = controller.call(&InboundCall::form("noParams")).unwrap();
    assert_eq!(ok.status(), 302);
    assert_eq!(ok.flash(), Some(&Flash::Success(Value::Bool(true))));

    let invalid = controller.call(&InboundCall::form("intParam")).unwrap();
    assert_eq!(invalid.status(), 302);
    match invalid.flash() {
        Some(Flash::Errors(errors)) => {
            assert_eq!(errors.first("param"), Some("The param field is required."))
        }
        other => panic!("Expected flashed errors, got {:?}", other),
    }
}

#[test]
fn test_custom_validation_engine() {
    struct RejectEverything;
    impl ValidationEngine for RejectEverything {
        fn validate(&self, _input: &Fields, _rules: &RuleSet) -> Validated {
            let mut errors = ErrorBag::new();
            errors.add("input", "rejected");
            Validated {
                fields: Fields::new(),
                errors,
            }
        }
    }

    let mut controller = controller().with_validator(RejectEverything);
    let reply = controller.call(&InboundCall::json("noParams")).unwrap();
    assert_eq!(first_error(&reply, "input"), "rejected");
}

#[test]
fn test_instance_state_survives_between_calls() {
    let mut controller = controller();
    controller.instance_mut::<Test>().unwrap().param = Value::Int(9);
    let reply = controller.call(&InboundCall::json("describe")).unwrap();
    assert_eq!(reply.json_body(), Some(&Value::Int(9)));
}

#[test]
fn test_describe_parameters_on_fixture() {
    use crate::signature::{describe_constructor_parameters, describe_parameters, PrimitiveKind};

    let class = test_class();
    let params = describe_parameters(&class, "mixedParamWithDefaultAndVariadic").unwrap();
    assert_eq!(params.len(), 2);
    assert!(params[0].has_default());
    assert!(params[1].is_variadic());
    assert_eq!(params[1].types(), &[PrimitiveKind::Any]);

    let union = describe_parameters(&class, "intOrFloatParam").unwrap();
    assert_eq!(union[0].types(), &[PrimitiveKind::Integer, PrimitiveKind::Float]);

    assert!(describe_parameters(&class, "nope").is_none());
    assert_eq!(describe_constructor_parameters(&class).map(|p| p.len()), Some(1));
}
