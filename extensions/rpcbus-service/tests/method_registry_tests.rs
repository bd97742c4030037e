use rpcbus_service::{
    DescriptorKind, MethodDescriptor, MethodRegistry, MethodShape, RpcMethodRegistry,
    RpcServiceError,
};
use std::sync::Arc;

fn build_registry() -> RpcMethodRegistry {
    let mut registry = RpcMethodRegistry::new();
    registry
        .register(
            "echo.Echo/Say",
            MethodDescriptor::rpc("Say", "echo.SayRequest", MethodShape::Unary),
        )
        .unwrap();
    registry
        .register(
            "echo.Echo/Chat",
            MethodDescriptor::rpc("Chat", "echo.ChatRequest", MethodShape::BidiStreaming),
        )
        .unwrap();
    registry
}

#[test]
fn lookup_resolves_registered_descriptors() {
    let registry = build_registry();

    let say = registry.lookup("echo.Echo/Say").expect("Say not found");
    assert_eq!(say.name, "Say");
    assert_eq!(say.shape(), MethodShape::Unary);
    assert!(say.is_rpc_method());

    let chat = registry.lookup("echo.Echo/Chat").expect("Chat not found");
    assert!(chat.request_stream && chat.response_stream);

    assert!(registry.lookup("echo.Echo/Missing").is_none());
    assert!(registry.lookup("").is_none());
    assert_eq!(registry.len(), 2);
}

#[test]
fn method_ids_lists_every_registration() {
    let registry = build_registry();
    let mut ids: Vec<&str> = registry.method_ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["echo.Echo/Chat", "echo.Echo/Say"]);
}

#[test]
fn identifiers_differing_only_in_case_are_distinct() {
    let mut registry = build_registry();
    registry
        .register(
            "echo.echo/say",
            MethodDescriptor::rpc("LowerSay", "echo.SayRequest", MethodShape::Unary),
        )
        .unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.lookup("echo.echo/say").unwrap().name, "LowerSay");
    assert_eq!(registry.lookup("echo.Echo/Say").unwrap().name, "Say");
}

#[test]
fn duplicate_method_ids_are_rejected() {
    let mut registry = build_registry();
    let result = registry.register(
        "echo.Echo/Say",
        MethodDescriptor::rpc("Say", "echo.SayRequest", MethodShape::Unary),
    );
    assert_eq!(
        result,
        Err(RpcServiceError::DuplicateMethodId("echo.Echo/Say".into()))
    );
}

#[test]
fn shared_registries_delegate_lookups() {
    let mut registry = RpcMethodRegistry::new();
    registry
        .register(
            "echo.Echo",
            MethodDescriptor::rpc("Echo", "", MethodShape::Unary).with_kind(DescriptorKind::Service),
        )
        .unwrap();
    let shared: Arc<dyn MethodRegistry> = Arc::new(registry);
    let desc = shared.lookup("echo.Echo").unwrap();
    assert!(!desc.is_rpc_method());
}
