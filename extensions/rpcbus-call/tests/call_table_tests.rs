use example_rpcbus_service_definition::{
    CHAT_METHOD_ID, COLLECT_METHOD_ID, FAIL_METHOD_ID, MAX_WATCH_COUNT, SAY_METHOD_ID, SERVICE_ID,
    WATCH_METHOD_ID, echo_registry, echo_stub,
};
use rpcbus::message::{CallEventKind, CallInfo, ClientMessage, ServerMessage};
use rpcbus_call::{CallError, CallTable, CallTableError, ServerMessageSender, ServiceBinding};
use serde_json::json;
use std::sync::{Arc, Mutex};

const TABLE_SERVICE_ID: u32 = 11;

type Outbox = Arc<Mutex<Vec<ServerMessage>>>;

fn create_table() -> (CallTable, Outbox) {
    let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
    let send: ServerMessageSender = {
        let outbox = outbox.clone();
        Arc::new(move |msg: ServerMessage| outbox.lock().unwrap().push(msg))
    };
    let binding = ServiceBinding::new(echo_registry().unwrap(), echo_stub().unwrap());
    (CallTable::new(TABLE_SERVICE_ID, binding, send), outbox)
}

fn init(call_id: u32, method_id: &str, arguments: Option<&str>) -> ClientMessage {
    let mut info = CallInfo::new(method_id);
    if let Some(arguments) = arguments {
        info = info.with_arguments(arguments);
    }
    ClientMessage::CallInit { call_id, info }
}

/// Collapses the outbox into `(call_id, label)` pairs for easy assertions.
fn trace(outbox: &Outbox) -> Vec<(u32, &'static str)> {
    outbox
        .lock()
        .unwrap()
        .iter()
        .map(|msg| match msg {
            ServerMessage::CallEnded(ended) => {
                assert_eq!(ended.service_id, TABLE_SERVICE_ID);
                (ended.call_id, "call_ended")
            }
            ServerMessage::CallEvent(event) => {
                assert_eq!(event.service_id, TABLE_SERVICE_ID);
                (event.call_id, event.event.as_str())
            }
        })
        .collect()
}

#[test]
fn unary_call_completes_and_is_reaped() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(init(1, SAY_METHOD_ID, Some(r#"{"text":"hi"}"#)))
        .unwrap();

    assert_eq!(
        trace(&outbox),
        vec![(1, "data"), (1, "call_ended")]
    );
    let data = outbox.lock().unwrap()[0].as_call_event().unwrap().data.clone();
    assert_eq!(data, r#"{"text":"hi"}"#);

    assert_eq!(table.reap(), 1);
    assert!(table.is_empty());
}

#[test]
fn unary_error_is_forwarded_and_reaped() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(init(9, FAIL_METHOD_ID, Some(r#"{"text":"boom"}"#)))
        .unwrap();

    assert_eq!(trace(&outbox), vec![(9, "error"), (9, "call_ended")]);
    let data = outbox.lock().unwrap()[0].as_call_event().unwrap().data.clone();
    let error: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(error["details"], json!("Fail always fails"));
    assert_eq!(error["request"], json!({"text": "boom"}));

    assert_eq!(table.reap(), 1);
    assert!(table.is_empty());
}

#[test]
fn streaming_error_disposes_call_on_next_reap() {
    let (mut table, outbox) = create_table();
    let arguments = json!({ "count": MAX_WATCH_COUNT + 1 }).to_string();

    table
        .handle_message(init(12, WATCH_METHOD_ID, Some(&arguments)))
        .unwrap();

    // The error event is out, but the call is still tracked until reaped.
    assert_eq!(trace(&outbox), vec![(12, "error")]);
    assert!(table.contains(12));
    assert!(!table.get(12).unwrap().is_disposed());

    assert_eq!(table.reap(), 1);
    assert!(table.is_empty());
    assert_eq!(trace(&outbox), vec![(12, "error"), (12, "call_ended")]);
}

#[test]
fn failed_initiation_is_reported_and_not_tracked() {
    let (mut table, outbox) = create_table();

    let err = table
        .handle_message(init(2, SAY_METHOD_ID, None))
        .unwrap_err();
    assert!(matches!(
        err,
        CallTableError::Call {
            call_id: 2,
            source: CallError::MissingRequiredArguments { .. }
        }
    ));

    let err = table
        .handle_message(init(3, SERVICE_ID, Some("{}")))
        .unwrap_err();
    assert!(matches!(
        err,
        CallTableError::Call {
            source: CallError::WrongDescriptorKind { .. },
            ..
        }
    ));

    assert_eq!(
        trace(&outbox),
        vec![(2, "call_ended"), (3, "call_ended")]
    );
    assert!(table.is_empty());
}

#[test]
fn duplicate_live_call_ids_are_rejected() {
    let (mut table, _outbox) = create_table();

    table.handle_message(init(5, CHAT_METHOD_ID, None)).unwrap();
    let err = table
        .handle_message(init(5, CHAT_METHOD_ID, None))
        .unwrap_err();

    assert!(matches!(err, CallTableError::CallIdInUse(5)));
    assert_eq!(table.len(), 1);
}

#[test]
fn bidi_call_routes_writes_and_is_disposed_after_end() {
    let (mut table, outbox) = create_table();

    table.handle_message(init(5, CHAT_METHOD_ID, None)).unwrap();
    table
        .handle_message(ClientMessage::CallSend {
            call_id: 5,
            message: json!({"x": 1}),
        })
        .unwrap();

    assert_eq!(trace(&outbox), vec![(5, "data")]);
    assert_eq!(
        outbox.lock().unwrap()[0].as_call_event().unwrap().data,
        r#"{"x":1}"#
    );

    table
        .handle_message(ClientMessage::CallEnd { call_id: 5 })
        .unwrap();

    // The stream ended but disposal waits for the table.
    assert!(table.contains(5));
    assert!(!table.get(5).unwrap().is_disposed());

    assert_eq!(table.reap(), 1);
    assert!(table.is_empty());
    assert_eq!(
        trace(&outbox),
        vec![
            (5, "data"),
            (5, "status"),
            (5, "end"),
            (5, "call_ended"),
        ]
    );
}

#[test]
fn server_streaming_call_emits_then_is_reaped() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(init(8, WATCH_METHOD_ID, Some(r#"{"count":2}"#)))
        .unwrap();
    assert_eq!(table.len(), 1);

    assert_eq!(table.reap(), 1);

    assert_eq!(
        trace(&outbox),
        vec![
            (8, "data"),
            (8, "data"),
            (8, "status"),
            (8, "end"),
            (8, "call_ended"),
        ]
    );
    let events: Vec<_> = outbox
        .lock()
        .unwrap()
        .iter()
        .filter_map(|msg| msg.as_call_event().cloned())
        .filter(|event| event.event == CallEventKind::Data)
        .map(|event| event.data)
        .collect();
    assert_eq!(events, vec![r#"{"index":0}"#, r#"{"index":1}"#]);
}

#[test]
fn client_streaming_call_answers_once_request_side_ends() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(init(4, COLLECT_METHOD_ID, None))
        .unwrap();
    for n in 0..2 {
        table
            .handle_message(ClientMessage::CallSend {
                call_id: 4,
                message: json!({ "n": n }),
            })
            .unwrap();
    }
    assert!(outbox.lock().unwrap().is_empty());

    table
        .handle_message(ClientMessage::CallEnd { call_id: 4 })
        .unwrap();

    assert_eq!(
        trace(&outbox),
        vec![(4, "data"), (4, "call_ended")]
    );
    assert_eq!(
        outbox.lock().unwrap()[0].as_call_event().unwrap().data,
        r#"{"messages":[{"n":0},{"n":1}]}"#
    );

    assert_eq!(table.reap(), 1);
    assert!(table.is_empty());
}

#[test]
fn terminate_disposes_without_forwarding_cancellation() {
    let (mut table, outbox) = create_table();

    table.handle_message(init(6, CHAT_METHOD_ID, None)).unwrap();
    table
        .handle_message(ClientMessage::CallTerminate { call_id: 6 })
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(trace(&outbox), vec![(6, "call_ended")]);

    // Late traffic for the terminated call is ignored.
    table
        .handle_message(ClientMessage::CallSend {
            call_id: 6,
            message: json!({"late": true}),
        })
        .unwrap();
    assert_eq!(outbox.lock().unwrap().len(), 1);
}

#[test]
fn messages_for_unknown_calls_are_ignored() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(ClientMessage::CallSend {
            call_id: 99,
            message: json!({}),
        })
        .unwrap();
    table
        .handle_message(ClientMessage::CallEnd { call_id: 99 })
        .unwrap();
    table
        .handle_message(ClientMessage::CallTerminate { call_id: 99 })
        .unwrap();

    assert!(outbox.lock().unwrap().is_empty());
}

#[test]
fn call_ids_can_be_reused_after_completion() {
    let (mut table, outbox) = create_table();

    table
        .handle_message(init(1, SAY_METHOD_ID, Some("{}")))
        .unwrap();
    // The completed call is reaped before the new init is processed.
    table
        .handle_message(init(1, CHAT_METHOD_ID, None))
        .unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(
        table.get(1).unwrap().call_info().method_id,
        CHAT_METHOD_ID
    );
    assert_eq!(
        trace(&outbox),
        vec![(1, "data"), (1, "call_ended")]
    );
}

#[test]
fn dispose_all_ends_every_live_call() {
    let (mut table, outbox) = create_table();

    table.handle_message(init(1, CHAT_METHOD_ID, None)).unwrap();
    table.handle_message(init(2, CHAT_METHOD_ID, None)).unwrap();
    table
        .handle_message(init(3, COLLECT_METHOD_ID, None))
        .unwrap();
    assert_eq!(table.len(), 3);

    table.dispose_all();

    assert!(table.is_empty());
    let mut ended: Vec<u32> = trace(&outbox)
        .into_iter()
        .filter(|(_, label)| *label == "call_ended")
        .map(|(call_id, _)| call_id)
        .collect();
    ended.sort_unstable();
    assert_eq!(ended, vec![1, 2, 3]);
    // Cancellations raised while closing are not forwarded.
    assert_eq!(outbox.lock().unwrap().len(), 3);
}
