//! # Message Exchange Service Tests

use super::*;
use crate::domain::reference_ids::*;
use crate::domain::MessageType;
use gl_01_record_store::{
    FaultPlan, InMemoryLedger, ManualTimeSource, RecordingObserver, TimeSource,
};
use serde_json::json;
use shared_types::{IdentifierKind, StoreError, TxTimestamp};
use std::collections::HashSet;
use std::sync::Arc;

/// 2024-05-01T10:00:00Z
const T0: i64 = 1_714_557_600;
const INIT_TS: &str = "2024-05-01T10:00:00Z";

fn doc(value: serde_json::Value) -> Content {
    Content::try_from(value).unwrap()
}

fn make_test_ledger() -> InMemoryLedger {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let clock: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(TxTimestamp::new(T0, 0), 1));
    InMemoryLedger::with_time_source(clock)
}

fn make_test_service(policy: MatchPolicy) -> MessageExchangeService {
    MessageExchangeService::new(
        ExchangeTopology::reference(),
        ExchangeConfig {
            match_policy: policy,
        },
    )
    .unwrap()
}

/// Ledger initialised at `T0`, coverage policy.
fn initialised() -> (InMemoryLedger, MessageExchangeService) {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    ledger.submit(|stub| service.init_ledger(stub)).unwrap();
    (ledger, service)
}

fn ipp_initial() -> Content {
    doc(json!({"t": INIT_TS, "stNum": 0, "allData": "FALSE"}))
}

// =============================================================================
// INIT
// =============================================================================

#[test]
fn test_init_writes_every_record() {
    let (ledger, service) = initialised();
    assert_eq!(ledger.height(), 1);

    let rdso = ledger
        .evaluate(|stub| service.read_message(stub, RDSO_PUB_MESSAGE))
        .unwrap();
    assert_eq!(rdso.message_type, MessageType::Standard);
    assert_eq!(rdso.timestamp, INIT_TS);
    assert_eq!(
        rdso.content,
        doc(json!({"t": INIT_TS, "stNum": 0, "allData": "TRUE"}))
    );

    let ipp = ledger
        .evaluate(|stub| service.read_message(stub, IPP_PUB_MESSAGE))
        .unwrap();
    assert_eq!(ipp.content, ipp_initial());

    for response_id in [RDSO_VALIDATION_MESSAGE, IPP_VALIDATION_MESSAGE] {
        let response = ledger
            .evaluate(|stub| service.read_response(stub, response_id))
            .unwrap();
        assert_eq!(response, Response::shell(response_id, INIT_TS));
    }
}

#[test]
fn test_get_all_data_lists_known_ids() {
    let (ledger, service) = initialised();
    let all = ledger.evaluate(|stub| service.get_all_data(stub)).unwrap();

    let ids: Vec<&str> = all.keys().map(String::as_str).collect();
    assert_eq!(
        ids,
        vec![
            IPP_PUB_MESSAGE,
            IPP_VALIDATION_MESSAGE,
            RDSO_PUB_MESSAGE,
            RDSO_VALIDATION_MESSAGE
        ]
    );
    assert_eq!(all[RDSO_VALIDATION_MESSAGE]["Status"], "Valid");
    assert_eq!(all[IPP_PUB_MESSAGE]["Message"]["allData"], "FALSE");
}

#[test]
fn test_get_all_data_aborts_on_missing_id() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    let err = ledger.evaluate(|stub| service.get_all_data(stub)).unwrap_err();
    assert_eq!(
        err,
        CoreError::NotFound {
            key: IPP_PUB_MESSAGE.into()
        }
    );
}

// =============================================================================
// UPDATE MESSAGE
// =============================================================================

#[test]
fn test_update_then_read_returns_written_message() {
    let ledger = InMemoryLedger::new();
    let service = make_test_service(MatchPolicy::Coverage);
    ledger.submit(|stub| service.init_ledger(stub)).unwrap();

    let before = chrono::Utc::now().timestamp();
    let content = doc(json!({"stNum": 7, "allData": "TRUE", "t": "now"}));
    ledger
        .submit(|stub| service.update_message(stub, IPP_PUB_MESSAGE, content.clone(), "Corrective"))
        .unwrap();

    let stored = ledger
        .evaluate(|stub| service.read_message(stub, IPP_PUB_MESSAGE))
        .unwrap();
    assert_eq!(stored.content, content);
    assert_eq!(stored.message_type, MessageType::Corrective);
    let written = chrono::DateTime::parse_from_rfc3339(&stored.timestamp)
        .unwrap()
        .timestamp();
    assert!(written >= before);
}

#[test]
fn test_update_unknown_id_writes_nothing() {
    let (ledger, service) = initialised();
    let mut tx = ledger.begin();

    let err = service
        .update_message(&mut tx, "XYZ_PubMessage", doc(json!({"a": 1})), "Standard")
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::InvalidIdentifier {
            kind: IdentifierKind::Message,
            id: "XYZ_PubMessage".into()
        }
    );
    assert!(tx.pending_keys().is_empty());
    assert_eq!(service.stats().rejected_inputs, 1);
}

#[test]
fn test_update_invalid_type_writes_nothing() {
    let (ledger, service) = initialised();
    let mut tx = ledger.begin();

    let err = service
        .update_message(&mut tx, RDSO_PUB_MESSAGE, doc(json!({"a": 1})), "Urgent")
        .unwrap_err();
    assert_eq!(err, CoreError::InvalidType("Urgent".into()));
    assert!(tx.pending_keys().is_empty());
}

#[test]
fn test_update_before_init_is_not_found() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    let result = ledger.submit(|stub| {
        service.update_message(stub, RDSO_PUB_MESSAGE, Content::new(), "Standard")
    });
    assert_eq!(
        result.unwrap_err(),
        CoreError::NotFound {
            key: RDSO_PUB_MESSAGE.into()
        }
    );
    assert_eq!(ledger.height(), 0);
}

// =============================================================================
// VALIDATE / READ
// =============================================================================

#[test]
fn test_validate_against_initial_content() {
    let (ledger, service) = initialised();
    let matched = ledger
        .evaluate(|stub| service.validate_message(stub, IPP_PUB_MESSAGE, &ipp_initial()))
        .unwrap();
    assert!(matched);

    let wrong = doc(json!({"t": INIT_TS, "stNum": 0, "allData": "TRUE"}));
    let matched = ledger
        .evaluate(|stub| service.validate_message(stub, IPP_PUB_MESSAGE, &wrong))
        .unwrap();
    assert!(!matched);

    let stats = service.stats();
    assert_eq!(stats.validations, 2);
    assert_eq!(stats.valid_verdicts, 1);
    assert_eq!(stats.invalid_verdicts, 1);
}

#[test]
fn test_unknown_ids_are_rejected_everywhere() {
    let (ledger, service) = initialised();
    let height = ledger.height();

    let err = ledger
        .evaluate(|stub| service.validate_message(stub, "nope", &Content::new()))
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidIdentifier { kind: IdentifierKind::Message, .. }));

    let err = ledger.evaluate(|stub| service.read_data(stub, "nope")).unwrap_err();
    assert!(matches!(err, CoreError::InvalidIdentifier { kind: IdentifierKind::Record, .. }));

    let err = ledger
        .evaluate(|stub| service.get_history(stub, "nope"))
        .unwrap_err();
    assert_eq!(err.label(), "InvalidIdentifier");

    // A response id is a known record but not a message.
    let err = ledger
        .evaluate(|stub| service.read_message(stub, RDSO_VALIDATION_MESSAGE))
        .unwrap_err();
    assert_eq!(err, CoreError::invalid_message_id(RDSO_VALIDATION_MESSAGE));

    assert_eq!(ledger.height(), height);
}

#[test]
fn test_validate_before_init_is_not_found() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    let err = ledger
        .evaluate(|stub| service.validate_message(stub, RDSO_PUB_MESSAGE, &Content::new()))
        .unwrap_err();
    assert_eq!(err.label(), "NotFound");
}

#[test]
fn test_read_data_returns_stored_json() {
    let (ledger, service) = initialised();
    let value = ledger
        .evaluate(|stub| service.read_data(stub, RDSO_VALIDATION_MESSAGE))
        .unwrap();
    assert_eq!(
        value,
        json!({
            "ID": RDSO_VALIDATION_MESSAGE,
            "Published": {},
            "Status": "Valid",
            "Subscribed": {},
            "Timestamp": INIT_TS
        })
    );
}

#[test]
fn test_corrupt_message_is_reported() {
    let (ledger, service) = initialised();
    ledger
        .seed_raw(IPP_PUB_MESSAGE, br#"{"ID": "IPP_PubMessage", "Message": [1, 2]}"#.to_vec())
        .unwrap();

    let err = ledger
        .evaluate(|stub| service.read_message(stub, IPP_PUB_MESSAGE))
        .unwrap_err();
    assert!(matches!(err, CoreError::Corrupt { ref key, .. } if key == IPP_PUB_MESSAGE));

    // The raw read only needs valid JSON.
    let raw = ledger
        .evaluate(|stub| service.read_data(stub, IPP_PUB_MESSAGE))
        .unwrap();
    assert_eq!(raw["Message"], json!([1, 2]));
}

// =============================================================================
// RESPOND
// =============================================================================

#[test]
fn test_respond_updates_own_message_and_validates_counterpart() {
    let (ledger, service) = initialised();
    let subscribed = doc(json!({"t": "X", "stNum": 0, "allData": "FALSE"}));
    let published = doc(json!({"t": "Y", "stNum": 1, "allData": "TRUE"}));

    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(
                stub,
                RDSO_VALIDATION_MESSAGE,
                subscribed.clone(),
                published.clone(),
            )
        })
        .unwrap();

    // `t` differs from what IPP published at init.
    assert_eq!(status, Status::Invalid);
    assert_eq!(status.to_string(), "Invalid");

    let rdso = ledger
        .evaluate(|stub| service.read_message(stub, RDSO_PUB_MESSAGE))
        .unwrap();
    assert_eq!(rdso.content, published);
    assert_eq!(rdso.message_type, MessageType::Standard);

    // The counterpart is untouched.
    let ipp = ledger
        .evaluate(|stub| service.read_message(stub, IPP_PUB_MESSAGE))
        .unwrap();
    assert_eq!(ipp.content, ipp_initial());

    let response = ledger
        .evaluate(|stub| service.read_response(stub, RDSO_VALIDATION_MESSAGE))
        .unwrap();
    assert_eq!(response.subscribed, subscribed);
    assert_eq!(response.published, published);
    assert_eq!(response.status, Status::Invalid);
    assert_eq!(response.timestamp, "2024-05-01T10:00:01Z");
}

#[test]
fn test_respond_with_counterpart_content_is_valid() {
    let (ledger, service) = initialised();
    let published = doc(json!({"t": "Y", "stNum": 1, "allData": "TRUE"}));

    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(stub, RDSO_VALIDATION_MESSAGE, ipp_initial(), published.clone())
        })
        .unwrap();
    assert_eq!(status, Status::Valid);

    // IPP now answers with what RDSO just published.
    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(
                stub,
                IPP_VALIDATION_MESSAGE,
                published.clone(),
                doc(json!({"stNum": 2})),
            )
        })
        .unwrap();
    assert_eq!(status, Status::Valid);
}

#[test]
fn test_respond_is_idempotent() {
    let (ledger, service) = initialised();
    let subscribed = doc(json!({"t": INIT_TS, "stNum": 0, "allData": "FALSE", "extra": true}));
    let published = doc(json!({"stNum": 3}));

    let respond = || {
        ledger
            .submit(|stub| {
                service.respond_to_message(
                    stub,
                    RDSO_VALIDATION_MESSAGE,
                    subscribed.clone(),
                    published.clone(),
                )
            })
            .unwrap()
            .0
    };
    let first = respond();
    let after_first = ledger
        .evaluate(|stub| service.read_response(stub, RDSO_VALIDATION_MESSAGE))
        .unwrap();
    let second = respond();
    let after_second = ledger
        .evaluate(|stub| service.read_response(stub, RDSO_VALIDATION_MESSAGE))
        .unwrap();

    assert_eq!(first, Status::Valid);
    assert_eq!(first, second);
    assert_eq!(after_first.subscribed, after_second.subscribed);
    assert_eq!(after_first.published, after_second.published);
    assert_eq!(after_first.status, after_second.status);
}

#[test]
fn test_respond_unknown_response_id() {
    let (ledger, service) = initialised();
    let mut tx = ledger.begin();
    let err = service
        .respond_to_message(&mut tx, RDSO_PUB_MESSAGE, Content::new(), Content::new())
        .unwrap_err();
    assert_eq!(err, CoreError::invalid_response_id(RDSO_PUB_MESSAGE));
    assert!(tx.pending_keys().is_empty());
}

#[test]
fn test_respond_before_init_writes_no_response() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    let mut tx = ledger.begin();

    let err = service
        .respond_to_message(&mut tx, IPP_VALIDATION_MESSAGE, Content::new(), Content::new())
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::NotFound {
            key: IPP_PUB_MESSAGE.into()
        }
    );
    assert!(tx.pending_keys().is_empty());
}

#[test]
fn test_respond_without_stored_response_starts_valid_shell() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Coverage);
    ledger
        .submit(|stub| {
            // Messages only, as an older deployment would have left it.
            for id in [RDSO_PUB_MESSAGE, IPP_PUB_MESSAGE] {
                let message = Message {
                    id: id.to_string(),
                    content: doc(json!({"stNum": 0})),
                    timestamp: INIT_TS.to_string(),
                    message_type: MessageType::Standard,
                };
                gl_01_record_store::write_record(stub, id, &message)?;
            }
            Ok::<_, CoreError>(())
        })
        .unwrap();

    let (status, receipt) = ledger
        .submit(|stub| {
            service.respond_to_message(
                stub,
                IPP_VALIDATION_MESSAGE,
                doc(json!({"stNum": 0})),
                doc(json!({"stNum": 1})),
            )
        })
        .unwrap();
    assert_eq!(status, Status::Valid);
    assert_eq!(
        receipt.keys_written,
        vec![IPP_PUB_MESSAGE.to_string(), IPP_VALIDATION_MESSAGE.to_string()]
    );

    let response = ledger
        .evaluate(|stub| service.read_response(stub, IPP_VALIDATION_MESSAGE))
        .unwrap();
    assert_eq!(response.id, IPP_VALIDATION_MESSAGE);
    assert_eq!(response.published, doc(json!({"stNum": 1})));
}

#[test]
fn test_failed_response_write_rolls_back_message_update() {
    let (ledger, service) = initialised();
    ledger.inject_faults(FaultPlan {
        reject_writes: HashSet::from([RDSO_VALIDATION_MESSAGE.to_string()]),
        ..FaultPlan::default()
    });

    let result = ledger.submit(|stub| {
        service.respond_to_message(
            stub,
            RDSO_VALIDATION_MESSAGE,
            ipp_initial(),
            doc(json!({"stNum": 99})),
        )
    });
    assert!(matches!(
        result,
        Err(CoreError::HostFailure(StoreError::WriteRejected { .. }))
    ));
    ledger.clear_faults();

    let rdso = ledger
        .evaluate(|stub| service.read_message(stub, RDSO_PUB_MESSAGE))
        .unwrap();
    assert_eq!(rdso.content.get("stNum"), Some(&json!(0)));
    assert_eq!(ledger.height(), 1);
}

#[test]
fn test_corrupt_counterpart_aborts_respond() {
    let (ledger, service) = initialised();
    ledger.seed_raw(IPP_PUB_MESSAGE, b"not json".to_vec()).unwrap();
    let height = ledger.height();

    let result = ledger.submit(|stub| {
        service.respond_to_message(stub, RDSO_VALIDATION_MESSAGE, Content::new(), Content::new())
    });
    assert_eq!(result.unwrap_err().label(), "Corrupt");
    assert_eq!(ledger.height(), height);
}

#[test]
fn test_concurrent_responds_conflict_on_commit() {
    let (ledger, service) = initialised();
    let mut first = ledger.begin();
    let mut second = ledger.begin();

    service
        .respond_to_message(&mut first, RDSO_VALIDATION_MESSAGE, ipp_initial(), doc(json!({"n": 1})))
        .unwrap();
    service
        .respond_to_message(&mut second, RDSO_VALIDATION_MESSAGE, ipp_initial(), doc(json!({"n": 2})))
        .unwrap();

    first.commit().unwrap();
    let err = second.commit().unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let rdso = ledger
        .evaluate(|stub| service.read_message(stub, RDSO_PUB_MESSAGE))
        .unwrap();
    assert_eq!(rdso.content, doc(json!({"n": 1})));
}

#[test]
fn test_observer_sees_only_committed_responds() {
    let (ledger, service) = initialised();
    let observer = Arc::new(RecordingObserver::default());
    ledger.subscribe(observer.clone());

    let _ = ledger.submit(|stub| {
        service.respond_to_message(stub, "bogus", Content::new(), Content::new())
    });
    assert!(observer.receipts().is_empty());

    ledger
        .submit(|stub| {
            service.respond_to_message(stub, IPP_VALIDATION_MESSAGE, Content::new(), Content::new())
        })
        .unwrap();
    let receipts = observer.receipts();
    assert_eq!(receipts.len(), 1);
    assert_eq!(
        receipts[0].keys_written,
        vec![IPP_PUB_MESSAGE.to_string(), IPP_VALIDATION_MESSAGE.to_string()]
    );
}

// =============================================================================
// POLICIES AND TOPOLOGIES
// =============================================================================

#[test]
fn test_canonical_policy_rejects_extra_keys() {
    let ledger = make_test_ledger();
    let service = make_test_service(MatchPolicy::Canonical);
    ledger.submit(|stub| service.init_ledger(stub)).unwrap();

    let mut superset = ipp_initial();
    superset.insert("extra", 1);

    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(stub, RDSO_VALIDATION_MESSAGE, superset.clone(), Content::new())
        })
        .unwrap();
    assert_eq!(status, Status::Invalid);

    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(stub, RDSO_VALIDATION_MESSAGE, ipp_initial(), Content::new())
        })
        .unwrap();
    assert_eq!(status, Status::Valid);
}

#[test]
fn test_coverage_policy_accepts_extra_keys_and_string_numbers() {
    let (ledger, service) = initialised();
    let claimed = doc(json!({"t": INIT_TS, "stNum": "0", "allData": "FALSE", "extra": 1}));
    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(stub, RDSO_VALIDATION_MESSAGE, claimed.clone(), Content::new())
        })
        .unwrap();
    assert_eq!(status, Status::Valid);
}

#[test]
fn test_degenerate_route_sees_its_own_update() {
    let topology = ExchangeTopology::default()
        .with_publisher("Solo_PubMessage", Content::new().with("v", 0))
        .with_route("Solo_ValidationMessage", "Solo_PubMessage", "Solo_PubMessage");
    let service = MessageExchangeService::new(topology, ExchangeConfig::default()).unwrap();
    let ledger = make_test_ledger();
    ledger.submit(|stub| service.init_ledger(stub)).unwrap();

    let content = doc(json!({"v": 5}));
    let (status, _) = ledger
        .submit(|stub| {
            service.respond_to_message(stub, "Solo_ValidationMessage", content.clone(), content.clone())
        })
        .unwrap();
    assert_eq!(status, Status::Valid);
}

#[test]
fn test_invalid_topology_is_refused() {
    let topology = ExchangeTopology::reference().with_route("Stray", "Nobody", IPP_PUB_MESSAGE);
    let result = MessageExchangeService::new(topology, ExchangeConfig::default());
    assert!(matches!(result, Err(ExchangeError::InvalidTopology(_))));
}

// =============================================================================
// HISTORY
// =============================================================================

#[test]
fn test_history_after_init_and_updates() {
    let (ledger, service) = initialised();
    for n in 1..=3 {
        ledger
            .submit(|stub| {
                service.update_message(stub, IPP_PUB_MESSAGE, doc(json!({"stNum": n})), "Standard")
            })
            .unwrap();
    }

    let history = ledger
        .evaluate(|stub| service.get_history(stub, IPP_PUB_MESSAGE))
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].value["Message"], json!(ipp_initial()));
    for (n, record) in history.iter().enumerate().skip(1) {
        assert_eq!(record.value["Message"]["stNum"], json!(n));
        let snapshot: Message = serde_json::from_value(record.value.clone()).unwrap();
        assert_eq!(snapshot.id, IPP_PUB_MESSAGE);
    }
    assert_eq!(history[0].timestamp, "2024-05-01T10:00:00.000000000Z");
}

#[test]
fn test_history_excludes_uncommitted_writes() {
    let (ledger, service) = initialised();
    let mut tx = ledger.begin();
    service
        .update_message(&mut tx, RDSO_PUB_MESSAGE, doc(json!({"a": 1})), "Standard")
        .unwrap();
    let history = service.get_history(&mut tx, RDSO_PUB_MESSAGE).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn test_through_port_trait_object() {
    let (ledger, service) = initialised();
    let api: &dyn MessageExchangeApi = &service;
    let matched = ledger
        .evaluate(|stub| api.validate_message(stub, IPP_PUB_MESSAGE, &ipp_initial()))
        .unwrap();
    assert!(matched);
}
