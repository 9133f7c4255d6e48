// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Responder and initiator driven end to end over the simulated link

mod common;

use std::cell::RefCell;

use common::Recorder;
use statelink::transport::sim::{SimCall, SimLinkConfig, SimLink};
use statelink::transport::AttributeHandle;
use statelink::{
    Error, HandlePolicy, Outcome, RegistrationStep, Responder, ResponderConfig, SessionHandle,
    SkipReason, StateValue, TransportError,
};

const SESSION: SessionHandle = SessionHandle(7);

#[test]
fn test_every_pushed_value_is_received() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    assert!(link.is_subscribed(responder.handles().value));

    for raw in 0..=u8::MAX {
        assert_eq!(responder.push_update(StateValue(raw)).unwrap(), Outcome::Issued);
        link.pump(&mut responder, &mut initiator).unwrap();
    }

    let expected: Vec<StateValue> = (0..=u8::MAX).map(StateValue).collect();
    assert_eq!(recorder.notifications(), expected);
}

#[test]
fn test_every_written_value_reaches_handler() {
    let link = common::link();
    let seen = RefCell::new(Vec::new());
    let on_write = |value: StateValue| seen.borrow_mut().push(value);
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    for raw in 0..=u8::MAX {
        assert_eq!(initiator.write_value(StateValue(raw)).unwrap(), Outcome::Issued);
        link.pump(&mut responder, &mut initiator).unwrap();
    }

    let expected: Vec<StateValue> = (0..=u8::MAX).map(StateValue).collect();
    assert_eq!(*seen.borrow(), expected);
}

#[test]
fn test_subscription_write_repeats_but_state_does_not() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::default();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    let handles = recorder.discovered().expect("discovery complete");
    initiator.assign_handles(&handles);

    assert_eq!(initiator.set_subscription(true).unwrap(), Outcome::Issued);
    assert_eq!(initiator.set_subscription(true).unwrap(), Outcome::Issued);

    let control_writes: Vec<_> = link
        .client_writes()
        .into_iter()
        .filter(|(_, handle, _)| *handle == handles.subscription)
        .collect();
    assert_eq!(control_writes.len(), 2);
    assert!(control_writes.iter().all(|(_, _, data)| data == &[0x01]));
    assert!(link.is_subscribed(handles.value));

    assert_eq!(responder.push_update(StateValue::ON).unwrap(), Outcome::Issued);
    link.pump(&mut responder, &mut initiator).unwrap();
    assert_eq!(recorder.notifications(), vec![StateValue::ON]);
}

#[test]
fn test_unsubscribe_stops_pushes() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    assert_eq!(initiator.set_subscription(false).unwrap(), Outcome::Issued);
    assert_eq!(
        responder.push_update(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::NotSubscribed)
    );
    link.pump(&mut responder, &mut initiator).unwrap();
    assert!(recorder.notifications().is_empty());
}

#[test]
fn test_no_transport_call_before_handles_assigned() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::default();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    assert_eq!(
        initiator.write_value(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::HandlesUnresolved)
    );
    assert_eq!(
        initiator.set_subscription(true).unwrap(),
        Outcome::Skipped(SkipReason::HandlesUnresolved)
    );
    assert!(link.client_writes().is_empty());
}

#[test]
fn test_push_before_session_is_skipped() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let mut responder = common::responder(&link, &on_write);

    assert_eq!(
        responder.push_update(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::NoSession)
    );
    assert!(!link
        .server_calls()
        .iter()
        .any(|call| matches!(call, SimCall::Notify { .. })));
}

#[test]
fn test_push_before_subscription_is_skipped() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::default();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    assert_eq!(
        responder.push_update(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::NotSubscribed)
    );
}

#[test]
fn test_handles_retained_across_reconnect() {
    let link = common::link();
    let seen = RefCell::new(Vec::new());
    let on_write = |value: StateValue| seen.borrow_mut().push(value);
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::RetainUntilReassigned);

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    link.disconnect(0x13).unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    assert_eq!(
        initiator.write_value(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::NoSession)
    );

    // Same peer, same layout: the old handles still work
    link.connect(SessionHandle(8)).unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    assert_eq!(initiator.handles().value, AttributeHandle(42));
    assert_eq!(initiator.write_value(StateValue::ON).unwrap(), Outcome::Issued);
    link.pump(&mut responder, &mut initiator).unwrap();
    assert_eq!(*seen.borrow(), vec![StateValue::ON]);
}

#[test]
fn test_handles_invalidated_on_session_down() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::InvalidateOnSessionDown);

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    link.disconnect(0x13).unwrap();
    link.connect(SessionHandle(8)).unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    assert!(!initiator.handles().is_resolved());
    assert_eq!(
        initiator.write_value(StateValue::ON).unwrap(),
        Outcome::Skipped(SkipReason::HandlesUnresolved)
    );

    // Rediscovery restores them
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();
    assert!(initiator.handles().is_resolved());
}

#[test]
fn test_registration_failure_is_fatal() {
    let link = SimLink::new(SimLinkConfig {
        namespace_capacity: 0,
        ..SimLinkConfig::default()
    });
    let on_write = |_: StateValue| {};

    let err = Responder::new(link.server(), ResponderConfig::new(&on_write))
        .err()
        .expect("no room for the base identifier");
    assert_eq!(
        err,
        Error::Registration {
            step: RegistrationStep::BaseIdentifier,
            source: TransportError::TableFull,
        }
    );
}

#[test]
fn test_registration_fails_when_handles_run_out() {
    let link = SimLink::new(SimLinkConfig {
        first_handle: u16::MAX - 2,
        ..SimLinkConfig::default()
    });
    let on_write = |_: StateValue| {};

    let err = Responder::new(link.server(), ResponderConfig::new(&on_write))
        .err()
        .expect("no room for the value attribute");
    assert_eq!(
        err,
        Error::Registration {
            step: RegistrationStep::ValueAttribute,
            source: TransportError::TableFull,
        }
    );
}

#[test]
fn test_transport_failure_on_write_is_fatal() {
    let link = common::link();
    let on_write = |_: StateValue| {};
    let recorder = Recorder::adopting();
    let mut responder = common::responder(&link, &on_write);
    let mut initiator = common::initiator(&link, &recorder, HandlePolicy::default());

    link.connect(SESSION).unwrap();
    link.discover().unwrap();
    link.pump(&mut responder, &mut initiator).unwrap();

    // Session vanishes on the link before the initiator hears about it
    link.disconnect(0x08).unwrap();
    assert_eq!(
        initiator.write_value(StateValue::ON),
        Err(Error::Transport(TransportError::InvalidSession))
    );
}
