//! Teardown guarantees: ordering, failure atomicity, no leaks.

use patchkit_attr::{AttrError, Value};
use parking_lot::Mutex;
use patchkit_composition::{ComposeError, CompositionStack, PatchObserver, StackEvent};
use patchkit_core::{PatchDescriptor, PatchError, PatchHandle, PatchKind};
use patchkit_test_utils::{
    computed_patches, foo_class, numbered_class, read_fresh, recorder, tamper, BindingSnapshot,
};
use pretty_assertions::assert_eq;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Overwrites member `victim` behind the stack's back once activation fails
#[derive(Debug)]
struct Saboteur {
    victim: usize,
    handles: Mutex<Vec<PatchHandle>>,
}

impl PatchObserver for Saboteur {
    fn on_activate(&self, _index: usize, handle: &PatchHandle) {
        self.handles.lock().push(handle.clone());
    }

    fn on_activation_failed(&self, _index: usize, _target: &str, _error: &PatchError) {
        tamper(&self.handles.lock()[self.victim]);
    }
}

fn stack_over(names: &[&str], class: &patchkit_attr::Class) -> CompositionStack {
    computed_patches(class, names).into_iter().collect()
}

#[test]
fn test_teardown_runs_in_reverse_order() {
    let class = numbered_class(4);
    let observer = recorder();
    let mut stack = stack_over(&["p0", "p1", "p2", "p3"], &class).with_observer(observer.clone());

    stack.run(|_| Ok::<_, AttrError>(())).unwrap();

    assert_eq!(observer.activation_order(), vec![0, 1, 2, 3]);
    assert_eq!(observer.deactivation_order(), vec![3, 2, 1, 0]);
}

#[test]
fn test_body_error_still_restores() {
    let class = foo_class();
    let snapshot = BindingSnapshot::capture(&class);
    let mut stack = stack_over(&["foo", "faa"], &class);

    let err = stack
        .run(|handles| {
            handles[0].set_return_value("Hello there!");
            Err::<(), _>(AttrError::Callback("assertion failed".into()))
        })
        .unwrap_err();

    assert!(matches!(err, ComposeError::Body { .. }));
    snapshot.assert_restored(&class);
    assert!(stack.descriptors().iter().all(|d| !d.is_active()));
}

#[test]
fn test_panic_in_body_still_restores() {
    let class = foo_class();
    let snapshot = BindingSnapshot::capture(&class);
    let observer = recorder();
    let mut stack = stack_over(&["foo", "faa"], &class).with_observer(observer.clone());

    let result = catch_unwind(AssertUnwindSafe(|| {
        stack.run(|handles| -> Result<(), AttrError> {
            handles[1].set_return_value("Bye!");
            panic!("body panicked");
        })
    }));

    assert!(result.is_err());
    snapshot.assert_restored(&class);
    assert_eq!(observer.deactivation_order(), vec![1, 0]);
}

#[test]
fn test_activation_failure_restores_earlier_members() {
    let class = numbered_class(3);
    let snapshot = BindingSnapshot::capture(&class);
    let observer = recorder();
    let mut stack = stack_over(&["p0", "p1", "missing", "p2"], &class).with_observer(observer.clone());

    let err = stack.run(|_| Ok::<_, AttrError>(())).unwrap_err();

    let ComposeError::Activation(err) = err else {
        panic!("expected activation error");
    };
    assert_eq!(err.index, 2);
    assert_eq!(err.target, "Numbered.missing");
    assert!(err.source.is_not_found());
    assert!(err.rollback.is_empty());

    assert_eq!(observer.activation_order(), vec![0, 1]);
    assert_eq!(observer.deactivation_order(), vec![1, 0]);
    assert!(!observer
        .events()
        .iter()
        .any(|e| matches!(e, StackEvent::Activated { index: 3, .. })));
    snapshot.assert_restored(&class);
}

#[test]
fn test_rollback_failure_is_reported_and_others_still_restored() {
    let class = numbered_class(3);
    let observer = Arc::new(Saboteur {
        victim: 1,
        handles: Mutex::new(Vec::new()),
    });
    let mut stack = stack_over(&["p0", "p1", "p2", "missing"], &class).with_observer(observer);

    let err = stack.run(|_| Ok::<_, AttrError>(())).unwrap_err();

    assert_eq!(err.teardown_failures().len(), 1);
    let ComposeError::Activation(err) = err else {
        panic!("expected activation error");
    };
    assert_eq!(err.index, 3);
    assert!(err.source.is_not_found());
    assert_eq!(err.rollback.len(), 1);
    assert_eq!(err.rollback[0].index, 1);
    assert_eq!(err.rollback[0].target, "Numbered.p1");
    assert!(matches!(err.rollback[0].source, PatchError::InvalidHandle { .. }));

    assert_eq!(read_fresh(&class, "p0"), Value::Int(0));
    assert_eq!(read_fresh(&class, "p2"), Value::Int(2));
    assert_eq!(read_fresh(&class, "p1"), Value::from("tampered"));
    assert!(!stack.descriptors()[0].is_active());
    assert!(!stack.descriptors()[2].is_active());
}

#[test]
fn test_teardown_failure_does_not_stop_remaining_restores() {
    let class = numbered_class(3);
    let observer = recorder();
    let mut stack = stack_over(&["p0", "p1", "p2"], &class).with_observer(observer.clone());

    let err = stack
        .run(|handles| {
            tamper(&handles[1]);
            Ok::<_, AttrError>(())
        })
        .unwrap_err();

    let ComposeError::Teardown(teardown) = err else {
        panic!("expected teardown error");
    };
    assert_eq!(teardown.failures().len(), 1);
    assert_eq!(teardown.primary().index, 1);
    assert!(matches!(teardown.primary().source, PatchError::InvalidHandle { .. }));

    // p2 and p0 were still restored around the failing member.
    assert_eq!(observer.deactivation_order(), vec![2, 1, 0]);
    assert_eq!(read_fresh(&class, "p0"), Value::Int(0));
    assert_eq!(read_fresh(&class, "p2"), Value::Int(2));
    assert_eq!(read_fresh(&class, "p1"), Value::from("tampered"));
}

#[test]
fn test_body_error_takes_priority_over_teardown_error() {
    let class = foo_class();
    let mut stack = stack_over(&["foo", "faa"], &class);

    let err = stack
        .run(|handles| {
            tamper(&handles[0]);
            Err::<(), _>(AttrError::Callback("body".into()))
        })
        .unwrap_err();

    assert_eq!(err.body_error(), Some(&AttrError::Callback("body".into())));
    let failures = err.teardown_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].target, "Foo.foo");
    assert_eq!(read_fresh(&class, "faa"), Value::from("faa"));
}

#[test]
fn test_dropping_active_stack_restores() {
    let class = foo_class();
    let snapshot = BindingSnapshot::capture(&class);
    let mut stack = stack_over(&["foo", "faa"], &class);

    {
        let active = stack.activate().unwrap();
        assert_eq!(active.len(), 2);
        active.handle(0).unwrap().set_return_value("scoped");
        assert_eq!(read_fresh(&class, "foo"), Value::from("scoped"));
    }

    snapshot.assert_restored(&class);
}

#[test]
fn test_close_reports_success() {
    let class = foo_class();
    let mut stack = stack_over(&["foo"], &class);
    let active = stack.activate().unwrap();
    assert!(active.close().is_ok());
    assert_eq!(read_fresh(&class, "foo"), Value::from("foo"));
}

#[test]
fn test_double_restore_is_rejected_without_side_effects() {
    let class = foo_class();
    let mut descriptor = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
    let handle = descriptor.activate().unwrap();
    descriptor.deactivate(&handle).unwrap();
    let snapshot = BindingSnapshot::capture(&class);

    let err = descriptor.deactivate(&handle).unwrap_err();
    assert!(matches!(err, PatchError::InvalidHandle { .. }));
    snapshot.assert_restored(&class);
}
