//! Patch handles (doubles)
//!
//! A [`PatchHandle`] is the live side of a patch. It owns the captured
//! original binding, builds the substitute property installed in the slot,
//! and exposes the configuration test code drives: return values and the
//! call log.

use crate::config::{ExhaustedPolicy, PatchConfig};
use crate::kind::PatchKind;
use parking_lot::Mutex;
use patchkit_attr::{AttrError, Binding, Owner, PatchId, Property, Value, ValueCell};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One recorded interaction with a double
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Attribute was read
    Get,

    /// Attribute was written with the given value
    Set(Value),
}

#[derive(Debug)]
enum ReturnPlan {
    Constant(Value),
    Sequence {
        pending: VecDeque<Value>,
        last: Option<Value>,
    },
}

#[derive(Debug)]
struct DoubleState {
    plan: ReturnPlan,
    calls: Vec<Call>,
}

impl DoubleState {
    fn read(&mut self, label: &str, config: PatchConfig) -> Result<Value, AttrError> {
        if config.record_calls {
            self.calls.push(Call::Get);
        }
        match &mut self.plan {
            ReturnPlan::Constant(value) => Ok(value.clone()),
            ReturnPlan::Sequence { pending, last } => match pending.pop_front() {
                Some(value) => {
                    *last = Some(value.clone());
                    Ok(value)
                }
                None => match (config.on_exhausted, last.as_ref()) {
                    (ExhaustedPolicy::RepeatLast, Some(value)) => Ok(value.clone()),
                    _ => Err(AttrError::Exhausted {
                        target: label.to_string(),
                    }),
                },
            },
        }
    }

    fn record_write(&mut self, value: &Value, config: PatchConfig) {
        if config.record_calls {
            self.calls.push(Call::Set(value.clone()));
        }
    }
}

struct HandleInner {
    id: PatchId,
    kind: PatchKind,
    label: String,
    owner: Owner,
    name: String,
    config: PatchConfig,
    state: Arc<Mutex<DoubleState>>,
    original: Mutex<Option<Binding>>,
    restored: AtomicBool,
}

/// Live substitution handle
///
/// Clones share the same double: configuring one clone is visible through
/// all of them and through the patched attribute.
#[derive(Clone)]
pub struct PatchHandle {
    inner: Arc<HandleInner>,
}

impl PatchHandle {
    pub(crate) fn new(owner: Owner, name: String, label: String, kind: PatchKind, config: PatchConfig) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: PatchId::new(),
                kind,
                label,
                owner,
                name,
                config,
                state: Arc::new(Mutex::new(DoubleState {
                    plan: ReturnPlan::Constant(Value::Unset),
                    calls: Vec::new(),
                })),
                original: Mutex::new(None),
                restored: AtomicBool::new(false),
            }),
        }
    }

    /// Build the substitute binding installed in the owner's slot
    ///
    /// The substitute only holds the shared double state, never the handle
    /// itself, so a restored slot drops its last reference to the double.
    pub(crate) fn substitute(&self) -> Binding {
        let label = self.inner.label.clone();
        let config = self.inner.config;
        let read_state = Arc::clone(&self.inner.state);
        let read = move || read_state.lock().read(&label, config);

        let state = Arc::clone(&self.inner.state);
        match self.inner.kind {
            PatchKind::Value => Binding::Cell(ValueCell::new(read, move |value| {
                let mut state = state.lock();
                state.record_write(&value, config);
                state.plan = ReturnPlan::Constant(value);
            })),
            PatchKind::ComputedRead => Binding::Property(Property::read_only(move |_| read())),
            PatchKind::ComputedReadWrite => Binding::Property(Property::read_write(
                move |_| read(),
                move |_, value| {
                    state.lock().record_write(&value, config);
                    Ok(())
                },
            )),
        }
    }

    pub(crate) fn store_original(&self, original: Binding) {
        *self.inner.original.lock() = Some(original);
    }

    pub(crate) fn take_original(&self) -> Option<Binding> {
        self.inner.original.lock().take()
    }

    pub(crate) fn mark_restored(&self) {
        self.inner.restored.store(true, Ordering::Release);
    }

    /// Unique id of this substitution
    #[inline]
    #[must_use]
    pub fn id(&self) -> PatchId {
        self.inner.id
    }

    /// Kind of attribute the double imitates
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PatchKind {
        self.inner.kind
    }

    /// Target label, e.g. `Foo.foo`
    #[inline]
    #[must_use]
    pub fn target_label(&self) -> &str {
        &self.inner.label
    }

    /// Owner whose slot is patched
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &Owner {
        &self.inner.owner
    }

    /// Patched attribute name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Configuration the double was created with
    #[inline]
    #[must_use]
    pub fn config(&self) -> PatchConfig {
        self.inner.config
    }

    /// Return `value` from every subsequent read
    pub fn set_return_value(&self, value: impl Into<Value>) {
        self.inner.state.lock().plan = ReturnPlan::Constant(value.into());
    }

    /// Return `values` one per subsequent read
    pub fn set_return_sequence<I, V>(&self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inner.state.lock().plan = ReturnPlan::Sequence {
            pending: values.into_iter().map(Into::into).collect(),
            last: None,
        };
    }

    /// Constant return value, if one is configured
    #[must_use]
    pub fn return_value(&self) -> Option<Value> {
        match &self.inner.state.lock().plan {
            ReturnPlan::Constant(value) => Some(value.clone()),
            ReturnPlan::Sequence { .. } => None,
        }
    }

    /// Snapshot of the call log
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.inner.state.lock().calls.clone()
    }

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.state.lock().calls.len()
    }

    /// Check if anything was recorded
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Clear the call log
    pub fn reset_calls(&self) {
        self.inner.state.lock().calls.clear();
    }

    /// Check if the original binding has been put back
    #[inline]
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.inner.restored.load(Ordering::Acquire)
    }
}

impl fmt::Debug for PatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchHandle")
            .field("id", &self.inner.id)
            .field("target", &self.inner.label)
            .field("kind", &self.inner.kind)
            .field("restored", &self.is_restored())
            .finish_non_exhaustive()
    }
}
