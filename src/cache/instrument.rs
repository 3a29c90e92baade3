//! Instrumentation Layers
//!
//! Composable wrappers that count calls and record call history in the
//! backing store.
//!
//! An [`Operation`] is a boxed function from an argument tuple to a result.
//! Each layer takes an operation and returns a new one with the same
//! signature, so layers stack freely:
//!
//! ```ignore
//! let op = count_calls(store.clone(), "Thing::run", call_history(store, "Thing::run", op));
//! ```
//!
//! With counting outermost the store sees, per call:
//! `INCR method`, `RPUSH method:inputs`, the wrapped commands, `RPUSH method:outputs`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{CacheError, Result};
use crate::store::StoreClient;

/// A callable unit of work that can be wrapped by instrumentation layers.
pub type Operation<A, R> = Box<dyn Fn(A) -> Result<R> + Send + Sync>;

// == Store Keys ==
/// Store key of the list holding serialized inputs for `method`.
pub fn inputs_key(method: &str) -> String {
    format!("{}:inputs", method)
}

/// Store key of the list holding serialized outputs for `method`.
pub fn outputs_key(method: &str) -> String {
    format!("{}:outputs", method)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Internal(e.to_string()))
}

// == Counting Layer ==
/// Wraps `op` so every invocation first increments the counter at `method`.
///
/// The increment happens before `op` runs, so failing calls are counted too.
pub fn count_calls<A, R>(
    store: Arc<dyn StoreClient>,
    method: &str,
    op: Operation<A, R>,
) -> Operation<A, R>
where
    A: 'static,
    R: 'static,
{
    let key = method.to_string();
    Box::new(move |args| {
        store.increment(&key)?;
        op(args)
    })
}

// == History Layer ==
/// Wraps `op` so its arguments and result are appended to the
/// `method:inputs` and `method:outputs` lists.
///
/// The input is recorded before `op` runs and the output after. A failed
/// call records `{"error": ...}` as its output so the two lists stay aligned;
/// the call's error is returned either way.
pub fn call_history<A, R>(
    store: Arc<dyn StoreClient>,
    method: &str,
    op: Operation<A, R>,
) -> Operation<A, R>
where
    A: Serialize + 'static,
    R: Serialize + 'static,
{
    let method_name = method.to_string();
    let inputs = inputs_key(method);
    let outputs = outputs_key(method);
    Box::new(move |args| {
        store.append_to_list(&inputs, &encode(&args)?)?;
        match op(args) {
            Ok(result) => {
                store.append_to_list(&outputs, &encode(&result)?)?;
                Ok(result)
            }
            Err(err) => {
                let record = json!({ "error": err.to_string() });
                // The call's own error wins over a failure to record it
                if let Err(record_err) =
                    encode(&record).and_then(|bytes| store.append_to_list(&outputs, &bytes))
                {
                    warn!(
                        "Failed to record output of {} call, history is now misaligned: {}",
                        method_name, record_err
                    );
                }
                Err(err)
            }
        }
    })
}

// == Reading Instrumentation Back ==
/// One recorded invocation of an instrumented method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    /// Serialized argument tuple
    pub inputs: Value,
    /// Serialized result, None while the call has not finished
    pub output: Option<Value>,
}

/// Returns the counter for `method`, 0 if it was never called.
pub fn call_count(store: &dyn StoreClient, method: &str) -> Result<i64> {
    match store.get(method)? {
        None => Ok(0),
        Some(raw) => crate::cache::decode_integer(raw),
    }
}

/// Returns the recorded calls of `method`, inputs and outputs paired by position.
pub fn call_records(store: &dyn StoreClient, method: &str) -> Result<Vec<CallRecord>> {
    let inputs = store.list_range(&inputs_key(method))?;
    let mut outputs = store.list_range(&outputs_key(method))?.into_iter();

    inputs
        .into_iter()
        .map(|input| {
            Ok(CallRecord {
                inputs: parse_record(&input)?,
                output: outputs.next().map(|o| parse_record(&o)).transpose()?,
            })
        })
        .collect()
}

fn parse_record(raw: &[u8]) -> Result<Value> {
    serde_json::from_slice(raw).map_err(|e| CacheError::Decode(e.to_string()))
}
