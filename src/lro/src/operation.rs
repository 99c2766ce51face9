// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::schema::{Decoded, Decoders, EchoFields, OperationSchema, Outcome};
use crate::stub::{OperationsStub, PollRequest};
use gax::Result;
use gax::clock::{Clock, SystemClock};
use gax::error::Error;
use gax::options::CallOptions;
use gax::retry_policy::RetryPolicy;
use std::collections::VecDeque;
use std::sync::Arc;
use wkt::message::Message;

/// A callback invoked once, when the operation is first observed done.
pub type DoneCallback<S, R, M> = Box<dyn FnOnce(&Operation<S, R, M>) -> Result<()> + Send>;

/// A callback invoked after every reload.
pub type ReloadCallback<S, R, M> = Box<dyn FnMut(&Operation<S, R, M>) -> Result<()> + Send>;

/// A handle to a long-running operation.
///
/// The handle holds the most recent snapshot of the operation, as returned by
/// the service. The snapshot only changes when the application reloads the
/// operation, either explicitly, via [reload()][Operation::reload], or
/// implicitly via [wait_until_done()][Operation::wait_until_done].
///
/// Applications can register callbacks to run when the operation completes.
/// Each callback runs exactly once, in registration order, on the thread that
/// first observes the operation as done.
///
/// # Parameters
/// * `S` - the [OperationSchema] describing the snapshot.
/// * `R` - the response type. Response payloads declaring this type are
///   decoded, other payloads are returned as-is.
/// * `M` - the metadata type. Metadata payloads declaring this type are
///   decoded, other payloads are returned as-is.
///
/// Payloads declaring other types are decoded if the builder registered a
/// decoder for them, see
/// [with_response_decoder()][OperationBuilder::with_response_decoder].
///
/// # Example
/// ```
/// # use cloud_lro::{Operation, OperationsStub, PollRequest};
/// # use cloud_lro::schema::Aip151;
/// # use gax::options::CallOptions;
/// # use std::sync::Arc;
/// # #[derive(Debug)]
/// # struct Stub;
/// # impl OperationsStub<longrunning::model::Operation> for Stub {
/// #     fn get_operation(&self, req: PollRequest, _: &CallOptions) -> gax::Result<longrunning::model::Operation> {
/// #         Ok(longrunning::model::Operation::new().set_name(req.name).set_done(true))
/// #     }
/// # }
/// # fn sample() -> gax::Result<()> {
/// let initial = longrunning::model::Operation::new().set_name("projects/p/operations/o");
/// let mut op = Operation::<Aip151>::builder(Aip151, initial, Arc::new(Stub))
///     .on_done(|op| {
///         println!("operation {:?} completed, error={}", op.name(), op.is_error());
///         Ok(())
///     })
///     .build()?;
/// op.wait_until_done()?;
/// assert!(op.is_done());
/// # Ok(()) }
/// # sample().unwrap();
/// ```
pub struct Operation<S, R = wkt::Any, M = wkt::Any>
where
    S: OperationSchema,
{
    schema: S,
    snapshot: S::Snapshot,
    stub: Arc<dyn OperationsStub<S::Snapshot>>,
    echo_fields: EchoFields,
    options: CallOptions,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    on_done: VecDeque<DoneCallback<S, R, M>>,
    on_reload: Vec<ReloadCallback<S, R, M>>,
    error_decoders: Decoders<S::Error>,
    response_decoders: Decoders<R>,
    metadata_decoders: Decoders<M>,
}

impl<S, R, M> Operation<S, R, M>
where
    S: OperationSchema,
    R: Message + 'static,
    M: Message + 'static,
{
    /// Returns a builder to create a handle from the initial `snapshot`.
    ///
    /// The `snapshot` is typically the value returned by the method that
    /// started the operation.
    pub fn builder(
        schema: S,
        snapshot: S::Snapshot,
        stub: Arc<dyn OperationsStub<S::Snapshot>>,
    ) -> OperationBuilder<S, R, M> {
        OperationBuilder::new(schema, snapshot, stub)
    }

    /// The most recent snapshot of the operation.
    pub fn snapshot(&self) -> &S::Snapshot {
        &self.snapshot
    }

    /// The schema used to interpret the snapshot.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// The values sent with every poll request.
    ///
    /// These are captured when the handle is created, and never change.
    pub fn echo_fields(&self) -> &EchoFields {
        &self.echo_fields
    }

    /// The name of the operation, if the snapshot has one.
    pub fn name(&self) -> Option<&str> {
        self.schema.name(&self.snapshot)
    }

    /// Returns true if the operation has completed, successfully or not.
    pub fn is_done(&self) -> bool {
        self.schema.is_done(&self.snapshot)
    }

    /// Returns true if the operation has completed with an error.
    pub fn is_error(&self) -> bool {
        self.is_done() && self.schema.error(&self.snapshot).is_some()
    }

    /// Returns true if the operation has completed successfully.
    pub fn is_response(&self) -> bool {
        self.is_done() && self.schema.error(&self.snapshot).is_none()
    }

    /// The outcome of a completed operation.
    ///
    /// Returns `None` while the operation is in progress, and for successful
    /// operations that carry no response payload.
    pub fn results(&self) -> Option<Outcome<S::Error, Decoded<R>>> {
        if !self.is_done() {
            return None;
        }
        match self.schema.error(&self.snapshot) {
            Some(e) => Some(Outcome::Error(self.decode_error(e))),
            None => self
                .schema
                .response(&self.snapshot)
                .map(|p| Outcome::Response(self.response_decoders.decode(p))),
        }
    }

    /// The error of an operation that completed with an error.
    pub fn error(&self) -> Option<S::Error> {
        match self.results()? {
            Outcome::Error(e) => Some(e),
            Outcome::Response(_) => None,
        }
    }

    /// The response of an operation that completed successfully.
    pub fn response(&self) -> Option<Decoded<R>> {
        match self.results()? {
            Outcome::Response(r) => Some(r),
            Outcome::Error(_) => None,
        }
    }

    /// The metadata of the operation.
    ///
    /// Unlike the response, this is available while the operation is in
    /// progress.
    pub fn metadata(&self) -> Option<Decoded<M>> {
        self.schema
            .metadata(&self.snapshot)
            .map(|p| self.metadata_decoders.decode(p))
    }

    /// Fetches the latest state of the operation.
    ///
    /// This makes exactly one request, using the default call options for
    /// this handle. See [reload_with][Operation::reload_with].
    pub fn reload(&mut self) -> Result<&mut Self> {
        let options = self.options.clone();
        self.reload_with(&options)
    }

    /// Fetches the latest state of the operation using `options`.
    ///
    /// The new snapshot replaces the current one. If the operation is done,
    /// any pending done callbacks run. Then all the reload callbacks run.
    ///
    /// Errors reaching the service, and errors returned by callbacks, are
    /// returned to the caller. A failed request leaves the snapshot unchanged.
    pub fn reload_with(&mut self, options: &CallOptions) -> Result<&mut Self> {
        let name = self.require_name()?.to_string();
        let req = PollRequest::new()
            .set_name(name.as_str())
            .set_echo_fields(self.echo_fields.clone());
        self.snapshot = self.stub.get_operation(req, options)?;
        tracing::debug!("polled operation {name}, done={}", self.is_done());
        self.dispatch_done()?;
        self.dispatch_reload()?;
        Ok(self)
    }

    /// Blocks until the operation completes, or the default retry policy is
    /// exhausted.
    ///
    /// See [wait_until_done_with][Operation::wait_until_done_with].
    pub fn wait_until_done(&mut self) -> Result<&mut Self> {
        let policy = self.policy.clone();
        let options = self.options.clone();
        self.wait_until_done_with(&policy, &options)
    }

    /// Blocks until the operation completes, or `policy` is exhausted.
    ///
    /// A timeout is not an error. Applications should check
    /// [is_done()][Operation::is_done] after this function returns. Likewise,
    /// an operation that completes with an error is not an error for this
    /// function, check [is_error()][Operation::is_error].
    ///
    /// The loop stops on the first error reaching the service, or returned by
    /// a callback. It does not retry failed requests.
    ///
    /// The elapsed time is checked before each sleep, so a slow reload may
    /// take the loop past the policy's timeout.
    pub fn wait_until_done_with(
        &mut self,
        policy: &RetryPolicy,
        options: &CallOptions,
    ) -> Result<&mut Self> {
        crate::wait::wait_until_done(self, policy, options)?;
        Ok(self)
    }

    /// Starts the cancellation of the operation.
    ///
    /// This makes one request with the default call options. The snapshot is
    /// not modified, reload the operation to observe the cancellation.
    pub fn cancel(&self) -> Result<()> {
        let name = self.require_name()?;
        self.stub.cancel_operation(name, &self.options)
    }

    /// Deletes the operation.
    ///
    /// This makes one request with the default call options.
    pub fn delete(&self) -> Result<()> {
        let name = self.require_name()?;
        self.stub.delete_operation(name, &self.options)
    }

    /// Registers a callback to run when the operation completes.
    ///
    /// If the operation is already done the callback runs immediately, before
    /// this function returns.
    pub fn on_done<F>(&mut self, callback: F) -> Result<&mut Self>
    where
        F: FnOnce(&Self) -> Result<()> + Send + 'static,
    {
        self.on_done.push_back(Box::new(callback));
        self.dispatch_done()?;
        Ok(self)
    }

    /// Registers a callback to run after every reload.
    pub fn on_reload<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&Self) -> Result<()> + Send + 'static,
    {
        self.on_reload.push(Box::new(callback));
        self
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Replaces `error` with the decoded error payload, if there is a decoder
    /// for its type.
    fn decode_error(&self, error: S::Error) -> S::Error {
        let decoded = self
            .schema
            .error_payload(&self.snapshot)
            .map(|p| self.error_decoders.decode(p));
        match decoded {
            Some(Decoded::Message(e)) => e,
            _ => error,
        }
    }

    fn require_name(&self) -> Result<&str> {
        self.name()
            .ok_or_else(|| Error::other("the operation has no name, it cannot be polled"))
    }

    /// Runs the pending done callbacks, in registration order.
    ///
    /// Each callback is removed before it runs. A failing callback stops the
    /// dispatch, the remaining callbacks run the next time.
    fn dispatch_done(&mut self) -> Result<()> {
        if !self.is_done() {
            return Ok(());
        }
        while let Some(callback) = self.on_done.pop_front() {
            callback(&*self)?;
        }
        Ok(())
    }

    fn dispatch_reload(&mut self) -> Result<()> {
        let mut callbacks = std::mem::take(&mut self.on_reload);
        let this: &Self = self;
        let result = callbacks.iter_mut().try_for_each(|callback| callback(this));
        self.on_reload = callbacks;
        result
    }
}

impl<S, R, M> std::fmt::Debug for Operation<S, R, M>
where
    S: OperationSchema,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("schema", &self.schema)
            .field("snapshot", &self.snapshot)
            .field("stub", &self.stub)
            .field("echo_fields", &self.echo_fields)
            .field("options", &self.options)
            .field("policy", &self.policy)
            .field("clock", &self.clock)
            .field("on_done", &self.on_done.len())
            .field("on_reload", &self.on_reload.len())
            .field("error_decoders", &self.error_decoders)
            .field("response_decoders", &self.response_decoders)
            .field("metadata_decoders", &self.metadata_decoders)
            .finish()
    }
}

/// Creates [Operation] handles.
///
/// The builder captures the configuration for a handle: the default options
/// for reloads, the default retry policy for waits, the clock, any additional
/// echo fields, the payload decoders, and the callbacks to register before the
/// handle is created.
pub struct OperationBuilder<S, R = wkt::Any, M = wkt::Any>
where
    S: OperationSchema,
{
    schema: S,
    snapshot: S::Snapshot,
    stub: Arc<dyn OperationsStub<S::Snapshot>>,
    echo_fields: EchoFields,
    options: CallOptions,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    on_done: Vec<DoneCallback<S, R, M>>,
    on_reload: Vec<ReloadCallback<S, R, M>>,
    error_decoders: Decoders<S::Error>,
    response_decoders: Decoders<R>,
    metadata_decoders: Decoders<M>,
}

impl<S, R, M> OperationBuilder<S, R, M>
where
    S: OperationSchema,
    R: Message + 'static,
    M: Message + 'static,
{
    fn new(schema: S, snapshot: S::Snapshot, stub: Arc<dyn OperationsStub<S::Snapshot>>) -> Self {
        Self {
            schema,
            snapshot,
            stub,
            echo_fields: EchoFields::new(),
            options: CallOptions::default(),
            policy: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
            on_done: Vec::new(),
            on_reload: Vec::new(),
            error_decoders: Decoders::new(),
            response_decoders: Decoders::for_message(),
            metadata_decoders: Decoders::for_message(),
        }
    }

    /// Sets the default options for reloads.
    pub fn with_call_options<V: Into<CallOptions>>(mut self, v: V) -> Self {
        self.options = v.into();
        self
    }

    /// Sets the default retry policy for waits.
    pub fn with_retry_policy<V: Into<RetryPolicy>>(mut self, v: V) -> Self {
        self.policy = v.into();
        self
    }

    /// Sets the clock used to sleep between reloads.
    pub fn with_clock<C: Clock + 'static>(mut self, v: C) -> Self {
        self.clock = Arc::new(v);
        self
    }

    /// Adds a value to send with every poll request.
    ///
    /// These values are merged with the echo fields defined by the schema,
    /// replacing any schema values with the same key.
    pub fn with_echo_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.echo_fields.insert(key.into(), value.into());
        self
    }

    /// Registers a decoder for response payloads declaring `typename`.
    ///
    /// Payloads declaring `R` are decoded without any registration. Use this
    /// function when the service may return other types, for example, when
    /// `R` is an enum over several messages. The `typename` does not include
    /// the `type.googleapis.com/` prefix.
    ///
    /// # Example
    /// ```
    /// # use cloud_lro::Operation;
    /// # use cloud_lro::schema::Aip151;
    /// # use std::sync::Arc;
    /// # fn sample(stub: Arc<dyn cloud_lro::OperationsStub<longrunning::model::Operation>>) -> gax::Result<()> {
    /// let initial = longrunning::model::Operation::new().set_name("projects/p/operations/o");
    /// let _op = Operation::<Aip151>::builder(Aip151, initial, stub)
    ///     .with_response_decoder("test.v1.Volume", |any| Ok(any.clone()))
    ///     .build()?;
    /// # Ok(()) }
    /// ```
    pub fn with_response_decoder<N, F>(mut self, typename: N, decoder: F) -> Self
    where
        N: Into<String>,
        F: Fn(&wkt::Any) -> Result<R> + Send + Sync + 'static,
    {
        self.response_decoders.insert(typename, decoder);
        self
    }

    /// Registers a decoder for metadata payloads declaring `typename`.
    ///
    /// Like [with_response_decoder()][Self::with_response_decoder], payloads
    /// declaring `M` need no registration.
    pub fn with_metadata_decoder<N, F>(mut self, typename: N, decoder: F) -> Self
    where
        N: Into<String>,
        F: Fn(&wkt::Any) -> Result<M> + Send + Sync + 'static,
    {
        self.metadata_decoders.insert(typename, decoder);
        self
    }

    /// Registers a decoder for error payloads declaring `typename`.
    ///
    /// Only schemas that expose the error as a type-tagged payload consult
    /// these decoders, see [OperationSchema::error_payload]. Without a
    /// matching decoder, the error is the value returned by the schema.
    pub fn with_error_decoder<N, F>(mut self, typename: N, decoder: F) -> Self
    where
        N: Into<String>,
        F: Fn(&wkt::Any) -> Result<S::Error> + Send + Sync + 'static,
    {
        self.error_decoders.insert(typename, decoder);
        self
    }

    /// Registers a callback to run when the operation completes.
    ///
    /// If the initial snapshot is done, the callback runs in
    /// [build()][OperationBuilder::build].
    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Operation<S, R, M>) -> Result<()> + Send + 'static,
    {
        self.on_done.push(Box::new(callback));
        self
    }

    /// Registers a callback to run after every reload.
    pub fn on_reload<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Operation<S, R, M>) -> Result<()> + Send + 'static,
    {
        self.on_reload.push(Box::new(callback));
        self
    }

    /// Creates the handle.
    ///
    /// If the initial snapshot is already done, the done callbacks run before
    /// this function returns. A failing callback makes this function fail.
    pub fn build(self) -> Result<Operation<S, R, M>> {
        let mut echo_fields = self.schema.echo_fields(&self.snapshot);
        echo_fields.extend(self.echo_fields);
        let mut operation = Operation {
            schema: self.schema,
            snapshot: self.snapshot,
            stub: self.stub,
            echo_fields,
            options: self.options,
            policy: self.policy,
            clock: self.clock,
            on_done: self.on_done.into(),
            on_reload: self.on_reload,
            error_decoders: self.error_decoders,
            response_decoders: self.response_decoders,
            metadata_decoders: self.metadata_decoders,
        };
        operation.dispatch_done()?;
        Ok(operation)
    }
}
