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

//! Implements the loop to wait for an operation to complete.

use crate::operation::Operation;
use crate::schema::OperationSchema;
use gax::Result;
use gax::options::CallOptions;
use gax::retry_policy::RetryPolicy;
use wkt::message::Message;

/// Reloads `operation` until it is done, or `policy` is exhausted.
///
/// The first delay is the policy's initial delay, and each subsequent delay
/// grows by the policy's multiplier, up to its maximum delay. The loop checks
/// the elapsed time before each sleep, a single slow reload may take the loop
/// beyond the policy's timeout.
pub(crate) fn wait_until_done<S, R, M>(
    operation: &mut Operation<S, R, M>,
    policy: &RetryPolicy,
    options: &CallOptions,
) -> Result<()>
where
    S: OperationSchema,
    R: Message + 'static,
    M: Message + 'static,
{
    let clock = operation.clock();
    let loop_start = clock.now();
    let mut delay = policy.initial_delay();
    loop {
        if operation.is_done() {
            return Ok(());
        }
        let elapsed = clock.now().saturating_duration_since(loop_start);
        if policy.is_exhausted(elapsed) {
            tracing::debug!(
                "operation {:?} not done after {elapsed:?}, timeout={:?}",
                operation.name(),
                policy.timeout()
            );
            return Ok(());
        }
        tracing::debug!("waiting {delay:?} before polling {:?}", operation.name());
        clock.sleep(delay);
        operation.reload_with(options)?;
        delay = policy.next_delay(delay);
    }
}

#[cfg(test)]
mod tests {
    use crate::operation::Operation;
    use crate::schema::Aip151;
    use crate::stub::{OperationsStub, PollRequest};
    use gax::Result;
    use gax::clock::Clock;
    use gax::error::Error;
    use gax::error::rpc::{Code, Status};
    use gax::options::CallOptions;
    use gax::retry_policy::RetryPolicy;
    use longrunning::model::Operation as Snapshot;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    mockall::mock! {
        #[derive(Debug)]
        Stub {}
        impl OperationsStub<Snapshot> for Stub {
            fn get_operation(&self, req: PollRequest, options: &CallOptions) -> Result<Snapshot>;
        }
    }

    mockall::mock! {
        #[derive(Debug)]
        Clock {}
        impl Clock for Clock {
            fn now(&self) -> Instant;
            fn sleep(&self, delay: Duration);
        }
    }

    fn pending() -> Snapshot {
        Snapshot::new().set_name("projects/p/operations/o")
    }

    fn done() -> Snapshot {
        pending()
            .set_done(true)
            .set_error(Status::default().set_code(Code::Aborted))
    }

    fn test_policy(timeout: u64) -> RetryPolicy {
        RetryPolicy::builder()
            .with_initial_delay(Duration::from_secs(10))
            .with_multiplier(2.0)
            .with_max_delay(Duration::from_secs(300))
            .with_timeout(Duration::from_secs(timeout))
            .build()
            .unwrap()
    }

    fn frozen_clock() -> MockClock {
        let start = Instant::now();
        let mut clock = MockClock::new();
        clock.expect_now().returning(move || start);
        clock
    }

    #[test]
    fn already_done() -> anyhow::Result<()> {
        let mut clock = MockClock::new();
        clock.expect_now().returning(Instant::now);
        clock.expect_sleep().never();
        let mut stub = MockStub::new();
        stub.expect_get_operation().never();

        let mut op: Operation<Aip151> = Operation::builder(Aip151, done(), Arc::new(stub))
            .with_clock(clock)
            .build()?;
        op.wait_until_done()?;
        assert!(op.is_done(), "{op:?}");
        Ok(())
    }

    #[test]
    fn backoff_sequence() -> anyhow::Result<()> {
        let mut seq = mockall::Sequence::new();
        let mut clock = frozen_clock();
        let mut stub = MockStub::new();
        let delays = [10, 20, 40, 80, 160, 300, 300, 300, 300, 300];
        for (i, d) in delays.into_iter().enumerate() {
            clock
                .expect_sleep()
                .once()
                .in_sequence(&mut seq)
                .withf(move |delay| delay == &Duration::from_secs(d))
                .return_const(());
            let snapshot = if i + 1 == delays.len() {
                done()
            } else {
                pending()
            };
            stub.expect_get_operation()
                .once()
                .in_sequence(&mut seq)
                .return_once(move |_, _| Ok(snapshot));
        }

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .build()?;
        op.wait_until_done_with(&test_policy(3600), &CallOptions::default())?;
        assert!(op.is_done(), "{op:?}");
        assert!(op.is_error(), "{op:?}");
        Ok(())
    }

    #[test]
    fn zero_timeout() -> anyhow::Result<()> {
        let mut clock = frozen_clock();
        clock.expect_sleep().never();
        let mut stub = MockStub::new();
        stub.expect_get_operation().never();

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .build()?;
        op.wait_until_done_with(&test_policy(0), &CallOptions::default())?;
        assert!(!op.is_done(), "{op:?}");
        Ok(())
    }

    #[test]
    fn default_policy() -> anyhow::Result<()> {
        let mut seq = mockall::Sequence::new();
        let mut clock = frozen_clock();
        let mut stub = MockStub::new();
        for (d, snapshot) in [(1000, pending()), (1300, done())] {
            clock
                .expect_sleep()
                .once()
                .in_sequence(&mut seq)
                .withf(move |delay| delay.as_millis() == d)
                .return_const(());
            stub.expect_get_operation()
                .once()
                .in_sequence(&mut seq)
                .return_once(move |_, _| Ok(snapshot));
        }

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .build()?;
        op.wait_until_done()?;
        assert!(op.is_done(), "{op:?}");
        Ok(())
    }

    #[test]
    fn call_options_are_forwarded() -> anyhow::Result<()> {
        let mut clock = frozen_clock();
        clock.expect_sleep().return_const(());
        let mut stub = MockStub::new();
        stub.expect_get_operation()
            .once()
            .withf(|_, options| options.metadata().contains_key("x-test"))
            .returning(|_, _| Ok(done()));

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .with_call_options(CallOptions::default().with_metadata("x-other", "other"))
            .build()?;
        let options = CallOptions::default().with_metadata("x-test", "value");
        op.wait_until_done_with(&test_policy(3600), &options)?;
        assert!(op.is_done(), "{op:?}");
        Ok(())
    }

    #[test]
    fn poll_error_stops_the_loop() -> anyhow::Result<()> {
        let mut clock = frozen_clock();
        clock.expect_sleep().times(2).return_const(());
        let mut seq = mockall::Sequence::new();
        let mut stub = MockStub::new();
        stub.expect_get_operation()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(pending()));
        stub.expect_get_operation()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _| {
                let status = Status::default().set_code(Code::Unavailable);
                Err(Error::service(status))
            });

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .build()?;
        let err = op
            .wait_until_done_with(&test_policy(3600), &CallOptions::default())
            .unwrap_err();
        assert_eq!(err.status().map(|s| s.code), Some(Code::Unavailable));
        assert!(!op.is_done(), "{op:?}");
        Ok(())
    }

    #[test]
    fn callback_error_stops_the_loop() -> anyhow::Result<()> {
        let mut clock = frozen_clock();
        clock.expect_sleep().once().return_const(());
        let mut stub = MockStub::new();
        stub.expect_get_operation()
            .once()
            .returning(|_, _| Ok(pending()));

        let mut op: Operation<Aip151> = Operation::builder(Aip151, pending(), Arc::new(stub))
            .with_clock(clock)
            .on_reload(|_| Err(Error::other("stop")))
            .build()?;
        let err = op.wait_until_done().unwrap_err();
        assert!(err.to_string().contains("stop"), "{err}");
        Ok(())
    }
}
