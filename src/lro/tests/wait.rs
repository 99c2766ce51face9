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

//! Drives operations through a fake service and a virtual clock.

use cloud_lro::schema::{DoneFlag, FieldMapping, Record};
use cloud_lro::{Decoded, Operation, OperationsStub, Outcome, PollRequest};
use gax::Result;
use gax::clock::Clock;
use gax::options::CallOptions;
use gax::retry_policy::RetryPolicy;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct ClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// A clock where time only moves when somebody sleeps or advances it.
#[derive(Clone, Debug)]
struct FakeClock {
    start: Instant,
    state: Arc<Mutex<ClockState>>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            state: Arc::default(),
        }
    }

    fn advance(&self, d: Duration) {
        self.state.lock().unwrap().elapsed += d;
    }

    fn sleeps(&self) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        state.sleeps.iter().map(Duration::as_secs).collect()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + self.state.lock().unwrap().elapsed
    }

    fn sleep(&self, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.elapsed += delay;
        state.sleeps.push(delay);
    }
}

/// Simulates a compute-style operation, done after `done_at` polls.
#[derive(Debug)]
struct FakeService {
    clock: FakeClock,
    poll_latency: Duration,
    done_at: Option<usize>,
    requests: Mutex<Vec<PollRequest>>,
}

impl FakeService {
    fn new(clock: FakeClock, done_at: Option<usize>) -> Self {
        Self {
            clock,
            poll_latency: Duration::ZERO,
            done_at,
            requests: Mutex::default(),
        }
    }

    fn with_poll_latency(mut self, v: Duration) -> Self {
        self.poll_latency = v;
        self
    }

    fn requests(&self) -> Vec<PollRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl OperationsStub<Record> for FakeService {
    fn get_operation(&self, req: PollRequest, _options: &CallOptions) -> Result<Record> {
        self.clock.advance(self.poll_latency);
        let mut requests = self.requests.lock().unwrap();
        requests.push(req.clone());
        let count = requests.len();
        let status = match self.done_at {
            Some(n) if count >= n => "DONE",
            _ => "RUNNING",
        };
        // The service never returns the zone, the handle must echo the
        // value from the original resource.
        Ok(record(json!({
            "name": req.name,
            "status": status,
            "progress": {"percent": count * 10},
        })))
    }
}

fn record(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

fn schema() -> FieldMapping {
    FieldMapping::new("name", DoneFlag::value("status", "DONE"))
        .with_error_field("error")
        .with_metadata_field("progress")
        .with_echo_field("zone")
}

fn initial() -> Record {
    record(json!({
        "name": "operation-123",
        "status": "PENDING",
        "zone": "us-central1-a",
    }))
}

fn policy(timeout: u64) -> RetryPolicy {
    RetryPolicy::builder()
        .with_initial_delay(Duration::from_secs(10))
        .with_multiplier(2.0)
        .with_max_delay(Duration::from_secs(300))
        .with_timeout(Duration::from_secs(timeout))
        .build()
        .unwrap()
}

#[test]
fn done_on_tenth_poll() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let service = Arc::new(FakeService::new(clock.clone(), Some(10)));
    let mut op = Operation::<FieldMapping>::builder(schema(), initial(), service.clone())
        .with_clock(clock.clone())
        .with_retry_policy(policy(3600))
        .build()?;
    op.wait_until_done()?;

    assert!(op.is_done(), "{op:?}");
    assert!(op.is_response(), "{op:?}");
    assert_eq!(
        clock.sleeps(),
        vec![10, 20, 40, 80, 160, 300, 300, 300, 300, 300]
    );
    assert_eq!(service.requests().len(), 10);
    Ok(())
}

#[test]
fn timeout_leaves_operation_pending() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let latency = Duration::from_secs(100);
    let service = FakeService::new(clock.clone(), None).with_poll_latency(latency);
    let service = Arc::new(service);
    let mut op = Operation::<FieldMapping>::builder(schema(), initial(), service.clone())
        .with_clock(clock.clone())
        .build()?;
    op.wait_until_done_with(&policy(400), &CallOptions::default())?;

    assert!(!op.is_done(), "{op:?}");
    assert!(op.results().is_none(), "{op:?}");
    assert_eq!(clock.sleeps(), vec![10, 20, 40, 80]);
    assert_eq!(service.requests().len(), 4);
    Ok(())
}

#[test]
fn echo_fields_survive_reloads() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let service = Arc::new(FakeService::new(clock.clone(), Some(5)));
    let mut op = Operation::<FieldMapping>::builder(schema(), initial(), service.clone())
        .with_clock(clock)
        .with_retry_policy(policy(3600))
        .build()?;
    op.wait_until_done()?;
    assert!(op.is_done(), "{op:?}");
    // The latest snapshot has no zone, the echo fields come from the
    // original resource.
    assert!(op.snapshot().get("zone").is_none(), "{op:?}");

    let requests = service.requests();
    assert_eq!(requests.len(), 5);
    for req in requests {
        assert_eq!(req.name, "operation-123");
        assert_eq!(req.echo_fields.get("zone"), Some(&json!("us-central1-a")));
    }
    Ok(())
}

#[test]
fn metadata_while_in_progress() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let service = Arc::new(FakeService::new(clock.clone(), None));
    let mut op = Operation::<FieldMapping>::builder(schema(), initial(), service)
        .with_clock(clock)
        .build()?;
    assert!(op.metadata().is_none(), "{op:?}");
    op.reload()?.reload()?;
    let raw = op.metadata().and_then(|m| m.raw().cloned());
    assert_eq!(
        raw.as_ref().and_then(|r| r.as_map().get("percent")),
        Some(&json!(20))
    );
    assert!(!op.is_done(), "{op:?}");
    Ok(())
}

#[test]
fn callbacks_during_wait() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let service = Arc::new(FakeService::new(clock.clone(), Some(3)));
    let events = Arc::new(Mutex::new(Vec::new()));
    let on_reload = events.clone();
    let on_done = events.clone();
    let mut op = Operation::<FieldMapping>::builder(schema(), initial(), service)
        .with_clock(clock)
        .with_retry_policy(policy(3600))
        .on_reload(move |op| {
            on_reload
                .lock()
                .unwrap()
                .push(format!("reload:{}", op.is_done()));
            Ok(())
        })
        .on_done(move |op| {
            let outcome = match op.results() {
                Some(Outcome::Response(Decoded::Raw(_))) => "response",
                Some(_) => "other",
                None => "none",
            };
            on_done.lock().unwrap().push(format!("done:{outcome}"));
            Ok(())
        })
        .build()?;
    op.wait_until_done()?;
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "reload:false",
            "reload:false",
            "done:response",
            "reload:true"
        ]
    );
    Ok(())
}

#[test]
fn shared_service_many_threads() -> anyhow::Result<()> {
    let clock = FakeClock::new();
    let service = Arc::new(FakeService::new(clock.clone(), Some(1)));
    let handles = (0..4)
        .map(|i| {
            let stub: Arc<dyn OperationsStub<Record>> = service.clone();
            let clock = clock.clone();
            std::thread::spawn(move || -> Result<bool> {
                let name = format!("operation-{i}");
                let initial = record(json!({"name": name, "status": "PENDING"}));
                let mut op = Operation::<FieldMapping>::builder(schema(), initial, stub)
                    .with_clock(clock)
                    .build()?;
                op.wait_until_done()?;
                Ok(op.is_done())
            })
        })
        .collect::<Vec<_>>();
    for h in handles {
        let done = h.join().expect("thread should not panic")?;
        assert!(done);
    }
    assert_eq!(service.requests().len(), 4);
    Ok(())
}
