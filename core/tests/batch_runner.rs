mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{numbered_dataset, RecordingObserver};
use pretty_assertions::assert_eq;
use rowflow_core::executor::types::ExecStats;
use rowflow_core::{
    handler_fn, process_dataset, BatchConfig, BatchError, BatchRunner, ConfigError, Dataset, Row,
    RowHandler, RunEvent, RunObserver, ValidationError,
};

fn runner_with(config: BatchConfig) -> (BatchRunner, Arc<RecordingObserver>) {
    let recorder = Arc::new(RecordingObserver::default());
    let runner = BatchRunner::new(config).with_observer(recorder.clone());
    (runner, recorder)
}

fn ok_handler() -> impl RowHandler {
    handler_fn(|_row: &Row| async { Ok(()) })
}

#[tokio::test]
async fn test_processes_every_row_without_errors() {
    let dataset = numbered_dataset(137);
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = {
        let calls = calls.clone();
        handler_fn(move |_row: &Row| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
    };

    let (runner, _) = runner_with(BatchConfig::default().with_batch_size(10));
    let stats = runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(stats.total, 137);
    assert_eq!(stats.processed, 137);
    assert_eq!(stats.errors, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 137);
}

#[tokio::test]
async fn test_failing_rows_are_counted_not_propagated() {
    let dataset = numbered_dataset(2500);
    let handler = handler_fn(|row: &Row| {
        let index = row.index();
        async move {
            if index % 7 == 0 {
                anyhow::bail!("synthetic failure for row {index}");
            }
            Ok(())
        }
    });

    let config = BatchConfig::default()
        .with_batch_size(1000)
        .with_concurrency(3);
    let (runner, recorder) = runner_with(config);
    let stats = runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(stats.processed, 2500);
    // Indices are 0-based, so row 0 fails too: ceil(2500 / 7) rows.
    assert_eq!(stats.errors, 358);
    assert_eq!(stats.succeeded(), 2500 - 358);
    assert!(stats.has_errors());
    assert_eq!(recorder.batch_sizes(), vec![1000, 1000, 500]);

    let mut failed = recorder.failed_rows();
    failed.sort_unstable();
    let expected: Vec<usize> = (0..2500).filter(|i| i % 7 == 0).collect();
    assert_eq!(failed, expected);
}

#[tokio::test]
async fn test_row_failure_event_identifies_row() {
    let dataset = numbered_dataset(3);
    let handler = handler_fn(|row: &Row| {
        let id = row.get_str("id").map(str::to_string);
        async move {
            match id.as_deref() {
                Some("row-1") => Err(anyhow::anyhow!("upstream returned 503")),
                _ => Ok(()),
            }
        }
    });

    let (runner, recorder) = runner_with(BatchConfig::default());
    runner.run(&dataset, &handler).await.unwrap();

    let failures: Vec<(usize, String)> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RunEvent::RowFailed {
                row_index, error, ..
            } => Some((row_index, error)),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![(1, "upstream returned 503".to_string())]);
}

#[tokio::test]
async fn test_log_errors_disabled_suppresses_failure_events() {
    let dataset = numbered_dataset(20);
    let handler = handler_fn(|_row: &Row| async { Err(anyhow::anyhow!("nope")) });

    let (runner, recorder) = runner_with(BatchConfig::default().with_log_errors(false));
    let stats = runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(stats.errors, 20);
    assert_eq!(stats.processed, 20);
    assert!(recorder.failed_rows().is_empty());
}

#[tokio::test]
async fn test_in_flight_never_exceeds_concurrency() {
    let dataset = numbered_dataset(60);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handler = {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        handler_fn(move |row: &Row| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            let delay = Duration::from_millis(1 + (row.index() % 3) as u64);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
    };

    let config = BatchConfig::default()
        .with_batch_size(25)
        .with_concurrency(4);
    let (runner, _) = runner_with(config);
    let stats = runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(stats.processed, 60);
    assert_eq!(peak.load(Ordering::SeqCst), 4);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
}

#[derive(Debug, Clone, PartialEq)]
enum Trace {
    BatchStart(usize),
    BatchEnd(usize),
    RowStart(usize),
    RowDone(usize),
}

struct TraceObserver(Arc<Mutex<Vec<Trace>>>);

impl RunObserver for TraceObserver {
    fn name(&self) -> &str {
        "trace"
    }

    fn observe(&self, event: &RunEvent) {
        let entry = match event {
            RunEvent::BatchStart { batch_index, .. } => Trace::BatchStart(*batch_index),
            RunEvent::BatchEnd { batch_index, .. } => Trace::BatchEnd(*batch_index),
            _ => return,
        };
        self.0.lock().unwrap().push(entry);
    }
}

#[tokio::test]
async fn test_batches_complete_before_next_batch_starts() {
    let dataset = numbered_dataset(23);
    let trace = Arc::new(Mutex::new(Vec::new()));

    let handler = {
        let trace = trace.clone();
        handler_fn(move |row: &Row| {
            let trace = trace.clone();
            let index = row.index();
            async move {
                trace.lock().unwrap().push(Trace::RowStart(index));
                tokio::time::sleep(Duration::from_millis((7 - index % 7) as u64)).await;
                trace.lock().unwrap().push(Trace::RowDone(index));
                Ok(())
            }
        })
    };

    let runner = BatchRunner::new(
        BatchConfig::default()
            .with_batch_size(10)
            .with_concurrency(3),
    )
    .with_observer(Arc::new(TraceObserver(trace.clone())));
    runner.run(&dataset, &handler).await.unwrap();

    let trace = trace.lock().unwrap().clone();
    let batch_of = |index: usize| index / 10;
    let mut current: Option<usize> = None;
    let mut done_in_batch = 0usize;

    for entry in &trace {
        match entry {
            Trace::BatchStart(b) => {
                assert_eq!(current, None, "batch {b} started while another was open");
                current = Some(*b);
                done_in_batch = 0;
            }
            Trace::RowStart(i) | Trace::RowDone(i) => {
                assert_eq!(Some(batch_of(*i)), current, "row {i} outside its batch");
                if matches!(entry, Trace::RowDone(_)) {
                    done_in_batch += 1;
                }
            }
            Trace::BatchEnd(b) => {
                let expected = if *b == 2 { 3 } else { 10 };
                assert_eq!(done_in_batch, expected, "batch {b} ended early");
                current = None;
            }
        }
    }
    assert_eq!(current, None);
}

#[tokio::test]
async fn test_rows_dispatched_in_dataset_order() {
    let dataset = numbered_dataset(45);
    let order = Arc::new(Mutex::new(Vec::new()));
    let handler = {
        let order = order.clone();
        handler_fn(move |row: &Row| {
            order.lock().unwrap().push(row.index());
            async { Ok(()) }
        })
    };

    let config = BatchConfig::default()
        .with_batch_size(20)
        .with_concurrency(1);
    let (runner, recorder) = runner_with(config);
    runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(*order.lock().unwrap(), (0..45).collect::<Vec<_>>());
    assert_eq!(recorder.batch_sizes(), vec![20, 20, 5]);
}

#[tokio::test]
async fn test_progress_is_deduplicated_and_increasing() {
    let dataset = numbered_dataset(1000);
    let handler = handler_fn(|row: &Row| {
        let delay = Duration::from_micros((row.index() % 4) as u64 * 200);
        async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    });

    let config = BatchConfig::default()
        .with_batch_size(300)
        .with_concurrency(16)
        .with_progress_step_percent(2);
    let (runner, recorder) = runner_with(config);
    let stats = runner.run(&dataset, &handler).await.unwrap();

    let percents = recorder.progress_percents();
    assert!(percents.windows(2).all(|w| w[0] < w[1]), "{percents:?}");
    assert!(percents.iter().all(|p| p % 2 == 0));
    assert_eq!(percents, (0..=100).step_by(2).collect::<Vec<u32>>());
    assert_eq!(stats.last_logged_percent, 100);
}

#[tokio::test]
async fn test_progress_step_25_with_interleaving() {
    let dataset = numbered_dataset(100);
    let handler = handler_fn(|row: &Row| {
        let delay = Duration::from_millis((row.index() * 7 % 5) as u64);
        async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    });

    let config = BatchConfig::default()
        .with_concurrency(8)
        .with_progress_step_percent(25);
    let (runner, recorder) = runner_with(config);
    runner.run(&dataset, &handler).await.unwrap();

    assert_eq!(recorder.progress_percents(), vec![25, 50, 75, 100]);
}

#[tokio::test]
async fn test_progress_step_25_over_ten_rows() {
    let dataset = numbered_dataset(10);
    let config = BatchConfig::default()
        .with_concurrency(3)
        .with_progress_step_percent(25);
    let (runner, recorder) = runner_with(config);
    runner.run(&dataset, &ok_handler()).await.unwrap();

    // 10 rows complete at 10%, 20%, ...; only 50 and 100 are multiples of 25.
    assert_eq!(recorder.progress_percents(), vec![50, 100]);
}

#[tokio::test]
async fn test_empty_dataset_is_rejected_before_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = {
        let calls = calls.clone();
        handler_fn(move |_row: &Row| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
    };

    let (runner, recorder) = runner_with(BatchConfig::default());
    let err = runner.run(&Dataset::default(), &handler).await.unwrap_err();

    assert!(matches!(
        err,
        BatchError::Validation(ValidationError::EmptyDataset)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_dispatch() {
    let dataset = numbered_dataset(5);
    let cases = [
        (
            BatchConfig::default().with_concurrency(0),
            ConfigError::ZeroConcurrency,
        ),
        (
            BatchConfig::default().with_progress_step_percent(0),
            ConfigError::ZeroProgressStep,
        ),
        (
            BatchConfig::default().with_batch_size(0),
            ConfigError::ZeroBatchSize,
        ),
    ];

    for (config, expected) in cases {
        let (runner, recorder) = runner_with(config);
        match runner.run(&dataset, &ok_handler()).await {
            Err(BatchError::Config(err)) => assert_eq!(err, expected),
            other => panic!("expected config error, got {other:?}"),
        }
        assert!(recorder.events().is_empty());
    }
}

#[tokio::test]
async fn test_config_checked_before_dataset() {
    let (runner, _) = runner_with(BatchConfig::default().with_concurrency(0));
    let err = runner
        .run(&Dataset::default(), &ok_handler())
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Config(ConfigError::ZeroConcurrency)));
}

#[tokio::test]
async fn test_run_until_cancels_remaining_work() {
    let dataset = numbered_dataset(50);
    let notify = Arc::new(tokio::sync::Notify::new());
    let started = Arc::new(AtomicUsize::new(0));

    let handler = {
        let notify = notify.clone();
        let started = started.clone();
        handler_fn(move |row: &Row| {
            started.fetch_add(1, Ordering::SeqCst);
            if row.index() == 10 {
                notify.notify_one();
            }
            async {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok(())
            }
        })
    };

    let config = BatchConfig::default()
        .with_batch_size(5)
        .with_concurrency(2);
    let (runner, recorder) = runner_with(config);
    let shutdown = {
        let notify = notify.clone();
        async move { notify.notified().await }
    };

    let err = runner
        .run_until(&dataset, &handler, shutdown)
        .await
        .unwrap_err();

    assert_eq!(err.partial_stats().map(|s| s.total), Some(50));
    let partial: ExecStats = match err {
        BatchError::Cancelled { stats } => stats,
        other => panic!("expected cancellation, got {other:?}"),
    };
    assert!(partial.processed < 50);
    assert_eq!(partial.total, 50);
    assert!(started.load(Ordering::SeqCst) < 50);

    let types = recorder.event_types();
    assert_eq!(types.last(), Some(&"run.cancelled"));
    assert!(!types.contains(&"run.end"));
}

#[tokio::test]
async fn test_run_emits_lifecycle_events() {
    let dataset = numbered_dataset(4);
    let config = BatchConfig::default()
        .with_batch_size(2)
        .with_progress_step_percent(50)
        .with_concurrency(1);
    let (runner, recorder) = runner_with(config);
    let stats = runner.run(&dataset, &ok_handler()).await.unwrap();

    assert_eq!(
        recorder.event_types(),
        vec![
            "run.start",
            "batch.start",
            "run.progress",
            "batch.end",
            "batch.start",
            "run.progress",
            "batch.end",
            "run.end",
        ]
    );

    let events = recorder.events();
    let run_id = events[0].run_id().to_string();
    assert!(events.iter().all(|e| e.run_id() == run_id));
    match events.last() {
        Some(RunEvent::RunEnd { stats: end, .. }) => assert_eq!(*end, stats),
        other => panic!("unexpected last event {other:?}"),
    }
}

#[tokio::test]
async fn test_each_run_has_fresh_stats() {
    let dataset = numbered_dataset(8);
    let (runner, _) = runner_with(BatchConfig::default());
    let first = runner.run(&dataset, &ok_handler()).await.unwrap();
    let second = runner.run(&dataset, &ok_handler()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.processed, 8);
    assert!(!second.has_errors());
}

#[tokio::test]
async fn test_observers_accumulate_on_builder() {
    let (runner, recorder) = runner_with(BatchConfig::default());
    let runner = runner.with_tracing();
    assert_eq!(runner.observer_count(), 2);

    runner.run(&numbered_dataset(3), &ok_handler()).await.unwrap();
    assert_eq!(recorder.event_types().last(), Some(&"run.end"));
}

#[tokio::test]
async fn test_process_dataset_with_trait_object_handler() {
    let dataset = numbered_dataset(12);
    let handler: Arc<dyn RowHandler> = Arc::new(handler_fn(|row: &Row| {
        let odd = row.index() % 2 == 1;
        async move {
            anyhow::ensure!(!odd, "odd row");
            Ok(())
        }
    }));

    let stats = process_dataset(&dataset, &handler, BatchConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.processed, 12);
    assert_eq!(stats.errors, 6);
}

#[tokio::test]
#[should_panic(expected = "handler bug")]
async fn test_handler_panic_is_not_a_row_failure() {
    let dataset = numbered_dataset(3);
    let handler = handler_fn(|row: &Row| {
        let index = row.index();
        async move {
            if index == 1 {
                panic!("handler bug");
            }
            Ok(())
        }
    });
    let (runner, _) = runner_with(BatchConfig::default());
    let _ = runner.run(&dataset, &handler).await;
}
