//! Drives real child processes through the registry using the bundled
//! `cpu-burn` binary in place of stress-ng.

use std::sync::Arc;
use std::time::Duration;

use cpu_stresser::error::StressError;
use cpu_stresser::job::StressRequest;
use cpu_stresser::process::CommandSpawner;
use cpu_stresser::registry::Registry;

fn burn_registry() -> Registry {
    Registry::new(Arc::new(CommandSpawner::new(env!("CARGO_BIN_EXE_cpu-burn"))))
}

#[tokio::test]
async fn test_start_and_stop_real_process() {
    let registry = burn_registry();

    let job = registry
        .start(&StressRequest { cpu: 1, timeout: 30 })
        .expect("cpu-burn should start");
    assert!(job.process_id > 0);

    let listed = registry.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].process_id, job.process_id);
    assert_eq!((listed[0].cpu, listed[0].timeout), (1, 30));

    let message = registry.stop(job.process_id).expect("stop should succeed");
    assert_eq!(
        message,
        format!("Stress process {} stopped successfully", job.process_id)
    );
    assert!(registry.is_empty());

    assert!(matches!(
        registry.stop(job.process_id),
        Err(StressError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_finished_process_is_reaped() {
    let registry = burn_registry();
    let job = registry
        .start(&StressRequest { cpu: 1, timeout: 1 })
        .expect("cpu-burn should start");

    let mut reaped = Vec::new();
    for _ in 0..100 {
        reaped = registry.reap();
        if !reaped.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(reaped, vec![job.process_id]);
    assert!(registry.list().is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_running_processes() {
    let registry = burn_registry();
    registry
        .start(&StressRequest { cpu: 1, timeout: 30 })
        .expect("cpu-burn should start");
    registry
        .start(&StressRequest { cpu: 1, timeout: 30 })
        .expect("cpu-burn should start");
    assert_eq!(registry.len(), 2);

    registry.shutdown();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_missing_tool_reports_install_hint() {
    let registry = Registry::new(Arc::new(CommandSpawner::new("no-such-stress-tool-7351")));

    let err = registry
        .start(&StressRequest { cpu: 2, timeout: 60 })
        .unwrap_err();
    assert!(matches!(err, StressError::Spawn(_)));
    assert!(err
        .to_string()
        .starts_with("no-such-stress-tool-7351 is not installed"));
    assert!(registry.is_empty());
}
