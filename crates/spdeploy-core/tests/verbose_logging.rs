//! Verbose mode only changes the level of stage lines.

mod support;

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::Level;

use spdeploy_core::error::DeployError;

use support::*;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }

    fn info_lines(&self) -> Vec<String> {
        self.text()
            .lines()
            .filter(|line| line.contains("INFO"))
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn deploy_logged(
    verbose: bool,
    transport: &MockTransport,
) -> (Result<(), DeployError>, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let auth = StaticAuthenticator::accepting();
    let result =
        spdeploy_core::deploy(valid_options().with_verbose(verbose), &auth, transport).await;
    (result, logs)
}

#[tokio::test]
async fn verbose_run_logs_each_stage_at_info() {
    let (result, logs) = deploy_logged(true, &MockTransport::healthy()).await;
    result.unwrap();

    let info = logs.info_lines();
    for label in [
        "resolving site URL",
        "authenticating",
        "retrieving request digest",
        "resolving site, list and file metadata",
        "building deployment request",
        "deploying solution",
        "deployment succeeded",
    ] {
        assert!(
            info.iter().any(|line| line.contains(label)),
            "missing '{label}' in:\n{}",
            logs.text()
        );
    }
}

#[tokio::test]
async fn quiet_run_logs_no_stage_lines_at_info() {
    let (result, logs) = deploy_logged(false, &MockTransport::healthy()).await;
    result.unwrap();

    assert!(logs.info_lines().is_empty(), "{}", logs.text());
}

#[tokio::test]
async fn verbose_does_not_change_failures() {
    let failing =
        || MockTransport::healthy().with(CONTEXTINFO, MockResponse::Fail("refused".into()));

    let verbose_transport = failing();
    let (verbose, logs) = deploy_logged(true, &verbose_transport).await;
    let quiet_transport = failing();
    let (quiet, _) = deploy_logged(false, &quiet_transport).await;

    let verbose = verbose.unwrap_err();
    let quiet = quiet.unwrap_err();
    assert_eq!(verbose.to_string(), quiet.to_string());
    assert_eq!(verbose.stage(), quiet.stage());
    assert_eq!(verbose_transport.calls().len(), quiet_transport.calls().len());

    assert!(
        logs.info_lines()
            .iter()
            .any(|line| line.contains("deployment failed")
                && line.contains("failed to retrieve site and web ID")),
        "{}",
        logs.text()
    );
}
