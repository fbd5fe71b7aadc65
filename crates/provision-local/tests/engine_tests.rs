#[cfg(all(test, unix))]
mod tests {
    use provision_core::runner::RetryPolicy;
    use provision_core::task::{Status, Task};
    use provision_local::execute;
    use std::time::Duration;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_success_captures_output() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("echo one && echo two && echo three", quick(4), &mut out).await;

        assert_eq!(report.task, Task::shell("echo one && echo two && echo three"));
        assert_eq!(report.status, Status::Success);
        assert_eq!(report.output, vec!["one", "two", "three"]);
        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_failure_after_retries() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("echo ko && false", quick(3), &mut out).await;

        assert_eq!(report.status, Status::Failure);
        assert_eq!(report.output, vec!["ko"]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ko\nerror, 2 attempts remaining, will try again in 0.1 seconds\n\
             ko\nerror, 1 attempts remaining, will try again in 0.1 seconds\n\
             ko\n"
        );
    }

    #[tokio::test]
    async fn test_false_prints_two_retry_notices() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("false", quick(3), &mut out).await;

        assert_eq!(report.status, Status::Failure);
        assert!(report.output.is_empty());
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("attempts remaining").count(), 2);
    }

    #[tokio::test]
    async fn test_failure_then_success() {
        let dir = tempfile::tempdir().unwrap();
        let flag = dir.path().join("file");
        let command = format!("[ -f {0} ] || ! touch {0}", flag.display());

        let mut out: Vec<u8> = Vec::new();
        let report = execute(&command, quick(4), &mut out).await;

        assert_eq!(report.status, Status::Success);
        assert!(report.output.is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "error, 3 attempts remaining, will try again in 0.1 seconds\n"
        );
    }

    #[tokio::test]
    async fn test_output_is_from_last_attempt_only() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("counter");
        let command = format!(
            "echo attempt >> {0}; wc -l < {0} | tr -d ' '; [ $(wc -l < {0}) -ge 2 ]",
            counter.display()
        );

        let mut out: Vec<u8> = Vec::new();
        let report = execute(&command, quick(4), &mut out).await;

        assert_eq!(report.status, Status::Success);
        assert_eq!(report.output, vec!["2"]);
    }

    #[tokio::test]
    async fn test_stderr_is_captured_and_right_trimmed() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("echo 'to stderr   ' >&2", RetryPolicy::once(), &mut out).await;

        assert_eq!(report.status, Status::Success);
        assert_eq!(report.output, vec!["to stderr"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_output_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("counter");
        let command = format!("echo run >> {}; printf 'caf\\351\\n'; exit 0", counter.display());

        let mut out: Vec<u8> = Vec::new();
        let report = execute(&command, quick(4), &mut out).await;

        assert_eq!(report.status, Status::Success);
        assert_eq!(report.output, vec!["caf\u{FFFD}"]);
        assert_eq!(String::from_utf8(out).unwrap(), "caf\u{FFFD}\n");
        assert_eq!(std::fs::read_to_string(&counter).unwrap(), "run\n");
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("echo once; false", quick(0), &mut out).await;

        assert_eq!(report.status, Status::Failure);
        assert_eq!(String::from_utf8(out).unwrap(), "once\n");
    }

    #[tokio::test]
    async fn test_commands_do_not_read_stdin() {
        let mut out: Vec<u8> = Vec::new();
        let report = execute("cat", RetryPolicy::once(), &mut out).await;
        assert_eq!(report.status, Status::Success);
        assert!(report.output.is_empty());
    }
}
