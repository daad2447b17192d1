//! Builtin tools driven through the registry

use repl_foundation::ReplConfig;
use repl_session::SessionRegistry;
use repl_task::{TaskManager, TaskManagerConfig};
use repl_tool::{ToolContext, ToolRegistry};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn context() -> ToolContext {
    let tasks = TaskManager::new(TaskManagerConfig {
        sync_timeout: Duration::from_millis(500),
        poll_window: Duration::from_secs(3),
        poll_interval: Duration::from_millis(20),
    });
    ToolContext::new(SessionRegistry::default(), tasks, &ReplConfig::default())
}

fn has(program: &str) -> bool {
    which::which(program).is_ok()
}

#[tokio::test]
async fn test_shell_inline() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute("shell", &ctx, json!({"command": "echo hi", "shell": "sh"}))
        .await;
    assert!(result.success);
    assert!(result.content.starts_with("Execution time: "));
    assert!(result.content.contains("Standard Output:\nhi\n"));
    assert!(result.content.ends_with("Return Value:\n0"));
}

#[tokio::test]
async fn test_shell_working_dir_alias() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("here.txt"), "").unwrap();

    let result = registry
        .execute(
            "shell",
            &ctx,
            json!({"command": "ls", "shell": "sh", "workingDirectory": dir.path()}),
        )
        .await;
    assert!(result.content.contains("here.txt"));
}

#[tokio::test]
async fn test_shell_validation_failures() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry.execute("shell", &ctx, json!({})).await;
    assert!(!result.success);
    assert_eq!(result.text(), "Validation error: Missing command parameter");

    let result = registry
        .execute("shell", &ctx, json!({"command": "true", "shell": "fish"}))
        .await;
    assert!(!result.success);

    let result = registry
        .execute(
            "shell",
            &ctx,
            json!({"command": "true", "working_dir": "/no/such/dir"}),
        )
        .await;
    assert!(!result.success);
    assert!(result.text().contains("Working directory does not exist"));
    assert!(ctx.tasks.is_empty().await);
}

#[tokio::test]
async fn test_shell_detach_then_status() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute(
            "shell",
            &ctx,
            json!({"command": "sleep 1 && echo done", "shell": "sh"}),
        )
        .await;
    assert!(result.success);
    let first_line = result.content.lines().next().unwrap();
    let task_id = first_line.strip_prefix("Task started with ID: ").unwrap();
    assert!(result.content.contains("shell_status"));

    let status = registry
        .execute("shell_status", &ctx, json!({"task_id": task_id}))
        .await;
    assert!(status.success);
    assert!(status.content.starts_with("Status: completed\n"));
    assert!(status.content.contains("Standard Output:\ndone\n"));
    assert!(status.content.ends_with("Return Value:\n0"));

    // Same answer on a second poll
    let again = registry
        .execute("shell_status", &ctx, json!({"taskId": task_id}))
        .await;
    assert_eq!(
        again.content.lines().skip(2).collect::<Vec<_>>(),
        status.content.lines().skip(2).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_shell_status_unknown_task_is_text() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute("shell_status", &ctx, json!({"task_id": "abc"}))
        .await;
    assert!(result.success);
    assert_eq!(result.content, "Error: Task abc not found");

    let result = registry.execute("shell_status", &ctx, json!({})).await;
    assert!(!result.success);
}

#[tokio::test]
async fn test_python_session_flow() {
    if !has("python3") {
        return;
    }
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let created = registry
        .execute("python_session", &ctx, json!({"code": "x = 5"}))
        .await;
    assert!(created.success);
    let first_line = created.content.lines().next().unwrap();
    let session_id = first_line.strip_prefix("Created new session: ").unwrap();

    let reused = registry
        .execute(
            "python_session",
            &ctx,
            json!({"code": "print(x*2)", "session_id": session_id}),
        )
        .await;
    assert!(reused.success);
    assert!(!reused.content.contains("Created new session"));
    assert!(reused.content.contains("Standard Output:\n10\n"));

    ctx.sessions.stop().await;
}

#[tokio::test]
async fn test_python_session_unknown_session_fails_call() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute(
            "python_session",
            &ctx,
            json!({"code": "1", "sessionId": "00000000-0000-0000-0000-000000000000"}),
        )
        .await;
    assert!(!result.success);
    assert!(result.text().starts_with("No session found with id:"));

    let result = registry.execute("python_session", &ctx, json!({"code": ""})).await;
    assert!(!result.success);
    assert!(ctx.sessions.is_empty());
}

#[tokio::test]
async fn test_python_one_shot() {
    if !has("python3") {
        return;
    }
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute("python", &ctx, json!({"code": "print('hi')\n6 * 7"}))
        .await;
    assert!(result.success);
    assert!(result.content.contains("Standard Output:\nhi"));
    assert!(result.content.ends_with("Result: 42"));

    let result = registry
        .execute("python", &ctx, json!({"code": "raise ValueError('bad')"}))
        .await;
    assert!(result.content.contains("ValueError: bad"));
}

#[tokio::test]
async fn test_perl_substitution() {
    if !has("perl") {
        return;
    }
    let registry = ToolRegistry::with_builtins();
    let ctx = context();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "old value   \nkeep\n").unwrap();

    let result = registry
        .execute(
            "perl",
            &ctx,
            json!({"file_path": file, "perl_script": "$content =~ s/old/new/g;"}),
        )
        .await;
    assert!(result.success);
    assert!(result.content.contains("File modified successfully"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "new value\nkeep\n");
}

#[tokio::test]
async fn test_perl_missing_file() {
    let registry = ToolRegistry::with_builtins();
    let ctx = context();

    let result = registry
        .execute(
            "perl",
            &ctx,
            json!({"file_path": "/no/such/file.txt", "perl_script": "1;"}),
        )
        .await;
    assert!(!result.success);
    assert!(result.text().contains("File does not exist"));
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = ToolRegistry::with_builtins();
    let result = registry.execute("nope", &context(), json!({})).await;
    assert!(!result.success);
    assert_eq!(result.text(), "Unknown tool: nope");
}
