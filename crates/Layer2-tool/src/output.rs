//! Text rendering of execution results

use std::time::Duration;

/// Captured output of one execution, rendered for the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeOutput {
    pub execution_time: Option<Duration>,
    pub stdout: String,
    pub stderr: String,
    pub result: Option<String>,
}

impl CodeOutput {
    /// One block per non-empty part:
    ///
    /// ```text
    /// Execution time: 0.0123 seconds
    /// Standard Output:
    /// ...
    /// Standard Error:
    /// ...
    /// Return Value:
    /// 0
    /// ```
    pub fn format(&self) -> String {
        let mut blocks = Vec::new();

        if let Some(elapsed) = self.execution_time {
            blocks.push(format!("Execution time: {:.4} seconds", elapsed.as_secs_f64()));
        }
        if !self.stdout.is_empty() {
            blocks.push(format!("Standard Output:\n{}", self.stdout));
        }
        if !self.stderr.is_empty() {
            blocks.push(format!("Standard Error:\n{}", self.stderr));
        }
        if let Some(result) = &self.result {
            blocks.push(format!("Return Value:\n{}", result));
        }

        if blocks.is_empty() {
            return "No output".to_string();
        }
        blocks.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_format() {
        let output = CodeOutput {
            execution_time: Some(Duration::from_millis(1234)),
            stdout: "hi\n".into(),
            stderr: "warn\n".into(),
            result: Some("0".into()),
        };
        assert_eq!(
            output.format(),
            "Execution time: 1.2340 seconds\nStandard Output:\nhi\n\nStandard Error:\nwarn\n\nReturn Value:\n0"
        );
    }

    #[test]
    fn test_empty_parts_are_omitted() {
        let output = CodeOutput {
            execution_time: Some(Duration::ZERO),
            ..Default::default()
        };
        assert_eq!(output.format(), "Execution time: 0.0000 seconds");
        assert_eq!(CodeOutput::default().format(), "No output");
    }
}
