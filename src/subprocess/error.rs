use crate::error::{ErrorCode, ProvisionError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No scripted run left for: {0}")]
    Unscripted(String),
}

impl From<ProcessError> for ProvisionError {
    fn from(err: ProcessError) -> Self {
        let (code, command) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::ENGINE_COMMAND_NOT_FOUND, Some(cmd.clone()))
            }
            ProcessError::Io(_) => (ErrorCode::ENGINE_SPAWN_FAILED, None),
            ProcessError::Unscripted(cmd) => (ErrorCode::ENGINE_GENERIC, Some(cmd.clone())),
        };

        ProvisionError::engine_with_code(code, err.to_string(), command).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_codes() {
        let err: ProvisionError = ProcessError::CommandNotFound("pwsh".to_string()).into();
        assert_eq!(err.code(), ErrorCode::ENGINE_COMMAND_NOT_FOUND);
        assert_eq!(err.exit_code(), 5);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ProvisionError = ProcessError::Io(io).into();
        assert_eq!(err.code(), ErrorCode::ENGINE_SPAWN_FAILED);
    }
}
