//! # Lanzador de procesos
//! src/exec/launcher.rs
//!
//! Lanza el comando con stdout en un pipe. Si el programa no existe o no se
//! puede ejecutar, igual devuelve un handle: sin pid, sin salida, y con el
//! código que daría un shell (127 no encontrado, 126 el resto).

use crate::error::{GatewayError, Result};
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, warn};

pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_CANNOT_EXECUTE: i32 = 126;

/// Argumentos del comando, separados por espacios en blanco
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    argv: Vec<String>,
}

impl CommandInvocation {
    /// Sin shell: las comillas y los pipes llegan tal cual al programa
    ///
    /// # Ejemplo
    /// ```
    /// use exec_gateway::exec::CommandInvocation;
    ///
    /// let cmd = CommandInvocation::parse("ls  -l /tmp").unwrap();
    /// assert_eq!(cmd.program(), "ls");
    /// assert_eq!(cmd.args(), ["-l", "/tmp"]);
    /// ```
    pub fn parse(command: &str) -> Result<Self> {
        let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(GatewayError::EmptyCommand);
        }
        Ok(Self { argv })
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl std::fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

enum Spawned {
    Running(Child),
    Failed { code: i32 },
}

/// Proceso hijo de un request
pub struct ChildProcess {
    spawned: Spawned,
}

/// Lanza `invocation` con stdin nulo, stdout en un pipe y stderr heredado
pub fn spawn(invocation: &CommandInvocation) -> ChildProcess {
    let result = Command::new(invocation.program())
        .args(invocation.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn();

    let spawned = match result {
        Ok(child) => {
            debug!(pid = child.id(), command = %invocation, "child spawned");
            Spawned::Running(child)
        }
        Err(e) => {
            let code = if e.kind() == io::ErrorKind::NotFound {
                EXIT_NOT_FOUND
            } else {
                EXIT_CANNOT_EXECUTE
            };
            warn!(command = %invocation, error = %e, exit_code = code, "could not spawn command");
            Spawned::Failed { code }
        }
    };

    ChildProcess { spawned }
}

impl ChildProcess {
    pub fn pid(&self) -> Option<u32> {
        match &self.spawned {
            Spawned::Running(child) => Some(child.id()),
            Spawned::Failed { .. } => None,
        }
    }

    /// Stdout del hijo. La segunda llamada (o un hijo que no arrancó) da un stream vacío.
    pub fn take_output(&mut self) -> Box<dyn Read + Send> {
        match &mut self.spawned {
            Spawned::Running(child) => match child.stdout.take() {
                Some(stdout) => Box::new(stdout),
                None => Box::new(io::empty()),
            },
            Spawned::Failed { .. } => Box::new(io::empty()),
        }
    }

    /// Termina el hijo (SIGKILL). No falla si ya había salido.
    pub fn kill(&mut self) {
        if let Spawned::Running(child) = &mut self.spawned {
            if let Err(e) = child.kill() {
                debug!(pid = child.id(), error = %e, "kill failed");
            }
        }
    }

    /// Espera a que el hijo termine y devuelve su código de salida
    pub fn wait(self) -> io::Result<i32> {
        match self.spawned {
            Spawned::Running(mut child) => child.wait().map(exit_code),
            Spawned::Failed { code } => Ok(code),
        }
    }
}

/// Código de salida; un hijo terminado por señal da `128 + señal`
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_parse_splits_on_whitespace() {
        let cmd = CommandInvocation::parse("  echo\thello   world\n").unwrap();
        assert_eq!(cmd.argv(), ["echo", "hello", "world"]);
        assert_eq!(cmd.to_string(), "echo hello world");
    }

    #[test]
    fn test_parse_keeps_shell_syntax_literal() {
        let cmd = CommandInvocation::parse("echo \"a b\" | wc").unwrap();
        assert_eq!(cmd.args(), ["\"a", "b\"", "|", "wc"]);
    }

    #[test]
    fn test_parse_empty_command() {
        assert!(matches!(CommandInvocation::parse(""), Err(GatewayError::EmptyCommand)));
        assert!(matches!(CommandInvocation::parse(" \t "), Err(GatewayError::EmptyCommand)));
    }

    #[test]
    fn test_spawn_captures_stdout() {
        let mut child = spawn(&CommandInvocation::parse("echo hello").unwrap());
        assert!(child.pid().is_some());

        let mut output = String::new();
        child.take_output().read_to_string(&mut output).unwrap();

        assert_eq!(output, "hello\n");
        assert_eq!(child.wait().unwrap(), 0);
    }

    #[test]
    fn test_nonzero_exit_code() {
        let child = spawn(&CommandInvocation::parse("false").unwrap());
        assert_eq!(child.wait().unwrap(), 1);
    }

    #[test]
    fn test_missing_program_behaves_like_shell() {
        let mut child = spawn(&CommandInvocation::parse("no-such-program-xyz --flag").unwrap());
        assert_eq!(child.pid(), None);

        let mut output = Vec::new();
        child.take_output().read_to_end(&mut output).unwrap();
        assert!(output.is_empty());
        assert_eq!(child.wait().unwrap(), EXIT_NOT_FOUND);
    }

    #[test]
    #[cfg(unix)]
    fn test_killed_child_reports_signal() {
        let mut child = spawn(&CommandInvocation::parse("sleep 30").unwrap());
        child.kill();
        assert_eq!(child.wait().unwrap(), 128 + libc::SIGKILL);
    }
}
