//! Server bootstrap — drives a [`ServerRuntime`] through a fixed start sequence.
//!
//! ```text
//! Uninitialized ──configure──▶ Configured ──initialize──▶ Configured
//!                                              │
//!                           serve: run until shutdown, then destroy
//!                                              ▼
//!                                  Running ──▶ Terminated
//! ```
//!
//! Any failure before `Running` ends the sequence. A created server is held
//! in a [`ServerGuard`] so it is destroyed on every exit path.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::capabilities::CapabilityList;
use crate::config::{ServerArgs, parse_args};
use crate::error::TestServerError;
use crate::runtime::service_level::ServiceLevel;
use crate::runtime::{
    DI_NAMESPACE_URI, LocalizedText, RuntimeConfig, RuntimeError, SERVER_CAPABILITIES,
    SERVER_SERVICE_LEVEL, ServerRuntime, Variant,
};

/// Locale attached to the published application name.
pub const APPLICATION_NAME_LOCALE: &str = "de";

/// Runtime call that can fail during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    NewServer,
    WriteCapabilities,
    AddDiNamespace,
    WriteServiceLevel,
    Run,
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapStep::NewServer => "create server",
            BootstrapStep::WriteCapabilities => "write server capabilities",
            BootstrapStep::AddDiNamespace => "add DI namespace",
            BootstrapStep::WriteServiceLevel => "write service level",
            BootstrapStep::Run => "run server",
        };
        f.write_str(name)
    }
}

/// Lifecycle of the server being bootstrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    Configured,
    Running,
    Terminated,
}

/// Owns a created server and destroys it when dropped.
pub struct ServerGuard<'r, R: ServerRuntime> {
    runtime: &'r R,
    server: R::Server,
}

impl<R: ServerRuntime> ServerGuard<'_, R> {
    pub fn server(&self) -> &R::Server {
        &self.server
    }
}

impl<R: ServerRuntime> Drop for ServerGuard<'_, R> {
    fn drop(&mut self) {
        self.runtime.destroy(&mut self.server);
    }
}

fn step_failed(step: BootstrapStep) -> impl FnOnce(RuntimeError) -> TestServerError {
    move |source| TestServerError::BootstrapStep { step, source }
}

fn parse_port(raw: Option<&str>) -> crate::Result<u16> {
    let raw = raw.ok_or(TestServerError::MissingPort)?;
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(TestServerError::InvalidPort(raw.to_string())),
    }
}

/// Sequences the runtime calls that bring a test server up and down.
pub struct Bootstrapper<'r, R: ServerRuntime> {
    runtime: &'r R,
    state: ServerState,
}

impl<'r, R: ServerRuntime> Bootstrapper<'r, R> {
    pub fn new(runtime: &'r R) -> Self {
        Self {
            runtime,
            state: ServerState::Uninitialized,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    fn transition(&mut self, next: ServerState) {
        tracing::info!(from = ?self.state, to = ?next, "server state changed");
        self.state = next;
    }

    /// Build the runtime config: minimal config for the port, then identity.
    pub fn configure(&mut self, args: &ServerArgs) -> crate::Result<RuntimeConfig> {
        let port = parse_port(args.port.as_deref())?;

        let mut config = self.runtime.minimal_config(port);
        config.application_uri = args.application_uri.clone();
        config.application_name =
            LocalizedText::new(APPLICATION_NAME_LOCALE, &args.application_name);

        self.transition(ServerState::Configured);
        Ok(config)
    }

    /// Create the server and publish capabilities, DI namespace and service level.
    pub fn initialize(
        &mut self,
        config: RuntimeConfig,
        capabilities: &CapabilityList,
        di_namespace: bool,
    ) -> crate::Result<ServerGuard<'r, R>> {
        let server = self
            .runtime
            .new_server(config)
            .map_err(step_failed(BootstrapStep::NewServer))?;
        let mut guard = ServerGuard {
            runtime: self.runtime,
            server,
        };

        self.runtime
            .write_variable(
                &mut guard.server,
                SERVER_CAPABILITIES,
                Variant::StringArray(capabilities.as_slice().to_vec()),
            )
            .map_err(step_failed(BootstrapStep::WriteCapabilities))?;
        tracing::debug!(count = capabilities.len(), "server capabilities written");

        if di_namespace {
            let index = self
                .runtime
                .add_namespace(&mut guard.server, DI_NAMESPACE_URI)
                .map_err(step_failed(BootstrapStep::AddDiNamespace))?;
            tracing::info!(uri = DI_NAMESPACE_URI, index, "DI namespace registered");
        }

        self.runtime
            .write_variable(
                &mut guard.server,
                SERVER_SERVICE_LEVEL,
                ServiceLevel::FULLY_OPERATIONAL.into(),
            )
            .map_err(step_failed(BootstrapStep::WriteServiceLevel))?;
        tracing::debug!(level = ServiceLevel::FULLY_OPERATIONAL.0, "service level written");

        Ok(guard)
    }

    /// Run until `shutdown` is cancelled, then destroy the server.
    pub async fn serve(
        &mut self,
        mut guard: ServerGuard<'r, R>,
        shutdown: CancellationToken,
    ) -> crate::Result<()> {
        self.transition(ServerState::Running);
        self.runtime
            .run(&mut guard.server, shutdown)
            .await
            .map_err(step_failed(BootstrapStep::Run))?;

        drop(guard);
        self.transition(ServerState::Terminated);
        Ok(())
    }

    /// Full sequence: configure, initialize, serve.
    pub async fn run(
        mut self,
        args: &ServerArgs,
        capabilities: &CapabilityList,
        shutdown: CancellationToken,
    ) -> crate::Result<()> {
        let config = self.configure(args)?;
        let guard = self.initialize(config, capabilities, args.di_namespace)?;
        self.serve(guard, shutdown).await
    }
}

/// Parse `tokens`, build the capability list and bootstrap a server on `runtime`.
///
/// Returns after `shutdown` is cancelled and the server is destroyed, or at
/// the first error.
pub async fn launch<R, S>(
    tokens: &[S],
    runtime: &R,
    shutdown: CancellationToken,
) -> crate::Result<()>
where
    R: ServerRuntime,
    S: AsRef<str>,
{
    let args = parse_args(tokens)?;
    let capabilities = CapabilityList::parse(&args.capabilities_raw);

    tracing::info!(
        application_uri = %args.application_uri,
        application_name = %args.application_name,
        capabilities = %args.capabilities_raw,
        port = ?args.port,
        di_namespace = args.di_namespace,
        "configuration parsed"
    );

    Bootstrapper::new(runtime)
        .run(&args, &capabilities, shutdown)
        .await
}
