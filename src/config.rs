//! Server arguments — command-line flag parsing and field limits.
//!
//! Flags use a single `-` marker followed by a short code (`-au`, `-an`,
//! `-c`, `-p`, `-d`) and are always paired with the next token as their
//! value. The token list is walked in fixed strides of two.

use crate::error::TestServerError;

/// Maximum number of arguments accepted, program name excluded.
pub const MAX_ARGUMENTS: usize = 10;

/// Byte limit for the application URI, application name and capability list.
pub const MAX_FIELD_LEN: usize = 254;

/// Byte limit for the raw port value.
pub const MAX_PORT_LEN: usize = 5;

/// Value of `-d` that enables the DI namespace.
pub const DI_ENABLED: &str = "ON";

/// A recognized flag code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    ApplicationUri,
    ApplicationName,
    Capabilities,
    Port,
    DiNamespace,
}

impl Flag {
    /// Match the code after the `-` marker. Two-character codes are tried
    /// before single-character ones; anything after the code is ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.starts_with("au") {
            Some(Flag::ApplicationUri)
        } else if code.starts_with("an") {
            Some(Flag::ApplicationName)
        } else if code.starts_with('c') {
            Some(Flag::Capabilities)
        } else if code.starts_with('p') {
            Some(Flag::Port)
        } else if code.starts_with('d') {
            Some(Flag::DiNamespace)
        } else {
            None
        }
    }

    fn field(self) -> &'static str {
        match self {
            Flag::ApplicationUri => "application URI",
            Flag::ApplicationName => "application name",
            Flag::Capabilities => "capability list",
            Flag::Port => "port",
            Flag::DiNamespace => "DI namespace switch",
        }
    }
}

/// Configuration collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerArgs {
    pub application_uri: String,
    pub application_name: String,
    /// Unsplit `:`-delimited capability names, kept verbatim for diagnostics.
    pub capabilities_raw: String,
    /// Raw `-p` value; parsed when the runtime config is built.
    pub port: Option<String>,
    pub di_namespace: bool,
}

impl ServerArgs {
    /// Apply flag/value pairs to this record, left to right.
    ///
    /// Stops at the first bad token. Fields assigned before the failure keep
    /// their new values.
    pub fn apply_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> crate::Result<()> {
        for index in (0..tokens.len()).step_by(2) {
            let token = tokens[index].as_ref();

            // Unmarked pairs are reserved and skipped
            let Some(code) = token.strip_prefix('-') else {
                tracing::debug!(index, token, "ignoring unmarked argument");
                continue;
            };

            let flag = Flag::from_code(code).ok_or_else(|| TestServerError::UnknownFlag {
                index,
                flag: token.to_string(),
            })?;

            let value = tokens
                .get(index + 1)
                .map(|value| value.as_ref())
                .ok_or_else(|| TestServerError::MissingValue {
                    index,
                    flag: token.to_string(),
                })?;

            self.assign(flag, value)?;
            tracing::debug!(index, flag = token, value, "option accepted");
        }
        Ok(())
    }

    fn assign(&mut self, flag: Flag, value: &str) -> crate::Result<()> {
        let max = match flag {
            Flag::Port => MAX_PORT_LEN,
            _ => MAX_FIELD_LEN,
        };
        if value.len() > max {
            return Err(TestServerError::FieldTooLong {
                field: flag.field(),
                len: value.len(),
                max,
            });
        }

        match flag {
            Flag::ApplicationUri => self.application_uri = value.to_string(),
            Flag::ApplicationName => self.application_name = value.to_string(),
            Flag::Capabilities => self.capabilities_raw = value.to_string(),
            Flag::Port => self.port = Some(value.to_string()),
            Flag::DiNamespace => self.di_namespace = value == DI_ENABLED,
        }
        Ok(())
    }
}

/// Parse program arguments (without the program name) into [`ServerArgs`].
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> crate::Result<ServerArgs> {
    if tokens.is_empty() {
        return Err(TestServerError::NoArguments);
    }
    if tokens.len() > MAX_ARGUMENTS {
        return Err(TestServerError::TooManyArguments {
            count: tokens.len(),
            max: MAX_ARGUMENTS,
        });
    }

    let mut args = ServerArgs::default();
    args.apply_tokens(tokens)?;
    Ok(args)
}
